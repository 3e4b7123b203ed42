//! Gathered working copy of the active elements.
//!
//! [`ActiveState`] is produced by [`ElementPool::gather_active`] at the
//! start of a step's physics phase. Hooks mutate it freely; the engine
//! writes it back with [`ElementPool::scatter_active`] only when the
//! step succeeds, which makes a failed step leave the pool untouched.
//!
//! [`ElementPool::gather_active`]: crate::ElementPool::gather_active
//! [`ElementPool::scatter_active`]: crate::ElementPool::scatter_active

use drift_core::{AttrId, ElementId, Point, Slot};

/// Structure-of-arrays copy of the active elements, in ascending slot
/// order. Row `i` of every array belongs to `slots()[i]`.
#[derive(Clone, Debug, PartialEq)]
pub struct ActiveState {
    pub(crate) slots: Vec<Slot>,
    pub(crate) ids: Vec<ElementId>,
    /// Longitudes in degrees east.
    pub lon: Vec<f64>,
    /// Latitudes in degrees north.
    pub lat: Vec<f64>,
    /// Vertical positions in metres (≤ 0).
    pub z: Vec<f64>,
    pub(crate) attributes: Vec<Vec<f64>>,
}

impl ActiveState {
    /// Number of active elements.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether there are no active elements.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Pool slots, one per row.
    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    /// Element IDs, one per row.
    pub fn ids(&self) -> &[ElementId] {
        &self.ids
    }

    /// Number of schema attributes carried per row.
    pub fn attribute_count(&self) -> usize {
        self.attributes.len()
    }

    /// Read one attribute column.
    pub fn attr(&self, id: AttrId) -> Option<&[f64]> {
        self.attributes.get(id.0 as usize).map(Vec::as_slice)
    }

    /// Mutable access to one attribute column.
    pub fn attr_mut(&mut self, id: AttrId) -> Option<&mut [f64]> {
        self.attributes.get_mut(id.0 as usize).map(Vec::as_mut_slice)
    }

    /// Position of row `i`.
    pub fn point(&self, i: usize) -> Point {
        Point::new(self.lon[i], self.lat[i], self.z[i])
    }

    /// Positions of all rows.
    pub fn points(&self) -> Vec<Point> {
        (0..self.len()).map(|i| self.point(i)).collect()
    }

    /// Rows whose position or any attribute is NaN or infinite, ascending.
    pub fn non_finite_rows(&self) -> Vec<usize> {
        (0..self.len())
            .filter(|&i| {
                !self.point(i).is_finite()
                    || self.attributes.iter().any(|col| !col[i].is_finite())
            })
            .collect()
    }

    /// Overwrite row `row` with the same row of `from`.
    ///
    /// Used to undo an update for a single element. Does nothing if
    /// `from` does not hold the same slot at `row`.
    pub fn restore_row(&mut self, row: usize, from: &ActiveState) {
        if self.slots.get(row) != from.slots.get(row) || row >= self.len() {
            return;
        }
        self.lon[row] = from.lon[row];
        self.lat[row] = from.lat[row];
        self.z[row] = from.z[row];
        for (dst, src) in self.attributes.iter_mut().zip(&from.attributes) {
            dst[row] = src[row];
        }
    }

    /// Keep only the rows whose `keep` flag is set, preserving order.
    pub fn retain(&mut self, keep: &[bool]) {
        fn filter<T: Copy>(v: &mut Vec<T>, keep: &[bool]) {
            let mut i = 0;
            v.retain(|_| {
                let k = keep.get(i).copied().unwrap_or(true);
                i += 1;
                k
            });
        }
        filter(&mut self.slots, keep);
        filter(&mut self.ids, keep);
        filter(&mut self.lon, keep);
        filter(&mut self.lat, keep);
        filter(&mut self.z, keep);
        for col in &mut self.attributes {
            filter(col, keep);
        }
    }
}
