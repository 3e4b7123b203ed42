//! Output records and history.
//!
//! Every `output_interval` steps the engine copies the active elements
//! into an [`OutputRecord`]. The [`OutputHistory`] keeps them in step
//! order for persistence or plotting collaborators, and can be reduced
//! to an FNV-1a hash to compare runs bit for bit.

use indexmap::IndexMap;

use drift_core::{ElementId, StepId};
use drift_pool::ElementPool;

/// FNV-1a offset basis for 64-bit.
const FNV_OFFSET: u64 = 0xcbf29ce484222325;
/// FNV-1a prime for 64-bit.
const FNV_PRIME: u64 = 0x00000100000001B3;

#[inline]
fn fnv1a_u64(mut hash: u64, v: u64) -> u64 {
    for &b in &v.to_le_bytes() {
        hash = (hash ^ b as u64).wrapping_mul(FNV_PRIME);
    }
    hash
}

#[inline]
fn fnv1a_bytes(mut hash: u64, bytes: &[u8]) -> u64 {
    for &b in bytes {
        hash = (hash ^ b as u64).wrapping_mul(FNV_PRIME);
    }
    hash
}

/// State of the active elements at the end of one step.
#[derive(Clone, Debug, PartialEq)]
pub struct OutputRecord {
    /// Step the record was taken at.
    pub step: StepId,
    /// Model time of the step.
    pub time: f64,
    /// IDs of the active elements, ascending.
    pub ids: Vec<ElementId>,
    /// Longitudes in degrees.
    pub lon: Vec<f64>,
    /// Latitudes in degrees.
    pub lat: Vec<f64>,
    /// Depths in metres (≤ 0).
    pub z: Vec<f64>,
    /// Substance attributes by name, in schema order.
    pub attributes: IndexMap<String, Vec<f64>>,
}

impl OutputRecord {
    /// Copy the active elements of `pool`.
    pub fn capture(step: StepId, time: f64, pool: &ElementPool) -> Self {
        let state = pool.gather_active();
        let attributes = pool
            .schema()
            .iter()
            .map(|(id, def)| {
                let values = state.attr(id).map(<[f64]>::to_vec).unwrap_or_default();
                (def.name.clone(), values)
            })
            .collect();
        Self {
            step,
            time,
            ids: state.ids().to_vec(),
            lon: state.lon,
            lat: state.lat,
            z: state.z,
            attributes,
        }
    }

    /// Number of elements in the record.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Whether the record holds no elements.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Values of attribute `name`.
    pub fn attribute(&self, name: &str) -> Option<&[f64]> {
        self.attributes.get(name).map(Vec::as_slice)
    }

    fn hash_into(&self, mut hash: u64) -> u64 {
        hash = fnv1a_u64(hash, self.step.0);
        hash = fnv1a_u64(hash, self.time.to_bits());
        for id in &self.ids {
            hash = fnv1a_u64(hash, id.0);
        }
        for column in [&self.lon, &self.lat, &self.z] {
            for v in column {
                hash = fnv1a_u64(hash, v.to_bits());
            }
        }
        for (name, values) in &self.attributes {
            hash = fnv1a_bytes(hash, name.as_bytes());
            for v in values {
                hash = fnv1a_u64(hash, v.to_bits());
            }
        }
        hash
    }
}

/// Output records in step order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct OutputHistory {
    records: Vec<OutputRecord>,
}

impl OutputHistory {
    /// An empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record.
    pub fn push(&mut self, record: OutputRecord) {
        self.records.push(record);
    }

    /// All records, oldest first.
    pub fn records(&self) -> &[OutputRecord] {
        &self.records
    }

    /// Iterate over the records, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &OutputRecord> {
        self.records.iter()
    }

    /// The most recent record.
    pub fn last(&self) -> Option<&OutputRecord> {
        self.records.last()
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether no record has been taken.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// FNV-1a hash over every record's step, time, IDs, positions and
    /// attributes (bit patterns).
    ///
    /// Returns the FNV offset basis for an empty history.
    pub fn hash(&self) -> u64 {
        self.records
            .iter()
            .fold(FNV_OFFSET, |hash, record| record.hash_into(hash))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use drift_core::{AttributeDef, ElementSchema};
    use drift_pool::AttrValue;

    fn pool() -> ElementPool {
        let schema =
            ElementSchema::new(vec![AttributeDef::with_default("density", "kg m-3", 880.0)])
                .unwrap();
        let mut pool = ElementPool::new(schema);
        let values: Vec<(&str, AttrValue)> = vec![
            ("lon", vec![1.0, 2.0, 3.0].into()),
            ("lat", 60.0.into()),
            ("z", vec![0.0, -1.0, -2.0].into()),
        ];
        pool.schedule(&values, 0.0, 3).unwrap();
        pool
    }

    #[test]
    fn capture_copies_only_active_elements() {
        let mut pool = pool();
        let empty = OutputRecord::capture(StepId(0), 0.0, &pool);
        assert!(empty.is_empty());
        assert_eq!(empty.attribute("density"), Some(&[][..]));

        pool.release_due(0.0);
        pool.deactivate(
            &[drift_core::Slot(1)],
            drift_core::DeactivationReason::StrandedOnLand,
            0.0,
        );
        let r = OutputRecord::capture(StepId(1), 60.0, &pool);
        assert_eq!(r.ids, vec![ElementId(1), ElementId(3)]);
        assert_eq!(r.lon, vec![1.0, 3.0]);
        assert_eq!(r.z, vec![0.0, -2.0]);
        assert_eq!(r.attribute("density"), Some(&[880.0, 880.0][..]));
        assert!(r.attribute("diameter").is_none());
    }

    #[test]
    fn hash_sees_every_bit() {
        let mut pool = pool();
        pool.release_due(0.0);
        let mut a = OutputHistory::new();
        assert_eq!(a.hash(), FNV_OFFSET);
        a.push(OutputRecord::capture(StepId(1), 60.0, &pool));
        let mut b = a.clone();
        assert_eq!(a.hash(), b.hash());

        b.records[0].z[2] = -2.000_000_000_000_001;
        assert_ne!(a.hash(), b.hash());

        let mut c = a.clone();
        c.records[0].time = 61.0;
        assert_ne!(a.hash(), c.hash());

        a.push(OutputRecord::capture(StepId(2), 120.0, &pool));
        assert_eq!(a.len(), 2);
        assert_eq!(a.last().map(|r| r.step), Some(StepId(2)));
    }
}
