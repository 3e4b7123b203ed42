//! The structure-of-arrays element pool.

use indexmap::IndexMap;

use drift_core::schema::RESERVED_NAMES;
use drift_core::{
    AttrId, DeactivationReason, ElementId, ElementSchema, ElementStatus, Point, SeedError, Slot,
};

use crate::active::ActiveState;
use crate::error::ViewError;

/// Value supplied for one attribute in a seed request.
#[derive(Clone, Debug, PartialEq)]
pub enum AttrValue {
    /// Broadcast to every element of the request.
    Scalar(f64),
    /// One value per element; must have exactly `count` entries.
    PerElement(Vec<f64>),
}

impl AttrValue {
    fn len_matches(&self, count: usize) -> Result<(), usize> {
        match self {
            Self::Scalar(_) => Ok(()),
            Self::PerElement(v) if v.len() == count => Ok(()),
            Self::PerElement(v) => Err(v.len()),
        }
    }

    fn all_finite(&self) -> bool {
        match self {
            Self::Scalar(v) => v.is_finite(),
            Self::PerElement(vs) => vs.iter().all(|v| v.is_finite()),
        }
    }

    fn at(&self, i: usize) -> f64 {
        match self {
            Self::Scalar(v) => *v,
            Self::PerElement(vs) => vs[i],
        }
    }

    fn values(&self) -> Box<dyn Iterator<Item = f64> + '_> {
        match self {
            Self::Scalar(v) => Box::new(std::iter::once(*v)),
            Self::PerElement(vs) => Box::new(vs.iter().copied()),
        }
    }
}

impl From<f64> for AttrValue {
    fn from(v: f64) -> Self {
        Self::Scalar(v)
    }
}

impl From<Vec<f64>> for AttrValue {
    fn from(v: Vec<f64>) -> Self {
        Self::PerElement(v)
    }
}

/// Owns every element ever seeded, as parallel arrays indexed by [`Slot`].
///
/// IDs start at 1 and are assigned in seeding order; slot `n` always
/// holds ID `n + 1`. Slots are never compacted or reused, so the ID to
/// slot mapping is stable for the life of the pool and deactivated
/// elements keep their final state for reporting.
#[derive(Clone, Debug)]
pub struct ElementPool {
    schema: ElementSchema,
    ids: Vec<ElementId>,
    status: Vec<ElementStatus>,
    release_time: Vec<f64>,
    deactivation: Vec<Option<(DeactivationReason, f64)>>,
    lon: Vec<f64>,
    lat: Vec<f64>,
    z: Vec<f64>,
    attributes: Vec<Vec<f64>>,
    scheduled: Vec<Slot>,
    active: Vec<Slot>,
    num_deactivated: usize,
    num_released: usize,
}

impl ElementPool {
    /// Create an empty pool laid out for `schema`.
    pub fn new(schema: ElementSchema) -> Self {
        let attributes = vec![Vec::new(); schema.len()];
        Self {
            schema,
            ids: Vec::new(),
            status: Vec::new(),
            release_time: Vec::new(),
            deactivation: Vec::new(),
            lon: Vec::new(),
            lat: Vec::new(),
            z: Vec::new(),
            attributes,
            scheduled: Vec::new(),
            active: Vec::new(),
            num_deactivated: 0,
            num_released: 0,
        }
    }

    /// The attribute layout shared by every element.
    pub fn schema(&self) -> &ElementSchema {
        &self.schema
    }

    // ── Seeding ─────────────────────────────────────────────────

    /// Add `count` elements in `Scheduled` status.
    ///
    /// `values` maps attribute names to scalars or per-element
    /// sequences. `lon` and `lat` are mandatory, `z` defaults to the
    /// surface, and schema attributes fall back to their declared
    /// defaults. If a name appears more than once the first entry wins.
    ///
    /// The request is validated in full before anything is inserted, so
    /// on error the pool is unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`SeedError`] for a zero count, a non-finite release
    /// time or value, a sequence of the wrong length, an unknown name, a
    /// missing mandatory attribute, a latitude outside `[-90, 90]`, or a
    /// depth above the surface.
    pub fn schedule(
        &mut self,
        values: &[(&str, AttrValue)],
        release_time: f64,
        count: usize,
    ) -> Result<Vec<ElementId>, SeedError> {
        if count == 0 {
            return Err(SeedError::ZeroCount);
        }
        if !release_time.is_finite() {
            return Err(SeedError::NonFinite {
                attribute: "release_time".to_string(),
            });
        }
        for (name, value) in values {
            if !RESERVED_NAMES.contains(name) && self.schema.id(name).is_none() {
                return Err(SeedError::UnknownAttribute {
                    attribute: name.to_string(),
                });
            }
            value
                .len_matches(count)
                .map_err(|got| SeedError::LengthMismatch {
                    attribute: name.to_string(),
                    expected: count,
                    got,
                })?;
            if !value.all_finite() {
                return Err(SeedError::NonFinite {
                    attribute: name.to_string(),
                });
            }
        }
        let lookup = |name: &str| values.iter().find(|(n, _)| *n == name).map(|(_, v)| v);

        let lon = lookup("lon").ok_or_else(|| SeedError::MissingAttribute {
            attribute: "lon".to_string(),
        })?;
        let lat = lookup("lat").ok_or_else(|| SeedError::MissingAttribute {
            attribute: "lat".to_string(),
        })?;
        if let Some(bad) = lat.values().find(|v| v.abs() > 90.0) {
            return Err(SeedError::OutOfRange {
                attribute: "lat".to_string(),
                value: bad,
                expected: "-90 <= lat <= 90",
            });
        }
        let z = lookup("z");
        if let Some(bad) = z.and_then(|z| z.values().find(|v| *v > 0.0)) {
            return Err(SeedError::OutOfRange {
                attribute: "z".to_string(),
                value: bad,
                expected: "z <= 0",
            });
        }

        let mut columns = Vec::with_capacity(self.schema.len());
        for (_, def) in self.schema.iter() {
            let column = match (lookup(&def.name), def.default) {
                (Some(v), _) => v.clone(),
                (None, Some(d)) => AttrValue::Scalar(d),
                (None, None) => {
                    return Err(SeedError::MissingAttribute {
                        attribute: def.name.clone(),
                    })
                }
            };
            columns.push(column);
        }

        // Validation complete; from here on nothing can fail.
        let first = self.ids.len();
        let mut ids = Vec::with_capacity(count);
        for i in 0..count {
            let slot = Slot(first + i);
            let id = ElementId(slot.0 as u64 + 1);
            self.ids.push(id);
            self.status.push(ElementStatus::Scheduled);
            self.release_time.push(release_time);
            self.deactivation.push(None);
            self.lon.push(lon.at(i));
            self.lat.push(lat.at(i));
            self.z.push(z.map_or(0.0, |z| z.at(i)));
            for (col, value) in self.attributes.iter_mut().zip(&columns) {
                col.push(value.at(i));
            }
            self.scheduled.push(slot);
            ids.push(id);
        }
        Ok(ids)
    }

    // ── Lifecycle ───────────────────────────────────────────────

    /// Activate every scheduled element with `release_time <= t`.
    ///
    /// Returns the newly active slots in ascending order.
    pub fn release_due(&mut self, t: f64) -> Vec<Slot> {
        self.release_where(|release| release <= t)
    }

    /// Backward-time counterpart of [`release_due`](Self::release_due):
    /// activate every scheduled element with `release_time >= t`.
    pub fn release_due_backward(&mut self, t: f64) -> Vec<Slot> {
        self.release_where(|release| release >= t)
    }

    fn release_where(&mut self, due: impl Fn(f64) -> bool) -> Vec<Slot> {
        let (released, pending): (Vec<Slot>, Vec<Slot>) = self
            .scheduled
            .iter()
            .partition(|s| due(self.release_time[s.0]));
        if released.is_empty() {
            return released;
        }
        self.scheduled = pending;
        for s in &released {
            self.status[s.0] = ElementStatus::Active;
        }
        self.num_released += released.len();
        self.active.extend_from_slice(&released);
        self.active.sort_unstable();
        released
    }

    /// Deactivate the given elements, recording `reason` and `time`.
    ///
    /// Applies to active and scheduled elements. Slots that are already
    /// deactivated or out of range are ignored, which makes the call
    /// idempotent. Returns how many elements changed status.
    pub fn deactivate(&mut self, slots: &[Slot], reason: DeactivationReason, time: f64) -> usize {
        let mut changed = 0;
        for &slot in slots {
            match self.status.get(slot.0) {
                Some(ElementStatus::Active) | Some(ElementStatus::Scheduled) => {
                    self.status[slot.0] = ElementStatus::Deactivated;
                    self.deactivation[slot.0] = Some((reason, time));
                    changed += 1;
                }
                _ => {}
            }
        }
        if changed > 0 {
            let status = &self.status;
            self.active
                .retain(|s| status[s.0] == ElementStatus::Active);
            self.scheduled
                .retain(|s| status[s.0] == ElementStatus::Scheduled);
            self.num_deactivated += changed;
        }
        changed
    }

    // ── Counts ──────────────────────────────────────────────────

    /// Slots of the active elements, ascending.
    pub fn active_slots(&self) -> &[Slot] {
        &self.active
    }

    /// Slots of the scheduled elements, ascending.
    pub fn scheduled_slots(&self) -> &[Slot] {
        &self.scheduled
    }

    /// Total number of elements ever seeded.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Whether nothing has been seeded.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Number of scheduled elements.
    pub fn num_scheduled(&self) -> usize {
        self.scheduled.len()
    }

    /// Number of active elements.
    pub fn num_active(&self) -> usize {
        self.active.len()
    }

    /// Number of deactivated elements.
    pub fn num_deactivated(&self) -> usize {
        self.num_deactivated
    }

    /// Whether any element has ever been released.
    pub fn any_released(&self) -> bool {
        self.num_released > 0
    }

    /// Deactivated element counts per reason, every reason present.
    pub fn deactivation_counts(&self) -> IndexMap<DeactivationReason, usize> {
        let mut counts: IndexMap<DeactivationReason, usize> =
            DeactivationReason::ALL.iter().map(|&r| (r, 0)).collect();
        for (reason, _) in self.deactivation.iter().flatten() {
            *counts.entry(*reason).or_insert(0) += 1;
        }
        counts
    }

    // ── Per-element accessors ───────────────────────────────────

    /// Slot holding element `id`.
    pub fn slot_of(&self, id: ElementId) -> Option<Slot> {
        let slot = id.0.checked_sub(1)? as usize;
        (slot < self.ids.len()).then_some(Slot(slot))
    }

    /// ID of the element in `slot`.
    pub fn id(&self, slot: Slot) -> Option<ElementId> {
        self.ids.get(slot.0).copied()
    }

    /// Status of the element in `slot`.
    pub fn status(&self, slot: Slot) -> Option<ElementStatus> {
        self.status.get(slot.0).copied()
    }

    /// Position of the element in `slot`.
    pub fn position(&self, slot: Slot) -> Option<Point> {
        (slot.0 < self.len())
            .then(|| Point::new(self.lon[slot.0], self.lat[slot.0], self.z[slot.0]))
    }

    /// Release time of the element in `slot`.
    pub fn release_time(&self, slot: Slot) -> Option<f64> {
        self.release_time.get(slot.0).copied()
    }

    /// Deactivation reason and time, if the element is deactivated.
    pub fn deactivation(&self, slot: Slot) -> Option<(DeactivationReason, f64)> {
        self.deactivation.get(slot.0).copied().flatten()
    }

    /// Value of attribute `attr` for the element in `slot`.
    pub fn attribute(&self, slot: Slot, attr: AttrId) -> Option<f64> {
        self.attributes.get(attr.0 as usize)?.get(slot.0).copied()
    }

    /// Move an active element. Returns `false` (and changes nothing)
    /// if the element is not active.
    pub fn set_position(&mut self, slot: Slot, p: Point) -> bool {
        if self.status(slot) != Some(ElementStatus::Active) {
            return false;
        }
        self.lon[slot.0] = p.lon;
        self.lat[slot.0] = p.lat;
        self.z[slot.0] = p.z;
        true
    }

    // ── Active views ────────────────────────────────────────────

    /// Positions of the active elements, in active-slot order.
    pub fn active_positions(&self) -> Vec<Point> {
        self.active
            .iter()
            .map(|s| Point::new(self.lon[s.0], self.lat[s.0], self.z[s.0]))
            .collect()
    }

    /// Values of `attr` for the active elements, in active-slot order.
    ///
    /// # Errors
    ///
    /// Returns [`ViewError::UnknownAttribute`] if `attr` is not in the
    /// schema.
    pub fn active_attribute(&self, attr: AttrId) -> Result<Vec<f64>, ViewError> {
        let col = self
            .attributes
            .get(attr.0 as usize)
            .ok_or(ViewError::UnknownAttribute { attr })?;
        Ok(self.active.iter().map(|s| col[s.0]).collect())
    }

    /// Overwrite `attr` for the active elements only.
    ///
    /// # Errors
    ///
    /// Returns [`ViewError`] if `attr` is unknown or `values` does not
    /// have one entry per active element.
    pub fn set_active_attribute(&mut self, attr: AttrId, values: &[f64]) -> Result<(), ViewError> {
        if values.len() != self.active.len() {
            return Err(ViewError::LengthMismatch {
                expected: self.active.len(),
                got: values.len(),
            });
        }
        let col = self
            .attributes
            .get_mut(attr.0 as usize)
            .ok_or(ViewError::UnknownAttribute { attr })?;
        for (s, &v) in self.active.iter().zip(values) {
            col[s.0] = v;
        }
        Ok(())
    }

    /// Copy the active elements into a standalone [`ActiveState`].
    pub fn gather_active(&self) -> ActiveState {
        let pick = |col: &[f64]| self.active.iter().map(|s| col[s.0]).collect::<Vec<_>>();
        ActiveState {
            slots: self.active.clone(),
            ids: self.active.iter().map(|s| self.ids[s.0]).collect(),
            lon: pick(&self.lon),
            lat: pick(&self.lat),
            z: pick(&self.z),
            attributes: self.attributes.iter().map(|c| pick(c)).collect(),
        }
    }

    /// Write an [`ActiveState`] back into the pool.
    ///
    /// Only rows whose slot is still active are written; rows for
    /// elements deactivated since the gather are skipped so deactivated
    /// state stays frozen.
    ///
    /// # Errors
    ///
    /// Returns [`ViewError::LengthMismatch`] if a position or attribute
    /// array no longer has one entry per gathered row.
    pub fn scatter_active(&mut self, state: &ActiveState) -> Result<(), ViewError> {
        let n = state.slots.len();
        let columns = [&state.lon, &state.lat, &state.z]
            .into_iter()
            .chain(state.attributes.iter());
        for col in columns {
            if col.len() != n {
                return Err(ViewError::LengthMismatch {
                    expected: n,
                    got: col.len(),
                });
            }
        }
        if state.attributes.len() != self.attributes.len() {
            return Err(ViewError::LengthMismatch {
                expected: self.attributes.len(),
                got: state.attributes.len(),
            });
        }
        for (row, slot) in state.slots.iter().enumerate() {
            if self.status.get(slot.0) != Some(&ElementStatus::Active) {
                continue;
            }
            self.lon[slot.0] = state.lon[row];
            self.lat[slot.0] = state.lat[row];
            self.z[slot.0] = state.z[row];
            for (dst, src) in self.attributes.iter_mut().zip(&state.attributes) {
                dst[slot.0] = src[row];
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use drift_core::AttributeDef;

    fn pool() -> ElementPool {
        let schema = ElementSchema::new(vec![
            AttributeDef::with_default("density", "kg/m3", 880.0),
            AttributeDef::required("mass", "kg"),
        ])
        .unwrap();
        ElementPool::new(schema)
    }

    fn seed(p: &mut ElementPool, release: f64, count: usize) -> Vec<ElementId> {
        p.schedule(
            &[
                ("lon", 4.0.into()),
                ("lat", 60.0.into()),
                ("mass", 1.0.into()),
            ],
            release,
            count,
        )
        .unwrap()
    }

    #[test]
    fn schedule_assigns_sequential_ids() {
        let mut p = pool();
        let a = seed(&mut p, 0.0, 3);
        let b = seed(&mut p, 10.0, 2);
        assert_eq!(a, vec![ElementId(1), ElementId(2), ElementId(3)]);
        assert_eq!(b, vec![ElementId(4), ElementId(5)]);
        assert_eq!(p.num_scheduled(), 5);
        assert_eq!(p.slot_of(ElementId(4)), Some(Slot(3)));
        assert_eq!(p.slot_of(ElementId(0)), None);
        assert_eq!(p.slot_of(ElementId(6)), None);
    }

    #[test]
    fn schedule_applies_defaults_and_per_element_values() {
        let mut p = pool();
        p.schedule(
            &[
                ("lon", vec![1.0, 2.0].into()),
                ("lat", 0.0.into()),
                ("z", vec![-1.0, -2.0].into()),
                ("mass", 5.0.into()),
            ],
            0.0,
            2,
        )
        .unwrap();
        let density = p.schema().id("density").unwrap();
        assert_eq!(p.attribute(Slot(1), density), Some(880.0));
        assert_eq!(p.position(Slot(1)), Some(Point::new(2.0, 0.0, -2.0)));
    }

    #[test]
    fn schedule_rejects_malformed_requests_without_partial_insert() {
        let mut p = pool();
        let err = p
            .schedule(
                &[("lon", vec![1.0].into()), ("lat", 0.0.into()), ("mass", 1.0.into())],
                0.0,
                2,
            )
            .unwrap_err();
        assert!(matches!(err, SeedError::LengthMismatch { expected: 2, got: 1, .. }));

        let err = p
            .schedule(&[("lon", 1.0.into()), ("lat", 0.0.into())], 0.0, 1)
            .unwrap_err();
        assert_eq!(
            err,
            SeedError::MissingAttribute {
                attribute: "mass".into()
            }
        );

        let err = p
            .schedule(
                &[("lon", 1.0.into()), ("lat", 0.0.into()), ("mass", 1.0.into()), ("colour", 1.0.into())],
                0.0,
                1,
            )
            .unwrap_err();
        assert!(matches!(err, SeedError::UnknownAttribute { .. }));

        let err = p
            .schedule(
                &[("lon", 1.0.into()), ("lat", 0.0.into()), ("z", 3.0.into()), ("mass", 1.0.into())],
                0.0,
                1,
            )
            .unwrap_err();
        assert!(matches!(err, SeedError::OutOfRange { .. }));

        assert_eq!(
            p.schedule(&[("lon", 1.0.into()), ("lat", 0.0.into())], 0.0, 0),
            Err(SeedError::ZeroCount)
        );
        assert!(p.is_empty());
    }

    #[test]
    fn release_due_is_ascending_and_complete() {
        let mut p = pool();
        seed(&mut p, 100.0, 2);
        seed(&mut p, 0.0, 2);
        assert_eq!(p.release_due(0.0), vec![Slot(2), Slot(3)]);
        assert_eq!(p.release_due(50.0), vec![]);
        assert_eq!(p.release_due(100.0), vec![Slot(0), Slot(1)]);
        assert_eq!(p.active_slots(), &[Slot(0), Slot(1), Slot(2), Slot(3)]);
        assert_eq!(p.num_scheduled(), 0);
    }

    #[test]
    fn backward_release_uses_later_times() {
        let mut p = pool();
        seed(&mut p, 100.0, 1);
        seed(&mut p, 0.0, 1);
        assert_eq!(p.release_due_backward(50.0), vec![Slot(0)]);
        assert_eq!(p.release_due_backward(0.0), vec![Slot(1)]);
    }

    #[test]
    fn deactivate_is_idempotent_and_terminal() {
        let mut p = pool();
        seed(&mut p, 0.0, 3);
        p.release_due(0.0);
        assert_eq!(p.deactivate(&[Slot(1)], DeactivationReason::StrandedOnLand, 60.0), 1);
        assert_eq!(p.deactivate(&[Slot(1)], DeactivationReason::LeftDomainBounds, 120.0), 0);
        assert_eq!(
            p.deactivation(Slot(1)),
            Some((DeactivationReason::StrandedOnLand, 60.0))
        );
        assert_eq!(p.active_slots(), &[Slot(0), Slot(2)]);
        assert!(!p.set_position(Slot(1), Point::new(0.0, 0.0, 0.0)));
        let counts = p.deactivation_counts();
        assert_eq!(counts[&DeactivationReason::StrandedOnLand], 1);
        assert_eq!(counts.len(), DeactivationReason::ALL.len());
    }

    #[test]
    fn scheduled_elements_can_be_deactivated() {
        let mut p = pool();
        seed(&mut p, 1e9, 2);
        p.deactivate(&[Slot(0), Slot(1)], DeactivationReason::OutsideSimulationWindow, 0.0);
        assert_eq!(p.num_scheduled(), 0);
        assert_eq!(p.num_deactivated(), 2);
        assert!(!p.any_released());
        assert!(p.release_due(2e9).is_empty());
    }

    #[test]
    fn active_views_skip_inactive_slots() {
        let mut p = pool();
        seed(&mut p, 0.0, 2);
        seed(&mut p, 10.0, 1);
        p.release_due(0.0);
        let mass = p.schema().id("mass").unwrap();
        p.set_active_attribute(mass, &[2.0, 3.0]).unwrap();
        assert_eq!(p.attribute(Slot(2), mass), Some(1.0));
        assert_eq!(p.active_attribute(mass).unwrap(), vec![2.0, 3.0]);
        assert!(matches!(
            p.set_active_attribute(mass, &[1.0]),
            Err(ViewError::LengthMismatch { expected: 2, got: 1 })
        ));
        assert!(p.active_attribute(AttrId(9)).is_err());
    }

    #[test]
    fn scatter_skips_rows_deactivated_after_gather() {
        let mut p = pool();
        seed(&mut p, 0.0, 2);
        p.release_due(0.0);
        let mut state = p.gather_active();
        state.z = vec![-5.0, -6.0];
        p.deactivate(&[Slot(0)], DeactivationReason::NumericalInstability, 0.0);
        p.scatter_active(&state).unwrap();
        assert_eq!(p.position(Slot(0)).unwrap().z, 0.0);
        assert_eq!(p.position(Slot(1)).unwrap().z, -6.0);

        state.lon.pop();
        assert!(p.scatter_active(&state).is_err());
    }

    #[test]
    fn any_released_tracks_activation() {
        let mut p = pool();
        seed(&mut p, 0.0, 1);
        assert!(!p.any_released());
        p.release_due(0.0);
        assert!(p.any_released());
        p.deactivate(&[Slot(0)], DeactivationReason::StrandedOnLand, 0.0);
        assert!(p.any_released());
    }
}
