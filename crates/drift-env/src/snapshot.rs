//! Per-step environment values.

use indexmap::IndexMap;

use drift_core::{HookError, ProfileField};

/// Environment values for one simulation time and one ordered set of
/// query points.
///
/// Created fresh each step and dropped when the step's physics are
/// done; nothing in it outlives the step.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EnvironmentSnapshot {
    time: f64,
    len: usize,
    values: IndexMap<String, Vec<f64>>,
    profiles: IndexMap<String, ProfileField>,
}

impl EnvironmentSnapshot {
    /// An empty snapshot for `len` points at `time`.
    pub fn new(time: f64, len: usize) -> Self {
        Self {
            time,
            len,
            values: IndexMap::new(),
            profiles: IndexMap::new(),
        }
    }

    /// Simulation time of the query.
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Number of query points.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the snapshot covers no points.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Store per-point values for `variable`.
    pub fn insert(&mut self, variable: &str, values: Vec<f64>) {
        debug_assert_eq!(values.len(), self.len);
        self.values.insert(variable.to_string(), values);
    }

    /// Store per-point profiles for `variable`.
    pub fn insert_profile(&mut self, variable: &str, profile: ProfileField) {
        debug_assert_eq!(profile.len(), self.len);
        self.profiles.insert(variable.to_string(), profile);
    }

    /// Per-point values of `variable`.
    pub fn get(&self, variable: &str) -> Option<&[f64]> {
        self.values.get(variable).map(Vec::as_slice)
    }

    /// Per-point values of `variable`, or an error naming it.
    ///
    /// # Errors
    ///
    /// Returns [`HookError::VariableNotQueried`] if the variable is not
    /// in the snapshot.
    pub fn require(&self, variable: &str) -> Result<&[f64], HookError> {
        self.get(variable).ok_or_else(|| HookError::VariableNotQueried {
            variable: variable.to_string(),
        })
    }

    /// Profiles of `variable`.
    pub fn profile(&self, variable: &str) -> Option<&ProfileField> {
        self.profiles.get(variable)
    }

    /// Profiles of `variable`, or an error naming it.
    ///
    /// # Errors
    ///
    /// Returns [`HookError::VariableNotQueried`] if no profile was
    /// queried for the variable.
    pub fn require_profile(&self, variable: &str) -> Result<&ProfileField, HookError> {
        self.profile(variable)
            .ok_or_else(|| HookError::VariableNotQueried {
                variable: variable.to_string(),
            })
    }

    /// Names of the point variables, in query order.
    pub fn variables(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    /// Names of the profile variables, in query order.
    pub fn profile_variables(&self) -> impl Iterator<Item = &str> {
        self.profiles.keys().map(String::as_str)
    }

    /// Keep only the rows whose `keep` flag is set, in every variable
    /// and profile.
    pub fn retain(&mut self, keep: &[bool]) {
        debug_assert_eq!(keep.len(), self.len);
        for values in self.values.values_mut() {
            let mut flags = keep.iter();
            values.retain(|_| flags.next().copied().unwrap_or(false));
        }
        for profile in self.profiles.values_mut() {
            profile.retain(keep);
        }
        self.len = keep.iter().filter(|&&k| k).count();
    }

    /// Merge another snapshot's variables into this one. Both must be
    /// for the same points; entries in `other` win.
    pub fn merge(&mut self, other: EnvironmentSnapshot) {
        debug_assert_eq!(self.len, other.len);
        self.values.extend(other.values);
        self.profiles.extend(other.profiles);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retain_drops_rows_everywhere() {
        let mut s = EnvironmentSnapshot::new(60.0, 3);
        s.insert("x_wind", vec![1.0, 2.0, 3.0]);
        s.insert_profile(
            "ocean_vertical_diffusivity",
            ProfileField::uniform(vec![0.1, 0.2, 0.3]),
        );
        s.retain(&[true, false, true]);
        assert_eq!(s.len(), 2);
        assert_eq!(s.get("x_wind").unwrap(), &[1.0, 3.0]);
        assert_eq!(
            s.profile("ocean_vertical_diffusivity").unwrap().column(1),
            &[0.3]
        );
    }

    #[test]
    fn require_names_missing_variable() {
        let s = EnvironmentSnapshot::new(0.0, 0);
        let err = s.require("y_wind").unwrap_err();
        assert_eq!(
            err,
            HookError::VariableNotQueried {
                variable: "y_wind".into()
            }
        );
        assert!(s.require_profile("sea_water_salinity").is_err());
    }
}
