//! Element lifecycle: status and deactivation reasons.

use std::fmt;

/// Lifecycle category of an element.
///
/// Every element is in exactly one category. Transitions are
/// `Scheduled → Active → Deactivated` or `Scheduled → Deactivated`;
/// `Deactivated` is terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ElementStatus {
    /// Seeded but not yet released.
    Scheduled,
    /// Released and moving.
    Active,
    /// Permanently removed from the simulation; retained for output.
    Deactivated,
}

impl fmt::Display for ElementStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scheduled => write!(f, "scheduled"),
            Self::Active => write!(f, "active"),
            Self::Deactivated => write!(f, "deactivated"),
        }
    }
}

/// Why an element was deactivated. A closed set, recorded per element.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DeactivationReason {
    /// The element's position fell on land.
    StrandedOnLand,
    /// The element left the configured simulation domain.
    LeftDomainBounds,
    /// A substance hook removed all of the element's mass.
    EvaporatedToZeroMass,
    /// The element's release time lies outside the run window.
    OutsideSimulationWindow,
    /// No reader or fallback supplied a required variable.
    MissingEnvironmentData,
    /// A position or attribute became non-finite.
    NumericalInstability,
}

impl DeactivationReason {
    /// All reasons, in reporting order.
    pub const ALL: [Self; 6] = [
        Self::StrandedOnLand,
        Self::LeftDomainBounds,
        Self::EvaporatedToZeroMass,
        Self::OutsideSimulationWindow,
        Self::MissingEnvironmentData,
        Self::NumericalInstability,
    ];

    /// Stable kebab-case label used in logs and reports.
    pub fn label(&self) -> &'static str {
        match self {
            Self::StrandedOnLand => "stranded-on-land",
            Self::LeftDomainBounds => "left-domain-bounds",
            Self::EvaporatedToZeroMass => "evaporated-to-zero-mass",
            Self::OutsideSimulationWindow => "outside-simulation-window",
            Self::MissingEnvironmentData => "missing-environment-data",
            Self::NumericalInstability => "numerical-instability",
        }
    }
}

impl fmt::Display for DeactivationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_are_unique() {
        let mut labels: Vec<_> = DeactivationReason::ALL.iter().map(|r| r.label()).collect();
        labels.sort_unstable();
        labels.dedup();
        assert_eq!(labels.len(), DeactivationReason::ALL.len());
    }

    #[test]
    fn display_uses_label() {
        assert_eq!(
            DeactivationReason::StrandedOnLand.to_string(),
            "stranded-on-land"
        );
        assert_eq!(ElementStatus::Active.to_string(), "active");
    }
}
