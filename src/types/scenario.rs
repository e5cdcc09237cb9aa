//! Climate scenario identifiers.

use std::fmt;

/// The two compared climate scenarios.
///
/// `S1` is the chlorine-emission experiment, `SSP370` the unchanged
/// baseline. On disk the cases live in the `fin` and `nochg` directories
/// respectively; figures and tables use the display names.
///
/// # Example
///
/// ```
/// use clpost_rs::types::Scenario;
///
/// assert_eq!(Scenario::S1.case_dir(), "fin");
/// assert_eq!(Scenario::Ssp370.to_string(), "SSP370");
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Scenario {
    /// Chlorine-emission experiment.
    S1,
    /// SSP3-7.0 baseline without the added chlorine emissions.
    Ssp370,
}

impl Scenario {
    /// Both scenarios, experiment first.
    pub const BOTH: [Scenario; 2] = [Scenario::S1, Scenario::Ssp370];

    /// Case directory name under the model-output root.
    pub fn case_dir(&self) -> &'static str {
        match self {
            Scenario::S1 => "fin",
            Scenario::Ssp370 => "nochg",
        }
    }

    /// The scenario this one is compared against.
    pub fn other(&self) -> Scenario {
        match self {
            Scenario::S1 => Scenario::Ssp370,
            Scenario::Ssp370 => Scenario::S1,
        }
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scenario::S1 => f.write_str("S1"),
            Scenario::Ssp370 => f.write_str("SSP370"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_dirs() {
        assert_eq!(Scenario::S1.case_dir(), "fin");
        assert_eq!(Scenario::Ssp370.case_dir(), "nochg");
    }

    #[test]
    fn test_other() {
        assert_eq!(Scenario::S1.other(), Scenario::Ssp370);
        assert_eq!(Scenario::Ssp370.other(), Scenario::S1);
    }
}
