use std::str::FromStr;

use crate::validate::ValidationError;

/// How often a monitor subscription runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cadence {
    Daily,
    Weekly,
    Monthly,
}

impl Cadence {
    /// Minimum hours that must elapse between runs at this cadence.
    #[must_use]
    pub fn interval_hours(self) -> i64 {
        match self {
            Cadence::Daily => 24,
            Cadence::Weekly => 168,
            Cadence::Monthly => 720,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Cadence::Daily => "daily",
            Cadence::Weekly => "weekly",
            Cadence::Monthly => "monthly",
        }
    }
}

impl std::fmt::Display for Cadence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Cadence {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "daily" => Ok(Cadence::Daily),
            "weekly" => Ok(Cadence::Weekly),
            "monthly" => Ok(Cadence::Monthly),
            other => Err(ValidationError::UnknownCadence(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_cadences() {
        assert_eq!("daily".parse::<Cadence>().unwrap(), Cadence::Daily);
        assert_eq!("weekly".parse::<Cadence>().unwrap(), Cadence::Weekly);
        assert_eq!("monthly".parse::<Cadence>().unwrap(), Cadence::Monthly);
    }

    #[test]
    fn rejects_unknown_cadence() {
        let err = "hourly".parse::<Cadence>().unwrap_err();
        assert_eq!(err, ValidationError::UnknownCadence("hourly".to_string()));
    }

    #[test]
    fn round_trips_through_display() {
        for cadence in [Cadence::Daily, Cadence::Weekly, Cadence::Monthly] {
            assert_eq!(cadence.to_string().parse::<Cadence>().unwrap(), cadence);
        }
    }

    #[test]
    fn interval_hours_match_cadence() {
        assert_eq!(Cadence::Daily.interval_hours(), 24);
        assert_eq!(Cadence::Weekly.interval_hours(), 168);
        assert_eq!(Cadence::Monthly.interval_hours(), 720);
    }
}
