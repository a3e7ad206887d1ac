use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uom::si::{f64::Time, time::second};

/// Placeholder shown in the lap table for laps without a recorded time.
pub const MISSING_LAP_TIME: &str = "N/A";

pub fn from_seconds(seconds: f64) -> Time {
    Time::new::<second>(seconds)
}

pub fn to_seconds(lap_time: &Time) -> f64 {
    lap_time.get::<second>()
}

/// Formats a lap time as seconds with up to three decimals, trimming trailing zeros.
pub fn format_lap_time(lap_time: Option<&Time>) -> String {
    match lap_time {
        Some(t) => {
            let text = format!("{:.3}", to_seconds(t));
            text.trim_end_matches('0').trim_end_matches('.').to_string()
        }
        None => MISSING_LAP_TIME.to_string(),
    }
}

/// Serializes an optional lap time as floating point seconds.
pub mod optional_seconds {
    use super::*;

    pub fn serialize<S: Serializer>(value: &Option<Time>, serializer: S) -> Result<S::Ok, S::Error> {
        value.as_ref().map(to_seconds).serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Time>, D::Error> {
        Ok(Option::<f64>::deserialize(deserializer)?
            .filter(|s| s.is_finite())
            .map(from_seconds))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_trims_trailing_zeros() {
        assert_eq!(format_lap_time(Some(&from_seconds(92.5))), "92.5");
        assert_eq!(format_lap_time(Some(&from_seconds(91.8))), "91.8");
        assert_eq!(format_lap_time(Some(&from_seconds(90.0))), "90");
        assert_eq!(format_lap_time(Some(&from_seconds(83.456))), "83.456");
    }

    #[test]
    fn test_format_rounds_to_milliseconds() {
        assert_eq!(format_lap_time(Some(&from_seconds(81.23449))), "81.234");
    }

    #[test]
    fn test_format_missing_lap_time() {
        assert_eq!(format_lap_time(None), MISSING_LAP_TIME);
    }

    #[test]
    fn test_seconds_conversion_is_lossless() {
        assert_eq!(to_seconds(&from_seconds(92.5)), 92.5);
    }
}
