//! Time-tick record parsing.
//!
//! Ticks carry the countdown clock shown in game. The encoding changed with
//! Y7: legacy builds store a raw u32 of countdown seconds, Y7 and later
//! store a length-prefixed `M:SS` display string.

use crate::binary::ByteReader;
use crate::error::{ParserError, Result};
use crate::header::CODE_VERSION_Y7;
use crate::round::{Round, RoundClock};

/// Upper sanity bound for a countdown value, in seconds.
///
/// Prep plus action plus generous slack; anything larger is marker noise.
pub const MAX_COUNTDOWN_SECONDS: u32 = 3600;

/// Parses a time tick and updates the round clock.
///
/// # Errors
///
/// - `ParserError::MalformedField` if the clock value fails its sanity check
/// - `ParserError::UnexpectedEof` if the record is truncated
pub fn parse_time_tick(reader: &mut ByteReader<'_>, round: &mut Round) -> Result<()> {
    let clock = if round.header.is_at_least(CODE_VERSION_Y7) {
        let label = reader.read_string()?;
        let seconds = parse_clock_label(&label)?;
        RoundClock { label, seconds }
    } else {
        let raw = reader.read_u32()?;
        if raw > MAX_COUNTDOWN_SECONDS {
            return Err(ParserError::malformed(format!(
                "countdown {raw}s exceeds {MAX_COUNTDOWN_SECONDS}s"
            )));
        }
        RoundClock {
            label: format_clock(raw),
            seconds: raw as f32,
        }
    };
    round.clock = clock;
    Ok(())
}

/// Parses an `M:SS` display string into seconds.
///
/// # Errors
///
/// Returns `ParserError::MalformedField` if the string is not `M:SS`.
pub fn parse_clock_label(label: &str) -> Result<f32> {
    let (minutes, seconds) = label
        .split_once(':')
        .ok_or_else(|| ParserError::malformed(format!("clock label {label:?} is not M:SS")))?;
    let minutes: u32 = minutes
        .parse()
        .map_err(|_| ParserError::malformed(format!("clock minutes {minutes:?}")))?;
    let seconds: u32 = seconds
        .parse()
        .map_err(|_| ParserError::malformed(format!("clock seconds {seconds:?}")))?;
    if seconds >= 60 || minutes * 60 + seconds > MAX_COUNTDOWN_SECONDS {
        return Err(ParserError::malformed(format!(
            "clock label {label:?} out of range"
        )));
    }
    Ok((minutes * 60 + seconds) as f32)
}

/// Formats countdown seconds as the `M:SS` display string.
#[must_use]
pub fn format_clock(seconds: u32) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_clock_label() {
        assert!((parse_clock_label("2:47").unwrap() - 167.0).abs() < f32::EPSILON);
        assert!((parse_clock_label("0:00").unwrap()).abs() < f32::EPSILON);
        assert!((parse_clock_label("3:00").unwrap() - 180.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_parse_clock_label_rejects_garbage() {
        for bad in ["", "247", "2:72", "a:bc", "2:-7"] {
            assert!(
                matches!(
                    parse_clock_label(bad),
                    Err(ParserError::MalformedField { .. })
                ),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_format_clock() {
        assert_eq!(format_clock(167), "2:47");
        assert_eq!(format_clock(0), "0:00");
        assert_eq!(format_clock(60), "1:00");
        assert_eq!(format_clock(9), "0:09");
    }

    #[test]
    fn test_clock_label_roundtrip() {
        for s in [0u32, 9, 45, 60, 179, 180] {
            let label = format_clock(s);
            assert!((parse_clock_label(&label).unwrap() - s as f32).abs() < f32::EPSILON);
        }
    }
}
