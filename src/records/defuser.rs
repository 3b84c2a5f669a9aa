//! Defuser countdown timer records.
//!
//! While the defuser is planted the game emits its countdown as text. Empty
//! values are idle ticks and produce nothing; non-empty values are surfaced
//! as `Other` events carrying the timer text.

use crate::binary::ByteReader;
use crate::error::Result;
use crate::round::{EventKind, Round};

/// Parses a defuser-timer record.
///
/// # Errors
///
/// Returns `ParserError::UnexpectedEof` or `ParserError::MalformedField` on
/// a truncated or malformed record.
pub fn parse_defuser_timer(reader: &mut ByteReader<'_>, round: &mut Round) -> Result<()> {
    let value = reader.read_string()?;
    if !value.is_empty() {
        round.push_event(EventKind::Other, value, None, None);
    }
    Ok(())
}
