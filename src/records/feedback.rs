//! Match feedback records.
//!
//! The feedback feed is the in-game event ticker: kills, environmental
//! deaths, defuser plant/disable progress and the round-start objective
//! ping. Each record is a tagged variant; the sub-type byte selects the
//! payload.
//!
//! Kill attribution in the feed is not fully trustworthy: the feed
//! occasionally credits the wrong teammate. Each kill is therefore validated
//! against the pending scoreboard killer (see [`super::scoreboard`]); on a
//! mismatch the scoreboard-derived username replaces the feed's.

use log::debug;

use crate::binary::ByteReader;
use crate::error::{ParserError, Result};
use crate::round::{EventKind, MatchEvent, Round};

/// Feedback sub-type: kill.
pub const FEEDBACK_KILL: u8 = 0x00;
/// Feedback sub-type: environmental or self-inflicted death.
pub const FEEDBACK_DEATH: u8 = 0x01;
/// Feedback sub-type: defuser plant started.
pub const FEEDBACK_PLANT_START: u8 = 0x02;
/// Feedback sub-type: defuser plant completed.
pub const FEEDBACK_PLANT_COMPLETE: u8 = 0x03;
/// Feedback sub-type: defuser disable started.
pub const FEEDBACK_DISABLE_START: u8 = 0x04;
/// Feedback sub-type: defuser disable completed.
pub const FEEDBACK_DISABLE_COMPLETE: u8 = 0x05;
/// Feedback sub-type: round-start objective ping.
pub const FEEDBACK_LOCATE_OBJECTIVE: u8 = 0x06;

/// Upper bound on an opaque feedback blob.
const MAX_OTHER_PAYLOAD: u32 = 1024;

/// Parses one match feedback record and appends the event.
///
/// # Errors
///
/// - `ParserError::MalformedField` for an oversized opaque payload
/// - `ParserError::UnexpectedEof` if the record is truncated
pub fn parse_match_feedback(reader: &mut ByteReader<'_>, round: &mut Round) -> Result<()> {
    let sub_type = reader.read_u8()?;
    match sub_type {
        FEEDBACK_KILL => parse_kill(reader, round),
        FEEDBACK_DEATH => {
            let username = reader.read_string()?;
            round.push_event(EventKind::Death, username, None, None);
            Ok(())
        }
        FEEDBACK_PLANT_START => parse_defuser(reader, round, EventKind::DefuserPlantStart),
        FEEDBACK_PLANT_COMPLETE => parse_defuser(reader, round, EventKind::DefuserPlantComplete),
        FEEDBACK_DISABLE_START => parse_defuser(reader, round, EventKind::DefuserDisableStart),
        FEEDBACK_DISABLE_COMPLETE => {
            parse_defuser(reader, round, EventKind::DefuserDisableComplete)
        }
        FEEDBACK_LOCATE_OBJECTIVE => {
            round.push_event(EventKind::LocateObjective, String::new(), None, None);
            Ok(())
        }
        other => {
            // Opaque feed entry: length-prefixed blob we keep no model for.
            let len = reader.read_u32()?;
            if len > MAX_OTHER_PAYLOAD {
                return Err(ParserError::malformed(format!(
                    "feedback sub-type {other:#04x} payload of {len} bytes"
                )));
            }
            reader.skip(len as usize)?;
            debug!("opaque feedback sub-type {other:#04x}, {len} bytes");
            round.push_event(EventKind::Other, String::new(), None, None);
            Ok(())
        }
    }
}

fn parse_kill(reader: &mut ByteReader<'_>, round: &mut Round) -> Result<()> {
    let killer = reader.read_string()?;
    let target = reader.read_string()?;
    let headshot = reader.read_u8()? != 0;

    let mut event = MatchEvent {
        kind: EventKind::Kill,
        username: killer,
        target: Some(target),
        headshot: Some(headshot),
        time: round.clock.label.clone(),
        time_seconds: round.clock.seconds,
        killer_from_scoreboard: None,
    };

    if let Some(scoreboard_killer) = round.pending_scoreboard_kill.take() {
        if scoreboard_killer != event.username {
            debug!(
                "feed credited {:?}, scoreboard credited {scoreboard_killer:?}",
                event.username
            );
            event.username = scoreboard_killer.clone();
            event.killer_from_scoreboard = Some(scoreboard_killer);
        }
    }

    round.events.push(event);
    Ok(())
}

fn parse_defuser(reader: &mut ByteReader<'_>, round: &mut Round, kind: EventKind) -> Result<()> {
    let username = reader.read_string()?;
    round.push_event(kind, username, None, None);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::Header;

    fn push_entry(buf: &mut Vec<u8>, key: &str, value: &str) {
        for s in [key, value] {
            buf.extend_from_slice(&u32::try_from(s.len()).unwrap().to_le_bytes());
            buf.extend_from_slice(s.as_bytes());
        }
    }

    fn push_string(buf: &mut Vec<u8>, s: &str) {
        buf.extend_from_slice(&u32::try_from(s.len()).unwrap().to_le_bytes());
        buf.extend_from_slice(s.as_bytes());
    }

    fn test_round() -> Round {
        let mut buf = Vec::new();
        push_entry(&mut buf, "version", "Y9S4");
        push_entry(&mut buf, "playerid", "alpha");
        push_entry(&mut buf, "playerid", "bravo");
        push_entry(&mut buf, "end", "");
        let mut reader = ByteReader::new(&buf);
        Round::new(Header::parse(&mut reader).unwrap())
    }

    #[test]
    fn test_kill_event() {
        let mut round = test_round();
        let mut body = vec![FEEDBACK_KILL];
        push_string(&mut body, "alpha");
        push_string(&mut body, "bravo");
        body.push(0x01);
        parse_match_feedback(&mut ByteReader::new(&body), &mut round).unwrap();

        let event = &round.events[0];
        assert_eq!(event.kind, EventKind::Kill);
        assert_eq!(event.username, "alpha");
        assert_eq!(event.target.as_deref(), Some("bravo"));
        assert_eq!(event.headshot, Some(true));
        assert!(event.killer_from_scoreboard.is_none());
    }

    #[test]
    fn test_kill_overridden_by_scoreboard() {
        let mut round = test_round();
        round.pending_scoreboard_kill = Some("bravo".to_string());

        let mut body = vec![FEEDBACK_KILL];
        push_string(&mut body, "alpha");
        push_string(&mut body, "victim");
        body.push(0x00);
        parse_match_feedback(&mut ByteReader::new(&body), &mut round).unwrap();

        let event = &round.events[0];
        assert_eq!(event.username, "bravo");
        assert_eq!(event.killer_from_scoreboard.as_deref(), Some("bravo"));
        // Pending killer is consumed.
        assert!(round.pending_scoreboard_kill.is_none());
    }

    #[test]
    fn test_kill_matching_scoreboard_keeps_feed_username() {
        let mut round = test_round();
        round.pending_scoreboard_kill = Some("alpha".to_string());

        let mut body = vec![FEEDBACK_KILL];
        push_string(&mut body, "alpha");
        push_string(&mut body, "bravo");
        body.push(0x00);
        parse_match_feedback(&mut ByteReader::new(&body), &mut round).unwrap();

        assert_eq!(round.events[0].username, "alpha");
        assert!(round.events[0].killer_from_scoreboard.is_none());
    }

    #[test]
    fn test_defuser_events() {
        let mut round = test_round();
        for (tag, kind) in [
            (FEEDBACK_PLANT_START, EventKind::DefuserPlantStart),
            (FEEDBACK_PLANT_COMPLETE, EventKind::DefuserPlantComplete),
            (FEEDBACK_DISABLE_START, EventKind::DefuserDisableStart),
            (FEEDBACK_DISABLE_COMPLETE, EventKind::DefuserDisableComplete),
        ] {
            let mut body = vec![tag];
            push_string(&mut body, "alpha");
            parse_match_feedback(&mut ByteReader::new(&body), &mut round).unwrap();
            assert_eq!(round.events.last().unwrap().kind, kind);
            assert_eq!(round.events.last().unwrap().username, "alpha");
        }
    }

    #[test]
    fn test_opaque_sub_type_skipped() {
        let mut round = test_round();
        let mut body = vec![0x42];
        body.extend_from_slice(&3u32.to_le_bytes());
        body.extend_from_slice(&[0xAA, 0xBB, 0xCC]);
        let mut reader = ByteReader::new(&body);
        parse_match_feedback(&mut reader, &mut round).unwrap();

        assert_eq!(round.events[0].kind, EventKind::Other);
        assert!(reader.is_empty());
    }

    #[test]
    fn test_oversized_opaque_payload_rejected() {
        let mut round = test_round();
        let mut body = vec![0x42];
        body.extend_from_slice(&100_000u32.to_le_bytes());
        assert!(matches!(
            parse_match_feedback(&mut ByteReader::new(&body), &mut round),
            Err(ParserError::MalformedField { .. })
        ));
    }
}
