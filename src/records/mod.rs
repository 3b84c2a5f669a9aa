//! Record parsing for the decompressed replay body.
//!
//! The body carries no length framing: records are located by
//! content-addressed byte markers, and each record occupies exactly as many
//! bytes as its parser consumes. The dispatcher scans the body byte by byte
//! against the marker table; on a match it advances past the marker and
//! invokes the parser for that record kind with the reader positioned
//! immediately after the marker. Unmatched bytes advance the scan by one;
//! that is also how the scan resynchronizes after unknown content.
//!
//! Recoverable errors (a malformed record) are logged with offset context
//! and scanning continues. A reader underflow inside a parser means the body
//! was truncated mid-record; the scan terminates cleanly and the round-end
//! resolver still runs on whatever was collected.
//!
//! # Record kinds
//!
//! - [`time`] - countdown clock ticks
//! - [`player_update`] - player update, operator swap, spawn location
//! - [`scoreboard`] - kills/assists/score deltas and team scores
//! - [`feedback`] - the match feedback feed (kills, defuser events)
//! - [`defuser`] - the defuser countdown timer
//! - [`ammo`] - ammunition snapshots and entity classification
//! - [`position`] - raw position packets for movement reconstruction

pub mod ammo;
pub mod defuser;
pub mod feedback;
pub mod player_update;
pub mod position;
pub mod scoreboard;
pub mod time;

use log::{debug, warn};

use crate::binary::ByteReader;
use crate::error::{ParserError, Result};
use crate::round::Round;
use crate::ParseOptions;

/// Marker for time-tick records.
pub const TIME_TICK_MARKER: &[u8] = &[0x28, 0x5C, 0x70, 0xF3];
/// Marker for player-update records.
pub const PLAYER_UPDATE_MARKER: &[u8] = &[0x22, 0xA9, 0x26, 0x0B];
/// Marker for operator-swap records.
pub const OPERATOR_SWAP_MARKER: &[u8] = &[0x4E, 0x73, 0xBB, 0x8A];
/// Marker for spawn records.
pub const SPAWN_MARKER: &[u8] = &[0xAF, 0x98, 0x99, 0xCA];
/// Marker for scoreboard score records.
pub const SCOREBOARD_SCORE_MARKER: &[u8] = &[0x9D, 0x5D, 0x1F, 0x4B];
/// Marker for scoreboard kill records.
pub const SCOREBOARD_KILLS_MARKER: &[u8] = &[0xC9, 0xD4, 0x7A, 0x71];
/// Marker for scoreboard assist records.
pub const SCOREBOARD_ASSISTS_MARKER: &[u8] = &[0xA3, 0x61, 0xC4, 0x0E];
/// Marker for team-score records.
pub const TEAM_SCORE_MARKER: &[u8] = &[0x6E, 0x7F, 0x9A, 0x14];
/// Marker for match-feedback records.
pub const MATCH_FEEDBACK_MARKER: &[u8] = &[0x59, 0x34, 0xE5, 0x8B, 0x04];
/// Marker for defuser-timer records.
pub const DEFUSER_TIMER_MARKER: &[u8] = &[0xF4, 0x19, 0x6B, 0x62];
/// Marker for ammunition snapshots.
pub const AMMO_MARKER: &[u8] = &[0x77, 0xCA, 0x96, 0xDE];
/// Marker for position packets.
pub const POSITION_MARKER: &[u8] = &[0x00, 0x00, 0x60, 0x73, 0x85, 0xFE];

/// The record kinds the dispatcher knows how to route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    /// Countdown clock tick.
    TimeTick,
    /// Player record update.
    PlayerUpdate,
    /// Operator swap.
    OperatorSwap,
    /// Spawn location selection.
    Spawn,
    /// Scoreboard score value.
    ScoreboardScore,
    /// Scoreboard kill total.
    ScoreboardKills,
    /// Scoreboard assist total.
    ScoreboardAssists,
    /// Team score update.
    TeamScore,
    /// Match feedback feed entry.
    MatchFeedback,
    /// Defuser countdown timer.
    DefuserTimer,
    /// Ammunition snapshot.
    AmmoSnapshot,
    /// Raw position packet.
    PositionPacket,
}

/// The registered markers, in registration order.
///
/// The scan checks them in this order; when two registered markers would
/// match at the same offset the longest one wins.
pub const MARKER_TABLE: &[(&[u8], RecordKind)] = &[
    (TIME_TICK_MARKER, RecordKind::TimeTick),
    (PLAYER_UPDATE_MARKER, RecordKind::PlayerUpdate),
    (OPERATOR_SWAP_MARKER, RecordKind::OperatorSwap),
    (SPAWN_MARKER, RecordKind::Spawn),
    (SCOREBOARD_SCORE_MARKER, RecordKind::ScoreboardScore),
    (SCOREBOARD_KILLS_MARKER, RecordKind::ScoreboardKills),
    (SCOREBOARD_ASSISTS_MARKER, RecordKind::ScoreboardAssists),
    (TEAM_SCORE_MARKER, RecordKind::TeamScore),
    (MATCH_FEEDBACK_MARKER, RecordKind::MatchFeedback),
    (DEFUSER_TIMER_MARKER, RecordKind::DefuserTimer),
    (AMMO_MARKER, RecordKind::AmmoSnapshot),
    (POSITION_MARKER, RecordKind::PositionPacket),
];

/// Scans the body for registered markers, dispatching each match to its
/// record parser.
///
/// The reader must be positioned at the first body byte (immediately after
/// the header terminator). Returns once the body is exhausted or a parser
/// hits end-of-data mid-record; collected state stays on the round either
/// way.
///
/// # Errors
///
/// Only genuinely terminal conditions (I/O, decompression) propagate;
/// neither occurs on an in-memory body, so the current implementation
/// always returns `Ok`.
pub fn scan_body(
    reader: &mut ByteReader<'_>,
    round: &mut Round,
    options: &ParseOptions,
) -> Result<()> {
    let data = reader.data();

    while !reader.is_empty() {
        let offset = reader.offset();
        let rest = &data[offset..];

        let mut matched: Option<(&[u8], RecordKind)> = None;
        for (marker, kind) in MARKER_TABLE {
            if rest.starts_with(marker)
                && matched.is_none_or(|(best, _): (&[u8], _)| marker.len() > best.len())
            {
                matched = Some((*marker, *kind));
            }
        }

        let Some((marker, kind)) = matched else {
            reader.skip(1)?;
            continue;
        };

        reader.skip(marker.len())?;
        match dispatch(kind, reader, round, options, offset) {
            Ok(()) => {}
            Err(e) if e.is_recoverable() => {
                warn!("skipping {kind:?} record at offset {offset}: {e}");
            }
            Err(ParserError::UnexpectedEof {
                expected,
                available,
            }) => {
                debug!(
                    "body truncated inside {kind:?} record at offset {offset} \
                     (wanted {expected}, had {available}); ending scan"
                );
                break;
            }
            Err(e) => return Err(e),
        }
    }

    Ok(())
}

/// Routes one matched marker to its record parser.
///
/// `marker_offset` is the offset the marker itself was found at; the ammo
/// and position parsers use it to reach the entity id bytes that precede
/// their markers.
fn dispatch(
    kind: RecordKind,
    reader: &mut ByteReader<'_>,
    round: &mut Round,
    options: &ParseOptions,
    marker_offset: usize,
) -> Result<()> {
    match kind {
        RecordKind::TimeTick => time::parse_time_tick(reader, round),
        RecordKind::PlayerUpdate => player_update::parse_player_update(reader, round),
        RecordKind::OperatorSwap => player_update::parse_operator_swap(reader, round),
        RecordKind::Spawn => player_update::parse_spawn(reader, round),
        RecordKind::ScoreboardScore => scoreboard::parse_score(reader, round),
        RecordKind::ScoreboardKills => scoreboard::parse_kills(reader, round),
        RecordKind::ScoreboardAssists => scoreboard::parse_assists(reader, round),
        RecordKind::TeamScore => scoreboard::parse_team_score(reader, round),
        RecordKind::MatchFeedback => feedback::parse_match_feedback(reader, round),
        RecordKind::DefuserTimer => defuser::parse_defuser_timer(reader, round),
        RecordKind::AmmoSnapshot => ammo::parse_ammo_snapshot(reader, round, marker_offset),
        RecordKind::PositionPacket => {
            position::parse_position_packet(reader, round, options, marker_offset)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binary::ByteReader;
    use crate::header::Header;
    use crate::round::EventKind;

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
        push_entry(&mut buf, "codeversion", "7930400");
        push_entry(&mut buf, "playerid", "alpha");
        push_entry(&mut buf, "teamindex", "0");
        push_entry(&mut buf, "playerid", "bravo");
        push_entry(&mut buf, "teamindex", "1");
        push_entry(&mut buf, "end", "");
        let mut reader = ByteReader::new(&buf);
        Round::new(Header::parse(&mut reader).unwrap())
    }

    #[test]
    fn test_scan_skips_noise_and_dispatches() {
        let mut body = vec![0xEE; 13]; // leading noise
        body.extend_from_slice(TIME_TICK_MARKER);
        push_string(&mut body, "2:47");
        body.extend_from_slice(&[0x00; 7]); // trailing noise

        let mut round = test_round();
        let mut reader = ByteReader::new(&body);
        scan_body(&mut reader, &mut round, &ParseOptions::default()).unwrap();

        assert_eq!(round.clock.label, "2:47");
        assert!((round.clock.seconds - 167.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_scan_recovers_after_malformed_record() {
        let mut body = Vec::new();
        // A feedback record with an unknown sub-type and a bogus blob length
        // is recoverable; the kill afterwards must still parse.
        body.extend_from_slice(MATCH_FEEDBACK_MARKER);
        body.push(0xEE);
        body.extend_from_slice(&9999u32.to_le_bytes());
        body.extend_from_slice(&[0xAB; 8]);
        body.extend_from_slice(MATCH_FEEDBACK_MARKER);
        body.push(0x00); // kill
        push_string(&mut body, "alpha");
        push_string(&mut body, "bravo");
        body.push(0x01);

        let mut round = test_round();
        let mut reader = ByteReader::new(&body);
        scan_body(&mut reader, &mut round, &ParseOptions::default()).unwrap();

        let kills: Vec<_> = round
            .events
            .iter()
            .filter(|e| e.kind == EventKind::Kill)
            .collect();
        assert_eq!(kills.len(), 1);
        assert_eq!(kills[0].username, "alpha");
    }

    #[test]
    fn test_scan_terminates_cleanly_on_truncated_record() {
        let mut body = Vec::new();
        body.extend_from_slice(MATCH_FEEDBACK_MARKER);
        body.push(0x00); // kill
        push_string(&mut body, "alpha");
        // Target string cut off mid-payload.
        body.extend_from_slice(&20u32.to_le_bytes());
        body.extend_from_slice(b"brav");

        let mut round = test_round();
        let mut reader = ByteReader::new(&body);
        // Truncation ends the scan without an error.
        scan_body(&mut reader, &mut round, &ParseOptions::default()).unwrap();
        assert!(round.events.is_empty());
    }

    #[test]
    fn test_events_keep_stream_order() {
        let mut body = Vec::new();
        body.extend_from_slice(MATCH_FEEDBACK_MARKER);
        body.push(0x06); // locate objective
        body.extend_from_slice(MATCH_FEEDBACK_MARKER);
        body.push(0x01); // death
        push_string(&mut body, "alpha");

        let mut round = test_round();
        let mut reader = ByteReader::new(&body);
        scan_body(&mut reader, &mut round, &ParseOptions::default()).unwrap();

        assert_eq!(round.events.len(), 2);
        assert_eq!(round.events[0].kind, EventKind::LocateObjective);
        assert_eq!(round.events[1].kind, EventKind::Death);
    }

    #[test]
    fn test_marker_table_has_no_duplicate_markers() {
        for (i, (a, _)) in MARKER_TABLE.iter().enumerate() {
            for (b, _) in &MARKER_TABLE[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }
}
