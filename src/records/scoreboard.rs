//! Scoreboard records.
//!
//! The scoreboard feed carries per-player score, kill and assist totals plus
//! team score updates. Totals are applied directly to the player records.
//!
//! Kill totals double as the ground truth for kill attribution: when a
//! player's total increments, that player is remembered as the pending
//! scoreboard killer, and the next feedback kill is validated against it
//! (see [`super::feedback`]).

use log::debug;

use crate::binary::ByteReader;
use crate::error::{ParserError, Result};
use crate::round::Round;

/// Parses a scoreboard score record: username plus score value.
///
/// # Errors
///
/// Returns `ParserError::UnexpectedEof` or `ParserError::MalformedField` on
/// a truncated or malformed record.
pub fn parse_score(reader: &mut ByteReader<'_>, round: &mut Round) -> Result<()> {
    let username = reader.read_string()?;
    let score = reader.read_u32()?;
    if let Some(player) = player_mut(round, &username) {
        player.score = score;
    }
    Ok(())
}

/// Parses a scoreboard kill record: username plus kill total.
///
/// An incremented total marks the username as the pending scoreboard killer
/// for feedback-kill validation.
///
/// # Errors
///
/// Returns `ParserError::UnexpectedEof` or `ParserError::MalformedField` on
/// a truncated or malformed record.
pub fn parse_kills(reader: &mut ByteReader<'_>, round: &mut Round) -> Result<()> {
    let username = reader.read_string()?;
    let kills = reader.read_u32()?;
    let incremented = round
        .header
        .player_by_username(&username)
        .is_some_and(|p| kills > p.kills);
    if let Some(player) = player_mut(round, &username) {
        player.kills = kills;
    }
    if incremented {
        round.pending_scoreboard_kill = Some(username);
    }
    Ok(())
}

/// Parses a scoreboard assist record: username plus assist total.
///
/// # Errors
///
/// Returns `ParserError::UnexpectedEof` or `ParserError::MalformedField` on
/// a truncated or malformed record.
pub fn parse_assists(reader: &mut ByteReader<'_>, round: &mut Round) -> Result<()> {
    let username = reader.read_string()?;
    let assists = reader.read_u32()?;
    if let Some(player) = player_mut(round, &username) {
        player.assists = assists;
    }
    Ok(())
}

/// Parses a team-score record: team index plus final score.
///
/// On Y9S4+ builds the recorded final scores drive round-end resolution.
///
/// # Errors
///
/// Returns `ParserError::MalformedField` for a team index outside `{0, 1}`
/// and `ParserError::UnexpectedEof` on truncation.
pub fn parse_team_score(reader: &mut ByteReader<'_>, round: &mut Round) -> Result<()> {
    let index = reader.read_u8()? as usize;
    let score = reader.read_u32()?;
    if index > 1 {
        return Err(ParserError::malformed(format!(
            "team index {index} not in {{0,1}}"
        )));
    }
    round.header.teams[index].score = score;
    Ok(())
}

fn player_mut<'r>(
    round: &'r mut Round,
    username: &str,
) -> Option<&'r mut crate::header::Player> {
    let found = round
        .header
        .players
        .iter_mut()
        .find(|p| p.username == username);
    if found.is_none() {
        debug!("scoreboard record for unknown player {username:?}");
    }
    found
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
        push_entry(&mut buf, "end", "");
        let mut reader = ByteReader::new(&buf);
        Round::new(Header::parse(&mut reader).unwrap())
    }

    #[test]
    fn test_score_applied() {
        let mut round = test_round();
        let mut body = Vec::new();
        push_string(&mut body, "alpha");
        body.extend_from_slice(&1350u32.to_le_bytes());
        parse_score(&mut ByteReader::new(&body), &mut round).unwrap();
        assert_eq!(round.header.players[0].score, 1350);
    }

    #[test]
    fn test_kill_increment_sets_pending_killer() {
        let mut round = test_round();
        let mut body = Vec::new();
        push_string(&mut body, "alpha");
        body.extend_from_slice(&1u32.to_le_bytes());
        parse_kills(&mut ByteReader::new(&body), &mut round).unwrap();

        assert_eq!(round.header.players[0].kills, 1);
        assert_eq!(round.pending_scoreboard_kill.as_deref(), Some("alpha"));
    }

    #[test]
    fn test_kill_total_without_increment_leaves_pending_clear() {
        let mut round = test_round();
        round.header.players[0].kills = 2;
        let mut body = Vec::new();
        push_string(&mut body, "alpha");
        body.extend_from_slice(&2u32.to_le_bytes());
        parse_kills(&mut ByteReader::new(&body), &mut round).unwrap();
        assert!(round.pending_scoreboard_kill.is_none());
    }

    #[test]
    fn test_unknown_player_is_ignored() {
        let mut round = test_round();
        let mut body = Vec::new();
        push_string(&mut body, "ghost");
        body.extend_from_slice(&7u32.to_le_bytes());
        parse_assists(&mut ByteReader::new(&body), &mut round).unwrap();
        assert_eq!(round.header.players[0].assists, 0);
    }

    #[test]
    fn test_team_score_record() {
        let mut round = test_round();
        let mut body = vec![0x01];
        body.extend_from_slice(&3u32.to_le_bytes());
        parse_team_score(&mut ByteReader::new(&body), &mut round).unwrap();
        assert_eq!(round.header.teams[1].score, 3);
    }

    #[test]
    fn test_team_score_bad_index() {
        let mut round = test_round();
        let mut body = vec![0x05];
        body.extend_from_slice(&3u32.to_le_bytes());
        assert!(matches!(
            parse_team_score(&mut ByteReader::new(&body), &mut round),
            Err(ParserError::MalformedField { .. })
        ));
    }
}
