//! Player update, operator swap and spawn records.
//!
//! Each record addresses a player by dissect id. Records for ids the header
//! never introduced are ignored; spectated replays contain a handful of
//! them.

use log::debug;

use crate::binary::ByteReader;
use crate::error::Result;
use crate::header::DissectId;
use crate::operators::Operator;
use crate::round::Round;

fn read_dissect_id(reader: &mut ByteReader<'_>) -> Result<DissectId> {
    let bytes = reader.read_bytes(4)?;
    Ok(DissectId([bytes[0], bytes[1], bytes[2], bytes[3]]))
}

/// Parses a player-update record: dissect id plus the current operator
/// token.
///
/// # Errors
///
/// Returns `ParserError::UnexpectedEof` if the record is truncated.
pub fn parse_player_update(reader: &mut ByteReader<'_>, round: &mut Round) -> Result<()> {
    let id = read_dissect_id(reader)?;
    let token = reader.read_u64()?;
    apply_operator(round, id, token);
    Ok(())
}

/// Parses an operator-swap record; the payload matches a player update but
/// arrives when the pick changes during prep.
///
/// # Errors
///
/// Returns `ParserError::UnexpectedEof` if the record is truncated.
pub fn parse_operator_swap(reader: &mut ByteReader<'_>, round: &mut Round) -> Result<()> {
    let id = read_dissect_id(reader)?;
    let token = reader.read_u64()?;
    apply_operator(round, id, token);
    Ok(())
}

/// Parses a spawn record: dissect id plus the chosen spawn location name.
///
/// # Errors
///
/// Returns `ParserError::UnexpectedEof` or `ParserError::MalformedField` if
/// the record is truncated or the name is not a valid string.
pub fn parse_spawn(reader: &mut ByteReader<'_>, round: &mut Round) -> Result<()> {
    let id = read_dissect_id(reader)?;
    let spawn = reader.read_string()?;
    if let Some(index) = round.header.player_index_by_dissect_id(id) {
        round.header.players[index].spawn = Some(spawn);
    } else {
        debug!("spawn record for unknown dissect id {id}");
    }
    Ok(())
}

fn apply_operator(round: &mut Round, id: DissectId, token: u64) {
    if let Some(index) = round.header.player_index_by_dissect_id(id) {
        round.header.players[index].operator = Operator::from_id(token);
    } else {
        debug!("player record for unknown dissect id {id}");
    }
}
