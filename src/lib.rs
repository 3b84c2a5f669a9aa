//! # rec-parser
//!
//! A comprehensive Rainbow Six Siege match replay (.rec) parser library.
//!
//! This library turns the zstandard-compressed round recordings the game
//! client produces into structured match data:
//!
//! - header metadata (map, players, teams, operators, game settings)
//! - a time-ordered event feed (kills, defuser events, scoreboard updates)
//! - per-player ammunition snapshots with initial loadouts
//! - optional per-player movement tracks reconstructed from raw position
//!   packets
//!
//! ## Quick Start
//!
//! ```no_run
//! use rec_parser::{parse_round, ParseOptions};
//!
//! fn dump_round(data: &[u8]) -> rec_parser::Result<()> {
//!     let round = parse_round(data, &ParseOptions::default())?;
//!
//!     println!("Map: {}", round.header.map);
//!     for team in &round.header.teams {
//!         println!("{}: won={} ({:?})", team.name, team.won, team.win_condition);
//!     }
//!     for event in &round.events {
//!         println!("[{}] {:?} {}", event.time, event.kind, event.username);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Module Overview
//!
//! - [`error`] - Error types and result alias for parser operations
//! - [`format`] - Legacy vs chunked compression detection
//! - [`decompress`] - Zstandard decompression into one logical byte stream
//! - [`binary`] - The bounds-checked byte reader over the decompressed body
//! - [`header`] - Key/value header parsing (teams, players, version gates)
//! - [`maps`] / [`operators`] - Known-id tables with `Unknown` degradation
//! - [`records`] - Marker dispatch and the per-record parsers
//! - [`round`] - The round document and round-end resolution
//! - [`movement`] - Spatial track reconstruction and player matching
//!
//! ## Format Reference
//!
//! The .rec format is undocumented; field layouts in this crate were
//! recovered empirically and vary across game versions. Records inside the
//! decompressed body are located by content-addressed byte markers rather
//! than length-prefixed framing, so the parser resynchronizes after unknown
//! content and tolerates noise. All multi-byte integers are little-endian.

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::cast_precision_loss)]

pub mod binary;
pub mod decompress;
pub mod error;
pub mod format;
pub mod header;
pub mod maps;
pub mod movement;
pub mod operators;
pub mod records;
pub mod round;

// Re-export commonly used types at the crate root
pub use binary::ByteReader;
pub use decompress::decompress_body;
pub use error::{ParserError, Result};
pub use format::{detect_body_format, BodyFormat};
pub use header::{
    DissectId, GameMode, Header, LoadoutSlot, MatchType, Player, PlayerLoadout, Team,
    WinCondition, CODE_VERSION_Y7, CODE_VERSION_Y9S4,
};
pub use maps::Map;
pub use movement::{reconstruct_movement, PlayerMovement, Position};
pub use operators::{Operator, Side};
pub use records::scan_body;
pub use round::{AmmoUpdate, EventKind, MatchEvent, PlayerRoundStats, Round};

/// Options controlling what the body scan captures.
///
/// Position capture is off by default because a round easily carries
/// hundreds of thousands of position packets.
#[derive(Debug, Clone, Copy, Default)]
pub struct ParseOptions {
    /// Capture position packets and reconstruct per-player movement.
    pub track_movement: bool,
    /// Keep every Nth position packet; 0 or 1 keeps all.
    pub movement_sample_rate: u32,
    /// Capture position packets with non-standard sub-types into the
    /// experimental side-buffer.
    pub experimental_types: bool,
}

/// Parses one .rec round recording into a finalized round document.
///
/// This is the top-level operation: decompress, parse the header, scan the
/// body, resolve the round end, and (when enabled) reconstruct movement.
/// Loadouts are populated on the player records as ammo snapshots are
/// classified during the scan.
///
/// # Errors
///
/// - `ParserError::DecompressionError` on a corrupt zstandard body
/// - `ParserError::InvalidHeader` / `ParserError::UnexpectedEof` when the
///   header section is malformed or truncated
///
/// A truncated record *body* is not an error: the scan ends cleanly and the
/// round resolves from whatever was collected.
pub fn parse_round(data: &[u8], options: &ParseOptions) -> Result<Round> {
    let body = decompress_body(data)?;
    let mut reader = ByteReader::new(&body);

    let header = Header::parse(&mut reader)?;
    let mut round = Round::new(header);

    scan_body(&mut reader, &mut round, options)?;
    round.resolve_round_end();

    if options.track_movement {
        let movement = reconstruct_movement(&round);
        round.movement = movement;
    }
    Ok(round)
}
