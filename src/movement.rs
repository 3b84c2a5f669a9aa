//! Movement reconstruction from raw position packets.
//!
//! The position stream carries no reliable per-packet player identity: the
//! entity id rotates and the embedded player-id hint cross-contaminates in
//! more than half of the observed packets. Reconstruction therefore ignores
//! both and proceeds spatially: consecutive positions of one player are
//! close together, so a sweep in packet order grows tracks by
//! nearest-neighbor continuity, and tracks are matched to players
//! afterwards using meta-heuristics:
//!
//! - defenders move much more than attackers during the prep phase, which
//!   splits the track set into team groups, and
//! - a player who died early leaves a short track, which pairs dead players
//!   with tracks by death-time alignment inside each group.
//!
//! Packet numbers map linearly onto round time, so each emitted position
//! carries a reconstructed timestamp.

use serde::Serialize;

use crate::header::PlayerLoadout;
use crate::operators::{Operator, Side};
use crate::records::position::RawPosition;
use crate::round::Round;

/// Maximum 2-D distance between a position and a track's last position for
/// the position to join the track.
pub const TRACK_JOIN_DISTANCE: f32 = 1.8;
/// Minimum positions for a track to survive filtering.
pub const MIN_TRACK_POSITIONS: usize = 30;
/// Minimum XY bounding-box spread, on either axis, for a track to survive
/// filtering. Drops origin-anchored static entities.
pub const MIN_TRACK_SPREAD: f32 = 2.0;
/// Length of the preparation phase in seconds.
pub const PREP_PHASE_SECONDS: f32 = 45.0;
/// Length of the action-phase countdown in seconds.
pub const ACTION_PHASE_SECONDS: f32 = 180.0;
/// Assumed round length when the event feed is empty.
pub const DEFAULT_ROUND_SECONDS: f32 = 225.0;

/// One reconstructed position sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Position {
    /// Seconds since round start, derived linearly from the packet
    /// sequence.
    pub time_seconds: f32,
    /// World x.
    pub x: f32,
    /// World y.
    pub y: f32,
    /// World z.
    pub z: f32,
    /// View yaw in degrees, where the packet carried an orientation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub yaw: Option<f32>,
}

/// A reconstructed movement track attributed to a player.
#[derive(Debug, Clone, Serialize)]
pub struct PlayerMovement {
    /// Attributed player.
    pub username: String,
    /// The player's operator.
    pub operator: Operator,
    /// The player's team index.
    pub team_index: usize,
    /// The player's initial loadout, when captured.
    pub loadout: Option<PlayerLoadout>,
    /// Position samples in time order.
    pub positions: Vec<Position>,
}

/// A clustered track before player attribution.
#[derive(Debug)]
struct Track {
    positions: Vec<Position>,
    prep_movement: f32,
    end_time: f32,
}

impl Track {
    fn spread_ok(&self) -> bool {
        let (mut min_x, mut max_x) = (f32::INFINITY, f32::NEG_INFINITY);
        let (mut min_y, mut max_y) = (f32::INFINITY, f32::NEG_INFINITY);
        for p in &self.positions {
            min_x = min_x.min(p.x);
            max_x = max_x.max(p.x);
            min_y = min_y.min(p.y);
            max_y = max_y.max(p.y);
        }
        max_x - min_x >= MIN_TRACK_SPREAD || max_y - min_y >= MIN_TRACK_SPREAD
    }
}

/// Reconstructs per-player movement tracks from the round's captured
/// position packets.
///
/// Returns one entry per matched player; an empty vector when no positions
/// were captured. Never touches the experimental side-buffer.
#[must_use]
pub fn reconstruct_movement(round: &Round) -> Vec<PlayerMovement> {
    let mut packets: Vec<&RawPosition> = round.positions.iter().collect();
    if packets.is_empty() {
        return Vec::new();
    }
    packets.sort_by_key(|p| p.sequence);

    let total_seconds = round
        .min_event_countdown_seconds()
        .map_or(DEFAULT_ROUND_SECONDS, |min_countdown| {
            PREP_PHASE_SECONDS + (ACTION_PHASE_SECONDS - min_countdown)
        });

    let min_sequence = packets.first().map_or(0, |p| p.sequence);
    let max_sequence = packets.last().map_or(0, |p| p.sequence);
    let span = (max_sequence - min_sequence).max(1) as f32;
    let time_of = |sequence: usize| (sequence - min_sequence) as f32 / span * total_seconds;

    let mut tracks = cluster(&packets, time_of);

    // Largest tracks first; drop stubs and origin-anchored statics; at most
    // one track per player.
    tracks.sort_by(|a, b| b.positions.len().cmp(&a.positions.len()));
    tracks.retain(|t| t.positions.len() >= MIN_TRACK_POSITIONS && t.spread_ok());
    tracks.truncate(round.header.players.len());

    let defense_index = round
        .header
        .team_index_by_role(Side::Defense)
        .unwrap_or(1);
    let attack_index = 1 - defense_index;
    let defender_count = round
        .header
        .players
        .iter()
        .filter(|p| p.team_index == defense_index)
        .count();

    // Defenders cover more ground during prep; the highest prep-movement
    // tracks are theirs.
    tracks.sort_by(|a, b| {
        b.prep_movement
            .partial_cmp(&a.prep_movement)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    let attacker_tracks = tracks.split_off(defender_count.min(tracks.len()));
    let defender_tracks = tracks;

    let mut movements = match_group(round, defense_index, defender_tracks);
    movements.extend(match_group(round, attack_index, attacker_tracks));
    movements
}

/// Grows tracks by nearest-neighbor continuity over the packet sweep.
fn cluster(packets: &[&RawPosition], time_of: impl Fn(usize) -> f32) -> Vec<Track> {
    let mut tracks: Vec<Track> = Vec::new();

    for packet in packets {
        let position = Position {
            time_seconds: time_of(packet.sequence),
            x: packet.x,
            y: packet.y,
            z: packet.z,
            yaw: packet.yaw,
        };

        let nearest = tracks
            .iter_mut()
            .map(|track| {
                let last = track.positions.last().expect("tracks are never empty");
                let dx = last.x - position.x;
                let dy = last.y - position.y;
                (track, (dx * dx + dy * dy).sqrt())
            })
            .min_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        match nearest {
            Some((track, distance)) if distance <= TRACK_JOIN_DISTANCE => {
                let last = *track.positions.last().expect("tracks are never empty");
                if position.time_seconds < PREP_PHASE_SECONDS {
                    let dx = position.x - last.x;
                    let dy = position.y - last.y;
                    track.prep_movement += (dx * dx + dy * dy).sqrt();
                }
                track.end_time = position.time_seconds;
                track.positions.push(position);
            }
            _ => tracks.push(Track {
                end_time: position.time_seconds,
                positions: vec![position],
                prep_movement: 0.0,
            }),
        }
    }

    tracks
}

/// Matches one team's tracks to its players by death-time alignment.
fn match_group(round: &Round, team_index: usize, mut tracks: Vec<Track>) -> Vec<PlayerMovement> {
    let players: Vec<_> = round
        .header
        .players
        .iter()
        .filter(|p| p.team_index == team_index)
        .collect();

    // Earliest death first: a higher countdown value means an earlier death.
    let mut dead: Vec<(String, f32)> = round
        .death_times()
        .into_iter()
        .filter(|(name, _)| players.iter().any(|p| p.username == *name))
        .collect();
    dead.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

    // Shortest track first; the earliest death claims it.
    tracks.sort_by(|a, b| {
        a.end_time
            .partial_cmp(&b.end_time)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut movements = Vec::new();
    let mut tracks = tracks.into_iter();

    for (username, _) in &dead {
        let Some(track) = tracks.next() else {
            return movements;
        };
        if let Some(player) = players.iter().find(|p| p.username == *username) {
            movements.push(PlayerMovement {
                username: player.username.clone(),
                operator: player.operator,
                team_index: player.team_index,
                loadout: player.loadout,
                positions: track.positions,
            });
        }
    }

    // Survivors take what is left, longest first.
    let mut remaining: Vec<Track> = tracks.collect();
    remaining.sort_by(|a, b| {
        b.end_time
            .partial_cmp(&a.end_time)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    let survivors = players
        .iter()
        .filter(|p| !dead.iter().any(|(name, _)| *name == p.username));
    for (player, track) in survivors.zip(remaining) {
        movements.push(PlayerMovement {
            username: player.username.clone(),
            operator: player.operator,
            team_index: player.team_index,
            loadout: player.loadout,
            positions: track.positions,
        });
    }
    movements
}
