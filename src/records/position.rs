//! Position packet capture.
//!
//! Position packets carry three f32 world coordinates plus a trailer whose
//! layout depends on a 2-byte sub-type. The 4 bytes before the marker hold
//! an entity id, but it rotates frequently and is not a stable player
//! handle; likewise the per-packet player-id hint cross-contaminates badly.
//! Both are captured as debugging aids only; attribution happens spatially
//! in [`crate::movement`].
//!
//! Capture is off by default (`track_movement`) since a round easily
//! carries six-figure packet counts. Non-standard sub-types can be diverted
//! into a side buffer (`experimental_types`) for format analysis; that path
//! never affects the primary movement output.

use log::debug;
use serde::Serialize;

use crate::binary::ByteReader;
use crate::error::Result;
use crate::round::Round;
use crate::ParseOptions;

/// Sub-type with an 8-byte trailer (hint only).
pub const SUB_TYPE_SHORT_A: u16 = 0x01;
/// Sub-type with an 8-byte trailer (hint only).
pub const SUB_TYPE_SHORT_B: u16 = 0x02;
/// Sub-type with a 62-byte trailer carrying the hint and an orientation
/// quaternion.
pub const SUB_TYPE_ORIENTED: u16 = 0x03;

/// Player-id hints outside `5..=14` are noise.
const HINT_RANGE: std::ops::RangeInclusive<u32> = 5..=14;

/// Largest plausible |x| or |y| world coordinate.
pub const MAX_COORD_XY: f32 = 100.0;
/// Plausible z range (floors below ground to roof height).
pub const COORD_Z_RANGE: std::ops::RangeInclusive<f32> = -10.0..=50.0;

/// One captured position packet, in packet-stream order.
#[derive(Debug, Clone, Copy)]
pub struct RawPosition {
    /// Position-packet sequence number within the round.
    pub sequence: usize,
    /// Entity id found before the marker; unreliable.
    pub entity_id: u32,
    /// Record sub-type.
    pub sub_type: u16,
    /// World x.
    pub x: f32,
    /// World y.
    pub y: f32,
    /// World z.
    pub z: f32,
    /// View yaw in degrees, sub-type 3 only.
    pub yaw: Option<f32>,
    /// Player-id hint mapped to a header player index; unreliable.
    pub hint: Option<usize>,
}

/// A position packet with a non-standard sub-type, kept for analysis.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ExperimentalPacket {
    /// Position-packet sequence number within the round.
    pub sequence: usize,
    /// The unrecognized sub-type.
    pub sub_type: u16,
    /// Entity id found before the marker.
    pub entity_id: u32,
    /// World x.
    pub x: f32,
    /// World y.
    pub y: f32,
    /// World z.
    pub z: f32,
}

/// Parses one position packet.
///
/// # Errors
///
/// Returns `ParserError::UnexpectedEof` if the packet is truncated.
pub fn parse_position_packet(
    reader: &mut ByteReader<'_>,
    round: &mut Round,
    options: &ParseOptions,
    marker_offset: usize,
) -> Result<()> {
    if !options.track_movement && !options.experimental_types {
        return Ok(());
    }

    let entity_id = reader
        .peek_back(10)
        .map(|w| u32::from_le_bytes([w[0], w[1], w[2], w[3]]))
        .unwrap_or(0);

    let sub_type = reader.read_u16()?;
    let x = reader.read_f32()?;
    let y = reader.read_f32()?;
    let z = reader.read_f32()?;

    round.position_packets_seen += 1;
    let sequence = round.position_packets_seen;

    let (hint, yaw) = match sub_type {
        SUB_TYPE_ORIENTED => {
            let trailer = reader.read_bytes(62)?;
            let hint = read_hint(&trailer[20..24]);
            let yaw = quaternion_yaw(
                f32::from_le_bytes([trailer[46], trailer[47], trailer[48], trailer[49]]),
                f32::from_le_bytes([trailer[50], trailer[51], trailer[52], trailer[53]]),
                f32::from_le_bytes([trailer[54], trailer[55], trailer[56], trailer[57]]),
                f32::from_le_bytes([trailer[58], trailer[59], trailer[60], trailer[61]]),
            );
            (hint, Some(yaw))
        }
        SUB_TYPE_SHORT_A | SUB_TYPE_SHORT_B => {
            let trailer = reader.read_bytes(8)?;
            (read_hint(&trailer[4..8]), None)
        }
        other => {
            if options.experimental_types {
                round.experimental_packets.push(ExperimentalPacket {
                    sequence,
                    sub_type: other,
                    entity_id,
                    x,
                    y,
                    z,
                });
            } else {
                debug!("position packet at {marker_offset} with sub-type {other:#06x}");
            }
            return Ok(());
        }
    };

    if !options.track_movement {
        return Ok(());
    }

    let rate = options.movement_sample_rate as usize;
    if rate > 1 && sequence % rate != 0 {
        return Ok(());
    }

    if !coordinates_plausible(x, y, z) {
        return Ok(());
    }

    round.positions.push(RawPosition {
        sequence,
        entity_id,
        sub_type,
        x,
        y,
        z,
        yaw,
        hint,
    });
    Ok(())
}

fn read_hint(bytes: &[u8]) -> Option<usize> {
    let raw = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
    HINT_RANGE
        .contains(&raw)
        .then(|| (raw - HINT_RANGE.start()) as usize)
}

/// Whether a coordinate triple is inside the playable envelope.
#[must_use]
pub fn coordinates_plausible(x: f32, y: f32, z: f32) -> bool {
    x.is_finite()
        && y.is_finite()
        && z.is_finite()
        && x.abs() <= MAX_COORD_XY
        && y.abs() <= MAX_COORD_XY
        && COORD_Z_RANGE.contains(&z)
}

/// Derives view yaw in degrees from an orientation quaternion.
///
/// Non-finite components yield 0.
#[must_use]
pub fn quaternion_yaw(x: f32, y: f32, z: f32, w: f32) -> f32 {
    if !(x.is_finite() && y.is_finite() && z.is_finite() && w.is_finite()) {
        return 0.0;
    }
    let siny_cosp = 2.0 * (w * z + x * y);
    let cosy_cosp = 1.0 - 2.0 * (y * y + z * z);
    siny_cosp.atan2(cosy_cosp).to_degrees()
}
