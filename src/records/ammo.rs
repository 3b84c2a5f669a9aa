//! Ammunition snapshot records and entity classification.
//!
//! Ammo packets carry neither player nor weapon identity. Each packet names
//! a 4-byte *entity id* (one weapon or ability slot, unique within the
//! round) found 12 bytes before the marker, and the attribution of entities
//! to players is recovered from byte-offset grouping: entities belonging to
//! one player serialize close together, so a gap larger than
//! [`NEW_PLAYER_GAP`] between first occurrences starts the next player's
//! group.
//!
//! Within a player group the first entity is the primary weapon. Later
//! entities are the ability launcher when the packet is *full* (all three
//! tagged fields present) and the total is at most [`ABILITY_TOTAL_MAX`]
//! rounds, otherwise the secondary.
//!
//! Classification is permanent: once an entity id maps to a player and
//! role, every later packet for that id reuses the mapping. The first full
//! packet per player and role also captures that slot of the player's
//! initial loadout.

use std::collections::HashMap;

use log::debug;

use crate::binary::ByteReader;
use crate::error::{ParserError, Result};
use crate::header::LoadoutSlot;
use crate::round::{AmmoUpdate, Round};

/// Tagged field id: rounds in reserve.
pub const FIELD_RESERVE: &[u8] = &[0x6D, 0x5B, 0x6D, 0x3E];
/// Tagged field id: magazine capacity (chamberless).
pub const FIELD_MAG_CAPACITY: &[u8] = &[0x56, 0xF5, 0x44, 0x0A];
/// Tagged field id: total ammo.
pub const FIELD_TOTAL_AMMO: &[u8] = &[0x40, 0x0A, 0xC8, 0x29];
/// Tagged field id: reloads available, `ceil(reserve / magCapacity)`.
///
/// Historically mislabeled as gadget data; parsed and ignored.
pub const FIELD_RELOADS_AVAILABLE: &[u8] = &[0x34, 0xBC, 0x4B, 0xAA];

/// Offset gap between first occurrences that starts a new player group.
pub const NEW_PLAYER_GAP: usize = 400;
/// Largest total ammo an ability launcher carries.
pub const ABILITY_TOTAL_MAX: u32 = 20;
/// Sanity cap on the tagged total-ammo field.
pub const TOTAL_AMMO_SANITY_CAP: u32 = 10_000;

/// The role an ammo entity plays in a loadout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityRole {
    /// Primary weapon.
    Primary,
    /// Secondary weapon.
    Secondary,
    /// Ability launcher (breach rounds, deployable charges, ...).
    Ability,
}

#[derive(Debug, Clone, Copy)]
struct EntityEntry {
    player_index: usize,
    role: EntityRole,
}

/// Round-wide classifier state.
#[derive(Debug, Default)]
pub struct AmmoState {
    entries: HashMap<u32, EntityEntry>,
    next_player_index: usize,
    last_new_entity_offset: Option<usize>,
    current_player_entity_count: usize,
}

impl AmmoState {
    /// Resolves an entity id to its player index and role, classifying it
    /// on first sight.
    pub fn classify(
        &mut self,
        entity_id: u32,
        offset: usize,
        full: bool,
        total_ammo: Option<u32>,
    ) -> (usize, EntityRole) {
        if let Some(entry) = self.entries.get(&entity_id) {
            return (entry.player_index, entry.role);
        }

        let new_player = match self.last_new_entity_offset {
            None => true,
            Some(previous) => offset.saturating_sub(previous) > NEW_PLAYER_GAP,
        };
        let player_index = if new_player {
            let index = self.next_player_index;
            self.next_player_index += 1;
            self.current_player_entity_count = 1;
            index
        } else {
            self.current_player_entity_count += 1;
            self.next_player_index - 1
        };

        let role = if self.current_player_entity_count == 1 {
            EntityRole::Primary
        } else if full && total_ammo.is_some_and(|t| t <= ABILITY_TOTAL_MAX) {
            EntityRole::Ability
        } else {
            EntityRole::Secondary
        };

        self.entries.insert(
            entity_id,
            EntityEntry { player_index, role },
        );
        self.last_new_entity_offset = Some(offset);
        (player_index, role)
    }
}

/// Parses one ammunition snapshot.
///
/// `marker_offset` is where the marker was found; the entity id sits 12
/// bytes before it, followed by four null bytes. Non-null padding (or a zero
/// id) means the entity is unknown: the packet is consumed but produces no
/// update and no loadout capture.
///
/// # Errors
///
/// - `ParserError::MalformedField` if the total-ammo field exceeds its
///   sanity cap
/// - `ParserError::UnexpectedEof` if the record is truncated
pub fn parse_ammo_snapshot(
    reader: &mut ByteReader<'_>,
    round: &mut Round,
    marker_offset: usize,
) -> Result<()> {
    let entity_id = extract_entity_id(reader);

    let mag_ammo = reader.read_u32()?;
    let mut reserve: Option<u32> = None;
    let mut mag_capacity: Option<u32> = None;
    let mut total_ammo: Option<u32> = None;

    for _ in 0..4 {
        if reader.remaining() < 8 {
            break;
        }
        let tag = &reader.data()[reader.offset()..reader.offset() + 4];
        let slot = if tag == FIELD_RESERVE {
            Some(&mut reserve)
        } else if tag == FIELD_MAG_CAPACITY {
            Some(&mut mag_capacity)
        } else if tag == FIELD_TOTAL_AMMO {
            Some(&mut total_ammo)
        } else if tag == FIELD_RELOADS_AVAILABLE {
            None
        } else {
            break;
        };
        reader.skip(4)?;
        let value = reader.read_u32()?;
        match slot {
            Some(field) => *field = Some(value),
            None => debug!("ignoring reloads-available field ({value})"),
        }
    }

    if let Some(total) = total_ammo {
        if total > TOTAL_AMMO_SANITY_CAP {
            return Err(ParserError::malformed(format!(
                "total ammo {total} exceeds cap {TOTAL_AMMO_SANITY_CAP}"
            )));
        }
    }

    let Some(entity_id) = entity_id else {
        debug!("ammo packet at offset {marker_offset} has no usable entity id");
        return Ok(());
    };

    let full = reserve.is_some() && mag_capacity.is_some() && total_ammo.is_some();
    let (player_index, role) = round
        .ammo
        .classify(entity_id, marker_offset, full, total_ammo);

    let Some(username) = round
        .header
        .players
        .get(player_index)
        .map(|p| p.username.clone())
    else {
        debug!("ammo entity {entity_id:#010x} maps past the player list");
        return Ok(());
    };

    if full {
        capture_loadout(
            round,
            player_index,
            role,
            LoadoutSlot {
                mag_ammo,
                mag_capacity: mag_capacity.unwrap_or(0),
                reserve: reserve.unwrap_or(0),
                total: total_ammo.unwrap_or(0),
            },
        );
    }

    let reserve = reserve.unwrap_or(0);
    round.ammo_updates.push(AmmoUpdate {
        username,
        mag_ammo,
        reserve,
        total: mag_ammo + reserve,
        mag_capacity: mag_capacity.unwrap_or(0),
        is_primary: role == EntityRole::Primary,
        is_ability: role == EntityRole::Ability,
        time: round.clock.label.clone(),
        time_seconds: round.clock.seconds,
    });
    Ok(())
}

/// Reads the entity id bytes preceding the marker.
///
/// Returns `None` when the id is zero, the padding is non-null, or the
/// marker sits too close to the start of the body.
fn extract_entity_id(reader: &ByteReader<'_>) -> Option<u32> {
    // The reader sits just past the 4-byte marker; 16 bytes back covers
    // entity id, padding, the 4 bytes before the marker, and the marker.
    let window = reader.peek_back(16).ok()?;
    if window[4..8] != [0, 0, 0, 0] {
        return None;
    }
    let id = u32::from_le_bytes([window[0], window[1], window[2], window[3]]);
    (id != 0).then_some(id)
}

/// First-wins capture of one loadout slot.
fn capture_loadout(round: &mut Round, player_index: usize, role: EntityRole, slot: LoadoutSlot) {
    let Some(loadout) = round.loadout_mut(player_index) else {
        return;
    };
    match role {
        EntityRole::Primary => {
            if loadout.primary.is_none() {
                loadout.primary = Some(slot);
            }
        }
        EntityRole::Secondary => {
            if loadout.secondary.is_none() {
                loadout.secondary = Some(slot);
            }
        }
        EntityRole::Ability => {
            if loadout.ability_charges.is_none() {
                loadout.ability_charges = Some(slot.total);
            }
        }
    }
}
