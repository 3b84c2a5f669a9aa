//! Shared helpers for building synthetic .rec recordings in memory.
//!
//! The builder writes the key/value header section and body records with
//! the real markers, then compresses the stream as either a legacy
//! single-frame or a chunked multi-frame zstandard file.

#![allow(dead_code)]

use rec_parser::records::feedback::{
    FEEDBACK_DEATH, FEEDBACK_DISABLE_COMPLETE, FEEDBACK_DISABLE_START, FEEDBACK_KILL,
    FEEDBACK_LOCATE_OBJECTIVE, FEEDBACK_PLANT_COMPLETE, FEEDBACK_PLANT_START,
};
use rec_parser::records::{
    AMMO_MARKER, MATCH_FEEDBACK_MARKER, POSITION_MARKER, SCOREBOARD_ASSISTS_MARKER,
    SCOREBOARD_KILLS_MARKER, SCOREBOARD_SCORE_MARKER, TEAM_SCORE_MARKER, TIME_TICK_MARKER,
};
use rec_parser::records::ammo::{FIELD_MAG_CAPACITY, FIELD_RESERVE, FIELD_TOTAL_AMMO};

// A few operator tokens the tests hand out.
pub const OP_ASH: u64 = 0x0000_92E0_6AA6_20B3;
pub const OP_THERMITE: u64 = 0x0000_92E0_6AA6_24D7;
pub const OP_TWITCH: u64 = 0x0000_92E0_6AA6_3188;
pub const OP_GLAZ: u64 = 0x0000_92E0_6AA6_40FE;
pub const OP_FUZE: u64 = 0x0000_92E0_6AA6_449C;
pub const OP_ROOK: u64 = 0x0000_92E0_6AA7_54BD;
pub const OP_MUTE: u64 = 0x0000_92E0_6AA7_3465;
pub const OP_DOC: u64 = 0x0000_92E0_6AA7_5071;
pub const OP_KAPKAN: u64 = 0x0000_92E0_6AA7_6119;
pub const OP_JAGER: u64 = 0x0000_92E0_6AA7_7093;

/// A code version safely past the Y9S4 gate.
pub const CODE_Y9S4: u32 = 7_930_400;
/// A code version past Y7 but before Y9S4.
pub const CODE_Y8: u32 = 7_100_000;
/// A pre-Y7 code version.
pub const CODE_LEGACY: u32 = 6_400_000;

fn push_string(buf: &mut Vec<u8>, s: &str) {
    buf.extend_from_slice(&u32::try_from(s.len()).unwrap().to_le_bytes());
    buf.extend_from_slice(s.as_bytes());
}

pub struct ReplayBuilder {
    header: Vec<u8>,
    body: Vec<u8>,
}

impl ReplayBuilder {
    pub fn new(version: &str, code_version: u32) -> Self {
        let mut builder = ReplayBuilder {
            header: Vec::new(),
            body: Vec::new(),
        };
        builder.entry("version", version);
        builder.entry("codeversion", &code_version.to_string());
        builder
    }

    /// Appends one header key/value entry.
    pub fn entry(&mut self, key: &str, value: &str) -> &mut Self {
        push_string(&mut self.header, key);
        push_string(&mut self.header, value);
        self
    }

    /// Appends a player block.
    pub fn player(
        &mut self,
        username: &str,
        dissect_hex: &str,
        team_index: usize,
        operator_token: u64,
    ) -> &mut Self {
        self.entry("playerid", username);
        self.entry("dissectid", dissect_hex);
        self.entry("teamindex", &team_index.to_string());
        self.entry("operator", &operator_token.to_string());
        self
    }

    /// Current offset within the body; gaps between ammo markers derive
    /// from it.
    pub fn body_offset(&self) -> usize {
        self.body.len()
    }

    /// Appends `n` bytes of inert padding.
    pub fn pad(&mut self, n: usize) -> &mut Self {
        self.body.extend(std::iter::repeat(0xEEu8).take(n));
        self
    }

    /// Appends a Y7+ time tick.
    pub fn time_tick(&mut self, label: &str) -> &mut Self {
        self.body.extend_from_slice(TIME_TICK_MARKER);
        push_string(&mut self.body, label);
        self
    }

    /// Appends a legacy (pre-Y7) time tick.
    pub fn time_tick_legacy(&mut self, countdown_seconds: u32) -> &mut Self {
        self.body.extend_from_slice(TIME_TICK_MARKER);
        self.body
            .extend_from_slice(&countdown_seconds.to_le_bytes());
        self
    }

    pub fn kill(&mut self, killer: &str, target: &str, headshot: bool) -> &mut Self {
        self.body.extend_from_slice(MATCH_FEEDBACK_MARKER);
        self.body.push(FEEDBACK_KILL);
        push_string(&mut self.body, killer);
        push_string(&mut self.body, target);
        self.body.push(u8::from(headshot));
        self
    }

    pub fn death(&mut self, username: &str) -> &mut Self {
        self.body.extend_from_slice(MATCH_FEEDBACK_MARKER);
        self.body.push(FEEDBACK_DEATH);
        push_string(&mut self.body, username);
        self
    }

    pub fn plant_start(&mut self, username: &str) -> &mut Self {
        self.defuser_event(FEEDBACK_PLANT_START, username)
    }

    pub fn plant_complete(&mut self, username: &str) -> &mut Self {
        self.defuser_event(FEEDBACK_PLANT_COMPLETE, username)
    }

    pub fn disable_start(&mut self, username: &str) -> &mut Self {
        self.defuser_event(FEEDBACK_DISABLE_START, username)
    }

    pub fn disable_complete(&mut self, username: &str) -> &mut Self {
        self.defuser_event(FEEDBACK_DISABLE_COMPLETE, username)
    }

    fn defuser_event(&mut self, sub_type: u8, username: &str) -> &mut Self {
        self.body.extend_from_slice(MATCH_FEEDBACK_MARKER);
        self.body.push(sub_type);
        push_string(&mut self.body, username);
        self
    }

    pub fn locate_objective(&mut self) -> &mut Self {
        self.body.extend_from_slice(MATCH_FEEDBACK_MARKER);
        self.body.push(FEEDBACK_LOCATE_OBJECTIVE);
        self
    }

    pub fn scoreboard_kills(&mut self, username: &str, total: u32) -> &mut Self {
        self.scoreboard(SCOREBOARD_KILLS_MARKER, username, total)
    }

    pub fn scoreboard_assists(&mut self, username: &str, total: u32) -> &mut Self {
        self.scoreboard(SCOREBOARD_ASSISTS_MARKER, username, total)
    }

    pub fn scoreboard_score(&mut self, username: &str, score: u32) -> &mut Self {
        self.scoreboard(SCOREBOARD_SCORE_MARKER, username, score)
    }

    fn scoreboard(&mut self, marker: &[u8], username: &str, value: u32) -> &mut Self {
        self.body.extend_from_slice(marker);
        push_string(&mut self.body, username);
        self.body.extend_from_slice(&value.to_le_bytes());
        self
    }

    pub fn team_score(&mut self, index: u8, score: u32) -> &mut Self {
        self.body.extend_from_slice(TEAM_SCORE_MARKER);
        self.body.push(index);
        self.body.extend_from_slice(&score.to_le_bytes());
        self
    }

    /// Appends a full ammo packet (all three tagged fields present).
    pub fn ammo_full(
        &mut self,
        entity_id: u32,
        mag: u32,
        reserve: u32,
        capacity: u32,
        total: u32,
    ) -> &mut Self {
        self.ammo_prelude(entity_id);
        self.body.extend_from_slice(AMMO_MARKER);
        self.body.extend_from_slice(&mag.to_le_bytes());
        self.body.extend_from_slice(&FIELD_RESERVE);
        self.body.extend_from_slice(&reserve.to_le_bytes());
        self.body.extend_from_slice(&FIELD_MAG_CAPACITY);
        self.body.extend_from_slice(&capacity.to_le_bytes());
        self.body.extend_from_slice(&FIELD_TOTAL_AMMO);
        self.body.extend_from_slice(&total.to_le_bytes());
        self
    }

    /// Appends a magazine-only ammo packet.
    pub fn ammo_mag_only(&mut self, entity_id: u32, mag: u32) -> &mut Self {
        self.ammo_prelude(entity_id);
        self.body.extend_from_slice(AMMO_MARKER);
        self.body.extend_from_slice(&mag.to_le_bytes());
        self
    }

    /// Appends an ammo packet whose entity padding is corrupt.
    pub fn ammo_bad_padding(&mut self, entity_id: u32, mag: u32) -> &mut Self {
        self.body.extend_from_slice(&entity_id.to_le_bytes());
        self.body.extend_from_slice(&[0, 0, 0x07, 0]); // non-null padding
        self.body.extend_from_slice(&[0x55; 4]);
        self.body.extend_from_slice(AMMO_MARKER);
        self.body.extend_from_slice(&mag.to_le_bytes());
        self
    }

    fn ammo_prelude(&mut self, entity_id: u32) {
        self.body.extend_from_slice(&entity_id.to_le_bytes());
        self.body.extend_from_slice(&[0, 0, 0, 0]);
        self.body.extend_from_slice(&[0x55; 4]);
    }

    /// Returns the marker offset the *next* ammo packet will land on.
    pub fn next_ammo_marker_offset(&self) -> usize {
        // Prelude is 12 bytes: entity id, null padding, filler.
        self.body.len() + 12
    }

    /// Appends a short-form (sub-type 1) position packet.
    pub fn position(&mut self, entity_id: u32, x: f32, y: f32, z: f32, hint: u32) -> &mut Self {
        self.body.extend_from_slice(&entity_id.to_le_bytes());
        self.body.extend_from_slice(POSITION_MARKER);
        self.body.extend_from_slice(&1u16.to_le_bytes());
        for c in [x, y, z] {
            self.body.extend_from_slice(&c.to_le_bytes());
        }
        let mut trailer = [0u8; 8];
        trailer[4..8].copy_from_slice(&hint.to_le_bytes());
        self.body.extend_from_slice(&trailer);
        self
    }

    /// Appends an oriented (sub-type 3) position packet with an identity
    /// quaternion.
    pub fn position_oriented(
        &mut self,
        entity_id: u32,
        x: f32,
        y: f32,
        z: f32,
        hint: u32,
    ) -> &mut Self {
        self.body.extend_from_slice(&entity_id.to_le_bytes());
        self.body.extend_from_slice(POSITION_MARKER);
        self.body.extend_from_slice(&3u16.to_le_bytes());
        for c in [x, y, z] {
            self.body.extend_from_slice(&c.to_le_bytes());
        }
        let mut trailer = [0u8; 62];
        trailer[20..24].copy_from_slice(&hint.to_le_bytes());
        trailer[58..62].copy_from_slice(&1.0f32.to_le_bytes());
        self.body.extend_from_slice(&trailer);
        self
    }

    /// The uncompressed header-plus-body stream.
    pub fn raw(&self) -> Vec<u8> {
        let mut raw = self.header.clone();
        push_string(&mut raw, "end");
        push_string(&mut raw, "");
        raw.extend_from_slice(&self.body);
        raw
    }

    /// Compresses as a legacy single-frame file.
    pub fn build_legacy(&self) -> Vec<u8> {
        zstd::stream::encode_all(self.raw().as_slice(), 0).unwrap()
    }

    /// Compresses as a chunked file: the stream split across two frames.
    pub fn build_chunked(&self) -> Vec<u8> {
        let raw = self.raw();
        let split = raw.len() / 2;
        let mut data = zstd::stream::encode_all(&raw[..split], 0).unwrap();
        assert!(
            data.len() > 100,
            "first chunk too small to exercise chunk detection"
        );
        data.extend_from_slice(&zstd::stream::encode_all(&raw[split..], 0).unwrap());
        data
    }
}

/// A 5v5 builder: attackers `atk1..atk5` on team 0, defenders `def1..def5`
/// on team 1.
pub fn five_v_five(version: &str, code_version: u32) -> ReplayBuilder {
    let mut builder = ReplayBuilder::new(version, code_version);
    builder
        .entry("matchid", "m-0001")
        .entry("gamemode", "BOMB")
        .entry("teamname0", "ATTACK")
        .entry("teamname1", "DEFENSE")
        .entry("teamscore0", "1")
        .entry("teamscore1", "1");
    let attackers = [OP_ASH, OP_THERMITE, OP_TWITCH, OP_GLAZ, OP_FUZE];
    let defenders = [OP_ROOK, OP_MUTE, OP_DOC, OP_KAPKAN, OP_JAGER];
    for (i, op) in attackers.iter().enumerate() {
        builder.player(
            &format!("atk{}", i + 1),
            &format!("a000000{}", i + 1),
            0,
            *op,
        );
    }
    for (i, op) in defenders.iter().enumerate() {
        builder.player(
            &format!("def{}", i + 1),
            &format!("d000000{}", i + 1),
            1,
            *op,
        );
    }
    builder
}
