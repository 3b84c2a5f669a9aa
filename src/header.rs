//! Header parsing for .rec replay files.
//!
//! The decompressed stream opens with a key/value section: each entry is a
//! 4-byte-length-prefixed key string followed by a value string. The first
//! key must be `version`; the section ends at the `end` key, after which the
//! record body begins.
//!
//! Player records arrive interleaved: a `playerid` entry opens a player
//! block (its value is the username) and the following player-scoped keys
//! (`profileid`, `dissectid`, `teamindex`, `operator`, `spawn`, `hudindex`,
//! `alliance`, `roleimage`, `rolename`, `roleportrait`) fill it until the
//! next `playerid` or the terminator.
//!
//! Versioning: the `codeversion` entry carries a numeric build code used by
//! downstream parsers to switch behavior. The two gates that matter are
//! [`CODE_VERSION_Y7`] (time ticks become `M:SS` strings) and
//! [`CODE_VERSION_Y9S4`] (round-end resolution trusts the recorded team
//! scores).

use std::collections::BTreeMap;
use std::fmt;

use log::{debug, warn};
use serde::{Serialize, Serializer};

use crate::binary::ByteReader;
use crate::error::{ParserError, Result};
use crate::maps::Map;
use crate::operators::{Operator, Side};

/// First build code of the Y7 season line.
///
/// From Y7 on, time ticks are length-prefixed `M:SS` strings instead of raw
/// countdown integers.
pub const CODE_VERSION_Y7: u32 = 6_700_000;

/// First build code of the Y9S4 season line.
///
/// From Y9S4 on, the recorded team scores are authoritative for round-end
/// resolution.
pub const CODE_VERSION_Y9S4: u32 = 7_930_000;

/// Header terminator key.
pub const HEADER_END_KEY: &str = "end";

/// A 4-byte opaque player token, unique within one replay file.
///
/// Not a global account id; the profile id carries that. Serialized as an
/// 8-character lowercase hex string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DissectId(
    /// The raw token bytes.
    pub [u8; 4],
);

impl DissectId {
    /// Parses the 8-hex-character header representation.
    ///
    /// # Errors
    ///
    /// Returns `ParserError::MalformedField` on bad length or non-hex input.
    pub fn from_hex(s: &str) -> Result<Self> {
        if s.len() != 8 || !s.is_ascii() {
            return Err(ParserError::malformed(format!(
                "dissect id must be 8 hex chars, got {s:?}"
            )));
        }
        let mut bytes = [0u8; 4];
        for (i, chunk) in s.as_bytes().chunks(2).enumerate() {
            let pair = std::str::from_utf8(chunk)
                .map_err(|_| ParserError::malformed("dissect id is not UTF-8"))?;
            bytes[i] = u8::from_str_radix(pair, 16)
                .map_err(|_| ParserError::malformed(format!("dissect id {s:?} is not hex")))?;
        }
        Ok(DissectId(bytes))
    }
}

impl fmt::Display for DissectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for b in self.0 {
            write!(f, "{b:02x}")?;
        }
        Ok(())
    }
}

impl Serialize for DissectId {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// How the match was created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MatchType {
    /// Quick match queue.
    QuickMatch,
    /// Ranked queue.
    Ranked,
    /// Custom game lobby.
    CustomGame,
    /// Standard (unranked) queue.
    Standard,
    /// Unrecognized match type string.
    Unknown,
}

impl MatchType {
    fn from_name(name: &str) -> Self {
        match name {
            "QUICKMATCH" => MatchType::QuickMatch,
            "RANKED" => MatchType::Ranked,
            "CUSTOMGAME" => MatchType::CustomGame,
            "STANDARD" => MatchType::Standard,
            _ => MatchType::Unknown,
        }
    }
}

/// The game mode of the recorded round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum GameMode {
    /// Plant/defuse mode; the only mode with defuser events.
    Bomb,
    /// Secure area mode.
    SecureArea,
    /// Hostage mode.
    Hostage,
    /// Unrecognized mode string.
    Unknown,
}

impl GameMode {
    fn from_name(name: &str) -> Self {
        match name {
            "BOMB" => GameMode::Bomb,
            "SECURE_AREA" => GameMode::SecureArea,
            "HOSTAGE" => GameMode::Hostage,
            _ => GameMode::Unknown,
        }
    }
}

/// How a round was won.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum WinCondition {
    /// The bomb detonated (attackers).
    DefusedBomb,
    /// The planted defuser was disabled (defenders).
    DisabledDefuser,
    /// The opposing team was eliminated.
    KilledOpponents,
    /// The action clock ran out (defenders).
    Time,
}

/// One magazine-fed slot of an initial loadout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LoadoutSlot {
    /// Rounds in the magazine, chambered round included.
    pub mag_ammo: u32,
    /// Magazine capacity without the chambered round.
    pub mag_capacity: u32,
    /// Rounds in reserve.
    pub reserve: u32,
    /// Magazine plus reserve.
    pub total: u32,
}

/// A player's initial loadout, captured from the first full ammo snapshot
/// per slot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PlayerLoadout {
    /// Primary weapon slot, if a full snapshot was seen.
    pub primary: Option<LoadoutSlot>,
    /// Secondary weapon slot, if a full snapshot was seen.
    pub secondary: Option<LoadoutSlot>,
    /// Total ammo of the first ability entity observed, if any.
    pub ability_charges: Option<u32>,
}

/// One player record from the header.
#[derive(Debug, Clone, Serialize)]
pub struct Player {
    /// In-file identity token; absent if the header never supplied one.
    pub dissect_id: Option<DissectId>,
    /// Account identifier (UUID-like); may be absent.
    pub profile_id: Option<String>,
    /// Display name.
    pub username: String,
    /// Index into [`Header::teams`]; always 0 or 1.
    pub team_index: usize,
    /// Picked operator.
    pub operator: Operator,
    /// Heads-up-display slot.
    pub hud_index: Option<u32>,
    /// Spawn location name; attack side only.
    pub spawn: Option<String>,
    /// Alliance token from the header.
    pub alliance: u32,
    /// Role image asset reference.
    pub role_image: Option<String>,
    /// Role display name.
    pub role_name: Option<String>,
    /// Role portrait asset reference.
    pub role_portrait: Option<String>,
    /// Initial loadout, populated after body parsing completes.
    pub loadout: Option<PlayerLoadout>,
    /// Scoreboard kill total.
    pub kills: u32,
    /// Scoreboard assist total.
    pub assists: u32,
    /// Scoreboard score.
    pub score: u32,
}

impl Player {
    fn new(username: String) -> Self {
        Player {
            dissect_id: None,
            profile_id: None,
            username,
            team_index: 0,
            operator: Operator::Unknown,
            hud_index: None,
            spawn: None,
            alliance: 0,
            role_image: None,
            role_name: None,
            role_portrait: None,
            loadout: None,
            kills: 0,
            assists: 0,
            score: 0,
        }
    }
}

/// One of the two teams.
#[derive(Debug, Clone, Serialize)]
pub struct Team {
    /// Team display name.
    pub name: String,
    /// Attack, Defense, or Unknown; derived from the side of the team's
    /// operators.
    pub role: Side,
    /// Score at the start of the round (from the header).
    pub starting_score: u32,
    /// Score at the end of the round; defaults to the starting score until a
    /// team-score record updates it.
    pub score: u32,
    /// Whether this team won the round.
    pub won: bool,
    /// How the round was won; set by the round-end resolver.
    pub win_condition: Option<WinCondition>,
}

impl Team {
    fn new() -> Self {
        Team {
            name: String::new(),
            role: Side::Unknown,
            starting_score: 0,
            score: 0,
            won: false,
            win_condition: None,
        }
    }
}

/// Parsed replay header.
#[derive(Debug, Clone, Serialize)]
pub struct Header {
    /// Game version label (e.g. `Y9S4`).
    pub game_version: String,
    /// Numeric build code; gates version-dependent behavior.
    pub code_version: u32,
    /// Recording timestamp, ISO8601, kept verbatim.
    pub timestamp: String,
    /// Match identifier.
    pub match_id: String,
    /// Match creation type.
    pub match_type: MatchType,
    /// Map being played.
    pub map: Map,
    /// Profile id of the recording player.
    pub recording_profile_id: String,
    /// Game mode.
    pub game_mode: GameMode,
    /// Rounds needed for the match.
    pub rounds_per_match: u32,
    /// Zero-based round number of this recording.
    pub round_number: u32,
    /// Overtime round number, zero outside overtime.
    pub overtime_round_number: u32,
    /// The two teams. Exactly two, always.
    pub teams: [Team; 2],
    /// All players, in header order.
    pub players: Vec<Player>,
    /// Raw game settings (settings key to integer value).
    pub game_settings: BTreeMap<String, i64>,
}

impl Header {
    /// Parses the key/value header section, leaving the reader positioned at
    /// the first body byte.
    ///
    /// Unknown keys are skipped with their value. Malformed values in
    /// non-critical entries are logged and skipped; a missing leading
    /// `version` key fails the parse.
    ///
    /// # Errors
    ///
    /// - `ParserError::InvalidHeader` if the section does not start with
    ///   `version`
    /// - `ParserError::UnexpectedEof` if the section is truncated before the
    ///   `end` terminator
    pub fn parse(reader: &mut ByteReader<'_>) -> Result<Self> {
        let mut header = Header {
            game_version: String::new(),
            code_version: 0,
            timestamp: String::new(),
            match_id: String::new(),
            match_type: MatchType::Unknown,
            map: Map::Unknown,
            recording_profile_id: String::new(),
            game_mode: GameMode::Unknown,
            rounds_per_match: 0,
            round_number: 0,
            overtime_round_number: 0,
            teams: [Team::new(), Team::new()],
            players: Vec::new(),
            game_settings: BTreeMap::new(),
        };

        let first_key = reader.read_string()?;
        if first_key != "version" {
            return Err(ParserError::InvalidHeader {
                reason: format!("expected leading version key, found {first_key:?}"),
            });
        }
        header.game_version = reader.read_string()?;

        let mut open_player: Option<Player> = None;

        loop {
            let key = reader.read_string()?;
            if key == HEADER_END_KEY {
                // The terminator carries an empty value like every entry.
                let _ = reader.read_string()?;
                break;
            }
            let value = reader.read_string()?;

            if key == "playerid" {
                if let Some(player) = open_player.take() {
                    header.players.push(player);
                }
                open_player = Some(Player::new(value));
                continue;
            }

            if let Some(player) = open_player.as_mut() {
                if apply_player_key(player, &key, &value) {
                    continue;
                }
            }

            header.apply_global_key(&key, &value);
        }

        if let Some(player) = open_player.take() {
            header.players.push(player);
        }

        header.derive_team_roles();
        debug!(
            "parsed header: {} v{} on {}, {} players",
            header.game_version,
            header.code_version,
            header.map,
            header.players.len()
        );
        Ok(header)
    }

    fn apply_global_key(&mut self, key: &str, value: &str) {
        match key {
            "codeversion" => match value.parse() {
                Ok(v) => self.code_version = v,
                Err(_) => warn!("unparseable codeversion {value:?}"),
            },
            "timestamp" => self.timestamp = value.to_string(),
            "matchid" => self.match_id = value.to_string(),
            "matchtype" => self.match_type = MatchType::from_name(value),
            "map" => match value.parse::<u64>() {
                Ok(id) => self.map = Map::from_id(id),
                Err(_) => warn!("unparseable map token {value:?}"),
            },
            "recordingprofileid" => self.recording_profile_id = value.to_string(),
            "gamemode" => self.game_mode = GameMode::from_name(value),
            "roundspermatch" => parse_into(value, &mut self.rounds_per_match, key),
            "roundnumber" => parse_into(value, &mut self.round_number, key),
            "overtimeroundnumber" => parse_into(value, &mut self.overtime_round_number, key),
            "teamname0" => self.teams[0].name = value.to_string(),
            "teamname1" => self.teams[1].name = value.to_string(),
            "teamscore0" => set_team_score(&mut self.teams[0], value),
            "teamscore1" => set_team_score(&mut self.teams[1], value),
            _ => {
                if let Some(setting) = key.strip_prefix("gamesetting:") {
                    match value.parse() {
                        Ok(v) => {
                            self.game_settings.insert(setting.to_string(), v);
                        }
                        Err(_) => warn!("unparseable game setting {key:?}={value:?}"),
                    }
                } else {
                    debug!("skipping unknown header key {key:?}");
                }
            }
        }
    }

    fn derive_team_roles(&mut self) {
        for (index, team) in self.teams.iter_mut().enumerate() {
            let mut attack = 0usize;
            let mut defense = 0usize;
            for player in self.players.iter().filter(|p| p.team_index == index) {
                match player.operator.side() {
                    Side::Attack => attack += 1,
                    Side::Defense => defense += 1,
                    Side::Unknown => {}
                }
            }
            team.role = match attack.cmp(&defense) {
                std::cmp::Ordering::Greater => Side::Attack,
                std::cmp::Ordering::Less => Side::Defense,
                std::cmp::Ordering::Equal => Side::Unknown,
            };
        }
    }

    /// Returns whether the recording build is at least the given code.
    #[must_use]
    pub fn is_at_least(&self, code_version: u32) -> bool {
        self.code_version >= code_version
    }

    /// Whether the match was played in the ranked queue.
    #[must_use]
    pub fn is_ranked(&self) -> bool {
        self.match_type == MatchType::Ranked
    }

    /// Whether the match was a custom game.
    #[must_use]
    pub fn is_custom(&self) -> bool {
        self.match_type == MatchType::CustomGame
    }

    /// Finds a player by username.
    #[must_use]
    pub fn player_by_username(&self, username: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.username == username)
    }

    /// Finds a player by dissect id.
    #[must_use]
    pub fn player_index_by_dissect_id(&self, id: DissectId) -> Option<usize> {
        self.players.iter().position(|p| p.dissect_id == Some(id))
    }

    /// Index of the team playing the given side, if derivable.
    #[must_use]
    pub fn team_index_by_role(&self, role: Side) -> Option<usize> {
        self.teams.iter().position(|t| t.role == role)
    }
}

/// Applies a player-scoped key; returns false if the key is not
/// player-scoped so the caller can try the global set.
fn apply_player_key(player: &mut Player, key: &str, value: &str) -> bool {
    match key {
        "profileid" => player.profile_id = Some(value.to_string()),
        "dissectid" => match DissectId::from_hex(value) {
            Ok(id) => player.dissect_id = Some(id),
            Err(e) => warn!("player {}: {e}", player.username),
        },
        "teamindex" => match value.parse::<usize>() {
            Ok(i @ (0 | 1)) => player.team_index = i,
            _ => warn!(
                "player {}: team index {value:?} not in {{0,1}}, keeping {}",
                player.username, player.team_index
            ),
        },
        "operator" => match value.parse::<u64>() {
            Ok(token) => player.operator = Operator::from_id(token),
            Err(_) => warn!("player {}: unparseable operator token", player.username),
        },
        "spawn" => player.spawn = Some(value.to_string()),
        "hudindex" => match value.parse() {
            Ok(v) => player.hud_index = Some(v),
            Err(_) => warn!("player {}: unparseable hud index", player.username),
        },
        "alliance" => parse_into(value, &mut player.alliance, key),
        "roleimage" => player.role_image = Some(value.to_string()),
        "rolename" => player.role_name = Some(value.to_string()),
        "roleportrait" => player.role_portrait = Some(value.to_string()),
        _ => return false,
    }
    true
}

fn parse_into(value: &str, slot: &mut u32, key: &str) {
    match value.parse() {
        Ok(v) => *slot = v,
        Err(_) => warn!("unparseable numeric header value {key:?}={value:?}"),
    }
}

fn set_team_score(team: &mut Team, value: &str) {
    match value.parse() {
        Ok(v) => {
            team.starting_score = v;
            team.score = v;
        }
        Err(_) => warn!("unparseable team score {value:?}"),
    }
}
