//! The round document and round-end resolution.
//!
//! One [`Round`] is created at header completion and mutated by every record
//! parser until end-of-body; the dispatcher passes it down as an explicit
//! mutable reference so per-round parses stay independent and testable. At
//! end-of-body the round-end resolver assigns winner and win condition under
//! version-specific rules, and movement reconstruction plus loadout
//! population run once.
//!
//! Ordering guarantee: events and ammo updates appear in the exact order
//! their markers occur in the decompressed byte stream; the resolver and the
//! movement reconstructor both rely on that order.

use serde::Serialize;

use crate::header::{Header, PlayerLoadout, WinCondition, CODE_VERSION_Y9S4};
use crate::movement::PlayerMovement;
use crate::operators::Side;
use crate::records::ammo::AmmoState;
use crate::records::position::{ExperimentalPacket, RawPosition};

/// The kind of a match event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EventKind {
    /// A player killed another player.
    Kill,
    /// A player died without a credited killer (suicide, environment).
    Death,
    /// Defuser plant started.
    DefuserPlantStart,
    /// Defuser plant completed.
    DefuserPlantComplete,
    /// Defuser disable started.
    DefuserDisableStart,
    /// Defuser disable completed.
    DefuserDisableComplete,
    /// Round-start objective ping.
    LocateObjective,
    /// Anything else the feedback feed carries.
    Other,
}

/// One entry of the time-ordered event feed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchEvent {
    /// Event kind.
    pub kind: EventKind,
    /// Acting player's username (the killer for kills). For `Other` events
    /// this may carry the raw feed text instead.
    pub username: String,
    /// Victim username; kills only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    /// Whether the kill was a headshot; kills only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headshot: Option<bool>,
    /// Countdown clock as displayed, `M:SS`.
    pub time: String,
    /// Countdown clock in seconds.
    pub time_seconds: f32,
    /// Killer according to the scoreboard, when it disagreed with the
    /// feedback feed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub killer_from_scoreboard: Option<String>,
}

/// One ammunition snapshot, attributed to a player by the entity
/// classifier.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AmmoUpdate {
    /// Attributed player.
    pub username: String,
    /// Rounds in the magazine, chambered round included.
    pub mag_ammo: u32,
    /// Rounds in reserve.
    pub reserve: u32,
    /// Magazine plus reserve.
    pub total: u32,
    /// Magazine capacity without the chambered round.
    pub mag_capacity: u32,
    /// Whether the entity is the primary weapon.
    pub is_primary: bool,
    /// Whether the entity is an ability launcher.
    pub is_ability: bool,
    /// Countdown clock as displayed, `M:SS`.
    pub time: String,
    /// Countdown clock in seconds.
    pub time_seconds: f32,
}

/// The round countdown clock, updated by time-tick records.
#[derive(Debug, Clone)]
pub struct RoundClock {
    /// Displayed clock, `M:SS`.
    pub label: String,
    /// Displayed clock in seconds.
    pub seconds: f32,
}

impl Default for RoundClock {
    fn default() -> Self {
        RoundClock {
            label: "0:00".to_string(),
            seconds: 0.0,
        }
    }
}

/// Per-player statistics derived from the finished round.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PlayerRoundStats {
    /// Player username.
    pub username: String,
    /// Scoreboard kill total.
    pub kills: u32,
    /// Deaths observed in the event feed.
    pub deaths: u32,
    /// Scoreboard assist total.
    pub assists: u32,
    /// Headshot kills observed in the event feed.
    pub headshots: u32,
    /// Scoreboard score.
    pub score: u32,
}

/// A fully parsed round: the header plus everything the body scan
/// collected.
///
/// The round document exclusively owns all parsed records. Fields that only
/// exist to carry scan state between record parsers are not serialized.
#[derive(Debug, Serialize)]
pub struct Round {
    /// The parsed header.
    pub header: Header,
    /// Time-ordered event feed.
    pub events: Vec<MatchEvent>,
    /// Time-ordered ammunition snapshots.
    pub ammo_updates: Vec<AmmoUpdate>,
    /// Reconstructed movement, one entry per matched player; empty unless
    /// movement tracking was enabled.
    pub movement: Vec<PlayerMovement>,
    /// Captured non-standard position packets, when experimental capture is
    /// enabled.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub experimental_packets: Vec<ExperimentalPacket>,

    /// Countdown clock state.
    #[serde(skip)]
    pub clock: RoundClock,
    /// Scoreboard-observed killer awaiting the matching feedback kill.
    #[serde(skip)]
    pub(crate) pending_scoreboard_kill: Option<String>,
    /// Ammo entity classifier state.
    #[serde(skip)]
    pub(crate) ammo: AmmoState,
    /// Raw position packets awaiting reconstruction.
    #[serde(skip)]
    pub(crate) positions: Vec<RawPosition>,
    /// Position packets seen so far, sampled or not; the sequence counter.
    #[serde(skip)]
    pub(crate) position_packets_seen: usize,
}

impl Round {
    /// Creates the round document for a parsed header.
    #[must_use]
    pub fn new(header: Header) -> Self {
        Round {
            header,
            events: Vec::new(),
            ammo_updates: Vec::new(),
            movement: Vec::new(),
            experimental_packets: Vec::new(),
            clock: RoundClock::default(),
            pending_scoreboard_kill: None,
            ammo: AmmoState::default(),
            positions: Vec::new(),
            position_packets_seen: 0,
        }
    }

    /// Appends an event stamped with the current clock.
    pub fn push_event(
        &mut self,
        kind: EventKind,
        username: String,
        target: Option<String>,
        headshot: Option<bool>,
    ) {
        self.events.push(MatchEvent {
            kind,
            username,
            target,
            headshot,
            time: self.clock.label.clone(),
            time_seconds: self.clock.seconds,
            killer_from_scoreboard: None,
        });
    }

    /// The team index a username belongs to, if known.
    #[must_use]
    pub fn team_of(&self, username: &str) -> Option<usize> {
        self.header
            .player_by_username(username)
            .map(|p| p.team_index)
    }

    /// The smallest countdown value observed in the event feed.
    #[must_use]
    pub fn min_event_countdown_seconds(&self) -> Option<f32> {
        self.events
            .iter()
            .map(|e| e.time_seconds)
            .fold(None, |acc, t| match acc {
                Some(best) if best <= t => Some(best),
                _ => Some(t),
            })
    }

    /// Death times extracted from the event feed: `(username, countdown
    /// seconds)` of each player's first recorded death.
    #[must_use]
    pub fn death_times(&self) -> Vec<(String, f32)> {
        let mut seen: Vec<(String, f32)> = Vec::new();
        for event in &self.events {
            let victim = match event.kind {
                EventKind::Kill => event.target.clone(),
                EventKind::Death => Some(event.username.clone()),
                _ => None,
            };
            if let Some(victim) = victim {
                if !seen.iter().any(|(name, _)| *name == victim) {
                    seen.push((victim, event.time_seconds));
                }
            }
        }
        seen
    }

    /// Attaches an initial-loadout slot observation to a player record.
    pub(crate) fn loadout_mut(&mut self, player_index: usize) -> Option<&mut PlayerLoadout> {
        let player = self.header.players.get_mut(player_index)?;
        Some(player.loadout.get_or_insert_with(PlayerLoadout::default))
    }

    /// Derives per-player statistics from the finished round.
    #[must_use]
    pub fn player_stats(&self) -> Vec<PlayerRoundStats> {
        let mut stats: Vec<PlayerRoundStats> = self
            .header
            .players
            .iter()
            .map(|p| PlayerRoundStats {
                username: p.username.clone(),
                kills: p.kills,
                assists: p.assists,
                score: p.score,
                ..PlayerRoundStats::default()
            })
            .collect();

        for event in &self.events {
            match event.kind {
                EventKind::Kill => {
                    if event.headshot == Some(true) {
                        if let Some(s) = stats.iter_mut().find(|s| s.username == event.username) {
                            s.headshots += 1;
                        }
                    }
                    if let Some(target) = &event.target {
                        if let Some(s) = stats.iter_mut().find(|s| s.username == *target) {
                            s.deaths += 1;
                        }
                    }
                }
                EventKind::Death => {
                    if let Some(s) = stats.iter_mut().find(|s| s.username == event.username) {
                        s.deaths += 1;
                    }
                }
                _ => {}
            }
        }
        stats
    }

    /// Resolves winner and win condition from the collected event history.
    ///
    /// Never fails: with an incomplete event stream it still produces a
    /// best-effort winner. Idempotent: re-running on a resolved round yields
    /// identical flags and conditions (the first matching rule returns).
    #[allow(clippy::too_many_lines)]
    pub fn resolve_round_end(&mut self) {
        let y9s4 = self.header.is_at_least(CODE_VERSION_Y9S4);

        let mut team_sizes = [0usize; 2];
        for player in &self.header.players {
            team_sizes[player.team_index & 1] += 1;
        }

        let mut plant_index: Option<usize> = None;
        let mut planter: Option<String> = None;
        let mut disable_starter: Option<String> = None;
        let mut disable_complete: Option<String> = None;
        for (index, event) in self.events.iter().enumerate() {
            match event.kind {
                EventKind::DefuserPlantComplete => {
                    plant_index = Some(index);
                    planter = Some(event.username.clone());
                }
                EventKind::DefuserDisableStart => {
                    disable_starter = Some(event.username.clone());
                }
                EventKind::DefuserDisableComplete => {
                    disable_complete = Some(event.username.clone());
                }
                _ => {}
            }
        }

        // Y9S4+ records the final team scores; the won flags follow them
        // directly.
        if y9s4 {
            for team in &mut self.header.teams {
                team.won = team.score > team.starting_score;
            }
        }

        let attack_index = self.header.team_index_by_role(Side::Attack);
        let defense_index = self.header.team_index_by_role(Side::Defense);

        // Defuser disabled: the disabler's team wins outright.
        if let Some(disabler) = disable_complete {
            let winner = self
                .team_of(&disabler)
                .or(defense_index)
                .unwrap_or(1);
            self.set_winner(winner, WinCondition::DisabledDefuser);
            return;
        }

        // Y9S4+: a plant with no recorded disable, yet the defenders won.
        // The disable record itself was lost. Synthesize it.
        if y9s4 && plant_index.is_some() {
            if let Some(defense) = defense_index {
                if self.header.teams[defense].won {
                    let username = disable_starter.unwrap_or_default();
                    self.push_event(
                        EventKind::DefuserDisableComplete,
                        username,
                        None,
                        None,
                    );
                    self.set_winner(defense, WinCondition::DisabledDefuser);
                    return;
                }
            }
        }

        // Plant without a defender defuser win: the bomb went off.
        if plant_index.is_some() {
            let winner = if y9s4 {
                self.header
                    .teams
                    .iter()
                    .position(|t| t.won)
                    .or_else(|| planter.as_deref().and_then(|p| self.team_of(p)))
            } else {
                planter.as_deref().and_then(|p| self.team_of(p))
            };
            let winner = winner.or(attack_index).unwrap_or(0);
            self.set_winner(winner, WinCondition::DefusedBomb);
            return;
        }

        // Wipe check. Legacy builds never count attackers killed after the
        // plant; with no plant on this path the carve-out stays dormant, but
        // it is preserved as recorded.
        let mut deaths = [0usize; 2];
        for (index, event) in self.events.iter().enumerate() {
            let victim = match event.kind {
                EventKind::Kill => event.target.as_deref(),
                EventKind::Death => Some(event.username.as_str()),
                _ => None,
            };
            let Some(team) = victim.and_then(|v| self.team_of(v)) else {
                continue;
            };
            if !y9s4 {
                if let Some(plant) = plant_index {
                    if index > plant && Some(team) == attack_index {
                        continue;
                    }
                }
            }
            deaths[team & 1] += 1;
        }
        for index in 0..2 {
            if team_sizes[index] > 0 && deaths[index] >= team_sizes[index] {
                self.set_winner(1 - index, WinCondition::KilledOpponents);
                return;
            }
        }

        // Nothing decisive in the feed. Y9S4+ trusts the recorded winner;
        // legacy rounds that reach this point timed out in favor of the
        // defenders.
        if y9s4 {
            if let Some(winner) = self.header.teams.iter().position(|t| t.won) {
                let condition = if self.header.teams[winner].role == Side::Defense {
                    WinCondition::Time
                } else {
                    WinCondition::KilledOpponents
                };
                self.set_winner(winner, condition);
                return;
            }
        }
        let winner = defense_index.unwrap_or(1);
        self.set_winner(winner, WinCondition::Time);
    }

    fn set_winner(&mut self, winner: usize, condition: WinCondition) {
        let winner = winner & 1;
        self.header.teams[winner].won = true;
        self.header.teams[winner].win_condition = Some(condition);
        self.header.teams[1 - winner].won = false;
        self.header.teams[1 - winner].win_condition = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binary::ByteReader;
    use crate::header::Header;

    fn push_entry(buf: &mut Vec<u8>, key: &str, value: &str) {
        for s in [key, value] {
            buf.extend_from_slice(&u32::try_from(s.len()).unwrap().to_le_bytes());
            buf.extend_from_slice(s.as_bytes());
        }
    }

    /// Two attackers, two defenders, legacy code version.
    fn legacy_round() -> Round {
        let mut buf = Vec::new();
        push_entry(&mut buf, "version", "Y6S2");
        push_entry(&mut buf, "codeversion", "6400000");
        for (name, team, op) in [
            ("atk1", "0", 0x0000_92E0_6AA6_20B3u64), // Ash
            ("atk2", "0", 0x0000_92E0_6AA6_24D7),    // Thermite
            ("def1", "1", 0x0000_92E0_6AA7_54BD),    // Rook
            ("def2", "1", 0x0000_92E0_6AA7_3465),    // Mute
        ] {
            push_entry(&mut buf, "playerid", name);
            push_entry(&mut buf, "teamindex", team);
            push_entry(&mut buf, "operator", &op.to_string());
        }
        push_entry(&mut buf, "end", "");
        let mut reader = ByteReader::new(&buf);
        Round::new(Header::parse(&mut reader).unwrap())
    }

    #[test]
    fn test_push_event_stamps_clock() {
        let mut round = legacy_round();
        round.clock = RoundClock {
            label: "2:47".to_string(),
            seconds: 167.0,
        };
        round.push_event(EventKind::Kill, "atk1".into(), Some("def1".into()), Some(true));

        let event = &round.events[0];
        assert_eq!(event.time, "2:47");
        assert!((event.time_seconds - 167.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_defense_wipe_gives_attackers_the_round() {
        let mut round = legacy_round();
        round.push_event(EventKind::Kill, "atk1".into(), Some("def1".into()), None);
        round.push_event(EventKind::Kill, "atk2".into(), Some("def2".into()), None);
        round.resolve_round_end();

        assert!(round.header.teams[0].won);
        assert_eq!(
            round.header.teams[0].win_condition,
            Some(WinCondition::KilledOpponents)
        );
        assert!(!round.header.teams[1].won);
    }

    #[test]
    fn test_quiet_round_times_out_for_defenders() {
        let mut round = legacy_round();
        round.resolve_round_end();

        assert!(round.header.teams[1].won);
        assert_eq!(round.header.teams[1].win_condition, Some(WinCondition::Time));
    }

    #[test]
    fn test_resolver_is_idempotent() {
        let mut round = legacy_round();
        round.push_event(EventKind::Kill, "atk1".into(), Some("def1".into()), None);
        round.push_event(EventKind::Kill, "atk2".into(), Some("def2".into()), None);
        round.resolve_round_end();
        let first: Vec<_> = round
            .header
            .teams
            .iter()
            .map(|t| (t.won, t.win_condition))
            .collect();

        round.resolve_round_end();
        let second: Vec<_> = round
            .header
            .teams
            .iter()
            .map(|t| (t.won, t.win_condition))
            .collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_death_times_first_death_only() {
        let mut round = legacy_round();
        round.clock.seconds = 170.0;
        round.clock.label = "2:50".into();
        round.push_event(EventKind::Kill, "atk1".into(), Some("def1".into()), None);
        round.clock.seconds = 90.0;
        round.clock.label = "1:30".into();
        // A duplicate victim entry must not produce a second death time.
        round.push_event(EventKind::Kill, "atk2".into(), Some("def1".into()), None);
        round.push_event(EventKind::Death, "atk2".into(), None, None);

        let deaths = round.death_times();
        assert_eq!(deaths.len(), 2);
        assert_eq!(deaths[0].0, "def1");
        assert!((deaths[0].1 - 170.0).abs() < f32::EPSILON);
        assert_eq!(deaths[1].0, "atk2");
    }

    #[test]
    fn test_min_event_countdown() {
        let mut round = legacy_round();
        assert!(round.min_event_countdown_seconds().is_none());
        round.clock.seconds = 170.0;
        round.push_event(EventKind::LocateObjective, String::new(), None, None);
        round.clock.seconds = 12.0;
        round.push_event(EventKind::Death, "atk1".into(), None, None);
        assert!((round.min_event_countdown_seconds().unwrap() - 12.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_player_stats_headshots_and_deaths() {
        let mut round = legacy_round();
        round.header.players[0].kills = 2;
        round.push_event(EventKind::Kill, "atk1".into(), Some("def1".into()), Some(true));
        round.push_event(EventKind::Kill, "atk1".into(), Some("def2".into()), Some(false));

        let stats = round.player_stats();
        let atk1 = stats.iter().find(|s| s.username == "atk1").unwrap();
        assert_eq!(atk1.kills, 2);
        assert_eq!(atk1.headshots, 1);
        let def1 = stats.iter().find(|s| s.username == "def1").unwrap();
        assert_eq!(def1.deaths, 1);
    }
}
