//! Rainbow Six Siege replay (.rec) parser CLI
//!
//! A command-line interface for parsing, inspecting, and validating .rec
//! round recordings.
//!
//! ## Commands
//!
//! - `info` - Display quick round metadata
//! - `parse` - Parse a recording with output format options
//! - `validate` - Validate a recording (exit codes for scripting)

use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use rec_parser::round::PlayerRoundStats;
use rec_parser::{
    parse_round, AmmoUpdate, MatchEvent, ParseOptions, PlayerMovement, Round,
};

/// Rainbow Six Siege replay (.rec) parser
#[derive(Parser)]
#[command(name = "rec-parser")]
#[command(about = "Rainbow Six Siege replay (.rec) parser", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Display round information
    Info {
        /// Path to the replay file
        file: PathBuf,
    },
    /// Parse a replay file
    Parse {
        /// Path to the replay file
        file: PathBuf,
        /// Output format: json, pretty
        #[arg(short, long, default_value = "pretty")]
        output: OutputFormat,
        /// Include the event feed in output
        #[arg(long)]
        events: bool,
        /// Include ammunition updates
        #[arg(long)]
        ammo: bool,
        /// Reconstruct and include player movement
        #[arg(long)]
        movement: bool,
        /// Keep every Nth position packet (implies --movement)
        #[arg(long, default_value_t = 0)]
        sample_rate: u32,
        /// Include per-player statistics
        #[arg(long)]
        stats: bool,
    },
    /// Validate replay format
    Validate {
        /// Path to the replay file
        file: PathBuf,
        /// Verbose error reporting
        #[arg(short, long)]
        verbose: bool,
    },
}

/// Output format options
#[derive(Clone, Debug, ValueEnum)]
enum OutputFormat {
    Json,
    Pretty,
}

// ============================================================================
// Serializable Output Structures
// ============================================================================

#[derive(Serialize)]
struct ParseOutput<'a> {
    header: &'a rec_parser::Header,
    #[serde(skip_serializing_if = "Option::is_none")]
    events: Option<&'a [MatchEvent]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    ammo_updates: Option<&'a [AmmoUpdate]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    movement: Option<&'a [PlayerMovement]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stats: Option<Vec<PlayerRoundStats>>,
}

// ============================================================================
// Main Entry Point
// ============================================================================

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Info { file } => cmd_info(&file),
        Commands::Parse {
            file,
            output,
            events,
            ammo,
            movement,
            sample_rate,
            stats,
        } => cmd_parse(&file, &output, events, ammo, movement, sample_rate, stats),
        Commands::Validate { file, verbose } => cmd_validate(&file, verbose),
    }
}

fn read_and_parse(file: &Path, options: &ParseOptions) -> Result<Round, String> {
    let data = std::fs::read(file).map_err(|e| format!("Error reading file: {e}"))?;
    parse_round(&data, options).map_err(|e| format!("Error parsing replay: {e}"))
}

// ============================================================================
// Info Command Implementation
// ============================================================================

fn cmd_info(file: &Path) -> ExitCode {
    let round = match read_and_parse(file, &ParseOptions::default()) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };

    println!("=== Round Information ===\n");
    let header = &round.header;
    println!("Match:");
    println!("  Id: {}", header.match_id);
    println!("  Version: {} ({})", header.game_version, header.code_version);
    println!("  Recorded: {}", header.timestamp);
    println!("  Map: {}", header.map);
    println!("  Mode: {:?}", header.game_mode);
    println!(
        "  Round: {} of {}",
        header.round_number, header.rounds_per_match
    );
    println!();

    for (index, team) in header.teams.iter().enumerate() {
        println!(
            "Team {index} {:?} ({}): score {} -> {}, won: {}{}",
            team.role,
            if team.name.is_empty() { "-" } else { &team.name },
            team.starting_score,
            team.score,
            team.won,
            team.win_condition
                .map(|c| format!(" by {c:?}"))
                .unwrap_or_default()
        );
        for player in header.players.iter().filter(|p| p.team_index == index) {
            println!("  - {} ({})", player.username, player.operator);
        }
    }

    println!();
    println!("Events: {}", round.events.len());
    println!("Ammo updates: {}", round.ammo_updates.len());

    ExitCode::SUCCESS
}

// ============================================================================
// Parse Command Implementation
// ============================================================================

#[allow(clippy::fn_params_excessive_bools)]
fn cmd_parse(
    file: &Path,
    output: &OutputFormat,
    include_events: bool,
    include_ammo: bool,
    include_movement: bool,
    sample_rate: u32,
    include_stats: bool,
) -> ExitCode {
    let options = ParseOptions {
        track_movement: include_movement || sample_rate > 1,
        movement_sample_rate: sample_rate,
        experimental_types: false,
    };

    let round = match read_and_parse(file, &options) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };

    let output_data = ParseOutput {
        header: &round.header,
        events: include_events.then_some(round.events.as_slice()),
        ammo_updates: include_ammo.then_some(round.ammo_updates.as_slice()),
        movement: (include_movement || sample_rate > 1).then_some(round.movement.as_slice()),
        stats: include_stats.then(|| round.player_stats()),
    };

    match output {
        OutputFormat::Json => match serde_json::to_string_pretty(&output_data) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("Error serializing to JSON: {e}");
                return ExitCode::FAILURE;
            }
        },
        OutputFormat::Pretty => print_pretty(&round, &output_data),
    }

    ExitCode::SUCCESS
}

fn print_pretty(round: &Round, output: &ParseOutput<'_>) {
    let header = &round.header;
    println!("=== Header ===");
    println!("Match: {}", header.match_id);
    println!("Map: {}", header.map);
    println!("Mode: {:?}", header.game_mode);
    println!("Players: {}", header.players.len());
    println!();

    if let Some(events) = output.events {
        println!("=== Events ({}) ===", events.len());
        for event in events {
            match (&event.target, event.headshot) {
                (Some(target), headshot) => println!(
                    "  [{}] {:?}: {} -> {}{}",
                    event.time,
                    event.kind,
                    event.username,
                    target,
                    if headshot == Some(true) {
                        " (headshot)"
                    } else {
                        ""
                    }
                ),
                _ => println!("  [{}] {:?}: {}", event.time, event.kind, event.username),
            }
        }
        println!();
    }

    if let Some(updates) = output.ammo_updates {
        println!("=== Ammo Updates ({}) ===", updates.len());
        // Only show the first 50 in pretty mode to avoid spam.
        let display_count = std::cmp::min(updates.len(), 50);
        for update in &updates[..display_count] {
            println!(
                "  [{}] {}: {}/{} (cap {}){}{}",
                update.time,
                update.username,
                update.mag_ammo,
                update.total,
                update.mag_capacity,
                if update.is_primary { " primary" } else { "" },
                if update.is_ability { " ability" } else { "" },
            );
        }
        if updates.len() > 50 {
            println!("  ... and {} more updates", updates.len() - 50);
        }
        println!();
    }

    if let Some(movement) = output.movement {
        println!("=== Movement ({} tracks) ===", movement.len());
        for track in movement {
            println!(
                "  {} ({}): {} positions",
                track.username,
                track.operator,
                track.positions.len()
            );
        }
        println!();
    }

    if let Some(stats) = &output.stats {
        println!("=== Player Stats ===");
        for s in stats {
            println!(
                "  {}: {} kills ({} headshots), {} deaths, {} assists, score {}",
                s.username, s.kills, s.headshots, s.deaths, s.assists, s.score
            );
        }
        println!();
    }

    for (index, team) in header.teams.iter().enumerate() {
        println!(
            "Team {index}: won={} condition={:?}",
            team.won, team.win_condition
        );
    }
}

// ============================================================================
// Validate Command Implementation
// ============================================================================

struct ValidationResult {
    decompression_valid: bool,
    header_valid: bool,
    body_valid: bool,
    errors: Vec<String>,
    warnings: Vec<String>,
}

impl ValidationResult {
    fn is_valid(&self) -> bool {
        self.decompression_valid && self.header_valid && self.body_valid
    }
}

fn cmd_validate(file: &Path, verbose: bool) -> ExitCode {
    let result = validate_replay(file);

    if verbose {
        print_validation_details(&result, file);
    } else {
        let status = if result.is_valid() { "VALID" } else { "INVALID" };
        println!("{}: {status}", file.display());
    }

    if result.is_valid() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn validate_replay(file: &Path) -> ValidationResult {
    let mut result = ValidationResult {
        decompression_valid: false,
        header_valid: false,
        body_valid: false,
        errors: Vec::new(),
        warnings: Vec::new(),
    };

    let data = match std::fs::read(file) {
        Ok(d) => d,
        Err(e) => {
            result.errors.push(format!("Failed to read file: {e}"));
            return result;
        }
    };

    let body = match rec_parser::decompress_body(&data) {
        Ok(b) => {
            result.decompression_valid = true;
            b
        }
        Err(e) => {
            result.errors.push(format!("Decompression failed: {e}"));
            return result;
        }
    };

    let mut reader = rec_parser::ByteReader::new(&body);
    let header = match rec_parser::Header::parse(&mut reader) {
        Ok(h) => {
            result.header_valid = true;
            h
        }
        Err(e) => {
            result.errors.push(format!("Header parsing failed: {e}"));
            return result;
        }
    };

    if header.players.is_empty() {
        result.warnings.push("No players found in header".to_string());
    }

    let mut round = Round::new(header);
    match rec_parser::scan_body(&mut reader, &mut round, &ParseOptions::default()) {
        Ok(()) => {
            result.body_valid = true;
            if round.events.is_empty() {
                result.warnings.push("Body contained no events".to_string());
            }
        }
        Err(e) => {
            result.errors.push(format!("Body scan failed: {e}"));
        }
    }

    result
}

fn print_validation_details(result: &ValidationResult, file: &Path) {
    println!("Validating: {}\n", file.display());

    println!("Checks:");
    println!(
        "  Decompression:     {}",
        status_icon(result.decompression_valid)
    );
    println!("  Header parsing:    {}", status_icon(result.header_valid));
    println!("  Body scan:         {}", status_icon(result.body_valid));

    if !result.errors.is_empty() {
        println!("\nErrors:");
        for error in &result.errors {
            println!("  - {error}");
        }
    }

    if !result.warnings.is_empty() {
        println!("\nWarnings:");
        for warning in &result.warnings {
            println!("  - {warning}");
        }
    }

    println!(
        "\nResult: {}",
        if result.is_valid() { "VALID" } else { "INVALID" }
    );
}

fn status_icon(valid: bool) -> &'static str {
    if valid {
        "[OK]"
    } else {
        "[FAIL]"
    }
}
