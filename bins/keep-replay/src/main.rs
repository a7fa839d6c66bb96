//! keep-items scenario replayer.
//!
//! Loads the engine configuration, replays a JSON scenario against an
//! in-memory host and prints the report as JSON on stdout.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use keep_core::types::RespawnMode;
use keep_host::{ConfigLoader, Scenario, default_config_path, replay};

/// Replay death and respawn scenarios through the retention engine.
#[derive(Parser, Debug)]
#[command(name = "keep-replay", version, about = "Replay keep-items death scenarios")]
struct Args {
    /// Scenario file (JSON)
    scenario: PathBuf,

    /// Config file; defaults to the platform config directory
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the configured drop chance
    #[arg(long)]
    drop_chance: Option<f64>,

    /// Override the respawn mode ("restore" or "drop-at-respawn")
    #[arg(long, value_parser = parse_respawn_mode)]
    respawn_mode: Option<RespawnMode>,

    /// Seed drop-chance sampling for reproducible runs
    #[arg(long)]
    seed: Option<u64>,

    /// Pretty-print the report
    #[arg(long)]
    pretty: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn")]
    log_level: String,

    /// Log output format ("text" or "json")
    #[arg(long, default_value = "text")]
    log_format: String,
}

fn parse_respawn_mode(value: &str) -> Result<RespawnMode, String> {
    match value {
        "restore" => Ok(RespawnMode::Restore),
        "drop-at-respawn" => Ok(RespawnMode::DropAtRespawn),
        other => Err(format!("unknown respawn mode: {other}")),
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args.log_level, &args.log_format);

    let loader = match &args.config {
        Some(path) => ConfigLoader::new().required_file(path),
        None => ConfigLoader::new().optional_file(default_config_path()),
    };
    let mut config = loader.load().context("loading configuration")?;
    if let Some(drop_chance) = args.drop_chance {
        config.drop_chance = drop_chance;
    }
    if let Some(mode) = args.respawn_mode {
        config.respawn_mode = mode;
    }
    if args.seed.is_some() {
        config.rng_seed = args.seed;
    }
    info!(
        drop_chance = config.drop_chance,
        respawn_mode = %config.respawn_mode,
        namespace = %config.capability_namespace,
        "configuration loaded"
    );

    let json = std::fs::read_to_string(&args.scenario)
        .with_context(|| format!("reading {}", args.scenario.display()))?;
    let scenario = Scenario::from_json(&json).context("parsing scenario")?;
    let report = replay(&scenario, config).context("replaying scenario")?;

    let out = if args.pretty {
        serde_json::to_string_pretty(&report)?
    } else {
        serde_json::to_string(&report)?
    };
    println!("{out}");
    Ok(())
}

/// Initialise the tracing subscriber.
///
/// `RUST_LOG` takes precedence over `level_str`. Pass `format = "json"` for
/// structured output; logs go to stderr so the report on stdout stays clean.
fn init_logging(level_str: &str, format: &str) {
    use tracing_subscriber::filter::EnvFilter;
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level_str));

    if format == "json" {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn respawn_mode_values() {
        assert_eq!(parse_respawn_mode("restore"), Ok(RespawnMode::Restore));
        assert_eq!(parse_respawn_mode("drop-at-respawn"), Ok(RespawnMode::DropAtRespawn));
        assert!(parse_respawn_mode("bury").is_err());
    }

    #[test]
    fn args_parse() {
        let args = Args::try_parse_from([
            "keep-replay",
            "scenario.json",
            "--drop-chance",
            "0.5",
            "--respawn-mode",
            "drop-at-respawn",
            "--seed",
            "3",
        ])
        .unwrap();
        assert_eq!(args.scenario, PathBuf::from("scenario.json"));
        assert_eq!(args.drop_chance, Some(0.5));
        assert_eq!(args.respawn_mode, Some(RespawnMode::DropAtRespawn));
        assert_eq!(args.seed, Some(3));
        assert_eq!(args.log_level, "warn");
    }

    #[test]
    fn sample_scenario_replays() {
        let json = include_str!("../scenarios/fall-and-double-death.json");
        let scenario = Scenario::from_json(json).unwrap();
        let report = replay(&scenario, keep_engine::EngineConfig::default()).unwrap();
        assert_eq!(report.steps.len(), scenario.steps.len());
        assert_eq!(report.pending_after, 0);
    }
}
