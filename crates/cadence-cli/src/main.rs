use anyhow::{bail, Context};
use cadence_core::config::CadenceConfig;
use cadence_engine::{validate::validate_json, FixedClock, JobDescription, RecurrenceEngine};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use clap::{Parser, Subcommand};
use tracing::{debug, info};

const OUTPUT_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Compute and describe recurring job schedules.
#[derive(Debug, Parser)]
#[command(name = "cadence", version)]
struct Cli {
    /// Config file (default: $CADENCE_CONFIG or ~/.cadence/cadence.toml).
    #[arg(long, global = true)]
    config: Option<String>,

    /// Pin "now" instead of reading the wall clock, e.g. 2015-09-23T10:30.
    #[arg(long, global = true, value_parser = parse_datetime)]
    now: Option<NaiveDateTime>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Check a rule; prints `ok` or the reason it is rejected.
    Validate {
        #[arg(long)]
        rule: String,
    },
    /// First occurrence of a job that has never run.
    First {
        #[arg(long)]
        rule: String,
        #[arg(long)]
        date: NaiveDate,
        /// Time of day, HH:MM.
        #[arg(long, value_parser = parse_time)]
        time: NaiveTime,
    },
    /// Occurrence following a firing at `--from`.
    Next {
        #[arg(long)]
        rule: String,
        #[arg(long, value_parser = parse_datetime)]
        from: NaiveDateTime,
    },
    /// English description of a job's schedule.
    Describe {
        #[arg(long)]
        job: String,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // config: --config > CADENCE_CONFIG env > ~/.cadence/cadence.toml
    let config_path = cli
        .config
        .clone()
        .or_else(|| std::env::var("CADENCE_CONFIG").ok());
    let config_result = CadenceConfig::load(config_path.as_deref());
    let config = config_result.as_ref().cloned().unwrap_or_default();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log.filter.as_str().into()),
        )
        .init();

    if let Err(e) = &config_result {
        tracing::warn!("Config load failed ({}), using defaults", e);
    }

    let engine = match cli.now {
        Some(now) => {
            info!(%now, "engine clock pinned from command line");
            RecurrenceEngine::with_clock(FixedClock::new(now))
        }
        None => RecurrenceEngine::from_config(&config.engine),
    };
    debug!(?engine, "engine ready");

    match cli.command {
        Command::Validate { rule } => {
            let value = parse_json(&rule)?;
            match validate_json(&value) {
                Ok(_) => println!("ok"),
                Err(e) => {
                    println!("{e}");
                    std::process::exit(1);
                }
            }
        }
        Command::First { rule, date, time } => {
            let rule = validate_json(&parse_json(&rule)?)?;
            let minutes = time.hour() * 60 + time.minute();
            let first = engine.first_occurrence(&rule, date, minutes)?;
            println!("{}", first.format(OUTPUT_FORMAT));
        }
        Command::Next { rule, from } => {
            let rule = validate_json(&parse_json(&rule)?)?;
            let next = engine.next_occurrence(&rule, from)?;
            println!("{}", next.format(OUTPUT_FORMAT));
        }
        Command::Describe { job } => {
            let job: JobDescription =
                serde_json::from_str(&job).context("job description is not valid JSON")?;
            println!("{}", engine.describe(&job));
        }
    }

    Ok(())
}

fn parse_json(input: &str) -> anyhow::Result<serde_json::Value> {
    serde_json::from_str(input).context("rule is not valid JSON")
}

fn parse_datetime(input: &str) -> anyhow::Result<NaiveDateTime> {
    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(input, format) {
            return Ok(dt);
        }
    }
    bail!("expected YYYY-MM-DDTHH:MM[:SS], got {input:?}")
}

fn parse_time(input: &str) -> anyhow::Result<NaiveTime> {
    NaiveTime::parse_from_str(input, "%H:%M").with_context(|| format!("expected HH:MM, got {input:?}"))
}
