// File: src/main.rs
use anyhow::{Context, Result};
use calsift::color_utils::ansi_badge;
use calsift::config::Config;
use calsift::convert::{ConvertError, convert_file};
use calsift::engine::EventEngine;
use calsift::model::{ParsedEvent, PatternBadge, ViewMode, parse_pattern_list};
use calsift::storage::EventFile;
use clap::{Parser, Subcommand};
use std::io::IsTerminal;
use std::path::PathBuf;
use tracing::{info, warn};

/// Calendar event normalization and filtering
#[derive(Parser)]
#[command(name = "calsift", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert an iCalendar export into the normalized events file
    Convert {
        input: PathBuf,
        /// Defaults to the configured events file
        output: Option<PathBuf>,
        #[arg(long)]
        calendar_id: Option<String>,
        #[arg(long)]
        calendar_name: Option<String>,
    },
    /// Print the filtered view of the events file
    List {
        /// Show past events, newest first
        #[arg(long)]
        past: bool,
        #[arg(long, value_name = "FILE")]
        events: Option<PathBuf>,
        /// Comma separated patterns replacing the configured badges
        #[arg(long, value_name = "PATTERNS")]
        only: Option<String>,
        #[arg(long)]
        json: bool,
    },
    /// Write a default config file if none exists
    Init,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "calsift=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Convert {
            input,
            output,
            calendar_id,
            calendar_name,
        } => cmd_convert(input, output, calendar_id, calendar_name),
        Commands::List {
            past,
            events,
            only,
            json,
        } => cmd_list(past, events, only, json),
        Commands::Init => cmd_init(),
    }
}

fn load_config() -> Config {
    match Config::load() {
        Ok(cfg) => cfg,
        Err(e) => {
            info!("using default config ({})", e);
            Config::default()
        }
    }
}

fn cmd_convert(
    input: PathBuf,
    output: Option<PathBuf>,
    calendar_id: Option<String>,
    calendar_name: Option<String>,
) -> Result<()> {
    let config = load_config();
    let output = match output {
        Some(path) => path,
        None => config.events_path()?,
    };
    let calendar_id = calendar_id.unwrap_or_else(|| config.calendar_id.clone());
    let calendar_name = calendar_name.unwrap_or_else(|| config.calendar_name.clone());

    let (events, report) = match convert_file(&input, &output, &calendar_id, &calendar_name) {
        Ok(done) => done,
        Err(e) => {
            if let Some(ConvertError::InputNotFound(path)) = e.downcast_ref::<ConvertError>() {
                eprintln!("Error: input file not found: {}", path.display());
                std::process::exit(1);
            }
            return Err(e);
        }
    };

    println!("Events parsed:  {}", report.parsed);
    println!("Events kept:    {}", report.kept);
    println!("Events removed: {}", report.removed);
    if !report.ignored_keys.is_empty() {
        let keys: Vec<&str> = report.ignored_keys.iter().map(String::as_str).collect();
        println!("Ignored keys:   {}", keys.join(", "));
    }
    println!("Output:         {}", output.display());
    if let Some(sample) = events.first() {
        println!();
        println!("Sample record:");
        println!("{}", serde_json::to_string_pretty(sample)?);
    }
    Ok(())
}

fn cmd_list(past: bool, events: Option<PathBuf>, only: Option<String>, json: bool) -> Result<()> {
    let config = load_config();
    let path = match events {
        Some(path) => path,
        None => config.events_path()?,
    };
    let base = EventFile::load(&path)?;
    if base.is_empty() {
        warn!("no events in {:?}", path);
    }

    let mut engine = EventEngine::from_config(base, &config);
    if past {
        engine.set_view_mode(ViewMode::Past);
    }
    if let Some(raw) = only {
        let patterns = parse_pattern_list(&raw);
        if patterns.is_empty() {
            anyhow::bail!("--only needs at least one pattern");
        }
        engine.set_pattern_badges(vec![PatternBadge::new(patterns, &raw, "#3498db")]);
        if !engine.visible_patterns().contains(&0) {
            engine.toggle_pattern_visibility(0);
        }
    }

    if json {
        let out = serde_json::to_string_pretty(engine.filtered_events())
            .context("Failed to serialize view")?;
        println!("{}", out);
        return Ok(());
    }

    let color = std::io::stdout().is_terminal();
    for parsed in engine.filtered_events() {
        println!("{}", format_line(parsed, color));
    }
    info!(
        "{} of {} events ({} view)",
        engine.filtered_events().len(),
        engine.base_events().len(),
        engine.view_mode()
    );
    Ok(())
}

fn format_line(parsed: &ParsedEvent, color: bool) -> String {
    let event = &parsed.event;
    let mut line = format!("{}  ", event.start_time.format("%Y-%m-%d %H:%M"));

    for badge in &parsed.matched_patterns {
        if color {
            line.push_str(&ansi_badge(&badge.text, &badge.color));
        } else {
            line.push_str(&format!("[{}]", badge.text));
        }
        line.push(' ');
    }

    match (&parsed.matched_band, color) {
        (Some(band), true) => line.push_str(&ansi_badge(&event.title, &band.color)),
        _ => line.push_str(&event.title),
    }

    if let Some(venue) = &event.venue {
        line.push_str(&format!(" @ {}", venue));
    }
    line
}

fn cmd_init() -> Result<()> {
    let path = calsift::paths::AppPaths::get_config_file_path()?;
    if path.exists() {
        println!("Config already exists: {}", path.display());
        return Ok(());
    }
    Config::default().save()?;
    println!("Wrote default config: {}", path.display());
    Ok(())
}
