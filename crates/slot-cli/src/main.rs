//! `slots` CLI — generate bookable exam slots from an availability schedule.
//!
//! The schedule is a JSON document with the availability rules plus the
//! optional closures, absences and bookings that suppress slots:
//!
//! ```json
//! {"rules": [...], "closures": [...], "absences": [...], "bookings": [...]}
//! ```
//!
//! ## Usage
//!
//! ```sh
//! # All bookable slots from tomorrow up to one year ahead (stdin → stdout)
//! slots generate < schedule.json
//!
//! # Second page of 20 slots for one laboratory, within April
//! slots generate -i schedule.json --laboratory lab-1 \
//!     --from 2026-04-01T00:00:00 --to 2026-04-30T00:00:00 --offset 20 --limit 20
//!
//! # Use the requested bounds as-is instead of clamping to the booking window
//! slots generate -i schedule.json --from 2026-03-02T09:20 --no-clamp
//!
//! # Report rules that violate their invariants
//! slots validate -i schedule.json
//! ```

use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{self, BufWriter, Read, Write};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use slot_engine::{
    generate_slots, paginate, AvailabilityRule, Blackout, BookingWindow, ConfirmedBooking,
    LaboratoryClosure, OperatorAbsence, QueryWindow, RuleFilter,
};

#[derive(Parser)]
#[command(
    name = "slots",
    version,
    about = "Generate bookable exam slots from weekly operator availability"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log debug output to stderr (overrides RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate the bookable slots for a schedule
    Generate {
        /// Input schedule file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
        /// Earliest slot start (inclusive), e.g. 2026-04-01T09:00:00
        #[arg(long)]
        from: Option<String>,
        /// Last slot date (inclusive); the time of day is ignored, e.g. 2026-04-30
        #[arg(long)]
        to: Option<String>,
        /// Reference time for the booking window (defaults to the local clock)
        #[arg(long)]
        now: Option<String>,
        /// Days between now and the first bookable day
        #[arg(long, default_value_t = 1)]
        min_lead_days: u32,
        /// Days between now and the last bookable day
        #[arg(long, default_value_t = 365)]
        max_horizon_days: u32,
        /// Use --from/--to as given instead of clamping them to the booking window
        #[arg(long)]
        no_clamp: bool,
        /// Only rules for this exam type
        #[arg(long)]
        exam_type: Option<String>,
        /// Only rules (and absences) for this operator
        #[arg(long)]
        operator: Option<String>,
        /// Only rules (and closures) for this laboratory
        #[arg(long)]
        laboratory: Option<String>,
        /// Number of slots to skip (requires --limit)
        #[arg(long, requires = "limit")]
        offset: Option<usize>,
        /// Page size; wraps the output in an {offset, limit, total_slots, slots} envelope
        #[arg(long)]
        limit: Option<usize>,
        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,
    },
    /// Check every rule in a schedule and report the invalid ones
    Validate {
        /// Input schedule file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
    },
}

/// Input document: the snapshot of rules, blackouts and bookings to generate from.
#[derive(Deserialize)]
struct Schedule {
    rules: Vec<AvailabilityRule>,
    #[serde(default)]
    closures: Option<Vec<LaboratoryClosure>>,
    #[serde(default)]
    absences: Option<Vec<OperatorAbsence>>,
    #[serde(default)]
    bookings: Option<Vec<ConfirmedBooking>>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Generate {
            input,
            output,
            from,
            to,
            now,
            min_lead_days,
            max_horizon_days,
            no_clamp,
            exam_type,
            operator,
            laboratory,
            offset,
            limit,
            pretty,
        } => {
            let schedule = read_schedule(input.as_deref())?;
            let from = from.as_deref().map(parse_datetime).transpose()?;
            let to = to.as_deref().map(parse_datetime).transpose()?;

            let window = if no_clamp {
                match (from, to) {
                    (Some(f), Some(t)) => Some(QueryWindow::new(f, t)?),
                    _ => None,
                }
            } else {
                let now = match now.as_deref() {
                    Some(raw) => parse_datetime(raw)?,
                    None => chrono::Local::now().naive_local(),
                };
                let policy = BookingWindow::from_days(min_lead_days, max_horizon_days)?;
                Some(policy.resolve(now, from, to)?)
            };
            let (from, to) = match window {
                Some(w) => (Some(w.from), Some(w.to)),
                None => (from, to),
            };
            info!(from = ?from, to = ?to, "slot generation window");

            let filter = RuleFilter {
                exam_type_id: exam_type,
                operator_id: operator,
                laboratory_id: laboratory,
            };
            let rules = filter.select(&schedule.rules);
            let closures = schedule.closures.map(|c| filter.select_closures(&c));
            let absences = schedule.absences.map(|a| filter.select_absences(&a));
            debug!(
                rules = rules.len(),
                closures = closures.as_ref().map_or(0, Vec::len),
                absences = absences.as_ref().map_or(0, Vec::len),
                bookings = schedule.bookings.as_ref().map_or(0, Vec::len),
                "schedule loaded"
            );

            let slots = generate_slots(
                &rules,
                from,
                to,
                closures.as_deref(),
                absences.as_deref(),
                schedule.bookings.as_deref(),
            );
            info!("generated {} slots", slots.len());

            match limit {
                Some(limit) => {
                    let page = paginate(slots, offset.unwrap_or(0), limit)?;
                    emit_json(output.as_deref(), &page, pretty)?;
                }
                None => emit_json(output.as_deref(), &slots, pretty)?,
            }
        }
        Commands::Validate { input } => {
            let schedule = read_schedule(input.as_deref())?;

            let mut invalid = 0;
            for rule in &schedule.rules {
                match rule.validate() {
                    Ok(()) => println!("ok       {}", rule.id),
                    Err(err) => {
                        invalid += 1;
                        println!("invalid  {}", err);
                    }
                }
            }

            let malformed = count_malformed(schedule.closures.as_deref())
                + count_malformed(schedule.absences.as_deref());
            if malformed > 0 {
                println!("{} blackout record(s) are malformed and will be ignored", malformed);
            }

            if invalid > 0 {
                anyhow::bail!(
                    "{} of {} rules are invalid",
                    invalid,
                    schedule.rules.len()
                );
            }
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn count_malformed<B: Blackout>(blackouts: Option<&[B]>) -> usize {
    blackouts
        .unwrap_or_default()
        .iter()
        .filter(|b| !b.is_well_formed())
        .count()
}

/// Parse a local datetime. Accepts `YYYY-MM-DDTHH:MM:SS`, `YYYY-MM-DDTHH:MM`
/// (a space may replace the `T`), or a bare `YYYY-MM-DD` meaning midnight.
fn parse_datetime(raw: &str) -> Result<NaiveDateTime> {
    let s = raw.trim();
    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Ok(dt);
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map(|date| date.and_time(NaiveTime::MIN))
        .with_context(|| format!("Invalid datetime: '{}'", raw))
}

fn read_schedule(path: Option<&str>) -> Result<Schedule> {
    let raw = match path {
        Some(path) => {
            fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path))?
        }
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read from stdin")?;
            buf
        }
    };
    serde_json::from_str(&raw).context("Failed to parse schedule JSON")
}

/// Serialize `value` as one JSON document followed by a newline, into the
/// file at `path` or to stdout.
fn emit_json<T: Serialize>(path: Option<&str>, value: &T, pretty: bool) -> Result<()> {
    let mut out: Box<dyn Write> = match path {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("Failed to write file: {}", path))?,
        )),
        None => Box::new(io::stdout().lock()),
    };
    if pretty {
        serde_json::to_writer_pretty(&mut out, value)?;
    } else {
        serde_json::to_writer(&mut out, value)?;
    }
    writeln!(out)?;
    out.flush().context("Failed to flush output")?;
    Ok(())
}
