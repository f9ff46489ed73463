//! `schedule` CLI — manage a personal class/event schedule from the terminal.
//!
//! ## Usage
//!
//! ```sh
//! # Add a one-off event (times without an offset use the configured zone)
//! schedule add --title "Exam" --description "Finals" --location "Hall B" \
//!     --start 2024-06-14T09:00 --end 2024-06-14T11:00
//!
//! # Add a class repeating on Mondays and Wednesdays through June
//! schedule add --title "Algebra" --description "Lecture" --location "R101" \
//!     --start 2024-06-03T09:00 --end 2024-06-28T10:00 --repeat mon,wed
//!
//! # Check a slot without saving (exit status 1 on conflict)
//! schedule check --start 2024-06-03T09:30 --end 2024-06-03T10:30
//!
//! # Day agenda, upcoming events, everything
//! schedule agenda --date 2024-06-05
//! schedule upcoming --limit 3
//! schedule list --json
//!
//! # Notes
//! schedule note add "Bring calculator to the exam"
//! schedule note list
//! ```

mod config;
mod file_store;

use std::path::PathBuf;
use std::process;

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use env_logger::Env;
use log::info;
use schedule_engine::{
    find_conflicts, local_to_utc, parse_calendar_date, time::parse_naive, CandidateInterval,
    DstPolicy, NoteStore, Planner, RepeatDays, ScheduleDraft, SchedulePatch, ScheduleRecord,
    ScheduleStore,
};

use crate::config::{CliConfig, Settings};
use crate::file_store::{JsonFileStore, JsonNoteStore};

#[derive(Parser)]
#[command(
    name = "schedule",
    version,
    about = "Student schedule planner with conflict checking"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file (defaults to <config dir>/schedule/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// JSON data file holding the schedules
    #[arg(long, global = true)]
    data: Option<PathBuf>,

    /// Owner whose schedules to operate on
    #[arg(long, global = true)]
    owner: Option<String>,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a schedule, rejecting it if it overlaps an existing one
    Add {
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: String,
        #[arg(long)]
        location: String,
        /// Start, ISO 8601 (e.g. 2024-06-03T09:00 or 2024-06-03T09:00:00Z)
        #[arg(long)]
        start: String,
        /// End, ISO 8601
        #[arg(long)]
        end: String,
        /// Repeat days: indices 0-6 (0 = Sunday) or names, comma-separated
        #[arg(long, default_value = "")]
        repeat: String,
    },
    /// Report schedules a time range would clash with, without saving
    Check {
        #[arg(long)]
        start: String,
        #[arg(long)]
        end: String,
        #[arg(long, default_value = "")]
        repeat: String,
    },
    /// Show the schedules active on a date
    Agenda {
        /// Date as YYYY-MM-DD (UTC); defaults to today
        #[arg(long)]
        date: Option<String>,
    },
    /// Show schedules with a slot still ahead, soonest first
    Upcoming {
        #[arg(long)]
        limit: Option<usize>,
        /// Reference instant; defaults to now
        #[arg(long)]
        now: Option<String>,
    },
    /// List every schedule of the owner, ordered by start
    List,
    /// Change fields of an existing schedule
    Update {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        location: Option<String>,
        #[arg(long)]
        start: Option<String>,
        #[arg(long)]
        end: Option<String>,
        #[arg(long)]
        repeat: Option<String>,
    },
    /// Delete a schedule
    Delete { id: String },
    /// Jot down, list or delete free-text notes
    Note {
        #[command(subcommand)]
        action: NoteAction,
    },
}

#[derive(Subcommand)]
enum NoteAction {
    /// Add a note
    Add { text: String },
    /// List notes in the order they were added
    List,
    /// Delete a note by id
    Delete { id: i64 },
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let config = CliConfig::load(cli.config.as_deref())?;
    let settings = Settings::resolve(cli.data, cli.owner, config);

    let store = JsonFileStore::open(&settings.data_file)
        .with_context(|| format!("Failed to open {}", settings.data_file.display()))?;
    let planner = Planner::new(store);
    let owner = settings.owner.as_str();
    let json = cli.json;

    match cli.command {
        Commands::Add {
            title,
            description,
            location,
            start,
            end,
            repeat,
        } => {
            let draft = ScheduleDraft {
                title,
                description,
                location,
                start_date_time: parse_input_time(&start, &settings.timezone)?,
                end_date_time: parse_input_time(&end, &settings.timezone)?,
                repeat_days: parse_repeat(&repeat)?,
            };
            if !draft.repeat_days.is_empty()
                && draft.start_date_time.date_naive() == draft.end_date_time.date_naive()
            {
                bail!("A schedule that starts and ends on the same day cannot repeat");
            }

            let record = planner.add(owner, draft).context("Failed to add schedule")?;
            info!("added schedule {} for {}", record.id, owner);
            if json {
                println!("{}", serde_json::to_string_pretty(&record)?);
            } else {
                println!("Added {}", record.id);
            }
        }
        Commands::Check { start, end, repeat } => {
            let candidate = CandidateInterval::new(
                parse_input_time(&start, &settings.timezone)?,
                parse_input_time(&end, &settings.timezone)?,
                parse_repeat(&repeat)?,
            );
            if candidate.start_date_time >= candidate.end_date_time {
                bail!("Start must be before end");
            }

            let existing = planner.store().list(owner)?;
            let conflicts = find_conflicts(&candidate, &existing);
            if conflicts.is_empty() {
                println!("No conflict");
                return Ok(());
            }
            for c in &conflicts {
                println!(
                    "Conflicts with {} ({} min overlap)",
                    describe(c.existing),
                    c.overlap_minutes
                );
            }
            process::exit(1);
        }
        Commands::Agenda { date } => {
            let date = match date {
                Some(d) => parse_calendar_date(&d)?,
                None => Utc::now().date_naive(),
            };
            let agenda = planner.agenda(owner, date)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&agenda)?);
            } else if agenda.is_empty() {
                println!("Nothing scheduled on {}", date);
            } else {
                for record in &agenda {
                    println!("{}", describe(record));
                }
            }
        }
        Commands::Upcoming { limit, now } => {
            let now = match now {
                Some(s) => parse_input_time(&s, &settings.timezone)?,
                None => Utc::now(),
            };
            let limit = limit.unwrap_or(settings.upcoming_limit);
            let events = planner.upcoming(owner, now, Some(limit))?;
            if json {
                let records: Vec<&ScheduleRecord> = events.iter().map(|e| &e.record).collect();
                println!("{}", serde_json::to_string_pretty(&records)?);
            } else if events.is_empty() {
                println!("No upcoming events.");
            } else {
                for e in &events {
                    println!(
                        "{}  {}  @ {}",
                        e.start.format("%Y-%m-%d %H:%M"),
                        e.record.title,
                        e.record.location
                    );
                }
            }
        }
        Commands::List => {
            let records = planner.store().list(owner)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&records)?);
            } else {
                for record in &records {
                    println!("{}", describe(record));
                }
            }
        }
        Commands::Update {
            id,
            title,
            description,
            location,
            start,
            end,
            repeat,
        } => {
            let patch = SchedulePatch {
                title,
                description,
                location,
                start_date_time: start
                    .map(|s| parse_input_time(&s, &settings.timezone))
                    .transpose()?,
                end_date_time: end
                    .map(|s| parse_input_time(&s, &settings.timezone))
                    .transpose()?,
                repeat_days: repeat.map(|s| parse_repeat(&s)).transpose()?,
            };
            if patch.is_empty() {
                bail!("Nothing to update: pass at least one field");
            }
            let record = planner
                .update(owner, &id, patch)
                .with_context(|| format!("Failed to update {}", id))?;
            println!("Updated {}", record.id);
        }
        Commands::Delete { id } => {
            planner
                .delete(owner, &id)
                .with_context(|| format!("Failed to delete {}", id))?;
            println!("Deleted {}", id);
        }
        Commands::Note { action } => {
            let notes = JsonNoteStore::open(&settings.notes_file)
                .with_context(|| format!("Failed to open {}", settings.notes_file.display()))?;
            match action {
                NoteAction::Add { text } => {
                    let note = notes.add(owner, &text).context("Failed to add note")?;
                    if json {
                        println!("{}", serde_json::to_string_pretty(&note)?);
                    } else {
                        println!("Added note {}", note.id);
                    }
                }
                NoteAction::List => {
                    let list = notes.list(owner)?;
                    if json {
                        println!("{}", serde_json::to_string_pretty(&list)?);
                    } else if list.is_empty() {
                        println!("No notes.");
                    } else {
                        for note in &list {
                            println!("{}  {}", note.id, note.text);
                        }
                    }
                }
                NoteAction::Delete { id } => {
                    notes
                        .delete(owner, id)
                        .with_context(|| format!("Failed to delete note {}", id))?;
                    println!("Deleted note {}", id);
                }
            }
        }
    }

    Ok(())
}

/// Parse a time argument. Values with an offset are taken as-is; values
/// without one are wall-clock time in `timezone`.
fn parse_input_time(s: &str, timezone: &str) -> Result<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s.trim()) {
        return Ok(dt.with_timezone(&Utc));
    }
    let local = parse_naive(s)
        .with_context(|| format!("Invalid time '{}'. Expected YYYY-MM-DDTHH:MM[:SS]", s))?;
    Ok(local_to_utc(local, timezone, DstPolicy::default())?)
}

fn parse_repeat(s: &str) -> Result<RepeatDays> {
    s.parse::<RepeatDays>()
        .with_context(|| format!("Invalid repeat days '{}'", s))
}

/// One-line summary: `YYYY-MM-DD HH:MM-HH:MM  Title  @ Location  [days] (id)`.
fn describe(record: &ScheduleRecord) -> String {
    let mut line = format!(
        "{} {}-{}  {}  @ {}",
        record.start_date_time.format("%Y-%m-%d"),
        record.start_date_time.format("%H:%M"),
        record.end_date_time.format("%H:%M"),
        record.title,
        record.location
    );
    if record.is_recurring() {
        line.push_str(&format!(
            "  [{} until {}]",
            record.repeat_days.byday(),
            record.end_date()
        ));
    }
    line.push_str(&format!(" ({})", record.id));
    line
}
