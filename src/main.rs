use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use jobtrack::{
    config, intake, ApplicationStatus, JobPosting, JsonFileStore, SavedJobRecord, Tracker,
};
use std::io::Read;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "jobtrack")]
#[command(about = "Saved jobs and application tracking")]
struct Cli {
    /// Path to the saved jobs file (defaults to $JOBTRACK_STORE or the data dir)
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Save job postings (JSON from FILE or stdin, or built from flags)
    Save {
        /// JSON file with a posting, a list of postings, or a search response
        file: Option<PathBuf>,

        /// Only save the posting at this position in the list
        #[arg(short, long)]
        index: Option<usize>,

        /// Job title (builds the posting from flags instead of JSON)
        #[arg(long)]
        title: Option<String>,

        /// Company name
        #[arg(long)]
        company: Option<String>,

        #[arg(long)]
        location: Option<String>,

        /// Where the posting came from, e.g. "via LinkedIn"
        #[arg(long)]
        via: Option<String>,

        #[arg(long)]
        description: Option<String>,
    },

    /// List saved jobs
    List {
        /// Filter by application status
        #[arg(short, long)]
        status: Option<StatusArg>,
    },

    /// Show a saved job
    Show {
        /// Job ID
        id: String,
    },

    /// Remove a saved job
    Remove {
        /// Job ID
        id: String,
    },

    /// Replace the notes on a saved job
    Notes {
        /// Job ID
        id: String,

        notes: String,
    },

    /// Set the application status of a saved job
    Status {
        /// Job ID
        id: String,

        status: StatusArg,
    },

    /// Mark a saved job as applied
    Apply {
        /// Job ID
        id: String,

        /// Path to a cover letter (read, but not sent anywhere)
        #[arg(short, long)]
        cover_letter: Option<PathBuf>,
    },

    /// Print the saved jobs file location
    Path,
}

#[derive(Clone, Copy, ValueEnum)]
enum StatusArg {
    NotApplied,
    Applied,
}

impl From<StatusArg> for ApplicationStatus {
    fn from(arg: StatusArg) -> Self {
        match arg {
            StatusArg::NotApplied => ApplicationStatus::NotApplied,
            StatusArg::Applied => ApplicationStatus::Applied,
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("jobtrack=warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let path = config::store_path(cli.store.as_deref());

    if let Commands::Path = cli.command {
        println!("{}", path.display());
        return Ok(());
    }

    let mut tracker = Tracker::open(JsonFileStore::new(&path))?;

    match cli.command {
        Commands::Save {
            file,
            index,
            title,
            company,
            location,
            via,
            description,
        } => {
            let postings = if title.is_some() || company.is_some() {
                let fields = [
                    ("location", location),
                    ("via", via),
                    ("description", description),
                ];
                let posting = fields.into_iter().fold(
                    JobPosting::new(title.unwrap_or_default(), company.unwrap_or_default()),
                    |posting, (key, value)| match value {
                        Some(value) => posting.with(key, value),
                        None => posting,
                    },
                );
                vec![posting]
            } else {
                let raw = read_input(file.as_ref())?;
                intake::select(intake::parse_postings(&raw)?, index)?
            };

            if postings.is_empty() {
                println!("No postings to save.");
            }
            for posting in postings {
                let id = tracker.save(posting)?;
                println!("Saved {}", id);
            }
        }

        Commands::List { status } => {
            let wanted = status.map(ApplicationStatus::from);
            let jobs: Vec<_> = tracker
                .list_all()
                .iter()
                .filter(|(_, r)| wanted.is_none_or(|s| r.application_status == s))
                .collect();

            if jobs.is_empty() {
                println!("No saved jobs found.");
            } else {
                println!(
                    "{:<32} {:<12} {:<26} {:<18} {:<16} {:<14}",
                    "ID", "STATUS", "TITLE", "COMPANY", "LOCATION", "VIA"
                );
                println!("{}", "-".repeat(123));
                for (id, record) in jobs {
                    let job = &record.job;
                    println!(
                        "{:<32} {:<12} {:<26} {:<18} {:<16} {:<14}",
                        truncate(id, 30),
                        record.application_status,
                        truncate(&job.title(), 24),
                        truncate(&job.company_name(), 16),
                        truncate(&job.location(), 14),
                        truncate(&job.via(), 12)
                    );
                }
            }
        }

        Commands::Show { id } => match tracker.get(&id) {
            Some(record) => print_record(&id, record),
            None => println!("Job '{}' not found.", id),
        },

        Commands::Remove { id } => {
            if tracker.remove(&id)? {
                println!("Removed {}", id);
            } else {
                println!("Job '{}' not found.", id);
            }
        }

        Commands::Notes { id, notes } => {
            if tracker.update_notes(&id, &notes)? {
                println!("Updated notes for {}", id);
            } else {
                println!("Job '{}' not found.", id);
            }
        }

        Commands::Status { id, status } => {
            let status = ApplicationStatus::from(status);
            if tracker.update_application_status(&id, status)? {
                println!("Marked {} as {}", id, status);
            } else {
                println!("Job '{}' not found.", id);
            }
        }

        Commands::Apply { id, cover_letter } => {
            let letter = cover_letter
                .map(|p| {
                    std::fs::read_to_string(&p)
                        .with_context(|| format!("Failed to read cover letter: {}", p.display()))
                })
                .transpose()?;

            let (ok, message) = tracker.apply(&id, letter.as_deref())?;
            if !ok {
                return Err(anyhow!("{}: {}", message, id));
            }
            println!("{}", message);
        }

        Commands::Path => unreachable!("handled before opening the store"),
    }

    Ok(())
}

fn read_input(file: Option<&PathBuf>) -> Result<String> {
    match file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read postings file: {}", path.display())),
        None => {
            let mut raw = String::new();
            std::io::stdin()
                .read_to_string(&mut raw)
                .context("Failed to read postings from stdin")?;
            Ok(raw)
        }
    }
}

fn print_record(id: &str, record: &SavedJobRecord) {
    let job = &record.job;
    println!("Job {}", id);
    println!("Title: {}", job.title());
    println!("Company: {}", job.company_name());
    let location = job.location();
    if !location.is_empty() {
        println!("Location: {}", location);
    }
    let via = job.via();
    if !via.is_empty() {
        println!("Source: {}", via);
    }
    println!("Status: {}", record.application_status);
    println!("Saved: {}", record.saved_at.to_rfc3339());
    if !record.notes.is_empty() {
        println!("Notes: {}", record.notes);
    }
    let links = job.related_links();
    if !links.is_empty() {
        println!("\nLinks:");
        for link in links {
            println!("  {} <{}>", link.text, link.link);
        }
    }
    let description = job.description();
    if !description.is_empty() {
        println!("\n--- Description ---");
        for line in textwrap::wrap(&description, 80) {
            println!("{}", line);
        }
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let head: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", head)
    }
}
