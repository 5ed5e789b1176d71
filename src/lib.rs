//! chatwarden: webhook-driven moderation backend for group-chat bots.
//!
//! chatwarden receives inbound chat messages (Telegram-style webhook updates),
//! matches their text against configurable word lists, applies a moderation
//! decision (remove the message, temporarily mute the sender), and records the
//! outcome for later reporting. It decides and records; platform-level
//! enforcement (the actual delete/mute API call) belongs to the caller.
//!
//! # Architecture
//!
//! - **Moderation store**: one SQLite database (`moderation.db`) holding the
//!   word filters, bot settings, warning ledger, moderation log, and daily
//!   aggregates. All access is serialized through [`core::broker::DbBroker`],
//!   which also appends a structured audit line per operation.
//! - **Decision engine** ([`core::engine`]): the only component with decision
//!   logic and state coupling. Its write set commits as one transaction.
//! - **Plugins** ([`plugins`]): thin admin/reporting surfaces — filter lists,
//!   settings, warning ledger, moderation log, statistics.
//!
//! # Example
//!
//! ```bash
//! chatwarden init
//! chatwarden filters add --category spam "buy now"
//! chatwarden filters add --category profanity damn
//! echo '{"message":{"text":"oh damn","from":{"id":7},"chat":{"id":-100}}}' \
//!     | chatwarden process
//! chatwarden stats today
//! ```

pub mod core;
pub mod plugins;

use core::{db, engine, error, store::Store};
use plugins::{filters, modlog, settings, stats, warnings};

use clap::{Parser, Subcommand};
use colored::Colorize;
use std::io::Read;
use std::path::{Path, PathBuf};

const DATA_DIR: &str = ".chatwarden";

#[derive(Parser, Debug)]
#[clap(
    name = "chatwarden",
    version = env!("CARGO_PKG_VERSION"),
    about = "Word-filter moderation backend: decide, record, report"
)]
struct Cli {
    #[clap(subcommand)]
    command: Command,
}

#[derive(clap::Args, Debug)]
struct InitCli {
    /// Directory to initialize (defaults to current working directory).
    #[clap(short, long)]
    dir: Option<PathBuf>,
}

#[derive(clap::Args, Debug)]
struct ProcessCli {
    /// Webhook update JSON; reads stdin when absent.
    #[clap(long)]
    file: Option<PathBuf>,
}

#[derive(clap::Args, Debug)]
struct SchemaCli {
    /// Optional: filter by subsystem name.
    #[clap(long)]
    subsystem: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Initialize the moderation store and seed default settings
    #[clap(name = "init", visible_alias = "i")]
    Init(InitCli),

    /// Process one webhook update through the decision engine
    #[clap(name = "process", visible_alias = "p")]
    Process(ProcessCli),

    /// Manage moderation word lists
    #[clap(name = "filters", visible_alias = "f")]
    Filters(filters::FiltersCli),

    /// Manage bot settings
    #[clap(name = "settings")]
    Settings(settings::SettingsCli),

    /// Show recent moderation actions
    #[clap(name = "logs", visible_alias = "l")]
    Logs(modlog::LogsCli),

    /// Moderation statistics
    #[clap(name = "stats", visible_alias = "s")]
    Stats(stats::StatsCli),

    /// Inspect the per-user warning ledger
    #[clap(name = "warnings", visible_alias = "w")]
    Warnings(warnings::WarningsCli),

    /// Show the brokered-mutation audit log
    #[clap(name = "audit")]
    Audit,

    /// Subsystem schemas and discovery
    #[clap(name = "schema")]
    Schema(SchemaCli),
}

fn find_project_root(start_dir: &Path) -> Result<PathBuf, error::WardenError> {
    let mut current_dir = PathBuf::from(start_dir);
    loop {
        if current_dir.join(DATA_DIR).exists() {
            return Ok(current_dir);
        }
        if !current_dir.pop() {
            return Err(error::WardenError::NotFound(format!(
                "'{}' directory not found in current or parent directories. Run `chatwarden init` first.",
                DATA_DIR
            )));
        }
    }
}

fn run_init(init: InitCli) -> Result<(), error::WardenError> {
    let target_dir = match init.dir {
        Some(d) => d,
        None => std::env::current_dir()?,
    };
    let target_dir = std::fs::canonicalize(&target_dir).map_err(error::WardenError::Io)?;

    let data_root = target_dir.join(DATA_DIR).join("data");
    std::fs::create_dir_all(&data_root).map_err(error::WardenError::Io)?;

    db::initialize_moderation_db(&data_root)?;
    println!(
        "    {} {}",
        "●".bright_green(),
        core::schemas::MODERATION_DB_NAME.bright_white()
    );

    let store = Store::new(data_root);
    let seeded = settings::seed_defaults(&store)?;
    if seeded > 0 {
        println!(
            "    {} {} default setting(s) seeded",
            "●".bright_green(),
            seeded
        );
    } else {
        println!(
            "    {} settings {}",
            "✓".bright_green(),
            "(preserved - existing values kept)".bright_black()
        );
    }

    println!();
    println!(
        "{} chatwarden initialized at {}",
        "✓".bright_green(),
        target_dir.join(DATA_DIR).display()
    );
    Ok(())
}

fn run_process(store: &Store, process: ProcessCli) -> Result<(), error::WardenError> {
    let raw = match process.file {
        Some(path) => std::fs::read_to_string(&path).map_err(error::WardenError::Io)?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .map_err(error::WardenError::Io)?;
            buf
        }
    };

    let update: serde_json::Value = serde_json::from_str(&raw)
        .map_err(|e| error::WardenError::ValidationError(format!("invalid update JSON: {}", e)))?;

    let decision = engine::process_update(store, &update)?;

    // Response envelope from the original deployment: {success, action, reason}.
    let envelope = serde_json::json!({
        "success": true,
        "action": decision.action.as_str(),
        "reason": decision.reason,
    });
    println!("{}", envelope);
    Ok(())
}

pub fn run() -> Result<(), error::WardenError> {
    let cli = Cli::parse();
    let current_dir = std::env::current_dir()?;

    let command = match cli.command {
        Command::Init(init) => return run_init(init),
        other => other,
    };

    let project_root = find_project_root(&current_dir)?;
    let data_root = project_root.join(DATA_DIR).join("data");
    std::fs::create_dir_all(&data_root).map_err(error::WardenError::Io)?;
    let store = Store::new(data_root.clone());

    match command {
        Command::Process(process) => run_process(&store, process)?,
        Command::Filters(filters_cli) => filters::run_filters_cli(&store, filters_cli)?,
        Command::Settings(settings_cli) => settings::run_settings_cli(&store, settings_cli)?,
        Command::Logs(logs_cli) => modlog::run_logs_cli(&store, logs_cli)?,
        Command::Stats(stats_cli) => stats::run_stats_cli(&store, stats_cli)?,
        Command::Warnings(warnings_cli) => warnings::run_warnings_cli(&store, warnings_cli)?,
        Command::Audit => {
            let audit_log = data_root.join("broker.events.jsonl");
            if audit_log.exists() {
                let content = std::fs::read_to_string(audit_log)?;
                print!("{}", content);
            } else {
                println!("No audit log found.");
            }
        }
        Command::Schema(schema_cli) => {
            let mut schemas = std::collections::BTreeMap::new();
            schemas.insert("broker", core::broker::schema());
            schemas.insert("filters", filters::schema());
            schemas.insert("settings", settings::schema());
            schemas.insert("warnings", warnings::schema());
            schemas.insert("modlog", modlog::schema());
            schemas.insert("stats", stats::schema());

            let output = if let Some(sub) = schema_cli.subsystem {
                schemas
                    .get(sub.as_str())
                    .cloned()
                    .unwrap_or(serde_json::json!({ "error": "subsystem not found" }))
            } else {
                serde_json::json!({
                    "schema_version": "1.0.0",
                    "subsystems": schemas
                })
            };
            let json = serde_json::to_string_pretty(&output)
                .map_err(|e| error::WardenError::ValidationError(e.to_string()))?;
            println!("{}", json);
        }
        Command::Init(_) => unreachable!(),
    }

    Ok(())
}
