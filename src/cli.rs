//! Command-line surface: the server plus client commands over any backend.

use std::io::Write;
use std::net::IpAddr;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand};

use crate::api::{self, AppState};
use crate::config::{db_path_in, ServerConfig, DEFAULT_PORT};
use crate::error::{Result, TrackerError};
use crate::inventory::{search, InventorySummary};
use crate::model::{Material, NewSpool, NewUsageLog, Photo, Spool, SpoolId};
use crate::store::{LocalStore, SpoolStore, StoreConfig};

#[derive(Debug, Parser)]
#[command(name = "filament-tracker", version, about = "Track 3D-printing filament spools and their usage")]
pub struct Cli {
    /// Talk to a running server instead of the local database
    #[arg(long, global = true, env = "FILAMENT_REMOTE_URL")]
    pub remote: Option<String>,

    /// Directory holding filament.db
    #[arg(long, global = true, env = "FILAMENT_DATA_DIR", default_value = "data")]
    pub data_dir: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the HTTP API server
    Serve {
        #[arg(long, env = "PORT", default_value_t = DEFAULT_PORT)]
        port: u16,
        #[arg(long, default_value = "0.0.0.0")]
        host: IpAddr,
    },
    /// List spools
    List {
        /// Filter by brand, color or material
        #[arg(short, long)]
        search: Option<String>,
    },
    /// Show one spool and its history
    Show { id: SpoolId },
    /// Add a spool
    Add(AddArgs),
    /// Log filament used by a print
    Use {
        id: SpoolId,
        #[arg(value_parser = parse_grams)]
        grams: f64,
        #[arg(long)]
        note: Option<String>,
    },
    /// Log filament added back to a spool
    Restock {
        id: SpoolId,
        #[arg(value_parser = parse_grams)]
        grams: f64,
        #[arg(long)]
        note: Option<String>,
    },
    /// Delete a spool and its history
    Delete { id: SpoolId },
}

#[derive(Debug, Args)]
pub struct AddArgs {
    #[arg(long)]
    pub brand: String,
    #[arg(long)]
    pub color: String,
    #[arg(long)]
    pub material: String,
    /// Current weight in grams
    #[arg(long)]
    pub weight: f64,
    /// Weight at purchase in grams (defaults to --weight)
    #[arg(long)]
    pub initial_weight: Option<f64>,
    #[arg(long)]
    pub cost: f64,
    /// Purchase date, YYYY-MM-DD (defaults to today)
    #[arg(long)]
    pub purchased: Option<NaiveDate>,
    /// Image file to attach
    #[arg(long)]
    pub photo: Option<PathBuf>,
}

fn parse_grams(s: &str) -> std::result::Result<f64, String> {
    let grams: f64 = s.parse().map_err(|_| format!("'{}' is not a number", s))?;
    if !grams.is_finite() || grams <= 0.0 {
        return Err("amount must be a positive number of grams".to_string());
    }
    Ok(grams)
}

impl Cli {
    pub fn store_config(&self) -> StoreConfig {
        match &self.remote {
            Some(url) => StoreConfig::remote(url.clone()),
            None => StoreConfig::local(db_path_in(&self.data_dir)),
        }
    }
}

/// Execute a parsed command line
pub async fn run(cli: Cli) -> Result<()> {
    if let Command::Serve { port, host } = &cli.command {
        if cli.remote.is_some() {
            return Err(TrackerError::Validation(
                "serve always uses the local database; drop --remote".to_string(),
            ));
        }
        let config = ServerConfig::new(*host, *port, cli.data_dir.clone());
        return serve(config).await;
    }

    let store = cli.store_config().build().await?;
    let mut out = std::io::stdout().lock();
    execute(cli.command, store.as_ref(), &mut out).await
}

async fn serve(config: ServerConfig) -> Result<()> {
    let db_path = config.db_path();
    let store = LocalStore::open(&db_path).await?;
    tracing::info!("Database stored at {:?}", db_path);

    let state = Arc::new(AppState::new(store));
    let listener = tokio::net::TcpListener::bind(config.addr()).await?;
    tracing::info!("Filament tracker listening on http://{}", config.addr());

    api::serve(listener, state).await?;
    Ok(())
}

/// Run a client command against whichever store was configured
pub async fn execute(command: Command, store: &dyn SpoolStore, out: &mut impl Write) -> Result<()> {
    match command {
        Command::Serve { .. } => Err(TrackerError::Validation(
            "serve is not a client command".to_string(),
        )),
        Command::List { search: query } => {
            let spools = store.list_spools().await?;
            let shown = search(&spools, query.as_deref().unwrap_or(""));
            if shown.is_empty() {
                writeln!(out, "No filaments found.")?;
                return Ok(());
            }
            for spool in &shown {
                write_spool_line(out, spool)?;
            }
            let summary = InventorySummary::from_spools(shown.iter().copied());
            writeln!(
                out,
                "{} spools, {:.0}g remaining, ${:.2} spent, {} low on stock",
                summary.spool_count,
                summary.total_remaining_grams,
                summary.total_cost,
                summary.low_stock_count
            )?;
            Ok(())
        }
        Command::Show { id } => {
            let spool = store
                .get_spool(id)
                .await?
                .ok_or(TrackerError::SpoolNotFound(id))?;
            write_spool_detail(out, &spool)?;

            let logs = store.list_logs(id).await?;
            writeln!(out, "History:")?;
            if logs.is_empty() {
                writeln!(out, "  No history logs yet.")?;
            }
            for log in logs {
                writeln!(
                    out,
                    "  {}  {:<20} {:>+8}g  {}",
                    log.date.with_timezone(&Local).format("%Y-%m-%d %H:%M"),
                    log.kind().to_string(),
                    log.change_amount,
                    log.note.unwrap_or_default()
                )?;
            }
            Ok(())
        }
        Command::Add(args) => {
            let spool = new_spool_from_args(args).await?;
            let id = store.add_spool(spool).await?;
            writeln!(out, "Added spool #{}", id)?;
            Ok(())
        }
        Command::Use { id, grams, note } => {
            let log = NewUsageLog::usage(id, grams).with_note(note.unwrap_or_default());
            let weight = store.record_change(log).await?;
            writeln!(out, "Spool #{}: used {}g, {}g left", id, grams, weight)?;
            Ok(())
        }
        Command::Restock { id, grams, note } => {
            let log = NewUsageLog::restock(id, grams).with_note(note.unwrap_or_default());
            let weight = store.record_change(log).await?;
            writeln!(out, "Spool #{}: added {}g, now {}g", id, grams, weight)?;
            Ok(())
        }
        Command::Delete { id } => {
            store.delete_spool(id).await?;
            writeln!(out, "Deleted spool #{}", id)?;
            Ok(())
        }
    }
}

async fn new_spool_from_args(args: AddArgs) -> Result<NewSpool> {
    let material: Material = args.material.parse()?;
    let purchased = args.purchased.unwrap_or_else(|| Local::now().date_naive());
    let mut spool = NewSpool::new(args.brand, args.color, material, args.weight, args.cost, purchased);
    if let Some(initial) = args.initial_weight {
        spool = spool.with_initial_weight(initial);
    }
    if let Some(path) = args.photo {
        let data = tokio::fs::read(&path).await?;
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or_default();
        spool = spool.with_photo(Photo::new(Photo::mime_for_extension(ext), data));
    }
    Ok(spool)
}

fn write_spool_line(out: &mut impl Write, spool: &Spool) -> std::io::Result<()> {
    writeln!(
        out,
        "#{:<4} {:<16} {:<16} {:<8} {:>7}g {:>4.0}%  ${:<8.2} [{}]{}",
        spool.id,
        spool.brand,
        spool.color,
        spool.material.as_str(),
        spool.weight,
        spool.remaining_percent(),
        spool.cost,
        spool.stock_level(),
        if spool.photo.is_some() { " (photo)" } else { "" }
    )
}

fn write_spool_detail(out: &mut impl Write, spool: &Spool) -> std::io::Result<()> {
    writeln!(out, "{} {} ({})", spool.brand, spool.color, spool.material)?;
    writeln!(out, "  Spool:      #{}", spool.id)?;
    writeln!(
        out,
        "  Remaining:  {}g of {}g ({:.0}% left){}",
        spool.weight,
        spool.initial_weight,
        spool.remaining_percent(),
        if spool.is_empty() { ", empty" } else { "" }
    )?;
    writeln!(out, "  Cost:       ${:.2}", spool.cost)?;
    writeln!(out, "  Purchased:  {}", spool.purchase_date)?;
    if let Some(photo) = &spool.photo {
        writeln!(out, "  Photo:      {} ({} bytes)", photo.mime_type, photo.data.len())?;
    }
    Ok(())
}
