//! AyurChain CLI
//!
//! Record harvest, lab and processing events, look up a batch, and inspect
//! the ledger.

#![warn(missing_docs)]
#![warn(clippy::all)]

use ayurchain_ledger::{
    BatchTrace, Block, HarvestEvent, LabTestEvent, ProcessingEvent, RoleEvent,
};
use ayurchain_storage::{Ledger, LedgerConfig, LoadPolicy};
use clap::{Parser, Subcommand};
use color_eyre::eyre::{bail, WrapErr};
use color_eyre::Result;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ayurchain")]
#[command(about = "AyurChain - tamper-evident traceability for Ayurvedic herbs", long_about = None)]
struct Cli {
    /// Ledger file
    #[arg(long, global = true, env = "AYURCHAIN_LEDGER", default_value = LedgerConfig::DEFAULT_PATH)]
    ledger: PathBuf,
    /// Do not take the ledger lock file
    #[arg(long, global = true)]
    no_lock: bool,
    /// Refuse to open a ledger that fails verification
    #[arg(long, global = true)]
    verify_on_load: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Record a harvest
    Farmer {
        /// Farmer name
        #[arg(long)]
        farmer: String,
        /// Herb or crop
        #[arg(long)]
        herb: String,
        /// GPS location as "lat,long"
        #[arg(long)]
        gps: String,
        /// Batch ID
        #[arg(long)]
        batch_id: String,
    },
    /// Record a quality test
    Lab {
        /// Batch ID
        #[arg(long)]
        batch_id: String,
        /// Lab name
        #[arg(long)]
        lab: String,
        /// DNA verification passed
        #[arg(long)]
        dna_verified: bool,
        /// Pesticide level or notes
        #[arg(long, default_value = "")]
        pesticide_level: String,
    },
    /// Record a processing step
    Processor {
        /// Batch ID
        #[arg(long)]
        batch_id: String,
        /// Step (Drying / Grinding / Packaging)
        #[arg(long)]
        process: String,
        /// Free-form notes
        #[arg(long, default_value = "")]
        notes: String,
    },
    /// Look up every record for a batch
    Verify {
        /// Batch ID
        #[arg(long)]
        batch_id: String,
        /// Write the batch trace as JSON
        #[arg(long)]
        report: Option<PathBuf>,
    },
    /// Show the whole ledger and its validity
    Ledger {
        /// Print raw JSON records
        #[arg(long)]
        json: bool,
    },
}

impl Cli {
    fn ledger_config(&self) -> LedgerConfig {
        let policy = if self.verify_on_load {
            LoadPolicy::Verified
        } else {
            LoadPolicy::FallbackToGenesis
        };
        LedgerConfig::at(&self.ledger)
            .with_lock(!self.no_lock)
            .with_load_policy(policy)
    }
}

fn main() -> Result<()> {
    color_eyre::install()?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("ayurchain=info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let mut ledger = Ledger::open(cli.ledger_config())
        .wrap_err_with(|| format!("opening ledger {}", cli.ledger.display()))?;
    tracing::debug!(
        path = %cli.ledger.display(),
        blocks = ledger.chain().len(),
        "ledger opened"
    );
    let mut out = io::stdout().lock();
    run(cli.command, &mut ledger, &mut out)
}

fn run(command: Commands, ledger: &mut Ledger, out: &mut impl Write) -> Result<()> {
    match command {
        Commands::Farmer {
            farmer,
            herb,
            gps,
            batch_id,
        } => submit(
            ledger,
            HarvestEvent {
                farmer,
                herb,
                gps,
                batch_id,
            }
            .into(),
            out,
        ),
        Commands::Lab {
            batch_id,
            lab,
            dna_verified,
            pesticide_level,
        } => submit(
            ledger,
            LabTestEvent {
                batch_id,
                lab,
                dna_verified,
                pesticide_level,
            }
            .into(),
            out,
        ),
        Commands::Processor {
            batch_id,
            process,
            notes,
        } => submit(
            ledger,
            ProcessingEvent {
                batch_id,
                process,
                notes,
            }
            .into(),
            out,
        ),
        Commands::Verify { batch_id, report } => verify(ledger, &batch_id, report.as_deref(), out),
        Commands::Ledger { json } => show_ledger(ledger, json, out),
    }
}

fn submit(ledger: &mut Ledger, event: RoleEvent, out: &mut impl Write) -> Result<()> {
    let role = event.role();
    let batch_id = event.batch_id().trim().to_string();
    let payload = event.into_payload()?;
    let block = ledger.record(payload)?;
    writeln!(
        out,
        "{} record added for batch {} (block #{}, {})",
        role,
        batch_id,
        block.index(),
        block.fingerprint()
    )?;
    Ok(())
}

fn verify(
    ledger: &Ledger,
    batch_id: &str,
    report: Option<&Path>,
    out: &mut impl Write,
) -> Result<()> {
    let trace = BatchTrace::collect(ledger.chain(), batch_id);
    if trace.is_empty() {
        bail!("no records for batch {batch_id}");
    }

    writeln!(out, "Found {} records for batch {}", trace.entries.len(), batch_id)?;
    for block in &trace.entries {
        writeln!(out, "{}", describe(block))?;
    }
    write_verdict(trace.first_invalid, out)?;

    if let Some(path) = report {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_vec_pretty(&trace)?)
            .wrap_err_with(|| format!("writing report {}", path.display()))?;
        writeln!(out, "Report written to {}", path.display())?;
    }
    Ok(())
}

fn show_ledger(ledger: &Ledger, json: bool, out: &mut impl Write) -> Result<()> {
    let chain = ledger.chain();
    if json {
        serde_json::to_writer_pretty(&mut *out, &chain.export())?;
        writeln!(out)?;
        return Ok(());
    }

    writeln!(out, "Total blocks: {}", chain.len())?;
    for block in chain {
        writeln!(out, "{}", describe(block))?;
    }
    write_verdict(chain.first_invalid(), out)
}

fn write_verdict(first_invalid: Option<u64>, out: &mut impl Write) -> Result<()> {
    match first_invalid {
        None => writeln!(out, "Ledger valid: true")?,
        Some(index) => writeln!(out, "Ledger valid: false (first invalid block #{index})")?,
    }
    Ok(())
}

fn describe(block: &Block) -> String {
    let when = block
        .timestamp()
        .to_datetime()
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| block.timestamp().to_string());
    let data = serde_json::to_string(block.payload()).unwrap_or_default();
    format!("#{:<4} {}  {}", block.index(), when, data)
}
