use clap::Parser;
use colonyfee::application::engine::PaymentStatusEngine;
use colonyfee::domain::actor::{Actor, Role};
use colonyfee::domain::ports::{ActorProvider, ActorProviderBox, FeeEntryStoreBox};
use colonyfee::infrastructure::actor::StaticActorProvider;
use colonyfee::infrastructure::in_memory::InMemoryFeeEntryStore;
#[cfg(feature = "storage-rocksdb")]
use colonyfee::infrastructure::rocksdb::RocksDBStore;
use colonyfee::interfaces::csv::action_reader::ActionReader;
use colonyfee::interfaces::csv::entry_reader::EntryReader;
use colonyfee::interfaces::csv::ledger_writer::LedgerWriter;
use miette::{IntoDiagnostic, Result};
use std::fs::File;
use std::io::{self, IsTerminal};
use std::path::PathBuf;
use tracing::warn;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// CSV file of new fee entries to record
    entries: PathBuf,

    /// CSV file of status actions (confirm, unconfirm, set) applied after recording
    #[arg(long)]
    actions: Option<PathBuf>,

    /// Id of the acting user
    #[arg(long, env = "COLONYFEE_ACTOR")]
    actor: Option<String>,

    /// Role of the acting user: super_admin, colony_admin, block_manager or resident
    #[arg(long, env = "COLONYFEE_ROLE", default_value = "resident")]
    role: String,

    /// Path to persistent database (optional). If provided, uses RocksDB.
    #[arg(long, env = "COLONYFEE_DB_PATH")]
    db_path: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let actors: ActorProviderBox = Box::new(StaticActorProvider::new(
        cli.actor
            .map(|id| Actor::new(id, Role::from(cli.role.as_str()))),
    ));
    let actor = actors.current_actor().into_diagnostic()?;
    let engine = PaymentStatusEngine::new(open_store(cli.db_path)?);

    // Record new entries
    let file = File::open(cli.entries).into_diagnostic()?;
    for draft in EntryReader::new(file).drafts() {
        let result = match draft {
            Ok(draft) => engine.record_entry(&actor, draft).await,
            Err(e) => Err(e),
        };
        if let Err(e) = result {
            warn!(error = %e, "Error recording fee entry");
        }
    }

    // Apply status actions
    if let Some(path) = cli.actions {
        let file = File::open(path).into_diagnostic()?;
        for action in ActionReader::new(file).actions() {
            let action = match action {
                Ok(action) => action,
                Err(e) => {
                    warn!(error = %e, "Error applying status action");
                    continue;
                }
            };
            let entry = action.entry_id().clone();
            if let Err(e) = engine.apply(&actor, action).await {
                warn!(entry = %entry, error = %e, "Error applying status action");
            }
        }
    }

    let entries = engine.ledger().await.into_diagnostic()?;
    let stdout = io::stdout();
    let mut writer = LedgerWriter::new(stdout.lock());
    writer.write_entries(&entries).into_diagnostic()?;

    Ok(())
}

/// Logs go to stderr so stdout carries only the ledger. `RUST_LOG` overrides
/// the default `warn` level.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .init();
}

fn open_store(db_path: Option<PathBuf>) -> Result<FeeEntryStoreBox> {
    match db_path {
        #[cfg(feature = "storage-rocksdb")]
        Some(path) => Ok(Box::new(RocksDBStore::open(path).into_diagnostic()?)),
        #[cfg(not(feature = "storage-rocksdb"))]
        Some(_) => {
            warn!(
                "Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to In-Memory storage."
            );
            Ok(Box::new(InMemoryFeeEntryStore::new()))
        }
        None => Ok(Box::new(InMemoryFeeEntryStore::new())),
    }
}
