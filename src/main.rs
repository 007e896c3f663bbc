use clap::Parser;
use gateway_failover::application::dispatcher::Dispatcher;
use gateway_failover::config::RouterConfig;
use gateway_failover::domain::ports::CounterStoreBox;
use gateway_failover::domain::transaction::PaymentRequest;
use gateway_failover::infrastructure::in_memory::InMemoryCounterStore;
#[cfg(feature = "storage-rocksdb")]
use gateway_failover::infrastructure::rocksdb::RocksDBCounterStore;
use gateway_failover::interfaces::csv::request_reader::RequestReader;
use gateway_failover::interfaces::csv::result_writer::{DispatchResult, Outcome, ResultWriter};
use miette::{IntoDiagnostic, Result};
use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Input payment requests CSV file
    input: PathBuf,

    /// Router configuration (JSON)
    #[arg(long)]
    config: PathBuf,

    /// Path to persistent counter database (optional). If provided, uses RocksDB.
    #[arg(long)]
    db_path: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let config = RouterConfig::from_path(&cli.config)?;
    let store = counter_store(cli.db_path)?;
    let dispatcher = config.build(store)?;

    let file = File::open(&cli.input).into_diagnostic()?;
    let reader = RequestReader::new(file);
    let stdout = io::stdout();
    let mut writer = ResultWriter::new(stdout.lock());

    for (index, request) in reader.requests().enumerate() {
        let row = index + 1;
        match request {
            Ok(request) => {
                let result = dispatch(&dispatcher, row, &request).await;
                writer.write(&result)?;
            }
            Err(e) => {
                eprintln!("Error reading request {}: {}", row, e);
            }
        }
    }

    writer.flush()?;
    Ok(())
}

fn counter_store(db_path: Option<PathBuf>) -> Result<CounterStoreBox> {
    match db_path {
        #[cfg(feature = "storage-rocksdb")]
        Some(path) => {
            let store = RocksDBCounterStore::open(path).into_diagnostic()?;
            Ok(Arc::new(store))
        }
        #[cfg(not(feature = "storage-rocksdb"))]
        Some(_) => {
            eprintln!(
                "WARNING: Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to In-Memory storage."
            );
            Ok(Arc::new(InMemoryCounterStore::new()))
        }
        None => Ok(Arc::new(InMemoryCounterStore::new())),
    }
}

async fn dispatch(dispatcher: &Dispatcher, row: usize, request: &PaymentRequest) -> DispatchResult {
    let mut tx = dispatcher.new_transaction();
    request.fill(&mut tx);

    match tx.send(request.op).await {
        Ok(id) => DispatchResult {
            row,
            op: request.op,
            outcome: Outcome::Ok,
            transaction_id: Some(id),
            provider: tx
                .dispatcher()
                .gateways()
                .first()
                .map(|g| g.provider().to_string()),
            error: None,
        },
        Err(e) => DispatchResult {
            row,
            op: request.op,
            outcome: Outcome::Error,
            transaction_id: None,
            provider: None,
            error: Some(e.to_string()),
        },
    }
}
