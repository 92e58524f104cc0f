use clap::Parser;
use miette::{IntoDiagnostic, Result};
use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::time::Duration;
use wallet_transfer::application::coordinator::TransferCoordinator;
use wallet_transfer::domain::ports::WalletStoreBox;
use wallet_transfer::infrastructure::StoreConfig;
use wallet_transfer::infrastructure::in_memory::InMemoryWalletStore;
#[cfg(feature = "storage-rocksdb")]
use wallet_transfer::infrastructure::rocksdb::RocksDBWalletStore;
use wallet_transfer::interfaces::csv::transfer_reader::TransferReader;
use wallet_transfer::interfaces::csv::wallet_reader::WalletReader;
use wallet_transfer::interfaces::csv::wallet_writer::WalletWriter;
use wallet_transfer::interfaces::request::ErrorCategory;
use wallet_transfer::logging;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Transfer requests CSV file (sender,recipient,amount)
    input: PathBuf,

    /// Wallets CSV file (id,owner_id,balance) stored before any transfer runs
    #[arg(long)]
    wallets: Option<PathBuf>,

    /// Path to persistent database (optional). If provided, uses RocksDB.
    #[arg(long)]
    db_path: Option<PathBuf>,

    /// Give up waiting for a wallet row lock after this many milliseconds
    #[arg(long, env = "WALLET_LOCK_TIMEOUT_MS")]
    lock_timeout_ms: Option<u64>,
}

#[cfg(feature = "storage-rocksdb")]
fn open_store(db_path: Option<PathBuf>, config: StoreConfig) -> Result<WalletStoreBox> {
    match db_path {
        Some(path) => {
            let store = RocksDBWalletStore::open_with_config(path, config).into_diagnostic()?;
            Ok(Box::new(store))
        }
        None => Ok(Box::new(InMemoryWalletStore::with_config(config))),
    }
}

#[cfg(not(feature = "storage-rocksdb"))]
fn open_store(db_path: Option<PathBuf>, config: StoreConfig) -> Result<WalletStoreBox> {
    if db_path.is_some() {
        tracing::warn!(
            "Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to in-memory storage."
        );
    }
    Ok(Box::new(InMemoryWalletStore::with_config(config)))
}

#[tokio::main]
async fn main() -> Result<()> {
    logging::init();
    let cli = Cli::parse();

    let config = StoreConfig {
        lock_timeout: cli.lock_timeout_ms.map(Duration::from_millis),
    };
    let coordinator = TransferCoordinator::new(open_store(cli.db_path, config)?);

    if let Some(path) = cli.wallets {
        let file = File::open(path).into_diagnostic()?;
        for wallet in WalletReader::new(file).wallets() {
            match wallet {
                Ok(wallet) => coordinator
                    .store()
                    .store(wallet.into())
                    .await
                    .into_diagnostic()?,
                Err(e) => eprintln!("Error reading wallet: {}", e),
            }
        }
    }

    let file = File::open(cli.input).into_diagnostic()?;
    for request in TransferReader::new(file).requests() {
        match request {
            Ok(request) => match request.submit(&coordinator).await {
                Ok((sender, recipient)) => eprintln!(
                    "Transfer committed: sender {} balance {}, recipient {} balance {}",
                    sender.id(),
                    sender.balance(),
                    recipient.id(),
                    recipient.balance()
                ),
                Err(e) => eprintln!("Transfer rejected [{}]: {}", ErrorCategory::from(&e), e),
            },
            Err(e) => {
                eprintln!("Error reading transfer: {}", e);
            }
        }
    }

    let wallets = coordinator.store().get_all().await.into_diagnostic()?;

    let stdout = io::stdout();
    let mut writer = WalletWriter::new(stdout.lock());
    writer.write_wallets(wallets).into_diagnostic()?;

    Ok(())
}
