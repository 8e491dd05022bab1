//! Seeds Firestore with the bundled products, banners, and contact data.
//!
//! Run with:
//! ```
//! cargo run -p firebase-seed --bin seed
//! ```
//!
//! Environment:
//! - `GOOGLE_APPLICATION_CREDENTIALS`: service-account key file
//!   (default: `serviceAccountKey.json` in the data directory)
//! - `SEED_DATA_DIR`: directory holding the source files
//! - `SEED_MANIFEST`: JSON manifest replacing the default collections
//! - `FIRESTORE_PROJECT_ID`: overrides the key file's project
//! - `FIRESTORE_EMULATOR_HOST`: write to a local emulator instead
//! - `SEED_DRY_RUN=1`: seed into memory and only log

use std::process::ExitCode;

use anyhow::Context;
use firebase_seed::prelude::*;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::writer::MakeWriterExt;

#[tokio::main]
async fn main() -> ExitCode {
    let writer = std::io::stderr
        .with_max_level(tracing::Level::WARN)
        .or_else(std::io::stdout);

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(writer)
        .init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> anyhow::Result<()> {
    let config = SeedConfig::from_env().context("Failed to load configuration")?;

    if config.dry_run {
        info!("Dry run: writing to an in-memory store");
        let seeder = Seeder::new(MemoryStore::new(), &config.data_dir);
        seeder.run(&config.manifest).await?;
        return Ok(());
    }

    let store = FirestoreClient::from_config(&config).context("Failed to initialize Firestore")?;
    info!("Seeding Firestore project {}", store.project_id());

    let seeder = Seeder::new(store, &config.data_dir);
    seeder.run(&config.manifest).await?;

    Ok(())
}
