//! Seeds a Cloud Firestore database from local JSON files.
//!
//! Each manifest entry names a collection and a JSON file holding an array
//! of objects. Records are written in file order with set (overwrite)
//! semantics; a record's `id` field picks the document id and is dropped
//! from the stored payload, otherwise the store allocates one.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use firebase_seed::prelude::*;
//!
//! let config = SeedConfig::from_env()?;
//! let store = FirestoreClient::from_config(&config)?;
//! let seeder = Seeder::new(store, &config.data_dir);
//! seeder.run(&config.manifest).await?;
//! ```

pub mod auth;
pub mod config;
pub mod db;
pub mod record;
pub mod store;

pub mod prelude {
    //! Convenient re-exports for common usage.

    pub use crate::config::{Manifest, ManifestEntry, SeedConfig};
    pub use crate::db::{ImportSummary, RunSummary, SeedError, Seeder};
    pub use crate::record::Record;
    pub use crate::store::{DocumentStore, FirestoreClient, MemoryStore, StoreError};
}
