//! Document store access.
//!
//! The [`DocumentStore`] trait is the seam between the seeder and the
//! target database. [`FirestoreClient`] talks to Cloud Firestore over REST;
//! [`MemoryStore`] keeps documents in process for dry runs and tests.

mod firestore;
mod memory;
mod value;

use std::collections::HashSet;

use async_trait::async_trait;
use rand::Rng;
use thiserror::Error;
use tokio::sync::Mutex;

use crate::auth::AuthError;
use crate::record::Record;

pub use firestore::FirestoreClient;
pub use memory::MemoryStore;
pub use value::{encode_fields, encode_value};

const AUTO_ID_LEN: usize = 20;
const AUTO_ID_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error("HTTP request failed")]
    Request(#[from] reqwest::Error),
    #[error("Invalid store URL: {0}")]
    InvalidUrl(String),
    #[error("Write to {path} rejected (status {status}): {message}")]
    Rejected {
        path: String,
        status: u16,
        message: String,
    },
}

/// A database that stores JSON documents in named collections.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Returns a fresh document id for `collection`.
    async fn allocate_id(&self, collection: &str) -> Result<String, StoreError>;

    /// Writes `data` at `collection/id`, replacing any existing document.
    async fn set_document(&self, collection: &str, id: &str, data: &Record)
    -> Result<(), StoreError>;
}

/// Generates a random 20-character alphanumeric document id.
pub fn auto_id(rng: &mut impl Rng) -> String {
    (0..AUTO_ID_LEN)
        .map(|_| AUTO_ID_ALPHABET[rng.gen_range(0..AUTO_ID_ALPHABET.len())] as char)
        .collect()
}

/// Hands out auto ids, never the same one twice.
#[derive(Default)]
pub(crate) struct IdAllocator {
    issued: Mutex<HashSet<String>>,
}

impl IdAllocator {
    pub(crate) async fn next(&self) -> String {
        let mut issued = self.issued.lock().await;
        loop {
            let id = auto_id(&mut rand::thread_rng());
            if issued.insert(id.clone()) {
                return id;
            }
        }
    }
}
