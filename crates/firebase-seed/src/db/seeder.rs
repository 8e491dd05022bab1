//! Collection seeding from JSON source files.

use std::path::{Path, PathBuf};

use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info};

use crate::config::Manifest;
use crate::record::{DocumentIdError, Record, split_record};
use crate::store::{DocumentStore, StoreError};

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("Source file not found: {}", .path.display())]
    FileNotFound { path: PathBuf },
    #[error("IO error reading {}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("JSON parse error in {}", .path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("{} must contain a JSON array of objects", .path.display())]
    NotAnArray { path: PathBuf },
    #[error("Record {index} in {} is not a JSON object", .path.display())]
    NotAnObject { path: PathBuf, index: usize },
    #[error("Invalid document id for record {index} of {collection}")]
    InvalidDocumentId {
        collection: String,
        index: usize,
        source: DocumentIdError,
    },
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Outcome of importing one source file.
#[derive(Debug, Clone)]
pub struct ImportSummary {
    pub collection: String,
    pub path: PathBuf,
    /// Documents written, in file order.
    pub ids: Vec<String>,
    /// How many of those ids were allocated by the store.
    pub generated_ids: usize,
}

impl ImportSummary {
    pub fn imported(&self) -> usize {
        self.ids.len()
    }
}

/// Outcome of a full manifest run.
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub imports: Vec<ImportSummary>,
}

impl RunSummary {
    pub fn total(&self) -> usize {
        self.imports.iter().map(ImportSummary::imported).sum()
    }
}

/// Writes source records into a document store.
///
/// Everything is sequential: one file at a time, one write in flight at a
/// time, and the first error ends the run. Writes that already landed are
/// left in place.
pub struct Seeder<S> {
    store: S,
    data_dir: PathBuf,
}

impl<S: DocumentStore> Seeder<S> {
    /// Creates a seeder resolving file names against `data_dir`.
    pub fn new(store: S, data_dir: impl Into<PathBuf>) -> Self {
        Self {
            store,
            data_dir: data_dir.into(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Imports every record of `file_name` into `collection`.
    ///
    /// The whole file is parsed and every record's id checked before the
    /// first write, so a malformed file writes nothing.
    pub async fn import_file(
        &self,
        collection: &str,
        file_name: &str,
    ) -> Result<ImportSummary, SeedError> {
        let path = self.data_dir.join(file_name);
        let records = read_records(&path).await?;

        let documents = records
            .into_iter()
            .enumerate()
            .map(|(index, record)| {
                split_record(record).map_err(|source| SeedError::InvalidDocumentId {
                    collection: collection.to_string(),
                    index,
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        debug!(
            "Importing {} records from {} into {collection}",
            documents.len(),
            path.display()
        );

        let mut summary = ImportSummary {
            collection: collection.to_string(),
            path,
            ids: Vec::with_capacity(documents.len()),
            generated_ids: 0,
        };

        for (id, payload) in documents {
            let id = match id {
                Some(id) => id,
                None => {
                    summary.generated_ids += 1;
                    self.store.allocate_id(collection).await?
                }
            };

            self.store.set_document(collection, &id, &payload).await?;
            info!("Imported: {collection}/{id}");
            summary.ids.push(id);
        }

        Ok(summary)
    }

    /// Imports every manifest entry in order, stopping at the first error.
    pub async fn run(&self, manifest: &Manifest) -> Result<RunSummary, SeedError> {
        let mut summary = RunSummary::default();

        for entry in manifest.entries() {
            let import = self.import_file(&entry.collection, &entry.file).await?;
            summary.imports.push(import);
        }

        info!("All data imported successfully!");
        for import in &summary.imports {
            info!("  {}: {}", import.collection, import.imported());
        }

        Ok(summary)
    }
}

/// Reads a source file holding a JSON array of objects.
async fn read_records(path: &Path) -> Result<Vec<Record>, SeedError> {
    let raw = match tokio::fs::read_to_string(path).await {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(SeedError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        Err(source) => {
            return Err(SeedError::Io {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    let value: Value = serde_json::from_str(&raw).map_err(|source| SeedError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    let Value::Array(items) = value else {
        return Err(SeedError::NotAnArray {
            path: path.to_path_buf(),
        });
    };

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| match item {
            Value::Object(record) => Ok(record),
            _ => Err(SeedError::NotAnObject {
                path: path.to_path_buf(),
                index,
            }),
        })
        .collect()
}
