//! Cloud Firestore REST client.
//!
//! Writes go through `PATCH .../documents/{collection}/{id}` without an
//! update mask, which replaces the whole document the same way a `set`
//! does in the vendor SDKs.

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use super::value::encode_fields;
use super::{DocumentStore, IdAllocator, StoreError};
use crate::auth::{Credentials, load_service_account, service_account_project};
use crate::config::SeedConfig;
use crate::record::Record;

const FIRESTORE_URL: &str = "https://firestore.googleapis.com";
const DEFAULT_DATABASE: &str = "(default)";

/// Error envelope returned by Google APIs.
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Firestore client bound to one project and database.
pub struct FirestoreClient {
    client: Client,
    base_url: String,
    project_id: String,
    database: String,
    credentials: Credentials,
    ids: IdAllocator,
}

impl FirestoreClient {
    /// Creates a client for the production Firestore endpoint.
    pub fn new(client: Client, project_id: impl Into<String>, credentials: Credentials) -> Self {
        Self {
            client,
            base_url: FIRESTORE_URL.to_string(),
            project_id: project_id.into(),
            database: DEFAULT_DATABASE.to_string(),
            credentials,
            ids: IdAllocator::default(),
        }
    }

    /// Creates a client for a local emulator at `host` (`host:port`).
    pub fn emulator(host: &str, project_id: impl Into<String>) -> Self {
        Self::new(Client::new(), project_id, Credentials::Emulator)
            .with_base_url(format!("http://{host}"))
    }

    /// Overrides the API endpoint.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Builds a client from seeding configuration.
    ///
    /// The emulator needs no credentials; otherwise the service-account
    /// key file is loaded and its project used unless one is configured.
    pub fn from_config(config: &SeedConfig) -> Result<Self, StoreError> {
        let path = &config.credentials_path;

        if let Some(host) = &config.emulator_host {
            let project_id = match &config.project_id {
                Some(project_id) => project_id.clone(),
                None => service_account_project(&load_service_account(path)?, path)?,
            };
            debug!("Using Firestore emulator at {host}");
            return Ok(Self::emulator(host, project_id));
        }

        let account = load_service_account(path)?;
        let project_id = match &config.project_id {
            Some(project_id) => project_id.clone(),
            None => service_account_project(&account, path)?,
        };

        Ok(Self::new(
            Client::new(),
            project_id,
            Credentials::ServiceAccount(account),
        ))
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    fn document_url(&self, collection: &str, id: &str) -> Result<Url, StoreError> {
        let mut url =
            Url::parse(&self.base_url).map_err(|e| StoreError::InvalidUrl(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|()| StoreError::InvalidUrl(self.base_url.clone()))?
            .pop_if_empty()
            .extend([
                "v1",
                "projects",
                self.project_id.as_str(),
                "databases",
                self.database.as_str(),
                "documents",
                collection,
                id,
            ]);
        Ok(url)
    }
}

#[async_trait]
impl DocumentStore for FirestoreClient {
    async fn allocate_id(&self, _collection: &str) -> Result<String, StoreError> {
        Ok(self.ids.next().await)
    }

    async fn set_document(
        &self,
        collection: &str,
        id: &str,
        data: &Record,
    ) -> Result<(), StoreError> {
        let url = self.document_url(collection, id)?;
        let token = self.credentials.bearer().await?;

        debug!("Writing {collection}/{id} ({} fields)", data.len());

        let resp = self
            .client
            .patch(url)
            .bearer_auth(token)
            .json(&json!({ "fields": encode_fields(data) }))
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorResponse>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(StoreError::Rejected {
                path: format!("{collection}/{id}"),
                status: status.as_u16(),
                message,
            });
        }

        Ok(())
    }
}
