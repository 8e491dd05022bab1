//! Authorization for the Firestore REST API.
//!
//! Service-account handling (grant signing, token exchange, caching) is
//! delegated to `gcp_auth`; this module only picks the credential source
//! and hands out bearer tokens.

use std::path::{Path, PathBuf};

use gcp_auth::{CustomServiceAccount, TokenProvider};
use thiserror::Error;
use tracing::debug;

const DATASTORE_SCOPE: &str = "https://www.googleapis.com/auth/datastore";

/// Token the Firestore emulator accepts for unrestricted access.
const EMULATOR_TOKEN: &str = "owner";

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Could not load credentials {}", .path.display())]
    Load {
        path: PathBuf,
        source: gcp_auth::Error,
    },
    #[error("Credentials {} do not name a project", .0.display())]
    MissingProjectId(PathBuf),
    #[error("Could not obtain an access token")]
    Token(#[source] gcp_auth::Error),
}

/// Loads a service-account key file as downloaded from the console.
pub fn load_service_account(path: impl AsRef<Path>) -> Result<CustomServiceAccount, AuthError> {
    let path = path.as_ref();
    debug!("Loading service account from {}", path.display());
    CustomServiceAccount::from_file(path).map_err(|source| AuthError::Load {
        path: path.to_path_buf(),
        source,
    })
}

/// Project named by a service-account key file.
pub fn service_account_project(
    account: &CustomServiceAccount,
    path: impl AsRef<Path>,
) -> Result<String, AuthError> {
    account
        .project_id()
        .map(str::to_string)
        .ok_or_else(|| AuthError::MissingProjectId(path.as_ref().to_path_buf()))
}

/// How requests to the store are authorized.
pub enum Credentials {
    /// Local emulator, no real credentials.
    Emulator,
    ServiceAccount(CustomServiceAccount),
}

impl Credentials {
    /// Bearer token for the next request.
    pub async fn bearer(&self) -> Result<String, AuthError> {
        match self {
            Credentials::Emulator => Ok(EMULATOR_TOKEN.to_string()),
            Credentials::ServiceAccount(account) => {
                let token = account
                    .token(&[DATASTORE_SCOPE])
                    .await
                    .map_err(AuthError::Token)?;
                Ok(token.as_str().to_string())
            }
        }
    }
}
