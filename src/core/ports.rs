use async_trait::async_trait;
use serde_json::Value;

use super::diff::FieldDiff;
use super::error::ReconcileError;
use super::record::{CredentialRecord, PasswordId};

/// Read/write access to the credential service.
#[async_trait]
pub trait CredentialApi: Send + Sync {
    /// Read one entry. `Ok(None)` means the service answered but had nothing usable.
    async fn fetch(&self, id: PasswordId) -> Result<Option<CredentialRecord>, ReconcileError>;

    /// Send a partial update carrying only the fields in `diff`; returns the raw acknowledgement.
    async fn update(&self, id: PasswordId, diff: &FieldDiff) -> Result<Value, ReconcileError>;
}
