use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info};

use crate::config::config::Config;
use crate::core::client::PasswordstateClient;
use crate::core::diff::FieldDiff;
use crate::core::error::ReconcileError;
use crate::core::ports::CredentialApi;
use crate::core::record::{CredentialRecord, DesiredState, PasswordId};

/// Terminal state of one reconciliation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    NoChange,
    DryRunReported,
    Applied,
}

#[derive(Debug)]
pub struct ReconcileResult {
    pub outcome: Outcome,
    /// The diff that was applied, or would have been in dry-run mode.
    pub diff: FieldDiff,
    /// Raw acknowledgement from the service; only set when `Applied`.
    pub acknowledgement: Option<Value>,
}

impl ReconcileResult {
    pub fn changed(&self) -> bool {
        !self.diff.is_empty()
    }
}

pub struct Reconciler {
    api: Arc<dyn CredentialApi>,
}

impl Reconciler {
    pub fn new(api: Arc<dyn CredentialApi>) -> Self {
        Self { api }
    }

    /// Fetch a record, failing with `NoData` when the service has nothing for `id`.
    pub async fn fetch(&self, id: PasswordId) -> Result<CredentialRecord, ReconcileError> {
        self.api
            .fetch(id)
            .await?
            .ok_or(ReconcileError::NoData(id))
    }

    /// One fetch, diff and optional update pass for `desired.id`.
    pub async fn reconcile(
        &self,
        desired: &DesiredState,
        dry_run: bool,
    ) -> Result<ReconcileResult, ReconcileError> {
        desired.validate()?;

        let current = self.fetch(desired.id).await?;
        let diff = FieldDiff::compute(&current, desired);
        debug!(id = desired.id, fields = ?diff.field_names(), "computed diff");

        if diff.is_empty() {
            info!(id = desired.id, "record already in desired state");
            return Ok(ReconcileResult {
                outcome: Outcome::NoChange,
                diff,
                acknowledgement: None,
            });
        }

        if dry_run {
            info!(id = desired.id, fields = ?diff.field_names(), "dry run; update skipped");
            return Ok(ReconcileResult {
                outcome: Outcome::DryRunReported,
                diff,
                acknowledgement: None,
            });
        }

        let ack = self.api.update(desired.id, &diff).await?;
        info!(id = desired.id, fields = ?diff.field_names(), "record updated");
        Ok(ReconcileResult {
            outcome: Outcome::Applied,
            diff,
            acknowledgement: Some(ack),
        })
    }
}

/// Reconcile `desired` against the deployment described by `config`.
/// The desired state is validated before any network call is made.
pub async fn reconcile(
    config: &Config,
    desired: &DesiredState,
    dry_run: bool,
) -> Result<ReconcileResult, ReconcileError> {
    desired.validate()?;
    let client = PasswordstateClient::from_config(config)?;
    Reconciler::new(Arc::new(client))
        .reconcile(desired, dry_run)
        .await
}

/// Retrieve a single record from the deployment described by `config`.
pub async fn fetch(config: &Config, id: PasswordId) -> Result<CredentialRecord, ReconcileError> {
    let client = PasswordstateClient::from_config(config)?;
    Reconciler::new(Arc::new(client)).fetch(id).await
}
