use async_trait::async_trait;
use reqwest::header::{HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::Method;
use secrecy::ExposeSecret;
use serde_json::Value;
use tracing::{debug, info};

use crate::config::config::{Config, UpdateRoute};
use crate::core::diff::FieldDiff;
use crate::core::error::ReconcileError;
use crate::core::ports::CredentialApi;
use crate::core::record::{CredentialRecord, PasswordId};

/// Passwordstate REST client authenticated with a password-list API key.
pub struct PasswordstateClient {
    http: reqwest::Client,
    base_url: String,
    key_header: HeaderName,
    key_value: HeaderValue,
    update_route: UpdateRoute,
}

impl PasswordstateClient {
    pub fn from_config(config: &Config) -> Result<Self, ReconcileError> {
        let key_header = HeaderName::from_bytes(config.header_style.header_name().as_bytes())
            .map_err(|e| ReconcileError::Configuration(format!("invalid header name: {e}")))?;
        let mut key_value = HeaderValue::from_str(config.api_key.expose_secret()).map_err(|_| {
            ReconcileError::Configuration(
                "API key contains characters that are not allowed in an HTTP header".to_string(),
            )
        })?;
        key_value.set_sensitive(true);

        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(ReconcileError::transport)?;

        Ok(Self {
            http,
            base_url: config.url.trim_end_matches('/').to_string(),
            key_header,
            key_value,
            update_route: config.update_route,
        })
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}/api/{}", self.base_url, path)
    }

    fn update_url(&self, id: PasswordId) -> String {
        match self.update_route {
            UpdateRoute::Body => self.api_url("passwords/"),
            UpdateRoute::Path => self.api_url(&format!("passwords/{id}")),
        }
    }

    fn request(&self, method: Method, url: &str) -> reqwest::RequestBuilder {
        self.http
            .request(method, url)
            .header(self.key_header.clone(), self.key_value.clone())
            .header(CONTENT_TYPE, "application/json")
    }
}

#[async_trait]
impl CredentialApi for PasswordstateClient {
    async fn fetch(&self, id: PasswordId) -> Result<Option<CredentialRecord>, ReconcileError> {
        let url = self.api_url(&format!("passwords/{id}"));
        debug!(id, "fetching password record");
        let resp = self
            .request(Method::GET, &url)
            .send()
            .await
            .map_err(ReconcileError::transport)?;
        let body = handle_response(resp).await?;
        let record = first_record(body)?.map(|mut record| {
            record.id = id;
            record
        });
        debug!(id, found = record.is_some(), "fetched password record");
        Ok(record)
    }

    async fn update(&self, id: PasswordId, diff: &FieldDiff) -> Result<Value, ReconcileError> {
        let url = self.update_url(id);
        info!(
            id,
            route = %self.update_route,
            fields = ?diff.field_names(),
            "updating password record"
        );
        let resp = self
            .request(Method::PUT, &url)
            .json(&diff.to_update_body(id))
            .send()
            .await
            .map_err(ReconcileError::transport)?;
        handle_response(resp).await
    }
}

async fn handle_response(resp: reqwest::Response) -> Result<Value, ReconcileError> {
    let status = resp.status();
    let body = resp.text().await.map_err(ReconcileError::transport)?;

    if !status.is_success() {
        debug!(status = status.as_u16(), "passwordstate returned an error status");
        return Err(ReconcileError::status(status, &body));
    }

    if body.trim().is_empty() {
        return Ok(Value::Null);
    }

    serde_json::from_str(&body)
        .map_err(|e| ReconcileError::malformed("Failed to parse response JSON", e))
}

/// Unwrap the one-element list Passwordstate answers with. Anything other than a
/// non-empty list whose first element is a non-empty object is "no data".
fn first_record(body: Value) -> Result<Option<CredentialRecord>, ReconcileError> {
    let Value::Array(items) = body else {
        return Ok(None);
    };
    match items.into_iter().next() {
        Some(Value::Object(fields)) if !fields.is_empty() => {
            serde_json::from_value(Value::Object(fields))
                .map(Some)
                .map_err(|e| ReconcileError::malformed("Unexpected password record shape", e))
        }
        _ => Ok(None),
    }
}
