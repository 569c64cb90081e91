use secrecy::SecretString;
use serde::{Deserialize, Deserializer};
use std::fmt;

use crate::core::error::ReconcileError;

/// Identifier Passwordstate assigns to a password entry.
pub type PasswordId = u64;

/// Snapshot of one password entry as returned by `GET /api/passwords/{id}`.
///
/// Only the fields the connector reads are mapped; anything else in the payload is ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct CredentialRecord {
    #[serde(rename = "PasswordID", default)]
    pub id: PasswordId,
    #[serde(rename = "UserName", default)]
    pub username: Option<String>,
    #[serde(
        rename = "Password",
        default,
        deserialize_with = "crate::core::secret_string_option::deserialize"
    )]
    pub password: Option<SecretString>,
    #[serde(rename = "Title", default, deserialize_with = "text_or_empty")]
    pub title: String,
    #[serde(rename = "Description", default, deserialize_with = "text_or_empty")]
    pub description: String,
    #[serde(rename = "ExpiryDate", default, deserialize_with = "text_or_empty")]
    pub expiry: String,
}

// Passwordstate sends `null` for blank text fields.
fn text_or_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// A credential field the connector is allowed to change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    UserName,
    Password,
}

impl Field {
    /// Property name used by the Passwordstate API.
    pub fn wire_name(self) -> &'static str {
        match self {
            Field::UserName => "UserName",
            Field::Password => "Password",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

/// Target values an operator declares for one password entry.
#[derive(Debug, Clone)]
pub struct DesiredState {
    pub id: PasswordId,
    pub username: Option<String>,
    pub password: Option<SecretString>,
}

impl DesiredState {
    pub fn new(id: PasswordId) -> Self {
        Self {
            id,
            username: None,
            password: None,
        }
    }

    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    pub fn with_password(mut self, password: SecretString) -> Self {
        self.password = Some(password);
        self
    }

    /// At least one of username or password must be declared.
    pub fn validate(&self) -> Result<(), ReconcileError> {
        if self.username.is_none() && self.password.is_none() {
            return Err(ReconcileError::Configuration(
                "one of the following is required: username, password".to_string(),
            ));
        }
        Ok(())
    }
}
