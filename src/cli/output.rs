use secrecy::ExposeSecret;
use serde_json::{json, Value};

use crate::core::reconciler::{Outcome, ReconcileResult};
use crate::core::record::CredentialRecord;

pub const REDACTED: &str = "********";

/// Record fields as named outputs for downstream tooling. The password is
/// included unless `redact_password` is set.
pub fn fetch_output(record: &CredentialRecord, redact_password: bool) -> Value {
    let password = match (&record.password, redact_password) {
        (Some(p), false) => Value::String(p.expose_secret().to_string()),
        (Some(_), true) => Value::String(REDACTED.to_string()),
        (None, _) => Value::Null,
    };
    json!({
        "changed": false,
        "id": record.id,
        "username": record.username,
        "password": password,
        "title": record.title,
        "description": record.description,
        "expiry": record.expiry,
    })
}

/// Result of an update pass. Only field names are reported; values never are.
pub fn update_output(result: &ReconcileResult) -> Value {
    let mut out = json!({
        "changed": result.changed(),
        "outcome": result.outcome,
        "changes": result.diff.field_names(),
    });
    match result.outcome {
        Outcome::NoChange => {
            out["result"] = Value::String("No update necessary".to_string());
        }
        Outcome::Applied => {
            let ack = result.acknowledgement.clone().unwrap_or(Value::Null);
            out["result"] = redact(ack);
        }
        Outcome::DryRunReported => {}
    }
    out
}

/// Mask any `Password`-like property the service echoes back.
pub fn redact(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(k, v)| {
                    if k.to_ascii_lowercase().contains("password") && v.is_string() {
                        (k, Value::String(REDACTED.to_string()))
                    } else {
                        (k, redact(v))
                    }
                })
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(redact).collect()),
        other => other,
    }
}
