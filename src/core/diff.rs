use secrecy::{ExposeSecret, SecretString};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use crate::core::record::{CredentialRecord, DesiredState, Field, PasswordId};

/// Fields whose desired value differs from the live record, keyed by field, holding the desired value.
#[derive(Debug, Clone, Default)]
pub struct FieldDiff {
    changes: BTreeMap<Field, SecretString>,
}

impl FieldDiff {
    /// Compare each declared field against the live record using exact string equality.
    /// Fields the operator did not declare are never part of the diff.
    pub fn compute(current: &CredentialRecord, desired: &DesiredState) -> Self {
        let mut changes = BTreeMap::new();

        if let Some(want) = desired.username.as_deref() {
            if current.username.as_deref() != Some(want) {
                changes.insert(Field::UserName, SecretString::from(want));
            }
        }

        if let Some(want) = desired.password.as_ref() {
            let have = current.password.as_ref().map(|p| p.expose_secret());
            if have != Some(want.expose_secret()) {
                changes.insert(Field::Password, want.clone());
            }
        }

        FieldDiff { changes }
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn contains(&self, field: Field) -> bool {
        self.changes.contains_key(&field)
    }

    pub fn fields(&self) -> impl Iterator<Item = Field> + '_ {
        self.changes.keys().copied()
    }

    /// Wire names of the changed fields; safe to log or print.
    pub fn field_names(&self) -> Vec<&'static str> {
        self.fields().map(Field::wire_name).collect()
    }

    /// Desired value for a changed field. Exposes secrets; never log the result.
    pub fn value(&self, field: Field) -> Option<&str> {
        self.changes.get(&field).map(|v| v.expose_secret())
    }

    /// Body for `PUT /api/passwords/`: the identifier plus only the changed fields.
    pub fn to_update_body(&self, id: PasswordId) -> Value {
        let mut body = Map::new();
        body.insert("PasswordID".to_string(), Value::from(id));
        for (field, value) in &self.changes {
            body.insert(
                field.wire_name().to_string(),
                Value::String(value.expose_secret().to_string()),
            );
        }
        Value::Object(body)
    }

    /// Apply the diff to a record, as the service would on a successful update.
    #[cfg(test)]
    pub(crate) fn apply_to(&self, record: &mut CredentialRecord) {
        for (field, value) in &self.changes {
            match field {
                Field::UserName => record.username = Some(value.expose_secret().to_string()),
                Field::Password => record.password = Some(value.clone()),
            }
        }
    }
}
