use secrecy::SecretString;
use serde::{Deserialize, Deserializer};

// Serde helper for Option<SecretString>; a JSON null or a missing field maps to None.
pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<SecretString>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt: Option<String> = Option::<String>::deserialize(deserializer)?;
    Ok(opt.map(|s| SecretString::new(s.into())))
}

