//! Case normalization applied to identifying text fields.
//!
//! User names and e-mail addresses are stored lower case, role names upper
//! case. The deserializers apply the same rule on the way in so a payload can
//! never place mixed-case text in a field.

use serde::{Deserialize, Deserializer};

pub fn lowercase(value: &str) -> String {
    value.to_lowercase()
}

pub fn uppercase(value: &str) -> String {
    value.to_uppercase()
}

pub(crate) fn deserialize_lowercase<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = String::deserialize(deserializer)?;
    Ok(lowercase(&value))
}

pub(crate) fn deserialize_lowercase_opt<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.as_deref().map(lowercase))
}

pub(crate) fn deserialize_uppercase<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = String::deserialize(deserializer)?;
    Ok(uppercase(&value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lowercase_handles_unicode() {
        assert_eq!(lowercase("ÄdMiN"), "ädmin");
    }

    #[test]
    fn test_uppercase() {
        assert_eq!(uppercase("Admin"), "ADMIN");
    }
}
