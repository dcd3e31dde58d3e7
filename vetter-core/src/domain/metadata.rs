// vetter-core/src/domain/metadata.rs

use serde::{Deserialize, Deserializer, Serialize};

pub type MetaId = i64;
pub type MatterId = i64;

#[derive(Debug, Deserialize, Serialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DataKind {
    #[default]
    Free,
    Coded,
    Range,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct CodeEntry {
    #[serde(deserialize_with = "scalar_text")]
    pub value: String,
    #[serde(default)]
    pub label: String,
}

/// Field descriptor ("matter") of a metadata set.
///
/// `position` and `bytes` are kept as the text the metadata store holds.
/// The definition compiler parses and validates them, so a broken descriptor
/// only stops the run when a check actually addresses the field.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Matter {
    pub id: MatterId,
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "optional_scalar_text")]
    pub position: Option<String>,
    #[serde(default, deserialize_with = "optional_scalar_text")]
    pub bytes: Option<String>,
    #[serde(default)]
    pub kind: DataKind,
    #[serde(default)]
    pub codes: Vec<CodeEntry>,
    #[serde(default, deserialize_with = "optional_scalar_text")]
    pub min: Option<String>,
    #[serde(default, deserialize_with = "optional_scalar_text")]
    pub max: Option<String>,
    /// Optional fields may be missing from short rows without stopping the run.
    #[serde(default)]
    pub optional: bool,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct MetaDataset {
    pub id: MetaId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub quote_mark: Option<char>,
    #[serde(default)]
    pub matters: Vec<Matter>,
}

impl MetaDataset {
    pub fn matter(&self, id: MatterId) -> Option<&Matter> {
        self.matters.iter().find(|m| m.id == id)
    }
}

// Metadata stores hand positions over as text, YAML authors write numbers.
pub(crate) fn scalar_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_yaml::Value::deserialize(deserializer)?;
    yaml_scalar(value).ok_or_else(|| serde::de::Error::custom("expected a scalar value"))
}

fn optional_scalar_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_yaml::Value>::deserialize(deserializer)?;
    match value {
        None | Some(serde_yaml::Value::Null) => Ok(None),
        Some(v) => yaml_scalar(v)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom("expected a scalar value")),
    }
}

fn yaml_scalar(value: serde_yaml::Value) -> Option<String> {
    match value {
        serde_yaml::Value::String(s) => Some(s),
        serde_yaml::Value::Number(n) => Some(n.to_string()),
        serde_yaml::Value::Bool(b) => Some(b.to_string()),
        serde_yaml::Value::Null => Some(String::new()),
        _ => None,
    }
}
