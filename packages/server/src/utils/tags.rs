use sea_orm::prelude::Json;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::FieldErrors;

const MAX_TAGS: usize = 50;
const MAX_TAG_CHARS: usize = 64;

/// Normalized list of free-form tags (technology stack, skills, interests).
///
/// Clients may send a JSON array of strings, a comma-separated string, or a string
/// holding a JSON array. All three end up as the same trimmed, de-duplicated list;
/// storage always holds a JSON array.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TagList(Vec<String>);

#[derive(Deserialize)]
#[serde(untagged)]
enum RawTags {
    List(Vec<String>),
    Text(String),
}

impl TagList {
    /// Build from raw items: trims, drops blanks, and removes case-insensitive duplicates
    /// (the first spelling wins).
    pub fn new<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut tags: Vec<String> = Vec::new();
        for item in items {
            let tag = item.as_ref().trim();
            if tag.is_empty() {
                continue;
            }
            let lowered = tag.to_lowercase();
            if tags.iter().any(|t| t.to_lowercase() == lowered) {
                continue;
            }
            tags.push(tag.to_string());
        }
        Self(tags)
    }

    /// Parse the textual wire form: either a JSON array or a comma-separated list.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.starts_with('[')
            && let Ok(items) = serde_json::from_str::<Vec<String>>(trimmed)
        {
            return Self::new(items);
        }
        Self::new(trimmed.split(','))
    }

    /// Read tags back from a JSON column. Non-string entries are stringified.
    pub fn from_json(value: &Json) -> Self {
        match value {
            Json::Array(items) => Self::new(items.iter().map(|v| match v {
                Json::String(s) => s.clone(),
                other => other.to_string(),
            })),
            Json::String(s) => Self::parse(s),
            _ => Self::default(),
        }
    }

    pub fn to_json(&self) -> Json {
        Json::Array(self.0.iter().cloned().map(Json::String).collect())
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn into_vec(self) -> Vec<String> {
        self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Case-insensitive membership test.
    pub fn contains(&self, tag: &str) -> bool {
        let needle = tag.trim().to_lowercase();
        self.0.iter().any(|t| t.to_lowercase() == needle)
    }

    /// Record size violations under `field`.
    pub fn validate(&self, field: &str, errors: &mut FieldErrors) {
        if self.0.len() > MAX_TAGS {
            errors.add(field, format!("At most {MAX_TAGS} entries are allowed"));
        }
        if self.0.iter().any(|t| t.chars().count() > MAX_TAG_CHARS) {
            errors.add(
                field,
                format!("Each entry must be at most {MAX_TAG_CHARS} characters"),
            );
        }
    }
}

impl<'de> Deserialize<'de> for TagList {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match RawTags::deserialize(deserializer)? {
            RawTags::List(items) => Ok(Self::new(items)),
            RawTags::Text(text) => Ok(Self::parse(&text)),
        }
    }
}
