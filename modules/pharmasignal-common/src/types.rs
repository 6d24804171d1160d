use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::PharmaSignalError;

// --- Registry Types ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Drug {
    pub drug_id: i64,
    pub drug_name: String,
    #[serde(default)]
    pub aliases: Vec<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default = "default_tracking_status")]
    pub tracking_status: String,
}

fn default_tracking_status() -> String {
    "active".to_string()
}

// --- Mention Types ---

/// A single social-media-like post that names a tracked drug.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mention {
    pub mention_id: i64,
    pub drug_id: i64,
    pub raw_text: String,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub timestamp: DateTime<Utc>,
    pub platform: String,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub location_raw: Option<String>,
    #[serde(default)]
    pub thread_id: Option<String>,
    #[serde(default)]
    pub parent_mention_id: Option<i64>,
}

/// Perception fields derived upstream by the keyword rule engine.
///
/// Every field is optional. `emotion`, `perceived_safety`, `legitimacy_doubt` and
/// `placebo_expectation_alignment` are older spellings some upstream writers still emit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PerceptionSignal {
    pub mention_id: i64,
    #[serde(default)]
    pub emotion_primary: Option<String>,
    #[serde(default)]
    pub emotion: Option<String>,
    #[serde(default)]
    pub emotion_intensity: Option<f64>,
    #[serde(default)]
    pub perceived_effectiveness: Option<String>,
    #[serde(default)]
    pub perceived_legitimacy: Option<String>,
    #[serde(default)]
    pub perceived_safety: Option<String>,
    #[serde(default)]
    pub brand_trust: Option<String>,
    #[serde(default)]
    pub expectation_alignment: Option<String>,
    #[serde(default)]
    pub placebo_activation_likelihood: Option<String>,
    #[serde(default)]
    pub placebo_expectation_alignment: Option<String>,
    #[serde(default)]
    pub long_term_safety_fear: Option<bool>,
    #[serde(default)]
    pub legitimacy_doubt: Option<bool>,
}

// --- Node Grouping ---

/// How mentions collapse into interaction-graph nodes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum NodeMode {
    /// One node per mention.
    #[default]
    Mention,
    /// One node per thread; mentions without a thread id stay mention nodes.
    Thread,
}

impl NodeMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeMode::Mention => "mention",
            NodeMode::Thread => "thread",
        }
    }
}

impl fmt::Display for NodeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NodeMode {
    type Err = PharmaSignalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mention" => Ok(NodeMode::Mention),
            "thread" => Ok(NodeMode::Thread),
            other => Err(PharmaSignalError::Config(format!(
                "unknown node mode '{other}' (expected 'mention' or 'thread')"
            ))),
        }
    }
}

// --- Timestamps ---

/// Parse a stored timestamp. Accepts RFC 3339 as well as naive ISO forms with either a
/// `T` or a space separator; naive values are taken as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}

fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("unrecognized timestamp '{raw}'")))
}
