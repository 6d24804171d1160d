//! Read-side perception aggregates for one drug.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use pharmasignal_common::DrugSnapshot;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PerceptionCounts {
    pub drug_id: i64,
    pub perception_counts: BTreeMap<String, u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct EmotionTimeline {
    pub drug_id: i64,
    pub window_days: i64,
    pub distribution: BTreeMap<String, u64>,
}

/// Perceived-effectiveness distribution over mentions that have a perception.
pub fn perception_counts(snapshot: &DrugSnapshot) -> PerceptionCounts {
    let mut counts = BTreeMap::new();
    for p in snapshot.perceptions() {
        *counts
            .entry(label_or_neutral(p.perceived_effectiveness.as_deref()))
            .or_default() += 1;
    }
    PerceptionCounts {
        drug_id: snapshot.drug_id,
        perception_counts: counts,
    }
}

/// Primary-emotion distribution over mentions posted within the last `window_days`.
///
/// A window reaching past the representable calendar counts every mention.
pub fn emotion_timeline(
    snapshot: &DrugSnapshot,
    window_days: i64,
    now: DateTime<Utc>,
) -> EmotionTimeline {
    let since = window_start(now, window_days);
    let mut distribution = BTreeMap::new();
    for m in snapshot.mentions.iter().filter(|m| m.timestamp >= since) {
        if let Some(p) = snapshot.perception(m.mention_id) {
            *distribution
                .entry(label_or_neutral(p.emotion_primary.as_deref()))
                .or_default() += 1;
        }
    }
    EmotionTimeline {
        drug_id: snapshot.drug_id,
        window_days,
        distribution,
    }
}

fn window_start(now: DateTime<Utc>, window_days: i64) -> DateTime<Utc> {
    Duration::try_days(window_days)
        .and_then(|window| now.checked_sub_signed(window))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

pub(crate) fn label_or_neutral(label: Option<&str>) -> String {
    match label {
        Some(l) if !l.is_empty() => l.to_string(),
        _ => "neutral".to_string(),
    }
}
