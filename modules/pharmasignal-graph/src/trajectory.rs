//! Belief trajectory: coarse, directional reading of where a drug's perception
//! narrative is heading, from aggregate perception counts alone.

use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::info;

use pharmasignal_common::DrugSnapshot;

use crate::aggregation::label_or_neutral;

pub const INSUFFICIENT_DATA_NOTE: &str = "Insufficient perception data to infer belief trajectory.";
pub const DIFFUSE_NOTE: &str = "Belief signals are diffuse; no dominant narrative.";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TrajectorySignal {
    pub drug_id: i64,
    pub narrative: String,
    pub notes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TrajectorySummary {
    pub effectiveness: BTreeMap<String, u64>,
    pub emotions: BTreeMap<String, u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TrajectoryReport {
    pub drug_id: i64,
    pub signals: Vec<TrajectorySignal>,
    pub notes: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<TrajectorySummary>,
}

pub fn analyze_belief_trajectory(snapshot: &DrugSnapshot) -> TrajectoryReport {
    let perceptions: Vec<_> = snapshot.perceptions().collect();
    if perceptions.is_empty() {
        return TrajectoryReport {
            drug_id: snapshot.drug_id,
            signals: Vec::new(),
            notes: vec![INSUFFICIENT_DATA_NOTE.to_string()],
            summary: None,
        };
    }

    let mut effectiveness: BTreeMap<String, u64> = BTreeMap::new();
    let mut emotions: BTreeMap<String, u64> = BTreeMap::new();
    for p in &perceptions {
        *effectiveness
            .entry(label_or_neutral(p.perceived_effectiveness.as_deref()))
            .or_default() += 1;
        *emotions
            .entry(label_or_neutral(p.emotion_primary.as_deref()))
            .or_default() += 1;
    }
    let count = |map: &BTreeMap<String, u64>, key: &str| map.get(key).copied().unwrap_or(0);

    let mut signals = Vec::new();
    let mut notes = Vec::new();

    if count(&effectiveness, "low") > count(&effectiveness, "high") {
        signals.push(TrajectorySignal {
            drug_id: snapshot.drug_id,
            narrative: "This belief narrative is likely to intensify.".to_string(),
            notes: vec!["Effectiveness doubt dominates recent perceptions.".to_string()],
        });
    }
    if count(&emotions, "fear") > 0 || count(&emotions, "doubt") > 0 {
        signals.push(TrajectorySignal {
            drug_id: snapshot.drug_id,
            narrative: "This perception is structurally isolated.".to_string(),
            notes: vec!["Negative emotions appear without balancing relief signals.".to_string()],
        });
    }
    if count(&effectiveness, "neutral") == perceptions.len() as u64 {
        notes.push(DIFFUSE_NOTE.to_string());
    }

    info!(
        drug_id = snapshot.drug_id,
        perceptions = perceptions.len(),
        signals = signals.len(),
        "Belief trajectory analyzed"
    );

    TrajectoryReport {
        drug_id: snapshot.drug_id,
        signals,
        notes,
        summary: Some(TrajectorySummary {
            effectiveness,
            emotions,
        }),
    }
}
