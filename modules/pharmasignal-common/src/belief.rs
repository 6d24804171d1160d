use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::types::NodeMode;

// --- Label Enums ---

/// A belief a cluster can be dominated by: one of the four doubt flags, or none.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Belief {
    SafetyDoubt,
    EffectivenessDoubt,
    LegitimacyDoubt,
    PlaceboFailure,
    Neutral,
}

impl Belief {
    /// The four doubt flags in their fixed tie-break order.
    pub const FLAGS: [Belief; 4] = [
        Belief::SafetyDoubt,
        Belief::EffectivenessDoubt,
        Belief::LegitimacyDoubt,
        Belief::PlaceboFailure,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Belief::SafetyDoubt => "safety_doubt",
            Belief::EffectivenessDoubt => "effectiveness_doubt",
            Belief::LegitimacyDoubt => "legitimacy_doubt",
            Belief::PlaceboFailure => "placebo_failure",
            Belief::Neutral => "neutral",
        }
    }
}

impl fmt::Display for Belief {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coarse three-step scale shared by density, connectivity and coherence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Level {
    Low,
    Medium,
    High,
}

impl Level {
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Low => "low",
            Level::Medium => "medium",
            Level::High => "high",
        }
    }

    /// Medium or high.
    pub fn is_elevated(&self) -> bool {
        matches!(self, Level::Medium | Level::High)
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum BeliefStability {
    InternallyReinforcing,
    Contested,
    StructurallyContained,
    Isolated,
}

impl BeliefStability {
    pub fn as_str(&self) -> &'static str {
        match self {
            BeliefStability::InternallyReinforcing => "internally_reinforcing",
            BeliefStability::Contested => "contested",
            BeliefStability::StructurallyContained => "structurally_contained",
            BeliefStability::Isolated => "isolated",
        }
    }
}

impl fmt::Display for BeliefStability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum EmotionPattern {
    EmotionContained,
    EmotionSpilling,
    HighVolatility,
}

impl EmotionPattern {
    pub fn as_str(&self) -> &'static str {
        match self {
            EmotionPattern::EmotionContained => "emotion_contained",
            EmotionPattern::EmotionSpilling => "emotion_spilling",
            EmotionPattern::HighVolatility => "high_volatility",
        }
    }

    /// Spilling or volatile.
    pub fn is_elevated(&self) -> bool {
        matches!(
            self,
            EmotionPattern::EmotionSpilling | EmotionPattern::HighVolatility
        )
    }
}

impl fmt::Display for EmotionPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum PropagationRisk {
    HighAmplificationLikelihood,
    ModerateSpreadPotential,
    LowPropagationRisk,
}

impl PropagationRisk {
    pub fn as_str(&self) -> &'static str {
        match self {
            PropagationRisk::HighAmplificationLikelihood => "high_amplification_likelihood",
            PropagationRisk::ModerateSpreadPotential => "moderate_spread_potential",
            PropagationRisk::LowPropagationRisk => "low_propagation_risk",
        }
    }
}

impl fmt::Display for PropagationRisk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// --- Diagnostic Output ---

/// Diagnostics for one connected discussion cluster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ClusterDiagnostic {
    pub cluster_id: String,
    pub node_ids: Vec<String>,
    pub dominant_beliefs: Vec<Belief>,
    pub belief_stability: BeliefStability,
    pub propagation_risk: PropagationRisk,
    pub emotion_pattern: EmotionPattern,
    pub internal_density: Level,
    pub external_connectivity: Level,
    pub interpretation: String,
}

/// Result of one propagation diagnostic run for a drug.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct DiagnosticResult {
    /// Display name, or the raw id when the registry has no entry.
    pub drug: String,
    pub drug_id: i64,
    pub node_mode: NodeMode,
    pub clusters: Vec<ClusterDiagnostic>,
    pub communication_gap: bool,
    pub notes: Vec<String>,
}
