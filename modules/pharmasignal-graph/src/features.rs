//! Per-cluster structural and belief features.

use std::collections::HashSet;

use pharmasignal_common::{Belief, EmotionPattern, Level};

use crate::diagnostics::emotion_pattern;
use crate::interaction::{SocialEdge, SocialNode};

/// External edge weight at or above which a cluster counts as highly connected.
pub const EXTERNAL_HIGH_WEIGHT: f64 = 5.0;
/// External edge weight at or above which a cluster counts as connected at all.
pub const EXTERNAL_MEDIUM_WEIGHT: f64 = 1.0;

#[derive(Debug, Clone, PartialEq)]
pub struct ClusterFeatures {
    pub dominant_beliefs: Vec<Belief>,
    pub internal_weight: f64,
    pub internal_density: Level,
    pub external_weight: f64,
    pub external_connectivity: Level,
    pub emotion_pattern: EmotionPattern,
}

impl ClusterFeatures {
    /// Leading dominant belief; `Neutral` when no flag is set anywhere.
    pub fn primary_belief(&self) -> Belief {
        self.dominant_beliefs.first().copied().unwrap_or(Belief::Neutral)
    }
}

/// Compute features for the cluster made of `members`, against the full edge list.
pub fn extract_features(members: &[&SocialNode], edges: &[SocialEdge]) -> ClusterFeatures {
    let ids: HashSet<&str> = members.iter().map(|n| n.node_id.as_str()).collect();

    let internal_weight = internal_edge_weight(&ids, edges);
    let external_weight = external_edge_weight(&ids, edges);

    ClusterFeatures {
        dominant_beliefs: dominant_beliefs(members),
        internal_weight,
        internal_density: density_level(members.len(), internal_weight),
        external_weight,
        external_connectivity: connectivity_level(external_weight),
        emotion_pattern: emotion_pattern(members),
    }
}

/// Flags held by at least one member, most common first. Ties keep `Belief::FLAGS` order.
pub fn dominant_beliefs(members: &[&SocialNode]) -> Vec<Belief> {
    let mut counted: Vec<(Belief, usize)> = Belief::FLAGS
        .iter()
        .map(|&flag| (flag, members.iter().filter(|n| n.holds(flag)).count()))
        .filter(|(_, count)| *count > 0)
        .collect();

    if counted.is_empty() {
        return vec![Belief::Neutral];
    }

    // sort_by is stable
    counted.sort_by(|a, b| b.1.cmp(&a.1));
    counted.into_iter().map(|(flag, _)| flag).collect()
}

/// Sum of weights of edges with both endpoints in the cluster.
pub fn internal_edge_weight(ids: &HashSet<&str>, edges: &[SocialEdge]) -> f64 {
    edges
        .iter()
        .filter(|e| ids.contains(e.source_node.as_str()) && ids.contains(e.target_node.as_str()))
        .map(|e| e.weight)
        .sum()
}

/// Sum of weights of edges with exactly one endpoint in the cluster.
pub fn external_edge_weight(ids: &HashSet<&str>, edges: &[SocialEdge]) -> f64 {
    edges
        .iter()
        .filter(|e| ids.contains(e.source_node.as_str()) != ids.contains(e.target_node.as_str()))
        .map(|e| e.weight)
        .sum()
}

pub fn density_level(cluster_size: usize, internal_weight: f64) -> Level {
    if cluster_size <= 1 {
        Level::Low
    } else if internal_weight >= cluster_size as f64 {
        Level::High
    } else if internal_weight > 0.0 {
        Level::Medium
    } else {
        Level::Low
    }
}

pub fn connectivity_level(external_weight: f64) -> Level {
    if external_weight >= EXTERNAL_HIGH_WEIGHT {
        Level::High
    } else if external_weight >= EXTERNAL_MEDIUM_WEIGHT {
        Level::Medium
    } else {
        Level::Low
    }
}
