//! Diagnostic classifiers: pure functions from cluster features to fixed labels.
//!
//! Every function here is total. The last branch of each is an explicit default.

use std::collections::{HashMap, HashSet};

use pharmasignal_common::{Belief, BeliefStability, EmotionPattern, Level, PropagationRisk};

use crate::interaction::SocialNode;

/// Share of the most common belief vector needed for high coherence.
const COHERENCE_HIGH_SHARE: f64 = 0.7;
/// Share of the most common belief vector needed for medium coherence.
const COHERENCE_MEDIUM_SHARE: f64 = 0.4;

/// Intensity spread at which emotion is considered to spill across the cluster.
const EMOTION_SPILL_SPREAD: f64 = 0.5;
/// Peak intensity at which a cluster is considered volatile.
const EMOTION_VOLATILE_PEAK: f64 = 0.7;

/// How uniformly members share one exact belief vector.
pub fn coherence(nodes: &[&SocialNode]) -> Level {
    if nodes.is_empty() {
        return Level::Low;
    }

    let mut counts: HashMap<[bool; 4], usize> = HashMap::new();
    for n in nodes {
        *counts.entry(n.belief_vector()).or_default() += 1;
    }
    let top = counts.values().copied().max().unwrap_or(0);
    let share = top as f64 / nodes.len() as f64;

    if share >= COHERENCE_HIGH_SHARE {
        Level::High
    } else if share >= COHERENCE_MEDIUM_SHARE {
        Level::Medium
    } else {
        Level::Low
    }
}

pub fn belief_stability(nodes: &[&SocialNode]) -> BeliefStability {
    if nodes.is_empty() {
        return BeliefStability::Isolated;
    }
    match coherence(nodes) {
        Level::High => BeliefStability::InternallyReinforcing,
        Level::Medium => BeliefStability::Contested,
        Level::Low => BeliefStability::StructurallyContained,
    }
}

/// Classify emotional spread from the members' defined intensities.
pub fn emotion_pattern(nodes: &[&SocialNode]) -> EmotionPattern {
    let intensities: Vec<f64> = nodes.iter().filter_map(|n| n.emotion_intensity).collect();
    if intensities.is_empty() {
        return EmotionPattern::EmotionContained;
    }

    let max = intensities.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let min = intensities.iter().copied().fold(f64::INFINITY, f64::min);

    if max - min >= EMOTION_SPILL_SPREAD {
        EmotionPattern::EmotionSpilling
    } else if max >= EMOTION_VOLATILE_PEAK {
        EmotionPattern::HighVolatility
    } else {
        EmotionPattern::EmotionContained
    }
}

/// Internal density does not currently move the risk label.
pub fn propagation_risk(
    _internal_density: Level,
    external_connectivity: Level,
    emotion_pattern: EmotionPattern,
    stability: BeliefStability,
) -> PropagationRisk {
    if external_connectivity.is_elevated() && emotion_pattern.is_elevated() {
        PropagationRisk::HighAmplificationLikelihood
    } else if external_connectivity == Level::Medium
        || stability == BeliefStability::InternallyReinforcing
    {
        PropagationRisk::ModerateSpreadPotential
    } else {
        PropagationRisk::LowPropagationRisk
    }
}

/// Drug-wide gap: clusters disagree on their leading belief and nothing links any of them.
pub fn communication_gap(component_beliefs: &[Belief], has_any_edge: bool) -> bool {
    let distinct: HashSet<&Belief> = component_beliefs.iter().collect();
    if distinct.len() <= 1 {
        return false;
    }
    !has_any_edge
}

pub fn interpretation(
    stability: BeliefStability,
    external_connectivity: Level,
    emotion_pattern: EmotionPattern,
) -> &'static str {
    if stability == BeliefStability::InternallyReinforcing && external_connectivity == Level::Low {
        "internally reinforcing but structurally contained"
    } else if external_connectivity.is_elevated() && emotion_pattern.is_elevated() {
        "cross-group exposure with elevated emotional intensity"
    } else if stability == BeliefStability::Contested {
        "contested with mixed perceptions"
    } else {
        "present but structurally sparse"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn node(flags: [bool; 4], intensity: Option<f64>) -> SocialNode {
        SocialNode {
            node_id: "n".to_string(),
            timestamp: Utc::now(),
            text: String::new(),
            emotion: None,
            emotion_intensity: intensity,
            safety_doubt: flags[0],
            effectiveness_doubt: flags[1],
            legitimacy_doubt: flags[2],
            placebo_failure: flags[3],
            sentiment_score: 0.0,
        }
    }

    const EFF: [bool; 4] = [false, true, false, false];
    const SAFE: [bool; 4] = [true, false, false, false];
    const NONE: [bool; 4] = [false; 4];

    // --- belief_stability ---

    #[test]
    fn empty_cluster_is_isolated() {
        assert_eq!(belief_stability(&[]), BeliefStability::Isolated);
        assert_eq!(coherence(&[]), Level::Low);
    }

    #[test]
    fn single_node_is_fully_coherent() {
        let a = node(EFF, None);
        assert_eq!(belief_stability(&[&a]), BeliefStability::InternallyReinforcing);
    }

    #[test]
    fn seventy_percent_share_is_high() {
        let nodes: Vec<SocialNode> = (0..10)
            .map(|i| node(if i < 7 { EFF } else { SAFE }, None))
            .collect();
        let refs: Vec<&SocialNode> = nodes.iter().collect();
        assert_eq!(coherence(&refs), Level::High);
    }

    #[test]
    fn half_share_is_contested() {
        let a = node(EFF, None);
        let b = node(SAFE, None);
        assert_eq!(belief_stability(&[&a, &b]), BeliefStability::Contested);
    }

    #[test]
    fn fragmented_vectors_are_structurally_contained() {
        let a = node(EFF, None);
        let b = node(SAFE, None);
        let c = node(NONE, None);
        assert_eq!(
            belief_stability(&[&a, &b, &c]),
            BeliefStability::StructurallyContained
        );
    }

    #[test]
    fn vectors_compare_as_a_whole() {
        let a = node([true, true, false, false], None);
        let b = node(SAFE, None);
        let c = node(EFF, None);
        assert_eq!(coherence(&[&a, &b, &c]), Level::Low);
    }

    // --- emotion_pattern ---

    #[test]
    fn no_intensities_is_contained() {
        let a = node(NONE, None);
        assert_eq!(emotion_pattern(&[&a]), EmotionPattern::EmotionContained);
        assert_eq!(emotion_pattern(&[]), EmotionPattern::EmotionContained);
    }

    #[test]
    fn wide_spread_is_spilling() {
        let a = node(NONE, Some(0.1));
        let b = node(NONE, Some(0.8));
        let c = node(NONE, None);
        assert_eq!(emotion_pattern(&[&a, &b, &c]), EmotionPattern::EmotionSpilling);
    }

    #[test]
    fn high_narrow_is_volatile() {
        let a = node(NONE, Some(0.8));
        let b = node(NONE, Some(0.9));
        assert_eq!(emotion_pattern(&[&a, &b]), EmotionPattern::HighVolatility);
        assert_eq!(emotion_pattern(&[&a]), EmotionPattern::HighVolatility);
    }

    #[test]
    fn low_narrow_is_contained() {
        let a = node(NONE, Some(0.3));
        let b = node(NONE, Some(0.6));
        assert_eq!(emotion_pattern(&[&a, &b]), EmotionPattern::EmotionContained);
    }

    // --- propagation_risk ---

    #[test]
    fn connected_and_emotional_is_high_amplification() {
        for external in [Level::Medium, Level::High] {
            for emotion in [EmotionPattern::EmotionSpilling, EmotionPattern::HighVolatility] {
                assert_eq!(
                    propagation_risk(Level::Low, external, emotion, BeliefStability::Contested),
                    PropagationRisk::HighAmplificationLikelihood
                );
            }
        }
    }

    #[test]
    fn medium_connectivity_without_emotion_is_moderate() {
        assert_eq!(
            propagation_risk(
                Level::High,
                Level::Medium,
                EmotionPattern::EmotionContained,
                BeliefStability::Contested
            ),
            PropagationRisk::ModerateSpreadPotential
        );
    }

    #[test]
    fn high_connectivity_calm_and_contested_is_low() {
        assert_eq!(
            propagation_risk(
                Level::High,
                Level::High,
                EmotionPattern::EmotionContained,
                BeliefStability::Contested
            ),
            PropagationRisk::LowPropagationRisk
        );
    }

    #[test]
    fn reinforcing_cluster_is_moderate_even_when_isolated() {
        assert_eq!(
            propagation_risk(
                Level::Low,
                Level::Low,
                EmotionPattern::HighVolatility,
                BeliefStability::InternallyReinforcing
            ),
            PropagationRisk::ModerateSpreadPotential
        );
    }

    // --- communication_gap ---

    #[test]
    fn uniform_beliefs_never_gap() {
        assert!(!communication_gap(&[Belief::SafetyDoubt, Belief::SafetyDoubt], false));
        assert!(!communication_gap(&[Belief::Neutral], false));
        assert!(!communication_gap(&[], false));
    }

    #[test]
    fn divergent_beliefs_gap_only_without_any_edge() {
        let beliefs = [Belief::SafetyDoubt, Belief::Neutral];
        assert!(communication_gap(&beliefs, false));
        assert!(!communication_gap(&beliefs, true));
    }

    // --- interpretation ---

    #[test]
    fn interpretation_first_match_wins() {
        assert_eq!(
            interpretation(
                BeliefStability::InternallyReinforcing,
                Level::Low,
                EmotionPattern::EmotionSpilling
            ),
            "internally reinforcing but structurally contained"
        );
        assert_eq!(
            interpretation(
                BeliefStability::Contested,
                Level::High,
                EmotionPattern::HighVolatility
            ),
            "cross-group exposure with elevated emotional intensity"
        );
        assert_eq!(
            interpretation(
                BeliefStability::Contested,
                Level::Medium,
                EmotionPattern::EmotionContained
            ),
            "contested with mixed perceptions"
        );
        assert_eq!(
            interpretation(
                BeliefStability::InternallyReinforcing,
                Level::Medium,
                EmotionPattern::EmotionContained
            ),
            "present but structurally sparse"
        );
        assert_eq!(
            interpretation(
                BeliefStability::Isolated,
                Level::Low,
                EmotionPattern::EmotionContained
            ),
            "present but structurally sparse"
        );
    }
}
