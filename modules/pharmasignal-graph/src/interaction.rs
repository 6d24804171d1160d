//! Interaction graph construction: mentions become nodes, reply links become edges.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use pharmasignal_common::{Belief, DrugSnapshot, Mention, NodeMode, PerceptionSignal};

/// Sentiment magnitude assigned to clearly positive or negative emotions.
const SENTIMENT_MAGNITUDE: f64 = 0.7;

const POSITIVE_EMOTIONS: &[&str] = &["relief", "trust", "satisfied"];
const NEGATIVE_EMOTIONS: &[&str] = &["fear", "doubt", "frustration", "anger"];

/// One discussion unit: a mention, or a whole thread in thread mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SocialNode {
    pub node_id: String,
    pub timestamp: DateTime<Utc>,
    pub text: String,
    pub emotion: Option<String>,
    pub emotion_intensity: Option<f64>,
    pub safety_doubt: bool,
    pub effectiveness_doubt: bool,
    pub legitimacy_doubt: bool,
    pub placebo_failure: bool,
    pub sentiment_score: f64,
}

impl SocialNode {
    /// Flags in `Belief::FLAGS` order.
    pub fn belief_vector(&self) -> [bool; 4] {
        [
            self.safety_doubt,
            self.effectiveness_doubt,
            self.legitimacy_doubt,
            self.placebo_failure,
        ]
    }

    /// Whether this node carries `belief`. `Neutral` marks the absence of flags and is
    /// never held.
    pub fn holds(&self, belief: Belief) -> bool {
        match belief {
            Belief::SafetyDoubt => self.safety_doubt,
            Belief::EffectivenessDoubt => self.effectiveness_doubt,
            Belief::LegitimacyDoubt => self.legitimacy_doubt,
            Belief::PlaceboFailure => self.placebo_failure,
            Belief::Neutral => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionType {
    Reply,
    Adjacent,
}

/// Directed parent -> child link. Source is the replied-to node, target the reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SocialEdge {
    pub source_node: String,
    pub target_node: String,
    pub interaction_type: InteractionType,
    pub weight: f64,
}

impl SocialEdge {
    pub fn reply(source_node: String, target_node: String) -> Self {
        Self {
            source_node,
            target_node,
            interaction_type: InteractionType::Reply,
            weight: 1.0,
        }
    }
}

/// Nodes in first-seen order plus every reply edge (duplicates kept).
#[derive(Debug, Clone, Default)]
pub struct InteractionGraph {
    pub nodes: Vec<SocialNode>,
    pub edges: Vec<SocialEdge>,
    index: HashMap<String, usize>,
}

impl InteractionGraph {
    pub fn index_of(&self, node_id: &str) -> Option<usize> {
        self.index.get(node_id).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Build the interaction graph for one drug snapshot.
///
/// Parents are resolved within the snapshot only; a reply whose parent is missing
/// contributes a node but no edge.
pub fn build_interaction_graph(snapshot: &DrugSnapshot, mode: NodeMode) -> InteractionGraph {
    let mut graph = InteractionGraph::default();

    for m in &snapshot.mentions {
        let node_id = node_id_for(m, mode);
        if graph.index.contains_key(&node_id) {
            continue;
        }
        let node = node_payload(node_id.clone(), m, snapshot.perception(m.mention_id));
        graph.index.insert(node_id, graph.nodes.len());
        graph.nodes.push(node);
    }

    let by_id: HashMap<i64, &Mention> = snapshot
        .mentions
        .iter()
        .map(|m| (m.mention_id, m))
        .collect();

    for m in &snapshot.mentions {
        let Some(parent_id) = m.parent_mention_id else {
            continue;
        };
        let Some(parent) = by_id.get(&parent_id) else {
            debug!(
                mention_id = m.mention_id,
                parent_mention_id = parent_id,
                "Reply parent not in snapshot, skipping edge"
            );
            continue;
        };

        let source = node_id_for(parent, mode);
        let target = node_id_for(m, mode);
        if source == target {
            continue;
        }
        graph.edges.push(SocialEdge::reply(source, target));
    }

    graph
}

/// Grouping key for a mention under the given mode.
pub fn node_id_for(m: &Mention, mode: NodeMode) -> String {
    match (mode, m.thread_id.as_deref()) {
        (NodeMode::Thread, Some(thread_id)) if !thread_id.is_empty() => {
            format!("thread:{thread_id}")
        }
        _ => format!("mention:{}", m.mention_id),
    }
}

fn node_payload(node_id: String, m: &Mention, p: Option<&PerceptionSignal>) -> SocialNode {
    let Some(p) = p else {
        return SocialNode {
            node_id,
            timestamp: m.timestamp,
            text: m.raw_text.clone(),
            emotion: None,
            emotion_intensity: None,
            safety_doubt: false,
            effectiveness_doubt: false,
            legitimacy_doubt: false,
            placebo_failure: false,
            sentiment_score: 0.0,
        };
    };

    let emotion = non_empty(&p.emotion_primary)
        .or_else(|| non_empty(&p.emotion))
        .map(str::to_string);

    // Each flag ORs every field that has ever carried it upstream.
    let safety_doubt = p.long_term_safety_fear.unwrap_or(false)
        || is(&p.perceived_safety, "unsafe");
    let effectiveness_doubt = is(&p.perceived_effectiveness, "low");
    let legitimacy_doubt = is(&p.perceived_legitimacy, "low")
        || is(&p.brand_trust, "low")
        || p.legitimacy_doubt.unwrap_or(false);
    let placebo_failure = is(&p.expectation_alignment, "low")
        || is(&p.placebo_activation_likelihood, "low")
        || is(&p.placebo_expectation_alignment, "misaligned")
        || is(&p.placebo_expectation_alignment, "collapsed");

    let sentiment_score = sentiment_from_emotion(emotion.as_deref());

    SocialNode {
        node_id,
        timestamp: m.timestamp,
        text: m.raw_text.clone(),
        emotion,
        emotion_intensity: p.emotion_intensity,
        safety_doubt,
        effectiveness_doubt,
        legitimacy_doubt,
        placebo_failure,
        sentiment_score,
    }
}

/// Fixed emotion -> sentiment lookup, case-insensitive.
pub fn sentiment_from_emotion(emotion: Option<&str>) -> f64 {
    let Some(emotion) = emotion else {
        return 0.0;
    };
    let emotion = emotion.to_lowercase();
    if POSITIVE_EMOTIONS.contains(&emotion.as_str()) {
        SENTIMENT_MAGNITUDE
    } else if NEGATIVE_EMOTIONS.contains(&emotion.as_str()) {
        -SENTIMENT_MAGNITUDE
    } else {
        0.0
    }
}

fn non_empty(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|s| !s.is_empty())
}

fn is(field: &Option<String>, value: &str) -> bool {
    field.as_deref() == Some(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn mention(id: i64, thread: Option<&str>, parent: Option<i64>) -> Mention {
        Mention {
            mention_id: id,
            drug_id: 1,
            raw_text: format!("mention {id}"),
            timestamp: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
            platform: "reddit".to_string(),
            language: None,
            location_raw: None,
            thread_id: thread.map(str::to_string),
            parent_mention_id: parent,
        }
    }

    fn perception(id: i64) -> PerceptionSignal {
        PerceptionSignal {
            mention_id: id,
            ..Default::default()
        }
    }

    fn snapshot(mentions: Vec<Mention>, perceptions: Vec<PerceptionSignal>) -> DrugSnapshot {
        DrugSnapshot::new(1, None, mentions, perceptions)
    }

    // --- node construction ---

    #[test]
    fn one_node_per_mention_in_mention_mode() {
        let snap = snapshot(
            vec![mention(1, Some("t"), None), mention(2, Some("t"), Some(1))],
            vec![],
        );
        let graph = build_interaction_graph(&snap, NodeMode::Mention);
        let ids: Vec<&str> = graph.nodes.iter().map(|n| n.node_id.as_str()).collect();
        assert_eq!(ids, vec!["mention:1", "mention:2"]);
        assert_eq!(graph.edges.len(), 1);
        assert_eq!(graph.edges[0].source_node, "mention:1");
        assert_eq!(graph.edges[0].target_node, "mention:2");
        assert_eq!(graph.edges[0].interaction_type, InteractionType::Reply);
        assert_eq!(graph.edges[0].weight, 1.0);
    }

    #[test]
    fn thread_mode_collapses_and_first_payload_wins() {
        let mut first = perception(1);
        first.perceived_effectiveness = Some("low".to_string());
        let mut second = perception(2);
        second.brand_trust = Some("low".to_string());

        let snap = snapshot(
            vec![mention(1, Some("t1"), None), mention(2, Some("t1"), Some(1))],
            vec![first, second],
        );
        let graph = build_interaction_graph(&snap, NodeMode::Thread);
        assert_eq!(graph.nodes.len(), 1);
        assert_eq!(graph.nodes[0].node_id, "thread:t1");
        assert!(graph.nodes[0].effectiveness_doubt);
        assert!(!graph.nodes[0].legitimacy_doubt);
        // Reply inside the same thread would be a self-loop.
        assert!(graph.edges.is_empty());
    }

    #[test]
    fn thread_mode_without_thread_id_falls_back_to_mention_node() {
        let snap = snapshot(
            vec![mention(1, Some("t1"), None), mention(2, None, Some(1)), mention(3, Some(""), None)],
            vec![],
        );
        let graph = build_interaction_graph(&snap, NodeMode::Thread);
        let ids: Vec<&str> = graph.nodes.iter().map(|n| n.node_id.as_str()).collect();
        assert_eq!(ids, vec!["thread:t1", "mention:2", "mention:3"]);
        assert_eq!(graph.edges[0].source_node, "thread:t1");
        assert_eq!(graph.edges[0].target_node, "mention:2");
    }

    #[test]
    fn unresolvable_parent_yields_no_edge() {
        let snap = snapshot(vec![mention(2, None, Some(99))], vec![]);
        let graph = build_interaction_graph(&snap, NodeMode::Mention);
        assert_eq!(graph.nodes.len(), 1);
        assert!(graph.edges.is_empty());
    }

    #[test]
    fn self_reply_is_dropped() {
        let snap = snapshot(vec![mention(1, None, Some(1))], vec![]);
        let graph = build_interaction_graph(&snap, NodeMode::Mention);
        assert!(graph.edges.is_empty());
    }

    #[test]
    fn every_edge_endpoint_is_a_node() {
        let snap = snapshot(
            vec![
                mention(1, Some("a"), None),
                mention(2, Some("b"), Some(1)),
                mention(3, Some("a"), Some(2)),
                mention(4, None, Some(3)),
                mention(5, None, Some(77)),
            ],
            vec![],
        );
        for mode in [NodeMode::Mention, NodeMode::Thread] {
            let graph = build_interaction_graph(&snap, mode);
            for edge in &graph.edges {
                assert!(graph.index_of(&edge.source_node).is_some());
                assert!(graph.index_of(&edge.target_node).is_some());
                assert_ne!(edge.source_node, edge.target_node);
            }
        }
    }

    // --- payload derivation ---

    #[test]
    fn missing_perception_yields_neutral_node() {
        let snap = snapshot(vec![mention(1, None, None)], vec![]);
        let node = &build_interaction_graph(&snap, NodeMode::Mention).nodes[0];
        assert_eq!(node.belief_vector(), [false; 4]);
        assert_eq!(node.emotion, None);
        assert_eq!(node.emotion_intensity, None);
        assert_eq!(node.sentiment_score, 0.0);
        assert!(Belief::FLAGS.iter().all(|&flag| !node.holds(flag)));
        assert!(!node.holds(Belief::Neutral));
    }

    #[test]
    fn safety_doubt_from_either_source() {
        let mut a = perception(1);
        a.long_term_safety_fear = Some(true);
        let mut b = perception(2);
        b.perceived_safety = Some("unsafe".to_string());
        let mut c = perception(3);
        c.long_term_safety_fear = Some(false);

        let snap = snapshot(
            vec![mention(1, None, None), mention(2, None, None), mention(3, None, None)],
            vec![a, b, c],
        );
        let graph = build_interaction_graph(&snap, NodeMode::Mention);
        let flags: Vec<bool> = graph.nodes.iter().map(|n| n.safety_doubt).collect();
        assert_eq!(flags, vec![true, true, false]);
    }

    #[test]
    fn legitimacy_doubt_from_any_of_three_sources() {
        let mut a = perception(1);
        a.perceived_legitimacy = Some("low".to_string());
        let mut b = perception(2);
        b.brand_trust = Some("low".to_string());
        let mut c = perception(3);
        c.legitimacy_doubt = Some(true);
        let mut d = perception(4);
        d.perceived_legitimacy = Some("high".to_string());

        let snap = snapshot(
            (1..=4).map(|i| mention(i, None, None)).collect(),
            vec![a, b, c, d],
        );
        let graph = build_interaction_graph(&snap, NodeMode::Mention);
        let flags: Vec<bool> = graph.nodes.iter().map(|n| n.legitimacy_doubt).collect();
        assert_eq!(flags, vec![true, true, true, false]);
    }

    #[test]
    fn placebo_failure_from_any_source() {
        let mut a = perception(1);
        a.expectation_alignment = Some("low".to_string());
        let mut b = perception(2);
        b.placebo_activation_likelihood = Some("low".to_string());
        let mut c = perception(3);
        c.placebo_expectation_alignment = Some("misaligned".to_string());
        let mut d = perception(4);
        d.placebo_expectation_alignment = Some("collapsed".to_string());
        let mut e = perception(5);
        e.expectation_alignment = Some("failed".to_string());

        let snap = snapshot(
            (1..=5).map(|i| mention(i, None, None)).collect(),
            vec![a, b, c, d, e],
        );
        let graph = build_interaction_graph(&snap, NodeMode::Mention);
        let flags: Vec<bool> = graph.nodes.iter().map(|n| n.placebo_failure).collect();
        assert_eq!(flags, vec![true, true, true, true, false]);
    }

    #[test]
    fn emotion_falls_back_to_legacy_field() {
        let mut a = perception(1);
        a.emotion_primary = Some(String::new());
        a.emotion = Some("Fear".to_string());
        a.emotion_intensity = Some(0.8);

        let snap = snapshot(vec![mention(1, None, None)], vec![a]);
        let node = &build_interaction_graph(&snap, NodeMode::Mention).nodes[0];
        assert_eq!(node.emotion.as_deref(), Some("Fear"));
        assert_eq!(node.emotion_intensity, Some(0.8));
        assert_eq!(node.sentiment_score, -0.7);
    }

    // --- sentiment ---

    #[test]
    fn sentiment_lookup_is_case_insensitive() {
        assert_eq!(sentiment_from_emotion(Some("RELIEF")), 0.7);
        assert_eq!(sentiment_from_emotion(Some("Satisfied")), 0.7);
        assert_eq!(sentiment_from_emotion(Some("anger")), -0.7);
        assert_eq!(sentiment_from_emotion(Some("Doubt")), -0.7);
        assert_eq!(sentiment_from_emotion(Some("neutral")), 0.0);
        assert_eq!(sentiment_from_emotion(None), 0.0);
    }
}
