//! Belief propagation diagnostics for one drug.
//!
//! Pipeline:
//! 1. Build the interaction graph from the snapshot
//! 2. Partition nodes into connected clusters (union-find)
//! 3. Extract features and classify each cluster
//! 4. Check the drug-wide communication gap

use tracing::{debug, info};

use pharmasignal_common::{
    ClusterDiagnostic, DiagnosticResult, DrugSnapshot, MentionStore, NodeMode, PharmaSignalError,
};

use crate::diagnostics::{belief_stability, communication_gap, interpretation, propagation_risk};
use crate::features::{extract_features, ClusterFeatures};
use crate::interaction::{build_interaction_graph, InteractionGraph, SocialNode};
use crate::union_find::connected_components;

pub const NO_MENTIONS_NOTE: &str = "No mentions available for this drug.";

pub const GUARDRAIL_NOTES: [&str; 2] = [
    "Directional diagnostics only; no medical, causal, or outcome prediction.",
    "Uses anonymized interaction structure and existing perception signals.",
];

/// Resolve the drug's snapshot from the store and summarize it.
///
/// `node_mode` comes straight from the caller and is rejected if unknown.
pub fn summarize_drug(
    store: &MentionStore,
    drug_id: i64,
    node_mode: &str,
) -> Result<DiagnosticResult, PharmaSignalError> {
    let mode: NodeMode = node_mode.parse()?;
    Ok(summarize(&store.snapshot(drug_id), mode))
}

/// Run the full diagnostic pass over an immutable snapshot.
pub fn summarize(snapshot: &DrugSnapshot, mode: NodeMode) -> DiagnosticResult {
    let drug = snapshot.display_name();
    let graph = build_interaction_graph(snapshot, mode);

    if graph.is_empty() {
        info!(drug_id = snapshot.drug_id, "No mentions for drug, skipping diagnostics");
        return DiagnosticResult {
            drug,
            drug_id: snapshot.drug_id,
            node_mode: mode,
            clusters: Vec::new(),
            communication_gap: false,
            notes: vec![NO_MENTIONS_NOTE.to_string()],
        };
    }

    let components = partition(&graph);

    let mut clusters = Vec::with_capacity(components.len());
    let mut primary_beliefs = Vec::with_capacity(components.len());
    for members in &components {
        let nodes: Vec<&SocialNode> = members.iter().map(|&i| &graph.nodes[i]).collect();
        let features = extract_features(&nodes, &graph.edges);
        primary_beliefs.push(features.primary_belief());
        clusters.push(diagnose_cluster(&nodes, &features));
    }

    let gap = communication_gap(&primary_beliefs, !graph.edges.is_empty());

    info!(
        drug_id = snapshot.drug_id,
        node_mode = %mode,
        nodes = graph.nodes.len(),
        edges = graph.edges.len(),
        clusters = clusters.len(),
        communication_gap = gap,
        "Propagation diagnostics complete"
    );

    DiagnosticResult {
        drug,
        drug_id: snapshot.drug_id,
        node_mode: mode,
        clusters,
        communication_gap: gap,
        notes: GUARDRAIL_NOTES.iter().map(|n| n.to_string()).collect(),
    }
}

/// Connected components as node-index lists, ordered by first member.
fn partition(graph: &InteractionGraph) -> Vec<Vec<usize>> {
    let links = graph.edges.iter().filter_map(|e| {
        let a = graph.index_of(&e.source_node)?;
        let b = graph.index_of(&e.target_node)?;
        Some((a, b))
    });
    connected_components(graph.nodes.len(), links)
}

fn diagnose_cluster(nodes: &[&SocialNode], features: &ClusterFeatures) -> ClusterDiagnostic {
    let stability = belief_stability(nodes);
    let risk = propagation_risk(
        features.internal_density,
        features.external_connectivity,
        features.emotion_pattern,
        stability,
    );
    let reading = interpretation(
        stability,
        features.external_connectivity,
        features.emotion_pattern,
    );

    // Components are never empty; the first member is the lowest-index node.
    let representative = nodes.first().map(|n| n.node_id.as_str()).unwrap_or_default();
    let cluster_id = format!("cluster:{representative}");

    debug!(
        cluster_id = cluster_id.as_str(),
        size = nodes.len(),
        stability = %stability,
        risk = %risk,
        internal_weight = features.internal_weight,
        external_weight = features.external_weight,
        "Diagnosed cluster"
    );

    ClusterDiagnostic {
        cluster_id,
        node_ids: nodes.iter().map(|n| n.node_id.clone()).collect(),
        dominant_beliefs: features.dominant_beliefs.clone(),
        belief_stability: stability,
        propagation_risk: risk,
        emotion_pattern: features.emotion_pattern,
        internal_density: features.internal_density,
        external_connectivity: features.external_connectivity,
        interpretation: reading.to_string(),
    }
}
