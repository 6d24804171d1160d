pub mod aggregation;
pub mod diagnostics;
pub mod features;
pub mod interaction;
pub mod propagation;
pub mod trajectory;
pub mod union_find;

pub use aggregation::{emotion_timeline, perception_counts, EmotionTimeline, PerceptionCounts};
pub use features::ClusterFeatures;
pub use interaction::{build_interaction_graph, InteractionGraph, SocialEdge, SocialNode};
pub use propagation::{summarize, summarize_drug};
pub use trajectory::{analyze_belief_trajectory, TrajectoryReport};
pub use union_find::DisjointSet;
