pub mod builder;
pub mod graph;
pub mod traversal;

pub use builder::{LineageGraphBuilder, PresentationOptions};
pub use graph::{DistrictNode, NodeId, PresentationGraph, PresentationNode, RelationshipGraph};
pub use traversal::TraversalDirection;
