use crate::error::LookupError;
use crate::lineage::traversal::{self, TraversalDirection};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use std::collections::{BTreeSet, HashMap};
use std::fmt::Write as _;

/// Node payload for a real district in either graph.
#[derive(Debug, Clone, PartialEq)]
pub struct DistrictNode {
    pub code: u32,
    pub name: String,
    pub year: u16,
    pub area: f64,
}

/// Directed graph of parent-to-child district formation. Nodes are real
/// districts only; a multi-parent child keeps its multi-edge fan-in, so
/// callers can inspect in-degree to distinguish merges from splits.
pub struct RelationshipGraph {
    graph: DiGraph<DistrictNode, ()>,
    node_map: HashMap<u32, NodeIndex>,
}

impl RelationshipGraph {
    pub(crate) fn new(graph: DiGraph<DistrictNode, ()>, node_map: HashMap<u32, NodeIndex>) -> Self {
        Self { graph, node_map }
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn contains(&self, code: u32) -> bool {
        self.node_map.contains_key(&code)
    }

    /// All district codes, ascending.
    pub fn codes(&self) -> Vec<u32> {
        let mut codes: Vec<u32> = self.node_map.keys().copied().collect();
        codes.sort_unstable();
        codes
    }

    pub fn node(&self, code: u32) -> Result<&DistrictNode, LookupError> {
        let index = self.index_of(code)?;
        Ok(&self.graph[index])
    }

    /// Every district this one transitively descends from.
    pub fn ancestors_of(&self, code: u32) -> Result<BTreeSet<u32>, LookupError> {
        let index = self.index_of(code)?;
        Ok(self.collect_codes(traversal::reachable_from(
            &self.graph,
            index,
            TraversalDirection::Ancestors,
        )))
    }

    /// Every district transitively carved out of this one.
    pub fn descendants_of(&self, code: u32) -> Result<BTreeSet<u32>, LookupError> {
        let index = self.index_of(code)?;
        Ok(self.collect_codes(traversal::reachable_from(
            &self.graph,
            index,
            TraversalDirection::Descendants,
        )))
    }

    /// Immediate predecessors, ascending by code.
    pub fn direct_parents_of(&self, code: u32) -> Result<Vec<u32>, LookupError> {
        self.direct_neighbors(code, Direction::Incoming)
    }

    /// Immediate successors, ascending by code.
    pub fn direct_children_of(&self, code: u32) -> Result<Vec<u32>, LookupError> {
        self.direct_neighbors(code, Direction::Outgoing)
    }

    pub fn in_degree(&self, code: u32) -> Result<usize, LookupError> {
        let index = self.index_of(code)?;
        Ok(self.graph.neighbors_directed(index, Direction::Incoming).count())
    }

    /// Number of direct children; ranks how often a district was split.
    pub fn out_degree(&self, code: u32) -> Result<usize, LookupError> {
        let index = self.index_of(code)?;
        Ok(self.graph.neighbors_directed(index, Direction::Outgoing).count())
    }

    /// Districts with no parents, ascending by code.
    pub fn roots(&self) -> Vec<u32> {
        self.codes_with_degree(Direction::Incoming, 0)
    }

    /// Districts never split further, ascending by code.
    pub fn leaves(&self) -> Vec<u32> {
        self.codes_with_degree(Direction::Outgoing, 0)
    }

    /// Parents ranked by direct-child count, descending; ties broken by
    /// ascending code. Districts with no children are omitted.
    pub fn most_split(&self, limit: usize) -> Vec<(u32, usize)> {
        let mut ranked: Vec<(u32, usize)> = self
            .codes()
            .into_iter()
            .filter_map(|code| {
                let index = self.node_map[&code];
                let children = self
                    .graph
                    .neighbors_directed(index, Direction::Outgoing)
                    .count();
                (children > 0).then_some((code, children))
            })
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        ranked.truncate(limit);
        ranked
    }

    fn index_of(&self, code: u32) -> Result<NodeIndex, LookupError> {
        self.node_map
            .get(&code)
            .copied()
            .ok_or(LookupError::UnknownCode(code))
    }

    fn collect_codes(
        &self,
        indices: std::collections::HashSet<NodeIndex>,
    ) -> BTreeSet<u32> {
        indices.into_iter().map(|index| self.graph[index].code).collect()
    }

    fn direct_neighbors(&self, code: u32, direction: Direction) -> Result<Vec<u32>, LookupError> {
        let index = self.index_of(code)?;
        let mut codes: Vec<u32> = self
            .graph
            .neighbors_directed(index, direction)
            .map(|neighbor| self.graph[neighbor].code)
            .collect();
        codes.sort_unstable();
        Ok(codes)
    }

    fn codes_with_degree(&self, direction: Direction, degree: usize) -> Vec<u32> {
        let mut codes: Vec<u32> = self
            .node_map
            .iter()
            .filter(|(_, &index)| {
                self.graph.neighbors_directed(index, direction).count() == degree
            })
            .map(|(&code, _)| code)
            .collect();
        codes.sort_unstable();
        codes
    }
}

/// Identifier of a presentation node. Synthetic ids live in a namespace
/// disjoint from real codes by construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NodeId {
    District(u32),
    /// Keyed by the merged child's code.
    Junction(u32),
    Remnant {
        parent: u32,
        year: u16,
    },
}

/// Node payload in the presentation graph.
#[derive(Debug, Clone, PartialEq)]
pub enum PresentationNode {
    District(DistrictNode),
    /// Merge point collapsing a multi-parent fan-in into one incoming
    /// edge on the child. Rendered at zero size, unlabeled.
    Junction { child: u32, year: u16 },
    /// The continuing identity of a parent after losing territory in
    /// `year`. Carries no area.
    Remnant { parent: u32, name: String, year: u16 },
}

impl PresentationNode {
    pub fn is_junction(&self) -> bool {
        matches!(self, Self::Junction { .. })
    }

    pub fn is_remnant(&self) -> bool {
        matches!(self, Self::Remnant { .. })
    }

    pub fn year(&self) -> u16 {
        match self {
            Self::District(district) => district.year,
            Self::Junction { year, .. } | Self::Remnant { year, .. } => *year,
        }
    }

    /// Display name; junctions have none.
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::District(district) => Some(&district.name),
            Self::Remnant { name, .. } => Some(name),
            Self::Junction { .. } => None,
        }
    }

    /// Area at formation; only real districts carry one.
    pub fn area(&self) -> Option<f64> {
        match self {
            Self::District(district) => Some(district.area),
            _ => None,
        }
    }
}

/// Render-facing variant of the lineage graph: real districts plus the
/// synthetic junction and remnant nodes, consumed only by layout and
/// rendering collaborators. Built once, read-only.
pub struct PresentationGraph {
    graph: DiGraph<PresentationNode, ()>,
    node_map: HashMap<NodeId, NodeIndex>,
}

impl PresentationGraph {
    pub(crate) fn new(
        graph: DiGraph<PresentationNode, ()>,
        node_map: HashMap<NodeId, NodeIndex>,
    ) -> Self {
        Self { graph, node_map }
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.node_map.contains_key(&id)
    }

    pub fn node(&self, id: NodeId) -> Option<&PresentationNode> {
        self.node_map.get(&id).map(|&index| &self.graph[index])
    }

    /// All node ids, districts first, ascending within each kind.
    pub fn node_ids(&self) -> Vec<NodeId> {
        let mut ids: Vec<NodeId> = self.node_map.keys().copied().collect();
        ids.sort();
        ids
    }

    pub fn junction_count(&self) -> usize {
        self.graph
            .node_weights()
            .filter(|node| node.is_junction())
            .count()
    }

    pub fn remnant_count(&self) -> usize {
        self.graph
            .node_weights()
            .filter(|node| node.is_remnant())
            .count()
    }

    pub fn in_degree(&self, id: NodeId) -> Option<usize> {
        self.node_map.get(&id).map(|&index| {
            self.graph
                .neighbors_directed(index, Direction::Incoming)
                .count()
        })
    }

    pub fn out_degree(&self, id: NodeId) -> Option<usize> {
        self.node_map.get(&id).map(|&index| {
            self.graph
                .neighbors_directed(index, Direction::Outgoing)
                .count()
        })
    }

    pub fn has_edge(&self, from: NodeId, to: NodeId) -> bool {
        match (self.node_map.get(&from), self.node_map.get(&to)) {
            (Some(&a), Some(&b)) => self.graph.find_edge(a, b).is_some(),
            _ => false,
        }
    }

    /// Whether a path (possibly through synthetic nodes) connects two
    /// real districts.
    pub fn connects(&self, from: u32, to: u32) -> bool {
        match (
            self.node_map.get(&NodeId::District(from)),
            self.node_map.get(&NodeId::District(to)),
        ) {
            (Some(&a), Some(&b)) => traversal::path_exists(&self.graph, a, b),
            _ => false,
        }
    }

    /// Edges as id pairs, sorted; used for deterministic comparison.
    pub fn edge_ids(&self) -> Vec<(NodeId, NodeId)> {
        let mut edges: Vec<(NodeId, NodeId)> = self
            .graph
            .edge_indices()
            .filter_map(|edge| self.graph.edge_endpoints(edge))
            .map(|(a, b)| (self.id_of(a), self.id_of(b)))
            .collect();
        edges.sort();
        edges
    }

    /// Emit Graphviz DOT for the rendering collaborator. Junctions are
    /// zero-size points, remnants dashed boxes, matching the marker
    /// scheme of the interactive view.
    pub fn to_dot(&self) -> String {
        let mut out = String::from("digraph lineage {\n    rankdir=LR;\n    splines=true;\n");

        for id in self.node_ids() {
            let index = self.node_map[&id];
            let attrs = match &self.graph[index] {
                PresentationNode::District(district) => format!(
                    "label=\"{} ({})\" shape=ellipse",
                    escape(&district.name),
                    district.year
                ),
                PresentationNode::Junction { .. } => {
                    "label=\"\" shape=point width=0.05".to_string()
                }
                PresentationNode::Remnant { name, year, .. } => format!(
                    "label=\"{} (post-{})\" shape=box style=dashed",
                    escape(name),
                    year
                ),
            };
            let _ = writeln!(out, "    {} [{}];", dot_id(id), attrs);
        }

        for (from, to) in self.edge_ids() {
            let _ = writeln!(out, "    {} -> {};", dot_id(from), dot_id(to));
        }

        out.push_str("}\n");
        out
    }

    fn id_of(&self, index: NodeIndex) -> NodeId {
        match &self.graph[index] {
            PresentationNode::District(district) => NodeId::District(district.code),
            PresentationNode::Junction { child, .. } => NodeId::Junction(*child),
            PresentationNode::Remnant { parent, year, .. } => NodeId::Remnant {
                parent: *parent,
                year: *year,
            },
        }
    }
}

fn dot_id(id: NodeId) -> String {
    match id {
        NodeId::District(code) => format!("d{}", code),
        NodeId::Junction(child) => format!("junction_{}", child),
        NodeId::Remnant { parent, year } => format!("remnant_{}_{}", parent, year),
    }
}

fn escape(name: &str) -> String {
    name.replace('"', "\\\"")
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 1 -> 2 -> 4, 1 -> 3 -> 4
    fn diamond() -> RelationshipGraph {
        let mut graph = DiGraph::new();
        let mut node_map = HashMap::new();
        for code in [1u32, 2, 3, 4] {
            let index = graph.add_node(DistrictNode {
                code,
                name: format!("D{}", code),
                year: 1998,
                area: 100.0,
            });
            node_map.insert(code, index);
        }
        graph.add_edge(node_map[&1], node_map[&2], ());
        graph.add_edge(node_map[&1], node_map[&3], ());
        graph.add_edge(node_map[&2], node_map[&4], ());
        graph.add_edge(node_map[&3], node_map[&4], ());
        RelationshipGraph::new(graph, node_map)
    }

    #[test]
    fn ancestors_and_descendants_cover_the_diamond() {
        let graph = diamond();
        assert_eq!(
            graph.descendants_of(1).unwrap(),
            BTreeSet::from([2, 3, 4])
        );
        assert_eq!(graph.ancestors_of(4).unwrap(), BTreeSet::from([1, 2, 3]));
        assert!(graph.ancestors_of(1).unwrap().is_empty());
        assert!(graph.descendants_of(4).unwrap().is_empty());
    }

    #[test]
    fn direct_neighbors_are_sorted() {
        let graph = diamond();
        assert_eq!(graph.direct_children_of(1).unwrap(), vec![2, 3]);
        assert_eq!(graph.direct_parents_of(4).unwrap(), vec![2, 3]);
        assert_eq!(graph.in_degree(4).unwrap(), 2);
        assert_eq!(graph.out_degree(4).unwrap(), 0);
    }

    #[test]
    fn roots_and_leaves() {
        let graph = diamond();
        assert_eq!(graph.roots(), vec![1]);
        assert_eq!(graph.leaves(), vec![4]);
    }

    #[test]
    fn unknown_code_is_a_lookup_error() {
        let graph = diamond();
        assert!(graph.contains(1));
        assert!(!graph.contains(99));
        assert_eq!(
            graph.ancestors_of(99).unwrap_err(),
            LookupError::UnknownCode(99)
        );
        assert_eq!(
            graph.direct_children_of(99).unwrap_err(),
            LookupError::UnknownCode(99)
        );
    }

    #[test]
    fn most_split_ranks_by_out_degree_then_code() {
        let graph = diamond();
        assert_eq!(graph.most_split(10), vec![(1, 2), (2, 1), (3, 1)]);
        assert_eq!(graph.most_split(1), vec![(1, 2)]);
    }

    #[test]
    fn presentation_accessors_distinguish_node_kinds() {
        let district = PresentationNode::District(DistrictNode {
            code: 7,
            name: "Durg".to_string(),
            year: 1998,
            area: 8537.0,
        });
        let junction = PresentationNode::Junction { child: 733, year: 2022 };
        let remnant = PresentationNode::Remnant {
            parent: 480,
            name: "Raipur".to_string(),
            year: 2012,
        };

        assert!(!district.is_junction() && !district.is_remnant());
        assert!(junction.is_junction());
        assert!(remnant.is_remnant());
        assert_eq!(junction.name(), None);
        assert_eq!(remnant.name(), Some("Raipur"));
        assert_eq!(district.area(), Some(8537.0));
        assert_eq!(remnant.area(), None);
        assert_eq!(junction.year(), 2022);
    }
}
