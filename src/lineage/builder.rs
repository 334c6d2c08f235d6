use crate::dataset::RecordStore;
use crate::error::DataIntegrityError;
use crate::lineage::graph::{
    DistrictNode, NodeId, PresentationGraph, PresentationNode, RelationshipGraph,
};
use crate::types::DistrictRecord;
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::{debug, info};

/// Presentation-layer synthesis policy. Relationship semantics are
/// identical whatever is enabled here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PresentationOptions {
    /// Collapse multi-parent fan-ins into a single merge point.
    pub junctions: bool,
    /// Chain a surviving-identity node per year a parent lost territory.
    pub remnants: bool,
}

impl Default for PresentationOptions {
    fn default() -> Self {
        Self {
            junctions: true,
            remnants: true,
        }
    }
}

/// Builds the relationship and presentation graphs from a validated
/// record store. Both graphs are constructed once and never mutated.
#[derive(Debug, Default)]
pub struct LineageGraphBuilder {
    options: PresentationOptions,
}

impl LineageGraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: PresentationOptions) -> Self {
        Self { options }
    }

    pub fn build(
        &self,
        store: &RecordStore,
    ) -> Result<(RelationshipGraph, PresentationGraph), DataIntegrityError> {
        let relationship = self.build_relationship(store)?;
        let presentation = self.build_presentation(store)?;

        info!(
            "Built lineage graphs: {} districts, {} relations, {} presentation nodes",
            relationship.node_count(),
            relationship.edge_count(),
            presentation.node_count(),
        );

        Ok((relationship, presentation))
    }

    /// One node per record, one edge per (parent, child) pair. Records
    /// are walked in store order, so rebuilding is deterministic.
    fn build_relationship(
        &self,
        store: &RecordStore,
    ) -> Result<RelationshipGraph, DataIntegrityError> {
        let mut graph = DiGraph::new();
        let mut node_map = HashMap::with_capacity(store.len());

        for record in store.iter() {
            let index = graph.add_node(district_node(record));
            node_map.insert(record.code, index);
        }

        for record in store.iter() {
            let child = node_map[&record.code];
            for &parent in &record.parents {
                let parent_index = resolve(&node_map, parent, record.code)?;
                graph.add_edge(parent_index, child, ());
            }
        }

        debug!(
            "Relationship graph: {} nodes, {} edges",
            graph.node_count(),
            graph.edge_count()
        );
        Ok(RelationshipGraph::new(graph, node_map))
    }

    fn build_presentation(
        &self,
        store: &RecordStore,
    ) -> Result<PresentationGraph, DataIntegrityError> {
        let mut graph = DiGraph::new();
        let mut node_map: HashMap<NodeId, NodeIndex> = HashMap::new();

        for record in store.iter() {
            let index = graph.add_node(PresentationNode::District(district_node(record)));
            node_map.insert(NodeId::District(record.code), index);
        }

        for record in store.iter() {
            let child = node_map[&NodeId::District(record.code)];
            match record.parents.as_slice() {
                [] => {}
                [parent] => {
                    let parent_index = resolve_district(&node_map, *parent, record.code)?;
                    graph.add_edge(parent_index, child, ());
                }
                parents if self.options.junctions => {
                    let junction = graph.add_node(PresentationNode::Junction {
                        child: record.code,
                        year: record.year,
                    });
                    node_map.insert(NodeId::Junction(record.code), junction);
                    for &parent in parents {
                        let parent_index = resolve_district(&node_map, parent, record.code)?;
                        graph.add_edge(parent_index, junction, ());
                    }
                    graph.add_edge(junction, child, ());
                }
                parents => {
                    // Junctions disabled: plain multi-edge fan-in.
                    for &parent in parents {
                        let parent_index = resolve_district(&node_map, parent, record.code)?;
                        graph.add_edge(parent_index, child, ());
                    }
                }
            }
        }

        if self.options.remnants {
            self.add_remnant_chains(store, &mut graph, &mut node_map)?;
        }

        debug!(
            "Presentation graph: {} nodes, {} edges",
            graph.node_count(),
            graph.edge_count()
        );
        Ok(PresentationGraph::new(graph, node_map))
    }

    /// One remnant per (parent, year) in which the parent lost territory,
    /// chained ascending off the real parent node. A parent splitting
    /// several times in one year still yields a single remnant for it.
    fn add_remnant_chains(
        &self,
        store: &RecordStore,
        graph: &mut DiGraph<PresentationNode, ()>,
        node_map: &mut HashMap<NodeId, NodeIndex>,
    ) -> Result<(), DataIntegrityError> {
        let mut loss_years: BTreeMap<u32, BTreeSet<u16>> = BTreeMap::new();
        for record in store.iter() {
            for &parent in &record.parents {
                loss_years.entry(parent).or_default().insert(record.year);
            }
        }

        for (&parent, years) in &loss_years {
            let name = store
                .get(parent)
                .map(|record| record.name.clone())
                .ok_or(DataIntegrityError::UnknownParent {
                    child: parent,
                    parent,
                })?;

            let mut last = node_map[&NodeId::District(parent)];
            for &year in years {
                let remnant = graph.add_node(PresentationNode::Remnant {
                    parent,
                    name: name.clone(),
                    year,
                });
                node_map.insert(NodeId::Remnant { parent, year }, remnant);
                graph.add_edge(last, remnant, ());
                last = remnant;
            }
        }

        Ok(())
    }
}

fn district_node(record: &DistrictRecord) -> DistrictNode {
    DistrictNode {
        code: record.code,
        name: record.name.clone(),
        year: record.year,
        area: record.area,
    }
}

fn resolve(
    node_map: &HashMap<u32, NodeIndex>,
    parent: u32,
    child: u32,
) -> Result<NodeIndex, DataIntegrityError> {
    node_map
        .get(&parent)
        .copied()
        .ok_or(DataIntegrityError::UnknownParent { child, parent })
}

fn resolve_district(
    node_map: &HashMap<NodeId, NodeIndex>,
    parent: u32,
    child: u32,
) -> Result<NodeIndex, DataIntegrityError> {
    node_map
        .get(&NodeId::District(parent))
        .copied()
        .ok_or(DataIntegrityError::UnknownParent { child, parent })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shipped() -> (RelationshipGraph, PresentationGraph) {
        let store = RecordStore::load().unwrap();
        LineageGraphBuilder::new().build(&store).unwrap()
    }

    #[test]
    fn relationship_counts_match_the_dataset() {
        let (relationship, _) = shipped();
        assert_eq!(relationship.node_count(), 33);
        assert_eq!(relationship.edge_count(), 27);
        // The merged district keeps its multi-edge fan-in.
        assert_eq!(relationship.in_degree(733).unwrap(), 2);
    }

    #[test]
    fn originals_have_no_ancestors() {
        let store = RecordStore::load().unwrap();
        let (relationship, _) = shipped();
        for record in store.iter().filter(|record| record.is_original()) {
            assert!(relationship.ancestors_of(record.code).unwrap().is_empty());
        }
    }

    #[test]
    fn every_parent_relation_is_queryable_both_ways() {
        let store = RecordStore::load().unwrap();
        let (relationship, _) = shipped();
        for record in store.iter() {
            for &parent in &record.parents {
                assert!(relationship
                    .descendants_of(parent)
                    .unwrap()
                    .contains(&record.code));
                assert!(relationship
                    .direct_parents_of(record.code)
                    .unwrap()
                    .contains(&parent));
            }
        }
    }

    #[test]
    fn ancestors_and_descendants_are_inverse_relations() {
        let (relationship, _) = shipped();
        for a in relationship.codes() {
            for b in relationship.descendants_of(a).unwrap() {
                assert!(relationship.ancestors_of(b).unwrap().contains(&a));
            }
        }
    }

    #[test]
    fn bilaspur_ranks_first_by_out_degree() {
        let (relationship, _) = shipped();
        assert_eq!(relationship.most_split(5)[0], (472, 5));
    }

    #[test]
    fn presentation_counts_with_full_synthesis() {
        let (_, presentation) = shipped();
        // 33 districts + 1 junction + 19 remnants
        assert_eq!(presentation.node_count(), 53);
        assert_eq!(presentation.junction_count(), 1);
        assert_eq!(presentation.remnant_count(), 19);
        // 25 single-parent edges + 3 junction edges + 19 chain edges
        assert_eq!(presentation.edge_count(), 47);
    }

    #[test]
    fn multi_parent_child_gets_exactly_one_junction() {
        let (_, presentation) = shipped();
        let junction = NodeId::Junction(733);

        assert!(presentation.contains(junction));
        assert!(presentation.node(junction).unwrap().is_junction());
        assert_eq!(presentation.in_degree(junction), Some(2));
        assert_eq!(presentation.out_degree(junction), Some(1));

        assert!(presentation.has_edge(NodeId::District(478), junction));
        assert!(presentation.has_edge(NodeId::District(615), junction));
        assert!(presentation.has_edge(junction, NodeId::District(733)));
        assert!(!presentation.has_edge(NodeId::District(478), NodeId::District(733)));
        assert!(!presentation.has_edge(NodeId::District(615), NodeId::District(733)));
    }

    #[test]
    fn remnant_chains_follow_distinct_loss_years() {
        let (_, presentation) = shipped();

        // Raipur lost territory in 1998 and 2012; the chain hangs off
        // the real node in ascending year order.
        let raipur = NodeId::District(480);
        let post_1998 = NodeId::Remnant { parent: 480, year: 1998 };
        let post_2012 = NodeId::Remnant { parent: 480, year: 2012 };
        assert!(presentation.has_edge(raipur, post_1998));
        assert!(presentation.has_edge(post_1998, post_2012));
        assert!(!presentation.has_edge(raipur, post_2012));

        // Raigarh: 1998 then the 2022 merge contribution.
        assert!(presentation.contains(NodeId::Remnant { parent: 478, year: 1998 }));
        assert!(presentation.contains(NodeId::Remnant { parent: 478, year: 2022 }));
    }

    #[test]
    fn one_remnant_per_year_despite_multiple_same_year_children() {
        let (_, presentation) = shipped();

        // Rajnandgaon lost territory to two districts in 2022 but gets
        // one remnant for that year.
        assert!(presentation.contains(NodeId::Remnant { parent: 481, year: 2022 }));
        assert_eq!(
            presentation
                .node_ids()
                .into_iter()
                .filter(|id| matches!(id, NodeId::Remnant { parent: 481, .. }))
                .count(),
            1
        );
    }

    #[test]
    fn derived_district_that_later_splits_gets_a_remnant() {
        let (_, presentation) = shipped();
        // Baloda Bazar (2012, itself carved from Raipur) contributed to
        // the 2022 merge.
        assert!(presentation.contains(NodeId::Remnant { parent: 615, year: 2022 }));
    }

    #[test]
    fn every_relationship_edge_has_a_presentation_path() {
        let store = RecordStore::load().unwrap();
        let (_, presentation) = shipped();

        for record in store.iter() {
            for &parent in &record.parents {
                assert!(
                    presentation.connects(parent, record.code),
                    "no presentation path {} -> {}",
                    parent,
                    record.code
                );
            }
        }
    }

    #[test]
    fn rebuild_is_deterministic() {
        let store = RecordStore::load().unwrap();
        let builder = LineageGraphBuilder::new();
        let (first_rel, first_pres) = builder.build(&store).unwrap();
        let (second_rel, second_pres) = builder.build(&store).unwrap();

        assert_eq!(first_rel.codes(), second_rel.codes());
        assert_eq!(first_rel.edge_count(), second_rel.edge_count());
        assert_eq!(first_pres.node_ids(), second_pres.node_ids());
        assert_eq!(first_pres.edge_ids(), second_pres.edge_ids());
    }

    #[test]
    fn disabling_synthesis_degenerates_to_the_relationship_topology() {
        let store = RecordStore::load().unwrap();
        let options = PresentationOptions {
            junctions: false,
            remnants: false,
        };
        let (relationship, presentation) = LineageGraphBuilder::with_options(options)
            .build(&store)
            .unwrap();

        assert_eq!(presentation.node_count(), relationship.node_count());
        assert_eq!(presentation.edge_count(), relationship.edge_count());
        assert_eq!(presentation.junction_count(), 0);
        assert_eq!(presentation.remnant_count(), 0);
        assert!(presentation.has_edge(NodeId::District(478), NodeId::District(733)));
        assert!(presentation.has_edge(NodeId::District(615), NodeId::District(733)));
    }

    #[test]
    fn relationship_queries_ignore_the_presentation_policy() {
        let store = RecordStore::load().unwrap();
        let (with_synthesis, _) = LineageGraphBuilder::new().build(&store).unwrap();
        let (without_synthesis, _) = LineageGraphBuilder::with_options(PresentationOptions {
            junctions: false,
            remnants: false,
        })
        .build(&store)
        .unwrap();

        for code in with_synthesis.codes() {
            assert_eq!(
                with_synthesis.ancestors_of(code).unwrap(),
                without_synthesis.ancestors_of(code).unwrap()
            );
            assert_eq!(
                with_synthesis.descendants_of(code).unwrap(),
                without_synthesis.descendants_of(code).unwrap()
            );
        }
    }

    #[test]
    fn junctions_can_be_disabled_independently_of_remnants() {
        let store = RecordStore::load().unwrap();
        let (_, presentation) = LineageGraphBuilder::with_options(PresentationOptions {
            junctions: false,
            remnants: true,
        })
        .build(&store)
        .unwrap();

        assert_eq!(presentation.junction_count(), 0);
        assert_eq!(presentation.remnant_count(), 19);
        assert!(presentation.has_edge(NodeId::District(478), NodeId::District(733)));
    }

    #[test]
    fn dot_output_marks_synthetic_nodes() {
        let (_, presentation) = shipped();
        let dot = presentation.to_dot();

        assert!(dot.starts_with("digraph lineage {"));
        assert!(dot.contains("rankdir=LR"));
        assert!(dot.contains("junction_733 [label=\"\" shape=point"));
        assert!(dot.contains("remnant_480_2012 [label=\"Raipur (post-2012)\""));
        assert!(dot.contains("d478 -> junction_733;"));
        assert!(!dot.contains("d478 -> d733;"));
    }
}
