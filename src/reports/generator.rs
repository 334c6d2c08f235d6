use crate::dataset::RecordStore;
use crate::lineage::RelationshipGraph;
use crate::types::{
    AreaEvolutionReport, AreaSeries, DistrictRef, FormationYear, LineageReport, SplitCount,
    SplitEvent, StatisticsReport,
};
use anyhow::{bail, Result};
use chrono::Utc;
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;
use uuid::Uuid;

/// Builds the reports consumed by the CLI and the output formatters.
/// Everything here is a read-only walk over the validated store and the
/// relationship graph.
pub struct ReportGenerator<'a> {
    store: &'a RecordStore,
    graph: &'a RelationshipGraph,
}

impl<'a> ReportGenerator<'a> {
    pub fn new(store: &'a RecordStore, graph: &'a RelationshipGraph) -> Self {
        Self { store, graph }
    }

    /// Full lineage of one district: direct relatives plus transitive
    /// ancestors and descendants, each sorted by formation year then code.
    pub fn lineage(&self, code: u32) -> Result<LineageReport> {
        let district = self.district_ref(code)?;

        let direct_parents = self.refs_for(self.graph.direct_parents_of(code)?)?;
        let direct_children = self.refs_for(self.graph.direct_children_of(code)?)?;
        let ancestors = self.refs_for(self.graph.ancestors_of(code)?)?;
        let descendants = self.refs_for(self.graph.descendants_of(code)?)?;

        debug!(
            "Lineage for {}: {} ancestors, {} descendants",
            code,
            ancestors.len(),
            descendants.len()
        );

        Ok(LineageReport {
            id: Uuid::new_v4(),
            generated_at: Utc::now(),
            district,
            direct_parents,
            direct_children,
            ancestors,
            descendants,
        })
    }

    /// Dataset-wide statistics: counts, area aggregates, formations per
    /// year, the most-split ranking, and the parent-by-year split matrix.
    pub fn statistics(&self) -> Result<StatisticsReport> {
        if self.store.is_empty() {
            bail!("Cannot compute statistics over an empty record store");
        }

        let total_districts = self.store.len();
        let original_districts = self.store.iter().filter(|r| r.is_original()).count();
        let total_area: f64 = self.store.iter().map(|r| r.area).sum();

        let largest = self.extreme_by_area(Ordering::Greater)?;
        let smallest = self.extreme_by_area(Ordering::Less)?;

        let current_districts_area = self
            .graph
            .leaves()
            .into_iter()
            .filter_map(|code| self.store.get(code))
            .map(|record| record.area)
            .sum();

        let mut by_year: BTreeMap<u16, Vec<(u32, String)>> = BTreeMap::new();
        for record in self.store.iter() {
            by_year
                .entry(record.year)
                .or_default()
                .push((record.code, record.name.clone()));
        }
        let formations_by_year = by_year
            .into_iter()
            .map(|(year, mut districts)| {
                districts.sort_by_key(|(code, _)| *code);
                FormationYear {
                    year,
                    count: districts.len(),
                    districts: districts.into_iter().map(|(_, name)| name).collect(),
                }
            })
            .collect();

        let most_split = self
            .graph
            .most_split(5)
            .into_iter()
            .map(|(code, children)| {
                let name = self
                    .store
                    .get(code)
                    .map(|record| record.name.clone())
                    .unwrap_or_default();
                SplitCount { code, name, children }
            })
            .collect();

        let mut matrix: BTreeMap<(u32, u16), usize> = BTreeMap::new();
        for record in self.store.iter() {
            for &parent in &record.parents {
                *matrix.entry((parent, record.year)).or_insert(0) += 1;
            }
        }
        let split_matrix = matrix
            .into_iter()
            .map(|((parent_code, year), count)| SplitEvent {
                parent_code,
                parent_name: self
                    .store
                    .get(parent_code)
                    .map(|record| record.name.clone())
                    .unwrap_or_default(),
                year,
                count,
            })
            .collect();

        Ok(StatisticsReport {
            id: Uuid::new_v4(),
            generated_at: Utc::now(),
            total_districts,
            original_districts,
            derived_districts: total_districts - original_districts,
            total_area,
            average_area: total_area / total_districts as f64,
            largest,
            smallest,
            current_districts_area,
            formations_by_year,
            most_split,
            split_matrix,
        })
    }

    /// Remaining area of a district's family across the dataset years:
    /// each member keeps its formation area minus the area of its direct
    /// children formed by the given year.
    pub fn area_evolution(&self, code: u32) -> Result<AreaEvolutionReport> {
        let progenitor = self.district_ref(code)?;

        let mut family: BTreeSet<u32> = self.graph.descendants_of(code)?;
        family.insert(code);

        let years: Vec<u16> = self
            .store
            .iter()
            .map(|record| record.year)
            .collect::<BTreeSet<u16>>()
            .into_iter()
            .collect();

        let mut members: Vec<DistrictRef> = family
            .iter()
            .map(|&member| self.district_ref(member))
            .collect::<Result<_>>()?;
        members.sort_by_key(|member| (member.year, member.code));

        let mut series = Vec::with_capacity(members.len());
        for member in members {
            let children = self.refs_for(self.graph.direct_children_of(member.code)?)?;
            let remaining_area = years
                .iter()
                .map(|&year| {
                    if year < member.year {
                        return None;
                    }
                    let carved: f64 = children
                        .iter()
                        .filter(|child| child.year <= year)
                        .map(|child| child.area)
                        .sum();
                    Some(member.area - carved)
                })
                .collect();
            series.push(AreaSeries {
                district: member,
                remaining_area,
            });
        }

        Ok(AreaEvolutionReport {
            id: Uuid::new_v4(),
            generated_at: Utc::now(),
            progenitor,
            years,
            series,
        })
    }

    fn district_ref(&self, code: u32) -> Result<DistrictRef> {
        let node = self.graph.node(code)?;
        Ok(DistrictRef {
            code: node.code,
            name: node.name.clone(),
            year: node.year,
            area: node.area,
        })
    }

    fn refs_for(&self, codes: impl IntoIterator<Item = u32>) -> Result<Vec<DistrictRef>> {
        let mut refs: Vec<DistrictRef> = codes
            .into_iter()
            .map(|code| self.district_ref(code))
            .collect::<Result<_>>()?;
        refs.sort_by_key(|district| (district.year, district.code));
        Ok(refs)
    }

    fn extreme_by_area(&self, wanted: Ordering) -> Result<DistrictRef> {
        let record = self
            .store
            .iter()
            .reduce(|best, candidate| {
                let ordering = candidate
                    .area
                    .partial_cmp(&best.area)
                    .unwrap_or(Ordering::Equal);
                if ordering == wanted {
                    candidate
                } else {
                    best
                }
            })
            .map(|record| record.code);
        match record {
            Some(code) => self.district_ref(code),
            None => bail!("Cannot compute statistics over an empty record store"),
        }
    }
}
