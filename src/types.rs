use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

/// Core types for the district lineage explorer

/// One row of the district-formation dataset. Field names on the wire
/// match the LGD source rows (`lgd_code`, `district`, `parent_lgd`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistrictRecord {
    #[serde(rename = "lgd_code")]
    pub code: u32,
    pub year: u16,
    #[serde(rename = "district")]
    pub name: String,
    pub area: f64,
    /// Codes of the districts this one was carved from; empty for an
    /// original district. Input accepts `null`, a bare code, or a list.
    #[serde(
        rename = "parent_lgd",
        default,
        deserialize_with = "deserialize_parents"
    )]
    pub parents: Vec<u32>,
}

impl DistrictRecord {
    pub fn is_original(&self) -> bool {
        self.parents.is_empty()
    }

    pub fn has_multiple_parents(&self) -> bool {
        self.parents.len() > 1
    }
}

/// The three shapes `parent_lgd` takes in the source rows.
#[derive(Deserialize)]
#[serde(untagged)]
enum ParentField {
    Many(Vec<u32>),
    One(u32),
}

/// Collapse `null | int | [int]` into one ordered, duplicate-free list.
fn deserialize_parents<'de, D>(deserializer: D) -> Result<Vec<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let field: Option<ParentField> = Option::deserialize(deserializer)?;
    Ok(match field {
        None => Vec::new(),
        Some(ParentField::One(code)) => vec![code],
        Some(ParentField::Many(codes)) => {
            let mut seen = HashSet::new();
            codes.into_iter().filter(|code| seen.insert(*code)).collect()
        }
    })
}

/// Lightweight reference to a district, used throughout the reports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistrictRef {
    pub code: u32,
    pub name: String,
    pub year: u16,
    pub area: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineageReport {
    pub id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub district: DistrictRef,
    pub direct_parents: Vec<DistrictRef>,
    pub direct_children: Vec<DistrictRef>,
    pub ancestors: Vec<DistrictRef>,
    pub descendants: Vec<DistrictRef>,
}

impl LineageReport {
    pub fn is_original(&self) -> bool {
        self.direct_parents.is_empty()
    }

    pub fn has_been_split(&self) -> bool {
        !self.direct_children.is_empty()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatisticsReport {
    pub id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub total_districts: usize,
    pub original_districts: usize,
    pub derived_districts: usize,
    pub total_area: f64,
    pub average_area: f64,
    pub largest: DistrictRef,
    pub smallest: DistrictRef,
    /// Combined area of the districts that have not been split further.
    pub current_districts_area: f64,
    pub formations_by_year: Vec<FormationYear>,
    pub most_split: Vec<SplitCount>,
    pub split_matrix: Vec<SplitEvent>,
}

/// Districts recognized in one formation year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormationYear {
    pub year: u16,
    pub count: usize,
    pub districts: Vec<String>,
}

/// Ranking entry for parents by number of direct children.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SplitCount {
    pub code: u32,
    pub name: String,
    pub children: usize,
}

/// One cell of the parent-by-year formation-event matrix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SplitEvent {
    pub parent_code: u32,
    pub parent_name: String,
    pub year: u16,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AreaEvolutionReport {
    pub id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub progenitor: DistrictRef,
    /// Every formation year in the dataset, ascending.
    pub years: Vec<u16>,
    pub series: Vec<AreaSeries>,
}

/// Remaining area of one family member per dataset year; `None` before
/// the district existed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AreaSeries {
    pub district: DistrictRef,
    pub remaining_area: Vec<Option<f64>>,
}

/// A generated report, ready for formatting.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Report {
    Lineage(LineageReport),
    Statistics(StatisticsReport),
    AreaEvolution(AreaEvolutionReport),
}
