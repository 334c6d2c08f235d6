use crate::dataset::records;
use crate::error::{DataIntegrityError, LookupError};
use crate::types::DistrictRecord;
use anyhow::{Context, Result};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// Immutable, validated collection of district-formation records.
/// Records keep the order they were loaded in; every parent reference
/// is guaranteed to resolve once construction succeeds.
#[derive(Debug, Clone)]
pub struct RecordStore {
    records: Vec<DistrictRecord>,
    by_code: HashMap<u32, usize>,
}

impl RecordStore {
    /// Load the embedded dataset.
    pub fn load() -> Result<Self, DataIntegrityError> {
        let store = Self::from_records(records::embedded())?;
        debug!("Loaded embedded dataset with {} records", store.len());
        Ok(store)
    }

    /// Validate a record sequence and build the code index.
    pub fn from_records(records: Vec<DistrictRecord>) -> Result<Self, DataIntegrityError> {
        let mut by_code = HashMap::with_capacity(records.len());

        for (position, record) in records.iter().enumerate() {
            if record.area <= 0.0 {
                return Err(DataIntegrityError::NonPositiveArea {
                    code: record.code,
                    area: record.area,
                });
            }
            if by_code.insert(record.code, position).is_some() {
                return Err(DataIntegrityError::DuplicateCode(record.code));
            }
        }

        for record in &records {
            for &parent in &record.parents {
                if parent == record.code {
                    return Err(DataIntegrityError::SelfParent(record.code));
                }
                let parent_record = by_code
                    .get(&parent)
                    .map(|&position| &records[position])
                    .ok_or(DataIntegrityError::UnknownParent {
                        child: record.code,
                        parent,
                    })?;
                if parent_record.year > record.year {
                    return Err(DataIntegrityError::ChildPredatesParent {
                        child: record.code,
                        child_year: record.year,
                        parent,
                        parent_year: parent_record.year,
                    });
                }
            }
        }

        detect_cycles(&records, &by_code)?;

        Ok(Self { records, by_code })
    }

    /// Load records from a JSON file whose rows use the source field
    /// shapes (`lgd_code`, `district`, `parent_lgd`).
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read dataset from {:?}", path))?;
        let records: Vec<DistrictRecord> =
            serde_json::from_str(&content).with_context(|| "Failed to parse dataset JSON")?;

        let store = Self::from_records(records)
            .with_context(|| format!("Dataset {:?} failed integrity validation", path))?;

        info!("Loaded {} records from {:?}", store.len(), path);
        Ok(store)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records in load order.
    pub fn iter(&self) -> impl Iterator<Item = &DistrictRecord> {
        self.records.iter()
    }

    pub fn get(&self, code: u32) -> Option<&DistrictRecord> {
        self.by_code.get(&code).map(|&position| &self.records[position])
    }

    /// Case-insensitive lookup by display name.
    pub fn find_by_name(&self, name: &str) -> Option<&DistrictRecord> {
        self.records
            .iter()
            .find(|record| record.name.eq_ignore_ascii_case(name))
    }

    /// Resolve a user-supplied query as either an LGD code or a name.
    pub fn resolve(&self, query: &str) -> Result<&DistrictRecord, LookupError> {
        if let Ok(code) = query.trim().parse::<u32>() {
            return self.get(code).ok_or(LookupError::UnknownCode(code));
        }
        self.find_by_name(query.trim())
            .ok_or_else(|| LookupError::UnknownName(query.trim().to_string()))
    }
}

/// Parent years never exceed child years, so a cycle can only form among
/// records sharing a year; walk the parent relation explicitly.
fn detect_cycles(
    records: &[DistrictRecord],
    by_code: &HashMap<u32, usize>,
) -> Result<(), DataIntegrityError> {
    #[derive(Clone, Copy, PartialEq)]
    enum Mark {
        Unvisited,
        InProgress,
        Done,
    }

    fn visit(
        code: u32,
        records: &[DistrictRecord],
        by_code: &HashMap<u32, usize>,
        marks: &mut HashMap<u32, Mark>,
    ) -> Result<(), DataIntegrityError> {
        match marks.get(&code).copied().unwrap_or(Mark::Unvisited) {
            Mark::Done => return Ok(()),
            Mark::InProgress => return Err(DataIntegrityError::CycleDetected(code)),
            Mark::Unvisited => {}
        }
        marks.insert(code, Mark::InProgress);
        let record = &records[by_code[&code]];
        for &parent in &record.parents {
            visit(parent, records, by_code, marks)?;
        }
        marks.insert(code, Mark::Done);
        Ok(())
    }

    let mut marks = HashMap::with_capacity(records.len());
    for record in records {
        visit(record.code, records, by_code, &mut marks)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DistrictRecord;
    use std::fs;
    use tempfile::TempDir;

    fn record(code: u32, year: u16, name: &str, area: f64, parents: &[u32]) -> DistrictRecord {
        DistrictRecord {
            code,
            year,
            name: name.to_string(),
            area,
            parents: parents.to_vec(),
        }
    }

    #[test]
    fn embedded_dataset_loads_and_indexes() {
        let store = RecordStore::load().unwrap();
        assert_eq!(store.len(), 33);
        assert_eq!(store.get(472).unwrap().name, "Bilaspur");
        assert_eq!(store.iter().next().unwrap().code, 470);
    }

    #[test]
    fn name_lookup_is_case_insensitive() {
        let store = RecordStore::load().unwrap();
        assert_eq!(store.find_by_name("bilaspur").unwrap().code, 472);
        assert_eq!(store.find_by_name("SAKTI").unwrap().code, 734);
        assert!(store.find_by_name("Atlantis").is_none());
    }

    #[test]
    fn resolve_accepts_code_or_name() {
        let store = RecordStore::load().unwrap();
        assert_eq!(store.resolve("733").unwrap().name, "Sarangarh-Bilaigarh");
        assert_eq!(store.resolve("Raipur").unwrap().code, 480);
        assert_eq!(store.resolve("999"), Err(LookupError::UnknownCode(999)));
        assert_eq!(
            store.resolve("Nowhere"),
            Err(LookupError::UnknownName("Nowhere".to_string()))
        );
    }

    #[test]
    fn duplicate_codes_are_rejected() {
        let result = RecordStore::from_records(vec![
            record(1, 1998, "A", 10.0, &[]),
            record(1, 1998, "B", 10.0, &[]),
        ]);
        assert_eq!(result.unwrap_err(), DataIntegrityError::DuplicateCode(1));
    }

    #[test]
    fn dangling_parent_reference_is_rejected() {
        let result = RecordStore::from_records(vec![
            record(1, 1998, "A", 10.0, &[]),
            record(2, 2012, "B", 5.0, &[99]),
        ]);
        assert_eq!(
            result.unwrap_err(),
            DataIntegrityError::UnknownParent { child: 2, parent: 99 }
        );
    }

    #[test]
    fn child_predating_parent_is_rejected() {
        let result = RecordStore::from_records(vec![
            record(1, 2012, "A", 10.0, &[]),
            record(2, 1998, "B", 5.0, &[1]),
        ]);
        assert_eq!(
            result.unwrap_err(),
            DataIntegrityError::ChildPredatesParent {
                child: 2,
                child_year: 1998,
                parent: 1,
                parent_year: 2012,
            }
        );
    }

    #[test]
    fn self_parent_is_rejected() {
        let result = RecordStore::from_records(vec![record(1, 1998, "A", 10.0, &[1])]);
        assert_eq!(result.unwrap_err(), DataIntegrityError::SelfParent(1));
    }

    #[test]
    fn same_year_cycle_is_rejected() {
        let result = RecordStore::from_records(vec![
            record(1, 1998, "A", 10.0, &[2]),
            record(2, 1998, "B", 10.0, &[1]),
        ]);
        assert!(matches!(
            result.unwrap_err(),
            DataIntegrityError::CycleDetected(_)
        ));
    }

    #[test]
    fn non_positive_area_is_rejected() {
        let result = RecordStore::from_records(vec![record(1, 1998, "A", 0.0, &[])]);
        assert_eq!(
            result.unwrap_err(),
            DataIntegrityError::NonPositiveArea { code: 1, area: 0.0 }
        );
    }

    #[test]
    fn json_file_loads_with_source_field_shapes() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("districts.json");
        fs::write(
            &path,
            r#"[
                {"lgd_code": 1, "year": 1998, "district": "A", "area": 100.0, "parent_lgd": null},
                {"lgd_code": 2, "year": 2012, "district": "B", "area": 40.0, "parent_lgd": 1},
                {"lgd_code": 3, "year": 2022, "district": "C", "area": 20.0, "parent_lgd": [1, 2]}
            ]"#,
        )
        .unwrap();

        let store = RecordStore::from_json_file(&path).unwrap();
        assert_eq!(store.len(), 3);
        assert_eq!(store.get(3).unwrap().parents, vec![1, 2]);
    }

    #[test]
    fn json_file_with_dangling_parent_fails() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(
            &path,
            r#"[{"lgd_code": 2, "year": 2012, "district": "B", "area": 40.0, "parent_lgd": 1}]"#,
        )
        .unwrap();
        assert!(RecordStore::from_json_file(&path).is_err());
    }
}
