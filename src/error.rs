use thiserror::Error;

/// Fatal dataset validation failures. Construction never returns a
/// partial store or graph once one of these is raised.
#[derive(Debug, Error, PartialEq)]
pub enum DataIntegrityError {
    #[error("duplicate district code {0}")]
    DuplicateCode(u32),

    #[error("district {child} references unknown parent code {parent}")]
    UnknownParent { child: u32, parent: u32 },

    #[error("district {child} ({child_year}) predates its parent {parent} ({parent_year})")]
    ChildPredatesParent {
        child: u32,
        child_year: u16,
        parent: u32,
        parent_year: u16,
    },

    #[error("district {0} lists itself as a parent")]
    SelfParent(u32),

    #[error("cycle in the parent relation involving district {0}")]
    CycleDetected(u32),

    #[error("district {code} has non-positive area {area}")]
    NonPositiveArea { code: u32, area: f64 },
}

/// A query referenced a district the validated store does not contain.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LookupError {
    #[error("unknown district code {0}")]
    UnknownCode(u32),

    #[error("no district named '{0}'")]
    UnknownName(String),
}
