use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::problem::{DirProblemLoader, LoadError, ProblemDir};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProblemSummary {
    pub id: String,
    pub title: String,
    pub tags: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct SummaryFields {
    title: String,
    #[serde(default)]
    tags: Vec<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Problem '{0}' not found")]
    NotFound(String),

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Fs(#[from] fsutil::Error),
}

/// Lists problems that have an `info.json` with a title, sorted by id.
/// A missing `problems_dir` has no problems.
pub fn list_problems(problems_dir: impl AsRef<Path>) -> fsutil::Result<Vec<ProblemSummary>> {
    let dirs = match fsutil::sorted_entries(&problems_dir, fsutil::is_dir_entry) {
        Ok(dirs) => dirs,
        Err(e) if e.is_not_found() => {
            log::info!("Problems dir not found: {}", e.path().to_string_lossy());
            return Ok(Vec::new());
        }
        Err(e) => return Err(e),
    };
    let mut res = Vec::with_capacity(dirs.len());
    for dir in dirs {
        let problem = ProblemDir::new(dir);
        let meta = match problem.load_metadata() {
            Ok(Some(meta)) => meta,
            Ok(None) => continue,
            Err(e) => {
                log::warn!("Skipping problem '{}': {}", problem.id(), e);
                continue;
            }
        };
        match serde_json::from_value::<SummaryFields>(Value::Object(meta)) {
            Ok(SummaryFields { title, tags }) => res.push(ProblemSummary {
                id: problem.id(),
                title,
                tags,
            }),
            Err(e) => log::warn!("Skipping problem '{}': invalid info.json: {}", problem.id(), e),
        }
    }
    Ok(res)
}

/// Returns the whole `info.json` of a problem.
pub fn load_problem_info(
    loader: &DirProblemLoader,
    problem_id: &str,
) -> Result<Map<String, Value>, CatalogError> {
    let problem = loader.resolve(problem_id)?;
    problem
        .load_metadata()?
        .ok_or_else(|| CatalogError::NotFound(problem_id.to_owned()))
}
