use std::{
    collections::HashMap,
    path::{Component, Path, PathBuf},
    time::Duration,
};

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::testing::{FsTestcase, InOutPairFinder, Testcase};

pub const DEFAULT_TIME_LIMIT: Duration = Duration::from_secs(2);

/// A problem as seen by the engine at judging time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Problem {
    pub id: String,
    pub time_limit: Duration,
    /// Sorted by name.
    pub testcases: Vec<Testcase>,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TimeLimitError {
    #[error("not a number of seconds: {0}")]
    NotNumeric(Value),

    #[error("{0} seconds is out of range")]
    OutOfRange(f64),
}

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("Invalid problem id '{0}'")]
    InvalidProblemId(String),

    #[error("Testcases of problem '{0}' not found")]
    TestcasesMissing(String),

    #[error("Malformed time_limit in {0}: {1}")]
    MalformedTimeLimit(PathBuf, #[source] TimeLimitError),

    #[error(transparent)]
    Fs(#[from] fsutil::Error),

    #[error("Problem loading task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

pub type Result<T> = std::result::Result<T, LoadError>;

/// Resolves a problem id to its time limit and testcases.
#[async_trait]
pub trait ProblemLoader: Send + Sync {
    async fn load(&self, problem_id: &str) -> Result<Problem>;
}

/// Reads `time_limit` (seconds) from problem metadata.
///
/// A missing, null or non-positive value falls back to `default`.
/// Numbers and numeric strings are accepted.
pub fn parse_time_limit(
    value: Option<&Value>,
    default: Duration,
) -> std::result::Result<Duration, TimeLimitError> {
    let not_numeric = || TimeLimitError::NotNumeric(value.cloned().unwrap_or_default());
    let secs = match value {
        None | Some(Value::Null) => return Ok(default),
        Some(Value::Number(n)) => n.as_f64().ok_or_else(not_numeric)?,
        Some(Value::String(s)) => s.trim().parse::<f64>().map_err(|_| not_numeric())?,
        Some(_) => return Err(not_numeric()),
    };
    if !secs.is_finite() {
        return Err(not_numeric());
    }
    if secs <= 0.0 {
        return Ok(default);
    }
    Duration::try_from_secs_f64(secs).map_err(|_| TimeLimitError::OutOfRange(secs))
}

fn validate_problem_id(problem_id: &str) -> Result<()> {
    let mut components = Path::new(problem_id).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(name)), None) if name == problem_id => Ok(()),
        _ => Err(LoadError::InvalidProblemId(problem_id.to_owned())),
    }
}

/// Directory of one problem: `<id>/info.json` and `<id>/testcases/`.
#[derive(Debug, Clone)]
pub struct ProblemDir {
    dir: PathBuf,
}

impl ProblemDir {
    pub const TESTCASE_DIR_NAME: &str = "testcases";
    pub const METADATA_FILENAME: &str = "info.json";

    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn id(&self) -> String {
        self.dir
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    pub fn metadata_file(&self) -> PathBuf {
        self.dir.join(Self::METADATA_FILENAME)
    }

    pub fn testcase_dir(&self) -> PathBuf {
        self.dir.join(Self::TESTCASE_DIR_NAME)
    }

    /// Returns `None` if the problem has no metadata file.
    pub fn load_metadata(&self) -> fsutil::Result<Option<Map<String, Value>>> {
        match fsutil::read_json_with_deserialize(self.metadata_file()) {
            Ok(meta) => Ok(Some(meta)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }
}

/// Loads problems from `<problems_dir>/<problem_id>/`.
#[derive(Debug, Clone)]
pub struct DirProblemLoader {
    problems_dir: PathBuf,
    default_time_limit: Duration,
    finder: InOutPairFinder,
}

impl DirProblemLoader {
    pub fn new(problems_dir: impl Into<PathBuf>) -> Self {
        Self {
            problems_dir: problems_dir.into(),
            default_time_limit: DEFAULT_TIME_LIMIT,
            finder: InOutPairFinder::default(),
        }
    }

    pub fn default_time_limit(mut self, limit: Duration) -> Self {
        self.default_time_limit = limit;
        self
    }

    pub fn problems_dir(&self) -> &Path {
        &self.problems_dir
    }

    pub fn resolve(&self, problem_id: &str) -> Result<ProblemDir> {
        validate_problem_id(problem_id)?;
        Ok(ProblemDir::new(self.problems_dir.join(problem_id)))
    }

    fn load_time_limit(&self, problem: &ProblemDir) -> Result<Duration> {
        let Some(meta) = problem.load_metadata()? else {
            return Ok(self.default_time_limit);
        };
        parse_time_limit(meta.get("time_limit"), self.default_time_limit)
            .map_err(|e| LoadError::MalformedTimeLimit(problem.metadata_file(), e))
    }

    /// Reads the problem from disk on the calling thread.
    fn load_blocking(&self, problem_id: &str) -> Result<Problem> {
        let problem = self.resolve(problem_id)?;
        let time_limit = self.load_time_limit(&problem)?;

        let testcase_dir = problem.testcase_dir();
        if !testcase_dir.exists() {
            log::warn!(
                "Testcase dir does not exist: {}",
                testcase_dir.to_string_lossy()
            );
            return Err(LoadError::TestcasesMissing(problem_id.to_owned()));
        }

        let testcases = FsTestcase::enumerate(&testcase_dir, &self.finder)?
            .iter()
            .map(FsTestcase::load)
            .collect::<fsutil::Result<Vec<_>>>()?;

        log::debug!(
            "Loaded problem '{}': time_limit={}ms, {} testcases",
            problem_id,
            time_limit.as_millis(),
            testcases.len()
        );
        Ok(Problem {
            id: problem_id.to_owned(),
            time_limit,
            testcases,
        })
    }
}

#[async_trait]
impl ProblemLoader for DirProblemLoader {
    async fn load(&self, problem_id: &str) -> Result<Problem> {
        let loader = self.clone();
        let problem_id = problem_id.to_owned();
        tokio::task::spawn_blocking(move || loader.load_blocking(&problem_id)).await?
    }
}

/// Serves problems kept in memory. Unknown ids have no testcases.
#[derive(Debug, Clone, Default)]
pub struct OnMemoryProblemLoader {
    problems: HashMap<String, Problem>,
}

impl OnMemoryProblemLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, mut problem: Problem) {
        problem.testcases.sort_by(|a, b| a.name.cmp(&b.name));
        self.problems.insert(problem.id.clone(), problem);
    }
}

impl FromIterator<Problem> for OnMemoryProblemLoader {
    fn from_iter<I: IntoIterator<Item = Problem>>(iter: I) -> Self {
        let mut loader = Self::new();
        iter.into_iter().for_each(|p| loader.insert(p));
        loader
    }
}

#[async_trait]
impl ProblemLoader for OnMemoryProblemLoader {
    async fn load(&self, problem_id: &str) -> Result<Problem> {
        self.problems
            .get(problem_id)
            .cloned()
            .ok_or_else(|| LoadError::TestcasesMissing(problem_id.to_owned()))
    }
}
