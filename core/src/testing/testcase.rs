use std::path::{Path, PathBuf};

/// A loaded testcase: input text and the expected output text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Testcase {
    pub name: String,
    pub input: String,
    pub expected: String,
}

impl Testcase {
    pub fn new(
        name: impl Into<String>,
        input: impl Into<String>,
        expected: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            input: input.into(),
            expected: expected.into(),
        }
    }
}

/// Location of a testcase stored as a pair of files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FsTestcase {
    pub name: String,
    pub input_path: PathBuf,
    pub expected_path: PathBuf,
}

impl FsTestcase {
    pub fn new(
        name: impl Into<String>,
        input: impl Into<PathBuf>,
        expected: impl Into<PathBuf>,
    ) -> Self {
        Self {
            name: name.into(),
            input_path: input.into(),
            expected_path: expected.into(),
        }
    }

    /// Finds every eligible testcase in `dir`, sorted by name.
    pub fn enumerate(
        dir: impl AsRef<Path>,
        finder: &impl TestcaseFinder,
    ) -> fsutil::Result<Vec<Self>> {
        let mut res: Vec<_> = fsutil::sorted_entries(&dir, fsutil::is_file_entry)?
            .into_iter()
            .filter_map(|path| finder.find_by_input_file_path(path))
            .collect();
        // File name order differs from case name order when extensions differ in length.
        res.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(res)
    }

    pub fn load(&self) -> fsutil::Result<Testcase> {
        Ok(Testcase {
            name: self.name.clone(),
            input: fsutil::read_to_string_lf(&self.input_path)?,
            expected: fsutil::read_to_string_lf(&self.expected_path)?,
        })
    }
}

pub trait TestcaseFinder {
    fn find_by_input_file_path(&self, path: impl AsRef<Path>) -> Option<FsTestcase>;
}

/// Pairs `<name>.in` with `<name>.out` in the same dir.
#[derive(Debug, Clone)]
pub struct InOutPairFinder {
    input_ext: String,
    output_ext: String,
}

impl Default for InOutPairFinder {
    fn default() -> Self {
        Self::new("in", "out")
    }
}

impl InOutPairFinder {
    pub fn new(input_ext: impl Into<String>, output_ext: impl Into<String>) -> Self {
        Self {
            input_ext: input_ext.into(),
            output_ext: output_ext.into(),
        }
    }
}

impl TestcaseFinder for InOutPairFinder {
    fn find_by_input_file_path(&self, path: impl AsRef<Path>) -> Option<FsTestcase> {
        let path = path.as_ref();
        let name = path
            .file_name()?
            .to_str()?
            .strip_suffix(&self.input_ext)?
            .strip_suffix('.')?;
        if name.is_empty() {
            return None;
        }
        let output_path = path.with_file_name(format!("{}.{}", name, self.output_ext));
        if !output_path.is_file() {
            log::debug!(
                "Ignoring {}: no matching .{} file",
                path.to_string_lossy(),
                self.output_ext
            );
            return None;
        }
        Some(FsTestcase::new(name, path, output_path))
    }
}
