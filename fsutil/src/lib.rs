use serde::de::DeserializeOwned;
use std::{
    fs::{self, DirEntry, File, ReadDir},
    io::BufReader,
    path::{Path, PathBuf},
};

pub mod error {
    use std::{io, path::PathBuf};

    pub type Result<T> = std::result::Result<T, self::Error>;

    type Msg = &'static str;

    #[derive(Debug, thiserror::Error)]
    pub enum Error {
        #[error("{0} ({1}): {2}")]
        SingleIO(Msg, PathBuf, #[source] io::Error),

        #[error("Cannot deserialize from JSON (src='{0}'): {1}")]
        DeserializeFromJson(PathBuf, #[source] serde_json::Error),
    }

    impl Error {
        pub fn path(&self) -> &std::path::Path {
            match self {
                Error::SingleIO(_, path, _) => path,
                Error::DeserializeFromJson(path, _) => path,
            }
        }

        /// Returns true if the underlying IO error says the entry does not exist.
        pub fn is_not_found(&self) -> bool {
            match self {
                Error::SingleIO(_, _, e) => e.kind() == io::ErrorKind::NotFound,
                Error::DeserializeFromJson(..) => false,
            }
        }
    }
}
pub use error::{Error, Result};

#[must_use]
pub fn mkdir_all(path: impl AsRef<Path>) -> Result<()> {
    let dir = path.as_ref();
    fs::create_dir_all(dir).map_err(|e| Error::SingleIO("Cannot create dir", dir.to_owned(), e))
}

#[must_use]
pub fn write<P, C>(filepath: P, contents: C) -> Result<()>
where
    P: AsRef<Path>,
    C: AsRef<[u8]>,
{
    fs::write(&filepath, contents)
        .map_err(|e| Error::SingleIO("Cannot write file", filepath.as_ref().to_owned(), e))
}

#[must_use]
pub fn write_with_mkdir<P, C>(filepath: P, contents: C) -> Result<()>
where
    P: AsRef<Path>,
    C: AsRef<[u8]>,
{
    if let Some(dir) = filepath.as_ref().parent() {
        self::mkdir_all(dir)?;
    }
    self::write(filepath, contents)
}

#[must_use]
pub fn read_to_string(filepath: impl AsRef<Path>) -> Result<String> {
    fs::read_to_string(&filepath)
        .map_err(|e| Error::SingleIO("Cannot read file", filepath.as_ref().to_owned(), e))
}

/// Reads a text file and converts CRLF line endings to LF.
///
/// ```
/// # let dir = tempfile::tempdir().unwrap();
/// let path = dir.path().join("a.txt");
/// std::fs::write(&path, "1 2\r\n3\r\n").unwrap();
/// assert_eq!(fsutil::read_to_string_lf(&path).unwrap(), "1 2\n3\n");
/// ```
#[must_use]
pub fn read_to_string_lf(filepath: impl AsRef<Path>) -> Result<String> {
    let s = self::read_to_string(filepath)?;
    if s.contains('\r') {
        Ok(s.replace("\r\n", "\n"))
    } else {
        Ok(s)
    }
}

#[must_use]
pub fn read_json_with_deserialize<P, T>(filepath: P) -> Result<T>
where
    P: AsRef<Path>,
    T: DeserializeOwned,
{
    let filepath = filepath.as_ref();
    let f = File::open(filepath)
        .map_err(|e| Error::SingleIO("Cannot read file", filepath.to_owned(), e))?;
    serde_json::from_reader(BufReader::new(f))
        .map_err(|e| Error::DeserializeFromJson(filepath.to_owned(), e))
}

#[must_use]
pub fn read_dir(dir: impl AsRef<Path>) -> Result<ReadDir> {
    fs::read_dir(&dir).map_err(|e| Error::SingleIO("Cannot read dir", dir.as_ref().to_owned(), e))
}

/// Lists the entries of `dir` accepted by `filter`, sorted by file name.
/// Entries that cannot be read are skipped.
pub fn sorted_entries(
    dir: impl AsRef<Path>,
    filter: impl Fn(&DirEntry) -> bool,
) -> Result<Vec<PathBuf>> {
    let mut entries: Vec<_> = self::read_dir(&dir)?
        .filter_map(std::result::Result::ok)
        .filter(|entry| filter(entry))
        .collect();
    entries.sort_by_key(|entry| entry.file_name());
    log::trace!(
        "{} entries in {}",
        entries.len(),
        dir.as_ref().to_string_lossy()
    );
    Ok(entries.into_iter().map(|entry| entry.path()).collect())
}

/// True for regular files, following symlinks.
pub fn is_file_entry(entry: &DirEntry) -> bool {
    entry.path().is_file()
}

/// True for directories, following symlinks.
pub fn is_dir_entry(entry: &DirEntry) -> bool {
    entry.path().is_dir()
}
