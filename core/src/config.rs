use std::path::{Path, PathBuf};
use std::result::Result as StdResult;
use std::time::Duration;

use anyhow::{bail, ensure, Context as _};
use rust_embed::RustEmbed;
use serde::Deserialize;

use crate::problem::{DirProblemLoader, DEFAULT_TIME_LIMIT};
use crate::testing::ProcessSupervisor;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    #[serde(skip)]
    pub source_config_file: Option<PathBuf>,
    pub problems_dir: PathBuf,
    pub runner: RunnerConfig,
    pub judge: JudgeConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    pub command: Vec<String>,
    pub source_suffix: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct JudgeConfig {
    /// Seconds.
    pub default_time_limit: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source_config_file: None,
            problems_dir: PathBuf::from("./problems"),
            runner: RunnerConfig::default(),
            judge: JudgeConfig::default(),
        }
    }
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            command: ProcessSupervisor::DEFAULT_COMMAND
                .iter()
                .map(|&arg| arg.to_owned())
                .collect(),
            source_suffix: ProcessSupervisor::DEFAULT_SOURCE_SUFFIX.to_owned(),
        }
    }
}

impl Default for JudgeConfig {
    fn default() -> Self {
        Self {
            default_time_limit: DEFAULT_TIME_LIMIT.as_secs_f64(),
        }
    }
}

#[derive(RustEmbed)]
#[folder = "assets/"]
struct Asset;

impl Config {
    pub const FILENAME: &str = "ojudge.toml";

    pub fn example_toml() -> anyhow::Result<String> {
        let file = Asset::get(Self::FILENAME).context("Example config is not embedded")?;
        let toml = std::str::from_utf8(file.data.as_ref()).context("Example config is not UTF-8")?;
        Ok(toml.to_owned())
    }

    pub fn from_toml(s: &str) -> StdResult<Self, toml::de::Error> {
        toml::from_str(s)
    }

    pub fn from_toml_file(filepath: PathBuf) -> anyhow::Result<Self> {
        let toml = fsutil::read_to_string(&filepath).context("Cannot read a file")?;
        let mut cfg = Self::from_toml(&toml)
            .with_context(|| format!("Invalid config TOML: {:?}", filepath))?;
        cfg.validate()
            .with_context(|| format!("Invalid config: {:?}", filepath))?;
        cfg.source_config_file = Some(filepath);
        Ok(cfg)
    }

    /// Find config file ancestor dirs, including current dir.
    pub fn find_file_in_ancestors(cur_dir: impl AsRef<Path>) -> anyhow::Result<PathBuf> {
        let cur_dir = cur_dir.as_ref();
        cur_dir
            .ancestors()
            .map(|dir| dir.join(Self::FILENAME))
            .find(|path| path.is_file())
            .with_context(|| format!("Cannot find '{}'", Self::FILENAME))
    }

    /// Falls back to the built-in defaults if no config file exists.
    pub fn from_file_finding_in_ancestors_or_default(
        cur_dir: impl AsRef<Path>,
    ) -> anyhow::Result<Self> {
        match Self::find_file_in_ancestors(&cur_dir) {
            Ok(filepath) => {
                log::info!("Using config {}", filepath.to_string_lossy());
                Self::from_toml_file(filepath)
            }
            Err(_) => {
                log::info!("No {} found; using default config", Self::FILENAME);
                Ok(Self::default())
            }
        }
    }

    /// Writes the example config into `dir`.
    pub fn init_with_example(dir: impl AsRef<Path>) -> anyhow::Result<PathBuf> {
        let config_filepath = dir.as_ref().join(Self::FILENAME);
        if config_filepath.exists() {
            bail!(
                "{:?} already exists.\nIf it's intentional, remove it and then try again.",
                config_filepath
            );
        }
        fsutil::write_with_mkdir(&config_filepath, Self::example_toml()?)?;
        Ok(config_filepath)
    }

    fn validate(&self) -> anyhow::Result<()> {
        let limit = self.judge.default_time_limit;
        ensure!(
            limit > 0.0 && Duration::try_from_secs_f64(limit).is_ok(),
            "judge.default_time_limit must be a positive number of seconds (got {})",
            limit
        );
        ensure!(!self.runner.command.is_empty(), "runner.command is empty");
        Ok(())
    }

    /// `problems_dir`, resolved from the directory of the config file if relative.
    pub fn problems_dir(&self) -> PathBuf {
        let base = self
            .source_config_file
            .as_deref()
            .and_then(Path::parent)
            .filter(|_| self.problems_dir.is_relative());
        match base {
            Some(base) => {
                let rel = self.problems_dir.strip_prefix(".").unwrap_or(&self.problems_dir);
                base.join(rel)
            }
            None => self.problems_dir.clone(),
        }
    }

    /// Falls back to the built-in default if the configured value is not a usable duration.
    pub fn default_time_limit(&self) -> Duration {
        match Duration::try_from_secs_f64(self.judge.default_time_limit) {
            Ok(limit) if !limit.is_zero() => limit,
            _ => DEFAULT_TIME_LIMIT,
        }
    }

    pub fn problem_loader(&self) -> DirProblemLoader {
        DirProblemLoader::new(self.problems_dir()).default_time_limit(self.default_time_limit())
    }

    pub fn supervisor(&self) -> ProcessSupervisor {
        ProcessSupervisor::new(self.runner.command.clone())
            .source_suffix(self.runner.source_suffix.clone())
    }
}
