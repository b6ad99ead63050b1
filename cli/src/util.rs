use std::path::PathBuf;

use anyhow::Context as _;
use ojudge_core::Config;

use crate::cmd::GlobalArgs;

pub fn current_dir() -> anyhow::Result<PathBuf> {
    std::env::current_dir().context("Failed to get current dir")
}

/// Loads `ojudge.toml` (or the defaults) and applies the global command line options.
pub fn load_config(global_args: &GlobalArgs) -> anyhow::Result<Config> {
    let mut cfg = Config::from_file_finding_in_ancestors_or_default(self::current_dir()?)?;
    if let Some(dir) = &global_args.problems_dir {
        log::debug!("problems_dir overridden: {}", dir.to_string_lossy());
        cfg.problems_dir = dir.clone();
        cfg.source_config_file = None;
    }
    Ok(cfg)
}
