pub mod init;
pub mod judge;
pub mod problem;
pub mod problems;

use std::path::PathBuf;

#[derive(Debug, clap::Parser)]
#[command(author, version, about, long_about = None)]
pub struct GlobalArgs {
    #[command(subcommand)]
    pub subcmd: Subcommand,

    /// Overrides `problems_dir` of ojudge.toml
    #[arg(long, global = true)]
    pub problems_dir: Option<PathBuf>,
}

#[derive(Debug, clap::Subcommand)]
pub enum Subcommand {
    Init(init::Args),

    #[command(alias("j"))]
    Judge(judge::Args),

    Problem(problem::Args),

    #[command(alias("ls"))]
    Problems(problems::Args),
}

/// Process exit code on success.
pub type SubcmdResult = anyhow::Result<i32>;

/// Process exit code when a subcommand fails.
pub const EXIT_CODE_ERROR: i32 = 2;

impl GlobalArgs {
    /// Runs the subcommand and returns the process exit code. Errors are printed to stderr.
    pub async fn run(&self) -> i32 {
        match self.exec_subcmd().await {
            Ok(code) => code,
            Err(e) => {
                eprintln!("Error: {:?}", e);
                EXIT_CODE_ERROR
            }
        }
    }

    pub async fn exec_subcmd(&self) -> SubcmdResult {
        use Subcommand::*;
        match &self.subcmd {
            Init(args) => init::exec(args, self),
            Judge(args) => judge::exec(args, self).await,
            Problem(args) => problem::exec(args, self),
            Problems(args) => problems::exec(args, self),
        }
    }
}
