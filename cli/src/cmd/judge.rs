use std::{io, path::PathBuf};

use anyhow::Context as _;
use ojudge_core::{judge, style, Submission};

use super::{GlobalArgs, SubcmdResult};
use crate::util;

#[derive(Debug, clap::Args)]
pub struct Args {
    #[arg()] // positional argument
    pub problem_id: String,

    #[arg()]
    pub source_file: PathBuf,

    /// Print the result as JSON
    #[arg(short, long)]
    pub json: bool,
}

pub async fn exec(args: &Args, global_args: &GlobalArgs) -> SubcmdResult {
    let cfg = util::load_config(global_args)?;
    let source_code = fsutil::read_to_string(&args.source_file)
        .context("Failed to read the source file")?;

    let loader = cfg.problem_loader();
    let supervisor = cfg.supervisor();
    let submission = Submission::new(&args.problem_id, source_code);

    let res = judge(&loader, &supervisor, &submission).await;

    if args.json {
        serde_json::to_writer_pretty(io::stdout(), &res)?;
        println!();
    } else {
        style::print_judge_result(&res);
    }

    Ok(if res.verdict.is_accepted() { 0 } else { 1 })
}
