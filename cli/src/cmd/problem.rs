use std::io;

use ojudge_core::catalog;

use super::{GlobalArgs, SubcmdResult};
use crate::util;

#[derive(Debug, clap::Args)]
pub struct Args {
    #[arg()] // positional argument
    pub problem_id: String,
}

pub fn exec(args: &Args, global_args: &GlobalArgs) -> SubcmdResult {
    let cfg = util::load_config(global_args)?;
    let info = catalog::load_problem_info(&cfg.problem_loader(), &args.problem_id)?;
    serde_json::to_writer_pretty(io::stdout(), &info)?;
    println!();
    Ok(0)
}
