use std::io;

use colored::Colorize;
use ojudge_core::catalog;

use super::{GlobalArgs, SubcmdResult};
use crate::util;

#[derive(Debug, clap::Args)]
pub struct Args {
    #[arg(short, long)]
    pub json: bool,
}

pub fn exec(args: &Args, global_args: &GlobalArgs) -> SubcmdResult {
    let cfg = util::load_config(global_args)?;
    let problems = catalog::list_problems(cfg.problems_dir())?;

    if args.json {
        serde_json::to_writer_pretty(io::stdout(), &problems)?;
        println!();
        return Ok(0);
    }

    for p in problems {
        if p.tags.is_empty() {
            println!("{}\t{}", p.id.cyan(), p.title);
        } else {
            println!("{}\t{} {}", p.id.cyan(), p.title, format!("[{}]", p.tags.join(", ")).dimmed());
        }
    }
    Ok(0)
}
