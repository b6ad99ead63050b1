use clap::Parser;
use ojudge_cli::cmd::GlobalArgs;

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let app = GlobalArgs::parse();
    std::process::exit(app.run().await);
}
