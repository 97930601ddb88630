mod cli;
mod main_lib;

use clap::Parser;
use cli::Cli;
use main_lib::{init_tracing, run};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();
    run(Cli::parse()).await
}
