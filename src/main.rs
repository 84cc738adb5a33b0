use anyhow::Context;
use bikeshare_elt::cli::{run, Cli};
use clap::Parser;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    run(cli).await.context("bikeshare-elt failed")
}
