use clap::Parser;
use skyaqi_processor::cli::{run, Cli};
use skyaqi_processor::error::Result;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    run(cli).await
}
