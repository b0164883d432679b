use anyhow::Result;
use scheduling_assistant::cli;

#[tokio::main]
async fn main() -> Result<()> {
    cli::run().await
}
