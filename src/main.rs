use clap::Parser;
use mcp_agent_shell::Cli;
use std::error::Error;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    mcp_agent_shell::run(cli).await
}
