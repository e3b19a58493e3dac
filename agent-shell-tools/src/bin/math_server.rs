//! MCP stdio server exposing `add` and `multiply`.

use agent_shell_tools::{MathTools, McpServer, init_tracing};
use std::error::Error;
use tokio::io::{self, BufReader};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    init_tracing();
    McpServer::new(MathTools)
        .serve(BufReader::new(io::stdin()), io::stdout())
        .await?;
    Ok(())
}
