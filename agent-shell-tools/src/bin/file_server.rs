//! MCP stdio server exposing `list_files`, `read_file` and `write_file`.

use agent_shell_tools::{FileTools, McpServer, init_tracing};
use clap::Parser;
use std::error::Error;
use std::path::PathBuf;
use tokio::io::{self, BufReader};
use tracing::info;

#[derive(Parser)]
#[command(name = "file-server", about = "MCP file server confined to one directory")]
struct Args {
    /// Directory the tools may read and write
    #[arg(long, default_value = "workspace")]
    root: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    init_tracing();
    let args = Args::parse();

    let tools = FileTools::new(&args.root)?;
    info!(root = %args.root.display(), "FileServer running in workspace");

    McpServer::new(tools)
        .serve(BufReader::new(io::stdin()), io::stdout())
        .await?;
    Ok(())
}
