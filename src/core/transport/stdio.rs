//! STDIO transport implementation.
//!
//! Standard input/output transport - the default and recommended mode.

use tokio::io::BufReader;
use tracing::info;

use super::{TransportResult, serve_lines};
use crate::core::FsServer;

/// STDIO transport handler.
pub struct StdioTransport;

impl StdioTransport {
    /// Serve stdin until it is closed.
    pub async fn run(server: FsServer) -> TransportResult<()> {
        info!("Ready - communicating via stdin/stdout");

        let stdin = BufReader::new(tokio::io::stdin());
        serve_lines(&server, stdin, tokio::io::stdout()).await?;

        info!("STDIO transport finished");
        Ok(())
    }
}
