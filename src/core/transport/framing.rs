//! Newline-delimited JSON-RPC over any byte stream.

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info, warn};

use super::TransportResult;
use crate::core::FsServer;
use crate::core::protocol::{DecodeError, JsonRpcResponse, frame_response};

/// Serve requests read from `reader`, writing responses to `writer`.
///
/// A line is read only after the previous response has been written.
/// A line that is not valid UTF-8 is answered with a parse error and never
/// dispatched. Returns when the reader reaches end of stream.
pub async fn serve_lines<R, W>(server: &FsServer, mut reader: R, mut writer: W) -> TransportResult<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut buf = Vec::new();

    loop {
        buf.clear();
        let bytes_read = reader.read_until(b'\n', &mut buf).await?;
        if bytes_read == 0 {
            info!("End of stream, closing");
            return Ok(());
        }

        let line = match std::str::from_utf8(&buf) {
            Ok(line) => line,
            Err(e) => {
                warn!("Rejected message: invalid UTF-8");
                let response = DecodeError::invalid_utf8(e).into_response();
                write_response(&mut writer, &response).await?;
                continue;
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        match server.handle_line(line).await {
            Some(response) => write_response(&mut writer, &response).await?,
            None => debug!("Notification processed, no response"),
        }
    }
}

async fn write_response<W>(writer: &mut W, response: &JsonRpcResponse) -> TransportResult<()>
where
    W: AsyncWrite + Unpin,
{
    let framed = frame_response(response)?;
    writer.write_all(framed.as_bytes()).await?;
    writer.flush().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Config;
    use crate::core::security::SecurityPolicy;
    use crate::domains::tools::Dispatcher;
    use serde_json::Value;
    use tempfile::TempDir;
    use tokio::io::BufReader;
    use tokio_test::io::Builder;

    fn test_server() -> (TempDir, FsServer) {
        let temp_dir = TempDir::new().unwrap();
        let policy =
            SecurityPolicy::new(vec![temp_dir.path().to_path_buf()], 1024, Vec::<String>::new())
                .unwrap();
        let server = FsServer::with_dispatcher(Config::default(), Dispatcher::new(policy));
        (temp_dir, server)
    }

    #[tokio::test]
    async fn test_one_response_per_request() {
        let (_temp_dir, server) = test_server();
        let reader = Builder::new()
            .read(b"{\"jsonrpc\":\"2.0\",\"id\":1,\"method\":\"ping\"}\n")
            .read(b"\n")
            .read(b"{\"jsonrpc\":\"2.0\",\"method\":\"notifications/initialized\"}\n")
            .read(b"{\"jsonrpc\":\"2.0\",\"id\":2,\"method\":\"ping\"}")
            .build();
        let writer = Builder::new()
            .write(b"{\"jsonrpc\":\"2.0\",\"id\":1,\"result\":{}}\n")
            .write(b"{\"jsonrpc\":\"2.0\",\"id\":2,\"result\":{}}\n")
            .build();

        serve_lines(&server, BufReader::new(reader), writer).await.unwrap();
    }

    #[tokio::test]
    async fn test_invalid_utf8_in_path_is_not_dispatched() {
        let (temp_dir, server) = test_server();
        let mut input = format!(
            "{{\"jsonrpc\":\"2.0\",\"id\":1,\"method\":\"write_file\",\"params\":{{\"path\":\"{}/a",
            temp_dir.path().display()
        )
        .into_bytes();
        input.push(0xff);
        input.extend_from_slice(b".txt\",\"content\":\"x\"}}\n");
        let mut output = Vec::new();

        serve_lines(&server, &input[..], &mut output).await.unwrap();

        let response: Value = serde_json::from_slice(&output).unwrap();
        assert_eq!(response["id"], Value::Null);
        assert_eq!(response["error"]["code"], -32700);
        assert_eq!(response["error"]["data"]["kind"], "ParseError");
        assert_eq!(std::fs::read_dir(temp_dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_bad_line_does_not_stop_loop() {
        let (_temp_dir, server) = test_server();
        let input = b"garbage\n\xff\xfe\n{\"jsonrpc\":\"2.0\",\"id\":7,\"method\":\"foo_bar\"}\n";
        let mut output = Vec::new();

        serve_lines(&server, &input[..], &mut output).await.unwrap();

        let responses: Vec<Value> = String::from_utf8(output)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(responses.len(), 3);
        assert_eq!(responses[0]["error"]["code"], -32700);
        assert_eq!(responses[0]["id"], Value::Null);
        assert_eq!(responses[1]["error"]["code"], -32700);
        assert_eq!(responses[2]["id"], 7);
        assert_eq!(responses[2]["error"]["data"]["kind"], "MethodNotFound");
    }
}
