//! End-to-end request handling against a temporary sandbox.

use std::fs;
use std::path::Path;

use serde_json::{Value, json};
use tempfile::TempDir;

use fs_sandbox_server::core::protocol::JsonRpcResponse;
use fs_sandbox_server::core::transport::serve_lines;
use fs_sandbox_server::core::{Config, FsServer, SecurityPolicy};
use fs_sandbox_server::domains::tools::Dispatcher;

fn sandbox(max_file_size: u64, extensions: &[&str]) -> (TempDir, FsServer) {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path().join("sandbox");
    fs::create_dir(&root).unwrap();
    let policy = SecurityPolicy::new(vec![root], max_file_size, extensions.to_vec()).unwrap();
    let server = FsServer::with_dispatcher(Config::default(), Dispatcher::new(policy));
    (temp_dir, server)
}

fn root(temp_dir: &TempDir) -> std::path::PathBuf {
    temp_dir.path().join("sandbox")
}

fn request(server: &FsServer, id: u64, method: &str, params: Value) -> JsonRpcResponse {
    let line = json!({"jsonrpc": "2.0", "id": id, "method": method, "params": params}).to_string();
    server.process_line(&line).expect("request should be answered")
}

fn error_kind(response: &JsonRpcResponse) -> String {
    response
        .error()
        .and_then(|e| e.kind())
        .unwrap_or_default()
        .to_string()
}

fn path_str(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

#[test]
fn traversal_out_of_sandbox_is_rejected() {
    let (temp_dir, server) = sandbox(1024, &[]);
    let escape = format!("{}/../../etc/passwd", path_str(&root(&temp_dir)));

    let response = request(&server, 1, "read_file", json!({"path": escape}));

    assert_eq!(error_kind(&response), "PathNotAllowed");
    assert_eq!(response.error().unwrap().code, -32002);
}

#[test]
fn oversized_write_leaves_nothing_behind() {
    let (temp_dir, server) = sandbox(10, &[]);
    let target = root(&temp_dir).join("a.txt");

    let response = request(
        &server,
        1,
        "write_file",
        json!({"path": path_str(&target), "content": "01234567890"}),
    );

    assert_eq!(error_kind(&response), "FileTooLarge");
    assert!(!target.exists());
    assert_eq!(fs::read_dir(root(&temp_dir)).unwrap().count(), 0);
}

#[test]
fn write_then_read_round_trips() {
    let (temp_dir, server) = sandbox(1024, &[]);
    let target = path_str(&root(&temp_dir).join("a.txt"));

    let written = request(&server, 1, "write_file", json!({"path": target, "content": "hello"}));
    assert_eq!(written.result().unwrap()["bytes_written"], 5);
    assert_eq!(written.result().unwrap()["created"], true);

    let read = request(&server, 2, "read_file", json!({"path": target}));
    assert_eq!(read.id, json!(2));
    assert_eq!(read.result().unwrap()["content"], "hello");
    assert_eq!(read.result().unwrap()["encoding"], "utf8");
}

#[test]
fn move_renames_within_sandbox() {
    let (temp_dir, server) = sandbox(1024, &[]);
    let source = root(&temp_dir).join("a.txt");
    let destination = root(&temp_dir).join("b.txt");
    fs::write(&source, "prior content").unwrap();

    let response = request(
        &server,
        1,
        "move_file",
        json!({"source": path_str(&source), "destination": path_str(&destination)}),
    );

    assert!(response.result().is_some(), "{response:?}");
    assert!(!source.exists());
    assert_eq!(fs::read_to_string(&destination).unwrap(), "prior content");
}

#[test]
fn unknown_method_echoes_id() {
    let (_temp_dir, server) = sandbox(1024, &[]);

    let response = request(&server, 77, "foo_bar", json!({}));

    assert_eq!(response.id, json!(77));
    assert_eq!(error_kind(&response), "MethodNotFound");
    assert_eq!(response.error().unwrap().code, -32601);
}

#[cfg(unix)]
#[test]
fn symlink_escape_is_rejected() {
    let (temp_dir, server) = sandbox(1024, &[]);
    let outside = temp_dir.path().join("outside");
    fs::create_dir(&outside).unwrap();
    fs::write(outside.join("secret.txt"), "secret").unwrap();
    std::os::unix::fs::symlink(&outside, root(&temp_dir).join("link")).unwrap();

    let through_link = root(&temp_dir).join("link/secret.txt");
    let read = request(&server, 1, "read_file", json!({"path": path_str(&through_link)}));
    assert_eq!(error_kind(&read), "PathNotAllowed");

    let new_file = root(&temp_dir).join("link/new.txt");
    let write = request(
        &server,
        2,
        "write_file",
        json!({"path": path_str(&new_file), "content": "x"}),
    );
    assert_eq!(error_kind(&write), "PathNotAllowed");
    assert!(!outside.join("new.txt").exists());
}

#[test]
fn extension_is_checked_before_writing() {
    let (temp_dir, server) = sandbox(1024, &["txt", ".md"]);
    let script = root(&temp_dir).join("run.sh");

    let response = request(
        &server,
        1,
        "write_file",
        json!({"path": path_str(&script), "content": "echo hi"}),
    );
    assert_eq!(error_kind(&response), "ExtensionNotAllowed");
    assert!(!script.exists());

    let notes = root(&temp_dir).join("notes.MD");
    let response = request(
        &server,
        2,
        "write_file",
        json!({"path": path_str(&notes), "content": "# hi"}),
    );
    assert!(response.result().is_some(), "{response:?}");
}

#[test]
fn create_directory_is_idempotent() {
    let (temp_dir, server) = sandbox(1024, &[]);
    let nested = path_str(&root(&temp_dir).join("a/b/c"));

    let first = request(&server, 1, "create_directory", json!({"path": nested}));
    assert_eq!(first.result().unwrap()["created"], true);

    let second = request(&server, 2, "create_directory", json!({"path": nested}));
    assert_eq!(second.result().unwrap()["created"], false);

    let file = root(&temp_dir).join("plain");
    fs::write(&file, "").unwrap();
    let clash = request(&server, 3, "create_directory", json!({"path": path_str(&file)}));
    assert_eq!(error_kind(&clash), "AlreadyExistsAsFile");
}

#[test]
fn rejected_edit_keeps_original_content() {
    let (temp_dir, server) = sandbox(1024, &[]);
    let target = root(&temp_dir).join("lines.txt");
    fs::write(&target, "one\ntwo\nthree\n").unwrap();

    let response = request(
        &server,
        1,
        "edit_file",
        json!({
            "path": path_str(&target),
            "edits": [
                {"start_line": 1, "end_line": 1, "new_text": "ONE"},
                {"start_line": 2, "end_line": 2, "new_text": "TWO", "old_text": "not two"}
            ]
        }),
    );

    assert_eq!(error_kind(&response), "ConflictingEdit");
    assert_eq!(fs::read_to_string(&target).unwrap(), "one\ntwo\nthree\n");
}

#[test]
fn tools_call_matches_direct_call() {
    let (temp_dir, server) = sandbox(1024, &[]);
    fs::write(root(&temp_dir).join("a.txt"), "hello").unwrap();
    let path = path_str(&root(&temp_dir).join("a.txt"));

    let direct = request(&server, 1, "get_file_info", json!({"path": path}));
    let via_tool = request(
        &server,
        2,
        "tools/call",
        json!({"name": "get_file_info", "arguments": {"path": path}}),
    );

    let structured = &via_tool.result().unwrap()["structuredContent"];
    assert_eq!(structured["size"], direct.result().unwrap()["size"]);
    assert_eq!(structured["kind"], "file");
}

#[tokio::test]
async fn requests_are_answered_in_order() {
    let (temp_dir, server) = sandbox(1024, &[]);
    let target = path_str(&root(&temp_dir).join("seq.txt"));

    let input = [
        json!({"jsonrpc": "2.0", "id": 1, "method": "write_file", "params": {"path": target, "content": "1"}}),
        json!({"jsonrpc": "2.0", "id": 2, "method": "read_file", "params": {"path": target}}),
        json!({"jsonrpc": "2.0", "id": 3, "method": "delete_file", "params": {"path": target}}),
    ]
    .iter()
    .map(|v| format!("{v}\n"))
    .collect::<String>();

    let mut output = Vec::new();
    serve_lines(&server, input.as_bytes(), &mut output)
        .await
        .unwrap();

    let responses: Vec<Value> = String::from_utf8(output)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    let ids: Vec<_> = responses.iter().map(|r| r["id"].clone()).collect();
    assert_eq!(ids, vec![json!(1), json!(2), json!(3)]);
    assert_eq!(responses[1]["result"]["content"], "1");
    assert!(!Path::new(&target).exists());
}
