use serde_json::{Value, json};
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};

struct Session {
    child: Child,
    stdin: ChildStdin,
    stdout: Lines<BufReader<ChildStdout>>,
}

impl Session {
    fn spawn(binary: &str, args: &[&str]) -> Self {
        let mut child = Command::new(binary)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .expect("server starts");
        let stdin = child.stdin.take().expect("stdin");
        let stdout = BufReader::new(child.stdout.take().expect("stdout")).lines();
        Self {
            child,
            stdin,
            stdout,
        }
    }

    async fn send(&mut self, message: Value) {
        let mut line = message.to_string();
        line.push('\n');
        self.stdin.write_all(line.as_bytes()).await.expect("write");
        self.stdin.flush().await.expect("flush");
    }

    async fn request(&mut self, id: u64, method: &str, params: Value) -> Value {
        self.send(json!({"jsonrpc": "2.0", "id": id, "method": method, "params": params}))
            .await;
        let line = self
            .stdout
            .next_line()
            .await
            .expect("read")
            .expect("server replied");
        let reply: Value = serde_json::from_str(&line).expect("json reply");
        assert_eq!(reply["id"], id);
        reply
    }

    async fn handshake(&mut self) {
        let init = self
            .request(1, "initialize", json!({"protocolVersion": "2025-06-18"}))
            .await;
        assert!(init["result"]["serverInfo"]["name"].is_string());
        self.send(json!({"jsonrpc": "2.0", "method": "notifications/initialized"}))
            .await;
    }

    async fn close(mut self) {
        drop(self.stdin);
        let status = self.child.wait().await.expect("exit");
        assert!(status.success());
    }
}

#[tokio::test]
async fn file_server_lists_python_files_over_stdio() {
    let dir = tempfile::tempdir().expect("temp dir");
    let root = dir.path().join("workspace");
    std::fs::create_dir_all(&root).expect("root");
    for name in ["test.py", "script.py", "readme.txt"] {
        std::fs::write(root.join(name), "print('hi')").expect("seed");
    }

    let root_arg = root.to_string_lossy().into_owned();
    let mut session = Session::spawn(env!("CARGO_BIN_EXE_file-server"), &["--root", &root_arg]);
    session.handshake().await;

    let listed = session.request(2, "tools/list", json!({})).await;
    let names: Vec<&str> = listed["result"]["tools"]
        .as_array()
        .expect("tools")
        .iter()
        .filter_map(|tool| tool["name"].as_str())
        .collect();
    assert_eq!(names, vec!["list_files", "read_file", "write_file"]);

    let result = session
        .request(
            3,
            "tools/call",
            json!({"name": "list_files", "arguments": {"extension": ".py"}}),
        )
        .await;
    assert_eq!(result["result"]["isError"], false);
    assert_eq!(
        result["result"]["content"][0]["text"],
        r#"["script.py","test.py"]"#
    );

    let denied = session
        .request(
            4,
            "tools/call",
            json!({"name": "read_file", "arguments": {"filename": "../outside.txt"}}),
        )
        .await;
    assert_eq!(denied["result"]["isError"], true);

    session.close().await;
}

#[tokio::test]
async fn math_server_answers_the_classic_question() {
    let mut session = Session::spawn(env!("CARGO_BIN_EXE_math-server"), &[]);
    session.handshake().await;

    let sum = session
        .request(2, "tools/call", json!({"name": "add", "arguments": {"a": 3, "b": 5}}))
        .await;
    assert_eq!(sum["result"]["content"][0]["text"], "8");

    let product = session
        .request(
            3,
            "tools/call",
            json!({"name": "multiply", "arguments": {"a": 8, "b": 12}}),
        )
        .await;
    assert_eq!(product["result"]["content"][0]["text"], "96");

    let pong = session.request(4, "ping", json!({})).await;
    assert_eq!(pong["result"], json!({}));

    session.close().await;
}
