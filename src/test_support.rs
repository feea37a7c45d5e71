//! Test doubles shared by the unit tests

use crate::core::traits::{CommandOutput, CommandRunner, Reporter};
use crate::security::CommandError;
use async_trait::async_trait;
use std::sync::Mutex;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// Reporter that keeps everything in memory
#[derive(Debug, Default)]
pub struct RecordingReporter {
    infos: Mutex<Vec<String>>,
    warnings: Mutex<Vec<String>>,
    errors: Mutex<Vec<String>>,
    outputs: Mutex<Vec<(String, String)>>,
}

impl RecordingReporter {
    pub fn infos(&self) -> Vec<String> {
        self.infos.lock().unwrap().clone()
    }

    pub fn warnings(&self) -> Vec<String> {
        self.warnings.lock().unwrap().clone()
    }

    pub fn errors(&self) -> Vec<String> {
        self.errors.lock().unwrap().clone()
    }

    pub fn outputs(&self) -> Vec<(String, String)> {
        self.outputs.lock().unwrap().clone()
    }

    pub fn output(&self, name: &str) -> Option<String> {
        self.outputs()
            .into_iter()
            .rev()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }
}

impl Reporter for RecordingReporter {
    fn info(&self, message: &str) {
        self.infos.lock().unwrap().push(message.to_string());
    }

    fn warning(&self, message: &str) {
        self.warnings.lock().unwrap().push(message.to_string());
    }

    fn error(&self, message: &str) {
        self.errors.lock().unwrap().push(message.to_string());
    }

    fn set_output(&self, name: &str, value: &str) {
        self.outputs
            .lock()
            .unwrap()
            .push((name.to_string(), value.to_string()));
    }
}

type Handler = Box<dyn Fn(&str, &[String]) -> Result<CommandOutput, CommandError> + Send + Sync>;

/// Command runner that records invocations instead of spawning processes
pub struct FakeRunner {
    calls: Mutex<Vec<String>>,
    handler: Handler,
}

impl FakeRunner {
    /// Every command succeeds with empty output
    pub fn new() -> Self {
        Self::with_handler(|_, _| Ok(ok("")))
    }

    pub fn with_handler<F>(handler: F) -> Self
    where
        F: Fn(&str, &[String]) -> Result<CommandOutput, CommandError> + Send + Sync + 'static,
    {
        Self {
            calls: Mutex::new(Vec::new()),
            handler: Box::new(handler),
        }
    }

    /// Recorded command lines, program and arguments joined by spaces
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_starting_with(&self, prefix: &str) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|call| call.starts_with(prefix))
            .collect()
    }
}

#[async_trait]
impl CommandRunner for FakeRunner {
    async fn run(&self, program: &str, args: &[String]) -> Result<CommandOutput, CommandError> {
        let line = std::iter::once(program.to_string())
            .chain(args.iter().cloned())
            .collect::<Vec<_>>()
            .join(" ");
        self.calls.lock().unwrap().push(line);
        (self.handler)(program, args)
    }
}

/// Successful command output
pub fn ok(stdout: &str) -> CommandOutput {
    CommandOutput {
        code: Some(0),
        stdout: stdout.to_string(),
        stderr: String::new(),
    }
}

/// Failed command output
pub fn failed(code: i32, stderr: &str) -> CommandOutput {
    CommandOutput {
        code: Some(code),
        stdout: String::new(),
        stderr: stderr.to_string(),
    }
}

/// Serve a single canned HTTP response on a loopback port
///
/// Returns the base URL and a handle resolving to the raw request text.
pub async fn serve_once(status_line: &str, body: &str) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let response = format!(
        "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status_line,
        body.len(),
        body
    );

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut request = Vec::new();
        let mut buf = [0u8; 1024];
        loop {
            let n = socket.read(&mut buf).await.unwrap();
            if n == 0 {
                break;
            }
            request.extend_from_slice(&buf[..n]);
            if request.windows(4).any(|w| w == b"\r\n\r\n") {
                break;
            }
        }
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.ok();
        String::from_utf8_lossy(&request).to_string()
    });

    (format!("http://{}", addr), handle)
}
