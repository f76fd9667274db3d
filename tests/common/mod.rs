#![allow(dead_code)]

use assistant_relay::openai::error::Result as ApiResult;
use assistant_relay::openai::{
    Assistant, AssistantsApi, Message, MessageContent, MessageRole, Run, RunStatus, TextContent,
    Thread,
};
use assistant_relay::{router, AppState, PollConfig, Relay, SessionSlot};
use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tower::ServiceExt;

pub const POLL_INTERVAL: Duration = Duration::from_millis(2000);

struct FakeRun {
    prompt: String,
    polls: usize,
    status: RunStatus,
}

#[derive(Default)]
struct FakeThread {
    // Oldest first, like the real thread log.
    messages: Vec<Message>,
    runs: HashMap<String, FakeRun>,
    next_id: usize,
}

impl FakeThread {
    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{}_{}", prefix, self.next_id)
    }
}

/// In-memory stand-in for the Assistants service. Runs complete after a
/// fixed number of status checks and answer with `echo: <prompt>`.
pub struct FakeAssistants {
    thread: Mutex<FakeThread>,
    polls_until_complete: usize,
    final_status: RunStatus,
    writes_reply: bool,
    calls: AtomicUsize,
}

impl FakeAssistants {
    pub fn new(polls_until_complete: usize) -> Self {
        Self {
            thread: Mutex::new(FakeThread::default()),
            polls_until_complete,
            final_status: RunStatus::Completed,
            writes_reply: true,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn without_reply(mut self) -> Self {
        self.writes_reply = false;
        self
    }

    pub fn ending_with(mut self, status: RunStatus) -> Self {
        self.final_status = status;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn user_messages(&self) -> Vec<String> {
        self.thread
            .lock()
            .unwrap()
            .messages
            .iter()
            .filter(|m| m.role == MessageRole::User)
            .filter_map(|m| m.first_text().map(String::from))
            .collect()
    }

    fn touch(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

fn text_message(id: String, role: MessageRole, run_id: Option<String>, created_at: i64, text: &str) -> Message {
    Message {
        id,
        created_at,
        role,
        content: vec![MessageContent::Text {
            text: TextContent {
                value: text.to_string(),
            },
        }],
        run_id,
    }
}

#[async_trait]
impl AssistantsApi for FakeAssistants {
    async fn retrieve_assistant(&self, assistant_id: &str) -> ApiResult<Assistant> {
        self.touch();
        Ok(Assistant {
            id: assistant_id.to_string(),
            name: Some("Fake".to_string()),
            model: Some("gpt-4o-mini".to_string()),
        })
    }

    async fn create_thread(&self) -> ApiResult<Thread> {
        self.touch();
        Ok(Thread {
            id: "thread_fake".to_string(),
            created_at: 0,
        })
    }

    async fn create_message(&self, _thread_id: &str, content: &str) -> ApiResult<Message> {
        self.touch();
        let mut thread = self.thread.lock().unwrap();
        let id = thread.next_id("msg");
        let created_at = thread.messages.len() as i64;
        let message = text_message(id, MessageRole::User, None, created_at, content);
        thread.messages.push(message.clone());
        Ok(message)
    }

    async fn create_run(
        &self,
        thread_id: &str,
        assistant_id: &str,
        _model: Option<&str>,
    ) -> ApiResult<Run> {
        self.touch();
        let mut thread = self.thread.lock().unwrap();
        let prompt = thread
            .messages
            .iter()
            .rev()
            .find(|m| m.role == MessageRole::User)
            .and_then(|m| m.first_text())
            .unwrap_or_default()
            .to_string();
        let id = thread.next_id("run");
        thread.runs.insert(
            id.clone(),
            FakeRun {
                prompt,
                polls: 0,
                status: RunStatus::Queued,
            },
        );
        Ok(Run {
            id,
            thread_id: thread_id.to_string(),
            assistant_id: Some(assistant_id.to_string()),
            status: RunStatus::Queued,
            last_error: None,
        })
    }

    async fn retrieve_run(&self, thread_id: &str, run_id: &str) -> ApiResult<Run> {
        self.touch();
        let mut thread = self.thread.lock().unwrap();
        let created_at = thread.messages.len() as i64;
        let reply_id = thread.next_id("msg");
        let polls_until_complete = self.polls_until_complete;
        let final_status = self.final_status;

        let run = thread
            .runs
            .get_mut(run_id)
            .expect("retrieve_run for an unknown run");
        run.polls += 1;

        let mut reply = None;
        if run.polls > polls_until_complete && !run.status.is_terminal() {
            run.status = final_status;
            if final_status == RunStatus::Completed && self.writes_reply {
                reply = Some(format!("echo: {}", run.prompt));
            }
        } else if !run.status.is_terminal() {
            run.status = RunStatus::InProgress;
        }
        let status = run.status;

        if let Some(text) = reply {
            let message = text_message(
                reply_id,
                MessageRole::Assistant,
                Some(run_id.to_string()),
                created_at,
                &text,
            );
            thread.messages.push(message);
        }

        Ok(Run {
            id: run_id.to_string(),
            thread_id: thread_id.to_string(),
            assistant_id: None,
            status,
            last_error: None,
        })
    }

    async fn list_messages(&self, _thread_id: &str, _run_id: &str) -> ApiResult<Vec<Message>> {
        self.touch();
        // Unfiltered on purpose: the relay must pick its own reply out.
        Ok(self.thread.lock().unwrap().messages.iter().rev().cloned().collect())
    }
}

pub fn app_with(fake: Arc<FakeAssistants>, sessions: SessionSlot) -> Router {
    let relay = Relay::new(
        fake,
        PollConfig {
            interval: POLL_INTERVAL,
            max_attempts: 10,
        },
        Some("gpt-4o-mini".to_string()),
    );
    router(AppState::new(relay, sessions))
}

pub async fn ready_app(fake: Arc<FakeAssistants>) -> Router {
    let sessions = SessionSlot::new();
    sessions
        .initialize(fake.as_ref(), "asst_fake")
        .await
        .expect("fake initialization cannot fail");
    app_with(fake, sessions)
}

/// Collects formatted log output so tests can assert on what was logged.
#[derive(Clone, Default)]
pub struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    /// Installs a subscriber writing into this buffer for the current thread.
    pub fn install(&self) -> tracing::subscriber::DefaultGuard {
        let sink = self.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_ansi(false)
            .with_writer(move || sink.clone())
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl std::io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

pub fn post_json(path: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(path)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}
