/*
[INPUT]:  Scripted log pages and failures per load kind
[OUTPUT]: ScriptedFetcher, page builders, and store helpers
[POS]:    Test infrastructure - shared across viewer test modules
[UPDATE]: When adding new test patterns or fixtures
*/

//! Common test utilities for tasklog-viewer tests

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::ops::Range;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tasklog_adapter::{
    Direction, LogFetcher, LogLevel, LogPage, LogPageRequest, LogRecord, START_CURSOR,
    TasklogError,
};
use tasklog_viewer::config::StoreConfig;
use tasklog_viewer::{SessionKey, TaskLogStore};
use tokio::sync::Notify;

pub const PROJECT_ID: &str = "123";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Initial,
    Older,
    Newer,
}

impl Kind {
    fn of(req: &LogPageRequest) -> Self {
        match req.direction {
            Direction::Older if req.cursor == START_CURSOR => Kind::Initial,
            Direction::Older => Kind::Older,
            Direction::Newer => Kind::Newer,
        }
    }
}

enum Reply {
    Page(LogPage),
    Fail { code: i32, message: String },
}

struct Step {
    reply: Reply,
    gate: Option<Arc<Notify>>,
}

/// LogFetcher that replays queued replies per load kind and records requests.
#[derive(Default)]
pub struct ScriptedFetcher {
    scripts: Mutex<HashMap<Kind, VecDeque<Step>>>,
    requests: Mutex<Vec<LogPageRequest>>,
}

impl ScriptedFetcher {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn push_page(&self, kind: Kind, page: LogPage) {
        self.push(kind, Reply::Page(page), None);
    }

    pub fn push_error(&self, kind: Kind, code: i32, message: &str) {
        self.push(
            kind,
            Reply::Fail {
                code,
                message: message.to_string(),
            },
            None,
        );
    }

    /// Queue a page that is only returned after the gate is notified.
    pub fn push_gated_page(&self, kind: Kind, page: LogPage) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.push(kind, Reply::Page(page), Some(gate.clone()));
        gate
    }

    pub fn requests(&self) -> Vec<LogPageRequest> {
        self.requests.lock().expect("requests lock").clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().expect("requests lock").len()
    }

    pub fn calls_of(&self, kind: Kind) -> usize {
        self.requests().iter().filter(|req| Kind::of(req) == kind).count()
    }

    fn push(&self, kind: Kind, reply: Reply, gate: Option<Arc<Notify>>) {
        self.scripts
            .lock()
            .expect("scripts lock")
            .entry(kind)
            .or_default()
            .push_back(Step { reply, gate });
    }
}

#[async_trait]
impl LogFetcher for ScriptedFetcher {
    async fn fetch_page(&self, req: &LogPageRequest) -> tasklog_adapter::Result<LogPage> {
        self.requests.lock().expect("requests lock").push(req.clone());
        let kind = Kind::of(req);
        let step = self
            .scripts
            .lock()
            .expect("scripts lock")
            .get_mut(&kind)
            .and_then(VecDeque::pop_front);
        let Some(step) = step else {
            return Err(TasklogError::InvalidResponse(format!(
                "no scripted reply for {kind:?}"
            )));
        };

        if let Some(gate) = step.gate {
            gate.notified().await;
        }
        match step.reply {
            Reply::Page(page) => Ok(page),
            Reply::Fail { code, message } => Err(TasklogError::Api { code, message }),
        }
    }
}

/// Page of info lines `L{n}` for every `n` in `range`.
pub fn page(
    range: Range<i64>,
    older_cursor: i64,
    newer_cursor: i64,
    has_more_older: bool,
    has_more_newer: bool,
) -> LogPage {
    LogPage {
        logs: range
            .map(|n| LogRecord::new(LogLevel::Info, format!("L{n}"), Some("2024-01-17T10:00:00Z")))
            .collect(),
        older_cursor,
        newer_cursor,
        has_more_older,
        has_more_newer,
    }
}

pub fn session() -> SessionKey {
    SessionKey::new("42", "run-9", "logs/sync.log")
}

pub fn store(fetcher: &Arc<ScriptedFetcher>) -> TaskLogStore<Arc<ScriptedFetcher>> {
    store_with_cap(fetcher, StoreConfig::default().max_logs_in_memory)
}

pub fn store_with_cap(
    fetcher: &Arc<ScriptedFetcher>,
    max_logs_in_memory: usize,
) -> TaskLogStore<Arc<ScriptedFetcher>> {
    let config = StoreConfig {
        max_logs_in_memory,
        ..StoreConfig::default()
    };
    TaskLogStore::new(Arc::clone(fetcher), PROJECT_ID, config)
}

pub fn messages<F: LogFetcher>(store: &TaskLogStore<F>) -> Vec<String> {
    store
        .snapshot()
        .entries
        .iter()
        .map(|entry| entry.message.clone())
        .collect()
}

pub fn labels(range: Range<i64>) -> Vec<String> {
    range.map(|n| format!("L{n}")).collect()
}
