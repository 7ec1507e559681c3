//! Scripted backend shared by the integration tests.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use kanban_core::ErrorCode;
use kanban_remote::{Endpoint, RemoteError, RemoteRequest, ResourceClient};
use parking_lot::Mutex;
use serde_json::{Value, json};
use tokio::sync::Semaphore;

type Reply = Result<Value, RemoteError>;

#[derive(Default)]
struct Script {
    once: HashMap<Endpoint, VecDeque<Reply>>,
    always: HashMap<Endpoint, Reply>,
    gates: HashMap<Endpoint, Arc<Semaphore>>,
    delay: Option<Duration>,
}

/// Fake [`ResourceClient`] answering from a per-endpoint script.
///
/// One-shot replies are consumed first, then the standing reply is used.
/// Unscripted endpoints answer `NOT_FOUND`. Every request is logged.
#[derive(Clone, Default)]
pub struct ScriptedClient {
    script: Arc<Mutex<Script>>,
    calls: Arc<Mutex<Vec<RemoteRequest>>>,
}

impl ScriptedClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Standing reply for `endpoint`.
    pub fn on(&self, endpoint: Endpoint, reply: Reply) -> &Self {
        self.script.lock().always.insert(endpoint, reply);
        self
    }

    /// Reply used for the next call to `endpoint` only.
    pub fn once(&self, endpoint: Endpoint, reply: Reply) -> &Self {
        self.script
            .lock()
            .once
            .entry(endpoint)
            .or_default()
            .push_back(reply);
        self
    }

    /// Calls to `endpoint` block until [`release`](Self::release) is called.
    pub fn hold(&self, endpoint: Endpoint) {
        self.script
            .lock()
            .gates
            .insert(endpoint, Arc::new(Semaphore::new(0)));
    }

    /// Lets `n` held calls to `endpoint` through.
    pub fn release(&self, endpoint: Endpoint, n: usize) {
        if let Some(gate) = self.script.lock().gates.get(&endpoint) {
            gate.add_permits(n);
        }
    }

    /// Every call sleeps this long before answering.
    pub fn delay(&self, delay: Duration) {
        self.script.lock().delay = Some(delay);
    }

    pub fn calls(&self) -> Vec<RemoteRequest> {
        self.calls.lock().clone()
    }

    pub fn calls_to(&self, endpoint: Endpoint) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|r| r.endpoint() == endpoint)
            .count()
    }

    pub fn endpoints(&self) -> Vec<Endpoint> {
        self.calls.lock().iter().map(|r| r.endpoint()).collect()
    }

    pub fn shared(&self) -> Arc<dyn ResourceClient> {
        Arc::new(self.clone())
    }
}

#[async_trait]
impl ResourceClient for ScriptedClient {
    async fn call(&self, request: &RemoteRequest) -> Result<Value, RemoteError> {
        let endpoint = request.endpoint();
        self.calls.lock().push(request.clone());

        let (gate, delay) = {
            let script = self.script.lock();
            (script.gates.get(&endpoint).cloned(), script.delay)
        };
        if let Some(gate) = gate {
            if let Ok(permit) = gate.acquire().await {
                permit.forget();
            }
        }
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let mut script = self.script.lock();
        if let Some(reply) = script.once.get_mut(&endpoint).and_then(|q| q.pop_front()) {
            return reply;
        }
        script
            .always
            .get(&endpoint)
            .cloned()
            .unwrap_or_else(|| Err(RemoteError::new(ErrorCode::NotFound).at_status(404)))
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

pub fn board_json() -> Value {
    json!({
        "id": 1,
        "title": "Roadmap",
        "visibility": "team",
        "isFavorite": false,
        "lists": [
            {"id": 10, "title": "Todo", "cards": [
                {"id": 100, "title": "A"},
                {"id": 101, "title": "B"},
                {"id": 102, "title": "C"}
            ]},
            {"id": 20, "title": "Doing", "cards": [
                {"id": 200, "title": "X"}
            ]}
        ]
    })
}

pub fn dashboard_json() -> Value {
    json!({
        "boards": [
            {"id": 1, "title": "Roadmap", "visibility": "team", "isFavorite": false},
            {"id": 2, "title": "Ops", "visibility": "private", "isFavorite": true}
        ]
    })
}

pub fn card_ids(board: &Value, list: usize) -> Vec<u64> {
    board["lists"][list]["cards"]
        .as_array()
        .map(|cards| cards.iter().filter_map(|c| c["id"].as_u64()).collect())
        .unwrap_or_default()
}

pub fn conflict(code: ErrorCode) -> RemoteError {
    RemoteError::new(code).at_status(409)
}

pub fn unauthorized() -> RemoteError {
    RemoteError::new(ErrorCode::Unauthorized).at_status(401)
}

/// Lets spawned tasks run until they block.
pub async fn settle() {
    for _ in 0..20 {
        tokio::task::yield_now().await;
    }
}
