// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! In-process remote methods and helpers for tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use tonic::Status;

use crate::config::{ExecutionMode, MethodDescriptor, MethodShape, StageDescriptor};
use crate::engine::{FatalFailure, FatalHandler};
use crate::errors::ConnectError;
use crate::message::{Message, MessageSchema};
use crate::traits::{MethodConnector, RemoteMethod, ResponseStream};

pub const VALUE: &str = "value";

/// A localhost stage descriptor with record-free schemas.
pub fn descriptor(name: &str, shape: MethodShape, mode: ExecutionMode) -> StageDescriptor {
    StageDescriptor {
        name: name.to_string(),
        host: "localhost".to_string(),
        port: 50051,
        method: MethodDescriptor {
            name: format!("test.Service/{}", name),
            shape,
            input: MessageSchema::new("test.Request"),
            output: MessageSchema::new("test.Response"),
        },
        mode,
    }
}

pub fn value(n: f64) -> Message {
    Message::default().with_number(VALUE, n)
}

/// Fails the test on any fatal stage failure.
pub fn panic_on_fatal() -> FatalHandler {
    Arc::new(|failure: &FatalFailure| {
        panic!(
            "unexpected fatal failure in stage '{}': {}",
            failure.stage_name, failure.error
        )
    })
}

/// Records the names of stages that failed fatally.
pub fn recording_fatal() -> (FatalHandler, Arc<Mutex<Vec<String>>>) {
    let failed = Arc::new(Mutex::new(Vec::new()));
    let sink = failed.clone();
    let handler: FatalHandler = Arc::new(move |failure: &FatalFailure| {
        sink.lock().unwrap().push(failure.stage_name.clone());
    });
    (handler, failed)
}

fn unary_only() -> Status {
    Status::unimplemented("stub only implements unary calls")
}

/// Emits `{value: n}` with n counting up from `start` and holding at `limit`.
pub struct CounterMethod {
    next: Mutex<f64>,
    limit: f64,
}

impl CounterMethod {
    pub fn new(start: i64, limit: i64) -> Self {
        Self {
            next: Mutex::new(start as f64),
            limit: limit as f64,
        }
    }
}

#[async_trait]
impl RemoteMethod for CounterMethod {
    async fn invoke_unary(&self, _request: Message) -> Result<Message, Status> {
        let mut next = self.next.lock().unwrap();
        let current = *next;
        *next = (current + 1.0).min(self.limit);
        Ok(value(current))
    }

    async fn invoke_server_streaming(&self, _request: Message) -> Result<ResponseStream, Status> {
        Err(unary_only())
    }
}

/// Answers `{value: v + 1}` for a request `{value: v}`; a missing value is 0.
/// Remembers every `v` it answered. With a limit, a `v` at or above it fails
/// with `OUT_OF_RANGE` instead.
#[derive(Default)]
pub struct AddOneMethod {
    seen: Mutex<Vec<f64>>,
    limit: Option<f64>,
}

impl AddOneMethod {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn up_to(limit: f64) -> Self {
        Self {
            limit: Some(limit),
            ..Self::default()
        }
    }

    pub fn seen(&self) -> Vec<f64> {
        self.seen.lock().unwrap().clone()
    }

    pub fn calls(&self) -> usize {
        self.seen.lock().unwrap().len()
    }
}

#[async_trait]
impl RemoteMethod for AddOneMethod {
    async fn invoke_unary(&self, request: Message) -> Result<Message, Status> {
        let v = request.number(VALUE).unwrap_or(0.0);
        if matches!(self.limit, Some(limit) if v >= limit) {
            return Err(Status::out_of_range(format!("{} reached the limit", v)));
        }
        self.seen.lock().unwrap().push(v);
        Ok(value(v + 1.0))
    }

    async fn invoke_server_streaming(&self, _request: Message) -> Result<ResponseStream, Status> {
        Err(unary_only())
    }
}

/// Keeps every request it receives and echoes it back.
#[derive(Default)]
pub struct RecordingMethod {
    received: Mutex<Vec<Message>>,
}

impl RecordingMethod {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<Message> {
        self.received.lock().unwrap().clone()
    }

    pub fn values(&self) -> Vec<f64> {
        self.messages()
            .iter()
            .filter_map(|message| message.number(VALUE))
            .collect()
    }

    pub fn count(&self) -> usize {
        self.received.lock().unwrap().len()
    }

    /// Poll until at least `count` requests arrived; panics after 5s.
    pub async fn wait_for_count(&self, count: usize) {
        let waited = tokio::time::timeout(Duration::from_secs(5), async {
            while self.count() < count {
                tokio::time::sleep(Duration::from_millis(2)).await;
            }
        })
        .await;
        assert!(
            waited.is_ok(),
            "expected {} requests, got {}",
            count,
            self.count()
        );
    }
}

#[async_trait]
impl RemoteMethod for RecordingMethod {
    async fn invoke_unary(&self, request: Message) -> Result<Message, Status> {
        self.received.lock().unwrap().push(request.clone());
        Ok(request)
    }

    async fn invoke_server_streaming(&self, _request: Message) -> Result<ResponseStream, Status> {
        Err(unary_only())
    }
}

/// Reports the endpoint unavailable for the first `failures` calls, then
/// behaves like [`AddOneMethod`].
pub struct FlakyMethod {
    failures: usize,
    calls: AtomicUsize,
}

impl FlakyMethod {
    pub fn new(failures: usize) -> Self {
        Self {
            failures,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RemoteMethod for FlakyMethod {
    async fn invoke_unary(&self, request: Message) -> Result<Message, Status> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if call < self.failures {
            return Err(Status::unavailable("connection refused"));
        }
        Ok(value(request.number(VALUE).unwrap_or(0.0) + 1.0))
    }

    async fn invoke_server_streaming(&self, _request: Message) -> Result<ResponseStream, Status> {
        Err(unary_only())
    }
}

/// Every call fails with `INTERNAL`.
pub struct FailingMethod;

#[async_trait]
impl RemoteMethod for FailingMethod {
    async fn invoke_unary(&self, _request: Message) -> Result<Message, Status> {
        Err(Status::internal("simulated remote failure"))
    }

    async fn invoke_server_streaming(&self, _request: Message) -> Result<ResponseStream, Status> {
        Err(Status::internal("simulated remote failure"))
    }
}

/// Each call streams `{value: 0} .. {value: per_stream - 1}` and completes,
/// optionally sleeping `interval` before every item.
pub struct StreamingMethod {
    per_stream: usize,
    interval: Duration,
    streams: AtomicUsize,
}

impl StreamingMethod {
    pub fn new(per_stream: usize) -> Self {
        Self {
            per_stream,
            interval: Duration::ZERO,
            streams: AtomicUsize::new(0),
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn streams(&self) -> usize {
        self.streams.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RemoteMethod for StreamingMethod {
    async fn invoke_unary(&self, _request: Message) -> Result<Message, Status> {
        Err(Status::unimplemented("stub only implements streaming calls"))
    }

    async fn invoke_server_streaming(&self, _request: Message) -> Result<ResponseStream, Status> {
        self.streams.fetch_add(1, Ordering::SeqCst);
        let interval = self.interval;
        let items = futures::stream::iter(0..self.per_stream).then(move |n| async move {
            if !interval.is_zero() {
                tokio::time::sleep(interval).await;
            }
            Ok::<_, Status>(value(n as f64))
        });
        Ok(items.boxed())
    }
}

/// Hands out pre-registered methods by stage name.
#[derive(Default)]
pub struct MapConnector {
    methods: HashMap<String, Arc<dyn RemoteMethod>>,
}

impl MapConnector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, stage_name: impl Into<String>, method: Arc<dyn RemoteMethod>) -> Self {
        self.methods.insert(stage_name.into(), method);
        self
    }
}

impl MethodConnector for MapConnector {
    fn connect(&self, descriptor: &StageDescriptor) -> Result<Arc<dyn RemoteMethod>, ConnectError> {
        self.methods
            .get(&descriptor.name)
            .cloned()
            .ok_or_else(|| ConnectError::UnknownMethod {
                stage_name: descriptor.name.clone(),
            })
    }
}
