//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::fmt;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use parrot_server::config::loader::{DB_NAME_VAR, DB_URL_VAR, DOMAIN_VAR, SIGNING_KEY_VAR};
use parrot_server::config::{DatastoreConfig, ListenerConfig};
use parrot_server::datastore::{Datastore, DatastoreError};
use parrot_server::lifecycle::{Collaborators, Shutdown};
use parrot_server::net::{Listener, ListenerError};
use tracing::field::{Field, Visit};
use tracing::span::{Attributes, Id};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;

/// One recorded tracing event, with the fields of its enclosing spans.
#[derive(Debug, Clone)]
pub struct CapturedEvent {
    pub level: Level,
    pub message: String,
    pub fields: HashMap<String, String>,
}

impl CapturedEvent {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }
}

/// Layer recording every event for later assertions.
#[derive(Clone, Default)]
pub struct LogCapture {
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

impl LogCapture {
    /// Install as the current thread's subscriber until the guard drops.
    pub fn install(&self) -> tracing::subscriber::DefaultGuard {
        tracing_subscriber::registry().with(self.clone()).set_default()
    }

    pub fn events(&self) -> Vec<CapturedEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn with_message(&self, message: &str) -> Vec<CapturedEvent> {
        self.events()
            .into_iter()
            .filter(|e| e.message == message)
            .collect()
    }
}

struct SpanFields(HashMap<String, String>);

impl<S> Layer<S> for LogCapture
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_new_span(&self, attrs: &Attributes<'_>, id: &Id, ctx: Context<'_, S>) {
        let mut visitor = FieldVisitor::default();
        attrs.record(&mut visitor);

        if let Some(span) = ctx.span(id) {
            span.extensions_mut().insert(SpanFields(visitor.fields));
        }
    }

    fn on_event(&self, event: &Event<'_>, ctx: Context<'_, S>) {
        let mut fields = HashMap::new();
        if let Some(scope) = ctx.event_scope(event) {
            for span in scope.from_root() {
                if let Some(span_fields) = span.extensions().get::<SpanFields>() {
                    fields.extend(span_fields.0.clone());
                }
            }
        }

        let mut visitor = FieldVisitor::default();
        event.record(&mut visitor);
        fields.extend(visitor.fields);

        self.events.lock().unwrap().push(CapturedEvent {
            level: *event.metadata().level(),
            message: visitor.message,
            fields,
        });
    }
}

#[derive(Default)]
struct FieldVisitor {
    message: String,
    fields: HashMap<String, String>,
}

impl Visit for FieldVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.store(field, value.to_string());
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.store(field, format!("{:?}", value));
    }
}

impl FieldVisitor {
    fn store(&mut self, field: &Field, value: String) {
        if field.name() == "message" {
            self.message = value;
        } else {
            self.fields.insert(field.name().to_string(), value);
        }
    }
}

/// Environment with all four required variables set.
pub fn valid_env() -> HashMap<String, String> {
    [
        (DB_NAME_VAR, "postgres"),
        (DB_URL_VAR, "postgres://parrot:secret@db:5432/parrot"),
        (SIGNING_KEY_VAR, "test-signing-key"),
        (DOMAIN_VAR, "parrot.test"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

/// Datastore that fails a fixed number of pings before answering.
pub struct FakeDatastore {
    failures_before_ready: u32,
    pings: AtomicU32,
    closes: AtomicU32,
}

impl FakeDatastore {
    pub fn failing(failures_before_ready: u32) -> Arc<Self> {
        Arc::new(Self {
            failures_before_ready,
            pings: AtomicU32::new(0),
            closes: AtomicU32::new(0),
        })
    }

    pub fn ready() -> Arc<Self> {
        Self::failing(0)
    }

    pub fn never_ready() -> Arc<Self> {
        Self::failing(u32::MAX)
    }

    pub fn pings(&self) -> u32 {
        self.pings.load(Ordering::SeqCst)
    }

    pub fn closes(&self) -> u32 {
        self.closes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Datastore for FakeDatastore {
    fn name(&self) -> &str {
        "fake"
    }

    async fn ping(&self) -> Result<(), DatastoreError> {
        let n = self.pings.fetch_add(1, Ordering::SeqCst);
        if n < self.failures_before_ready {
            Err(DatastoreError::Unreachable(format!(
                "connection refused (attempt {})",
                n + 1
            )))
        } else {
            Ok(())
        }
    }

    async fn close(&self) {
        self.closes.fetch_add(1, Ordering::SeqCst);
    }
}

/// Collaborators that count calls and bind to an ephemeral loopback port.
pub struct FakeCollaborators {
    pub datastore: Arc<FakeDatastore>,
    fail_bind: bool,
    shutdown_on_open: Option<Arc<Shutdown>>,
    opens: AtomicU32,
    binds: AtomicU32,
    requested_address: Mutex<Option<String>>,
    bound_address: Mutex<Option<SocketAddr>>,
}

impl FakeCollaborators {
    pub fn new(datastore: Arc<FakeDatastore>) -> Self {
        Self {
            datastore,
            fail_bind: false,
            shutdown_on_open: None,
            opens: AtomicU32::new(0),
            binds: AtomicU32::new(0),
            requested_address: Mutex::new(None),
            bound_address: Mutex::new(None),
        }
    }

    pub fn with_failing_bind(mut self) -> Self {
        self.fail_bind = true;
        self
    }

    /// Fire `shutdown` while boot is still opening the datastore.
    pub fn with_shutdown_on_open(mut self, shutdown: Arc<Shutdown>) -> Self {
        self.shutdown_on_open = Some(shutdown);
        self
    }

    pub fn opens(&self) -> u32 {
        self.opens.load(Ordering::SeqCst)
    }

    pub fn binds(&self) -> u32 {
        self.binds.load(Ordering::SeqCst)
    }

    pub fn requested_address(&self) -> Option<String> {
        self.requested_address.lock().unwrap().clone()
    }

    /// Wait until boot has bound its listener.
    pub async fn bound_address(&self) -> SocketAddr {
        loop {
            if let Some(addr) = *self.bound_address.lock().unwrap() {
                return addr;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }
}

#[async_trait]
impl Collaborators for FakeCollaborators {
    fn open_datastore(&self, _config: &DatastoreConfig) -> Result<Arc<dyn Datastore>, DatastoreError> {
        self.opens.fetch_add(1, Ordering::SeqCst);
        if let Some(shutdown) = &self.shutdown_on_open {
            shutdown.trigger();
        }
        Ok(self.datastore.clone() as Arc<dyn Datastore>)
    }

    async fn bind(&self, config: &ListenerConfig) -> Result<Listener, ListenerError> {
        self.binds.fetch_add(1, Ordering::SeqCst);
        *self.requested_address.lock().unwrap() = Some(config.bind_address.clone());

        if self.fail_bind {
            return Err(ListenerError::Bind(std::io::Error::new(
                std::io::ErrorKind::AddrInUse,
                "address already in use",
            )));
        }

        let listener = Listener::bind(&ListenerConfig {
            bind_address: "127.0.0.1:0".to_string(),
            max_connections: config.max_connections,
        })
        .await?;
        *self.bound_address.lock().unwrap() = listener.local_addr().ok();
        Ok(listener)
    }
}
