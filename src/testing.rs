//! Test doubles for exercising assembly without real modules.
//!
//! Recording components write one journal line per observable step, so a
//! test can assert the exact order in which the host drove them:
//!
//! ```text
//! g1 apply identifier
//! g1 apply logging
//! router apply gateways
//! router run
//! g1 core components_loaded
//! ```
//!
//! [`TestModules`] is a [`ModuleSource`] serving recording components under
//! arbitrary paths and counting how often each path was opened.

use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::mpsc;

use crate::assembly::RouteTable;
use crate::component::{
    Component, ComponentOption, Configurable, CoreEvent, Event, Gateway, GatewayOption, Processor,
    ProcessorOption, Router, RouterHandle, RouterOption, CORE_EVENT_BUFFER, ROUTER_ID,
};
use crate::registry::{ModuleError, ModuleExports, ModuleSource};
use crate::types::{BoxError, ModulePath};

const DATA_BUFFER: usize = 16;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Shared, ordered log of test observations.
#[derive(Debug, Clone, Default)]
pub struct Journal {
    entries: Arc<Mutex<Vec<String>>>,
}

impl Journal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, entry: impl Into<String>) {
        lock(&self.entries).push(entry.into());
    }

    /// Snapshot of every entry so far.
    pub fn entries(&self) -> Vec<String> {
        lock(&self.entries).clone()
    }
}

/// Identity, journal and core channel shared by the recording gateway and
/// processor.
fn reject(
    failing_on: Option<&'static str>,
    option: &impl ComponentOption,
) -> Result<(), BoxError> {
    match failing_on {
        Some(name) if name == option.name() => {
            Err(format!("option `{name}` rejected by test component").into())
        }
        _ => Ok(()),
    }
}

#[derive(Debug)]
struct Recorder {
    identifier: String,
    journal: Journal,
    failing_on: Option<&'static str>,
    core_tx: mpsc::Sender<CoreEvent>,
    core_rx: Mutex<Option<mpsc::Receiver<CoreEvent>>>,
}

impl Recorder {
    fn new(journal: Journal) -> Self {
        let (core_tx, core_rx) = mpsc::channel(CORE_EVENT_BUFFER);
        Self {
            identifier: String::new(),
            journal,
            failing_on: None,
            core_tx,
            core_rx: Mutex::new(Some(core_rx)),
        }
    }

    fn check(&self, option: &impl ComponentOption) -> Result<(), BoxError> {
        reject(self.failing_on, option)
    }

    fn applied(&self, name: &str) {
        self.journal
            .record(format!("{} apply {}", self.identifier, name));
    }

    fn drain_core_events(&self) -> Vec<CoreEvent> {
        let mut drained = Vec::new();
        if let Some(rx) = lock(&self.core_rx).as_mut() {
            while let Ok(event) = rx.try_recv() {
                drained.push(event);
            }
        }
        drained
    }

    fn close_core_events(&self) {
        lock(&self.core_rx).take();
    }

    /// Record every core event already delivered, without waiting.
    fn serve(&self) {
        for event in self.drain_core_events() {
            let name = match event {
                CoreEvent::ComponentsLoaded => "components_loaded",
            };
            self.journal
                .record(format!("{} core {}", self.identifier, name));
        }
    }
}

/// Gateway that accepts every option and records what happens to it.
#[derive(Debug)]
pub struct RecordingGateway {
    recorder: Recorder,
    events_tx: mpsc::Sender<Event>,
    events_rx: Mutex<Option<mpsc::Receiver<Event>>>,
}

impl RecordingGateway {
    pub fn new(journal: Journal) -> Self {
        let (events_tx, events_rx) = mpsc::channel(DATA_BUFFER);
        Self {
            recorder: Recorder::new(journal),
            events_tx,
            events_rx: Mutex::new(Some(events_rx)),
        }
    }

    /// Reject the option called `name`.
    pub fn failing_on(mut self, name: &'static str) -> Self {
        self.recorder.failing_on = Some(name);
        self
    }

    /// Queue an outbound event with this gateway as its source.
    pub fn emit(&self, kind: &str, payload: serde_json::Value) -> Result<(), BoxError> {
        let event = Event::new(self.recorder.identifier.clone(), kind, payload);
        self.events_tx.try_send(event)?;
        Ok(())
    }

    pub fn drain_core_events(&self) -> Vec<CoreEvent> {
        self.recorder.drain_core_events()
    }

    /// Drop the receiving half so further core sends fail.
    pub fn close_core_events(&self) {
        self.recorder.close_core_events();
    }
}

impl Configurable for RecordingGateway {
    type Option = GatewayOption;

    fn apply(&mut self, option: GatewayOption) -> Result<(), BoxError> {
        self.recorder.check(&option)?;
        let name = option.name();
        if let GatewayOption::Identifier(identifier) = option {
            self.recorder.identifier = identifier;
        }
        self.recorder.applied(name);
        Ok(())
    }
}

#[async_trait]
impl Component for RecordingGateway {
    fn identifier(&self) -> &str {
        &self.recorder.identifier
    }

    fn core_events(&self) -> mpsc::Sender<CoreEvent> {
        self.recorder.core_tx.clone()
    }

    async fn serve(self: Arc<Self>) -> Result<(), BoxError> {
        self.recorder.serve();
        Ok(())
    }
}

impl Gateway for RecordingGateway {
    fn take_events(&self) -> Option<mpsc::Receiver<Event>> {
        lock(&self.events_rx).take()
    }
}

/// Processor that accepts every option and keeps whatever reaches its inbox.
#[derive(Debug)]
pub struct RecordingProcessor {
    recorder: Recorder,
    router: Option<RouterHandle>,
    inbox_tx: mpsc::Sender<Event>,
    inbox_rx: Mutex<mpsc::Receiver<Event>>,
}

impl RecordingProcessor {
    pub fn new(journal: Journal) -> Self {
        let (inbox_tx, inbox_rx) = mpsc::channel(DATA_BUFFER);
        Self {
            recorder: Recorder::new(journal),
            router: None,
            inbox_tx,
            inbox_rx: Mutex::new(inbox_rx),
        }
    }

    pub fn failing_on(mut self, name: &'static str) -> Self {
        self.recorder.failing_on = Some(name);
        self
    }

    /// Router handle installed by the `router` option, if any.
    pub fn router(&self) -> Option<&RouterHandle> {
        self.router.as_ref()
    }

    /// Events delivered to the inbox since the last call.
    pub fn received(&self) -> Vec<Event> {
        let mut rx = lock(&self.inbox_rx);
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    pub fn drain_core_events(&self) -> Vec<CoreEvent> {
        self.recorder.drain_core_events()
    }

    pub fn close_core_events(&self) {
        self.recorder.close_core_events();
    }
}

impl Configurable for RecordingProcessor {
    type Option = ProcessorOption;

    fn apply(&mut self, option: ProcessorOption) -> Result<(), BoxError> {
        self.recorder.check(&option)?;
        let name = option.name();
        match option {
            ProcessorOption::Identifier(identifier) => self.recorder.identifier = identifier,
            ProcessorOption::Router(handle) => self.router = Some(handle),
            ProcessorOption::Config(_) | ProcessorOption::Logging(_) => {}
        }
        self.recorder.applied(name);
        Ok(())
    }
}

#[async_trait]
impl Component for RecordingProcessor {
    fn identifier(&self) -> &str {
        &self.recorder.identifier
    }

    fn core_events(&self) -> mpsc::Sender<CoreEvent> {
        self.recorder.core_tx.clone()
    }

    async fn serve(self: Arc<Self>) -> Result<(), BoxError> {
        self.recorder.serve();
        Ok(())
    }
}

impl Processor for RecordingProcessor {
    fn inbox(&self) -> mpsc::Sender<Event> {
        self.inbox_tx.clone()
    }
}

/// Router that records its configuration and, when run, serves every wired
/// component once.
#[derive(Debug)]
pub struct RecordingRouter {
    journal: Journal,
    failing_on: Option<&'static str>,
    gateways: Vec<Arc<dyn Gateway>>,
    processors: Vec<Arc<dyn Processor>>,
    routes: RouteTable,
    queue_tx: mpsc::Sender<Event>,
    _queue_rx: mpsc::Receiver<Event>,
}

impl RecordingRouter {
    pub fn new(journal: Journal) -> Self {
        let (queue_tx, queue_rx) = mpsc::channel(DATA_BUFFER);
        Self {
            journal,
            failing_on: None,
            gateways: Vec::new(),
            processors: Vec::new(),
            routes: RouteTable::new(),
            queue_tx,
            _queue_rx: queue_rx,
        }
    }

    pub fn failing_on(mut self, name: &'static str) -> Self {
        self.failing_on = Some(name);
        self
    }

    /// Route table installed by the `routes` option.
    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }
}

impl Configurable for RecordingRouter {
    type Option = RouterOption;

    fn apply(&mut self, option: RouterOption) -> Result<(), BoxError> {
        reject(self.failing_on, &option)?;
        let name = option.name();
        match option {
            RouterOption::Gateways(gateways) => self.gateways = gateways,
            RouterOption::Processors(processors) => self.processors = processors,
            RouterOption::Routes(routes) => self.routes = routes,
            RouterOption::Logging(_) => {}
        }
        self.journal.record(format!("{ROUTER_ID} apply {name}"));
        Ok(())
    }
}

#[async_trait]
impl Router for RecordingRouter {
    fn handle(&self) -> RouterHandle {
        RouterHandle::new(self.queue_tx.clone())
    }

    async fn run(self: Box<Self>) -> Result<(), BoxError> {
        self.journal.record(format!("{ROUTER_ID} run"));
        for gateway in &self.gateways {
            Arc::clone(gateway).serve().await?;
        }
        for processor in &self.processors {
            Arc::clone(processor).serve().await?;
        }
        Ok(())
    }
}

type ExportsFn = Arc<dyn Fn() -> ModuleExports + Send + Sync>;

/// In-memory module backend.
#[derive(Clone, Default)]
pub struct TestModules {
    modules: HashMap<String, ExportsFn>,
    opened: Arc<Mutex<HashMap<String, usize>>>,
}

impl TestModules {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `exports()` under `path`.
    pub fn with_exports<F>(mut self, path: &str, exports: F) -> Self
    where
        F: Fn() -> ModuleExports + Send + Sync + 'static,
    {
        self.modules.insert(path.to_string(), Arc::new(exports));
        self
    }

    /// Serve a [`RecordingGateway`] writing to `journal` under `path`.
    pub fn with_gateway(self, path: &str, journal: Journal) -> Self {
        self.with_exports(path, move || {
            let journal = journal.clone();
            ModuleExports::new().with_gateway(move || {
                Ok(Box::new(RecordingGateway::new(journal.clone())) as Box<dyn Gateway>)
            })
        })
    }

    pub fn with_processor(self, path: &str, journal: Journal) -> Self {
        self.with_exports(path, move || {
            let journal = journal.clone();
            ModuleExports::new().with_processor(move || {
                Ok(Box::new(RecordingProcessor::new(journal.clone())) as Box<dyn Processor>)
            })
        })
    }

    pub fn with_router(self, path: &str, journal: Journal) -> Self {
        self.with_exports(path, move || {
            let journal = journal.clone();
            ModuleExports::new().with_router(move || {
                Ok(Box::new(RecordingRouter::new(journal.clone())) as Box<dyn Router>)
            })
        })
    }

    /// How many times the backend was asked to open `path`.
    pub fn opened(&self, path: &str) -> usize {
        lock(&self.opened).get(path).copied().unwrap_or(0)
    }
}

impl fmt::Debug for TestModules {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut paths: Vec<&String> = self.modules.keys().collect();
        paths.sort();
        f.debug_struct("TestModules")
            .field("modules", &paths)
            .finish_non_exhaustive()
    }
}

impl ModuleSource for TestModules {
    fn open(&self, path: &ModulePath) -> Result<ModuleExports, ModuleError> {
        *lock(&self.opened)
            .entry(path.as_str().to_string())
            .or_insert(0) += 1;
        self.modules
            .get(path.as_str())
            .map(|exports| exports())
            .ok_or(ModuleError::NotFound)
    }
}
