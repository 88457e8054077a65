//! Log processor: writes every routed event to the log sink.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

use crate::component::{
    Component, Configurable, CoreEvent, Event, Processor, ProcessorOption, RouterHandle,
    CORE_EVENT_BUFFER,
};
use crate::observability::LogSink;
use crate::types::BoxError;

const INBOX_BUFFER: usize = 64;

#[derive(Debug)]
pub struct LogProcessor {
    identifier: String,
    config: Option<PathBuf>,
    router: Option<RouterHandle>,
    log: LogSink,
    core_tx: mpsc::Sender<CoreEvent>,
    core_rx: Mutex<Option<mpsc::Receiver<CoreEvent>>>,
    inbox_tx: mpsc::Sender<Event>,
    inbox_rx: Mutex<Option<mpsc::Receiver<Event>>>,
    handled: AtomicUsize,
}

impl LogProcessor {
    pub fn new() -> Self {
        let (core_tx, core_rx) = mpsc::channel(CORE_EVENT_BUFFER);
        let (inbox_tx, inbox_rx) = mpsc::channel(INBOX_BUFFER);
        Self {
            identifier: String::new(),
            config: None,
            router: None,
            log: LogSink::current(),
            core_tx,
            core_rx: Mutex::new(Some(core_rx)),
            inbox_tx,
            inbox_rx: Mutex::new(Some(inbox_rx)),
            handled: AtomicUsize::new(0),
        }
    }

    pub fn config_path(&self) -> Option<&Path> {
        self.config.as_deref()
    }

    pub fn router(&self) -> Option<&RouterHandle> {
        self.router.as_ref()
    }

    /// Number of events logged so far.
    pub fn handled(&self) -> usize {
        self.handled.load(Ordering::Relaxed)
    }

    fn handle(&self, event: &Event) {
        tracing::info!(
            processor = %self.identifier,
            source = %event.source,
            kind = %event.kind,
            payload = %event.payload,
            "Received event"
        );
        self.handled.fetch_add(1, Ordering::Relaxed);
    }

    fn take<T>(slot: &Mutex<Option<T>>) -> Option<T> {
        slot.lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take()
    }
}

impl Default for LogProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl Configurable for LogProcessor {
    type Option = ProcessorOption;

    fn apply(&mut self, option: ProcessorOption) -> Result<(), BoxError> {
        match option {
            ProcessorOption::Identifier(identifier) => self.identifier = identifier,
            ProcessorOption::Config(path) => self.config = Some(path),
            ProcessorOption::Router(handle) => self.router = Some(handle),
            ProcessorOption::Logging(log) => self.log = log,
        }
        Ok(())
    }
}

#[async_trait]
impl Component for LogProcessor {
    fn identifier(&self) -> &str {
        &self.identifier
    }

    fn core_events(&self) -> mpsc::Sender<CoreEvent> {
        self.core_tx.clone()
    }

    async fn serve(self: Arc<Self>) -> Result<(), BoxError> {
        let (Some(mut core_rx), Some(mut inbox_rx)) =
            (Self::take(&self.core_rx), Self::take(&self.inbox_rx))
        else {
            return Ok(());
        };

        let log = self.log.clone();
        log.attach(async move {
            // Events routed before startup wait in the inbox.
            if core_rx.recv().await.is_none() {
                return;
            }
            tracing::info!(
                processor = %self.identifier,
                config = ?self.config,
                "Logging routed events"
            );

            while let Some(event) = inbox_rx.recv().await {
                self.handle(&event);
            }
        })
        .await;
        Ok(())
    }
}

impl Processor for LogProcessor {
    fn inbox(&self) -> mpsc::Sender<Event> {
        self.inbox_tx.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn processor(identifier: &str) -> LogProcessor {
        let mut processor = LogProcessor::new();
        processor
            .apply(ProcessorOption::Identifier(identifier.to_string()))
            .unwrap();
        processor
            .apply(ProcessorOption::Logging(LogSink::discard()))
            .unwrap();
        processor
    }

    #[test]
    fn test_options_are_stored() {
        let (tx, _rx) = mpsc::channel(1);
        let mut processor = processor("p1");
        processor
            .apply(ProcessorOption::Config(PathBuf::from("p1.toml")))
            .unwrap();
        processor
            .apply(ProcessorOption::Router(RouterHandle::new(tx)))
            .unwrap();

        assert_eq!(processor.identifier(), "p1");
        assert_eq!(processor.config_path(), Some(Path::new("p1.toml")));
        assert!(processor.router().is_some());
    }

    #[tokio::test]
    async fn test_events_handled_after_startup() {
        let processor = Arc::new(processor("p1"));
        processor
            .inbox()
            .send(Event::new("g1", "console.line", serde_json::json!({})))
            .await
            .unwrap();

        let task = tokio::spawn(Arc::clone(&processor).serve());
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(processor.handled(), 0);

        processor
            .core_events()
            .send(CoreEvent::ComponentsLoaded)
            .await
            .unwrap();
        tokio::time::timeout(Duration::from_secs(2), async {
            while processor.handled() == 0 {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .unwrap();

        task.abort();
    }
}
