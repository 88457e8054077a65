//! Console gateway: one event per line typed on standard input.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use crate::component::{
    Component, Configurable, CoreEvent, Event, Gateway, GatewayOption, UnsupportedOption,
    CORE_EVENT_BUFFER,
};
use crate::observability::LogSink;
use crate::types::BoxError;

/// Event kind produced for each input line.
pub const LINE_EVENT: &str = "console.line";

const EVENT_BUFFER: usize = 64;

/// Reads stdin once startup has been broadcast. Accepts only the identifier
/// and logging options.
#[derive(Debug)]
pub struct ConsoleGateway {
    identifier: String,
    log: LogSink,
    core_tx: mpsc::Sender<CoreEvent>,
    core_rx: Mutex<Option<mpsc::Receiver<CoreEvent>>>,
    events_tx: mpsc::Sender<Event>,
    events_rx: Mutex<Option<mpsc::Receiver<Event>>>,
}

impl ConsoleGateway {
    pub fn new() -> Self {
        let (core_tx, core_rx) = mpsc::channel(CORE_EVENT_BUFFER);
        let (events_tx, events_rx) = mpsc::channel(EVENT_BUFFER);
        Self {
            identifier: String::new(),
            log: LogSink::current(),
            core_tx,
            core_rx: Mutex::new(Some(core_rx)),
            events_tx,
            events_rx: Mutex::new(Some(events_rx)),
        }
    }

    /// Forward each non-blank line of `reader` as a [`LINE_EVENT`]. Returns
    /// the number of events sent.
    async fn pump_lines<R>(&self, reader: R) -> Result<usize, BoxError>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut lines = reader.lines();
        let mut sent = 0;
        while let Some(line) = lines.next_line().await? {
            let text = line.trim_end();
            if text.is_empty() {
                continue;
            }
            let event = Event::new(
                self.identifier.clone(),
                LINE_EVENT,
                serde_json::json!({ "text": text }),
            );
            if self.events_tx.send(event).await.is_err() {
                tracing::debug!(gateway = %self.identifier, "Event stream dropped");
                break;
            }
            sent += 1;
        }
        Ok(sent)
    }
}

impl Default for ConsoleGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl Configurable for ConsoleGateway {
    type Option = GatewayOption;

    fn apply(&mut self, option: GatewayOption) -> Result<(), BoxError> {
        match option {
            GatewayOption::Identifier(identifier) => self.identifier = identifier,
            GatewayOption::Logging(log) => self.log = log,
            other => return Err(UnsupportedOption::of(&other).into()),
        }
        Ok(())
    }
}

#[async_trait]
impl Component for ConsoleGateway {
    fn identifier(&self) -> &str {
        &self.identifier
    }

    fn core_events(&self) -> mpsc::Sender<CoreEvent> {
        self.core_tx.clone()
    }

    async fn serve(self: Arc<Self>) -> Result<(), BoxError> {
        let core_rx = self
            .core_rx
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take();
        let Some(mut core_rx) = core_rx else {
            return Ok(());
        };

        let log = self.log.clone();
        log.attach(async move {
            match core_rx.recv().await {
                Some(CoreEvent::ComponentsLoaded) => {}
                None => return Ok(()),
            }
            tracing::info!(gateway = %self.identifier, "Reading standard input");

            let sent = self.pump_lines(BufReader::new(tokio::io::stdin())).await?;
            tracing::info!(gateway = %self.identifier, sent, "Standard input closed");
            Ok::<(), BoxError>(())
        })
        .await
    }
}

impl Gateway for ConsoleGateway {
    fn take_events(&self) -> Option<mpsc::Receiver<Event>> {
        self.events_rx
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::ComponentOption;

    fn console(identifier: &str) -> ConsoleGateway {
        let mut gateway = ConsoleGateway::new();
        gateway
            .apply(GatewayOption::Identifier(identifier.to_string()))
            .unwrap();
        gateway
            .apply(GatewayOption::Logging(LogSink::discard()))
            .unwrap();
        gateway
    }

    #[test]
    fn test_rejects_network_options() {
        let mut gateway = ConsoleGateway::new();
        let option = GatewayOption::Nick("emersyx".to_string());
        assert_eq!(option.name(), "nick");

        let err = gateway.apply(option).unwrap_err();
        let unsupported = err.downcast_ref::<UnsupportedOption>().unwrap();
        assert_eq!(*unsupported, UnsupportedOption("nick"));
    }

    #[tokio::test]
    async fn test_lines_become_events() {
        let gateway = console("console");
        let mut events = gateway.take_events().unwrap();

        let sent = gateway
            .pump_lines(&b"hello\n\n  \nworld\r\n"[..])
            .await
            .unwrap();

        assert_eq!(sent, 2);
        let first = events.recv().await.unwrap();
        assert_eq!(first.source, "console");
        assert_eq!(first.kind, LINE_EVENT);
        assert_eq!(first.payload, serde_json::json!({ "text": "hello" }));
        let second = events.recv().await.unwrap();
        assert_eq!(second.payload, serde_json::json!({ "text": "world" }));
    }

    #[test]
    fn test_events_taken_once() {
        let gateway = console("console");
        assert!(gateway.take_events().is_some());
        assert!(gateway.take_events().is_none());
    }
}
