//! Fan-out router.
//!
//! Every gateway's event stream is pumped into one central queue, together
//! with whatever processors enqueue through their [`RouterHandle`]. Each
//! queued event is copied to the inbox of every destination its source is
//! routed to.
//!
//! ```text
//!   gateway ─pump─┐
//!   gateway ─pump─┼─▶ queue ─▶ routes[source] ─▶ processor inboxes
//!   processor ────┘
//! ```
//!
//! The router runs until Ctrl-C or until its shutdown token is cancelled.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::assembly::RouteTable;
use crate::component::{
    Component, Configurable, Event, Gateway, Processor, Router, RouterHandle, RouterOption,
};
use crate::observability::LogSink;
use crate::types::BoxError;

const QUEUE_BUFFER: usize = 256;

#[derive(Debug)]
pub struct BasicRouter {
    log: LogSink,
    gateways: Vec<Arc<dyn Gateway>>,
    processors: Vec<Arc<dyn Processor>>,
    routes: RouteTable,
    queue_tx: mpsc::Sender<Event>,
    queue_rx: mpsc::Receiver<Event>,
    shutdown: CancellationToken,
}

impl BasicRouter {
    pub fn new() -> Self {
        let (queue_tx, queue_rx) = mpsc::channel(QUEUE_BUFFER);
        Self {
            log: LogSink::current(),
            gateways: Vec::new(),
            processors: Vec::new(),
            routes: RouteTable::new(),
            queue_tx,
            queue_rx,
            shutdown: CancellationToken::new(),
        }
    }

    /// Token that stops `run` when cancelled.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }
}

impl Default for BasicRouter {
    fn default() -> Self {
        Self::new()
    }
}

impl Configurable for BasicRouter {
    type Option = RouterOption;

    fn apply(&mut self, option: RouterOption) -> Result<(), BoxError> {
        match option {
            RouterOption::Gateways(gateways) => self.gateways = gateways,
            RouterOption::Processors(processors) => self.processors = processors,
            RouterOption::Routes(routes) => self.routes = routes,
            RouterOption::Logging(log) => self.log = log,
        }
        Ok(())
    }
}

#[async_trait]
impl Router for BasicRouter {
    fn handle(&self) -> RouterHandle {
        RouterHandle::new(self.queue_tx.clone())
    }

    async fn run(self: Box<Self>) -> Result<(), BoxError> {
        let BasicRouter {
            log,
            gateways,
            processors,
            routes,
            queue_tx,
            mut queue_rx,
            shutdown,
        } = *self;

        let inboxes: HashMap<String, mpsc::Sender<Event>> = processors
            .iter()
            .map(|p| (p.identifier().to_string(), p.inbox()))
            .collect();

        let mut tasks: Vec<JoinHandle<()>> = Vec::new();
        for gateway in &gateways {
            if let Some(events) = gateway.take_events() {
                tasks.push(tokio::spawn(log.attach(pump(
                    gateway.identifier().to_string(),
                    events,
                    queue_tx.clone(),
                ))));
            }
            tasks.push(spawn_serve(&log, Arc::clone(gateway)));
        }
        for processor in &processors {
            tasks.push(spawn_serve(&log, Arc::clone(processor)));
        }
        drop(queue_tx);

        let interrupt = shutdown.clone();
        tasks.push(tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                interrupt.cancel();
            }
        }));

        let dispatcher = log.attach(async {
            tracing::info!(
                gateways = gateways.len(),
                processors = processors.len(),
                routes = routes.len(),
                "Router running"
            );
            let mut dispatched = 0usize;
            loop {
                tokio::select! {
                    _ = shutdown.cancelled() => break,
                    next = queue_rx.recv() => match next {
                        Some(event) => dispatched += dispatch(&routes, &inboxes, event),
                        None => break,
                    },
                }
            }
            tracing::info!(dispatched, "Router stopped");
        });
        dispatcher.await;

        shutdown.cancel();
        for task in tasks {
            task.abort();
        }
        Ok(())
    }
}

fn spawn_serve<C>(log: &LogSink, component: Arc<C>) -> JoinHandle<()>
where
    C: Component + ?Sized + 'static,
{
    tokio::spawn(log.attach(async move {
        let identifier = component.identifier().to_string();
        if let Err(e) = component.serve().await {
            tracing::error!(component = %identifier, error = %e, "Component stopped with error");
        }
    }))
}

async fn pump(source: String, mut events: mpsc::Receiver<Event>, queue: mpsc::Sender<Event>) {
    while let Some(event) = events.recv().await {
        if queue.send(event).await.is_err() {
            break;
        }
    }
    tracing::debug!(gateway = %source, "Gateway event stream ended");
}

/// Deliver `event` to every destination of its source. Returns the number of
/// inboxes reached. A full inbox drops its copy so the queue keeps draining.
fn dispatch(
    routes: &RouteTable,
    inboxes: &HashMap<String, mpsc::Sender<Event>>,
    event: Event,
) -> usize {
    let Some(destinations) = routes.destinations(&event.source) else {
        tracing::debug!(source = %event.source, kind = %event.kind, "No route for event source");
        return 0;
    };

    let mut delivered = 0;
    for destination in destinations {
        match inboxes.get(destination) {
            Some(inbox) => match inbox.try_send(event.clone()) {
                Ok(()) => delivered += 1,
                Err(TrySendError::Full(_)) => tracing::warn!(
                    processor = %destination,
                    kind = %event.kind,
                    "Processor inbox full, event dropped"
                ),
                Err(TrySendError::Closed(_)) => {
                    tracing::warn!(processor = %destination, "Processor inbox closed")
                }
            },
            None => tracing::warn!(
                source = %event.source,
                destination = %destination,
                "Route destination does not name any configured processor"
            ),
        }
    }
    delivered
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assembly::build_routes;
    use crate::component::{GatewayOption, ProcessorOption};
    use crate::testing::{Journal, RecordingGateway, RecordingProcessor};
    use crate::types::RouteConfig;
    use std::time::Duration;

    fn gateway(id: &str) -> Arc<RecordingGateway> {
        let mut g = RecordingGateway::new(Journal::new());
        g.apply(GatewayOption::Identifier(id.to_string())).unwrap();
        Arc::new(g)
    }

    fn processor(id: &str) -> Arc<RecordingProcessor> {
        let mut p = RecordingProcessor::new(Journal::new());
        p.apply(ProcessorOption::Identifier(id.to_string())).unwrap();
        Arc::new(p)
    }

    fn route(source: &str, destinations: &[&str]) -> RouteConfig {
        RouteConfig {
            source: source.to_string(),
            destinations: destinations.iter().map(|d| d.to_string()).collect(),
        }
    }

    fn wired(
        gateways: Vec<Arc<dyn Gateway>>,
        processors: Vec<Arc<dyn Processor>>,
        routes: &[RouteConfig],
    ) -> BasicRouter {
        let mut router = BasicRouter::new();
        router.apply(RouterOption::Logging(LogSink::discard())).unwrap();
        router.apply(RouterOption::Gateways(gateways)).unwrap();
        router.apply(RouterOption::Processors(processors)).unwrap();
        router
            .apply(RouterOption::Routes(build_routes(routes)))
            .unwrap();
        router
    }

    async fn wait_for_events(processor: &RecordingProcessor, count: usize) -> Vec<Event> {
        let mut events = Vec::new();
        tokio::time::timeout(Duration::from_secs(2), async {
            while events.len() < count {
                events.extend(processor.received());
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .unwrap();
        events
    }

    #[tokio::test]
    async fn test_fans_out_to_every_destination() {
        let g1 = gateway("g1");
        let (p1, p2) = (processor("p1"), processor("p2"));
        let router = wired(
            vec![g1.clone() as Arc<dyn Gateway>],
            vec![p1.clone() as Arc<dyn Processor>, p2.clone()],
            &[route("g1", &["p1", "p2"])],
        );
        let shutdown = router.shutdown_token();

        g1.emit("console.line", serde_json::json!({"text": "hi"}))
            .unwrap();
        let running = tokio::spawn(Box::new(router).run());

        let first = wait_for_events(&p1, 1).await;
        let second = wait_for_events(&p2, 1).await;
        assert_eq!(first[0].source, "g1");
        assert_eq!(second[0].payload, serde_json::json!({"text": "hi"}));

        shutdown.cancel();
        running.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_processor_events_follow_routes() {
        let g1 = gateway("g1");
        let (p1, p2) = (processor("p1"), processor("p2"));
        let router = wired(
            vec![g1 as Arc<dyn Gateway>],
            vec![p1.clone() as Arc<dyn Processor>, p2.clone()],
            &[route("g1", &["p1"]), route("p1", &["p2", "ghost"])],
        );
        let handle = router.handle();
        let shutdown = router.shutdown_token();
        let running = tokio::spawn(Box::new(router).run());

        handle
            .enqueue(Event::new("p1", "reply", serde_json::json!({})))
            .await
            .unwrap();
        handle
            .enqueue(Event::new("nobody", "noise", serde_json::json!({})))
            .await
            .unwrap();

        let events = wait_for_events(&p2, 1).await;
        assert_eq!(events[0].kind, "reply");
        assert!(p1.received().is_empty());

        shutdown.cancel();
        running.await.unwrap().unwrap();
        assert!(handle.is_closed());
    }

    #[tokio::test]
    async fn test_full_inbox_does_not_stall_routing() {
        let (p1, p2) = (processor("p1"), processor("p2"));
        let router = wired(
            Vec::new(),
            vec![p1.clone() as Arc<dyn Processor>, p2.clone()],
            &[route("p1", &["p1", "p2"])],
        );
        let handle = router.handle();
        let shutdown = router.shutdown_token();
        let running = tokio::spawn(Box::new(router).run());

        // p1 routes to itself and never reads its inbox.
        for n in 0..40 {
            handle
                .enqueue(Event::new("p1", "tick", serde_json::json!({ "n": n })))
                .await
                .unwrap();
            let events = wait_for_events(&p2, 1).await;
            assert_eq!(events[0].payload, serde_json::json!({ "n": n }));
        }
        let looped = p1.received();
        assert!(!looped.is_empty() && looped.len() < 40);

        shutdown.cancel();
        running.await.unwrap().unwrap();
    }
}
