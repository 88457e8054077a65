//! Startup broadcast.
//!
//! Once the router is fully wired, every gateway and then every processor
//! receives exactly one `ComponentsLoaded` event. Sends are awaited one at a
//! time in list order; a full channel suspends the broadcast until its
//! component drains it. There is no timeout.

use std::sync::Arc;

use crate::component::{Component, CoreEvent, Gateway, Processor};
use crate::types::{Error, Result};

/// Send `ComponentsLoaded` to every component. Returns the number of events
/// delivered.
pub async fn broadcast(
    gateways: &[Arc<dyn Gateway>],
    processors: &[Arc<dyn Processor>],
) -> Result<usize> {
    let mut delivered = 0;

    for gateway in gateways {
        notify(gateway.as_ref()).await?;
        delivered += 1;
    }
    for processor in processors {
        notify(processor.as_ref()).await?;
        delivered += 1;
    }

    tracing::info!(delivered, "Broadcast components loaded");
    Ok(delivered)
}

async fn notify<C: Component + ?Sized>(component: &C) -> Result<()> {
    let identifier = component.identifier();
    tracing::debug!(component = identifier, "Sending components loaded");
    component
        .core_events()
        .send(CoreEvent::ComponentsLoaded)
        .await
        .map_err(|_| Error::lifecycle(identifier))
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::Configurable;
    use crate::testing::{Journal, RecordingGateway, RecordingProcessor};
    use std::time::Duration;

    fn named_gateway(journal: &Journal, id: &str) -> RecordingGateway {
        let mut gateway = RecordingGateway::new(journal.clone());
        gateway
            .apply(crate::component::GatewayOption::Identifier(id.to_string()))
            .unwrap();
        gateway
    }

    fn named_processor(journal: &Journal, id: &str) -> RecordingProcessor {
        let mut processor = RecordingProcessor::new(journal.clone());
        processor
            .apply(crate::component::ProcessorOption::Identifier(id.to_string()))
            .unwrap();
        processor
    }

    #[tokio::test]
    async fn test_every_component_gets_one_event() {
        let journal = Journal::new();
        let g1 = Arc::new(named_gateway(&journal, "g1"));
        let g2 = Arc::new(named_gateway(&journal, "g2"));
        let p1 = Arc::new(named_processor(&journal, "p1"));

        let gateways: Vec<Arc<dyn Gateway>> = vec![g1.clone(), g2.clone()];
        let processors: Vec<Arc<dyn Processor>> = vec![p1.clone()];

        let delivered = broadcast(&gateways, &processors).await.unwrap();

        assert_eq!(delivered, 3);
        assert_eq!(g1.drain_core_events(), vec![CoreEvent::ComponentsLoaded]);
        assert_eq!(g2.drain_core_events(), vec![CoreEvent::ComponentsLoaded]);
        assert_eq!(p1.drain_core_events(), vec![CoreEvent::ComponentsLoaded]);
    }

    #[tokio::test]
    async fn test_closed_channel_is_lifecycle_error() {
        let journal = Journal::new();
        let gateway = named_gateway(&journal, "g1");
        gateway.close_core_events();
        let gateways: Vec<Arc<dyn Gateway>> = vec![Arc::new(gateway)];

        let err = broadcast(&gateways, &[]).await.unwrap_err();
        assert!(matches!(err, Error::Lifecycle { component } if component == "g1"));
    }

    #[tokio::test]
    async fn test_full_channel_waits_for_consumer() {
        let journal = Journal::new();
        let g1 = Arc::new(named_gateway(&journal, "g1"));

        // Occupy the single slot so the broadcast has to wait.
        g1.core_events()
            .try_send(CoreEvent::ComponentsLoaded)
            .unwrap();

        let gateways: Vec<Arc<dyn Gateway>> = vec![g1.clone()];
        let pending = tokio::spawn(async move { broadcast(&gateways, &[]).await });

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!pending.is_finished());

        assert_eq!(g1.drain_core_events().len(), 1);
        let delivered = pending.await.unwrap().unwrap();
        assert_eq!(delivered, 1);
    }
}
