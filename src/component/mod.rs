//! Component capabilities.
//!
//! Every module provides one or more of three component kinds:
//!
//! ```text
//!   Gateway ──events──▶ Router ──events──▶ Processor
//!                         ▲                    │
//!                         └──── RouterHandle ──┘
//! ```
//!
//! Gateways and processors expose an inbound [`CoreEvent`] channel through
//! which the host announces lifecycle transitions. All kinds are configured
//! through [`Configurable`], one tagged option at a time.

mod events;
mod options;

pub use events::{CoreEvent, Event, RouterHandle, CORE_EVENT_BUFFER};
pub use options::{ComponentOption, GatewayOption, ProcessorOption, RouterOption};

use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;

use crate::types::BoxError;

/// Identifier the host uses for the router in logs and errors.
pub const ROUTER_ID: &str = "router";

/// A component that accepts tagged configuration options.
pub trait Configurable {
    type Option: ComponentOption;

    /// Apply one option. Returning an error aborts assembly of this component.
    fn apply(&mut self, option: Self::Option) -> Result<(), BoxError>;
}

/// Capabilities shared by gateways and processors.
#[async_trait]
pub trait Component: Send + Sync + fmt::Debug {
    fn identifier(&self) -> &str;

    /// Sender half of the component's inbound core event channel.
    fn core_events(&self) -> mpsc::Sender<CoreEvent>;

    /// Drive the component until its inputs close. Spawned by the router once
    /// startup has been broadcast.
    async fn serve(self: Arc<Self>) -> Result<(), BoxError>;
}

/// A message source adapter.
pub trait Gateway: Component + Configurable<Option = GatewayOption> {
    /// Take the outbound event stream. Returns `None` once taken.
    fn take_events(&self) -> Option<mpsc::Receiver<Event>>;
}

/// A message transformer.
pub trait Processor: Component + Configurable<Option = ProcessorOption> {
    /// Sender half of the processor's data-plane inbox.
    fn inbox(&self) -> mpsc::Sender<Event>;
}

/// The central dispatcher. Consumed by `run`.
#[async_trait]
pub trait Router: Configurable<Option = RouterOption> + Send + fmt::Debug {
    /// Handle processors use to enqueue events onto this router.
    fn handle(&self) -> RouterHandle;

    async fn run(self: Box<Self>) -> Result<(), BoxError>;
}

/// Returned by components for options they do not understand.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("option `{0}` is not supported by this component")]
pub struct UnsupportedOption(pub &'static str);

impl UnsupportedOption {
    pub fn of(option: &impl ComponentOption) -> Self {
        Self(option.name())
    }
}
