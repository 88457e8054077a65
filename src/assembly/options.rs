//! Option protocol: turns configuration records into ordered option lists
//! and applies them.
//!
//! Ordering rules, for every kind:
//!   1. identifier first, so later failures can name the component
//!   2. one option per present field, in declaration order; absent fields are
//!      skipped and leave the component default in place
//!   3. logging last

use std::sync::Arc;

use crate::assembly::RouteTable;
use crate::component::{
    ComponentOption, Configurable, Gateway, GatewayOption, Processor, ProcessorOption,
    RouterHandle, RouterOption,
};
use crate::observability::LogSink;
use crate::types::{
    Error, GatewayConfig, IrcGatewayConfig, ProcessorConfig, Result, TelegramGatewayConfig,
};

/// Options for one gateway, in application order.
pub fn gateway_options(config: &GatewayConfig, log: &LogSink) -> Vec<GatewayOption> {
    let mut options = vec![GatewayOption::Identifier(config.identifier().to_string())];

    match config {
        GatewayConfig::Irc(irc) => push_irc_options(irc, &mut options),
        GatewayConfig::Telegram(tg) => push_telegram_options(tg, &mut options),
        GatewayConfig::Console(_) => {}
    }

    options.push(GatewayOption::Logging(log.clone()));
    options
}

fn push_irc_options(config: &IrcGatewayConfig, options: &mut Vec<GatewayOption>) {
    if let Some(nick) = &config.nick {
        options.push(GatewayOption::Nick(nick.clone()));
    }
    if let Some(ident) = &config.ident {
        options.push(GatewayOption::Ident(ident.clone()));
    }
    if let Some(name) = &config.name {
        options.push(GatewayOption::Name(name.clone()));
    }
    if let Some(version) = &config.version {
        options.push(GatewayOption::Version(version.clone()));
    }
    // Server is all-or-nothing.
    match (&config.server_address, config.server_port, config.server_use_tls) {
        (Some(address), Some(port), Some(use_tls)) => options.push(GatewayOption::Server {
            address: address.clone(),
            port,
            use_tls,
        }),
        (None, None, None) => {}
        _ => tracing::debug!(
            gateway = %config.identifier,
            "Partial server settings ignored; address, port and TLS flag are all required"
        ),
    }
    if let Some(quit_message) = &config.quit_message {
        options.push(GatewayOption::QuitMessage(quit_message.clone()));
    }
}

fn push_telegram_options(config: &TelegramGatewayConfig, options: &mut Vec<GatewayOption>) {
    if let Some(token) = &config.api_token {
        options.push(GatewayOption::ApiToken(token.clone()));
    }
    if let Some(limit) = config.updates_limit {
        options.push(GatewayOption::UpdatesLimit(limit));
    }
    if let Some(timeout) = config.updates_timeout {
        options.push(GatewayOption::UpdatesTimeout(timeout));
    }
    if let Some(allowed) = &config.updates_allowed {
        options.push(GatewayOption::UpdatesAllowed(allowed.clone()));
    }
}

/// Options for one processor, in application order.
pub fn processor_options(
    config: &ProcessorConfig,
    router: &RouterHandle,
    log: &LogSink,
) -> Vec<ProcessorOption> {
    let mut options = vec![ProcessorOption::Identifier(config.identifier.clone())];
    if let Some(path) = &config.config {
        options.push(ProcessorOption::Config(path.clone()));
    }
    options.push(ProcessorOption::Router(router.clone()));
    options.push(ProcessorOption::Logging(log.clone()));
    options
}

/// Options applied when the router is first constructed.
pub fn router_options(log: &LogSink) -> Vec<RouterOption> {
    vec![RouterOption::Logging(log.clone())]
}

/// Options applied to the router once every other component exists.
pub fn router_wiring_options(
    gateways: &[Arc<dyn Gateway>],
    processors: &[Arc<dyn Processor>],
    routes: RouteTable,
) -> Vec<RouterOption> {
    vec![
        RouterOption::Gateways(gateways.to_vec()),
        RouterOption::Processors(processors.to_vec()),
        RouterOption::Routes(routes),
    ]
}

/// Apply `options` to `component` in order, stopping at the first failure.
///
/// `identifier` names the component in the returned error.
pub fn apply_options<C>(
    component: &mut C,
    identifier: &str,
    options: Vec<C::Option>,
) -> Result<()>
where
    C: Configurable + ?Sized,
{
    for option in options {
        let name = option.name();
        component
            .apply(option)
            .map_err(|e| Error::component_config(identifier, name, e))?;
        tracing::trace!(component = identifier, option = name, "Applied option");
    }
    Ok(())
}

// =============================================================================
// Tests
// =============================================================================
