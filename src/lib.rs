//! # emersyx-core - component assembly host
//!
//! Loads gateway, processor and router modules, builds and configures one
//! component per configuration entry, validates the wiring and starts the
//! router:
//! - Module registry caching every module by path
//! - Uniform option protocol for all component kinds
//! - Route table builder merging routes by source
//! - Startup broadcast before the router begins dispatching
//!
//! ## Architecture
//!
//! ```text
//!                  ┌──────────────────────────────────────┐
//!   emersyx.toml → │            Assembly                  │
//!                  │  ┌──────────┐   ┌──────────────────┐ │
//!                  │  │ Module   │ → │ Factories +      │ │
//!                  │  │ Registry │   │ Option Protocol  │ │
//!                  │  └──────────┘   └──────────────────┘ │
//!                  │  ┌──────────┐   ┌──────────────────┐ │
//!                  │  │ Route    │ → │ Validator        │ │
//!                  │  │ Table    │   │                  │ │
//!                  │  └──────────┘   └──────────────────┘ │
//!                  └──────────────┬───────────────────────┘
//!                                 ▼
//!                  broadcast ComponentsLoaded → router.run()
//! ```

#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]
#![warn(rust_2018_idioms)]

pub mod assembly;
pub mod builtin;
pub mod component;
pub mod registry;
pub mod types;
pub mod validation;

// Internal utilities
pub mod observability;
pub mod testing;

pub use types::{Config, Error, Result};
