//! plcipc-client - Polling IPC client for PLC runtime process variables
//!
//! This crate turns the runtime's asynchronous request/response variable
//! channel into typed, synchronous-looking calls plus change/error
//! notifications driven by a periodic scheduler.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       IpcClient                             │
//! │                                                             │
//! │  ┌─────────────┐  ┌──────────────┐  ┌───────────────────┐  │
//! │  │ClientConfig │  │ Scheduler    │  │ ClientRegistry    │  │
//! │  │ (settings)  │  │ (tick loop)  │  │ (shared instance) │  │
//! │  └─────────────┘  └──────┬───────┘  └───────────────────┘  │
//! │                          │                                 │
//! │                   ┌──────┴───────┐                         │
//! │                   │  Variable    │                         │
//! │                   │ (marshalling)│                         │
//! │                   └──────┬───────┘                         │
//! │                          │                                 │
//! │                  ┌───────┴────────┐                        │
//! │                  │   Transport    │                        │
//! │                  │ (IPC channel)  │                        │
//! │                  └────────────────┘                        │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use plcipc_client::{ClientConfig, IpcClient, MockTransport, Variable, VarKind};
//!
//! # fn main() -> Result<(), plcipc_client::IpcError> {
//! let transport = Arc::new(MockTransport::new());
//! let config = ClientConfig::new("/run/plc/request", "/run/plc/response");
//! let client = IpcClient::open(transport, config)?;
//!
//! let speed = Variable::new("conveyor.speed", VarKind::Word);
//! client.register(&speed)?;
//!
//! speed.set(1500i64)?;
//! let value = speed.get_sync(Duration::from_secs(1))?;
//! println!("speed = {}", value);
//! # Ok(())
//! # }
//! ```
//!
//! Value reads and writes may legitimately report a pending result while
//! the answer travels through the runtime's scan cycles; the `_sync`
//! variants retry through those. Subscriptions are served by a per-client
//! scheduler task that only exists while subscriptions do, which requires
//! an ambient tokio runtime for subscription calls.

pub mod client;
pub mod config;
pub mod error;
pub mod registry;
mod retry;
mod scheduler;
pub mod transport;
pub mod variable;

pub use client::{EventSubscription, IpcClient};
pub use config::ClientConfig;
pub use error::{IpcError, IpcResult};
pub use registry::ClientRegistry;
pub use scheduler::ServerEvent;
pub use transport::{CodeFamily, MockTransport, ResultCode, Transport, TransportResult};
pub use variable::{VarSubscription, Variable};

// Re-export the value layer for convenience
pub use plcipc_conv::{ConvError, SemanticKind, TypeDescriptor, VarKind, VarValue};
