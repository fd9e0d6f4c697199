//! Headless dashboard for the live dispatch map.
//!
//! Connects to the relay event stream and keeps a reconciled view of one
//! incident: the latest snapshot per responder and caller, a raw event log
//! and a summary terminal. Responder markers travel along routes toward
//! the caller on a [`MarkerCanvas`]; the bundled [`TracingCanvas`] renders
//! by logging.
//!
//! # Pipeline
//!
//! ```text
//! EventStreamClient --payload--> DashboardSession
//!                                  |-- DashboardState (summaries, slots)
//!                                  `-- MarkerAnimator --> RouteProvider
//!                                                     `-> MarkerCanvas
//! ```
//!
//! [`MarkerCanvas`]: canvas::MarkerCanvas
//! [`TracingCanvas`]: canvas::TracingCanvas

pub mod animate;
pub mod canvas;
pub mod client;
pub mod config;
pub mod error;
pub mod reconcile;
pub mod route;
pub mod session;
pub mod sse;

// Re-export primary types for convenience.
pub use animate::{MarkerAnimator, MarkerPhase, MarkerProgress, MarkerSlot};
pub use canvas::{MarkerCanvas, MarkerKind, TracingCanvas};
pub use client::EventStreamClient;
pub use config::{DashboardConfig, DirectionsConfig};
pub use error::{DashboardError, StreamError};
pub use reconcile::{DashboardState, Reconciled, SlotUpdate};
pub use route::{RouteBackend, RouteError, RoutePath, RouteProvider};
pub use session::DashboardSession;
pub use sse::{SseDecoder, SseFrame};
