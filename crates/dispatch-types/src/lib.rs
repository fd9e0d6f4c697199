//! Shared type definitions for the dispatch relay and live map dashboard.
//!
//! This crate is the single source of truth for the event envelope that
//! flows from external producers, through the relay, to every connected
//! dashboard. The responder and caller records are exported to
//! `TypeScript` via `ts-rs` for browser dashboards.
//!
//! # Modules
//!
//! - [`envelope`] -- the tagged [`Envelope`] sum type and its record types
//! - [`kind`] -- the four responder kinds
//! - [`geo`] -- [`Coordinate`] and interpolation helpers
//! - [`lenient`] -- tolerant field decoders used by the envelope records

pub mod envelope;
pub mod geo;
pub mod kind;
pub mod lenient;

pub use envelope::{CallerInfo, Envelope, ResponderInfo, USER_TAG};
pub use geo::Coordinate;
pub use kind::ResponderKind;
