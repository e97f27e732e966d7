//! Core library for the Makan Index backend: a small directory of reviewed
//! Malaysian food vendors.
//!
//! The [`vendors`] module owns the catalogue (domain types, repository
//! abstraction, listing pipeline, HTTP surface). The [`analysis`] module wraps
//! the Gemini transcript-analysis call behind a retry state machine. [`geo`]
//! resolves pasted map links into coordinates and an address. Admin mutations
//! are gated through server-issued session tokens in [`auth`].

pub mod analysis;
pub mod auth;
pub mod config;
pub mod error;
pub mod geo;
pub mod telemetry;
pub mod vendors;
