//! Arcana Reading — submission and poll client for the interpretation
//! service.
//!
//! Turns a completed spread session into a remote reading resource and
//! polls it to completion under a timeout ladder: a long-wait hint first,
//! a recoverable hard timeout later. The monetization collaborator is a
//! capability interface so nothing here ever probes an ad SDK directly.

pub mod ads;
pub mod error;
pub mod service;
pub mod submit;
pub mod wire;

pub use ads::{AdFailure, AdGateway, AdOptions, AdOutcome, UnavailableAdGateway};
pub use error::ReadingError;
pub use service::{HttpReadingService, ReadingService};
pub use submit::{PollPolicy, request_reading};
