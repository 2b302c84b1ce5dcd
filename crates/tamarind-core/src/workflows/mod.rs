//! # Workflows Module
//!
//! High-level entry points built on the engine. Each workflow ties the engine stages
//! together for one purpose and is what the command-line layer (or any other front end)
//! calls.
//!
//! ## Architecture
//!
//! - **Prediction** ([`predict`]) - Submit a single job or a batch for a model, optionally
//!   wait for it, download every result and merge the metrics.
//! - **Management** ([`manage`]) - Job naming, listing, downloading and deleting jobs,
//!   batches and uploaded files.

pub mod manage;
pub mod predict;
