//! # Engine Module
//!
//! The orchestration core of the client: everything that happens between "the caller has a
//! list of sequences" and "the results are on disk".
//!
//! ## Overview
//!
//! A prediction goes through the same stages whatever the model:
//!
//! 1. Template files referenced by the entries are validated, deduplicated and uploaded once
//!    ([`templates`], [`upload`]).
//! 2. The merged settings of every entry are submitted as one job or one batch ([`submit`]).
//! 3. The job or batch is polled at a fixed interval until every job is terminal
//!    ([`monitor`]); each job is downloaded the first time it is seen complete ([`fetch`]).
//! 4. The per-job metrics files are merged into one `results.csv` ([`aggregate`]).
//!
//! ## Architecture
//!
//! - **Configuration** ([`config`]) - Poll interval, loop ceilings and download options
//! - **Cancellation** ([`cancel`]) - Cooperative stop signal for long monitor loops
//! - **Progress Monitoring** ([`progress`]) - Progress events for a user interface
//! - **Job Selection** ([`selection`]) - Listing and filtering jobs by name, model and batch
//! - **Error Handling** ([`error`]) - Engine-specific error types

pub mod aggregate;
pub mod cancel;
pub mod config;
pub mod error;
pub mod fetch;
pub mod monitor;
pub mod progress;
pub mod selection;
pub mod submit;
pub mod templates;
pub mod upload;
