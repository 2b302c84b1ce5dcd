//! # Tamarind Client Library
//!
//! A client for the Tamarind.bio protein modeling job API. It submits single jobs and
//! batches for structure prediction models (AlphaFold, Boltz, IntFold), uploads template
//! files, follows job status until completion, downloads and unpacks result archives and
//! merges per-job metrics into one summary table.
//!
//! ## Architectural Philosophy
//!
//! The library keeps the same three-layer split throughout:
//!
//! - **[`core`]: The Foundation.** The [`core::api::TamarindApi`] boundary and its blocking
//!   HTTP implementation, wire types, local file I/O (format sniffing, archives, result tables)
//!   and the per-model capability trait [`core::models::ModelSpec`].
//!
//! - **[`engine`]: The Logic Core.** Stateful orchestration built on top of the API boundary:
//!   uploading and deduplicating files, resolving templates, submitting jobs, polling job
//!   status, fetching results and aggregating metrics.
//!
//! - **[`workflows`]: The Public API.** High-level entry points that tie the engine together
//!   for one model: run a job or a batch end to end, and housekeeping such as deleting jobs
//!   and uploaded files.

pub mod core;
pub mod engine;
pub mod workflows;
