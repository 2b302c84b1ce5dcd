//! # Core Module
//!
//! The foundation layer of the client. Everything here is stateless: it describes the remote
//! service, the files exchanged with it and the models it runs.
//!
//! ## Architecture
//!
//! - **Remote API** ([`api`]) - The [`api::TamarindApi`] trait, the wire types it exchanges
//!   and [`api::HttpClient`], the blocking HTTP implementation used in production
//! - **File I/O** ([`io`]) - Structure format sniffing, zip extraction and CSV result tables
//! - **Models** ([`models`]) - Per-model default options and result conventions

pub mod api;
pub mod io;
pub mod models;
