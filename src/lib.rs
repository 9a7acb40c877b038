//! linktrace - short links with client/server visit correlation
//!
//! A visitor requesting a short code is served a tiny bootstrap page that
//! runs a best-effort fingerprint collector and always navigates to the
//! target. The collected payload is delivered in the background and joined
//! to the record the server opened for that visit.
//!
//! # Architecture
//! - `collector`: Probes, time-boxed listeners and the boot sequence
//! - `storage`: SeaORM storage for links and visit records
//! - `services`: Link creation, server observation, correlation
//! - `api`: HTTP services and middleware
//! - `config`: Configuration management
//! - `runtime`: Application lifecycle and execution modes
//! - `system`: Logging

pub mod api;
pub mod cli;
pub mod collector;
pub mod config;
pub mod errors;
pub mod runtime;
pub mod services;
pub mod storage;
pub mod system;
pub mod utils;
