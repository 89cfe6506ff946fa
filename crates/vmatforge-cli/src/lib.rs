//! VMatForge CLI library.
//!
//! This crate provides the batch conversion pipeline behind the `vmatforge`
//! binary: directory scanning, attribute/texture mapping, the bounded worker
//! pool with pause/cancel/retry semantics, and the retrying file-transfer
//! utility.

pub mod commands;
pub mod config;
pub mod job;
pub mod log;
pub mod mapper;
pub mod report;
pub mod runner;
pub mod scan;
pub mod scheduler;
pub mod transfer;
