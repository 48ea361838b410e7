//! Read Config Bundle library - portable reading-display configurations.
//!
//! This library exposes the core functionality of the `rcb` CLI for use in
//! tests and embedding applications: exporting the current configuration
//! together with its font and background files as one ZIP bundle, and
//! importing such a bundle back into the settings store.
//!
//! # Modules
//!
//! - `archive`: ZIP pack/unpack service
//! - `assets`: Asset references and resolution
//! - `bundle`: Bundle exporter, importer and engine
//! - `config`: Settings records, store, engine settings and paths
//! - `destination`: Export destinations (directory or storage provider)
//! - `error`: Error types with user-recoverable hints
//! - `provider`: Document storage provider abstraction
//! - `source`: Import byte sources, including remote URLs
//! - `task`: Background dispatch of export/import runs
#![forbid(unsafe_code)]

pub mod archive;
pub mod assets;
pub mod bundle;
pub mod cli;
pub mod config;
pub mod destination;
pub mod error;
pub mod logging;
pub mod provider;
pub mod source;
pub mod task;
