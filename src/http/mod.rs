// src/http/mod.rs
//
// HTTP transport for the archive fetcher

pub mod client;

pub use client::{HttpArchiveSource, HttpClientConfig};
