//! Data models: the extracted invoice record and pipeline configuration.

pub mod config;
pub mod invoice;
