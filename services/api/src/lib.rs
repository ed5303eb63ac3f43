//! services/api/src/lib.rs
//!
//! The HTTP service around `catalog_core`: configuration, concrete adapters
//! and the Axum transport.

pub mod adapters;
pub mod config;
pub mod error;
pub mod web;
