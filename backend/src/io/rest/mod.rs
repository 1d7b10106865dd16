//! # REST API Interface Layer
//!
//! HTTP endpoints for the expense tracker. Each submodule exposes a
//! `router()` that is nested under `/api` by [`crate::create_router`].

pub mod export_apis;
pub mod import_apis;
pub mod lookup_apis;
