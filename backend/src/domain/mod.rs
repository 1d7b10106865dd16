//! # Domain Module
//!
//! Business logic of the expense tracker, independent of HTTP and of the
//! storage engine.
//!
//! ## Services
//!
//! - **row_parser**: validation of raw CSV records into typed rows
//! - **entity_resolver**: request-coalescing find-or-create of lookup ids
//! - **import_service**: the concurrent CSV import pipeline
//! - **export_service**: CSV rendering of stored expenses
//! - **lookup_service**: listing, renaming and guarded deletion of lookups

pub mod entity_resolver;
pub mod export_service;
pub mod import_service;
pub mod lookup_service;
pub mod models;
pub mod row_parser;

pub use entity_resolver::EntityResolver;
pub use export_service::{CsvExport, ExportService};
pub use import_service::ImportService;
pub use lookup_service::LookupService;
