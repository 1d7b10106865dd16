//! # IO Module
//!
//! Interface layer between HTTP clients and the domain logic.
//!
//! Handlers translate requests into domain calls and domain results into
//! responses. They hold no business logic.
//!
//! ## Supported Operations
//!
//! - **POST /api/expenses/import**: import raw CSV text
//! - **GET /api/expenses/export**: download expenses as CSV
//! - **GET /api/lookups/:kind**: list groups, categories, payers or payment modes
//! - **PUT /api/lookups/:kind/:id**: rename a lookup entity
//! - **DELETE /api/lookups/:kind/:id**: delete an unreferenced lookup entity

pub mod rest;
