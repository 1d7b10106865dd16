//! # SQLite Storage Module
//!
//! SQLite-backed implementations of the storage traits, built on SQLx.
//!
//! ## Components
//!
//! - **connection.rs** - pool management and schema setup
//! - **repositories/** - lookup and expense repositories

pub mod connection;
pub mod repositories;

pub use connection::DbConnection;
pub use repositories::{ExpenseRepository, LookupRepository};
