//! Client library for the chemical equipment analytics backend.
//!
//! Provides the typed REST client, response schemas, the explicit session
//! context, environment configuration, and the upload dashboard state.

pub mod api;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod models;
pub mod session;
