//! Registration intake and officer dashboard operations for the institute event.
//!
//! Visitors submit a registration form that is validated against a fixed schema and
//! persisted in a document store. Officers authenticate through an external identity
//! provider and then list, edit, delete, export, and mark payment for registrations.

pub mod auth;
pub mod config;
pub mod error;
pub mod registrations;
pub mod store;
pub mod telemetry;
