//! PharmaCare - Pharmacy Collection Management
//!
//! A Rust library for managing persisted pharmacy collections: pharmacies,
//! wellness programs, prescriptions, conversations, the user profile and the
//! import audit log.
//!
//! # Features
//!
//! - String-keyed JSON storage with graceful fallback on corrupt slots
//! - Collection repositories with in-place updates and silent no-op deletes
//! - All-or-nothing CSV/JSON imports with an append-only audit log
//! - Period-based analytics with local-midnight cutoffs
//! - Pure HTML-fragment rendering with per-view empty states
//! - Chat with a cancellable simulated support reply

/// Time-period filtering and summary aggregation
pub mod analytics;
/// Conversations and the simulated support reply
pub mod chat;
/// Configuration management
pub mod config;
/// Error types
pub mod error;
/// File import pipeline
pub mod import;
/// Logging setup and utilities
pub mod logging;
/// Metrics collection
pub mod metrics;
/// Data models and structures
pub mod models;
/// Repositories over the persisted collections
pub mod repository;
/// Pure HTML-fragment rendering
pub mod render;
/// Persistent key-value storage
pub mod store;
/// Shared date helpers
pub mod utils;
/// Input validation and sanitization
pub mod validation;

// Re-export key components for easier access
pub use analytics::Period;
pub use error::{PharmacyError, Result};
pub use import::Importer;
pub use models::{Conversation, Pharmacy, Prescription, Profile, UploadRecord, WellnessProgram};
pub use store::Store;
