//! Domain entities and business logic
//!
//! This module contains the core domain types for CourseSync:
//! - Newtypes for type-safe identifiers
//! - The `SyncRecord` ledger entity and its status state machine
//! - The `SyncRun` history entity
//! - Domain-specific error types and the sync error taxonomy

pub mod errors;
pub mod newtypes;
pub mod run;
pub mod sync_record;

// Re-export commonly used types
pub use errors::{DomainError, SyncError, SyncErrorKind};
pub use newtypes::*;
pub use run::{RunOutcome, SyncRun};
pub use sync_record::{SyncRecord, SyncRecordParts, SyncStatus};
