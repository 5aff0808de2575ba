//! Use cases (interactors) for CourseSync
//!
//! Use cases are thin coordinators that delegate business rules to domain
//! methods and I/O to ports.
//!
//! ## Use Cases
//!
//! - [`SyncCoursesUseCase`] - Mirror new portal files into the remote store

pub mod sync_courses;

pub use sync_courses::{
    FileFailure, PlanReason, PlannedUpload, RootFolder, SyncCoursesUseCase, SyncOptions,
    SyncReport,
};
