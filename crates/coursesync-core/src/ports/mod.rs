//! Port definitions (hexagonal architecture interfaces)
//!
//! This module defines the port traits that form the boundaries of the
//! hexagonal architecture. Ports are interfaces that the domain core
//! depends on, but whose implementations live in adapter crates.
//!
//! ## Ports Overview
//!
//! - [`IPortalLister`] - Enumerate and download files published on the portal
//! - [`IRemoteStore`] - Upload files into the cloud storage destination
//! - [`ILedger`] - Persistent record of processed files and run history

pub mod ledger;
pub mod portal_lister;
pub mod remote_store;

pub use ledger::{ILedger, RecordFilter};
pub use portal_lister::{FetchHandle, IPortalLister, PortalEntry};
pub use remote_store::IRemoteStore;
