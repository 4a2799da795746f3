//! High-level commands for skl operations.
//!
//! Each command borrows an [`AppContext`](crate::context::AppContext) and
//! returns a report for the frontend to render.

pub mod catalog;
pub mod info;
pub mod install;
pub mod installed;
mod packages;
pub mod remove;
pub mod update;

pub use catalog::{CatalogCommand, CatalogReport};
pub use info::{InfoCommand, InfoReport, InfoSource};
pub use install::{InstallCommand, InstallOptions, InstallReport};
pub use installed::{InstalledCommand, InstalledEntry};
pub use remove::{RemoveCommand, RemoveReport};
pub use update::{UpdateCommand, UpdateReport};
