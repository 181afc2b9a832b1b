//! Domain types for packages and progress stages.
//!
//! These types are pure data with no infrastructure dependencies.

mod package;
mod stage;

pub use package::{PackageAction, PackageDescriptor, PackageName, ValidationError};
pub use stage::{Stage, classify};
