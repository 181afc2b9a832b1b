//! Port implementations for pkgstore-runtime.
//!
//! These adapters connect the abstract ports defined in pkgstore-core to
//! the package manager and filesystem of the host.

pub mod package_catalog;

pub use package_catalog::PkgCatalog;
