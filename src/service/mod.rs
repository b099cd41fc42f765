//! Service layer for orchestration
//!
//! Drives the packager and deployer over the selected services and renders
//! the results, keeping that logic out of main.rs.

pub mod package;
pub mod report;
pub mod toolchain;

pub use package::{OutputMode, PackageResult, PackageService, RunConfig, RunSummary};
pub use toolchain::ensure_packager;
