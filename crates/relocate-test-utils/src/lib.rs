//! Shared test utilities for the relocate workspace.
//!
//! Dev-dependency only, never published.
//!
//! # Modules
//!
//! - [`manifest`]: manifest text builders
//! - [`project`]: [`project::TestProject`], a project tree plus an outside
//!   directory holding package sources and relocate state

pub mod manifest;
pub mod project;

/// Host name used for the operator identity in tests
pub const TEST_HOST: &str = "test-box";
/// User name used for the operator identity in tests
pub const TEST_USER: &str = "maintainer";
/// `<host>\<user>` identity matching [`TEST_HOST`] and [`TEST_USER`]
pub const TEST_IDENTITY: &str = "test-box\\maintainer";
