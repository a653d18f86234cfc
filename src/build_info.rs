//! Compile-time build metadata exposed to the CLI.

/// Semver package version from `Cargo.toml`.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// VCS commit hash captured at build time.
pub const GIT_COMMIT: &str = env!("QUEUE_IMAGE_BUILD_GIT_HASH");

/// Build timestamp captured at compile time.
pub const BUILD_TIMESTAMP: &str = env!("QUEUE_IMAGE_BUILD_TIMESTAMP");

/// Version block shown by `queue-image --version`.
pub const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    "\ncommit: ",
    env!("QUEUE_IMAGE_BUILD_GIT_HASH"),
    "\nbuilt: ",
    env!("QUEUE_IMAGE_BUILD_TIMESTAMP")
);

/// User agent suffix identifying the build in request logs.
pub fn short_version() -> String {
    format!("{VERSION}+{GIT_COMMIT}")
}
