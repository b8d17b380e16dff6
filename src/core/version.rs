//! Build metadata shared by the snapshot store and the `--version` banner.
//! The constants come from the generated version.rs written by the build script.

include!(concat!(env!("OUT_DIR"), "/version.rs"));

/// Snapshot format version declared in Cargo.toml metadata.
/// Falls back to 1 when the build script could not read it.
pub fn snapshot_format_version() -> u32 {
    SNAPSHOT_FORMAT_VERSION.parse().unwrap_or(1)
}

/// Build time string from the build script (UTC)
pub fn build_time() -> &'static str {
    BUILD_TIME
}

/// Short git hash captured by the build script
pub fn git_hash() -> &'static str {
    GIT_HASH
}

/// One-line description used by the console banner
pub fn long_version() -> String {
    format!(
        "{} {} ({} {})",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        git_hash(),
        build_time()
    )
}
