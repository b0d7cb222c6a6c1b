//! Log targets and logger setup.
//!
//! Library code logs through the `log` facade with one of the targets
//! below, so a filter such as `RUST_LOG=gltfviewer::prepare=debug` isolates
//! one subsystem.

/// General viewer messages.
pub const MAIN: &str = "gltfviewer";

/// GPU preparation of meshes, materials, skins and animations.
pub const PREPARE: &str = "gltfviewer::prepare";

/// Draw submission.
pub const DRAW: &str = "gltfviewer::draw";

/// Initializes `env_logger`, defaulting to the `info` level.
///
/// `RUST_LOG` is honored; `filter` (e.g. from `--log-level`) is applied on
/// top of it. Calling this more than once is harmless.
pub fn init(filter: Option<&str>) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if let Some(filter) = filter {
        builder.parse_filters(filter);
    }
    if builder.try_init().is_err() {
        log::debug!(target: MAIN, "Logger was already initialized.");
    }
}
