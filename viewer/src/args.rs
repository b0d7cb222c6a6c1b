//! Command line arguments of the `gltf-viewer` binary.
//!
//! [`ViewerArgs`] is the clap surface. It converts into [`ViewerOptions`],
//! which is all the library needs, so scenes can be driven without clap.
//!
//! # Examples
//!
//! ```bash
//! # Show help
//! gltf-viewer --help
//!
//! # Play the second animation once, over 5 seconds at 60 Hz
//! gltf-viewer models/fox.gltf --animation 1 --mode once --frames 300
//!
//! # Trace buffer preparation only
//! gltf-viewer models/box.gltf --log-level gltfviewer::prepare=trace
//! ```

use std::path::PathBuf;

use clap::Parser;

use crate::animation::Mode;

/// Default simulated frame duration, in seconds.
pub const DEFAULT_FRAME_TIME: f32 = 1.0 / 60.0;

/// Playback mode selection for CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum CliMode {
    /// Loop the animation forever.
    #[default]
    Repeat,
    /// Play the animation once, then hold its last pose.
    Once,
}

impl From<CliMode> for Mode {
    fn from(cli: CliMode) -> Self {
        match cli {
            CliMode::Repeat => Mode::Repeat,
            CliMode::Once => Mode::Once,
        }
    }
}

/// glTF viewer arguments.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "gltf-viewer",
    about = "Loads a glTF 2.0 scene, plays its animation and submits its draws",
    version
)]
pub struct ViewerArgs {
    /// Path to the .gltf document.
    #[arg(value_name = "GLTF-PATH")]
    pub gltf_path: PathBuf,

    /// Scene to display (default: the document's default scene, then scene 0).
    #[arg(long)]
    pub scene: Option<usize>,

    /// Animation to play (default: the first animation, if any).
    #[arg(long)]
    pub animation: Option<usize>,

    /// Animation playback mode.
    #[arg(long, value_enum, default_value_t = CliMode::Repeat)]
    pub mode: CliMode,

    /// Number of frames to simulate before exiting.
    #[arg(long, default_value_t = 1)]
    pub frames: u64,

    /// Duration of one simulated frame, in seconds.
    #[arg(long, default_value_t = DEFAULT_FRAME_TIME)]
    pub frame_time: f32,

    /// Log filter, e.g. `debug` or `gltfviewer::prepare=trace`.
    #[arg(long)]
    pub log_level: Option<String>,
}

/// Options of a viewer run.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewerOptions {
    pub scene: Option<usize>,
    pub animation: Option<usize>,
    pub mode: Mode,
    pub frames: u64,
    pub frame_time: f32,
}

impl Default for ViewerOptions {
    fn default() -> Self {
        Self {
            scene: None,
            animation: None,
            mode: Mode::Repeat,
            frames: 1,
            frame_time: DEFAULT_FRAME_TIME,
        }
    }
}

impl From<&ViewerArgs> for ViewerOptions {
    fn from(args: &ViewerArgs) -> Self {
        Self {
            scene: args.scene,
            animation: args.animation,
            mode: args.mode.into(),
            frames: args.frames,
            frame_time: args.frame_time,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = ViewerArgs::parse_from(["gltf-viewer", "box.gltf"]);
        assert_eq!(args.gltf_path, PathBuf::from("box.gltf"));
        assert_eq!(ViewerOptions::from(&args), ViewerOptions::default());
        assert!(args.log_level.is_none());
    }

    #[test]
    fn test_all_options() {
        let args = ViewerArgs::parse_from([
            "gltf-viewer",
            "fox.gltf",
            "--scene",
            "2",
            "--animation",
            "1",
            "--mode",
            "once",
            "--frames",
            "300",
            "--frame-time",
            "0.5",
            "--log-level",
            "debug",
        ]);
        let options = ViewerOptions::from(&args);
        assert_eq!(options.scene, Some(2));
        assert_eq!(options.animation, Some(1));
        assert_eq!(options.mode, Mode::Once);
        assert_eq!(options.frames, 300);
        assert_eq!(options.frame_time, 0.5);
        assert_eq!(args.log_level.as_deref(), Some("debug"));
    }

    #[test]
    fn test_rejects_unknown_mode() {
        assert!(ViewerArgs::try_parse_from(["gltf-viewer", "a.gltf", "--mode", "bounce"]).is_err());
    }
}
