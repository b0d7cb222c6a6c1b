//! `gltf-viewer`: loads a glTF scene and plays it against the recording
//! backend.

use std::error::Error;
use std::process::ExitCode;

use arte_viewer::{logging, ViewerArgs, ViewerOptions};
use clap::Parser;

fn main() -> ExitCode {
    let args = ViewerArgs::parse();
    logging::init(args.log_level.as_deref());

    arte_core::init();
    arte_graphics::init();
    arte_viewer::init();

    let backend = match arte_graphics::create_backend() {
        Ok(backend) => backend,
        Err(err) => {
            eprintln!("error: {err}");
            return ExitCode::FAILURE;
        }
    };

    match arte_viewer::run(backend.as_ref(), &args.gltf_path, &ViewerOptions::from(&args)) {
        Ok(summary) => {
            log::info!(target: logging::MAIN, "{}: {}", args.gltf_path.display(), summary);
            ExitCode::SUCCESS
        }
        Err(err) => {
            log::error!(target: logging::MAIN, "Cannot display {}.", args.gltf_path.display());
            eprintln!("error: {err}");
            let mut source = err.source();
            while let Some(cause) = source {
                eprintln!("  caused by: {cause}");
                source = cause.source();
            }
            ExitCode::FAILURE
        }
    }
}
