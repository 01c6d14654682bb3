// SPDX-License-Identifier: GPL-3.0-only

use camera_capture::{CameraType, CaptureTarget, Orientation};
use clap::{Parser, Subcommand};

mod cli;

#[derive(Parser)]
#[command(name = "camera-capture")]
#[command(about = "Capture photos and videos on the virtual camera devices")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Take a photo
    Photo {
        /// Camera to use (front or back)
        #[arg(short, long, default_value = "back")]
        camera: CameraType,

        /// Where the photo goes (memory, disk, camera-roll or temp)
        #[arg(short, long, default_value = "disk")]
        target: CaptureTarget,

        /// Capture quality (low, medium, high or photo)
        #[arg(short, long)]
        quality: Option<String>,

        /// Device orientation; read from the sensor when omitted
        #[arg(short, long)]
        orientation: Option<Orientation>,

        /// Play the shutter sound
        #[arg(short, long)]
        sound: bool,

        /// Gallery title (camera-roll target only)
        #[arg(long)]
        title: Option<String>,

        /// Gallery description (camera-roll target only)
        #[arg(long)]
        description: Option<String>,
    },

    /// Record a video
    Video {
        /// Camera to use (front or back)
        #[arg(short, long, default_value = "back")]
        camera: CameraType,

        /// Where the video goes (disk or temp)
        #[arg(short, long, default_value = "disk")]
        target: CaptureTarget,

        /// Recording quality (low, medium or high)
        #[arg(short, long)]
        quality: Option<String>,

        /// Maximum recording duration in seconds; records until Ctrl+C when omitted
        #[arg(short, long)]
        duration: Option<u32>,

        /// Device orientation; read from the sensor when omitted
        #[arg(short, long)]
        orientation: Option<Orientation>,
    },

    /// Run a capture from raw bridge options, e.g. '{"type":2,"mode":0,"target":0}'
    Request {
        /// Capture options as JSON
        json: String,
    },

    /// Report whether a camera has a flash
    HasFlash {
        /// Camera to query (front or back)
        #[arg(short, long, default_value = "back")]
        camera: CameraType,
    },

    /// Print the constants table
    Constants,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    // Set RUST_LOG environment variable to control log level
    // Examples: RUST_LOG=debug, RUST_LOG=camera_capture=debug, RUST_LOG=info
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(true)
        .with_level(true)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Photo {
            camera,
            target,
            quality,
            orientation,
            sound,
            title,
            description,
        } => cli::take_photo(cli::PhotoArgs {
            camera,
            target,
            quality,
            orientation,
            sound,
            title,
            description,
        }),
        Commands::Video {
            camera,
            target,
            quality,
            duration,
            orientation,
        } => cli::record_video(camera, target, quality, duration, orientation),
        Commands::Request { json } => cli::run_request(&json),
        Commands::HasFlash { camera } => cli::has_flash(camera),
        Commands::Constants => cli::print_constants(),
    }
}
