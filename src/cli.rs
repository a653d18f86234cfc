//! CLI argument parsing via clap.

use clap::{ArgAction, Parser};
use queue_image::build_info;
use queue_image::config::BackendKind;

/// Set the agent base image of a CI cluster queue.
#[derive(Debug, Parser)]
#[command(name = "queue-image", version = build_info::VERSION, long_version = build_info::LONG_VERSION)]
pub struct Args {
    /// Organization slug.
    pub org: String,

    /// Cluster id.
    pub cluster: String,

    /// Queue id.
    pub queue: String,

    /// Image reference (registry/image:tag), or `-` to read it from stdin.
    pub image: String,

    /// Update strategy: `api` (bearer token) or `session` (web form).
    #[arg(short = 'b', long = "backend")]
    pub backend: Option<BackendKind>,

    /// Path to config file (default: ./queue-image.toml or
    /// ~/.config/queue-image/queue-image.toml).
    #[arg(short = 'c', long = "config")]
    pub config: Option<String>,

    /// Skip the confirmation prompt.
    #[arg(short = 'y', long = "yes")]
    pub yes: bool,

    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    pub verbose: u8,

    /// Disable color output.
    #[arg(long = "no-color")]
    pub no_color: bool,

    /// Print the outcome as a JSON object on stdout.
    #[arg(long = "json")]
    pub json: bool,
}

impl Args {
    /// True when the image reference should be read from stdin.
    pub fn image_from_stdin(&self) -> bool {
        self.image == "-"
    }
}
