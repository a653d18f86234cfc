//! CLI entry point for queue-image.

mod cli;

use clap::Parser;
use queue_image::backend::build_updater;
use queue_image::config::load_config;
use queue_image::render::Renderer;
use queue_image::types::UpdateRequest;
use std::io::{self, BufRead, Read, Write};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let args = cli::Args::parse();
    init_tracing(args.verbose);

    let mut config = match load_config(args.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    };
    if let Some(backend) = args.backend {
        config.backend = backend;
    }
    if args.no_color {
        config.display.color = false;
    }
    let renderer = Renderer::new(config.display.color);

    if args.image_from_stdin() && !args.yes {
        renderer.error("reading the image reference from stdin requires --yes");
        std::process::exit(1);
    }
    let image = if args.image_from_stdin() {
        match read_stdin() {
            Ok(text) => text,
            Err(e) => {
                renderer.error(&format!("failed to read image reference from stdin: {e}"));
                std::process::exit(1);
            }
        }
    } else {
        args.image.clone()
    };

    let request = match UpdateRequest::new(&args.org, &args.cluster, &args.queue, image) {
        Ok(request) => request,
        Err(e) => {
            renderer.error(&e.to_string());
            std::process::exit(1);
        }
    };

    // Credentials are captured here, once; nothing is sent yet.
    let updater = match build_updater(&config, |name| std::env::var(name).ok()) {
        Ok(updater) => updater,
        Err(e) => {
            renderer.error(&e.to_string());
            std::process::exit(1);
        }
    };

    renderer.field("backend", updater.name());
    renderer.field("organization", &request.organization_slug);
    renderer.field("cluster", &request.cluster_id);
    renderer.field("queue", &request.queue_id);
    renderer.field("image", &request.image_reference);

    if !args.yes {
        match confirm("Apply this base image?") {
            Ok(true) => {}
            Ok(false) => {
                renderer.warn("aborted; nothing was changed");
                std::process::exit(1);
            }
            Err(e) => {
                renderer.error(&format!("failed to read confirmation: {e}"));
                std::process::exit(1);
            }
        }
    }

    let outcome = updater.update_image_reference(&request).await;
    if args.json {
        renderer.outcome_json(&outcome);
    } else {
        renderer.outcome(&outcome);
    }
    std::process::exit(outcome.exit_code());
}

/// Install the stderr log subscriber; `QUEUE_IMAGE_LOG` wins over `-v`.
fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "queue_image=debug,info",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_env("QUEUE_IMAGE_LOG")
        .unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn read_stdin() -> io::Result<String> {
    let mut text = String::new();
    io::stdin().lock().read_to_string(&mut text)?;
    Ok(text)
}

/// Ask a yes/no question on stderr; anything but `y`/`yes` declines.
fn confirm(question: &str) -> io::Result<bool> {
    eprint!("{question} [y/N] ");
    io::stderr().flush()?;
    let mut line = String::new();
    if io::stdin().lock().read_line(&mut line)? == 0 {
        return Ok(false);
    }
    Ok(matches!(
        line.trim().to_ascii_lowercase().as_str(),
        "y" | "yes"
    ))
}
