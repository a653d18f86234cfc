//! queue-image — set the agent base image of a CI cluster queue.
//!
//! Two interchangeable backends implement [`backend::ImageUpdater`]:
//! a session-scrape backend that drives the web settings form, and a
//! token-API backend that runs a GraphQL mutation.
//!
//! # Quick start
//!
//! ```no_run
//! use queue_image::backend::build_updater;
//! use queue_image::config::load_config;
//! use queue_image::types::UpdateRequest;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config(None)?;
//! let updater = build_updater(&config, |name| std::env::var(name).ok())?;
//! let request = UpdateRequest::new("acme", "cluster-id", "queue-id", "ghcr.io/acme/agent:v2")?;
//! let outcome = updater.update_image_reference(&request).await;
//! println!("{}", outcome.message);
//! # Ok(())
//! # }
//! ```

pub mod backend;
pub mod build_info;
pub mod config;
pub mod error;
pub mod render;
pub mod types;
