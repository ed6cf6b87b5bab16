//! Transform Actor Library
//!
//! A thin orchestration layer over an actor-hosting platform. One core
//! pipeline — normalize, transform, assemble, persist — served two ways:
//!
//! - **Standard mode**: one-shot batch run driven by a structured input
//!   object, result appended to the platform dataset, then exit.
//! - **Standby mode**: a long-lived HTTP listener running the same pipeline
//!   per request, with a readiness-probe fast path for the platform's
//!   health checks.
//!
//! Two companions ride along: `publish` uploads a local source directory to
//! the platform's actor-build API and polls the build to completion, and
//! `agent` drives an external code-generation CLI to scaffold a brand-new
//! actor project before publishing it.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod actor;
pub mod agent_builder;
pub mod ai;
pub mod assemble;
pub mod cli;
pub mod config;
pub mod dataset;
pub mod error;
pub mod mode;
pub mod normalize;
pub mod platform;
pub mod publish;
pub mod server;
pub mod transform;

pub use error::{Error, Result};

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Setup tracing/logging
pub fn setup_tracing(level: &str, format: Option<&str>) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let subscriber = tracing_subscriber::registry().with(filter);

    match format {
        Some("json") => {
            subscriber.with(fmt::layer().json()).init();
        }
        _ => {
            subscriber.with(fmt::layer()).init();
        }
    }

    Ok(())
}
