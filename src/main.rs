// SPDX-License-Identifier: MPL-2.0

mod admin;
mod app;
mod cache;
mod carousel;
mod cli;
mod config;
mod links;
mod listing;
mod model;
mod relay;
mod runtime;
mod state;
mod supabase;
mod sync;

use clap::Parser;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    cli::run(cli::Cli::parse())
}
