// tlscheck - declarative TLS policy scanner built on top of O-Saft
// Copyright (C) 2026 tlscheck contributors
// Licensed under GPL-3.0
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, version 3.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU General Public License for more details.

use anyhow::Result;
use clap::Parser;
use tlscheck::cli::Args;
use tlscheck::external::{check_tool_available, OSaftClient};
use tlscheck::output;
use tlscheck::policy::parser::ConfigLoader;
use tlscheck::scanner;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

fn main() -> Result<()> {
    // Initialize logging - respect RUST_LOG environment variable
    let log_level = std::env::var("RUST_LOG")
        .ok()
        .and_then(|s| s.parse::<Level>().ok())
        .unwrap_or(Level::INFO);

    let subscriber = FmtSubscriber::builder().with_max_level(log_level).finish();
    tracing::subscriber::set_global_default(subscriber).expect("Failed to set subscriber");

    let args = Args::parse();

    // Handle --create-default (write starter configuration and exit)
    if args.create_default {
        ConfigLoader::create_default(&args.config)?;
        println!("✓ Starter configuration saved to: {}", args.config.display());
        println!("Review the profiles and targets, then run tlscheck again.");
        return Ok(());
    }

    info!("Parsing {} for profiles and targets", args.config.display());
    let configuration = ConfigLoader::load(&args.config)?;
    info!(
        "Loaded {} target(s), performing scans",
        configuration.targets.len()
    );

    let tool_path = args.osaft_path(configuration.osaft_path.as_deref());
    if !check_tool_available(&tool_path) {
        warn!(
            "O-Saft not found at [{}]; scans will report connection failures",
            tool_path
        );
    }

    let client = OSaftClient::with_path(tool_path);
    let summary = scanner::run_batch(&configuration, &client)?;

    if args.json {
        println!("{}", output::format_json(&summary.reports)?);
    } else {
        print!("{}", output::format_terminal(&summary));
    }

    if let Some(path) = &args.html {
        output::html::export(&summary, path)?;
        info!("Scan report saved in [{}]", path.display());
    }

    if !summary.all_safe() {
        std::process::exit(1);
    }

    Ok(())
}
