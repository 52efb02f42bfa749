// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! csp-reporter CLI
//!
//! Replays recorded violation events against a host page, the same way the
//! page itself would report them.

use std::env;
use std::fs;
use std::process::ExitCode;

use anyhow::{bail, Context};
use futures::future::join_all;

use csp_reporter::replay::load_events;
use csp_reporter::{Endpoint, FixedSampler, HostDocument, StatsReport, ViolationReporter};

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("csp_reporter=info".parse().unwrap()),
        )
        .init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        print_usage();
        return ExitCode::from(1);
    }

    match args[1].as_str() {
        "replay" => {
            let options = match ReplayArgs::parse(&args[2..]) {
                Ok(options) => options,
                Err(e) => {
                    eprintln!("{}", e);
                    eprintln!("Usage: csp-reporter replay <page.html> <events.json> [--endpoint <url>] [--fraction-draw <f>]");
                    return ExitCode::from(1);
                }
            };
            match replay(options).await {
                Ok(report) => {
                    match serde_json::to_string_pretty(&report) {
                        Ok(json) => println!("{}", json),
                        Err(e) => eprintln!("Failed to render stats: {}", e),
                    }
                    ExitCode::SUCCESS
                }
                Err(e) => {
                    eprintln!("Replay failed: {:#}", e);
                    ExitCode::from(1)
                }
            }
        }
        "--help" | "-h" | "help" => {
            print_usage();
            ExitCode::SUCCESS
        }
        "--version" | "-v" | "version" => {
            println!("csp-reporter {}", env!("CARGO_PKG_VERSION"));
            ExitCode::SUCCESS
        }
        cmd => {
            eprintln!("Unknown command: {}", cmd);
            print_usage();
            ExitCode::from(1)
        }
    }
}

fn print_usage() {
    println!(
        r#"csp-reporter - CSP violation collector

USAGE:
    csp-reporter <COMMAND> [OPTIONS]

COMMANDS:
    replay <page.html> <events.json>   Run recorded violations through the reporter
    help                               Show this help message
    version                            Show version information

REPLAY OPTIONS:
    --endpoint <url>        Send every report to this URL instead of {{subdomain}}.uriports.com
    --fraction-draw <f>     Use a fixed sampling draw in [0, 1) instead of a random one
                            (alias: --draw)

The page must carry its configuration in
<script type="application/json" id="uriports-csp-report-config">.
Events are a JSON array or one JSON object per line, using the
SecurityPolicyViolationEvent field names (blockedURI, documentURI, ...).

EXAMPLES:
    csp-reporter replay page.html violations.json
    csp-reporter replay page.html violations.jsonl --endpoint http://localhost:8080/csp
"#
    );
}

struct ReplayArgs {
    page: String,
    events: String,
    endpoint: Option<String>,
    draw: Option<f64>,
}

impl ReplayArgs {
    fn parse(args: &[String]) -> anyhow::Result<Self> {
        let mut positional = Vec::new();
        let mut endpoint = None;
        let mut draw = None;

        let mut iter = args.iter();
        while let Some(arg) = iter.next() {
            match arg.as_str() {
                "--endpoint" => {
                    endpoint = Some(iter.next().context("--endpoint needs a URL")?.clone());
                }
                "--fraction-draw" | "--draw" => {
                    let value = iter.next().context("--fraction-draw needs a number")?;
                    let value: f64 = value
                        .parse()
                        .with_context(|| format!("invalid draw '{}'", value))?;
                    if !(0.0..1.0).contains(&value) {
                        bail!("draw must be in [0, 1), got {}", value);
                    }
                    draw = Some(value);
                }
                other => positional.push(other.to_string()),
            }
        }

        match positional.as_slice() {
            [page, events] => Ok(Self {
                page: page.clone(),
                events: events.clone(),
                endpoint,
                draw,
            }),
            _ => bail!("expected <page.html> and <events.json>"),
        }
    }
}

async fn replay(args: ReplayArgs) -> anyhow::Result<StatsReport> {
    let html = fs::read_to_string(&args.page)
        .with_context(|| format!("reading page {}", args.page))?;
    let events = load_events(&args.events)?;

    let mut builder = ViolationReporter::builder(HostDocument::new(html));
    if let Some(ref url) = args.endpoint {
        builder = builder.endpoint(Endpoint::fixed(url)?);
    }
    if let Some(draw) = args.draw {
        builder = builder.sampler(FixedSampler(draw));
    }
    let reporter = builder.build()?;

    tracing::info!(events = events.len(), page = %args.page, "Replaying CSP violations");

    let dispatches: Vec<_> = events
        .iter()
        .filter_map(|event| reporter.handle(event).into_dispatch())
        .collect();
    join_all(dispatches.into_iter().map(|d| d.wait())).await;

    Ok(reporter.stats())
}
