// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! # csp-reporter - CSP Violation Collector
//!
//! Receives Content-Security-Policy violation events raised by a page,
//! filters and deduplicates them, and forwards one report per distinct
//! violation to a URIports collector.
//!
//! ## Pipeline
//!
//! - Config resolution: JSON read from the `uriports-csp-report-config`
//!   element of the host document, fresh for every event
//! - Filters: random sampling, browser-extension sources, ignore patterns
//! - Deduplication: at most one report per violation fingerprint
//! - Dispatch: fire-and-forget POST to `https://{subdomain}.uriports.com/reports/report`
//!
//! Failures never reach the caller; they are logged through `tracing`.
//!
//! ## Example
//!
//! ```rust,no_run
//! use csp_reporter::{HostDocument, ViolationEvent, ViolationReporter};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let page = HostDocument::new(r#"
//!         <script type="application/json" id="uriports-csp-report-config">
//!             {"subdomain": "acme", "fraction": 0.5}
//!         </script>
//!     "#);
//!     let reporter = ViolationReporter::new(page)?;
//!
//!     let event = ViolationEvent::new()
//!         .blocked_uri("https://evil.test/x.js")
//!         .document_uri("https://acme.example/page")
//!         .effective_directive("script-src");
//!
//!     if let Some(dispatch) = reporter.handle(&event).into_dispatch() {
//!         println!("delivery: {:?}", dispatch.wait().await);
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod dom;
pub mod error;
pub mod http;
pub mod replay;
pub mod reporter;
pub mod security;

// Re-exports for convenience

// Host document
pub use dom::{ConfigSource, HostDocument, StaticConfig, CONFIG_ELEMENT_ID};

// Errors
pub use error::{Error, ErrorContext, Result};

// HTTP
pub use http::{HttpClient, HttpClientConfig};

// Reporter
pub use reporter::{
    CspReport, CspReportPayload, DeliveryStatus, Dispatch, Endpoint, HttpTransport, Outcome,
    ReportTransport, ReportedViolations, ReporterBuilder, ReporterConfig, ReporterOptions,
    ReporterStats, StatsReport, ViolationReporter,
};

// Violations and filters
pub use security::{FilterVerdict, FixedSampler, RandomSampler, Sampler, ViolationEvent, ViolationKey};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
