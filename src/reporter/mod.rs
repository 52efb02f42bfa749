// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Violation reporter
//!
//! Config resolution, deduplication and dispatch around the filters in
//! [`crate::security`].

mod config;
mod dedup;
mod dispatch;
mod pipeline;
mod stats;

pub use config::{Endpoint, ReporterConfig, ReporterOptions};
pub use dedup::ReportedViolations;
pub use dispatch::{
    CspReport, CspReportPayload, DeliveryStatus, Dispatch, HttpTransport, ReportTransport,
};
pub use pipeline::{Outcome, ReporterBuilder, ViolationReporter};
pub use stats::{ReporterStats, StatKind, StatsReport};
