// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Reporter statistics
//!
//! One counter per pipeline outcome plus delivery results of dispatched
//! reports.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Reporter counters
#[derive(Debug)]
pub struct ReporterStats {
    events: AtomicU64,
    disabled: AtomicU64,
    malformed_config: AtomicU64,
    sampled_out: AtomicU64,
    extension_origin: AtomicU64,
    ignored: AtomicU64,
    duplicates: AtomicU64,
    no_endpoint: AtomicU64,
    dispatched: AtomicU64,
    delivered: AtomicU64,
    failed: AtomicU64,
    started_at: DateTime<Utc>,
    start: Instant,
}

/// Point-in-time copy of [`ReporterStats`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsReport {
    /// When the reporter was created
    pub started_at: Option<DateTime<Utc>>,
    /// Seconds since creation
    pub uptime_secs: u64,
    /// Events handled
    pub events: u64,
    /// No configuration present
    pub disabled: u64,
    /// Configuration present but unusable
    pub malformed_config: u64,
    /// Dropped by sampling
    pub sampled_out: u64,
    /// Raised by browser extensions
    pub extension_origin: u64,
    /// Matched an ignore pattern
    pub ignored: u64,
    /// Already reported
    pub duplicates: u64,
    /// No subdomain configured
    pub no_endpoint: u64,
    /// Reports handed to the transport
    pub dispatched: u64,
    /// Reports the collector answered successfully
    pub delivered: u64,
    /// Reports whose send failed
    pub failed: u64,
}

/// Counter selector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatKind {
    Disabled,
    MalformedConfig,
    SampledOut,
    ExtensionOrigin,
    Ignored,
    Duplicate,
    NoEndpoint,
    Dispatched,
    Delivered,
    Failed,
}

impl Default for ReporterStats {
    fn default() -> Self {
        Self::new()
    }
}

impl ReporterStats {
    /// Create zeroed counters
    pub fn new() -> Self {
        Self {
            events: AtomicU64::new(0),
            disabled: AtomicU64::new(0),
            malformed_config: AtomicU64::new(0),
            sampled_out: AtomicU64::new(0),
            extension_origin: AtomicU64::new(0),
            ignored: AtomicU64::new(0),
            duplicates: AtomicU64::new(0),
            no_endpoint: AtomicU64::new(0),
            dispatched: AtomicU64::new(0),
            delivered: AtomicU64::new(0),
            failed: AtomicU64::new(0),
            started_at: Utc::now(),
            start: Instant::now(),
        }
    }

    /// Count an incoming event
    pub fn record_event(&self) {
        self.events.fetch_add(1, Ordering::Relaxed);
    }

    /// Count an outcome
    pub fn record(&self, kind: StatKind) {
        let counter = match kind {
            StatKind::Disabled => &self.disabled,
            StatKind::MalformedConfig => &self.malformed_config,
            StatKind::SampledOut => &self.sampled_out,
            StatKind::ExtensionOrigin => &self.extension_origin,
            StatKind::Ignored => &self.ignored,
            StatKind::Duplicate => &self.duplicates,
            StatKind::NoEndpoint => &self.no_endpoint,
            StatKind::Dispatched => &self.dispatched,
            StatKind::Delivered => &self.delivered,
            StatKind::Failed => &self.failed,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Snapshot all counters
    pub fn report(&self) -> StatsReport {
        StatsReport {
            started_at: Some(self.started_at),
            uptime_secs: self.start.elapsed().as_secs(),
            events: self.events.load(Ordering::Relaxed),
            disabled: self.disabled.load(Ordering::Relaxed),
            malformed_config: self.malformed_config.load(Ordering::Relaxed),
            sampled_out: self.sampled_out.load(Ordering::Relaxed),
            extension_origin: self.extension_origin.load(Ordering::Relaxed),
            ignored: self.ignored.load(Ordering::Relaxed),
            duplicates: self.duplicates.load(Ordering::Relaxed),
            no_endpoint: self.no_endpoint.load(Ordering::Relaxed),
            dispatched: self.dispatched.load(Ordering::Relaxed),
            delivered: self.delivered.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
        }
    }
}

impl StatsReport {
    /// Events that ended without a report
    pub fn dropped(&self) -> u64 {
        self.disabled
            + self.malformed_config
            + self.sampled_out
            + self.extension_origin
            + self.ignored
            + self.duplicates
            + self.no_endpoint
    }
}
