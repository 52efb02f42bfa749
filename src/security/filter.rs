// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Filter chain applied before a violation is reported
//!
//! Filters run in a fixed order: sampling, extension origin, ignore patterns.
//! The first one that rejects the event decides the verdict.

use lazy_static::lazy_static;
use regex::Regex;

use super::violation::ViolationEvent;
use crate::reporter::ReporterConfig;

lazy_static! {
    static ref EXTENSION_SOURCE: Regex =
        Regex::new(r"^(moz|chrome)-extension://").expect("valid extension regex");
}

/// Source of uniform draws in `[0, 1)` for sampling
pub trait Sampler: Send + Sync {
    /// Next draw
    fn draw(&self) -> f64;
}

/// Thread-local RNG sampler
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomSampler;

impl Sampler for RandomSampler {
    fn draw(&self) -> f64 {
        rand::random::<f64>()
    }
}

/// Sampler that always returns the same value
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedSampler(pub f64);

impl Sampler for FixedSampler {
    fn draw(&self) -> f64 {
        self.0
    }
}

/// Result of running the filter chain
#[derive(Debug, Clone, PartialEq)]
pub enum FilterVerdict {
    /// Event should be reported
    Pass,
    /// Dropped by sampling
    SampledOut { draw: f64, fraction: f64 },
    /// Raised by a browser extension, not the site
    ExtensionOrigin,
    /// Matched a configured ignore pattern
    Ignored { pattern: String },
}

impl FilterVerdict {
    /// Whether the event survives the chain
    pub fn passed(&self) -> bool {
        matches!(self, FilterVerdict::Pass)
    }
}

/// Run sampling, extension-origin and ignore-pattern filters in order
pub fn apply_filters(
    config: &ReporterConfig,
    event: &ViolationEvent,
    sampler: &dyn Sampler,
) -> FilterVerdict {
    let fraction = config.effective_fraction();
    let draw = sampler.draw();
    if draw > fraction {
        return FilterVerdict::SampledOut { draw, fraction };
    }

    if is_extension_source(event.source_file.as_deref()) {
        return FilterVerdict::ExtensionOrigin;
    }

    if let Some(pattern) = matching_ignore_pattern(&config.ignore_patterns, event) {
        return FilterVerdict::Ignored {
            pattern: pattern.to_string(),
        };
    }

    FilterVerdict::Pass
}

/// Whether a source file belongs to a Firefox or Chromium extension
pub fn is_extension_source(source_file: Option<&str>) -> bool {
    source_file.map_or(false, |file| EXTENSION_SOURCE.is_match(file))
}

/// First pattern found as a substring of the blocked URI, source file or
/// document URI. Absent fields never match.
pub fn matching_ignore_pattern<'a>(
    patterns: &'a [String],
    event: &ViolationEvent,
) -> Option<&'a str> {
    let fields = [
        event.blocked_uri.as_deref(),
        event.source_file.as_deref(),
        event.document_uri.as_deref(),
    ];

    patterns
        .iter()
        .find(|pattern| {
            fields
                .iter()
                .flatten()
                .any(|field| field.contains(pattern.as_str()))
        })
        .map(String::as_str)
}
