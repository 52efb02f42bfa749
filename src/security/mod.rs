// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Violation model and filtering
//!
//! - Violation events and their deduplication fingerprint
//! - Sampling, extension-origin and ignore-pattern filters

mod filter;
mod violation;

pub use filter::{
    apply_filters, is_extension_source, matching_ignore_pattern, FilterVerdict, FixedSampler,
    RandomSampler, Sampler,
};
pub use violation::{ViolationEvent, ViolationKey};
