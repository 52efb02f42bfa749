// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Host document access
//!
//! The reporter reads its configuration from an element of the page that
//! raised the violation. [`HostDocument`] does that over real HTML parsed with
//! html5ever; [`StaticConfig`] injects the text directly.

mod document;
mod source;

pub use document::HostDocument;
pub use source::{ConfigSource, StaticConfig};

/// Id of the element carrying the reporter configuration
pub const CONFIG_ELEMENT_ID: &str = "uriports-csp-report-config";
