// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! HTTP client layer used to deliver reports

mod client;

pub use client::{HttpClient, HttpClientConfig};

/// Default user agent string
pub const DEFAULT_USER_AGENT: &str = concat!("csp-reporter/", env!("CARGO_PKG_VERSION"));

/// Common HTTP headers
pub mod headers {
    pub const CONTENT_TYPE: &str = "content-type";
}

/// Media type of report bodies
pub const APPLICATION_JSON: &str = "application/json";
