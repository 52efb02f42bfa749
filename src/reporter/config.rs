// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Reporter configuration
//!
//! [`ReporterConfig`] is the JSON blob the hosting page provides, re-read for
//! every event. [`ReporterOptions`] is the embedder-side setup fixed when the
//! reporter is built.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use url::{Host, Url};

use crate::error::{Error, Result};
use crate::http::HttpClientConfig;

/// Configuration published by the hosting page
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReporterConfig {
    /// Sampling probability; `None` means report everything
    #[serde(default, deserialize_with = "de_fraction")]
    pub fraction: Option<f64>,
    /// Collector subdomain; absent or empty disables dispatch
    #[serde(default, deserialize_with = "de_subdomain")]
    pub subdomain: Option<String>,
    /// Substrings that suppress a report when found in the blocked URI,
    /// source file or document URI
    #[serde(default, deserialize_with = "de_patterns")]
    pub ignore_patterns: Vec<String>,
}

impl ReporterConfig {
    /// Parse the configuration text. The top level must be a JSON object.
    pub fn parse(text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text)?;
        if !value.is_object() {
            return Err(Error::config(format!(
                "expected a JSON object, found {}",
                json_type(&value)
            )));
        }

        Ok(Self::deserialize(value)?)
    }

    /// Sampling fraction in effect (defaults to 1)
    pub fn effective_fraction(&self) -> f64 {
        self.fraction.unwrap_or(1.0)
    }

    /// Subdomain to report to, if dispatch is enabled
    pub fn endpoint_subdomain(&self) -> Option<&str> {
        self.subdomain.as_deref().filter(|s| !s.is_empty())
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn de_fraction<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<Option<f64>, D::Error> {
    match Value::deserialize(d)? {
        Value::Null => Ok(None),
        Value::Number(n) => n
            .as_f64()
            .map(Some)
            .ok_or_else(|| D::Error::custom("fraction is not representable as a float")),
        other => Err(D::Error::custom(format!(
            "fraction must be a number, found {}",
            json_type(&other)
        ))),
    }
}

fn de_subdomain<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<Option<String>, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::String(s) => Some(s),
        // Zero is falsy and disables dispatch like an empty string
        Value::Number(n) if n.as_f64() != Some(0.0) => Some(n.to_string()),
        _ => None,
    })
}

// Anything but an array means "no patterns"; scalar entries match by their text.
fn de_patterns<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<Vec<String>, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s),
                Value::Number(n) => Some(n.to_string()),
                Value::Bool(b) => Some(b.to_string()),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    })
}

/// Where reports are sent
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    /// `{scheme}://{subdomain}.{host_suffix}{path}`
    Collector {
        scheme: String,
        host_suffix: String,
        path: String,
    },
    /// Every report goes to this URL regardless of subdomain
    Fixed(Url),
}

impl Default for Endpoint {
    fn default() -> Self {
        Self::uriports()
    }
}

impl Endpoint {
    /// Default collector host suffix
    pub const URIPORTS_HOST: &'static str = "uriports.com";
    /// Default collector path
    pub const REPORT_PATH: &'static str = "/reports/report";

    /// `https://{subdomain}.uriports.com/reports/report`
    pub fn uriports() -> Self {
        Endpoint::Collector {
            scheme: "https".to_string(),
            host_suffix: Self::URIPORTS_HOST.to_string(),
            path: Self::REPORT_PATH.to_string(),
        }
    }

    /// Same path layout under another host suffix
    pub fn collector(scheme: impl Into<String>, host_suffix: impl Into<String>) -> Self {
        Endpoint::Collector {
            scheme: scheme.into(),
            host_suffix: host_suffix.into(),
            path: Self::REPORT_PATH.to_string(),
        }
    }

    /// Fixed endpoint URL
    pub fn fixed(url: impl AsRef<str>) -> Result<Self> {
        Ok(Endpoint::Fixed(Url::parse(url.as_ref())?))
    }

    /// Resolve the report URL for a subdomain
    pub fn url_for(&self, subdomain: &str) -> Result<Url> {
        match self {
            Endpoint::Collector {
                scheme,
                host_suffix,
                path,
            } => {
                let url = Url::parse(&format!(
                    "{}://{}.{}{}",
                    scheme, subdomain, host_suffix, path
                ))?;

                // The subdomain may not move the host, port or path
                let expected_host = Host::parse(&format!("{}.{}", subdomain, host_suffix))
                    .map(|host| host.to_string())
                    .ok();
                let host_ok = expected_host.is_some() && url.host_str() == expected_host.as_deref();
                let clean = url.username().is_empty()
                    && url.password().is_none()
                    && url.port().is_none()
                    && url.query().is_none()
                    && url.fragment().is_none();
                if !host_ok || !clean || url.path() != path {
                    return Err(Error::config(format!(
                        "subdomain '{}' does not resolve under {}",
                        subdomain, host_suffix
                    )));
                }
                Ok(url)
            }
            Endpoint::Fixed(url) => Ok(url.clone()),
        }
    }
}

/// Embedder-side reporter options
#[derive(Debug, Clone, Default)]
pub struct ReporterOptions {
    /// Report destination
    pub endpoint: Endpoint,
    /// HTTP client used by the default transport
    pub http: HttpClientConfig,
}

impl ReporterOptions {
    /// Create default options
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the endpoint
    pub fn endpoint(mut self, endpoint: Endpoint) -> Self {
        self.endpoint = endpoint;
        self
    }

    /// Set the HTTP client configuration
    pub fn http(mut self, http: HttpClientConfig) -> Self {
        self.http = http;
        self
    }
}
