// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! CSP violation events

use std::fmt;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};

/// A `securitypolicyviolation` event as raised by the browser.
///
/// Every field is optional; browsers leave many of them out depending on the
/// directive that fired. Keys follow the DOM attribute names so events can be
/// deserialized straight from their JSON form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViolationEvent {
    /// URI of the resource that was blocked
    #[serde(rename = "blockedURI")]
    pub blocked_uri: Option<String>,
    /// URI of the document in which the violation occurred
    #[serde(rename = "documentURI")]
    pub document_uri: Option<String>,
    /// Directive whose enforcement caused the violation
    #[serde(rename = "effectiveDirective")]
    pub effective_directive: Option<String>,
    /// Script that caused the violation
    #[serde(rename = "sourceFile")]
    pub source_file: Option<String>,
    /// Line in `source_file`
    #[serde(rename = "lineNumber")]
    pub line_number: Option<u64>,
    /// Column in `source_file`
    #[serde(rename = "columnNumber")]
    pub column_number: Option<u64>,
    /// Full policy that was violated
    #[serde(rename = "originalPolicy")]
    pub original_policy: Option<String>,
    /// HTTP status of the document
    #[serde(rename = "statusCode")]
    pub status_code: Option<u16>,
    /// Referrer of the document
    pub referrer: Option<String>,
    /// First characters of the offending inline script or style
    pub sample: Option<String>,
    /// `enforce` or `report`
    pub disposition: Option<String>,
}

impl ViolationEvent {
    /// Create an empty event
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the blocked URI
    pub fn blocked_uri(mut self, uri: impl Into<String>) -> Self {
        self.blocked_uri = Some(uri.into());
        self
    }

    /// Set the document URI
    pub fn document_uri(mut self, uri: impl Into<String>) -> Self {
        self.document_uri = Some(uri.into());
        self
    }

    /// Set the effective directive
    pub fn effective_directive(mut self, directive: impl Into<String>) -> Self {
        self.effective_directive = Some(directive.into());
        self
    }

    /// Set the source file
    pub fn source_file(mut self, file: impl Into<String>) -> Self {
        self.source_file = Some(file.into());
        self
    }

    /// Set line and column in the source file
    pub fn location(mut self, line: u64, column: u64) -> Self {
        self.line_number = Some(line);
        self.column_number = Some(column);
        self
    }

    /// Set the original policy
    pub fn original_policy(mut self, policy: impl Into<String>) -> Self {
        self.original_policy = Some(policy.into());
        self
    }

    /// Set the document status code
    pub fn status_code(mut self, status: u16) -> Self {
        self.status_code = Some(status);
        self
    }

    /// Set the disposition
    pub fn disposition(mut self, disposition: impl Into<String>) -> Self {
        self.disposition = Some(disposition.into());
        self
    }

    /// Fingerprint used for deduplication
    pub fn key(&self) -> ViolationKey {
        ViolationKey::from_event(self)
    }
}

/// Deduplication fingerprint of a violation.
///
/// Base64 of `blockedURI|documentURI|effectiveDirective|sourceFile`, absent
/// fields contributing an empty string. Never decoded.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ViolationKey(String);

impl ViolationKey {
    /// Separator between the fingerprinted fields
    pub const DELIMITER: &'static str = "|";

    /// Derive the key of an event
    pub fn from_event(event: &ViolationEvent) -> Self {
        let parts = [
            event.blocked_uri.as_deref(),
            event.document_uri.as_deref(),
            event.effective_directive.as_deref(),
            event.source_file.as_deref(),
        ];

        let joined = parts
            .iter()
            .map(|p| p.unwrap_or(""))
            .collect::<Vec<_>>()
            .join(Self::DELIMITER);

        Self(STANDARD.encode(joined))
    }

    /// Encoded form
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ViolationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
