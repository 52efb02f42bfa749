// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Report payload and delivery
//!
//! Delivery is best-effort and at most once: a failed send is logged and
//! counted, never retried.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize, Serializer};
use tokio::task::JoinHandle;
use url::Url;

use super::stats::{ReporterStats, StatKind};
use crate::error::{Error, Result};
use crate::http::{HttpClient, HttpClientConfig};
use crate::security::{ViolationEvent, ViolationKey};

/// Body POSTed to the collector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CspReportPayload {
    #[serde(rename = "csp-report")]
    pub csp_report: CspReport,
}

/// Normalized violation data. Every key is always serialized, absent values
/// as `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CspReport {
    #[serde(rename = "blockedURL")]
    pub blocked_url: Option<String>,
    #[serde(rename = "columnNumber")]
    pub column_number: Option<u64>,
    #[serde(rename = "documentURL")]
    pub document_url: Option<String>,
    #[serde(rename = "effectiveDirective")]
    pub effective_directive: Option<String>,
    #[serde(rename = "lineNumber")]
    pub line_number: Option<u64>,
    #[serde(rename = "originalPolicy")]
    pub original_policy: Option<String>,
    #[serde(rename = "sourceFile")]
    pub source_file: Option<String>,
    #[serde(rename = "statusCode")]
    pub status_code: Option<u16>,
    pub referrer: Option<String>,
    pub sample: Option<String>,
    pub disposition: Option<String>,
    /// Sampling fraction the report survived; lets the collector scale counts
    #[serde(serialize_with = "serialize_fraction")]
    pub fraction: f64,
}

impl CspReportPayload {
    /// Build the payload for an event sampled at `fraction`
    pub fn from_event(event: &ViolationEvent, fraction: f64) -> Self {
        Self {
            csp_report: CspReport {
                blocked_url: event.blocked_uri.clone(),
                column_number: event.column_number,
                document_url: event.document_uri.clone(),
                effective_directive: event.effective_directive.clone(),
                line_number: event.line_number,
                original_policy: event.original_policy.clone(),
                source_file: event.source_file.clone(),
                status_code: event.status_code,
                referrer: event.referrer.clone(),
                sample: event.sample.clone(),
                disposition: event.disposition.clone(),
                fraction,
            },
        }
    }

    /// Compact JSON text of the payload
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

// Whole fractions go out as integers (`1`, not `1.0`).
fn serialize_fraction<S: Serializer>(fraction: &f64, s: S) -> std::result::Result<S::Ok, S::Error> {
    const MAX_EXACT: f64 = 9_007_199_254_740_992.0;
    if fraction.is_finite() && fraction.fract() == 0.0 && fraction.abs() <= MAX_EXACT {
        s.serialize_i64(*fraction as i64)
    } else {
        s.serialize_f64(*fraction)
    }
}

/// Sends report payloads to the collector
#[async_trait]
pub trait ReportTransport: Send + Sync {
    /// Deliver one payload. `Ok` means the collector accepted it.
    async fn send(&self, endpoint: &Url, payload: &CspReportPayload) -> Result<()>;
}

#[async_trait]
impl<T: ReportTransport + ?Sized> ReportTransport for Arc<T> {
    async fn send(&self, endpoint: &Url, payload: &CspReportPayload) -> Result<()> {
        (**self).send(endpoint, payload).await
    }
}

/// Transport POSTing JSON over HTTP
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: HttpClient,
}

impl HttpTransport {
    /// Use an existing client
    pub fn new(client: HttpClient) -> Self {
        Self { client }
    }

    /// Build a client from configuration
    pub fn with_config(config: HttpClientConfig) -> Result<Self> {
        Ok(Self::new(HttpClient::with_config(config)?))
    }
}

#[async_trait]
impl ReportTransport for HttpTransport {
    async fn send(&self, endpoint: &Url, payload: &CspReportPayload) -> Result<()> {
        let status = self.client.post_json(endpoint, payload).await?;
        if !status.is_success() {
            return Err(Error::rejected(endpoint.as_str(), status.as_u16()));
        }
        Ok(())
    }
}

/// Final state of a dispatched report
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryStatus {
    /// Collector accepted the report
    Delivered,
    /// Send failed; the reason was already logged
    Failed(String),
}

impl DeliveryStatus {
    /// Whether the report was accepted
    pub fn is_delivered(&self) -> bool {
        matches!(self, DeliveryStatus::Delivered)
    }
}

#[derive(Debug)]
enum DispatchState {
    InFlight(JoinHandle<DeliveryStatus>),
    Settled(DeliveryStatus),
}

/// Handle to a report being sent in the background.
///
/// Dropping it detaches the send; awaiting [`Dispatch::wait`] yields the
/// delivery status.
#[derive(Debug)]
pub struct Dispatch {
    key: ViolationKey,
    endpoint: Option<Url>,
    state: DispatchState,
}

impl Dispatch {
    pub(crate) fn in_flight(key: ViolationKey, endpoint: Url, task: JoinHandle<DeliveryStatus>) -> Self {
        Self {
            key,
            endpoint: Some(endpoint),
            state: DispatchState::InFlight(task),
        }
    }

    pub(crate) fn settled(key: ViolationKey, endpoint: Option<Url>, status: DeliveryStatus) -> Self {
        Self {
            key,
            endpoint,
            state: DispatchState::Settled(status),
        }
    }

    /// Fingerprint of the reported violation
    pub fn key(&self) -> &ViolationKey {
        &self.key
    }

    /// Report URL, if it could be resolved
    pub fn endpoint(&self) -> Option<&Url> {
        self.endpoint.as_ref()
    }

    /// Wait for the send to finish
    pub async fn wait(self) -> DeliveryStatus {
        match self.state {
            DispatchState::Settled(status) => status,
            DispatchState::InFlight(task) => match task.await {
                Ok(status) => status,
                Err(e) => DeliveryStatus::Failed(format!("delivery task ended abnormally: {}", e)),
            },
        }
    }
}

/// Send one payload, logging and counting the result
pub(crate) async fn deliver(
    transport: Arc<dyn ReportTransport>,
    endpoint: Url,
    payload: CspReportPayload,
    stats: Arc<ReporterStats>,
) -> DeliveryStatus {
    match transport.send(&endpoint, &payload).await {
        Ok(()) => {
            stats.record(StatKind::Delivered);
            tracing::debug!(endpoint = %endpoint, "CSP report delivered");
            DeliveryStatus::Delivered
        }
        Err(e) => {
            stats.record(StatKind::Failed);
            tracing::error!(endpoint = %endpoint, error = %e, "Failed to send CSP report");
            DeliveryStatus::Failed(e.to_string())
        }
    }
}
