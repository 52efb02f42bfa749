// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Violation reporter pipeline
//!
//! Every event runs config resolution, the filter chain, deduplication and
//! dispatch in that order. Nothing in here returns an error to the caller:
//! failures are logged and the event is dropped.

use std::sync::Arc;

use tokio::runtime::Handle;

use super::config::{Endpoint, ReporterConfig, ReporterOptions};
use super::dedup::ReportedViolations;
use super::dispatch::{deliver, CspReportPayload, DeliveryStatus, Dispatch, HttpTransport, ReportTransport};
use super::stats::{ReporterStats, StatKind, StatsReport};
use crate::dom::ConfigSource;
use crate::error::{Error, Result};
use crate::security::{apply_filters, FilterVerdict, RandomSampler, Sampler, ViolationEvent};

/// What happened to one event
#[derive(Debug)]
pub enum Outcome {
    /// No configuration in the host document
    Disabled,
    /// Configuration present but unusable
    MalformedConfig,
    /// Rejected by the filter chain
    Filtered(FilterVerdict),
    /// Same violation already reported
    Duplicate,
    /// No subdomain configured
    NoEndpoint,
    /// Report handed off for delivery
    Dispatched(Dispatch),
}

impl Outcome {
    /// Whether a report was sent for this event
    pub fn is_dispatched(&self) -> bool {
        matches!(self, Outcome::Dispatched(_))
    }

    /// Take the dispatch handle, if any
    pub fn into_dispatch(self) -> Option<Dispatch> {
        match self {
            Outcome::Dispatched(dispatch) => Some(dispatch),
            _ => None,
        }
    }

    /// Short label for logs
    pub fn label(&self) -> &'static str {
        match self {
            Outcome::Disabled => "disabled",
            Outcome::MalformedConfig => "malformed-config",
            Outcome::Filtered(FilterVerdict::SampledOut { .. }) => "sampled-out",
            Outcome::Filtered(FilterVerdict::ExtensionOrigin) => "extension-origin",
            Outcome::Filtered(FilterVerdict::Ignored { .. }) => "ignored",
            Outcome::Filtered(FilterVerdict::Pass) => "pass",
            Outcome::Duplicate => "duplicate",
            Outcome::NoEndpoint => "no-endpoint",
            Outcome::Dispatched(_) => "dispatched",
        }
    }
}

/// Collects CSP violations and forwards each distinct one at most once
pub struct ViolationReporter {
    source: Arc<dyn ConfigSource>,
    transport: Arc<dyn ReportTransport>,
    sampler: Arc<dyn Sampler>,
    endpoint: Endpoint,
    reported: ReportedViolations,
    stats: Arc<ReporterStats>,
    runtime: Handle,
}

impl std::fmt::Debug for ViolationReporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ViolationReporter")
            .field("endpoint", &self.endpoint)
            .field("reported", &self.reported.len())
            .finish()
    }
}

impl ViolationReporter {
    /// Reporter with default options, reading config from `source`.
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(source: impl ConfigSource + 'static) -> Result<Self> {
        Self::builder(source).build()
    }

    /// Start building a reporter
    pub fn builder(source: impl ConfigSource + 'static) -> ReporterBuilder {
        ReporterBuilder {
            source: Arc::new(source),
            options: ReporterOptions::default(),
            transport: None,
            sampler: None,
            runtime: None,
        }
    }

    /// Run one violation event through the pipeline
    pub fn handle(&self, event: &ViolationEvent) -> Outcome {
        self.stats.record_event();
        let outcome = self.process(event);
        tracing::debug!(
            outcome = outcome.label(),
            blocked_uri = event.blocked_uri.as_deref().unwrap_or(""),
            directive = event.effective_directive.as_deref().unwrap_or(""),
            "CSP violation handled"
        );
        outcome
    }

    fn process(&self, event: &ViolationEvent) -> Outcome {
        let config = match self.resolve_config() {
            Ok(Some(config)) => config,
            Ok(None) => {
                self.stats.record(StatKind::Disabled);
                return Outcome::Disabled;
            }
            Err(e) => {
                self.stats.record(StatKind::MalformedConfig);
                tracing::error!(error = %e, "Failed to parse CSP report config");
                return Outcome::MalformedConfig;
            }
        };

        let verdict = apply_filters(&config, event, self.sampler.as_ref());
        if !verdict.passed() {
            self.stats.record(match verdict {
                FilterVerdict::SampledOut { .. } => StatKind::SampledOut,
                FilterVerdict::ExtensionOrigin => StatKind::ExtensionOrigin,
                _ => StatKind::Ignored,
            });
            return Outcome::Filtered(verdict);
        }

        // Recorded before the send starts so repeats arriving mid-flight are
        // suppressed; never rolled back.
        let key = event.key();
        if !self.reported.insert_if_new(key.clone()) {
            self.stats.record(StatKind::Duplicate);
            return Outcome::Duplicate;
        }

        let Some(subdomain) = config.endpoint_subdomain() else {
            self.stats.record(StatKind::NoEndpoint);
            return Outcome::NoEndpoint;
        };

        self.stats.record(StatKind::Dispatched);
        let endpoint = match self.endpoint.url_for(subdomain) {
            Ok(url) => url,
            Err(e) => {
                self.stats.record(StatKind::Failed);
                tracing::error!(subdomain, error = %e, "Failed to send CSP report");
                return Outcome::Dispatched(Dispatch::settled(
                    key,
                    None,
                    DeliveryStatus::Failed(e.to_string()),
                ));
            }
        };

        let payload = CspReportPayload::from_event(event, config.effective_fraction());
        tracing::info!(
            endpoint = %endpoint,
            directive = event.effective_directive.as_deref().unwrap_or(""),
            "Sending CSP report"
        );

        let task = self.runtime.spawn(deliver(
            self.transport.clone(),
            endpoint.clone(),
            payload,
            self.stats.clone(),
        ));

        Outcome::Dispatched(Dispatch::in_flight(key, endpoint, task))
    }

    fn resolve_config(&self) -> Result<Option<ReporterConfig>> {
        match self.source.config_text()? {
            Some(text) => Ok(Some(ReporterConfig::parse(&text)?)),
            None => Ok(None),
        }
    }

    /// Violations reported so far
    pub fn reported(&self) -> &ReportedViolations {
        &self.reported
    }

    /// Snapshot of the counters
    pub fn stats(&self) -> StatsReport {
        self.stats.report()
    }

    /// Configured endpoint
    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }
}

/// Builder for [`ViolationReporter`]
pub struct ReporterBuilder {
    source: Arc<dyn ConfigSource>,
    options: ReporterOptions,
    transport: Option<Arc<dyn ReportTransport>>,
    sampler: Option<Arc<dyn Sampler>>,
    runtime: Option<Handle>,
}

impl ReporterBuilder {
    /// Set the options
    pub fn options(mut self, options: ReporterOptions) -> Self {
        self.options = options;
        self
    }

    /// Set the endpoint
    pub fn endpoint(mut self, endpoint: Endpoint) -> Self {
        self.options.endpoint = endpoint;
        self
    }

    /// Replace the HTTP transport
    pub fn transport(mut self, transport: impl ReportTransport + 'static) -> Self {
        self.transport = Some(Arc::new(transport));
        self
    }

    /// Replace the random sampler
    pub fn sampler(mut self, sampler: impl Sampler + 'static) -> Self {
        self.sampler = Some(Arc::new(sampler));
        self
    }

    /// Spawn deliveries on this runtime instead of the current one
    pub fn runtime(mut self, runtime: Handle) -> Self {
        self.runtime = Some(runtime);
        self
    }

    /// Build the reporter
    pub fn build(self) -> Result<ViolationReporter> {
        let runtime = match self.runtime {
            Some(handle) => handle,
            None => Handle::try_current()
                .map_err(|_| Error::config("no tokio runtime available for report delivery"))?,
        };

        let transport = match self.transport {
            Some(transport) => transport,
            None => Arc::new(HttpTransport::with_config(self.options.http.clone())?),
        };

        Ok(ViolationReporter {
            source: self.source,
            transport,
            sampler: self.sampler.unwrap_or_else(|| Arc::new(RandomSampler)),
            endpoint: self.options.endpoint,
            reported: ReportedViolations::new(),
            stats: Arc::new(ReporterStats::new()),
            runtime,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{HostDocument, StaticConfig};
    use crate::security::FixedSampler;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use url::Url;

    #[derive(Default)]
    struct RecordingTransport {
        sent: Mutex<Vec<(Url, String)>>,
        fail: bool,
    }

    impl RecordingTransport {
        fn failing() -> Self {
            Self {
                fail: true,
                ..Default::default()
            }
        }

        fn count(&self) -> usize {
            self.sent.lock().len()
        }
    }

    #[async_trait]
    impl ReportTransport for RecordingTransport {
        async fn send(&self, endpoint: &Url, payload: &CspReportPayload) -> Result<()> {
            self.sent.lock().push((endpoint.clone(), payload.to_json()?));
            if self.fail {
                return Err(Error::network("connection refused"));
            }
            Ok(())
        }
    }

    fn reporter(
        source: impl ConfigSource + 'static,
        transport: Arc<RecordingTransport>,
        draw: f64,
    ) -> ViolationReporter {
        ViolationReporter::builder(source)
            .transport(transport)
            .sampler(FixedSampler(draw))
            .build()
            .unwrap()
    }

    fn event() -> ViolationEvent {
        ViolationEvent::new()
            .blocked_uri("https://evil.test/x.js")
            .document_uri("https://acme.example/page")
            .effective_directive("script-src")
    }

    #[tokio::test]
    async fn test_end_to_end_report() {
        let transport = Arc::new(RecordingTransport::default());
        let reporter = reporter(
            StaticConfig::new(r#"{"subdomain":"acme","fraction":1}"#),
            transport.clone(),
            0.42,
        );

        let dispatch = reporter.handle(&event()).into_dispatch().unwrap();
        assert_eq!(
            dispatch.endpoint().unwrap().as_str(),
            "https://acme.uriports.com/reports/report"
        );
        assert_eq!(dispatch.wait().await, DeliveryStatus::Delivered);

        let sent = transport.sent.lock();
        assert_eq!(sent.len(), 1);
        let (url, body) = &sent[0];
        assert_eq!(url.as_str(), "https://acme.uriports.com/reports/report");
        assert!(body.contains(r#""blockedURL":"https://evil.test/x.js""#));
        assert!(body.contains(r#""sourceFile":null"#));
        assert!(body.contains(r#""fraction":1"#));
    }

    #[tokio::test]
    async fn test_same_event_twice_sends_once() {
        let transport = Arc::new(RecordingTransport::default());
        let reporter = reporter(StaticConfig::new(r#"{"subdomain":"acme"}"#), transport.clone(), 0.0);

        let first = reporter.handle(&event());
        let second = reporter.handle(&event());
        assert!(matches!(second, Outcome::Duplicate));

        first.into_dispatch().unwrap().wait().await;
        assert_eq!(transport.count(), 1);
        assert_eq!(reporter.stats().duplicates, 1);
    }

    #[tokio::test]
    async fn test_equivalent_events_deduplicated() {
        let transport = Arc::new(RecordingTransport::default());
        let reporter = reporter(StaticConfig::new(r#"{"subdomain":"acme"}"#), transport.clone(), 0.0);

        let first = reporter.handle(&event().location(1, 1));
        let repeat = reporter.handle(&event().location(99, 3).status_code(404));
        assert!(matches!(repeat, Outcome::Duplicate));

        let other = reporter.handle(&event().effective_directive("script-src-elem"));
        assert!(other.is_dispatched());

        first.into_dispatch().unwrap().wait().await;
        other.into_dispatch().unwrap().wait().await;
        assert_eq!(transport.count(), 2);
    }

    #[tokio::test]
    async fn test_absent_config_disables() {
        let transport = Arc::new(RecordingTransport::default());
        let reporter = reporter(StaticConfig::absent(), transport.clone(), 0.0);

        for _ in 0..3 {
            assert!(matches!(reporter.handle(&event()), Outcome::Disabled));
        }
        assert_eq!(transport.count(), 0);
        assert!(reporter.reported().is_empty());
        assert_eq!(reporter.stats().disabled, 3);
    }

    #[tokio::test]
    async fn test_missing_config_element_disables() {
        let transport = Arc::new(RecordingTransport::default());
        let doc = HostDocument::new("<html><body><p>shop</p></body></html>");
        let reporter = reporter(doc, transport.clone(), 0.0);

        assert!(matches!(reporter.handle(&event()), Outcome::Disabled));
        assert_eq!(transport.count(), 0);
    }

    #[tokio::test]
    async fn test_config_from_host_document() {
        let transport = Arc::new(RecordingTransport::default());
        let doc = HostDocument::new(
            r#"<html><head>
                <script type="application/json" id="uriports-csp-report-config">
                    {"subdomain": "shop", "fraction": 0.5}
                </script>
            </head><body></body></html>"#,
        );
        let reporter = reporter(doc, transport.clone(), 0.5);

        let status = reporter.handle(&event()).into_dispatch().unwrap().wait().await;
        assert!(status.is_delivered());

        let sent = transport.sent.lock();
        assert_eq!(sent[0].0.as_str(), "https://shop.uriports.com/reports/report");
        assert!(sent[0].1.contains(r#""fraction":0.5"#));
    }

    #[tokio::test]
    async fn test_malformed_config_halts() {
        let transport = Arc::new(RecordingTransport::default());
        let reporter = reporter(StaticConfig::new("{ subdomain: acme"), transport.clone(), 0.0);

        assert!(matches!(reporter.handle(&event()), Outcome::MalformedConfig));
        assert_eq!(transport.count(), 0);
        assert!(reporter.reported().is_empty());
        assert_eq!(reporter.stats().malformed_config, 1);
    }

    #[tokio::test]
    async fn test_config_reread_per_event() {
        let transport = Arc::new(RecordingTransport::default());
        let source = StaticConfig::absent();
        let reporter = reporter(source.clone(), transport.clone(), 0.0);

        assert!(matches!(reporter.handle(&event()), Outcome::Disabled));

        source.set(r#"{"subdomain":"acme"}"#);
        let outcome = reporter.handle(&event());
        outcome.into_dispatch().unwrap().wait().await;
        assert_eq!(transport.count(), 1);
    }

    #[tokio::test]
    async fn test_zero_fraction_drops() {
        let transport = Arc::new(RecordingTransport::default());
        let reporter = reporter(
            StaticConfig::new(r#"{"subdomain":"acme","fraction":0}"#),
            transport.clone(),
            0.3,
        );

        assert!(matches!(
            reporter.handle(&event()),
            Outcome::Filtered(FilterVerdict::SampledOut { .. })
        ));
        assert_eq!(transport.count(), 0);
        // Sampled-out events are not recorded as reported
        assert!(reporter.reported().is_empty());
    }

    #[tokio::test]
    async fn test_zero_fraction_zero_draw_passes() {
        let transport = Arc::new(RecordingTransport::default());
        let reporter = reporter(
            StaticConfig::new(r#"{"subdomain":"acme","fraction":0}"#),
            transport.clone(),
            0.0,
        );

        let dispatch = reporter.handle(&event()).into_dispatch().unwrap();
        dispatch.wait().await;
        assert!(transport.sent.lock()[0].1.contains(r#""fraction":0"#));
    }

    #[tokio::test]
    async fn test_extension_source_dropped() {
        let transport = Arc::new(RecordingTransport::default());
        let reporter = reporter(StaticConfig::new(r#"{"subdomain":"acme"}"#), transport.clone(), 0.0);

        let outcome = reporter.handle(&event().source_file("moz-extension://abc/script.js"));
        assert!(matches!(outcome, Outcome::Filtered(FilterVerdict::ExtensionOrigin)));
        assert_eq!(transport.count(), 0);
        assert_eq!(reporter.stats().extension_origin, 1);
    }

    #[tokio::test]
    async fn test_ignore_pattern_dropped() {
        let transport = Arc::new(RecordingTransport::default());
        let reporter = reporter(
            StaticConfig::new(r#"{"subdomain":"acme","ignorePatterns":["analytics.example.com"]}"#),
            transport.clone(),
            0.0,
        );

        let outcome = reporter.handle(&event().blocked_uri("https://analytics.example.com/x.js"));
        assert_eq!(outcome.label(), "ignored");
        assert_eq!(transport.count(), 0);
    }

    #[tokio::test]
    async fn test_no_subdomain_still_marks_reported() {
        let transport = Arc::new(RecordingTransport::default());
        let source = StaticConfig::new(r#"{"fraction":1}"#);
        let reporter = reporter(source.clone(), transport.clone(), 0.0);

        assert!(matches!(reporter.handle(&event()), Outcome::NoEndpoint));
        assert!(reporter.reported().contains(&event().key()));

        source.set(r#"{"subdomain":"acme"}"#);
        assert!(matches!(reporter.handle(&event()), Outcome::Duplicate));
        assert_eq!(transport.count(), 0);
    }

    #[tokio::test]
    async fn test_failed_send_keeps_key() {
        let transport = Arc::new(RecordingTransport::failing());
        let reporter = reporter(StaticConfig::new(r#"{"subdomain":"acme"}"#), transport.clone(), 0.0);

        let status = reporter.handle(&event()).into_dispatch().unwrap().wait().await;
        assert!(matches!(status, DeliveryStatus::Failed(_)));

        assert!(matches!(reporter.handle(&event()), Outcome::Duplicate));
        assert_eq!(transport.count(), 1);

        let stats = reporter.stats();
        assert_eq!(stats.dispatched, 1);
        assert_eq!(stats.failed, 1);
        assert_eq!(stats.delivered, 0);
    }

    #[tokio::test]
    async fn test_invalid_subdomain_fails_without_sending() {
        let transport = Arc::new(RecordingTransport::default());
        let reporter = reporter(StaticConfig::new(r#"{"subdomain":"a b"}"#), transport.clone(), 0.0);

        let dispatch = reporter.handle(&event()).into_dispatch().unwrap();
        assert!(dispatch.endpoint().is_none());
        assert!(matches!(dispatch.wait().await, DeliveryStatus::Failed(_)));
        assert_eq!(transport.count(), 0);
        assert!(matches!(reporter.handle(&event()), Outcome::Duplicate));
    }

    #[tokio::test]
    async fn test_fixed_endpoint() {
        let transport = Arc::new(RecordingTransport::default());
        let reporter = ViolationReporter::builder(StaticConfig::new(r#"{"subdomain":"acme"}"#))
            .endpoint(Endpoint::fixed("http://127.0.0.1:9/collect").unwrap())
            .transport(transport.clone())
            .sampler(FixedSampler(0.0))
            .build()
            .unwrap();

        reporter.handle(&event()).into_dispatch().unwrap().wait().await;
        assert_eq!(transport.sent.lock()[0].0.as_str(), "http://127.0.0.1:9/collect");
    }

    #[test]
    fn test_build_requires_runtime() {
        let err = ViolationReporter::builder(StaticConfig::absent())
            .transport(RecordingTransport::default())
            .build()
            .unwrap_err();
        assert!(err.is_config());
    }

    #[test]
    fn test_build_inside_runtime() {
        let reporter = tokio_test::block_on(async { ViolationReporter::new(StaticConfig::absent()) });
        assert!(reporter.is_ok());
    }
}
