// src/api/mod.rs
//! Collector orchestration
//!
//! [`DiagnosticCollector::collect`] drives one run: raw sources in, one
//! canonical [`DiagnosticSnapshot`] out. No fact-resolution failure ever
//! aborts the run; every resolver falls back to a best-effort default and
//! appends an issue. Missing core identity data (the join-state text) is
//! an Error; missing optional sources are Warnings.

use crate::issues::IssueLedger;
use crate::mapping::{self, MdmEnrollment};
use crate::parser::JoinTextParser;
use crate::registry::{normalize_app_workloads, RegistryKey};
use crate::report::parse_report;
use crate::types::{
    AppInstallRecord, DevicePosture, DiagnosticReport, DiagnosticSnapshot, JoinState,
};
use chrono::Utc;
use std::collections::BTreeMap;
use uuid::Uuid;

/// Resolution phase labels used on recorded issues.
pub mod phases {
    pub const JOIN_STATE: &str = "join-state";
    pub const APP_WORKLOADS: &str = "app-workloads";
    pub const ENROLLMENT: &str = "enrollment";
    pub const CLIENT_HEALTH: &str = "client-health";
    pub const DIAGNOSTIC_REPORT: &str = "diagnostic-report";
    pub const POOL: &str = "pool";
}

/// Raw source reader failure: the source could not be reached at all.
/// Always recoverable; resolved fields default per their type.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("source unavailable: {reason}")]
    Unavailable { reason: String },

    #[error("remote transport failure for '{target}': {reason}")]
    Transport { target: String, reason: String },

    #[error("source read timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Boundary to the raw source readers. Each operation is a black box
/// returning data, "absent", or a [`SourceError`]; the engine never looks
/// behind it.
pub trait EndpointSources: Send + Sync {
    /// The join-state text dump, flattened to one string.
    fn join_state_text(&self) -> Result<String, SourceError>;

    /// The app workload registry tree (Win32Apps root), if present.
    fn app_workloads(&self) -> Result<Option<RegistryKey>, SourceError>;

    /// The enrollments registry tree, if present.
    fn enrollments(&self) -> Result<Option<RegistryKey>, SourceError>;

    /// The on-prem client's health-status flags, if the client reports.
    fn client_health_flags(&self) -> Result<Option<i64>, SourceError>;

    /// Whether the on-prem management client is installed.
    fn sccm_installed(&self) -> Result<bool, SourceError>;

    /// The diagnostic report document text, if the tool produced one.
    fn diagnostic_report_xml(&self) -> Result<Option<String>, SourceError>;
}

/// Per-run collector configuration.
#[derive(Debug, Clone, Default)]
pub struct CollectorConfig {
    /// Target identity; see [`crate::target::is_local_target`].
    pub target: String,
    /// Include User-context app fragments in normalization.
    pub include_user_apps: bool,
}

impl CollectorConfig {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            include_user_apps: false,
        }
    }

    pub fn with_user_apps(mut self) -> Self {
        self.include_user_apps = true;
        self
    }
}

/// Collector construction errors.
#[derive(Debug, thiserror::Error)]
pub enum CollectorError {
    #[error("failed to compile join-state field patterns: {0}")]
    Pattern(#[from] regex::Error),
}

/// The diagnostic collector: one instance, fresh snapshot per run.
pub struct DiagnosticCollector {
    config: CollectorConfig,
    join_parser: JoinTextParser,
}

impl DiagnosticCollector {
    pub fn new(config: CollectorConfig) -> Result<Self, CollectorError> {
        Ok(Self {
            config,
            join_parser: JoinTextParser::new()?,
        })
    }

    pub fn config(&self) -> &CollectorConfig {
        &self.config
    }

    /// Run one collection against the given sources.
    ///
    /// Each run starts a fresh issue ledger and produces a snapshot from
    /// whatever the sources yield; nothing is cached across invocations.
    pub fn collect(&self, sources: &dyn EndpointSources) -> DiagnosticSnapshot {
        let issues = IssueLedger::new();

        let join_state = self.resolve_join_state(sources, &issues);
        let apps = self.resolve_apps(sources, &issues);
        let enrollment = self.resolve_enrollment(sources, &issues);
        let health_flags = self.resolve_health_flags(sources, &issues);
        let sccm_installed = self.resolve_sccm(sources, &issues);
        let report = self.resolve_report(sources, &issues);

        let posture = DevicePosture {
            azure_ad_joined: join_state.azure_ad_joined,
            domain_joined: join_state.domain_joined,
            sccm_installed,
            mdm_enrolled: enrollment.enrolled,
            co_managed: mapping::co_managed(health_flags),
        };
        let classification = mapping::classify(&posture);

        log::info!(
            "collection for '{}' classified as '{}' ({} apps, {} issues)",
            self.config.target,
            classification,
            apps.len(),
            issues.len()
        );

        DiagnosticSnapshot {
            collected_at: Utc::now(),
            target: self.config.target.clone(),
            join_state,
            posture,
            classification,
            mdm_provider_id: enrollment.provider_id,
            client_health_flags: health_flags,
            apps,
            report,
            issues: issues.snapshot(),
        }
    }

    fn resolve_join_state(&self, sources: &dyn EndpointSources, issues: &IssueLedger) -> JoinState {
        match sources.join_state_text() {
            Ok(text) => self.join_parser.parse(&text),
            Err(e) => {
                // Core identity data: its absence is an Error, but the run
                // continues with a fully-default record.
                issues.error(phases::JOIN_STATE, e.to_string());
                JoinState::default()
            }
        }
    }

    fn resolve_apps(
        &self,
        sources: &dyn EndpointSources,
        issues: &IssueLedger,
    ) -> BTreeMap<Uuid, AppInstallRecord> {
        let mut apps = match sources.app_workloads() {
            Ok(Some(root)) => {
                normalize_app_workloads(&root, self.config.include_user_apps, issues)
            }
            Ok(None) => BTreeMap::new(),
            Err(e) => {
                issues.warning(phases::APP_WORKLOADS, e.to_string());
                BTreeMap::new()
            }
        };

        mapping::finalize_install_states(&mut apps);
        apps
    }

    fn resolve_enrollment(
        &self,
        sources: &dyn EndpointSources,
        issues: &IssueLedger,
    ) -> MdmEnrollment {
        match sources.enrollments() {
            Ok(Some(root)) => mapping::detect_mdm_enrollment(&root),
            Ok(None) => MdmEnrollment::default(),
            Err(e) => {
                issues.warning(phases::ENROLLMENT, e.to_string());
                MdmEnrollment::default()
            }
        }
    }

    fn resolve_health_flags(
        &self,
        sources: &dyn EndpointSources,
        issues: &IssueLedger,
    ) -> Option<i64> {
        match sources.client_health_flags() {
            Ok(flags) => flags,
            Err(e) => {
                issues.warning(phases::CLIENT_HEALTH, e.to_string());
                None
            }
        }
    }

    fn resolve_sccm(&self, sources: &dyn EndpointSources, issues: &IssueLedger) -> bool {
        match sources.sccm_installed() {
            Ok(installed) => installed,
            Err(e) => {
                issues.warning(phases::CLIENT_HEALTH, e.to_string());
                false
            }
        }
    }

    fn resolve_report(
        &self,
        sources: &dyn EndpointSources,
        issues: &IssueLedger,
    ) -> DiagnosticReport {
        match sources.diagnostic_report_xml() {
            Ok(Some(xml)) => match parse_report(&xml) {
                Ok(report) => report,
                Err(e) => {
                    issues.warning(phases::DIAGNOSTIC_REPORT, e.to_string());
                    DiagnosticReport::default()
                }
            },
            Ok(None) => DiagnosticReport::default(),
            Err(e) => {
                issues.warning(phases::DIAGNOSTIC_REPORT, e.to_string());
                DiagnosticReport::default()
            }
        }
    }
}
