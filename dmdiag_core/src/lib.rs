//! # DMDiag Core - Device Management Diagnostic Collector
//!
//! Gathers heterogeneously-shaped management signals from a Windows endpoint
//! (join-state text dumps, multi-shaped registry trees, XML diagnostic
//! reports) and reconciles them into one canonical snapshot: device join
//! type, management classification, and per-application installation state.

pub mod api;
pub mod issues;
pub mod mapping;
pub mod parser;
pub mod pool;
pub mod registry;
pub mod report;
pub mod target;
pub mod types;

// Convenience re-exports
pub use api::{CollectorConfig, CollectorError, DiagnosticCollector, EndpointSources, SourceError};

pub mod prelude {
    pub use crate::api::{
        phases, CollectorConfig, CollectorError, DiagnosticCollector, EndpointSources, SourceError,
    };

    pub use crate::issues::{CollectionIssue, IssueLedger, IssueSummary, Severity};

    pub use crate::mapping::{classify, co_managed, detect_mdm_enrollment, MdmEnrollment};
    pub use crate::parser::JoinTextParser;
    pub use crate::registry::{normalize_app_workloads, RegistryKey, RegistryValue};
    pub use crate::report::{parse_report, ReportTool, ReportToolConfig, ReportToolError};

    pub use crate::types::{
        AppContext, AppInstallRecord, CertificateRecord, DevicePosture, DiagnosticReport,
        DiagnosticSnapshot, EnrollmentInfo, InstallState, JoinState, ManagementType, PolicyRecord,
    };
}
