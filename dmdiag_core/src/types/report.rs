// src/types/report.rs
//! Flat value objects extracted from the diagnostic report
//!
//! No cross-record relationships; lists preserve document order, which is
//! not guaranteed stable across runs.

use serde::{Deserialize, Serialize};

/// Enrollment information from the diagnostic report. Every field is
/// optional; the report schema tolerates absence everywhere.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrollmentInfo {
    pub enrollment_id: Option<String>,
    pub provider_id: Option<String>,
    pub enrollment_type: Option<String>,
    pub enrollment_state: Option<String>,
    pub upn: Option<String>,
}

/// One managed policy entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyRecord {
    pub area: Option<String>,
    pub name: Option<String>,
    pub value: Option<String>,
    pub source: Option<String>,
}

/// One management certificate entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertificateRecord {
    pub thumbprint: Option<String>,
    pub subject: Option<String>,
    pub issuer: Option<String>,
    pub not_after: Option<String>,
}

/// The three independent collections extracted from one report document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagnosticReport {
    pub enrollment: EnrollmentInfo,
    pub policies: Vec<PolicyRecord>,
    pub certificates: Vec<CertificateRecord>,
}

impl DiagnosticReport {
    /// True when no section of the report yielded any data.
    pub fn is_empty(&self) -> bool {
        self.enrollment == EnrollmentInfo::default()
            && self.policies.is_empty()
            && self.certificates.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_report_is_empty() {
        assert!(DiagnosticReport::default().is_empty());
    }

    #[test]
    fn test_report_with_policy_is_not_empty() {
        let report = DiagnosticReport {
            policies: vec![PolicyRecord {
                area: Some("Update".to_string()),
                ..Default::default()
            }],
            ..Default::default()
        };
        assert!(!report.is_empty());
    }
}
