// src/mapping/mod.rs
//! Code-to-state mapping and the management classification engine
//!
//! Two independent status systems feed the shared install-state
//! vocabulary: the four-digit enforcement code is authoritative when
//! present, the single-digit compliance code applies only as a fallback.
//! The two signals are never averaged or blended.
//!
//! Classification is a pure decision table over five posture booleans,
//! total over all 32 combinations.

use crate::registry::RegistryKey;
use crate::types::{AppInstallRecord, DevicePosture, InstallState, ManagementType};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

// ============================================================================
// INSTALL STATE TABLES
// ============================================================================

impl InstallState {
    /// Map a four-digit enforcement code. Out-of-range codes (including
    /// negatives) map to `Unknown`, never an error.
    pub fn from_enforcement(code: i64) -> Self {
        match code {
            1000 => Self::Installed,
            2000..=2999 => Self::InstallPending,
            3000..=3999 => Self::NotApplicable,
            c if c >= 4000 => Self::Failed,
            _ => Self::Unknown,
        }
    }

    /// Map a single-digit compliance code.
    pub fn from_compliance(code: i64) -> Self {
        match code {
            1 => Self::Installed,
            2 => Self::NotInstalled,
            3 | 4 => Self::Failed,
            5 => Self::Unknown,
            _ => Self::Unknown,
        }
    }

    /// Two-tier fallback: enforcement wins whenever it reported, even if
    /// the two systems disagree; compliance applies only when enforcement
    /// is absent; neither present yields `Unknown`.
    pub fn derive(enforcement: Option<i64>, compliance: Option<i64>) -> Self {
        match (enforcement, compliance) {
            (Some(code), _) => Self::from_enforcement(code),
            (None, Some(code)) => Self::from_compliance(code),
            (None, None) => Self::Unknown,
        }
    }
}

/// Finalize the install state of every reconciled record. Records are not
/// mutated again after this phase.
pub fn finalize_install_states(records: &mut BTreeMap<Uuid, AppInstallRecord>) {
    for record in records.values_mut() {
        record.install_state =
            InstallState::derive(record.enforcement_state, record.compliance_state);
    }
}

// ============================================================================
// MANAGEMENT CLASSIFICATION
// ============================================================================

/// Classify the device's management type from its posture facts.
///
/// The AzureAD-only and Domain-only branches are checked before the
/// combined branch; the match is exhaustive over the boolean domain, so
/// every input maps to exactly one label.
pub fn classify(posture: &DevicePosture) -> ManagementType {
    match (posture.azure_ad_joined, posture.domain_joined) {
        (true, false) => {
            if posture.mdm_enrolled && !posture.sccm_installed {
                ManagementType::CloudOnly
            } else if posture.mdm_enrolled && posture.sccm_installed {
                ManagementType::CloudCoManaged
            } else {
                ManagementType::AzureAdJoined
            }
        }
        (false, true) => {
            if posture.sccm_installed {
                ManagementType::OnPremOnly
            } else {
                ManagementType::OnPremGpo
            }
        }
        (true, true) => match (posture.sccm_installed, posture.mdm_enrolled) {
            (true, true) => ManagementType::CoManaged,
            (false, true) => ManagementType::HybridIntune,
            (true, false) => ManagementType::HybridSccm,
            (false, false) => ManagementType::HybridGpoOnly,
        },
        (false, false) => ManagementType::Unmanaged,
    }
}

// ============================================================================
// ENROLLMENT AND CO-MANAGEMENT DETECTION
// ============================================================================

/// Outcome of scanning the enrollment sub-records.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MdmEnrollment {
    pub enrolled: bool,
    pub provider_id: Option<String>,
}

/// Value name carrying the provider identity on an enrollment sub-record.
const PROVIDER_ID_FIELD: &str = "ProviderID";

/// A management-protocol client counts as enrolled only when at least one
/// enrollment sub-record has a present AND non-empty provider identity.
/// The first qualifying sub-record wins; the scan stops there.
pub fn detect_mdm_enrollment(enrollments_root: &RegistryKey) -> MdmEnrollment {
    for enrollment in &enrollments_root.subkeys {
        if let Some(provider) = enrollment.string_value(PROVIDER_ID_FIELD) {
            if !provider.is_empty() {
                log::debug!(
                    "mdm enrollment found under '{}' (provider '{}')",
                    enrollment.name,
                    provider
                );
                return MdmEnrollment {
                    enrolled: true,
                    provider_id: Some(provider.to_string()),
                };
            }
        }
    }

    MdmEnrollment::default()
}

/// Co-management check: the health-status low bit indicates an active
/// reporting client. Absent or out-of-range values mean "not co-managed",
/// not "unknown". Higher bits are observed but not interpreted.
pub fn co_managed(health_flags: Option<i64>) -> bool {
    matches!(health_flags, Some(v) if v >= 0 && v % 2 == 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::RegistryValue;
    use crate::types::AppContext;

    #[test]
    fn test_enforcement_table() {
        assert_eq!(InstallState::from_enforcement(1000), InstallState::Installed);
        assert_eq!(
            InstallState::from_enforcement(2000),
            InstallState::InstallPending
        );
        assert_eq!(
            InstallState::from_enforcement(2999),
            InstallState::InstallPending
        );
        assert_eq!(
            InstallState::from_enforcement(3000),
            InstallState::NotApplicable
        );
        assert_eq!(
            InstallState::from_enforcement(3999),
            InstallState::NotApplicable
        );
        assert_eq!(InstallState::from_enforcement(4000), InstallState::Failed);
        assert_eq!(InstallState::from_enforcement(5123), InstallState::Failed);

        // Out of range never raises.
        assert_eq!(InstallState::from_enforcement(999), InstallState::Unknown);
        assert_eq!(InstallState::from_enforcement(1001), InstallState::Unknown);
        assert_eq!(InstallState::from_enforcement(-7), InstallState::Unknown);
    }

    #[test]
    fn test_compliance_table() {
        assert_eq!(InstallState::from_compliance(1), InstallState::Installed);
        assert_eq!(InstallState::from_compliance(2), InstallState::NotInstalled);
        assert_eq!(InstallState::from_compliance(3), InstallState::Failed);
        assert_eq!(InstallState::from_compliance(4), InstallState::Failed);
        assert_eq!(InstallState::from_compliance(5), InstallState::Unknown);
        assert_eq!(InstallState::from_compliance(0), InstallState::Unknown);
        assert_eq!(InstallState::from_compliance(-1), InstallState::Unknown);
    }

    #[test]
    fn test_enforcement_wins_even_when_systems_disagree() {
        // Scenario: enforcement 4005 + compliance 1 (success claim).
        assert_eq!(
            InstallState::derive(Some(4005), Some(1)),
            InstallState::Failed
        );
    }

    #[test]
    fn test_compliance_is_fallback_only() {
        assert_eq!(InstallState::derive(None, Some(2)), InstallState::NotInstalled);
        assert_eq!(InstallState::derive(None, None), InstallState::Unknown);
        // Enforcement present but unknown-range still wins over compliance.
        assert_eq!(InstallState::derive(Some(1500), Some(1)), InstallState::Unknown);
    }

    #[test]
    fn test_finalize_sets_every_record() {
        let id = Uuid::nil();
        let mut records = BTreeMap::new();
        let mut record = AppInstallRecord::new(id, AppContext::Device);
        record.enforcement_state = Some(2001);
        records.insert(id, record);

        finalize_install_states(&mut records);
        assert_eq!(records[&id].install_state, InstallState::InstallPending);
    }

    #[test]
    fn test_classification_is_total_and_deterministic() {
        use std::collections::HashSet;

        let mut seen = HashSet::new();
        for bits in 0..32u8 {
            let posture = DevicePosture {
                azure_ad_joined: bits & 1 != 0,
                domain_joined: bits & 2 != 0,
                sccm_installed: bits & 4 != 0,
                mdm_enrolled: bits & 8 != 0,
                co_managed: bits & 16 != 0,
            };

            let label = classify(&posture);
            assert_eq!(label, classify(&posture));
            seen.insert(label.as_str());
        }

        // Every documented label is reachable.
        for expected in [
            "Cloud-only",
            "Cloud (Co-managed)",
            "Azure AD Joined",
            "On-prem only",
            "On-prem only (GPO)",
            "Co-managed",
            "Hybrid (Intune)",
            "Hybrid (SCCM)",
            "Hybrid (GPO only)",
            "Unmanaged",
        ] {
            assert!(seen.contains(expected), "label never produced: {expected}");
        }
    }

    #[test]
    fn test_classification_scenarios() {
        let hybrid_intune = DevicePosture {
            azure_ad_joined: true,
            domain_joined: true,
            sccm_installed: false,
            mdm_enrolled: true,
            co_managed: false,
        };
        assert_eq!(classify(&hybrid_intune), ManagementType::HybridIntune);

        let cloud_only = DevicePosture {
            azure_ad_joined: true,
            mdm_enrolled: true,
            ..Default::default()
        };
        assert_eq!(classify(&cloud_only), ManagementType::CloudOnly);

        let on_prem_gpo = DevicePosture {
            domain_joined: true,
            ..Default::default()
        };
        assert_eq!(classify(&on_prem_gpo), ManagementType::OnPremGpo);

        assert_eq!(
            classify(&DevicePosture::default()),
            ManagementType::Unmanaged
        );
    }

    #[test]
    fn test_first_qualifying_enrollment_wins() {
        let root = RegistryKey::new("Enrollments")
            .with_subkey(RegistryKey::new("0A1B"))
            .with_subkey(
                RegistryKey::new("1C2D")
                    .with_value("ProviderID", RegistryValue::String(String::new())),
            )
            .with_subkey(
                RegistryKey::new("2E3F")
                    .with_value("ProviderID", RegistryValue::String("MS DM Server".into())),
            )
            .with_subkey(
                RegistryKey::new("4A5B")
                    .with_value("ProviderID", RegistryValue::String("Other".into())),
            );

        let enrollment = detect_mdm_enrollment(&root);
        assert!(enrollment.enrolled);
        assert_eq!(enrollment.provider_id.as_deref(), Some("MS DM Server"));
    }

    #[test]
    fn test_no_qualifying_enrollment_means_not_enrolled() {
        // Scenario: no sub-record carries a non-empty provider identity.
        let root = RegistryKey::new("Enrollments")
            .with_subkey(
                RegistryKey::new("0A1B")
                    .with_value("ProviderID", RegistryValue::String(String::new())),
            )
            .with_subkey(RegistryKey::new("1C2D"));

        let enrollment = detect_mdm_enrollment(&root);
        assert!(!enrollment.enrolled);
        assert!(enrollment.provider_id.is_none());
    }

    #[test]
    fn test_co_management_low_bit() {
        assert!(co_managed(Some(1)));
        assert!(co_managed(Some(3)));
        assert!(!co_managed(Some(0)));
        assert!(!co_managed(Some(2)));
        // Absence means false, not unknown; negatives never raise.
        assert!(!co_managed(None));
        assert!(!co_managed(Some(-1)));
    }
}
