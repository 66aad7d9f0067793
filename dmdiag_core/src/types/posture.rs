// src/types/posture.rs
//! Device posture facts and the closed management-type vocabulary

use serde::{Deserialize, Serialize};

/// The five boolean posture facts the classification engine consumes.
///
/// Classification is a pure function of this struct; there is no
/// intermediate state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DevicePosture {
    pub azure_ad_joined: bool,
    pub domain_joined: bool,
    pub sccm_installed: bool,
    pub mdm_enrolled: bool,
    pub co_managed: bool,
}

/// Management classification label, drawn from a fixed closed set.
///
/// Every combination of posture facts maps to exactly one label; there is
/// deliberately no `Unknown` variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ManagementType {
    CloudOnly,
    CloudCoManaged,
    AzureAdJoined,
    OnPremOnly,
    OnPremGpo,
    CoManaged,
    HybridIntune,
    HybridSccm,
    HybridGpoOnly,
    Unmanaged,
}

impl ManagementType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::CloudOnly => "Cloud-only",
            Self::CloudCoManaged => "Cloud (Co-managed)",
            Self::AzureAdJoined => "Azure AD Joined",
            Self::OnPremOnly => "On-prem only",
            Self::OnPremGpo => "On-prem only (GPO)",
            Self::CoManaged => "Co-managed",
            Self::HybridIntune => "Hybrid (Intune)",
            Self::HybridSccm => "Hybrid (SCCM)",
            Self::HybridGpoOnly => "Hybrid (GPO only)",
            Self::Unmanaged => "Unmanaged",
        }
    }
}

impl std::fmt::Display for ManagementType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_are_unique() {
        let all = [
            ManagementType::CloudOnly,
            ManagementType::CloudCoManaged,
            ManagementType::AzureAdJoined,
            ManagementType::OnPremOnly,
            ManagementType::OnPremGpo,
            ManagementType::CoManaged,
            ManagementType::HybridIntune,
            ManagementType::HybridSccm,
            ManagementType::HybridGpoOnly,
            ManagementType::Unmanaged,
        ];

        let labels: std::collections::HashSet<&str> = all.iter().map(|m| m.as_str()).collect();
        assert_eq!(labels.len(), all.len());
    }

    #[test]
    fn test_display_matches_as_str() {
        assert_eq!(ManagementType::HybridIntune.to_string(), "Hybrid (Intune)");
        assert_eq!(ManagementType::Unmanaged.to_string(), "Unmanaged");
    }
}
