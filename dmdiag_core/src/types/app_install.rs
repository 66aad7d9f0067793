// src/types/app_install.rs
//! Per-application installation records

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Storage context an application fragment was observed under.
///
/// Device-context records always win over User-context records for the
/// same canonical identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AppContext {
    Device,
    User,
}

impl AppContext {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Device => "Device",
            Self::User => "User",
        }
    }
}

/// Installation state vocabulary shared by both status systems.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum InstallState {
    Installed,
    InstallPending,
    NotApplicable,
    Failed,
    NotInstalled,
    #[default]
    Unknown,
}

impl InstallState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Installed => "Installed",
            Self::InstallPending => "Install Pending",
            Self::NotApplicable => "Not Applicable",
            Self::Failed => "Failed",
            Self::NotInstalled => "Not Installed",
            Self::Unknown => "Unknown",
        }
    }
}

impl std::fmt::Display for InstallState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One reconciled application record, keyed by canonical identity.
///
/// Constructed by folding all raw per-identity fragments found across
/// storage shapes; finalized once by the mapping phase and never mutated
/// afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppInstallRecord {
    /// Canonical GUID with any `_<digits>` instance suffix stripped.
    pub app_id: Uuid,
    pub context: AppContext,
    pub compliance_state: Option<i64>,
    pub enforcement_state: Option<i64>,
    pub error_code: Option<i64>,
    /// Always populated; defaults to `Unknown` until the mapping phase.
    #[serde(default)]
    pub install_state: InstallState,
}

impl AppInstallRecord {
    pub fn new(app_id: Uuid, context: AppContext) -> Self {
        Self {
            app_id,
            context,
            compliance_state: None,
            enforcement_state: None,
            error_code: None,
            install_state: InstallState::Unknown,
        }
    }
}
