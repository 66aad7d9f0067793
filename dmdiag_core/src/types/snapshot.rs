// src/types/snapshot.rs
//! The canonical per-run output record

use crate::issues::CollectionIssue;
use crate::types::app_install::AppInstallRecord;
use crate::types::join_state::JoinState;
use crate::types::posture::{DevicePosture, ManagementType};
use crate::types::report::DiagnosticReport;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// One authoritative snapshot per collection run.
///
/// Each run produces a fresh snapshot from whatever raw inputs it was
/// given; nothing is cached across invocations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiagnosticSnapshot {
    pub collected_at: DateTime<Utc>,
    pub target: String,
    pub join_state: JoinState,
    pub posture: DevicePosture,
    pub classification: ManagementType,
    /// Provider identity of the winning MDM enrollment sub-record, if any.
    pub mdm_provider_id: Option<String>,
    /// Raw client health flags. Only bit 0 is interpreted (co-management);
    /// higher bits are carried for visibility.
    pub client_health_flags: Option<i64>,
    pub apps: BTreeMap<Uuid, AppInstallRecord>,
    pub report: DiagnosticReport,
    pub issues: Vec<CollectionIssue>,
}

impl DiagnosticSnapshot {
    pub fn app_count(&self) -> usize {
        self.apps.len()
    }

    pub fn has_issues(&self) -> bool {
        !self.issues.is_empty()
    }
}
