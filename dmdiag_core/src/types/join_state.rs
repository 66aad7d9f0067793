// src/types/join_state.rs
//! Device join state derived from the join-state text dump

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Join posture of the device, derived once per run from text-signal
/// parsing and immutable after creation.
///
/// All three joined flags default to `false`; absence of a pattern match
/// in the raw dump is not an error, it is "false"/"unknown".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinState {
    pub azure_ad_joined: bool,
    pub domain_joined: bool,
    pub workplace_joined: bool,
    pub device_id: Option<Uuid>,
    pub tenant_id: Option<Uuid>,
    pub tenant_name: Option<String>,

    /// Raw input retained verbatim for audit/debugging.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub raw_text: String,
}

impl JoinState {
    /// Joined to both the cloud directory and an on-premises domain.
    pub fn is_hybrid(&self) -> bool {
        self.azure_ad_joined && self.domain_joined
    }

    /// No join signal of any kind was observed.
    pub fn is_unjoined(&self) -> bool {
        !self.azure_ad_joined && !self.domain_joined && !self.workplace_joined
    }
}
