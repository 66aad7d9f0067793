// src/registry/normalizer.rs
//! Registry-shape normalizer for app workload trees
//!
//! The same logical app record appears on disk in more than one physical
//! shape: the state payload may be a JSON-encoded value directly on the
//! app's key, or a child key named after the sub-field that carries the
//! same payload as a value. Shapes are probed in fixed priority order per
//! field; the engine never branches on OS version.
//!
//! Layout reconciled here:
//!
//! ```text
//! Win32Apps
//! ├── <context node>            device scope or per-user scope
//! │   ├── <appGuid>_<n>         one app, instance-suffixed
//! │   │   ├── ComplianceStateMessage   (value, shape a)
//! │   │   └── EnforcementStateMessage  (child key, shape b)
//! │   │       └── EnforcementStateMessage = {...}
//! │   └── GRS                   metadata, discarded
//! └── ...
//! ```

use crate::api::phases;
use crate::issues::IssueLedger;
use crate::registry::RegistryKey;
use crate::types::{AppContext, AppInstallRecord};
use serde::Deserialize;
use std::collections::BTreeMap;
use uuid::Uuid;

/// Phase label used for issues recorded during normalization.
const PHASE: &str = phases::APP_WORKLOADS;

/// Raw context-node prefixes that denote Device scope. Every other prefix
/// is a per-user scope.
pub const DEVICE_CONTEXT_PREFIXES: [&str; 2] = [
    "00000000-0000-0000-0000-000000000000",
    "S-0-0-00-0000000000-0000000000-000000000-000",
];

/// Value (or child-key) names holding the two state payloads.
const COMPLIANCE_FIELD: &str = "ComplianceStateMessage";
const ENFORCEMENT_FIELD: &str = "EnforcementStateMessage";

/// Embedded JSON payload for the compliance status system.
#[derive(Debug, Deserialize)]
struct CompliancePayload {
    #[serde(rename = "ComplianceState")]
    state: Option<i64>,
    #[serde(rename = "ErrorCode")]
    error_code: Option<i64>,
}

/// Embedded JSON payload for the enforcement status system.
#[derive(Debug, Deserialize)]
struct EnforcementPayload {
    #[serde(rename = "EnforcementState")]
    state: Option<i64>,
    #[serde(rename = "ErrorCode")]
    error_code: Option<i64>,
}

/// Strip one trailing `_<digits>` instance suffix, if present.
fn strip_instance_suffix(raw: &str) -> &str {
    match raw.rsplit_once('_') {
        Some((base, suffix)) if !suffix.is_empty() && suffix.bytes().all(|b| b.is_ascii_digit()) => {
            base
        }
        _ => raw,
    }
}

/// Canonicalize a raw identity string.
///
/// A raw entry is data only if, after suffix stripping, it parses as a
/// GUID. Anything else (GRS bookkeeping keys, scope markers) is metadata
/// and is discarded. The operation is idempotent: canonicalizing a
/// canonical identity yields itself.
pub fn canonical_app_id(raw: &str) -> Option<Uuid> {
    Uuid::parse_str(strip_instance_suffix(raw)).ok()
}

/// Resolve the storage context for a context-node name.
pub fn context_for(node_name: &str) -> AppContext {
    if DEVICE_CONTEXT_PREFIXES
        .iter()
        .any(|p| node_name.eq_ignore_ascii_case(p))
    {
        AppContext::Device
    } else {
        AppContext::User
    }
}

/// Probe the two physical shapes for a payload field, in priority order.
///
/// Shape (a): a string value named `field` directly on the app node.
/// Shape (b): a child key named `field` carrying the payload as a value
/// under the same name, or as the key's default (empty-named) value.
/// A field resolved from (a) is never overwritten from (b).
fn probe_payload<'a>(app_node: &'a RegistryKey, field: &str) -> Option<&'a str> {
    if let Some(payload) = app_node.string_value(field) {
        return Some(payload);
    }

    app_node
        .subkey(field)
        .and_then(|child| child.string_value(field).or_else(|| child.string_value("")))
}

/// Fold one app node's fragments into a record.
fn fold_app_node(
    app_id: Uuid,
    context: AppContext,
    app_node: &RegistryKey,
    issues: &IssueLedger,
) -> AppInstallRecord {
    let mut record = AppInstallRecord::new(app_id, context);

    if let Some(payload) = probe_payload(app_node, ENFORCEMENT_FIELD) {
        match serde_json::from_str::<EnforcementPayload>(payload) {
            Ok(parsed) => {
                record.enforcement_state = parsed.state;
                record.error_code = parsed.error_code;
            }
            Err(e) => issues.warning(
                PHASE,
                format!(
                    "malformed enforcement payload for {} under '{}': {}",
                    app_id, app_node.name, e
                ),
            ),
        }
    }

    if let Some(payload) = probe_payload(app_node, COMPLIANCE_FIELD) {
        match serde_json::from_str::<CompliancePayload>(payload) {
            Ok(parsed) => {
                record.compliance_state = parsed.state;
                if record.error_code.is_none() {
                    record.error_code = parsed.error_code;
                }
            }
            Err(e) => issues.warning(
                PHASE,
                format!(
                    "malformed compliance payload for {} under '{}': {}",
                    app_id, app_node.name, e
                ),
            ),
        }
    }

    record
}

/// Insert a folded record under the cross-context precedence rule.
///
/// When Device and User fragments exist for the same canonical identity,
/// the Device fragment is kept wholesale and the User fragment dropped.
/// This is precedence, not a merge, and it is independent of visitation
/// order. Duplicate fragments within one context: first visited wins.
fn insert_with_precedence(records: &mut BTreeMap<Uuid, AppInstallRecord>, record: AppInstallRecord) {
    match records.get(&record.app_id) {
        None => {
            records.insert(record.app_id, record);
        }
        Some(existing) => {
            if existing.context == AppContext::User && record.context == AppContext::Device {
                records.insert(record.app_id, record);
            }
            // Device already present, or same-context duplicate: keep existing.
        }
    }
}

/// Normalize an app workload tree into one record per canonical identity.
///
/// User-context fragments are visited only when `include_user` is set.
/// Install states are left at `Unknown`; the mapping phase finalizes them.
pub fn normalize_app_workloads(
    root: &RegistryKey,
    include_user: bool,
    issues: &IssueLedger,
) -> BTreeMap<Uuid, AppInstallRecord> {
    let mut records = BTreeMap::new();

    for context_node in &root.subkeys {
        let context = context_for(&context_node.name);
        if context == AppContext::User && !include_user {
            log::debug!(
                "skipping user context node '{}' (user apps not requested)",
                context_node.name
            );
            continue;
        }

        for app_node in &context_node.subkeys {
            let Some(app_id) = canonical_app_id(&app_node.name) else {
                log::debug!("discarding metadata node '{}'", app_node.name);
                continue;
            };

            let record = fold_app_node(app_id, context, app_node, issues);
            insert_with_precedence(&mut records, record);
        }
    }

    records
}
