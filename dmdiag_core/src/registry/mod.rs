// src/registry/mod.rs
//! Registry-like source model and shape normalization
//!
//! The engine never touches a live hive. Raw source readers hand it an
//! in-memory tree of key/value records (captured on the endpoint, or
//! replayed from a JSON export), and the normalizer reconciles the tree's
//! physical shapes into typed records.

pub mod normalizer;

pub use normalizer::{canonical_app_id, context_for, normalize_app_workloads};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A registry value in one of the encodings the sources produce.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RegistryValue {
    String(String),
    Dword(u32),
    Qword(u64),
    MultiString(Vec<String>),
}

impl RegistryValue {
    /// String content, if this value is string-encoded.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Integer content for either numeric encoding.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Dword(v) => Some(i64::from(*v)),
            Self::Qword(v) => i64::try_from(*v).ok(),
            _ => None,
        }
    }
}

/// One key in the tree: named values plus child keys in capture order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryKey {
    pub name: String,
    #[serde(default)]
    pub values: BTreeMap<String, RegistryValue>,
    #[serde(default)]
    pub subkeys: Vec<RegistryKey>,
}

impl RegistryKey {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            values: BTreeMap::new(),
            subkeys: Vec::new(),
        }
    }

    /// Builder-style value insertion.
    pub fn with_value(mut self, name: impl Into<String>, value: RegistryValue) -> Self {
        self.values.insert(name.into(), value);
        self
    }

    /// Builder-style subkey insertion.
    pub fn with_subkey(mut self, subkey: RegistryKey) -> Self {
        self.subkeys.push(subkey);
        self
    }

    pub fn value(&self, name: &str) -> Option<&RegistryValue> {
        self.values.get(name)
    }

    /// String value lookup; `None` when absent or differently encoded.
    pub fn string_value(&self, name: &str) -> Option<&str> {
        self.value(name).and_then(RegistryValue::as_str)
    }

    /// Integer value lookup across both numeric encodings.
    pub fn int_value(&self, name: &str) -> Option<i64> {
        self.value(name).and_then(RegistryValue::as_int)
    }

    /// First child key with a matching name (registry names compare
    /// case-insensitively).
    pub fn subkey(&self, name: &str) -> Option<&RegistryKey> {
        self.subkeys
            .iter()
            .find(|k| k.name.eq_ignore_ascii_case(name))
    }
}
