// src/sources.rs
//! File-backed raw source readers
//!
//! Implements the engine's source boundary over a directory of captured
//! dumps, so collections can be replayed off-endpoint. Missing optional
//! files are "absent"; a missing join-state dump is a source failure.

use dmdiag_core::registry::RegistryKey;
use dmdiag_core::{EndpointSources, SourceError};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Well-known file names inside a dump directory.
pub const JOIN_STATE_FILE: &str = "dsregcmd.txt";
pub const WIN32_APPS_FILE: &str = "win32apps.json";
pub const ENROLLMENTS_FILE: &str = "enrollments.json";
pub const CCM_FILE: &str = "ccm.json";
pub const REPORT_FILE: &str = "mdmreport.xml";

/// On-prem client dump: install marker plus raw health flags.
#[derive(Debug, Default, Deserialize)]
struct CcmDump {
    #[serde(default)]
    installed: bool,
    #[serde(default)]
    health_flags: Option<i64>,
}

/// Raw source readers over a dump directory.
pub struct FileSources {
    dir: PathBuf,
}

impl FileSources {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }

    /// Read an optional registry-tree export.
    fn read_tree(&self, name: &str) -> Result<Option<RegistryKey>, SourceError> {
        let path = self.path(name);
        if !path.is_file() {
            return Ok(None);
        }

        let text = fs::read_to_string(&path)?;
        serde_json::from_str(&text)
            .map(Some)
            .map_err(|e| SourceError::Unavailable {
                reason: format!("{}: {}", name, e),
            })
    }

    fn read_ccm(&self) -> Result<CcmDump, SourceError> {
        let path = self.path(CCM_FILE);
        if !path.is_file() {
            return Ok(CcmDump::default());
        }

        let text = fs::read_to_string(&path)?;
        serde_json::from_str(&text).map_err(|e| SourceError::Unavailable {
            reason: format!("{}: {}", CCM_FILE, e),
        })
    }
}

impl EndpointSources for FileSources {
    fn join_state_text(&self) -> Result<String, SourceError> {
        let path = self.path(JOIN_STATE_FILE);
        if !path.is_file() {
            return Err(SourceError::Unavailable {
                reason: format!("{} not found in {}", JOIN_STATE_FILE, self.dir.display()),
            });
        }
        Ok(fs::read_to_string(path)?)
    }

    fn app_workloads(&self) -> Result<Option<RegistryKey>, SourceError> {
        self.read_tree(WIN32_APPS_FILE)
    }

    fn enrollments(&self) -> Result<Option<RegistryKey>, SourceError> {
        self.read_tree(ENROLLMENTS_FILE)
    }

    fn client_health_flags(&self) -> Result<Option<i64>, SourceError> {
        Ok(self.read_ccm()?.health_flags)
    }

    fn sccm_installed(&self) -> Result<bool, SourceError> {
        Ok(self.read_ccm()?.installed)
    }

    fn diagnostic_report_xml(&self) -> Result<Option<String>, SourceError> {
        let path = self.path(REPORT_FILE);
        if !path.is_file() {
            return Ok(None);
        }
        Ok(Some(fs::read_to_string(path)?))
    }
}

/// True when the directory looks like a dump directory at all.
pub fn looks_like_dump_dir(dir: &Path) -> bool {
    [
        JOIN_STATE_FILE,
        WIN32_APPS_FILE,
        ENROLLMENTS_FILE,
        CCM_FILE,
        REPORT_FILE,
    ]
    .iter()
    .any(|name| dir.join(name).is_file())
}
