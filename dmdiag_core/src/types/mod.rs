//! Canonical typed facts produced by a collection run
//!
//! One file per logical entity. Every type here is an explicit tagged
//! record; the dynamic string-keyed shapes of the raw sources never leak
//! past the resolvers.

pub mod app_install;
pub mod join_state;
pub mod posture;
pub mod report;
pub mod snapshot;

pub use app_install::{AppContext, AppInstallRecord, InstallState};
pub use join_state::JoinState;
pub use posture::{DevicePosture, ManagementType};
pub use report::{CertificateRecord, DiagnosticReport, EnrollmentInfo, PolicyRecord};
pub use snapshot::DiagnosticSnapshot;
