// src/report/mod.rs
//! Diagnostic-report extraction
//!
//! Parses the structured XML document an on-device tool produces into
//! three independent typed collections. Field paths are fixed; no field
//! is required, and every access tolerates absence. A missing section
//! yields an empty collection, never an error.

pub mod tool;

pub use tool::{ReportTool, ReportToolConfig, ReportToolError};

use crate::types::{CertificateRecord, DiagnosticReport, EnrollmentInfo, PolicyRecord};
use roxmltree::{Document, Node};

/// Extraction errors. Only a document that cannot be parsed at all is an
/// error; everything below the root is tolerated field by field.
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("malformed diagnostic report: {0}")]
    Malformed(#[from] roxmltree::Error),
}

/// Text content of the first child element with a matching tag.
fn child_text(node: Node<'_, '_>, tag: &str) -> Option<String> {
    node.children()
        .find(|c| c.is_element() && c.tag_name().name() == tag)
        .and_then(|c| c.text())
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}

/// First element with a matching tag anywhere under the root.
fn first_section<'a, 'i>(doc: &'a Document<'i>, tag: &str) -> Option<Node<'a, 'i>> {
    doc.descendants()
        .find(|n| n.is_element() && n.tag_name().name() == tag)
}

fn extract_enrollment(doc: &Document<'_>) -> EnrollmentInfo {
    match first_section(doc, "EnrollmentInfo") {
        Some(node) => EnrollmentInfo {
            enrollment_id: child_text(node, "EnrollmentId"),
            provider_id: child_text(node, "ProviderId"),
            enrollment_type: child_text(node, "EnrollmentType"),
            enrollment_state: child_text(node, "EnrollmentState"),
            upn: child_text(node, "Upn"),
        },
        None => EnrollmentInfo::default(),
    }
}

fn extract_policies(doc: &Document<'_>) -> Vec<PolicyRecord> {
    let Some(section) = first_section(doc, "Policies") else {
        return Vec::new();
    };

    section
        .children()
        .filter(|n| n.is_element() && n.tag_name().name() == "Policy")
        .map(|node| PolicyRecord {
            area: child_text(node, "Area"),
            name: child_text(node, "PolicyName"),
            value: child_text(node, "Value"),
            source: child_text(node, "Source"),
        })
        .collect()
}

fn extract_certificates(doc: &Document<'_>) -> Vec<CertificateRecord> {
    let Some(section) = first_section(doc, "Certificates") else {
        return Vec::new();
    };

    section
        .children()
        .filter(|n| n.is_element() && n.tag_name().name() == "Certificate")
        .map(|node| CertificateRecord {
            thumbprint: child_text(node, "Thumbprint"),
            subject: child_text(node, "Subject"),
            issuer: child_text(node, "Issuer"),
            not_after: child_text(node, "NotAfter"),
        })
        .collect()
}

/// Parse one diagnostic report document.
///
/// Collections preserve document order. The enrollment record and both
/// lists are extracted independently; a malformed or missing section
/// never blocks the others because only whole-document parse failures
/// surface as errors.
pub fn parse_report(xml: &str) -> Result<DiagnosticReport, ReportError> {
    let doc = Document::parse(xml)?;

    Ok(DiagnosticReport {
        enrollment: extract_enrollment(&doc),
        policies: extract_policies(&doc),
        certificates: extract_certificates(&doc),
    })
}
