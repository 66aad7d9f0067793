// src/parser/join_text.rs
//! Text-signal parser for the join-state dump
//!
//! Extracts typed fields from one multi-line text block using tolerant,
//! order-insensitive pattern matching. Each field has an independent
//! pattern of the form `<FieldName><spaces>:<spaces><value>`; a pattern
//! that does not match leaves the field at its type default rather than
//! failing the parse.
//!
//! Inputs must be flattened to a single string before matching. Matching
//! per line against an array of lines silently fails to populate group
//! captures, so [`JoinTextParser::parse_lines`] joins first.

use crate::types::JoinState;
use regex::Regex;
use uuid::Uuid;

/// Compiled field patterns for the join-state dump.
pub struct JoinTextParser {
    azure_ad_joined: Regex,
    domain_joined: Regex,
    workplace_joined: Regex,
    device_id: Regex,
    tenant_id: Regex,
    tenant_name: Regex,
}

impl JoinTextParser {
    /// Compile the field patterns.
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            azure_ad_joined: yes_no_pattern("AzureAdJoined")?,
            domain_joined: yes_no_pattern("DomainJoined")?,
            workplace_joined: yes_no_pattern("WorkplaceJoined")?,
            device_id: guid_pattern("DeviceId")?,
            tenant_id: guid_pattern("TenantId")?,
            // Two observed spellings of the label; first match wins.
            tenant_name: Regex::new(r"(?im)^\s*Tenant\s?Name\s*:\s*(\S.*?)\s*$")?,
        })
    }

    /// Parse one flattened text block into a [`JoinState`].
    ///
    /// The raw input is retained verbatim on the result.
    pub fn parse(&self, text: &str) -> JoinState {
        JoinState {
            azure_ad_joined: self.match_yes(&self.azure_ad_joined, text),
            domain_joined: self.match_yes(&self.domain_joined, text),
            workplace_joined: self.match_yes(&self.workplace_joined, text),
            device_id: self.match_guid(&self.device_id, text),
            tenant_id: self.match_guid(&self.tenant_id, text),
            tenant_name: self
                .tenant_name
                .captures(text)
                .and_then(|c| c.get(1))
                .map(|m| m.as_str().to_string()),
            raw_text: text.to_string(),
        }
    }

    /// Flatten a line-array output to one string, then parse.
    pub fn parse_lines(&self, lines: &[String]) -> JoinState {
        self.parse(&lines.join("\n"))
    }

    fn match_yes(&self, pattern: &Regex, text: &str) -> bool {
        pattern
            .captures(text)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().eq_ignore_ascii_case("YES"))
            .unwrap_or(false)
    }

    fn match_guid(&self, pattern: &Regex, text: &str) -> Option<Uuid> {
        pattern
            .captures(text)
            .and_then(|c| c.get(1))
            .and_then(|m| Uuid::parse_str(m.as_str()).ok())
    }
}

fn yes_no_pattern(field: &str) -> Result<Regex, regex::Error> {
    Regex::new(&format!(r"(?im)^\s*{}\s*:\s*(YES|NO)\b", field))
}

fn guid_pattern(field: &str) -> Result<Regex, regex::Error> {
    Regex::new(&format!(
        r"(?im)^\s*{}\s*:\s*([0-9a-f]{{8}}-[0-9a-f]{{4}}-[0-9a-f]{{4}}-[0-9a-f]{{4}}-[0-9a-f]{{12}})",
        field
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parser() -> JoinTextParser {
        JoinTextParser::new().expect("patterns compile")
    }

    const SAMPLE: &str = "\
+----------------------------------------------------------------------+
| Device State                                                         |
+----------------------------------------------------------------------+

            AzureAdJoined : YES
         EnterpriseJoined : NO
             DomainJoined : NO
                 DeviceId : 21e67fea-0a4d-4e5f-9b2c-3d4e5f6a7b8c
                 TenantId : 11111111-2222-3333-4444-555555555555
               TenantName : Contoso
";

    #[test]
    fn test_scenario_azure_yes_domain_no() {
        let state = parser().parse(SAMPLE);
        assert!(state.azure_ad_joined);
        assert!(!state.domain_joined);
    }

    #[test]
    fn test_guid_fields_resolve() {
        let state = parser().parse(SAMPLE);
        assert_eq!(
            state.device_id,
            Some(Uuid::parse_str("21e67fea-0a4d-4e5f-9b2c-3d4e5f6a7b8c").unwrap())
        );
        assert_eq!(
            state.tenant_id,
            Some(Uuid::parse_str("11111111-2222-3333-4444-555555555555").unwrap())
        );
        assert_eq!(state.tenant_name.as_deref(), Some("Contoso"));
    }

    #[test]
    fn test_yes_literal_is_case_insensitive() {
        let state = parser().parse("azureadjoined : yes\nDOMAINJOINED : No\n");
        assert!(state.azure_ad_joined);
        assert!(!state.domain_joined);
    }

    #[test]
    fn test_missing_field_keeps_type_default() {
        let state = parser().parse("DomainJoined : YES\n");
        assert!(state.domain_joined);
        // Unmatched fields are untouched, not errors.
        assert!(!state.azure_ad_joined);
        assert!(!state.workplace_joined);
        assert!(state.device_id.is_none());
        assert!(state.tenant_name.is_none());
    }

    #[test]
    fn test_tenant_name_accepts_both_spellings() {
        let spaced = parser().parse("Tenant Name : Fabrikam\n");
        assert_eq!(spaced.tenant_name.as_deref(), Some("Fabrikam"));

        let joined = parser().parse("TenantName : Fabrikam\n");
        assert_eq!(joined.tenant_name.as_deref(), Some("Fabrikam"));
    }

    #[test]
    fn test_raw_text_is_retained_verbatim() {
        let state = parser().parse(SAMPLE);
        assert_eq!(state.raw_text, SAMPLE);
    }

    #[test]
    fn test_parse_lines_flattens_before_matching() {
        let lines = vec![
            "            AzureAdJoined : YES".to_string(),
            "             DomainJoined : NO".to_string(),
        ];
        let state = parser().parse_lines(&lines);
        assert!(state.azure_ad_joined);
        assert!(!state.domain_joined);
    }

    #[test]
    fn test_fields_are_order_insensitive() {
        let reversed = "TenantName : Contoso\nDomainJoined : YES\nAzureAdJoined : NO\n";
        let state = parser().parse(reversed);
        assert!(!state.azure_ad_joined);
        assert!(state.domain_joined);
        assert_eq!(state.tenant_name.as_deref(), Some("Contoso"));
    }

    #[test]
    fn test_empty_input_is_fully_default() {
        let state = parser().parse("");
        assert!(state.is_unjoined());
        assert!(state.tenant_id.is_none());
    }
}
