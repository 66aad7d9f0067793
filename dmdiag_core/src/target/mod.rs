// src/target/mod.rs
//! Local/remote execution boundary
//!
//! Every reader accepts a target-identity parameter. A small fixed set of
//! aliases is recognized as "local" and bypasses remote-transport
//! overhead entirely.

/// Aliases always treated as the local host.
const LOCAL_ALIASES: [&str; 4] = ["localhost", "127.0.0.1", "::1", "."];

/// True when the target identity denotes the machine we are running on:
/// empty string, a fixed loopback alias, or a case-insensitive match of
/// the host's own name.
pub fn is_local_target(target: &str) -> bool {
    let target = target.trim();
    if target.is_empty() {
        return true;
    }

    if LOCAL_ALIASES
        .iter()
        .any(|alias| target.eq_ignore_ascii_case(alias))
    {
        return true;
    }

    match hostname::get() {
        Ok(own) => own.to_string_lossy().eq_ignore_ascii_case(target),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_aliases() {
        assert!(is_local_target(""));
        assert!(is_local_target("   "));
        assert!(is_local_target("."));
        assert!(is_local_target("localhost"));
        assert!(is_local_target("LOCALHOST"));
        assert!(is_local_target("127.0.0.1"));
        assert!(is_local_target("::1"));
    }

    #[test]
    fn test_own_hostname_matches_case_insensitively() {
        let own = hostname::get().expect("hostname").to_string_lossy().to_string();
        assert!(is_local_target(&own));
        assert!(is_local_target(&own.to_uppercase()));
    }

    #[test]
    fn test_other_hosts_are_remote() {
        assert!(!is_local_target("some-other-endpoint.example.org"));
    }
}
