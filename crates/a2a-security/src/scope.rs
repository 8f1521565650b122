//! Scope matching: §4.4.1, testable property 9.
//!
//! A granted scope matches a required one by exact equality, the wildcard
//! `"*"`, or a trailing `":*"` matching any required scope sharing the same
//! prefix up to and including the colon.

/// `true` iff any scope in `granted` matches `required` under the rules in
/// §4.4.1.
pub fn has_scope<S: AsRef<str>>(granted: &[S], required: &str) -> bool {
    granted.iter().any(|scope| scope_matches(scope.as_ref(), required))
}

fn scope_matches(granted: &str, required: &str) -> bool {
    if granted == required {
        return true;
    }
    if granted == "*" {
        return true;
    }
    if let Some(prefix) = granted.strip_suffix(":*") {
        let prefix_with_colon = format!("{prefix}:");
        return required.starts_with(&prefix_with_colon);
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_match() {
        assert!(has_scope(&["task.review"], "task.review"));
        assert!(!has_scope(&["task.review"], "task.approve"));
    }

    #[test]
    fn wildcard_grant_matches_anything() {
        assert!(has_scope(&["*"], "anything:goes"));
    }

    #[test]
    fn prefix_wildcard_matches_same_prefix_only() {
        assert!(has_scope(&["registry:*"], "registry:write"));
        assert!(has_scope(&["registry:*"], "registry:read"));
        assert!(!has_scope(&["registry:*"], "policy:read"));
    }

    #[test]
    fn prefix_wildcard_requires_colon_boundary() {
        // "registry:*" must not match "registryextra:write" — no colon boundary.
        assert!(!has_scope(&["registry:*"], "registryextra:write"));
    }

    #[test]
    fn no_match_without_any_rule_satisfied() {
        assert!(!has_scope(&["task.review", "task.approve"], "policy.read"));
    }

    #[test]
    fn empty_granted_never_matches() {
        assert!(!has_scope::<&str>(&[], "anything"));
    }
}
