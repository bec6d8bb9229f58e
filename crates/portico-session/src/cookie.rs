//! Cookie header parsing and auth-token candidate selection
//!
//! The platform's session service sets cookies named with a fixed
//! convention: a `pt-` prefix and an `-auth-token` marker somewhere in
//! the name (`pt-main-auth-token`, chunked variants like
//! `pt-main-auth-token.0`). Candidate selection is by name only; the
//! values are opaque here and handed to the decoders in header order.

/// Prefix every platform session cookie carries.
pub const AUTH_COOKIE_PREFIX: &str = "pt-";

/// Marker distinguishing auth-token cookies from other platform cookies.
pub const AUTH_COOKIE_MARKER: &str = "-auth-token";

/// Whether a cookie name follows the auth-token convention.
pub fn is_auth_token_cookie(name: &str) -> bool {
    name.starts_with(AUTH_COOKIE_PREFIX) && name.contains(AUTH_COOKIE_MARKER)
}

/// Splits a `Cookie` header into name/value pairs, preserving header
/// order. Malformed fragments (no `=`, empty name) are skipped.
pub fn parse_cookie_header(header: &str) -> Vec<(String, String)> {
    header
        .split(';')
        .filter_map(|fragment| {
            let (name, value) = fragment.split_once('=')?;
            let name = name.trim();
            if name.is_empty() {
                return None;
            }
            Some((name.to_string(), value.trim().to_string()))
        })
        .collect()
}

/// The auth-token cookie values from a `Cookie` header, in header order.
pub fn auth_token_candidates(header: &str) -> Vec<String> {
    parse_cookie_header(header)
        .into_iter()
        .filter(|(name, _)| is_auth_token_cookie(name))
        .map(|(_, value)| value)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_cookie_names_follow_the_convention() {
        assert!(is_auth_token_cookie("pt-main-auth-token"));
        assert!(is_auth_token_cookie("pt-main-auth-token.0"));
        assert!(is_auth_token_cookie("pt-3f9a-auth-token"));
        assert!(!is_auth_token_cookie("pt-theme"));
        assert!(!is_auth_token_cookie("main-auth-token"));
        assert!(!is_auth_token_cookie("sessionid"));
    }

    #[test]
    fn parses_pairs_in_header_order() {
        let pairs = parse_cookie_header("a=1; b=2; c=3");
        assert_eq!(
            pairs,
            vec![
                ("a".to_string(), "1".to_string()),
                ("b".to_string(), "2".to_string()),
                ("c".to_string(), "3".to_string()),
            ]
        );
    }

    #[test]
    fn values_may_contain_equals_signs() {
        let pairs = parse_cookie_header("pt-main-auth-token=abc==; other=x=y");
        assert_eq!(pairs[0].1, "abc==");
        assert_eq!(pairs[1].1, "x=y");
    }

    #[test]
    fn malformed_fragments_are_skipped() {
        let pairs = parse_cookie_header("bare-token; =orphan-value; ok=1;;");
        assert_eq!(pairs, vec![("ok".to_string(), "1".to_string())]);
    }

    #[test]
    fn candidates_filter_by_name_and_keep_order() {
        let header = "theme=dark; pt-a-auth-token=first; sid=x; pt-b-auth-token=second";
        assert_eq!(
            auth_token_candidates(header),
            vec!["first".to_string(), "second".to_string()]
        );
    }

    #[test]
    fn empty_header_yields_no_candidates() {
        assert!(auth_token_candidates("").is_empty());
    }
}
