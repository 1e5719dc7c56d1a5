//! Tests for rendering-shell selection.

use itadaki_web::shell::{PUBLIC_PREFIX, Shell};

#[test]
fn test_every_public_path_gets_the_public_shell() {
    for path in ["/public", "/public/jobs", "/public/jobs/123", "/public/jobs/123?ref=x"] {
        assert_eq!(Shell::for_path(Some(path)), Shell::Public, "{path}");
    }
}

#[test]
fn test_every_other_path_gets_the_authenticated_shell() {
    for path in ["/", "/dashboard", "/stores", "/integrations", "/auth/login", "/api/env-check"] {
        assert_eq!(Shell::for_path(Some(path)), Shell::Authenticated, "{path}");
    }
}

#[test]
fn test_missing_path_fails_closed_to_authenticated() {
    // During an initial render the path can be unknown; it must never
    // fall into the public, unauthenticated chrome.
    assert_eq!(Shell::for_path(None), Shell::Authenticated);
}

#[test]
fn test_prefix_is_the_public_section() {
    assert_eq!(PUBLIC_PREFIX, "/public");
}
