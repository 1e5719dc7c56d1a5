//! Rendering-shell selection.
//!
//! One binary serves two very different faces: the `/public` section is
//! headerless and indexable by search engines, everything else is the
//! auth-gated admin panel. The shell is selected from the request path and
//! threaded into the base template, which renders (or omits) the navigation
//! chrome and the robots meta tag accordingly.

/// Path prefix of the public, SEO-indexable section.
pub const PUBLIC_PREFIX: &str = "/public";

/// The top-level page chrome a request is rendered with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shell {
    /// No navigation header, indexable. Only for `/public` paths.
    Public,
    /// Navigation header, `noindex`, requires a signed-in user for content.
    Authenticated,
}

impl Shell {
    /// Select the shell for a request path.
    ///
    /// A missing path (as during an initial render before routing settles)
    /// selects the authenticated shell: an unknown location must never end
    /// up in the unauthenticated chrome.
    #[must_use]
    pub fn for_path(path: Option<&str>) -> Self {
        match path {
            Some(path) if path.starts_with(PUBLIC_PREFIX) => Self::Public,
            _ => Self::Authenticated,
        }
    }

    /// Whether this is the public shell.
    #[must_use]
    pub const fn is_public(self) -> bool {
        matches!(self, Self::Public)
    }

    /// Whether this is the authenticated shell.
    #[must_use]
    pub const fn is_authenticated(self) -> bool {
        matches!(self, Self::Authenticated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_paths_select_public_shell() {
        assert_eq!(Shell::for_path(Some("/public")), Shell::Public);
        assert_eq!(Shell::for_path(Some("/public/jobs")), Shell::Public);
        assert_eq!(Shell::for_path(Some("/public/jobs/123")), Shell::Public);
    }

    #[test]
    fn test_other_paths_select_authenticated_shell() {
        assert_eq!(Shell::for_path(Some("/")), Shell::Authenticated);
        assert_eq!(Shell::for_path(Some("/dashboard")), Shell::Authenticated);
        assert_eq!(Shell::for_path(Some("/stores/7")), Shell::Authenticated);
        assert_eq!(Shell::for_path(Some("")), Shell::Authenticated);
    }

    #[test]
    fn test_missing_path_fails_closed() {
        assert_eq!(Shell::for_path(None), Shell::Authenticated);
    }

    #[test]
    fn test_shell_predicates() {
        assert!(Shell::Public.is_public());
        assert!(!Shell::Public.is_authenticated());
        assert!(Shell::Authenticated.is_authenticated());
        assert!(!Shell::Authenticated.is_public());
    }
}
