//! GitHub API path simplification.
//!
//! Maps a concrete request path such as `/repos/kubernetes/test-infra/issues/42`
//! onto an identifier-free template (`/repos/:owner/:repo/issues/:issueId`) so
//! it can be used as a low-cardinality metric label.

mod resolver;
mod schema;
mod segment;

pub use resolver::{resolve, Resolution};
pub use schema::github_api;
pub use segment::{l, v, Node, Segment};

/// Resolve `path` against the built-in GitHub API schema.
///
/// Unmatched paths come back unchanged inside [`Resolution::Unmatched`]; the
/// caller decides whether to warn about them.
pub fn simplify_path(path: &str) -> Resolution<'_> {
    resolve(github_api(), path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn simplified(path: &str) -> String {
        simplify_path(path).into_string()
    }

    #[test]
    fn literal_only_paths_are_unchanged() {
        for path in [
            "/rate_limit",
            "/emojis",
            "/user/emails",
            "/user/email/visibility",
            "/search/code",
            "/gists/public",
            "/licenses",
        ] {
            let res = simplify_path(path);
            assert!(res.is_match(), "{path} should match");
            assert_eq!(res.as_str(), path);
        }
    }

    #[test]
    fn substitutes_variables() {
        assert_eq!(
            simplified("/repos/kubernetes/test-infra/issues/42"),
            "/repos/:owner/:repo/issues/:issueId"
        );
        assert_eq!(
            simplified("/repos/o/r/issues/5/comments"),
            "/repos/:owner/:repo/issues/:issueId/comments"
        );
        assert_eq!(
            simplified("/repos/o/r/issues/5/labels/bug"),
            "/repos/:owner/:repo/issues/:issueId/labels/:labelId"
        );
    }

    #[test]
    fn issue_literals_win_over_issue_id() {
        assert_eq!(
            simplified("/repos/o/r/issues/comments/99"),
            "/repos/:owner/:repo/issues/comments/:commentId"
        );
        assert_eq!(
            simplified("/repos/o/r/issues/events/7"),
            "/repos/:owner/:repo/issues/events/:eventId"
        );
    }

    #[test]
    fn normalizes_slashes() {
        assert_eq!(simplified("/repos//o/r/"), "/repos/:owner/:repo");
        assert_eq!(simplified("repos/o/r"), "/repos/:owner/:repo");
    }

    #[test]
    fn deep_branches() {
        assert_eq!(
            simplified("/repos/o/r/branches/main/protection/restrictions/teams"),
            "/repos/:owner/:repo/branches/:branch/protection/restrictions/teams"
        );
        assert_eq!(
            simplified("/repos/o/r/branches/main/protection/required_status_checks/contexts"),
            "/repos/:owner/:repo/branches/:branch/protection/required_status_checks/contexts"
        );
        assert_eq!(
            simplified("/repos/o/r/git/refs/heads/feature"),
            "/repos/:owner/:repo/git/refs/heads/:ref"
        );
        assert_eq!(
            simplified("/notifications/threads/123/subscription"),
            "/notifications/threads/:threadId/subscription"
        );
    }

    #[test]
    fn unmatched_falls_back_to_raw_path() {
        let res = simplify_path("/not/a/real/endpoint");
        assert!(!res.is_match());
        assert_eq!(res.as_str(), "/not/a/real/endpoint");
    }

    #[test]
    fn root_families_are_disjoint() {
        assert_eq!(simplified("/user/following/bob"), "/user/following/:userId");
        assert_eq!(simplified("/users/bob/following"), "/users/:username/following");
        // "/user/bob/repos" has the shape of a users route but must not borrow it.
        assert!(!simplify_path("/user/bob/repos").is_match());
    }

    #[test]
    fn leaf_does_not_truncate() {
        assert!(!simplify_path("/rate_limit/extra").is_match());
        assert!(!simplify_path("/repos/o/r/stars/extra").is_match());
    }

    #[test]
    fn empty_input_is_unmatched() {
        assert_eq!(simplify_path(""), Resolution::Unmatched(""));
        assert_eq!(simplify_path("/"), Resolution::Unmatched("/"));
    }

    #[test]
    fn resolving_is_deterministic() {
        let path = "/orgs/kubernetes/credential-authorizations/1234";
        assert_eq!(simplified(path), simplified(path));
        assert_eq!(
            simplified(path),
            "/orgs/:orgname/credential-authorizations/:credentialId"
        );
    }
}
