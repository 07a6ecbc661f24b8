use super::segment::{l, v, Node};
use std::sync::LazyLock;

/// Shape of the GitHub REST API URL space.
///
/// The root is a dispatch node over the top-level route families. Declaration
/// order matters: some literals appear more than once under one parent and
/// only the first declared branch is ever reached.
static GITHUB_API: LazyLock<Node> = LazyLock::new(|| {
    l(
        "",
        vec![
            l("repos", vec![v("owner", vec![v("repo", repo_routes())])]),
            l(
                "user",
                vec![
                    l("following", vec![v("userId", vec![])]),
                    l("keys", vec![v("keyId", vec![])]),
                    l("email", vec![l("visibility", vec![])]),
                    l("emails", vec![]),
                    l("public_emails", vec![]),
                    l("followers", vec![]),
                    l("starred", vec![]),
                    l("issues", vec![]),
                ],
            ),
            l(
                "users",
                vec![v(
                    "username",
                    vec![
                        l("followers", vec![v("username", vec![])]),
                        l("repos", vec![]),
                        l("hovercard", vec![]),
                        l("following", vec![]),
                    ],
                )],
            ),
            l(
                "orgs",
                vec![v(
                    "orgname",
                    vec![
                        l("credential-authorizations", vec![v("credentialId", vec![])]),
                        l("repos", vec![]),
                        l("issues", vec![]),
                        l("invitations", vec![]),
                        l("members", vec![]),
                        l("teams", vec![]),
                    ],
                )],
            ),
            l(
                "organizations",
                vec![v("orgId", vec![l("members", vec![]), l("teams", vec![])])],
            ),
            l("issues", vec![v("issueId", vec![])]),
            l(
                "search",
                vec![
                    l("repositories", vec![]),
                    l("commits", vec![]),
                    l("code", vec![]),
                    l("issues", vec![]),
                    l("users", vec![]),
                    l("topics", vec![]),
                    l("labels", vec![]),
                ],
            ),
            l("gists", vec![l("public", vec![]), l("starred", vec![])]),
            l(
                "notifications",
                vec![l(
                    "threads",
                    vec![v("threadId", vec![l("subscription", vec![])])],
                )],
            ),
            l("repositories", vec![]),
            l("emojis", vec![]),
            l("events", vec![]),
            l("feeds", vec![]),
            l("hub", vec![]),
            l("rate_limit", vec![]),
            l("teams", vec![]),
            l("licenses", vec![]),
        ],
    )
});

/// Everything below `/repos/:owner/:repo`.
fn repo_routes() -> Vec<Node> {
    vec![
        l(
            "branches",
            vec![v(
                "branch",
                vec![l(
                    "protection",
                    vec![
                        l(
                            "restrictions",
                            vec![l("users", vec![]), l("teams", vec![])],
                        ),
                        l("required_status_checks", vec![l("contexts", vec![])]),
                        l("required_pull_request_reviews", vec![]),
                        l("required_signatures", vec![]),
                        l("enforce_admins", vec![]),
                    ],
                )],
            )],
        ),
        l(
            "issues",
            vec![
                l("comments", vec![v("commentId", vec![])]),
                l("events", vec![v("eventId", vec![])]),
                v(
                    "issueId",
                    vec![
                        l("lock", vec![]),
                        l("comments", vec![]),
                        l("events", vec![]),
                        l("labels", vec![v("labelId", vec![])]),
                    ],
                ),
            ],
        ),
        l("keys", vec![v("keyId", vec![])]),
        l("labels", vec![v("labelId", vec![])]),
        l("milestones", vec![v("milestone", vec![])]),
        l("pulls", vec![v("pullId", vec![])]),
        l("releases", vec![v("releaseId", vec![])]),
        l("statuses", vec![v("statusId", vec![])]),
        l("subscribers", vec![v("subscriberId", vec![])]),
        l("assignees", vec![v("assigneeId", vec![])]),
        l("archive", vec![v("zip", vec![])]),
        l("collaborators", vec![v("collaboratorId", vec![])]),
        l("comments", vec![v("commentId", vec![])]),
        l("compare", vec![v("sha", vec![])]),
        l("contents", vec![v("contentId", vec![])]),
        l("commits", vec![v("sha", vec![])]),
        l(
            "git",
            vec![
                l("commits", vec![v("sha", vec![])]),
                l("ref", vec![v("refId", vec![])]),
                l("tags", vec![v("tagId", vec![])]),
                l("trees", vec![v("sha", vec![])]),
                l("refs", vec![l("heads", vec![v("ref", vec![])])]),
            ],
        ),
        l("stars", vec![]),
        l("merges", vec![]),
        l("stargazers", vec![]),
        l("notifications", vec![]),
        l("hooks", vec![]),
        l("deployments", vec![]),
        l("downloads", vec![]),
        l("events", vec![]),
        l("forks", vec![]),
        l("topics", vec![]),
        l("vulnerability-alerts", vec![]),
        l("automated-security-fixes", vec![]),
        l("contributors", vec![]),
        l("languages", vec![]),
        l("teams", vec![]),
        l("tags", vec![]),
        l("transfer", vec![]),
    ]
}

/// The compiled-in GitHub API schema, built on first use.
pub fn github_api() -> &'static Node {
    &GITHUB_API
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ghpath::segment::Segment;

    #[test]
    fn root_is_dispatch() {
        assert!(github_api().is_dispatch());
    }

    #[test]
    fn top_level_families_in_order() {
        let names: Vec<String> = github_api()
            .children()
            .iter()
            .map(|c| c.segment().to_string())
            .collect();
        assert_eq!(
            names,
            vec![
                "repos",
                "user",
                "users",
                "orgs",
                "organizations",
                "issues",
                "search",
                "gists",
                "notifications",
                "repositories",
                "emojis",
                "events",
                "feeds",
                "hub",
                "rate_limit",
                "teams",
                "licenses",
            ]
        );
    }

    #[test]
    fn repo_issues_literals_precede_issue_id() {
        let repos = &github_api().children()[0];
        let repo = &repos.children()[0].children()[0];
        assert_eq!(*repo.segment(), Segment::Variable("repo"));

        let issues = repo
            .children()
            .iter()
            .find(|c| *c.segment() == Segment::Literal("issues"))
            .expect("issues branch");
        let kinds: Vec<Segment> = issues.children().iter().map(|c| *c.segment()).collect();
        assert_eq!(
            kinds,
            vec![
                Segment::Literal("comments"),
                Segment::Literal("events"),
                Segment::Variable("issueId"),
            ]
        );
    }

    #[test]
    fn no_nested_dispatch_nodes() {
        fn walk(node: &Node, depth: usize) {
            if depth > 0 {
                assert!(!node.is_dispatch(), "dispatch node below the root");
            }
            for child in node.children() {
                walk(child, depth + 1);
            }
        }
        walk(github_api(), 0);
    }
}
