use super::segment::{Node, Segment};

/// Outcome of resolving a concrete path against a schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution<'a> {
    /// A branch consumed the whole path; carries the templated path.
    Matched(String),
    /// No branch matched; carries the input exactly as given.
    Unmatched(&'a str),
}

impl<'a> Resolution<'a> {
    pub fn is_match(&self) -> bool {
        matches!(self, Resolution::Matched(_))
    }

    /// The label value: the template on match, the raw path otherwise.
    pub fn as_str(&self) -> &str {
        match self {
            Resolution::Matched(template) => template,
            Resolution::Unmatched(raw) => raw,
        }
    }

    pub fn into_string(self) -> String {
        match self {
            Resolution::Matched(template) => template,
            Resolution::Unmatched(raw) => raw.to_owned(),
        }
    }
}

/// Resolve `path` against the schema rooted at `root`.
///
/// The path is split on `/` with empty fields dropped, so leading, trailing
/// and repeated slashes are ignored. A path without any segment never matches.
pub fn resolve<'a>(root: &Node, path: &'a str) -> Resolution<'a> {
    let parts: Vec<&str> = split_path(path);
    if parts.is_empty() {
        return Resolution::Unmatched(path);
    }

    let mut matched: Vec<&Segment> = Vec::with_capacity(parts.len());
    if !walk(root, &parts, &mut matched) || matched.is_empty() {
        return Resolution::Unmatched(path);
    }

    Resolution::Matched(render(&matched))
}

fn split_path(path: &str) -> Vec<&str> {
    path.split('/').filter(|part| !part.is_empty()).collect()
}

/// Depth-first match. On success `matched` holds the consumed segments in
/// root-to-leaf order; on failure it is left as it was on entry.
fn walk<'t>(node: &'t Node, path: &[&str], matched: &mut Vec<&'t Segment>) -> bool {
    let Some((first, rest)) = path.split_first() else {
        return true;
    };

    if node.is_dispatch() {
        let mark = matched.len();
        for child in node.children() {
            // A dispatch child must consume something to count as a match.
            if walk(child, path, matched) && matched.len() > mark {
                return true;
            }
            matched.truncate(mark);
        }
        return false;
    }

    if !node.segment().matches(first) {
        return false;
    }

    if node.is_leaf() {
        if !rest.is_empty() {
            return false;
        }
        matched.push(node.segment());
        return true;
    }

    matched.push(node.segment());
    let mark = matched.len();
    for child in node.children() {
        if walk(child, rest, matched) {
            return true;
        }
        matched.truncate(mark);
    }
    matched.pop();
    false
}

fn render(matched: &[&Segment]) -> String {
    let mut out = String::with_capacity(matched.len() * 12);
    for segment in matched {
        out.push('/');
        out.push_str(&segment.represent());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ghpath::segment::{l, v};

    fn tree() -> Node {
        l(
            "",
            vec![
                l(
                    "a",
                    vec![
                        l("x", vec![]),
                        v("id", vec![l("y", vec![])]),
                        l("x", vec![l("never", vec![])]),
                    ],
                ),
                l("b", vec![v("name", vec![])]),
                l("leaf", vec![]),
            ],
        )
    }

    #[test]
    fn split_drops_empty_fields() {
        assert_eq!(split_path("/a//b/"), vec!["a", "b"]);
        assert_eq!(split_path("a/b"), vec!["a", "b"]);
        assert!(split_path("///").is_empty());
        assert!(split_path("").is_empty());
    }

    #[test]
    fn resolves_literal_leaf() {
        assert_eq!(
            resolve(&tree(), "/leaf"),
            Resolution::Matched("/leaf".to_string())
        );
    }

    #[test]
    fn resolves_variable() {
        assert_eq!(resolve(&tree(), "/b/bob").as_str(), "/b/:name");
    }

    #[test]
    fn leaf_requires_exact_consumption() {
        assert_eq!(
            resolve(&tree(), "/leaf/extra"),
            Resolution::Unmatched("/leaf/extra")
        );
        assert!(!resolve(&tree(), "/b/bob/extra").is_match());
    }

    #[test]
    fn sibling_backtracking_after_leaf_overrun() {
        // "x" is a leaf, so "/a/x/y" falls through to the variable sibling.
        assert_eq!(resolve(&tree(), "/a/x/y").as_str(), "/a/:id/y");
    }

    #[test]
    fn first_declared_sibling_wins() {
        assert_eq!(resolve(&tree(), "/a/x").as_str(), "/a/x");
    }

    #[test]
    fn later_duplicate_tried_once_earlier_siblings_fail() {
        // The leaf "x" overruns and the variable branch expects "y", so the
        // second "x" gets its turn.
        assert_eq!(resolve(&tree(), "/a/x/never").as_str(), "/a/x/never");
        assert!(!resolve(&tree(), "/a/x/other").is_match());
    }

    #[test]
    fn path_ending_inside_branch_matches_prefix() {
        assert_eq!(resolve(&tree(), "/a").as_str(), "/a");
        assert_eq!(resolve(&tree(), "/a/7").as_str(), "/a/:id");
    }

    #[test]
    fn no_segments_is_unmatched() {
        assert_eq!(resolve(&tree(), ""), Resolution::Unmatched(""));
        assert_eq!(resolve(&tree(), "/"), Resolution::Unmatched("/"));
        assert_eq!(resolve(&tree(), "//"), Resolution::Unmatched("//"));
    }

    #[test]
    fn unmatched_keeps_raw_input() {
        let res = resolve(&tree(), "//c///d/");
        assert_eq!(res.as_str(), "//c///d/");
        assert_eq!(res.into_string(), "//c///d/");
    }

    #[test]
    fn dispatch_without_children_matches_nothing() {
        assert!(!resolve(&l("", vec![]), "/a").is_match());
    }

    #[test]
    fn non_dispatch_root_consumes_first_segment() {
        let root = l("api", vec![v("version", vec![])]);
        assert_eq!(resolve(&root, "/api/v3").as_str(), "/api/:version");
        assert!(!resolve(&root, "/other/v3").is_match());
    }
}
