use std::borrow::Cow;
use std::fmt;

/// A single matching unit of the schema tree.
///
/// `Literal` matches one exact segment; `Variable` matches any segment and
/// renders as `:name` in the resulting template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment {
    Literal(&'static str),
    Variable(&'static str),
}

impl Segment {
    pub fn matches(&self, part: &str) -> bool {
        match self {
            Segment::Literal(value) => *value == part,
            Segment::Variable(_) => true,
        }
    }

    /// Template representation: the literal itself, or `:name`.
    pub fn represent(&self) -> Cow<'static, str> {
        match self {
            Segment::Literal(value) => Cow::Borrowed(*value),
            Segment::Variable(name) => Cow::Owned(format!(":{name}")),
        }
    }

    pub fn is_empty_literal(&self) -> bool {
        matches!(self, Segment::Literal(""))
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.represent())
    }
}

/// A node in the schema tree.
///
/// Children are kept in declaration order; the resolver tries them in that
/// order and the first full match wins.
#[derive(Debug, Clone)]
pub struct Node {
    segment: Segment,
    children: Vec<Node>,
}

impl Node {
    pub fn new(segment: Segment, children: Vec<Node>) -> Self {
        Self { segment, children }
    }

    pub fn segment(&self) -> &Segment {
        &self.segment
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// A dispatch node consumes no segment and only fans out to its children.
    /// The synthetic root of every schema is one.
    pub fn is_dispatch(&self) -> bool {
        self.segment.is_empty_literal()
    }
}

/// Build a literal node.
pub fn l(value: &'static str, children: Vec<Node>) -> Node {
    Node::new(Segment::Literal(value), children)
}

/// Build a variable node.
pub fn v(name: &'static str, children: Vec<Node>) -> Node {
    Node::new(Segment::Variable(name), children)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_matches_exactly() {
        let seg = Segment::Literal("issues");
        assert!(seg.matches("issues"));
        assert!(!seg.matches("Issues"));
        assert!(!seg.matches("issue"));
        assert!(!seg.matches(""));
    }

    #[test]
    fn variable_matches_anything() {
        let seg = Segment::Variable("owner");
        assert!(seg.matches("kubernetes"));
        assert!(seg.matches("42"));
        assert!(seg.matches("issues"));
    }

    #[test]
    fn represent_literal_and_variable() {
        assert_eq!(Segment::Literal("repos").represent(), "repos");
        assert_eq!(Segment::Variable("owner").represent(), ":owner");
    }

    #[test]
    fn display_agrees_with_represent() {
        for seg in [
            Segment::Literal("repos"),
            Segment::Literal(""),
            Segment::Variable("owner"),
        ] {
            assert_eq!(seg.to_string(), seg.represent());
        }
    }

    #[test]
    fn builders_keep_declaration_order() {
        let node = l(
            "search",
            vec![l("repositories", vec![]), l("commits", vec![]), l("code", vec![])],
        );
        let names: Vec<String> = node.children().iter().map(|c| c.segment().to_string()).collect();
        assert_eq!(names, vec!["repositories", "commits", "code"]);
        assert!(!node.is_leaf());
        assert!(node.children()[0].is_leaf());
    }

    #[test]
    fn only_empty_literal_dispatches() {
        assert!(l("", vec![]).is_dispatch());
        assert!(!l("repos", vec![]).is_dispatch());
        assert!(!v("", vec![]).is_dispatch());
    }
}
