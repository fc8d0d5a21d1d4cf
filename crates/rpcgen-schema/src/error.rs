//! Validation failures.
//!
//! Each phase reports every problem it finds, so the error values carry
//! lists rather than a single message.

use std::fmt;

/// Why a document was rejected.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    /// The input is not a well-formed document value at all.
    #[error("malformed document: {0}")]
    Parsing(String),

    /// The document does not match the grammar.
    #[error("document does not match the schema grammar:\n{0}")]
    Structural(Violations),

    /// The document is well-formed but inconsistent.
    #[error("document is inconsistent:\n{0}")]
    Semantic(SemanticIssues),
}

impl SchemaError {
    pub fn violations(&self) -> Option<&Violations> {
        match self {
            SchemaError::Structural(v) => Some(v),
            _ => None,
        }
    }

    pub fn semantic_issues(&self) -> Option<&SemanticIssues> {
        match self {
            SchemaError::Semantic(issues) => Some(issues),
            _ => None,
        }
    }
}

/// A single grammar violation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// JSON Pointer into the document; empty for the root.
    pub path: String,
    pub message: String,
}

impl Violation {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "  (root): {}", self.message)
        } else {
            write!(f, "  {}: {}", self.path, self.message)
        }
    }
}

/// All grammar violations found in one pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Violations(Vec<Violation>);

impl Violations {
    pub fn push(&mut self, violation: Violation) {
        self.0.push(violation);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Violation> {
        self.0.iter()
    }

    /// Whether any violation points at `path`.
    pub fn any_at(&self, path: &str) -> bool {
        self.0.iter().any(|v| v.path == path)
    }

    pub fn into_inner(self) -> Vec<Violation> {
        self.0
    }
}

impl From<Vec<Violation>> for Violations {
    fn from(value: Vec<Violation>) -> Self {
        Self(value)
    }
}

impl FromIterator<Violation> for Violations {
    fn from_iter<I: IntoIterator<Item = Violation>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Extend<Violation> for Violations {
    fn extend<I: IntoIterator<Item = Violation>>(&mut self, iter: I) {
        self.0.extend(iter);
    }
}

impl fmt::Display for Violations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, v) in self.0.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{v}")?;
        }
        Ok(())
    }
}

/// A cross-reference problem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SemanticIssue {
    /// Two type declarations share a name.
    DuplicateType { name: String },
    /// Two procedures (or a procedure and a stream) share a name.
    DuplicateProcedure { name: String },
    /// A custom type reference names no declared type.
    UnresolvedReference { name: String, path: String },
}

impl fmt::Display for SemanticIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SemanticIssue::DuplicateType { name } => write!(f, "duplicate type name: {name}"),
            SemanticIssue::DuplicateProcedure { name } => {
                write!(f, "duplicate procedure name: {name}")
            }
            SemanticIssue::UnresolvedReference { name, path } => {
                write!(f, "unresolved type reference: {name} (at {path})")
            }
        }
    }
}

/// All semantic problems found in one pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SemanticIssues(Vec<SemanticIssue>);

impl SemanticIssues {
    pub fn push(&mut self, issue: SemanticIssue) {
        self.0.push(issue);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SemanticIssue> {
        self.0.iter()
    }

    pub fn into_inner(self) -> Vec<SemanticIssue> {
        self.0
    }
}

impl From<Vec<SemanticIssue>> for SemanticIssues {
    fn from(value: Vec<SemanticIssue>) -> Self {
        Self(value)
    }
}

impl fmt::Display for SemanticIssues {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, issue) in self.0.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "  {issue}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn violations_render_one_per_line() {
        let violations = Violations::from(vec![
            Violation::new("", "\"procedures\" is a required property"),
            Violation::new("/types/0/name", "\"user\" does not match pattern"),
        ]);
        assert_eq!(
            violations.to_string(),
            "  (root): \"procedures\" is a required property\n  /types/0/name: \"user\" does not match pattern"
        );
    }

    #[test]
    fn semantic_issues_render() {
        let issues = SemanticIssues::from(vec![SemanticIssue::UnresolvedReference {
            name: "Ghost".into(),
            path: "procedure:GetUser:output.user".into(),
        }]);
        insta::assert_snapshot!(
            issues.iter().next().unwrap().to_string(),
            @"unresolved type reference: Ghost (at procedure:GetUser:output.user)"
        );
    }
}
