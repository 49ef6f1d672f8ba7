// Filter expressions for list queries.
//
// The server accepts a textual filter language (`name @=* "acme" && status == 0`)
// through the `filterTerm` query parameter. Expressions are assembled from
// typed clauses; string operands are always quoted and escaped so user input
// can never change the structure of the expression.

use std::fmt;

use tracing::debug;

use crate::types::TenantStatus;

/// Sentinel UI label meaning "do not filter on status".
pub const ALL_STATUSES: &str = "all";

// ── Clauses ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
enum Clause {
    /// `field @=* "value"`: case-insensitive substring match.
    ContainsIgnoreCase { field: &'static str, value: String },
    /// `field == n`
    Equals { field: &'static str, value: i64 },
}

impl fmt::Display for Clause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ContainsIgnoreCase { field, value } => {
                write!(f, "{field} @=* \"{}\"", escape(value))
            }
            Self::Equals { field, value } => write!(f, "{field} == {value}"),
        }
    }
}

/// Escape a string operand for use inside double quotes.
fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        if matches!(ch, '\\' | '"') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

// ── FilterExpression ─────────────────────────────────────────────────

/// Conjunction of filter clauses, rendered via `Display`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterExpression {
    clauses: Vec<Clause>,
}

impl FilterExpression {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a case-insensitive "contains" clause on a string field.
    pub fn contains_ignore_case(mut self, field: &'static str, value: impl Into<String>) -> Self {
        self.clauses.push(Clause::ContainsIgnoreCase {
            field,
            value: value.into(),
        });
        self
    }

    /// Add an equality clause on a numeric field.
    pub fn equals(mut self, field: &'static str, value: i64) -> Self {
        self.clauses.push(Clause::Equals { field, value });
        self
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }
}

impl fmt::Display for FilterExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, clause) in self.clauses.iter().enumerate() {
            if i > 0 {
                f.write_str(" && ")?;
            }
            write!(f, "{clause}")?;
        }
        Ok(())
    }
}

// ── Tenant filter ────────────────────────────────────────────────────

/// Status part of the UI filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Only(TenantStatus),
}

impl StatusFilter {
    /// Resolve a UI label. `"all"` and unrecognized labels both mean no
    /// status filter.
    pub fn from_label(label: &str) -> Self {
        if label == ALL_STATUSES {
            return Self::All;
        }
        match label.parse::<TenantStatus>() {
            Ok(status) => Self::Only(status),
            Err(_) => {
                debug!(label, "unrecognized status label, filtering by name only");
                Self::All
            }
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::All => ALL_STATUSES,
            Self::Only(status) => status.label(),
        }
    }
}

impl From<TenantStatus> for StatusFilter {
    fn from(status: TenantStatus) -> Self {
        Self::Only(status)
    }
}

/// UI-facing list filter: a status selection and a name fragment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TenantFilter {
    pub status: StatusFilter,
    pub name: String,
}

impl TenantFilter {
    pub fn new(status: StatusFilter, name: impl Into<String>) -> Self {
        Self {
            status,
            name: name.into(),
        }
    }

    /// Build from the raw labels a UI submits (`status=Active&name=acme`).
    pub fn from_labels(status: &str, name: impl Into<String>) -> Self {
        Self::new(StatusFilter::from_label(status), name)
    }

    /// The server-side expression for this filter.
    ///
    /// The name clause is always present, so an empty name matches every
    /// tenant. A status clause is added only for a concrete status.
    pub fn to_expression(&self) -> FilterExpression {
        let expr = FilterExpression::new().contains_ignore_case("name", self.name.as_str());
        match self.status {
            StatusFilter::All => expr,
            StatusFilter::Only(status) => expr.equals("status", status.code()),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn render(status: &str, name: &str) -> String {
        TenantFilter::from_labels(status, name)
            .to_expression()
            .to_string()
    }

    #[test]
    fn all_statuses_emits_name_clause_only() {
        assert_eq!(render("all", "acme"), r#"name @=* "acme""#);
    }

    #[test]
    fn empty_name_is_still_a_valid_clause() {
        assert_eq!(render("all", ""), r#"name @=* """#);
    }

    #[test]
    fn concrete_status_is_joined_with_and() {
        assert_eq!(render("Active", "acme"), r#"name @=* "acme" && status == 0"#);
        assert_eq!(render("Inactive", ""), r#"name @=* "" && status == 1"#);
        assert_eq!(render("Demo", "x"), r#"name @=* "x" && status == 2"#);
    }

    #[test]
    fn unrecognized_status_matches_all() {
        for label in ["Archived", "active", "", "0", "ALL"] {
            assert_eq!(render(label, "acme"), render("all", "acme"), "label {label:?}");
        }
    }

    #[test]
    fn quotes_and_backslashes_are_escaped() {
        assert_eq!(
            render("all", r#"a" || status == 1 || name @=* "b"#),
            r#"name @=* "a\" || status == 1 || name @=* \"b""#
        );
        assert_eq!(render("all", r"back\slash"), r#"name @=* "back\\slash""#);
    }

    #[test]
    fn escaped_operand_stays_inside_one_string() {
        // Every quote after the opening one is escaped except the closing one.
        let hostile = r#"x" && status == 2 && name @=* ""#;
        let rendered = render("Demo", hostile);
        let operand_end = rendered.rfind("\" && status == 2").unwrap_or_default();
        let operand = &rendered["name @=* \"".len()..operand_end];
        let unescaped_quotes = operand
            .char_indices()
            .filter(|&(i, c)| c == '"' && !operand[..i].ends_with('\\'))
            .count();
        assert_eq!(unescaped_quotes, 0, "{rendered}");
    }

    #[test]
    fn status_filter_labels_round_trip() {
        assert_eq!(StatusFilter::from_label("all").label(), "all");
        assert_eq!(StatusFilter::from_label("Demo").label(), "Demo");
        assert_eq!(StatusFilter::from_label("bogus"), StatusFilter::All);
    }

    #[test]
    fn builder_supports_other_fields() {
        let expr = FilterExpression::new()
            .equals("status", 1)
            .contains_ignore_case("owner", "bob");
        assert_eq!(expr.to_string(), r#"status == 1 && owner @=* "bob""#);
        assert!(FilterExpression::new().is_empty());
    }
}
