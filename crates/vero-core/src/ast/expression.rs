//! Expression variants.

use serde::Serialize;

use crate::Span;

/// A value expression with its source span.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Expression {
    pub kind: ExpressionKind,
    pub span: Span,
}

/// The closed set of Vero value expressions. The language has no
/// operators; values are literals, variable references, or fixture
/// member references.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ExpressionKind {
    String(String),
    Number(f64),
    Bool(bool),
    List(Vec<Expression>),
    /// A reference to a declared variable or action parameter.
    Ident(String),
    /// A `fixture.key` member reference.
    FixtureRef { fixture: String, key: String },
}

impl Expression {
    pub fn new(kind: ExpressionKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// Whether this expression is a literal (no name resolution needed).
    pub fn is_literal(&self) -> bool {
        match &self.kind {
            ExpressionKind::String(_) | ExpressionKind::Number(_) | ExpressionKind::Bool(_) => true,
            ExpressionKind::List(items) => items.iter().all(Expression::is_literal),
            ExpressionKind::Ident(_) | ExpressionKind::FixtureRef { .. } => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_literal() {
        let lit = Expression::new(ExpressionKind::Number(3.0), Span::new(0..1));
        assert!(lit.is_literal());

        let ident = Expression::new(ExpressionKind::Ident("count".to_string()), Span::new(0..5));
        assert!(!ident.is_literal());

        let list = Expression::new(
            ExpressionKind::List(vec![lit.clone(), ident]),
            Span::new(0..10),
        );
        assert!(!list.is_literal());

        let literal_list = Expression::new(ExpressionKind::List(vec![lit]), Span::new(0..5));
        assert!(literal_list.is_literal());
    }

    #[test]
    fn test_expression_serializes_with_kind_and_span() {
        let expr = Expression::new(
            ExpressionKind::FixtureRef {
                fixture: "testUser".to_string(),
                key: "name".to_string(),
            },
            Span::new(10..23),
        );
        let json = serde_json::to_value(&expr).unwrap();
        assert_eq!(json["kind"]["FixtureRef"]["fixture"], "testUser");
        assert_eq!(json["span"]["start"], 10);
        assert_eq!(json["span"]["end"], 23);
    }
}
