//! Features, hooks, and scenarios.

use serde::Serialize;

use crate::{Span, Spanned, ast::Statement};

/// A named grouping of hooks and scenarios sharing setup/teardown.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Feature {
    pub name: Spanned<String>,
    /// `@tag` annotations written before the `feature` keyword.
    pub annotations: Vec<Spanned<String>>,
    /// Page names from `use` clauses, in declaration order. Empty when
    /// no `use` clause is present.
    pub uses: Vec<Spanned<String>>,
    pub hooks: Vec<Hook>,
    pub scenarios: Vec<Scenario>,
    pub span: Span,
}

impl Feature {
    /// Whether the feature declares an explicit `use` list.
    pub fn has_use_list(&self) -> bool {
        !self.uses.is_empty()
    }
}

/// A setup/teardown block attached to a feature.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Hook {
    pub kind: HookKind,
    pub body: Vec<Statement>,
    pub span: Span,
}

/// Hook timing: before/after crossed with each/all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum HookKind {
    BeforeEach,
    BeforeAll,
    AfterEach,
    AfterAll,
}

impl HookKind {
    /// Suite-level hooks run once per feature, outside any scenario's
    /// page lifecycle.
    pub fn is_suite_level(&self) -> bool {
        matches!(self, HookKind::BeforeAll | HookKind::AfterAll)
    }

    /// The keyword phrase as written in source.
    pub fn phrase(&self) -> &'static str {
        match self {
            HookKind::BeforeEach => "before each",
            HookKind::BeforeAll => "before all",
            HookKind::AfterEach => "after each",
            HookKind::AfterAll => "after all",
        }
    }
}

/// One executable test case: an ordered statement list plus tags.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scenario {
    pub name: Spanned<String>,
    pub tags: Vec<Spanned<String>>,
    pub statements: Vec<Statement>,
    pub span: Span,
}
