//! Top-level declarations: programs, pages, page-action bundles, fixtures.

use serde::Serialize;

use crate::{
    Span, Spanned,
    ast::{Expression, Statement, VarDecl},
};

/// Root of a parsed Vero source file.
///
/// Declaration order is preserved; name uniqueness (pages, features) is
/// enforced by the validator, not the parser.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Program {
    pub pages: Vec<Page>,
    pub page_actions: Vec<PageActions>,
    pub features: Vec<crate::ast::Feature>,
    pub fixtures: Vec<Fixture>,
}

/// A UI-abstraction unit grouping named field selectors, page-scoped
/// variables, and inline actions.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page {
    pub name: Spanned<String>,
    pub fields: Vec<Field>,
    pub variables: Vec<VarDecl>,
    pub actions: Vec<ActionDef>,
    pub span: Span,
}

/// A named element selector inside a page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Field {
    pub name: Spanned<String>,
    pub selector: Selector,
}

/// A selector value tagged with its resolution strategy.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Selector {
    pub kind: SelectorKind,
    pub value: Spanned<String>,
}

/// How a selector string is interpreted when generating locators.
///
/// `Auto` is the default for bare `field x = "..."` declarations and
/// leaves strategy inference to the transpiler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SelectorKind {
    Auto,
    Css,
    XPath,
    TestId,
}

/// A named, parameterized statement body declared inside a page or a
/// page-actions bundle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionDef {
    pub name: Spanned<String>,
    pub params: Vec<Spanned<String>>,
    pub body: Vec<Statement>,
    pub span: Span,
}

/// A reusable action bundle bound to exactly one page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageActions {
    pub name: Spanned<String>,
    pub for_page: Spanned<String>,
    pub actions: Vec<ActionDef>,
    pub span: Span,
}

/// A named bag of literal values, referenced as `name.key` in
/// expressions.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Fixture {
    pub name: Spanned<String>,
    pub fields: Vec<FixtureField>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FixtureField {
    pub name: Spanned<String>,
    pub value: Expression,
}
