//! AST node model for Vero programs.
//!
//! The parser produces a [`Program`] from source text; the validator and
//! transpiler consume it without mutation. Statement and expression
//! variants are closed enums so both passes can match exhaustively.

mod expression;
mod feature;
mod program;
mod statement;

pub use expression::{Expression, ExpressionKind};
pub use feature::{Feature, Hook, HookKind, Scenario};
pub use program::{
    ActionDef, Field, Fixture, FixtureField, Page, PageActions, Program, Selector, SelectorKind,
};
pub use statement::{
    ActionCall, Check, Condition, ScrollDirection, Statement, StatementKind, Subject, Target,
    VarDecl, VarKind,
};
