//! # Vero Core
//!
//! Core data types for the Vero test-automation language: the AST node
//! model shared by the parser, validator, and transpiler, plus source
//! position tracking ([`Span`], [`Spanned`], [`LineIndex`]).
//!
//! This crate is purely data; it contains no parsing or lowering logic.

pub mod ast;

mod line_index;
mod span;

pub use line_index::{LineCol, LineIndex};
pub use span::{Span, Spanned};
