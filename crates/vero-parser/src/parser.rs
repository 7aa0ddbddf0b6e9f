//! Parser for Vero source tokens.
//!
//! This module transforms a token stream from the [`lexer`](super::lexer)
//! into the AST defined in [`vero_core::ast`]. The public entry point is
//! [`build_program`], which parses every top-level declaration and
//! recovers at declaration boundaries so one pass reports an error for
//! each broken declaration rather than stopping at the first.

use std::ops::Range;

use winnow::{
    Parser as _,
    combinator::{alt, opt, repeat, separated, terminated},
    error::{ContextError, ErrMode},
    stream::{Stream, TokenSlice},
    token::any,
};

use vero_core::{
    Span, Spanned,
    ast::{
        ActionCall, ActionDef, Check, Condition, Expression, ExpressionKind, Feature, Field,
        Fixture, FixtureField, Hook, HookKind, Page, PageActions, Program, Scenario,
        ScrollDirection, Selector, SelectorKind, Statement, StatementKind, Subject, Target,
        VarDecl, VarKind,
    },
};

use crate::{
    error::{Diagnostic, DiagnosticCollector, ErrorCode, ParseError},
    tokens::{PositionedToken, Token},
};

/// Context type for parser errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Context {
    /// Description of what is currently being parsed
    Label(&'static str),
    /// Remaining token count (`eof_offset()`) at error start position
    ///
    /// Used to calculate start_offset as: `tokens.len() - start_offset_value`
    StartOffset(usize),
}

type Input<'src> = VeroTokenSlice<'src>;
type IResult<O> = std::result::Result<O, ErrMode<ContextError<Context>>>;
/// Type alias for winnow TokenSlice with our positioned tokens
type VeroTokenSlice<'src> = TokenSlice<'src, PositionedToken<'src>>;

/// Label attached by [`unclosed_block_error`]; [`convert_error`] matches
/// on it to produce an `UNCLOSED_BLOCK` diagnostic.
const CLOSING_BRACE: &str = "closing `}`";

fn cut_err<'src, O, F>(input: &mut Input<'src>, f: F) -> IResult<O>
where
    F: FnOnce(&mut Input<'src>) -> IResult<O>,
{
    let start_remaining = input.eof_offset();

    match f(input) {
        Ok(o) => Ok(o),
        Err(ErrMode::Backtrack(mut e)) | Err(ErrMode::Cut(mut e)) => {
            e.push(Context::StartOffset(start_remaining));
            Err(ErrMode::Cut(e))
        }
        Err(e) => Err(e),
    }
}

/// Helper to create a Cut error with a label and a specific StartOffset value
fn cut_error_from_offset(
    start_remaining: usize,
    label: &'static str,
) -> ErrMode<ContextError<Context>> {
    let mut e = ContextError::new();
    e.push(Context::Label(label));
    e.push(Context::StartOffset(start_remaining));
    ErrMode::Cut(e)
}

/// Error for a block whose closing `}` never arrives before EOF.
fn unclosed_block_error() -> ErrMode<ContextError<Context>> {
    let mut e = ContextError::new();
    e.push(Context::Label(CLOSING_BRACE));
    ErrMode::Cut(e)
}

/// Parse a single whitespace, newline, comment, or semicolon token
fn ws_comment<'src>(input: &mut Input<'src>) -> IResult<()> {
    any.verify(|token: &PositionedToken<'_>| token.token.is_trivia())
        .void()
        .parse_next(input)
}

/// Parse zero or more whitespace/comments
fn ws_comments0<'src>(input: &mut Input<'src>) -> IResult<()> {
    repeat(0.., ws_comment).parse_next(input)
}

/// Parse one or more whitespace/comments
fn ws_comments1<'src>(input: &mut Input<'src>) -> IResult<()> {
    repeat(1.., ws_comment).parse_next(input)
}

/// Parser for one exact token, yielding its span
fn token<'src>(expected: Token<'static>) -> impl FnMut(&mut Input<'src>) -> IResult<Span> {
    move |input: &mut Input<'src>| {
        any.verify_map(|t: &PositionedToken<'_>| (t.token == expected).then_some(t.span))
            .parse_next(input)
    }
}

/// Consume `expected` if it is the next token; otherwise leave the input
/// untouched.
fn try_token(input: &mut Input<'_>, expected: &Token<'static>) -> Option<Span> {
    let checkpoint = input.checkpoint();
    match input.next_token() {
        Some(t) if t.token == *expected => Some(t.span),
        _ => {
            input.reset(&checkpoint);
            None
        }
    }
}

/// Parser for a word that is only reserved in one grammar position
/// (`over`, `up`, `down`, `seconds`). These lex as identifiers and are
/// matched by text, case-insensitively, so they stay usable as names
/// everywhere else.
fn qualifier<'src>(word: &'static str) -> impl FnMut(&mut Input<'src>) -> IResult<Span> {
    move |input: &mut Input<'src>| {
        any.verify_map(|t: &PositionedToken<'_>| match &t.token {
            Token::Identifier(name) if name.eq_ignore_ascii_case(word) => Some(t.span),
            _ => None,
        })
        .context(Context::Label(word))
        .parse_next(input)
    }
}

/// Consume a qualifier word if present; otherwise leave the input
/// untouched.
fn try_qualifier(input: &mut Input<'_>, word: &'static str) -> Option<Span> {
    let checkpoint = input.checkpoint();
    match qualifier(word).parse_next(input) {
        Ok(span) => Some(span),
        Err(_) => {
            input.reset(&checkpoint);
            None
        }
    }
}

/// Parse an identifier with span preservation
fn identifier<'src>(input: &mut Input<'src>) -> IResult<Spanned<String>> {
    any.verify_map(|t: &PositionedToken<'_>| match &t.token {
        Token::Identifier(name) => Some(Spanned::new((*name).to_string(), t.span)),
        _ => None,
    })
    .context(Context::Label("identifier"))
    .parse_next(input)
}

/// Parse a string literal with span preservation
fn string_literal<'src>(input: &mut Input<'src>) -> IResult<Spanned<String>> {
    any.verify_map(|t: &PositionedToken<'_>| match &t.token {
        Token::StringLiteral(value) => Some(Spanned::new(value.clone(), t.span)),
        _ => None,
    })
    .context(Context::Label("string literal"))
    .parse_next(input)
}

/// Parse a number literal with span preservation
fn number_literal<'src>(input: &mut Input<'src>) -> IResult<Spanned<f64>> {
    any.verify_map(|t: &PositionedToken<'_>| match &t.token {
        Token::NumberLiteral(n) => Some(Spanned::new(*n, t.span)),
        _ => None,
    })
    .context(Context::Label("number"))
    .parse_next(input)
}

/// Parse an `@tag` annotation
fn annotation<'src>(input: &mut Input<'src>) -> IResult<Spanned<String>> {
    any.verify_map(|t: &PositionedToken<'_>| match &t.token {
        Token::Tag(name) => Some(Spanned::new((*name).to_string(), t.span)),
        _ => None,
    })
    .parse_next(input)
}

/// Parse a string, number, or boolean literal expression
fn literal_expression<'src>(input: &mut Input<'src>) -> IResult<Expression> {
    any.verify_map(|t: &PositionedToken<'_>| {
        let kind = match &t.token {
            Token::StringLiteral(value) => ExpressionKind::String(value.clone()),
            Token::NumberLiteral(n) => ExpressionKind::Number(*n),
            Token::True => ExpressionKind::Bool(true),
            Token::False => ExpressionKind::Bool(false),
            _ => return None,
        };
        Some(Expression::new(kind, t.span))
    })
    .parse_next(input)
}

/// Parse a `[a, b, c]` list expression
fn list_expression<'src>(input: &mut Input<'src>) -> IResult<Expression> {
    let open_span = token(Token::LeftBracket).parse_next(input)?;
    cut_err(input, |input| {
        ws_comments0.parse_next(input)?;
        let items: Vec<Expression> = separated(
            0..,
            expression,
            (ws_comments0, token(Token::Comma), ws_comments0),
        )
        .parse_next(input)?;
        ws_comments0.parse_next(input)?;
        let close_span = token(Token::RightBracket)
            .context(Context::Label("closing `]`"))
            .parse_next(input)?;
        Ok(Expression::new(
            ExpressionKind::List(items),
            open_span.union(close_span),
        ))
    })
}

/// Parse a bare identifier or a dotted `fixture.key` reference
fn ident_expression<'src>(input: &mut Input<'src>) -> IResult<Expression> {
    let first = identifier.parse_next(input)?;
    let checkpoint = input.checkpoint();
    if (ws_comments0, token(Token::Dot)).parse_next(input).is_ok() {
        let key = cut_err(input, |input| {
            ws_comments0.parse_next(input)?;
            identifier
                .context(Context::Label("key after `.`"))
                .parse_next(input)
        })?;
        let span = first.span().union(key.span());
        return Ok(Expression::new(
            ExpressionKind::FixtureRef {
                fixture: first.into_inner(),
                key: key.into_inner(),
            },
            span,
        ));
    }
    input.reset(&checkpoint);
    let span = first.span();
    Ok(Expression::new(
        ExpressionKind::Ident(first.into_inner()),
        span,
    ))
}

/// Parse a single expression: literal, list, identifier, or dotted
/// fixture reference
fn expression<'src>(input: &mut Input<'src>) -> IResult<Expression> {
    alt((literal_expression, list_expression, ident_expression))
        .context(Context::Label("value"))
        .parse_next(input)
}

/// Parse a `page.field` target reference
fn target<'src>(input: &mut Input<'src>) -> IResult<Target> {
    let page = identifier.parse_next(input)?;
    ws_comments0.parse_next(input)?;
    token(Token::Dot)
        .context(Context::Label("`.` between page and field"))
        .parse_next(input)?;
    cut_err(input, |input| {
        ws_comments0.parse_next(input)?;
        let field = identifier
            .context(Context::Label("field name after `.`"))
            .parse_next(input)?;
        Ok(Target { page, field })
    })
}

/// Parse a variable declaration like `text userName = "admin"`.
///
/// Shared between statement position and page bodies, so it returns the
/// declaration together with its full span.
fn var_decl<'src>(input: &mut Input<'src>) -> IResult<(VarDecl, Span)> {
    let (kind, kw_span) = any
        .verify_map(|t: &PositionedToken<'_>| {
            let kind = match &t.token {
                Token::Text => VarKind::Text,
                Token::Number => VarKind::Number,
                Token::Flag => VarKind::Flag,
                Token::List => VarKind::List,
                _ => return None,
            };
            Some((kind, t.span))
        })
        .parse_next(input)?;
    cut_err(input, |input| {
        ws_comments1.parse_next(input)?;
        let name = identifier
            .context(Context::Label("variable name"))
            .parse_next(input)?;
        ws_comments0.parse_next(input)?;
        token(Token::Equals)
            .context(Context::Label("`=`"))
            .parse_next(input)?;
        ws_comments0.parse_next(input)?;
        let value = expression.parse_next(input)?;
        let span = kw_span.union(value.span);
        Ok((VarDecl { kind, name, value }, span))
    })
}

/// Parse the subject of a condition: a `page.field` target or a value.
///
/// Dotted names always parse as targets here; the validator reinterprets
/// them as fixture references when the left side names a fixture.
fn condition_subject<'src>(input: &mut Input<'src>) -> IResult<(Subject, Span)> {
    alt((
        target.map(|target| {
            let span = target.span();
            (Subject::Target(target), span)
        }),
        expression.map(|expr| {
            let span = expr.span;
            (Subject::Value(expr), span)
        }),
    ))
    .context(Context::Label("target or value to check"))
    .parse_next(input)
}

/// Parse the check part of a condition: `visible`, `contains <value>`,
/// or a comparison value
fn condition_check<'src>(input: &mut Input<'src>) -> IResult<(Check, Span)> {
    if let Some(span) = try_token(input, &Token::Visible) {
        return Ok((Check::Visible, span));
    }
    if let Some(kw_span) = try_token(input, &Token::Contains) {
        ws_comments1.parse_next(input)?;
        let value = expression
            .context(Context::Label("value after `contains`"))
            .parse_next(input)?;
        let span = kw_span.union(value.span);
        return Ok((Check::Contains(value), span));
    }
    let value = expression
        .context(Context::Label("`visible`, `contains`, or a comparison value"))
        .parse_next(input)?;
    let span = value.span;
    Ok((Check::Equals(value), span))
}

/// Parse the `<subject> is [not] <check>` core shared by `verify` and
/// `if`
fn condition<'src>(input: &mut Input<'src>) -> IResult<(Condition, Span)> {
    let (subject, subject_span) = condition_subject.parse_next(input)?;
    ws_comments1.parse_next(input)?;
    token(Token::Is)
        .context(Context::Label("`is`"))
        .parse_next(input)?;
    ws_comments1.parse_next(input)?;
    let negated = if try_token(input, &Token::Not).is_some() {
        ws_comments1.parse_next(input)?;
        true
    } else {
        false
    };
    let (check, check_span) = condition_check.parse_next(input)?;
    let span = subject_span.union(check_span);
    Ok((
        Condition {
            subject,
            negated,
            check,
        },
        span,
    ))
}

/// Parse `open "url"` with an optional `in new tab` suffix
fn open_statement<'src>(input: &mut Input<'src>) -> IResult<Statement> {
    let kw_span = token(Token::Open).parse_next(input)?;
    cut_err(input, |input| {
        ws_comments1.parse_next(input)?;
        let url = string_literal
            .context(Context::Label("url string after `open`"))
            .parse_next(input)?;
        let mut span = kw_span.union(url.span());
        let mut new_tab = false;
        let checkpoint = input.checkpoint();
        if (ws_comments1, token(Token::In)).parse_next(input).is_ok() {
            ws_comments1.parse_next(input)?;
            token(Token::New)
                .context(Context::Label("`new` after `in`"))
                .parse_next(input)?;
            ws_comments1.parse_next(input)?;
            let tab_span = token(Token::Tab)
                .context(Context::Label("`tab` after `new`"))
                .parse_next(input)?;
            new_tab = true;
            span = span.union(tab_span);
        } else {
            input.reset(&checkpoint);
        }
        Ok(Statement {
            kind: StatementKind::Open { url, new_tab },
            span,
        })
    })
}

fn click_statement<'src>(input: &mut Input<'src>) -> IResult<Statement> {
    let kw_span = token(Token::Click).parse_next(input)?;
    cut_err(input, |input| {
        ws_comments1.parse_next(input)?;
        let target = target.parse_next(input)?;
        let span = kw_span.union(target.span());
        Ok(Statement {
            kind: StatementKind::Click { target },
            span,
        })
    })
}

fn check_statement<'src>(input: &mut Input<'src>) -> IResult<Statement> {
    let kw_span = token(Token::Check).parse_next(input)?;
    cut_err(input, |input| {
        ws_comments1.parse_next(input)?;
        let target = target.parse_next(input)?;
        let span = kw_span.union(target.span());
        Ok(Statement {
            kind: StatementKind::Check { target },
            span,
        })
    })
}

fn uncheck_statement<'src>(input: &mut Input<'src>) -> IResult<Statement> {
    let kw_span = token(Token::Uncheck).parse_next(input)?;
    cut_err(input, |input| {
        ws_comments1.parse_next(input)?;
        let target = target.parse_next(input)?;
        let span = kw_span.union(target.span());
        Ok(Statement {
            kind: StatementKind::Uncheck { target },
            span,
        })
    })
}

/// Parse `hover [over] page.field`
fn hover_statement<'src>(input: &mut Input<'src>) -> IResult<Statement> {
    let kw_span = token(Token::Hover).parse_next(input)?;
    cut_err(input, |input| {
        ws_comments1.parse_next(input)?;
        // `over` is optional; a page could itself be called `over`, so
        // only treat it as the qualifier when another word follows.
        let checkpoint = input.checkpoint();
        if (qualifier("over"), ws_comments1).parse_next(input).is_err() {
            input.reset(&checkpoint);
        }
        let target = target.parse_next(input)?;
        let span = kw_span.union(target.span());
        Ok(Statement {
            kind: StatementKind::Hover { target },
            span,
        })
    })
}

fn clear_statement<'src>(input: &mut Input<'src>) -> IResult<Statement> {
    let kw_span = token(Token::Clear).parse_next(input)?;
    cut_err(input, |input| {
        ws_comments1.parse_next(input)?;
        let target = target.parse_next(input)?;
        let span = kw_span.union(target.span());
        Ok(Statement {
            kind: StatementKind::Clear { target },
            span,
        })
    })
}

/// Parse `scroll up`, `scroll down`, or `scroll to page.field`
fn scroll_statement<'src>(input: &mut Input<'src>) -> IResult<Statement> {
    let kw_span = token(Token::Scroll).parse_next(input)?;
    cut_err(input, |input| {
        ws_comments1.parse_next(input)?;
        if let Some(span) = try_qualifier(input, "up") {
            return Ok(Statement {
                kind: StatementKind::Scroll {
                    direction: ScrollDirection::Up,
                },
                span: kw_span.union(span),
            });
        }
        if let Some(span) = try_qualifier(input, "down") {
            return Ok(Statement {
                kind: StatementKind::Scroll {
                    direction: ScrollDirection::Down,
                },
                span: kw_span.union(span),
            });
        }
        token(Token::To)
            .context(Context::Label("`up`, `down`, or `to`"))
            .parse_next(input)?;
        ws_comments1.parse_next(input)?;
        let target = target.parse_next(input)?;
        let span = kw_span.union(target.span());
        Ok(Statement {
            kind: StatementKind::Scroll {
                direction: ScrollDirection::To(target),
            },
            span,
        })
    })
}

/// Parse `fill page.field with <value>`
fn fill_statement<'src>(input: &mut Input<'src>) -> IResult<Statement> {
    let kw_span = token(Token::Fill).parse_next(input)?;
    cut_err(input, |input| {
        ws_comments1.parse_next(input)?;
        let target = target.parse_next(input)?;
        ws_comments1.parse_next(input)?;
        token(Token::With)
            .context(Context::Label("`with`"))
            .parse_next(input)?;
        ws_comments1.parse_next(input)?;
        let value = expression.parse_next(input)?;
        let span = kw_span.union(value.span);
        Ok(Statement {
            kind: StatementKind::Fill { target, value },
            span,
        })
    })
}

/// Parse `select <value> from page.field`
fn select_statement<'src>(input: &mut Input<'src>) -> IResult<Statement> {
    let kw_span = token(Token::Select).parse_next(input)?;
    cut_err(input, |input| {
        ws_comments1.parse_next(input)?;
        let value = expression.parse_next(input)?;
        ws_comments1.parse_next(input)?;
        token(Token::From)
            .context(Context::Label("`from`"))
            .parse_next(input)?;
        ws_comments1.parse_next(input)?;
        let target = target.parse_next(input)?;
        let span = kw_span.union(target.span());
        Ok(Statement {
            kind: StatementKind::Select { value, target },
            span,
        })
    })
}

fn press_statement<'src>(input: &mut Input<'src>) -> IResult<Statement> {
    let kw_span = token(Token::Press).parse_next(input)?;
    cut_err(input, |input| {
        ws_comments1.parse_next(input)?;
        let key = string_literal
            .context(Context::Label("key string after `press`"))
            .parse_next(input)?;
        let span = kw_span.union(key.span());
        Ok(Statement {
            kind: StatementKind::Press { key },
            span,
        })
    })
}

/// Parse `wait <n> seconds` or `wait for page.field`
fn wait_statement<'src>(input: &mut Input<'src>) -> IResult<Statement> {
    let kw_span = token(Token::Wait).parse_next(input)?;
    cut_err(input, |input| {
        ws_comments1.parse_next(input)?;
        if try_token(input, &Token::For).is_some() {
            ws_comments1.parse_next(input)?;
            let target = target.parse_next(input)?;
            let span = kw_span.union(target.span());
            return Ok(Statement {
                kind: StatementKind::WaitFor { target },
                span,
            });
        }
        let seconds = number_literal
            .context(Context::Label("`for` or a duration after `wait`"))
            .parse_next(input)?;
        ws_comments1.parse_next(input)?;
        let end = qualifier("seconds").parse_next(input)?;
        let span = kw_span.union(end);
        Ok(Statement {
            kind: StatementKind::WaitSeconds { seconds },
            span,
        })
    })
}

/// Parse `do page.action` or `perform page.action`, with optional
/// `with arg, ...` arguments
fn do_perform_statement<'src>(input: &mut Input<'src>) -> IResult<Statement> {
    let kw_span = any
        .verify_map(|t: &PositionedToken<'_>| match &t.token {
            Token::Do | Token::Perform => Some(t.span),
            _ => None,
        })
        .parse_next(input)?;
    cut_err(input, |input| {
        ws_comments1.parse_next(input)?;
        let page = identifier
            .context(Context::Label("page or bundle name"))
            .parse_next(input)?;
        ws_comments0.parse_next(input)?;
        token(Token::Dot)
            .context(Context::Label("`.` between page and action"))
            .parse_next(input)?;
        ws_comments0.parse_next(input)?;
        let action = identifier
            .context(Context::Label("action name after `.`"))
            .parse_next(input)?;
        let mut span = kw_span.union(action.span());
        let mut arguments = Vec::new();
        let checkpoint = input.checkpoint();
        if (ws_comments1, token(Token::With)).parse_next(input).is_ok() {
            ws_comments1.parse_next(input)?;
            arguments = separated(
                1..,
                expression,
                (ws_comments0, token(Token::Comma), ws_comments0),
            )
            .context(Context::Label("arguments after `with`"))
            .parse_next(input)?;
            if let Some(last) = arguments.last() {
                span = span.union(last.span);
            }
        } else {
            input.reset(&checkpoint);
        }
        Ok(Statement {
            kind: StatementKind::DoPerform {
                call: ActionCall {
                    page,
                    action,
                    arguments,
                },
            },
            span,
        })
    })
}

fn refresh_statement<'src>(input: &mut Input<'src>) -> IResult<Statement> {
    let span = token(Token::Refresh).parse_next(input)?;
    Ok(Statement {
        kind: StatementKind::Refresh,
        span,
    })
}

/// Parse `screenshot` with an optional name string
fn screenshot_statement<'src>(input: &mut Input<'src>) -> IResult<Statement> {
    let kw_span = token(Token::Screenshot).parse_next(input)?;
    let checkpoint = input.checkpoint();
    let name = match (ws_comments1, string_literal).parse_next(input) {
        Ok((_, name)) => Some(name),
        Err(_) => {
            input.reset(&checkpoint);
            None
        }
    };
    let span = name.as_ref().map_or(kw_span, |n| kw_span.union(n.span()));
    Ok(Statement {
        kind: StatementKind::Screenshot { name },
        span,
    })
}

fn log_statement<'src>(input: &mut Input<'src>) -> IResult<Statement> {
    let kw_span = token(Token::Log).parse_next(input)?;
    cut_err(input, |input| {
        ws_comments1.parse_next(input)?;
        let message = expression
            .context(Context::Label("message after `log`"))
            .parse_next(input)?;
        let span = kw_span.union(message.span);
        Ok(Statement {
            kind: StatementKind::Log { message },
            span,
        })
    })
}

fn verify_statement<'src>(input: &mut Input<'src>) -> IResult<Statement> {
    let kw_span = token(Token::Verify).parse_next(input)?;
    cut_err(input, |input| {
        ws_comments1.parse_next(input)?;
        let (condition, cond_span) = condition.parse_next(input)?;
        let span = kw_span.union(cond_span);
        Ok(Statement {
            kind: StatementKind::Verify { condition },
            span,
        })
    })
}

/// Parse `if <condition> { ... }` with an optional `else { ... }`
fn if_statement<'src>(input: &mut Input<'src>) -> IResult<Statement> {
    let kw_span = token(Token::If).parse_next(input)?;
    cut_err(input, |input| {
        ws_comments1.parse_next(input)?;
        let (condition, _) = condition.parse_next(input)?;
        ws_comments0.parse_next(input)?;
        let (then_branch, close_span) = statement_block.parse_next(input)?;
        let mut end_span = close_span;
        let checkpoint = input.checkpoint();
        let else_branch = if (ws_comments0, token(Token::Else)).parse_next(input).is_ok() {
            ws_comments0.parse_next(input)?;
            let (body, close_span) = statement_block.parse_next(input)?;
            end_span = close_span;
            Some(body)
        } else {
            input.reset(&checkpoint);
            None
        };
        let span = kw_span.union(end_span);
        Ok(Statement {
            kind: StatementKind::If {
                condition,
                then_branch,
                else_branch,
            },
            span,
        })
    })
}

/// Parse `repeat <n> times { ... }`
fn repeat_statement<'src>(input: &mut Input<'src>) -> IResult<Statement> {
    let kw_span = token(Token::Repeat).parse_next(input)?;
    cut_err(input, |input| {
        ws_comments1.parse_next(input)?;
        let count_remaining = input.eof_offset();
        let count = number_literal
            .context(Context::Label("repeat count"))
            .parse_next(input)?;
        let value = *count.inner();
        if value < 0.0 || value.fract() != 0.0 {
            return Err(cut_error_from_offset(
                count_remaining,
                "a whole number of repetitions",
            ));
        }
        let count = count.map(|n| *n as u64);
        ws_comments1.parse_next(input)?;
        token(Token::Times)
            .context(Context::Label("`times`"))
            .parse_next(input)?;
        ws_comments0.parse_next(input)?;
        let (body, close_span) = statement_block.parse_next(input)?;
        let span = kw_span.union(close_span);
        Ok(Statement {
            kind: StatementKind::Repeat { count, body },
            span,
        })
    })
}

fn return_statement<'src>(input: &mut Input<'src>) -> IResult<Statement> {
    let span = token(Token::Return).parse_next(input)?;
    Ok(Statement {
        kind: StatementKind::Return,
        span,
    })
}

/// Parse `switch to new tab ["url"]` or `switch to tab <n>`
fn switch_statement<'src>(input: &mut Input<'src>) -> IResult<Statement> {
    let kw_span = token(Token::Switch).parse_next(input)?;
    cut_err(input, |input| {
        ws_comments1.parse_next(input)?;
        token(Token::To)
            .context(Context::Label("`to` after `switch`"))
            .parse_next(input)?;
        ws_comments1.parse_next(input)?;
        if try_token(input, &Token::New).is_some() {
            ws_comments1.parse_next(input)?;
            let tab_span = token(Token::Tab)
                .context(Context::Label("`tab` after `new`"))
                .parse_next(input)?;
            let mut span = kw_span.union(tab_span);
            let checkpoint = input.checkpoint();
            let url = match (ws_comments1, string_literal).parse_next(input) {
                Ok((_, url)) => {
                    span = span.union(url.span());
                    Some(url)
                }
                Err(_) => {
                    input.reset(&checkpoint);
                    None
                }
            };
            return Ok(Statement {
                kind: StatementKind::SwitchToNewTab { url },
                span,
            });
        }
        token(Token::Tab)
            .context(Context::Label("`new tab` or `tab` after `switch to`"))
            .parse_next(input)?;
        ws_comments1.parse_next(input)?;
        let index = number_literal
            .context(Context::Label("tab number"))
            .parse_next(input)?;
        let span = kw_span.union(index.span());
        Ok(Statement {
            kind: StatementKind::SwitchToTab { index },
            span,
        })
    })
}

fn close_tab_statement<'src>(input: &mut Input<'src>) -> IResult<Statement> {
    let kw_span = token(Token::Close).parse_next(input)?;
    cut_err(input, |input| {
        ws_comments1.parse_next(input)?;
        let tab_span = token(Token::Tab)
            .context(Context::Label("`tab` after `close`"))
            .parse_next(input)?;
        Ok(Statement {
            kind: StatementKind::CloseTab,
            span: kw_span.union(tab_span),
        })
    })
}

fn var_decl_statement<'src>(input: &mut Input<'src>) -> IResult<Statement> {
    let (decl, span) = var_decl.parse_next(input)?;
    Ok(Statement {
        kind: StatementKind::VarDecl(decl),
        span,
    })
}

/// Parse a single statement.
///
/// The branches are split into three groups to stay within the `alt`
/// tuple limit.
fn statement<'src>(input: &mut Input<'src>) -> IResult<Statement> {
    alt((
        alt((
            open_statement,
            click_statement,
            check_statement,
            uncheck_statement,
            hover_statement,
            clear_statement,
            scroll_statement,
            fill_statement,
        )),
        alt((
            select_statement,
            press_statement,
            wait_statement,
            do_perform_statement,
            refresh_statement,
            screenshot_statement,
            log_statement,
            verify_statement,
        )),
        alt((
            if_statement,
            repeat_statement,
            return_statement,
            switch_statement,
            close_tab_statement,
            var_decl_statement,
        )),
    ))
    .context(Context::Label("statement"))
    .parse_next(input)
}

/// Parse items up to a closing `}`, reporting an unclosed block if the
/// input ends first. Returns the items and the closing brace span.
///
/// Item errors are committed so a bad item inside a block never makes
/// the whole block silently backtrack.
fn block_items<'src, O>(
    input: &mut Input<'src>,
    mut item: impl FnMut(&mut Input<'src>) -> IResult<O>,
) -> IResult<(Vec<O>, Span)> {
    cut_err(input, |input| {
        let mut items = Vec::new();
        loop {
            ws_comments0.parse_next(input)?;
            if let Some(close_span) = try_token(input, &Token::RightBrace) {
                return Ok((items, close_span));
            }
            if input.is_empty() {
                return Err(unclosed_block_error());
            }
            items.push(cut_err(input, &mut item)?);
        }
    })
}

/// Parse a `{ statement* }` block, returning the body and the closing
/// brace span
fn statement_block<'src>(input: &mut Input<'src>) -> IResult<(Vec<Statement>, Span)> {
    token(Token::LeftBrace)
        .context(Context::Label("`{`"))
        .parse_next(input)?;
    block_items(input, statement)
}

/// Parse a selector strategy keyword (`css`, `xpath`, `testid`)
fn selector_kind<'src>(input: &mut Input<'src>) -> IResult<SelectorKind> {
    any.verify_map(|t: &PositionedToken<'_>| match &t.token {
        Token::Css => Some(SelectorKind::Css),
        Token::XPath => Some(SelectorKind::XPath),
        Token::TestId => Some(SelectorKind::TestId),
        _ => None,
    })
    .parse_next(input)
}

/// Parse `field name = [strategy] "selector"`
fn field_decl<'src>(input: &mut Input<'src>) -> IResult<Field> {
    token(Token::Field).parse_next(input)?;
    cut_err(input, |input| {
        ws_comments1.parse_next(input)?;
        let name = identifier
            .context(Context::Label("field name"))
            .parse_next(input)?;
        ws_comments0.parse_next(input)?;
        token(Token::Equals)
            .context(Context::Label("`=`"))
            .parse_next(input)?;
        ws_comments0.parse_next(input)?;
        let kind = opt(terminated(selector_kind, ws_comments1))
            .parse_next(input)?
            .unwrap_or(SelectorKind::Auto);
        let value = string_literal
            .context(Context::Label("selector string"))
            .parse_next(input)?;
        Ok(Field {
            name,
            selector: Selector { kind, value },
        })
    })
}

/// Parse `action name [with p1, p2] { ... }`
fn action_def<'src>(input: &mut Input<'src>) -> IResult<ActionDef> {
    let kw_span = token(Token::Action).parse_next(input)?;
    cut_err(input, |input| {
        ws_comments1.parse_next(input)?;
        let name = identifier
            .context(Context::Label("action name"))
            .parse_next(input)?;
        let mut params = Vec::new();
        let checkpoint = input.checkpoint();
        if (ws_comments1, token(Token::With)).parse_next(input).is_ok() {
            ws_comments1.parse_next(input)?;
            params = separated(
                1..,
                identifier,
                (ws_comments0, token(Token::Comma), ws_comments0),
            )
            .context(Context::Label("parameter names after `with`"))
            .parse_next(input)?;
        } else {
            input.reset(&checkpoint);
        }
        ws_comments0.parse_next(input)?;
        let (body, close_span) = statement_block.parse_next(input)?;
        let span = kw_span.union(close_span);
        Ok(ActionDef {
            name,
            params,
            body,
            span,
        })
    })
}

/// A single member inside a `page` body.
enum PageMember {
    Field(Field),
    Variable(VarDecl),
    Action(ActionDef),
}

fn page_member<'src>(input: &mut Input<'src>) -> IResult<PageMember> {
    alt((
        field_decl.map(PageMember::Field),
        var_decl.map(|(decl, _)| PageMember::Variable(decl)),
        action_def.map(PageMember::Action),
    ))
    .context(Context::Label("field, variable, or action"))
    .parse_next(input)
}

/// Parse a `page` declaration with its fields, variables, and actions
fn page_decl<'src>(input: &mut Input<'src>) -> IResult<Page> {
    let kw_span = token(Token::Page).parse_next(input)?;
    cut_err(input, |input| {
        ws_comments1.parse_next(input)?;
        let name = identifier
            .context(Context::Label("page name"))
            .parse_next(input)?;
        ws_comments0.parse_next(input)?;
        token(Token::LeftBrace)
            .context(Context::Label("`{`"))
            .parse_next(input)?;
        let (members, close_span) = block_items(input, page_member)?;
        let mut page = Page {
            name,
            fields: Vec::new(),
            variables: Vec::new(),
            actions: Vec::new(),
            span: kw_span.union(close_span),
        };
        for member in members {
            match member {
                PageMember::Field(field) => page.fields.push(field),
                PageMember::Variable(decl) => page.variables.push(decl),
                PageMember::Action(action) => page.actions.push(action),
            }
        }
        Ok(page)
    })
}

/// Parse a `pageactions` bundle tied to a page
fn pageactions_decl<'src>(input: &mut Input<'src>) -> IResult<PageActions> {
    let kw_span = token(Token::PageActions).parse_next(input)?;
    cut_err(input, |input| {
        ws_comments1.parse_next(input)?;
        let name = identifier
            .context(Context::Label("bundle name"))
            .parse_next(input)?;
        ws_comments1.parse_next(input)?;
        token(Token::For)
            .context(Context::Label("`for` and a page name"))
            .parse_next(input)?;
        ws_comments1.parse_next(input)?;
        let for_page = identifier
            .context(Context::Label("page name after `for`"))
            .parse_next(input)?;
        ws_comments0.parse_next(input)?;
        token(Token::LeftBrace)
            .context(Context::Label("`{`"))
            .parse_next(input)?;
        let (actions, close_span) = block_items(input, |input| {
            action_def
                .context(Context::Label("action"))
                .parse_next(input)
        })?;
        Ok(PageActions {
            name,
            for_page,
            actions,
            span: kw_span.union(close_span),
        })
    })
}

/// Parse one `key = <literal>` pair inside a fixture
fn fixture_field<'src>(input: &mut Input<'src>) -> IResult<FixtureField> {
    let name = identifier
        .context(Context::Label("fixture key"))
        .parse_next(input)?;
    cut_err(input, |input| {
        ws_comments0.parse_next(input)?;
        token(Token::Equals)
            .context(Context::Label("`=`"))
            .parse_next(input)?;
        ws_comments0.parse_next(input)?;
        let value_remaining = input.eof_offset();
        let value = expression.parse_next(input)?;
        // Fixtures are plain data; names would have nothing to refer to.
        if !value.is_literal() {
            return Err(cut_error_from_offset(
                value_remaining,
                "a literal fixture value",
            ));
        }
        Ok(FixtureField { name, value })
    })
}

/// Parse a `fixture` data block of literal key/value pairs
fn fixture_decl<'src>(input: &mut Input<'src>) -> IResult<Fixture> {
    let kw_span = token(Token::Fixture).parse_next(input)?;
    cut_err(input, |input| {
        ws_comments1.parse_next(input)?;
        let name = identifier
            .context(Context::Label("fixture name"))
            .parse_next(input)?;
        ws_comments0.parse_next(input)?;
        token(Token::LeftBrace)
            .context(Context::Label("`{`"))
            .parse_next(input)?;
        let (fields, close_span) = block_items(input, fixture_field)?;
        Ok(Fixture {
            name,
            fields,
            span: kw_span.union(close_span),
        })
    })
}

/// Parse `use PageA, PageB` inside a feature
fn use_list<'src>(input: &mut Input<'src>) -> IResult<Vec<Spanned<String>>> {
    token(Token::Use).parse_next(input)?;
    cut_err(input, |input| {
        ws_comments1.parse_next(input)?;
        separated(
            1..,
            identifier,
            (ws_comments0, token(Token::Comma), ws_comments0),
        )
        .context(Context::Label("page names after `use`"))
        .parse_next(input)
    })
}

/// Parse `before each`, `before all`, `after each`, or `after all`
/// hooks
fn hook<'src>(input: &mut Input<'src>) -> IResult<Hook> {
    let (before, kw_span) = any
        .verify_map(|t: &PositionedToken<'_>| match &t.token {
            Token::Before => Some((true, t.span)),
            Token::After => Some((false, t.span)),
            _ => None,
        })
        .parse_next(input)?;
    cut_err(input, |input| {
        ws_comments1.parse_next(input)?;
        let each = any
            .verify_map(|t: &PositionedToken<'_>| match &t.token {
                Token::Each => Some(true),
                Token::All => Some(false),
                _ => None,
            })
            .context(Context::Label("`each` or `all`"))
            .parse_next(input)?;
        let kind = match (before, each) {
            (true, true) => HookKind::BeforeEach,
            (true, false) => HookKind::BeforeAll,
            (false, true) => HookKind::AfterEach,
            (false, false) => HookKind::AfterAll,
        };
        ws_comments0.parse_next(input)?;
        let (body, close_span) = statement_block.parse_next(input)?;
        Ok(Hook {
            kind,
            body,
            span: kw_span.union(close_span),
        })
    })
}

/// Parse a `scenario "title" @tag* { ... }`
fn scenario<'src>(input: &mut Input<'src>) -> IResult<Scenario> {
    let kw_span = token(Token::Scenario).parse_next(input)?;
    cut_err(input, |input| {
        ws_comments1.parse_next(input)?;
        let name = string_literal
            .context(Context::Label("scenario title string"))
            .parse_next(input)?;
        ws_comments0.parse_next(input)?;
        let tags: Vec<Spanned<String>> =
            repeat(0.., terminated(annotation, ws_comments0)).parse_next(input)?;
        let (statements, close_span) = statement_block.parse_next(input)?;
        Ok(Scenario {
            name,
            tags,
            statements,
            span: kw_span.union(close_span),
        })
    })
}

/// A single member inside a `feature` body.
enum FeatureMember {
    Uses(Vec<Spanned<String>>),
    Hook(Hook),
    Scenario(Scenario),
}

fn feature_member<'src>(input: &mut Input<'src>) -> IResult<FeatureMember> {
    alt((
        use_list.map(FeatureMember::Uses),
        hook.map(FeatureMember::Hook),
        scenario.map(FeatureMember::Scenario),
    ))
    .context(Context::Label("`use`, a hook, or a scenario"))
    .parse_next(input)
}

/// Parse a `feature` declaration with optional leading annotations
fn feature_decl<'src>(input: &mut Input<'src>) -> IResult<Feature> {
    let annotations: Vec<Spanned<String>> =
        repeat(0.., terminated(annotation, ws_comments0)).parse_next(input)?;
    let kw_span = if annotations.is_empty() {
        token(Token::Feature).parse_next(input)?
    } else {
        cut_err(input, |input| {
            token(Token::Feature)
                .context(Context::Label("`feature` after annotations"))
                .parse_next(input)
        })?
    };
    cut_err(input, |input| {
        ws_comments1.parse_next(input)?;
        let name = identifier
            .context(Context::Label("feature name"))
            .parse_next(input)?;
        ws_comments0.parse_next(input)?;
        token(Token::LeftBrace)
            .context(Context::Label("`{`"))
            .parse_next(input)?;
        let (members, close_span) = block_items(input, feature_member)?;
        let start = annotations.first().map_or(kw_span, Spanned::span);
        let mut feature = Feature {
            name,
            annotations,
            uses: Vec::new(),
            hooks: Vec::new(),
            scenarios: Vec::new(),
            span: start.union(close_span),
        };
        for member in members {
            match member {
                FeatureMember::Uses(pages) => feature.uses.extend(pages),
                FeatureMember::Hook(hook) => feature.hooks.push(hook),
                FeatureMember::Scenario(scenario) => feature.scenarios.push(scenario),
            }
        }
        Ok(feature)
    })
}

/// A single top-level declaration.
enum Decl {
    Page(Page),
    PageActions(PageActions),
    Feature(Feature),
    Fixture(Fixture),
}

/// Parse one top-level declaration
fn declaration<'src>(input: &mut Input<'src>) -> IResult<Decl> {
    alt((
        page_decl.map(Decl::Page),
        pageactions_decl.map(Decl::PageActions),
        fixture_decl.map(Decl::Fixture),
        feature_decl.map(Decl::Feature),
    ))
    .parse_next(input)
}

/// Skip tokens until the next plausible top-level declaration start.
///
/// Brace depth is tracked so a declaration keyword inside a half-parsed
/// block does not stop recovery early. The depth count saturates at
/// zero because recovery often starts inside an unclosed block.
fn recover_to_top_level(input: &mut Input<'_>) {
    let mut depth = 0usize;
    loop {
        let checkpoint = input.checkpoint();
        let Some(token) = input.next_token() else {
            return;
        };
        match &token.token {
            Token::LeftBrace => depth += 1,
            Token::RightBrace => depth = depth.saturating_sub(1),
            Token::Page | Token::PageActions | Token::Feature | Token::Fixture | Token::Tag(_)
                if depth == 0 =>
            {
                input.reset(&checkpoint);
                return;
            }
            _ => {}
        }
    }
}

/// Source span covering the non-trivia tokens in `range`, falling back
/// to nearby tokens when the range holds only trivia
fn span_of_range(tokens: &[PositionedToken<'_>], range: Range<usize>) -> Span {
    let start = range.start.min(tokens.len());
    let end = range.end.min(tokens.len());
    let slice = &tokens[start..end];
    let first = slice.iter().find(|t| !t.token.is_trivia());
    let last = slice.iter().rev().find(|t| !t.token.is_trivia());
    match (first, last) {
        (Some(first), Some(last)) => first.span.union(last.span),
        _ => slice
            .first()
            .or_else(|| tokens.last())
            .map_or_else(Span::default, |t| t.span),
    }
}

/// Convert a winnow parse error into a source diagnostic.
///
/// The error span is reconstructed from remaining-token counts: the
/// innermost `cut_err` records where the failed construct started, and
/// `current_remaining` is where parsing stopped.
fn convert_error(
    error: ErrMode<ContextError<Context>>,
    tokens: &[PositionedToken<'_>],
    current_remaining: usize,
) -> Diagnostic {
    let context_error = match error {
        ErrMode::Backtrack(e) | ErrMode::Cut(e) => e,
        // Streaming input is not used, so this arm is effectively dead.
        ErrMode::Incomplete(_) => ContextError::new(),
    };

    let start_remaining = context_error.context().find_map(|ctx| match ctx {
        Context::StartOffset(n) => Some(*n),
        _ => None,
    });

    // Calculate offsets from remaining token counts
    let end_offset = tokens.len().saturating_sub(current_remaining);
    let start_offset = start_remaining.map_or(0, |r| tokens.len().saturating_sub(r));
    let at_eof = end_offset >= tokens.len();

    let labels: Vec<&'static str> = context_error
        .context()
        .filter_map(|ctx| match ctx {
            Context::Label(label) => Some(*label),
            _ => None,
        })
        .collect();

    if at_eof && labels.contains(&CLOSING_BRACE) {
        let close_span = tokens
            .iter()
            .rev()
            .find(|t| !t.token.is_trivia())
            .map_or_else(Span::default, |t| t.span);
        let open_span = tokens[..start_offset.min(tokens.len())]
            .iter()
            .rev()
            .find(|t| !t.token.is_trivia())
            .map(|t| t.span);

        let mut diagnostic = Diagnostic::error("block is never closed")
            .with_code(ErrorCode::UnclosedBlock)
            .with_label(close_span, "expected `}` before the end of input")
            .with_help("add a closing `}`");
        if let Some(open_span) = open_span {
            diagnostic = diagnostic.with_secondary_label(open_span, "block opened here");
        }
        return diagnostic;
    }

    let examine_range = if start_offset < end_offset {
        // The failed parser consumed tokens; examine that range.
        start_offset..end_offset
    } else if end_offset < tokens.len() {
        // Nothing consumed; examine the unexpected token itself.
        end_offset..end_offset + 1
    } else {
        // EOF with nothing consumed after the error start.
        start_offset.min(tokens.len().saturating_sub(1))..tokens.len()
    };
    let error_span = span_of_range(tokens, examine_range);

    if labels.is_empty() {
        return Diagnostic::error("unexpected token or end of input")
            .with_code(ErrorCode::UnexpectedToken)
            .with_label(error_span, "could not parse this");
    }

    let expected = labels
        .iter()
        .map(|label| format!("expected {label}"))
        .collect::<Vec<_>>()
        .join(" → ");
    let span_label = if at_eof {
        "input ends here"
    } else {
        "unexpected syntax"
    };

    Diagnostic::error(format!("syntax error: {expected}"))
        .with_code(ErrorCode::SyntaxError)
        .with_label(error_span, span_label)
}

/// Build a program from tokens, collecting syntax diagnostics.
///
/// A failed declaration is skipped up to the next top-level declaration
/// keyword and parsing continues, so sibling declarations still parse
/// and one pass reports an error for each broken declaration.
pub fn build_program<'src>(
    source_tokens: &'src [PositionedToken<'src>],
) -> Result<Program, ParseError> {
    let mut input = TokenSlice::new(source_tokens);
    let mut program = Program::default();
    let mut diagnostics = DiagnosticCollector::new();

    loop {
        let _ = ws_comments0.parse_next(&mut input);
        if input.is_empty() {
            break;
        }

        let remaining_before = input.eof_offset();
        match cut_err(&mut input, declaration) {
            Ok(Decl::Page(page)) => program.pages.push(page),
            Ok(Decl::PageActions(bundle)) => program.page_actions.push(bundle),
            Ok(Decl::Feature(feature)) => program.features.push(feature),
            Ok(Decl::Fixture(fixture)) => program.fixtures.push(fixture),
            Err(error) => {
                let current_remaining = input.eof_offset();
                let diagnostic = if current_remaining == remaining_before {
                    // Nothing matched at all; point at the stray token.
                    let offset = source_tokens.len() - current_remaining;
                    Diagnostic::error(
                        "expected a page, pageactions, fixture, or feature declaration",
                    )
                    .with_code(ErrorCode::UnexpectedToken)
                    .with_label(
                        span_of_range(source_tokens, offset..offset + 1),
                        "unexpected token",
                    )
                } else {
                    convert_error(error, source_tokens, current_remaining)
                };
                diagnostics.emit(diagnostic);

                if input.eof_offset() == remaining_before {
                    // Recovery must make progress even when the error
                    // consumed nothing.
                    let _ = input.next_token();
                }
                recover_to_top_level(&mut input);
            }
        }
    }

    diagnostics.finish().map(|()| program)
}
