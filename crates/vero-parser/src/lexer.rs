//! Lexical analyzer for Vero source text.
//!
//! The lexer converts source text into a stream of [`Token`]s for parsing.
//! It handles whitespace, comments, string literals, and all language tokens
//! defined in the [`tokens`](super::tokens) module. Keywords are recognized
//! case-insensitively; identifiers keep their source spelling.
//!
//! The public entry point is [`tokenize`], which performs error-recovering
//! lexical analysis and collects all diagnostics in a single pass.

use winnow::{
    Parser as _,
    combinator::{alt, cut_err, opt, preceded, repeat, terminated},
    error::{AddContext, ContextError, ErrMode, ModalResult},
    stream::{LocatingSlice, Location, Stream},
    token::{none_of, one_of, take_while},
};

use vero_core::Span;

use crate::{
    error::{Diagnostic, DiagnosticCollector, ErrorCode, ParseError},
    tokens::{PositionedToken, Token},
};

/// Rich diagnostic information for lexer errors.
///
/// Attached to winnow errors via `.context()` to provide detailed error
/// messages with codes, help text, and precise span information.
#[derive(Debug, Clone, PartialEq, Eq)]
struct LexerDiagnostic {
    pub code: ErrorCode,
    pub message: &'static str,
    pub help: Option<&'static str>,
    /// The error span covers from `start` to the error position.
    pub start: usize,
}

type Input<'a> = LocatingSlice<&'a str>;
type IResult<'a, O> = ModalResult<O, ContextError<LexerDiagnostic>>;

/// Parse a standard escape character in a string after the backslash.
fn string_escape_char<'a>(input: &mut Input<'a>) -> IResult<'a, char> {
    one_of(['n', 'r', 't', '\\', '"'])
        .map(|c| match c {
            'n' => '\n',
            'r' => '\r',
            't' => '\t',
            '\\' => '\\',
            '"' => '"',
            _ => unreachable!(),
        })
        .parse_next(input)
}

/// Parse an escape sequence in a string starting with backslash.
///
/// Handles `\n`, `\r`, `\t`, `\\`, and `\"`. Anything else after the
/// backslash is an error committed with the escape's own span.
fn string_escape<'a>(input: &mut Input<'a>) -> IResult<'a, char> {
    let escape_start = input.current_token_start();

    '\\'.parse_next(input)?;

    if let Ok(ch) = string_escape_char(input) {
        return Ok(ch);
    }

    Err(ErrMode::Cut(ContextError::new().add_context(
        input,
        &input.checkpoint(),
        LexerDiagnostic {
            code: ErrorCode::InvalidEscape,
            message: "invalid escape sequence",
            help: Some("valid escapes: `\\n`, `\\r`, `\\t`, `\\\\`, `\\\"`"),
            start: escape_start,
        },
    )))
}

/// Parse a complete string literal with double quotes.
///
/// Strings are single-line; an unescaped newline before the closing quote
/// is reported as an unterminated string.
fn string_literal<'a>(input: &mut Input<'a>) -> IResult<'a, Token<'a>> {
    // Regular string content (not quotes, backslashes, or newlines)
    let string_char = none_of(['"', '\\', '\n', '\r']);

    // String content: mix of regular chars and escapes
    let string_content =
        repeat(0.., alt((string_escape, string_char))).fold(String::new, |mut acc, ch| {
            acc.push(ch);
            acc
        });

    let start_pos = input.current_token_start();

    // Parse opening quote using combinator (properly advances LocatingSlice)
    '"'.parse_next(input)
        .map_err(|_: ErrMode<ContextError<LexerDiagnostic>>| {
            ErrMode::Backtrack(ContextError::new())
        })?;

    // Parse content with cut_err to commit after opening quote
    // Include start_pos so error span covers from opening quote to error position
    cut_err(terminated(string_content, '"'))
        .context(LexerDiagnostic {
            code: ErrorCode::UnterminatedString,
            message: "unterminated string literal",
            help: Some("add closing `\"`"),
            start: start_pos,
        })
        .parse_next(input)
        .map(Token::StringLiteral)
}

/// Parse the text of an unsigned decimal number: `42`, `2.5`.
fn decimal_text<'a>(input: &mut Input<'a>) -> IResult<'a, &'a str> {
    (
        take_while(1.., |c: char| c.is_ascii_digit()),
        opt(('.', take_while(1.., |c: char| c.is_ascii_digit()))),
    )
        .take()
        .parse_next(input)
}

/// Parse a number literal: decimal digits with an optional fraction.
///
/// A leading `-` is accepted so that negative literals survive to later
/// passes; `switch to tab` checks sign and integrality at synthesis time
/// and can then point at the offending literal.
fn number_literal<'a>(input: &mut Input<'a>) -> IResult<'a, Token<'a>> {
    let start_pos = input.current_token_start();

    let negative = opt('-').parse_next(input)?.is_some();

    let magnitude = if negative {
        // `-` commits to a number; nothing else in the grammar starts with it.
        cut_err(decimal_text)
            .context(LexerDiagnostic {
                code: ErrorCode::InvalidNumber,
                message: "expected digits after `-`",
                help: Some("write negative numbers with digits directly after the sign: `-2`"),
                start: start_pos,
            })
            .parse_next(input)?
    } else {
        decimal_text.parse_next(input)?
    };

    let value = magnitude
        .parse::<f64>()
        .map_err(|_| ErrMode::Backtrack(ContextError::new()))?;

    Ok(Token::NumberLiteral(if negative { -value } else { value }))
}

/// Parse line comment starting with '#'
fn line_comment<'a>(input: &mut Input<'a>) -> IResult<'a, Token<'a>> {
    preceded('#', take_while(0.., |c| c != '\n'))
        .map(Token::LineComment)
        .parse_next(input)
}

/// Parse identifier text: a letter or underscore followed by letters,
/// digits, and underscores.
fn ident_text<'a>(input: &mut Input<'a>) -> IResult<'a, &'a str> {
    take_while(1.., |c: char| {
        c.is_ascii_alphabetic() || c == '_' || c.is_ascii_digit()
    })
    .verify(|s: &str| {
        s.chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
    })
    .parse_next(input)
}

/// Map a word to its keyword token, ignoring ASCII case.
///
/// Qualifier words (`over`, `up`, `down`, `seconds`) are deliberately
/// absent: they lex as identifiers and are matched by text in the grammar
/// positions that expect them, so pages may still use them as names.
fn keyword_token(word: &str) -> Option<Token<'static>> {
    let token = match word.to_ascii_lowercase().as_str() {
        // Declarations
        "page" => Token::Page,
        "field" => Token::Field,
        "action" => Token::Action,
        "pageactions" => Token::PageActions,
        "for" => Token::For,
        "fixture" => Token::Fixture,
        "feature" => Token::Feature,
        "use" => Token::Use,
        "before" => Token::Before,
        "after" => Token::After,
        "each" => Token::Each,
        "all" => Token::All,
        "scenario" => Token::Scenario,

        // Statements
        "open" => Token::Open,
        "in" => Token::In,
        "new" => Token::New,
        "tab" => Token::Tab,
        "click" => Token::Click,
        "check" => Token::Check,
        "uncheck" => Token::Uncheck,
        "hover" => Token::Hover,
        "clear" => Token::Clear,
        "scroll" => Token::Scroll,
        "to" => Token::To,
        "fill" => Token::Fill,
        "with" => Token::With,
        "select" => Token::Select,
        "from" => Token::From,
        "press" => Token::Press,
        "wait" => Token::Wait,
        "do" => Token::Do,
        "perform" => Token::Perform,
        "refresh" => Token::Refresh,
        "screenshot" => Token::Screenshot,
        "log" => Token::Log,
        "verify" => Token::Verify,
        "is" => Token::Is,
        "not" => Token::Not,
        "visible" => Token::Visible,
        "contains" => Token::Contains,
        "if" => Token::If,
        "else" => Token::Else,
        "repeat" => Token::Repeat,
        "times" => Token::Times,
        "return" => Token::Return,
        "switch" => Token::Switch,
        "close" => Token::Close,

        // Selector strategies
        "css" => Token::Css,
        "xpath" => Token::XPath,
        "testid" => Token::TestId,

        // Variable kinds
        "text" => Token::Text,
        "number" => Token::Number,
        "flag" => Token::Flag,
        "list" => Token::List,

        // Booleans
        "true" => Token::True,
        "false" => Token::False,

        _ => return None,
    };
    Some(token)
}

/// Parse keywords (case-insensitive, whole word only).
///
/// The whole word is consumed before classification, so `pages` or
/// `pageactionsx` never half-match a keyword prefix.
fn keyword<'a>(input: &mut Input<'a>) -> IResult<'a, Token<'a>> {
    ident_text.verify_map(keyword_token).parse_next(input)
}

/// Parse identifiers
fn identifier<'a>(input: &mut Input<'a>) -> IResult<'a, Token<'a>> {
    ident_text.map(Token::Identifier).parse_next(input)
}

/// Parse a tag: `@` followed by an identifier.
fn tag<'a>(input: &mut Input<'a>) -> IResult<'a, Token<'a>> {
    let start_pos = input.current_token_start();

    '@'.parse_next(input)
        .map_err(|_: ErrMode<ContextError<LexerDiagnostic>>| {
            ErrMode::Backtrack(ContextError::new())
        })?;

    cut_err(ident_text)
        .context(LexerDiagnostic {
            code: ErrorCode::InvalidTag,
            message: "tag is missing a name",
            help: Some("write tags as `@` followed by a name: `@smoke`"),
            start: start_pos,
        })
        .parse_next(input)
        .map(Token::Tag)
}

/// Parse single character tokens
fn single_char_token<'a>(input: &mut Input<'a>) -> IResult<'a, Token<'a>> {
    alt((
        '{'.value(Token::LeftBrace),
        '}'.value(Token::RightBrace),
        '['.value(Token::LeftBracket),
        ']'.value(Token::RightBracket),
        '='.value(Token::Equals),
        ','.value(Token::Comma),
        '.'.value(Token::Dot),
        ';'.value(Token::Semicolon),
    ))
    .parse_next(input)
}

/// Parse whitespace (spaces, tabs, etc. but not newlines)
fn whitespace<'a>(input: &mut Input<'a>) -> IResult<'a, Token<'a>> {
    take_while(1.., |c: char| c.is_whitespace() && c != '\n')
        .value(Token::Whitespace)
        .parse_next(input)
}

/// Parse newline
fn newline<'a>(input: &mut Input<'a>) -> IResult<'a, Token<'a>> {
    '\n'.value(Token::Newline).parse_next(input)
}

/// Parse a single token with position tracking
fn positioned_token<'a>(input: &mut Input<'a>) -> IResult<'a, PositionedToken<'a>> {
    let start_pos = input.current_token_start();

    let token = alt((
        line_comment,      // '#' comments
        string_literal,    // Must come before single char tokens
        tag,               // '@' tags
        number_literal,    // Digits and leading '-'
        keyword,           // Must come before identifier
        identifier,        // Must come before single chars
        single_char_token, // Single character tokens
        newline,           // Must come before whitespace
        whitespace,        // General whitespace
    ))
    .parse_next(input)?;

    let end_pos = input.current_token_start();
    let span = Span::new(start_pos..end_pos);

    Ok(PositionedToken::new(token, span))
}

/// Lexer that accumulates tokens and diagnostics during tokenization.
struct Lexer<'a> {
    tokens: Vec<PositionedToken<'a>>,
    diagnostics: DiagnosticCollector,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer.
    fn new() -> Self {
        Self {
            tokens: Vec::new(),
            diagnostics: DiagnosticCollector::new(),
        }
    }

    /// Tokenize the input, collecting tokens and errors.
    fn tokenize(&mut self, mut input: Input<'a>) {
        while !input.is_empty() {
            match positioned_token(&mut input) {
                Ok(token) => {
                    self.tokens.push(token);
                }
                Err(e) => {
                    // Get position before recovery
                    let error_pos = input.current_token_start();

                    let diagnostic = Self::convert_err_mode(e, error_pos);
                    self.diagnostics.emit(diagnostic);

                    // Single-character skip keeps recovery simple but can
                    // cascade: an invalid escape inside a string leaves the
                    // closing `"` to start a fresh unterminated string.
                    if !input.is_empty() {
                        input.next_token();
                    }
                }
            }
        }
    }

    /// Finish lexing and return tokens or collected errors.
    fn finish(self) -> Result<Vec<PositionedToken<'a>>, ParseError> {
        self.diagnostics.finish().map(|()| self.tokens)
    }

    /// Convert an ErrMode and error position to a Diagnostic.
    ///
    /// Extracts `LexerDiagnostic` from the error context for rich error info
    /// with code, message, and help. Falls back to `UNEXPECTED_CHARACTER`
    /// if no diagnostic context is found.
    fn convert_err_mode(
        err: ErrMode<ContextError<LexerDiagnostic>>,
        error_pos: usize,
    ) -> Diagnostic {
        let context_error = match err {
            ErrMode::Backtrack(ctx) | ErrMode::Cut(ctx) => ctx,
            ErrMode::Incomplete(_) => ContextError::new(),
        };

        // Use the first diagnostic context if available
        if let Some(LexerDiagnostic {
            code,
            message,
            help,
            start,
        }) = context_error.context().next()
        {
            let span = Span::new(*start..error_pos);

            let mut diag = Diagnostic::error(*message)
                .with_code(*code)
                .with_label(span, code.description());
            if let Some(h) = help {
                diag = diag.with_help(*h);
            }
            return diag;
        }

        // Fallback when no context is present
        let span = Span::new(error_pos..error_pos.saturating_add(1));
        Diagnostic::error("unexpected character")
            .with_code(ErrorCode::UnexpectedCharacter)
            .with_label(span, ErrorCode::UnexpectedCharacter.description())
    }
}

/// Parse tokens from a string input, collecting multiple errors.
///
/// Attempts to recover from errors and continue tokenizing, collecting
/// all errors encountered. This provides better user experience by
/// reporting multiple issues in a single pass.
///
/// # Returns
///
/// - `Ok(tokens)` - All tokens successfully parsed
/// - `Err(ParseError)` - One or more errors occurred; contains all diagnostics
pub fn tokenize(input: &str) -> Result<Vec<PositionedToken<'_>>, ParseError> {
    let located_input = LocatingSlice::new(input);
    let mut lexer = Lexer::new();
    lexer.tokenize(located_input);
    lexer.finish()
}
