use std::fmt;
use vero_core::Span;
use winnow::stream::Location;

/// Token types for the Vero language.
///
/// Keywords are recognized case-insensitively by the lexer but carry no
/// case information here; identifiers keep their source spelling.
#[derive(Debug, Clone, PartialEq)]
pub enum Token<'src> {
    // Declaration keywords
    Page,
    Field,
    Action,
    PageActions,
    For,
    Fixture,
    Feature,
    Use,
    Before,
    After,
    Each,
    All,
    Scenario,

    // Statement keywords
    Open,
    In,
    New,
    Tab,
    Click,
    Check,
    Uncheck,
    Hover,
    Clear,
    Scroll,
    To,
    Fill,
    With,
    Select,
    From,
    Press,
    Wait,
    Do,
    Perform,
    Refresh,
    Screenshot,
    Log,
    Verify,
    Is,
    Not,
    Visible,
    Contains,
    If,
    Else,
    Repeat,
    Times,
    Return,
    Switch,
    Close,

    // Selector strategies
    Css,
    XPath,
    TestId,

    // Variable kinds
    Text,
    Number,
    Flag,
    List,

    // Boolean literals
    True,
    False,

    // Literals
    StringLiteral(String),
    NumberLiteral(f64),
    Identifier(&'src str),
    Tag(&'src str),

    // Punctuation
    LeftBrace,    // {
    RightBrace,   // }
    LeftBracket,  // [
    RightBracket, // ]
    Equals,       // =
    Comma,        // ,
    Dot,          // .
    Semicolon,    // ;

    // Comments
    LineComment(&'src str), // # comment

    // Whitespace
    Whitespace,
    Newline,
}

impl<'src> Token<'src> {
    /// Whether this token is trivia the parser skips between statements.
    pub fn is_trivia(&self) -> bool {
        matches!(
            self,
            Token::Whitespace | Token::Newline | Token::LineComment(_) | Token::Semicolon
        )
    }
}

/// A token with position information for winnow integration
#[derive(Debug, Clone, PartialEq)]
pub struct PositionedToken<'src> {
    pub token: Token<'src>,
    pub span: Span,
}

impl<'src> PositionedToken<'src> {
    pub fn new(token: Token<'src>, span: Span) -> Self {
        Self { token, span }
    }
}

impl<'src> std::ops::Deref for PositionedToken<'src> {
    type Target = Token<'src>;

    fn deref(&self) -> &Self::Target {
        &self.token
    }
}

impl<'src> AsRef<Token<'src>> for PositionedToken<'src> {
    fn as_ref(&self) -> &Token<'src> {
        &self.token
    }
}

impl<'src> From<(Token<'src>, Span)> for PositionedToken<'src> {
    fn from((token, span): (Token<'src>, Span)) -> Self {
        Self::new(token, span)
    }
}

impl<'src> fmt::Display for PositionedToken<'src> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.token.fmt(f)
    }
}

impl<'src> Location for PositionedToken<'src> {
    fn previous_token_end(&self) -> usize {
        self.span.start()
    }

    fn current_token_start(&self) -> usize {
        self.span.start()
    }
}

impl fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Page => write!(f, "page"),
            Token::Field => write!(f, "field"),
            Token::Action => write!(f, "action"),
            Token::PageActions => write!(f, "pageactions"),
            Token::For => write!(f, "for"),
            Token::Fixture => write!(f, "fixture"),
            Token::Feature => write!(f, "feature"),
            Token::Use => write!(f, "use"),
            Token::Before => write!(f, "before"),
            Token::After => write!(f, "after"),
            Token::Each => write!(f, "each"),
            Token::All => write!(f, "all"),
            Token::Scenario => write!(f, "scenario"),

            Token::Open => write!(f, "open"),
            Token::In => write!(f, "in"),
            Token::New => write!(f, "new"),
            Token::Tab => write!(f, "tab"),
            Token::Click => write!(f, "click"),
            Token::Check => write!(f, "check"),
            Token::Uncheck => write!(f, "uncheck"),
            Token::Hover => write!(f, "hover"),
            Token::Clear => write!(f, "clear"),
            Token::Scroll => write!(f, "scroll"),
            Token::To => write!(f, "to"),
            Token::Fill => write!(f, "fill"),
            Token::With => write!(f, "with"),
            Token::Select => write!(f, "select"),
            Token::From => write!(f, "from"),
            Token::Press => write!(f, "press"),
            Token::Wait => write!(f, "wait"),
            Token::Do => write!(f, "do"),
            Token::Perform => write!(f, "perform"),
            Token::Refresh => write!(f, "refresh"),
            Token::Screenshot => write!(f, "screenshot"),
            Token::Log => write!(f, "log"),
            Token::Verify => write!(f, "verify"),
            Token::Is => write!(f, "is"),
            Token::Not => write!(f, "not"),
            Token::Visible => write!(f, "visible"),
            Token::Contains => write!(f, "contains"),
            Token::If => write!(f, "if"),
            Token::Else => write!(f, "else"),
            Token::Repeat => write!(f, "repeat"),
            Token::Times => write!(f, "times"),
            Token::Return => write!(f, "return"),
            Token::Switch => write!(f, "switch"),
            Token::Close => write!(f, "close"),

            Token::Css => write!(f, "css"),
            Token::XPath => write!(f, "xpath"),
            Token::TestId => write!(f, "testid"),

            Token::Text => write!(f, "text"),
            Token::Number => write!(f, "number"),
            Token::Flag => write!(f, "flag"),
            Token::List => write!(f, "list"),

            Token::True => write!(f, "true"),
            Token::False => write!(f, "false"),

            Token::StringLiteral(s) => write!(f, "\"{s}\""),
            Token::NumberLiteral(n) => write!(f, "{n}"),
            Token::Identifier(name) => write!(f, "{name}"),
            Token::Tag(name) => write!(f, "@{name}"),

            Token::LeftBrace => write!(f, "{{"),
            Token::RightBrace => write!(f, "}}"),
            Token::LeftBracket => write!(f, "["),
            Token::RightBracket => write!(f, "]"),
            Token::Equals => write!(f, "="),
            Token::Comma => write!(f, ","),
            Token::Dot => write!(f, "."),
            Token::Semicolon => write!(f, ";"),

            Token::LineComment(comment) => write!(f, "#{comment}"),
            Token::Whitespace => write!(f, " "),
            Token::Newline => write!(f, "\\n"),
        }
    }
}
