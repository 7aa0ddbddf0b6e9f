//! Error codes for Vero diagnostics.
//!
//! Error codes give each diagnostic kind a stable, searchable name that
//! downstream tooling (editors, the dashboard) can match on without
//! parsing message text. The enumeration is closed; codes are grouped by
//! the phase that emits them.

use std::fmt;

/// The closed set of diagnostic codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Lexer
    UnexpectedCharacter,
    UnterminatedString,
    InvalidEscape,
    InvalidNumber,
    InvalidTag,

    // Parser
    SyntaxError,
    UnexpectedToken,
    UnclosedBlock,

    // Validator
    UndefinedPage,
    UndefinedField,
    UndefinedAction,
    UndefinedVariable,
    InvalidPageactionsFor,
    InvalidTabContext,
    DuplicatePage,
    DuplicateFeature,
    DuplicateField,
    DuplicateAction,
    DuplicatePageactions,
    ArgumentCountMismatch,
    PageNotInUseList,

    // Transpiler
    InvalidTabIndex,
}

impl ErrorCode {
    /// The stable string form of the code.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::UnexpectedCharacter => "UNEXPECTED_CHARACTER",
            ErrorCode::UnterminatedString => "UNTERMINATED_STRING",
            ErrorCode::InvalidEscape => "INVALID_ESCAPE",
            ErrorCode::InvalidNumber => "INVALID_NUMBER",
            ErrorCode::InvalidTag => "INVALID_TAG",

            ErrorCode::SyntaxError => "SYNTAX_ERROR",
            ErrorCode::UnexpectedToken => "UNEXPECTED_TOKEN",
            ErrorCode::UnclosedBlock => "UNCLOSED_BLOCK",

            ErrorCode::UndefinedPage => "UNDEFINED_PAGE",
            ErrorCode::UndefinedField => "UNDEFINED_FIELD",
            ErrorCode::UndefinedAction => "UNDEFINED_ACTION",
            ErrorCode::UndefinedVariable => "UNDEFINED_VARIABLE",
            ErrorCode::InvalidPageactionsFor => "INVALID_PAGEACTIONS_FOR",
            ErrorCode::InvalidTabContext => "INVALID_TAB_CONTEXT",
            ErrorCode::DuplicatePage => "DUPLICATE_PAGE",
            ErrorCode::DuplicateFeature => "DUPLICATE_FEATURE",
            ErrorCode::DuplicateField => "DUPLICATE_FIELD",
            ErrorCode::DuplicateAction => "DUPLICATE_ACTION",
            ErrorCode::DuplicatePageactions => "DUPLICATE_PAGEACTIONS",
            ErrorCode::ArgumentCountMismatch => "ARGUMENT_COUNT_MISMATCH",
            ErrorCode::PageNotInUseList => "PAGE_NOT_IN_USE_LIST",

            ErrorCode::InvalidTabIndex => "INVALID_TAB_INDEX",
        }
    }

    /// A short human-readable description of what the code means.
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCode::UnexpectedCharacter => "character is not valid Vero syntax",
            ErrorCode::UnterminatedString => "string literal is missing its closing quote",
            ErrorCode::InvalidEscape => "string contains an unknown escape sequence",
            ErrorCode::InvalidNumber => "number literal could not be read",
            ErrorCode::InvalidTag => "`@` must be followed by a tag name",

            ErrorCode::SyntaxError => "the input does not match the Vero grammar",
            ErrorCode::UnexpectedToken => "token is not valid at this position",
            ErrorCode::UnclosedBlock => "a `{` block is missing its closing `}`",

            ErrorCode::UndefinedPage => "reference to a page that is not defined",
            ErrorCode::UndefinedField => "reference to a field the page does not define",
            ErrorCode::UndefinedAction => "reference to an action that is not defined",
            ErrorCode::UndefinedVariable => "reference to a variable that is not declared",
            ErrorCode::InvalidPageactionsFor => "pageactions bundle targets an unknown page",
            ErrorCode::InvalidTabContext => "tab operations are not allowed in this context",
            ErrorCode::DuplicatePage => "page name is defined more than once",
            ErrorCode::DuplicateFeature => "feature name is defined more than once",
            ErrorCode::DuplicateField => "field name is defined more than once in a page",
            ErrorCode::DuplicateAction => "action name is defined more than once",
            ErrorCode::DuplicatePageactions => "pageactions name is defined more than once",
            ErrorCode::ArgumentCountMismatch => "action call has the wrong number of arguments",
            ErrorCode::PageNotInUseList => "page is referenced but missing from the use list",

            ErrorCode::InvalidTabIndex => "`switch to tab` needs a positive integer tab number",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_as_str() {
        assert_eq!(ErrorCode::UndefinedPage.as_str(), "UNDEFINED_PAGE");
        assert_eq!(
            ErrorCode::InvalidPageactionsFor.as_str(),
            "INVALID_PAGEACTIONS_FOR"
        );
        assert_eq!(ErrorCode::InvalidTabContext.as_str(), "INVALID_TAB_CONTEXT");
    }

    #[test]
    fn test_display_matches_as_str() {
        assert_eq!(
            ErrorCode::UnterminatedString.to_string(),
            "UNTERMINATED_STRING"
        );
        assert_eq!(ErrorCode::SyntaxError.to_string(), "SYNTAX_ERROR");
    }

    #[test]
    fn test_descriptions_are_nonempty() {
        let codes = [
            ErrorCode::UnexpectedCharacter,
            ErrorCode::UnterminatedString,
            ErrorCode::InvalidEscape,
            ErrorCode::InvalidNumber,
            ErrorCode::InvalidTag,
            ErrorCode::SyntaxError,
            ErrorCode::UnexpectedToken,
            ErrorCode::UnclosedBlock,
            ErrorCode::UndefinedPage,
            ErrorCode::UndefinedField,
            ErrorCode::UndefinedAction,
            ErrorCode::UndefinedVariable,
            ErrorCode::InvalidPageactionsFor,
            ErrorCode::InvalidTabContext,
            ErrorCode::DuplicatePage,
            ErrorCode::DuplicateFeature,
            ErrorCode::DuplicateField,
            ErrorCode::DuplicateAction,
            ErrorCode::DuplicatePageactions,
            ErrorCode::ArgumentCountMismatch,
            ErrorCode::PageNotInUseList,
            ErrorCode::InvalidTabIndex,
        ];
        for code in codes {
            assert!(!code.description().is_empty(), "{code} has no description");
        }
    }
}
