//! Statement variants and the references they carry.

use serde::Serialize;

use crate::{Span, Spanned, ast::Expression};

/// One statement with its source span.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Statement {
    pub kind: StatementKind,
    pub span: Span,
}

/// The closed set of Vero statements.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum StatementKind {
    /// `open "url"` or `open "url" in new tab`
    Open {
        url: Spanned<String>,
        new_tab: bool,
    },
    Click {
        target: Target,
    },
    Check {
        target: Target,
    },
    Uncheck {
        target: Target,
    },
    Hover {
        target: Target,
    },
    Clear {
        target: Target,
    },
    Scroll {
        direction: ScrollDirection,
    },
    Fill {
        target: Target,
        value: Expression,
    },
    Select {
        value: Expression,
        target: Target,
    },
    /// `press "Enter"`
    Press {
        key: Spanned<String>,
    },
    WaitSeconds {
        seconds: Spanned<f64>,
    },
    WaitFor {
        target: Target,
    },
    /// `do Page.action with args` / `perform Page.action`
    DoPerform {
        call: ActionCall,
    },
    Refresh,
    Screenshot {
        name: Option<Spanned<String>>,
    },
    Log {
        message: Expression,
    },
    Verify {
        condition: Condition,
    },
    If {
        condition: Condition,
        then_branch: Vec<Statement>,
        else_branch: Option<Vec<Statement>>,
    },
    Repeat {
        count: Spanned<u64>,
        body: Vec<Statement>,
    },
    Return,
    /// `switch to new tab` / `switch to new tab "url"`
    SwitchToNewTab {
        url: Option<Spanned<String>>,
    },
    /// `switch to tab <n>`; index validity is checked at synthesis time.
    SwitchToTab {
        index: Spanned<f64>,
    },
    CloseTab,
    VarDecl(VarDecl),
}

impl StatementKind {
    /// Statements that change the active tab, requiring page-object
    /// rebinding and a live single-page context.
    pub fn changes_tab_context(&self) -> bool {
        matches!(
            self,
            StatementKind::SwitchToNewTab { .. }
                | StatementKind::SwitchToTab { .. }
                | StatementKind::CloseTab
                | StatementKind::Open { new_tab: true, .. }
        )
    }

    /// Short statement name used in diagnostics.
    pub fn describe(&self) -> &'static str {
        match self {
            StatementKind::Open { new_tab: true, .. } => "open in new tab",
            StatementKind::Open { .. } => "open",
            StatementKind::Click { .. } => "click",
            StatementKind::Check { .. } => "check",
            StatementKind::Uncheck { .. } => "uncheck",
            StatementKind::Hover { .. } => "hover",
            StatementKind::Clear { .. } => "clear",
            StatementKind::Scroll { .. } => "scroll",
            StatementKind::Fill { .. } => "fill",
            StatementKind::Select { .. } => "select",
            StatementKind::Press { .. } => "press",
            StatementKind::WaitSeconds { .. } | StatementKind::WaitFor { .. } => "wait",
            StatementKind::DoPerform { .. } => "perform",
            StatementKind::Refresh => "refresh",
            StatementKind::Screenshot { .. } => "screenshot",
            StatementKind::Log { .. } => "log",
            StatementKind::Verify { .. } => "verify",
            StatementKind::If { .. } => "if",
            StatementKind::Repeat { .. } => "repeat",
            StatementKind::Return => "return",
            StatementKind::SwitchToNewTab { .. } => "switch to new tab",
            StatementKind::SwitchToTab { .. } => "switch to tab",
            StatementKind::CloseTab => "close tab",
            StatementKind::VarDecl(decl) => decl.kind.keyword(),
        }
    }
}

/// Direction of a `scroll` statement.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ScrollDirection {
    Up,
    Down,
    To(Target),
}

/// A `page.field` reference.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Target {
    pub page: Spanned<String>,
    pub field: Spanned<String>,
}

impl Target {
    /// Span covering the whole `page.field` reference.
    pub fn span(&self) -> Span {
        self.page.span().union(self.field.span())
    }
}

/// A `page.action` invocation with arguments.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionCall {
    pub page: Spanned<String>,
    pub action: Spanned<String>,
    pub arguments: Vec<Expression>,
}

/// The subject of a `verify` statement or `if` condition.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Subject {
    Target(Target),
    Value(Expression),
}

/// A relational check: `<subject> is [not] <check>`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Condition {
    pub subject: Subject,
    pub negated: bool,
    pub check: Check,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Check {
    Visible,
    Contains(Expression),
    Equals(Expression),
}

/// A typed variable declaration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VarDecl {
    pub kind: VarKind,
    pub name: Spanned<String>,
    pub value: Expression,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum VarKind {
    Text,
    Number,
    Flag,
    List,
}

impl VarKind {
    pub fn keyword(&self) -> &'static str {
        match self {
            VarKind::Text => "text",
            VarKind::Number => "number",
            VarKind::Flag => "flag",
            VarKind::List => "list",
        }
    }
}
