//! Semantic validation.
//!
//! [`validate`] resolves every page, field, action, and variable
//! reference in a program against the symbol tables, enforces the
//! tab-context rules, and collects all findings before returning. The
//! pass never stops at the first error; transpilation is gated on
//! [`ValidationResult::is_valid`] by the caller.
//!
//! Scoping is lexical and per-body: each hook, scenario, or action body
//! starts from a fresh scope (generated hooks are separate functions, so
//! a variable declared in `before each` is not visible to scenarios).
//! Action parameters seed the body scope. Dotted names resolve by
//! syntactic role: in target position the owner is tried as a page
//! first, then as a fixture; in value position the order is reversed.

use std::collections::HashSet;

use log::{debug, info};

use vero_core::{
    Span,
    ast::{
        ActionCall, Expression, ExpressionKind, HookKind, Program, Statement, Subject, Target,
    },
};
use vero_parser::error::{Diagnostic, ErrorCode};

use crate::{
    suggest::suggest,
    symbols::{ActionContainer, SymbolTable},
};

/// The outcome of a validation run: every diagnostic found, plus the
/// error count that gates transpilation. Warnings do not affect
/// validity.
#[derive(Debug)]
pub struct ValidationResult {
    diagnostics: Vec<Diagnostic>,
    error_count: usize,
}

impl ValidationResult {
    /// Whether the program may be transpiled.
    pub fn is_valid(&self) -> bool {
        self.error_count == 0
    }

    pub fn error_count(&self) -> usize {
        self.error_count
    }

    /// All diagnostics in the order they were found, warnings included.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}

/// A completed validation: the result plus the symbol tables it was
/// checked against, kept for transpilation and name queries.
pub struct Validation<'a> {
    symbols: SymbolTable<'a>,
    result: ValidationResult,
}

impl<'a> Validation<'a> {
    pub fn symbols(&self) -> &SymbolTable<'a> {
        &self.symbols
    }

    pub fn result(&self) -> &ValidationResult {
        &self.result
    }

    pub fn is_valid(&self) -> bool {
        self.result.is_valid()
    }

    pub fn into_parts(self) -> (SymbolTable<'a>, ValidationResult) {
        (self.symbols, self.result)
    }

    /// Names of all declared pages, in declaration order.
    pub fn page_names(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.symbols.page_names()
    }

    /// Field names of one page; empty when the page does not exist.
    pub fn fields_for_page(&self, page: &str) -> impl Iterator<Item = &'a str> + '_ {
        self.symbols.fields_for_page(page)
    }
}

/// Resolve and check every reference in `program`.
pub fn validate(program: &Program) -> Validation<'_> {
    info!(
        pages = program.pages.len(),
        features = program.features.len();
        "validating program"
    );

    let (symbols, duplicates) = SymbolTable::build(program);
    let mut pass = Pass {
        symbols: &symbols,
        diagnostics: duplicates,
        tab_rule: TabRule::Allowed,
        scopes: Vec::new(),
        use_names: None,
        warned_pages: HashSet::new(),
    };
    pass.run(program);

    let diagnostics = pass.diagnostics;
    let error_count = diagnostics
        .iter()
        .filter(|diagnostic| diagnostic.severity().is_error())
        .count();
    debug!(errors = error_count, total = diagnostics.len(); "validation finished");

    Validation {
        symbols,
        result: ValidationResult {
            diagnostics,
            error_count,
        },
    }
}

/// Whether tab-context statements are legal in the body being walked.
/// The forbidden variant carries the phrase naming the enclosing
/// construct for the diagnostic.
#[derive(Clone, Copy)]
enum TabRule {
    Allowed,
    Forbidden(&'static str),
}

struct Pass<'a, 't> {
    symbols: &'t SymbolTable<'a>,
    diagnostics: Vec<Diagnostic>,
    tab_rule: TabRule,
    scopes: Vec<HashSet<&'a str>>,
    /// Page names from the enclosing feature's `use` clause, when one
    /// is present.
    use_names: Option<HashSet<&'a str>>,
    /// Pages already warned about for the current feature, so a page
    /// missing from the `use` list is reported once, not per reference.
    warned_pages: HashSet<&'a str>,
}

impl<'a> Pass<'a, '_> {
    fn run(&mut self, program: &'a Program) {
        for page in &program.pages {
            // A variable initializer may reference variables declared
            // earlier in the same page.
            self.scopes.push(HashSet::new());
            for variable in &page.variables {
                self.visit_expression(&variable.value);
                if let Some(scope) = self.scopes.last_mut() {
                    scope.insert(variable.name.inner().as_str());
                }
            }
            self.scopes.pop();

            for action in &page.actions {
                self.visit_body(
                    &action.body,
                    TabRule::Forbidden("an inline page action"),
                    &action.params,
                );
            }
        }

        for bundle in &program.page_actions {
            let for_name = bundle.for_page.inner().as_str();
            if self.symbols.page(for_name).is_none() {
                let suggestions = suggest(for_name, self.symbols.page_names());
                self.diagnostics.push(undefined(
                    ErrorCode::InvalidPageactionsFor,
                    format!(
                        "pageactions `{}` is for unknown page `{for_name}`",
                        bundle.name.inner()
                    ),
                    bundle.for_page.span(),
                    suggestions,
                ));
            }
            for action in &bundle.actions {
                self.visit_body(
                    &action.body,
                    TabRule::Forbidden("a `pageactions` action"),
                    &action.params,
                );
            }
        }

        for feature in &program.features {
            self.use_names = self.collect_use_names(feature);
            self.warned_pages.clear();

            for hook in &feature.hooks {
                let rule = match hook.kind {
                    HookKind::BeforeAll => TabRule::Forbidden("a `before all` hook"),
                    HookKind::AfterAll => TabRule::Forbidden("an `after all` hook"),
                    HookKind::BeforeEach | HookKind::AfterEach => TabRule::Allowed,
                };
                self.visit_body(&hook.body, rule, &[]);
            }
            for scenario in &feature.scenarios {
                self.visit_body(&scenario.statements, TabRule::Allowed, &[]);
            }

            self.use_names = None;
        }
    }

    /// Check the feature's `use` clause and return its page names.
    /// Unknown names are diagnosed but still recorded, so references to
    /// them do not additionally warn about the `use` list.
    fn collect_use_names(
        &mut self,
        feature: &'a vero_core::ast::Feature,
    ) -> Option<HashSet<&'a str>> {
        if !feature.has_use_list() {
            return None;
        }
        let mut names = HashSet::new();
        for used in &feature.uses {
            let name = used.inner().as_str();
            if self.symbols.page(name).is_none() {
                let suggestions = suggest(name, self.symbols.page_names());
                self.diagnostics.push(undefined(
                    ErrorCode::UndefinedPage,
                    format!("page `{name}` is not defined"),
                    used.span(),
                    suggestions,
                ));
            }
            names.insert(name);
        }
        Some(names)
    }

    /// Walk one statement body under the given tab rule, with a fresh
    /// scope seeded from `params`.
    fn visit_body(
        &mut self,
        statements: &'a [Statement],
        tab_rule: TabRule,
        params: &'a [vero_core::Spanned<String>],
    ) {
        let previous_rule = self.tab_rule;
        self.tab_rule = tab_rule;

        let mut scope = HashSet::new();
        for param in params {
            scope.insert(param.inner().as_str());
        }
        self.scopes.push(scope);

        self.visit_statements(statements);

        self.scopes.pop();
        self.tab_rule = previous_rule;
    }

    fn visit_statements(&mut self, statements: &'a [Statement]) {
        for statement in statements {
            self.visit_statement(statement);
        }
    }

    fn visit_statement(&mut self, statement: &'a Statement) {
        use vero_core::ast::StatementKind::*;

        if statement.kind.changes_tab_context() {
            if let TabRule::Forbidden(context) = self.tab_rule {
                self.diagnostics.push(
                    Diagnostic::error(format!(
                        "`{}` is not allowed in {context}",
                        statement.kind.describe()
                    ))
                    .with_code(ErrorCode::InvalidTabContext)
                    .with_label(statement.span, "not allowed in this context")
                    .with_help(
                        "move tab operations into a scenario or a `before each`/`after each` hook",
                    ),
                );
            }
        }

        match &statement.kind {
            Open { .. } | Press { .. } | WaitSeconds { .. } | Refresh | Screenshot { .. }
            | Return | SwitchToNewTab { .. } | SwitchToTab { .. } | CloseTab => {}
            Click { target }
            | Check { target }
            | Uncheck { target }
            | Hover { target }
            | Clear { target }
            | WaitFor { target } => self.resolve_target(target),
            Scroll { direction } => {
                if let vero_core::ast::ScrollDirection::To(target) = direction {
                    self.resolve_target(target);
                }
            }
            Fill { target, value } => {
                self.resolve_target(target);
                self.visit_expression(value);
            }
            Select { value, target } => {
                self.visit_expression(value);
                self.resolve_target(target);
            }
            DoPerform { call } => self.check_call(call),
            Log { message } => self.visit_expression(message),
            Verify { condition } => self.visit_condition(condition),
            If {
                condition,
                then_branch,
                else_branch,
            } => {
                self.visit_condition(condition);
                self.scopes.push(HashSet::new());
                self.visit_statements(then_branch);
                self.scopes.pop();
                if let Some(branch) = else_branch {
                    self.scopes.push(HashSet::new());
                    self.visit_statements(branch);
                    self.scopes.pop();
                }
            }
            Repeat { body, .. } => {
                self.scopes.push(HashSet::new());
                self.visit_statements(body);
                self.scopes.pop();
            }
            VarDecl(declaration) => {
                self.visit_expression(&declaration.value);
                if let Some(scope) = self.scopes.last_mut() {
                    scope.insert(declaration.name.inner().as_str());
                }
            }
        }
    }

    fn visit_condition(&mut self, condition: &'a vero_core::ast::Condition) {
        match &condition.subject {
            Subject::Value(expression) => self.visit_expression(expression),
            Subject::Target(target) => self.resolve_subject_target(target),
        }
        match &condition.check {
            vero_core::ast::Check::Visible => {}
            vero_core::ast::Check::Contains(expression)
            | vero_core::ast::Check::Equals(expression) => self.visit_expression(expression),
        }
    }

    /// A dotted subject is a page field when the owner is a page, and a
    /// fixture member otherwise.
    fn resolve_subject_target(&mut self, target: &'a Target) {
        let owner = target.page.inner().as_str();
        if self.symbols.page(owner).is_some() {
            self.resolve_target(target);
        } else if self.symbols.fixture(owner).is_some() {
            self.resolve_value_member(owner, target.field.inner(), target.span());
        } else {
            let mut message = format!("page `{owner}` is not defined");
            if self.outside_use_list(owner) {
                message.push_str(" (not in the `use` list)");
            }
            let suggestions = suggest(
                owner,
                self.symbols.page_names().chain(self.symbols.fixture_names()),
            );
            self.diagnostics.push(undefined(
                ErrorCode::UndefinedPage,
                message,
                target.page.span(),
                suggestions,
            ));
        }
    }

    fn resolve_target(&mut self, target: &'a Target) {
        let page_name = target.page.inner().as_str();
        let Some(page) = self.symbols.page(page_name) else {
            let mut message = format!("page `{page_name}` is not defined");
            if self.outside_use_list(page_name) {
                message.push_str(" (not in the `use` list)");
            }
            let suggestions = suggest(page_name, self.symbols.page_names());
            self.diagnostics.push(undefined(
                ErrorCode::UndefinedPage,
                message,
                target.page.span(),
                suggestions,
            ));
            return;
        };

        self.check_use_list(page_name, target.page.span());

        let field_name = target.field.inner().as_str();
        if page.fields.iter().all(|field| field.name.inner() != field_name) {
            let suggestions = suggest(field_name, self.symbols.fields_for_page(page_name));
            self.diagnostics.push(undefined(
                ErrorCode::UndefinedField,
                format!("field `{field_name}` is not defined in page `{page_name}`"),
                target.field.span(),
                suggestions,
            ));
        }
    }

    fn check_call(&mut self, call: &'a ActionCall) {
        let owner = call.page.inner().as_str();
        let Some(container) = self.symbols.action_container(owner) else {
            let suggestions = suggest(
                owner,
                self.symbols.page_names().chain(self.symbols.bundle_names()),
            );
            self.diagnostics.push(undefined(
                ErrorCode::UndefinedPage,
                format!("page or pageactions `{owner}` is not defined"),
                call.page.span(),
                suggestions,
            ));
            for argument in &call.arguments {
                self.visit_expression(argument);
            }
            return;
        };

        if matches!(container, ActionContainer::Page(_)) {
            self.check_use_list(owner, call.page.span());
        }

        let action_name = call.action.inner().as_str();
        match container.find(action_name) {
            None => {
                let suggestions = suggest(
                    action_name,
                    container.actions().iter().map(|a| a.name.inner().as_str()),
                );
                self.diagnostics.push(undefined(
                    ErrorCode::UndefinedAction,
                    format!(
                        "action `{action_name}` is not defined in {}",
                        container.describe()
                    ),
                    call.action.span(),
                    suggestions,
                ));
            }
            Some(action) => {
                let expected = action.params.len();
                let given = call.arguments.len();
                if expected != given {
                    self.diagnostics.push(
                        Diagnostic::error(format!(
                            "action `{action_name}` expects {expected} argument{}, {given} given",
                            if expected == 1 { "" } else { "s" }
                        ))
                        .with_code(ErrorCode::ArgumentCountMismatch)
                        .with_label(
                            call.page.span().union(call.action.span()),
                            "wrong number of arguments",
                        )
                        .with_secondary_label(action.name.span(), "action defined here"),
                    );
                }
            }
        }

        for argument in &call.arguments {
            self.visit_expression(argument);
        }
    }

    fn visit_expression(&mut self, expression: &'a Expression) {
        match &expression.kind {
            ExpressionKind::String(_) | ExpressionKind::Number(_) | ExpressionKind::Bool(_) => {}
            ExpressionKind::List(items) => {
                for item in items {
                    self.visit_expression(item);
                }
            }
            ExpressionKind::Ident(name) => {
                if !self.in_scope(name) && self.symbols.fixture(name).is_none() {
                    let scope_names: Vec<&str> = self
                        .scopes
                        .iter()
                        .flat_map(|scope| scope.iter().copied())
                        .collect();
                    let suggestions = suggest(
                        name,
                        scope_names.into_iter().chain(self.symbols.fixture_names()),
                    );
                    self.diagnostics.push(undefined(
                        ErrorCode::UndefinedVariable,
                        format!("variable `{name}` is not defined"),
                        expression.span,
                        suggestions,
                    ));
                }
            }
            ExpressionKind::FixtureRef { fixture, key } => {
                self.resolve_value_member(fixture, key, expression.span);
            }
        }
    }

    /// Resolve `owner.key` in value position: fixtures first, then page
    /// variables.
    fn resolve_value_member(&mut self, owner: &str, key: &str, span: Span) {
        if let Some(fixture) = self.symbols.fixture(owner) {
            if fixture.fields.iter().all(|field| field.name.inner() != key) {
                let suggestions =
                    suggest(key, fixture.fields.iter().map(|f| f.name.inner().as_str()));
                self.diagnostics.push(undefined(
                    ErrorCode::UndefinedVariable,
                    format!("`{key}` is not defined in fixture `{owner}`"),
                    span,
                    suggestions,
                ));
            }
            return;
        }
        if let Some(page) = self.symbols.page(owner) {
            if page
                .variables
                .iter()
                .all(|variable| variable.name.inner() != key)
            {
                let suggestions = suggest(
                    key,
                    page.variables.iter().map(|v| v.name.inner().as_str()),
                );
                self.diagnostics.push(undefined(
                    ErrorCode::UndefinedVariable,
                    format!("page `{owner}` has no variable `{key}`"),
                    span,
                    suggestions,
                ));
            }
            return;
        }
        let suggestions = suggest(
            owner,
            self.symbols.fixture_names().chain(self.symbols.page_names()),
        );
        self.diagnostics.push(undefined(
            ErrorCode::UndefinedVariable,
            format!("`{owner}.{key}` does not refer to a fixture or page variable"),
            span,
            suggestions,
        ));
    }

    fn in_scope(&self, name: &str) -> bool {
        self.scopes.iter().any(|scope| scope.contains(name))
    }

    fn outside_use_list(&self, page_name: &str) -> bool {
        match &self.use_names {
            Some(names) => !names.contains(page_name),
            None => false,
        }
    }

    /// Warn once per feature when a referenced page is missing from an
    /// explicit `use` clause.
    fn check_use_list(&mut self, page_name: &'a str, span: Span) {
        let missing = match &self.use_names {
            Some(names) => !names.contains(page_name),
            None => return,
        };
        if missing && self.warned_pages.insert(page_name) {
            self.diagnostics.push(
                Diagnostic::warning(format!(
                    "page `{page_name}` is referenced but missing from the `use` list"
                ))
                .with_code(ErrorCode::PageNotInUseList)
                .with_label(span, "referenced here")
                .with_help(format!("add `{page_name}` to the `use` clause")),
            );
        }
    }
}

fn undefined(
    code: ErrorCode,
    message: String,
    span: Span,
    suggestions: Vec<String>,
) -> Diagnostic {
    let mut diagnostic = Diagnostic::error(message)
        .with_code(code)
        .with_label(span, "not defined");
    if !suggestions.is_empty() {
        let help = match suggestions.as_slice() {
            [only] => format!("did you mean `{only}`?"),
            many => format!(
                "did you mean one of {}?",
                many.iter()
                    .map(|name| format!("`{name}`"))
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
        };
        diagnostic = diagnostic.with_suggestions(suggestions).with_help(help);
    }
    diagnostic
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validate_source(source: &str) -> ValidationResult {
        let program = vero_parser::parse(source).expect("program should parse");
        let validation = validate(&program);
        let (_, result) = validation.into_parts();
        result
    }

    fn error_codes(result: &ValidationResult) -> Vec<ErrorCode> {
        result
            .diagnostics()
            .iter()
            .filter_map(Diagnostic::code)
            .collect()
    }

    #[test]
    fn test_valid_program_passes() {
        let result = validate_source(
            r##"
            page LoginPage {
                field username = "#username"
                field password = "#password"
                field submit = "#submit"
                action login with user, pass {
                    fill LoginPage.username with user
                    fill LoginPage.password with pass
                    click LoginPage.submit
                }
            }
            fixture testUser {
                name = "alice"
                password = "secret"
            }
            feature Login {
                use LoginPage
                before each {
                    open "https://example.com/login"
                }
                scenario "logs in with fixture data" {
                    do LoginPage.login with testUser.name, testUser.password
                    verify LoginPage.submit is not visible
                }
            }
            "##,
        );
        assert!(result.is_valid(), "diagnostics: {:?}", result.diagnostics());
        assert!(result.diagnostics().is_empty());
    }

    #[test]
    fn test_undefined_page_suggests_close_name() {
        let result = validate_source(
            r##"
            page HomePage { field launch = "#launch" }
            feature Smoke {
                scenario "clicks" {
                    click HomPage.launch
                }
            }
            "##,
        );
        assert!(!result.is_valid());
        assert_eq!(result.error_count(), 1);
        let diagnostic = &result.diagnostics()[0];
        assert_eq!(diagnostic.code(), Some(ErrorCode::UndefinedPage));
        assert!(diagnostic.suggestions().contains(&"HomePage".to_string()));
        assert!(diagnostic.help().unwrap().contains("HomePage"));
    }

    #[test]
    fn test_undefined_field_suggests_close_name() {
        let result = validate_source(
            r##"
            page LoginPage { field username = "#username" }
            feature Login {
                scenario "fills" {
                    fill LoginPage.usrname with "alice"
                }
            }
            "##,
        );
        assert_eq!(error_codes(&result), vec![ErrorCode::UndefinedField]);
        assert!(
            result.diagnostics()[0]
                .suggestions()
                .contains(&"username".to_string())
        );
    }

    #[test]
    fn test_tab_ops_forbidden_in_pageactions() {
        let result = validate_source(
            r##"
            page HomePage { field launch = "#launch" }
            pageactions NavActions for HomePage {
                action jump {
                    switch to new tab
                }
            }
            "##,
        );
        assert_eq!(error_codes(&result), vec![ErrorCode::InvalidTabContext]);
        assert!(
            result.diagnostics()[0]
                .message()
                .contains("`pageactions` action")
        );
    }

    #[test]
    fn test_open_in_new_tab_counts_as_tab_op() {
        let result = validate_source(
            r##"
            page HomePage {
                field launch = "#launch"
                action popOut {
                    open "https://example.com" in new tab
                }
            }
            "##,
        );
        assert_eq!(error_codes(&result), vec![ErrorCode::InvalidTabContext]);
        assert!(result.diagnostics()[0].message().contains("open in new tab"));
    }

    #[test]
    fn test_tab_ops_forbidden_in_suite_hooks_only() {
        let invalid = validate_source(
            r##"
            feature Tabs {
                before all {
                    close tab
                }
            }
            "##,
        );
        assert_eq!(error_codes(&invalid), vec![ErrorCode::InvalidTabContext]);
        assert!(invalid.diagnostics()[0].message().contains("`before all` hook"));

        let valid = validate_source(
            r##"
            feature Tabs {
                before each {
                    close tab
                }
                scenario "switches" {
                    switch to tab 2
                }
            }
            "##,
        );
        assert!(valid.is_valid(), "diagnostics: {:?}", valid.diagnostics());
    }

    #[test]
    fn test_use_list_warning_is_not_an_error() {
        let result = validate_source(
            r##"
            page HomePage { field launch = "#launch" }
            page CartPage { field checkout = "#checkout" }
            feature Shop {
                use CartPage
                scenario "browses" {
                    click HomePage.launch
                    click HomePage.launch
                    click CartPage.checkout
                }
            }
            "##,
        );
        assert!(result.is_valid());
        // One warning for HomePage, reported once despite two references.
        assert_eq!(result.diagnostics().len(), 1);
        let warning = &result.diagnostics()[0];
        assert!(warning.severity().is_warning());
        assert_eq!(warning.code(), Some(ErrorCode::PageNotInUseList));
        assert!(warning.help().unwrap().contains("HomePage"));
    }

    #[test]
    fn test_undefined_page_mentions_use_list_when_present() {
        let result = validate_source(
            r##"
            page HomePage { field launch = "#launch" }
            feature Shop {
                use HomePage
                scenario "browses" {
                    click Missing.thing
                }
            }
            "##,
        );
        assert_eq!(error_codes(&result), vec![ErrorCode::UndefinedPage]);
        assert!(
            result.diagnostics()[0]
                .message()
                .contains("not in the `use` list")
        );
    }

    #[test]
    fn test_use_list_entry_must_be_a_page() {
        let result = validate_source(
            r##"
            page HomePage { field launch = "#launch" }
            feature Shop {
                use HomePag
                scenario "browses" {
                    log "browsing"
                }
            }
            "##,
        );
        assert_eq!(error_codes(&result), vec![ErrorCode::UndefinedPage]);
        assert!(
            result.diagnostics()[0]
                .suggestions()
                .contains(&"HomePage".to_string())
        );
    }

    #[test]
    fn test_undefined_action_and_argument_count() {
        let result = validate_source(
            r##"
            page LoginPage {
                field submit = "#submit"
                action login with user, pass {
                    click LoginPage.submit
                }
            }
            feature Login {
                scenario "calls" {
                    do LoginPage.logn with "a", "b"
                    do LoginPage.login with "a"
                }
            }
            "##,
        );
        assert_eq!(
            error_codes(&result),
            vec![ErrorCode::UndefinedAction, ErrorCode::ArgumentCountMismatch]
        );
        assert!(result.diagnostics()[0].suggestions().contains(&"login".to_string()));
        assert!(result.diagnostics()[1].message().contains("expects 2 arguments, 1 given"));
    }

    #[test]
    fn test_bundle_action_call_resolves() {
        let result = validate_source(
            r##"
            page HomePage { field launch = "#launch" }
            pageactions NavActions for HomePage {
                action goHome {
                    click HomePage.launch
                }
            }
            feature Nav {
                scenario "navigates" {
                    perform NavActions.goHome
                }
            }
            "##,
        );
        assert!(result.is_valid(), "diagnostics: {:?}", result.diagnostics());
    }

    #[test]
    fn test_pageactions_for_unknown_page() {
        let result = validate_source(
            r##"
            page HomePage { field launch = "#launch" }
            pageactions NavActions for HomPage { }
            "##,
        );
        assert_eq!(error_codes(&result), vec![ErrorCode::InvalidPageactionsFor]);
        assert!(
            result.diagnostics()[0]
                .suggestions()
                .contains(&"HomePage".to_string())
        );
    }

    #[test]
    fn test_undefined_variable_in_fill() {
        let result = validate_source(
            r##"
            page LoginPage { field username = "#username" }
            feature Login {
                scenario "fills" {
                    text user = "alice"
                    fill LoginPage.username with user
                    fill LoginPage.username with missing
                }
            }
            "##,
        );
        assert_eq!(error_codes(&result), vec![ErrorCode::UndefinedVariable]);
        assert!(result.diagnostics()[0].message().contains("missing"));
    }

    #[test]
    fn test_variable_scope_ends_with_block() {
        let result = validate_source(
            r##"
            page LoginPage { field username = "#username" }
            feature Login {
                scenario "scopes" {
                    repeat 2 times {
                        text inner = "x"
                        fill LoginPage.username with inner
                    }
                    fill LoginPage.username with inner
                }
            }
            "##,
        );
        assert_eq!(error_codes(&result), vec![ErrorCode::UndefinedVariable]);
    }

    #[test]
    fn test_fixture_member_resolution() {
        let result = validate_source(
            r##"
            fixture testUser {
                name = "alice"
            }
            feature Login {
                scenario "verifies" {
                    verify testUser.name is "alice"
                    log testUser.nme
                }
            }
            "##,
        );
        assert_eq!(error_codes(&result), vec![ErrorCode::UndefinedVariable]);
        assert!(
            result.diagnostics()[0]
                .suggestions()
                .contains(&"name".to_string())
        );
    }

    #[test]
    fn test_page_variable_as_value_member() {
        let result = validate_source(
            r##"
            page ConfigPage {
                field banner = "#banner"
                number timeout = 30
            }
            feature Setup {
                scenario "reads" {
                    log ConfigPage.timeout
                }
            }
            "##,
        );
        assert!(result.is_valid(), "diagnostics: {:?}", result.diagnostics());
    }

    #[test]
    fn test_errors_are_collected_not_short_circuited() {
        let result = validate_source(
            r##"
            page HomePage { field launch = "#launch" }
            feature Smoke {
                scenario "many mistakes" {
                    click Missing.launch
                    click HomePage.missing
                    fill HomePage.launch with nope
                }
            }
            "##,
        );
        assert_eq!(
            error_codes(&result),
            vec![
                ErrorCode::UndefinedPage,
                ErrorCode::UndefinedField,
                ErrorCode::UndefinedVariable
            ]
        );
        assert_eq!(result.error_count(), 3);
    }

    #[test]
    fn test_duplicates_surface_through_validate() {
        let result = validate_source(
            r##"
            page Home { }
            page Home { }
            "##,
        );
        assert_eq!(error_codes(&result), vec![ErrorCode::DuplicatePage]);
    }
}
