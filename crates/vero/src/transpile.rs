//! Playwright TypeScript code generation.
//!
//! [`transpile`] lowers a validated program into one generated test file
//! per feature. Pages and page-action bundles become classes with
//! `readonly Locator` fields; hooks and scenarios become `test.*`
//! blocks. Generated test titles are the exact scenario names, since
//! external tooling parses titles to recover them.
//!
//! Transpilation assumes a semantically valid AST and does not
//! re-validate; callers gate on [`ValidationResult::is_valid`] first.
//! The single synthesis-time check left is the `switch to tab` index,
//! which must be a positive integer literal.
//!
//! Tab operations are stateful: every `switch to new tab`,
//! `switch to tab`, `close tab`, and `open ... in new tab` reassigns the
//! live `page` binding and re-instantiates every page object bound in
//! the enclosing body, so later statements act on the new tab.
//!
//! [`ValidationResult::is_valid`]: crate::validate::ValidationResult::is_valid

mod writer;

use indexmap::{IndexMap, IndexSet};
use log::{debug, info};
use thiserror::Error;

use vero_parser::error::{Diagnostic, ErrorCode};

use vero_core::{
    Span,
    ast::{
        ActionCall, ActionDef, Check, Condition, Expression, ExpressionKind, Feature, Fixture,
        Hook, HookKind, Page, PageActions, Program, Scenario, ScrollDirection, Selector,
        SelectorKind, Statement, StatementKind, Subject, Target, VarKind,
    },
};

use crate::{
    config::TranspileConfig,
    symbols::{ActionContainer, SymbolTable},
    transpile::writer::{CodeWriter, ts_number, ts_string},
};

/// Generated code, keyed by feature name in declaration order.
#[derive(Debug)]
pub struct TranspileOutput {
    tests: IndexMap<String, String>,
}

impl TranspileOutput {
    /// All generated files as `feature name -> TypeScript source`.
    pub fn tests(&self) -> &IndexMap<String, String> {
        &self.tests
    }

    pub fn get(&self, feature: &str) -> Option<&str> {
        self.tests.get(feature).map(String::as_str)
    }

    pub fn into_tests(self) -> IndexMap<String, String> {
        self.tests
    }
}

/// Errors detected while generating code.
#[derive(Debug, Error)]
pub enum TranspileError {
    /// `switch to tab` takes a 1-based tab number; zero, negative, and
    /// fractional values cannot be compiled.
    #[error("`switch to tab` requires a positive integer tab number, got {value}")]
    InvalidTabIndex { value: f64, span: Span },
}

impl TranspileError {
    /// Source location of the offending construct.
    pub fn span(&self) -> Span {
        match self {
            TranspileError::InvalidTabIndex { span, .. } => *span,
        }
    }

    /// Render this error as a [`Diagnostic`] so reporting tooling can
    /// treat generation failures like any other phase's.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            TranspileError::InvalidTabIndex { span, .. } => {
                Diagnostic::error(self.to_string())
                    .with_code(ErrorCode::InvalidTabIndex)
                    .with_label(*span, "not a positive integer")
                    .with_help("tab numbers start at 1 and count from the first open tab")
            }
        }
    }
}

/// Generate one Playwright test file per feature.
pub fn transpile<'a>(
    program: &'a Program,
    symbols: &'a SymbolTable<'a>,
    config: &TranspileConfig,
) -> Result<TranspileOutput, TranspileError> {
    info!(features = program.features.len(); "transpiling program");

    let transpiler = Transpiler {
        program,
        symbols,
        config: *config,
    };

    let mut tests = IndexMap::new();
    for feature in &program.features {
        let code = transpiler.feature(feature)?;
        debug!(feature = feature.name.inner().as_str(), bytes = code.len(); "feature generated");
        tests.insert(feature.name.inner().clone(), code);
    }

    Ok(TranspileOutput { tests })
}

struct Transpiler<'a> {
    program: &'a Program,
    symbols: &'a SymbolTable<'a>,
    config: TranspileConfig,
}

/// Where a statement is being lowered, which decides how locators and
/// the live page handle are spelled.
#[derive(Clone, Copy)]
enum Frame<'a> {
    /// Hook or scenario body: the handle is `page`, page objects are
    /// rebindable `let` bindings.
    Test,
    /// Class method body; `own` is the page whose fields are
    /// `this`-qualified (`None` inside bundle methods).
    Method { own: Option<&'a Page> },
    /// A page variable assignment in a constructor: sibling variables
    /// are `this`-qualified.
    Initializer { page: &'a Page },
}

/// Per-body emission state: the page objects bound at the top of the
/// body (rebind targets after tab changes) and the `repeat` nesting
/// depth for counter naming.
struct EmitState<'a> {
    bound: Vec<&'a Page>,
    loop_depth: usize,
}

/// Declarations referenced from a statement tree, in first-seen order.
#[derive(Default)]
struct References<'a> {
    pages: IndexSet<&'a str>,
    bundles: IndexSet<&'a str>,
    fixtures: IndexSet<&'a str>,
}

/// A condition subject lowered to either a locator chain or a value
/// expression; the two produce different assertion and branch forms.
enum Lowered {
    Locator(String),
    Value(String),
}

impl<'a> Transpiler<'a> {
    fn feature(&self, feature: &'a Feature) -> Result<String, TranspileError> {
        let refs = self.collect_feature_refs(feature);
        let mut w = CodeWriter::new();

        w.line("// Generated by Vero. Do not edit.");
        w.blank();
        w.line("import { expect, test } from '@playwright/test';");
        if !refs.pages.is_empty() || !refs.bundles.is_empty() {
            w.line("import type { Locator, Page } from '@playwright/test';");
        } else if feature_awaits_popup(feature) {
            w.line("import type { Page } from '@playwright/test';");
        }

        for fixture in self.fixtures_in_order(&refs.fixtures) {
            w.blank();
            self.emit_fixture(&mut w, fixture);
        }
        for page in self.pages_in_order(&refs.pages) {
            w.blank();
            self.emit_page_class(&mut w, page)?;
        }
        for bundle in self.bundles_in_order(&refs.bundles) {
            w.blank();
            self.emit_bundle_class(&mut w, bundle)?;
        }

        w.blank();
        if feature.annotations.is_empty() {
            w.open(format!(
                "test.describe({}, () => {{",
                ts_string(feature.name.inner())
            ));
        } else {
            w.open(format!(
                "test.describe({}, {}, () => {{",
                ts_string(feature.name.inner()),
                tag_option(&feature.annotations)
            ));
        }

        let mut first = true;
        for hook in &feature.hooks {
            if !first {
                w.blank();
            }
            first = false;
            self.emit_hook(&mut w, hook)?;
        }
        for scenario in &feature.scenarios {
            if !first {
                w.blank();
            }
            first = false;
            self.emit_scenario(&mut w, scenario)?;
        }

        w.close("});");
        Ok(w.into_string())
    }

    fn emit_hook(&self, w: &mut CodeWriter, hook: &'a Hook) -> Result<(), TranspileError> {
        let register = match hook.kind {
            HookKind::BeforeEach => "test.beforeEach",
            HookKind::BeforeAll => "test.beforeAll",
            HookKind::AfterEach => "test.afterEach",
            HookKind::AfterAll => "test.afterAll",
        };
        if hook.kind.is_suite_level() {
            // Suite hooks run outside any scenario's page lifecycle, so
            // they drive a page of their own.
            w.open(format!("{register}(async ({{ browser }}) => {{"));
            w.line("const page = await browser.newPage();");
            self.emit_test_body(w, &hook.body)?;
            w.line("await page.close();");
        } else {
            let fixtures = destructured_fixtures(&hook.body);
            w.open(format!("{register}(async ({fixtures}) => {{"));
            self.emit_test_body(w, &hook.body)?;
        }
        w.close("});");
        Ok(())
    }

    fn emit_scenario(
        &self,
        w: &mut CodeWriter,
        scenario: &'a Scenario,
    ) -> Result<(), TranspileError> {
        let title = ts_string(scenario.name.inner());
        let fixtures = destructured_fixtures(&scenario.statements);
        if scenario.tags.is_empty() {
            w.open(format!("test({title}, async ({fixtures}) => {{"));
        } else {
            w.open(format!(
                "test({title}, {}, async ({fixtures}) => {{",
                tag_option(&scenario.tags)
            ));
        }
        self.emit_test_body(w, &scenario.statements)?;
        w.close("});");
        Ok(())
    }

    /// Emit page-object bindings for every page the body references,
    /// then the lowered statements.
    fn emit_test_body(
        &self,
        w: &mut CodeWriter,
        statements: &'a [Statement],
    ) -> Result<(), TranspileError> {
        let mut refs = References::default();
        self.scan_statements(statements, &mut refs);

        let bound: Vec<&Page> = self.pages_in_order(&refs.pages).collect();
        for page in &bound {
            w.line(format!(
                "let {} = new {}(page);",
                binding_name(page.name.inner()),
                class_name(page.name.inner())
            ));
        }

        let mut state = EmitState {
            bound,
            loop_depth: 0,
        };
        self.emit_statements(w, statements, Frame::Test, &mut state)
    }

    // ------------------------------------------------------------------
    // Classes and fixtures
    // ------------------------------------------------------------------

    fn emit_fixture(&self, w: &mut CodeWriter, fixture: &'a Fixture) {
        w.open(format!("const {} = {{", fixture.name.inner()));
        for field in &fixture.fields {
            w.line(format!(
                "{}: {},",
                field.name.inner(),
                self.expression(&field.value, Frame::Test)
            ));
        }
        w.close("} as const;");
    }

    fn emit_page_class(&self, w: &mut CodeWriter, page: &'a Page) -> Result<(), TranspileError> {
        w.open(format!("class {} {{", class_name(page.name.inner())));
        w.line("readonly page: Page;");
        for field in &page.fields {
            w.line(format!("readonly {}: Locator;", field.name.inner()));
        }
        for variable in &page.variables {
            w.line(format!(
                "readonly {}: {};",
                variable.name.inner(),
                ts_type(variable.kind)
            ));
        }

        w.blank();
        w.open("constructor(page: Page) {");
        w.line("this.page = page;");
        for field in &page.fields {
            w.line(format!(
                "this.{} = {};",
                field.name.inner(),
                locator_expr("page", &field.selector)
            ));
        }
        for variable in &page.variables {
            w.line(format!(
                "this.{} = {};",
                variable.name.inner(),
                self.expression(&variable.value, Frame::Initializer { page })
            ));
        }
        w.close("}");

        for action in &page.actions {
            w.blank();
            self.emit_method(w, action, Frame::Method { own: Some(page) })?;
        }
        w.close("}");
        Ok(())
    }

    fn emit_bundle_class(
        &self,
        w: &mut CodeWriter,
        bundle: &'a PageActions,
    ) -> Result<(), TranspileError> {
        w.open(format!("class {} {{", class_name(bundle.name.inner())));
        w.line("readonly page: Page;");
        w.blank();
        w.open("constructor(page: Page) {");
        w.line("this.page = page;");
        w.close("}");
        for action in &bundle.actions {
            w.blank();
            self.emit_method(w, action, Frame::Method { own: None })?;
        }
        w.close("}");
        Ok(())
    }

    fn emit_method(
        &self,
        w: &mut CodeWriter,
        action: &'a ActionDef,
        frame: Frame<'a>,
    ) -> Result<(), TranspileError> {
        let params = action
            .params
            .iter()
            .map(|param| format!("{}: any", param.inner()))
            .collect::<Vec<_>>()
            .join(", ");
        w.open(format!("async {}({params}) {{", action.name.inner()));
        let mut state = EmitState {
            bound: Vec::new(),
            loop_depth: 0,
        };
        self.emit_statements(w, &action.body, frame, &mut state)?;
        w.close("}");
        Ok(())
    }

    // ------------------------------------------------------------------
    // Statements
    // ------------------------------------------------------------------

    fn emit_statements(
        &self,
        w: &mut CodeWriter,
        statements: &'a [Statement],
        frame: Frame<'a>,
        state: &mut EmitState<'a>,
    ) -> Result<(), TranspileError> {
        for statement in statements {
            self.emit_statement(w, statement, frame, state)?;
        }
        Ok(())
    }

    fn emit_statement(
        &self,
        w: &mut CodeWriter,
        statement: &'a Statement,
        frame: Frame<'a>,
        state: &mut EmitState<'a>,
    ) -> Result<(), TranspileError> {
        let handle = page_handle(frame);
        match &statement.kind {
            StatementKind::Open { url, new_tab: false } => {
                w.line(format!("await {handle}.goto({});", ts_string(url.inner())));
            }
            StatementKind::Open { url, new_tab: true } => {
                self.emit_goto_new_tab(w, url.inner(), state);
            }
            StatementKind::SwitchToNewTab { url: Some(url) } => {
                self.emit_goto_new_tab(w, url.inner(), state);
            }
            StatementKind::SwitchToNewTab { url: None } => {
                self.emit_await_new_tab(w, state);
            }
            StatementKind::SwitchToTab { index } => {
                let value = *index.inner();
                if value.fract() != 0.0 || value < 1.0 {
                    return Err(TranspileError::InvalidTabIndex {
                        value,
                        span: index.span(),
                    });
                }
                self.emit_switch_to_tab(w, value as u64, state);
            }
            StatementKind::CloseTab => {
                self.emit_close_tab(w, state);
            }
            StatementKind::Click { target } => {
                w.line(format!("await {}.click();", self.target_expr(target, frame)));
            }
            StatementKind::Check { target } => {
                w.line(format!("await {}.check();", self.target_expr(target, frame)));
            }
            StatementKind::Uncheck { target } => {
                w.line(format!("await {}.uncheck();", self.target_expr(target, frame)));
            }
            StatementKind::Hover { target } => {
                w.line(format!("await {}.hover();", self.target_expr(target, frame)));
            }
            StatementKind::Clear { target } => {
                w.line(format!("await {}.clear();", self.target_expr(target, frame)));
            }
            StatementKind::Scroll { direction } => match direction {
                ScrollDirection::Up => {
                    w.line(format!("await {handle}.mouse.wheel(0, -600);"));
                }
                ScrollDirection::Down => {
                    w.line(format!("await {handle}.mouse.wheel(0, 600);"));
                }
                ScrollDirection::To(target) => {
                    w.line(format!(
                        "await {}.scrollIntoViewIfNeeded();",
                        self.target_expr(target, frame)
                    ));
                }
            },
            StatementKind::Fill { target, value } => {
                w.line(format!(
                    "await {}.fill({});",
                    self.target_expr(target, frame),
                    self.expression(value, frame)
                ));
            }
            StatementKind::Select { value, target } => {
                w.line(format!(
                    "await {}.selectOption({});",
                    self.target_expr(target, frame),
                    self.expression(value, frame)
                ));
            }
            StatementKind::Press { key } => {
                w.line(format!(
                    "await {handle}.keyboard.press({});",
                    ts_string(key.inner())
                ));
            }
            StatementKind::WaitSeconds { seconds } => {
                let millis = (seconds.inner() * 1000.0).round();
                w.line(format!("await {handle}.waitForTimeout({});", ts_number(millis)));
            }
            StatementKind::WaitFor { target } => {
                w.line(format!(
                    "await {}.waitFor({{ state: 'visible' }});",
                    self.target_expr(target, frame)
                ));
            }
            StatementKind::DoPerform { call } => {
                self.emit_call(w, call, frame);
            }
            StatementKind::Refresh => {
                w.line(format!("await {handle}.reload();"));
            }
            StatementKind::Screenshot { name } => match name {
                Some(name) => {
                    let path = if name.inner().ends_with(".png") {
                        name.inner().clone()
                    } else {
                        format!("{}.png", name.inner())
                    };
                    w.line(format!(
                        "await {handle}.screenshot({{ path: {} }});",
                        ts_string(&path)
                    ));
                }
                None => {
                    w.line(format!("await {handle}.screenshot();"));
                }
            },
            StatementKind::Log { message } => {
                w.line(format!("console.log({});", self.expression(message, frame)));
            }
            StatementKind::Verify { condition } => {
                w.line(self.assertion(condition, frame));
            }
            StatementKind::If {
                condition,
                then_branch,
                else_branch,
            } => {
                w.open(format!("if ({}) {{", self.runtime_condition(condition, frame)));
                self.emit_statements(w, then_branch, frame, state)?;
                if let Some(branch) = else_branch {
                    w.chain("} else {");
                    self.emit_statements(w, branch, frame, state)?;
                }
                w.close("}");
            }
            StatementKind::Repeat { count, body } => {
                state.loop_depth += 1;
                let counter = if state.loop_depth == 1 {
                    "i".to_string()
                } else {
                    format!("i{}", state.loop_depth)
                };
                w.open(format!(
                    "for (let {counter} = 0; {counter} < {}; {counter}++) {{",
                    count.inner()
                ));
                self.emit_statements(w, body, frame, state)?;
                w.close("}");
                state.loop_depth -= 1;
            }
            StatementKind::Return => {
                w.line("return;");
            }
            StatementKind::VarDecl(declaration) => {
                w.line(format!(
                    "let {} = {};",
                    declaration.name.inner(),
                    self.expression(&declaration.value, frame)
                ));
            }
        }
        Ok(())
    }

    fn emit_call(&self, w: &mut CodeWriter, call: &'a ActionCall, frame: Frame<'a>) {
        let owner = call.page.inner().as_str();
        let action = call.action.inner();
        let args = call
            .arguments
            .iter()
            .map(|argument| self.expression(argument, frame))
            .collect::<Vec<_>>()
            .join(", ");

        let line = match self.symbols.action_container(owner) {
            Some(ActionContainer::Page(page)) => match frame {
                Frame::Method { own: Some(own) } if own.name.inner() == page.name.inner() => {
                    format!("await this.{action}({args});")
                }
                Frame::Method { .. } | Frame::Initializer { .. } => format!(
                    "await new {}(this.page).{action}({args});",
                    class_name(page.name.inner())
                ),
                Frame::Test => format!(
                    "await {}.{action}({args});",
                    binding_name(page.name.inner())
                ),
            },
            Some(ActionContainer::Bundle(bundle)) => format!(
                "await new {}({}).{action}({args});",
                class_name(bundle.name.inner()),
                page_handle(frame)
            ),
            // Unreachable on a validated AST.
            None => format!("await {owner}.{action}({args});"),
        };
        w.line(line);
    }

    // ------------------------------------------------------------------
    // Tab-operation synthesis
    // ------------------------------------------------------------------

    /// Deterministic new-tab open: create, navigate, switch.
    fn emit_goto_new_tab(&self, w: &mut CodeWriter, url: &str, state: &EmitState<'a>) {
        w.open("{");
        w.line("const newTab = await context.newPage();");
        w.line(format!("await newTab.goto({});", ts_string(url)));
        w.line("page = newTab;");
        w.line("await page.bringToFront();");
        w.line("await page.waitForLoadState('domcontentloaded');");
        w.close("}");
        self.emit_rebinds(w, state);
    }

    /// Race an opener scan against a page event, bounded by the
    /// configured timeout. The scan covers a popup that opened before
    /// this statement ran; the event wait covers one that has not
    /// appeared yet.
    fn emit_await_new_tab(&self, w: &mut CodeWriter, state: &EmitState<'a>) {
        let timeout = self.config.new_tab_timeout_ms();
        w.open("{");
        w.open("const scanForPopup = async (): Promise<Page> => {");
        w.open("for (const candidate of context.pages()) {");
        w.open("if (candidate !== page && (await candidate.opener()) === page) {");
        w.line("return candidate;");
        w.close("}");
        w.close("}");
        w.line("return new Promise<Page>(() => {});");
        w.close("};");
        w.open("const newTab = await Promise.race([");
        w.line("scanForPopup(),");
        w.line(format!(
            "context.waitForEvent('page', {{ predicate: (p) => p !== page, timeout: {timeout} }}),"
        ));
        w.open("]).catch(() => {");
        w.line(format!(
            "throw new Error('switch to new tab: no new tab appeared within {timeout} ms');"
        ));
        w.close("});");
        w.line("page = newTab;");
        w.line("await page.bringToFront();");
        w.line("await page.waitForLoadState('domcontentloaded');");
        w.close("}");
        self.emit_rebinds(w, state);
    }

    /// Poll until the context has at least `index` tabs, then switch to
    /// the 1-based `index`.
    fn emit_switch_to_tab(&self, w: &mut CodeWriter, index: u64, state: &EmitState<'a>) {
        let timeout = self.config.new_tab_timeout_ms();
        let poll = self.config.tab_poll_interval_ms();
        w.open("{");
        w.line(format!("const deadline = Date.now() + {timeout};"));
        w.open(format!(
            "while (context.pages().length < {index} && Date.now() < deadline) {{"
        ));
        w.line(format!("await page.waitForTimeout({poll});"));
        w.close("}");
        w.line("const tabs = context.pages();");
        w.open(format!("if (tabs.length < {index}) {{"));
        w.line(format!(
            "throw new Error(`switch to tab: requested tab {index} but only ${{tabs.length}} open`);"
        ));
        w.close("}");
        w.line(format!("page = tabs[{}];", index - 1));
        w.line("await page.bringToFront();");
        w.close("}");
        self.emit_rebinds(w, state);
    }

    /// Close the current tab and fall back to the tab now occupying the
    /// closed position, or the new last tab when the closed one was
    /// last.
    fn emit_close_tab(&self, w: &mut CodeWriter, state: &EmitState<'a>) {
        w.open("{");
        w.line("const closingIndex = context.pages().indexOf(page);");
        w.line("await page.close();");
        w.line("const remaining = context.pages();");
        w.open("if (remaining.length === 0) {");
        w.line("throw new Error('close tab: no tabs remain open');");
        w.close("}");
        w.line(
            "page = remaining[closingIndex >= remaining.length ? remaining.length - 1 : closingIndex];",
        );
        w.line("await page.bringToFront();");
        w.close("}");
        self.emit_rebinds(w, state);
    }

    /// Re-instantiate every page object bound in this body against the
    /// new active page.
    fn emit_rebinds(&self, w: &mut CodeWriter, state: &EmitState<'a>) {
        for page in &state.bound {
            w.line(format!(
                "{} = new {}(page);",
                binding_name(page.name.inner()),
                class_name(page.name.inner())
            ));
        }
    }

    // ------------------------------------------------------------------
    // Conditions and expressions
    // ------------------------------------------------------------------

    fn assertion(&self, condition: &'a Condition, frame: Frame<'a>) -> String {
        let not = if condition.negated { ".not" } else { "" };
        match (self.lower_subject(&condition.subject, frame), &condition.check) {
            (Lowered::Locator(locator), Check::Visible) => {
                format!("await expect({locator}){not}.toBeVisible();")
            }
            (Lowered::Locator(locator), Check::Contains(expected)) => {
                format!(
                    "await expect({locator}){not}.toContainText({});",
                    self.expression(expected, frame)
                )
            }
            (Lowered::Locator(locator), Check::Equals(expected)) => {
                format!(
                    "await expect({locator}){not}.toHaveText({});",
                    self.expression(expected, frame)
                )
            }
            // Checking a plain value for visibility asserts its text is
            // somewhere on the page.
            (Lowered::Value(value), Check::Visible) => {
                format!(
                    "await expect({}.getByText({value})){not}.toBeVisible();",
                    page_handle(frame)
                )
            }
            (Lowered::Value(value), Check::Contains(expected)) => {
                format!(
                    "expect({value}){not}.toContain({});",
                    self.expression(expected, frame)
                )
            }
            (Lowered::Value(value), Check::Equals(expected)) => {
                format!(
                    "expect({value}){not}.toBe({});",
                    self.expression(expected, frame)
                )
            }
        }
    }

    /// Lower a condition to a boolean expression for an `if` branch.
    fn runtime_condition(&self, condition: &'a Condition, frame: Frame<'a>) -> String {
        let inner = match (self.lower_subject(&condition.subject, frame), &condition.check) {
            (Lowered::Locator(locator), Check::Visible) => {
                format!("await {locator}.isVisible()")
            }
            (Lowered::Locator(locator), Check::Contains(expected)) => {
                format!(
                    "((await {locator}.textContent()) ?? '').includes({})",
                    self.expression(expected, frame)
                )
            }
            (Lowered::Locator(locator), Check::Equals(expected)) => {
                format!(
                    "((await {locator}.textContent()) ?? '') === {}",
                    self.expression(expected, frame)
                )
            }
            (Lowered::Value(value), Check::Visible) => {
                format!(
                    "await {}.getByText({value}).isVisible()",
                    page_handle(frame)
                )
            }
            (Lowered::Value(value), Check::Contains(expected)) => {
                format!(
                    "String({value}).includes(String({}))",
                    self.expression(expected, frame)
                )
            }
            (Lowered::Value(value), Check::Equals(expected)) => {
                format!("{value} === {}", self.expression(expected, frame))
            }
        };
        if condition.negated {
            format!("!({inner})")
        } else {
            inner
        }
    }

    fn lower_subject(&self, subject: &'a Subject, frame: Frame<'a>) -> Lowered {
        match subject {
            Subject::Value(expression) => Lowered::Value(self.expression(expression, frame)),
            Subject::Target(target) => {
                let owner = target.page.inner().as_str();
                if self.symbols.page(owner).is_some() {
                    Lowered::Locator(self.target_expr(target, frame))
                } else {
                    // A fixture member used as subject.
                    Lowered::Value(format!("{owner}.{}", target.field.inner()))
                }
            }
        }
    }

    fn target_expr(&self, target: &Target, frame: Frame<'a>) -> String {
        let owner = target.page.inner().as_str();
        let field = target.field.inner();
        match frame {
            Frame::Test => format!("{}.{field}", binding_name(owner)),
            Frame::Method { own: Some(own) } if own.name.inner() == owner => {
                format!("this.{field}")
            }
            Frame::Method { .. } | Frame::Initializer { .. } => {
                format!("new {}(this.page).{field}", class_name(owner))
            }
        }
    }

    fn expression(&self, expression: &Expression, frame: Frame<'a>) -> String {
        match &expression.kind {
            ExpressionKind::String(value) => ts_string(value),
            ExpressionKind::Number(value) => ts_number(*value),
            ExpressionKind::Bool(value) => value.to_string(),
            ExpressionKind::List(items) => {
                let rendered = items
                    .iter()
                    .map(|item| self.expression(item, frame))
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("[{rendered}]")
            }
            ExpressionKind::Ident(name) => match frame {
                Frame::Initializer { page }
                    if page.variables.iter().any(|v| v.name.inner() == name) =>
                {
                    format!("this.{name}")
                }
                _ => name.clone(),
            },
            ExpressionKind::FixtureRef { fixture, key } => {
                if self.symbols.fixture(fixture).is_some() {
                    return format!("{fixture}.{key}");
                }
                // A page variable accessed as `Page.name`.
                match frame {
                    Frame::Test => format!("{}.{key}", binding_name(fixture)),
                    Frame::Method { own: Some(own) } if own.name.inner() == fixture => {
                        format!("this.{key}")
                    }
                    Frame::Initializer { page } if page.name.inner() == fixture => {
                        format!("this.{key}")
                    }
                    Frame::Method { .. } | Frame::Initializer { .. } => {
                        format!("new {}(this.page).{key}", class_name(fixture))
                    }
                }
            }
        }
    }

    // ------------------------------------------------------------------
    // Reference collection
    // ------------------------------------------------------------------

    /// Everything a feature's generated file must contain: pages and
    /// bundles referenced from its bodies, closed transitively over
    /// their action bodies, plus referenced fixtures.
    fn collect_feature_refs(&self, feature: &'a Feature) -> References<'a> {
        let mut refs = References::default();
        for hook in &feature.hooks {
            self.scan_statements(&hook.body, &mut refs);
        }
        for scenario in &feature.scenarios {
            self.scan_statements(&scenario.statements, &mut refs);
        }

        let mut page_cursor = 0;
        let mut bundle_cursor = 0;
        while page_cursor < refs.pages.len() || bundle_cursor < refs.bundles.len() {
            while page_cursor < refs.pages.len() {
                let name = refs.pages[page_cursor];
                page_cursor += 1;
                if let Some(page) = self.symbols.page(name) {
                    for variable in &page.variables {
                        self.scan_expression(&variable.value, &mut refs);
                    }
                    for action in &page.actions {
                        self.scan_statements(&action.body, &mut refs);
                    }
                }
            }
            while bundle_cursor < refs.bundles.len() {
                let name = refs.bundles[bundle_cursor];
                bundle_cursor += 1;
                if let Some(bundle) = self.symbols.bundle(name) {
                    for action in &bundle.actions {
                        self.scan_statements(&action.body, &mut refs);
                    }
                }
            }
        }
        refs
    }

    fn scan_statements(&self, statements: &'a [Statement], refs: &mut References<'a>) {
        for statement in statements {
            match &statement.kind {
                StatementKind::Click { target }
                | StatementKind::Check { target }
                | StatementKind::Uncheck { target }
                | StatementKind::Hover { target }
                | StatementKind::Clear { target }
                | StatementKind::WaitFor { target } => self.scan_target(target, refs),
                StatementKind::Scroll { direction } => {
                    if let ScrollDirection::To(target) = direction {
                        self.scan_target(target, refs);
                    }
                }
                StatementKind::Fill { target, value } => {
                    self.scan_target(target, refs);
                    self.scan_expression(value, refs);
                }
                StatementKind::Select { value, target } => {
                    self.scan_expression(value, refs);
                    self.scan_target(target, refs);
                }
                StatementKind::DoPerform { call } => {
                    match self.symbols.action_container(call.page.inner()) {
                        Some(ActionContainer::Page(page)) => {
                            refs.pages.insert(page.name.inner().as_str());
                        }
                        Some(ActionContainer::Bundle(bundle)) => {
                            refs.bundles.insert(bundle.name.inner().as_str());
                        }
                        None => {}
                    }
                    for argument in &call.arguments {
                        self.scan_expression(argument, refs);
                    }
                }
                StatementKind::Log { message } => self.scan_expression(message, refs),
                StatementKind::Verify { condition } => self.scan_condition(condition, refs),
                StatementKind::If {
                    condition,
                    then_branch,
                    else_branch,
                } => {
                    self.scan_condition(condition, refs);
                    self.scan_statements(then_branch, refs);
                    if let Some(branch) = else_branch {
                        self.scan_statements(branch, refs);
                    }
                }
                StatementKind::Repeat { body, .. } => self.scan_statements(body, refs),
                StatementKind::VarDecl(declaration) => {
                    self.scan_expression(&declaration.value, refs);
                }
                StatementKind::Open { .. }
                | StatementKind::Press { .. }
                | StatementKind::WaitSeconds { .. }
                | StatementKind::Refresh
                | StatementKind::Screenshot { .. }
                | StatementKind::Return
                | StatementKind::SwitchToNewTab { .. }
                | StatementKind::SwitchToTab { .. }
                | StatementKind::CloseTab => {}
            }
        }
    }

    fn scan_condition(&self, condition: &'a Condition, refs: &mut References<'a>) {
        match &condition.subject {
            Subject::Target(target) => self.scan_target(target, refs),
            Subject::Value(expression) => self.scan_expression(expression, refs),
        }
        match &condition.check {
            Check::Visible => {}
            Check::Contains(expression) | Check::Equals(expression) => {
                self.scan_expression(expression, refs);
            }
        }
    }

    fn scan_target(&self, target: &'a Target, refs: &mut References<'a>) {
        let owner = target.page.inner().as_str();
        if self.symbols.page(owner).is_some() {
            refs.pages.insert(owner);
        } else if self.symbols.fixture(owner).is_some() {
            refs.fixtures.insert(owner);
        }
    }

    fn scan_expression(&self, expression: &'a Expression, refs: &mut References<'a>) {
        match &expression.kind {
            ExpressionKind::String(_) | ExpressionKind::Number(_) | ExpressionKind::Bool(_) => {}
            ExpressionKind::List(items) => {
                for item in items {
                    self.scan_expression(item, refs);
                }
            }
            ExpressionKind::Ident(name) => {
                if self.symbols.fixture(name).is_some() {
                    refs.fixtures.insert(name.as_str());
                }
            }
            ExpressionKind::FixtureRef { fixture, key: _ } => {
                if self.symbols.fixture(fixture).is_some() {
                    refs.fixtures.insert(fixture.as_str());
                } else if self.symbols.page(fixture).is_some() {
                    refs.pages.insert(fixture.as_str());
                }
            }
        }
    }

    fn pages_in_order<'n>(
        &self,
        names: &'n IndexSet<&'a str>,
    ) -> impl Iterator<Item = &'a Page> + 'n
    where
        'a: 'n,
    {
        let pages = self.program.pages.iter();
        pages.filter(move |page| names.contains(page.name.inner().as_str()))
    }

    fn bundles_in_order<'n>(
        &self,
        names: &'n IndexSet<&'a str>,
    ) -> impl Iterator<Item = &'a PageActions> + 'n
    where
        'a: 'n,
    {
        let bundles = self.program.page_actions.iter();
        bundles.filter(move |bundle| names.contains(bundle.name.inner().as_str()))
    }

    fn fixtures_in_order<'n>(
        &self,
        names: &'n IndexSet<&'a str>,
    ) -> impl Iterator<Item = &'a Fixture> + 'n
    where
        'a: 'n,
    {
        let fixtures = self.program.fixtures.iter();
        fixtures.filter(move |fixture| names.contains(fixture.name.inner().as_str()))
    }
}

/// Destructured Playwright fixtures for a test or each-hook callback.
/// The browser context is requested only when the body performs tab
/// operations.
fn destructured_fixtures(statements: &[Statement]) -> &'static str {
    if body_has_tab_ops(statements) {
        "{ page, context }"
    } else {
        "{ page }"
    }
}

fn body_has_tab_ops(statements: &[Statement]) -> bool {
    statements.iter().any(|statement| {
        statement.kind.changes_tab_context()
            || match &statement.kind {
                StatementKind::If {
                    then_branch,
                    else_branch,
                    ..
                } => {
                    body_has_tab_ops(then_branch)
                        || else_branch.as_deref().is_some_and(body_has_tab_ops)
                }
                StatementKind::Repeat { body, .. } => body_has_tab_ops(body),
                _ => false,
            }
    })
}

/// A bare `switch to new tab` annotates its popup scan with the `Page`
/// type, so the type import is needed even without page classes. Tab
/// operations cannot occur inside action bodies, so hooks and scenarios
/// are the only places to look.
fn feature_awaits_popup(feature: &Feature) -> bool {
    feature
        .hooks
        .iter()
        .map(|hook| hook.body.as_slice())
        .chain(feature.scenarios.iter().map(|s| s.statements.as_slice()))
        .any(body_awaits_popup)
}

fn body_awaits_popup(statements: &[Statement]) -> bool {
    statements.iter().any(|statement| match &statement.kind {
        StatementKind::SwitchToNewTab { url: None } => true,
        StatementKind::If {
            then_branch,
            else_branch,
            ..
        } => {
            body_awaits_popup(then_branch)
                || else_branch.as_deref().is_some_and(body_awaits_popup)
        }
        StatementKind::Repeat { body, .. } => body_awaits_popup(body),
        _ => false,
    })
}

fn page_handle(frame: Frame<'_>) -> &'static str {
    match frame {
        Frame::Test => "page",
        Frame::Method { .. } | Frame::Initializer { .. } => "this.page",
    }
}

fn tag_option(tags: &[vero_core::Spanned<String>]) -> String {
    let rendered = tags
        .iter()
        .map(|tag| ts_string(&format!("@{}", tag.inner())))
        .collect::<Vec<_>>()
        .join(", ");
    format!("{{ tag: [{rendered}] }}")
}

fn ts_type(kind: VarKind) -> &'static str {
    match kind {
        VarKind::Text => "string",
        VarKind::Number => "number",
        VarKind::Flag => "boolean",
        VarKind::List => "any[]",
    }
}

/// Map a selector to a locator chain on `handle`.
fn locator_expr(handle: &str, selector: &Selector) -> String {
    let value = selector.value.inner();
    match selector.kind {
        SelectorKind::TestId => format!("{handle}.getByTestId({})", ts_string(value)),
        SelectorKind::Css => format!("{handle}.locator({})", ts_string(value)),
        SelectorKind::XPath => {
            format!("{handle}.locator({})", ts_string(&format!("xpath={value}")))
        }
        SelectorKind::Auto => {
            if let Some(test_id) = extract_data_testid(value) {
                format!("{handle}.getByTestId({})", ts_string(test_id))
            } else if value.starts_with("//") {
                format!("{handle}.locator({})", ts_string(&format!("xpath={value}")))
            } else if value.starts_with('#') || value.starts_with('.') || value.starts_with('[') {
                format!("{handle}.locator({})", ts_string(value))
            } else {
                format!("{handle}.getByText({})", ts_string(value))
            }
        }
    }
}

/// Pull the id out of a `[data-testid=...]` attribute selector so it can
/// use the first-class Playwright lookup.
fn extract_data_testid(value: &str) -> Option<&str> {
    let inner = value
        .strip_prefix("[data-testid=")?
        .strip_suffix(']')?;
    Some(inner.trim_matches(|c| c == '"' || c == '\''))
}

/// Class name for a page or bundle: the declared name with the first
/// letter uppercased.
fn class_name(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Binding name for a page object: the declared name with the first
/// letter lowercased, adjusted if that would collide with the class
/// name.
fn binding_name(name: &str) -> String {
    let mut chars = name.chars();
    let lowered: String = match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    };
    if lowered == class_name(name) {
        format!("{lowered}Object")
    } else {
        lowered
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate::validate;

    fn transpile_source(source: &str) -> Result<TranspileOutput, TranspileError> {
        let program = vero_parser::parse(source).expect("program should parse");
        let validation = validate(&program);
        assert!(
            validation.is_valid(),
            "diagnostics: {:?}",
            validation.result().diagnostics()
        );
        transpile(&program, validation.symbols(), &TranspileConfig::default())
    }

    fn generated(source: &str, feature: &str) -> String {
        let output = transpile_source(source).expect("transpile should succeed");
        output.get(feature).expect("feature should exist").to_string()
    }

    const TABS_PAGE: &str = r##"
        page HomePage {
            field launch = "#launch"
            field banner = "#banner"
        }
    "##;

    #[test]
    fn test_one_file_per_feature_with_exact_titles() {
        let output = transpile_source(
            r##"
            feature First {
                scenario "does one thing" {
                    log "one"
                }
            }
            feature Second {
                scenario "does another" {
                    log "two"
                }
            }
            "##,
        )
        .unwrap();

        assert_eq!(output.tests().len(), 2);
        let first = output.get("First").unwrap();
        assert!(first.contains("test.describe('First', () => {"));
        assert!(first.contains("test('does one thing', async ({ page }) => {"));
        assert!(!first.contains("does another"));
    }

    #[test]
    fn test_page_class_emission() {
        let code = generated(
            r##"
            page LoginPage {
                field username = testid "user"
                field password = css ".pw"
                field hint = xpath "//span[1]"
                field note = "some text"
                action login with user, pass {
                    fill LoginPage.username with user
                    fill LoginPage.password with pass
                }
            }
            feature Login {
                scenario "logs in" {
                    do LoginPage.login with "alice", "secret"
                }
            }
            "##,
            "Login",
        );

        assert!(code.contains("class LoginPage {"));
        assert!(code.contains("readonly username: Locator;"));
        assert!(code.contains("this.username = page.getByTestId('user');"));
        assert!(code.contains("this.password = page.locator('.pw');"));
        assert!(code.contains("this.hint = page.locator('xpath=//span[1]');"));
        assert!(code.contains("this.note = page.getByText('some text');"));
        assert!(code.contains("async login(user: any, pass: any) {"));
        assert!(code.contains("await this.username.fill(user);"));
        assert!(code.contains("let loginPage = new LoginPage(page);"));
        assert!(code.contains("await loginPage.login('alice', 'secret');"));
    }

    #[test]
    fn test_auto_selector_inference() {
        let code = generated(
            r##"
            page MixedPage {
                field byTestId = "[data-testid=submit-button]"
                field byCss = "#main .item"
                field byXpath = "//div[@id='x']"
                field byText = "Sign in"
            }
            feature Selectors {
                scenario "touches all" {
                    click MixedPage.byTestId
                    click MixedPage.byCss
                    click MixedPage.byXpath
                    click MixedPage.byText
                }
            }
            "##,
            "Selectors",
        );

        assert!(code.contains("page.getByTestId('submit-button')"));
        assert!(code.contains("page.locator('#main .item')"));
        assert!(code.contains("page.locator('xpath=//div[@id=\\'x\\']')"));
        assert!(code.contains("page.getByText('Sign in')"));
    }

    #[test]
    fn test_switch_to_new_tab_races_scan_against_event() {
        let code = generated(
            &format!(
                "{TABS_PAGE}
                feature Tabs {{
                    scenario \"opens popup\" {{
                        click HomePage.launch
                        switch to new tab
                        verify HomePage.banner is visible
                    }}
                }}"
            ),
            "Tabs",
        );

        assert!(code.contains("async ({ page, context }) => {"));
        assert!(code.contains("Promise.race(["));
        assert!(code.contains("scanForPopup(),"));
        assert!(code.contains("(await candidate.opener()) === page"));
        assert!(code.contains(
            "context.waitForEvent('page', { predicate: (p) => p !== page, timeout: 5000 })"
        ));
        assert!(code.contains("no new tab appeared within 5000 ms"));
        assert!(code.contains("await page.bringToFront();"));
        assert!(code.contains("await page.waitForLoadState('domcontentloaded');"));
        // Initial binding plus one rebind after the switch.
        assert_eq!(code.matches("new HomePage(page)").count(), 2);
    }

    #[test]
    fn test_switch_to_new_tab_with_url_is_deterministic() {
        let code = generated(
            &format!(
                "{TABS_PAGE}
                feature Tabs {{
                    scenario \"opens directly\" {{
                        switch to new tab \"https://example.com/next\"
                    }}
                }}"
            ),
            "Tabs",
        );

        assert!(code.contains("const newTab = await context.newPage();"));
        assert!(code.contains("await newTab.goto('https://example.com/next');"));
        assert!(!code.contains("Promise.race"));
        assert!(!code.contains("waitForEvent"));
    }

    #[test]
    fn test_switch_to_tab_polls_until_available() {
        let code = generated(
            &format!(
                "{TABS_PAGE}
                feature Tabs {{
                    scenario \"second tab\" {{
                        click HomePage.launch
                        switch to tab 2
                    }}
                }}"
            ),
            "Tabs",
        );

        assert!(code.contains("while (context.pages().length < 2 && Date.now() < deadline) {"));
        assert!(code.contains("await page.waitForTimeout(150);"));
        assert!(code.contains("requested tab 2 but only ${tabs.length} open"));
        assert!(code.contains("page = tabs[1];"));
        assert!(code.contains("await page.bringToFront();"));
        // Switching to an existing tab does not wait for a load state.
        assert!(!code.contains("waitForLoadState"));
        assert_eq!(code.matches("new HomePage(page)").count(), 2);
    }

    #[test]
    fn test_page_type_imported_for_popup_scan_without_page_classes() {
        let code = generated(
            r##"
            feature Tabs {
                scenario "pops" {
                    press "Enter"
                    switch to new tab
                }
            }
            "##,
            "Tabs",
        );

        assert!(code.contains("import type { Page } from '@playwright/test';"));
        assert!(!code.contains("Locator"));
    }

    #[test]
    fn test_switch_to_tab_rejects_non_positive_integers() {
        for index in ["0", "-1", "2.5"] {
            let source = format!(
                "feature Tabs {{
                    scenario \"bad index\" {{
                        switch to tab {index}
                    }}
                }}"
            );
            let program = vero_parser::parse(&source).expect("program should parse");
            let validation = validate(&program);
            assert!(validation.is_valid());
            let error =
                transpile(&program, validation.symbols(), &TranspileConfig::default()).unwrap_err();
            assert!(matches!(error, TranspileError::InvalidTabIndex { .. }));
            assert!(error.to_string().contains("positive integer"));
        }
    }

    #[test]
    fn test_close_tab_falls_back_by_position() {
        let code = generated(
            &format!(
                "{TABS_PAGE}
                feature Tabs {{
                    scenario \"closes\" {{
                        click HomePage.launch
                        close tab
                    }}
                }}"
            ),
            "Tabs",
        );

        assert!(code.contains("const closingIndex = context.pages().indexOf(page);"));
        assert!(code.contains("await page.close();"));
        assert!(code.contains("throw new Error('close tab: no tabs remain open');"));
        assert!(code.contains(
            "page = remaining[closingIndex >= remaining.length ? remaining.length - 1 : closingIndex];"
        ));
        assert_eq!(code.matches("new HomePage(page)").count(), 2);
    }

    #[test]
    fn test_open_in_new_tab_rebinds() {
        let code = generated(
            &format!(
                "{TABS_PAGE}
                feature Tabs {{
                    scenario \"opens\" {{
                        click HomePage.launch
                        open \"https://example.com\" in new tab
                        click HomePage.launch
                    }}
                }}"
            ),
            "Tabs",
        );

        assert!(code.contains("const newTab = await context.newPage();"));
        assert!(code.contains("await newTab.goto('https://example.com');"));
        assert_eq!(code.matches("new HomePage(page)").count(), 2);
    }

    #[test]
    fn test_verify_forms() {
        let code = generated(
            r##"
            page HomePage { field banner = "#banner" }
            fixture messages { welcome = "Hello" }
            feature Checks {
                scenario "asserts" {
                    verify HomePage.banner is visible
                    verify HomePage.banner is not visible
                    verify HomePage.banner is contains "Wel"
                    verify HomePage.banner is "Welcome"
                    verify "Signed in" is visible
                    verify messages.welcome is contains "He"
                    verify messages.welcome is "Hello"
                }
            }
            "##,
            "Checks",
        );

        assert!(code.contains("await expect(homePage.banner).toBeVisible();"));
        assert!(code.contains("await expect(homePage.banner).not.toBeVisible();"));
        assert!(code.contains("await expect(homePage.banner).toContainText('Wel');"));
        assert!(code.contains("await expect(homePage.banner).toHaveText('Welcome');"));
        assert!(code.contains("await expect(page.getByText('Signed in')).toBeVisible();"));
        assert!(code.contains("expect(messages.welcome).toContain('He');"));
        assert!(code.contains("expect(messages.welcome).toBe('Hello');"));
    }

    #[test]
    fn test_if_and_repeat_lowering() {
        let code = generated(
            r##"
            page HomePage { field banner = "#banner" }
            feature Flow {
                scenario "branches and loops" {
                    if HomePage.banner is visible {
                        repeat 3 times {
                            repeat 2 times {
                                click HomePage.banner
                            }
                        }
                    } else {
                        log "hidden"
                    }
                }
            }
            "##,
            "Flow",
        );

        assert!(code.contains("if (await homePage.banner.isVisible()) {"));
        assert!(code.contains("for (let i = 0; i < 3; i++) {"));
        assert!(code.contains("for (let i2 = 0; i2 < 2; i2++) {"));
        assert!(code.contains("} else {"));
        assert!(code.contains("console.log('hidden');"));
    }

    #[test]
    fn test_hooks_and_tags() {
        let code = generated(
            r##"
            page HomePage { field banner = "#banner" }
            @smoke
            feature Session {
                before all {
                    log "suite up"
                }
                before each {
                    open "https://example.com"
                }
                after all {
                    log "suite down"
                }
                scenario "first" @fast @critical {
                    click HomePage.banner
                }
            }
            "##,
            "Session",
        );

        assert!(code.contains("test.describe('Session', { tag: ['@smoke'] }, () => {"));
        assert!(code.contains("test.beforeAll(async ({ browser }) => {"));
        assert!(code.contains("const page = await browser.newPage();"));
        assert!(code.contains("await page.close();"));
        assert!(code.contains("test.beforeEach(async ({ page }) => {"));
        assert!(code.contains("await page.goto('https://example.com');"));
        assert!(code.contains("test.afterAll(async ({ browser }) => {"));
        assert!(code.contains("test('first', { tag: ['@fast', '@critical'] }, async ({ page }) => {"));
    }

    #[test]
    fn test_fixture_const_and_references() {
        let code = generated(
            r##"
            page LoginPage { field username = "#user" }
            fixture testUser {
                name = "alice"
                retries = 3
                active = true
            }
            feature Login {
                scenario "fills from fixture" {
                    fill LoginPage.username with testUser.name
                }
            }
            "##,
            "Login",
        );

        assert!(code.contains("const testUser = {"));
        assert!(code.contains("name: 'alice',"));
        assert!(code.contains("retries: 3,"));
        assert!(code.contains("active: true,"));
        assert!(code.contains("} as const;"));
        assert!(code.contains("await loginPage.username.fill(testUser.name);"));
    }

    #[test]
    fn test_bundle_class_reaches_through_its_page() {
        let code = generated(
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
            "Nav",
        );

        assert!(code.contains("class NavActions {"));
        assert!(code.contains("await new HomePage(this.page).launch.click();"));
        assert!(code.contains("await new NavActions(page).goHome();"));
        // The bundle's page class is pulled in transitively.
        assert!(code.contains("class HomePage {"));
    }

    #[test]
    fn test_page_variables_lower_to_typed_properties() {
        let code = generated(
            r##"
            page ConfigPage {
                field banner = "#banner"
                number timeout = 30
                text greeting = "hi"
            }
            feature Setup {
                scenario "reads" {
                    log ConfigPage.timeout
                    log ConfigPage.greeting
                }
            }
            "##,
            "Setup",
        );

        assert!(code.contains("readonly timeout: number;"));
        assert!(code.contains("readonly greeting: string;"));
        assert!(code.contains("this.timeout = 30;"));
        assert!(code.contains("this.greeting = 'hi';"));
        assert!(code.contains("console.log(configPage.timeout);"));
    }

    #[test]
    fn test_misc_statement_lowering() {
        let code = generated(
            r##"
            page FormPage {
                field agree = "#agree"
                field country = "#country"
            }
            feature Misc {
                scenario "covers the rest" {
                    check FormPage.agree
                    uncheck FormPage.agree
                    hover FormPage.country
                    clear FormPage.country
                    select "NZ" from FormPage.country
                    press "Enter"
                    wait 1.5 seconds
                    wait for FormPage.country
                    scroll down
                    scroll up
                    scroll to FormPage.agree
                    refresh
                    screenshot "final state"
                    text name = "vero"
                    log name
                    return
                }
            }
            "##,
            "Misc",
        );

        assert!(code.contains("await formPage.agree.check();"));
        assert!(code.contains("await formPage.agree.uncheck();"));
        assert!(code.contains("await formPage.country.hover();"));
        assert!(code.contains("await formPage.country.clear();"));
        assert!(code.contains("await formPage.country.selectOption('NZ');"));
        assert!(code.contains("await page.keyboard.press('Enter');"));
        assert!(code.contains("await page.waitForTimeout(1500);"));
        assert!(code.contains("await formPage.country.waitFor({ state: 'visible' });"));
        assert!(code.contains("await page.mouse.wheel(0, 600);"));
        assert!(code.contains("await page.mouse.wheel(0, -600);"));
        assert!(code.contains("await formPage.agree.scrollIntoViewIfNeeded();"));
        assert!(code.contains("await page.reload();"));
        assert!(code.contains("await page.screenshot({ path: 'final state.png' });"));
        assert!(code.contains("let name = 'vero';"));
        assert!(code.contains("console.log(name);"));
        assert!(code.contains("return;"));
    }

    #[test]
    fn test_timeouts_come_from_config() {
        let source = format!(
            "{TABS_PAGE}
            feature Tabs {{
                scenario \"waits\" {{
                    switch to new tab
                    switch to tab 2
                }}
            }}"
        );
        let program = vero_parser::parse(&source).unwrap();
        let validation = validate(&program);
        let config = TranspileConfig::new(1200, 50);
        let output = transpile(&program, validation.symbols(), &config).unwrap();
        let code = output.get("Tabs").unwrap();

        assert!(code.contains("timeout: 1200"));
        assert!(code.contains("no new tab appeared within 1200 ms"));
        assert!(code.contains("const deadline = Date.now() + 1200;"));
        assert!(code.contains("await page.waitForTimeout(50);"));
    }
}
