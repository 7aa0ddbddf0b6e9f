//! Symbol tables over a parsed program.
//!
//! [`SymbolTable::build`] walks the top-level declarations once, indexing
//! pages, page-action bundles, and fixtures by name and diagnosing
//! duplicate declarations. The table borrows the AST it was built from;
//! lookups hand out references without cloning, and iteration follows
//! declaration order.

use indexmap::IndexMap;
use log::debug;

use vero_core::{
    Span,
    ast::{ActionDef, Fixture, Page, PageActions, Program},
};
use vero_parser::error::{Diagnostic, ErrorCode};

/// Name-indexed views of a program's declarations.
pub struct SymbolTable<'a> {
    pages: IndexMap<&'a str, &'a Page>,
    bundles: IndexMap<&'a str, &'a PageActions>,
    fixtures: IndexMap<&'a str, &'a Fixture>,
}

/// A declaration that owns actions: a page (inline actions) or a
/// page-actions bundle.
#[derive(Clone, Copy)]
pub enum ActionContainer<'a> {
    Page(&'a Page),
    Bundle(&'a PageActions),
}

impl<'a> ActionContainer<'a> {
    /// All actions declared in this container, in declaration order.
    pub fn actions(&self) -> &'a [ActionDef] {
        match self {
            ActionContainer::Page(page) => &page.actions,
            ActionContainer::Bundle(bundle) => &bundle.actions,
        }
    }

    /// Find an action by exact name.
    pub fn find(&self, name: &str) -> Option<&'a ActionDef> {
        self.actions()
            .iter()
            .find(|action| action.name.inner() == name)
    }

    /// Phrase used in diagnostics, e.g. ``page `LoginPage` ``.
    pub fn describe(&self) -> String {
        match self {
            ActionContainer::Page(page) => format!("page `{}`", page.name.inner()),
            ActionContainer::Bundle(bundle) => {
                format!("pageactions `{}`", bundle.name.inner())
            }
        }
    }
}

impl<'a> SymbolTable<'a> {
    /// Index all top-level declarations, collecting one diagnostic per
    /// duplicate name. The first declaration of a name wins; later ones
    /// are diagnosed and ignored.
    pub fn build(program: &'a Program) -> (Self, Vec<Diagnostic>) {
        let mut diagnostics = Vec::new();

        let mut pages: IndexMap<&str, &Page> = IndexMap::new();
        for page in &program.pages {
            let name = page.name.inner().as_str();
            if let Some(first) = pages.get(name) {
                diagnostics.push(duplicate(
                    ErrorCode::DuplicatePage,
                    format!("page `{name}` is defined multiple times"),
                    page.name.span(),
                    first.name.span(),
                ));
            } else {
                pages.insert(name, page);
                check_fields(page, &mut diagnostics);
                check_actions(&page.actions, &format!("page `{name}`"), &mut diagnostics);
            }
        }

        let mut bundles: IndexMap<&str, &PageActions> = IndexMap::new();
        for bundle in &program.page_actions {
            let name = bundle.name.inner().as_str();
            if let Some(first) = bundles.get(name) {
                diagnostics.push(duplicate(
                    ErrorCode::DuplicatePageactions,
                    format!("pageactions `{name}` is defined multiple times"),
                    bundle.name.span(),
                    first.name.span(),
                ));
            } else {
                bundles.insert(name, bundle);
                check_actions(
                    &bundle.actions,
                    &format!("pageactions `{name}`"),
                    &mut diagnostics,
                );
            }
        }

        let mut features: IndexMap<&str, Span> = IndexMap::new();
        for feature in &program.features {
            let name = feature.name.inner().as_str();
            if let Some(&first) = features.get(name) {
                diagnostics.push(duplicate(
                    ErrorCode::DuplicateFeature,
                    format!("feature `{name}` is defined multiple times"),
                    feature.name.span(),
                    first,
                ));
            } else {
                features.insert(name, feature.name.span());
            }
        }

        let mut fixtures: IndexMap<&str, &Fixture> = IndexMap::new();
        for fixture in &program.fixtures {
            fixtures.entry(fixture.name.inner().as_str()).or_insert(fixture);
        }

        debug!(
            pages = pages.len(),
            bundles = bundles.len(),
            fixtures = fixtures.len(),
            duplicates = diagnostics.len();
            "symbol tables built"
        );

        (
            Self {
                pages,
                bundles,
                fixtures,
            },
            diagnostics,
        )
    }

    pub fn page(&self, name: &str) -> Option<&'a Page> {
        self.pages.get(name).copied()
    }

    pub fn bundle(&self, name: &str) -> Option<&'a PageActions> {
        self.bundles.get(name).copied()
    }

    pub fn fixture(&self, name: &str) -> Option<&'a Fixture> {
        self.fixtures.get(name).copied()
    }

    /// Look up a field declared on a page.
    pub fn field(&self, page: &str, field: &str) -> Option<&'a vero_core::ast::Field> {
        self.page(page)?
            .fields
            .iter()
            .find(|f| f.name.inner() == field)
    }

    /// Resolve a name that may refer to either a page or a bundle. Pages
    /// shadow bundles when names collide.
    pub fn action_container(&self, name: &str) -> Option<ActionContainer<'a>> {
        if let Some(page) = self.page(name) {
            return Some(ActionContainer::Page(page));
        }
        self.bundle(name).map(ActionContainer::Bundle)
    }

    /// All page names in declaration order.
    pub fn page_names(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.pages.keys().copied()
    }

    /// Field names of one page, or an empty iterator when the page does
    /// not exist.
    pub fn fields_for_page(&self, page: &str) -> impl Iterator<Item = &'a str> + '_ {
        self.page(page)
            .map(|p| p.fields.as_slice())
            .unwrap_or_default()
            .iter()
            .map(|f| f.name.inner().as_str())
    }

    pub fn bundle_names(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.bundles.keys().copied()
    }

    pub fn fixture_names(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.fixtures.keys().copied()
    }
}

fn check_fields(page: &Page, diagnostics: &mut Vec<Diagnostic>) {
    let mut seen: IndexMap<&str, Span> = IndexMap::new();
    for field in &page.fields {
        let name = field.name.inner().as_str();
        if let Some(&first) = seen.get(name) {
            diagnostics.push(duplicate(
                ErrorCode::DuplicateField,
                format!(
                    "field `{name}` is defined multiple times in page `{}`",
                    page.name.inner()
                ),
                field.name.span(),
                first,
            ));
        } else {
            seen.insert(name, field.name.span());
        }
    }
}

fn check_actions(actions: &[ActionDef], owner: &str, diagnostics: &mut Vec<Diagnostic>) {
    let mut seen: IndexMap<&str, Span> = IndexMap::new();
    for action in actions {
        let name = action.name.inner().as_str();
        if let Some(&first) = seen.get(name) {
            diagnostics.push(duplicate(
                ErrorCode::DuplicateAction,
                format!("action `{name}` is defined multiple times in {owner}"),
                action.name.span(),
                first,
            ));
        } else {
            seen.insert(name, action.name.span());
        }
    }
}

fn duplicate(code: ErrorCode, message: String, span: Span, first: Span) -> Diagnostic {
    Diagnostic::error(message)
        .with_code(code)
        .with_label(span, "duplicate definition")
        .with_secondary_label(first, "first defined here")
}
