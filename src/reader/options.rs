//! Parser configuration

use crate::core::entities::EntityTable;
use crate::dom::element::EmptyElementRegistry;

/// How strictly deviations from well-formedness are treated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Conformance {
    /// Every deviation is fatal
    Strict,
    /// Recoverable deviations are warnings; gross malformation is fatal
    #[default]
    Default,
    /// Recover from as much as possible
    Lenient,
}

/// Options fixed for the lifetime of one parser
#[derive(Debug, Clone, Default)]
pub struct ParserOptions {
    pub conformance: Conformance,
    /// Compare element and attribute names ignoring ASCII case
    pub case_insensitive: bool,
    /// Resolve HTML 4 named references instead of only the XML five
    pub html_entities: bool,
    /// Void elements, raw-text elements and structural repair
    pub html: bool,
    pub empty_elements: EmptyElementRegistry,
    /// Replaces the built-in entity table when set
    pub user_entities: Option<EntityTable>,
}

impl ParserOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn strict() -> Self {
        Self::new().conformance(Conformance::Strict)
    }

    pub fn lenient() -> Self {
        Self::new().conformance(Conformance::Lenient)
    }

    /// Real-world HTML: lenient, HTML mode, case-insensitive names and the
    /// HTML entity table
    pub fn html() -> Self {
        ParserOptions {
            conformance: Conformance::Lenient,
            case_insensitive: true,
            html_entities: true,
            html: true,
            ..Self::default()
        }
    }

    pub fn conformance(mut self, conformance: Conformance) -> Self {
        self.conformance = conformance;
        self
    }

    pub fn case_insensitive(mut self, yes: bool) -> Self {
        self.case_insensitive = yes;
        self
    }

    pub fn html_entities(mut self, yes: bool) -> Self {
        self.html_entities = yes;
        self
    }

    pub fn html_mode(mut self, yes: bool) -> Self {
        self.html = yes;
        self
    }

    /// Treat `name` in `namespace` as always empty
    pub fn register_empty_element(mut self, name: &str, namespace: Option<&str>) -> Self {
        self.empty_elements.register(name, namespace);
        self
    }

    pub fn set_user_entities(mut self, table: EntityTable) -> Self {
        self.user_entities = Some(table);
        self
    }

    /// The table named references are resolved against
    pub fn entity_table(&self) -> &EntityTable {
        match &self.user_entities {
            Some(table) => table,
            None if self.html_entities => EntityTable::html(),
            None => EntityTable::xml(),
        }
    }

    #[inline]
    pub fn is_strict(&self) -> bool {
        self.conformance == Conformance::Strict
    }

    #[inline]
    pub fn is_lenient(&self) -> bool {
        self.conformance == Conformance::Lenient
    }
}
