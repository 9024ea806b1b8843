//! The rewrite-rule contract and the explicit rule registry
//!
//! Rules implement hooks for the node kinds they care about. During one
//! traversal every rule sees every dispatch node: the leave hooks receive
//! the node as it stood in the parsed file (`original`) alongside the
//! current, possibly already rewritten value (`updated`), and return the
//! value handed to the next rule. Positions come from `original`; matching
//! and rewrites go against `updated`, so rules compose within one pass.

use pyfix_cst::{
    Arg, AugAssign, BinaryOperation, Call, ClassDef, ExceptHandler, Expression, For, Import,
    ImportFrom, SmallStatement, Statement, UnaryOperation,
};
use thiserror::Error;

use crate::report::RunContext;

/// Result of a statement-level hook: keep a node or delete the statement.
#[derive(Debug, PartialEq)]
pub enum Edit<T> {
    Node(T),
    Remove,
}

/// Settings handed to every rule factory when instances are built.
#[derive(Debug, Clone, Default)]
pub struct RuleConfig {
    /// `__future__` features whose imports must be left in place.
    pub allow_future: Vec<String>,
}

/// One rewrite rule. Hooks default to passing the node through untouched;
/// implementations override only the kinds they rewrite.
///
/// Rules may keep state across hooks within one file (the traversal builds
/// a fresh instance per file), which is how context hooks like
/// `enter_class_def` feed later rewrites.
pub trait Rule {
    /// Registered name, used in reports and rule selection.
    fn name(&self) -> &'static str;

    /// One-line summary for `--list-rules`.
    fn description(&self) -> &'static str;

    // Context hooks, called while descending in registration order.

    fn enter_class_def(&mut self, _node: &ClassDef) {}

    fn enter_arg(&mut self, _node: &Arg) {}

    fn leave_arg(&mut self, _node: &Arg) {}

    // Rewrite hooks, called on the way back up after children were
    // rewritten.

    fn leave_call(
        &mut self,
        _original: &Call,
        updated: Expression,
        _ctx: &mut RunContext,
    ) -> Expression {
        updated
    }

    fn leave_unary_operation(
        &mut self,
        _original: &UnaryOperation,
        updated: Expression,
        _ctx: &mut RunContext,
    ) -> Expression {
        updated
    }

    fn leave_binary_operation(
        &mut self,
        _original: &BinaryOperation,
        updated: Expression,
        _ctx: &mut RunContext,
    ) -> Expression {
        updated
    }

    fn leave_aug_assign(
        &mut self,
        _original: &AugAssign,
        updated: SmallStatement,
        _ctx: &mut RunContext,
    ) -> SmallStatement {
        updated
    }

    fn leave_import(
        &mut self,
        _original: &Import,
        updated: SmallStatement,
        _ctx: &mut RunContext,
    ) -> Edit<SmallStatement> {
        Edit::Node(updated)
    }

    fn leave_import_from(
        &mut self,
        _original: &ImportFrom,
        updated: SmallStatement,
        _ctx: &mut RunContext,
    ) -> Edit<SmallStatement> {
        Edit::Node(updated)
    }

    fn leave_class_def(
        &mut self,
        _original: &ClassDef,
        updated: ClassDef,
        _ctx: &mut RunContext,
    ) -> ClassDef {
        updated
    }

    fn leave_for(
        &mut self,
        _original: &For,
        updated: Statement,
        _ctx: &mut RunContext,
    ) -> Statement {
        updated
    }

    fn leave_except_handler(
        &mut self,
        _original: &ExceptHandler,
        updated: ExceptHandler,
        _ctx: &mut RunContext,
    ) -> ExceptHandler {
        updated
    }
}

/// A rule name that is not in the registry.
#[derive(Error, Debug, PartialEq, Eq)]
#[error("unknown rule '{0}'")]
pub struct UnknownRule(pub String);

type Factory = Box<dyn Fn(&RuleConfig) -> Box<dyn Rule> + Send + Sync>;

struct Entry {
    name: &'static str,
    description: &'static str,
    factory: Factory,
}

/// An ordered registry of rules. Registration order is execution order,
/// and `build` produces fresh instances so per-file rule state never
/// leaks between files.
#[derive(Default)]
pub struct RuleSet {
    entries: Vec<Entry>,
}

impl std::fmt::Debug for RuleSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuleSet")
            .field("names", &self.names())
            .finish()
    }
}

impl RuleSet {
    pub fn new() -> Self {
        RuleSet {
            entries: Vec::new(),
        }
    }

    /// Register a rule under `name`. The factory runs once per file.
    pub fn add(
        &mut self,
        name: &'static str,
        description: &'static str,
        factory: impl Fn(&RuleConfig) -> Box<dyn Rule> + Send + Sync + 'static,
    ) {
        self.entries.push(Entry {
            name,
            description,
            factory: Box::new(factory),
        });
    }

    /// Registered names in execution order.
    pub fn names(&self) -> Vec<&'static str> {
        self.entries.iter().map(|entry| entry.name).collect()
    }

    /// `(name, description)` pairs in execution order.
    pub fn list(&self) -> Vec<(&'static str, &'static str)> {
        self.entries
            .iter()
            .map(|entry| (entry.name, entry.description))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Keep only the named rules, preserving registration order. Fails on
    /// the first name that was never registered.
    pub fn select(mut self, names: &[String]) -> Result<RuleSet, UnknownRule> {
        for requested in names {
            if !self.entries.iter().any(|entry| entry.name == requested.as_str()) {
                return Err(UnknownRule(requested.clone()));
            }
        }
        self.entries
            .retain(|entry| names.iter().any(|requested| requested == entry.name));
        Ok(self)
    }

    /// Drop the named rules, keeping everything else in order.
    pub fn without(mut self, names: &[String]) -> RuleSet {
        self.entries
            .retain(|entry| !names.iter().any(|dropped| dropped == entry.name));
        self
    }

    /// Instantiate every registered rule for one file's traversal.
    pub fn build(&self, config: &RuleConfig) -> Vec<Box<dyn Rule>> {
        self.entries
            .iter()
            .map(|entry| (entry.factory)(config))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Inert(&'static str);

    impl Rule for Inert {
        fn name(&self) -> &'static str {
            self.0
        }

        fn description(&self) -> &'static str {
            "does nothing"
        }
    }

    fn sample() -> RuleSet {
        let mut rules = RuleSet::new();
        rules.add("alpha", "first", |_| Box::new(Inert("alpha")));
        rules.add("beta", "second", |_| Box::new(Inert("beta")));
        rules.add("gamma", "third", |_| Box::new(Inert("gamma")));
        rules
    }

    #[test]
    fn test_names_keep_registration_order() {
        assert_eq!(sample().names(), vec!["alpha", "beta", "gamma"]);
    }

    #[test]
    fn test_select_preserves_registration_order() {
        let picked = sample()
            .select(&["gamma".to_string(), "alpha".to_string()])
            .unwrap();
        assert_eq!(picked.names(), vec!["alpha", "gamma"]);
    }

    #[test]
    fn test_select_unknown_rule_fails() {
        let err = sample().select(&["nope".to_string()]).unwrap_err();
        assert_eq!(err, UnknownRule("nope".to_string()));
        assert_eq!(err.to_string(), "unknown rule 'nope'");
    }

    #[test]
    fn test_without_drops_named_rules() {
        let rest = sample().without(&["beta".to_string()]);
        assert_eq!(rest.names(), vec!["alpha", "gamma"]);
    }

    #[test]
    fn test_build_creates_instances_per_call() {
        let rules = sample();
        let config = RuleConfig::default();
        assert_eq!(rules.build(&config).len(), 3);
        assert_eq!(rules.build(&config).len(), 3);
    }
}
