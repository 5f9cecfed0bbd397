//! Rule definitions and the consolidated governance catalog.

pub mod catalog;
pub mod definition;

pub use catalog::{build_rule_catalog, catalog_index, CatalogEntry};
pub use definition::{
    duplicate_rule, ApplicationRuleKey, CountUnit, DatasetScope, DuplicateRuleDef, IssueKind,
    RuleDef, RuleFamily, Severity, SpendingRuleKey, Stage, ValueSource, APPLICATION_RULES,
    DUPLICATE_RULES, SPENDING_RULES,
};
