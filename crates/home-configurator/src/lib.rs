//! Rule and pricing engine for configure-to-order home decision trees.
//!
//! A buyer configures a house by walking a catalog-defined decision tree
//! (groups, subgroups, decision points, choices). Selecting or deselecting a
//! choice can enable or disable other choices and points, change which
//! priced options and attribute/location catalogs apply, and change prices,
//! all governed by an administrator-authored rule set. This crate holds the
//! pieces with real algorithmic weight:
//!
//! - [`engine::apply_rules`] — one idempotent propagation pass producing a
//!   fully consistent, priced, enabled/disabled tree;
//! - [`engine::dependent_choices`] — what-if analysis of which contracted
//!   choices a toggle would disable;
//! - [`explorer`] — the price-range explorer, brute-forcing each choice's
//!   achievable min/max price off the interactive path.
//!
//! Data acquisition (catalog fetch, historical prices) and presentation are
//! external collaborators; they hand this crate already-deserialized data
//! and read the mutated tree back.

pub mod engine;
pub mod explorer;
pub mod rules;
pub mod telemetry;
pub mod tree;

pub use engine::{apply_rules, dependent_choices};
pub use explorer::{
    choice_price_ranges, ChoicePriceRange, ExplorerConfig, ExplorerError, PriceRangeRequest,
    PriceRangeWorker,
};
pub use rules::{
    AttributeReassignment, ChoiceRule, ChoiceRuleSet, LotChoiceRule, LotChoiceRuleSet,
    OptionMapping, OptionRule, OptionRuleChoice, PlanOption, PointRule, PointRuleSet, RuleType,
    TimeOfSaleOptionPrice, TreeVersionRules,
};
pub use tree::{
    max_sort_order_choice, refresh_cut_offs, refresh_statuses, select_choice, tree_price,
    AttachedOption, ChangeOrderChoiceData, Choice, CompletionStatus, DecisionPoint, Group,
    JobChoiceData, LockedInChoice, LockedInOption, LockedInSource, MappedGroup, PickType,
    SelectedAttribute, SubGroup, Tree, TreeError, TreeVersion,
};
