//! Declarative rule model authored by catalog administrators, plus the
//! priced-option catalog inputs the engine consumes alongside it.

mod domain;

pub use domain::{
    AttributeReassignment, ChoiceRule, ChoiceRuleSet, LotChoiceRule, LotChoiceRuleSet,
    OptionMapping, OptionRule, OptionRuleChoice, PlanOption, PointRule, PointRuleSet, RuleType,
    TimeOfSaleOptionPrice, TreeVersionRules,
};
