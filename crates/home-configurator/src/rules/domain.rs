use serde::{Deserialize, Serialize};

/// Whether a rule requires its referenced choices selected or deselected.
/// The catalog contract encodes this as 1 (must have) / 2 (must not have).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum RuleType {
    MustHave,
    MustNotHave,
}

impl From<RuleType> for u8 {
    fn from(value: RuleType) -> Self {
        match value {
            RuleType::MustHave => 1,
            RuleType::MustNotHave => 2,
        }
    }
}

impl TryFrom<u8> for RuleType {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::MustHave),
            2 => Ok(Self::MustNotHave),
            other => Err(format!("unknown rule type {other}")),
        }
    }
}

/// One AND-set of choice references; the listed choices must all be selected
/// (must have) or all deselected (must not have) for the rule to hold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChoiceRule {
    pub rule_type: RuleType,
    pub choices: Vec<u32>,
}

/// All rules constraining one choice, OR-combined: the choice is enabled when
/// at least one rule is satisfied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChoiceRuleSet {
    pub choice_id: u32,
    pub rules: Vec<ChoiceRule>,
}

/// One AND-set over choices and points; a referenced point counts as
/// satisfied when it is completed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointRule {
    pub rule_type: RuleType,
    pub choices: Vec<u32>,
    pub points: Vec<u32>,
}

/// All rules constraining one decision point, OR-combined.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointRuleSet {
    pub point_id: u32,
    pub rules: Vec<PointRule>,
}

/// Moves an attribute group's ownership to another choice while the
/// enclosing option mapping is active.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeReassignment {
    pub id: u32,
    pub to_choice_id: u32,
    pub attribute_group_id: u32,
}

/// A choice participating in an option mapping, keyed by catalog id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionRuleChoice {
    /// `div_choice_catalog_id` of the referenced choice.
    pub id: u32,
    pub must_have: bool,
    pub attribute_reassignments: Vec<AttributeReassignment>,
}

/// The set of choices whose joint state attaches a priced option.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionMapping {
    pub choices: Vec<OptionRuleChoice>,
}

/// Declarative mapping from one catalog option to the choices that carry it,
/// with the options it supersedes when active.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionRule {
    pub id: u32,
    /// Financial integration key of the governed option.
    pub option_id: String,
    pub option_mappings: Vec<OptionMapping>,
    pub replace_options: Vec<String>,
}

/// Forces a choice on or off for a specific homesite, independent of the
/// rest of the rule graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LotChoiceRule {
    pub lot_id: u32,
    pub plan_id: Option<u32>,
    pub must_have: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LotChoiceRuleSet {
    pub div_choice_catalog_id: u32,
    pub rules: Vec<LotChoiceRule>,
}

/// Complete rule set authored for one tree version.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TreeVersionRules {
    pub choice_rules: Vec<ChoiceRuleSet>,
    pub point_rules: Vec<PointRuleSet>,
    pub option_rules: Vec<OptionRule>,
    pub lot_choice_rules: Vec<LotChoiceRuleSet>,
}

/// Priced catalog option the engine may attach to a choice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanOption {
    pub id: u32,
    pub integration_key: String,
    pub list_price: f64,
    pub max_order_quantity: u32,
    pub attribute_groups: Vec<u32>,
    pub location_groups: Vec<u32>,
    pub is_base_house: bool,
}

/// Historical price record used to preserve original pricing through a
/// replace chain on a contracted job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeOfSaleOptionPrice {
    pub job_id: u32,
    pub plan_option_id: u32,
    pub div_choice_catalog_id: u32,
    pub list_price: f64,
}
