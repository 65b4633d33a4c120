use crate::rules::{
    ChoiceRule, ChoiceRuleSet, OptionMapping, OptionRule, OptionRuleChoice, PlanOption, RuleType,
    TreeVersionRules,
};
use crate::tree::{
    select_choice, Choice, DecisionPoint, Group, JobChoiceData, LockedInChoice, LockedInSource,
    PickType, SubGroup, Tree, TreeVersion,
};

pub(super) const VERSION: u32 = 10;

pub(super) fn choice(id: u32, catalog_id: u32, sort_order: i32, label: &str) -> Choice {
    Choice::new(id, catalog_id, VERSION, sort_order, label)
}

pub(super) fn point(
    id: u32,
    sort_order: i32,
    pick_type: PickType,
    label: &str,
    choices: Vec<Choice>,
) -> DecisionPoint {
    let mut point = DecisionPoint::new(id, id + 9000, VERSION, sort_order, label, pick_type);
    point.choices = choices;
    point
}

/// Two groups: an exclusive elevation pick (choices 1-3) and an additive
/// kitchen upgrade pick (choices 4-5) that sorts after it.
pub(super) fn base_tree() -> Tree {
    Tree {
        tree_version: TreeVersion {
            id: VERSION,
            plan_id: Some(77),
            name: "Sandpiper II".to_string(),
            groups: vec![
                Group {
                    id: 1,
                    sort_order: 1,
                    label: "Structure".to_string(),
                    status: crate::tree::CompletionStatus::Unviewed,
                    sub_groups: vec![SubGroup {
                        id: 11,
                        sort_order: 1,
                        label: "Exterior".to_string(),
                        status: crate::tree::CompletionStatus::Unviewed,
                        points: vec![point(
                            100,
                            1,
                            PickType::Pick0or1,
                            "Elevation",
                            vec![
                                choice(1, 1001, 1, "Elevation A"),
                                choice(2, 1002, 2, "Elevation B"),
                                choice(3, 1003, 3, "Elevation C"),
                            ],
                        )],
                    }],
                },
                Group {
                    id: 2,
                    sort_order: 2,
                    label: "Interior".to_string(),
                    status: crate::tree::CompletionStatus::Unviewed,
                    sub_groups: vec![SubGroup {
                        id: 21,
                        sort_order: 1,
                        label: "Kitchen".to_string(),
                        status: crate::tree::CompletionStatus::Unviewed,
                        points: vec![point(
                            200,
                            1,
                            PickType::Pick0orMore,
                            "Kitchen Upgrades",
                            vec![
                                choice(4, 1004, 1, "Gourmet Kitchen"),
                                choice(5, 1005, 2, "Island Extension"),
                            ],
                        )],
                    }],
                },
            ],
        },
    }
}

pub(super) fn must_have_rule(choice_id: u32, requires: Vec<u32>) -> ChoiceRuleSet {
    ChoiceRuleSet {
        choice_id,
        rules: vec![ChoiceRule {
            rule_type: RuleType::MustHave,
            choices: requires,
        }],
    }
}

pub(super) fn must_not_have_rule(choice_id: u32, excludes: Vec<u32>) -> ChoiceRuleSet {
    ChoiceRuleSet {
        choice_id,
        rules: vec![ChoiceRule {
            rule_type: RuleType::MustNotHave,
            choices: excludes,
        }],
    }
}

pub(super) fn plan_option(id: u32, key: &str, list_price: f64) -> PlanOption {
    PlanOption {
        id,
        integration_key: key.to_string(),
        list_price,
        max_order_quantity: 1,
        attribute_groups: Vec::new(),
        location_groups: Vec::new(),
        is_base_house: false,
    }
}

pub(super) fn mapping_choice(catalog_id: u32) -> OptionRuleChoice {
    OptionRuleChoice {
        id: catalog_id,
        must_have: true,
        attribute_reassignments: Vec::new(),
    }
}

pub(super) fn option_rule(id: u32, key: &str, must_have_catalog_ids: Vec<u32>) -> OptionRule {
    OptionRule {
        id,
        option_id: key.to_string(),
        option_mappings: vec![OptionMapping {
            choices: must_have_catalog_ids
                .into_iter()
                .map(mapping_choice)
                .collect(),
        }],
        replace_options: Vec::new(),
    }
}

pub(super) fn locked_job(job_id: u32) -> LockedInChoice {
    LockedInChoice {
        source: LockedInSource::Job(JobChoiceData {
            job_id,
            job_choice_id: job_id * 10,
            signed_on: None,
        }),
        quantity: 1,
        price: 0.0,
        attribute_groups: Vec::new(),
        location_groups: Vec::new(),
    }
}

pub(super) fn rules_with(choice_rules: Vec<ChoiceRuleSet>) -> TreeVersionRules {
    TreeVersionRules {
        choice_rules,
        ..TreeVersionRules::default()
    }
}

pub(super) fn select(tree: &mut Tree, choice_id: u32, quantity: u32) {
    select_choice(&mut tree.tree_version, choice_id, quantity).expect("choice selectable");
}
