use chrono::NaiveDate;
use home_configurator::{
    apply_rules, refresh_cut_offs, select_choice, tree_price, Choice, ChoiceRule, ChoiceRuleSet,
    CompletionStatus, DecisionPoint, Group, OptionMapping, OptionRule, OptionRuleChoice, PickType,
    PlanOption, RuleType, SubGroup, Tree, TreeVersion, TreeVersionRules,
};

const VERSION: u32 = 400;

fn choice(id: u32, catalog_id: u32, sort_order: i32, label: &str) -> Choice {
    Choice::new(id, catalog_id, VERSION, sort_order, label)
}

fn sample_tree() -> Tree {
    let mut elevation = DecisionPoint::new(100, 9100, VERSION, 1, "Elevation", PickType::Pick1);
    elevation.choices = vec![
        choice(1, 1001, 1, "Craftsman"),
        choice(2, 1002, 2, "Farmhouse"),
    ];
    let mut kitchen = DecisionPoint::new(
        200,
        9200,
        VERSION,
        1,
        "Kitchen Layout",
        PickType::Pick0or1,
    );
    kitchen.choices = vec![
        choice(4, 1004, 1, "Standard Kitchen"),
        choice(5, 1005, 2, "Gourmet Kitchen"),
    ];

    Tree {
        tree_version: TreeVersion {
            id: VERSION,
            plan_id: Some(12),
            name: "Willow Run".to_string(),
            groups: vec![
                Group {
                    id: 1,
                    sort_order: 1,
                    label: "Structure".to_string(),
                    status: CompletionStatus::Unviewed,
                    sub_groups: vec![SubGroup {
                        id: 11,
                        sort_order: 1,
                        label: "Exterior".to_string(),
                        status: CompletionStatus::Unviewed,
                        points: vec![elevation],
                    }],
                },
                Group {
                    id: 2,
                    sort_order: 2,
                    label: "Interior".to_string(),
                    status: CompletionStatus::Unviewed,
                    sub_groups: vec![SubGroup {
                        id: 21,
                        sort_order: 1,
                        label: "Kitchen".to_string(),
                        status: CompletionStatus::Unviewed,
                        points: vec![kitchen],
                    }],
                },
            ],
        },
    }
}

fn must_have(catalog_id: u32) -> OptionRuleChoice {
    OptionRuleChoice {
        id: catalog_id,
        must_have: true,
        attribute_reassignments: Vec::new(),
    }
}

fn sample_rules() -> TreeVersionRules {
    TreeVersionRules {
        // The gourmet kitchen is only offered on the farmhouse elevation.
        choice_rules: vec![ChoiceRuleSet {
            choice_id: 5,
            rules: vec![ChoiceRule {
                rule_type: RuleType::MustHave,
                choices: vec![2],
            }],
        }],
        option_rules: vec![OptionRule {
            id: 1,
            option_id: "OPT-GOURMET".to_string(),
            option_mappings: vec![OptionMapping {
                choices: vec![must_have(1002), must_have(1005)],
            }],
            replace_options: Vec::new(),
        }],
        ..TreeVersionRules::default()
    }
}

fn sample_options() -> Vec<PlanOption> {
    vec![PlanOption {
        id: 1,
        integration_key: "OPT-GOURMET".to_string(),
        list_price: 18_400.0,
        max_order_quantity: 1,
        attribute_groups: Vec::new(),
        location_groups: Vec::new(),
        is_base_house: false,
    }]
}

#[test]
fn a_full_pass_prices_and_gates_the_tree() {
    let mut tree = sample_tree();
    let rules = sample_rules();
    let options = sample_options();

    apply_rules(&mut tree, &rules, &options, None, &[]);
    assert!(!tree.tree_version.find_choice(5).unwrap().enabled);
    assert_eq!(
        tree.tree_version.find_point(100).unwrap().status,
        CompletionStatus::Required
    );

    select_choice(&mut tree.tree_version, 2, 1).expect("farmhouse selectable");
    apply_rules(&mut tree, &rules, &options, None, &[]);
    let gourmet = tree.tree_version.find_choice(5).unwrap();
    assert!(gourmet.enabled);
    assert_eq!(gourmet.price, 18_400.0);
    assert_eq!(tree_price(&tree), 0.0);

    select_choice(&mut tree.tree_version, 5, 1).expect("gourmet selectable");
    apply_rules(&mut tree, &rules, &options, None, &[]);
    assert_eq!(tree_price(&tree), 18_400.0);
    assert_eq!(
        tree.tree_version.find_point(200).unwrap().status,
        CompletionStatus::Completed
    );

    // Backing off the elevation pulls the kitchen upgrade out with it.
    select_choice(&mut tree.tree_version, 1, 1).expect("craftsman selectable");
    apply_rules(&mut tree, &rules, &options, None, &[]);
    let gourmet = tree.tree_version.find_choice(5).unwrap();
    assert!(!gourmet.enabled);
    assert_eq!(gourmet.quantity, 0);
    assert_eq!(tree_price(&tree), 0.0);
}

#[test]
fn selection_state_survives_repeated_passes() {
    let mut tree = sample_tree();
    let rules = sample_rules();
    let options = sample_options();

    select_choice(&mut tree.tree_version, 2, 1).expect("selectable");
    apply_rules(&mut tree, &rules, &options, None, &[]);
    select_choice(&mut tree.tree_version, 5, 1).expect("selectable");
    apply_rules(&mut tree, &rules, &options, None, &[]);

    let snapshot = tree.clone();
    apply_rules(&mut tree, &rules, &options, None, &[]);
    assert_eq!(tree, snapshot);
}

#[test]
fn cut_off_dates_resolve_against_the_supplied_day() {
    let mut tree = sample_tree();
    tree.tree_version.find_point_mut(100).unwrap().cut_off_date =
        NaiveDate::from_ymd_opt(2025, 6, 1);

    refresh_cut_offs(&mut tree, NaiveDate::from_ymd_opt(2025, 6, 15).expect("valid date"));
    assert!(tree.tree_version.find_point(100).unwrap().is_past_cut_off);
    assert!(!tree.tree_version.find_point(200).unwrap().is_past_cut_off);

    refresh_cut_offs(&mut tree, NaiveDate::from_ymd_opt(2025, 5, 1).expect("valid date"));
    assert!(!tree.tree_version.find_point(100).unwrap().is_past_cut_off);
}
