use super::common::*;
use crate::engine::dependent_choices;

#[test]
fn toggling_off_an_anchor_reports_the_contracted_dependents() {
    let mut tree = base_tree();
    let rules = rules_with(vec![must_have_rule(4, vec![1])]);
    {
        let anchor = tree.tree_version.find_choice_mut(1).unwrap();
        anchor.quantity = 1;
        anchor.locked_in_choice = Some(locked_job(900));
    }
    {
        let dependent = tree.tree_version.find_choice_mut(4).unwrap();
        dependent.quantity = 1;
        dependent.locked_in_choice = Some(locked_job(900));
    }

    let affected = dependent_choices(&tree, &rules, &[], 1);
    let affected_ids: Vec<u32> = affected.iter().map(|choice| choice.id).collect();
    assert_eq!(affected_ids, vec![4]);

    // Pure read: the caller's tree still carries both contracts.
    assert!(tree.tree_version.find_choice(1).unwrap().locked_in_choice.is_some());
    assert!(tree.tree_version.find_choice(4).unwrap().locked_in_choice.is_some());
    assert_eq!(tree.tree_version.find_choice(1).unwrap().quantity, 1);
}

#[test]
fn unrelated_toggle_reports_nothing() {
    let mut tree = base_tree();
    let rules = rules_with(vec![must_have_rule(4, vec![1])]);
    {
        let anchor = tree.tree_version.find_choice_mut(1).unwrap();
        anchor.quantity = 1;
        anchor.locked_in_choice = Some(locked_job(900));
    }

    let affected = dependent_choices(&tree, &rules, &[], 5);
    assert!(affected.is_empty());
}

#[test]
fn selecting_into_an_exclusive_point_simulates_the_swap() {
    let mut tree = base_tree();
    let rules = rules_with(vec![must_have_rule(4, vec![2])]);
    {
        let contracted = tree.tree_version.find_choice_mut(2).unwrap();
        contracted.quantity = 1;
        contracted.locked_in_choice = Some(locked_job(903));
    }
    {
        let dependent = tree.tree_version.find_choice_mut(4).unwrap();
        dependent.quantity = 1;
        dependent.locked_in_choice = Some(locked_job(903));
    }

    // Choosing elevation A kicks contracted elevation B out of the exclusive
    // point, which in turn strands the kitchen upgrade contracted on it.
    let affected = dependent_choices(&tree, &rules, &[], 1);
    let affected_ids: Vec<u32> = affected.iter().map(|choice| choice.id).collect();
    assert!(affected_ids.contains(&4));
}
