use std::collections::HashSet;

use tracing::trace;

use crate::rules::{PointRule, PointRuleSet, RuleType, TreeVersionRules};
use crate::tree::{Tree, TreeVersion};

/// Step 6: evaluate point rule sets with the same memoized-recursive pattern
/// as choice rules. Completion is derived before evaluation so rules can
/// reference sibling completion, and re-derived by the engine epilogue.
pub(super) fn evaluate(tree: &mut Tree, rules: &TreeVersionRules) {
    for point in tree.tree_version.points_mut() {
        point.completed = point.enabled && point.has_selection();
    }

    let mut executed = HashSet::new();
    for rule_set in &rules.point_rules {
        execute(tree, rules, rule_set, &mut executed);
    }
}

fn execute(
    tree: &mut Tree,
    rules: &TreeVersionRules,
    rule_set: &PointRuleSet,
    executed: &mut HashSet<u32>,
) {
    if !executed.insert(rule_set.point_id) {
        return;
    }

    for rule in &rule_set.rules {
        for &dependency in &rule.points {
            let dependency_set = rules
                .point_rules
                .iter()
                .find(|candidate| candidate.point_id == dependency);
            if let Some(dependency_set) = dependency_set {
                execute(tree, rules, dependency_set, executed);
            }
        }
    }

    if rule_set.rules.is_empty() {
        return;
    }

    let version_id = tree.tree_version.id;
    let Some(point) = tree.tree_version.find_point(rule_set.point_id) else {
        return;
    };
    if point.tree_version_id != version_id {
        return;
    }
    let point_id = point.id;

    let satisfied = rule_set
        .rules
        .iter()
        .any(|rule| rule_satisfied(&tree.tree_version, rule));
    if satisfied {
        return;
    }

    if let Some(point) = tree.tree_version.find_point_mut(point_id) {
        point.enabled = false;
        point.completed = false;
        point.disabled_by.push(rule_set.clone());
        for choice in &mut point.choices {
            if choice.locked_in_choice.is_none() {
                choice.quantity = 0;
                choice.enabled = false;
            }
        }
        trace!(point = point_id, "point disabled by point rule");
    }
}

/// Mixed AND-set over choices and points; a referenced point counts when it
/// is completed. Unresolvable references fail the branch.
fn rule_satisfied(tree: &TreeVersion, rule: &PointRule) -> bool {
    match rule.rule_type {
        RuleType::MustHave => {
            rule.choices.iter().all(|&id| {
                tree.find_choice_by_any_id(id)
                    .map(|choice| choice.quantity > 0)
                    .unwrap_or(false)
            }) && rule.points.iter().all(|&id| {
                tree.find_point(id)
                    .map(|point| point.completed)
                    .unwrap_or(false)
            })
        }
        RuleType::MustNotHave => {
            rule.choices.iter().all(|&id| {
                tree.find_choice_by_any_id(id)
                    .map(|choice| choice.quantity == 0)
                    .unwrap_or(false)
            }) && rule.points.iter().all(|&id| {
                tree.find_point(id)
                    .map(|point| !point.completed)
                    .unwrap_or(false)
            })
        }
    }
}
