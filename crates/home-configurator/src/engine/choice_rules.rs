use std::collections::HashSet;

use tracing::trace;

use crate::rules::{ChoiceRule, ChoiceRuleSet, RuleType, TreeVersionRules};
use crate::tree::{Tree, TreeVersion};

/// Step 5: evaluate every choice rule set, dependencies first. The executed
/// set memoizes per pass; a node reached again (forward reference or cycle)
/// is treated as a fixed point at its current state.
pub(super) fn evaluate(tree: &mut Tree, rules: &TreeVersionRules) {
    let mut executed = HashSet::new();
    for rule_set in &rules.choice_rules {
        execute(tree, rules, rule_set, &mut executed);
    }
}

fn execute(
    tree: &mut Tree,
    rules: &TreeVersionRules,
    rule_set: &ChoiceRuleSet,
    executed: &mut HashSet<u32>,
) {
    if !executed.insert(rule_set.choice_id) {
        return;
    }

    // Referenced choices settle their own rules before this one reads them.
    for rule in &rule_set.rules {
        for &dependency in &rule.choices {
            let dependency_set = rules
                .choice_rules
                .iter()
                .find(|candidate| candidate.choice_id == dependency);
            if let Some(dependency_set) = dependency_set {
                execute(tree, rules, dependency_set, executed);
            }
        }
    }

    if rule_set.rules.is_empty() {
        return;
    }

    let version_id = tree.tree_version.id;
    let Some(choice) = tree.tree_version.find_choice_by_any_id(rule_set.choice_id) else {
        return;
    };
    if choice.tree_version_id != version_id {
        return;
    }
    let choice_id = choice.id;

    let satisfied = rule_set
        .rules
        .iter()
        .any(|rule| rule_satisfied(&tree.tree_version, rule));
    if satisfied {
        return;
    }

    if let Some(choice) = tree.tree_version.find_choice_mut(choice_id) {
        choice.enabled = false;
        choice.disabled_by.push(rule_set.clone());
        if choice.locked_in_choice.is_none() {
            choice.quantity = 0;
            choice.is_required = false;
        }
        trace!(choice = choice_id, "choice disabled by choice rule");
    }
}

/// One AND-set holds when every referenced choice is selected (must have) or
/// deselected (must not have). Unresolvable references fail the branch.
fn rule_satisfied(tree: &TreeVersion, rule: &ChoiceRule) -> bool {
    match rule.rule_type {
        RuleType::MustHave => rule.choices.iter().all(|&id| {
            tree.find_choice_by_any_id(id)
                .map(|choice| choice.quantity > 0)
                .unwrap_or(false)
        }),
        RuleType::MustNotHave => rule.choices.iter().all(|&id| {
            tree.find_choice_by_any_id(id)
                .map(|choice| choice.quantity == 0)
                .unwrap_or(false)
        }),
    }
}
