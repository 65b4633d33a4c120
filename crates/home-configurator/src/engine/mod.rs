//! Rule Propagation Engine: one pass takes a tree snapshot, a rule set, and
//! the priced option catalog, and leaves the tree fully consistent — every
//! choice's enabled flag, price, attached options, and mapped groups, and
//! every point's enabled/completed flags recomputed.
//!
//! The pass is idempotent and total: same inputs, same outputs, no errors
//! for well-formed data. Stale references (unknown ids, mismatched tree
//! versions) silently fail the rule branch that names them.

mod choice_rules;
mod mapping;
mod option_rules;
mod point_rules;

pub mod dependents;

#[cfg(test)]
mod tests;

pub use dependents::dependent_choices;

use tracing::debug;

use crate::rules::{PlanOption, TimeOfSaleOptionPrice, TreeVersionRules};
use crate::tree::{refresh_statuses, Tree};

/// Recomputes the whole tree against the rule set: reset, lot forcing,
/// required-choice exclusivity, locked-in invalidation, choice rules, point
/// rules, option rules and pricing, attribute/location remapping, and
/// mapping-change detection, in that order. Mutates the tree in place.
pub fn apply_rules(
    tree: &mut Tree,
    rules: &TreeVersionRules,
    options: &[PlanOption],
    lot_id: Option<u32>,
    historical_prices: &[TimeOfSaleOptionPrice],
) {
    debug!(
        tree_version = tree.tree_version.id,
        choice_rules = rules.choice_rules.len(),
        point_rules = rules.point_rules.len(),
        option_rules = rules.option_rules.len(),
        "applying rules"
    );

    reset(tree);
    apply_lot_rules(tree, rules, lot_id);
    enforce_required_exclusivity(tree);
    invalidate_stale_locked_options(tree);
    choice_rules::evaluate(tree, rules);
    point_rules::evaluate(tree, rules);
    let reassignments = option_rules::evaluate(tree, rules, options, historical_prices);
    mapping::remap(tree, &reassignments);
    mapping::detect_mapping_changes(tree, options);

    for point in tree.tree_version.points_mut() {
        point.completed = point.enabled && point.has_selection();
        point.price = point
            .choices
            .iter()
            .map(|choice| choice.price * f64::from(choice.quantity))
            .sum();
    }
    refresh_statuses(tree);
}

/// Step 1: return every choice and point to its pre-rule state. Quantities
/// and lock-in data survive; everything derived is recomputed from scratch.
fn reset(tree: &mut Tree) {
    for choice in tree.tree_version.choices_mut() {
        choice.max_quantity = choice.choice_max_quantity.unwrap_or(1).max(1);
        choice.price = 0.0;
        choice.enabled = true;
        choice.is_selectable = true;
        choice.is_required = false;
        choice.options.clear();
        choice.disabled_by.clear();
        choice.changed_dependent_choice_ids.clear();
        choice.mapping_changed = false;
    }
    for point in tree.tree_version.points_mut() {
        point.enabled = true;
        point.completed = false;
        point.disabled_by.clear();
        point.price = 0.0;
    }
}

/// Step 2: homesite forcing. A matching must-have rule selects the choice
/// and marks it required; a must-not-have rule removes it from play.
fn apply_lot_rules(tree: &mut Tree, rules: &TreeVersionRules, lot_id: Option<u32>) {
    let Some(lot_id) = lot_id else {
        return;
    };
    let version_id = tree.tree_version.id;
    let plan_id = tree.tree_version.plan_id;

    for rule_set in &rules.lot_choice_rules {
        let rule = rule_set.rules.iter().find(|rule| {
            rule.lot_id == lot_id
                && match (rule.plan_id, plan_id) {
                    (Some(rule_plan), Some(tree_plan)) => rule_plan == tree_plan,
                    _ => true,
                }
        });
        let Some(rule) = rule else {
            continue;
        };
        let Some(choice) = tree
            .tree_version
            .find_choice_by_any_id_mut(rule_set.div_choice_catalog_id)
        else {
            continue;
        };
        if choice.tree_version_id != version_id {
            continue;
        }
        if rule.must_have {
            if choice.quantity == 0 {
                choice.quantity = 1;
            }
            choice.is_required = true;
        } else {
            choice.quantity = 0;
            choice.enabled = false;
            choice.is_selectable = false;
        }
    }
}

/// Step 3: within an exclusive point holding a required choice, every
/// non-required sibling is disabled and zeroed (locked-in selections keep
/// their quantity and surface as a conflict instead).
fn enforce_required_exclusivity(tree: &mut Tree) {
    for point in tree.tree_version.points_mut() {
        if !point.pick_type.is_exclusive() {
            continue;
        }
        if !point.choices.iter().any(|choice| choice.is_required) {
            continue;
        }
        for choice in point.choices.iter_mut().filter(|choice| !choice.is_required) {
            choice.enabled = false;
            if choice.locked_in_choice.is_none() {
                choice.quantity = 0;
            }
        }
    }
}

/// Step 4: a locked-in choice whose frozen option mappings can no longer be
/// reconstructed under current selections loses its contract data.
fn invalidate_stale_locked_options(tree: &mut Tree) {
    use std::collections::HashSet;

    let selected: HashSet<u32> = tree
        .tree_version
        .choices()
        .filter(|choice| choice.quantity > 0)
        .flat_map(|choice| [choice.id, choice.div_choice_catalog_id])
        .collect();

    for choice in tree.tree_version.choices_mut() {
        if choice.locked_in_choice.is_none() || choice.locked_in_options.is_empty() {
            continue;
        }
        let still_valid = choice.locked_in_options.iter().all(|frozen| {
            frozen
                .must_have_choices
                .iter()
                .all(|id| selected.contains(id))
                && frozen
                    .must_not_have_choices
                    .iter()
                    .all(|id| !selected.contains(id))
        });
        if !still_valid {
            choice.locked_in_choice = None;
            choice.locked_in_options.clear();
        }
    }
}
