use std::collections::HashSet;

use super::apply_rules;
use crate::rules::{PlanOption, TreeVersionRules};
use crate::tree::{Choice, Tree, TreeVersion};

/// What-if analysis for a toggle: which already-contracted choices would the
/// change disable? Clones the tree, clears contract history so rule
/// evaluation is unconstrained by it, simulates the toggle, reruns the
/// engine once, and reports every choice that is locked in on the caller's
/// tree but disabled in the simulation. Never mutates the caller's tree.
pub fn dependent_choices<'a>(
    tree: &'a Tree,
    rules: &TreeVersionRules,
    options: &[PlanOption],
    choice_id: u32,
) -> Vec<&'a Choice> {
    let mut simulation = tree.clone();
    clear_locked_state(&mut simulation.tree_version, rules, choice_id);

    let currently_selected = simulation
        .tree_version
        .find_choice(choice_id)
        .map(|choice| choice.quantity > 0)
        .unwrap_or(false);
    if currently_selected {
        simulate_selection(&mut simulation.tree_version, choice_id, 0);
    } else {
        simulate_selection(&mut simulation.tree_version, choice_id, 1);
    }

    apply_rules(&mut simulation, rules, options, None, &[]);

    tree.tree_version
        .choices()
        .filter(|original| original.locked_in_choice.is_some())
        .filter(|original| {
            simulation
                .tree_version
                .find_choice(original.id)
                .map(|simulated| !simulated.enabled)
                .unwrap_or(false)
        })
        .collect()
}

/// Clears the toggled choice's contract data, then transitively clears any
/// locked-in choice whose rules reference an already-cleared one: with the
/// anchor gone, its historical mapping is no longer reconstructible either.
fn clear_locked_state(tree: &mut TreeVersion, rules: &TreeVersionRules, choice_id: u32) {
    let mut cleared: HashSet<u32> = HashSet::new();
    if let Some(choice) = tree.find_choice_mut(choice_id) {
        cleared.insert(choice.id);
        cleared.insert(choice.div_choice_catalog_id);
        choice.locked_in_choice = None;
        choice.locked_in_options.clear();
    }

    loop {
        let next: Vec<u32> = tree
            .choices()
            .filter(|choice| choice.locked_in_choice.is_some())
            .filter(|choice| {
                rules
                    .choice_rules
                    .iter()
                    .filter(|rule_set| {
                        rule_set.choice_id == choice.id
                            || rule_set.choice_id == choice.div_choice_catalog_id
                    })
                    .flat_map(|rule_set| rule_set.rules.iter())
                    .any(|rule| rule.choices.iter().any(|id| cleared.contains(id)))
            })
            .map(|choice| choice.id)
            .collect();
        if next.is_empty() {
            break;
        }
        for id in next {
            if let Some(choice) = tree.find_choice_mut(id) {
                cleared.insert(choice.id);
                cleared.insert(choice.div_choice_catalog_id);
                choice.locked_in_choice = None;
                choice.locked_in_options.clear();
            }
        }
    }
}

/// Applies the toggle directly on the simulation, honoring Pick1/Pick0or1
/// exclusivity. Disabled flags are ignored here: contract history was just
/// cleared and the engine pass re-derives enablement from scratch.
fn simulate_selection(tree: &mut TreeVersion, choice_id: u32, quantity: u32) {
    let Some(point) = tree.point_containing_choice_mut(choice_id) else {
        return;
    };
    if quantity > 0 && point.pick_type.is_exclusive() {
        for sibling in point
            .choices
            .iter_mut()
            .filter(|sibling| sibling.id != choice_id)
        {
            sibling.quantity = 0;
        }
    }
    if let Some(choice) = point
        .choices
        .iter_mut()
        .find(|choice| choice.id == choice_id)
    {
        choice.quantity = quantity.min(choice.max_quantity.max(1));
    }
}
