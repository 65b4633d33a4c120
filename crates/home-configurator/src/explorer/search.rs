use std::collections::{HashMap, HashSet};

use crate::rules::{ChoiceRule, PointRule, RuleType, TreeVersionRules};
use crate::tree::TreeVersion;

/// Depth-first backtracking over every boolean assignment of the closure
/// set. A partial assignment is abandoned as soon as it is definitely
/// illegal: an exclusive point with two selections, or a rule set whose
/// every branch is already violated by decided references. Choices outside
/// the closure sit at the deselected baseline throughout, so by the time an
/// assignment completes, every constraint is fully decided and the surviving
/// set matches what full enumeration plus filtering would produce.
pub(super) fn for_each_legal_assignment<F>(
    tree: &TreeVersion,
    rules: &TreeVersionRules,
    closure: &[u32],
    mut visit: F,
) where
    F: FnMut(&HashMap<u32, bool>),
{
    let closure_set: HashSet<u32> = closure.iter().copied().collect();
    let mut point_of: HashMap<u32, u32> = HashMap::new();
    let mut exclusive_points: HashSet<u32> = HashSet::new();
    for point in tree.points() {
        if point.pick_type.is_exclusive() {
            exclusive_points.insert(point.id);
        }
        for choice in &point.choices {
            point_of.insert(choice.id, point.id);
        }
    }

    let context = SearchContext {
        tree,
        rules,
        closure_set,
        point_of,
        exclusive_points,
    };
    let mut assignment = HashMap::new();
    recurse(&context, closure, 0, &mut assignment, &mut visit);
}

struct SearchContext<'a> {
    tree: &'a TreeVersion,
    rules: &'a TreeVersionRules,
    closure_set: HashSet<u32>,
    point_of: HashMap<u32, u32>,
    exclusive_points: HashSet<u32>,
}

#[derive(Clone, Copy, PartialEq)]
enum RefState {
    Missing,
    Decided(bool),
    Undecided,
}

fn recurse<F>(
    context: &SearchContext<'_>,
    closure: &[u32],
    index: usize,
    assignment: &mut HashMap<u32, bool>,
    visit: &mut F,
) where
    F: FnMut(&HashMap<u32, bool>),
{
    if definitely_illegal(context, assignment) {
        return;
    }
    if index == closure.len() {
        visit(assignment);
        return;
    }

    let id = closure[index];
    assignment.insert(id, false);
    recurse(context, closure, index + 1, assignment, visit);

    if !exclusivity_violated(context, assignment, id) {
        assignment.insert(id, true);
        recurse(context, closure, index + 1, assignment, visit);
    }
    assignment.remove(&id);
}

/// Selecting `id` breaks a Pick1/Pick0or1 point already holding a selection.
fn exclusivity_violated(
    context: &SearchContext<'_>,
    assignment: &HashMap<u32, bool>,
    id: u32,
) -> bool {
    let Some(point_id) = context.point_of.get(&id) else {
        return false;
    };
    if !context.exclusive_points.contains(point_id) {
        return false;
    }
    assignment.iter().any(|(&other, &selected)| {
        other != id && selected && context.point_of.get(&other) == Some(point_id)
    })
}

fn definitely_illegal(context: &SearchContext<'_>, assignment: &HashMap<u32, bool>) -> bool {
    for (&id, &selected) in assignment {
        if !selected {
            continue;
        }
        let Some(choice) = context.tree.find_choice(id) else {
            continue;
        };
        let catalog_id = choice.div_choice_catalog_id;

        let choice_rule_sets = context
            .rules
            .choice_rules
            .iter()
            .filter(|rule_set| rule_set.choice_id == id || rule_set.choice_id == catalog_id);
        for rule_set in choice_rule_sets {
            if !rule_set.rules.is_empty()
                && rule_set
                    .rules
                    .iter()
                    .all(|rule| choice_branch_violated(context, assignment, rule))
            {
                return true;
            }
        }

        let Some(&point_id) = context.point_of.get(&id) else {
            continue;
        };
        let Some(point) = context.tree.find_point(point_id) else {
            continue;
        };
        let point_rule_sets = context.rules.point_rules.iter().filter(|rule_set| {
            rule_set.point_id == point.id || rule_set.point_id == point.div_point_catalog_id
        });
        for rule_set in point_rule_sets {
            if !rule_set.rules.is_empty()
                && rule_set
                    .rules
                    .iter()
                    .all(|rule| point_branch_violated(context, assignment, rule))
            {
                return true;
            }
        }
    }
    false
}

fn choice_ref_state(
    context: &SearchContext<'_>,
    assignment: &HashMap<u32, bool>,
    raw_id: u32,
) -> RefState {
    match context.tree.find_choice_by_any_id(raw_id) {
        None => RefState::Missing,
        Some(choice) => match assignment.get(&choice.id) {
            Some(&selected) => RefState::Decided(selected),
            None if !context.closure_set.contains(&choice.id) => RefState::Decided(false),
            None => RefState::Undecided,
        },
    }
}

/// Whether the referenced point is completed (something inside selected)
/// under the partial assignment.
fn point_ref_state(
    context: &SearchContext<'_>,
    assignment: &HashMap<u32, bool>,
    point_id: u32,
) -> RefState {
    let Some(point) = context.tree.find_point(point_id) else {
        return RefState::Missing;
    };
    let mut undecided = false;
    for choice in &point.choices {
        match assignment.get(&choice.id) {
            Some(true) => return RefState::Decided(true),
            Some(false) => {}
            None if !context.closure_set.contains(&choice.id) => {}
            None => undecided = true,
        }
    }
    if undecided {
        RefState::Undecided
    } else {
        RefState::Decided(false)
    }
}

fn choice_branch_violated(
    context: &SearchContext<'_>,
    assignment: &HashMap<u32, bool>,
    rule: &ChoiceRule,
) -> bool {
    let failing = match rule.rule_type {
        RuleType::MustHave => RefState::Decided(false),
        RuleType::MustNotHave => RefState::Decided(true),
    };
    rule.choices.iter().any(|&raw_id| {
        let state = choice_ref_state(context, assignment, raw_id);
        state == RefState::Missing || state == failing
    })
}

fn point_branch_violated(
    context: &SearchContext<'_>,
    assignment: &HashMap<u32, bool>,
    rule: &PointRule,
) -> bool {
    let failing = match rule.rule_type {
        RuleType::MustHave => RefState::Decided(false),
        RuleType::MustNotHave => RefState::Decided(true),
    };
    let choice_failed = rule.choices.iter().any(|&raw_id| {
        let state = choice_ref_state(context, assignment, raw_id);
        state == RefState::Missing || state == failing
    });
    let point_failed = rule.points.iter().any(|&raw_id| {
        let state = point_ref_state(context, assignment, raw_id);
        state == RefState::Missing || state == failing
    });
    choice_failed || point_failed
}
