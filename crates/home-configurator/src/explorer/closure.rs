use std::collections::HashSet;

use crate::rules::TreeVersionRules;
use crate::tree::{max_sort_order_choice, TreeVersion};

/// The transitive set of choices whose selection state can affect the
/// subject's eligibility or price: everything referenced by its choice
/// rules, by point rules on its point, or co-present in an option mapping it
/// pivots, followed depth-first with a visited-set cycle guard. The subject
/// itself is excluded; ids are returned in tree-id space, sorted for a
/// deterministic enumeration order.
pub fn relevant_choices(
    tree: &TreeVersion,
    rules: &TreeVersionRules,
    subject_id: u32,
) -> Vec<u32> {
    let mut visited: HashSet<u32> = HashSet::new();
    let mut stack = vec![subject_id];

    while let Some(id) = stack.pop() {
        if !visited.insert(id) {
            continue;
        }
        collect_direct(tree, rules, id, &mut stack);
    }

    visited.remove(&subject_id);
    let mut closure: Vec<u32> = visited.into_iter().collect();
    closure.sort_unstable();
    closure
}

fn collect_direct(tree: &TreeVersion, rules: &TreeVersionRules, id: u32, stack: &mut Vec<u32>) {
    let Some(choice) = tree.find_choice(id) else {
        return;
    };
    let catalog_id = choice.div_choice_catalog_id;

    let choice_rule_sets = rules
        .choice_rules
        .iter()
        .filter(|rule_set| rule_set.choice_id == id || rule_set.choice_id == catalog_id);
    for rule_set in choice_rule_sets {
        for rule in &rule_set.rules {
            for &referenced in &rule.choices {
                if let Some(referenced_choice) = tree.find_choice_by_any_id(referenced) {
                    stack.push(referenced_choice.id);
                }
            }
        }
    }

    if let Some(point) = tree.point_containing_choice(id) {
        let point_rule_sets = rules.point_rules.iter().filter(|rule_set| {
            rule_set.point_id == point.id || rule_set.point_id == point.div_point_catalog_id
        });
        for rule_set in point_rule_sets {
            for rule in &rule_set.rules {
                for &referenced in &rule.choices {
                    if let Some(referenced_choice) = tree.find_choice_by_any_id(referenced) {
                        stack.push(referenced_choice.id);
                    }
                }
                for &referenced_point in &rule.points {
                    if let Some(referenced) = tree.find_point(referenced_point) {
                        stack.extend(referenced.choices.iter().map(|choice| choice.id));
                    }
                }
            }
        }
    }

    for option_rule in &rules.option_rules {
        for mapping in &option_rule.option_mappings {
            let must_have: Vec<u32> = mapping
                .choices
                .iter()
                .filter(|mapping_choice| mapping_choice.must_have)
                .map(|mapping_choice| mapping_choice.id)
                .collect();
            let pivots_here = max_sort_order_choice(tree, &must_have)
                .map(|pivot| pivot.id == id)
                .unwrap_or(false);
            if !pivots_here {
                continue;
            }
            for mapping_choice in &mapping.choices {
                if let Some(member) = tree.find_choice_by_any_id(mapping_choice.id) {
                    if member.id != id {
                        stack.push(member.id);
                    }
                }
            }
        }
    }
}
