use std::collections::{BTreeSet, HashSet};

use tracing::trace;

use super::option_rules::ActiveReassignment;
use crate::rules::PlanOption;
use crate::tree::{AttachedOption, MappedGroup, Tree};

/// Step 8: recompute each choice's mapped attribute/location groups from its
/// attached options (or its catalog groups when nothing is attached), apply
/// active attribute reassignments, union in a locked-in choice's contracted
/// groups, and prune selected attributes whose group is no longer offered.
pub(super) fn remap(tree: &mut Tree, reassignments: &[ActiveReassignment]) {
    let selected_sources: HashSet<u32> = reassignments
        .iter()
        .map(|reassignment| reassignment.from_choice_id)
        .filter(|&source_id| {
            tree.tree_version
                .find_choice(source_id)
                .map(|choice| choice.quantity > 0)
                .unwrap_or(false)
        })
        .collect();

    for choice in tree.tree_version.choices_mut() {
        let mut attribute_groups: Vec<MappedGroup> = Vec::new();
        let mut location_groups: Vec<MappedGroup> = Vec::new();

        if choice.options.is_empty() {
            attribute_groups.extend(choice.attribute_groups.iter().copied().map(MappedGroup::catalog));
            location_groups.extend(choice.location_groups.iter().copied().map(MappedGroup::catalog));
        } else {
            for attached in &choice.options {
                for &group_id in &attached.attribute_groups {
                    if !attribute_groups.iter().any(|group| group.id == group_id) {
                        attribute_groups.push(MappedGroup::catalog(group_id));
                    }
                }
                for &group_id in &attached.location_groups {
                    if !location_groups.iter().any(|group| group.id == group_id) {
                        location_groups.push(MappedGroup::catalog(group_id));
                    }
                }
            }
        }

        // Groups this choice's own option mapping handed to another choice.
        attribute_groups.retain(|group| {
            !reassignments.iter().any(|reassignment| {
                reassignment.from_choice_id == choice.id
                    && reassignment.attribute_group_id == group.id
            })
        });

        // Groups handed to this choice from a selected carrier, referenced by
        // tree id or by the catalog identity a lock-in preserves.
        for reassignment in reassignments {
            let targets_this = reassignment.to_choice_id == choice.id
                || reassignment.to_choice_id == choice.div_choice_catalog_id;
            if targets_this
                && selected_sources.contains(&reassignment.from_choice_id)
                && !attribute_groups
                    .iter()
                    .any(|group| group.id == reassignment.attribute_group_id)
            {
                attribute_groups.push(MappedGroup {
                    id: reassignment.attribute_group_id,
                    reassigned_from_choice_id: Some(reassignment.from_choice_id),
                });
            }
        }

        if let Some(locked) = &choice.locked_in_choice {
            for &group_id in &locked.attribute_groups {
                if !attribute_groups.iter().any(|group| group.id == group_id) {
                    attribute_groups.push(MappedGroup::catalog(group_id));
                }
            }
            for &group_id in &locked.location_groups {
                if !location_groups.iter().any(|group| group.id == group_id) {
                    location_groups.push(MappedGroup::catalog(group_id));
                }
            }
        }

        choice.mapped_attribute_groups = attribute_groups;
        choice.mapped_location_groups = location_groups;

        let mapped_attribute_ids: HashSet<u32> = choice
            .mapped_attribute_groups
            .iter()
            .map(|group| group.id)
            .collect();
        let mapped_location_ids: HashSet<u32> = choice
            .mapped_location_groups
            .iter()
            .map(|group| group.id)
            .collect();
        choice.selected_attributes.retain(|selected| {
            let attribute_ok = selected
                .attribute_group_id
                .map(|id| mapped_attribute_ids.contains(&id))
                .unwrap_or(true);
            let location_ok = selected
                .location_group_id
                .map(|id| mapped_location_ids.contains(&id))
                .unwrap_or(true);
            attribute_ok && location_ok
        });
    }
}

/// Step 9: a locked-in choice whose attached options drifted from the frozen
/// contract mapping gets the frozen set reattached and flags the change, so
/// the UI can warn that availability moved since contract.
pub(super) fn detect_mapping_changes(tree: &mut Tree, options: &[PlanOption]) {
    let locked_ids: Vec<u32> = tree
        .tree_version
        .choices()
        .filter(|choice| choice.locked_in_choice.is_some() && !choice.locked_in_options.is_empty())
        .map(|choice| choice.id)
        .collect();

    for locked_id in locked_ids {
        let Some(locked_choice) = tree.tree_version.find_choice(locked_id) else {
            continue;
        };
        let current_keys: BTreeSet<String> = locked_choice
            .options
            .iter()
            .map(|attached| attached.integration_key.clone())
            .collect();
        let frozen = locked_choice.locked_in_options.clone();
        let frozen_keys: BTreeSet<String> = frozen
            .iter()
            .map(|frozen_option| frozen_option.integration_key.clone())
            .collect();
        if current_keys == frozen_keys {
            continue;
        }

        // The contract's options may have drifted onto other choices; pull
        // them back and remember who carried them.
        let mut dependents: Vec<u32> = Vec::new();
        for key in &frozen_keys {
            let carrier_id = tree
                .tree_version
                .choices()
                .find(|choice| {
                    choice.id != locked_id
                        && choice
                            .options
                            .iter()
                            .any(|attached| &attached.integration_key == key)
                })
                .map(|choice| choice.id);
            let Some(carrier_id) = carrier_id else {
                continue;
            };
            dependents.push(carrier_id);
            if let Some(carrier) = tree.tree_version.find_choice_mut(carrier_id) {
                if let Some(position) = carrier
                    .options
                    .iter()
                    .position(|attached| &attached.integration_key == key)
                {
                    let removed = carrier.options.remove(position);
                    carrier.price -= removed.calculated_price;
                }
            }
        }

        if let Some(choice) = tree.tree_version.find_choice_mut(locked_id) {
            let mut kept = Vec::new();
            for attached in std::mem::take(&mut choice.options) {
                if frozen_keys.contains(&attached.integration_key) {
                    kept.push(attached);
                } else {
                    choice.price -= attached.calculated_price;
                }
            }
            choice.options = kept;

            for frozen_option in &frozen {
                let already_attached = choice
                    .options
                    .iter()
                    .any(|attached| attached.integration_key == frozen_option.integration_key);
                if already_attached {
                    continue;
                }
                let catalog = options
                    .iter()
                    .find(|candidate| candidate.integration_key == frozen_option.integration_key);
                choice.options.push(AttachedOption {
                    integration_key: frozen_option.integration_key.clone(),
                    list_price: frozen_option.list_price,
                    calculated_price: frozen_option.list_price,
                    max_order_quantity: catalog.map(|option| option.max_order_quantity).unwrap_or(1),
                    attribute_groups: catalog
                        .map(|option| option.attribute_groups.clone())
                        .unwrap_or_default(),
                    location_groups: catalog
                        .map(|option| option.location_groups.clone())
                        .unwrap_or_default(),
                    is_base_house: catalog.map(|option| option.is_base_house).unwrap_or(false),
                });
                choice.price += frozen_option.list_price;
            }
            choice.mapping_changed = true;
        }
        trace!(choice = locked_id, "locked-in option mapping changed");

        let (exclusive, sibling_ids) = match tree.tree_version.point_containing_choice(locked_id) {
            Some(point) => (
                point.pick_type.is_exclusive(),
                point
                    .choices
                    .iter()
                    .filter(|choice| choice.id != locked_id)
                    .map(|choice| choice.id)
                    .collect::<Vec<_>>(),
            ),
            None => (false, Vec::new()),
        };

        let marker_targets = if exclusive { sibling_ids } else { dependents };
        for target_id in marker_targets {
            if let Some(target) = tree.tree_version.find_choice_mut(target_id) {
                if !target.changed_dependent_choice_ids.contains(&locked_id) {
                    target.changed_dependent_choice_ids.push(locked_id);
                }
            }
        }
    }
}
