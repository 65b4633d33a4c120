use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::rules::{ChoiceRuleSet, PointRuleSet};

/// Cardinality constraint on a decision point's selectable choices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PickType {
    Pick1,
    Pick0or1,
    Pick1orMore,
    Pick0orMore,
}

impl PickType {
    /// At most one contained choice may be selected.
    pub const fn is_exclusive(self) -> bool {
        matches!(self, Self::Pick1 | Self::Pick0or1)
    }

    /// The point is incomplete until something is selected.
    pub const fn requires_selection(self) -> bool {
        matches!(self, Self::Pick1 | Self::Pick1orMore)
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Pick1 => "Pick 1",
            Self::Pick0or1 => "Pick 0 or 1",
            Self::Pick1orMore => "Pick 1 or more",
            Self::Pick0orMore => "Pick 0 or more",
        }
    }
}

/// Derived completion state for points, subgroups, and groups, ordered most
/// restrictive first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionStatus {
    Conflicted,
    Required,
    PartiallyCompleted,
    Completed,
    Viewed,
    Unviewed,
}

impl CompletionStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Conflicted => "Conflicted",
            Self::Required => "Required",
            Self::PartiallyCompleted => "Partially Completed",
            Self::Completed => "Completed",
            Self::Viewed => "Viewed",
            Self::Unviewed => "Unviewed",
        }
    }
}

/// A configurable home catalog snapshot for one scenario session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tree {
    pub tree_version: TreeVersion,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeVersion {
    pub id: u32,
    pub plan_id: Option<u32>,
    pub name: String,
    pub groups: Vec<Group>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub id: u32,
    pub sort_order: i32,
    pub label: String,
    pub status: CompletionStatus,
    pub sub_groups: Vec<SubGroup>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubGroup {
    pub id: u32,
    pub sort_order: i32,
    pub label: String,
    pub status: CompletionStatus,
    pub points: Vec<DecisionPoint>,
}

/// A decision the buyer makes: one slot in the tree holding the competing
/// choices, with the pick type bounding how many may be taken.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionPoint {
    pub id: u32,
    pub div_point_catalog_id: u32,
    pub tree_version_id: u32,
    pub sort_order: i32,
    pub label: String,
    pub pick_type: PickType,
    pub is_structural_item: bool,
    pub enabled: bool,
    pub completed: bool,
    pub viewed: bool,
    pub disabled_by: Vec<PointRuleSet>,
    pub price: f64,
    pub cut_off_date: Option<NaiveDate>,
    pub is_past_cut_off: bool,
    pub status: CompletionStatus,
    pub choices: Vec<Choice>,
}

impl DecisionPoint {
    pub fn new(
        id: u32,
        div_point_catalog_id: u32,
        tree_version_id: u32,
        sort_order: i32,
        label: impl Into<String>,
        pick_type: PickType,
    ) -> Self {
        Self {
            id,
            div_point_catalog_id,
            tree_version_id,
            sort_order,
            label: label.into(),
            pick_type,
            is_structural_item: false,
            enabled: true,
            completed: false,
            viewed: false,
            disabled_by: Vec::new(),
            price: 0.0,
            cut_off_date: None,
            is_past_cut_off: false,
            status: CompletionStatus::Unviewed,
            choices: Vec::new(),
        }
    }

    /// A point is complete when it is enabled and something inside is selected.
    pub fn has_selection(&self) -> bool {
        self.choices.iter().any(|choice| choice.quantity > 0)
    }
}

/// One selectable item under a decision point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Choice {
    /// Tree-instance identity, scoped to one published tree version.
    pub id: u32,
    /// Catalog identity, stable across tree republishing.
    pub div_choice_catalog_id: u32,
    pub tree_version_id: u32,
    pub sort_order: i32,
    pub label: String,
    /// 0 = not selected; >0 = selected, possibly multi-unit up to `max_quantity`.
    pub quantity: u32,
    pub max_quantity: u32,
    pub choice_max_quantity: Option<u32>,
    /// Computed each pass, attributable to the attached options.
    pub price: f64,
    pub enabled: bool,
    pub is_selectable: bool,
    pub is_required: bool,
    pub options: Vec<AttachedOption>,
    /// Catalog-declared groups, before rule evaluation.
    pub attribute_groups: Vec<u32>,
    pub location_groups: Vec<u32>,
    /// Post-rule groups the UI may actually offer.
    pub mapped_attribute_groups: Vec<MappedGroup>,
    pub mapped_location_groups: Vec<MappedGroup>,
    pub selected_attributes: Vec<SelectedAttribute>,
    pub disabled_by: Vec<ChoiceRuleSet>,
    pub locked_in_choice: Option<LockedInChoice>,
    pub locked_in_options: Vec<LockedInOption>,
    /// Choices whose option mapping changed as a side effect of this one.
    pub changed_dependent_choice_ids: Vec<u32>,
    pub mapping_changed: bool,
}

impl Choice {
    pub fn new(
        id: u32,
        div_choice_catalog_id: u32,
        tree_version_id: u32,
        sort_order: i32,
        label: impl Into<String>,
    ) -> Self {
        Self {
            id,
            div_choice_catalog_id,
            tree_version_id,
            sort_order,
            label: label.into(),
            quantity: 0,
            max_quantity: 1,
            choice_max_quantity: None,
            price: 0.0,
            enabled: true,
            is_selectable: true,
            is_required: false,
            options: Vec::new(),
            attribute_groups: Vec::new(),
            location_groups: Vec::new(),
            mapped_attribute_groups: Vec::new(),
            mapped_location_groups: Vec::new(),
            selected_attributes: Vec::new(),
            disabled_by: Vec::new(),
            locked_in_choice: None,
            locked_in_options: Vec::new(),
            changed_dependent_choice_ids: Vec::new(),
            mapping_changed: false,
        }
    }

    pub fn is_selected(&self) -> bool {
        self.quantity > 0
    }

    /// Every mapped attribute/location group has a selected attribute entry.
    pub fn attributes_complete(&self) -> bool {
        let attrs_covered = self.mapped_attribute_groups.iter().all(|group| {
            self.selected_attributes
                .iter()
                .any(|selected| selected.attribute_group_id == Some(group.id))
        });
        let locations_covered = self.mapped_location_groups.iter().all(|group| {
            self.selected_attributes
                .iter()
                .any(|selected| selected.location_group_id == Some(group.id))
        });
        attrs_covered && locations_covered
    }
}

/// Attribute or location group offered on a choice after rule evaluation,
/// with reassignment provenance when another choice's option moved it here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappedGroup {
    pub id: u32,
    pub reassigned_from_choice_id: Option<u32>,
}

impl MappedGroup {
    pub fn catalog(id: u32) -> Self {
        Self {
            id,
            reassigned_from_choice_id: None,
        }
    }
}

/// A buyer's attribute or location pick within a mapped group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectedAttribute {
    pub attribute_group_id: Option<u32>,
    pub location_group_id: Option<u32>,
    pub attribute_id: Option<u32>,
    pub location_id: Option<u32>,
    pub quantity: u32,
}

/// Per-attachment snapshot of a catalog option taken when a rule attaches it
/// to a choice; `calculated_price` carries replacement deltas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttachedOption {
    pub integration_key: String,
    pub list_price: f64,
    pub calculated_price: f64,
    pub max_order_quantity: u32,
    pub attribute_groups: Vec<u32>,
    pub location_groups: Vec<u32>,
    pub is_base_house: bool,
}

/// Contract data for a choice already purchased via a signed job or an
/// approved change order. The historical selection is authoritative even if
/// current rules would disable it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LockedInChoice {
    pub source: LockedInSource,
    pub quantity: u32,
    pub price: f64,
    /// Groups recorded at time of original purchase.
    pub attribute_groups: Vec<u32>,
    pub location_groups: Vec<u32>,
}

/// Where a locked-in choice was contracted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LockedInSource {
    Job(JobChoiceData),
    ChangeOrder(ChangeOrderChoiceData),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobChoiceData {
    pub job_id: u32,
    pub job_choice_id: u32,
    pub signed_on: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeOrderChoiceData {
    pub change_order_id: u32,
    pub change_order_choice_id: u32,
    pub approved_on: Option<NaiveDate>,
}

/// Frozen historical option-to-choice mapping for a locked-in choice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LockedInOption {
    pub integration_key: String,
    /// Catalog id of the choice that carried the option at contract time.
    pub div_choice_catalog_id: u32,
    pub list_price: f64,
    pub must_have_choices: Vec<u32>,
    pub must_not_have_choices: Vec<u32>,
}

/// Error raised by tree navigation and selection helpers.
#[derive(Debug, thiserror::Error)]
pub enum TreeError {
    #[error("choice {0} not found in tree")]
    ChoiceNotFound(u32),
    #[error("choice {0} is disabled and cannot be selected")]
    ChoiceDisabled(u32),
}
