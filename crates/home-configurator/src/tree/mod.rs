//! Hierarchical tree model the engine reads and mutates in place, plus the
//! navigation helpers and completion-status rollup built on it.

mod domain;
mod lookup;
pub mod status;

pub use domain::{
    AttachedOption, ChangeOrderChoiceData, Choice, CompletionStatus, DecisionPoint, Group,
    JobChoiceData, LockedInChoice, LockedInOption, LockedInSource, MappedGroup, PickType,
    SelectedAttribute, SubGroup, Tree, TreeError, TreeVersion,
};
pub use lookup::{max_sort_order_choice, refresh_cut_offs, select_choice, tree_price};
pub use status::{group_status, point_status, refresh_statuses, subgroup_status};
