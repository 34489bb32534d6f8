pub mod interaction;
pub mod visibility;

pub use interaction::{
    ExpansionState, SwitchLabels, expansion_state, find_owner, group_range, select_value,
    set_date_value, set_slider_value, set_switch_value, set_text_value, toggle_expansion,
};
pub use visibility::{VisibilityIndex, recompute_visibility, resolve_visible_position};
