pub mod form_view;
pub mod theme;
