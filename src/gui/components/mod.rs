pub mod click_options;
pub mod repeat;
pub mod settings_panel;
pub mod target;
