pub mod components;
pub mod constants;
pub mod manager;
mod overlays;

pub use manager::{run_gui, GuiOptions};
