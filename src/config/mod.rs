//! Settings model and its JSON persistence
//!
//! - **settings**: `ClickSettings`, validation and the flat file layout
//! - **store**: `ConfigStore`, tolerant load and atomic save

pub mod settings;
pub mod store;

pub use settings::ClickSettings;
pub use store::ConfigStore;
