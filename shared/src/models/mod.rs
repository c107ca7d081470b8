//! Data models
//!
//! Shared between jerk-server and its clients (via API).
//! Wire format is camelCase JSON, timestamps are Unix millis.

pub mod food_item;
pub mod location;
pub mod order;
pub mod user_settings;

// Re-exports
pub use food_item::*;
pub use location::*;
pub use order::*;
pub use user_settings::*;
