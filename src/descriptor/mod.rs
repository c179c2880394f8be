//! Declared plugin metadata.
//!
//! Categories, actions, and data fields are registered explicitly through
//! [`PluginDescriptor::builder`] at startup. Identifiers are unique within a
//! plugin and fixed once the descriptor is built; dispatch looks actions up
//! in this table.

mod builder;
mod types;

pub use builder::{DescriptorBuilder, DescriptorError, PluginDescriptor};
pub use types::{Action, Category, DataField, DataKind, Setting};
