//! Descriptor assembly and validation.
//!
//! Replaces the annotation scanning of classic host SDKs with an explicit
//! registration step: the descriptor table is built once at startup, keyed
//! by stable identifiers, and is immutable afterwards.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::types::{Action, Category, Setting};

/// Errors raised while assembling a descriptor.
#[derive(Debug, Error)]
pub enum DescriptorError {
    /// Two categories declared the same identifier.
    #[error("Duplicate category id: {0}")]
    DuplicateCategory(String),

    /// Two actions declared the same identifier.
    #[error("Duplicate action id: {0}")]
    DuplicateAction(String),

    /// Two data fields of one action declared the same identifier.
    #[error("Duplicate data field id '{field}' on action '{action}'")]
    DuplicateDataField { action: String, field: String },

    /// Two settings declared the same name.
    #[error("Duplicate setting name: {0}")]
    DuplicateSetting(String),

    /// A mandatory identifier was left empty.
    #[error("Empty identifier for {0}")]
    EmptyIdentifier(&'static str),
}

/// The complete declared metadata of a plugin.
///
/// Identifiers are validated unique at build time and fixed afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginDescriptor {
    /// Plugin identifier used in the pairing handshake.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Plugin version code.
    pub version: i64,
    /// UI color in dark mode, `#RRGGBB`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color_dark: Option<String>,
    /// UI color in light mode, `#RRGGBB`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color_light: Option<String>,
    /// Declared categories with their actions.
    pub categories: Vec<Category>,
    /// Declared settings.
    #[serde(default)]
    pub settings: Vec<Setting>,
}

impl PluginDescriptor {
    /// Start building a descriptor.
    pub fn builder(id: impl Into<String>, name: impl Into<String>) -> DescriptorBuilder {
        DescriptorBuilder {
            id: id.into(),
            name: name.into(),
            version: 1,
            color_dark: None,
            color_light: None,
            categories: Vec::new(),
            settings: Vec::new(),
        }
    }

    /// Look up an action by id across all categories.
    pub fn action(&self, action_id: &str) -> Option<&Action> {
        self.categories.iter().flat_map(|c| c.actions.iter()).find(|a| a.id == action_id)
    }

    /// Whether an action with this id is declared.
    pub fn has_action(&self, action_id: &str) -> bool {
        self.action(action_id).is_some()
    }

    /// All declared action ids.
    pub fn action_ids(&self) -> impl Iterator<Item = &str> {
        self.categories.iter().flat_map(|c| c.actions.iter()).map(|a| a.id.as_str())
    }

    /// Declared default values of all settings, keyed by name.
    pub fn default_settings(&self) -> HashMap<String, String> {
        self.settings.iter().map(|s| (s.name.clone(), s.default.clone())).collect()
    }
}

/// Builder for [`PluginDescriptor`].
#[derive(Debug)]
pub struct DescriptorBuilder {
    id: String,
    name: String,
    version: i64,
    color_dark: Option<String>,
    color_light: Option<String>,
    categories: Vec<Category>,
    settings: Vec<Setting>,
}

impl DescriptorBuilder {
    /// Set the plugin version code.
    pub fn version(mut self, version: i64) -> Self {
        self.version = version;
        self
    }

    /// Set the dark and light UI colors.
    pub fn colors(mut self, dark: impl Into<String>, light: impl Into<String>) -> Self {
        self.color_dark = Some(dark.into());
        self.color_light = Some(light.into());
        self
    }

    /// Declare a category and its actions.
    pub fn category(mut self, category: Category) -> Self {
        self.categories.push(category);
        self
    }

    /// Declare a setting.
    pub fn setting(mut self, setting: Setting) -> Self {
        self.settings.push(setting);
        self
    }

    /// Validate identifiers and produce the immutable descriptor.
    pub fn build(self) -> Result<PluginDescriptor, DescriptorError> {
        if self.id.is_empty() {
            return Err(DescriptorError::EmptyIdentifier("plugin"));
        }

        let mut category_ids = HashSet::new();
        let mut action_ids = HashSet::new();
        for category in &self.categories {
            if category.id.is_empty() {
                return Err(DescriptorError::EmptyIdentifier("category"));
            }
            if !category_ids.insert(category.id.as_str()) {
                return Err(DescriptorError::DuplicateCategory(category.id.clone()));
            }
            for action in &category.actions {
                if action.id.is_empty() {
                    return Err(DescriptorError::EmptyIdentifier("action"));
                }
                if !action_ids.insert(action.id.as_str()) {
                    return Err(DescriptorError::DuplicateAction(action.id.clone()));
                }
                let mut field_ids = HashSet::new();
                for field in &action.data {
                    if !field_ids.insert(field.id.as_str()) {
                        return Err(DescriptorError::DuplicateDataField {
                            action: action.id.clone(),
                            field: field.id.clone(),
                        });
                    }
                }
            }
        }

        let mut setting_names = HashSet::new();
        for setting in &self.settings {
            if !setting_names.insert(setting.name.as_str()) {
                return Err(DescriptorError::DuplicateSetting(setting.name.clone()));
            }
        }

        Ok(PluginDescriptor {
            id: self.id,
            name: self.name,
            version: self.version,
            color_dark: self.color_dark,
            color_light: self.color_light,
            categories: self.categories,
            settings: self.settings,
        })
    }
}
