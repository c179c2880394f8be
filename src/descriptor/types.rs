//! Declaration types for the plugin descriptor.

use serde::{Deserialize, Serialize};

/// Kind of a data field attached to an action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataKind {
    /// Free text input.
    Text,
    /// Numeric input, optionally bounded.
    Number {
        /// Minimum accepted value.
        #[serde(skip_serializing_if = "Option::is_none")]
        min: Option<f64>,
        /// Maximum accepted value.
        #[serde(skip_serializing_if = "Option::is_none")]
        max: Option<f64>,
    },
    /// On/off toggle.
    Switch,
    /// Dropdown with a fixed set of values.
    Choice {
        /// Selectable values.
        choices: Vec<String>,
    },
    /// Color picker, value transported as `#AARRGGBB`.
    Color,
    /// File picker.
    File,
    /// Directory picker.
    Directory,
}

impl DataKind {
    /// Display name of the kind.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Text => "Text",
            Self::Number { .. } => "Number",
            Self::Switch => "Switch",
            Self::Choice { .. } => "Choice",
            Self::Color => "Color",
            Self::File => "File",
            Self::Directory => "Directory",
        }
    }
}

/// A typed named parameter of an action, supplied by the host at
/// invocation time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataField {
    /// Field identifier, unique within the owning action.
    pub id: String,
    /// Label shown in the host UI.
    pub label: String,
    /// Value kind.
    pub kind: DataKind,
    /// Default value offered by the host.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
}

impl DataField {
    /// A free-text field.
    pub fn text(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self { id: id.into(), label: label.into(), kind: DataKind::Text, default: None }
    }

    /// A numeric field.
    pub fn number(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            kind: DataKind::Number { min: None, max: None },
            default: None,
        }
    }

    /// An on/off field.
    pub fn switch(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self { id: id.into(), label: label.into(), kind: DataKind::Switch, default: None }
    }

    /// A dropdown field.
    pub fn choice(
        id: impl Into<String>,
        label: impl Into<String>,
        choices: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            kind: DataKind::Choice { choices: choices.into_iter().map(Into::into).collect() },
            default: None,
        }
    }

    /// Set the default value.
    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }
}

/// A host-invocable operation declared by the plugin.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Action {
    /// Action identifier, unique within the plugin.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Long description shown in the host UI.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Inline format string with `{$fieldId$}` placeholders.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    /// Whether the action supports press-and-hold invocation.
    #[serde(default)]
    pub holdable: bool,
    /// Data fields, in the order the host supplies them.
    #[serde(default)]
    pub data: Vec<DataField>,
}

impl Action {
    /// Create an action with the given id and display name.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: None,
            format: None,
            holdable: false,
            data: Vec::new(),
        }
    }

    /// Set the long description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the inline format string.
    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    /// Mark the action as holdable.
    pub fn holdable(mut self) -> Self {
        self.holdable = true;
        self
    }

    /// Append a data field.
    pub fn with_data(mut self, field: DataField) -> Self {
        self.data.push(field);
        self
    }
}

/// A named grouping of actions shown in the host UI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    /// Category identifier, unique within the plugin.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Path of the icon shown next to the category.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_path: Option<String>,
    /// Actions owned by this category.
    #[serde(default)]
    pub actions: Vec<Action>,
}

impl Category {
    /// Create a category with the given id and display name.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self { id: id.into(), name: name.into(), image_path: None, actions: Vec::new() }
    }

    /// Set the icon path.
    pub fn with_image(mut self, path: impl Into<String>) -> Self {
        self.image_path = Some(path.into());
        self
    }

    /// Append an action.
    pub fn with_action(mut self, action: Action) -> Self {
        self.actions.push(action);
        self
    }
}

/// A user-editable plugin setting declared up front; runtime values arrive
/// via info and settings messages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Setting {
    /// Setting name, unique within the plugin. Doubles as its identifier
    /// on the wire.
    pub name: String,
    /// Default value.
    pub default: String,
}

impl Setting {
    /// Create a setting.
    pub fn new(name: impl Into<String>, default: impl Into<String>) -> Self {
        Self { name: name.into(), default: default.into() }
    }
}
