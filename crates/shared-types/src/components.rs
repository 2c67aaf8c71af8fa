//! # Message Components
//!
//! The interactive pieces a message can carry: buttons (actionable or link)
//! and single-choice selection menus, plus the outgoing message body that
//! bundles them.

use serde::{Deserialize, Serialize};

/// Wire identifier of a component (the platform's `custom_id`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ComponentId(pub String);

impl ComponentId {
    /// Create a component id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw id.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ComponentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Button styles. `Link` buttons open a URL and never produce an interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ButtonStyle {
    Primary,
    Secondary,
    Success,
    Danger,
    Link,
}

/// A single button.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Button {
    pub id: ComponentId,
    pub label: String,
    pub style: ButtonStyle,
    pub disabled: bool,
    /// Target for link buttons.
    pub url: Option<String>,
}

impl Button {
    /// Create an enabled button.
    pub fn new(id: impl Into<String>, label: impl Into<String>, style: ButtonStyle) -> Self {
        Self {
            id: ComponentId::new(id),
            label: label.into(),
            style,
            disabled: false,
            url: None,
        }
    }

    /// Create a link button.
    pub fn link(id: impl Into<String>, label: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: ComponentId::new(id),
            label: label.into(),
            style: ButtonStyle::Link,
            disabled: false,
            url: Some(url.into()),
        }
    }

    /// Same button, with the given disabled state.
    #[must_use]
    pub fn with_disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    /// Whether clicking this button produces an interaction event.
    pub fn is_actionable(&self) -> bool {
        self.style != ButtonStyle::Link
    }
}

/// One entry of a selection menu.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectOption {
    /// Value reported back when this option is selected.
    pub value: String,
    pub label: String,
    pub description: Option<String>,
}

impl SelectOption {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
            description: None,
        }
    }
}

/// A selection (dropdown) menu.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectMenu {
    pub id: ComponentId,
    pub placeholder: Option<String>,
    pub options: Vec<SelectOption>,
    pub disabled: bool,
}

/// Any component that can be attached to a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Component {
    Button(Button),
    Select(SelectMenu),
}

impl Component {
    /// The component's wire id.
    pub fn id(&self) -> &ComponentId {
        match self {
            Component::Button(b) => &b.id,
            Component::Select(s) => &s.id,
        }
    }

    /// Copy of this component with interaction disabled.
    #[must_use]
    pub fn disabled(&self) -> Self {
        match self {
            Component::Button(b) => Component::Button(b.clone().with_disabled(true)),
            Component::Select(s) => Component::Select(SelectMenu {
                disabled: true,
                ..s.clone()
            }),
        }
    }
}

/// Maximum components per action row on the platform.
pub const MAX_ROW_COMPONENTS: usize = 5;

/// A message about to be sent or used to replace an existing one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutgoingMessage {
    pub content: String,
    /// Rows of components, at most `MAX_ROW_COMPONENTS` per row.
    pub rows: Vec<Vec<Component>>,
}

impl OutgoingMessage {
    /// Plain text message.
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            rows: Vec::new(),
        }
    }

    /// Text message with components laid out in rows of five.
    pub fn with_components(content: impl Into<String>, components: Vec<Component>) -> Self {
        Self {
            content: content.into(),
            rows: layout_rows(components),
        }
    }

    /// All components across rows.
    pub fn components(&self) -> impl Iterator<Item = &Component> {
        self.rows.iter().flatten()
    }
}

/// Split components into platform-sized action rows.
///
/// Selection menus always take a full row.
pub fn layout_rows(components: Vec<Component>) -> Vec<Vec<Component>> {
    let mut rows: Vec<Vec<Component>> = Vec::new();
    let mut current: Vec<Component> = Vec::new();
    for component in components {
        match component {
            Component::Select(_) => {
                if !current.is_empty() {
                    rows.push(std::mem::take(&mut current));
                }
                rows.push(vec![component]);
            }
            Component::Button(_) => {
                current.push(component);
                if current.len() == MAX_ROW_COMPONENTS {
                    rows.push(std::mem::take(&mut current));
                }
            }
        }
    }
    if !current.is_empty() {
        rows.push(current);
    }
    rows
}
