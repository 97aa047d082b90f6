// ── Parent group configuration ──
//
// Built once at startup by the config crate and never mutated.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::channel::ChannelId;

/// Placeholder replaced by the 1-based index in a [`NameTemplate`].
pub const INDEX_PLACEHOLDER: &str = "{n}";

/// A name template such as `"Training {n}"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NameTemplate(String);

impl NameTemplate {
    /// Wrap a template string. Returns `None` if it has no `{n}` placeholder,
    /// since every rendered name would then collide.
    pub fn new(template: impl Into<String>) -> Option<Self> {
        let template = template.into();
        template.contains(INDEX_PLACEHOLDER).then_some(Self(template))
    }

    /// Render the name for 1-based position `index`.
    pub fn render(&self, index: usize) -> String {
        self.0.replace(INDEX_PLACEHOLDER, &index.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NameTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// How a group's channels are named.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum NamingMode {
    /// Pick the first configured name not already in use.
    RotatingPool { names: Vec<String> },
    /// Name channels `template(1)`, `template(2)`, … in server order.
    SequentialNumbered {
        template: NameTemplate,
        /// Upper bound on channels in the group; `None` is unbounded.
        max_channels: Option<usize>,
    },
}

/// One managed parent group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupConfig {
    /// Short label used in logs and CLI output (e.g. `"chat"`).
    pub label: String,
    pub parent: ChannelId,
    pub naming: NamingMode,
}

impl GroupConfig {
    pub fn rotating(label: impl Into<String>, parent: impl Into<ChannelId>, names: Vec<String>) -> Self {
        Self {
            label: label.into(),
            parent: parent.into(),
            naming: NamingMode::RotatingPool { names },
        }
    }

    pub fn sequential(
        label: impl Into<String>,
        parent: impl Into<ChannelId>,
        template: NameTemplate,
        max_channels: Option<usize>,
    ) -> Self {
        Self {
            label: label.into(),
            parent: parent.into(),
            naming: NamingMode::SequentialNumbered {
                template,
                max_channels,
            },
        }
    }

    pub fn is_sequential(&self) -> bool {
        matches!(self.naming, NamingMode::SequentialNumbered { .. })
    }
}
