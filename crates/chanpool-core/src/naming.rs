// ── Channel name selection ──
//
// Rotating groups draw from a fixed candidate list; sequential groups
// render their template. Rotating pools can run dry, in which case a
// UUID stands in so creation never stalls for want of a name.

use uuid::Uuid;

use crate::model::{GroupConfig, NamingMode};

/// The outcome of [`NameRegistry::next_name`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameChoice {
    /// A configured (or templated) name.
    Pooled(String),
    /// Every candidate was in use; a generated unique name.
    Fallback(String),
}

impl NameChoice {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Pooled(name) | Self::Fallback(name) => name,
        }
    }

    pub fn into_string(self) -> String {
        match self {
            Self::Pooled(name) | Self::Fallback(name) => name,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback(_))
    }
}

/// Name pool for a single parent group.
#[derive(Debug, Clone, Copy)]
pub struct NameRegistry<'a> {
    naming: &'a NamingMode,
}

impl<'a> NameRegistry<'a> {
    pub fn new(group: &'a GroupConfig) -> Self {
        Self {
            naming: &group.naming,
        }
    }

    /// Capacity used by the over-provisioning check.
    ///
    /// Rotating groups are bounded by their candidate count; sequential
    /// groups only when `max_channels` is configured.
    pub fn pool_size(&self) -> Option<usize> {
        match self.naming {
            NamingMode::RotatingPool { names } => Some(names.len()),
            NamingMode::SequentialNumbered { max_channels, .. } => *max_channels,
        }
    }

    /// Name for the channel at 1-based `index` in a sequential group.
    pub fn positional(&self, index: usize) -> Option<String> {
        match self.naming {
            NamingMode::SequentialNumbered { template, .. } => Some(template.render(index)),
            NamingMode::RotatingPool { .. } => None,
        }
    }

    /// Choose a name for a new channel given the names currently present.
    ///
    /// A rotating candidate counts as taken when it appears *anywhere*
    /// inside an existing name, so decorated names (`"Alpha [AFK]"`) still
    /// reserve their base name.
    pub fn next_name<'n, I>(&self, current: I) -> NameChoice
    where
        I: IntoIterator<Item = &'n str>,
    {
        let current: Vec<&str> = current.into_iter().collect();

        match self.naming {
            NamingMode::RotatingPool { names } => names
                .iter()
                .find(|candidate| !current.iter().any(|name| name.contains(candidate.as_str())))
                .map_or_else(
                    || NameChoice::Fallback(Uuid::new_v4().to_string()),
                    |candidate| NameChoice::Pooled(candidate.clone()),
                ),
            NamingMode::SequentialNumbered { template, .. } => {
                NameChoice::Pooled(template.render(current.len() + 1))
            }
        }
    }
}
