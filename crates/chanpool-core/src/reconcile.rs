// ── Pool reconciliation ──
//
// Pure decision logic: snapshot in, ordered action list out. No I/O
// happens here; `execute` applies the plan and `scheduler` drives it.

use std::fmt;

use serde::Serialize;
use tracing::warn;

use crate::model::{Channel, ChannelId, GroupConfig, NamingMode};
use crate::naming::{NameChoice, NameRegistry};
use crate::snapshot::ChannelSnapshot;

/// Channel permission that forces push-to-talk for clients in a channel.
pub const FORCE_PUSH_TO_TALK: &str = "b_client_force_push_to_talk";

/// A channel permission applied right after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PermissionOverride {
    pub permission: String,
    pub value: i32,
}

impl PermissionOverride {
    /// Push-to-talk disabled for the channel.
    pub fn push_to_talk_off() -> Self {
        Self {
            permission: FORCE_PUSH_TO_TALK.to_owned(),
            value: 0,
        }
    }
}

/// One remote mutation, in the order it must be issued.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    Delete {
        id: ChannelId,
        name: String,
    },
    Rename {
        id: ChannelId,
        from: String,
        to: String,
    },
    /// Create-then-permission. The overrides are only attempted once the
    /// create succeeded.
    Create {
        parent: ChannelId,
        name: String,
        semi_permanent: bool,
        permissions: Vec<PermissionOverride>,
    },
}

impl Action {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Delete { .. } => "delete",
            Self::Rename { .. } => "rename",
            Self::Create { .. } => "create",
        }
    }

    fn create(parent: ChannelId, name: String) -> Self {
        Self::Create {
            parent,
            name,
            semi_permanent: true,
            permissions: vec![PermissionOverride::push_to_talk_off()],
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Delete { id, name } => write!(f, "delete '{name}' ({id})"),
            Self::Rename { id, from, to } => write!(f, "rename '{from}' -> '{to}' ({id})"),
            Self::Create { parent, name, .. } => write!(f, "create '{name}' under {parent}"),
        }
    }
}

/// Which rule fired for a tick. Evaluated in declaration order; the first
/// match wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PoolState {
    /// Redundant spares or capacity reached: prune down to one spare.
    OverProvisioned,
    /// Sequential group: fix numbering, then add a spare if none.
    Renumber,
    /// Rotating group without a spare: add one.
    Grow,
    /// Exactly one spare and nothing to fix.
    Steady,
}

impl fmt::Display for PoolState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::OverProvisioned => "over-provisioned",
            Self::Renumber => "renumber",
            Self::Grow => "grow",
            Self::Steady => "steady",
        })
    }
}

/// The reconciler's decision for one tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Plan {
    pub state: PoolState,
    pub actions: Vec<Action>,
}

impl Plan {
    fn steady() -> Self {
        Self {
            state: PoolState::Steady,
            actions: Vec::new(),
        }
    }

    pub fn is_noop(&self) -> bool {
        self.actions.is_empty()
    }
}

/// Decides prune / create / rename actions from a snapshot.
pub struct PoolReconciler;

impl PoolReconciler {
    pub fn plan(group: &GroupConfig, snapshot: &ChannelSnapshot) -> Plan {
        let registry = NameRegistry::new(group);
        let empties = snapshot.empty_channels();

        if Self::over_provisioned(&registry, snapshot.len(), empties.len()) {
            return Plan {
                state: PoolState::OverProvisioned,
                actions: Self::prune(&empties),
            };
        }

        match &group.naming {
            NamingMode::SequentialNumbered { .. } => {
                Self::renumber(group, &registry, snapshot, empties.is_empty())
            }
            NamingMode::RotatingPool { .. } if empties.is_empty() => {
                let name = match registry.next_name(snapshot.names()) {
                    NameChoice::Pooled(name) => name,
                    NameChoice::Fallback(name) => {
                        warn!(group = %group.label, %name, "name pool exhausted, using generated name");
                        name
                    }
                };
                Plan {
                    state: PoolState::Grow,
                    actions: vec![Action::create(group.parent, name)],
                }
            }
            NamingMode::RotatingPool { .. } => Plan::steady(),
        }
    }

    /// More than one spare, or no room left to keep a spare within the pool.
    ///
    /// A rotating group with no configured names has a pool size of zero and
    /// therefore always lands here.
    fn over_provisioned(registry: &NameRegistry<'_>, channels: usize, empties: usize) -> bool {
        if empties > 1 {
            return true;
        }
        registry
            .pool_size()
            .is_some_and(|size| channels >= size.saturating_sub(1))
    }

    /// Delete every empty channel but the last-listed one, first-listed first.
    fn prune(empties: &[&Channel]) -> Vec<Action> {
        empties
            .split_last()
            .map(|(_spare, redundant)| {
                redundant
                    .iter()
                    .map(|c| Action::Delete {
                        id: c.id,
                        name: c.name.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Rename every channel to `template(position)`, then add a spare if
    /// none is left.
    ///
    /// Sibling names are unique on the server, so a target still held by a
    /// later channel (a swap or longer cycle) is freed first by moving that
    /// channel to a parking name. The whole pass fits in one plan.
    fn renumber(
        group: &GroupConfig,
        registry: &NameRegistry<'_>,
        snapshot: &ChannelSnapshot,
        needs_spare: bool,
    ) -> Plan {
        let channels = snapshot.channels();
        let targets: Vec<String> = (1..=channels.len())
            .filter_map(|pos| registry.positional(pos))
            .collect();
        let mut current: Vec<String> = channels.iter().map(|c| c.name.clone()).collect();
        let mut actions = Vec::new();

        for (i, (channel, target)) in channels.iter().zip(&targets).enumerate() {
            if current[i] == *target {
                continue;
            }

            if let Some(j) = current.iter().position(|name| name == target) {
                let parked = Self::parking_name(channels[j].id, &current, &targets);
                actions.push(Action::Rename {
                    id: channels[j].id,
                    from: std::mem::replace(&mut current[j], parked.clone()),
                    to: parked,
                });
            }

            actions.push(Action::Rename {
                id: channel.id,
                from: std::mem::replace(&mut current[i], target.clone()),
                to: target.clone(),
            });
        }

        if needs_spare {
            if let Some(name) = registry.positional(channels.len() + 1) {
                actions.push(Action::create(group.parent, name));
            }
        }

        if actions.is_empty() {
            Plan::steady()
        } else {
            Plan {
                state: PoolState::Renumber,
                actions,
            }
        }
    }

    /// A temporary name no sibling holds and no position will need.
    fn parking_name(id: ChannelId, current: &[String], targets: &[String]) -> String {
        let mut name = format!("renumbering {id}");
        while current.contains(&name) || targets.contains(&name) {
            name.push('~');
        }
        name
    }
}
