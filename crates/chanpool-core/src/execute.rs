// ── Plan execution ──
//
// Applies a plan's actions one by one. A failed action is recorded and
// logged but never stops the ones after it; the next tick re-reads the
// server and heals whatever is left.

use tracing::{info, warn};

use crate::api::{ChannelApi, CreateOptions};
use crate::error::CoreError;
use crate::model::ChannelId;
use crate::reconcile::{Action, Plan};

/// What a successful action did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Applied {
    Deleted,
    Renamed,
    Created { id: ChannelId },
}

/// The result of one planned action.
#[derive(Debug)]
pub struct ActionOutcome {
    pub action: Action,
    pub result: Result<Applied, CoreError>,
}

impl ActionOutcome {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Run every action of `plan` in order against `api`.
pub async fn execute(api: &dyn ChannelApi, group: &str, plan: Plan) -> Vec<ActionOutcome> {
    let mut outcomes = Vec::with_capacity(plan.actions.len());

    for action in plan.actions {
        let result = apply(api, &action).await;
        match &result {
            Ok(_) => info!(group, %action, "applied"),
            Err(e) => warn!(group, %action, error = %e, "action failed"),
        }
        outcomes.push(ActionOutcome { action, result });
    }

    outcomes
}

async fn apply(api: &dyn ChannelApi, action: &Action) -> Result<Applied, CoreError> {
    match action {
        Action::Delete { id, .. } => api
            .delete_channel(*id)
            .await
            .map(|()| Applied::Deleted)
            .map_err(|e| e.during("delete", id)),

        Action::Rename { id, to, .. } => api
            .rename_channel(*id, to)
            .await
            .map(|()| Applied::Renamed)
            .map_err(|e| e.during("rename", id)),

        Action::Create {
            parent,
            name,
            semi_permanent,
            permissions,
        } => {
            let options = CreateOptions {
                semi_permanent: *semi_permanent,
            };
            let id = api
                .create_channel(*parent, name, options)
                .await
                .map_err(|e| e.during("create", format!("'{name}' under {parent}")))?;

            for perm in permissions {
                api.set_permission(id, &perm.permission, perm.value)
                    .await
                    .map_err(|e| e.during("set permission", id))?;
            }
            Ok(Applied::Created { id })
        }
    }
}
