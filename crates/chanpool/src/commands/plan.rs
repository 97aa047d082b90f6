//! `chanpool plan`: snapshot every group and print the actions the next
//! tick would take. Nothing is mutated.

use std::sync::Arc;

use tracing::debug;

use chanpool_core::{ChannelApi, GroupScheduler};

use crate::cli::{GlobalOpts, PlanArgs};
use crate::error::CliError;
use crate::output::{self, GroupPlan};

pub async fn handle(args: &PlanArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let settings = super::load_settings(global)?;

    let groups: Vec<_> = match &args.group {
        Some(name) => {
            let selected: Vec<_> = settings
                .groups
                .iter()
                .filter(|g| &g.label == name)
                .cloned()
                .collect();
            if selected.is_empty() {
                return Err(CliError::UnknownGroup {
                    name: name.clone(),
                    available: settings
                        .groups
                        .iter()
                        .map(|g| g.label.as_str())
                        .collect::<Vec<_>>()
                        .join(", "),
                });
            }
            selected
        }
        None => settings.groups.clone(),
    };

    let api = super::connect(&settings).await?;
    let scheduler = GroupScheduler::new(Arc::new(api) as Arc<dyn ChannelApi>, settings.interval);

    let mut plans = Vec::with_capacity(groups.len());
    for group in &groups {
        let (snapshot, plan) = scheduler.plan(group).await?;
        debug!(group = %group.label, state = %plan.state, actions = plan.actions.len(), "planned");
        plans.push(GroupPlan::new(&group.label, &snapshot, plan));
    }

    output::print_output(&output::render_plans(args.output, &plans)?);
    Ok(())
}
