//! Output formatting for `plan`: table or JSON.

use std::io::{self, IsTerminal, Write};

use owo_colors::OwoColorize;
use serde::Serialize;
use tabled::{Table, Tabled, settings::Style};

use chanpool_core::{Action, ChannelId, ChannelSnapshot, Plan, PoolState};

use crate::cli::OutputFormat;
use crate::error::CliError;

/// One group's dry-run result.
#[derive(Debug, Serialize)]
pub struct GroupPlan {
    pub group: String,
    pub parent: ChannelId,
    pub channels: Vec<ChannelRow>,
    #[serde(flatten)]
    pub plan: Plan,
}

impl GroupPlan {
    pub fn new(group: &str, snapshot: &ChannelSnapshot, plan: Plan) -> Self {
        Self {
            group: group.to_owned(),
            parent: snapshot.parent(),
            channels: snapshot
                .channels()
                .iter()
                .map(|c| ChannelRow {
                    id: c.id.get(),
                    name: c.name.clone(),
                    clients: c.clients,
                })
                .collect(),
            plan,
        }
    }
}

#[derive(Debug, Serialize, Tabled)]
pub struct ChannelRow {
    #[tabled(rename = "ID")]
    pub id: u64,
    #[tabled(rename = "Name")]
    pub name: String,
    #[tabled(rename = "Clients")]
    pub clients: u32,
}

#[derive(Tabled)]
struct ActionRow {
    #[tabled(rename = "#")]
    step: usize,
    #[tabled(rename = "Kind")]
    kind: &'static str,
    #[tabled(rename = "Action")]
    action: String,
}

// ── Render dispatchers ───────────────────────────────────────────────

pub fn render_plans(format: OutputFormat, plans: &[GroupPlan]) -> Result<String, CliError> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(plans)?),
        OutputFormat::Table => {
            let color = io::stdout().is_terminal() && std::env::var_os("NO_COLOR").is_none();
            Ok(plans
                .iter()
                .map(|p| render_group(p, color))
                .collect::<Vec<_>>()
                .join("\n\n"))
        }
    }
}

/// Print the rendered output to stdout.
pub fn print_output(output: &str) {
    if output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{output}");
}

// ── Table rendering ──────────────────────────────────────────────────

fn render_group(p: &GroupPlan, color: bool) -> String {
    let empty = p.channels.iter().filter(|c| c.clients == 0).count();
    let state = if color {
        colored_state(p.plan.state)
    } else {
        p.plan.state.to_string()
    };

    let mut out = format!(
        "{} (parent {}): {} channels, {} empty, {}\n",
        p.group,
        p.parent,
        p.channels.len(),
        empty,
        state
    );

    if !p.channels.is_empty() {
        out.push_str(&Table::new(&p.channels).with(Style::rounded()).to_string());
        out.push('\n');
    }

    if p.plan.is_noop() {
        out.push_str("no changes");
    } else {
        let rows: Vec<ActionRow> = p
            .plan
            .actions
            .iter()
            .enumerate()
            .map(|(i, a)| ActionRow {
                step: i + 1,
                kind: a.kind(),
                action: describe(a),
            })
            .collect();
        out.push_str(&Table::new(rows).with(Style::rounded()).to_string());
    }
    out
}

fn describe(action: &Action) -> String {
    match action {
        Action::Create {
            name, permissions, ..
        } if !permissions.is_empty() => {
            let perms: Vec<String> = permissions
                .iter()
                .map(|p| format!("{}={}", p.permission, p.value))
                .collect();
            format!("{action} [{}]", perms.join(", "))
        }
        Action::Create { .. } | Action::Delete { .. } | Action::Rename { .. } => {
            action.to_string()
        }
    }
}

fn colored_state(state: PoolState) -> String {
    let label = state.to_string();
    match state {
        PoolState::Steady => label.green().to_string(),
        PoolState::Grow => label.cyan().to_string(),
        PoolState::Renumber => label.yellow().to_string(),
        PoolState::OverProvisioned => label.magenta().to_string(),
    }
}
