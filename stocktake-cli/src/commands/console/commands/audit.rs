//! Audit log commands: the immutable trail of who did what

use anyhow::{anyhow, Result};
use async_trait::async_trait;

use stocktake_api_types::{Action, AuditLog, AuditLogFilter, AuditLogId, Resource};
use stocktake_client::{ClientError, StocktakeClient};

use crate::commands::console::command_trait::{CommandArgs, CommandOutput, ConsoleCommand};

pub struct AuditCommand;

impl AuditCommand {
    pub fn new() -> Self {
        Self
    }

    async fn list_entries(
        &self,
        args: &CommandArgs,
        client: &StocktakeClient,
    ) -> Result<CommandOutput> {
        let filter = AuditLogFilter {
            user_id: args.parse_flag("user")?,
            action: args.get_flag("action").map(str::to_string),
            resource_type: args.get_flag("resource-type").map(str::to_string),
            start_date: args.parse_flag("start")?,
            end_date: args.parse_flag("end")?,
            skip: args.parse_flag("skip")?,
            limit: args.parse_flag("limit")?,
        };

        let entries = client.audit().list(&filter).await?;
        if entries.is_empty() {
            return Ok(CommandOutput::text("No audit entries match the filter"));
        }

        let headers = vec![
            "ID".to_string(),
            "Time".to_string(),
            "User".to_string(),
            "Action".to_string(),
            "Resource".to_string(),
        ];
        let rows: Vec<Vec<String>> = entries
            .iter()
            .map(|entry| {
                let resource = match (&entry.resource_type, &entry.resource_id) {
                    (Some(kind), Some(id)) => format!("{} {}", kind, id),
                    (Some(kind), None) => kind.clone(),
                    _ => "-".to_string(),
                };
                vec![
                    entry.id.to_string(),
                    entry.created_at.format("%Y-%m-%d %H:%M").to_string(),
                    entry
                        .user_id
                        .map(|id| id.to_string())
                        .unwrap_or_else(|| "system".to_string()),
                    entry.action.clone(),
                    resource,
                ]
            })
            .collect();

        Ok(CommandOutput::table_with_title(
            format!("Audit Log ({})", entries.len()),
            headers,
            rows,
        ))
    }

    async fn show_entry(
        &self,
        args: &CommandArgs,
        client: &StocktakeClient,
    ) -> Result<CommandOutput> {
        let raw = args.require_positional(0, "audit entry ID")?;
        let id: AuditLogId = raw
            .parse()
            .map_err(|_| anyhow!("Invalid audit entry ID '{}'", raw))?;

        match client.audit().get(id).await {
            Ok(entry) => Ok(CommandOutput::text(render_entry(&entry))),
            Err(ClientError::NotFound) => Ok(CommandOutput::error(format!(
                "Audit entry '{}' not found",
                raw
            ))),
            Err(error) => Err(error.into()),
        }
    }
}

fn render_entry(entry: &AuditLog) -> String {
    let mut lines = vec![
        format!("ID: {}", entry.id),
        format!("Time: {}", entry.created_at.format("%Y-%m-%d %H:%M:%S")),
        format!("Action: {}", entry.action),
    ];
    if let Some(user_id) = entry.user_id {
        lines.push(format!("User: {}", user_id));
    }
    if let Some(kind) = &entry.resource_type {
        lines.push(format!("Resource type: {}", kind));
    }
    if let Some(id) = &entry.resource_id {
        lines.push(format!("Resource ID: {}", id));
    }
    if let Some(ip) = &entry.ip_address {
        lines.push(format!("IP: {}", ip));
    }
    if let Some(agent) = &entry.user_agent {
        lines.push(format!("User agent: {}", agent));
    }
    if let Some(details) = &entry.details {
        lines.push("Details:".to_string());
        lines.push(
            serde_json::to_string_pretty(details).unwrap_or_else(|_| details.to_string()),
        );
    }
    lines.join("\n")
}

#[async_trait]
impl ConsoleCommand for AuditCommand {
    async fn execute(&self, args: CommandArgs, client: &StocktakeClient) -> Result<CommandOutput> {
        match args.action.as_str() {
            "list" | "ls" => self.list_entries(&args, client).await,
            "show" | "info" | "get" => self.show_entry(&args, client).await,
            "help" | _ => Ok(CommandOutput::text(self.help_text().to_string())),
        }
    }

    fn completion_hints(&self, partial: &str) -> Vec<String> {
        let commands = vec!["list", "show", "help"];
        commands
            .into_iter()
            .filter(|cmd| cmd.starts_with(partial))
            .map(|cmd| cmd.to_string())
            .collect()
    }

    fn summary(&self) -> &'static str {
        "Browse the audit trail"
    }

    fn help_text(&self) -> &'static str {
        "Audit Commands:
  audit list [--user <user-id>] [--action <name>] [--resource-type <type>]
    [--start <yyyy-mm-dd>] [--end <yyyy-mm-dd>] [--skip <n>] [--limit <n>]
    List audit entries, newest first

  audit show <entry-id>
    Show one entry including its detail payload

Examples:
  audit list --action asset.delete --start 2025-06-01
  audit list --user 0d9f2dd4-9c3b-4f6e-9a51-0a4f44a1f001 --limit 20"
    }

    fn usage_examples(&self) -> Vec<&'static str> {
        vec![
            "audit list --limit 20",
            "audit list --resource-type asset --start 2025-06-01 --end 2025-06-30",
        ]
    }

    fn category(&self) -> &'static str {
        "administration"
    }

    fn aliases(&self) -> Vec<&'static str> {
        vec!["logs"]
    }

    fn required_permissions(&self, action: &str) -> Vec<(Resource, Action)> {
        match action {
            "list" | "ls" | "show" | "info" | "get" => {
                vec![(Resource::AuditLogs, Action::Read)]
            }
            _ => vec![],
        }
    }

    fn validate_args(&self, args: &CommandArgs) -> Result<()> {
        if matches!(args.action.as_str(), "show") && args.positional.is_empty() {
            return Err(anyhow!("Audit entry ID is required for show"));
        }
        Ok(())
    }
}
