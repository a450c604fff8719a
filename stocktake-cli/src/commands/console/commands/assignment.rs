//! Assignment commands: handing assets out and taking them back

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::Local;

use stocktake_api_types::{
    Action, AssetId, AssignmentFilter, AssignmentId, AssignmentWithDetails, CreateAssignment,
    EmployeeId, Resource, ReturnAssignment,
};
use stocktake_client::{ClientError, StocktakeClient};

use crate::commands::console::command_trait::{CommandArgs, CommandOutput, ConsoleCommand};

pub struct AssignmentCommand;

impl AssignmentCommand {
    pub fn new() -> Self {
        Self
    }

    async fn list_assignments(
        &self,
        args: &CommandArgs,
        client: &StocktakeClient,
    ) -> Result<CommandOutput> {
        let filter = AssignmentFilter {
            status: args.parse_flag("status")?,
            asset_id: args.parse_flag("asset")?,
            employee_id: args.parse_flag("employee")?,
            skip: args.parse_flag("skip")?,
            limit: args.parse_flag("limit")?,
        };

        let assignments = client.assignments().list(&filter).await?;
        if assignments.is_empty() {
            return Ok(CommandOutput::text("No assignments match the filter"));
        }

        let headers = vec![
            "ID".to_string(),
            "Asset".to_string(),
            "Tag".to_string(),
            "Employee".to_string(),
            "Assigned".to_string(),
            "Returned".to_string(),
            "Status".to_string(),
        ];
        let rows: Vec<Vec<String>> = assignments
            .iter()
            .map(|details| {
                vec![
                    details.assignment.id.to_string(),
                    details
                        .asset_name
                        .clone()
                        .unwrap_or_else(|| details.assignment.asset_id.to_string()),
                    details.asset_tag.clone().unwrap_or_else(|| "N/A".to_string()),
                    details
                        .employee_name
                        .clone()
                        .unwrap_or_else(|| details.assignment.employee_id.to_string()),
                    details.assignment.assigned_date.to_string(),
                    details
                        .assignment
                        .returned_date
                        .map(|date| date.to_string())
                        .unwrap_or_else(|| "-".to_string()),
                    details.assignment.status.to_string(),
                ]
            })
            .collect();

        let title = match filter.status {
            Some(status) => format!("Assignments ({})", status),
            None => format!("Assignments ({})", assignments.len()),
        };
        Ok(CommandOutput::table_with_title(title, headers, rows))
    }

    async fn show_assignment(
        &self,
        args: &CommandArgs,
        client: &StocktakeClient,
    ) -> Result<CommandOutput> {
        let raw = args.require_positional(0, "assignment ID")?;
        let id: AssignmentId = raw
            .parse()
            .map_err(|_| anyhow!("Invalid assignment ID '{}'", raw))?;

        match client.assignments().get(id).await {
            Ok(details) => Ok(CommandOutput::text(render_assignment(&details))),
            Err(ClientError::NotFound) => Ok(CommandOutput::error(format!(
                "Assignment '{}' not found",
                raw
            ))),
            Err(error) => Err(error.into()),
        }
    }

    async fn create_assignment(
        &self,
        args: &CommandArgs,
        client: &StocktakeClient,
    ) -> Result<CommandOutput> {
        let asset_raw = args.require_positional(0, "asset ID")?;
        let employee_raw = args.require_positional(1, "employee ID")?;
        let asset_id: AssetId = asset_raw
            .parse()
            .map_err(|_| anyhow!("Invalid asset ID '{}'", asset_raw))?;
        let employee_id: EmployeeId = employee_raw
            .parse()
            .map_err(|_| anyhow!("Invalid employee ID '{}'", employee_raw))?;

        let request = CreateAssignment {
            asset_id,
            employee_id,
            assigned_date: args
                .parse_flag("date")?
                .unwrap_or_else(|| Local::now().date_naive()),
            notes: args.get_flag("notes").map(str::to_string),
        };

        match client.assignments().create(&request).await {
            Ok(assignment) => Ok(CommandOutput::success_with_data(
                format!(
                    "Assignment {} created, asset handed out on {}",
                    assignment.id, assignment.assigned_date
                ),
                serde_json::to_value(&assignment)?,
            )),
            Err(ClientError::Conflict { detail }) => {
                Ok(CommandOutput::error(format!("Cannot assign: {}", detail)))
            }
            Err(ClientError::Validation { detail }) => {
                Ok(CommandOutput::error(format!("Rejected: {}", detail)))
            }
            Err(ClientError::NotFound) => Ok(CommandOutput::error("Asset or employee not found")),
            Err(error) => Err(error.into()),
        }
    }

    async fn return_assignment(
        &self,
        args: &CommandArgs,
        client: &StocktakeClient,
    ) -> Result<CommandOutput> {
        let raw = args.require_positional(0, "assignment ID")?;
        let id: AssignmentId = raw
            .parse()
            .map_err(|_| anyhow!("Invalid assignment ID '{}'", raw))?;

        let request = ReturnAssignment {
            returned_date: args.parse_flag("date")?,
            notes: args.get_flag("notes").map(str::to_string),
        };

        match client.assignments().return_asset(id, &request).await {
            Ok(assignment) => Ok(CommandOutput::success_with_data(
                format!(
                    "Assignment {} closed, asset is available again",
                    assignment.id
                ),
                serde_json::to_value(&assignment)?,
            )),
            Err(ClientError::NotFound) => Ok(CommandOutput::error(format!(
                "Assignment '{}' not found",
                raw
            ))),
            Err(ClientError::Conflict { detail }) | Err(ClientError::Validation { detail }) => {
                Ok(CommandOutput::error(format!("Cannot return: {}", detail)))
            }
            Err(error) => Err(error.into()),
        }
    }

    /// Assets eligible for a new assignment, i.e. currently available ones.
    async fn list_assignable(&self, client: &StocktakeClient) -> Result<CommandOutput> {
        let assets = client.assets().assignable().await?;
        if assets.is_empty() {
            return Ok(CommandOutput::text("No assets are available to hand out"));
        }

        let headers = vec![
            "ID".to_string(),
            "Tag".to_string(),
            "Name".to_string(),
            "Category".to_string(),
        ];
        let rows: Vec<Vec<String>> = assets
            .iter()
            .map(|asset| {
                vec![
                    asset.id.to_string(),
                    asset.asset_tag.clone(),
                    asset.name.clone(),
                    asset.category.clone(),
                ]
            })
            .collect();
        Ok(CommandOutput::table_with_title(
            "Available Assets",
            headers,
            rows,
        ))
    }
}

fn render_assignment(details: &AssignmentWithDetails) -> String {
    let assignment = &details.assignment;
    let mut lines = vec![
        format!("ID: {}", assignment.id),
        format!("Status: {}", assignment.status),
    ];
    match (&details.asset_name, &details.asset_tag) {
        (Some(name), Some(tag)) => lines.push(format!("Asset: {} ({})", name, tag)),
        _ => lines.push(format!("Asset: {}", assignment.asset_id)),
    }
    match &details.employee_name {
        Some(name) => lines.push(format!("Employee: {}", name)),
        None => lines.push(format!("Employee: {}", assignment.employee_id)),
    }
    lines.push(format!("Assigned: {}", assignment.assigned_date));
    if let Some(returned) = assignment.returned_date {
        lines.push(format!("Returned: {}", returned));
    }
    if let Some(notes) = &assignment.notes {
        lines.push(format!("Notes: {}", notes));
    }
    lines.join("\n")
}

#[async_trait]
impl ConsoleCommand for AssignmentCommand {
    async fn execute(&self, args: CommandArgs, client: &StocktakeClient) -> Result<CommandOutput> {
        match args.action.as_str() {
            "list" | "ls" => self.list_assignments(&args, client).await,
            "show" | "info" | "get" => self.show_assignment(&args, client).await,
            "create" | "add" | "new" => self.create_assignment(&args, client).await,
            "return" | "checkin" | "close" => self.return_assignment(&args, client).await,
            "assignable" | "available" => self.list_assignable(client).await,
            "help" | _ => Ok(CommandOutput::text(self.help_text().to_string())),
        }
    }

    fn completion_hints(&self, partial: &str) -> Vec<String> {
        let commands = vec!["list", "show", "create", "return", "assignable", "help"];
        commands
            .into_iter()
            .filter(|cmd| cmd.starts_with(partial))
            .map(|cmd| cmd.to_string())
            .collect()
    }

    fn summary(&self) -> &'static str {
        "Hand assets out and take them back"
    }

    fn help_text(&self) -> &'static str {
        "Assignment Commands:
  assignment list [--status <active|returned>] [--asset <id>]
    [--employee <id>] [--skip <n>] [--limit <n>]
    List assignments with asset and employee names

  assignment show <assignment-id>
    Show one assignment

  assignment create <asset-id> <employee-id> [--date <yyyy-mm-dd>]
    [--notes <text>]
    Hand an asset out; the date defaults to today. Only available assets
    can be assigned

  assignment return <assignment-id> [--date <yyyy-mm-dd>] [--notes <text>]
    Take an asset back; the return date may not precede the hand-out date

  assignment assignable
    List the assets currently available for a new assignment

Examples:
  assignment list --status active
  assignment create <asset-id> <employee-id> --notes 'spare charger included'
  assignment return <assignment-id> --date 2025-06-30"
    }

    fn usage_examples(&self) -> Vec<&'static str> {
        vec![
            "assignment list --status active",
            "assignment assignable",
            "assignment create 4f6e9a51-0a4f-44a1-b001-0d9f2dd49c3b 9a510a4f-44a1-4001-8d9f-2dd49c3b4f6e",
            "assignment return 0d9f2dd4-9c3b-4f6e-9a51-0a4f44a1f001",
        ]
    }

    fn category(&self) -> &'static str {
        "inventory"
    }

    fn aliases(&self) -> Vec<&'static str> {
        vec!["assignments"]
    }

    fn required_permissions(&self, action: &str) -> Vec<(Resource, Action)> {
        match action {
            "list" | "ls" | "show" | "info" | "get" => {
                vec![(Resource::Assignments, Action::Read)]
            }
            "create" | "add" | "new" => vec![(Resource::Assignments, Action::Create)],
            "return" | "checkin" | "close" => vec![(Resource::Assignments, Action::Update)],
            "assignable" | "available" => vec![(Resource::Assets, Action::Read)],
            _ => vec![],
        }
    }

    fn validate_args(&self, args: &CommandArgs) -> Result<()> {
        match args.action.as_str() {
            "show" | "return" => {
                if args.positional.is_empty() {
                    return Err(anyhow!("Assignment ID is required for {}", args.action));
                }
            }
            "create" => {
                if args.positional.len() < 2 {
                    return Err(anyhow!("Create requires: <asset-id> <employee-id>"));
                }
            }
            _ => {}
        }
        Ok(())
    }
}
