//! Role commands, including the permission matrix editor

use anyhow::{anyhow, Result};
use async_trait::async_trait;

use stocktake_api_types::{
    Action, CreateRole, PermissionGrants, Resource, RoleDefinition, RoleId, UpdateRole,
};
use stocktake_client::{ClientError, PermissionMatrix, StocktakeClient};

use crate::commands::console::command_trait::{CommandArgs, CommandOutput, ConsoleCommand};

pub struct RoleCommand;

impl RoleCommand {
    pub fn new() -> Self {
        Self
    }

    async fn list_roles(&self, client: &StocktakeClient) -> Result<CommandOutput> {
        let roles = client.roles().list().await?;
        if roles.is_empty() {
            return Ok(CommandOutput::text("No roles defined"));
        }

        let headers = vec![
            "ID".to_string(),
            "Name".to_string(),
            "System".to_string(),
            "Granted resources".to_string(),
        ];
        let rows: Vec<Vec<String>> = roles
            .iter()
            .map(|role| {
                let granted = role
                    .permissions
                    .values()
                    .filter(|actions| !actions.is_empty())
                    .count();
                vec![
                    role.id.to_string(),
                    role.name.clone(),
                    if role.is_system_role { "yes" } else { "" }.to_string(),
                    granted.to_string(),
                ]
            })
            .collect();

        Ok(CommandOutput::table_with_title(
            format!("Roles ({})", roles.len()),
            headers,
            rows,
        ))
    }

    async fn show_role(
        &self,
        args: &CommandArgs,
        client: &StocktakeClient,
    ) -> Result<CommandOutput> {
        let raw = args.require_positional(0, "role ID")?;
        let id: RoleId = raw
            .parse()
            .map_err(|_| anyhow!("Invalid role ID '{}'", raw))?;

        match client.roles().get(id).await {
            Ok(role) => {
                let lines = vec![
                    format!("ID: {}", role.id),
                    format!("Name: {}", role.name),
                    format!(
                        "System role: {}",
                        if role.is_system_role { "yes" } else { "no" }
                    ),
                    format!("Created: {}", role.created_at.format("%Y-%m-%d %H:%M")),
                    String::new(),
                    "Use 'role matrix <id>' for the permission grid.".to_string(),
                ];
                Ok(CommandOutput::text(lines.join("\n")))
            }
            Err(ClientError::NotFound) => {
                Ok(CommandOutput::error(format!("Role '{}' not found", raw)))
            }
            Err(error) => Err(error.into()),
        }
    }

    async fn create_role(
        &self,
        args: &CommandArgs,
        client: &StocktakeClient,
    ) -> Result<CommandOutput> {
        let name = args.require_positional(0, "role name")?;
        let permissions = match args.get_flag("permissions") {
            Some(raw) => parse_grants(args, raw)?,
            None => PermissionGrants::new(),
        };

        let request = CreateRole {
            name: name.to_string(),
            permissions,
        };

        match client.roles().create(&request).await {
            Ok(role) => Ok(CommandOutput::success_with_data(
                format!("Role '{}' created with ID {}", role.name, role.id),
                serde_json::to_value(&role)?,
            )),
            Err(ClientError::Conflict { detail }) | Err(ClientError::Validation { detail }) => {
                Ok(CommandOutput::error(format!("Rejected: {}", detail)))
            }
            Err(error) => Err(error.into()),
        }
    }

    async fn update_role(
        &self,
        args: &CommandArgs,
        client: &StocktakeClient,
    ) -> Result<CommandOutput> {
        let raw = args.require_positional(0, "role ID")?;
        let id: RoleId = raw
            .parse()
            .map_err(|_| anyhow!("Invalid role ID '{}'", raw))?;

        let mut update = UpdateRole::default();
        let mut changes = Vec::new();

        if let Some(name) = args.get_flag("name") {
            update.name = Some(name.to_string());
            changes.push(format!("name -> {}", name));
        }
        if let Some(raw_grants) = args.get_flag("permissions") {
            update.permissions = Some(parse_grants(args, raw_grants)?);
            changes.push("permissions -> <replaced>".to_string());
        }

        if changes.is_empty() {
            return Ok(CommandOutput::error(
                "No changes specified. Use --name or --permissions.",
            ));
        }

        match client.roles().update(id, &update).await {
            Ok(role) => Ok(CommandOutput::success_with_data(
                format!(
                    "Role '{}' updated. Changes: {}",
                    role.name,
                    changes.join(", ")
                ),
                serde_json::to_value(&role)?,
            )),
            Err(ClientError::NotFound) => {
                Ok(CommandOutput::error(format!("Role '{}' not found", raw)))
            }
            Err(ClientError::Forbidden { detail }) | Err(ClientError::Validation { detail }) => {
                Ok(CommandOutput::error(format!("Update rejected: {}", detail)))
            }
            Err(error) => Err(error.into()),
        }
    }

    async fn delete_role(
        &self,
        args: &CommandArgs,
        client: &StocktakeClient,
    ) -> Result<CommandOutput> {
        let raw = args.require_positional(0, "role ID")?;
        let id: RoleId = raw
            .parse()
            .map_err(|_| anyhow!("Invalid role ID '{}'", raw))?;

        match client.roles().delete(id).await {
            Ok(response) => Ok(CommandOutput::success(response.message)),
            Err(ClientError::NotFound) => {
                Ok(CommandOutput::error(format!("Role '{}' not found", raw)))
            }
            Err(ClientError::Forbidden { detail }) | Err(ClientError::Conflict { detail }) => {
                Ok(CommandOutput::error(format!("Cannot delete: {}", detail)))
            }
            Err(error) => Err(error.into()),
        }
    }

    async fn show_matrix(
        &self,
        args: &CommandArgs,
        client: &StocktakeClient,
    ) -> Result<CommandOutput> {
        let raw = args.require_positional(0, "role ID")?;
        let id: RoleId = raw
            .parse()
            .map_err(|_| anyhow!("Invalid role ID '{}'", raw))?;

        match client.roles().get(id).await {
            Ok(role) => Ok(matrix_table(
                format!("Permissions: {}", role.name),
                &role,
            )),
            Err(ClientError::NotFound) => {
                Ok(CommandOutput::error(format!("Role '{}' not found", raw)))
            }
            Err(error) => Err(error.into()),
        }
    }

    /// Flip one cell of the grid and persist the whole grant set.
    async fn toggle_grant(
        &self,
        args: &CommandArgs,
        client: &StocktakeClient,
    ) -> Result<CommandOutput> {
        let raw = args.require_positional(0, "role ID")?;
        let id: RoleId = raw
            .parse()
            .map_err(|_| anyhow!("Invalid role ID '{}'", raw))?;
        let resource: Resource = args.require_positional(1, "resource")?.parse()?;
        let action: Action = args.require_positional(2, "action")?.parse()?;

        let role = match client.roles().get(id).await {
            Ok(role) => role,
            Err(ClientError::NotFound) => {
                return Ok(CommandOutput::error(format!("Role '{}' not found", raw)))
            }
            Err(error) => return Err(error.into()),
        };
        if role.is_system_role {
            return Ok(CommandOutput::error(format!(
                "'{}' is a system role and cannot be edited",
                role.name
            )));
        }

        let mut matrix = PermissionMatrix::from_grants(role.permissions);
        matrix.toggle(resource, action);
        let granted = matrix.allows(resource, action);

        let update = UpdateRole {
            name: None,
            permissions: Some(matrix.into_grants()),
        };
        match client.roles().update(id, &update).await {
            Ok(updated) => Ok(matrix_table(
                format!(
                    "Permissions: {} ({} on {} {})",
                    updated.name,
                    action,
                    resource,
                    if granted { "granted" } else { "revoked" }
                ),
                &updated,
            )),
            Err(ClientError::Forbidden { detail }) | Err(ClientError::Validation { detail }) => {
                Ok(CommandOutput::error(format!("Toggle rejected: {}", detail)))
            }
            Err(error) => Err(error.into()),
        }
    }
}

fn parse_grants(args: &CommandArgs, raw: &str) -> Result<PermissionGrants> {
    serde_json::from_value(args.parse_json(raw)?)
        .map_err(|error| anyhow!("Invalid permissions JSON: {}", error))
}

/// Stored grants as a resource by action grid. `manage` shows as its own
/// column; it implies the others without them being checked.
fn matrix_table(title: String, role: &RoleDefinition) -> CommandOutput {
    let mut headers = vec!["Resource".to_string()];
    headers.extend(Action::ALL.iter().map(|action| action.to_string()));

    let rows: Vec<Vec<String>> = Resource::ALL
        .iter()
        .map(|resource| {
            let actions = role.permissions.get(resource);
            let mut row = vec![resource.to_string()];
            for action in Action::ALL {
                let granted = actions.is_some_and(|set| set.contains(action));
                row.push(if granted { "x".to_string() } else { String::new() });
            }
            row
        })
        .collect();

    CommandOutput::table_with_title(title, headers, rows)
}

#[async_trait]
impl ConsoleCommand for RoleCommand {
    async fn execute(&self, args: CommandArgs, client: &StocktakeClient) -> Result<CommandOutput> {
        match args.action.as_str() {
            "list" | "ls" => self.list_roles(client).await,
            "show" | "info" | "get" => self.show_role(&args, client).await,
            "create" | "add" | "new" => self.create_role(&args, client).await,
            "update" | "edit" | "modify" => self.update_role(&args, client).await,
            "delete" | "remove" | "rm" => self.delete_role(&args, client).await,
            "matrix" | "grid" | "permissions" => self.show_matrix(&args, client).await,
            "toggle" => self.toggle_grant(&args, client).await,
            "help" | _ => Ok(CommandOutput::text(self.help_text().to_string())),
        }
    }

    fn completion_hints(&self, partial: &str) -> Vec<String> {
        let commands = vec![
            "list", "show", "create", "update", "delete", "matrix", "toggle", "help",
        ];
        commands
            .into_iter()
            .filter(|cmd| cmd.starts_with(partial))
            .map(|cmd| cmd.to_string())
            .collect()
    }

    fn summary(&self) -> &'static str {
        "Edit roles and their permission matrix"
    }

    fn help_text(&self) -> &'static str {
        "Role Commands:
  role list
    List role definitions

  role show <role-id>
    Show one role

  role matrix <role-id>
    Show the role's permission grid (resources by actions)

  role toggle <role-id> <resource> <action>
    Flip one grant and save. Toggling manage replaces the row; toggling
    an action under manage expands manage first, then removes the action.
    System roles cannot be edited

  role create <name> [--permissions <json>]
    Create a role; permissions look like {\"assets\":[\"read\",\"create\"]}

  role update <role-id> [--name <n>] [--permissions <json>]
    Rename a role or replace its grants wholesale

  role delete <role-id>
    Delete a role; refused for system roles and roles in use

Resources: assets, employees, assignments, users, roles, settings, audit_logs
Actions:   create, read, update, delete, manage

Examples:
  role matrix 2dd49c3b-4f6e-4a51-aa4f-44a1f0010d9f
  role toggle 2dd49c3b-4f6e-4a51-aa4f-44a1f0010d9f assets manage
  role create auditor --permissions '{\"audit_logs\":[\"read\"]}'"
    }

    fn usage_examples(&self) -> Vec<&'static str> {
        vec![
            "role list",
            "role matrix 2dd49c3b-4f6e-4a51-aa4f-44a1f0010d9f",
            "role toggle 2dd49c3b-4f6e-4a51-aa4f-44a1f0010d9f assets read",
            "role create auditor --permissions '{\"audit_logs\":[\"read\"]}'",
        ]
    }

    fn category(&self) -> &'static str {
        "administration"
    }

    fn aliases(&self) -> Vec<&'static str> {
        vec!["roles"]
    }

    fn required_permissions(&self, action: &str) -> Vec<(Resource, Action)> {
        match action {
            "list" | "ls" | "show" | "info" | "get" | "matrix" | "grid" | "permissions" => {
                vec![(Resource::Roles, Action::Read)]
            }
            "create" | "add" | "new" => vec![(Resource::Roles, Action::Create)],
            "update" | "edit" | "modify" | "toggle" => vec![(Resource::Roles, Action::Update)],
            "delete" | "remove" | "rm" => vec![(Resource::Roles, Action::Delete)],
            _ => vec![],
        }
    }

    fn validate_args(&self, args: &CommandArgs) -> Result<()> {
        match args.action.as_str() {
            "show" | "update" | "delete" | "matrix" => {
                if args.positional.is_empty() {
                    return Err(anyhow!("Role ID is required for {}", args.action));
                }
            }
            "create" => {
                if args.positional.is_empty() {
                    return Err(anyhow!("Create requires: <name>"));
                }
            }
            "toggle" => {
                if args.positional.len() < 3 {
                    return Err(anyhow!("Toggle requires: <role-id> <resource> <action>"));
                }
            }
            _ => {}
        }
        Ok(())
    }
}
