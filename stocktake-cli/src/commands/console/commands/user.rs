//! User administration commands

use anyhow::{anyhow, Result};
use async_trait::async_trait;

use stocktake_api_types::{
    AccountStatus, Action, CreateUser, Resource, Role, UpdateUser, User, UserFilter, UserId,
};
use stocktake_client::{ClientError, StocktakeClient};

use super::note_edit;
use crate::commands::console::command_trait::{CommandArgs, CommandOutput, ConsoleCommand};

pub struct UserCommand;

impl UserCommand {
    pub fn new() -> Self {
        Self
    }

    async fn list_users(
        &self,
        args: &CommandArgs,
        client: &StocktakeClient,
    ) -> Result<CommandOutput> {
        let filter = UserFilter {
            skip: args.parse_flag("skip")?,
            limit: args.parse_flag("limit")?,
        };

        let users = client.users().list(&filter).await?;
        if users.is_empty() {
            return Ok(CommandOutput::text("No users found"));
        }

        let headers = vec![
            "ID".to_string(),
            "Name".to_string(),
            "Email".to_string(),
            "Role".to_string(),
            "Status".to_string(),
            "Last login".to_string(),
        ];
        let rows: Vec<Vec<String>> = users
            .iter()
            .map(|user| {
                vec![
                    user.id.to_string(),
                    user.name.clone(),
                    user.email.clone(),
                    user.role.clone(),
                    user.status.to_string(),
                    user.last_login
                        .map(|at| at.format("%Y-%m-%d").to_string())
                        .unwrap_or_else(|| "never".to_string()),
                ]
            })
            .collect();

        Ok(CommandOutput::table_with_title(
            format!("Users ({})", users.len()),
            headers,
            rows,
        ))
    }

    async fn show_user(
        &self,
        args: &CommandArgs,
        client: &StocktakeClient,
    ) -> Result<CommandOutput> {
        let raw = args.require_positional(0, "user ID")?;
        let id: UserId = raw
            .parse()
            .map_err(|_| anyhow!("Invalid user ID '{}'", raw))?;

        match client.users().get(id).await {
            Ok(user) => Ok(CommandOutput::text(render_user(&user))),
            Err(ClientError::NotFound) => {
                Ok(CommandOutput::error(format!("User '{}' not found", raw)))
            }
            Err(error) => Err(error.into()),
        }
    }

    async fn create_user(
        &self,
        args: &CommandArgs,
        client: &StocktakeClient,
    ) -> Result<CommandOutput> {
        let name = args.require_positional(0, "name")?;
        let email = args.require_positional(1, "email")?;

        let request = CreateUser {
            name: name.to_string(),
            email: email.to_string(),
            mobile: args.get_flag("mobile").map(str::to_string),
            password: args.get_flag("password").map(str::to_string),
            role: args.parse_flag("role")?,
            status: args.parse_flag("status")?,
        };

        match client.users().create(&request).await {
            Ok(user) => Ok(CommandOutput::success_with_data(
                format!(
                    "User '{}' created with ID {} ({})",
                    user.name, user.id, user.role
                ),
                serde_json::to_value(&user)?,
            )),
            Err(ClientError::Conflict { detail }) | Err(ClientError::Validation { detail }) => {
                Ok(CommandOutput::error(format!("Rejected: {}", detail)))
            }
            Err(error) => Err(error.into()),
        }
    }

    async fn update_user(
        &self,
        args: &CommandArgs,
        client: &StocktakeClient,
    ) -> Result<CommandOutput> {
        let raw = args.require_positional(0, "user ID")?;
        let id: UserId = raw
            .parse()
            .map_err(|_| anyhow!("Invalid user ID '{}'", raw))?;

        let mut update = UpdateUser::default();
        let mut changes = Vec::new();

        if let Some(name) = args.get_flag("name") {
            update.name = Some(name.to_string());
            changes.push(format!("name -> {}", name));
        }
        if let Some(email) = args.get_flag("email") {
            update.email = Some(email.to_string());
            changes.push(format!("email -> {}", email));
        }
        if let Some(status) = args.parse_flag::<AccountStatus>("status")? {
            update.status = Some(status);
            changes.push(format!("status -> {}", status));
        }
        update.mobile = args.edit_flag("mobile")?;
        note_edit(&mut changes, "mobile", &update.mobile);

        if changes.is_empty() {
            return Ok(CommandOutput::error(
                "No changes specified. Use --name, --email, --mobile or --status. \
                 Roles change via 'user change-role'.",
            ));
        }

        match client.users().update(id, &update).await {
            Ok(user) => Ok(CommandOutput::success_with_data(
                format!(
                    "User '{}' updated. Changes: {}",
                    user.name,
                    changes.join(", ")
                ),
                serde_json::to_value(&user)?,
            )),
            Err(ClientError::NotFound) => {
                Ok(CommandOutput::error(format!("User '{}' not found", raw)))
            }
            Err(ClientError::Validation { detail }) => {
                Ok(CommandOutput::error(format!("Update rejected: {}", detail)))
            }
            Err(error) => Err(error.into()),
        }
    }

    async fn deactivate_user(
        &self,
        args: &CommandArgs,
        client: &StocktakeClient,
    ) -> Result<CommandOutput> {
        let raw = args.require_positional(0, "user ID")?;
        let id: UserId = raw
            .parse()
            .map_err(|_| anyhow!("Invalid user ID '{}'", raw))?;

        match client.users().deactivate(id).await {
            Ok(response) => Ok(CommandOutput::success(response.message)),
            Err(ClientError::NotFound) => {
                Ok(CommandOutput::error(format!("User '{}' not found", raw)))
            }
            Err(ClientError::Forbidden { detail }) | Err(ClientError::Conflict { detail }) => {
                Ok(CommandOutput::error(format!("Cannot deactivate: {}", detail)))
            }
            Err(error) => Err(error.into()),
        }
    }

    async fn change_role(
        &self,
        args: &CommandArgs,
        client: &StocktakeClient,
    ) -> Result<CommandOutput> {
        let raw = args.require_positional(0, "user ID")?;
        let role_raw = args.require_positional(1, "role")?;
        let id: UserId = raw
            .parse()
            .map_err(|_| anyhow!("Invalid user ID '{}'", raw))?;
        let role: Role = role_raw.parse()?;

        match client.users().change_role(id, role).await {
            Ok(response) => Ok(CommandOutput::success_with_data(
                response.message,
                serde_json::to_value(&response.user)?,
            )),
            Err(ClientError::NotFound) => {
                Ok(CommandOutput::error(format!("User '{}' not found", raw)))
            }
            Err(ClientError::Forbidden { detail }) => {
                Ok(CommandOutput::error(format!("Not allowed: {}", detail)))
            }
            Err(error) => Err(error.into()),
        }
    }
}

fn render_user(user: &User) -> String {
    let mut lines = vec![
        format!("ID: {}", user.id),
        format!("Name: {}", user.name),
        format!("Email: {}", user.email),
        format!("Role: {}", user.role),
        format!("Status: {}", user.status),
    ];
    if let Some(mobile) = &user.mobile {
        lines.push(format!("Mobile: {}", mobile));
    }
    if let Some(last_login) = user.last_login {
        lines.push(format!(
            "Last login: {}",
            last_login.format("%Y-%m-%d %H:%M")
        ));
    }
    lines.push(format!(
        "Created: {}",
        user.created_at.format("%Y-%m-%d %H:%M")
    ));
    lines.join("\n")
}

#[async_trait]
impl ConsoleCommand for UserCommand {
    async fn execute(&self, args: CommandArgs, client: &StocktakeClient) -> Result<CommandOutput> {
        match args.action.as_str() {
            "list" | "ls" => self.list_users(&args, client).await,
            "show" | "info" | "get" => self.show_user(&args, client).await,
            "create" | "add" | "invite" => self.create_user(&args, client).await,
            "update" | "edit" | "modify" => self.update_user(&args, client).await,
            "deactivate" | "disable" => self.deactivate_user(&args, client).await,
            "change-role" | "role" => self.change_role(&args, client).await,
            "help" | _ => Ok(CommandOutput::text(self.help_text().to_string())),
        }
    }

    fn completion_hints(&self, partial: &str) -> Vec<String> {
        let commands = vec![
            "list",
            "show",
            "create",
            "update",
            "deactivate",
            "change-role",
            "help",
        ];
        commands
            .into_iter()
            .filter(|cmd| cmd.starts_with(partial))
            .map(|cmd| cmd.to_string())
            .collect()
    }

    fn summary(&self) -> &'static str {
        "Administer the organization's user accounts"
    }

    fn help_text(&self) -> &'static str {
        "User Commands:
  user list [--skip <n>] [--limit <n>]
    List the organization's user accounts

  user show <user-id>
    Show one user account

  user create <name> <email> [--mobile <number>] [--password <pw>]
    [--role <role>] [--status <status>]
    Invite a user; without --password the backend generates one

  user update <user-id> [--name <n>] [--email <e>] [--mobile <number>]
    [--status <active|inactive|suspended>]
    Edit a user account. Mobile clears when the flag is given without a
    value. Roles change via change-role

  user deactivate <user-id>
    Deactivate an account; the record is kept

  user change-role <user-id> <role>
    Set a user's role: super_admin, tenant_admin, manager, staff, viewer

Examples:
  user list
  user create 'Sam Okafor' sam@initech.example --role staff
  user change-role 0d9f2dd4-9c3b-4f6e-9a51-0a4f44a1f001 manager"
    }

    fn usage_examples(&self) -> Vec<&'static str> {
        vec![
            "user list --limit 50",
            "user create 'Sam Okafor' sam@initech.example --role staff",
            "user update 0d9f2dd4-9c3b-4f6e-9a51-0a4f44a1f001 --mobile ''",
            "user deactivate 0d9f2dd4-9c3b-4f6e-9a51-0a4f44a1f001",
        ]
    }

    fn category(&self) -> &'static str {
        "administration"
    }

    fn aliases(&self) -> Vec<&'static str> {
        vec!["users"]
    }

    fn required_permissions(&self, action: &str) -> Vec<(Resource, Action)> {
        match action {
            "list" | "ls" | "show" | "info" | "get" => vec![(Resource::Users, Action::Read)],
            "create" | "add" | "invite" => vec![(Resource::Users, Action::Create)],
            "update" | "edit" | "modify" | "change-role" | "role" => {
                vec![(Resource::Users, Action::Update)]
            }
            "deactivate" | "disable" => vec![(Resource::Users, Action::Delete)],
            _ => vec![],
        }
    }

    fn validate_args(&self, args: &CommandArgs) -> Result<()> {
        match args.action.as_str() {
            "show" | "update" | "deactivate" => {
                if args.positional.is_empty() {
                    return Err(anyhow!("User ID is required for {}", args.action));
                }
            }
            "create" => {
                if args.positional.len() < 2 {
                    return Err(anyhow!("Create requires: <name> <email>"));
                }
            }
            "change-role" => {
                if args.positional.len() < 2 {
                    return Err(anyhow!("Change-role requires: <user-id> <role>"));
                }
            }
            _ => {}
        }
        Ok(())
    }
}
