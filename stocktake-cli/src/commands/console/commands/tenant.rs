//! Tenant commands: the caller's own organization

use anyhow::Result;
use async_trait::async_trait;

use stocktake_api_types::{Action, Resource, Tenant, UpdateTenant};
use stocktake_client::{ClientError, StocktakeClient};

use super::note_edit;
use crate::commands::console::command_trait::{CommandArgs, CommandOutput, ConsoleCommand};

pub struct TenantCommand;

impl TenantCommand {
    pub fn new() -> Self {
        Self
    }

    async fn show_tenant(&self, client: &StocktakeClient) -> Result<CommandOutput> {
        let tenant = client.tenants().current().await?;
        Ok(CommandOutput::text(render_tenant(&tenant)))
    }

    async fn update_tenant(
        &self,
        args: &CommandArgs,
        client: &StocktakeClient,
    ) -> Result<CommandOutput> {
        let mut update = UpdateTenant::default();
        let mut changes = Vec::new();

        if let Some(name) = args.get_flag("name") {
            update.name = Some(name.to_string());
            changes.push(format!("name -> {}", name));
        }
        update.logo_url = args.edit_flag("logo-url")?;
        note_edit(&mut changes, "logo_url", &update.logo_url);
        if let Some(raw) = args.get_flag("theme") {
            update.theme = Some(args.parse_json(raw)?);
            changes.push("theme -> <replaced>".to_string());
        }
        if let Some(raw) = args.get_flag("settings") {
            update.settings = Some(args.parse_json(raw)?);
            changes.push("settings -> <replaced>".to_string());
        }

        if changes.is_empty() {
            return Ok(CommandOutput::error(
                "No changes specified. Use --name, --logo-url, --theme or --settings.",
            ));
        }

        // Updates always target the caller's own organization.
        let tenant = client.tenants().current().await?;
        match client.tenants().update(tenant.id, &update).await {
            Ok(updated) => Ok(CommandOutput::success_with_data(
                format!(
                    "Organization '{}' updated. Changes: {}",
                    updated.name,
                    changes.join(", ")
                ),
                serde_json::to_value(&updated)?,
            )),
            Err(ClientError::Forbidden { detail }) | Err(ClientError::Validation { detail }) => {
                Ok(CommandOutput::error(format!("Update rejected: {}", detail)))
            }
            Err(error) => Err(error.into()),
        }
    }
}

fn render_tenant(tenant: &Tenant) -> String {
    let mut lines = vec![
        format!("ID: {}", tenant.id),
        format!("Name: {}", tenant.name),
        format!("Slug: {}", tenant.slug),
        format!("Status: {}", tenant.status),
        format!(
            "Plan: {} ({})",
            tenant.subscription_plan, tenant.subscription_status
        ),
    ];
    if let Some(expires) = tenant.subscription_expires_at {
        lines.push(format!("Plan expires: {}", expires.format("%Y-%m-%d")));
    }
    if let Some(logo) = &tenant.logo_url {
        lines.push(format!("Logo: {}", logo));
    }
    if let Some(theme) = &tenant.theme {
        lines.push(format!("Theme: {}", theme));
    }
    lines.push(format!("Created: {}", tenant.created_at.format("%Y-%m-%d")));
    lines.join("\n")
}

#[async_trait]
impl ConsoleCommand for TenantCommand {
    async fn execute(&self, args: CommandArgs, client: &StocktakeClient) -> Result<CommandOutput> {
        match args.action.as_str() {
            "show" | "info" | "current" => self.show_tenant(client).await,
            "update" | "edit" | "modify" => self.update_tenant(&args, client).await,
            "help" | _ => Ok(CommandOutput::text(self.help_text().to_string())),
        }
    }

    fn completion_hints(&self, partial: &str) -> Vec<String> {
        let commands = vec!["show", "update", "help"];
        commands
            .into_iter()
            .filter(|cmd| cmd.starts_with(partial))
            .map(|cmd| cmd.to_string())
            .collect()
    }

    fn summary(&self) -> &'static str {
        "Show and edit your organization"
    }

    fn help_text(&self) -> &'static str {
        "Tenant Commands:
  tenant show
    Show your organization, its subscription plan and branding

  tenant update [--name <n>] [--logo-url <url>] [--theme <json>]
    [--settings <json>]
    Edit the organization. The logo clears when --logo-url is given
    without a value

Examples:
  tenant show
  tenant update --name 'Initech GmbH' --logo-url https://cdn.example/logo.png
  tenant update --logo-url ''"
    }

    fn usage_examples(&self) -> Vec<&'static str> {
        vec!["tenant show", "tenant update --name 'Initech GmbH'"]
    }

    fn category(&self) -> &'static str {
        "administration"
    }

    fn aliases(&self) -> Vec<&'static str> {
        vec!["org", "organization"]
    }

    fn default_action(&self) -> &'static str {
        "show"
    }

    fn required_permissions(&self, action: &str) -> Vec<(Resource, Action)> {
        match action {
            "show" | "info" | "current" => vec![(Resource::Settings, Action::Read)],
            "update" | "edit" | "modify" => vec![(Resource::Settings, Action::Update)],
            _ => vec![],
        }
    }
}
