//! Subscription commands: plan, upgrades and invoices

use anyhow::Result;
use async_trait::async_trait;

use stocktake_api_types::{Action, Resource, Subscription, SubscriptionPlan};
use stocktake_client::{ClientError, StocktakeClient};

use crate::commands::console::command_trait::{CommandArgs, CommandOutput, ConsoleCommand};

pub struct SubscriptionCommand;

impl SubscriptionCommand {
    pub fn new() -> Self {
        Self
    }

    async fn show_subscription(&self, client: &StocktakeClient) -> Result<CommandOutput> {
        match client.subscriptions().current().await {
            Ok(subscription) => Ok(CommandOutput::text(render_subscription(&subscription))),
            Err(ClientError::NotFound) => {
                Ok(CommandOutput::text("No subscription on record"))
            }
            Err(error) => Err(error.into()),
        }
    }

    async fn upgrade(
        &self,
        args: &CommandArgs,
        client: &StocktakeClient,
    ) -> Result<CommandOutput> {
        let plan: SubscriptionPlan = args.require_positional(0, "plan")?.parse()?;

        match client.subscriptions().upgrade(plan).await {
            Ok(response) => Ok(CommandOutput::success_with_data(
                response.message,
                serde_json::to_value(&response.subscription)?,
            )),
            Err(ClientError::Conflict { detail }) | Err(ClientError::Validation { detail }) => {
                Ok(CommandOutput::error(format!("Upgrade rejected: {}", detail)))
            }
            Err(error) => Err(error.into()),
        }
    }

    async fn cancel(&self, client: &StocktakeClient) -> Result<CommandOutput> {
        match client.subscriptions().cancel().await {
            Ok(response) => Ok(CommandOutput::success(response.message)),
            Err(ClientError::Conflict { detail }) => {
                Ok(CommandOutput::error(format!("Cannot cancel: {}", detail)))
            }
            Err(error) => Err(error.into()),
        }
    }

    async fn list_invoices(&self, client: &StocktakeClient) -> Result<CommandOutput> {
        let invoices = client.subscriptions().invoices().await?;
        if invoices.is_empty() {
            return Ok(CommandOutput::text("No invoices"));
        }

        let headers = vec![
            "ID".to_string(),
            "Amount".to_string(),
            "Status".to_string(),
            "Due".to_string(),
            "Paid".to_string(),
        ];
        let rows: Vec<Vec<String>> = invoices
            .iter()
            .map(|invoice| {
                vec![
                    invoice.id.to_string(),
                    format!("{:.2} {}", invoice.amount, invoice.currency),
                    invoice.status.to_string(),
                    invoice
                        .due_date
                        .map(|date| date.to_string())
                        .unwrap_or_else(|| "-".to_string()),
                    invoice
                        .paid_at
                        .map(|at| at.format("%Y-%m-%d").to_string())
                        .unwrap_or_else(|| "-".to_string()),
                ]
            })
            .collect();

        Ok(CommandOutput::table_with_title(
            format!("Invoices ({})", invoices.len()),
            headers,
            rows,
        ))
    }
}

fn render_subscription(subscription: &Subscription) -> String {
    let mut lines = vec![
        format!("Plan: {}", subscription.plan),
        format!("Status: {}", subscription.status),
    ];
    if let Some(start) = subscription.current_period_start {
        lines.push(format!("Period start: {}", start.format("%Y-%m-%d")));
    }
    if let Some(end) = subscription.current_period_end {
        lines.push(format!("Period end: {}", end.format("%Y-%m-%d")));
    }
    if subscription.cancel_at_period_end {
        lines.push("Cancels at period end".to_string());
    }
    lines.join("\n")
}

#[async_trait]
impl ConsoleCommand for SubscriptionCommand {
    async fn execute(&self, args: CommandArgs, client: &StocktakeClient) -> Result<CommandOutput> {
        match args.action.as_str() {
            "show" | "info" | "current" => self.show_subscription(client).await,
            "upgrade" | "change" => self.upgrade(&args, client).await,
            "cancel" => self.cancel(client).await,
            "invoices" | "billing" => self.list_invoices(client).await,
            "help" | _ => Ok(CommandOutput::text(self.help_text().to_string())),
        }
    }

    fn completion_hints(&self, partial: &str) -> Vec<String> {
        let commands = vec!["show", "upgrade", "cancel", "invoices", "help"];
        commands
            .into_iter()
            .filter(|cmd| cmd.starts_with(partial))
            .map(|cmd| cmd.to_string())
            .collect()
    }

    fn summary(&self) -> &'static str {
        "Plan, upgrades and invoices"
    }

    fn help_text(&self) -> &'static str {
        "Subscription Commands:
  subscription show
    Show the current plan and billing period

  subscription upgrade <plan>
    Switch plans: free, trial, basic, premium, enterprise

  subscription cancel
    Cancel at the end of the current period

  subscription invoices
    List invoices"
    }

    fn usage_examples(&self) -> Vec<&'static str> {
        vec![
            "subscription show",
            "subscription upgrade premium",
            "subscription invoices",
        ]
    }

    fn category(&self) -> &'static str {
        "administration"
    }

    fn aliases(&self) -> Vec<&'static str> {
        vec!["sub", "billing"]
    }

    fn default_action(&self) -> &'static str {
        "show"
    }

    fn required_permissions(&self, action: &str) -> Vec<(Resource, Action)> {
        match action {
            "show" | "info" | "current" | "invoices" | "billing" => {
                vec![(Resource::Settings, Action::Read)]
            }
            "upgrade" | "change" | "cancel" => vec![(Resource::Settings, Action::Update)],
            _ => vec![],
        }
    }

    fn validate_args(&self, args: &CommandArgs) -> Result<()> {
        if args.action == "upgrade" && args.positional.is_empty() {
            return Err(anyhow::anyhow!("Upgrade requires: <plan>"));
        }
        Ok(())
    }
}
