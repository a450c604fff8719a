//! Dashboard command: inventory counts fetched concurrently

use anyhow::Result;
use async_trait::async_trait;

use stocktake_api_types::{
    Action, AssetFilter, AssetStatus, AssignmentFilter, AssignmentStatus, EmployeeFilter, Resource,
};
use stocktake_client::StocktakeClient;

use crate::commands::console::command_trait::{CommandArgs, CommandOutput, ConsoleCommand};

pub struct DashboardCommand;

impl DashboardCommand {
    pub fn new() -> Self {
        Self
    }

    async fn show(&self, client: &StocktakeClient) -> Result<CommandOutput> {
        let asset_filter = AssetFilter::default();
        let employee_filter = EmployeeFilter::default();
        let assignment_filter = AssignmentFilter {
            status: Some(AssignmentStatus::Active),
            ..AssignmentFilter::default()
        };

        // All three fetches or none; a partial dashboard would misreport.
        let asset_service = client.assets();
        let employee_service = client.employees();
        let assignment_service = client.assignments();
        let (assets, employees, active) = tokio::try_join!(
            asset_service.list(&asset_filter),
            employee_service.list(&employee_filter),
            assignment_service.list(&assignment_filter),
        )?;

        let by_status =
            |status: AssetStatus| assets.iter().filter(|asset| asset.status == status).count();

        let rows = vec![
            vec!["Assets".to_string(), assets.len().to_string()],
            vec![
                "  available".to_string(),
                by_status(AssetStatus::Available).to_string(),
            ],
            vec![
                "  assigned".to_string(),
                by_status(AssetStatus::Assigned).to_string(),
            ],
            vec![
                "  maintenance".to_string(),
                by_status(AssetStatus::Maintenance).to_string(),
            ],
            vec![
                "  retired".to_string(),
                by_status(AssetStatus::Retired).to_string(),
            ],
            vec!["Employees".to_string(), employees.len().to_string()],
            vec!["Active assignments".to_string(), active.len().to_string()],
        ];

        Ok(CommandOutput::table_with_title(
            "Inventory Overview",
            vec!["Metric".to_string(), "Count".to_string()],
            rows,
        ))
    }
}

#[async_trait]
impl ConsoleCommand for DashboardCommand {
    async fn execute(&self, args: CommandArgs, client: &StocktakeClient) -> Result<CommandOutput> {
        match args.action.as_str() {
            "show" | "summary" | "overview" => self.show(client).await,
            "help" | _ => Ok(CommandOutput::text(self.help_text().to_string())),
        }
    }

    fn completion_hints(&self, partial: &str) -> Vec<String> {
        let commands = vec!["show", "help"];
        commands
            .into_iter()
            .filter(|cmd| cmd.starts_with(partial))
            .map(|cmd| cmd.to_string())
            .collect()
    }

    fn summary(&self) -> &'static str {
        "Inventory counts at a glance"
    }

    fn help_text(&self) -> &'static str {
        "Dashboard Commands:
  dashboard [show]
    Fetch asset, employee and active-assignment counts in one round of
    concurrent requests. The overview fails as a whole if any fetch fails."
    }

    fn usage_examples(&self) -> Vec<&'static str> {
        vec!["dashboard"]
    }

    fn category(&self) -> &'static str {
        "inventory"
    }

    fn aliases(&self) -> Vec<&'static str> {
        vec!["overview"]
    }

    fn default_action(&self) -> &'static str {
        "show"
    }

    fn required_permissions(&self, action: &str) -> Vec<(Resource, Action)> {
        match action {
            "show" | "summary" | "overview" => vec![
                (Resource::Assets, Action::Read),
                (Resource::Employees, Action::Read),
                (Resource::Assignments, Action::Read),
            ],
            _ => vec![],
        }
    }
}
