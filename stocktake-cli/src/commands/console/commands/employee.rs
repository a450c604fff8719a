//! Employee commands: the people assets get handed out to

use anyhow::{anyhow, Result};
use async_trait::async_trait;

use stocktake_api_types::{
    Action, CreateEmployee, Employee, EmployeeFilter, EmployeeId, Resource, UpdateEmployee,
};
use stocktake_client::{ClientError, StocktakeClient};

use super::note_edit;
use crate::commands::console::command_trait::{CommandArgs, CommandOutput, ConsoleCommand};

pub struct EmployeeCommand;

impl EmployeeCommand {
    pub fn new() -> Self {
        Self
    }

    async fn list_employees(
        &self,
        args: &CommandArgs,
        client: &StocktakeClient,
    ) -> Result<CommandOutput> {
        let filter = EmployeeFilter {
            department: args.get_flag("department").map(str::to_string),
            skip: args.parse_flag("skip")?,
            limit: args.parse_flag("limit")?,
        };

        let employees = client.employees().list(&filter).await?;
        if employees.is_empty() {
            return Ok(CommandOutput::text("No employees match the filter"));
        }

        let headers = vec![
            "ID".to_string(),
            "Name".to_string(),
            "Email".to_string(),
            "Department".to_string(),
            "Position".to_string(),
        ];
        let rows: Vec<Vec<String>> = employees
            .iter()
            .map(|employee| {
                vec![
                    employee.id.to_string(),
                    employee.name.clone(),
                    employee.email.clone(),
                    employee
                        .department
                        .clone()
                        .unwrap_or_else(|| "N/A".to_string()),
                    employee
                        .position
                        .clone()
                        .unwrap_or_else(|| "N/A".to_string()),
                ]
            })
            .collect();

        let title = match &filter.department {
            Some(department) => format!("Employees ({})", department),
            None => format!("Employees ({})", employees.len()),
        };
        Ok(CommandOutput::table_with_title(title, headers, rows))
    }

    async fn show_employee(
        &self,
        args: &CommandArgs,
        client: &StocktakeClient,
    ) -> Result<CommandOutput> {
        let raw = args.require_positional(0, "employee ID")?;
        let id: EmployeeId = raw
            .parse()
            .map_err(|_| anyhow!("Invalid employee ID '{}'", raw))?;

        match client.employees().get(id).await {
            Ok(employee) => Ok(CommandOutput::text(render_employee(&employee))),
            Err(ClientError::NotFound) => Ok(CommandOutput::error(format!(
                "Employee '{}' not found",
                raw
            ))),
            Err(error) => Err(error.into()),
        }
    }

    async fn create_employee(
        &self,
        args: &CommandArgs,
        client: &StocktakeClient,
    ) -> Result<CommandOutput> {
        let name = args.require_positional(0, "name")?;
        let email = args.require_positional(1, "email")?;

        let request = CreateEmployee {
            name: name.to_string(),
            email: email.to_string(),
            department: args.get_flag("department").map(str::to_string),
            position: args.get_flag("position").map(str::to_string),
        };

        match client.employees().create(&request).await {
            Ok(employee) => Ok(CommandOutput::success_with_data(
                format!("Employee '{}' created with ID {}", employee.name, employee.id),
                serde_json::to_value(&employee)?,
            )),
            Err(ClientError::Conflict { detail }) | Err(ClientError::Validation { detail }) => {
                Ok(CommandOutput::error(format!("Rejected: {}", detail)))
            }
            Err(error) => Err(error.into()),
        }
    }

    async fn update_employee(
        &self,
        args: &CommandArgs,
        client: &StocktakeClient,
    ) -> Result<CommandOutput> {
        let raw = args.require_positional(0, "employee ID")?;
        let id: EmployeeId = raw
            .parse()
            .map_err(|_| anyhow!("Invalid employee ID '{}'", raw))?;

        let mut update = UpdateEmployee::default();
        let mut changes = Vec::new();

        if let Some(name) = args.get_flag("name") {
            update.name = Some(name.to_string());
            changes.push(format!("name -> {}", name));
        }
        if let Some(email) = args.get_flag("email") {
            update.email = Some(email.to_string());
            changes.push(format!("email -> {}", email));
        }
        update.department = args.edit_flag("department")?;
        note_edit(&mut changes, "department", &update.department);
        update.position = args.edit_flag("position")?;
        note_edit(&mut changes, "position", &update.position);

        if changes.is_empty() {
            return Ok(CommandOutput::error(
                "No changes specified. Use --name, --email, --department or --position.",
            ));
        }

        match client.employees().update(id, &update).await {
            Ok(employee) => Ok(CommandOutput::success_with_data(
                format!(
                    "Employee '{}' updated. Changes: {}",
                    employee.name,
                    changes.join(", ")
                ),
                serde_json::to_value(&employee)?,
            )),
            Err(ClientError::NotFound) => Ok(CommandOutput::error(format!(
                "Employee '{}' not found",
                raw
            ))),
            Err(ClientError::Validation { detail }) => {
                Ok(CommandOutput::error(format!("Update rejected: {}", detail)))
            }
            Err(error) => Err(error.into()),
        }
    }

    async fn delete_employee(
        &self,
        args: &CommandArgs,
        client: &StocktakeClient,
    ) -> Result<CommandOutput> {
        let raw = args.require_positional(0, "employee ID")?;
        let id: EmployeeId = raw
            .parse()
            .map_err(|_| anyhow!("Invalid employee ID '{}'", raw))?;

        match client.employees().delete(id).await {
            Ok(()) => Ok(CommandOutput::success(format!("Employee {} deleted", raw))),
            Err(ClientError::NotFound) => Ok(CommandOutput::error(format!(
                "Employee '{}' not found",
                raw
            ))),
            Err(ClientError::Conflict { detail }) => Ok(CommandOutput::error(format!(
                "Cannot delete employee {}: {}",
                raw, detail
            ))),
            Err(error) => Err(error.into()),
        }
    }
}

fn render_employee(employee: &Employee) -> String {
    let mut lines = vec![
        format!("ID: {}", employee.id),
        format!("Name: {}", employee.name),
        format!("Email: {}", employee.email),
    ];
    if let Some(department) = &employee.department {
        lines.push(format!("Department: {}", department));
    }
    if let Some(position) = &employee.position {
        lines.push(format!("Position: {}", position));
    }
    lines.push(format!(
        "Created: {}",
        employee.created_at.format("%Y-%m-%d %H:%M")
    ));
    lines.join("\n")
}

#[async_trait]
impl ConsoleCommand for EmployeeCommand {
    async fn execute(&self, args: CommandArgs, client: &StocktakeClient) -> Result<CommandOutput> {
        match args.action.as_str() {
            "list" | "ls" => self.list_employees(&args, client).await,
            "show" | "info" | "get" => self.show_employee(&args, client).await,
            "create" | "add" | "new" => self.create_employee(&args, client).await,
            "update" | "edit" | "modify" => self.update_employee(&args, client).await,
            "delete" | "remove" | "rm" => self.delete_employee(&args, client).await,
            "help" | _ => Ok(CommandOutput::text(self.help_text().to_string())),
        }
    }

    fn completion_hints(&self, partial: &str) -> Vec<String> {
        let commands = vec!["list", "show", "create", "update", "delete", "help"];
        commands
            .into_iter()
            .filter(|cmd| cmd.starts_with(partial))
            .map(|cmd| cmd.to_string())
            .collect()
    }

    fn summary(&self) -> &'static str {
        "Manage employee records"
    }

    fn help_text(&self) -> &'static str {
        "Employee Commands:
  employee list [--department <name>] [--skip <n>] [--limit <n>]
    List employees, optionally filtered by department

  employee show <employee-id>
    Show one employee record

  employee create <name> <email> [--department <d>] [--position <p>]
    Add an employee

  employee update <employee-id> [--name <n>] [--email <e>]
    [--department <d>] [--position <p>]
    Edit an employee. Department and position clear when the flag is
    given without a value

  employee delete <employee-id>
    Delete an employee; refused while assignment history references them

Examples:
  employee list --department Engineering
  employee create 'Dana Ruiz' dana@initech.example --department Engineering"
    }

    fn usage_examples(&self) -> Vec<&'static str> {
        vec![
            "employee list",
            "employee create 'Dana Ruiz' dana@initech.example --position 'Site Lead'",
            "employee update 9a510a4f-44a1-4001-8d9f-2dd49c3b4f6e --department ''",
        ]
    }

    fn category(&self) -> &'static str {
        "inventory"
    }

    fn aliases(&self) -> Vec<&'static str> {
        vec!["employees", "emp"]
    }

    fn required_permissions(&self, action: &str) -> Vec<(Resource, Action)> {
        match action {
            "list" | "ls" | "show" | "info" | "get" => vec![(Resource::Employees, Action::Read)],
            "create" | "add" | "new" => vec![(Resource::Employees, Action::Create)],
            "update" | "edit" | "modify" => vec![(Resource::Employees, Action::Update)],
            "delete" | "remove" | "rm" => vec![(Resource::Employees, Action::Delete)],
            _ => vec![],
        }
    }

    fn validate_args(&self, args: &CommandArgs) -> Result<()> {
        match args.action.as_str() {
            "show" | "update" | "delete" => {
                if args.positional.is_empty() {
                    return Err(anyhow!("Employee ID is required for {}", args.action));
                }
            }
            "create" => {
                if args.positional.len() < 2 {
                    return Err(anyhow!("Create requires: <name> <email>"));
                }
            }
            _ => {}
        }
        Ok(())
    }
}
