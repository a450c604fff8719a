//! Command registry for console commands

use anyhow::{anyhow, Result};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

use stocktake_client::StocktakeClient;

use super::command_trait::{CommandArgs, CommandOutput, ConsoleCommand};
use super::commands::{
    AssetCommand, AssignmentCommand, AuditCommand, AuthCommand, DashboardCommand, EmployeeCommand,
    RoleCommand, SubscriptionCommand, TenantCommand, UserCommand,
};

/// Registry for managing console commands
pub struct CommandRegistry {
    commands: HashMap<String, Arc<dyn ConsoleCommand>>,
    aliases: HashMap<String, String>,
}

impl CommandRegistry {
    /// Create a new command registry with all console commands
    pub fn new() -> Self {
        let mut registry = Self {
            commands: HashMap::new(),
            aliases: HashMap::new(),
        };

        registry.register_command("auth", Arc::new(AuthCommand::new()));
        registry.register_command("dashboard", Arc::new(DashboardCommand::new()));
        registry.register_command("asset", Arc::new(AssetCommand::new()));
        registry.register_command("employee", Arc::new(EmployeeCommand::new()));
        registry.register_command("assignment", Arc::new(AssignmentCommand::new()));
        registry.register_command("user", Arc::new(UserCommand::new()));
        registry.register_command("role", Arc::new(RoleCommand::new()));
        registry.register_command("tenant", Arc::new(TenantCommand::new()));
        registry.register_command("subscription", Arc::new(SubscriptionCommand::new()));
        registry.register_command("audit", Arc::new(AuditCommand::new()));

        registry
    }

    /// Register a command with the registry
    pub fn register_command(&mut self, name: &str, command: Arc<dyn ConsoleCommand>) {
        for alias in command.aliases() {
            self.aliases.insert(alias.to_string(), name.to_string());
        }

        self.commands.insert(name.to_string(), command);
    }

    /// Get a command by name or alias
    pub fn get_command(&self, name: &str) -> Option<&Arc<dyn ConsoleCommand>> {
        if let Some(command) = self.commands.get(name) {
            return Some(command);
        }

        if let Some(real_name) = self.aliases.get(name) {
            return self.commands.get(real_name);
        }

        None
    }

    /// Execute a command with the given arguments
    pub async fn execute_command(
        &self,
        command_name: &str,
        mut args: CommandArgs,
        client: &StocktakeClient,
    ) -> Result<CommandOutput> {
        let command = self
            .get_command(command_name)
            .ok_or_else(|| anyhow!("Unknown command: {}", command_name))?;

        if args.action.is_empty() {
            args.action = command.default_action().to_string();
        }

        debug!(command = command_name, args = ?args.raw_args, "executing console command");

        // Validate arguments
        command.validate_args(&args)?;

        // Check session requirement
        if command.requires_session() && !client.session().is_signed_in().await {
            return Ok(CommandOutput::error(
                "Not signed in. Use 'auth login <email> <password>' first.",
            ));
        }

        // Advisory gate check: deny the affordance locally without issuing
        // the request. The backend enforces authorization regardless.
        for (resource, action) in command.required_permissions(&args.action) {
            if !client.context().allows(resource, action).await {
                let role = client.context().effective_role().await;
                return Ok(CommandOutput::error(format!(
                    "Not allowed for the current role ({}): '{} {}' needs '{}' on '{}'",
                    role, command_name, args.action, action, resource
                )));
            }
        }

        // Execute command
        command.execute(args, client).await
    }

    /// Get completion hints for a command
    pub fn get_completion_hints(&self, command_name: &str, partial: &str) -> Vec<String> {
        if let Some(command) = self.get_command(command_name) {
            command.completion_hints(partial)
        } else {
            vec![]
        }
    }

    /// Get help text for a command
    pub fn get_help_text(&self, command_name: &str) -> Option<String> {
        self.get_command(command_name)
            .map(|command| command.help_text().to_string())
    }

    /// List commands the current role is offered, with a one-line summary.
    ///
    /// A command whose default affordance the gate denies stays out of the
    /// listing entirely.
    pub async fn offered_commands(&self, client: &StocktakeClient) -> Vec<(String, String)> {
        let mut offered = Vec::new();

        'commands: for (name, command) in &self.commands {
            for (resource, action) in command.required_permissions(command.default_action()) {
                if !client.context().allows(resource, action).await {
                    continue 'commands;
                }
            }
            offered.push((name.clone(), command.summary().to_string()));
        }

        offered.sort();
        offered
    }

    /// Get command names for completion
    pub fn get_command_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.commands.keys().cloned().collect();
        names.extend(self.aliases.keys().cloned());
        names.sort();
        names
    }

    /// Check if command exists
    pub fn has_command(&self, name: &str) -> bool {
        self.commands.contains_key(name) || self.aliases.contains_key(name)
    }

    /// Get command usage examples
    pub fn get_usage_examples(&self, command_name: &str) -> Vec<String> {
        self.get_command(command_name)
            .map(|command| {
                command
                    .usage_examples()
                    .into_iter()
                    .map(|s| s.to_string())
                    .collect()
            })
            .unwrap_or_default()
    }
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new()
    }
}
