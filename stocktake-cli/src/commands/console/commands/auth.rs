//! Authentication commands: sign-in, signup, sign-out and caller identity

use anyhow::{anyhow, Result};
use async_trait::async_trait;

use stocktake_api_types::SignupRequest;
use stocktake_client::{ClientError, RoleResolution, StocktakeClient};

use crate::commands::console::command_trait::{CommandArgs, CommandOutput, ConsoleCommand};

/// Session and identity commands. The only category usable while signed out.
pub struct AuthCommand;

impl AuthCommand {
    pub fn new() -> Self {
        Self
    }

    async fn login(&self, args: &CommandArgs, client: &StocktakeClient) -> Result<CommandOutput> {
        let email = args.require_positional(0, "email")?;
        let password = args.require_positional(1, "password")?;

        match client.sign_in(email, password).await {
            Ok(_) => {
                let snapshot = client.context().snapshot().await;
                let organization = snapshot
                    .tenant
                    .map(|tenant| tenant.name)
                    .unwrap_or_else(|| "(organization unavailable)".to_string());
                Ok(CommandOutput::success(format!(
                    "Signed in as {} ({}) at {}",
                    email,
                    describe_role(snapshot.role),
                    organization
                )))
            }
            Err(ClientError::Auth(detail)) => {
                Ok(CommandOutput::error(format!("Sign-in failed: {}", detail)))
            }
            Err(error) => Err(error.into()),
        }
    }

    async fn signup(&self, args: &CommandArgs, client: &StocktakeClient) -> Result<CommandOutput> {
        let email = args.require_positional(0, "email")?;
        let password = args.require_positional(1, "password")?;
        let name = args
            .get_flag("name")
            .ok_or_else(|| anyhow!("--name is required"))?;
        let organization = args
            .get_flag("organization")
            .ok_or_else(|| anyhow!("--organization is required"))?;

        let request = SignupRequest {
            email: email.to_string(),
            password: password.to_string(),
            name: name.to_string(),
            organization_name: organization.to_string(),
        };

        match client.sign_up(&request).await {
            Ok(response) => Ok(CommandOutput::success_with_data(
                format!("{} Signed in as {}.", response.message, response.email),
                serde_json::to_value(&response)?,
            )),
            Err(ClientError::Conflict { detail }) | Err(ClientError::Validation { detail }) => {
                Ok(CommandOutput::error(format!("Signup rejected: {}", detail)))
            }
            Err(error) => Err(error.into()),
        }
    }

    async fn logout(&self, client: &StocktakeClient) -> Result<CommandOutput> {
        if !client.session().is_signed_in().await {
            return Ok(CommandOutput::text("Already signed out"));
        }
        client.sign_out().await;
        Ok(CommandOutput::success("Signed out"))
    }

    async fn reset(&self, args: &CommandArgs, client: &StocktakeClient) -> Result<CommandOutput> {
        let email = args.require_positional(0, "email")?;
        client.reset_password(email).await?;
        Ok(CommandOutput::success(format!(
            "Password reset requested for {}. Check the inbox for instructions.",
            email
        )))
    }

    async fn whoami(&self, client: &StocktakeClient) -> Result<CommandOutput> {
        if !client.session().is_signed_in().await {
            return Ok(CommandOutput::text("Signed out"));
        }

        let snapshot = client.context().snapshot().await;
        let mut lines = Vec::new();
        match &snapshot.user {
            Some(user) => {
                if let Some(name) = user.name.as_deref() {
                    lines.push(format!("Name: {}", name));
                }
                lines.push(format!("Email: {}", user.email));
                if let Some(status) = user.status {
                    lines.push(format!("Status: {}", status));
                }
            }
            None => lines.push("User: (profile unavailable)".to_string()),
        }
        match snapshot.role {
            RoleResolution::Resolved(role) => lines.push(format!("Role: {}", role)),
            RoleResolution::Pending => {
                lines.push("Role: pending (read-only until resolved)".to_string())
            }
        }
        match &snapshot.tenant {
            Some(tenant) => lines.push(format!(
                "Organization: {} ({} plan)",
                tenant.name, tenant.subscription_plan
            )),
            None => lines.push("Organization: (organization unavailable)".to_string()),
        }

        Ok(CommandOutput::text(lines.join("\n")))
    }
}

fn describe_role(role: RoleResolution) -> String {
    match role {
        RoleResolution::Resolved(role) => role.to_string(),
        RoleResolution::Pending => "pending".to_string(),
    }
}

#[async_trait]
impl ConsoleCommand for AuthCommand {
    async fn execute(&self, args: CommandArgs, client: &StocktakeClient) -> Result<CommandOutput> {
        match args.action.as_str() {
            "login" | "signin" => self.login(&args, client).await,
            "signup" | "register" => self.signup(&args, client).await,
            "logout" | "signout" => self.logout(client).await,
            "reset" | "reset-password" => self.reset(&args, client).await,
            "whoami" | "me" | "status" => self.whoami(client).await,
            "help" | _ => Ok(CommandOutput::text(self.help_text().to_string())),
        }
    }

    fn completion_hints(&self, partial: &str) -> Vec<String> {
        let commands = vec!["login", "signup", "logout", "reset", "whoami", "help"];
        commands
            .into_iter()
            .filter(|cmd| cmd.starts_with(partial))
            .map(|cmd| cmd.to_string())
            .collect()
    }

    fn summary(&self) -> &'static str {
        "Sign in, sign up and inspect the current session"
    }

    fn help_text(&self) -> &'static str {
        "Authentication Commands:
  auth login <email> <password>
    Sign in and resolve your profile, role and organization

  auth signup <email> <password> --name <name> --organization <org>
    Provision a new organization with yourself as its first admin

  auth logout
    Sign out and drop the resolved context

  auth reset <email>
    Request a password reset email

  auth whoami
    Show the signed-in user, effective role and organization

Examples:
  auth login dana@initech.example hunter2
  auth signup pat@example.com s3cret --name Pat --organization Initech
  auth reset dana@initech.example
  whoami"
    }

    fn usage_examples(&self) -> Vec<&'static str> {
        vec![
            "auth login dana@initech.example hunter2",
            "auth signup dana@initech.example hunter2 --name \"Dana Ruiz\" --organization Initech",
            "whoami",
        ]
    }

    fn requires_session(&self) -> bool {
        false
    }

    fn category(&self) -> &'static str {
        "auth"
    }

    fn aliases(&self) -> Vec<&'static str> {
        vec!["whoami"]
    }

    fn default_action(&self) -> &'static str {
        "whoami"
    }

    fn validate_args(&self, args: &CommandArgs) -> Result<()> {
        match args.action.as_str() {
            "login" => {
                if args.positional.len() < 2 {
                    return Err(anyhow!("Usage: auth login <email> <password>"));
                }
            }
            "signup" => {
                if args.positional.len() < 2 {
                    return Err(anyhow!(
                        "Usage: auth signup <email> <password> --name <n> --organization <org>"
                    ));
                }
            }
            "reset" => {
                if args.positional.is_empty() {
                    return Err(anyhow!("Usage: auth reset <email>"));
                }
            }
            _ => {}
        }
        Ok(())
    }
}
