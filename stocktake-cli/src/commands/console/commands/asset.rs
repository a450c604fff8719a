//! Asset commands: inventory listing, registration and lifecycle edits

use anyhow::{anyhow, Result};
use async_trait::async_trait;

use stocktake_api_types::{
    Action, Asset, AssetFilter, AssetId, AssetStatus, CreateAsset, Resource, UpdateAsset,
};
use stocktake_client::{ClientError, StocktakeClient};

use super::note_edit;
use crate::commands::console::command_trait::{CommandArgs, CommandOutput, ConsoleCommand};

pub struct AssetCommand;

impl AssetCommand {
    pub fn new() -> Self {
        Self
    }

    async fn list_assets(
        &self,
        args: &CommandArgs,
        client: &StocktakeClient,
    ) -> Result<CommandOutput> {
        let filter = AssetFilter {
            status: args.parse_flag("status")?,
            category: args.get_flag("category").map(str::to_string),
            skip: args.parse_flag("skip")?,
            limit: args.parse_flag("limit")?,
        };

        let assets = client.assets().list(&filter).await?;
        if assets.is_empty() {
            return Ok(CommandOutput::text("No assets match the filter"));
        }

        let headers = vec![
            "ID".to_string(),
            "Tag".to_string(),
            "Name".to_string(),
            "Category".to_string(),
            "Status".to_string(),
            "Serial".to_string(),
        ];
        let rows: Vec<Vec<String>> = assets
            .iter()
            .map(|asset| {
                vec![
                    asset.id.to_string(),
                    asset.asset_tag.clone(),
                    asset.name.clone(),
                    asset.category.clone(),
                    asset.status.to_string(),
                    asset
                        .serial_number
                        .clone()
                        .unwrap_or_else(|| "N/A".to_string()),
                ]
            })
            .collect();

        let title = match filter.status {
            Some(status) => format!("Assets (status: {})", status),
            None => format!("Assets ({})", assets.len()),
        };
        Ok(CommandOutput::table_with_title(title, headers, rows))
    }

    async fn show_asset(
        &self,
        args: &CommandArgs,
        client: &StocktakeClient,
    ) -> Result<CommandOutput> {
        let raw = args.require_positional(0, "asset ID")?;
        let id: AssetId = raw
            .parse()
            .map_err(|_| anyhow!("Invalid asset ID '{}'", raw))?;

        match client.assets().get(id).await {
            Ok(asset) => Ok(CommandOutput::text(render_asset(&asset))),
            Err(ClientError::NotFound) => {
                Ok(CommandOutput::error(format!("Asset '{}' not found", raw)))
            }
            Err(error) => Err(error.into()),
        }
    }

    async fn create_asset(
        &self,
        args: &CommandArgs,
        client: &StocktakeClient,
    ) -> Result<CommandOutput> {
        let asset_tag = args.require_positional(0, "asset tag")?;
        let name = args.require_positional(1, "name")?;
        let category = args.require_positional(2, "category")?;

        let request = CreateAsset {
            asset_tag: asset_tag.to_string(),
            name: name.to_string(),
            category: category.to_string(),
            brand: args.get_flag("brand").map(str::to_string),
            model: args.get_flag("model").map(str::to_string),
            serial_number: args.get_flag("serial-number").map(str::to_string),
            purchase_date: args.parse_flag("purchase-date")?,
            purchase_price: args.parse_flag("purchase-price")?,
            status: args.parse_flag("status")?,
            notes: args.get_flag("notes").map(str::to_string),
        };

        match client.assets().create(&request).await {
            Ok(asset) => Ok(CommandOutput::success_with_data(
                format!("Asset '{}' created with ID {}", asset.asset_tag, asset.id),
                serde_json::to_value(&asset)?,
            )),
            Err(ClientError::Conflict { detail }) => Ok(CommandOutput::error(format!(
                "Cannot create asset '{}': {}",
                asset_tag, detail
            ))),
            Err(ClientError::Validation { detail }) => {
                Ok(CommandOutput::error(format!("Rejected: {}", detail)))
            }
            Err(error) => Err(error.into()),
        }
    }

    async fn update_asset(
        &self,
        args: &CommandArgs,
        client: &StocktakeClient,
    ) -> Result<CommandOutput> {
        let raw = args.require_positional(0, "asset ID")?;
        let id: AssetId = raw
            .parse()
            .map_err(|_| anyhow!("Invalid asset ID '{}'", raw))?;

        let mut update = UpdateAsset::default();
        let mut changes = Vec::new();

        if let Some(tag) = args.get_flag("asset-tag") {
            update.asset_tag = Some(tag.to_string());
            changes.push(format!("asset_tag -> {}", tag));
        }
        if let Some(name) = args.get_flag("name") {
            update.name = Some(name.to_string());
            changes.push(format!("name -> {}", name));
        }
        if let Some(category) = args.get_flag("category") {
            update.category = Some(category.to_string());
            changes.push(format!("category -> {}", category));
        }
        if let Some(status) = args.parse_flag::<AssetStatus>("status")? {
            update.status = Some(status);
            changes.push(format!("status -> {}", status));
        }
        update.brand = args.edit_flag("brand")?;
        note_edit(&mut changes, "brand", &update.brand);
        update.model = args.edit_flag("model")?;
        note_edit(&mut changes, "model", &update.model);
        update.serial_number = args.edit_flag("serial-number")?;
        note_edit(&mut changes, "serial_number", &update.serial_number);
        update.purchase_date = args.edit_flag("purchase-date")?;
        note_edit(&mut changes, "purchase_date", &update.purchase_date);
        update.purchase_price = args.edit_flag("purchase-price")?;
        note_edit(&mut changes, "purchase_price", &update.purchase_price);
        update.notes = args.edit_flag("notes")?;
        note_edit(&mut changes, "notes", &update.notes);

        if changes.is_empty() {
            return Ok(CommandOutput::error(
                "No changes specified. Use --name, --status, --brand, etc.",
            ));
        }

        match client.assets().update(id, &update).await {
            Ok(asset) => Ok(CommandOutput::success_with_data(
                format!(
                    "Asset '{}' updated. Changes: {}",
                    asset.asset_tag,
                    changes.join(", ")
                ),
                serde_json::to_value(&asset)?,
            )),
            Err(ClientError::NotFound) => {
                Ok(CommandOutput::error(format!("Asset '{}' not found", raw)))
            }
            Err(ClientError::Conflict { detail }) | Err(ClientError::Validation { detail }) => {
                Ok(CommandOutput::error(format!("Update rejected: {}", detail)))
            }
            Err(error) => Err(error.into()),
        }
    }

    async fn delete_asset(
        &self,
        args: &CommandArgs,
        client: &StocktakeClient,
    ) -> Result<CommandOutput> {
        let raw = args.require_positional(0, "asset ID")?;
        let id: AssetId = raw
            .parse()
            .map_err(|_| anyhow!("Invalid asset ID '{}'", raw))?;

        match client.assets().delete(id).await {
            Ok(()) => Ok(CommandOutput::success(format!("Asset {} deleted", raw))),
            Err(ClientError::NotFound) => {
                Ok(CommandOutput::error(format!("Asset '{}' not found", raw)))
            }
            Err(ClientError::Conflict { detail }) => Ok(CommandOutput::error(format!(
                "Cannot delete asset {}: {}",
                raw, detail
            ))),
            Err(error) => Err(error.into()),
        }
    }
}

fn render_asset(asset: &Asset) -> String {
    let mut lines = vec![
        format!("ID: {}", asset.id),
        format!("Tag: {}", asset.asset_tag),
        format!("Name: {}", asset.name),
        format!("Category: {}", asset.category),
        format!("Status: {}", asset.status),
    ];
    if let Some(brand) = &asset.brand {
        lines.push(format!("Brand: {}", brand));
    }
    if let Some(model) = &asset.model {
        lines.push(format!("Model: {}", model));
    }
    if let Some(serial) = &asset.serial_number {
        lines.push(format!("Serial: {}", serial));
    }
    if let Some(date) = asset.purchase_date {
        lines.push(format!("Purchased: {}", date));
    }
    if let Some(price) = asset.purchase_price {
        lines.push(format!("Price: {:.2}", price));
    }
    if let Some(notes) = &asset.notes {
        lines.push(format!("Notes: {}", notes));
    }
    lines.push(format!(
        "Created: {}",
        asset.created_at.format("%Y-%m-%d %H:%M")
    ));
    lines.push(format!(
        "Updated: {}",
        asset.updated_at.format("%Y-%m-%d %H:%M")
    ));
    lines.join("\n")
}

#[async_trait]
impl ConsoleCommand for AssetCommand {
    async fn execute(&self, args: CommandArgs, client: &StocktakeClient) -> Result<CommandOutput> {
        match args.action.as_str() {
            "list" | "ls" => self.list_assets(&args, client).await,
            "show" | "info" | "get" => self.show_asset(&args, client).await,
            "create" | "add" | "new" => self.create_asset(&args, client).await,
            "update" | "edit" | "modify" => self.update_asset(&args, client).await,
            "delete" | "remove" | "rm" => self.delete_asset(&args, client).await,
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
        "Manage inventory assets"
    }

    fn help_text(&self) -> &'static str {
        "Asset Commands:
  asset list [--status <status>] [--category <name>] [--skip <n>] [--limit <n>]
    List inventory assets; status is one of available, assigned,
    maintenance, retired

  asset show <asset-id>
    Show one asset in full

  asset create <tag> <name> <category> [--brand <b>] [--model <m>]
    [--serial-number <sn>] [--purchase-date <yyyy-mm-dd>]
    [--purchase-price <amount>] [--status <status>] [--notes <text>]
    Register a new asset; the tag must be unique within the organization

  asset update <asset-id> [--asset-tag <tag>] [--name <n>] [--category <c>]
    [--status <status>] [--brand <b>] [--model <m>] [--serial-number <sn>]
    [--purchase-date <d>] [--purchase-price <p>] [--notes <text>]
    Edit an asset. Nullable fields clear when the flag is given without a
    value, e.g. --notes \"\"

  asset delete <asset-id>
    Delete an asset; refused while assignment history references it

Examples:
  asset list --status available --limit 50
  asset create LT-0042 'ThinkPad T14' laptop --brand Lenovo
  asset update 4f6e9a51-0a4f-44a1-b001-0d9f2dd49c3b --status maintenance
  asset update 4f6e9a51-0a4f-44a1-b001-0d9f2dd49c3b --notes ''"
    }

    fn usage_examples(&self) -> Vec<&'static str> {
        vec![
            "asset list",
            "asset list --status available --category laptop",
            "asset show 4f6e9a51-0a4f-44a1-b001-0d9f2dd49c3b",
            "asset create LT-0042 'ThinkPad T14' laptop --purchase-price 1450",
            "asset update 4f6e9a51-0a4f-44a1-b001-0d9f2dd49c3b --status retired",
            "asset delete 4f6e9a51-0a4f-44a1-b001-0d9f2dd49c3b",
        ]
    }

    fn category(&self) -> &'static str {
        "inventory"
    }

    fn aliases(&self) -> Vec<&'static str> {
        vec!["assets"]
    }

    fn required_permissions(&self, action: &str) -> Vec<(Resource, Action)> {
        match action {
            "list" | "ls" | "show" | "info" | "get" => vec![(Resource::Assets, Action::Read)],
            "create" | "add" | "new" => vec![(Resource::Assets, Action::Create)],
            "update" | "edit" | "modify" => vec![(Resource::Assets, Action::Update)],
            "delete" | "remove" | "rm" => vec![(Resource::Assets, Action::Delete)],
            _ => vec![],
        }
    }

    fn validate_args(&self, args: &CommandArgs) -> Result<()> {
        match args.action.as_str() {
            "show" | "update" | "delete" => {
                if args.positional.is_empty() {
                    return Err(anyhow!("Asset ID is required for {}", args.action));
                }
            }
            "create" => {
                if args.positional.len() < 3 {
                    return Err(anyhow!("Create requires: <tag> <name> <category>"));
                }
            }
            _ => {}
        }
        Ok(())
    }
}
