//! Base command trait for unified console command handling

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;

use stocktake_api_types::{Action, FieldEdit, Resource};
use stocktake_client::StocktakeClient;

/// Command arguments parsed from user input
#[derive(Debug, Clone)]
pub struct CommandArgs {
    pub action: String,
    pub positional: Vec<String>,
    pub flags: HashMap<String, Option<String>>,
    pub raw_args: Vec<String>,
}

/// Rich output formatting options
#[derive(Debug, Clone)]
pub enum CommandOutput {
    /// Simple text output
    Text(String),
    /// JSON output with pretty printing
    Json(Value),
    /// Table output with headers and rows
    Table(Table),
    /// Success message with optional data
    Success { message: String, data: Option<Value> },
    /// Error message with context
    Error { message: String, context: Option<Value> },
}

/// Table structure for tabular output
#[derive(Debug, Clone)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub title: Option<String>,
}

/// Base trait for all console commands
#[async_trait]
pub trait ConsoleCommand: Send + Sync {
    /// Execute the command against the API client
    async fn execute(&self, args: CommandArgs, client: &StocktakeClient) -> Result<CommandOutput>;

    /// Get completion hints for partial input
    fn completion_hints(&self, partial: &str) -> Vec<String>;

    /// One-line summary shown in the command listing
    fn summary(&self) -> &'static str;

    /// Get help text for the command
    fn help_text(&self) -> &'static str;

    /// Get command usage examples
    fn usage_examples(&self) -> Vec<&'static str> {
        vec![]
    }

    /// Check if command requires a signed-in session
    fn requires_session(&self) -> bool {
        true
    }

    /// Get command category for organization
    fn category(&self) -> &'static str {
        "general"
    }

    /// Get command aliases
    fn aliases(&self) -> Vec<&'static str> {
        vec![]
    }

    /// Action substituted when the category is typed on its own
    fn default_action(&self) -> &'static str {
        "list"
    }

    /// Validate command arguments before execution
    fn validate_args(&self, _args: &CommandArgs) -> Result<()> {
        Ok(())
    }

    /// Permissions the current role must hold before the action is offered.
    ///
    /// Checked against the advisory gate by the registry; a miss prints a
    /// denial without issuing the request. The backend still enforces
    /// authorization on its side regardless of what this returns.
    fn required_permissions(&self, _action: &str) -> Vec<(Resource, Action)> {
        vec![]
    }
}

/// Utility functions for command output formatting
impl CommandOutput {
    /// Create a simple text output
    pub fn text(message: impl Into<String>) -> Self {
        CommandOutput::Text(message.into())
    }

    /// Create a JSON output
    pub fn json(value: Value) -> Self {
        CommandOutput::Json(value)
    }

    /// Create a success message
    pub fn success(message: impl Into<String>) -> Self {
        CommandOutput::Success {
            message: message.into(),
            data: None,
        }
    }

    /// Create a success message with data
    pub fn success_with_data(message: impl Into<String>, data: Value) -> Self {
        CommandOutput::Success {
            message: message.into(),
            data: Some(data),
        }
    }

    /// Create an error message
    pub fn error(message: impl Into<String>) -> Self {
        CommandOutput::Error {
            message: message.into(),
            context: None,
        }
    }

    /// Create an error message with context
    pub fn error_with_context(message: impl Into<String>, context: Value) -> Self {
        CommandOutput::Error {
            message: message.into(),
            context: Some(context),
        }
    }

    /// Create a table output
    pub fn table(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        CommandOutput::Table(Table {
            headers,
            rows,
            title: None,
        })
    }

    /// Create a table output with title
    pub fn table_with_title(
        title: impl Into<String>,
        headers: Vec<String>,
        rows: Vec<Vec<String>>,
    ) -> Self {
        CommandOutput::Table(Table {
            headers,
            rows,
            title: Some(title.into()),
        })
    }
}

impl CommandArgs {
    /// Create new command args
    pub fn new(
        action: String,
        positional: Vec<String>,
        flags: HashMap<String, Option<String>>,
    ) -> Self {
        let raw_args = vec![action.clone()]
            .into_iter()
            .chain(positional.clone())
            .chain(flags.iter().flat_map(|(k, v)| {
                if let Some(val) = v {
                    vec![format!("--{}", k), val.clone()]
                } else {
                    vec![format!("--{}", k)]
                }
            }))
            .collect();

        Self {
            action,
            positional,
            flags,
            raw_args,
        }
    }

    /// Get flag value as string
    pub fn get_flag(&self, name: &str) -> Option<&str> {
        self.flags.get(name).and_then(|v| v.as_deref())
    }

    /// Check if flag is present (boolean flag)
    pub fn has_flag(&self, name: &str) -> bool {
        self.flags.contains_key(name)
    }

    /// Get positional argument by index
    pub fn get_positional(&self, index: usize) -> Option<&str> {
        self.positional.get(index).map(|s| s.as_str())
    }

    /// Get required positional argument with error
    pub fn require_positional(&self, index: usize, name: &str) -> Result<&str> {
        self.get_positional(index)
            .ok_or_else(|| anyhow::anyhow!("Missing required argument: {}", name))
    }

    /// Parse JSON from flag or positional argument
    pub fn parse_json(&self, source: &str) -> Result<Value> {
        serde_json::from_str(source).map_err(|e| anyhow::anyhow!("Invalid JSON: {}", e))
    }

    /// Get flag as number with default
    pub fn get_number_flag<T>(&self, name: &str, default: T) -> T
    where
        T: std::str::FromStr + Copy,
    {
        self.get_flag(name)
            .and_then(|v| v.parse().ok())
            .unwrap_or(default)
    }

    /// Parse a flag that must be present, reporting parse failures
    pub fn parse_flag<T>(&self, name: &str) -> Result<Option<T>>
    where
        T: std::str::FromStr,
        T::Err: std::fmt::Display,
    {
        match self.get_flag(name) {
            None => Ok(None),
            Some(raw) => raw
                .parse()
                .map(Some)
                .map_err(|e| anyhow::anyhow!("Invalid --{} value '{}': {}", name, raw, e)),
        }
    }

    /// Map a flag onto a tri-state field edit.
    ///
    /// Absent flag leaves the field untouched; a flag with an empty value
    /// (`--notes ""` or a bare `--notes`) clears the stored value; anything
    /// else parses into a replacement.
    pub fn edit_flag<T>(&self, name: &str) -> Result<FieldEdit<T>>
    where
        T: std::str::FromStr,
        T::Err: std::fmt::Display,
    {
        match self.flags.get(name) {
            None => Ok(FieldEdit::Unchanged),
            Some(value) => match value.as_deref() {
                None | Some("") => Ok(FieldEdit::Clear),
                Some(raw) => raw
                    .parse()
                    .map(FieldEdit::Set)
                    .map_err(|e| anyhow::anyhow!("Invalid --{} value '{}': {}", name, raw, e)),
            },
        }
    }
}

impl Table {
    /// Create a new table
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self {
            headers,
            rows,
            title: None,
        }
    }

    /// Create a table with title
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Add a row to the table
    pub fn add_row(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    /// Get column count
    pub fn column_count(&self) -> usize {
        self.headers.len()
    }

    /// Get row count
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args_with_flags(flags: &[(&str, Option<&str>)]) -> CommandArgs {
        CommandArgs::new(
            "update".to_string(),
            vec![],
            flags
                .iter()
                .map(|(k, v)| (k.to_string(), v.map(str::to_string)))
                .collect(),
        )
    }

    #[test]
    fn absent_flag_is_unchanged() {
        let args = args_with_flags(&[]);
        let edit: FieldEdit<String> = args.edit_flag("notes").unwrap();
        assert!(edit.is_unchanged());
    }

    #[test]
    fn empty_flag_value_clears() {
        let args = args_with_flags(&[("notes", Some("")), ("brand", None)]);
        assert_eq!(args.edit_flag::<String>("notes").unwrap(), FieldEdit::Clear);
        assert_eq!(args.edit_flag::<String>("brand").unwrap(), FieldEdit::Clear);
    }

    #[test]
    fn valued_flag_parses_into_set() {
        let args = args_with_flags(&[("purchase-price", Some("1299.50"))]);
        assert_eq!(
            args.edit_flag::<f64>("purchase-price").unwrap(),
            FieldEdit::Set(1299.50)
        );
    }

    #[test]
    fn unparseable_edit_value_is_reported() {
        let args = args_with_flags(&[("purchase-price", Some("a lot"))]);
        let err = args.edit_flag::<f64>("purchase-price").unwrap_err();
        assert!(err.to_string().contains("purchase-price"));
    }

    #[test]
    fn require_positional_names_the_missing_argument() {
        let args = CommandArgs::new("show".to_string(), vec![], HashMap::new());
        let err = args.require_positional(0, "asset ID").unwrap_err();
        assert!(err.to_string().contains("asset ID"));
    }
}
