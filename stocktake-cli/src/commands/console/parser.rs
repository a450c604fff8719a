//! Command parsing for console commands

use anyhow::{anyhow, Result};
use std::collections::HashMap;

use super::command_trait::CommandArgs;

/// A parsed console command: the category names the command module, the
/// args carry everything after it.
#[derive(Debug, Clone)]
pub struct ParsedCommand {
    pub category: String,
    pub args: CommandArgs,
}

/// Command parser for console input
pub struct CommandParser {}

impl CommandParser {
    pub fn new() -> Self {
        Self {}
    }

    /// Parse a command line into a structured command
    pub fn parse(&self, input: &str) -> Result<ParsedCommand> {
        let parts = self.tokenize(input)?;
        if parts.is_empty() {
            return Err(anyhow!("Empty command"));
        }

        let mut parts_iter = parts.into_iter();
        let category = parts_iter.next().expect("checked non-empty above");

        let remaining: Vec<String> = parts_iter.collect();
        let mut action = None;
        let mut positional = Vec::new();
        let mut flags: HashMap<String, Option<String>> = HashMap::new();
        let mut i = 0;

        while i < remaining.len() {
            let part = &remaining[i];

            if let Some(flag_name) = part.strip_prefix("--").or_else(|| part.strip_prefix('-')) {
                if i + 1 < remaining.len() && !remaining[i + 1].starts_with('-') {
                    flags.insert(flag_name.to_string(), Some(remaining[i + 1].clone()));
                    i += 2;
                } else {
                    flags.insert(flag_name.to_string(), None);
                    i += 1;
                }
            } else {
                if action.is_none() {
                    action = Some(part.clone());
                } else {
                    positional.push(part.clone());
                }
                i += 1;
            }
        }

        // A bare category keeps an empty action; the registry substitutes
        // the command's default.
        let action = action.unwrap_or_default();

        Ok(ParsedCommand {
            category,
            args: CommandArgs::new(action, positional, flags),
        })
    }

    /// Tokenize input while preserving quoted strings and JSON objects
    fn tokenize(&self, input: &str) -> Result<Vec<String>> {
        let mut tokens = Vec::new();
        let mut current_token = String::new();
        let mut in_quotes = false;
        let mut quote_char = '"';
        let mut brace_depth = 0;
        let mut bracket_depth = 0;

        for ch in input.chars() {
            match ch {
                '"' | '\'' if !in_quotes => {
                    in_quotes = true;
                    quote_char = ch;
                    current_token.push(ch);
                }
                '"' | '\'' if in_quotes && ch == quote_char => {
                    in_quotes = false;
                    current_token.push(ch);
                }
                '{' if !in_quotes => {
                    brace_depth += 1;
                    current_token.push(ch);
                }
                '}' if !in_quotes => {
                    brace_depth -= 1;
                    current_token.push(ch);
                }
                '[' if !in_quotes => {
                    bracket_depth += 1;
                    current_token.push(ch);
                }
                ']' if !in_quotes => {
                    bracket_depth -= 1;
                    current_token.push(ch);
                }
                ' ' | '\t' if !in_quotes && brace_depth == 0 && bracket_depth == 0 => {
                    if !current_token.is_empty() {
                        tokens.push(self.clean_token(&current_token));
                        current_token.clear();
                    }
                }
                _ => {
                    current_token.push(ch);
                }
            }
        }

        if !current_token.is_empty() {
            tokens.push(self.clean_token(&current_token));
        }

        if in_quotes {
            return Err(anyhow!("Unclosed quote in command"));
        }

        if brace_depth != 0 {
            return Err(anyhow!("Unmatched braces in command"));
        }

        if bracket_depth != 0 {
            return Err(anyhow!("Unmatched brackets in command"));
        }

        Ok(tokens)
    }

    /// Clean a token by removing outer quotes if present
    fn clean_token(&self, token: &str) -> String {
        if (token.starts_with('"') && token.ends_with('"') && token.len() >= 2)
            || (token.starts_with('\'') && token.ends_with('\'') && token.len() >= 2)
        {
            token[1..token.len() - 1].to_string()
        } else {
            token.to_string()
        }
    }
}

impl Default for CommandParser {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_command() {
        let parser = CommandParser::new();
        let cmd = parser.parse("asset list").unwrap();
        assert_eq!(cmd.category, "asset");
        assert_eq!(cmd.args.action, "list");
        assert!(cmd.args.positional.is_empty());
    }

    #[test]
    fn test_bare_category_leaves_action_empty() {
        let parser = CommandParser::new();
        assert_eq!(parser.parse("asset").unwrap().args.action, "");
        assert_eq!(parser.parse("dashboard").unwrap().args.action, "");
    }

    #[test]
    fn test_flag_only_input_leaves_action_empty() {
        let parser = CommandParser::new();
        let cmd = parser.parse("asset --status available").unwrap();
        assert_eq!(cmd.args.action, "");
        assert_eq!(cmd.args.get_flag("status"), Some("available"));
    }

    #[test]
    fn test_command_with_flags() {
        let parser = CommandParser::new();
        let cmd = parser
            .parse("asset list --status available --category laptop")
            .unwrap();
        assert_eq!(cmd.category, "asset");
        assert_eq!(cmd.args.action, "list");
        assert_eq!(cmd.args.get_flag("status"), Some("available"));
        assert_eq!(cmd.args.get_flag("category"), Some("laptop"));
    }

    #[test]
    fn test_bare_flag_has_no_value() {
        let parser = CommandParser::new();
        let cmd = parser.parse("role update abc --permissions").unwrap();
        assert!(cmd.args.has_flag("permissions"));
        assert_eq!(cmd.args.get_flag("permissions"), None);
        assert_eq!(cmd.args.positional, vec!["abc"]);
    }

    #[test]
    fn test_quoted_values_keep_spaces() {
        let parser = CommandParser::new();
        let cmd = parser
            .parse("employee create 'Dana Ruiz' dana@example.com --department \"Field Ops\"")
            .unwrap();
        assert_eq!(cmd.args.positional, vec!["Dana Ruiz", "dana@example.com"]);
        assert_eq!(cmd.args.get_flag("department"), Some("Field Ops"));
    }

    #[test]
    fn test_json_flag_value_stays_one_token() {
        let parser = CommandParser::new();
        let cmd = parser
            .parse("role create auditors --permissions {\"assets\": [\"read\"], \"audit_logs\": [\"read\"]}")
            .unwrap();
        let raw = cmd.args.get_flag("permissions").unwrap();
        let parsed = cmd.args.parse_json(raw).unwrap();
        assert_eq!(parsed["assets"][0], "read");
    }

    #[test]
    fn test_unclosed_quote_is_rejected() {
        let parser = CommandParser::new();
        assert!(parser.parse("asset create 'LT-0001").is_err());
    }
}
