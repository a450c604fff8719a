//! REPL (Read-Eval-Print Loop) implementation for the Stocktake console

use anyhow::Result;
use colored::*;
use rustyline::completion::{Completer, FilenameCompleter, Pair};
use rustyline::highlight::{CmdKind, Highlighter, MatchingBracketHighlighter};
use rustyline::hint::{Hinter, HistoryHinter};
use rustyline::validate::{MatchingBracketValidator, Validator};
use rustyline::Result as RustylineResult;
use rustyline::{Context, Editor, Helper};
use std::collections::HashMap;
use std::path::PathBuf;

use stocktake_client::{SessionEvent, StocktakeClient};
use stocktake_config::StocktakeConfig;

use super::{
    command_registry::CommandRegistry, formatter::OutputFormatter, parser::CommandParser,
    ConsoleOptions,
};

/// Line editor helper wiring completion, hints, validation and bracket
/// highlighting together
struct StocktakeHelper {
    completer: StocktakeCompleter,
    hinter: HistoryHinter,
    validator: MatchingBracketValidator,
    highlighter: MatchingBracketHighlighter,
}

impl Helper for StocktakeHelper {}

impl Completer for StocktakeHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        self.completer.complete(line, pos, ctx)
    }
}

impl Hinter for StocktakeHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, ctx: &Context<'_>) -> Option<String> {
        self.hinter.hint(line, pos, ctx)
    }
}

impl Validator for StocktakeHelper {
    fn validate(
        &self,
        ctx: &mut rustyline::validate::ValidationContext,
    ) -> rustyline::Result<rustyline::validate::ValidationResult> {
        self.validator.validate(ctx)
    }
}

impl Highlighter for StocktakeHelper {
    fn highlight_prompt<'b, 's: 'b, 'p: 'b>(
        &'s self,
        prompt: &'p str,
        default: bool,
    ) -> std::borrow::Cow<'b, str> {
        self.highlighter.highlight_prompt(prompt, default)
    }

    fn highlight_hint<'h>(&self, hint: &'h str) -> std::borrow::Cow<'h, str> {
        self.highlighter.highlight_hint(hint)
    }

    fn highlight<'l>(&self, line: &'l str, pos: usize) -> std::borrow::Cow<'l, str> {
        self.highlighter.highlight(line, pos)
    }

    fn highlight_char(&self, line: &str, pos: usize, kind: CmdKind) -> bool {
        self.highlighter.highlight_char(line, pos, kind)
    }
}

/// Console builtins handled before command dispatch
const BUILTINS: [&str; 10] = [
    "help", "exit", "quit", "clear", "history", "set", "unset", "vars", "env", "source",
];

/// Completer for console input: command names and aliases come from the
/// registry, actions from each command's own hints, file paths for `source`
struct StocktakeCompleter {
    filename_completer: FilenameCompleter,
    registry: CommandRegistry,
}

impl StocktakeCompleter {
    fn new() -> Self {
        Self {
            filename_completer: FilenameCompleter::new(),
            registry: CommandRegistry::new(),
        }
    }
}

impl Completer for StocktakeCompleter {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let line_to_cursor = &line[..pos];

        if line_to_cursor.starts_with("source ") {
            // Complete filenames for the source builtin
            return self.filename_completer.complete(line, pos, ctx);
        }

        let tokens: Vec<&str> = line_to_cursor.split_whitespace().collect();
        let start = line_to_cursor.rfind(' ').map(|i| i + 1).unwrap_or(0);
        let mut candidates = Vec::new();

        if tokens.is_empty() || (tokens.len() == 1 && !line_to_cursor.ends_with(' ')) {
            // Complete command names and builtins
            let prefix = &line_to_cursor[start..];

            for name in self.registry.get_command_names() {
                if name.starts_with(prefix) {
                    candidates.push(Pair {
                        display: name.clone(),
                        replacement: name,
                    });
                }
            }

            for builtin in BUILTINS {
                if builtin.starts_with(prefix) {
                    candidates.push(Pair {
                        display: builtin.to_string(),
                        replacement: builtin.to_string(),
                    });
                }
            }
        } else if tokens.len() == 2 || (tokens.len() == 1 && line_to_cursor.ends_with(' ')) {
            // Complete command actions
            let category = tokens[0];
            let prefix = if tokens.len() == 2 { tokens[1] } else { "" };

            for action in self.registry.get_completion_hints(category, prefix) {
                candidates.push(Pair {
                    display: action.clone(),
                    replacement: action,
                });
            }
        }

        Ok((start, candidates))
    }
}

impl Default for StocktakeHelper {
    fn default() -> Self {
        Self {
            completer: StocktakeCompleter::new(),
            hinter: HistoryHinter {},
            validator: MatchingBracketValidator::new(),
            highlighter: MatchingBracketHighlighter::new(),
        }
    }
}

/// Main console REPL implementation
pub struct StocktakeConsole {
    config: StocktakeConfig,
    options: ConsoleOptions,
    editor: Editor<StocktakeHelper, rustyline::history::FileHistory>,
    parser: CommandParser,
    registry: CommandRegistry,
    formatter: OutputFormatter,
    client: StocktakeClient,
    events: tokio::sync::watch::Receiver<SessionEvent>,
    variables: HashMap<String, String>,
    running: bool,
    signed_in: bool,
}

impl StocktakeConsole {
    /// Create a new console instance
    pub fn new(config: StocktakeConfig, options: ConsoleOptions) -> Result<Self> {
        if !config.console.color {
            colored::control::set_override(false);
        }

        let client = StocktakeClient::new(&config)?;
        let events = client.subscribe();

        let rl_config = rustyline::Config::builder()
            .max_history_size(config.console.history_size)?
            .build();
        let mut editor = Editor::with_config(rl_config)?;
        editor.set_helper(Some(StocktakeHelper::default()));

        // Load history if present; a missing file is not an error
        if let Some(history_file) = &config.console.history_file {
            let _ = editor.load_history(history_file);
        } else if let Some(home) = dirs::home_dir() {
            let _ = editor.load_history(&home.join(".stocktake_history"));
        }

        Ok(Self {
            config,
            options,
            editor,
            parser: CommandParser::new(),
            registry: CommandRegistry::new(),
            formatter: OutputFormatter::new(),
            client,
            events,
            variables: HashMap::new(),
            running: false,
            signed_in: false,
        })
    }

    /// Start the REPL loop
    pub async fn run(&mut self) -> Result<()> {
        self.show_banner().await?;
        self.running = true;

        // Execute startup script if provided
        if let Some(script_file) = self.options.script_file.clone() {
            self.execute_script(&script_file).await?;
        }

        while self.running {
            self.notice_session_events();
            match self.read_command() {
                Ok(input) => {
                    if let Err(e) = self.process_command(&input).await {
                        self.formatter.print_error(&format!("Error: {}", e));
                    }
                }
                Err(rustyline::error::ReadlineError::Interrupted) => {
                    println!("Use 'exit' or Ctrl+D to quit");
                    continue;
                }
                Err(rustyline::error::ReadlineError::Eof) => {
                    break;
                }
                Err(e) => {
                    self.formatter.print_error(&format!("Input error: {}", e));
                    break;
                }
            }
        }

        self.save_history()?;
        self.formatter.print_info("Goodbye!");
        Ok(())
    }

    /// Show the console banner and restore a configured session if possible
    async fn show_banner(&mut self) -> Result<()> {
        println!(
            "{}",
            format!("Stocktake Console v{}", env!("CARGO_PKG_VERSION"))
                .bright_cyan()
                .bold()
        );

        if self.client.startup().await {
            self.signed_in = true;
            let snapshot = self.client.context().snapshot().await;
            match (snapshot.user, snapshot.tenant) {
                (Some(user), Some(tenant)) => self.formatter.print_success(&format!(
                    "Session restored: {} at {}",
                    user.email, tenant.name
                )),
                (Some(user), None) => self
                    .formatter
                    .print_success(&format!("Session restored: {}", user.email)),
                _ => self.formatter.print_success("Session restored"),
            }
        } else {
            self.formatter
                .print_info("Signed out. Use 'auth login <email> <password>' to sign in.");
        }

        println!(
            "Type '{}' for available commands, '{}' to quit",
            "help".bright_yellow(),
            "exit".bright_yellow()
        );
        println!();
        Ok(())
    }

    /// Read a command from the user
    fn read_command(&mut self) -> RustylineResult<String> {
        let prompt = self.get_prompt();
        self.editor.readline(&prompt)
    }

    /// Get the current prompt string
    fn get_prompt(&self) -> String {
        if self.signed_in {
            "stocktake> ".bright_green().to_string()
        } else {
            "stocktake> ".bright_red().to_string()
        }
    }

    /// Fold any session change since the last prompt into the prompt state.
    /// A forced teardown also warns once; a sign-out by command stays quiet.
    fn notice_session_events(&mut self) {
        if self.events.has_changed().unwrap_or(false) {
            match *self.events.borrow_and_update() {
                SessionEvent::SignedIn { .. } => self.signed_in = true,
                SessionEvent::SignedOut { forced } => {
                    if forced {
                        self.formatter
                            .print_warning("Session expired, sign in again with 'auth login'");
                    }
                    self.signed_in = false;
                }
            }
        }
    }

    /// Process a single command
    async fn process_command(&mut self, input: &str) -> Result<()> {
        let input = input.trim();

        // Skip empty lines
        if input.is_empty() {
            return Ok(());
        }

        // Add to history
        self.editor.add_history_entry(input)?;

        // Handle built-in commands
        if let Some(result) = self.handle_builtin_command(input).await? {
            return result;
        }

        // Substitute variables
        let substituted = self.substitute_variables(input);

        // Parse the command
        let command = self.parser.parse(&substituted)?;

        // Execute the command
        let result = self
            .registry
            .execute_command(&command.category, command.args, &self.client)
            .await?;

        // Format and display the result
        self.formatter.display_result(result);

        Ok(())
    }

    /// Handle built-in console commands
    async fn handle_builtin_command(&mut self, input: &str) -> Result<Option<Result<()>>> {
        let parts: Vec<&str> = input.split_whitespace().collect();
        if parts.is_empty() {
            return Ok(None);
        }

        match parts[0] {
            "exit" | "quit" => {
                self.running = false;
                Ok(Some(Ok(())))
            }
            "help" => {
                if parts.len() >= 2 {
                    self.show_command_help(parts[1]);
                } else {
                    self.show_help().await;
                }
                Ok(Some(Ok(())))
            }
            "clear" => {
                print!("\x1B[2J\x1B[1;1H"); // Clear screen
                Ok(Some(Ok(())))
            }
            "history" => {
                self.show_history();
                Ok(Some(Ok(())))
            }
            "set" => {
                if parts.len() >= 3 && parts[2] == "=" {
                    let var_name = parts[1].to_string();
                    let var_value = parts[3..].join(" ");
                    self.variables.insert(var_name.clone(), var_value.clone());
                    self.formatter
                        .print_success(&format!("Set {} = {}", var_name, var_value));
                } else {
                    self.formatter.print_error("Usage: set <variable> = <value>");
                }
                Ok(Some(Ok(())))
            }
            "unset" => {
                if parts.len() >= 2 {
                    let var_name = parts[1];
                    if self.variables.remove(var_name).is_some() {
                        self.formatter.print_success(&format!("Unset {}", var_name));
                    } else {
                        self.formatter
                            .print_warning(&format!("Variable {} not found", var_name));
                    }
                } else {
                    self.formatter.print_error("Usage: unset <variable>");
                }
                Ok(Some(Ok(())))
            }
            "vars" => {
                if self.variables.is_empty() {
                    self.formatter.print_info("No variables set");
                } else {
                    for (name, value) in &self.variables {
                        println!("{} = {}", name.bright_yellow(), value);
                    }
                }
                Ok(Some(Ok(())))
            }
            "source" => {
                if parts.len() >= 2 {
                    let script_path = PathBuf::from(parts[1]);
                    if let Err(e) = self.execute_script(&script_path).await {
                        self.formatter.print_error(&format!("Script error: {}", e));
                    }
                } else {
                    self.formatter.print_error("Usage: source <script-file>");
                }
                Ok(Some(Ok(())))
            }
            "env" => {
                if parts.len() >= 2 {
                    // Show specific environment variable
                    let env_var = parts[1];
                    match std::env::var(env_var) {
                        Ok(value) => println!("{}={}", env_var, value),
                        Err(_) => self.formatter.print_warning(&format!(
                            "Environment variable '{}' not found",
                            env_var
                        )),
                    }
                } else {
                    // Show all environment variables
                    let mut env_vars: Vec<_> = std::env::vars().collect();
                    env_vars.sort_by(|a, b| a.0.cmp(&b.0));
                    for (key, value) in env_vars {
                        println!("{}={}", key.bright_yellow(), value);
                    }
                }
                Ok(Some(Ok(())))
            }
            _ => Ok(None),
        }
    }

    /// Show detailed help for one command
    fn show_command_help(&self, name: &str) {
        match self.registry.get_help_text(name) {
            Some(help) => {
                println!("{}", help);
                // Commands whose help text omits examples still carry some
                if !help.contains("Examples:") {
                    let examples = self.registry.get_usage_examples(name);
                    if !examples.is_empty() {
                        println!();
                        println!("{}", "Examples:".bright_cyan());
                        for example in examples {
                            println!("  {}", example);
                        }
                    }
                }
            }
            None => {
                self.formatter
                    .print_warning(&format!("Unknown command: {}", name));
            }
        }
    }

    /// Show help information
    async fn show_help(&self) {
        println!("{}", "Console Commands:".bright_cyan().bold());
        println!(
            "  {}        - Show help, or details for one command",
            "help [command]".bright_yellow()
        );
        println!("  {}            - Exit the console", "exit, quit".bright_yellow());
        println!("  {}                 - Clear the screen", "clear".bright_yellow());
        println!("  {}               - Show command history", "history".bright_yellow());
        println!("  {}   - Set a variable", "set <var> = <value>".bright_yellow());
        println!("  {}           - Unset a variable", "unset <var>".bright_yellow());
        println!("  {}                  - Show all variables", "vars".bright_yellow());
        println!(
            "  {}             - Show environment variables",
            "env [var]".bright_yellow()
        );
        println!("  {}         - Execute a script file", "source <file>".bright_yellow());
        println!();

        if self.signed_in {
            let role = self.client.context().effective_role().await;
            println!(
                "{}",
                format!("Stocktake Commands (role: {}):", role)
                    .bright_cyan()
                    .bold()
            );
            for (name, summary) in self.registry.offered_commands(&self.client).await {
                println!("  {} - {}", format!("{:<12}", name).bright_yellow(), summary);
            }
            println!();
            println!(
                "Use '{}' for actions and examples",
                "help <command>".bright_yellow()
            );
        } else {
            println!("{}", "Stocktake Commands:".bright_cyan().bold());
            println!("  Sign in to see what your role can do:");
            println!("    {}", "auth login <email> <password>".bright_yellow());
            println!(
                "    {}",
                "auth signup <email> <password> --name <name> --organization <org>".bright_yellow()
            );
        }

        println!();
        println!("{}", "Variable Expansion:".bright_cyan().bold());
        println!("  {}              - Simple variable", "$VAR".bright_yellow());
        println!("  {}            - Variable with braces", "${VAR}".bright_yellow());
        println!("  {}        - Environment variable", "${ENV:VAR}".bright_yellow());
        println!("  {}   - Variable with default", "${VAR:-default}".bright_yellow());
        println!("  {}    - Value if variable set", "${VAR:+value}".bright_yellow());
        println!();
        println!("{}", "Use tab completion for command suggestions".bright_green());
    }

    /// Show command history
    fn show_history(&self) {
        for (i, entry) in self.editor.history().iter().enumerate() {
            println!("{:3}: {}", i + 1, entry);
        }
    }

    /// Substitute variables in input
    ///
    /// Supports `$VAR`, `${VAR}`, `${ENV:VAR}`, `${VAR:-default}` and
    /// `${VAR:+value}`. Unknown names fall back to the environment and stay
    /// literal when that misses too.
    fn substitute_variables(&self, input: &str) -> String {
        let re = regex::Regex::new(r"\$\{([^}]+)\}|\$([A-Za-z_][A-Za-z0-9_]*)").unwrap();

        re.replace_all(input, |caps: &regex::Captures| {
            if let Some(var_expr) = caps.get(1) {
                let expr = var_expr.as_str();

                if let Some(env_var) = expr.strip_prefix("ENV:") {
                    return std::env::var(env_var).unwrap_or_default();
                }

                if let Some((var_name, default_value)) = expr.split_once(":-") {
                    return self
                        .variables
                        .get(var_name)
                        .cloned()
                        .unwrap_or_else(|| default_value.to_string());
                }

                if let Some((var_name, value_if_set)) = expr.split_once(":+") {
                    if self.variables.contains_key(var_name) {
                        return value_if_set.to_string();
                    }
                    return String::new();
                }

                if let Some(value) = self.variables.get(expr) {
                    return value.clone();
                }

                std::env::var(expr).unwrap_or_else(|_| format!("${{{}}}", expr))
            } else if let Some(var_name) = caps.get(2) {
                let var_name = var_name.as_str();

                if let Some(value) = self.variables.get(var_name) {
                    return value.clone();
                }

                std::env::var(var_name).unwrap_or_else(|_| format!("${}", var_name))
            } else {
                caps.get(0).unwrap().as_str().to_string()
            }
        })
        .to_string()
    }

    /// Execute a script file line by line, stopping at the first failure
    fn execute_script<'a>(
        &'a mut self,
        script_path: &'a PathBuf,
    ) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<()>> + 'a>> {
        Box::pin(async move {
            let content = std::fs::read_to_string(script_path)?;

            for line in content.lines() {
                let line = line.trim();
                if line.is_empty() || line.starts_with('#') {
                    continue; // Skip empty lines and comments
                }

                self.formatter.print_info(&format!("> {}", line));
                if let Err(e) = self.process_command(line).await {
                    self.formatter.print_error(&format!("Script error: {}", e));
                    return Err(e);
                }
            }

            Ok(())
        })
    }

    /// Save command history
    fn save_history(&mut self) -> Result<()> {
        if let Some(history_file) = &self.config.console.history_file {
            self.editor.save_history(history_file)?;
        } else if let Some(home) = dirs::home_dir() {
            let _ = self.editor.save_history(&home.join(".stocktake_history"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn console() -> StocktakeConsole {
        StocktakeConsole::new(StocktakeConfig::default(), ConsoleOptions::default()).unwrap()
    }

    #[test]
    fn substitutes_simple_and_braced_variables() {
        let mut console = console();
        console.variables.insert("ID".to_string(), "42".to_string());
        assert_eq!(console.substitute_variables("asset show $ID"), "asset show 42");
        assert_eq!(console.substitute_variables("asset show ${ID}"), "asset show 42");
    }

    #[test]
    fn default_and_conditional_expansion() {
        let mut console = console();
        assert_eq!(console.substitute_variables("${LIMIT:-25}"), "25");

        console.variables.insert("LIMIT".to_string(), "5".to_string());
        assert_eq!(console.substitute_variables("${LIMIT:-25}"), "5");
        assert_eq!(console.substitute_variables("${LIMIT:+--limit 5}"), "--limit 5");
        assert_eq!(console.substitute_variables("${MISSING:+ignored}"), "");
    }

    #[test]
    fn env_prefix_reads_the_environment() {
        let console = console();
        std::env::set_var("STOCKTAKE_REPL_TEST_VALUE", "yes");
        assert_eq!(
            console.substitute_variables("${ENV:STOCKTAKE_REPL_TEST_VALUE}"),
            "yes"
        );
    }

    #[test]
    fn unknown_variables_stay_literal() {
        let console = console();
        assert_eq!(
            console.substitute_variables("echo $STOCKTAKE_REPL_UNSET"),
            "echo $STOCKTAKE_REPL_UNSET"
        );
        assert_eq!(
            console.substitute_variables("echo ${STOCKTAKE_REPL_UNSET}"),
            "echo ${STOCKTAKE_REPL_UNSET}"
        );
    }
}
