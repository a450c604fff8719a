//! Output formatting for console results

use colored::*;
use serde_json::Value;

use super::command_trait::{CommandOutput, Table};

/// Output formatter for console results
pub struct OutputFormatter {}

impl OutputFormatter {
    pub fn new() -> Self {
        Self {}
    }

    /// Display a command result
    pub fn display_result(&self, result: CommandOutput) {
        match result {
            CommandOutput::Success { message, data } => {
                self.print_success(&message);
                if let Some(data) = data {
                    self.print_json(&data);
                }
            }
            CommandOutput::Error { message, context } => {
                self.print_error(&message);
                if let Some(context) = context {
                    self.print_json(&context);
                }
            }
            CommandOutput::Table(table) => {
                self.print_table(&table);
            }
            CommandOutput::Json(data) => {
                self.print_json(&data);
            }
            CommandOutput::Text(content) => {
                println!("{}", content);
            }
        }
    }

    /// Print a success message
    pub fn print_success(&self, message: &str) {
        println!("{} {}", "✓".bright_green().bold(), message);
    }

    /// Print an error message
    pub fn print_error(&self, message: &str) {
        eprintln!("{} {}", "✗".bright_red().bold(), message.bright_red());
    }

    /// Print a warning message
    pub fn print_warning(&self, message: &str) {
        println!("{} {}", "⚠".bright_yellow().bold(), message.bright_yellow());
    }

    /// Print an info message
    pub fn print_info(&self, message: &str) {
        println!("{} {}", "ℹ".bright_blue().bold(), message);
    }

    /// Print JSON data with formatting
    pub fn print_json(&self, data: &Value) {
        match serde_json::to_string_pretty(data) {
            Ok(formatted) => {
                for line in formatted.lines() {
                    println!("{}", self.colorize_json_line(line));
                }
            }
            Err(_) => {
                println!("{}", data);
            }
        }
    }

    /// Print a table with headers and rows
    pub fn print_table(&self, table: &Table) {
        if table.headers.is_empty() || table.rows.is_empty() {
            self.print_info("No data to display");
            return;
        }

        if let Some(title) = &table.title {
            println!("{}", title.bright_cyan().bold());
        }

        let col_widths = Self::column_widths(table);

        // Print headers
        self.print_table_separator(&col_widths, '┌', '┬', '┐');
        print!("│");
        for (i, header) in table.headers.iter().enumerate() {
            print!(
                " {:width$} │",
                header.bright_cyan().bold(),
                width = col_widths[i]
            );
        }
        println!();
        self.print_table_separator(&col_widths, '├', '┼', '┤');

        // Print rows
        for row in &table.rows {
            print!("│");
            for (i, cell) in row.iter().enumerate() {
                let width = if i < col_widths.len() { col_widths[i] } else { 0 };
                print!(" {:width$} │", cell, width = width);
            }
            println!();
        }
        self.print_table_separator(&col_widths, '└', '┴', '┘');
    }

    /// Column widths sized to the wider of header and cell content. Cells
    /// beyond the header count do not widen anything.
    fn column_widths(table: &Table) -> Vec<usize> {
        let mut widths: Vec<usize> = table.headers.iter().map(|h| h.len()).collect();
        for row in &table.rows {
            for (i, cell) in row.iter().enumerate() {
                if let Some(width) = widths.get_mut(i) {
                    *width = (*width).max(cell.len());
                }
            }
        }
        widths
    }

    /// Print table separator
    fn print_table_separator(&self, col_widths: &[usize], left: char, mid: char, right: char) {
        print!("{}", left);
        for (i, &width) in col_widths.iter().enumerate() {
            if i > 0 {
                print!("{}", mid);
            }
            print!("{}", "─".repeat(width + 2));
        }
        println!("{}", right);
    }

    /// Colorize a JSON line for better readability
    fn colorize_json_line(&self, line: &str) -> String {
        let trimmed = line.trim_start();
        let indent = &line[..line.len() - trimmed.len()];

        if trimmed.starts_with('"') {
            // The `":` boundary marks a key; a lone string is an array element.
            if let Some(colon) = trimmed.find("\":") {
                let (key, rest) = trimmed.split_at(colon + 2);
                return format!("{}{}{}", indent, key.bright_blue(), rest.bright_white());
            }
            return format!("{}{}", indent, trimmed.bright_green());
        }

        let is_scalar = trimmed
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_digit() || c == '-')
            || trimmed.starts_with("true")
            || trimmed.starts_with("false")
            || trimmed.starts_with("null");
        if is_scalar {
            return format!("{}{}", indent, trimmed.bright_yellow());
        }

        line.to_string()
    }
}

impl Default for OutputFormatter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_widths_fit_longest_cell() {
        let table = Table::new(
            vec!["id".to_string(), "name".to_string()],
            vec![
                vec!["1".to_string(), "Warehouse scanner".to_string()],
                vec!["2".to_string(), "Dock".to_string()],
            ],
        );
        assert_eq!(OutputFormatter::column_widths(&table), vec![2, 17]);
    }

    #[test]
    fn test_cells_beyond_headers_do_not_widen() {
        let table = Table::new(
            vec!["id".to_string()],
            vec![vec!["1".to_string(), "stray".to_string()]],
        );
        assert_eq!(OutputFormatter::column_widths(&table), vec![1]);
    }

    #[test]
    fn test_structural_json_lines_pass_through() {
        let formatter = OutputFormatter::new();
        assert_eq!(formatter.colorize_json_line("{"), "{");
        assert_eq!(formatter.colorize_json_line("  },"), "  },");
    }
}
