// SPDX-FileCopyrightText: 2026 Cadence Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Terminal output helpers.

use colored::Colorize;

/// Prints command results, with or without color.
pub struct Printer {
    color: bool,
}

impl Printer {
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    pub fn heading(&self, text: &str) {
        if self.color {
            println!("{}", text.bold());
        } else {
            println!("{text}");
        }
    }

    pub fn line(&self, text: &str) {
        println!("  {text}");
    }

    /// A line whose first part is dimmed, used for ids and dates.
    pub fn row(&self, label: &str, text: &str) {
        if self.color {
            println!("  {} {text}", label.dimmed());
        } else {
            println!("  {label} {text}");
        }
    }

    pub fn success(&self, text: &str) {
        if self.color {
            println!("{} {text}", "ok".green());
        } else {
            println!("ok {text}");
        }
    }

    pub fn error(&self, text: &str) {
        if self.color {
            eprintln!("{} {text}", "error:".red().bold());
        } else {
            eprintln!("error: {text}");
        }
    }
}

/// `[x]` or `[ ]`.
pub fn checkbox(done: bool) -> &'static str {
    if done { "[x]" } else { "[ ]" }
}

/// Formats an amount as dollars with two decimals.
pub fn money(amount: f64) -> String {
    format!("${amount:.2}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn money_rounds_to_cents() {
        assert_eq!(money(1250.0), "$1250.00");
        assert_eq!(money(0.126), "$0.13");
    }

    #[test]
    fn checkbox_marks() {
        assert_eq!(checkbox(true), "[x]");
        assert_eq!(checkbox(false), "[ ]");
    }
}
