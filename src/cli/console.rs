//! Operator-facing progress output
//!
//! All human-readable text the pipeline produces goes through [`Console`],
//! so library callers and tests can silence it with [`Console::quiet`].

use colored::*;
use polars::prelude::DataFrame;
use std::fmt::Display;
use std::io::Write;

fn dim(s: &str) -> ColoredString    { s.truecolor(100, 100, 100) }
fn accent(s: &str) -> ColoredString { s.truecolor(120, 170, 255) }
fn muted(s: &str) -> ColoredString  { s.truecolor(140, 140, 140) }
fn ok(s: &str) -> ColoredString     { s.truecolor(100, 210, 120) }

/// Styled stdout reporter
#[derive(Debug, Clone, Copy, Default)]
pub struct Console {
    quiet: bool,
}

impl Console {
    /// Console that prints to stdout
    pub fn new() -> Self {
        Self { quiet: false }
    }

    /// Console that prints nothing
    pub fn quiet() -> Self {
        Self { quiet: true }
    }

    pub fn is_quiet(&self) -> bool {
        self.quiet
    }

    /// Title block shown at the start of a run
    pub fn banner(&self) {
        if self.quiet {
            return;
        }
        println!();
        println!("  {}", "credit-scoring".truecolor(120, 170, 255).bold());
        println!("  {}", dim(&format!("Credit score classifier  ·  v{}  ·  rust", env!("CARGO_PKG_VERSION"))));
    }

    /// Section heading with an underline
    pub fn section(&self, title: &str) {
        if self.quiet {
            return;
        }
        println!();
        println!("  {}", title.white().bold());
        println!("  {}", dim(&"─".repeat(56)));
    }

    /// Start of a step; finish it with [`Console::step_done`]
    pub fn step_run(&self, msg: &str) {
        if self.quiet {
            return;
        }
        print!("  {} {}... ", accent("›"), msg);
        let _ = std::io::stdout().flush();
    }

    pub fn step_done(&self, detail: &str) {
        if self.quiet {
            return;
        }
        println!("{} {}", ok("done"), dim(detail));
    }

    pub fn step_failed(&self) {
        if self.quiet {
            return;
        }
        println!("{}", "failed".red());
    }

    /// Completed step
    pub fn step_ok(&self, msg: &str) {
        if self.quiet {
            return;
        }
        println!("  {} {}", ok("✓"), msg);
    }

    pub fn warn(&self, msg: &str) {
        if self.quiet {
            return;
        }
        println!("  {} {}", "!".yellow().bold(), msg.yellow());
    }

    pub fn error(&self, msg: &str) {
        if self.quiet {
            return;
        }
        println!("  {} {}", "✗".red().bold(), msg.red());
    }

    /// Aligned key/value line
    pub fn kv(&self, key: &str, value: impl Display) {
        if self.quiet {
            return;
        }
        println!("  {:<28} {}", muted(key), value.to_string().white());
    }

    /// Free text, indented
    pub fn text(&self, msg: impl Display) {
        if self.quiet {
            return;
        }
        for line in msg.to_string().lines() {
            println!("  {}", line);
        }
    }

    /// Full table rendering
    pub fn frame(&self, df: &DataFrame) {
        self.text(df);
    }

    /// First `n` rows of a table
    pub fn preview(&self, df: &DataFrame, n: usize) {
        self.text(df.head(Some(n)));
    }

    /// Column / dtype / non-null summary of a table
    pub fn info(&self, df: &DataFrame) {
        if self.quiet {
            return;
        }
        self.text(frame_info(df));
    }
}

/// Text summary of a table's shape and per-column dtype and non-null counts
pub fn frame_info(df: &DataFrame) -> String {
    let mut out = format!("{} rows × {} columns\n", df.height(), df.width());
    out.push_str(&format!(" {:>3}  {:<28} {:>14}  {}\n", "#", "Column", "Non-Null Count", "Dtype"));
    for (i, column) in df.get_columns().iter().enumerate() {
        let series = column.as_materialized_series();
        let non_null = series.len() - series.null_count();
        out.push_str(&format!(
            " {:>3}  {:<28} {:>14}  {}\n",
            i,
            series.name().as_str(),
            non_null,
            series.dtype()
        ));
    }
    out
}
