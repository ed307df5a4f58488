//! Output formatting: table, JSON, YAML, plain.
//!
//! Renders data in the format selected by `--output`. Table uses `tabled`,
//! structured formats use serde, plain emits one identifier per line.

use std::io::{self, IsTerminal, Write};

use owo_colors::OwoColorize;
use tabled::{Table, Tabled, settings::Style};

use promokit_core::{Notice, NoticeLevel};

use crate::cli::{ColorMode, OutputFormat};

// ── Color helpers ────────────────────────────────────────────────────

/// Determine whether color output should be enabled.
pub fn should_color(mode: &ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => io::stdout().is_terminal() && std::env::var("NO_COLOR").is_err(),
    }
}

/// Color a status word: green for active, dimmed for redeemed.
pub fn paint_status(status: &str, color: bool) -> String {
    if !color {
        return status.to_owned();
    }
    match status {
        "active" => status.green().to_string(),
        _ => status.dimmed().to_string(),
    }
}

/// One-line rendering of a notice for stderr.
pub fn render_notice(notice: &Notice, color: bool) -> String {
    let line = format!("{}: {}", notice.title, notice.message);
    if !color {
        return line;
    }
    match notice.level {
        NoticeLevel::Success => format!("{} {}", "✓".green(), line),
        NoticeLevel::Info => line,
        NoticeLevel::Warning => line.yellow().to_string(),
        NoticeLevel::Error => line.red().to_string(),
    }
}

// ── Render dispatchers ───────────────────────────────────────────────

/// Render a list of serde-serializable + tabled items in the chosen format.
///
/// - `table`: uses the `Tabled` derive to build a pretty table
/// - `json` / `json-compact`: serializes the original data via serde
/// - `yaml`: serializes via serde_yaml
/// - `plain`: calls `id_fn` on each item to emit one identifier per line
pub fn render_list<T, R>(
    format: &OutputFormat,
    data: &[T],
    to_row: impl Fn(&T) -> R,
    id_fn: impl Fn(&T) -> String,
) -> String
where
    T: serde::Serialize,
    R: Tabled,
{
    match format {
        OutputFormat::Table => {
            let rows: Vec<R> = data.iter().map(to_row).collect();
            render_table(&rows)
        }
        OutputFormat::Json => render_json(data, false),
        OutputFormat::JsonCompact => render_json(data, true),
        OutputFormat::Yaml => render_yaml(data),
        OutputFormat::Plain => data.iter().map(&id_fn).collect::<Vec<_>>().join("\n"),
    }
}

/// Render a single serde-serializable item in the chosen format.
///
/// Table rendering uses `detail_fn`, since detail views don't use `Tabled`.
pub fn render_single<T>(
    format: &OutputFormat,
    data: &T,
    detail_fn: impl Fn(&T) -> String,
    id_fn: impl Fn(&T) -> String,
) -> String
where
    T: serde::Serialize,
{
    match format {
        OutputFormat::Table => detail_fn(data),
        OutputFormat::Json => render_json(data, false),
        OutputFormat::JsonCompact => render_json(data, true),
        OutputFormat::Yaml => render_yaml(data),
        OutputFormat::Plain => id_fn(data),
    }
}

/// Print the rendered output to stdout, respecting quiet mode.
pub fn print_output(output: &str, quiet: bool) {
    if quiet || output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{output}");
}

// ── Format-specific renderers ────────────────────────────────────────

fn render_table<R: Tabled>(rows: &[R]) -> String {
    if rows.is_empty() {
        return "No codes match.".into();
    }
    Table::new(rows).with(Style::rounded()).to_string()
}

fn render_json<T: serde::Serialize + ?Sized>(data: &T, compact: bool) -> String {
    let rendered = if compact {
        serde_json::to_string(data)
    } else {
        serde_json::to_string_pretty(data)
    };
    rendered.unwrap_or_else(|e| format!("{{\"error\": \"serialization failed: {e}\"}}"))
}

fn render_yaml<T: serde::Serialize + ?Sized>(data: &T) -> String {
    serde_yaml::to_string(data).unwrap_or_else(|e| format!("error: serialization failed: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(serde::Serialize, Tabled)]
    struct Row {
        code: &'static str,
    }

    #[test]
    fn plain_emits_one_id_per_line() {
        let rows = [Row { code: "A1" }, Row { code: "B2" }];
        let out = render_list(
            &OutputFormat::Plain,
            &rows,
            |r| Row { code: r.code },
            |r| r.code.into(),
        );
        assert_eq!(out, "A1\nB2");
    }

    #[test]
    fn compact_json_is_one_line() {
        let rows = [Row { code: "A1" }];
        let out = render_list(
            &OutputFormat::JsonCompact,
            &rows,
            |r| Row { code: r.code },
            |r| r.code.into(),
        );
        assert_eq!(out, r#"[{"code":"A1"}]"#);
    }

    #[test]
    fn uncolored_status_is_untouched() {
        assert_eq!(paint_status("redeemed", false), "redeemed");
    }
}
