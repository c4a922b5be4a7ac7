//! Output formatting: table, JSON, YAML, plain.
//!
//! Renders data in the format selected by `--output`. Tables use `tabled`;
//! structured formats emit the flat `Outcome` of the API call; plain emits
//! one identifier per line.

use std::io::{self, IsTerminal, Write};

use clap::ValueEnum;
use owo_colors::OwoColorize;
use serde::Serialize;
use tabled::{Table, Tabled, settings::Style};

use iem_config::Settings;
use iem_core::iem_api::{Outcome, Response};

use crate::cli::{ColorMode, GlobalOpts, OutputFormat};

/// `--output` if given, else the configured default, else table.
pub fn resolve_format(global: &GlobalOpts, settings: &Settings) -> OutputFormat {
    global.output.unwrap_or_else(|| {
        OutputFormat::from_str(&settings.output, true).unwrap_or(OutputFormat::Table)
    })
}

/// Determine whether color output should be enabled.
pub fn should_color(mode: ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => io::stdout().is_terminal() && std::env::var("NO_COLOR").is_err(),
    }
}

/// Status word, colored when enabled.
pub fn paint_status(status: &str, ok: Option<bool>, color: bool) -> String {
    if !color {
        return status.to_owned();
    }
    match ok {
        Some(true) => status.green().to_string(),
        Some(false) => status.red().to_string(),
        None => status.yellow().to_string(),
    }
}

// ── Render dispatchers ───────────────────────────────────────────────

/// Render a listing call.
///
/// - `table`: one `Tabled` row per record
/// - `json` / `json-compact` / `yaml`: the call's `Outcome`
/// - `plain`: `id_fn` per record, one per line
pub fn render_list<T, R>(
    format: OutputFormat,
    response: &Response<Vec<T>>,
    to_row: impl Fn(&T) -> R,
    id_fn: impl Fn(&T) -> String,
) -> String
where
    T: Serialize,
    R: Tabled,
{
    match format {
        OutputFormat::Table => {
            let rows: Vec<R> = response.payload.iter().map(to_row).collect();
            render_table(&rows)
        }
        OutputFormat::Plain => response
            .payload
            .iter()
            .map(id_fn)
            .collect::<Vec<_>>()
            .join("\n"),
        structured => render_structured(structured, &Outcome::from_response(response)),
    }
}

/// Render a single-valued call. Table and plain use `text_fn`.
pub fn render_single<T: Serialize>(
    format: OutputFormat,
    response: &Response<T>,
    text_fn: impl Fn(&T) -> String,
) -> String {
    match format {
        OutputFormat::Table | OutputFormat::Plain => text_fn(&response.payload),
        structured => render_structured(structured, &Outcome::from_response(response)),
    }
}

/// Render locally-built rows (reports, config) that are not a single call.
pub fn render_rows<T, R>(format: OutputFormat, data: &[T], to_row: impl Fn(&T) -> R) -> String
where
    T: Serialize,
    R: Tabled,
{
    match format {
        OutputFormat::Table | OutputFormat::Plain => {
            let rows: Vec<R> = data.iter().map(to_row).collect();
            render_table(&rows)
        }
        structured => render_structured(structured, data),
    }
}

/// Flat result of a failed call. Table and plain output leave failures to
/// the diagnostic on stderr.
pub fn render_failure(format: OutputFormat, outcome: &Outcome) -> Option<String> {
    match format {
        OutputFormat::Table | OutputFormat::Plain => None,
        structured => Some(render_structured(structured, outcome)),
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
    Table::new(rows).with(Style::rounded()).to_string()
}

fn render_structured<T: Serialize + ?Sized>(format: OutputFormat, data: &T) -> String {
    let rendered = match format {
        OutputFormat::JsonCompact => serde_json::to_string(data).map_err(|e| e.to_string()),
        OutputFormat::Yaml => serde_yaml::to_string(data).map_err(|e| e.to_string()),
        _ => serde_json::to_string_pretty(data).map_err(|e| e.to_string()),
    };
    rendered.unwrap_or_else(|e| format!("serialization failed: {e}"))
}
