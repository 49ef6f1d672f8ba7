//! Output formatting: table, JSON, YAML, plain.
//!
//! Renders data in the format selected by `--output`. Table uses `tabled`,
//! structured formats use serde, plain emits one identifier per line.

use std::io::{self, IsTerminal, Write};

use owo_colors::OwoColorize;
use tabled::{Table, Tabled, settings::Style};

use crate::cli::{ColorMode, OutputFormat};
use crate::error::CliError;

// ── Color helpers ────────────────────────────────────────────────────

/// Determine whether notices on stderr should be colored.
pub fn should_color(mode: &ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => io::stderr().is_terminal() && std::env::var_os("NO_COLOR").is_none(),
    }
}

/// Print a success notice (`✓ ...`) to stderr unless quiet.
pub fn notice_ok(msg: &str, color: bool, quiet: bool) {
    if quiet {
        return;
    }
    if color {
        eprintln!("{} {msg}", "✓".green());
    } else {
        eprintln!("✓ {msg}");
    }
}

/// Print an informational notice to stderr unless quiet.
pub fn notice_info(msg: &str, color: bool, quiet: bool) {
    if quiet {
        return;
    }
    if color {
        eprintln!("{}", msg.yellow());
    } else {
        eprintln!("{msg}");
    }
}

// ── Render dispatchers ───────────────────────────────────────────────

/// Render a list of serde-serializable items in the chosen format.
///
/// - `table`: converts each item with `to_row` and builds a pretty table
/// - `json` / `json-compact` / `yaml`: serializes `data` via serde
/// - `plain`: calls `id_fn` on each item to emit one identifier per line
pub fn render_list<T, R>(
    format: &OutputFormat,
    data: &[T],
    to_row: impl Fn(&T) -> R,
    id_fn: impl Fn(&T) -> String,
) -> Result<String, CliError>
where
    T: serde::Serialize,
    R: Tabled,
{
    match format {
        OutputFormat::Table => {
            let rows: Vec<R> = data.iter().map(to_row).collect();
            Ok(render_table(&rows))
        }
        OutputFormat::Plain => Ok(data.iter().map(&id_fn).collect::<Vec<_>>().join("\n")),
        structured => render_structured(structured, data),
    }
}

/// Render a single serde-serializable item in the chosen format.
///
/// Table rendering uses `detail_fn`, which returns a pre-formatted string,
/// since single-item views don't use the `Tabled` derive.
pub fn render_single<T>(
    format: &OutputFormat,
    data: &T,
    detail_fn: impl Fn(&T) -> String,
    id_fn: impl Fn(&T) -> String,
) -> Result<String, CliError>
where
    T: serde::Serialize,
{
    match format {
        OutputFormat::Table => Ok(detail_fn(data)),
        OutputFormat::Plain => Ok(id_fn(data)),
        structured => render_structured(structured, data),
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

/// Join `label: value` pairs into an aligned detail block.
pub fn detail_lines(pairs: &[(&str, String)]) -> String {
    let width = pairs.iter().map(|(k, _)| k.len()).max().unwrap_or(0);
    pairs
        .iter()
        .map(|(k, v)| format!("{k:<width$}  {v}"))
        .collect::<Vec<_>>()
        .join("\n")
}

// ── Format-specific renderers ────────────────────────────────────────

fn render_table<R: Tabled>(rows: &[R]) -> String {
    Table::new(rows).with(Style::rounded()).to_string()
}

fn render_structured<T: serde::Serialize + ?Sized>(
    format: &OutputFormat,
    data: &T,
) -> Result<String, CliError> {
    Ok(match format {
        OutputFormat::JsonCompact => serde_json::to_string(data)?,
        OutputFormat::Yaml => serde_yaml::to_string(data)?.trim_end().to_owned(),
        _ => serde_json::to_string_pretty(data)?,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde::Serialize;

    use super::*;

    #[derive(Serialize, Tabled)]
    struct Row {
        id: u32,
        name: &'static str,
    }

    fn rows() -> Vec<Row> {
        vec![Row { id: 1, name: "acme" }, Row { id: 2, name: "globex" }]
    }

    #[test]
    fn plain_lists_one_id_per_line() {
        let out = render_list(
            &OutputFormat::Plain,
            &rows(),
            |r| Row { id: r.id, name: r.name },
            |r| r.id.to_string(),
        )
        .unwrap();
        assert_eq!(out, "1\n2");
    }

    #[test]
    fn compact_json_is_single_line() {
        let out = render_list(
            &OutputFormat::JsonCompact,
            &rows(),
            |r| Row { id: r.id, name: r.name },
            |r| r.id.to_string(),
        )
        .unwrap();
        assert_eq!(out, r#"[{"id":1,"name":"acme"},{"id":2,"name":"globex"}]"#);
    }

    #[test]
    fn table_contains_headers_and_values() {
        let out = render_list(
            &OutputFormat::Table,
            &rows(),
            |r| Row { id: r.id, name: r.name },
            |r| r.id.to_string(),
        )
        .unwrap();
        assert!(out.contains("name"));
        assert!(out.contains("globex"));
    }

    #[test]
    fn yaml_single_has_no_trailing_newline() {
        let out = render_single(&OutputFormat::Yaml, &rows()[0], |_| String::new(), |_| String::new())
            .unwrap();
        assert_eq!(out, "id: 1\nname: acme");
    }

    #[test]
    fn detail_lines_align_labels() {
        let out = detail_lines(&[("ID", "7".into()), ("Status", "Demo".into())]);
        assert_eq!(out, "ID      7\nStatus  Demo");
    }
}
