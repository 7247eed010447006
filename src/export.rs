use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tracing::{debug, trace};

use crate::columns::ColumnRegistry;
use crate::domain::PVError;
use crate::records::PropertyRecord;

pub const EXPORT_FILE_NAME: &str = "property-records.csv";

/// Naive comma-separated snapshot of the given rows: visible data column
/// labels, then raw cell values, absent values as empty strings. Embedded
/// commas and quotes are left as they are, matching the artifact the
/// dashboard always produced. No trailing newline.
pub fn csv_document(records: &[&PropertyRecord], registry: &ColumnRegistry) -> String {
    let mut lines = Vec::with_capacity(records.len() + 1);

    let header: Vec<&str> = registry.visible_data().map(|(_, column)| column.label).collect();
    lines.push(header.join(","));

    for record in records {
        let cells: Vec<String> = registry
            .visible_data()
            .map(|(field, _)| {
                record
                    .value(field)
                    .map(|value| value.to_string())
                    .unwrap_or_default()
            })
            .collect();
        lines.push(cells.join(","));
    }

    lines.join("\n")
}

pub fn export_csv(
    records: &[&PropertyRecord],
    registry: &ColumnRegistry,
    dir: &Path,
) -> Result<PathBuf, PVError> {
    let path = dir.join(EXPORT_FILE_NAME);
    fs::write(&path, csv_document(records, registry))?;
    debug!("Wrote {} rows to {}", records.len(), path.display());
    Ok(path)
}

// Quote rules for clipboard rows: double embedded quotes, wrap cells
// that contain a separator character.
pub fn wrap_cell(content: &str) -> String {
    let needs_escaping = content.chars().any(|c| c == '"');
    let needs_wrapping = content.chars().any(|c| c == ' ' || c == '\t' || c == ',');
    let mut out = String::from(content);

    if needs_escaping {
        out = out.replace("\"", "\"\"");
    }
    if needs_wrapping {
        out = format!("\"{out}\"");
    }
    out
}

pub fn clipboard_line(record: &PropertyRecord, registry: &ColumnRegistry) -> String {
    registry
        .visible_data()
        .map(|(field, _)| {
            wrap_cell(
                &record
                    .value(field)
                    .map(|value| value.to_string())
                    .unwrap_or_default(),
            )
        })
        .collect::<Vec<String>>()
        .join(",")
}

/// Plain-text rendition of a page for the print spooler: title, an
/// aligned header/row grid and the results line underneath.
pub fn text_snapshot(title: &str, header: &[String], rows: &[Vec<String>], footer: &str) -> String {
    let ncols = rows
        .iter()
        .map(|row| row.len())
        .chain([header.len()])
        .max()
        .unwrap_or(0);

    let mut widths: Vec<usize> = header.iter().map(|cell| cell.chars().count()).collect();
    widths.resize(ncols, 0);
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }

    let render = |row: &[String]| -> String {
        let cells: Vec<String> = row
            .iter()
            .enumerate()
            .map(|(i, cell)| format!("{cell:<width$}", width = widths[i]))
            .collect();
        cells.join("  ").trim_end().to_string()
    };

    let separator: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();

    let mut lines = vec![title.trim().to_string(), String::new()];
    lines.push(render(header));
    lines.push(separator.join("  "));
    for row in rows {
        lines.push(render(row));
    }
    lines.push(String::new());
    lines.push(footer.to_string());
    lines.join("\n")
}

/// Where a printed page ends up. The production surface hands the
/// plain-text snapshot to the host spooler; tests capture it instead.
pub trait PrintSurface {
    fn print(&mut self, document: &str) -> Result<(), PVError>;
}

pub struct SpoolPrinter {
    spoolers: Vec<String>,
}

impl Default for SpoolPrinter {
    fn default() -> Self {
        SpoolPrinter {
            spoolers: vec!["lpr".to_string(), "lp".to_string()],
        }
    }
}

impl PrintSurface for SpoolPrinter {
    fn print(&mut self, document: &str) -> Result<(), PVError> {
        let mut last_error = String::from("no spooler configured");
        for spooler in &self.spoolers {
            trace!("Trying print spooler {spooler}");
            match Command::new(spooler)
                .stdin(Stdio::piped())
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .spawn()
            {
                Ok(mut child) => {
                    let wrote = match child.stdin.take() {
                        Some(mut stdin) => stdin.write_all(document.as_bytes()).is_ok(),
                        None => false,
                    };
                    match child.wait() {
                        Ok(status) if wrote && status.success() => {
                            debug!("Spooled {} bytes via {spooler}", document.len());
                            return Ok(());
                        }
                        Ok(status) => last_error = format!("{spooler} exited with {status}"),
                        Err(e) => last_error = format!("{spooler}: {e}"),
                    }
                }
                Err(e) => last_error = format!("{spooler}: {e}"),
            }
        }
        Err(PVError::PrintFailed(last_error))
    }
}
