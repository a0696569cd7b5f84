use crate::error::CliError;
use serde::Serialize;

/// Writes `value` as pretty JSON to `path`, or to stdout.
pub async fn emit_json<T: Serialize>(value: &T, path: Option<&str>) -> Result<(), CliError> {
    let json = serde_json::to_string_pretty(value)?;
    write_or_print(json, path).await
}

/// Writes one item per line.
pub async fn emit_lines(lines: &[String], path: Option<&str>) -> Result<(), CliError> {
    write_or_print(lines.join("\n"), path).await
}

async fn write_or_print(text: String, path: Option<&str>) -> Result<(), CliError> {
    match path {
        Some(path) => tokio::fs::write(path, text).await?,
        None => println!("{text}"),
    }
    Ok(())
}
