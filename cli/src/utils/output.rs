use anyhow::Result;
use serde::Serialize;

use super::settings::OutputFormat;

/// Print `value` as JSON or YAML, or hand it to `text` for the human format.
pub fn emit<T: Serialize>(format: OutputFormat, value: &T, text: impl FnOnce(&T)) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
        OutputFormat::Yaml => print!("{}", serde_yaml::to_string(value)?),
        OutputFormat::Text => text(value),
    }
    Ok(())
}
