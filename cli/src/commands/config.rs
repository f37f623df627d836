use anyhow::Result;
use colored::*;

use crate::utils::{
    output::emit,
    settings::{OutputFormat, Settings, DECLINED_BLOCKS_VAR, OUTPUT_FORMAT_VAR},
};

/// Show the effective configuration
pub fn show(settings: &Settings, format: OutputFormat) -> Result<()> {
    emit(format, settings, print_settings_text)
}

fn print_settings_text(settings: &Settings) {
    println!("{}", "Forum Policy Configuration".bold());
    println!("{}", "=".repeat(40));
    println!(
        "  {:<34} {}",
        "declined_blocks_rerequest".cyan(),
        settings.social.declined_blocks_rerequest
    );
    println!(
        "  {:<34} {:?}",
        "output_format".cyan(),
        settings.output_format
    );
    println!();
    println!(
        "{}",
        format!(
            "Set {} or {} in the environment or .env to change these.",
            DECLINED_BLOCKS_VAR, OUTPUT_FORMAT_VAR
        )
        .dimmed()
    );
}
