//! Validation utilities and regex patterns

use regex::Regex;
use std::sync::LazyLock;
use studyviz_common::SystemImprovement;
use validator::ValidationError;

/// Regex pattern for validating hex color codes (e.g., #FFFFFF, #FF0000)
pub static HEX_COLOR_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^#[0-9A-Fa-f]{6}$").expect("Invalid hex color regex pattern")
});

/// Validate file path (basic check for valid path characters)
pub fn validate_file_path(path: &str) -> Result<(), ValidationError> {
    if path.is_empty() {
        return Err(ValidationError::new("empty_file_path"));
    }

    // Colon stays allowed for Windows drive letters (C:\)
    let invalid_chars = ['<', '>', '"', '|', '?', '*'];
    if path.chars().any(|c| invalid_chars.contains(&c)) {
        return Err(ValidationError::new("invalid_file_path_characters"));
    }

    Ok(())
}

/// Validate a chart output file name: a bare `.png` name, no directories
pub fn validate_png_file_name(name: &str) -> Result<(), ValidationError> {
    validate_file_path(name)?;

    if name.contains('/') || name.contains('\\') {
        return Err(ValidationError::new("file_name_has_directory"));
    }
    if !name.to_ascii_lowercase().ends_with(".png") || name.len() <= ".png".len() {
        return Err(ValidationError::new("file_name_not_png"));
    }

    Ok(())
}

/// Validate a log level name
pub fn validate_log_level(level: &str) -> Result<(), ValidationError> {
    match level {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ValidationError::new("invalid_log_level")),
    }
}

/// Validate every entry of a list of hex colors
pub fn validate_hex_colors(colors: &[String]) -> Result<(), ValidationError> {
    if colors.iter().all(|c| HEX_COLOR_REGEX.is_match(c)) {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_hex_color"))
    }
}

/// Validate the improvement reference table
pub fn validate_reference_table(systems: &[SystemImprovement]) -> Result<(), ValidationError> {
    if systems.is_empty() {
        return Err(ValidationError::new("empty_reference_table"));
    }

    for entry in systems {
        if entry.system.trim().is_empty() {
            return Err(ValidationError::new("empty_system_name"));
        }
        if !(0.0..=100.0).contains(&entry.improvement_percentage) {
            return Err(ValidationError::new("improvement_percentage_out_of_range"));
        }
        if entry.sample_size == 0 {
            return Err(ValidationError::new("zero_sample_size"));
        }
    }

    Ok(())
}
