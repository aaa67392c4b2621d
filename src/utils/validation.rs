//! Field checks shared by the CLI and TOML dashboard configs: input must be a
//! `.csv`, the AI endpoint an http(s) URL, generation limits in range, and an
//! API key usable only when it is non-blank and fully substituted.

use crate::utils::error::{DashboardError, Result};
use std::collections::HashSet;
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(DashboardError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(DashboardError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(DashboardError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(DashboardError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(DashboardError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_positive_number(field_name: &str, value: u64, min_value: u64) -> Result<()> {
    if value < min_value {
        return Err(DashboardError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be at least {}", min_value),
        });
    }
    Ok(())
}

/// 上傳檔案只接受特定副檔名（大小寫不敏感）
pub fn validate_file_extension(field_name: &str, file: &str, allowed_extensions: &[&str]) -> Result<()> {
    let allowed_set: HashSet<String> = allowed_extensions
        .iter()
        .map(|ext| ext.to_ascii_lowercase())
        .collect();

    match std::path::Path::new(file)
        .extension()
        .and_then(|ext| ext.to_str())
    {
        Some(extension) if allowed_set.contains(&extension.to_ascii_lowercase()) => Ok(()),
        Some(extension) => Err(DashboardError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: file.to_string(),
            reason: format!(
                "Unsupported file extension: {}. Allowed extensions: {}",
                extension,
                allowed_extensions.join(", ")
            ),
        }),
        None => Err(DashboardError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: file.to_string(),
            reason: "File has no extension or invalid filename".to_string(),
        }),
    }
}

pub fn validate_required_field<'a, T>(field_name: &str, value: &'a Option<T>) -> Result<&'a T> {
    value.as_ref().ok_or_else(|| DashboardError::MissingConfigError {
        field: field_name.to_string(),
    })
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(DashboardError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

/// 沒被替換掉的 `${VAR}` 或空白都視為沒有提供金鑰
pub fn usable_api_key(value: Option<&str>) -> Option<&str> {
    value
        .map(str::trim)
        .filter(|key| !key.is_empty())
        .filter(|key| !(key.starts_with("${") && key.ends_with('}')))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("ai.base_url", "https://openrouter.ai/api/v1").is_ok());
        assert!(validate_url("ai.base_url", "http://localhost:8080").is_ok());
        assert!(validate_url("ai.base_url", "").is_err());
        assert!(validate_url("ai.base_url", "invalid-url").is_err());
        assert!(validate_url("ai.base_url", "ftp://example.com").is_err());
    }

    #[test]
    fn test_validate_positive_number() {
        assert!(validate_positive_number("ai.max_tokens", 500, 1).is_ok());
        assert!(validate_positive_number("ai.max_tokens", 0, 1).is_err());
    }

    #[test]
    fn test_validate_file_extension() {
        assert!(validate_file_extension("input", "media.csv", &["csv"]).is_ok());
        assert!(validate_file_extension("input", "MEDIA.CSV", &["csv"]).is_ok());
        assert!(validate_file_extension("input", "media.xlsx", &["csv"]).is_err());
        assert!(validate_file_extension("input", "media", &["csv"]).is_err());
    }

    #[test]
    fn test_validate_range() {
        assert!(validate_range("ai.temperature", 0.7, 0.0, 2.0).is_ok());
        assert!(validate_range("ai.temperature", 2.5, 0.0, 2.0).is_err());
    }

    #[test]
    fn test_usable_api_key() {
        assert_eq!(usable_api_key(Some(" sk-123 ")), Some("sk-123"));
        assert_eq!(usable_api_key(Some("   ")), None);
        assert_eq!(usable_api_key(Some("${OPENROUTER_API_KEY}")), None);
        assert_eq!(usable_api_key(None), None);
    }
}
