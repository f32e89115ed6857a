// src/utils.rs
use anyhow::Result;

/// Lowercase, ASCII-only slug with single dashes between words
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    for c in text.to_lowercase().chars() {
        let mapped = match c {
            'ä' => "ae",
            'ö' => "oe",
            'ü' => "ue",
            'ß' => "ss",
            c if c.is_ascii_alphanumeric() => {
                slug.push(c);
                continue;
            }
            _ => "-",
        };
        if mapped == "-" {
            if !slug.is_empty() && !slug.ends_with('-') {
                slug.push('-');
            }
        } else {
            slug.push_str(mapped);
        }
    }
    slug.trim_end_matches('-').to_string()
}

/// Trimmed value, or None when blank
pub fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Get file extension in lowercase
pub fn get_file_extension(filename: &str) -> Option<String> {
    std::path::Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase())
}

/// Validate file extension against allowed types
pub fn validate_file_extension(filename: &str, allowed: &[&str]) -> Result<()> {
    let ext = get_file_extension(filename)
        .ok_or_else(|| anyhow::anyhow!("File has no extension: {}", filename))?;

    if !allowed.contains(&ext.as_str()) {
        anyhow::bail!(
            "Unsupported file extension: {}. Allowed: {:?}",
            ext,
            allowed
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Arbeiten in München"), "arbeiten-in-muenchen");
        assert_eq!(slugify("  Blue Card: 2026 Guide!  "), "blue-card-2026-guide");
        assert_eq!(slugify("Straße"), "strasse");
        assert_eq!(slugify("---"), "");
    }

    #[test]
    fn test_non_empty() {
        assert_eq!(non_empty(Some("  x ")), Some("x".to_string()));
        assert_eq!(non_empty(Some("   ")), None);
        assert_eq!(non_empty(None), None);
    }

    #[test]
    fn test_get_file_extension() {
        assert_eq!(get_file_extension("logo.png"), Some("png".to_string()));
        assert_eq!(get_file_extension("Logo.SVG"), Some("svg".to_string()));
        assert_eq!(get_file_extension("noext"), None);
    }

    #[test]
    fn test_validate_file_extension() {
        assert!(validate_file_extension("logo.webp", &["png", "webp"]).is_ok());
        assert!(validate_file_extension("logo.gif", &["png", "webp"]).is_err());
        assert!(validate_file_extension("noext", &["png"]).is_err());
    }
}
