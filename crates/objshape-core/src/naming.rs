//! Target model name derivation.
//!
//! A target name is the sanitized prefix followed by the sanitized segments
//! of the source model name, all joined with `/`:
//!
//! ```
//! use objshape_core::generate_target_model_name;
//!
//! let name = generate_target_model_name("Example/Model Name", "Converted/").unwrap();
//! assert_eq!(name, "Converted/Example/Model_Name");
//! ```

use crate::{Error, Result, TRACING_TARGET_NAMING};

/// Maximum length of a model name, in characters.
pub const MAX_MODEL_NAME_LEN: usize = 255;

/// Replacement for every character outside the allowed set.
const REPLACEMENT: char = '_';

/// Sanitizes a user prefix: characters other than alphanumerics, `_` and `/`
/// become `_`, then leading and trailing `/` are stripped.
pub fn sanitize_prefix(prefix: &str) -> String {
    prefix
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '_' || c == '/' {
                c
            } else {
                REPLACEMENT
            }
        })
        .collect::<String>()
        .trim_matches('/')
        .to_owned()
}

/// Sanitizes a source model name and splits it into non-empty segments.
///
/// Characters other than alphanumerics, `/`, `\` and `_` become `_`; both
/// slashes separate segments.
pub fn sanitize_segments(source_model_name: &str) -> Vec<String> {
    let sanitized: String = source_model_name
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '/' | '\\' | '_') {
                c
            } else {
                REPLACEMENT
            }
        })
        .collect();

    sanitized
        .trim()
        .split(['/', '\\'])
        .map(|segment| segment.trim().replace(' ', "_"))
        .filter(|segment| !segment.is_empty())
        .collect()
}

/// Derives the name of the model the converted version is published to.
///
/// # Errors
///
/// Returns [`ErrorKind::InvalidInput`](crate::ErrorKind::InvalidInput) when
/// either input is empty or whitespace, when the prefix or the source name
/// sanitize to nothing, or when the result is longer than
/// [`MAX_MODEL_NAME_LEN`] characters.
pub fn generate_target_model_name(source_model_name: &str, prefix: &str) -> Result<String> {
    if source_model_name.trim().is_empty() {
        return Err(Error::invalid_input()
            .with_message("Source model name cannot be empty or whitespace")
            .with_context("source_model_name"));
    }

    if prefix.trim().is_empty() {
        return Err(Error::invalid_input()
            .with_message("Prefix cannot be empty or whitespace")
            .with_context("target_model_prefix"));
    }

    let clean_prefix = sanitize_prefix(prefix);
    if clean_prefix.is_empty() {
        return Err(Error::invalid_input()
            .with_message(format!("Prefix '{prefix}' has no usable characters"))
            .with_context("target_model_prefix"));
    }

    let segments = sanitize_segments(source_model_name);
    if segments.is_empty() {
        return Err(Error::invalid_input()
            .with_message(format!(
                "Source model name '{source_model_name}' has no usable segments"
            ))
            .with_context("source_model_name"));
    }

    let target = format!("{clean_prefix}/{}", segments.join("/"));
    let len = target.chars().count();
    if len > MAX_MODEL_NAME_LEN {
        return Err(Error::invalid_input()
            .with_message(format!(
                "Generated target model name is {len} characters, maximum is {MAX_MODEL_NAME_LEN}"
            ))
            .with_context("target_model_name"));
    }

    tracing::debug!(
        target: TRACING_TARGET_NAMING,
        source = source_model_name,
        prefix,
        target = %target,
        "Generated target model name"
    );

    Ok(target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    fn generate(source: &str, prefix: &str) -> Result<String> {
        generate_target_model_name(source, prefix)
    }

    #[test]
    fn test_spaces_become_underscores() {
        assert_eq!(
            generate("Example/Model Name", "Converted/").unwrap(),
            "Converted/Example/Model_Name"
        );
    }

    #[test]
    fn test_special_characters_are_replaced() {
        assert_eq!(
            generate("Example/Model@Name#Test", "Converted/").unwrap(),
            "Converted/Example/Model_Name_Test"
        );
    }

    #[test]
    fn test_prefix_is_sanitized() {
        assert_eq!(generate("Model", "Converted@/").unwrap(), "Converted_/Model");
        assert_eq!(generate("Model", "/a/b/").unwrap(), "a/b/Model");
    }

    #[test]
    fn test_backslash_separates_segments() {
        assert_eq!(
            generate("Site\\Block A//Level 1", "Out").unwrap(),
            "Out/Site/Block_A/Level_1"
        );
    }

    #[test]
    fn test_unicode_letters_are_kept() {
        assert_eq!(generate("Bâtiment/Étage", "Out").unwrap(), "Out/Bâtiment/Étage");
    }

    #[test]
    fn test_empty_prefix_fails() {
        let error = generate("Model", "").unwrap_err();
        assert_eq!(error.kind, ErrorKind::InvalidInput);

        let error = generate("Model", "   ").unwrap_err();
        assert_eq!(error.kind, ErrorKind::InvalidInput);

        let error = generate("Model", "///").unwrap_err();
        assert_eq!(error.kind, ErrorKind::InvalidInput);
    }

    #[test]
    fn test_blank_source_fails() {
        let error = generate(" ", "Converted/").unwrap_err();
        assert_eq!(error.kind, ErrorKind::InvalidInput);

        let error = generate("", "Converted/").unwrap_err();
        assert_eq!(error.kind, ErrorKind::InvalidInput);

        let error = generate("/\\/", "Converted/").unwrap_err();
        assert_eq!(error.kind, ErrorKind::InvalidInput);
    }

    #[test]
    fn test_too_long_fails() {
        let error = generate(&"a".repeat(300), "Converted/").unwrap_err();
        assert_eq!(error.kind, ErrorKind::InvalidInput);

        // "Converted/" plus 245 characters is exactly the limit.
        let name = generate(&"a".repeat(245), "Converted/").unwrap();
        assert_eq!(name.chars().count(), MAX_MODEL_NAME_LEN);
        assert!(generate(&"a".repeat(246), "Converted/").is_err());
    }

    #[test]
    fn test_deterministic_and_idempotent() {
        let inputs = [
            "Example/Model Name",
            "Example/Model@Name#Test",
            "a\\b/ c d /e",
            "__/x",
        ];

        for source in inputs {
            let first = generate(source, "Converted/").unwrap();
            assert_eq!(generate(source, "Converted/").unwrap(), first);

            let tail = first.strip_prefix("Converted/").unwrap();
            assert_eq!(generate(tail, "Converted/").unwrap(), first);
            assert_eq!(generate(tail, "Converted").unwrap(), first);
        }
    }
}
