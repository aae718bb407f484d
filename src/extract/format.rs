use crate::config::OutputFormat;
use crate::extract::ExtractError;

/// Renders extracted matches in the requested output format
///
/// - `text`: one match per line
/// - `json`: a JSON array of strings
/// - `csv`: a single CSV record, quoted where needed
pub fn format_matches(matches: &[String], format: OutputFormat) -> Result<String, ExtractError> {
    match format {
        OutputFormat::Text => Ok(matches.join("\n")),
        OutputFormat::Json => {
            serde_json::to_string(matches).map_err(|e| ExtractError::Format(e.to_string()))
        }
        OutputFormat::Csv => {
            let mut writer = csv::WriterBuilder::new()
                .has_headers(false)
                .from_writer(Vec::new());
            writer
                .write_record(matches)
                .map_err(|e| ExtractError::Format(e.to_string()))?;
            let bytes = writer
                .into_inner()
                .map_err(|e| ExtractError::Format(e.to_string()))?;
            let line = String::from_utf8(bytes).map_err(|e| ExtractError::Format(e.to_string()))?;
            Ok(line.trim_end_matches(['\r', '\n']).to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matches() -> Vec<String> {
        vec!["one".to_string(), "two, three".to_string()]
    }

    #[test]
    fn test_text_format() {
        assert_eq!(
            format_matches(&matches(), OutputFormat::Text).unwrap(),
            "one\ntwo, three"
        );
    }

    #[test]
    fn test_json_format() {
        assert_eq!(
            format_matches(&matches(), OutputFormat::Json).unwrap(),
            r#"["one","two, three"]"#
        );
    }

    #[test]
    fn test_csv_format_quotes_commas() {
        assert_eq!(
            format_matches(&matches(), OutputFormat::Csv).unwrap(),
            r#"one,"two, three""#
        );
    }
}
