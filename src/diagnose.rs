//! JSON parse diagnostics with path context.
//!
//! The conversion contract absorbs parse failures into an empty result,
//! so the `check` subcommand needs its own way to say *where* a document
//! breaks. `serde_path_to_error` tracks the JSON path while serde_json
//! reports the line/column.

use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct ParseDiagnostic {
    /// JSON path to the failing element, e.g. `player.items[2]`.
    pub path: String,
    pub line: usize,
    pub column: usize,
    pub message: String,
}

impl std::fmt::Display for ParseDiagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "at {} (line {}, column {}): {}",
            self.path, self.line, self.column, self.message
        )
    }
}

pub fn parse_with_diagnostic(src: &str) -> Result<serde_json::Value, ParseDiagnostic> {
    let mut de = serde_json::Deserializer::from_str(src);
    match serde_path_to_error::deserialize::<_, serde_json::Value>(&mut de) {
        Ok(value) => {
            // Enforce end-of-input, same as the conversion pipeline's
            // serde_json::from_str; a document with trailing garbage must
            // not check out here and then fail to convert.
            match de.end() {
                Ok(()) => Ok(value),
                Err(inner) => Err(ParseDiagnostic {
                    path: ".".to_string(),
                    line: inner.line(),
                    column: inner.column(),
                    message: inner.to_string(),
                }),
            }
        }
        Err(err) => {
            let path = err.path().to_string();
            let inner = err.into_inner();
            Err(ParseDiagnostic {
                path,
                line: inner.line(),
                column: inner.column(),
                message: inner.to_string(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_document_parses() {
        assert!(parse_with_diagnostic(r#"{"lives": 3}"#).is_ok());
    }

    #[test]
    fn trailing_garbage_fails_both_surfaces() {
        let src = r#"{"a": 1} trailing"#;
        let diagnostic = parse_with_diagnostic(src).unwrap_err();
        assert_eq!(diagnostic.line, 1);
        // Whatever check rejects, conversion must also reject, and vice
        // versa: check is the pre-flight for the gml subcommand.
        assert!(crate::emit::try_generate(src).is_err());
    }

    #[test]
    fn diagnostic_carries_line_and_column() {
        let diagnostic = parse_with_diagnostic("{\"lives\": 3,\n \"score\": }").unwrap_err();
        assert_eq!(diagnostic.line, 2);
        assert!(diagnostic.column > 0);
        assert!(!diagnostic.message.is_empty());
    }
}
