use std::path::PathBuf;
use thiserror::Error;

/// Reasons a spreadsheet could not be turned into a clean table.
///
/// These never escape as panics: the runtime turns them into a user-facing
/// notice and treats the file as absent.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum IngestionError {
    /// The bytes are not a readable workbook or delimited text file.
    #[error("Falha ao ler a planilha: {0}")]
    ParseFailure(String),

    /// The workbook has no worksheet or the worksheet has no header row.
    #[error("A planilha não contém dados")]
    EmptySheet,

    /// The time source is positional (third column) and the sheet is narrower.
    #[error("Esperadas ao menos 3 colunas, encontradas {found}")]
    MissingTimeColumn { found: usize },

    /// The third column reads neither as clock time nor as elapsed durations.
    #[error("A coluna de tempo '{0}' não contém horários nem durações")]
    UnreadableTimeAxis(String),
}

/// All errors produced by the dashboard.
#[derive(Error, Debug)]
pub enum DashError {
    /// Reading an input file from disk failed.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An uploaded file could not be ingested.
    #[error(transparent)]
    Ingestion(#[from] IngestionError),

    /// A JSON document could not be parsed or produced.
    #[error("Failed to process JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// A variable name did not match any canonical variable.
    #[error("Unknown variable: {0}")]
    UnknownVariable(String),

    /// A color string is neither a known name nor `#rrggbb`.
    #[error("Invalid color: {0}")]
    InvalidColor(String),

    /// No spreadsheet files were found at the given paths.
    #[error("No spreadsheet files found")]
    NoDataFiles,

    /// Terminal setup, drawing or input failed.
    #[error("Terminal error: {0}")]
    Terminal(String),

    /// Bad CLI value or an unknown file name in a selection.
    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Anything else.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Convenience alias used throughout the dashboard crates.
pub type Result<T> = std::result::Result<T, DashError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_file_read() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let err = DashError::FileRead {
            path: PathBuf::from("/data/ensaio.xlsx"),
            source: io_err,
        };
        let msg = err.to_string();
        assert!(msg.contains("Failed to read file"));
        assert!(msg.contains("/data/ensaio.xlsx"));
        assert!(msg.contains("no such file"));
    }

    #[test]
    fn test_error_display_parse_failure() {
        let err = IngestionError::ParseFailure("invalid zip header".to_string());
        assert_eq!(
            err.to_string(),
            "Falha ao ler a planilha: invalid zip header"
        );
    }

    #[test]
    fn test_error_display_missing_time_column() {
        let err = IngestionError::MissingTimeColumn { found: 2 };
        assert_eq!(err.to_string(), "Esperadas ao menos 3 colunas, encontradas 2");
    }

    #[test]
    fn test_ingestion_error_is_transparent() {
        let err: DashError = IngestionError::EmptySheet.into();
        assert_eq!(err.to_string(), "A planilha não contém dados");
    }

    #[test]
    fn test_error_display_unknown_variable() {
        let err = DashError::UnknownVariable("Pressão".to_string());
        assert_eq!(err.to_string(), "Unknown variable: Pressão");
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: DashError = io_err.into();
        assert!(err.to_string().contains("denied"));
    }

    #[test]
    fn test_error_from_serde_json() {
        let json_err = serde_json::from_str::<serde_json::Value>("{invalid}").unwrap_err();
        let err: DashError = json_err.into();
        assert!(err.to_string().contains("Failed to process JSON"));
    }
}
