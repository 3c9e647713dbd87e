use std::fmt;

#[derive(Debug)]
pub enum ScreenError {
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Config validation error (empty taxonomy, overlapping sets, etc.).
    ConfigValidation(String),
    /// Missing required column in input data.
    MissingColumn { table: String, column: String },
    /// Curated review artifact carries an unrecognized decision value.
    ReviewDecision { permit_id: String, value: String },
    /// CSV record-level parse error.
    CsvParse { table: String, detail: String },
    /// IO error (string-level; file handling lives outside the engine).
    Io(String),
}

impl fmt::Display for ScreenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
            Self::MissingColumn { table, column } => {
                write!(f, "{table}: missing column '{column}'")
            }
            Self::ReviewDecision { permit_id, value } => {
                write!(
                    f,
                    "review artifact: permit '{permit_id}' has unrecognized decision '{value}' \
                     (expected 'keep' or 'remove')"
                )
            }
            Self::CsvParse { table, detail } => write!(f, "{table}: {detail}"),
            Self::Io(msg) => write!(f, "IO error: {msg}"),
        }
    }
}

impl std::error::Error for ScreenError {}
