use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    ConfigInvalidJson,
    ConfigInvalidValue,

    ValidationInvalidArgument,
    ValidationInvalidJson,

    HeaderKeywordNotFound,
    HeaderKeywordExists,
    HeaderInvalidValue,

    FitsInvalidHeader,

    ReadNoiseMissingKey,
    ReadNoiseNoMatch,

    InternalIoError,
    InternalJsonError,
    InternalUnexpected,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::ConfigInvalidJson => "config.invalid_json",
            ErrorCode::ConfigInvalidValue => "config.invalid_value",

            ErrorCode::ValidationInvalidArgument => "validation.invalid_argument",
            ErrorCode::ValidationInvalidJson => "validation.invalid_json",

            ErrorCode::HeaderKeywordNotFound => "header.keyword_not_found",
            ErrorCode::HeaderKeywordExists => "header.keyword_exists",
            ErrorCode::HeaderInvalidValue => "header.invalid_value",

            ErrorCode::FitsInvalidHeader => "fits.invalid_header",

            ErrorCode::ReadNoiseMissingKey => "readnoise.missing_key",
            ErrorCode::ReadNoiseNoMatch => "readnoise.no_match",

            ErrorCode::InternalIoError => "internal.io_error",
            ErrorCode::InternalJsonError => "internal.json_error",
            ErrorCode::InternalUnexpected => "internal.unexpected",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hint {
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct Error {
    pub code: ErrorCode,
    pub message: String,
    pub details: Value,
    pub hints: Vec<Hint>,
    pub retryable: Option<bool>,
}

pub type Result<T> = std::result::Result<T, Error>;

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for Error {}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvalidArgumentDetails {
    pub field: String,
    pub problem: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tried: Option<Vec<String>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigInvalidValueDetails {
    pub key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    pub problem: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KeywordDetails {
    pub keyword: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FitsInvalidHeaderDetails {
    pub problem: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub card: Option<usize>,
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadNoiseConfigDetails {
    pub serno: Option<i64>,
    pub mode: Option<String>,
    pub preamp: Option<f64>,
    pub readout_mhz: Option<f64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InternalIoErrorDetails {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InternalJsonErrorDetails {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

fn to_details<T: Serialize>(details: T) -> Value {
    serde_json::to_value(details).unwrap_or_else(|_| Value::Object(serde_json::Map::new()))
}

impl Error {
    pub fn new(code: ErrorCode, message: impl Into<String>, details: Value) -> Self {
        Self {
            code,
            message: message.into(),
            details,
            hints: Vec::new(),
            retryable: None,
        }
    }

    pub fn validation_invalid_argument(
        field: impl Into<String>,
        problem: impl Into<String>,
        id: Option<String>,
        tried: Option<Vec<String>>,
    ) -> Self {
        let details = to_details(InvalidArgumentDetails {
            field: field.into(),
            problem: problem.into(),
            id,
            tried,
        });

        Self::new(
            ErrorCode::ValidationInvalidArgument,
            "Invalid argument",
            details,
        )
    }

    pub fn validation_invalid_json(err: serde_json::Error, context: Option<String>) -> Self {
        let details = serde_json::json!({
            "error": err.to_string(),
            "context": context,
        });

        Self::new(ErrorCode::ValidationInvalidJson, "Invalid JSON", details)
    }

    pub fn config_invalid_json(path: impl Into<String>, err: serde_json::Error) -> Self {
        let details = serde_json::json!({
            "path": path.into(),
            "error": err.to_string(),
        });

        Self::new(
            ErrorCode::ConfigInvalidJson,
            "Invalid JSON in configuration",
            details,
        )
    }

    pub fn config_invalid_value(
        key: impl Into<String>,
        value: Option<String>,
        problem: impl Into<String>,
    ) -> Self {
        let details = to_details(ConfigInvalidValueDetails {
            key: key.into(),
            value,
            problem: problem.into(),
        });

        Self::new(
            ErrorCode::ConfigInvalidValue,
            "Invalid configuration value",
            details,
        )
    }

    pub fn header_keyword_not_found(keyword: impl Into<String>) -> Self {
        let keyword = keyword.into();
        Self::new(
            ErrorCode::HeaderKeywordNotFound,
            format!("Keyword '{}' not found in header", keyword),
            to_details(KeywordDetails {
                keyword,
                value: None,
            }),
        )
    }

    pub fn header_keyword_exists(keyword: impl Into<String>) -> Self {
        let keyword = keyword.into();
        Self::new(
            ErrorCode::HeaderKeywordExists,
            format!("Keyword '{}' already exists in header", keyword),
            to_details(KeywordDetails {
                keyword,
                value: None,
            }),
        )
    }

    pub fn header_invalid_value(keyword: impl Into<String>, value: impl Into<String>) -> Self {
        let keyword = keyword.into();
        Self::new(
            ErrorCode::HeaderInvalidValue,
            format!("Invalid value for keyword '{}'", keyword),
            to_details(KeywordDetails {
                keyword,
                value: Some(value.into()),
            }),
        )
    }

    pub fn fits_invalid_header(
        problem: impl Into<String>,
        path: Option<String>,
        card: Option<usize>,
    ) -> Self {
        let details = to_details(FitsInvalidHeaderDetails {
            problem: problem.into(),
            path,
            card,
        });

        Self::new(ErrorCode::FitsInvalidHeader, "Invalid FITS header", details)
    }

    pub fn readnoise_missing_key(keyword: impl Into<String>) -> Self {
        let keyword = keyword.into();
        Self::new(
            ErrorCode::ReadNoiseMissingKey,
            format!(
                "Header lacks '{}' needed to look up readout noise",
                keyword
            ),
            to_details(KeywordDetails {
                keyword,
                value: None,
            }),
        )
    }

    pub fn readnoise_no_match(details: ReadNoiseConfigDetails) -> Self {
        Self::new(
            ErrorCode::ReadNoiseNoMatch,
            "No readout noise table entry for this instrument configuration",
            to_details(details),
        )
        .with_hint("Add a row to defaults.readnoise_table in shoc.json")
    }

    pub fn internal_io(error: impl Into<String>, context: Option<String>) -> Self {
        let details = to_details(InternalIoErrorDetails {
            error: error.into(),
            context,
        });

        Self::new(ErrorCode::InternalIoError, "IO error", details)
    }

    pub fn internal_json(error: impl Into<String>, context: Option<String>) -> Self {
        let details = to_details(InternalJsonErrorDetails {
            error: error.into(),
            context,
        });

        Self::new(ErrorCode::InternalJsonError, "JSON error", details)
    }

    pub fn internal_unexpected(error: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::InternalUnexpected,
            "Unexpected error",
            serde_json::json!({ "error": error.into() }),
        )
    }

    pub fn other(message: impl Into<String>) -> Self {
        Self::internal_unexpected(message)
    }

    pub fn with_hint(mut self, message: impl Into<String>) -> Self {
        self.hints.push(Hint {
            message: message.into(),
        });
        self
    }
}
