use thiserror::Error;

#[derive(Error, Debug)]
pub enum FormError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("{field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("Unrecognized command '{input}': {reason}")]
    Command { input: String, reason: String },

    #[error("Submission failed: {message}")]
    Sink { message: String },
}

impl FormError {
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// 給終端使用者看的訊息
    pub fn user_friendly_message(&self) -> String {
        match self {
            FormError::Http(_) => "Could not reach the company directory".to_string(),
            FormError::Io(e) => format!("File access failed: {}", e),
            FormError::Serialization(_) => "Received data in an unexpected format".to_string(),
            FormError::Url(e) => format!("The lookup address is not a valid URL ({})", e),
            FormError::Config { message } => format!("Configuration problem: {}", message),
            FormError::InvalidConfigValue { field, reason, .. } => {
                format!("Configuration value {} is invalid: {}", field, reason)
            }
            FormError::Validation { reason, .. } => reason.clone(),
            FormError::Command { input, .. } => format!("Unknown command: {}", input),
            FormError::Sink { message } => format!("Could not submit the invoice: {}", message),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            FormError::Http(_) => "Check the network connection and the lookup base URL",
            FormError::Io(_) => "Check that the file exists and is readable",
            FormError::Serialization(_) => "Check that the directory returns a JSON array of companies",
            FormError::Url(_) | FormError::Config { .. } | FormError::InvalidConfigValue { .. } => {
                "Fix the configuration file or command line arguments and try again"
            }
            FormError::Validation { .. } => "Correct the highlighted field and submit again",
            FormError::Command { .. } => {
                "Use <field>=<value>, submit, show or quit (fields: tax_id, company_name, city, street, unit_price, quantity)"
            }
            FormError::Sink { .. } => "Try submitting again",
        }
    }
}

pub type Result<T> = std::result::Result<T, FormError>;
