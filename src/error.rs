use thiserror::Error;

pub const UNSUPPORTED_FILE_MESSAGE: &str =
    "Unsupported file type. Please upload a .jpg, .jpeg, or .png image.";
pub const UNEXPECTED_FORMAT_MESSAGE: &str =
    "Unexpected response format. Please check the API documentation.";
pub const MISSING_FIELDS_MESSAGE: &str =
    "Please fill in all fields to find nearby recycling centers.";

/// Structured failure kinds, so callers can branch without matching on display text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    UnsupportedInput,
    MissingFields,
    EmptyResponse,
    Transport,
    Provider,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required environment variable {name} (also accepted as {alias})")]
    MissingKey { name: &'static str, alias: &'static str },
}

#[derive(Error, Debug)]
pub enum InferenceError {
    #[error("unsupported image type '{0}'")]
    UnsupportedMediaType(String),

    #[error("response contained no candidates")]
    NoCandidates,

    #[error("{0}")]
    Transport(#[from] reqwest::Error),

    #[error("provider returned {status}: {body}")]
    Provider { status: u16, body: String },
}

impl InferenceError {
    pub fn kind(&self) -> FailureKind {
        match self {
            InferenceError::UnsupportedMediaType(_) => FailureKind::UnsupportedInput,
            InferenceError::NoCandidates => FailureKind::EmptyResponse,
            InferenceError::Transport(_) => FailureKind::Transport,
            InferenceError::Provider { .. } => FailureKind::Provider,
        }
    }

    /// Text shown in the chat transcript in place of an answer.
    pub fn user_message(&self) -> String {
        match self {
            InferenceError::UnsupportedMediaType(_) => UNSUPPORTED_FILE_MESSAGE.to_string(),
            InferenceError::NoCandidates => UNEXPECTED_FORMAT_MESSAGE.to_string(),
            other => format!(
                "An error occurred during the upload or generation process: {}",
                other
            ),
        }
    }
}

#[derive(Error, Debug)]
pub enum LocationError {
    #[error("{0}")]
    Transport(#[from] reqwest::Error),

    #[error("lookup returned {status}")]
    Provider { status: u16 },
}

impl LocationError {
    pub fn kind(&self) -> FailureKind {
        match self {
            LocationError::Transport(_) => FailureKind::Transport,
            LocationError::Provider { .. } => FailureKind::Provider,
        }
    }

    pub fn user_message(&self) -> String {
        format!("Error detecting location: {}", self)
    }
}

#[derive(Error, Debug)]
pub enum CentersError {
    #[error("city, state and postcode are all required")]
    MissingFields,

    #[error("{0}")]
    Transport(#[from] reqwest::Error),

    #[error("provider returned {status}: {body}")]
    Provider { status: u16, body: String },

    #[error("response contained no choices")]
    EmptyChoices,
}

impl CentersError {
    pub fn kind(&self) -> FailureKind {
        match self {
            CentersError::MissingFields => FailureKind::MissingFields,
            CentersError::Transport(_) => FailureKind::Transport,
            CentersError::Provider { .. } => FailureKind::Provider,
            CentersError::EmptyChoices => FailureKind::EmptyResponse,
        }
    }

    pub fn user_message(&self) -> String {
        match self {
            CentersError::MissingFields => MISSING_FIELDS_MESSAGE.to_string(),
            other => format!("Error fetching recycling centers: {}", other),
        }
    }
}
