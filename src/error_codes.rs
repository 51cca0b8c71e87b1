use std::fmt;

use anyhow::Error;
use serde::Serialize;
use serde_json::Value;

use crate::error::PlaybackError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodedErrorKind {
    Configuration,
    NotReady,
    Input,
    Usage,
}

impl CodedErrorKind {
    pub fn exit_code(self) -> i32 {
        match self {
            Self::Configuration => 2,
            Self::NotReady | Self::Input | Self::Usage => 1,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CodedError {
    pub code: &'static str,
    pub message: String,
    pub details: Option<Value>,
    pub kind: CodedErrorKind,
}

impl CodedError {
    pub fn usage(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
            kind: CodedErrorKind::Usage,
        }
    }

    pub fn input(message: impl Into<String>) -> Self {
        Self {
            code: "E_INPUT",
            message: message.into(),
            details: None,
            kind: CodedErrorKind::Input,
        }
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    pub fn envelope(&self) -> ErrorEnvelope {
        ErrorEnvelope {
            ok: false,
            error: ErrorEnvelopeBody {
                code: self.code.to_owned(),
                message: self.message.clone(),
                details: self.details.clone(),
            },
        }
    }
}

impl From<&PlaybackError> for CodedError {
    fn from(error: &PlaybackError) -> Self {
        match error {
            PlaybackError::Configuration(_) => Self {
                code: "E_CONFIG",
                message: error.to_string(),
                details: None,
                kind: CodedErrorKind::Configuration,
            },
            PlaybackError::NotReady => Self {
                code: "E_NOT_READY",
                message: error.to_string(),
                details: None,
                kind: CodedErrorKind::NotReady,
            },
        }
    }
}

impl fmt::Display for CodedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for CodedError {}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorEnvelope {
    pub ok: bool,
    pub error: ErrorEnvelopeBody,
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorEnvelopeBody {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

pub fn find_coded_error(error: &Error) -> Option<&CodedError> {
    error
        .chain()
        .find_map(|cause| cause.downcast_ref::<CodedError>())
}

/// Classifies any error reaching the CLI boundary. Engine errors keep their
/// own code; anything else is treated as unreadable input.
pub fn classify(error: &Error) -> CodedError {
    if let Some(coded) = find_coded_error(error) {
        return coded.clone();
    }
    if let Some(playback) = error
        .chain()
        .find_map(|cause| cause.downcast_ref::<PlaybackError>())
    {
        return CodedError::from(playback).with_details(Value::String(format!("{error:#}")));
    }
    CodedError::input(format!("{error:#}"))
}
