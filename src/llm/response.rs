//! Typed `generateContent` response schema and its validation.
//!
//! The answer is pulled out by a pure function that descends one level at
//! a time: only the first candidate and its first part are ever decoded,
//! so anything after them may take any shape. Every way the call can go
//! wrong maps to exactly one [`ModelResponse`] variant, checked in a fixed
//! order so the same malformed body always yields the same failure.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use std::fmt;

/// Successful HTTP status for the model endpoint.
const STATUS_OK: u16 = 200;

/// Partial schema of a `generateContent` response.
///
/// Candidates stay raw JSON until [`extract_answer`] decodes the first one.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Option<Vec<Value>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<Value>,
}

/// Parts stay raw JSON until the first one is decoded.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Content {
    #[serde(default)]
    pub parts: Option<Vec<Value>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Part {
    #[serde(default)]
    pub text: Option<String>,
}

/// Where in the response structure validation stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeStage {
    /// The body is not a JSON object matching the schema.
    Body,
    /// No `candidates` key.
    Candidates,
    /// First candidate is not an object, or has no `content`.
    Content,
    /// Content is not an object, or has no `parts` list.
    Parts,
    /// No first part, or the first part has no string `text`.
    Text,
}

/// Outcome of one model call.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelResponse {
    /// Answer text of the first part of the first candidate.
    Success(String),
    /// The call did not finish within the timeout.
    Timeout { secs: u64 },
    /// The request failed before a response arrived.
    Transport(String),
    /// Non-200 status, with the raw body.
    Status { code: u16, body: String },
    /// `candidates` was present but empty.
    EmptyCandidates { body: String },
    /// The response was missing an expected element.
    Shape { stage: ShapeStage, body: String },
}

impl ModelResponse {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Short category name for logging.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Success(_) => "success",
            Self::Timeout { .. } => "timeout",
            Self::Transport(_) => "transport",
            Self::Status { .. } => "status",
            Self::EmptyCandidates { .. } => "empty-candidates",
            Self::Shape { .. } => "shape",
        }
    }
}

impl fmt::Display for ModelResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success(text) => write!(f, "{text}"),
            Self::Timeout { secs } => write!(f, "Error: API timeout ({secs}s elapsed)"),
            Self::Transport(cause) => write!(f, "Error: request failed - {cause}"),
            Self::Status { code, body } => write!(f, "Error {code}: {body}"),
            Self::EmptyCandidates { body } => write!(f, "Error: Empty candidates: {body}"),
            Self::Shape { stage, body } => match stage {
                ShapeStage::Body => write!(f, "Error: Malformed response: {body}"),
                ShapeStage::Candidates => write!(f, "Error: No candidates in response: {body}"),
                ShapeStage::Content => write!(f, "Error: No content: {body}"),
                ShapeStage::Parts => write!(f, "Error: No parts: {body}"),
                ShapeStage::Text => write!(f, "Error: No text in first part: {body}"),
            },
        }
    }
}

/// Why [`extract_answer`] could not produce text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractFailure {
    Empty,
    Shape(ShapeStage),
}

/// Decodes one level of the response, reporting `stage` if it does not fit.
fn decode_at<T: DeserializeOwned>(value: Value, stage: ShapeStage) -> Result<T, ExtractFailure> {
    serde_json::from_value(value).map_err(|_| ExtractFailure::Shape(stage))
}

/// Returns the text of the first part of the first candidate.
///
/// Further candidates and parts are never decoded.
pub fn extract_answer(response: GenerateContentResponse) -> Result<String, ExtractFailure> {
    let candidates = response
        .candidates
        .ok_or(ExtractFailure::Shape(ShapeStage::Candidates))?;
    let first = candidates.into_iter().next().ok_or(ExtractFailure::Empty)?;

    let candidate: Candidate = decode_at(first, ShapeStage::Content)?;
    let content = candidate
        .content
        .ok_or(ExtractFailure::Shape(ShapeStage::Content))?;

    let content: Content = decode_at(content, ShapeStage::Parts)?;
    let parts = content
        .parts
        .ok_or(ExtractFailure::Shape(ShapeStage::Parts))?;

    let first_part = parts
        .into_iter()
        .next()
        .ok_or(ExtractFailure::Shape(ShapeStage::Text))?;
    let part: Part = decode_at(first_part, ShapeStage::Text)?;
    part.text.ok_or(ExtractFailure::Shape(ShapeStage::Text))
}

/// Interprets an HTTP status and body from the model endpoint.
pub fn interpret_response(status: u16, body: &str) -> ModelResponse {
    if status != STATUS_OK {
        return ModelResponse::Status {
            code: status,
            body: body.to_string(),
        };
    }

    let parsed: GenerateContentResponse = match serde_json::from_str(body) {
        Ok(parsed) => parsed,
        Err(_) => {
            return ModelResponse::Shape {
                stage: ShapeStage::Body,
                body: body.to_string(),
            }
        }
    };

    match extract_answer(parsed) {
        Ok(text) => ModelResponse::Success(text),
        Err(ExtractFailure::Empty) => ModelResponse::EmptyCandidates {
            body: body.to_string(),
        },
        Err(ExtractFailure::Shape(stage)) => ModelResponse::Shape {
            stage,
            body: body.to_string(),
        },
    }
}
