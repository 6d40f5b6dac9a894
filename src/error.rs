use thiserror::Error;
use wasm_bindgen::JsValue;

/// Errors raised by local track edits, before any request reaches the server.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EditorError {
    #[error("No track is loaded")]
    NoTrack,
    #[error("Invalid track: {0}")]
    InvalidTrack(String),
    #[error("Track JSON error: {0}")]
    Json(String),
    #[error("Segment {0} does not exist")]
    UnknownSegment(u32),
    #[error("Segment name cannot be blank")]
    BlankName,
    #[error("Invalid split point {split_point} for segment {index} of size {size}")]
    InvalidSplitPoint {
        index: u32,
        split_point: usize,
        size: usize,
    },
    #[error("Segment {0} cannot be split: no index left after it")]
    IndexOverflow(u32),
    #[error("Invalid segment order: {0}")]
    InvalidOrder(String),
    #[error("At least two segments are required to modify order")]
    NotEnoughSegments,
    #[error("Another edit ({0}) is waiting for the server")]
    EditInFlight(&'static str),
    #[error("No edit is waiting for the server")]
    NothingPending,
}

impl From<serde_json::Error> for EditorError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e.to_string())
    }
}

/// Outcome of a server call that did not succeed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    #[error("Unexpected error: {0}")]
    Transport(String),
    #[error("No track is loaded")]
    NoTrackLoaded,
    #[error("No track is loaded")]
    NoTrackAvailable,
    #[error("Unexpected error. Code: 492")]
    SaveRejected,
    #[error("Server error: 532 ({operation})")]
    DomainFailure { operation: String },
    #[error("Server error: {status} ({operation})")]
    Server { status: u16, operation: String },
    #[error("Unexpected error: {status} ({operation})")]
    Unexpected { status: u16, operation: String },
    #[error("{0}")]
    Rejected(String),
}

impl From<EditorError> for JsValue {
    fn from(e: EditorError) -> Self {
        JsValue::from_str(&e.to_string())
    }
}

impl From<ApiError> for JsValue {
    fn from(e: ApiError) -> Self {
        JsValue::from_str(&e.to_string())
    }
}
