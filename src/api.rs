//! The editor's contract with the server: which request each action sends and
//! how the answer is classified.

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::{ApiError, EditorError};

pub const BASE_PATH: &str = "/editor";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Get,
    Post,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Endpoint {
    GetTrack,
    GetSummary,
    RenameSegment { index: u32, name: String },
    RemoveSegment { index: u32 },
    ReverseSegment { index: u32 },
    DivideSegment { index: u32, split_point: usize },
    ChangeSegmentsOrder { new_order: Vec<u32> },
    SaveSession,
    RenameSession { name: String },
    DownloadSession,
}

/// A request ready to be handed to `fetch`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Request {
    pub method: Method,
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

impl Endpoint {
    /// Short operation name used in error messages.
    pub fn operation(&self) -> &'static str {
        match self {
            Self::GetTrack => "load_track",
            Self::GetSummary => "get_summary",
            Self::RenameSegment { .. } => "rename_segment",
            Self::RemoveSegment { .. } => "remove_segment",
            Self::ReverseSegment { .. } => "reverse_segment",
            Self::DivideSegment { .. } => "split_segment",
            Self::ChangeSegmentsOrder { .. } => "change_segments_order",
            Self::SaveSession => "save_session",
            Self::RenameSession { .. } => "update_session_name",
            Self::DownloadSession => "download_session",
        }
    }

    pub fn method(&self) -> Method {
        match self {
            Self::GetTrack | Self::GetSummary => Method::Get,
            _ => Method::Post,
        }
    }

    /// Path below the site root, with free-text parts inserted as given.
    pub fn path(&self) -> String {
        self.path_with(str::to_string)
    }

    /// Path below the site root, passing free-text parts through `encode`.
    pub fn path_with(&self, encode: impl Fn(&str) -> String) -> String {
        match self {
            Self::GetTrack => format!("{BASE_PATH}/get_track"),
            Self::GetSummary => format!("{BASE_PATH}/get_summary"),
            Self::RenameSegment { index, name } => {
                format!("{BASE_PATH}/rename_segment/{index}/{}", encode(name))
            }
            Self::RemoveSegment { index } => format!("{BASE_PATH}/remove_segment/{index}"),
            Self::ReverseSegment { index } => format!("{BASE_PATH}/reverse_segment/{index}"),
            Self::DivideSegment { index, split_point } => {
                format!("{BASE_PATH}/divide_segment/{index}/{split_point}")
            }
            Self::ChangeSegmentsOrder { .. } => format!("{BASE_PATH}/change_segments_order"),
            Self::SaveSession => format!("{BASE_PATH}/save_session"),
            Self::RenameSession { name } => format!("{BASE_PATH}/rename_session/{}", encode(name)),
            Self::DownloadSession => format!("{BASE_PATH}/download_session"),
        }
    }

    pub fn body(&self) -> Option<String> {
        match self {
            Self::ChangeSegmentsOrder { new_order } => Some(json!({ "new_order": new_order }).to_string()),
            _ => None,
        }
    }

    pub fn request(&self) -> Request {
        self.request_with(str::to_string)
    }

    pub fn request_with(&self, encode: impl Fn(&str) -> String) -> Request {
        Request {
            method: self.method(),
            path: self.path_with(encode),
            body: self.body(),
        }
    }

    /// Classify the response status of this endpoint.
    pub fn check_status(&self, status: u16) -> Result<(), ApiError> {
        check_status(status, self.operation())
    }
}

/// Map a response status to success or a typed error.
pub fn check_status(status: u16, operation: &str) -> Result<(), ApiError> {
    match status {
        200 | 201 => Ok(()),
        520 => Err(ApiError::NoTrackLoaded),
        491 => Err(ApiError::NoTrackAvailable),
        492 => Err(ApiError::SaveRejected),
        532 => Err(ApiError::DomainFailure {
            operation: operation.to_string(),
        }),
        500..=599 => Err(ApiError::Server {
            status,
            operation: operation.to_string(),
        }),
        _ => Err(ApiError::Unexpected {
            status,
            operation: operation.to_string(),
        }),
    }
}

/// Body of `POST /editor/download_session`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum DownloadResponse {
    File { url: String, filename: String },
    Error { error: String },
}

impl DownloadResponse {
    pub fn from_json(json: &str) -> Result<Self, EditorError> {
        Ok(serde_json::from_str(json)?)
    }

    /// The file to fetch, or the server's reason for refusing.
    pub fn into_result(self) -> Result<(String, String), ApiError> {
        match self {
            Self::File { url, filename } => Ok((url, filename)),
            Self::Error { error } => Err(ApiError::Rejected(error)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths() {
        assert_eq!(Endpoint::GetTrack.path(), "/editor/get_track");
        assert_eq!(
            Endpoint::RenameSegment {
                index: 3,
                name: "Climb".into()
            }
            .path(),
            "/editor/rename_segment/3/Climb"
        );
        assert_eq!(
            Endpoint::DivideSegment {
                index: 2,
                split_point: 40
            }
            .path(),
            "/editor/divide_segment/2/40"
        );
        assert_eq!(Endpoint::RemoveSegment { index: 1 }.method(), Method::Post);
        assert_eq!(Endpoint::GetSummary.method(), Method::Get);
    }

    #[test]
    fn test_path_encoding() {
        let endpoint = Endpoint::RenameSession {
            name: "a b".into(),
        };
        assert_eq!(
            endpoint.path_with(|s| s.replace(' ', "%20")),
            "/editor/rename_session/a%20b"
        );
    }

    #[test]
    fn test_change_order_body() {
        let request = Endpoint::ChangeSegmentsOrder {
            new_order: vec![3, 1, 2],
        }
        .request();
        assert_eq!(request.path, "/editor/change_segments_order");
        let body: serde_json::Value = serde_json::from_str(request.body.as_deref().unwrap()).unwrap();
        assert_eq!(body["new_order"], json!([3, 1, 2]));
    }

    #[test]
    fn test_request_serializes_method() {
        let value = serde_json::to_value(Endpoint::SaveSession.request()).unwrap();
        assert_eq!(value["method"], "POST");
        assert!(value.get("body").is_none());
    }

    #[test]
    fn test_check_status() {
        assert_eq!(check_status(200, "x"), Ok(()));
        assert_eq!(check_status(201, "x"), Ok(()));
        assert_eq!(check_status(520, "x"), Err(ApiError::NoTrackLoaded));
        assert_eq!(check_status(492, "x"), Err(ApiError::SaveRejected));
        assert_eq!(
            check_status(532, "split_segment"),
            Err(ApiError::DomainFailure {
                operation: "split_segment".into()
            })
        );
        assert_eq!(
            check_status(503, "remove_segment").unwrap_err().to_string(),
            "Server error: 503 (remove_segment)"
        );
        assert_eq!(
            check_status(404, "reverse_segment").unwrap_err().to_string(),
            "Unexpected error: 404 (reverse_segment)"
        );
        assert_eq!(ApiError::NoTrackLoaded.to_string(), "No track is loaded");
    }

    #[test]
    fn test_download_response() {
        let ok = DownloadResponse::from_json(r#"{"url": "/media/a.gpx", "filename": "a.gpx"}"#).unwrap();
        assert_eq!(ok.into_result(), Ok(("/media/a.gpx".to_string(), "a.gpx".to_string())));

        let err = DownloadResponse::from_json(r#"{"error": "No track is loaded"}"#).unwrap();
        assert_eq!(err.into_result(), Err(ApiError::Rejected("No track is loaded".into())));
    }
}
