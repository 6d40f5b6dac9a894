use log::{debug, info, warn};

use crate::api::{Endpoint, Request};
use crate::edit::RemovalLinks;
use crate::error::{ApiError, EditorError};
use crate::summary::Summary;
use crate::track::Track;

type Result<T> = std::result::Result<T, EditorError>;

/// Kind of a structural edit awaiting the server's confirmation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditKind {
    Rename,
    Remove,
    Reverse,
    Split,
    Reorder,
}

impl EditKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Rename => "rename",
            Self::Remove => "remove",
            Self::Reverse => "reverse",
            Self::Split => "split",
            Self::Reorder => "reorder",
        }
    }
}

#[derive(Debug, Clone)]
struct PendingEdit {
    kind: EditKind,
    endpoint: Endpoint,
    snapshot: Track,
}

/// Editing session: owns the track and at most one unconfirmed edit.
///
/// Edits apply locally at once and return the request the server must
/// accept. [`Editor::complete`] commits or restores the pre-edit track from
/// the response status.
#[derive(Debug, Default)]
pub struct Editor {
    track: Option<Track>,
    pending: Option<PendingEdit>,
}

impl Editor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the session track with the body of `GET /editor/get_track`.
    pub fn load(&mut self, json: &str) -> Result<&Track> {
        let track = Track::from_json(json)?;
        info!(
            "loaded track with {} segments, {:.2} km",
            track.segments.len(),
            track.total_distance()
        );
        self.pending = None;
        Ok(&*self.track.insert(track))
    }

    pub fn track(&self) -> Result<&Track> {
        self.track.as_ref().ok_or(EditorError::NoTrack)
    }

    pub fn pending(&self) -> Option<EditKind> {
        self.pending.as_ref().map(|p| p.kind)
    }

    /// Server call the pending edit is waiting on.
    pub fn pending_endpoint(&self) -> Option<&Endpoint> {
        self.pending.as_ref().map(|p| &p.endpoint)
    }

    pub fn rename_segment(&mut self, index: u32, new_name: &str) -> Result<Request> {
        let name = new_name.trim().to_string();
        self.apply(EditKind::Rename, Endpoint::RenameSegment { index, name }, |track| {
            track.rename_segment(index, new_name)
        })
    }

    pub fn remove_segment(&mut self, index: u32) -> Result<(Request, RemovalLinks)> {
        let mut links = RemovalLinks::default();
        let request = self.apply(EditKind::Remove, Endpoint::RemoveSegment { index }, |track| {
            links = track.remove_segment(index)?.1;
            Ok(())
        })?;
        Ok((request, links))
    }

    pub fn reverse_segment(&mut self, index: u32) -> Result<Request> {
        self.apply(EditKind::Reverse, Endpoint::ReverseSegment { index }, |track| {
            track.reverse_segment(index)
        })
    }

    pub fn split_segment(&mut self, index: u32, split_point: usize) -> Result<Request> {
        self.apply(
            EditKind::Split,
            Endpoint::DivideSegment { index, split_point },
            |track| track.split_segment(index, split_point),
        )
    }

    pub fn reorder_segments(&mut self, new_order: &[u32]) -> Result<Request> {
        let endpoint = Endpoint::ChangeSegmentsOrder {
            new_order: new_order.to_vec(),
        };
        self.apply(EditKind::Reorder, endpoint, |track| track.reorder_segments(new_order))
    }

    /// Settle the pending edit from the server's response status.
    ///
    /// On failure the track is restored to its state before the edit and the
    /// classified error is returned.
    pub fn complete(&mut self, status: u16) -> Result<std::result::Result<EditKind, ApiError>> {
        let pending = self.pending.take().ok_or(EditorError::NothingPending)?;
        match pending.endpoint.check_status(status) {
            Ok(()) => {
                debug!("{} confirmed by server ({status})", pending.kind.as_str());
                Ok(Ok(pending.kind))
            }
            Err(e) => {
                warn!("{} rejected by server: {e}", pending.kind.as_str());
                self.track = Some(pending.snapshot);
                Ok(Err(e))
            }
        }
    }

    /// The request for the pending edit never got an answer.
    pub fn abort(&mut self, reason: &str) -> Result<ApiError> {
        let pending = self.pending.take().ok_or(EditorError::NothingPending)?;
        warn!("{} aborted: {reason}", pending.kind.as_str());
        self.track = Some(pending.snapshot);
        Ok(ApiError::Transport(reason.to_string()))
    }

    pub fn summary(&self) -> Result<Summary> {
        Ok(Summary::from_track(self.track()?))
    }

    fn apply<F>(&mut self, kind: EditKind, endpoint: Endpoint, edit: F) -> Result<Request>
    where
        F: FnOnce(&mut Track) -> Result<()>,
    {
        if let Some(pending) = &self.pending {
            return Err(EditorError::EditInFlight(pending.kind.as_str()));
        }
        let track = self.track.as_mut().ok_or(EditorError::NoTrack)?;

        let snapshot = track.clone();
        if let Err(e) = edit(track) {
            *track = snapshot;
            return Err(e);
        }

        let request = endpoint.request();
        debug!("{} applied locally, awaiting {}", kind.as_str(), request.path);
        self.pending = Some(PendingEdit {
            kind,
            endpoint,
            snapshot,
        });
        Ok(request)
    }
}

/// Requests that concern the session as a whole and leave the track alone.
pub mod session {
    use super::*;

    pub fn load_track() -> Request {
        Endpoint::GetTrack.request()
    }

    pub fn get_summary() -> Request {
        Endpoint::GetSummary.request()
    }

    pub fn save() -> Request {
        Endpoint::SaveSession.request()
    }

    pub fn download() -> Request {
        Endpoint::DownloadSession.request()
    }

    /// Session title with line breaks and surrounding blanks removed.
    pub fn title(new_name: &str) -> Result<String> {
        let name = new_name.replace('\n', "").trim().to_string();
        if name.is_empty() {
            return Err(EditorError::BlankName);
        }
        Ok(name)
    }

    /// `encode` escapes the title for use as a path component.
    pub fn rename(new_name: &str, encode: impl Fn(&str) -> String) -> Result<Request> {
        Ok(Endpoint::RenameSession {
            name: title(new_name)?,
        }
        .request_with(encode))
    }
}
