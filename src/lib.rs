pub mod api;
pub mod distance;
pub mod edit;
pub mod editor;
pub mod error;
pub mod links;
pub mod options;
pub mod render;
pub mod summary;
pub mod track;
pub mod view;

use serde::Serialize;
use wasm_bindgen::prelude::*;

use crate::api::{DownloadResponse, Endpoint, Request};
use crate::editor::{Editor, session};
use crate::error::EditorError;
use crate::options::RenderOptions;
use crate::summary::Summary;

/// Editing session exported to JavaScript.
///
/// Every edit method applies the change locally and returns the request the
/// page must `fetch`; the response status is then passed to `complete`.
#[wasm_bindgen]
pub struct TrackEditor {
    inner: Editor,
}

#[derive(Serialize)]
struct RemovalResult<'a> {
    request: Request,
    links: &'a edit::RemovalLinks,
}

#[wasm_bindgen]
impl TrackEditor {
    #[wasm_bindgen(constructor)]
    pub fn new() -> TrackEditor {
        console_error_panic_hook::set_once();
        TrackEditor {
            inner: Editor::new(),
        }
    }

    /// Load the JSON body of `GET /editor/get_track`.
    #[wasm_bindgen(js_name = loadTrack)]
    pub fn load_track(&mut self, json: &str) -> Result<(), JsValue> {
        self.inner.load(json)?;
        Ok(())
    }

    /// Current track as a JS object.
    pub fn track(&self) -> Result<JsValue, JsValue> {
        to_js(self.inner.track()?)
    }

    #[wasm_bindgen(js_name = renameSegment)]
    pub fn rename_segment(&mut self, index: u32, name: &str) -> Result<JsValue, JsValue> {
        self.inner.rename_segment(index, name)?;
        self.pending_request()
    }

    /// Returns `{request, links}` where `links` lists the link changes to redraw.
    #[wasm_bindgen(js_name = removeSegment)]
    pub fn remove_segment(&mut self, index: u32) -> Result<JsValue, JsValue> {
        let (_, links) = self.inner.remove_segment(index)?;
        let endpoint = self
            .inner
            .pending_endpoint()
            .ok_or(EditorError::NothingPending)?;
        to_js(&RemovalResult {
            request: encode_request(endpoint),
            links: &links,
        })
    }

    #[wasm_bindgen(js_name = reverseSegment)]
    pub fn reverse_segment(&mut self, index: u32) -> Result<JsValue, JsValue> {
        self.inner.reverse_segment(index)?;
        self.pending_request()
    }

    #[wasm_bindgen(js_name = splitSegment)]
    pub fn split_segment(&mut self, index: u32, split_point: usize) -> Result<JsValue, JsValue> {
        self.inner.split_segment(index, split_point)?;
        self.pending_request()
    }

    #[wasm_bindgen(js_name = reorderSegments)]
    pub fn reorder_segments(&mut self, new_order: Vec<u32>) -> Result<JsValue, JsValue> {
        self.inner.reorder_segments(&new_order)?;
        self.pending_request()
    }

    /// Settle the pending edit. Resolves to the edit kind, rejects with the
    /// message to display after restoring the previous track.
    pub fn complete(&mut self, status: u16) -> Result<String, JsValue> {
        match self.inner.complete(status)? {
            Ok(kind) => Ok(kind.as_str().to_string()),
            Err(e) => Err(e.into()),
        }
    }

    /// The pending request failed in transit. Returns the message to display.
    pub fn abort(&mut self, reason: &str) -> Result<String, JsValue> {
        Ok(self.inner.abort(reason)?.to_string())
    }

    /// Kind of the edit awaiting the server, if any.
    pub fn pending(&self) -> Option<String> {
        self.inner.pending().map(|k| k.as_str().to_string())
    }

    #[wasm_bindgen(js_name = toGeoJson)]
    pub fn to_geojson(&self, options: JsValue) -> Result<JsValue, JsValue> {
        let opts = parse_options(options)?;
        let fc = render::to_feature_collection(self.inner.track()?, &opts);
        to_js(&fc)
    }

    #[wasm_bindgen(js_name = toGeoJsonString)]
    pub fn to_geojson_string(&self, options: JsValue) -> Result<String, JsValue> {
        let opts = parse_options(options)?;
        let fc = render::to_feature_collection(self.inner.track()?, &opts);
        serde_json::to_string(&fc).map_err(|e| JsValue::from_str(&e.to_string()))
    }

    #[wasm_bindgen(js_name = elevationDatasets)]
    pub fn elevation_datasets(&self, options: JsValue) -> Result<JsValue, JsValue> {
        let opts = parse_options(options)?;
        to_js(&render::elevation_datasets(self.inner.track()?, &opts))
    }

    pub fn summary(&self) -> Result<JsValue, JsValue> {
        to_js(&self.inner.summary()?)
    }

    /// `[[lon, lat], zoom]` for the map view.
    #[wasm_bindgen(js_name = viewHints)]
    pub fn view_hints(&self) -> Result<JsValue, JsValue> {
        to_js(&self.inner.track()?.view_hints())
    }

    fn pending_request(&self) -> Result<JsValue, JsValue> {
        let endpoint = self
            .inner
            .pending_endpoint()
            .ok_or(EditorError::NothingPending)?;
        to_js(&encode_request(endpoint))
    }
}

impl Default for TrackEditor {
    fn default() -> Self {
        Self::new()
    }
}

/// Great-circle distance in km.
#[wasm_bindgen(js_name = haversineDistance)]
pub fn haversine_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    distance::haversine_distance([lat1, lon1], [lat2, lon2])
}

/// Message to display for a response status, or `undefined` on success.
#[wasm_bindgen(js_name = statusMessage)]
pub fn status_message(status: u16, operation: &str) -> Option<String> {
    api::check_status(status, operation).err().map(|e| e.to_string())
}

#[wasm_bindgen(js_name = segmentColor)]
pub fn segment_color(index: u32, alpha: Option<f64>) -> String {
    render::segment_color(index, alpha)
}

#[wasm_bindgen(js_name = loadTrackRequest)]
pub fn load_track_request() -> Result<JsValue, JsValue> {
    to_js(&session::load_track())
}

#[wasm_bindgen(js_name = summaryRequest)]
pub fn summary_request() -> Result<JsValue, JsValue> {
    to_js(&session::get_summary())
}

#[wasm_bindgen(js_name = saveSessionRequest)]
pub fn save_session_request() -> Result<JsValue, JsValue> {
    to_js(&session::save())
}

#[wasm_bindgen(js_name = downloadSessionRequest)]
pub fn download_session_request() -> Result<JsValue, JsValue> {
    to_js(&session::download())
}

#[wasm_bindgen(js_name = renameSessionRequest)]
pub fn rename_session_request(name: &str) -> Result<JsValue, JsValue> {
    to_js(&session::rename(name, encode_uri)?)
}

/// Parse the server's summary table.
#[wasm_bindgen(js_name = parseSummary)]
pub fn parse_summary(json: &str) -> Result<JsValue, JsValue> {
    to_js(&Summary::from_response(json)?)
}

/// Parse the download response into `{url, filename}`, rejecting with the
/// server's error message.
#[wasm_bindgen(js_name = parseDownloadResponse)]
pub fn parse_download_response(json: &str) -> Result<JsValue, JsValue> {
    let response = DownloadResponse::from_json(json)?;
    response.clone().into_result()?;
    to_js(&response)
}

fn encode_request(endpoint: &Endpoint) -> Request {
    endpoint.request_with(encode_uri)
}

fn encode_uri(s: &str) -> String {
    js_sys::encode_uri_component(s).into()
}

fn parse_options(options: JsValue) -> Result<RenderOptions, JsValue> {
    if options.is_undefined() || options.is_null() {
        Ok(RenderOptions::default())
    } else {
        serde_wasm_bindgen::from_value(options).map_err(|e| JsValue::from_str(&e.to_string()))
    }
}

fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, JsValue> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|e| JsValue::from_str(&e.to_string()))
}
