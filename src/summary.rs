use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value as JsonValue};

use crate::error::EditorError;
use crate::track::Track;

pub const TOTAL_KEY: &str = "total";
const NOT_AVAILABLE: &str = "n/a";

/// Formatted distance and elevation figures for one row of the summary table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryRow {
    pub distance: String,
    pub uphill: String,
    pub downhill: String,
}

/// Per-segment rows in track order followed by the whole-track row.
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub segments: Vec<(String, SummaryRow)>,
    pub total: SummaryRow,
}

impl SummaryRow {
    fn new(distance_km: f64, uphill_m: f64, downhill_m: f64) -> Self {
        Self {
            distance: distance_label(distance_km),
            uphill: elevation_label(uphill_m),
            downhill: elevation_label(downhill_m),
        }
    }

    fn not_available() -> Self {
        Self {
            distance: NOT_AVAILABLE.to_string(),
            uphill: NOT_AVAILABLE.to_string(),
            downhill: NOT_AVAILABLE.to_string(),
        }
    }
}

impl Summary {
    /// Summary computed locally from the loaded track.
    pub fn from_track(track: &Track) -> Self {
        if track.segments.is_empty() {
            return Self {
                segments: Vec::new(),
                total: SummaryRow::not_available(),
            };
        }

        let segments = track
            .segments
            .iter()
            .map(|s| {
                let distance = s.segment_distance.last().copied().unwrap_or(0.0)
                    - s.segment_distance.first().copied().unwrap_or(0.0);
                let (up, down) = elevation_gain(&s.ele);
                (s.name.clone(), SummaryRow::new(distance, up, down))
            })
            .collect();

        let all_ele: Vec<f64> = track.segments.iter().flat_map(|s| s.ele.iter().copied()).collect();
        let (up, down) = elevation_gain(&all_ele);

        Self {
            segments,
            total: SummaryRow::new(track.total_distance(), up, down),
        }
    }

    /// Parse the body of `GET /editor/get_summary`.
    pub fn from_response(json: &str) -> Result<Self, EditorError> {
        #[derive(Deserialize)]
        struct Response {
            summary: Map<String, JsonValue>,
        }

        let response: Response = serde_json::from_str(json)?;
        let mut segments = Vec::new();
        let mut total = None;
        for (name, value) in response.summary {
            let row: SummaryRow = serde_json::from_value(value)?;
            if name == TOTAL_KEY {
                total = Some(row);
            } else {
                segments.push((name, row));
            }
        }

        Ok(Self {
            segments,
            total: total.unwrap_or_else(SummaryRow::not_available),
        })
    }
}

impl Serialize for Summary {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.segments.len() + 1))?;
        for (name, row) in &self.segments {
            map.serialize_entry(name, row)?;
        }
        map.serialize_entry(TOTAL_KEY, &self.total)?;
        map.end()
    }
}

/// Accumulated positive and negative elevation change in metres.
pub fn elevation_gain(ele: &[f64]) -> (f64, f64) {
    ele.windows(2).fold((0.0, 0.0), |(up, down), w| {
        let diff = w[1] - w[0];
        if diff > 0.0 {
            (up + diff, down)
        } else {
            (up, down + diff)
        }
    })
}

pub fn distance_label(km: f64) -> String {
    if km < 5.0 {
        format!("{km:.2} km")
    } else {
        format!("{km:.1} km")
    }
}

pub fn elevation_label(m: f64) -> String {
    let label = if m.abs() < 10.0 {
        format!("{m:.1} m")
    } else {
        format!("{} m", m.trunc() as i64)
    };
    if m > 0.0 { format!("+{label}") } else { label }
}
