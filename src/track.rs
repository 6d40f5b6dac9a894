use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::distance::{cumulative_distance, update_distance};
use crate::error::EditorError;
use crate::links::{Link, reattach, rebuild_links};
use crate::view;

type Result<T> = std::result::Result<T, EditorError>;

/// The whole multi-segment route being edited.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Track {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default)]
    pub segments: Vec<Segment>,
    #[serde(default)]
    pub links_coor: Vec<CoordinateLink>,
    #[serde(default)]
    pub links_ele: Vec<ElevationLink>,
    /// `[lon, lat]`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub map_center: Option<[f64; 2]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub map_zoom: Option<f64>,
}

/// One contiguous recorded path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub index: u32,
    pub name: String,
    pub lat: Vec<f64>,
    pub lon: Vec<f64>,
    pub ele: Vec<f64>,
    #[serde(default)]
    pub segment_distance: Vec<f64>,
    #[serde(default)]
    pub distance: Vec<f64>,
    #[serde(default)]
    pub size: usize,
    /// Toggled on every reversal.
    #[serde(default)]
    pub reversed: bool,
}

/// Geographic position as sent to the map.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LonLat {
    pub lon: f64,
    pub lat: f64,
}

/// Elevation chart position: `x` is track distance in km, `y` elevation in m.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoordinateLink {
    pub from: u32,
    pub to: u32,
    pub from_coor: LonLat,
    pub to_coor: LonLat,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElevationLink {
    pub from: u32,
    pub to: u32,
    pub from_ele: ChartPoint,
    pub to_ele: ChartPoint,
}

impl Segment {
    pub fn new(index: u32, name: String, lat: Vec<f64>, lon: Vec<f64>, ele: Vec<f64>) -> Self {
        let segment_distance = cumulative_distance(&lat, &lon);
        Self {
            index,
            name,
            size: lat.len(),
            distance: segment_distance.clone(),
            segment_distance,
            lat,
            lon,
            ele,
            reversed: false,
        }
    }

    pub fn len(&self) -> usize {
        self.lat.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lat.is_empty()
    }

    /// First point as `[lat, lon]`.
    pub fn first_point(&self) -> Option<[f64; 2]> {
        Some([*self.lat.first()?, *self.lon.first()?])
    }

    /// Last point as `[lat, lon]`.
    pub fn last_point(&self) -> Option<[f64; 2]> {
        Some([*self.lat.last()?, *self.lon.last()?])
    }

    pub fn first_coor(&self) -> Option<LonLat> {
        self.first_point().map(|[lat, lon]| LonLat { lon, lat })
    }

    pub fn last_coor(&self) -> Option<LonLat> {
        self.last_point().map(|[lat, lon]| LonLat { lon, lat })
    }

    pub fn first_ele(&self) -> Option<ChartPoint> {
        Some(ChartPoint {
            x: *self.distance.first()?,
            y: *self.ele.first()?,
        })
    }

    pub fn last_ele(&self) -> Option<ChartPoint> {
        Some(ChartPoint {
            x: *self.distance.last()?,
            y: *self.ele.last()?,
        })
    }

    fn validate(&self) -> Result<()> {
        let n = self.lat.len();
        if n == 0 {
            return Err(EditorError::InvalidTrack(format!(
                "segment {} has no points",
                self.index
            )));
        }
        let lengths = [
            ("lon", self.lon.len()),
            ("ele", self.ele.len()),
            ("segment_distance", self.segment_distance.len()),
        ];
        for (field, len) in lengths {
            if len != n {
                return Err(EditorError::InvalidTrack(format!(
                    "segment {}: {field} has {len} values, lat has {n}",
                    self.index
                )));
            }
        }
        Ok(())
    }
}

impl Track {
    /// Parse the JSON document served by `GET /editor/get_track`.
    pub fn from_json(json: &str) -> Result<Self> {
        let track: Track = serde_json::from_str(json)?;
        track.normalized()
    }

    /// Fill derived fields, validate and restore every invariant of a freshly
    /// loaded track.
    pub fn normalized(mut self) -> Result<Self> {
        let mut seen = HashSet::new();
        for segment in &mut self.segments {
            if !seen.insert(segment.index) {
                return Err(EditorError::InvalidTrack(format!(
                    "duplicate segment index {}",
                    segment.index
                )));
            }
            if segment.segment_distance.is_empty() {
                segment.segment_distance = cumulative_distance(&segment.lat, &segment.lon);
            }
            segment.validate()?;
            segment.size = segment.len();
        }

        self.sort_segments();
        update_distance(&mut self.segments);

        if !self.links_consistent() {
            self.rebuild_links();
        } else {
            self.refresh_coordinate_links();
            self.refresh_elevation_links();
        }
        Ok(self)
    }

    pub fn get_segment_mut(&mut self, index: u32) -> Option<&mut Segment> {
        self.segments.iter_mut().find(|s| s.index == index)
    }

    pub fn position(&self, index: u32) -> Option<usize> {
        self.segments.iter().position(|s| s.index == index)
    }

    pub fn indices(&self) -> Vec<u32> {
        self.segments.iter().map(|s| s.index).collect()
    }

    pub fn sort_segments(&mut self) {
        self.segments.sort_by_key(|s| s.index);
    }

    /// Drop both link sets and reconnect every adjacent pair in sort order.
    pub fn rebuild_links(&mut self) {
        self.links_coor = rebuild_links(&self.segments);
        self.links_ele = rebuild_links(&self.segments);
    }

    /// Move coordinate link endpoints to the current first and last points.
    pub fn refresh_coordinate_links(&mut self) {
        for segment in &self.segments {
            reattach(&mut self.links_coor, segment);
        }
    }

    /// Move elevation link endpoints to the current segment boundaries.
    ///
    /// Distances shift whenever membership or order changes, so the `x`
    /// coordinates of elevation links go stale even when the pairs are right.
    pub fn refresh_elevation_links(&mut self) {
        for link in &mut self.links_ele {
            if let Some(end) = self.segments.iter().find(|s| s.index == link.from).and_then(Segment::last_ele) {
                link.from_ele = end;
            }
            if let Some(start) = self.segments.iter().find(|s| s.index == link.to).and_then(Segment::first_ele) {
                link.to_ele = start;
            }
        }
    }

    /// True when each link set holds exactly one link per adjacent pair.
    pub fn links_consistent(&self) -> bool {
        let pairs: Vec<(u32, u32)> = self.segments.windows(2).map(|w| (w[0].index, w[1].index)).collect();
        same_pairs(&pairs, &self.links_coor) && same_pairs(&pairs, &self.links_ele)
    }

    /// View hints for the map: the served ones when present, otherwise derived
    /// from the track extremes.
    pub fn view_hints(&self) -> ([f64; 2], f64) {
        let extremes = self.extremes();
        let center = self
            .map_center
            .unwrap_or_else(|| view::map_center(extremes[0], extremes[1], extremes[2], extremes[3]));
        let zoom = self
            .map_zoom
            .unwrap_or_else(|| f64::from(view::auto_zoom(extremes[0], extremes[1], extremes[2], extremes[3])));
        (center, zoom)
    }

    /// `[lat_min, lat_max, lon_min, lon_max]`, all zero for an empty track.
    pub fn extremes(&self) -> [f64; 4] {
        let lats = self.segments.iter().flat_map(|s| s.lat.iter().copied());
        let lons = self.segments.iter().flat_map(|s| s.lon.iter().copied());
        match (min_max(lats), min_max(lons)) {
            (Some((lat_min, lat_max)), Some((lon_min, lon_max))) => [lat_min, lat_max, lon_min, lon_max],
            _ => [0.0; 4],
        }
    }

    pub fn total_distance(&self) -> f64 {
        self.segments
            .last()
            .and_then(|s| s.distance.last().copied())
            .unwrap_or(0.0)
    }
}

fn same_pairs<L: Link>(pairs: &[(u32, u32)], links: &[L]) -> bool {
    if pairs.len() != links.len() {
        return false;
    }
    let mut found: Vec<(u32, u32)> = links.iter().map(|l| (l.from(), l.to())).collect();
    found.sort_unstable();
    let mut expected = pairs.to_vec();
    expected.sort_unstable();
    found == expected
}

fn min_max(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    values.fold(None, |acc, v| match acc {
        None => Some((v, v)),
        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
    })
}
