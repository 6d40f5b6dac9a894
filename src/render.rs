use geojson::{Feature, FeatureCollection, Geometry, Value};
use serde::Serialize;
use serde_json::{Map, Value as JsonValue};

use crate::options::RenderOptions;
use crate::track::{ChartPoint, CoordinateLink, ElevationLink, Segment, Track};

const PALETTE: [(u8, u8, u8); 15] = [
    (255, 127, 80),  // coral
    (30, 144, 255),  // dodgerblue
    (50, 205, 50),   // limegreen
    (255, 105, 180), // hotpink
    (250, 128, 114), // salmon
    (123, 104, 238), // mediumslateblue
    (34, 139, 34),   // forestgreen
    (255, 0, 0),     // red
    (95, 158, 160),  // cadetblue
    (218, 112, 214), // orchid
    (189, 183, 107), // darkkhaki
    (160, 82, 45),   // sienna
    (255, 215, 0),   // gold
    (64, 224, 208),  // turquoise
    (0, 128, 128),   // teal
];

const LINK_FILL: &str = "rgba(0, 0, 128, 0.05)";
const LINK_BORDER: &str = "rgba(0, 0, 128, 0.1)";

/// One Chart.js dataset.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartDataset {
    pub label: String,
    pub data: Vec<ChartPoint>,
    pub fill: bool,
    pub show_line: bool,
    pub background_color: String,
    pub border_color: String,
}

/// Colour for a segment index (indices start at 1), cycling the palette.
pub fn segment_color(index: u32, alpha: Option<f64>) -> String {
    let (r, g, b) = PALETTE[(index.saturating_sub(1) as usize) % PALETTE.len()];
    match alpha {
        Some(a) => format!("rgba({r}, {g}, {b}, {a})"),
        None => format!("rgb({r}, {g}, {b})"),
    }
}

/// Segments and coordinate links as a GeoJSON FeatureCollection.
pub fn to_feature_collection(track: &Track, opts: &RenderOptions) -> FeatureCollection {
    let mut features: Vec<Feature> = track
        .segments
        .iter()
        .map(|seg| segment_to_feature(seg, opts))
        .collect();

    if opts.include_links {
        features.extend(track.links_coor.iter().map(link_to_feature));
    }

    FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }
}

/// Elevation profile datasets, one per segment, followed by the link bridges.
pub fn elevation_datasets(track: &Track, opts: &RenderOptions) -> Vec<ChartDataset> {
    let mut datasets: Vec<ChartDataset> = track
        .segments
        .iter()
        .map(|seg| ChartDataset {
            label: format!("elevation_{}", seg.index),
            data: seg
                .distance
                .iter()
                .zip(&seg.ele)
                .map(|(&x, &y)| ChartPoint { x, y })
                .collect(),
            fill: true,
            show_line: true,
            background_color: segment_color(seg.index, Some(opts.fill_alpha)),
            border_color: segment_color(seg.index, Some(opts.border_alpha)),
        })
        .collect();

    if opts.include_links {
        datasets.extend(track.links_ele.iter().map(elevation_link_dataset));
    }

    datasets
}

fn segment_to_feature(seg: &Segment, opts: &RenderOptions) -> Feature {
    let coords: Vec<Vec<f64>> = (0..seg.len())
        .map(|i| match (opts.include_elevation, seg.ele.get(i)) {
            (true, Some(&ele)) => vec![seg.lon[i], seg.lat[i], ele],
            _ => vec![seg.lon[i], seg.lat[i]],
        })
        .collect();

    let mut props = Map::new();
    props.insert("kind".to_string(), JsonValue::String("segment".to_string()));
    props.insert("index".to_string(), JsonValue::Number(seg.index.into()));
    props.insert("name".to_string(), JsonValue::String(seg.name.clone()));
    props.insert(
        "color".to_string(),
        JsonValue::String(segment_color(seg.index, Some(opts.segment_alpha))),
    );
    props.insert("reversed".to_string(), JsonValue::Bool(seg.reversed));

    Feature {
        bbox: None,
        geometry: Some(Geometry::new(Value::LineString(coords))),
        id: Some(geojson::feature::Id::String(format!("features_lines_{}", seg.index))),
        properties: Some(props),
        foreign_members: None,
    }
}

fn link_to_feature(link: &CoordinateLink) -> Feature {
    let coords = vec![
        vec![link.from_coor.lon, link.from_coor.lat],
        vec![link.to_coor.lon, link.to_coor.lat],
    ];

    let mut props = Map::new();
    props.insert("kind".to_string(), JsonValue::String("link".to_string()));
    props.insert("from".to_string(), JsonValue::Number(link.from.into()));
    props.insert("to".to_string(), JsonValue::Number(link.to.into()));

    Feature {
        bbox: None,
        geometry: Some(Geometry::new(Value::LineString(coords))),
        id: Some(geojson::feature::Id::String(format!("link_{}_{}", link.from, link.to))),
        properties: Some(props),
        foreign_members: None,
    }
}

fn elevation_link_dataset(link: &ElevationLink) -> ChartDataset {
    ChartDataset {
        label: format!("link_{}_{}", link.from, link.to),
        data: vec![link.from_ele, link.to_ele],
        fill: true,
        show_line: true,
        background_color: LINK_FILL.to_string(),
        border_color: LINK_BORDER.to_string(),
    }
}
