use serde::Deserialize;

/// Options for turning the track into map and chart data.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderOptions {
    /// Include elevation as the 3rd coordinate value (default: false)
    #[serde(default)]
    pub include_elevation: bool,

    /// Emit link features and datasets between segments (default: true)
    #[serde(default = "default_true")]
    pub include_links: bool,

    /// Opacity of segment lines on the map (default: 0.5)
    #[serde(default = "default_segment_alpha")]
    pub segment_alpha: f64,

    /// Opacity of the elevation curve fill (default: 0.2)
    #[serde(default = "default_fill_alpha")]
    pub fill_alpha: f64,

    /// Opacity of the elevation curve border (default: 0.8)
    #[serde(default = "default_border_alpha")]
    pub border_alpha: f64,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            include_elevation: false,
            include_links: true,
            segment_alpha: default_segment_alpha(),
            fill_alpha: default_fill_alpha(),
            border_alpha: default_border_alpha(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_segment_alpha() -> f64 {
    0.5
}

fn default_fill_alpha() -> f64 {
    0.2
}

fn default_border_alpha() -> f64 {
    0.8
}
