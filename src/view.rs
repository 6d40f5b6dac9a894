//! Map view hints derived from the track extremes.

pub const MAX_ZOOM: u32 = 16;
/// Number of OSM tiles the whole track should fit in, per axis.
pub const MAP_SIZE: u32 = 2;

/// OSM tile `(x, y)` holding a point at the given zoom.
pub fn deg2num(lat_deg: f64, lon_deg: f64, zoom: u32) -> (i64, i64) {
    let lat_rad = lat_deg.to_radians();
    let n = 2f64.powi(zoom as i32);
    let x = ((lon_deg + 180.0) / 360.0 * n) as i64;
    let y = ((1.0 - lat_rad.tan().asinh() / std::f64::consts::PI) / 2.0 * n) as i64;
    (x, y)
}

/// Largest zoom at which the bounding box spans no more than [`MAP_SIZE`]
/// tiles in each direction.
pub fn auto_zoom(lat_min: f64, lat_max: f64, lon_min: f64, lon_max: f64) -> u32 {
    if [lat_min, lat_max, lon_min, lon_max].iter().all(|v| *v == 0.0) {
        return 1;
    }

    let size = i64::from(MAP_SIZE);
    for zoom in 0..MAX_ZOOM {
        let (x_min, y_min) = deg2num(lat_min, lon_min, zoom);
        let (x_max, y_max) = deg2num(lat_max, lon_max, zoom);
        let width = (x_max - x_min).abs();
        let height = (y_max - y_min).abs();

        if width > size || height > size {
            return zoom.saturating_sub(1);
        }
        if (width == size && height < size) || (width < size && height == size) {
            return zoom.saturating_sub(1);
        }
    }
    MAX_ZOOM
}

/// `[lon, lat]` centre of the bounding box.
pub fn map_center(lat_min: f64, lat_max: f64, lon_min: f64, lon_max: f64) -> [f64; 2] {
    [(lon_min + lon_max) / 2.0, (lat_min + lat_max) / 2.0]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deg2num_origin() {
        assert_eq!(deg2num(0.0, 0.0, 1), (1, 1));
        assert_eq!(deg2num(0.0, -180.0, 3), (0, 4));
    }

    #[test]
    fn test_auto_zoom_empty() {
        assert_eq!(auto_zoom(0.0, 0.0, 0.0, 0.0), 1);
    }

    #[test]
    fn test_auto_zoom_small_area_is_closer() {
        let city = auto_zoom(40.40, 40.45, -3.72, -3.68);
        let country = auto_zoom(36.0, 43.8, -9.3, 3.3);
        assert!(city > country, "city {city} country {country}");
        assert!(city <= MAX_ZOOM);
    }

    #[test]
    fn test_auto_zoom_single_point_is_max() {
        assert_eq!(auto_zoom(40.0, 40.0, -3.0, -3.0), MAX_ZOOM);
    }

    #[test]
    fn test_map_center() {
        assert_eq!(map_center(10.0, 20.0, -4.0, 0.0), [-2.0, 15.0]);
    }
}
