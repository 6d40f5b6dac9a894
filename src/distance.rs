use crate::track::Segment;

pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance in km between two `[lat, lon]` points in degrees.
pub fn haversine_distance([lat1, lon1]: [f64; 2], [lat2, lon2]: [f64; 2]) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();
    let lat1 = lat1.to_radians();
    let lat2 = lat2.to_radians();

    let a = (d_lat / 2.0).sin().powi(2) + (d_lon / 2.0).sin().powi(2) * lat1.cos() * lat2.cos();
    let c = 2.0 * a.sqrt().asin();

    EARTH_RADIUS_KM * c
}

/// Cumulative distance along a single path, starting at 0.
pub fn cumulative_distance(lat: &[f64], lon: &[f64]) -> Vec<f64> {
    let mut out = Vec::with_capacity(lat.len());
    let mut total = 0.0;
    for i in 0..lat.len().min(lon.len()) {
        if i > 0 {
            total += haversine_distance([lat[i - 1], lon[i - 1]], [lat[i], lon[i]]);
        }
        out.push(total);
    }
    out
}

/// Recompute the track-relative `distance` of every segment.
///
/// Segments must already be sorted by index. The first segment's
/// `segment_distance` is rebased to start at 0; every following segment is
/// offset by the previous segment's final distance plus the gap between the
/// previous last point and its own first point.
pub fn update_distance(segments: &mut [Segment]) {
    let Some((first, rest)) = segments.split_first_mut() else {
        return;
    };

    if let Some(&origin) = first.segment_distance.first() {
        first.segment_distance.iter_mut().for_each(|d| *d -= origin);
    }
    first.distance = first.segment_distance.clone();

    let mut previous: &Segment = first;
    for current in rest {
        let offset = match (previous.distance.last(), previous.last_point(), current.first_point()) {
            (Some(&end), Some(from), Some(to)) => end + haversine_distance(from, to),
            _ => 0.0,
        };
        current.distance = current.segment_distance.iter().map(|d| d + offset).collect();
        previous = current;
    }
}
