//! Bookkeeping for the connectors drawn between consecutive segments.
//!
//! Geographic and elevation links follow the same rules, so every operation
//! here is written once against [`Link`].

use serde::Serialize;

use crate::track::{ChartPoint, CoordinateLink, ElevationLink, LonLat, Segment};

pub trait Link: Clone {
    type Endpoint: Copy;

    fn new(from: u32, to: u32, from_end: Self::Endpoint, to_end: Self::Endpoint) -> Self;
    fn from(&self) -> u32;
    fn to(&self) -> u32;
    fn from_end(&self) -> Self::Endpoint;
    fn to_end(&self) -> Self::Endpoint;
    fn set_indices(&mut self, from: u32, to: u32);
    fn set_from_end(&mut self, end: Self::Endpoint);
    fn set_to_end(&mut self, end: Self::Endpoint);

    /// Endpoint at the last point of `segment`.
    fn segment_end(segment: &Segment) -> Option<Self::Endpoint>;
    /// Endpoint at the first point of `segment`.
    fn segment_start(segment: &Segment) -> Option<Self::Endpoint>;

    /// Link joining the end of `prev` to the start of `next`.
    fn between(prev: &Segment, next: &Segment) -> Option<Self> {
        Some(Self::new(
            prev.index,
            next.index,
            Self::segment_end(prev)?,
            Self::segment_start(next)?,
        ))
    }
}

impl Link for CoordinateLink {
    type Endpoint = LonLat;

    fn new(from: u32, to: u32, from_coor: LonLat, to_coor: LonLat) -> Self {
        Self {
            from,
            to,
            from_coor,
            to_coor,
        }
    }

    fn from(&self) -> u32 {
        self.from
    }

    fn to(&self) -> u32 {
        self.to
    }

    fn from_end(&self) -> LonLat {
        self.from_coor
    }

    fn to_end(&self) -> LonLat {
        self.to_coor
    }

    fn set_indices(&mut self, from: u32, to: u32) {
        self.from = from;
        self.to = to;
    }

    fn set_from_end(&mut self, end: LonLat) {
        self.from_coor = end;
    }

    fn set_to_end(&mut self, end: LonLat) {
        self.to_coor = end;
    }

    fn segment_end(segment: &Segment) -> Option<LonLat> {
        segment.last_coor()
    }

    fn segment_start(segment: &Segment) -> Option<LonLat> {
        segment.first_coor()
    }
}

impl Link for ElevationLink {
    type Endpoint = ChartPoint;

    fn new(from: u32, to: u32, from_ele: ChartPoint, to_ele: ChartPoint) -> Self {
        Self {
            from,
            to,
            from_ele,
            to_ele,
        }
    }

    fn from(&self) -> u32 {
        self.from
    }

    fn to(&self) -> u32 {
        self.to
    }

    fn from_end(&self) -> ChartPoint {
        self.from_ele
    }

    fn to_end(&self) -> ChartPoint {
        self.to_ele
    }

    fn set_indices(&mut self, from: u32, to: u32) {
        self.from = from;
        self.to = to;
    }

    fn set_from_end(&mut self, end: ChartPoint) {
        self.from_ele = end;
    }

    fn set_to_end(&mut self, end: ChartPoint) {
        self.to_ele = end;
    }

    fn segment_end(segment: &Segment) -> Option<ChartPoint> {
        segment.last_ele()
    }

    fn segment_start(segment: &Segment) -> Option<ChartPoint> {
        segment.first_ele()
    }
}

/// What changed in a link set, so the caller can redraw only that.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Relinked<L> {
    pub removed: Vec<L>,
    pub added: Option<L>,
}

impl<L> Default for Relinked<L> {
    fn default() -> Self {
        Self {
            removed: Vec::new(),
            added: None,
        }
    }
}

/// Splice out the links touching a removed segment.
///
/// A middle segment leaves a hole that is closed with one new link from its
/// former predecessor's endpoint to its former successor's endpoint. A first
/// or last segment only loses its single link.
pub fn relink_after_removal<L: Link>(links: &mut Vec<L>, removed_index: u32) -> Relinked<L> {
    let before = links.iter().position(|l| l.to() == removed_index);
    let after = links.iter().position(|l| l.from() == removed_index);

    let mut change = Relinked::default();
    match (before, after) {
        (Some(b), Some(a)) => {
            let (first, second) = if b > a { (b, a) } else { (a, b) };
            let x = links.remove(first);
            let y = links.remove(second);
            let (before_link, after_link) = if b > a { (x, y) } else { (y, x) };
            let bridge = L::new(
                before_link.from(),
                after_link.to(),
                before_link.from_end(),
                after_link.to_end(),
            );
            links.push(bridge.clone());
            change.removed = vec![before_link, after_link];
            change.added = Some(bridge);
        }
        (Some(b), None) => change.removed.push(links.remove(b)),
        (None, Some(a)) => change.removed.push(links.remove(a)),
        (None, None) => {}
    }
    change
}

/// One link per adjacent pair of `segments`, in order.
pub fn rebuild_links<L: Link>(segments: &[Segment]) -> Vec<L> {
    segments
        .windows(2)
        .filter_map(|pair| L::between(&pair[0], &pair[1]))
        .collect()
}

/// Renumber links after the segment `split_index` has been divided in two.
///
/// Every link leaving a segment at or after the split point now leaves the
/// segment one slot further, and so does its target.
pub fn shift_for_split<L: Link>(links: &mut [L], split_index: u32) {
    for link in links.iter_mut().filter(|l| l.from() >= split_index) {
        let (from, to) = (link.from() + 1, link.to() + 1);
        link.set_indices(from, to);
    }
}

/// Attach every link touching `segment` to its current physical boundary.
pub fn reattach<L: Link>(links: &mut [L], segment: &Segment) {
    for link in links.iter_mut() {
        if link.from() == segment.index {
            if let Some(end) = L::segment_end(segment) {
                link.set_from_end(end);
            }
        }
        if link.to() == segment.index {
            if let Some(start) = L::segment_start(segment) {
                link.set_to_end(start);
            }
        }
    }
}

/// Keep links ordered by their source segment.
pub fn sort_links<L: Link>(links: &mut [L]) {
    links.sort_by_key(|l| l.from());
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seg(index: u32, lon0: f64) -> Segment {
        Segment::new(
            index,
            format!("s{index}"),
            vec![0.0, 0.0],
            vec![lon0, lon0 + 0.1],
            vec![index as f64, index as f64 + 1.0],
        )
    }

    fn chain(indices: &[u32]) -> (Vec<Segment>, Vec<CoordinateLink>) {
        let segments: Vec<Segment> = indices.iter().map(|&i| seg(i, i as f64)).collect();
        let links = rebuild_links(&segments);
        (segments, links)
    }

    #[test]
    fn test_rebuild_links_pairs() {
        let (_, links) = chain(&[1, 2, 3]);
        let pairs: Vec<(u32, u32)> = links.iter().map(|l| (l.from, l.to)).collect();
        assert_eq!(pairs, vec![(1, 2), (2, 3)]);
    }

    #[test]
    fn test_rebuild_links_single_segment() {
        let (_, links) = chain(&[4]);
        assert!(links.is_empty());
    }

    #[test]
    fn test_remove_middle_bridges_neighbours() {
        let (segments, mut links) = chain(&[1, 2, 3]);
        let change = relink_after_removal(&mut links, 2);

        assert_eq!(links.len(), 1);
        assert_eq!((links[0].from, links[0].to), (1, 3));
        assert_eq!(Some(links[0].from_coor), segments[0].last_coor());
        assert_eq!(Some(links[0].to_coor), segments[2].first_coor());
        assert_eq!(change.removed.len(), 2);
        assert_eq!(change.added, Some(links[0].clone()));
    }

    #[test]
    fn test_remove_middle_with_unsorted_links() {
        let (_, mut links) = chain(&[1, 2, 3]);
        links.reverse();
        relink_after_removal(&mut links, 2);
        assert_eq!(links.len(), 1);
        assert_eq!((links[0].from, links[0].to), (1, 3));
    }

    #[test]
    fn test_remove_first_and_last() {
        let (_, mut links) = chain(&[1, 2, 3]);
        let change = relink_after_removal(&mut links, 1);
        assert_eq!(links.len(), 1);
        assert_eq!((links[0].from, links[0].to), (2, 3));
        assert!(change.added.is_none());

        let change = relink_after_removal(&mut links, 3);
        assert!(links.is_empty());
        assert_eq!(change.removed.len(), 1);
    }

    #[test]
    fn test_remove_unlinked_segment() {
        let (_, mut links) = chain(&[1]);
        let change = relink_after_removal(&mut links, 1);
        assert!(change.removed.is_empty());
        assert!(change.added.is_none());
    }

    #[test]
    fn test_shift_for_split() {
        let (_, mut links) = chain(&[1, 2, 3]);
        shift_for_split(&mut links, 2);
        let pairs: Vec<(u32, u32)> = links.iter().map(|l| (l.from, l.to)).collect();
        assert_eq!(pairs, vec![(1, 2), (3, 4)]);
    }

    #[test]
    fn test_reattach_follows_boundaries() {
        let (mut segments, mut links) = chain(&[1, 2, 3]);
        segments[1].lon.reverse();
        reattach(&mut links, &segments[1]);

        assert_eq!(Some(links[0].to_coor), segments[1].first_coor());
        assert_eq!(Some(links[1].from_coor), segments[1].last_coor());
        assert_eq!(Some(links[0].from_coor), segments[0].last_coor());
    }

    #[test]
    fn test_elevation_links_use_distance_and_ele() {
        let segments = vec![seg(1, 0.0), seg(2, 1.0)];
        let links: Vec<ElevationLink> = rebuild_links(&segments);
        assert_eq!(links[0].from_ele.y, 2.0);
        assert_eq!(links[0].from_ele.x, *segments[0].distance.last().unwrap());
        assert_eq!(links[0].to_ele.y, 2.0);
    }
}
