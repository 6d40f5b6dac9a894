//! Structural edits on a [`Track`]. Each one leaves the track with sorted
//! segments, fresh distances and exactly one link per adjacent pair.

use std::collections::HashSet;

use log::debug;
use serde::Serialize;

use crate::distance::update_distance;
use crate::error::EditorError;
use crate::links::{Link, Relinked, reattach, relink_after_removal, shift_for_split, sort_links};
use crate::track::{CoordinateLink, ElevationLink, Segment, Track};

type Result<T> = std::result::Result<T, EditorError>;

const FIRST_HALF_SUFFIX: &str = "_1";
const SECOND_HALF_SUFFIX: &str = "_2";

/// Links dropped and created by a removal.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RemovalLinks {
    pub coor: Relinked<CoordinateLink>,
    pub ele: Relinked<ElevationLink>,
}

impl Track {
    pub fn rename_segment(&mut self, index: u32, new_name: &str) -> Result<()> {
        let name = new_name.trim();
        if name.is_empty() {
            return Err(EditorError::BlankName);
        }
        let segment = self
            .get_segment_mut(index)
            .ok_or(EditorError::UnknownSegment(index))?;
        segment.name = name.to_string();
        Ok(())
    }

    pub fn remove_segment(&mut self, index: u32) -> Result<(Segment, RemovalLinks)> {
        let position = self.position(index).ok_or(EditorError::UnknownSegment(index))?;
        let removed = self.segments.remove(position);

        let links = RemovalLinks {
            coor: relink_after_removal(&mut self.links_coor, index),
            ele: relink_after_removal(&mut self.links_ele, index),
        };

        self.sort_segments();
        update_distance(&mut self.segments);
        self.refresh_elevation_links();
        sort_links(&mut self.links_coor);
        sort_links(&mut self.links_ele);

        debug!(
            "removed segment {index}, {} segments left",
            self.segments.len()
        );
        Ok((removed, links))
    }

    /// Give the segment at position `i` the index `new_order[i]`, then rebuild
    /// the whole track in the new order.
    pub fn reorder_segments(&mut self, new_order: &[u32]) -> Result<()> {
        if self.segments.len() < 2 {
            return Err(EditorError::NotEnoughSegments);
        }
        if new_order.len() != self.segments.len() {
            return Err(EditorError::InvalidOrder(format!(
                "expected {} indices, got {}",
                self.segments.len(),
                new_order.len()
            )));
        }
        let current: HashSet<u32> = self.segments.iter().map(|s| s.index).collect();
        let requested: HashSet<u32> = new_order.iter().copied().collect();
        if requested.len() != new_order.len() || requested != current {
            return Err(EditorError::InvalidOrder(format!(
                "{new_order:?} is not a permutation of {:?}",
                self.indices()
            )));
        }

        for (segment, &index) in self.segments.iter_mut().zip(new_order) {
            segment.index = index;
        }
        self.sort_segments();
        update_distance(&mut self.segments);
        self.rebuild_links();

        debug!("segments reordered to {:?}", self.indices());
        Ok(())
    }

    /// Divide segment `index` before point `split_point`.
    ///
    /// The trailing half becomes segment `index + 1` and every later segment
    /// moves up one slot.
    pub fn split_segment(&mut self, index: u32, split_point: usize) -> Result<()> {
        let position = self.position(index).ok_or(EditorError::UnknownSegment(index))?;
        let size = self.segments[position].len();
        if split_point == 0 || split_point >= size {
            return Err(EditorError::InvalidSplitPoint {
                index,
                split_point,
                size,
            });
        }
        let last = self.segments.iter().map(|s| s.index).max().unwrap_or(index);
        if last.checked_add(1).is_none() {
            return Err(EditorError::IndexOverflow(index));
        }

        for segment in self.segments.iter_mut().filter(|s| s.index > index) {
            segment.index += 1;
        }

        let original = &mut self.segments[position];
        let mut segment_distance = original.segment_distance.split_off(split_point);
        if let Some(&origin) = segment_distance.first() {
            segment_distance.iter_mut().for_each(|d| *d -= origin);
        }
        let tail = Segment {
            index: index + 1,
            name: format!("{}{SECOND_HALF_SUFFIX}", original.name),
            lat: original.lat.split_off(split_point),
            lon: original.lon.split_off(split_point),
            ele: original.ele.split_off(split_point),
            distance: original.distance.split_off(split_point),
            segment_distance,
            size: size - split_point,
            reversed: original.reversed,
        };
        original.name.push_str(FIRST_HALF_SUFFIX);
        original.size = split_point;

        self.segments.insert(position + 1, tail);

        shift_for_split(&mut self.links_coor, index);
        shift_for_split(&mut self.links_ele, index);

        let (head, tail) = (&self.segments[position], &self.segments[position + 1]);
        if let Some(link) = CoordinateLink::between(head, tail) {
            self.links_coor.push(link);
        }
        if let Some(link) = ElevationLink::between(head, tail) {
            self.links_ele.push(link);
        }

        self.sort_segments();
        update_distance(&mut self.segments);
        self.refresh_elevation_links();
        sort_links(&mut self.links_coor);
        sort_links(&mut self.links_ele);

        debug!("split segment {index} at point {split_point}");
        Ok(())
    }

    /// Reverse the point order of segment `index`.
    pub fn reverse_segment(&mut self, index: u32) -> Result<()> {
        let position = self.position(index).ok_or(EditorError::UnknownSegment(index))?;

        let segment = &mut self.segments[position];
        segment.lat.reverse();
        segment.lon.reverse();
        segment.ele.reverse();
        let total = segment.segment_distance.last().copied().unwrap_or(0.0);
        segment.segment_distance = segment
            .segment_distance
            .iter()
            .rev()
            .map(|d| total - d)
            .collect();
        segment.reversed = !segment.reversed;

        update_distance(&mut self.segments);
        let segment = &self.segments[position];
        reattach(&mut self.links_coor, segment);
        self.refresh_elevation_links();

        debug!("reversed segment {index}, reversed={}", self.segments[position].reversed);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seg(index: u32, lat0: f64) -> Segment {
        Segment::new(
            index,
            format!("seg{index}"),
            vec![lat0, lat0 + 0.01, lat0 + 0.02, lat0 + 0.03],
            vec![1.0, 1.01, 1.02, 1.03],
            vec![100.0, 110.0, 105.0, 120.0],
        )
    }

    fn track(indices: &[u32]) -> Track {
        Track {
            segments: indices.iter().map(|&i| seg(i, i as f64)).collect(),
            ..Default::default()
        }
        .normalized()
        .unwrap()
    }

    fn pairs(track: &Track) -> Vec<(u32, u32)> {
        track.links_coor.iter().map(|l| (l.from, l.to)).collect()
    }

    #[test]
    fn test_rename() {
        let mut t = track(&[1]);
        t.rename_segment(1, "  Climb ").unwrap();
        assert_eq!(t.segments[0].name, "Climb");
        assert_eq!(t.rename_segment(1, "   "), Err(EditorError::BlankName));
        assert_eq!(t.rename_segment(7, "x"), Err(EditorError::UnknownSegment(7)));
    }

    #[test]
    fn test_remove_middle() {
        let mut t = track(&[1, 2, 3]);
        let a_last = t.segments[0].last_coor();
        let c_first = t.segments[2].first_coor();

        let (removed, links) = t.remove_segment(2).unwrap();
        assert_eq!(removed.index, 2);
        assert_eq!(pairs(&t), vec![(1, 3)]);
        assert_eq!(Some(t.links_coor[0].from_coor), a_last);
        assert_eq!(Some(t.links_coor[0].to_coor), c_first);
        assert!(links.coor.added.is_some());
        assert!(t.links_consistent());
        assert_eq!(
            t.links_ele[0].to_ele.x,
            t.segments[1].distance[0],
            "elevation link follows recomputed distance"
        );
    }

    #[test]
    fn test_remove_first_rebases_distance() {
        let mut t = track(&[1, 2]);
        t.remove_segment(1).unwrap();
        assert_eq!(t.segments[0].distance[0], 0.0);
        assert!(t.links_coor.is_empty());
        assert!(t.links_ele.is_empty());
    }

    #[test]
    fn test_remove_unknown() {
        let mut t = track(&[1]);
        assert_eq!(t.remove_segment(4).unwrap_err(), EditorError::UnknownSegment(4));
    }

    #[test]
    fn test_reorder_rebuilds_links() {
        let mut t = track(&[1, 2, 3]);
        let names_by_new_index = ["seg2", "seg3", "seg1"];
        t.reorder_segments(&[3, 1, 2]).unwrap();

        assert_eq!(t.indices(), vec![1, 2, 3]);
        let names: Vec<&str> = t.segments.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, names_by_new_index);
        assert_eq!(pairs(&t), vec![(1, 2), (2, 3)]);
        for (link, pair) in t.links_coor.iter().zip(t.segments.windows(2)) {
            assert_eq!(Some(link.from_coor), pair[0].last_coor());
            assert_eq!(Some(link.to_coor), pair[1].first_coor());
        }
        assert_eq!(t.segments[0].distance[0], 0.0);
    }

    #[test]
    fn test_reorder_rejects_bad_input() {
        let mut t = track(&[1, 2, 3]);
        assert!(matches!(t.reorder_segments(&[1, 2]), Err(EditorError::InvalidOrder(_))));
        assert!(matches!(t.reorder_segments(&[1, 1, 2]), Err(EditorError::InvalidOrder(_))));
        assert!(matches!(t.reorder_segments(&[1, 2, 9]), Err(EditorError::InvalidOrder(_))));

        let mut single = track(&[1]);
        assert_eq!(single.reorder_segments(&[1]), Err(EditorError::NotEnoughSegments));
    }

    #[test]
    fn test_split_preserves_points() {
        let mut t = track(&[1, 2]);
        let original = t.segments[0].clone();
        t.split_segment(1, 2).unwrap();

        assert_eq!(t.indices(), vec![1, 2, 3]);
        let (head, tail) = (&t.segments[0], &t.segments[1]);
        assert_eq!(head.name, "seg1_1");
        assert_eq!(tail.name, "seg1_2");
        assert_eq!([head.lat.clone(), tail.lat.clone()].concat(), original.lat);
        assert_eq!([head.lon.clone(), tail.lon.clone()].concat(), original.lon);
        assert_eq!([head.ele.clone(), tail.ele.clone()].concat(), original.ele);
        assert_eq!(head.size, 2);
        assert_eq!(tail.size, 2);
        assert_eq!(tail.segment_distance[0], 0.0);
        assert_eq!(t.segments[2].name, "seg2");
        assert_eq!(pairs(&t), vec![(1, 2), (2, 3)]);
        assert!(t.links_consistent());
    }

    #[test]
    fn test_split_rejects_degenerate_points() {
        let mut t = track(&[1]);
        assert!(matches!(
            t.split_segment(1, 0),
            Err(EditorError::InvalidSplitPoint { split_point: 0, .. })
        ));
        assert!(matches!(
            t.split_segment(1, 4),
            Err(EditorError::InvalidSplitPoint { size: 4, .. })
        ));
        assert_eq!(t.split_segment(3, 1), Err(EditorError::UnknownSegment(3)));
    }

    #[test]
    fn test_split_at_index_ceiling() {
        let mut t = track(&[1, u32::MAX]);
        let before = t.clone();
        assert_eq!(t.split_segment(1, 2), Err(EditorError::IndexOverflow(1)));
        assert_eq!(t.split_segment(u32::MAX, 2), Err(EditorError::IndexOverflow(u32::MAX)));
        assert_eq!(t, before);

        let mut t = track(&[1, u32::MAX - 1]);
        t.split_segment(u32::MAX - 1, 2).unwrap();
        assert_eq!(t.indices(), vec![1, u32::MAX - 1, u32::MAX]);
    }

    #[test]
    fn test_reverse_twice_restores() {
        let mut t = track(&[1, 2, 3]);
        let before = t.clone();

        t.reverse_segment(2).unwrap();
        assert!(t.segments[1].reversed);
        assert_eq!(t.segments[1].ele, vec![120.0, 105.0, 110.0, 100.0]);
        assert_eq!(Some(t.links_coor[0].to_coor), t.segments[1].first_coor());
        assert_eq!(Some(t.links_coor[1].from_coor), t.segments[1].last_coor());

        t.reverse_segment(2).unwrap();
        assert_eq!(t.segments[1].lat, before.segments[1].lat);
        assert_eq!(t.segments[1].ele, before.segments[1].ele);
        assert!(!t.segments[1].reversed);
        assert_eq!(t.links_coor, before.links_coor);
    }

    #[test]
    fn test_reverse_keeps_profile_monotonic() {
        let mut t = track(&[1]);
        t.reverse_segment(1).unwrap();
        let d = &t.segments[0].segment_distance;
        assert_eq!(d[0], 0.0);
        assert!(d.windows(2).all(|w| w[0] <= w[1]));
    }
}
