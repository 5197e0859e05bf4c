use lidar_data::{RawPoint, ScanFrame, MAX_RANGE, SLOT_COUNT};

/// Buckets the points of one rotation into a [`ScanFrame`].
///
/// Each point lands in the slot of its angle rounded down. When several
/// points share a slot the last one wins. Points whose angle or distance is
/// not a number are dropped; negative distances count as zero.
pub fn assemble_frame<'a, I>(points: I) -> ScanFrame
where
    I: IntoIterator<Item = &'a RawPoint>,
{
    let mut distances = [0u16; SLOT_COUNT];
    for point in points {
        let (Some(slot), Some(value)) = (to_slot(point.angle), to_distance(point.distance)) else {
            log::trace!("Dropping malformed point {:?}", point);
            continue;
        };
        distances[slot] = value;
    }
    ScanFrame::new(distances)
}

fn to_slot(angle: f64) -> Option<usize> {
    if !angle.is_finite() {
        return None;
    }
    Some(angle.floor().clamp(0., (SLOT_COUNT - 1) as f64) as usize)
}

fn to_distance(distance: f64) -> Option<u16> {
    if distance.is_nan() {
        return None;
    }
    Some(distance.clamp(0., MAX_RANGE as f64) as u16)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_has_360_slots_within_range() {
        let points: Vec<RawPoint> = (0..720)
            .map(|i| RawPoint::new(i as f64 * 0.5, i as f64 * 10., 15))
            .collect();
        let frame = assemble_frame(&points);
        assert_eq!(frame.distances().len(), 360);
        assert!(frame.distances().iter().all(|d| *d <= MAX_RANGE));
    }

    #[test]
    fn test_last_write_wins_within_a_slot() {
        let points = [RawPoint::new(10.2, 1111., 15), RawPoint::new(10.9, 2222., 15)];
        let frame = assemble_frame(&points);
        assert_eq!(frame.get(10), Some(2222));
        assert_eq!(frame.n_readings(), 1);

        let reversed = [points[1], points[0]];
        assert_eq!(assemble_frame(&reversed).get(10), Some(1111));
    }

    #[test]
    fn test_distance_is_clamped_to_max_range() {
        let frame = assemble_frame(&[RawPoint::new(42., 5000., 15)]);
        assert_eq!(frame.get(42), Some(4000));
    }

    #[test]
    fn test_distance_is_rounded_down() {
        let frame = assemble_frame(&[RawPoint::new(1., 1234.75, 15)]);
        assert_eq!(frame.get(1), Some(1234));
    }

    #[test]
    fn test_angles_are_clamped_to_slots() {
        let points = [
            RawPoint::new(359.99, 100., 15),
            RawPoint::new(360., 200., 15),
            RawPoint::new(-3., 300., 15),
        ];
        let frame = assemble_frame(&points);
        assert_eq!(frame.get(359), Some(200));
        assert_eq!(frame.get(0), Some(300));
    }

    #[test]
    fn test_malformed_points_are_dropped() {
        let points = [
            RawPoint::new(f64::NAN, 100., 15),
            RawPoint::new(20., f64::NAN, 15),
            RawPoint::new(f64::INFINITY, 100., 15),
            RawPoint::new(30., -50., 15),
            RawPoint::new(40., 400., 15),
        ];
        let frame = assemble_frame(&points);
        assert_eq!(frame.get(20), Some(0));
        assert_eq!(frame.get(30), Some(0));
        assert_eq!(frame.get(40), Some(400));
        assert_eq!(frame.n_readings(), 1);
    }

    #[test]
    fn test_empty_rotation_gives_empty_frame() {
        assert_eq!(assemble_frame(&Vec::<RawPoint>::new()), ScanFrame::empty());
    }
}
