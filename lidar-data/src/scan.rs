#[cfg(feature = "serde")]
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

/// Number of one-degree slots in a frame.
pub const SLOT_COUNT: usize = 360;
/// Largest distance kept in a frame (in mm). Longer readings are clamped.
pub const MAX_RANGE: u16 = 4000;
/// Number of frames kept for overlay rendering.
pub const HISTORY_CAPACITY: usize = 3;

/// A single reading as delivered by the sensor.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RawPoint {
    /// Scan angle in degree.
    pub angle: f64,
    /// Distance to an object in mm.
    pub distance: f64,
    /// Return strength reported by the sensor.
    pub quality: u8,
}

impl RawPoint {
    pub fn new(angle: f64, distance: f64, quality: u8) -> RawPoint {
        RawPoint {
            angle,
            distance,
            quality,
        }
    }
}

/// One rotation of the sensor bucketed into one-degree slots.
///
/// Slot `i` holds the distance (in mm, rounded down) observed between `i` and
/// `i + 1` degrees. Zero means no reading landed in the slot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScanFrame {
    distances: [u16; SLOT_COUNT],
}

impl ScanFrame {
    /// Builds a frame, clamping every slot to [`MAX_RANGE`].
    pub fn new(mut distances: [u16; SLOT_COUNT]) -> ScanFrame {
        for d in distances.iter_mut() {
            *d = (*d).min(MAX_RANGE);
        }
        ScanFrame { distances }
    }

    pub fn empty() -> ScanFrame {
        ScanFrame {
            distances: [0; SLOT_COUNT],
        }
    }

    pub fn distances(&self) -> &[u16; SLOT_COUNT] {
        &self.distances
    }

    pub fn get(&self, degree: usize) -> Option<u16> {
        self.distances.get(degree).copied()
    }

    /// Iterates over `(degree, distance)` for the slots holding a reading.
    pub fn readings(&self) -> impl Iterator<Item = (usize, u16)> + '_ {
        self.distances
            .iter()
            .enumerate()
            .filter(|(_, d)| **d > 0)
            .map(|(degree, d)| (degree, *d))
    }

    pub fn n_readings(&self) -> usize {
        self.readings().count()
    }
}

impl Default for ScanFrame {
    fn default() -> Self {
        ScanFrame::empty()
    }
}

// A frame is written as a bare array of 360 integers.
#[cfg(feature = "serde")]
impl Serialize for ScanFrame {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.distances.iter())
    }
}

#[cfg(feature = "serde")]
impl<'de> Deserialize<'de> for ScanFrame {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let values = Vec::<u16>::deserialize(deserializer)?;
        let distances: [u16; SLOT_COUNT] = values.try_into().map_err(|v: Vec<u16>| {
            de::Error::invalid_length(v.len(), &"an array of 360 distances")
        })?;
        Ok(ScanFrame::new(distances))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_clamps_to_max_range() {
        let mut distances = [0u16; SLOT_COUNT];
        distances[0] = 5000;
        distances[1] = MAX_RANGE;
        distances[2] = 1234;
        let frame = ScanFrame::new(distances);
        assert_eq!(frame.get(0), Some(MAX_RANGE));
        assert_eq!(frame.get(1), Some(MAX_RANGE));
        assert_eq!(frame.get(2), Some(1234));
        assert_eq!(frame.get(SLOT_COUNT), None);
    }

    #[test]
    fn test_readings_skip_empty_slots() {
        let mut distances = [0u16; SLOT_COUNT];
        distances[90] = 2000;
        distances[270] = 4000;
        let frame = ScanFrame::new(distances);
        assert_eq!(frame.readings().collect::<Vec<_>>(), vec![(90, 2000), (270, 4000)]);
        assert_eq!(frame.n_readings(), 2);
        assert_eq!(ScanFrame::empty().n_readings(), 0);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_frame_is_a_bare_array() {
        let mut distances = [0u16; SLOT_COUNT];
        distances[1] = 7;
        let json = serde_json::to_string(&ScanFrame::new(distances)).unwrap();
        assert!(json.starts_with("[0,7,0,"));
        assert_eq!(json.matches(',').count(), SLOT_COUNT - 1);

        let frame: ScanFrame = serde_json::from_str(&json).unwrap();
        assert_eq!(frame.get(1), Some(7));

        let short = serde_json::from_str::<ScanFrame>("[1,2,3]");
        assert!(short.is_err());
    }
}
