use lidar_data::{ScanFrame, HISTORY_CAPACITY};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;

/// Frames handed to the renderer and the exporter, oldest first.
pub type Snapshot = Vec<Arc<ScanFrame>>;

/// Bounded FIFO of the most recent frames.
///
/// Cloning the buffer clones the handle; every clone sees the same frames.
/// Frames are never modified after they are pushed, so a snapshot only
/// copies reference-counted pointers.
#[derive(Clone, Debug)]
pub struct HistoryBuffer {
    frames: Arc<Mutex<VecDeque<Arc<ScanFrame>>>>,
    capacity: usize,
}

impl HistoryBuffer {
    pub fn new() -> HistoryBuffer {
        HistoryBuffer::with_capacity(HISTORY_CAPACITY)
    }

    /// A capacity of zero is raised to one.
    pub fn with_capacity(capacity: usize) -> HistoryBuffer {
        let capacity = capacity.max(1);
        HistoryBuffer {
            frames: Arc::new(Mutex::new(VecDeque::with_capacity(capacity + 1))),
            capacity,
        }
    }

    /// Appends `frame`, evicting the oldest frame when full.
    pub fn push(&self, frame: impl Into<Arc<ScanFrame>>) {
        let mut frames = self.frames.lock();
        frames.push_back(frame.into());
        while frames.len() > self.capacity {
            frames.pop_front();
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        self.frames.lock().iter().cloned().collect()
    }

    pub fn clear(&self) {
        self.frames.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.frames.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.lock().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for HistoryBuffer {
    fn default() -> Self {
        HistoryBuffer::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lidar_data::SLOT_COUNT;
    use std::thread;

    fn frame(marker: u16) -> ScanFrame {
        let mut distances = [0u16; SLOT_COUNT];
        distances[0] = marker;
        ScanFrame::new(distances)
    }

    fn markers(snapshot: &Snapshot) -> Vec<u16> {
        snapshot.iter().map(|f| f.distances()[0]).collect()
    }

    #[test]
    fn test_keeps_last_three_frames_in_order() {
        let history = HistoryBuffer::new();
        for marker in 1..=7 {
            history.push(frame(marker));
            assert!(history.len() <= 3);
        }
        assert_eq!(markers(&history.snapshot()), vec![5, 6, 7]);
    }

    #[test]
    fn test_partial_history() {
        let history = HistoryBuffer::new();
        assert!(history.is_empty());
        history.push(frame(1));
        history.push(frame(2));
        assert_eq!(markers(&history.snapshot()), vec![1, 2]);
        assert_eq!(history.capacity(), HISTORY_CAPACITY);
    }

    #[test]
    fn test_clear() {
        let history = HistoryBuffer::new();
        history.push(frame(1));
        history.clear();
        assert!(history.is_empty());
        assert!(history.snapshot().is_empty());
    }

    #[test]
    fn test_snapshot_is_unaffected_by_later_pushes() {
        let history = HistoryBuffer::new();
        history.push(frame(1));
        let snapshot = history.snapshot();
        history.push(frame(2));
        history.clear();
        assert_eq!(markers(&snapshot), vec![1]);
    }

    #[test]
    fn test_clones_share_frames() {
        let history = HistoryBuffer::new();
        let writer = history.clone();
        let handle = thread::spawn(move || {
            for marker in 1..=100 {
                writer.push(frame(marker));
            }
        });
        for _ in 0..100 {
            let snapshot = history.snapshot();
            assert!(snapshot.len() <= 3);
            let m = markers(&snapshot);
            assert!(m.windows(2).all(|w| w[1] == w[0] + 1));
        }
        handle.join().unwrap();
        assert_eq!(markers(&history.snapshot()), vec![98, 99, 100]);
    }

    #[test]
    fn test_zero_capacity_is_raised() {
        let history = HistoryBuffer::with_capacity(0);
        history.push(frame(1));
        history.push(frame(2));
        assert_eq!(markers(&history.snapshot()), vec![2]);
    }
}
