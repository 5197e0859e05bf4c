use crate::assembler::assemble_frame;
use crate::error::SensorError;
use crate::history::HistoryBuffer;
use crate::source::{ScanSource, SensorHandle};
use crossbeam_channel::{bounded, Receiver, Sender, TryRecvError, TrySendError};
use crossbeam_utils::atomic::AtomicCell;
use lidar_data::WorkerStatus;
use parking_lot::Mutex;
use std::sync::Arc;
use std::thread::JoinHandle;

const EVENT_QUEUE_SIZE: usize = 64;

/// Notifications published by the worker for the control surface.
#[derive(Clone, Debug, PartialEq)]
pub enum WorkerEvent {
    StatusChanged(WorkerStatus),
    /// A frame was pushed to the history. Carries its sequence number.
    FrameReady(u64),
    /// The sensor failed and the session ended.
    Failed(String),
}

struct WorkerShared {
    status: AtomicCell<WorkerStatus>,
    sequence: AtomicCell<u64>,
    events_tx: Sender<WorkerEvent>,
    events_rx: Receiver<WorkerEvent>,
    frame_tx: Option<Sender<u64>>,
    last_failure: Mutex<Option<String>>,
}

impl WorkerShared {
    fn transition(&self, from: WorkerStatus, to: WorkerStatus) -> bool {
        debug_assert!(from.can_transition_to(to));
        if self.status.compare_exchange(from, to).is_err() {
            return false;
        }
        log::info!("Scan worker: {} -> {}", from, to);
        self.emit(WorkerEvent::StatusChanged(to));
        true
    }

    /// Queues `event` without blocking.
    ///
    /// On a full queue a frame notification is dropped, while status changes
    /// and failures evict the oldest queued event so that they always arrive.
    fn emit(&self, mut event: WorkerEvent) {
        loop {
            match self.events_tx.try_send(event) {
                Ok(()) | Err(TrySendError::Disconnected(_)) => return,
                Err(TrySendError::Full(WorkerEvent::FrameReady(sequence))) => {
                    log::trace!("Event queue full, dropping frame #{}", sequence);
                    return;
                }
                Err(TrySendError::Full(rejected)) => {
                    if let Ok(evicted) = self.events_rx.try_recv() {
                        log::trace!("Event queue full, evicting {:?}", evicted);
                    }
                    event = rejected;
                }
            }
        }
    }

    fn fail(&self, error: &SensorError) {
        let message = error.to_string();
        *self.last_failure.lock() = Some(message.clone());
        self.emit(WorkerEvent::Failed(message));
    }

    fn publish_frame(&self) -> u64 {
        let sequence = self.sequence.fetch_add(1) + 1;
        if let Some(frame_tx) = &self.frame_tx {
            // The renderer only needs to know that something changed
            let _ = frame_tx.try_send(sequence);
        }
        self.emit(WorkerEvent::FrameReady(sequence));
        sequence
    }
}

/// Owns an open sensor for one scanning session.
///
/// Dropping the guard releases the sensor (stop scan, stop motor, disconnect)
/// and brings the worker back to `Idle`, whichever way the session ended.
struct SensorGuard<H: SensorHandle> {
    handle: H,
    shared: Arc<WorkerShared>,
}

impl<H: SensorHandle> Drop for SensorGuard<H> {
    fn drop(&mut self) {
        self.shared
            .transition(WorkerStatus::Scanning, WorkerStatus::Stopping);
        if let Err(e) = self.handle.stop() {
            log::warn!("Failed to stop scanning: {}", e);
        }
        if let Err(e) = self.handle.stop_motor() {
            log::warn!("Failed to stop the motor: {}", e);
        }
        if let Err(e) = self.handle.disconnect() {
            log::warn!("Failed to disconnect: {}", e);
        }
        self.shared
            .transition(WorkerStatus::Stopping, WorkerStatus::Idle);
    }
}

struct Session {
    terminator_tx: Sender<bool>,
    thread: Option<JoinHandle<()>>,
}

/// Runs the ingestion loop of one sensor on its own thread.
pub struct ScanWorker<S: ScanSource> {
    source: S,
    port: String,
    history: HistoryBuffer,
    shared: Arc<WorkerShared>,
    events_rx: Receiver<WorkerEvent>,
    session: Option<Session>,
}

impl<S: ScanSource> ScanWorker<S> {
    /// # Arguments
    ///
    /// * `source` - Sensor to open on `start`.
    /// * `port` - Serial port name such as `/dev/ttyUSB0`.
    /// * `history` - Buffer receiving the assembled frames.
    /// * `frame_tx` - Optional "new frame" notification for the renderer.
    pub fn new(
        source: S,
        port: &str,
        history: HistoryBuffer,
        frame_tx: Option<Sender<u64>>,
    ) -> ScanWorker<S> {
        let (events_tx, events_rx) = bounded(EVENT_QUEUE_SIZE);
        ScanWorker {
            source,
            port: port.to_string(),
            history,
            shared: Arc::new(WorkerShared {
                status: AtomicCell::new(WorkerStatus::Idle),
                sequence: AtomicCell::new(0),
                events_tx,
                events_rx: events_rx.clone(),
                frame_tx,
                last_failure: Mutex::new(None),
            }),
            events_rx,
            session: None,
        }
    }

    pub fn status(&self) -> WorkerStatus {
        self.shared.status.load()
    }

    pub fn port(&self) -> &str {
        &self.port
    }

    /// Number of frames published since the worker was created.
    pub fn frames_published(&self) -> u64 {
        self.shared.sequence.load()
    }

    /// Reason the last session ended on a sensor error, if it did.
    ///
    /// Cleared when a new session starts.
    pub fn last_failure(&self) -> Option<String> {
        self.shared.last_failure.lock().clone()
    }

    /// Stream of status changes, frames and failures.
    ///
    /// The queue is bounded. A consumer that falls behind misses frame
    /// notifications first; status changes and failures replace the oldest
    /// queued events.
    pub fn events(&self) -> Receiver<WorkerEvent> {
        self.events_rx.clone()
    }

    /// Opens the sensor and starts the ingestion loop.
    ///
    /// Does nothing if the worker is already scanning. An open failure leaves
    /// the worker `Idle`.
    pub fn start(&mut self) -> Result<(), SensorError> {
        if self.status() == WorkerStatus::Scanning {
            log::debug!("Scan worker already running");
            return Ok(());
        }
        // A previous session may still be releasing the sensor
        self.join_session();

        let handle = self.source.open(&self.port)?;
        *self.shared.last_failure.lock() = None;
        let (terminator_tx, terminator_rx) = bounded(1);

        self.shared
            .transition(WorkerStatus::Idle, WorkerStatus::Scanning);
        let guard = SensorGuard {
            handle,
            shared: self.shared.clone(),
        };
        let history = self.history.clone();
        let thread = std::thread::Builder::new()
            .name("scan-worker".to_string())
            .spawn(move || ingest(guard, history, terminator_rx))?;

        self.session = Some(Session {
            terminator_tx,
            thread: Some(thread),
        });
        Ok(())
    }

    /// Ends the scanning session and waits until the sensor is released.
    ///
    /// Calling it while `Idle` does nothing. While `Stopping`, it waits for
    /// the release in progress to finish and starts no second one.
    pub fn stop(&mut self) {
        let Some(session) = self.session.as_ref() else {
            return;
        };
        if self
            .shared
            .transition(WorkerStatus::Scanning, WorkerStatus::Stopping)
        {
            log::info!("Stop requested on \"{}\"", self.port);
        }
        let _ = session.terminator_tx.try_send(true);
        self.join_session();
    }

    fn join_session(&mut self) {
        let Some(mut session) = self.session.take() else {
            return;
        };
        if let Some(thread) = session.thread.take() {
            if thread.join().is_err() {
                log::error!("Scan worker thread panicked");
            }
        }
    }
}

impl<S: ScanSource> Drop for ScanWorker<S> {
    fn drop(&mut self) {
        self.stop();
    }
}

fn ingest<H: SensorHandle>(
    mut guard: SensorGuard<H>,
    history: HistoryBuffer,
    terminator_rx: Receiver<bool>,
) {
    loop {
        if do_terminate(&terminator_rx) {
            log::debug!("Ingestion loop terminated");
            break;
        }

        match guard.handle.next_rotation() {
            Ok(Some(points)) => {
                let frame = assemble_frame(&points);
                let n_readings = frame.n_readings();
                history.push(frame);
                let sequence = guard.shared.publish_frame();
                log::debug!(
                    "Frame #{}: {} points, {} slots filled",
                    sequence,
                    points.len(),
                    n_readings
                );
            }
            Ok(None) => continue,
            Err(e) => {
                log::error!("Sensor error: {}", e);
                guard.shared.fail(&e);
                break;
            }
        }
    }
}

pub(crate) fn do_terminate(terminator_rx: &Receiver<bool>) -> bool {
    match terminator_rx.try_recv() {
        Ok(terminate) => terminate,
        Err(TryRecvError::Empty) => false,
        Err(TryRecvError::Disconnected) => true,
    }
}
