use crate::history::HistoryBuffer;
use crate::render::{DrawingSurface, RenderPipeline, RenderState};
use crossbeam_channel::{at, never, select, unbounded, Receiver, Sender};
use crossbeam_utils::atomic::AtomicCell;
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Instant;

/// Changes to the rendering parameters, applied before the next tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RenderCommand {
    SetZoom(u8),
    SetCadence(u32),
    SetGrid(bool),
    ToggleGrid,
    Shutdown,
}

struct Published {
    state: AtomicCell<RenderState>,
    ticks: AtomicCell<u64>,
}

/// Cloneable access to a running render loop.
#[derive(Clone)]
pub struct RenderHandle {
    commands_tx: Sender<RenderCommand>,
    published: Arc<Published>,
}

impl RenderHandle {
    /// Returns false if the loop has already shut down.
    pub fn send(&self, command: RenderCommand) -> bool {
        self.commands_tx.send(command).is_ok()
    }

    /// Parameters used by the most recent tick.
    pub fn state(&self) -> RenderState {
        self.published.state.load()
    }

    /// Number of pictures drawn so far.
    pub fn ticks(&self) -> u64 {
        self.published.ticks.load()
    }
}

/// Redraws the history at a fixed cadence on a dedicated thread.
///
/// The loop owns the surface and the render state. It never waits for the
/// sensor: each tick draws whatever the history holds at that moment.
pub struct RenderLoop<D: DrawingSurface + Send + 'static> {
    handle: RenderHandle,
    thread: Option<JoinHandle<D>>,
}

impl<D: DrawingSurface + Send + 'static> RenderLoop<D> {
    /// # Arguments
    ///
    /// * `frames_rx` - "new frame" notifications from the scan worker, only
    ///   used for logging.
    pub fn spawn(
        pipeline: RenderPipeline,
        state: RenderState,
        surface: D,
        history: HistoryBuffer,
        frames_rx: Option<Receiver<u64>>,
    ) -> std::io::Result<RenderLoop<D>> {
        let (commands_tx, commands_rx) = unbounded();
        let published = Arc::new(Published {
            state: AtomicCell::new(state),
            ticks: AtomicCell::new(0),
        });
        let shared = published.clone();
        let thread = std::thread::Builder::new()
            .name("render-loop".to_string())
            .spawn(move || {
                run(
                    pipeline,
                    state,
                    surface,
                    history,
                    commands_rx,
                    frames_rx.unwrap_or_else(never),
                    shared,
                )
            })?;
        Ok(RenderLoop {
            handle: RenderHandle {
                commands_tx,
                published,
            },
            thread: Some(thread),
        })
    }

    pub fn handle(&self) -> RenderHandle {
        self.handle.clone()
    }

    /// Stops the loop and gives the surface back.
    ///
    /// Returns `None` if the render thread panicked.
    pub fn shutdown(mut self) -> Option<D> {
        self.join()
    }

    fn join(&mut self) -> Option<D> {
        let thread = self.thread.take()?;
        self.handle.send(RenderCommand::Shutdown);
        match thread.join() {
            Ok(surface) => Some(surface),
            Err(_) => {
                log::error!("Render thread panicked");
                None
            }
        }
    }
}

impl<D: DrawingSurface + Send + 'static> Drop for RenderLoop<D> {
    fn drop(&mut self) {
        self.join();
    }
}

fn run<D: DrawingSurface>(
    pipeline: RenderPipeline,
    mut state: RenderState,
    mut surface: D,
    history: HistoryBuffer,
    commands_rx: Receiver<RenderCommand>,
    mut frames_rx: Receiver<u64>,
    published: Arc<Published>,
) -> D {
    log::info!(
        "Render loop started at {} fps, zoom {}",
        state.cadence(),
        state.zoom()
    );
    let mut last_tick = Instant::now();
    let mut next_tick = last_tick;
    loop {
        select! {
            recv(commands_rx) -> command => {
                let command = match command {
                    Ok(RenderCommand::Shutdown) | Err(_) => break,
                    Ok(command) => command,
                };
                let cadence = state.cadence();
                apply(&mut state, command);
                if state.cadence() != cadence {
                    next_tick = last_tick + state.period();
                }
                published.state.store(state);
            },
            recv(frames_rx) -> sequence => match sequence {
                Ok(sequence) => log::trace!("Frame #{} available", sequence),
                Err(_) => {
                    log::debug!("Scan worker notifications closed");
                    frames_rx = never();
                }
            },
            recv(at(next_tick)) -> _ => {
                pipeline.draw(&state, &mut surface, &history.snapshot());
                published.ticks.fetch_add(1);
                last_tick = Instant::now();
                next_tick += state.period();
                if next_tick < last_tick {
                    // Drawing took longer than a period. Skip the missed ticks.
                    next_tick = last_tick + state.period();
                }
            },
        }
    }
    log::info!("Render loop stopped after {} ticks", published.ticks.load());
    surface
}

fn apply(state: &mut RenderState, command: RenderCommand) {
    let result = match command {
        RenderCommand::SetZoom(zoom) => state.set_zoom(zoom),
        RenderCommand::SetCadence(cadence) => state.set_cadence(cadence),
        RenderCommand::SetGrid(visible) => {
            state.set_grid_visible(visible);
            Ok(())
        }
        RenderCommand::ToggleGrid => {
            state.toggle_grid();
            Ok(())
        }
        RenderCommand::Shutdown => Ok(()),
    };
    match result {
        Ok(()) => log::debug!("Applied {:?}", command),
        Err(e) => log::warn!("Ignored {:?}: {}", command, e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::projector::CoordinateProjector;
    use crate::testing::{wait_until, RecordingSurface};
    use lidar_data::{ScanFrame, SLOT_COUNT};

    fn spawn(history: &HistoryBuffer, state: RenderState) -> RenderLoop<RecordingSurface> {
        let pipeline = RenderPipeline::new(CoordinateProjector::new(800, 800).unwrap());
        RenderLoop::spawn(
            pipeline,
            state,
            RecordingSurface::default(),
            history.clone(),
            None,
        )
        .unwrap()
    }

    fn frame_at(degree: usize, distance: u16) -> ScanFrame {
        let mut distances = [0u16; SLOT_COUNT];
        distances[degree] = distance;
        ScanFrame::new(distances)
    }

    fn no_grid() -> RenderState {
        RenderState::new(1, 60, false).unwrap()
    }

    #[test]
    fn test_draws_without_sensor_data() {
        let history = HistoryBuffer::new();
        let render = spawn(&history, RenderState::default());
        let handle = render.handle();
        assert!(wait_until(|| handle.ticks() >= 2));
        let surface = render.shutdown().unwrap();
        assert!(surface.presented >= 2);
        assert!(surface.points().is_empty());
    }

    #[test]
    fn test_zoom_takes_effect_on_next_tick() {
        let history = HistoryBuffer::new();
        history.push(frame_at(0, 1000));
        let render = spawn(&history, no_grid());
        let handle = render.handle();

        assert!(handle.send(RenderCommand::SetZoom(2)));
        assert!(wait_until(|| handle.state().zoom() == 2));
        let ticks = handle.ticks();
        assert!(wait_until(|| handle.ticks() > ticks));

        let surface = render.shutdown().unwrap();
        assert_eq!(surface.points(), vec![(600, 400)]);
    }

    #[test]
    fn test_history_changes_are_picked_up() {
        let history = HistoryBuffer::new();
        let render = spawn(&history, no_grid());
        let handle = render.handle();
        history.push(frame_at(180, 2000));
        let ticks = handle.ticks();
        assert!(wait_until(|| handle.ticks() > ticks + 1));
        let surface = render.shutdown().unwrap();
        assert_eq!(surface.points(), vec![(200, 400)]);
    }

    #[test]
    fn test_grid_commands() {
        let history = HistoryBuffer::new();
        let render = spawn(&history, no_grid());
        let handle = render.handle();

        handle.send(RenderCommand::ToggleGrid);
        assert!(wait_until(|| handle.state().grid_visible()));
        handle.send(RenderCommand::SetGrid(false));
        assert!(wait_until(|| !handle.state().grid_visible()));
        handle.send(RenderCommand::SetCadence(5));
        assert!(wait_until(|| handle.state().cadence() == 5));
        drop(render);
    }

    #[test]
    fn test_invalid_values_keep_previous_state() {
        let history = HistoryBuffer::new();
        let render = spawn(&history, no_grid());
        let handle = render.handle();
        handle.send(RenderCommand::SetZoom(9));
        handle.send(RenderCommand::SetCadence(0));
        handle.send(RenderCommand::SetZoom(3));
        assert!(wait_until(|| handle.state().zoom() == 3));
        assert_eq!(handle.state().cadence(), 60);
        drop(render);
    }

    #[test]
    fn test_send_after_shutdown() {
        let history = HistoryBuffer::new();
        let render = spawn(&history, no_grid());
        let handle = render.handle();
        render.shutdown();
        assert!(!handle.send(RenderCommand::ToggleGrid));
    }
}
