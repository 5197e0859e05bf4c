use clap::Parser;
use crossbeam_channel::bounded;
use lidar_viewer::{
    Args, Command, Controller, HistoryBuffer, RasterSurface, RenderLoop, RenderPipeline,
    RplidarSource, ScanWorker, ViewerConfig, WorkerEvent,
};
use std::io::{BufRead, Write};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = ViewerConfig::try_from(args)?;
    env_logger::Builder::new()
        .filter_level(config.log_level)
        .parse_default_env()
        .init();

    let history = HistoryBuffer::new();
    let (frame_tx, frame_rx) = bounded(1);

    let surface = RasterSurface::new(config.projector.width(), config.projector.height());
    let latest = surface.latest();
    let render = RenderLoop::spawn(
        RenderPipeline::new(config.projector),
        config.render,
        surface,
        history.clone(),
        Some(frame_rx),
    )?;

    let source = RplidarSource::new(config.baud_rate, config.timeout);
    let worker = ScanWorker::new(source, &config.port, history.clone(), Some(frame_tx));
    let mut controller = Controller::new(worker, history, render.handle(), Some(latest));

    let events = controller.events();
    std::thread::Builder::new()
        .name("worker-events".to_string())
        .spawn(move || {
            for event in events {
                match event {
                    WorkerEvent::StatusChanged(status) => log::info!("Sensor is {}", status),
                    WorkerEvent::Failed(message) => log::error!("Scan aborted: {}", message),
                    WorkerEvent::FrameReady(_) => {}
                }
            }
        })?;

    log::info!(
        "Viewer ready on \"{}\". Type \"help\" for the list of commands.",
        config.port
    );

    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout();
    write!(stdout, "> ")?;
    stdout.flush()?;
    for line in stdin.lock().lines() {
        let line = line?;
        if line.trim().is_empty() {
            write!(stdout, "> ")?;
            stdout.flush()?;
            continue;
        }
        match line.parse::<Command>() {
            Ok(Command::Quit) => break,
            Ok(command) => match controller.execute(&command) {
                Ok(reply) => writeln!(stdout, "{}", reply)?,
                Err(e) => writeln!(stdout, "Error: {}", e)?,
            },
            Err(e) => writeln!(stdout, "Error: {}", e)?,
        }
        write!(stdout, "> ")?;
        stdout.flush()?;
    }

    controller.stop();
    drop(controller);
    render.shutdown();
    Ok(())
}
