mod blit;
mod cli;
mod keys;
mod logging;
mod scene;
mod window;

use blit::SoftbufferSurface;
use clap::Parser;
use cli::Cli;
use color_eyre::{Result, eyre::eyre};
use logging::{LoggingConfig, init_logging};
use rogueterm_core::{Backend, ConsoleConfig, GridGeometry, VirtualConsole};
use rogueterm_rasterizer::SwashRasterizer;
use scene::Scene;
use window::WinitEvents;

fn main() -> Result<()> {
    color_eyre::install()?;

    let _guard = init_logging(&LoggingConfig::from_env())
        .map_err(|e| eyre!("Failed to initialize logging: {}", e))?;

    let cli = Cli::parse();
    cli.validate()?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        cols = cli.cols,
        rows = cli.rows,
        quality = cli.quality.name(),
        "window-console starting up"
    );

    let rasterizer = SwashRasterizer::new(cli.font_config())?;
    let metrics = rasterizer.metrics();
    let (width, height) =
        GridGeometry::new(metrics.width, metrics.height)?.surface_size_for(cli.cols, cli.rows);

    let config = ConsoleConfig::default()
        .with_title(&cli.title)
        .with_window_size(width, height)
        .with_buffer_size(cli.cols, cli.rows)
        .with_color_depth(cli.depth);

    let events = WinitEvents::open(&config)?;
    let window = events
        .window()
        .ok_or_else(|| eyre!("Window closed before the surface was attached"))?;
    let surface = SoftbufferSurface::new(window, cli.frame_budget())?;

    let mut console = VirtualConsole::new(Backend::new(surface, events, rasterizer), &config)?;

    let mut scene = Scene::new(cli.frames);
    console.set_target(move |frame| scene.frame(frame));

    let result = console.run();
    match &result {
        Ok(()) => tracing::info!(frames = console.frames_presented(), "console stopped"),
        Err(e) => tracing::error!(error = %e, "console failed"),
    }

    Ok(result?)
}
