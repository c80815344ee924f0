use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{App, Arg};
use tracing::{info, warn, Level};

use birdview::backend::HeadlessBackend;
use birdview::live::LiveWorld;
use birdview::roads::WAYPOINT_SPACING;
use birdview::text::{FontPainter, NullPainter, TextPainter};
use birdview::{Viewer, ViewerConfig};

fn main() -> anyhow::Result<()> {
    let matches = App::new("birdview")
        .about("Top-down 2D viewer for a live driving simulation")
        .arg(
            Arg::with_name("VERBOSE")
                .help("Print debug information")
                .short("v")
                .long("verbose"),
        )
        .arg(
            Arg::with_name("HOST")
                .help("Address of the simulation server")
                .long("host")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("PORT")
                .help("TCP port of the simulation server")
                .short("p")
                .long("port")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("RES")
                .help("Window resolution as WIDTHxHEIGHT")
                .long("res")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("ANTIALIASING")
                .help("Anti-aliased road drawing, true or false")
                .long("antialiasing")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("FONT")
                .help("Monospace TTF used for panel text")
                .long("font")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("CONFIG")
                .help("TOML config file")
                .short("c")
                .long("config")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("DUMP_FRAME")
                .help("Render this many frames without a window, save the last as PNG and exit")
                .long("dump-frame")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("DUMP_OUTPUT")
                .help("PNG path written by --dump-frame")
                .long("dump-output")
                .takes_value(true),
        )
        .get_matches();

    let level = if matches.is_present("VERBOSE") { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt().with_max_level(level).init();

    let mut config = match matches.value_of("CONFIG") {
        Some(path) => ViewerConfig::load(Path::new(path))?,
        None => ViewerConfig::default(),
    };
    config.apply_cli_overrides(&matches)?;

    info!("connecting to {}:{}", config.host, config.port);
    let (world, map, actors) =
        birdview_feed::connect(&config.host, config.port, Duration::from_secs(config.timeout_secs))?;
    info!("connected, {} actors in the world", actors.len());

    let waypoints = map.sample_waypoints(WAYPOINT_SPACING)?;

    let painter: Box<dyn TextPainter> = match &config.font {
        Some(path) => Box::new(FontPainter::from_file(Path::new(path))?),
        None => match FontPainter::discover() {
            Some(painter) => Box::new(painter),
            None => {
                warn!("no usable monospace font found, panel text disabled");
                Box::new(NullPainter)
            }
        },
    };

    let feed = LiveWorld::new(world);
    let mut viewer = Viewer::new(&config, &waypoints, Box::new(feed), painter)?;

    let interrupted = Arc::new(AtomicBool::new(false));
    {
        let interrupted = interrupted.clone();
        ctrlc::set_handler(move || interrupted.store(true, Ordering::SeqCst))
            .context("could not install the Ctrl-C handler")?;
    }
    viewer.set_interrupt_flag(interrupted);

    if let Some(frames) = matches.value_of("DUMP_FRAME") {
        let frames: u32 = frames.parse().context("invalid --dump-frame count")?;
        let output = matches.value_of("DUMP_OUTPUT").unwrap_or("birdview.png");
        let mut backend = HeadlessBackend::new(config.width, config.height);
        viewer.run_frames(&mut backend, frames);
        if let Some(frame) = backend.last_frame() {
            frame.save(output).context("could not write the frame dump")?;
            info!("dumped frame to {output}");
        }
        viewer.shutdown();
        return Ok(());
    }

    run_viewer(viewer, &config)
}

#[cfg(feature = "window")]
fn run_viewer(viewer: Viewer, config: &ViewerConfig) -> anyhow::Result<()> {
    birdview::backend::run_windowed(viewer, config.width, config.height)?;
    Ok(())
}

#[cfg(not(feature = "window"))]
fn run_viewer(mut viewer: Viewer, config: &ViewerConfig) -> anyhow::Result<()> {
    warn!("built without the window feature, running headless");
    let mut backend = HeadlessBackend::new(config.width, config.height);
    viewer.run(&mut backend);
    viewer.shutdown();
    Ok(())
}
