//! Headless runner for the video memory system.
//!
//! Loads a host bus script (or the built-in checkerboard), runs the system
//! for a number of frames and optionally saves the final frame as a PNG.

use std::error::Error;
use std::path::PathBuf;
use std::process;

use clap::Parser;
use emu_vidmem::{VidMem, VidMemConfig, capture, load_script, test_pattern};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(about = "Cycle-accurate shared framebuffer controller")]
struct Cli {
    /// JSON configuration file. Missing fields take their defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Memory-size code 0-7 (128K-16M), overriding the config file.
    #[arg(long)]
    memory_size: Option<u8>,

    /// JSON host bus script. Without one, a checkerboard is drawn.
    #[arg(long)]
    script: Option<PathBuf>,

    /// Frames to run.
    #[arg(long, default_value_t = 2)]
    frames: u32,

    /// Save the last frame as a PNG.
    #[arg(long)]
    screenshot: Option<PathBuf>,

    /// Save every frame as a numbered PNG in this directory.
    #[arg(long, conflicts_with = "screenshot")]
    record: Option<PathBuf>,
}

fn run(cli: &Cli) -> Result<(), Box<dyn Error>> {
    let mut config = match &cli.config {
        Some(path) => VidMemConfig::load(path)?,
        None => VidMemConfig::default(),
    };
    if let Some(code) = cli.memory_size {
        config.memory_size = code;
    }

    let mut vm = VidMem::new(&config)?;
    let program = match &cli.script {
        Some(path) => load_script(path)?,
        None => test_pattern(vm.memory_size()),
    };
    info!(
        memory = %vm.memory_size(),
        window_base = %format!("${:06X}", vm.window_base()),
        ops = program.len(),
        "starting"
    );
    vm.load_program(program);

    if let Some(dir) = &cli.record {
        capture::save_frame_sequence(&mut vm, dir, cli.frames)?;
    } else {
        for _ in 0..cli.frames {
            vm.run_frame();
        }
    }

    if !vm.host().is_idle() {
        warn!(
            pending = vm.host().pending(),
            "host program still running after {} frames", cli.frames
        );
    }

    let sched = vm.scheduler().stats();
    let port = vm.port_stats();
    info!(
        frames = vm.frame_count(),
        pixel_cycles = vm.pixel_cycles(),
        host_cycles = vm.host_cycles(),
        "run complete"
    );
    info!(
        claimed = sched.claimed,
        captured = sched.captured,
        aborted = sched.aborted,
        commits = sched.commits,
        stall_cycles = sched.stall_cycles,
        "write scheduler"
    );
    info!(
        reads = port.reads,
        writes = port.writes,
        idle = port.idle,
        conflicts = port.conflicts,
        "memory port"
    );

    if let Some(path) = &cli.screenshot {
        capture::save_screenshot(&vm, path)?;
        info!(path = %path.display(), "screenshot saved");
    }
    Ok(())
}

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();
    if let Err(e) = run(&cli) {
        error!("{e}");
        process::exit(1);
    }
}
