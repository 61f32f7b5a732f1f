//! Top-level system: two clock domains around one video RAM port.

use emu_core::{ClockDomain, Edge, Observable, Tickable, Value};
use tracing::{debug, error};
use vidmem_port::{PortAccess, PortRequest, PortStats, SharedPort, Vram};
use vidmem_scanout::{Raster, RasterTiming, Scanout};
use vidmem_snoop::{MemorySize, SchedulerState, WriteScheduler};

use crate::config::{ConfigError, VidMemConfig};
use crate::host::{HostCpu, HostOp};

/// Visible framebuffer width in pixels.
pub const FB_WIDTH: u32 = 512;
/// Visible framebuffer height in lines.
pub const FB_HEIGHT: u32 = 342;

/// ARGB32 for a set bit.
const INK: u32 = 0xFF00_0000;
/// ARGB32 for a clear bit.
const PAPER: u32 = 0xFFFF_FFFF;

/// Pixel clocks of quiet required before the bus is considered drained.
/// Covers the synchronizer depth with margin.
const SETTLE_CYCLES: u32 = 4;

const FS_PER_NS: u64 = 1_000_000;

/// The complete video memory system.
pub struct VidMem {
    raster: Raster,
    scanout: Scanout,
    port: SharedPort,
    scheduler: WriteScheduler,
    host: HostCpu,
    pixel_clock: ClockDomain,
    host_clock: ClockDomain,
    /// Offset of the first host edge, kept for `reset`.
    host_phase_fs: u64,
    /// ARGB32, `FB_WIDTH` x `FB_HEIGHT`.
    framebuffer: Vec<u32>,
    frame_count: u64,
    /// Set by the rising edge that wraps the raster; cleared by `run_frame`.
    frame_done: bool,
}

impl VidMem {
    pub fn new(config: &VidMemConfig) -> Result<Self, ConfigError> {
        let memory_size = config.validate()?;
        let host_phase_fs = config.host_phase_ns.saturating_mul(FS_PER_NS);
        // Pixel clock starts high: its first edge is the falling one.
        let pixel_clock = ClockDomain::new(config.pixel_clock_hz, true, 0);
        let host_clock = ClockDomain::new(config.host_clock_hz, false, host_phase_fs);
        debug!(
            memory = %memory_size,
            window_base = memory_size.window_base(),
            pixel_hz = pixel_clock.frequency_hz(),
            host_hz = host_clock.frequency_hz(),
            host_phase_ns = config.host_phase_ns,
            wait_states = config.host_wait_states,
            "video memory system configured"
        );

        let raster = Raster::new(RasterTiming::COMPACT);
        let mut scanout = Scanout::new();
        // Latch the (0,0) beam state so the first falling edge fetches
        // line 0, window 0, exactly as after a frame wrap.
        scanout.rising_edge(&raster);

        Ok(Self {
            raster,
            scanout,
            port: SharedPort::new(),
            scheduler: WriteScheduler::new(memory_size),
            host: HostCpu::new(config.host_wait_states),
            pixel_clock,
            host_clock,
            host_phase_fs,
            framebuffer: vec![PAPER; (FB_WIDTH * FB_HEIGHT) as usize],
            frame_count: 0,
            frame_done: false,
        })
    }

    /// Return to the power-on state: beam at (0,0), scheduler idle, host
    /// queue empty, both clocks at time zero. Video RAM keeps its contents.
    pub fn reset(&mut self) {
        self.raster.reset();
        self.scanout.reset();
        self.scanout.rising_edge(&self.raster);
        self.scheduler.reset();
        self.host.reset();
        self.pixel_clock = ClockDomain::new(self.pixel_clock.frequency_hz(), true, 0);
        self.host_clock =
            ClockDomain::new(self.host_clock.frequency_hz(), false, self.host_phase_fs);
        self.framebuffer.fill(PAPER);
        self.frame_count = 0;
        self.frame_done = false;
        debug!("video memory system reset");
    }

    /// Run until the raster wraps to the top of the next frame.
    pub fn run_frame(&mut self) {
        while !self.frame_done {
            self.tick();
        }
        self.frame_done = false;
    }

    /// Run until the host has finished its program and the scheduler has
    /// drained, or `max_pixel_cycles` pixel clocks have elapsed.
    ///
    /// Returns true if the system went quiet in time.
    pub fn run_until_host_idle(&mut self, max_pixel_cycles: u64) -> bool {
        let deadline = self.pixel_clock.cycles().get() + max_pixel_cycles;
        let mut quiet = 0;
        while self.pixel_clock.cycles().get() < deadline {
            let before = self.pixel_clock.cycles();
            self.tick();
            if self.pixel_clock.cycles() == before {
                continue;
            }
            if self.host.is_idle() && self.scheduler.state() == SchedulerState::Idle {
                quiet += 1;
                if quiet >= SETTLE_CYCLES {
                    return true;
                }
            } else {
                quiet = 0;
            }
        }
        false
    }

    /// Queue host bus operations.
    pub fn load_program(&mut self, ops: impl IntoIterator<Item = HostOp>) {
        self.host.extend(ops);
    }

    fn pixel_rising(&mut self) {
        self.raster.tick();
        if self.raster.take_frame_complete() {
            self.frame_count += 1;
            self.frame_done = true;
            debug!(frame = self.frame_count, "frame complete");
        }
        self.scanout.rising_edge(&self.raster);

        if let Some((x, y)) = self.scanout.emitted_pixel() {
            let index = usize::from(y) * FB_WIDTH as usize + usize::from(x);
            if let Some(pixel) = self.framebuffer.get_mut(index) {
                *pixel = if self.scanout.serial_out() { INK } else { PAPER };
            }
        }
    }

    fn pixel_falling(&mut self) {
        let video = self
            .scanout
            .request(&self.raster)
            .map(|address| PortRequest::Read { address });
        let cpu = self.scheduler.request();

        let access = match self.port.cycle(video, cpu) {
            Ok(access) => access,
            Err(conflict) => {
                error!(
                    hcount = self.raster.hcount(),
                    vcount = self.raster.vcount(),
                    %conflict,
                    "memory port conflict"
                );
                conflict.performed
            }
        };
        if let PortAccess::Read { data, .. } = access {
            self.scanout.accept_fetch(data);
        }

        self.scheduler
            .falling_edge(self.host.signals(), self.raster.seq());
    }

    #[must_use]
    pub fn framebuffer(&self) -> &[u32] {
        &self.framebuffer
    }

    #[must_use]
    pub fn framebuffer_width(&self) -> u32 {
        FB_WIDTH
    }

    #[must_use]
    pub fn framebuffer_height(&self) -> u32 {
        FB_HEIGHT
    }

    #[must_use]
    pub fn vram(&self) -> &Vram {
        self.port.vram()
    }

    /// Direct RAM access, bypassing the port. For preloading images.
    pub fn vram_mut(&mut self) -> &mut Vram {
        self.port.vram_mut()
    }

    #[must_use]
    pub fn port_stats(&self) -> PortStats {
        self.port.stats()
    }

    #[must_use]
    pub fn scheduler(&self) -> &WriteScheduler {
        &self.scheduler
    }

    #[must_use]
    pub fn memory_size(&self) -> MemorySize {
        self.scheduler.window().memory_size()
    }

    /// First host address of the framebuffer window.
    #[must_use]
    pub fn window_base(&self) -> u32 {
        self.memory_size().window_base()
    }

    #[must_use]
    pub fn host(&self) -> &HostCpu {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut HostCpu {
        &mut self.host
    }

    #[must_use]
    pub fn raster(&self) -> &Raster {
        &self.raster
    }

    #[must_use]
    pub fn scanout(&self) -> &Scanout {
        &self.scanout
    }

    #[must_use]
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Pixel clocks elapsed.
    #[must_use]
    pub fn pixel_cycles(&self) -> u64 {
        self.pixel_clock.cycles().get()
    }

    /// Host clocks elapsed.
    #[must_use]
    pub fn host_cycles(&self) -> u64 {
        self.host_clock.cycles().get()
    }
}

impl Tickable for VidMem {
    /// One edge of whichever clock is due next. Simultaneous edges go to the
    /// pixel clock first.
    fn tick(&mut self) {
        if self.pixel_clock.next_edge_fs() <= self.host_clock.next_edge_fs() {
            match self.pixel_clock.advance() {
                Edge::Rising => self.pixel_rising(),
                Edge::Falling => self.pixel_falling(),
            }
        } else {
            let edge = self.host_clock.advance();
            self.host.edge(edge);
        }
    }
}

impl Observable for VidMem {
    fn query(&self, path: &str) -> Option<Value> {
        if let Some(rest) = path.strip_prefix("scheduler.") {
            self.scheduler.query(rest)
        } else if let Some(rest) = path.strip_prefix("scanout.") {
            self.scanout.query(rest)
        } else if let Some(rest) = path.strip_prefix("port.") {
            self.port.query(rest)
        } else if let Some(rest) = path.strip_prefix("host.") {
            match rest {
                "pending" => u32::try_from(self.host.pending()).ok().map(Value::U32),
                "completed" => Some(self.host.completed().into()),
                _ => None,
            }
        } else {
            match path {
                "hcount" => Some(self.raster.hcount().into()),
                "vcount" => Some(self.raster.vcount().into()),
                "seq" => Some(self.raster.seq().into()),
                "frame_count" => Some(self.frame_count.into()),
                "pixel_cycles" => Some(self.pixel_cycles().into()),
                "host_cycles" => Some(self.host_cycles().into()),
                _ => None,
            }
        }
    }

    fn query_paths(&self) -> &'static [&'static str] {
        &[
            "hcount",
            "vcount",
            "seq",
            "frame_count",
            "pixel_cycles",
            "host_cycles",
            "host.pending",
            "host.completed",
            "scheduler.<path>",
            "scanout.<path>",
            "port.<path>",
        ]
    }
}
