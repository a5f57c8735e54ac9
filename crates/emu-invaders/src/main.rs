//! Space Invaders arcade emulator binary.
//!
//! Runs the board with a winit window and pixels framebuffer, or in
//! headless mode for screenshots and frame dumps.

use std::path::PathBuf;
use std::process;
use std::str::FromStr;
use std::thread;
#[cfg(feature = "window")]
use std::time::Instant;

use emu_core::StepOutcome;
use emu_invaders::{
    DipSwitches, Host, HostConfig, Invaders, InvadersConfig, InvadersError, capture, load_rom,
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[cfg(feature = "window")]
use emu_invaders::keyboard_map;
#[cfg(feature = "window")]
use emu_invaders::video::{SCREEN_HEIGHT, SCREEN_WIDTH};
#[cfg(feature = "window")]
use pixels::{Pixels, SurfaceTexture};
#[cfg(feature = "window")]
use winit::application::ApplicationHandler;
#[cfg(feature = "window")]
use winit::event::{ElementState, WindowEvent};
#[cfg(feature = "window")]
use winit::event_loop::{ActiveEventLoop, EventLoop};
#[cfg(feature = "window")]
use winit::keyboard::{KeyCode, PhysicalKey};
#[cfg(feature = "window")]
use winit::window::{Window, WindowAttributes, WindowId};

/// Window scale factor.
#[cfg(feature = "window")]
const SCALE: u32 = 3;

// ---------------------------------------------------------------------------
// CLI argument parsing
// ---------------------------------------------------------------------------

struct CliArgs {
    rom_path: Option<PathBuf>,
    headless: bool,
    threaded: bool,
    frames: u32,
    screenshot_path: Option<PathBuf>,
    record_dir: Option<PathBuf>,
    ships: u8,
    bonus_1000: bool,
    coin_info_hidden: bool,
    overlay: bool,
}

fn parse_args() -> CliArgs {
    let args: Vec<String> = std::env::args().collect();
    let mut cli = CliArgs {
        rom_path: None,
        headless: false,
        threaded: false,
        frames: 600,
        screenshot_path: None,
        record_dir: None,
        ships: 3,
        bonus_1000: false,
        coin_info_hidden: false,
        overlay: false,
    };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--rom" => {
                i += 1;
                cli.rom_path = args.get(i).map(PathBuf::from);
            }
            "--headless" => {
                cli.headless = true;
            }
            "--threaded" => {
                cli.threaded = true;
            }
            "--frames" => {
                i += 1;
                cli.frames = number_or_exit("--frames", args.get(i).map(String::as_str));
            }
            "--screenshot" => {
                i += 1;
                cli.screenshot_path = args.get(i).map(PathBuf::from);
            }
            "--record" => {
                i += 1;
                cli.record_dir = args.get(i).map(PathBuf::from);
            }
            "--ships" => {
                i += 1;
                cli.ships = number_or_exit("--ships", args.get(i).map(String::as_str));
            }
            "--bonus-1000" => {
                cli.bonus_1000 = true;
            }
            "--coin-info" => {
                cli.coin_info_hidden = true;
            }
            "--overlay" => {
                cli.overlay = true;
            }
            "--help" | "-h" => {
                eprintln!("Usage: emu-invaders --rom <path> [OPTIONS]");
                eprintln!();
                eprintln!("Options:");
                eprintln!("  --rom <path>         Program image, or a directory with invaders.h/g/f/e");
                eprintln!("  --headless           Run without a window");
                eprintln!("  --threaded           Headless run on the two-thread host");
                eprintln!("  --frames <n>         Number of frames in headless mode [default: 600]");
                eprintln!("  --screenshot <file>  Save a PNG screenshot (headless)");
                eprintln!("  --record <dir>       Save every frame as PNG to directory (headless)");
                eprintln!("  --ships <3-6>        Ships per game [default: 3]");
                eprintln!("  --bonus-1000         Extra ship at 1000 points instead of 1500");
                eprintln!("  --coin-info          Hide coin information on the attract screen");
                eprintln!("  --overlay            Colour the picture like the cabinet overlay");
                eprintln!();
                eprintln!("Keys: C coin, 1/2 start, arrows + space P1, A/D + W P2, T tilt, Esc quit");
                process::exit(0);
            }
            other => {
                eprintln!("Unknown argument: {other}");
                process::exit(1);
            }
        }
        i += 1;
    }

    cli
}

/// Parse the numeric value following `flag`.
fn parse_number<T: FromStr>(flag: &str, value: Option<&str>) -> Result<T, String> {
    let Some(value) = value else {
        return Err(format!("{flag} needs a value"));
    };
    value
        .parse()
        .map_err(|_| format!("{flag}: '{value}' is not a valid number"))
}

fn number_or_exit<T: FromStr>(flag: &str, value: Option<&str>) -> T {
    parse_number(flag, value).unwrap_or_else(|e| {
        eprintln!("{e}");
        process::exit(1);
    })
}

fn make_config(cli: &CliArgs) -> Result<InvadersConfig, InvadersError> {
    let Some(ref path) = cli.rom_path else {
        eprintln!("Missing --rom <path> (see --help)");
        process::exit(1);
    };
    Ok(InvadersConfig {
        rom: load_rom(path)?,
        dips: DipSwitches::new(cli.ships, cli.bonus_1000, cli.coin_info_hidden)?,
        overlay: cli.overlay,
    })
}

// ---------------------------------------------------------------------------
// Headless mode
// ---------------------------------------------------------------------------

fn run_headless(cli: &CliArgs, config: &InvadersConfig) -> Result<(), InvadersError> {
    let mut invaders = Invaders::new(config)?;

    if let Some(ref dir) = cli.record_dir {
        return capture::record(&mut invaders, dir, cli.frames);
    }

    let framebuffer = if cli.threaded {
        run_threaded(invaders, cli.frames)?
    } else {
        for _ in 0..cli.frames {
            if invaders.run_frame()? == StepOutcome::Halted {
                info!(frame = invaders.frame_count(), "CPU halted");
                break;
            }
        }
        invaders.render();
        invaders.framebuffer().to_vec()
    };

    if let Some(ref path) = cli.screenshot_path {
        capture::save_screenshot(&framebuffer, path)?;
        info!(path = %path.display(), "screenshot saved");
    }
    Ok(())
}

/// Headless run on the two-thread host, injecting interrupts on wall-clock
/// time. Returns the last completed picture.
fn run_threaded(invaders: Invaders, frames: u32) -> Result<Vec<u32>, InvadersError> {
    let mut host = Host::start(invaders, HostConfig::default())?;
    let interval = host.half_frame_interval();

    let mut completed = 0;
    while completed < frames && host.is_running() {
        thread::sleep(interval);
        if host.half_frame() {
            completed += 1;
        }
    }

    let framebuffer = host.frame().to_vec();
    host.stop()?;
    info!(frames = completed, "threaded run finished");
    Ok(framebuffer)
}

// ---------------------------------------------------------------------------
// Windowed mode
// ---------------------------------------------------------------------------

#[cfg(feature = "window")]
struct App {
    host: Host,
    window: Option<&'static Window>,
    pixels: Option<Pixels<'static>>,
    last_tick: Instant,
}

#[cfg(feature = "window")]
impl App {
    fn new(host: Host) -> Self {
        Self {
            host,
            window: None,
            pixels: None,
            last_tick: Instant::now(),
        }
    }

    fn handle_key(&mut self, keycode: KeyCode, pressed: bool) {
        if let Some(key) = keyboard_map::map_keycode(keycode) {
            let mut machine = self.host.machine().lock();
            if pressed {
                machine.press_key(key);
            } else {
                machine.release_key(key);
            }
        }
    }

    fn update_pixels(&mut self) {
        let Some(pixels) = self.pixels.as_mut() else {
            return;
        };

        // ARGB32 -> RGBA8
        let frame = pixels.frame_mut();
        for (dst, &argb) in frame.chunks_exact_mut(4).zip(self.host.frame()) {
            let [_, r, g, b] = argb.to_be_bytes();
            dst.copy_from_slice(&[r, g, b, 0xFF]);
        }
    }
}

#[cfg(feature = "window")]
impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let window_size =
            winit::dpi::LogicalSize::new(SCREEN_WIDTH * SCALE, SCREEN_HEIGHT * SCALE);
        let attrs = WindowAttributes::default()
            .with_title("Space Invaders")
            .with_inner_size(window_size)
            .with_resizable(false);

        match event_loop.create_window(attrs) {
            Ok(window) => {
                // Lives until process exit
                let window: &'static Window = Box::leak(Box::new(window));
                let inner = window.inner_size();
                let surface = SurfaceTexture::new(inner.width, inner.height, window);
                match Pixels::new(SCREEN_WIDTH, SCREEN_HEIGHT, surface) {
                    Ok(pixels) => {
                        self.pixels = Some(pixels);
                    }
                    Err(e) => {
                        error!("failed to create pixels: {e}");
                        event_loop.exit();
                        return;
                    }
                }
                self.window = Some(window);
            }
            Err(e) => {
                error!("failed to create window: {e}");
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(keycode) = event.physical_key {
                    if keycode == KeyCode::Escape && event.state == ElementState::Pressed {
                        event_loop.exit();
                        return;
                    }
                    self.handle_key(keycode, event.state == ElementState::Pressed);
                }
            }
            WindowEvent::RedrawRequested => {
                if !self.host.is_running() {
                    event_loop.exit();
                    return;
                }

                let now = Instant::now();
                if now.duration_since(self.last_tick) >= self.host.half_frame_interval() {
                    if self.host.half_frame() {
                        self.update_pixels();
                    }
                    self.last_tick = now;
                }

                if let Some(pixels) = self.pixels.as_ref() {
                    if let Err(e) = pixels.render() {
                        error!("render error: {e}");
                        event_loop.exit();
                    }
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = self.window {
            window.request_redraw();
        }
    }
}

#[cfg(feature = "window")]
fn run_windowed(config: &InvadersConfig) -> Result<(), InvadersError> {
    let host = Host::start(Invaders::new(config)?, HostConfig::default())?;
    let mut app = App::new(host);

    let event_loop = match EventLoop::new() {
        Ok(el) => el,
        Err(e) => {
            error!("failed to create event loop: {e}");
            process::exit(1);
        }
    };
    if let Err(e) = event_loop.run_app(&mut app) {
        error!("event loop error: {e}");
    }

    app.host.stop()
}

#[cfg(not(feature = "window"))]
fn run_windowed(_config: &InvadersConfig) -> Result<(), InvadersError> {
    eprintln!("Built without the window feature; use --headless");
    process::exit(1);
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() {
    let cli = parse_args();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("emu_invaders=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let result = make_config(&cli).and_then(|config| {
        if cli.headless {
            run_headless(&cli, &config)
        } else {
            run_windowed(&config)
        }
    });

    if let Err(e) = result {
        error!("{e}");
        process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_count_parses() {
        assert_eq!(parse_number::<u32>("--frames", Some("120")), Ok(120));
    }

    #[test]
    fn bad_frame_count_is_reported() {
        let err = parse_number::<u32>("--frames", Some("lots")).expect_err("not a number");
        assert!(err.contains("--frames"));
        assert!(err.contains("lots"));

        assert!(parse_number::<u32>("--frames", Some("-5")).is_err());
    }

    #[test]
    fn missing_value_is_reported() {
        assert_eq!(
            parse_number::<u8>("--ships", None),
            Err("--ships needs a value".to_string())
        );
    }
}
