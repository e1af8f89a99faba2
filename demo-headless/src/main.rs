//! Headless sandbox run
//!
//! Pours sand and water into the grid while a scripted pointer (or a real
//! handle on a serial port) sweeps the haptic proxy through the pile, printing
//! a periodic report of grid contents and force output.

use clap::{Parser, ValueEnum};
use sand_haptics_core::{
    ControlMode, HapticConfig, HapticInput, Material, RailAxis, Sandbox, SandboxConfig, Vec2,
};
#[cfg(feature = "serial")]
use sand_haptics_core::{device, DeviceConfig, HapticLink};
use std::f32::consts::TAU;
use std::time::{Duration, Instant};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Mode {
    /// Handle constrained to a rail (Hapkit style)
    OneDof,
    /// Free 2D pointer
    TwoDof,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Axis {
    X,
    Y,
}

/// Falling sand sandbox with a haptic probe
#[derive(Parser, Debug)]
#[command(name = "sand-haptics-demo")]
#[command(about = "Headless falling-sand sandbox with a haptic proxy", long_about = None)]
struct Args {
    /// Grid width in cells
    #[arg(long, default_value_t = 60)]
    width: usize,

    /// Grid height in cells
    #[arg(long, default_value_t = 60)]
    height: usize,

    /// Run length in seconds of simulated time
    #[arg(short, long, default_value_t = 20.0)]
    duration: f32,

    /// Frame rate of the driving loop
    #[arg(long, default_value_t = 60.0)]
    fps: f32,

    /// Milliseconds between rule passes
    #[arg(long, default_value_t = 16.0)]
    tick_delay: f32,

    /// Fixed haptic period in ms (omit for one haptic tick per frame)
    #[arg(long)]
    haptic_period: Option<f32>,

    /// Tie-break seed (omit for OS entropy)
    #[arg(short, long)]
    seed: Option<u64>,

    /// Control mode
    #[arg(short, long, value_enum, default_value_t = Mode::OneDof)]
    mode: Mode,

    /// Rail axis in 1-DOF mode
    #[arg(short, long, value_enum, default_value_t = Axis::X)]
    axis: Axis,

    /// Friction coefficient
    #[arg(long, default_value_t = 5.0)]
    friction: f32,

    /// Spring stiffness
    #[arg(short = 'k', long, default_value_t = 0.5)]
    stiffness: f32,

    /// Proxy radius in grid units
    #[arg(short, long, default_value_t = 4.0)]
    radius: f32,

    /// Sweep period of the scripted pointer in seconds
    #[arg(long, default_value_t = 4.0)]
    sweep_period: f32,

    /// Report interval in seconds
    #[arg(long, default_value_t = 1.0)]
    report_interval: f32,

    /// Print the grid at the end of the run
    #[arg(long)]
    show_grid: bool,

    /// Serial port of a physical handle (runs in real time)
    #[cfg(feature = "serial")]
    #[arg(short, long)]
    port: Option<String>,

    /// Serial baud rate
    #[cfg(feature = "serial")]
    #[arg(long, default_value_t = 115_200)]
    baud: u32,

    /// List serial ports and exit
    #[cfg(feature = "serial")]
    #[arg(long)]
    list_ports: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    #[cfg(feature = "serial")]
    if args.list_ports {
        let ports = device::available_ports();
        if ports.is_empty() {
            println!("No serial ports found");
        }
        for port in ports {
            println!("{}", port);
        }
        return;
    }

    let config = SandboxConfig {
        width: args.width,
        height: args.height,
        tick_delay_ms: args.tick_delay,
        haptic_period_ms: args.haptic_period,
        seed: args.seed,
        haptics: HapticConfig {
            mode: match args.mode {
                Mode::OneDof => ControlMode::OneDof,
                Mode::TwoDof => ControlMode::TwoDof,
            },
            axis: match args.axis {
                Axis::X => RailAxis::X,
                Axis::Y => RailAxis::Y,
            },
            friction_coefficient: args.friction,
            spring_stiffness: args.stiffness,
            radius: args.radius,
            ..Default::default()
        },
        ..Default::default()
    };

    let mut sandbox = match Sandbox::new(config) {
        Ok(sb) => sb,
        Err(e) => {
            eprintln!("Invalid configuration: {}", e);
            std::process::exit(2);
        }
    };

    println!("=== Sand Haptics Demo ===\n");
    println!(
        "Grid {}x{}, tick delay {:.1} ms, mode {:?}, axis {:?}",
        args.width, args.height, args.tick_delay, args.mode, args.axis
    );

    let w = args.width as f32;
    let h = args.height as f32;
    let anchor = Vec2::new(w * 0.5, h * 0.75);
    sandbox.recenter(anchor);
    let travel = sandbox.haptics().config().travel_limit_grid_units();
    let amplitude = (w.min(h) * 0.5 - 2.0).clamp(1.0, travel);

    #[cfg(feature = "serial")]
    let mut link = match &args.port {
        Some(port) => {
            let cfg = DeviceConfig {
                port: port.clone(),
                baud_rate: args.baud,
                ..Default::default()
            };
            match device::open_serial(&cfg) {
                Ok(dev) => Some(dev),
                Err(e) => {
                    eprintln!("Could not open {}: {}", port, e);
                    std::process::exit(1);
                }
            }
        }
        None => None,
    };

    let fps = args.fps.max(1.0);
    let dt = Duration::from_secs_f32(1.0 / fps);
    let frames = (args.duration.max(0.0) * fps).round() as u64;
    let pour_frames = frames / 2;

    println!("\nTime(s) | Sand | Wet  | Water | Proxy          | Device         | Resist | Force(N)");
    println!("--------|------|------|-------|----------------|----------------|--------|---------");

    let started = Instant::now();
    let mut next_report = 0.0;
    for frame in 0..frames {
        let t = frame as f32 / fps;
        if frame < pour_frames {
            pour(&mut sandbox, frame);
        }

        let phase = TAU * t / args.sweep_period.max(0.1);
        let pointer = anchor + Vec2::new(amplitude * phase.sin(), 0.5 * amplitude * phase.cos());
        let input = HapticInput::Pointer(pointer);

        #[cfg(feature = "serial")]
        if let Some(dev) = link.as_mut() {
            sandbox.frame_with_link(dt, dev, Instant::now(), input);
            std::thread::sleep(dt);
        } else {
            sandbox.frame(dt, input);
        }
        #[cfg(not(feature = "serial"))]
        sandbox.frame(dt, input);

        if t >= next_report {
            report(&sandbox, t);
            next_report += args.report_interval.max(dt.as_secs_f32());
        }
    }

    #[cfg(feature = "serial")]
    if let Some(dev) = link.as_mut() {
        dev.disconnect();
    }

    println!("\n=== Run Complete ===");
    println!("Frames: {}, rule passes: {}", frames, sandbox.simulation_ticks());
    println!("Final contents: {}", sandbox.material_counts());
    info!("Wall time {:.2?}", started.elapsed());

    if args.show_grid {
        println!();
        print_grid(&sandbox);
    }
}

/// Drop a grain of sand near the centre every frame and water on the left
/// every third frame
fn pour(sandbox: &mut Sandbox, frame: u64) {
    let width = sandbox.grid().width() as i32;
    let sand_x = width / 2 + (frame % 5) as i32 - 2;
    if sandbox.grid().is_vacant(sand_x, 0) {
        sandbox.paint(sand_x, 0, Material::Sand);
    }
    if frame % 3 == 0 {
        let water_x = width / 4 + (frame % 2) as i32;
        if sandbox.grid().is_vacant(water_x, 0) {
            sandbox.paint(water_x, 0, Material::Water);
        }
    }
}

fn report(sandbox: &Sandbox, t: f32) {
    let counts = sandbox.material_counts();
    let h = sandbox.haptics();
    println!(
        "{:7.2} | {:4} | {:4} | {:5} | ({:5.1}, {:5.1}) | ({:5.1}, {:5.1}) | {:6.3} | {:8.4}",
        t,
        counts.sand,
        counts.wet_sand,
        counts.water,
        h.proxy().x,
        h.proxy().y,
        h.device().x,
        h.device().y,
        h.smoothed_resistance(),
        h.force_1d().value()
    );
}

fn print_grid(sandbox: &Sandbox) {
    let snapshot = sandbox.snapshot();
    let mut rows = vec![vec!['.'; snapshot.width]; snapshot.height];
    for cell in &snapshot.cells {
        let glyph = match cell.material {
            Material::Sand => '#',
            Material::WetSand if cell.soak >= sandbox.rules().soak_threshold() => '@',
            Material::WetSand => '%',
            Material::Water => '~',
            Material::Empty => '.',
        };
        rows[cell.y as usize][cell.x as usize] = glyph;
    }
    for (pos, glyph) in [(snapshot.device, 'D'), (snapshot.proxy, 'P')] {
        let (x, y) = (pos.x as i64, pos.y as i64);
        if x >= 0 && y >= 0 && (x as usize) < snapshot.width && (y as usize) < snapshot.height {
            rows[y as usize][x as usize] = glyph;
        }
    }
    for row in rows {
        println!("{}", row.into_iter().collect::<String>());
    }
}
