//! Interactive Sandbox Debugger
//!
//! A terminal REPL for poking at the sand grid and the haptic proxy one tick
//! at a time: paint materials, step the rules, drive the probe and inspect
//! resistance and force values.
//!
//! # Usage
//!
//! ```bash
//! cargo run --package demo-interactive
//! ```
//!
//! # Commands
//!
//! - `step [n]` - Run n rule passes (default 1)
//! - `paint <material> <x> <y> [radius]` - Paint sand, wet, water or empty
//! - `erase <x> <y> [radius]` - Paint Empty
//! - `move <x> <y> [n]` - Run n haptic ticks with the pointer at (x, y)
//! - `handle <meters> [n]` - Run n haptic ticks with a device reading
//! - `hold [n]` - Run n haptic ticks without new input
//! - `run <frames> [ms]` - Advance the frame clock with held input
//! - `probe <x> <y> [radius]` - Resistance at a point
//! - `recenter <x> <y>` - Move anchor, proxy and device
//! - `mode <1d|2d>` / `axis <x|y>` - Control mode and rail axis
//! - `set <param> <value>` - Tune friction, stiffness, radius, scale, smoothing, delay
//! - `show` - Print the grid
//! - `status` - Counts and haptic state
//! - `clear` / `reset [w] [h]` - Empty or resize the grid
//! - `help` / `quit`

use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use sand_haptics_core::{
    ControlMode, HapticInput, Material, Meters, RailAxis, Sandbox, SandboxConfig, Vec2,
};
use std::io::{self, Write};
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

/// Default grid dimensions
const DEFAULT_WIDTH: usize = 60;
const DEFAULT_HEIGHT: usize = 60;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    println!("╔═══════════════════════════════════════════════════════════╗");
    println!("║           Sand Haptics - Interactive Debugger             ║");
    println!("╚═══════════════════════════════════════════════════════════╝");
    println!();

    let (width, height) = prompt_grid_dimensions();
    let mut sandbox = match Sandbox::new(SandboxConfig {
        width,
        height,
        ..Default::default()
    }) {
        Ok(sb) => sb,
        Err(e) => {
            eprintln!("Failed to create sandbox: {}", e);
            return;
        }
    };
    sandbox.recenter(Vec2::new(width as f32 * 0.5, height as f32 * 0.5));
    println!("Created {}x{} sandbox. Probe anchored at the centre.", width, height);

    let mut rl = match DefaultEditor::new() {
        Ok(rl) => rl,
        Err(e) => {
            eprintln!("Failed to create readline: {}", e);
            return;
        }
    };

    println!("\nType 'help' for available commands.\n");

    loop {
        let readline = rl.readline("sand> ");
        match readline {
            Ok(line) => {
                let _ = rl.add_history_entry(&line);
                let parts: Vec<&str> = line.split_whitespace().collect();

                if parts.is_empty() {
                    continue;
                }

                match parts[0].to_lowercase().as_str() {
                    "step" | "s" => {
                        let count = parse_at(&parts, 1).unwrap_or(1);
                        step_rules(&mut sandbox, count);
                    }
                    "paint" | "p" => paint(&mut sandbox, &parts),
                    "erase" | "e" => erase(&mut sandbox, &parts),
                    "move" | "m" => {
                        let (Some(x), Some(y)) = (parse_at::<f32>(&parts, 1), parse_at::<f32>(&parts, 2)) else {
                            println!("Usage: move <x> <y> [n]");
                            continue;
                        };
                        let count = parse_at(&parts, 3).unwrap_or(1);
                        drive(&mut sandbox, HapticInput::Pointer(Vec2::new(x, y)), count);
                    }
                    "handle" | "hd" => {
                        let Some(meters) = parse_at::<f32>(&parts, 1) else {
                            println!("Usage: handle <meters> [n]");
                            continue;
                        };
                        let count = parse_at(&parts, 2).unwrap_or(1);
                        drive(&mut sandbox, HapticInput::Device(Meters::new(meters)), count);
                    }
                    "hold" | "h" => {
                        let count = parse_at(&parts, 1).unwrap_or(1);
                        drive(&mut sandbox, HapticInput::Hold, count);
                    }
                    "run" | "r" => {
                        let Some(frames) = parse_at::<u32>(&parts, 1) else {
                            println!("Usage: run <frames> [ms]");
                            continue;
                        };
                        let ms = parse_at::<u64>(&parts, 2).unwrap_or(16);
                        run_frames(&mut sandbox, frames, Duration::from_millis(ms));
                    }
                    "probe" | "pr" => probe(&sandbox, &parts),
                    "recenter" | "rc" => {
                        let (Some(x), Some(y)) = (parse_at::<f32>(&parts, 1), parse_at::<f32>(&parts, 2)) else {
                            println!("Usage: recenter <x> <y>");
                            continue;
                        };
                        sandbox.recenter(Vec2::new(x, y));
                        println!("Anchor, proxy and device at ({:.1}, {:.1})", x, y);
                    }
                    "mode" => match parts.get(1).copied() {
                        Some("1d" | "1" | "rail") => sandbox.set_mode(ControlMode::OneDof),
                        Some("2d" | "2" | "free") => sandbox.set_mode(ControlMode::TwoDof),
                        _ => println!("Usage: mode <1d|2d>"),
                    },
                    "axis" => match parts.get(1).map(|s| s.to_lowercase()).as_deref() {
                        Some("x") => sandbox.set_axis(RailAxis::X),
                        Some("y") => sandbox.set_axis(RailAxis::Y),
                        _ => println!("Usage: axis <x|y>"),
                    },
                    "set" => set_param(&mut sandbox, &parts),
                    "show" | "g" => show_grid(&sandbox),
                    "status" | "st" => show_status(&sandbox),
                    "clear" | "c" => {
                        sandbox.clear();
                        println!("Grid cleared.");
                    }
                    "reset" => {
                        let w = parse_at(&parts, 1).unwrap_or(sandbox.grid().width());
                        let h = parse_at(&parts, 2).unwrap_or(sandbox.grid().height());
                        match sandbox.resize(w, h) {
                            Ok(()) => println!("Grid resized to {}x{} (cleared).", w, h),
                            Err(e) => println!("Resize failed: {}", e),
                        }
                    }
                    "help" | "?" => show_help(),
                    "quit" | "q" | "exit" => {
                        println!("Goodbye!");
                        break;
                    }
                    _ => println!(
                        "Unknown command: {}. Type 'help' for available commands.",
                        parts[0]
                    ),
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("^C");
                break;
            }
            Err(ReadlineError::Eof) => {
                println!("^D");
                break;
            }
            Err(err) => {
                eprintln!("Error: {:?}", err);
                break;
            }
        }
    }
}

/// Prompt user for grid dimensions at startup
fn prompt_grid_dimensions() -> (usize, usize) {
    println!("Enter grid dimensions (or press Enter for defaults):");
    let width = prompt_usize("  Width in cells", DEFAULT_WIDTH);
    let height = prompt_usize("  Height in cells", DEFAULT_HEIGHT);
    println!();
    (width.clamp(4, 400), height.clamp(4, 400))
}

fn prompt_usize(label: &str, default: usize) -> usize {
    print!("{} [{}]: ", label, default);
    let _ = io::stdout().flush();
    let mut input = String::new();
    if io::stdin().read_line(&mut input).is_err() {
        return default;
    }
    input.trim().parse().unwrap_or(default)
}

fn parse_at<T: std::str::FromStr>(parts: &[&str], index: usize) -> Option<T> {
    parts.get(index).and_then(|s| s.parse().ok())
}

fn step_rules(sandbox: &mut Sandbox, count: u32) {
    let before = sandbox.material_counts();
    let start = Instant::now();
    for _ in 0..count {
        sandbox.step_simulation();
    }
    let after = sandbox.material_counts();
    println!(
        "Ran {} pass(es) in {}us. {} -> {}",
        count,
        start.elapsed().as_micros(),
        before,
        after
    );
}

fn paint(sandbox: &mut Sandbox, parts: &[&str]) {
    let Some(material) = parts.get(1).and_then(|s| s.parse::<Material>().ok()) else {
        println!("Usage: paint <sand|wet|water|empty> <x> <y> [radius]");
        return;
    };
    let (Some(x), Some(y)) = (parse_at::<f32>(parts, 2), parse_at::<f32>(parts, 3)) else {
        println!("Usage: paint <sand|wet|water|empty> <x> <y> [radius]");
        return;
    };
    if let Some(radius) = parse_at::<f32>(parts, 4) {
        let n = sandbox.paint_disc(Vec2::new(x, y), radius, material);
        println!("Painted {} cell(s) of {}", n, material);
    } else {
        sandbox.paint(x as i32, y as i32, material);
        println!("Painted {} at ({}, {})", material, x as i32, y as i32);
    }
}

fn erase(sandbox: &mut Sandbox, parts: &[&str]) {
    let (Some(x), Some(y)) = (parse_at::<f32>(parts, 1), parse_at::<f32>(parts, 2)) else {
        println!("Usage: erase <x> <y> [radius]");
        return;
    };
    let radius = parse_at::<f32>(parts, 3).unwrap_or(0.0);
    let n = sandbox.erase_disc(Vec2::new(x, y), radius);
    println!("Erased {} cell(s)", n);
}

fn drive(sandbox: &mut Sandbox, input: HapticInput, count: u32) {
    for i in 0..count {
        let tick = sandbox.step_haptics(input);
        if i + 1 == count || tick.displaced > 0 {
            println!(
                "  Tick {}: R={:.3} R~={:.3} v={:.3} displaced={} F=({:.3}, {:.3}) F1={:.4}",
                i + 1,
                tick.raw_resistance,
                tick.smoothed_resistance,
                tick.viscosity,
                tick.displaced,
                tick.force.x,
                tick.force.y,
                tick.force_1d.value()
            );
        }
    }
    let h = sandbox.haptics();
    println!(
        "Proxy ({:.2}, {:.2})  Device ({:.2}, {:.2})",
        h.proxy().x,
        h.proxy().y,
        h.device().x,
        h.device().y
    );
}

fn run_frames(sandbox: &mut Sandbox, frames: u32, dt: Duration) {
    let mut sim_ticks = 0;
    let mut haptic_ticks = 0;
    for _ in 0..frames {
        let report = sandbox.frame(dt, HapticInput::Hold);
        sim_ticks += report.simulation_ticks;
        haptic_ticks += report.haptic_ticks;
    }
    println!(
        "{} frame(s): {} rule pass(es), {} haptic tick(s). {}",
        frames,
        sim_ticks,
        haptic_ticks,
        sandbox.material_counts()
    );
}

fn probe(sandbox: &Sandbox, parts: &[&str]) {
    let (Some(x), Some(y)) = (parse_at::<f32>(parts, 1), parse_at::<f32>(parts, 2)) else {
        println!("Usage: probe <x> <y> [radius]");
        return;
    };
    let radius = parse_at::<f32>(parts, 3).unwrap_or(sandbox.haptics().config().radius);
    let r = sandbox
        .grid()
        .resistance(x, y, radius, sandbox.haptics().weights());
    let cell = sandbox.grid().get(x as i32, y as i32);
    println!(
        "Resistance at ({:.1}, {:.1}) r={:.1}: {:.4}  (cell: {}, soak {})",
        x,
        y,
        radius,
        r,
        cell.material(),
        cell.soak()
    );
}

fn set_param(sandbox: &mut Sandbox, parts: &[&str]) {
    let (Some(name), Some(value)) = (parts.get(1).copied(), parse_at::<f32>(parts, 2)) else {
        println!("Usage: set <friction|stiffness|radius|scale|smoothing|delay> <value>");
        return;
    };
    if name == "delay" {
        if let Err(e) = sandbox.set_tick_delay(value) {
            println!("Rejected: {}", e);
        }
        return;
    }
    let mut config = *sandbox.haptics().config();
    match name {
        "friction" => config.friction_coefficient = value,
        "stiffness" | "k" => config.spring_stiffness = value,
        "radius" => config.radius = value,
        "scale" => config.hapkit_scale = value,
        "smoothing" | "alpha" => config.smoothing = value,
        _ => {
            println!("Unknown parameter: {}", name);
            return;
        }
    }
    match sandbox.reconfigure_haptics(config) {
        Ok(()) => println!("{} = {}", name, value),
        Err(e) => println!("Rejected: {}", e),
    }
}

fn show_grid(sandbox: &Sandbox) {
    let snapshot = sandbox.snapshot();
    let threshold = sandbox.rules().soak_threshold();
    let mut rows = vec![vec!['.'; snapshot.width]; snapshot.height];
    for cell in &snapshot.cells {
        rows[cell.y as usize][cell.x as usize] = match cell.material {
            Material::Sand => '#',
            Material::WetSand if cell.soak >= threshold => '@',
            Material::WetSand => '%',
            Material::Water => '~',
            Material::Empty => '.',
        };
    }
    for (pos, glyph) in [(snapshot.anchor, '+'), (snapshot.device, 'D'), (snapshot.proxy, 'P')] {
        let (x, y) = (pos.x.floor(), pos.y.floor());
        if x >= 0.0 && y >= 0.0 && (x as usize) < snapshot.width && (y as usize) < snapshot.height {
            rows[y as usize][x as usize] = glyph;
        }
    }
    for row in rows {
        println!("{}", row.into_iter().collect::<String>());
    }
    println!("# sand  % wet  @ saturated  ~ water  P proxy  D device  + anchor");
}

fn show_status(sandbox: &Sandbox) {
    let h = sandbox.haptics();
    println!("\n═══════════════ SANDBOX STATUS ═══════════════");
    println!(
        "Grid:          {}x{}",
        sandbox.grid().width(),
        sandbox.grid().height()
    );
    println!("Contents:      {}", sandbox.material_counts());
    println!("Rule passes:   {}", sandbox.simulation_ticks());
    println!("Tick delay:    {:.1} ms", sandbox.tick_delay_ms());
    println!("Mode / axis:   {:?} / {:?}", h.mode(), h.axis());
    println!("Anchor:        ({:.2}, {:.2})", h.anchor().x, h.anchor().y);
    println!("Proxy:         ({:.2}, {:.2})", h.proxy().x, h.proxy().y);
    println!("Device:        ({:.2}, {:.2})", h.device().x, h.device().y);
    println!("Handle input:  {}", h.raw_input());
    println!("Smoothed R:    {:.4}", h.smoothed_resistance());
    println!("Force:         ({:.4}, {:.4})", h.force().x, h.force().y);
    println!("Force (rail):  {}", h.force_1d());
    println!(
        "Tuning:        friction {:.2}, k {:.3}, radius {:.1}, scale {:.0}, alpha {:.2}",
        h.config().friction_coefficient,
        h.config().spring_stiffness,
        h.config().radius,
        h.config().hapkit_scale,
        h.config().smoothing
    );
    println!("═══════════════════════════════════════════════\n");
}

fn show_help() {
    println!("\n═══════════════ AVAILABLE COMMANDS ═══════════════");
    println!("  step [n], s [n]            - Run n rule passes (default 1)");
    println!("  paint <m> <x> <y> [r], p   - Paint sand|wet|water|empty (disc if r given)");
    println!("  erase <x> <y> [r], e       - Erase a cell or disc");
    println!("  move <x> <y> [n], m        - n haptic ticks with the pointer at (x, y)");
    println!("  handle <meters> [n], hd    - n haptic ticks with a handle reading");
    println!("  hold [n], h                - n haptic ticks with no new input");
    println!("  run <frames> [ms], r       - Advance the frame clock (default 16 ms)");
    println!("  probe <x> <y> [r], pr      - Resistance at a point");
    println!("  recenter <x> <y>, rc       - Move anchor, proxy and device");
    println!("  mode <1d|2d>               - Rail or free pointer");
    println!("  axis <x|y>                 - Rail axis in 1-DOF mode");
    println!("  set <param> <value>        - friction, stiffness, radius, scale, smoothing, delay");
    println!("  show, g                    - Print the grid");
    println!("  status, st                 - Show sandbox status");
    println!("  clear, c                   - Empty the grid");
    println!("  reset [w] [h]              - Resize (and clear) the grid");
    println!("  help, ?                    - Show this help");
    println!("  quit, q                    - Exit");
    println!("══════════════════════════════════════════════════\n");
}
