//! End-to-end behaviour of the rule engine and the haptic loop
use approx::assert_relative_eq;
use sand_haptics_core::{
    ControlMode, FixedTieBreak, HapticConfig, HapticInput, Material, MaterialCounts, RuleEngine,
    SandGrid, Sandbox, SandboxConfig, Vec2,
};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn pass(grid: &mut SandGrid) {
    RuleEngine::default().step(grid, &mut FixedTieBreak::AlwaysLeft);
}

#[test]
fn test_single_sand_falls_one_row() {
    init_tracing();
    let mut grid = SandGrid::new(10, 10).unwrap();
    grid.set(5, 0, Material::Sand, 0);
    pass(&mut grid);
    assert_eq!(grid.material(5, 1), Material::Sand);
    assert_eq!(grid.material(5, 0), Material::Empty);
}

#[test]
fn test_isolated_sand_never_double_falls() {
    let mut grid = SandGrid::new(10, 10).unwrap();
    grid.set(5, 0, Material::Sand, 0);
    for expected_row in 1..10 {
        pass(&mut grid);
        let cells: Vec<_> = grid.occupied().collect();
        assert_eq!(cells.len(), 1);
        assert_eq!((cells[0].0.x, cells[0].0.y), (5, expected_row));
    }
    // Resting on the floor
    pass(&mut grid);
    assert_eq!(grid.material(5, 9), Material::Sand);
}

#[test]
fn test_sand_sinks_through_water() {
    let mut grid = SandGrid::new(10, 10).unwrap();
    grid.set(5, 0, Material::Sand, 0);
    grid.set(5, 1, Material::Water, 0);
    // The sand rule on its own swaps with the water below
    RuleEngine::default().update_cell(&mut grid, 5, 0, &mut FixedTieBreak::AlwaysLeft);
    assert_eq!(grid.material(5, 0), Material::Water);
    assert_eq!(grid.material(5, 1), Material::Sand);
}

#[test]
fn test_full_pass_wets_sand_resting_on_water() {
    // Bottom-up order visits the water first, so wetting wins over the swap
    let mut grid = SandGrid::new(10, 10).unwrap();
    grid.set(5, 0, Material::Sand, 0);
    grid.set(5, 1, Material::Water, 0);
    pass(&mut grid);
    assert_eq!(grid.material(5, 0), Material::Empty);
    assert_eq!(grid.material(5, 1), Material::WetSand);
    assert_eq!(grid.get(5, 1).soak(), 1);
    assert_eq!(
        grid.material_counts(),
        MaterialCounts {
            sand: 0,
            wet_sand: 1,
            water: 0
        }
    );
}

#[test]
fn test_water_beside_sand_is_absorbed() {
    let mut grid = SandGrid::new(10, 10).unwrap();
    grid.set(4, 9, Material::Sand, 0);
    grid.set(5, 9, Material::Water, 0);
    pass(&mut grid);
    assert_eq!(grid.material(5, 9), Material::Empty);
    assert_eq!(grid.material(4, 9), Material::WetSand);
    assert_eq!(grid.get(4, 9).soak(), 1);
}

#[test]
fn test_sand_column_soaks_up_pool() {
    // Six water cells over a two-cell sand floor: each sand cell takes at
    // most `soak_threshold` increments, the rest of the water survives
    let mut grid = SandGrid::new(2, 6).unwrap();
    grid.set(0, 5, Material::Sand, 0);
    grid.set(1, 5, Material::Sand, 0);
    for y in 0..3 {
        grid.set(0, y, Material::Water, 0);
        grid.set(1, y, Material::Water, 0);
    }
    for _ in 0..20 {
        pass(&mut grid);
    }
    let counts = grid.material_counts();
    assert_eq!(counts.sand, 0);
    assert_eq!(counts.wet_sand, 2);
    assert_eq!(counts.water, 2);
    assert_eq!(grid.get(0, 5).soak(), 2);
    assert_eq!(grid.get(1, 5).soak(), 2);
}

fn two_dof_sandbox(friction: f32) -> Sandbox<FixedTieBreak> {
    let cfg = SandboxConfig {
        width: 40,
        height: 40,
        haptics: HapticConfig {
            mode: ControlMode::TwoDof,
            friction_coefficient: friction,
            initial_anchor: Vec2::new(10.0, 10.0),
            ..Default::default()
        },
        ..Default::default()
    };
    Sandbox::with_tie_break(cfg, FixedTieBreak::AlwaysLeft).unwrap()
}

#[test]
fn test_proxy_reaches_device_in_empty_medium() {
    init_tracing();
    let mut sb = two_dof_sandbox(1.0);
    let tick = sb.step_haptics(HapticInput::Pointer(Vec2::new(25.0, 14.5)));
    assert_eq!(tick.viscosity, 1.0);
    assert_eq!(sb.haptics().proxy(), sb.haptics().device());
    assert_eq!(sb.haptics().force(), Vec2::zeros());
}

#[test]
fn test_zero_force_when_proxy_on_device() {
    let cfg = SandboxConfig {
        haptics: HapticConfig {
            spring_stiffness: 1000.0,
            ..Default::default()
        },
        ..Default::default()
    };
    let mut sb = Sandbox::with_tie_break(cfg, FixedTieBreak::AlwaysRight).unwrap();
    let tick = sb.step_haptics(HapticInput::Hold);
    assert_eq!(tick.force, Vec2::zeros());
    assert_eq!(sb.force_1d().value(), 0.0);
}

#[test]
fn test_probe_ploughs_through_sand_bed() {
    let mut sb = two_dof_sandbox(5.0);
    for y in 20..40 {
        for x in 0..40 {
            sb.paint(x, y, Material::Sand);
        }
    }
    let before = sb.material_counts();

    // Start above the bed and drive the device down into it
    sb.recenter(Vec2::new(20.0, 12.0));
    let mut max_force: f32 = 0.0;
    for step in 0..20 {
        let target = Vec2::new(20.0, 12.0 + step as f32);
        let tick = sb.step_haptics(HapticInput::Pointer(target));
        max_force = max_force.max(tick.force.norm());
        assert_eq!(sb.material_counts(), before);
    }

    let h = sb.haptics();
    assert!(h.proxy().y < h.device().y, "proxy should lag inside the bed");
    assert!(h.smoothed_resistance() > 0.0);
    assert!(max_force > 0.0);
    // Force points along +y: (proxy - device) * -k with the device ahead
    assert!(h.force().y > 0.0);
    assert_relative_eq!(h.force().y, (h.device().y - h.proxy().y) * 0.5, epsilon = 1e-4);
}

#[test]
fn test_frame_clock_drives_rules_and_haptics() {
    let mut sb = two_dof_sandbox(1.0);
    sb.paint(30, 0, Material::Sand);
    let mut sim_ticks = 0;
    for _ in 0..10 {
        let report = sb.frame(Duration::from_millis(8), HapticInput::Hold);
        sim_ticks += report.simulation_ticks;
        assert_eq!(report.haptic_ticks, 1);
    }
    assert_eq!(sim_ticks, 5);
    assert_eq!(sb.grid().material(30, 5), Material::Sand);
}
