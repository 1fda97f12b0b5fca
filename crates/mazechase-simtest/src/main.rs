//! MazeChase Headless Simulation Harness
//!
//! Validates grid navigation and agent behaviour against a maze loaded from
//! JSON. Runs entirely in-process with an in-memory collider set standing in
//! for physics.
//!
//! Usage:
//!   cargo run -p mazechase-simtest
//!   cargo run -p mazechase-simtest -- --verbose

use std::collections::HashMap;

use mazechase_core::prelude::*;
use mazechase_logic::grid::DIRECTIONS;
use mazechase_logic::pathfinding::{repair_to_walkable, PathOutcome, Pathfinder};
use mazechase_logic::state::StateSignal;
use serde::Deserialize;
use tracing_subscriber::EnvFilter;

// ── Maze fixture ────────────────────────────────────────────────────────
const MAZE_JSON: &str = include_str!("../../../data/maze.json");

#[derive(Debug, Deserialize)]
struct MazeSpec {
    name: String,
    layout: Vec<String>,
    #[serde(default)]
    config: ChaseConfig,
    agents: Vec<AgentSpec>,
    /// Corners the protagonist loops through
    route: Vec<GridCoord>,
    route_cell_seconds: f32,
    power_mode_at: Vec<f32>,
    duration_seconds: f32,
    tick_seconds: f32,
}

#[derive(Debug, Deserialize)]
struct AgentSpec {
    personality: Personality,
    home: GridCoord,
}

impl MazeSpec {
    fn layout_text(&self) -> String {
        self.layout.join("\n")
    }
}

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

fn check(name: &str, passed: bool, detail: impl Into<String>) -> TestResult {
    TestResult {
        name: name.into(),
        passed,
        detail: detail.into(),
    }
}

fn main() {
    let verbose = std::env::args().any(|a| a == "--verbose");
    init_tracing(verbose);
    println!("=== MazeChase Simulation Harness ===\n");

    let mut results = Vec::new();

    let maze = match serde_json::from_str::<MazeSpec>(MAZE_JSON) {
        Ok(m) => Some(m),
        Err(e) => {
            results.push(check("maze_parse", false, format!("JSON parse error: {}", e)));
            None
        }
    };

    if let Some(maze) = &maze {
        log::info!("Loaded maze '{}' ({} agents)", maze.name, maze.agents.len());

        // 1. Maze data validation
        results.extend(validate_maze(maze));

        // 2. Occupancy scan against the collider stand-in
        results.extend(validate_scan(maze));
    }

    // 3. Pathfinding scenarios
    results.extend(validate_pathfinding());

    // 4. State machine closure
    results.extend(validate_state_machine());

    if let Some(maze) = &maze {
        // 5. Full scripted session
        results.extend(validate_session(maze, verbose));

        // 6. Dynamic walls
        results.extend(validate_dynamic_walls(maze));
    }

    // ── Summary ──
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

    for r in &results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || verbose {
            println!("  {} {}: {}", icon, r.name, r.detail);
        }
    }

    println!(
        "\n=== RESULT: {}/{} passed, {} failed ===",
        passed, total, failed
    );

    if failed > 0 {
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

fn build_engine(maze: &MazeSpec) -> Option<ChaseEngine> {
    let oracle = ColliderSet::from_layout(&maze.layout_text(), maze.config.grid.cell_size, maze.config.grid.origin);
    let (mut engine, _report) = ChaseEngine::from_scan(maze.config.clone(), &oracle).ok()?;
    for agent in &maze.agents {
        engine.spawn_agent(agent.personality, agent.home);
    }
    Some(engine)
}

/// Cell-by-cell loop through the route corners
fn expand_route(grid: &GridModel, corners: &[GridCoord]) -> Vec<GridCoord> {
    let pathfinder = Pathfinder::default();
    let mut cells = Vec::new();
    let Some(&first) = corners.first() else {
        return cells;
    };
    cells.push(first);
    let mut current = first;
    for &next in corners.iter().skip(1).chain(std::iter::once(&first)) {
        let leg = pathfinder.find_cell_path(grid, current, next);
        cells.extend(leg.iter().copied());
        current = next;
    }
    // The loop closes on the first cell; drop the duplicate.
    if cells.len() > 1 && cells.last() == Some(&first) {
        cells.pop();
    }
    cells
}

/// Protagonist kinematics at `time` along a looping cell route
fn protagonist_at(grid: &GridModel, route: &[GridCoord], cell_seconds: f32, time: f32) -> ProtagonistState {
    if route.is_empty() {
        return ProtagonistState::default();
    }
    let steps = time / cell_seconds;
    let index = steps.floor() as usize % route.len();
    let frac = steps.fract();
    let here = grid.cell_center(route[index]);
    let next = grid.cell_center(route[(index + 1) % route.len()]);
    let velocity = (next - here) * (1.0 / cell_seconds);
    ProtagonistState::new(here + (next - here) * frac, velocity)
}

fn single_axis_steps(start: GridCoord, path: &[GridCoord]) -> bool {
    let mut prev = start;
    for &c in path {
        if prev.manhattan(&c) != 1 {
            return false;
        }
        prev = c;
    }
    true
}

// ── 1. Maze Data ────────────────────────────────────────────────────────

fn validate_maze(maze: &MazeSpec) -> Vec<TestResult> {
    println!("--- Maze Data ---");
    let mut results = Vec::new();

    results.push(match maze.config.validate() {
        Ok(()) => check("maze_config_valid", true, "config passes validation"),
        Err(e) => check("maze_config_valid", false, e.to_string()),
    });

    let grid = match GridModel::from_ascii(&maze.layout_text(), maze.config.grid.cell_size, maze.config.grid.origin) {
        Ok(g) => g,
        Err(e) => {
            results.push(check("maze_layout_parse", false, e.to_string()));
            return results;
        }
    };
    results.push(check(
        "maze_layout_parse",
        true,
        format!("{}x{}, {} walkable", grid.width(), grid.height(), grid.walkable_count()),
    ));

    let dims_match = grid.width() == maze.config.grid.width && grid.height() == maze.config.grid.height;
    results.push(check(
        "maze_dimensions_match_config",
        dims_match,
        format!(
            "layout {}x{}, config {}x{}",
            grid.width(),
            grid.height(),
            maze.config.grid.width,
            maze.config.grid.height
        ),
    ));

    let bad_homes: Vec<_> = maze.agents.iter().filter(|a| !grid.is_walkable_at(a.home)).collect();
    results.push(check(
        "maze_homes_walkable",
        bad_homes.is_empty(),
        if bad_homes.is_empty() {
            format!("{} homes on open floor", maze.agents.len())
        } else {
            format!("{} homes inside walls", bad_homes.len())
        },
    ));

    let bad_route: Vec<_> = maze.route.iter().filter(|c| !grid.is_walkable_at(**c)).collect();
    results.push(check(
        "maze_route_walkable",
        bad_route.is_empty() && maze.route.len() >= 2,
        format!("{} route corners, {} blocked", maze.route.len(), bad_route.len()),
    ));

    // Every walkable cell reachable from the first home
    let connected = match maze.agents.first() {
        Some(a) => {
            let pathfinder = Pathfinder::default();
            grid.walkable_cells()
                .iter()
                .filter(|&&c| c != a.home)
                .all(|&c| !pathfinder.find_cell_path(&grid, a.home, c).is_empty())
        }
        None => false,
    };
    results.push(check(
        "maze_connected",
        connected,
        "every walkable cell reachable from the first home",
    ));

    let positive_timing = maze.tick_seconds > 0.0 && maze.route_cell_seconds > 0.0 && maze.duration_seconds > 0.0;
    results.push(check(
        "maze_timing_positive",
        positive_timing,
        format!(
            "tick {}s, route {}s/cell, {}s session",
            maze.tick_seconds, maze.route_cell_seconds, maze.duration_seconds
        ),
    ));

    results
}

// ── 2. Occupancy Scan ───────────────────────────────────────────────────

fn validate_scan(maze: &MazeSpec) -> Vec<TestResult> {
    println!("--- Occupancy Scan ---");
    let mut results = Vec::new();
    let grid_config = &maze.config.grid;
    let layout = maze.layout_text();

    let expected = match GridModel::from_ascii(&layout, grid_config.cell_size, grid_config.origin) {
        Ok(g) => g,
        Err(_) => return results,
    };

    let oracle = ColliderSet::from_layout(&layout, grid_config.cell_size, grid_config.origin);
    match ChaseEngine::from_scan(maze.config.clone(), &oracle) {
        Ok((engine, report)) => {
            results.push(check(
                "scan_no_warning",
                report.warning.is_none(),
                format!("{} walkable, {} blocked", report.walkable, report.blocked),
            ));
            results.push(check(
                "scan_matches_layout",
                engine.grid().to_ascii() == expected.to_ascii(),
                "scanned grid equals the drawn layout",
            ));
        }
        Err(e) => results.push(check("scan_engine_build", false, e.to_string())),
    }

    // Pellets and parked agents don't block
    let mut cluttered = oracle.clone();
    for cell in expected.walkable_cells() {
        cluttered.add(
            expected.cell_center(cell),
            Vec3::new(0.1, 0.1, 0.1),
            Classification::Collectible,
        );
    }
    if let Ok((engine, _)) = ChaseEngine::from_scan(maze.config.clone(), &cluttered) {
        results.push(check(
            "scan_ignores_collectibles",
            engine.grid().walkable_count() == expected.walkable_count(),
            format!("{} pellets placed", expected.walkable_count()),
        ));
    }

    // Missing obstacles are reported, not corrected
    if let Ok((engine, report)) = ChaseEngine::from_scan(maze.config.clone(), &ColliderSet::new()) {
        results.push(check(
            "scan_warns_on_empty_world",
            report.warning == Some(ScanWarning::NoBlockedCells) && engine.grid().blocked_count() == 0,
            format!("warning {:?}", report.warning),
        ));
    }

    results
}

// ── 3. Pathfinding ──────────────────────────────────────────────────────

fn validate_pathfinding() -> Vec<TestResult> {
    println!("--- Pathfinding ---");
    let mut results = Vec::new();
    let pathfinder = Pathfinder::default();

    // Straight corridor
    if let Ok(corridor) = GridModel::new(10, 1, 1.0, Vec3::ZERO) {
        let path = pathfinder.find_path(&corridor, corridor.grid_to_world(0, 0), corridor.grid_to_world(9, 0));
        let stepwise = path
            .windows(2)
            .all(|w| (w[1].x - w[0].x - 1.0).abs() < 1e-5 && w[1].z == w[0].z);
        results.push(check(
            "pathfind_corridor",
            path.len() == 9 && stepwise && path.last() == Some(&corridor.grid_to_world(9, 0)),
            format!("10x1 corridor → {} waypoints", path.len()),
        ));
    }

    // Single obstacle
    if let Ok(mut grid) = GridModel::new(3, 3, 1.0, Vec3::ZERO) {
        grid.set_cell(1, 1, false);
        let start = GridCoord::new(0, 0);
        let path = pathfinder.find_cell_path(&grid, start, GridCoord::new(2, 2));
        results.push(check(
            "pathfind_single_obstacle",
            path.len() == 4 && !path.contains(&GridCoord::new(1, 1)) && single_axis_steps(start, &path),
            format!("3x3 detour → {} steps", path.len()),
        ));
    }

    // Walled-in goal
    if let Ok(mut grid) = GridModel::new(9, 9, 1.0, Vec3::ZERO) {
        let goal = GridCoord::new(4, 4);
        for (dx, dz) in DIRECTIONS {
            grid.set_cell(goal.x + dx, goal.z + dz, false);
        }
        let (path, stats) = pathfinder.find_cell_path_with_stats(&grid, GridCoord::new(0, 0), goal);
        results.push(check(
            "pathfind_unreachable",
            path.is_empty() && stats.outcome == PathOutcome::Unreachable,
            format!("{:?} after {} expansions", stats.outcome, stats.expansions),
        ));
    }

    // Blocked endpoints get repaired
    if let Ok(mut grid) = GridModel::new(7, 7, 1.0, Vec3::ZERO) {
        for z in 2..5 {
            for x in 2..5 {
                grid.set_cell(x, z, false);
            }
        }
        let inside = GridCoord::new(3, 3);
        let repaired = repair_to_walkable(&grid, inside, 10);
        results.push(check(
            "repair_nearest_walkable",
            repaired.map(|c| c.manhattan(&inside)) == Some(2),
            format!("(3, 3) → {:?}", repaired),
        ));

        grid.fill(false);
        let none = repair_to_walkable(&grid, inside, 10);
        results.push(check(
            "repair_gives_up",
            none.is_none(),
            "fully blocked grid → no repair",
        ));
    }

    // Budget holds on a full-size maze
    if let Ok(grid) = GridModel::new(28, 31, 1.0, Vec3::ZERO) {
        let (path, stats) =
            pathfinder.find_cell_path_with_stats(&grid, GridCoord::new(0, 0), GridCoord::new(27, 30));
        results.push(check(
            "pathfind_budget",
            path.len() == 57 && stats.expansions <= grid.len(),
            format!("{} steps, {} expansions of {} allowed", path.len(), stats.expansions, grid.len()),
        ));
    }

    results
}

// ── 4. State Machine ────────────────────────────────────────────────────

fn validate_state_machine() -> Vec<TestResult> {
    println!("--- State Machine ---");
    let mut results = Vec::new();

    let states = [AgentState::Normal, AgentState::Frightened, AgentState::Eaten];
    let signals = [
        StateSignal::PowerModeStarted,
        StateSignal::PowerModeEnded,
        StateSignal::ProtagonistContact,
        StateSignal::ReachedHome,
    ];

    let mut violations = Vec::new();
    for state in states {
        for signal in signals {
            let next = state.on_signal(signal).next;
            if !state.successors().contains(&next) {
                violations.push(format!("{:?} --{:?}--> {:?}", state, signal, next));
            }
        }
    }
    results.push(check(
        "state_closure",
        violations.is_empty(),
        if violations.is_empty() {
            "every transition stays within successors".to_string()
        } else {
            violations.join(", ")
        },
    ));

    let never_skips = signals
        .iter()
        .all(|&s| AgentState::Normal.on_signal(s).next != AgentState::Eaten);
    results.push(check("state_normal_never_eaten", never_skips, "Normal never jumps to Eaten"));

    let speed = ChaseConfig::default().speed;
    let ordered = AgentState::Frightened.speed(&speed) < AgentState::Normal.speed(&speed)
        && AgentState::Normal.speed(&speed) < AgentState::Eaten.speed(&speed);
    results.push(check(
        "state_speed_ordering",
        ordered,
        format!(
            "frightened {} < normal {} < eaten {}",
            AgentState::Frightened.speed(&speed),
            AgentState::Normal.speed(&speed),
            AgentState::Eaten.speed(&speed)
        ),
    ));

    results
}

// ── 5. Scripted Session ─────────────────────────────────────────────────

fn validate_session(maze: &MazeSpec, verbose: bool) -> Vec<TestResult> {
    println!("--- Scripted Session ---");
    let mut results = Vec::new();

    let Some(mut engine) = build_engine(maze) else {
        results.push(check("session_build", false, "engine could not be built"));
        return results;
    };
    let route = expand_route(engine.grid(), &maze.route);
    results.push(check(
        "session_route",
        route.len() >= maze.route.len()
            && route.first().map_or(false, |&start| single_axis_steps(start, &route[1..])),
        format!("{} cells per lap", route.len()),
    ));

    let ticks = (maze.duration_seconds / maze.tick_seconds).ceil() as usize;
    let mut power_schedule: Vec<f32> = maze.power_mode_at.clone();
    power_schedule.sort_by(|a, b| a.total_cmp(b));
    let mut next_power = 0;

    let mut diagonal_moves = 0;
    let mut wall_visits = 0;
    let mut moved = HashMap::new();
    let mut eaten_pending: HashMap<Entity, usize> = HashMap::new();
    let mut orphan_respawns = 0;
    let mut tallies: HashMap<NotificationKind, usize> = HashMap::new();
    let mut power_starts = 0;
    let mut power_expired = 0;
    let mut was_active = false;

    let mut previous = engine.agents();
    let mut time = 0.0f32;
    for _ in 0..ticks {
        if next_power < power_schedule.len() && time >= power_schedule[next_power] {
            engine.power_mode_started();
            power_starts += 1;
            next_power += 1;
        }

        let protagonist = protagonist_at(engine.grid(), &route, maze.route_cell_seconds, time);
        engine.update(maze.tick_seconds, &protagonist);
        time += maze.tick_seconds;

        if was_active && !engine.power_mode_active() {
            power_expired += 1;
        }
        was_active = engine.power_mode_active();

        let current = engine.agents();
        for (before, after) in previous.iter().zip(current.iter()) {
            let dx = (after.position.x - before.position.x).abs();
            let dz = (after.position.z - before.position.z).abs();
            if dx > 0.0 && dz > 0.0 {
                diagonal_moves += 1;
            }
            if !engine.grid().is_walkable_at(after.cell) {
                wall_visits += 1;
            }
            *moved.entry(after.entity).or_insert(0.0f32) += dx + dz;
        }
        previous = current;

        for notification in engine.drain_notifications() {
            *tallies.entry(notification.kind).or_insert(0) += 1;
            match notification.kind {
                NotificationKind::AgentEaten => *eaten_pending.entry(notification.entity).or_insert(0) += 1,
                NotificationKind::AgentRespawned => match eaten_pending.get_mut(&notification.entity) {
                    Some(n) if *n > 0 => *n -= 1,
                    _ => orphan_respawns += 1,
                },
                NotificationKind::CaughtProtagonist => {}
            }
            if verbose {
                println!("  [{:>6.2}s] {:?} {:?}", time, notification.kind, notification.entity);
            }
        }
    }

    results.push(check(
        "session_no_diagonal_moves",
        diagonal_moves == 0,
        format!("{} diagonal moves over {} ticks", diagonal_moves, ticks),
    ));
    results.push(check(
        "session_stays_in_corridors",
        wall_visits == 0,
        format!("{} agent-ticks inside walls", wall_visits),
    ));

    let idle_agents = moved.values().filter(|&&d| d < 1.0).count();
    results.push(check(
        "session_all_agents_move",
        idle_agents == 0 && moved.len() == maze.agents.len(),
        format!("{} of {} agents stayed put", idle_agents, moved.len()),
    ));
    results.push(check(
        "session_respawn_follows_eaten",
        orphan_respawns == 0,
        format!(
            "{} eaten, {} respawned, {} caught",
            tallies.get(&NotificationKind::AgentEaten).copied().unwrap_or(0),
            tallies.get(&NotificationKind::AgentRespawned).copied().unwrap_or(0),
            tallies.get(&NotificationKind::CaughtProtagonist).copied().unwrap_or(0)
        ),
    ));

    let expect_expiry = maze.config.session.power_mode_duration.is_some();
    results.push(check(
        "session_power_mode_expires",
        power_starts == power_schedule.len() && (!expect_expiry || power_expired >= 1),
        format!("{} starts, {} expiries", power_starts, power_expired),
    ));

    results
}

// ── 6. Dynamic Walls ────────────────────────────────────────────────────

fn validate_dynamic_walls(maze: &MazeSpec) -> Vec<TestResult> {
    println!("--- Dynamic Walls ---");
    let mut results = Vec::new();

    let mut config = maze.config.clone();
    config.session.contact_radius = None;
    let oracle = ColliderSet::from_layout(&maze.layout_text(), config.grid.cell_size, config.grid.origin);
    let Ok((mut engine, _)) = ChaseEngine::from_scan(config, &oracle) else {
        results.push(check("walls_build", false, "engine could not be built"));
        return results;
    };

    let Some(entry) = maze.agents.first() else {
        return results;
    };
    let agent = engine.spawn_agent(Personality::Chaser, entry.home);
    let Some(&goal) = maze.route.first() else {
        return results;
    };
    let protagonist = ProtagonistState::at(engine.grid().cell_center(goal));

    engine.update(maze.tick_seconds, &protagonist);
    let planned = engine.agent(agent).map(|v| v.remaining).unwrap_or_default();

    // Drop a wall two cells further along the planned path
    let Some(&wall) = planned.get(2) else {
        results.push(check("walls_initial_path", false, "no initial path"));
        return results;
    };
    engine.set_cell(wall, false);

    let mut entered_wall = false;
    let mut arrived = false;
    for _ in 0..(30.0 / maze.tick_seconds) as usize {
        engine.update(maze.tick_seconds, &protagonist);
        let Some(view) = engine.agent(agent) else { break };
        if view.cell == wall {
            entered_wall = true;
        }
        if view.cell == goal {
            arrived = true;
            break;
        }
    }

    results.push(check(
        "walls_never_entered",
        !entered_wall,
        format!("wall dropped at {}", wall),
    ));
    results.push(check(
        "walls_detour_reaches_goal",
        arrived,
        format!("agent reached {} around the wall", goal),
    ));

    // Reopening restores the original route length
    engine.set_cell(wall, true);
    let restored = engine
        .pathfinder()
        .find_cell_path(engine.grid(), entry.home, goal);
    results.push(check(
        "walls_reopen",
        restored.len() == planned.len(),
        format!("{} cells after reopening, {} before the wall", restored.len(), planned.len()),
    ));

    results
}
