//! Chase engine - main entry point for running the agents

use hecs::{Entity, World};
use mazechase_logic::config::{ChaseConfig, ConfigError};
use mazechase_logic::grid::{GridCoord, GridModel};
use mazechase_logic::movement::MotorPhase;
use mazechase_logic::pathfinding::Pathfinder;
use mazechase_logic::state::{AgentState, StateSignal, Transition};
use mazechase_logic::targeting::Personality;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;

use crate::components::*;
use crate::protagonist::Protagonist;
use crate::systems::*;

/// Read-only snapshot of one agent
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgentView {
    #[serde(skip)]
    pub entity: Entity,
    pub personality: Personality,
    pub state: AgentState,
    pub position: Vec3,
    pub cell: GridCoord,
    pub home: GridCoord,
    pub phase: MotorPhase,
    pub waypoint: Option<GridCoord>,
    /// Current waypoint followed by the rest of the path
    pub remaining: Vec<GridCoord>,
    pub speed: f32,
}

/// Owns the grid, the agents and everything that ticks them
pub struct ChaseEngine {
    /// ECS world containing all agents
    pub world: World,
    grid: GridModel,
    pathfinder: Pathfinder,
    config: ChaseConfig,
    rng: StdRng,
    notifications: NotificationQueue,
    /// Seconds until power mode ends on its own
    power_mode_remaining: Option<f32>,
    power_mode_active: bool,
    /// Seconds since start
    sim_time: f64,
}

impl ChaseEngine {
    /// Engine over an existing grid
    pub fn new(config: ChaseConfig, grid: GridModel) -> Result<Self, ConfigError> {
        config.validate()?;
        log::info!(
            "Chase engine on {}x{} grid ({} walkable), seed {}",
            grid.width(),
            grid.height(),
            grid.walkable_count(),
            config.session.seed
        );
        Ok(Self {
            world: World::new(),
            pathfinder: Pathfinder::new(config.pathfinding.clone()),
            rng: StdRng::seed_from_u64(config.session.seed),
            grid,
            config,
            notifications: NotificationQueue::new(),
            power_mode_remaining: None,
            power_mode_active: false,
            sim_time: 0.0,
        })
    }

    /// Build the grid described by `config.grid` and populate it from `oracle`
    pub fn from_scan(config: ChaseConfig, oracle: &dyn OccupancyOracle) -> Result<(Self, ScanReport), ConfigError> {
        config.validate()?;
        let mut grid = config.grid.build_grid()?;
        let report = scan_grid(&mut grid, oracle, config.grid.wall_check_ratio);
        Ok((Self::new(config, grid)?, report))
    }

    /// Spawn an agent standing on its home cell
    pub fn spawn_agent(&mut self, personality: Personality, home: GridCoord) -> Entity {
        self.spawn_agent_at(personality, home, home)
    }

    /// Spawn an agent at `cell` that respawns at `home`
    pub fn spawn_agent_at(&mut self, personality: Personality, home: GridCoord, cell: GridCoord) -> Entity {
        if !self.grid.is_walkable_at(home) {
            log::warn!("Home cell {} for {:?} agent is not walkable", home, personality);
        }
        let entity = self.world.spawn((
            Position::at_cell(&self.grid, cell),
            Brain::new(personality, home),
            Motor {
                last_reached: Some(cell),
                ..Motor::new(AgentState::Normal.speed(&self.config.speed))
            },
        ));
        log::info!("Spawned {:?} agent {:?} at {} (home {})", personality, entity, cell, home);
        entity
    }

    /// Remove an agent. Returns false if it did not exist.
    pub fn despawn_agent(&mut self, entity: Entity) -> bool {
        self.world.despawn(entity).is_ok()
    }

    /// Advance the simulation by `delta_seconds`
    pub fn update(&mut self, delta_seconds: f32, protagonist: &dyn Protagonist) {
        if !delta_seconds.is_finite() || delta_seconds < 0.0 {
            log::warn!("Ignoring update with delta {}", delta_seconds);
            return;
        }
        self.sim_time += delta_seconds as f64;

        // Power mode expiry
        if let Some(remaining) = self.power_mode_remaining {
            let remaining = remaining - delta_seconds;
            if remaining <= 0.0 {
                self.power_mode_ended();
            } else {
                self.power_mode_remaining = Some(remaining);
            }
        }

        // Targets and paths
        let ctx = NavigationContext {
            grid: &self.grid,
            pathfinder: &self.pathfinder,
            behavior: &self.config.behavior,
            motor: &self.config.motor,
            protagonist_position: protagonist.position(),
            protagonist_velocity: protagonist.velocity(),
        };
        navigation_system(&mut self.world, &ctx, delta_seconds, &mut self.rng);

        // Movement
        motor_system(
            &mut self.world,
            &self.grid,
            self.config.motor.snap_threshold,
            delta_seconds,
        );

        // State changes from where everyone ended up
        home_arrival_system(
            &mut self.world,
            &self.grid,
            self.config.behavior.home_arrival_threshold,
            &self.config.speed,
            &mut self.notifications,
        );
        if let Some(radius) = self.config.session.contact_radius {
            contact_system(
                &mut self.world,
                protagonist.position(),
                radius,
                &self.config.speed,
                &mut self.notifications,
            );
        }
    }

    /// Frighten every Normal agent. Restarts the expiry timer if already running.
    pub fn power_mode_started(&mut self) {
        self.power_mode_active = true;
        self.power_mode_remaining = self.config.session.power_mode_duration;
        let changed = broadcast_signal(
            &mut self.world,
            StateSignal::PowerModeStarted,
            &self.config.speed,
            &mut self.notifications,
        );
        log::info!("Power mode started: {} agents frightened", changed);
    }

    /// Calm every Frightened agent
    pub fn power_mode_ended(&mut self) {
        self.power_mode_active = false;
        self.power_mode_remaining = None;
        let changed = broadcast_signal(
            &mut self.world,
            StateSignal::PowerModeEnded,
            &self.config.speed,
            &mut self.notifications,
        );
        log::info!("Power mode ended: {} agents back to normal", changed);
    }

    pub fn power_mode_active(&self) -> bool {
        self.power_mode_active
    }

    /// Seconds until power mode expires, if it is timed
    pub fn power_mode_remaining(&self) -> Option<f32> {
        self.power_mode_remaining
    }

    /// Explicit contact between `entity` and the protagonist
    pub fn report_contact(&mut self, entity: Entity) -> Option<Transition> {
        apply_signal(
            &mut self.world,
            entity,
            StateSignal::ProtagonistContact,
            &self.config.speed,
            &mut self.notifications,
        )
    }

    /// Change one cell at runtime. Agents whose plans cross it recompute on
    /// the next update; opening a cell also wakes idle agents.
    pub fn set_cell(&mut self, cell: GridCoord, walkable: bool) -> bool {
        if !self.grid.set_cell(cell.x, cell.z, walkable) {
            return false;
        }
        let mut affected = 0;
        for (_entity, (pos, motor)) in self.world.query_mut::<(&mut Position, &mut Motor)>() {
            if !walkable {
                pos.settle(&self.grid, motor.last_reached);
            }
            let idle = motor.phase == MotorPhase::Idle;
            if motor.crosses(cell) || (walkable && idle) {
                motor.request_repath();
                affected += 1;
            }
        }
        log::debug!(
            "Cell {} now {}; {} agents replanning",
            cell,
            if walkable { "walkable" } else { "blocked" },
            affected
        );
        true
    }

    /// Re-run the occupancy scan and discard every path
    pub fn rescan(&mut self, oracle: &dyn OccupancyOracle) -> ScanReport {
        let report = scan_grid(&mut self.grid, oracle, self.config.grid.wall_check_ratio);
        for (_entity, motor) in self.world.query_mut::<&mut Motor>() {
            motor.invalidate();
        }
        report
    }

    /// Take every notification raised since the last call
    pub fn drain_notifications(&mut self) -> Vec<Notification> {
        self.notifications.drain()
    }

    /// Snapshot of every agent
    pub fn agents(&self) -> Vec<AgentView> {
        self.world
            .query::<(&Position, &Brain, &Motor)>()
            .iter()
            .map(|(entity, (pos, brain, motor))| view(entity, pos, brain, motor))
            .collect()
    }

    /// Snapshot of one agent
    pub fn agent(&self, entity: Entity) -> Option<AgentView> {
        let mut query = self.world.query_one::<(&Position, &Brain, &Motor)>(entity).ok()?;
        query.get().map(|(pos, brain, motor)| view(entity, pos, brain, motor))
    }

    pub fn agent_count(&self) -> usize {
        self.world.query::<&Brain>().iter().count()
    }

    pub fn grid(&self) -> &GridModel {
        &self.grid
    }

    pub fn pathfinder(&self) -> &Pathfinder {
        &self.pathfinder
    }

    pub fn config(&self) -> &ChaseConfig {
        &self.config
    }

    /// Seconds simulated so far
    pub fn sim_time(&self) -> f64 {
        self.sim_time
    }
}

fn view(entity: Entity, pos: &Position, brain: &Brain, motor: &Motor) -> AgentView {
    AgentView {
        entity,
        personality: brain.personality,
        state: brain.state,
        position: pos.world,
        cell: pos.cell,
        home: brain.home,
        phase: motor.phase,
        waypoint: motor.waypoint,
        remaining: motor.remaining(),
        speed: motor.speed,
    }
}
