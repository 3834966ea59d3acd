//! Simulation constants and tuning defaults.

/// Physics tick rate (Hz).
pub const TICK_RATE: u32 = 50;

/// Seconds per physics tick.
pub const DT: f64 = 1.0 / TICK_RATE as f64;

// --- Composition ---

/// Number of agents a full composite starts with.
pub const AGENT_COUNT: usize = 2;

// --- Pivot selection ---

/// Candidate directions: view-forward, view-right, -view-right, up, -up.
pub const PIVOT_CANDIDATE_COUNT: usize = 5;

/// Candidate index forced for grounded pilots (attack from above).
pub const PIVOT_TOP_INDEX: usize = 3;

/// Below this speed the pilot is treated as stationary for the forward push.
pub const STATIONARY_SPEED: f64 = 0.5;

// --- Orbit ring ---

/// Default number of anchors in the duo orbit ring.
pub const ORBIT_RING_SIZE: usize = 8;

/// Default orbit ring radius around the controller (m).
pub const ORBIT_RADIUS: f64 = 6.0;

// --- Choreography ---

/// Base of the ease-out curve `1 - BASE^(t / align_time)`.
pub const ALIGN_EASE_BASE: f64 = 0.01;

// --- Layers ---

pub const LAYER_DEFAULT: u32 = 0;
pub const LAYER_TERRAIN: u32 = 1;
pub const LAYER_OBSTACLE: u32 = 2;
pub const LAYER_PILOT: u32 = 3;
pub const LAYER_ENEMY: u32 = 4;

// --- Solo preset defaults ---

pub const SOLO_MAX_SPEED: f64 = 60.0;
pub const SOLO_BURST_DISTANCE: f64 = 40.0;
pub const SOLO_BURST_COOLDOWN: f64 = 0.6;
pub const SOLO_MAX_SPIRAL_OFFSET: f64 = 25.0;

// --- Duo preset defaults ---

pub const DUO_MAX_SPEED: f64 = 75.0;
pub const DUO_BURST_DISTANCE: f64 = 50.0;
pub const DUO_BURST_COOLDOWN: f64 = 0.8;
pub const DUO_MIN_BURST_DISTANCE: f64 = 50.0;
pub const DUO_MAX_BURST_DISTANCE: f64 = 70.0;
pub const DUO_BURST_SPEED: f64 = 90.0;
pub const DUO_BURST_DURATION: f64 = 0.6;
pub const DUO_ALIGN_TIME: f64 = 0.8;
pub const DUO_LEFT_RIGHT_ALIGN_TIME: f64 = 0.5;
pub const DUO_ATTACK_TIME: f64 = 2.5;
pub const DUO_MAX_COLLISION_KILLS: u32 = 3;
pub const DUO_ATTACK_COOLDOWN: f64 = 4.0;

// --- Arena ---

/// Default number of controllers the arena pool can hold at once.
pub const DEFAULT_POOL_CAPACITY: usize = 16;

/// Hit points of each agent.
pub const AGENT_HIT_POINTS: f64 = 100.0;

/// Hit points of the pilot.
pub const PILOT_HIT_POINTS: f64 = 1000.0;

/// Collision radius of the pilot (m).
pub const PILOT_RADIUS: f64 = 2.0;

/// Half thickness of the hazard barrier between the two agents (m).
pub const BARRIER_THICKNESS: f64 = 1.5;

/// Damage the barrier deals to the pilot per tick of contact.
pub const BARRIER_DAMAGE_PER_TICK: f64 = 20.0;

/// Staggered agent destruction after a composite dies: delay range (s).
pub const DEATH_DELAY_MIN: f64 = 0.1;
pub const DEATH_DELAY_MAX: f64 = 0.6;

/// Obstacles scattered by `scatter_obstacles` sit within this distance of the origin (m).
pub const OBSTACLE_FIELD_RADIUS: f64 = 200.0;
