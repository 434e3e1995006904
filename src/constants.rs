//! Default tunables for the rating kernel, decay operator, and rebuild job.
//!
//! Every value here is overridable through [`crate::domain::RebuildParameters`];
//! these are the defaults enumerated in the external interface contract.

/// Initial skill mean assigned to a player on first appearance.
pub const STARTING_MU: f64 = 25.0;

/// Initial skill uncertainty assigned to a player on first appearance.
pub const STARTING_SIGMA: f64 = STARTING_MU / 3.0;

/// Performance variance of the TrueSkill factor graph.
pub const BETA: f64 = STARTING_SIGMA / 2.0;

/// Dynamics factor: per-update uncertainty added back to counteract skill drift.
pub const TAU: f64 = STARTING_SIGMA / 100.0;

/// Prior probability that a game between evenly matched sides ends in a draw.
pub const DRAW_PROBABILITY: f64 = 0.10;

/// Rating multiplier applied to playoff games.
pub const PLAYOFF_WEIGHT: f64 = 2.0;

/// Rounds of absence before inactivity decay begins inflating sigma.
pub const INACTIVITY_THRESHOLD_ROUNDS: u32 = 3;

/// Per-round sigma inflation applied once a player crosses the inactivity threshold.
pub const INACTIVITY_SIGMA_INFLATION_PER_ROUND: f64 = TAU;

/// Sigma is never inflated past its starting value.
pub const INACTIVITY_SIGMA_CAP: f64 = STARTING_SIGMA;

/// Maximum number of games processed concurrently within a single round.
pub const MAX_CONCURRENT_GAMES_PER_ROUND: usize = 8;

/// Maximum number of write operations per batched persistence call.
pub const WRITE_BATCH_SIZE: usize = 500;

/// Page size for the keyset-paginated completed-games load: the store
/// issues repeated `(date, id) > (cursor)` queries of this size rather
/// than assuming the whole games collection fits in one round trip.
pub const GAME_LOAD_PAGE_SIZE: usize = 500;

/// Wall-clock ceiling for a single rebuild invocation, in seconds.
pub const HOST_DEADLINE_SECONDS: u64 = 540;

/// How close to the deadline the controller must be before it aborts the
/// in-flight round rather than starting it.
pub const DEADLINE_MARGIN_SECONDS: u64 = 5;

/// Cadence (in rounds) at which progress is persisted, expressed as a
/// divisor of the total round count.
pub const PROGRESS_UPDATE_DIVISOR: usize = 100;

/// Ceiling `percentComplete` may reach while a rebuild is still running;
/// the final jump to 100 only happens on successful completion.
pub const MAX_PROGRESS_WHILE_RUNNING: u32 = 95;
