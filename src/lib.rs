//! Automated base layout planner for Screeps rooms.
//!
//! A `RoomPlanner` generates several candidate layouts ("variations") per
//! room, one pipeline step per tick, scores each finished layout and keeps
//! the best one. Game access is behind the `RoomIntel` and `PlanStore`
//! traits so planning runs the same in game and in offline tests.

pub mod builder;
pub mod cache;
pub mod constants;
pub mod cost_matrix;
pub mod distance;
pub mod error;
pub mod generator;
pub mod labels;
pub mod location;
pub mod min_cut;
pub mod pathing;
pub mod placement;
pub mod planner;
pub mod room_data;
pub mod room_plan;
pub mod scoring;
pub mod step;
pub mod steps;
pub mod store;
pub mod terrain;
pub mod variation;

pub use error::PlannerError;
pub use labels::LocationType;
pub use location::Location;
pub use planner::{PersistedPlan, PlannerBuilder, PlannerConfig, RoomPlanner};
pub use room_data::{ExitSafety, RoomIntel, StaticRoomIntel};
pub use room_plan::RoomPlan;
pub use step::{PlanningContext, PlanningStep, StepResult};
pub use store::{MemoryPlanStore, PlanStore};
