//! Public API for the room planner.
//!
//! `PlannerBuilder` provides a fluent, append-only API for configuring a
//! `RoomPlanner`. The planner loads a persisted plan when its version matches,
//! otherwise generates one across ticks, persists the winner and answers
//! queries about it.

use crate::builder::BuilderSettings;
use crate::cache::TimedCache;
use crate::constants::*;
use crate::cost_matrix::CostMatrix;
use crate::error::PlannerError;
use crate::generator::RoomPlanGenerator;
use crate::labels::*;
use crate::location::*;
use crate::room_data::*;
use crate::room_plan::RoomPlan;
use crate::step::PlanningContext;
use crate::store::PlanStore;
use log::*;
use screeps::RoomName;
use serde::{Deserialize, Serialize};

/// Tunable planner settings.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannerConfig {
    /// Format version stored with every plan. Plans of another version are regenerated.
    pub version: u32,
    /// Ticks between adjacent room safety checks.
    pub safety_check_interval: u32,
    pub max_bay_probes: usize,
    /// Controller level whose structure quotas are planned for.
    pub planned_level: u8,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        PlannerConfig {
            version: PLANNER_VERSION,
            safety_check_interval: SAFETY_CHECK_INTERVAL,
            max_bay_probes: MAX_BAY_PROBES,
            planned_level: PLANNED_LEVEL,
        }
    }
}

/// What gets written to the plan store.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PersistedPlan {
    pub version: u32,
    pub safety: ExitSafety,
    pub plan: RoomPlan,
}

impl PersistedPlan {
    pub fn decode(data: &str) -> Result<PersistedPlan, PlannerError> {
        Ok(serde_json::from_str(data)?)
    }

    pub fn encode(&self) -> Result<String, PlannerError> {
        Ok(serde_json::to_string(self)?)
    }
}

pub fn plan_key(room: RoomName) -> String {
    format!("room_plan:{}", room)
}

/// Append-only builder for configuring a planner.
pub struct PlannerBuilder {
    config: PlannerConfig,
    safety_cache: Option<TimedCache<RoomName, ExitSafety>>,
}

impl Default for PlannerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PlannerBuilder {
    pub fn new() -> Self {
        PlannerBuilder {
            config: PlannerConfig::default(),
            safety_cache: None,
        }
    }

    pub fn config(mut self, config: PlannerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn version(mut self, version: u32) -> Self {
        self.config.version = version;
        self
    }

    pub fn safety_check_interval(mut self, ticks: u32) -> Self {
        self.config.safety_check_interval = ticks;
        self
    }

    pub fn max_bay_probes(mut self, probes: usize) -> Self {
        self.config.max_bay_probes = probes;
        self
    }

    pub fn planned_level(mut self, level: u8) -> Self {
        self.config.planned_level = level;
        self
    }

    /// Use an existing safety cache instead of a fresh one. Its TTL wins over
    /// `safety_check_interval`.
    pub fn safety_cache(mut self, cache: TimedCache<RoomName, ExitSafety>) -> Self {
        self.safety_cache = Some(cache);
        self
    }

    /// Build the planner, picking up a stored plan of the current version.
    pub fn build(self, room: RoomName, store: &dyn PlanStore) -> RoomPlanner {
        let safety_cache = self
            .safety_cache
            .unwrap_or_else(|| TimedCache::new(self.config.safety_check_interval));

        let mut planner = RoomPlanner {
            room,
            config: self.config,
            safety_cache,
            plan: None,
            plan_safety: None,
            generator: None,
        };
        planner.load(store);
        planner
    }
}

pub struct RoomPlanner {
    room: RoomName,
    config: PlannerConfig,
    safety_cache: TimedCache<RoomName, ExitSafety>,
    plan: Option<RoomPlan>,
    plan_safety: Option<ExitSafety>,
    generator: Option<RoomPlanGenerator>,
}

impl RoomPlanner {
    pub fn room(&self) -> RoomName {
        self.room
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    fn load(&mut self, store: &dyn PlanStore) {
        let data = match store.get(&plan_key(self.room)) {
            Some(data) => data,
            None => return,
        };
        match PersistedPlan::decode(&data) {
            Ok(persisted) if persisted.version == self.config.version => {
                debug!("{}: loaded plan version {}", self.room, persisted.version);
                self.plan = Some(persisted.plan);
                self.plan_safety = Some(persisted.safety);
            }
            Ok(persisted) => {
                info!(
                    "{}: stored plan version {} is stale (current {}), replanning",
                    self.room, persisted.version, self.config.version
                );
            }
            Err(err) => {
                warn!("{}: stored plan can't be decoded: {}", self.room, err);
            }
        }
    }

    fn settings(&self, safety: ExitSafety) -> BuilderSettings {
        BuilderSettings {
            planned_level: self.config.planned_level,
            max_bay_probes: self.config.max_bay_probes,
            safety,
        }
    }

    /// Adjacent room safety, refreshed from intel once the cached value expires.
    /// Returns the safety and whether it was refreshed this call.
    fn current_safety(&mut self, game_time: u32, intel: &dyn RoomIntel) -> (ExitSafety, bool) {
        if let Some(safety) = self.safety_cache.get(&self.room, game_time) {
            return (*safety, false);
        }
        let safety = intel.adjacent_room_safety(self.room);
        self.safety_cache.evict_expired(game_time);
        self.safety_cache.insert(self.room, safety, game_time);
        (safety, true)
    }

    /// Start generating a plan under `safety` unless a current one exists or
    /// is in progress. Calling this again with nothing changed is a no-op.
    /// Every variation of the run is planned under this one sample.
    pub fn request_generation(&mut self, safety: ExitSafety) {
        if self.plan.is_some() || self.generator.is_some() {
            return;
        }
        info!("{}: starting plan generation under {:?}", self.room, safety);
        self.generator = Some(RoomPlanGenerator::new(self.room, self.settings(safety)));
    }

    fn discard_plan(&mut self, store: &mut dyn PlanStore) {
        self.plan = None;
        self.plan_safety = None;
        self.generator = None;
        store.delete(&plan_key(self.room));
    }

    /// Drop the current plan, stored or in progress. The next tick samples
    /// safety again and starts over.
    pub fn request_replan(&mut self, store: &mut dyn PlanStore) {
        info!("{}: replan requested", self.room);
        self.safety_cache.invalidate(&self.room);
        self.discard_plan(store);
    }

    fn persist(&mut self, plan: RoomPlan, safety: ExitSafety, store: &mut dyn PlanStore) {
        let persisted = PersistedPlan {
            version: self.config.version,
            safety,
            plan,
        };
        match persisted.encode() {
            Ok(data) => {
                store.set(&plan_key(self.room), data);
                info!("{}: plan persisted", self.room);
            }
            Err(err) => warn!("{}: plan can't be encoded: {}", self.room, err),
        }
        self.plan = Some(persisted.plan);
        self.plan_safety = Some(safety);
    }

    /// One unit of planning work.
    pub fn tick(&mut self, game_time: u32, ctx: &PlanningContext, store: &mut dyn PlanStore) {
        let (safety, refreshed) = self.current_safety(game_time, ctx.intel);
        if refreshed {
            let planned_for = self
                .plan_safety
                .or_else(|| self.generator.as_ref().map(|g| g.safety()));
            if let Some(planned_for) = planned_for {
                if planned_for != safety {
                    info!(
                        "{}: adjacent room safety changed from {:?} to {:?}, invalidating plan",
                        self.room, planned_for, safety
                    );
                    self.discard_plan(store);
                }
            }
        }

        self.request_generation(safety);

        let generator = match self.generator.as_mut() {
            Some(generator) if !generator.is_done() => generator,
            _ => return,
        };
        generator.tick(ctx);
        if !generator.is_done() {
            return;
        }

        let best = generator
            .best()
            .map(|(key, result)| (key.to_string(), result.plan.clone(), result.score.total));
        match best {
            Some((key, plan, total)) => {
                info!("{}: selected variation {} with score {:.4}", self.room, key, total);
                let planned_for = generator.safety();
                self.generator = None;
                self.persist(plan, planned_for, store);
            }
            None => {
                warn!("{}: no variation produced a plan", self.room);
            }
        }
    }

    /// Tick until a plan exists or every variation failed.
    pub fn run_to_completion(&mut self, game_time: u32, ctx: &PlanningContext, store: &mut dyn PlanStore) {
        loop {
            self.tick(game_time, ctx, store);
            let exhausted = self.generator.as_ref().map(|g| g.is_done()).unwrap_or(true);
            if self.plan.is_some() || exhausted {
                break;
            }
        }
    }

    pub fn is_planning_finished(&self) -> bool {
        self.plan.is_some()
    }

    pub fn is_generating(&self) -> bool {
        self.generator.as_ref().map(|g| !g.is_done()).unwrap_or(false)
    }

    pub fn plan(&self) -> Option<&RoomPlan> {
        self.plan.as_ref()
    }

    pub fn get_locations(&self, label: LocationType) -> Vec<Location> {
        self.plan.as_ref().map(|p| p.get_locations(label)).unwrap_or_default()
    }

    pub fn is_planned_location(&self, loc: Location, label: LocationType) -> bool {
        self.plan.as_ref().map(|p| p.has(label, loc)).unwrap_or(false)
    }

    pub fn get_room_center(&self) -> Option<Location> {
        self.get_locations(LocationType::Center).into_iter().next()
    }

    pub fn get_navigation_matrix(&self) -> Option<CostMatrix> {
        self.plan.as_ref().map(|p| p.navigation_matrix())
    }
}
