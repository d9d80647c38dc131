//! Drives every variation of a room through its builder and keeps the best
//! scoring plan.
//!
//! The generator is a state machine advanced once per call:
//! `Uninitialized` -> `BuildingVariation` (one builder step per call) ->
//! `VariationFinished` (score and record) -> next variation ... ->
//! `AllVariationsDone`.

use crate::builder::*;
use crate::distance::DistanceFields;
use crate::location::*;
use crate::room_data::ExitSafety;
use crate::room_plan::RoomPlan;
use crate::scoring::*;
use crate::step::*;
use crate::variation::*;
use fnv::FnvHashMap;
use log::*;
use screeps::RoomName;

enum GeneratorState {
    Uninitialized,
    BuildingVariation { index: usize, builder: Box<VariationBuilder> },
    VariationFinished { index: usize, plan: Option<RoomPlan> },
    AllVariationsDone,
}

/// A scored variation.
#[derive(Clone, Debug)]
pub struct VariationResult {
    pub plan: RoomPlan,
    pub score: ScoreBreakdown,
}

pub struct RoomPlanGenerator {
    room: RoomName,
    settings: BuilderSettings,
    state: GeneratorState,
    fields: Option<DistanceFields>,
    variations: VariationGenerator,
    results: FnvHashMap<String, VariationResult>,
    failed: Vec<String>,
}

impl RoomPlanGenerator {
    pub fn new(room: RoomName, settings: BuilderSettings) -> Self {
        RoomPlanGenerator {
            room,
            settings,
            state: GeneratorState::Uninitialized,
            fields: None,
            variations: VariationGenerator::default(),
            results: FnvHashMap::default(),
            failed: Vec::new(),
        }
    }

    pub fn room(&self) -> RoomName {
        self.room
    }

    /// Adjacent room safety every variation is planned under.
    pub fn safety(&self) -> ExitSafety {
        self.settings.safety
    }

    pub fn is_done(&self) -> bool {
        matches!(self.state, GeneratorState::AllVariationsDone)
    }

    pub fn variation_count(&self) -> usize {
        self.variations.len()
    }

    pub fn results(&self) -> &FnvHashMap<String, VariationResult> {
        &self.results
    }

    pub fn failed_variations(&self) -> &[String] {
        &self.failed
    }

    /// Key and result of the highest total score. Ties go to the smallest key.
    pub fn best(&self) -> Option<(&str, &VariationResult)> {
        self.results
            .iter()
            .max_by(|(a_key, a), (b_key, b)| {
                a.score
                    .total
                    .total_cmp(&b.score.total)
                    .then_with(|| b_key.cmp(a_key))
            })
            .map(|(key, result)| (key.as_str(), result))
    }

    fn initialize(&mut self, ctx: &PlanningContext) -> GeneratorState {
        let terrain = match ctx.intel.terrain(self.room) {
            Some(terrain) => terrain,
            None => {
                warn!("{}: no terrain available, nothing to plan", self.room);
                return GeneratorState::AllVariationsDone;
            }
        };

        let fields = DistanceFields::generate(terrain);
        let sources = ctx.intel.source_positions(self.room);
        let points: Vec<Location> = ctx
            .intel
            .controller_position(self.room)
            .into_iter()
            .chain(terrain.exit_centers().into_iter().map(|(_, loc)| loc))
            .chain(ctx.intel.mineral_position(self.room))
            .chain(sources.iter().copied())
            .collect();

        self.variations = VariationGenerator::new(terrain, &fields, &points, sources.len());
        self.fields = Some(fields);
        info!("{}: planning {} variations", self.room, self.variations.len());

        self.start_variation(0, ctx)
    }

    fn start_variation(&mut self, index: usize, ctx: &PlanningContext) -> GeneratorState {
        let fields = match &self.fields {
            Some(fields) => fields,
            None => return GeneratorState::AllVariationsDone,
        };
        let (key, variation) = match self.variations.get_index(index) {
            Some((key, variation)) => (key.to_string(), variation.clone()),
            None => return GeneratorState::AllVariationsDone,
        };

        match VariationBuilder::new(self.room, &key, variation, ctx.intel, fields, self.settings) {
            Some(builder) => GeneratorState::BuildingVariation {
                index,
                builder: Box::new(builder),
            },
            None => {
                warn!("{}: room intel went missing, stopping", self.room);
                GeneratorState::AllVariationsDone
            }
        }
    }

    fn finish_variation(&mut self, index: usize, plan: Option<RoomPlan>, ctx: &PlanningContext) {
        let key = match self.variations.get_index(index) {
            Some((key, _)) => key.to_string(),
            None => return,
        };
        let plan = match plan {
            Some(plan) => plan,
            None => {
                self.failed.push(key);
                return;
            }
        };
        let (terrain, fields) = match (ctx.intel.terrain(self.room), &self.fields) {
            (Some(terrain), Some(fields)) => (terrain, fields),
            _ => return,
        };

        let scorer = RoomPlanScorer::new(terrain, &fields.exit, ctx.pathfinder, self.settings.planned_level);
        let score = scorer.score(&plan);
        info!("{}: variation {} scored {:.4} ({:?})", self.room, key, score.total, score);
        self.results.insert(key, VariationResult { plan, score });
    }

    /// Advance by one unit of work: one builder step, or scoring a finished
    /// variation.
    pub fn tick(&mut self, ctx: &PlanningContext) {
        let state = std::mem::replace(&mut self.state, GeneratorState::AllVariationsDone);
        self.state = match state {
            GeneratorState::Uninitialized => self.initialize(ctx),
            GeneratorState::BuildingVariation { index, mut builder } => match builder.advance(ctx) {
                StepResult::Ok => GeneratorState::BuildingVariation { index, builder },
                StepResult::Done => GeneratorState::VariationFinished {
                    index,
                    plan: builder.into_plan(),
                },
                StepResult::Failed(reason) => {
                    warn!("{}: variation {} failed: {}", self.room, builder.key(), reason);
                    GeneratorState::VariationFinished { index, plan: None }
                }
            },
            GeneratorState::VariationFinished { index, plan } => {
                self.finish_variation(index, plan, ctx);
                self.start_variation(index + 1, ctx)
            }
            GeneratorState::AllVariationsDone => GeneratorState::AllVariationsDone,
        };
    }

    /// Tick until every variation has been built and scored.
    pub fn run_to_completion(&mut self, ctx: &PlanningContext) {
        while !self.is_done() {
            self.tick(ctx);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::*;
    use crate::labels::*;
    use crate::min_cut::DinicMinCut;
    use crate::pathing::AStarPathfinder;
    use crate::room_data::*;
    use crate::steps::test_support::*;
    use crate::terrain::*;

    fn settings() -> BuilderSettings {
        BuilderSettings {
            planned_level: PLANNED_LEVEL,
            max_bay_probes: MAX_BAY_PROBES,
            safety: ExitSafety::all_safe(),
        }
    }

    #[test]
    fn best_plan_wins_across_variations() {
        let intel = open_intel();
        let ctx = PlanningContext {
            intel: &intel,
            pathfinder: &AStarPathfinder,
            min_cut: &DinicMinCut,
        };
        let mut generator = RoomPlanGenerator::new(intel.room, settings());
        generator.run_to_completion(&ctx);

        assert!(generator.variation_count() >= 4);
        assert_eq!(
            generator.results().len() + generator.failed_variations().len(),
            generator.variation_count()
        );
        let (key, best) = generator.best().unwrap();
        assert!(generator
            .results()
            .values()
            .all(|result| result.score.total <= best.score.total));
        assert!(key.contains(':'));
        assert_eq!(best.plan.count(LocationType::Center), 1);
    }

    #[test]
    fn unknown_room_finishes_empty() {
        let intel = open_intel();
        let ctx = PlanningContext {
            intel: &intel,
            pathfinder: &AStarPathfinder,
            min_cut: &DinicMinCut,
        };
        let mut generator = RoomPlanGenerator::new("E9S9".parse().unwrap(), settings());
        generator.tick(&ctx);
        assert!(generator.is_done());
        assert!(generator.best().is_none());
    }

    #[test]
    fn source_by_an_unsafe_exit_fails_no_variation() {
        let mut intel = open_intel();
        intel.sources[0] = Location::from_xy(2, 22);
        intel.safety = ExitSafety {
            left: false,
            ..ExitSafety::all_safe()
        };
        let ctx = PlanningContext {
            intel: &intel,
            pathfinder: &AStarPathfinder,
            min_cut: &DinicMinCut,
        };
        let settings = BuilderSettings {
            safety: intel.safety,
            ..settings()
        };
        let mut generator = RoomPlanGenerator::new(intel.room, settings);
        generator.run_to_completion(&ctx);

        assert!(generator.failed_variations().is_empty(), "{:?}", generator.failed_variations());
        let (_, best) = generator.best().unwrap();
        assert!(best.plan.has_any(LocationType::Rampart));
    }

    /// A small pocket open to the north and east, with the source and
    /// controller at (4, 4) and (2, 2) relative to the pocket's corner.
    #[test]
    fn compact_pocket_still_gets_a_plan() {
        const LEFT: u8 = 41;
        let terrain = FastRoomTerrain::from_fn(|x, y| {
            let inside = (LEFT..=49).contains(&x) && y <= 8;
            let corner = (x == 49 && y == 0) || (x == 49 && y == 8);
            if inside && !corner {
                TerrainFlags::NONE
            } else {
                TerrainFlags::WALL
            }
        });
        let source = Location::from_xy(LEFT + 4, 4);
        let mut intel = StaticRoomIntel::new(room_name(), terrain);
        intel.sources = vec![source];
        intel.controller = Some(Location::from_xy(LEFT + 2, 2));
        intel.safety = ExitSafety::all_safe();

        let ctx = PlanningContext {
            intel: &intel,
            pathfinder: &AStarPathfinder,
            min_cut: &DinicMinCut,
        };
        let mut generator = RoomPlanGenerator::new(intel.room, settings());
        generator.run_to_completion(&ctx);

        let (_, best) = generator.best().unwrap();
        assert_eq!(best.plan.count(LocationType::Center), 1);
        assert!(best
            .plan
            .get_locations(LocationType::Harvester)
            .iter()
            .any(|loc| loc.distance_to(source) == 1));
    }
}
