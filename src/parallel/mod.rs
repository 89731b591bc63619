pub mod batch;
pub mod pool;
pub mod scenario;

pub use batch::batch_ranges;
pub use pool::WorkerPool;
pub use scenario::{
    load_scenario, load_scenario_dir, parse_scenario, run_scenario, run_scenarios,
    ExternalBonus, RejectedEvent, Scenario, ScenarioAction, ScenarioEvent, ScenarioOutcome,
};
