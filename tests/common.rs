//! Common test utilities for building flow definitions.
use keiro::prelude::*;

/// Creates a task step with no outgoing relations.
#[allow(dead_code)]
pub fn task_step(id: &str) -> StepInstance {
    StepInstance::new(id, StepConfig::Task(TaskConfig::default()))
}

/// Creates a flow-terminating step.
#[allow(dead_code)]
pub fn terminate_step(id: &str) -> StepInstance {
    StepInstance::new(id, StepConfig::Terminate(TerminateConfig::default()))
}

/// Creates a fork-manager step from `(branch_id, entry_step)` pairs.
#[allow(dead_code)]
pub fn fork_step(id: &str, branches: &[(&str, Option<&str>)]) -> StepInstance {
    StepInstance::new(
        id,
        StepConfig::ForkManager(ForkConfig {
            parallel_branches: branches
                .iter()
                .map(|(branch_id, entry)| Branch {
                    branch_id: branch_id.to_string(),
                    step_instance_id: entry.map(str::to_string),
                })
                .collect(),
        }),
    )
}

/// Assembles steps into a definition keyed by their ids.
#[allow(dead_code)]
pub fn flow_from_steps(id: &str, start: &str, steps: Vec<StepInstance>) -> FlowDefinition {
    let mut flow = FlowDefinition::new(id);
    flow.version = 1;
    flow.start_step_instance_id = start.to_string();
    for step in steps {
        flow.steps.insert(step.step_instance_id.clone(), step);
    }
    flow
}

/// Creates a simple linear flow without stored positions.
///
/// `ingest` -(default)-> `assess` -(default)-> `publish` (terminal)
#[allow(dead_code)]
pub fn create_linear_flow() -> FlowDefinition {
    let mut ingest = task_step("ingest");
    ingest.default_next_step_instance_id = Some("assess".to_string());
    let mut assess = task_step("assess");
    assess.default_next_step_instance_id = Some("publish".to_string());
    let publish = terminate_step("publish");
    flow_from_steps("flow-linear", "ingest", vec![ingest, assess, publish])
}

/// Creates the linear flow with stored positions, as it would come back
/// from the service after a session has already laid it out.
#[allow(dead_code)]
pub fn create_positioned_flow() -> FlowDefinition {
    let mut flow = create_linear_flow();
    for (index, id) in ["ingest", "assess", "publish"].iter().enumerate() {
        if let Some(step) = flow.step_mut(id) {
            step.position = Some(Position::new(100.0, 50.0 + 150.0 * index as f64));
        }
    }
    flow
}

/// Creates a flow with a fork manager and two anchored branches.
///
/// `fan_out` forks into `enrich_a` (branch `audit`) and `enrich_b`
/// (branch `scoring`); a third branch `offline` has no entry step.
/// `enrich_a` -> `merge` -> `publish` (terminal); `merge` falls back to
/// `publish` on error. `enrich_b` has no default transition, making it a
/// branch end.
#[allow(dead_code)]
pub fn create_fork_flow() -> FlowDefinition {
    let fan_out = fork_step(
        "fan_out",
        &[
            ("audit", Some("enrich_a")),
            ("scoring", Some("enrich_b")),
            ("offline", None),
        ],
    );
    let mut enrich_a = task_step("enrich_a");
    enrich_a.default_next_step_instance_id = Some("merge".to_string());
    let enrich_b = task_step("enrich_b");
    let mut merge = task_step("merge");
    merge.default_next_step_instance_id = Some("publish".to_string());
    merge.on_error = Some(ErrorPolicy {
        fallback_step_instance_id: Some("publish".to_string()),
        max_attempts: Some(3),
    });
    let publish = terminate_step("publish");
    flow_from_steps(
        "flow-fork",
        "fan_out",
        vec![fan_out, enrich_a, enrich_b, merge, publish],
    )
}

/// Opens an editing session over a definition with default metadata.
#[allow(dead_code)]
pub fn open_store(flow: FlowDefinition) -> EditorStore {
    EditorStore::load(LoadedFlow::new(flow, "Test flow", "A flow used in tests"))
}
