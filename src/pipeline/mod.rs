// Pipelines: multi-step workflows the CLI runs.
//
// Each pipeline offloads CPU-bound sampling to spawn_blocking and keeps
// database access on the async side.

pub mod infer;
pub mod train;
