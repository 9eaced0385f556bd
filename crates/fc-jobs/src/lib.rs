//! Jobs Orchestrator (§4.6).
//!
//! `RegisterJob` writes the coherent job/queue/version/alias graph in
//! one transaction; `TestJob` delegates to `fc-events::IngestSendEvent`
//! to drive a synthetic event through the same pipeline a real one
//! would take.

pub mod error;
pub mod register;
pub mod test_job;

pub use error::JobsError;
pub use register::{
    EventSpec, JobsService, QueueSpec, RegisterJobRequest, RegisterJobResult, TriggerSpec,
    TriggerType,
};
pub use test_job::{TestJobRequest, TestJobResponse, TestJobStatus};
