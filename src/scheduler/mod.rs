//! Job queue core: the coordinator and the types it owns.

pub mod coordinator;
pub mod job;
pub mod queue;
pub mod status;

pub use coordinator::{Coordinator, InFlight};
pub use job::{Job, JobAccepted, Speed};
pub use queue::JobQueue;
pub use status::{RelayStatus, StatusSnapshot};
