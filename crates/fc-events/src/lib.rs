//! Events Orchestrator (§4.5).
//!
//! `IngestSendEvent`, `DeliverEvent`, `InvokeDispatcher` — the three
//! operations the event ingestion/delivery/dispatch pipeline is built
//! from. Built `usecase`-flavored: a command struct in, a
//! `Result<T, EventsError>` out, committing through `fc-store`'s real
//! SQL transaction rather than the teacher's `MongoUnitOfWork`.

pub mod deliver;
pub mod error;
pub mod ingest;
pub mod invoke;
pub mod runs_client;

pub use error::EventsError;
pub use ingest::{EventsService, IngestOptions, SendEventRequest};
pub use runs_client::RunsClient;
