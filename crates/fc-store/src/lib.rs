//! Persistence Gateway
//!
//! A typed query surface over Postgres supporting multi-statement
//! transactions with row-level locking (§4.2). Each entity module pairs
//! a row type with free functions taking a generic `Executor` — either
//! the pool itself for reads outside a transaction, or `&mut
//! Transaction` for anything that must commit atomically with other
//! writes (an `IngestSendEvent` insert plus its queue enqueue, a
//! `RegisterJob` upsert chain).

pub mod auth_store;
pub mod error;
pub mod event_dispatcher;
pub mod event_example;
pub mod event_record;
pub mod external_account;
pub mod environment;
pub mod job;
pub mod job_alias;
pub mod job_queue;
pub mod job_version;
pub mod tokens;
pub mod unit_of_work;

pub use auth_store::PgAuthStore;
pub use error::StoreError;
pub use unit_of_work::PgStore;
