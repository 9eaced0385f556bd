use thiserror::Error;

#[derive(Error, Debug)]
pub enum JobsError {
    #[error("validation: {0}")]
    Validation(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Store(#[from] fc_store::StoreError),

    #[error(transparent)]
    Events(#[from] fc_events::EventsError),
}
