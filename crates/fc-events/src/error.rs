use thiserror::Error;

#[derive(Error, Debug)]
pub enum EventsError {
    #[error("validation: {0}")]
    Validation(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Store(#[from] fc_store::StoreError),

    #[error(transparent)]
    Queue(#[from] fc_queue::QueueError),

    /// `InvokeDispatcher` on an unparseable `dispatchable` JSON shape —
    /// fatal for this invocation, not for unrelated dispatchers (§4.5.3).
    #[error(transparent)]
    Dispatchable(#[from] fc_store::event_dispatcher::DispatchableParseError),
}
