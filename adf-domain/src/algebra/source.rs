use crate::{ExtractionError, Unit};
use futures::{Future, Stream};

/// Capability a host workflow runner needs to drive an extractor: build it
/// from configuration, pull records lazily, then release it.
///
/// `close` consumes the source, so a closed source cannot be polled again.
pub trait Source: Sized + Send + Sync {
    type Config: Send;
    type Record: Send;

    fn create(config: Self::Config) -> impl Future<Output = Result<Self, ExtractionError>> + Send;

    fn prepare(&mut self) -> Result<Unit, ExtractionError>;

    /// The returned stream does no I/O until it is first polled. It is not
    /// restartable; calling `next_record` again lists from scratch.
    fn next_record(&self) -> impl Stream<Item = Result<Self::Record, ExtractionError>> + Send + '_;

    fn close(self);
}
