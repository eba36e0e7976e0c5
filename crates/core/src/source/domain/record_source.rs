use crate::caps::domain::caps::Caps;
use crate::caps::domain::media_kind::MediaInfo;
use crate::shared::error::Result;
use crate::shared::record::{ReadOutcome, Record};

/// Pull-based source of records for a pipeline host.
///
/// The host sets caps, starts the source, calls `next_record` until end of
/// stream or error, then stops it. Calls are never re-entered.
pub trait RecordSource: Send {
    /// Resolves negotiated caps into the record layout used by the next session.
    fn set_caps(&mut self, caps: &Caps) -> Result<MediaInfo>;

    /// Opens the backing storage.
    fn start(&mut self) -> Result<()>;

    /// Produces the next record, or end of stream.
    fn next_record(&mut self) -> Result<ReadOutcome>;

    /// Releases any resources held by the source.
    fn stop(&mut self);

    fn is_started(&self) -> bool;

    /// Returns an iterator over records that ends at end of stream or after
    /// the first error.
    fn records(&mut self) -> Box<dyn Iterator<Item = Result<Record>> + '_> {
        let mut done = false;
        Box::new(std::iter::from_fn(move || {
            if done {
                return None;
            }
            match self.next_record() {
                Ok(ReadOutcome::Record(record)) => Some(Ok(record)),
                Ok(ReadOutcome::EndOfStream) => {
                    done = true;
                    None
                }
                Err(e) => {
                    done = true;
                    Some(Err(e))
                }
            }
        }))
    }
}
