pub mod mqtt;

use thiserror::Error;
use tracing::{info, warn};

use crate::name::Name;
use crate::packet::{Data, Interest};

/// Upper bound on interests handled per [`Face::process_events`] call, so a
/// busy face cannot starve the rest of the main loop.
pub const MAX_INTERESTS_PER_TICK: usize = 100;

#[derive(Debug, Error)]
pub enum FaceError {
    #[error("prefix {0} cannot be registered on this face")]
    InvalidPrefix(Name),
    #[error("failed to encode data: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("transport error: {0}")]
    Transport(String),
    #[error("face is closed")]
    Closed,
}

/// Called synchronously for each interest delivered by a [`Face`].
///
/// Returning `Some(data)` asks the face to send it; `None` leaves the
/// requester to time out.
pub trait InterestHandler {
    fn on_interest(&mut self, interest: &Interest) -> Option<Data>;
}

impl<F> InterestHandler for F
where
    F: FnMut(&Interest) -> Option<Data>,
{
    fn on_interest(&mut self, interest: &Interest) -> Option<Data> {
        self(interest)
    }
}

pub trait Face {
    /// Ask the transport to deliver interests under `prefix`.
    fn register_prefix(&mut self, prefix: &Name) -> Result<(), FaceError>;

    fn put_data(&mut self, data: &Data) -> Result<(), FaceError>;

    /// Take the next interest that has already arrived, without waiting.
    fn next_interest(&mut self) -> Option<Interest>;

    /// Feed pending interests through `handler` and send its answers, at most
    /// [`MAX_INTERESTS_PER_TICK`] per call; the rest wait for the next call.
    ///
    /// Send failures are logged; the interest is lost. Returns the number of
    /// interests handled.
    fn process_events(&mut self, handler: &mut dyn InterestHandler) -> usize {
        let mut handled = 0;
        while handled < MAX_INTERESTS_PER_TICK {
            let Some(interest) = self.next_interest() else {
                break;
            };
            handled += 1;
            let Some(data) = handler.on_interest(&interest) else {
                continue;
            };
            match self.put_data(&data) {
                Ok(()) => info!(" |- Sent response!"),
                Err(e) => warn!(" |- Failed to send response for {}: {}", data.name, e),
            }
        }
        handled
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use super::*;

    #[derive(Default)]
    struct QueueFace {
        pending: VecDeque<Interest>,
        sent: Vec<Data>,
        fail_sends: bool,
    }

    impl Face for QueueFace {
        fn register_prefix(&mut self, _prefix: &Name) -> Result<(), FaceError> {
            Ok(())
        }

        fn put_data(&mut self, data: &Data) -> Result<(), FaceError> {
            if self.fail_sends {
                return Err(FaceError::Closed);
            }
            self.sent.push(data.clone());
            Ok(())
        }

        fn next_interest(&mut self) -> Option<Interest> {
            self.pending.pop_front()
        }
    }

    #[test]
    fn drains_everything_and_sends_only_answers() {
        let mut face = QueueFace::default();
        face.pending.push_back(Interest::new("/a/yes"));
        face.pending.push_back(Interest::new("/a/no"));
        face.pending.push_back(Interest::new("/a/yes/again"));

        let mut handler = |i: &Interest| {
            (i.name.components()[1] == "yes").then(|| Data::new(i.name.clone(), "ok"))
        };
        assert_eq!(face.process_events(&mut handler), 3);
        assert_eq!(face.sent.len(), 2);
        assert!(face.pending.is_empty());
        assert_eq!(face.process_events(&mut handler), 0);
    }

    #[test]
    fn drain_is_bounded_per_call() {
        let mut face = QueueFace::default();
        for i in 0..MAX_INTERESTS_PER_TICK + 50 {
            face.pending.push_back(Interest::new(format!("/a/{}", i)));
        }
        let mut handler = |_: &Interest| -> Option<Data> { None };
        assert_eq!(face.process_events(&mut handler), MAX_INTERESTS_PER_TICK);
        assert_eq!(face.pending.len(), 50);
        assert_eq!(face.process_events(&mut handler), 50);
    }

    #[test]
    fn send_failures_do_not_stop_draining() {
        let mut face = QueueFace {
            fail_sends: true,
            ..Default::default()
        };
        face.pending.push_back(Interest::new("/a"));
        face.pending.push_back(Interest::new("/b"));
        let mut handler = |i: &Interest| Some(Data::new(i.name.clone(), "ok"));
        assert_eq!(face.process_events(&mut handler), 2);
        assert!(face.sent.is_empty());
    }
}
