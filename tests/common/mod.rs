//! Test doubles shared by the integration tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::time::Instant;

use led_responder::access_code::AccessCodeManager;
use led_responder::dispatcher::Dispatcher;
use led_responder::face::{Face, FaceError};
use led_responder::name::Name;
use led_responder::outputs::{OutputController, OutputDriver, OutputId};
use led_responder::packet::{Data, Interest};
use led_responder::security::KeyChain;

/// Records every line write instead of touching hardware.
#[derive(Debug, Default)]
pub struct RecordingDriver {
    pub writes: Vec<(u8, bool)>,
}

impl OutputDriver for RecordingDriver {
    fn write(&mut self, id: OutputId, on: bool) {
        self.writes.push((id.get(), on));
    }
}

/// A face fed from a queue, capturing whatever gets sent back.
#[derive(Default)]
pub struct ScriptedFace {
    pub pending: VecDeque<Interest>,
    pub sent: Vec<Data>,
    pub registered: Vec<Name>,
    pub fail_sends: bool,
}

impl ScriptedFace {
    pub fn express(&mut self, uri: &str) {
        self.pending.push_back(Interest::new(uri));
    }

    pub fn contents(&self) -> Vec<&str> {
        self.sent.iter().map(|d| d.content.as_str()).collect()
    }
}

impl Face for ScriptedFace {
    fn register_prefix(&mut self, prefix: &Name) -> Result<(), FaceError> {
        self.registered.push(prefix.clone());
        Ok(())
    }

    fn put_data(&mut self, data: &Data) -> Result<(), FaceError> {
        if self.fail_sends {
            return Err(FaceError::Transport("broker unreachable".into()));
        }
        self.sent.push(data.clone());
        Ok(())
    }

    fn next_interest(&mut self) -> Option<Interest> {
        self.pending.pop_front()
    }
}

pub fn dispatcher_with_code(code: &str, now: Instant) -> Dispatcher<RecordingDriver> {
    Dispatcher::new(
        Name::from_uri("/thisRoom/pi"),
        AccessCodeManager::with_code(code, now),
        OutputController::new(RecordingDriver::default()),
        KeyChain::build(Name::from_uri("/thisRoom/identity")).unwrap(),
    )
}
