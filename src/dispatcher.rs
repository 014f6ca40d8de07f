use tracing::{info, warn};

use crate::access_code::AccessCodeManager;
use crate::face::InterestHandler;
use crate::name::{Name, parse_request};
use crate::outputs::{OutputController, OutputDriver};
use crate::packet::{Data, Interest};
use crate::security::KeyChain;

pub const INVALID_OUTPUT: &str = "Invalid LED";

/// Authorizes LED requests and answers them with signed data.
pub struct Dispatcher<D: OutputDriver> {
    root: Name,
    codes: AccessCodeManager,
    outputs: OutputController<D>,
    keychain: KeyChain,
}

impl<D: OutputDriver> Dispatcher<D> {
    pub fn new(
        root: Name,
        codes: AccessCodeManager,
        outputs: OutputController<D>,
        keychain: KeyChain,
    ) -> Self {
        Self {
            root,
            codes,
            outputs,
            keychain,
        }
    }

    pub fn root(&self) -> &Name {
        &self.root
    }

    pub fn access_codes(&self) -> &AccessCodeManager {
        &self.codes
    }

    pub fn access_codes_mut(&mut self) -> &mut AccessCodeManager {
        &mut self.codes
    }

    pub fn outputs(&self) -> &OutputController<D> {
        &self.outputs
    }

    pub fn keychain(&self) -> &KeyChain {
        &self.keychain
    }

    /// Handle one interest. `None` means the requester gets no answer.
    ///
    /// Malformed names and wrong access codes are dropped without a reply so
    /// that probing reveals nothing. The requested action is not consulted:
    /// every authorized request toggles its output.
    pub fn handle(&mut self, interest: &Interest) -> Option<Data> {
        info!("Received interest: {}", interest.name);

        let request = match parse_request(&interest.name, &self.root) {
            Ok(r) => r,
            Err(e) => {
                info!(" |- Invalid name! ({})", e);
                return None;
            }
        };

        info!(
            " |- Access Code: {}, Service: LED #{}, Action: {}",
            request.access_code, request.output, request.action
        );

        if !self.codes.matches(&request.access_code) {
            warn!(" |- Wrong access code, dropping");
            return None;
        }

        let content = match parse_output_id(&request.output).and_then(|id| {
            self.outputs.toggle(id).map(|on| (id, on))
        }) {
            Some((id, on)) => format!("LED #{} is now {}", id, if on { "on" } else { "off" }),
            None => INVALID_OUTPUT.to_string(),
        };
        info!(" |- {}", content);

        let mut response = Data::new(interest.name.clone(), content);
        response.freshness_period = interest.lifetime;

        if let Err(e) = self.keychain.sign(&mut response) {
            warn!(" |- Failed to sign response: {}", e);
            return None;
        }
        Some(response)
    }
}

impl<D: OutputDriver> InterestHandler for Dispatcher<D> {
    fn on_interest(&mut self, interest: &Interest) -> Option<Data> {
        self.handle(interest)
    }
}

/// Only canonical decimal forms name an output: "01" does not mean 1.
fn parse_output_id(digits: &str) -> Option<u32> {
    let id: u32 = digits.parse().ok()?;
    (id.to_string() == digits).then_some(id)
}
