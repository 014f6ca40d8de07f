#[cfg(feature = "rpi")]
pub mod gpio;

use std::fmt;

use tracing::debug;

/// Identifier of one of the three outputs (1, 2 or 3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OutputId(u8);

impl OutputId {
    pub const ALL: [OutputId; 3] = [OutputId(1), OutputId(2), OutputId(3)];

    pub fn new(id: u32) -> Option<Self> {
        match id {
            1..=3 => Some(Self(id as u8)),
            _ => None,
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }

    fn index(self) -> usize {
        usize::from(self.0 - 1)
    }
}

impl fmt::Display for OutputId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LED #{}", self.0)
    }
}

/// Drives a physical output line. Hardware faults stay inside the driver.
pub trait OutputDriver {
    fn write(&mut self, id: OutputId, on: bool);
}

/// Host-side driver that only remembers the requested levels.
#[derive(Debug, Default)]
pub struct MemoryDriver {
    levels: [bool; 3],
}

impl MemoryDriver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn level(&self, id: OutputId) -> bool {
        self.levels[id.index()]
    }
}

impl OutputDriver for MemoryDriver {
    fn write(&mut self, id: OutputId, on: bool) {
        debug!("{} -> {}", id, if on { "high" } else { "low" });
        self.levels[id.index()] = on;
    }
}

/// Tracks the state of the three outputs and forwards changes to the driver.
pub struct OutputController<D: OutputDriver> {
    states: [bool; 3],
    driver: D,
}

impl<D: OutputDriver> OutputController<D> {
    /// Provision every output in the off state.
    pub fn new(mut driver: D) -> Self {
        for id in OutputId::ALL {
            driver.write(id, false);
        }
        Self {
            states: [false; 3],
            driver,
        }
    }

    /// Flip an output and return its new state, or `None` for an unknown id.
    pub fn toggle(&mut self, id: u32) -> Option<bool> {
        let id = OutputId::new(id)?;
        let state = &mut self.states[id.index()];
        *state = !*state;
        self.driver.write(id, *state);
        Some(*state)
    }

    pub fn state(&self, id: u32) -> Option<bool> {
        OutputId::new(id).map(|id| self.states[id.index()])
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }
}
