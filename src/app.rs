use std::time::Instant;

use tracing::info;

use crate::config::POLL_INTERVAL;
use crate::dispatcher::Dispatcher;
use crate::face::Face;
use crate::outputs::OutputDriver;

/// The producer loop: serve pending interests, rotate the code, sleep.
pub struct App<F: Face, D: OutputDriver> {
    face: F,
    dispatcher: Dispatcher<D>,
}

impl<F: Face, D: OutputDriver> App<F, D> {
    pub fn new(face: F, dispatcher: Dispatcher<D>) -> Self {
        Self { face, dispatcher }
    }

    /// One iteration without the sleep. Returns the number of interests handled.
    pub fn tick(&mut self, now: Instant) -> usize {
        let handled = self.face.process_events(&mut self.dispatcher);
        self.dispatcher.access_codes_mut().rotate_if_expired(now);
        handled
    }

    pub fn face(&self) -> &F {
        &self.face
    }

    pub fn face_mut(&mut self) -> &mut F {
        &mut self.face
    }

    pub fn dispatcher(&self) -> &Dispatcher<D> {
        &self.dispatcher
    }

    pub fn dispatcher_mut(&mut self) -> &mut Dispatcher<D> {
        &mut self.dispatcher
    }

    /// Loop until SIGINT or SIGTERM.
    pub async fn run(mut self) {
        let shutdown = shutdown_signal();
        tokio::pin!(shutdown);

        loop {
            self.tick(Instant::now());
            tokio::select! {
                _ = tokio::time::sleep(POLL_INTERVAL) => {}
                _ = &mut shutdown => break,
            }
        }
        info!("led-responder stopped");
    }
}

async fn shutdown_signal() {
    let sigterm = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut s) => {
                s.recv().await;
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };
    tokio::select! {
        _ = tokio::signal::ctrl_c() => info!("Received SIGINT, shutting down"),
        _ = sigterm => info!("Received SIGTERM, shutting down"),
    }
}
