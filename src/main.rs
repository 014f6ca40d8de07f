use std::time::Instant;

use tracing::{error, info};

use led_responder::access_code::AccessCodeManager;
use led_responder::app::App;
use led_responder::config::{self, Config};
use led_responder::dispatcher::Dispatcher;
use led_responder::face::Face;
use led_responder::face::mqtt::MqttFace;
use led_responder::outputs::OutputController;
use led_responder::security::KeyChain;

fn fatal(msg: impl std::fmt::Display) -> ! {
    error!("{}", msg);
    std::process::exit(1);
}

#[cfg(feature = "rpi")]
fn output_driver() -> led_responder::outputs::gpio::GpioDriver {
    match led_responder::outputs::gpio::GpioDriver::new(config::OUTPUT_PINS) {
        Ok(d) => d,
        Err(e) => fatal(e),
    }
}

#[cfg(not(feature = "rpi"))]
fn output_driver() -> led_responder::outputs::MemoryDriver {
    info!(
        "Built without the rpi feature; BCM {:?} are simulated in memory",
        config::OUTPUT_PINS
    );
    led_responder::outputs::MemoryDriver::new()
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => fatal(format!("Configuration error: {}", e)),
    };

    info!(
        "Starting led-responder (broker={}:{}, prefix={}, identity={})",
        config.broker.host,
        config.broker.port,
        config::ROOT_PREFIX,
        config.identity,
    );

    let outputs = OutputController::new(output_driver());

    let keychain = match KeyChain::build(config.identity.clone()) {
        Ok(k) => k,
        Err(e) => fatal(format!("Failed to create signing identity: {}", e)),
    };
    info!("Signing with {}", keychain.default_certificate_name());

    let (mut face, event_loop) = MqttFace::connect(&config.broker);
    let face_handle = tokio::spawn(event_loop.run());

    let root = config.root_prefix();
    if let Err(e) = face.register_prefix(&root) {
        fatal(format!("Failed to register prefix {}: {}", root, e));
    }

    let codes = AccessCodeManager::new(Instant::now());
    let dispatcher = Dispatcher::new(root, codes, outputs, keychain);

    App::new(face, dispatcher).run().await;

    face_handle.abort();
}
