use std::collections::{HashMap, VecDeque};
use std::time::Duration;

use rumqttc::{
    AsyncClient, Event, EventLoop, Incoming, MqttOptions, Outgoing, QoS, SubscribeReasonCode,
};
use serde::Deserialize;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use super::{Face, FaceError};
use crate::config::BrokerConfig;
use crate::name::Name;
use crate::packet::{Data, DEFAULT_INTEREST_LIFETIME, Interest};

/// Optional JSON body of an interest publish.
#[derive(Debug, Default, Deserialize)]
struct InterestParams {
    lifetime_ms: Option<u64>,
}

fn interest_topic(topic_prefix: &str, name: &Name) -> String {
    format!("{}/interest{}", topic_prefix, name.to_uri())
}

fn data_topic(topic_prefix: &str, name: &Name) -> String {
    format!("{}/data{}", topic_prefix, name.to_uri())
}

/// Topic filter that delivers every interest under `prefix`.
fn registration_filter(topic_prefix: &str, prefix: &Name) -> Result<String, FaceError> {
    if prefix
        .components()
        .iter()
        .any(|c| c.contains(['+', '#']))
    {
        return Err(FaceError::InvalidPrefix(prefix.clone()));
    }
    if prefix.is_empty() {
        return Ok(format!("{}/interest/#", topic_prefix));
    }
    Ok(format!("{}/#", interest_topic(topic_prefix, prefix)))
}

/// Recover the prefix URI a registration filter was built from.
fn filter_prefix<'a>(topic_prefix: &str, filter: &'a str) -> &'a str {
    filter
        .strip_prefix(topic_prefix)
        .and_then(|rest| rest.strip_prefix("/interest"))
        .and_then(|rest| rest.strip_suffix("/#"))
        .unwrap_or(filter)
}

/// Parse an incoming publish into an interest.
/// Expected topic: {prefix}/interest/{name...}
fn parse_interest(topic_prefix: &str, topic: &str, payload: &[u8]) -> Option<Interest> {
    let uri = topic.strip_prefix(topic_prefix)?.strip_prefix("/interest")?;
    if !uri.starts_with('/') {
        return None;
    }

    let params = if payload.iter().all(u8::is_ascii_whitespace) {
        InterestParams::default()
    } else {
        match serde_json::from_slice::<InterestParams>(payload) {
            Ok(p) => p,
            Err(e) => {
                warn!("Ignoring interest {} with bad parameters: {}", uri, e);
                return None;
            }
        }
    };

    let lifetime = params
        .lifetime_ms
        .map(Duration::from_millis)
        .unwrap_or(DEFAULT_INTEREST_LIFETIME);
    Some(Interest::new(uri).with_lifetime(lifetime))
}

/// Registered filters and whether the broker session is up.
///
/// Filters are subscribed on every ConnAck; a registration made while
/// disconnected waits for the next ConnAck instead of subscribing twice.
#[derive(Debug, Default)]
struct Registrations {
    filters: Vec<String>,
    connected: bool,
}

impl Registrations {
    /// Record a filter; returns it if it should be subscribed right away.
    fn add(&mut self, filter: String) -> Option<String> {
        self.filters.push(filter.clone());
        self.connected.then_some(filter)
    }

    /// Session (re)established: everything registered so far must be subscribed.
    fn connected(&mut self) -> Vec<String> {
        self.connected = true;
        self.filters.clone()
    }

    fn disconnected(&mut self) {
        self.connected = false;
    }
}

/// Producer-side handle of a face carried over an MQTT broker.
///
/// All methods are non-blocking; network I/O happens in [`FaceEventLoop`].
pub struct MqttFace {
    client: AsyncClient,
    topic_prefix: String,
    interests: mpsc::Receiver<Interest>,
    registrations: mpsc::UnboundedSender<String>,
}

/// Background half of an [`MqttFace`]: drives the broker connection.
pub struct FaceEventLoop {
    client: AsyncClient,
    eventloop: EventLoop,
    topic_prefix: String,
    interest_tx: mpsc::Sender<Interest>,
    registrations: mpsc::UnboundedReceiver<String>,
    registered: Registrations,
    /// Filters sent to the client but not yet assigned a packet id.
    unsent: VecDeque<String>,
    in_flight: HashMap<u16, String>,
}

impl MqttFace {
    pub fn connect(config: &BrokerConfig) -> (Self, FaceEventLoop) {
        let mut mqttopts = MqttOptions::new(&config.client_id, &config.host, config.port);
        mqttopts.set_keep_alive(Duration::from_secs(30));

        if let (Some(user), Some(pass)) = (&config.username, &config.password) {
            mqttopts.set_credentials(user, pass);
        }

        let (client, eventloop) = AsyncClient::new(mqttopts, 100);
        let (interest_tx, interest_rx) = mpsc::channel(100);
        let (reg_tx, reg_rx) = mpsc::unbounded_channel();

        let face = Self {
            client: client.clone(),
            topic_prefix: config.topic_prefix.clone(),
            interests: interest_rx,
            registrations: reg_tx,
        };
        let event_loop = FaceEventLoop {
            client,
            eventloop,
            topic_prefix: config.topic_prefix.clone(),
            interest_tx,
            registrations: reg_rx,
            registered: Registrations::default(),
            unsent: VecDeque::new(),
            in_flight: HashMap::new(),
        };
        (face, event_loop)
    }
}

impl Face for MqttFace {
    fn register_prefix(&mut self, prefix: &Name) -> Result<(), FaceError> {
        let filter = registration_filter(&self.topic_prefix, prefix)?;
        self.registrations
            .send(filter)
            .map_err(|_| FaceError::Closed)
    }

    fn put_data(&mut self, data: &Data) -> Result<(), FaceError> {
        let payload = serde_json::to_vec(data)?;
        let topic = data_topic(&self.topic_prefix, &data.name);
        self.client
            .try_publish(topic, QoS::AtLeastOnce, false, payload)
            .map_err(|e| FaceError::Transport(e.to_string()))
    }

    fn next_interest(&mut self) -> Option<Interest> {
        self.interests.try_recv().ok()
    }
}

impl FaceEventLoop {
    /// Run the broker event loop. Re-registers every prefix on each connect,
    /// forwards interests to the producer, and reconnects after errors.
    pub async fn run(mut self) {
        loop {
            tokio::select! {
                event = self.eventloop.poll() => {
                    match event {
                        Ok(Event::Incoming(Incoming::ConnAck(_))) => {
                            info!("Connected to broker");
                            for filter in self.registered.connected() {
                                self.subscribe(filter).await;
                            }
                        }
                        Ok(Event::Incoming(Incoming::Publish(publish))) => {
                            let Some(interest) =
                                parse_interest(&self.topic_prefix, &publish.topic, &publish.payload)
                            else {
                                debug!("Ignoring publish on {}", publish.topic);
                                continue;
                            };
                            if self.interest_tx.send(interest).await.is_err() {
                                warn!("Interest channel closed, stopping face");
                                return;
                            }
                        }
                        Ok(Event::Outgoing(Outgoing::Subscribe(pkid))) => {
                            if let Some(filter) = self.unsent.pop_front() {
                                self.in_flight.insert(pkid, filter);
                            }
                        }
                        Ok(Event::Incoming(Incoming::SubAck(ack))) => {
                            let filter = self.in_flight.remove(&ack.pkid);
                            let rejected = ack
                                .return_codes
                                .iter()
                                .any(|c| matches!(c, SubscribeReasonCode::Failure));
                            if let Some(filter) = filter {
                                let prefix = filter_prefix(&self.topic_prefix, &filter);
                                if rejected {
                                    error!("Failed to register prefix {}", prefix);
                                } else {
                                    info!("Registered prefix {}", prefix);
                                }
                            }
                        }
                        Ok(_) => {}
                        Err(e) => {
                            error!("Broker connection error: {}. Reconnecting...", e);
                            self.registered.disconnected();
                            self.unsent.clear();
                            self.in_flight.clear();
                            tokio::time::sleep(Duration::from_secs(5)).await;
                        }
                    }
                }
                Some(filter) = self.registrations.recv() => {
                    if let Some(filter) = self.registered.add(filter) {
                        self.subscribe(filter).await;
                    }
                }
            }
        }
    }

    async fn subscribe(&mut self, filter: String) {
        match self.client.subscribe(&filter, QoS::AtLeastOnce).await {
            Ok(()) => self.unsent.push_back(filter),
            Err(e) => error!("Failed to subscribe to {}: {}", filter, e),
        }
    }
}
