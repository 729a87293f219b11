//! # Channel Dispatcher
//!
//! An `AssociationTransport` that does no routing itself. Every effect the
//! router issues is turned into an [`AssociationEvent`] and pushed onto a tokio
//! unbounded MPSC channel, so that an async task elsewhere (a bridge to a
//! message broker, a websocket fan-out, a log sink) can carry it out.
//!
//! Sends never block the router. If the receiving half has been dropped the
//! event is lost; this is logged once and never treated as fatal.

use tokio::sync::mpsc;

use crate::core::ports::AssociationTransport;
use crate::model::{BackpressureStrategy, IoActor, IoSource, PointId, UpdateRate};

/// Topic prefix for routes without an externally defined topic.
pub const GENERATED_ROUTE_PREFIX: &str = "io";

/// # Association Event
///
/// One routing instruction, as seen by the consumer of the channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssociationEvent {
    /// Start (or keep) routing `source` to `actor`.
    Associate {
        /// Source point id.
        source: PointId,
        /// Actor point id.
        actor: PointId,
        /// Topic the values travel on.
        route: String,
        /// Recommended update rate in milliseconds; `None` is unlimited.
        rate: UpdateRate,
        /// Backpressure the source should apply at `rate`.
        strategy: BackpressureStrategy,
        /// Whether the actor consumes raw values.
        raw_values: bool,
    },
    /// Stop routing `source` to `actor`.
    Disassociate {
        /// Source point id.
        source: PointId,
        /// Actor point id.
        actor: PointId,
    },
}

/// Picks the topic for a pair: source's external topic, then actor's, then a
/// generated `io/<source id>` topic.
pub fn route_for(source: &IoSource, actor: &IoActor) -> String {
    source
        .external_topic
        .as_ref()
        .or(actor.external_topic.as_ref())
        .cloned()
        .unwrap_or_else(|| format!("{}/{}", GENERATED_ROUTE_PREFIX, source.id))
}

/// # Channel Transport
pub struct ChannelTransport {
    sender: mpsc::UnboundedSender<AssociationEvent>,
    sent: u64,
    dropped: u64,
}

impl ChannelTransport {
    /// Creates a transport and the receiver its events arrive on.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<AssociationEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::from_sender(tx), rx)
    }

    /// Wraps an existing sender, e.g. one shared with other producers.
    pub fn from_sender(sender: mpsc::UnboundedSender<AssociationEvent>) -> Self {
        Self { sender, sent: 0, dropped: 0 }
    }

    /// Events handed to the channel so far.
    pub fn sent(&self) -> u64 {
        self.sent
    }

    /// Events lost because the receiver was gone.
    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    fn send(&mut self, event: AssociationEvent) {
        match self.sender.send(event) {
            Ok(()) => self.sent += 1,
            Err(mpsc::error::SendError(event)) => {
                if self.dropped == 0 {
                    log::warn!("Association event receiver closed; dropping {:?}", event);
                }
                self.dropped += 1;
            }
        }
    }
}

impl AssociationTransport for ChannelTransport {
    fn associate(&mut self, source: &IoSource, actor: &IoActor, rate: UpdateRate) {
        self.send(AssociationEvent::Associate {
            source: source.id.clone(),
            actor: actor.id.clone(),
            route: route_for(source, actor),
            rate,
            strategy: source.update_strategy.resolve(rate),
            raw_values: actor.use_raw_values,
        });
    }

    fn disassociate(&mut self, source: &IoSource, actor: &IoActor) {
        self.send(AssociationEvent::Disassociate {
            source: source.id.clone(),
            actor: actor.id.clone(),
        });
    }
}
