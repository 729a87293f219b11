use lib_router::AssociationEvent;
use tokio::sync::mpsc;

/// Totals reported when the event stream ends.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct EventTotals {
    pub associated: u64,
    pub disassociated: u64,
}

/// Drains association events into the log until every sender is gone.
pub async fn log_events(mut rx: mpsc::UnboundedReceiver<AssociationEvent>) -> EventTotals {
    let mut totals = EventTotals::default();

    while let Some(event) = rx.recv().await {
        match event {
            AssociationEvent::Associate { source, actor, route, rate, strategy, raw_values } => {
                totals.associated += 1;
                let rate = rate.map_or_else(|| "unlimited".to_string(), |ms| format!("{} ms", ms));
                log::info!(
                    "ASSOCIATE {} -> {} on '{}' at {} ({:?}{})",
                    source,
                    actor,
                    route,
                    rate,
                    strategy,
                    if raw_values { ", raw" } else { "" }
                );
            }
            AssociationEvent::Disassociate { source, actor } => {
                totals.disassociated += 1;
                log::info!("DISASSOCIATE {} -> {}", source, actor);
            }
        }
    }

    log::info!(
        "Event stream closed after {} associate and {} disassociate events",
        totals.associated,
        totals.disassociated
    );
    totals
}
