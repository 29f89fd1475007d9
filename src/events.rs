use chrono::{DateTime, Utc};
use k8s_openapi::api::core::v1::Event;
use std::time::Duration;
use tracing::debug;

use crate::context::CallContext;
use crate::kubernetes::ClusterApi;
use crate::types::{CompactedEvent, CompactedEventList, Payload, Record, Step, events_record_name};
use crate::utils::to_time_delta;

/// Closed time range `[start, end]` that events must fall in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl EventWindow {
    pub fn trailing(now: DateTime<Utc>, interval: Duration) -> Self {
        let start = now
            .checked_sub_signed(to_time_delta(interval))
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        Self { start, end: now }
    }

    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.start <= at && at <= self.end
    }
}

/// When the event was last seen: `lastTimestamp`, then `eventTime`, then
/// `firstTimestamp`.
pub fn observed_at(event: &Event) -> Option<DateTime<Utc>> {
    event
        .last_timestamp
        .as_ref()
        .map(|t| t.0)
        .or_else(|| event.event_time.as_ref().map(|t| t.0))
        .or_else(|| event.first_timestamp.as_ref().map(|t| t.0))
}

/// Keep the events inside `window`, in the order they were listed.
pub fn compact_events(namespace: &str, events: Vec<Event>, window: &EventWindow) -> CompactedEventList {
    let items = events
        .into_iter()
        .filter_map(|event| {
            let seen = observed_at(&event).filter(|at| window.contains(*at))?;
            Some(CompactedEvent {
                namespace: event
                    .metadata
                    .namespace
                    .unwrap_or_else(|| namespace.to_string()),
                last_timestamp: seen,
                reason: event.reason.unwrap_or_default(),
                message: event.message.unwrap_or_default(),
                type_: event.type_.unwrap_or_default(),
            })
        })
        .collect();
    CompactedEventList { items }
}

pub async fn collect_events(
    api: &dyn ClusterApi,
    ctx: &CallContext,
    namespace: &str,
    window: EventWindow,
) -> anyhow::Result<Vec<Record>> {
    let events = ctx.run(Step::CollectEvents, api.list_events(namespace)).await?;
    let listed = events.len();
    let compacted = compact_events(namespace, events, &window);
    debug!(
        "Kept {} of {} events in {} since {}",
        compacted.items.len(),
        listed,
        namespace,
        window.start
    );
    Ok(vec![Record::new(
        events_record_name(namespace),
        Payload::Events(compacted),
    )])
}
