//! One evaluation pass for the watched departure.
//!
//! A run loads the schedule, fetches the feed once, classifies matching
//! updates and delivers whatever is new today. It never retries; running
//! it periodically is left to an external scheduler such as cron.

use crate::feed::{FeedProvider, match_updates};
use crate::notify::{
    Clock, DedupStatus, Deduplicator, DeliveryChannel, DeliveryError, Notification, RecordStore,
};
use crate::schedule::{ScheduleError, ScheduleIndex, ScheduleQuery, ScheduleSource};
use crate::status::classify_updates;

/// Body of the error sent when the timetable has no matching stop times.
pub const NO_STOP_TIMES_MESSAGE: &str =
    "Could not check for train delays - no relevant stop times found in timetable data";

/// Body of the error sent when the realtime feed is unavailable.
pub const FEED_UNAVAILABLE_MESSAGE: &str =
    "Could not check for train delays - could not fetch real-time data";

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// No stop times matched; an error notification was sent.
    NoRelevantStopTimes,
    /// The feed could not be fetched; an error notification was sent.
    FeedUnavailable,
    /// The feed has nothing yet for the watched trips.
    NoUpdates,
    /// Matching updates were classified and dispatched.
    Completed(RunSummary),
}

/// Counts of what happened to classified notifications.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub delivered: usize,
    pub suppressed: usize,
    pub failed: usize,
}

/// Sequences the watcher's components for one run.
pub struct Monitor<'a, F, S, C> {
    feed: &'a F,
    dedup: &'a Deduplicator<S, C>,
    channels: &'a [Box<dyn DeliveryChannel>],
}

impl<'a, F, S, C> Monitor<'a, F, S, C>
where
    F: FeedProvider,
    S: RecordStore,
    C: Clock,
{
    pub fn new(
        feed: &'a F,
        dedup: &'a Deduplicator<S, C>,
        channels: &'a [Box<dyn DeliveryChannel>],
    ) -> Self {
        Self {
            feed,
            dedup,
            channels,
        }
    }

    /// Run one evaluation pass.
    ///
    /// Expected operational failures (nothing in the timetable, feed down)
    /// are reported to the operator and returned as outcomes. Only an
    /// unreadable schedule is an error.
    pub async fn run<Src: ScheduleSource + ?Sized>(
        &self,
        schedule: &Src,
        query: &ScheduleQuery,
    ) -> Result<RunOutcome, ScheduleError> {
        let index = match ScheduleIndex::load(schedule, query) {
            Ok(index) => index,
            Err(ScheduleError::NoRelevantStopTimes) => {
                tracing::warn!(?query, "no relevant stop times found");
                self.notify_error(NO_STOP_TIMES_MESSAGE).await;
                return Ok(RunOutcome::NoRelevantStopTimes);
            }
            Err(e) => return Err(e),
        };

        let relevant_trip_ids = index.relevant_trip_ids();
        tracing::info!(
            stop_times = index.relevant_stop_times().len(),
            trips = relevant_trip_ids.len(),
            "schedule loaded"
        );

        let updates = match self.feed.fetch_trip_updates().await {
            Ok(updates) => updates,
            Err(e) => {
                tracing::error!(error = %e, "error fetching or processing realtime data");
                self.notify_error(FEED_UNAVAILABLE_MESSAGE).await;
                return Ok(RunOutcome::FeedUnavailable);
            }
        };

        let matched = match_updates(updates, &relevant_trip_ids);
        if matched.is_empty() {
            tracing::info!("no updates found");
            return Ok(RunOutcome::NoUpdates);
        }

        let mut summary = RunSummary::default();
        for classification in classify_updates(&index, &matched) {
            self.dispatch(&classification.notification, &mut summary)
                .await;
        }

        Ok(RunOutcome::Completed(summary))
    }

    async fn dispatch(&self, notification: &Notification, summary: &mut RunSummary) {
        let Notification { key, title, body } = notification;

        if let Some(key) = key
            && let DedupStatus::AlreadySent { timestamp } = self.dedup.check(key, title, body)
        {
            tracing::info!(%key, %title, %body, sent_at = %timestamp, "notification already sent today");
            summary.suppressed += 1;
            return;
        }

        match deliver(self.channels, title, body).await {
            Ok(channel) => {
                tracing::info!(channel, %title, "notification delivered");
                summary.delivered += 1;
                if let Some(key) = key
                    && let Err(e) = self.dedup.record(key, title, body)
                {
                    tracing::warn!(%key, error = %e, "could not persist notification record");
                }
            }
            Err(e) => {
                tracing::error!(%title, %body, error = %e, "notification not delivered");
                summary.failed += 1;
            }
        }
    }

    async fn notify_error(&self, body: &str) {
        let notification = Notification::error(body);
        if let Err(e) = deliver(self.channels, &notification.title, &notification.body).await {
            tracing::error!(%body, error = %e, "error notification not delivered");
        }
    }
}

/// Try enabled channels in order until one succeeds.
///
/// Returns the name of the channel that delivered the notification.
pub async fn deliver<'c>(
    channels: &'c [Box<dyn DeliveryChannel>],
    title: &str,
    body: &str,
) -> Result<&'c str, DeliveryError> {
    let enabled: Vec<&dyn DeliveryChannel> = channels
        .iter()
        .map(|c| c.as_ref())
        .filter(|c| c.enabled())
        .collect();
    let names: Vec<&str> = enabled.iter().map(|c| c.name()).collect();
    tracing::info!(channels = ?names, %title, %body, "sending notification");

    if enabled.is_empty() {
        return Err(DeliveryError::NoChannelsEnabled);
    }

    for channel in enabled.iter().copied() {
        match channel.send(title, body).await {
            Ok(()) => return Ok(channel.name()),
            Err(e) => tracing::warn!(channel = channel.name(), error = %e, "channel failed"),
        }
    }

    Err(DeliveryError::AllChannelsFailed {
        attempted: enabled.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::{StopRelationship, StopTimeUpdate, TripRelationship, TripUpdate};
    use crate::schedule::{RowFilter, StopRecord, StopTimeRecord, TripRecord};
    use crate::testing::{FixedClock, MemoryRecordStore, RecordingChannel, StaticFeed};
    use chrono::NaiveDate;

    struct FixtureSchedule {
        stop_times: Vec<StopTimeRecord>,
    }

    impl FixtureSchedule {
        fn new() -> Self {
            Self {
                stop_times: vec![StopTimeRecord::new("T1", "S1", "07:56:00")],
            }
        }

        fn empty() -> Self {
            Self {
                stop_times: Vec::new(),
            }
        }
    }

    impl ScheduleSource for FixtureSchedule {
        fn stops(
            &self,
            filter: RowFilter<'_, StopRecord>,
        ) -> Result<Vec<StopRecord>, ScheduleError> {
            let stops = vec![StopRecord::new("S1", "Central Station Platform 16")];
            Ok(stops.into_iter().filter(|s| filter(s)).collect())
        }

        fn trips(&self, filter: RowFilter<'_, TripRecord>) -> Result<Vec<TripRecord>, ScheduleError> {
            let trips = vec![TripRecord::new("T1", "BMT_1")];
            Ok(trips.into_iter().filter(|t| filter(t)).collect())
        }

        fn stop_times(
            &self,
            filter: RowFilter<'_, StopTimeRecord>,
        ) -> Result<Vec<StopTimeRecord>, ScheduleError> {
            Ok(self.stop_times.iter().filter(|st| filter(*st)).cloned().collect())
        }
    }

    fn query() -> ScheduleQuery {
        ScheduleQuery::new("BMT", "Central", "07:56")
    }

    fn dedup(store: &MemoryRecordStore) -> Deduplicator<MemoryRecordStore, FixedClock> {
        let date = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        Deduplicator::new(store.clone(), FixedClock::on(date))
    }

    fn delayed(seconds: i32) -> Vec<TripUpdate> {
        vec![
            TripUpdate::new("T1", TripRelationship::Scheduled).with_stop(
                StopTimeUpdate::new("S1", StopRelationship::Scheduled).with_delay(seconds),
            ),
        ]
    }

    fn channels(channels: &[&RecordingChannel]) -> Vec<Box<dyn DeliveryChannel>> {
        channels
            .iter()
            .map(|c| Box::new((*c).clone()) as Box<dyn DeliveryChannel>)
            .collect()
    }

    #[tokio::test]
    async fn delayed_train_is_notified() {
        let push = RecordingChannel::working("push");
        let channels = channels(&[&push]);
        let store = MemoryRecordStore::default();
        let dedup = dedup(&store);
        let feed = StaticFeed::with_updates(delayed(150));

        let outcome = Monitor::new(&feed, &dedup, &channels)
            .run(&FixtureSchedule::new(), &query())
            .await
            .unwrap();

        assert_eq!(
            outcome,
            RunOutcome::Completed(RunSummary {
                delivered: 1,
                ..Default::default()
            })
        );
        assert_eq!(
            push.sent(),
            vec![(
                "Train delayed".to_string(),
                "07:56 train at Central Station Platform 16 is delayed by 2 minutes".to_string()
            )]
        );
        assert!(store.saved().unwrap().get("T1_S1").is_some());
    }

    #[tokio::test]
    async fn second_run_with_same_data_is_suppressed() {
        let push = RecordingChannel::working("push");
        let channels = channels(&[&push]);
        let store = MemoryRecordStore::default();
        let dedup = dedup(&store);
        let feed = StaticFeed::with_updates(delayed(150));
        let monitor = Monitor::new(&feed, &dedup, &channels);

        monitor.run(&FixtureSchedule::new(), &query()).await.unwrap();
        let second = monitor.run(&FixtureSchedule::new(), &query()).await.unwrap();

        assert_eq!(
            second,
            RunOutcome::Completed(RunSummary {
                suppressed: 1,
                ..Default::default()
            })
        );
        assert_eq!(push.sent().len(), 1);
    }

    #[tokio::test]
    async fn changed_delay_is_notified_again() {
        let push = RecordingChannel::working("push");
        let channels = channels(&[&push]);
        let store = MemoryRecordStore::default();
        let dedup = dedup(&store);

        let first = StaticFeed::with_updates(delayed(150));
        Monitor::new(&first, &dedup, &channels)
            .run(&FixtureSchedule::new(), &query())
            .await
            .unwrap();

        let second = StaticFeed::with_updates(delayed(400));
        Monitor::new(&second, &dedup, &channels)
            .run(&FixtureSchedule::new(), &query())
            .await
            .unwrap();

        let bodies: Vec<String> = push.sent().into_iter().map(|(_, body)| body).collect();
        assert_eq!(bodies.len(), 2);
        assert!(bodies[1].ends_with("is delayed by 7 minutes"));
    }

    #[tokio::test]
    async fn feed_failure_sends_one_error() {
        let push = RecordingChannel::working("push");
        let channels = channels(&[&push]);
        let store = MemoryRecordStore::default();
        let dedup = dedup(&store);
        let feed = StaticFeed::failing();

        let outcome = Monitor::new(&feed, &dedup, &channels)
            .run(&FixtureSchedule::new(), &query())
            .await
            .unwrap();

        assert_eq!(outcome, RunOutcome::FeedUnavailable);
        assert_eq!(
            push.sent(),
            vec![("Error".to_string(), FEED_UNAVAILABLE_MESSAGE.to_string())]
        );
        assert!(store.saved().is_none());
    }

    #[tokio::test]
    async fn empty_schedule_skips_feed() {
        let push = RecordingChannel::working("push");
        let channels = channels(&[&push]);
        let store = MemoryRecordStore::default();
        let dedup = dedup(&store);
        let feed = StaticFeed::with_updates(delayed(150));

        let outcome = Monitor::new(&feed, &dedup, &channels)
            .run(&FixtureSchedule::empty(), &query())
            .await
            .unwrap();

        assert_eq!(outcome, RunOutcome::NoRelevantStopTimes);
        assert_eq!(feed.fetch_count(), 0);
        assert_eq!(
            push.sent(),
            vec![("Error".to_string(), NO_STOP_TIMES_MESSAGE.to_string())]
        );
    }

    #[tokio::test]
    async fn keyless_errors_are_never_suppressed() {
        let push = RecordingChannel::working("push");
        let channels = channels(&[&push]);
        let store = MemoryRecordStore::default();
        let dedup = dedup(&store);
        let feed = StaticFeed::failing();
        let monitor = Monitor::new(&feed, &dedup, &channels);

        monitor.run(&FixtureSchedule::new(), &query()).await.unwrap();
        monitor.run(&FixtureSchedule::new(), &query()).await.unwrap();

        assert_eq!(push.sent().len(), 2);
    }

    #[tokio::test]
    async fn no_matching_updates_ends_quietly() {
        let push = RecordingChannel::working("push");
        let channels = channels(&[&push]);
        let store = MemoryRecordStore::default();
        let dedup = dedup(&store);
        let feed = StaticFeed::with_updates(vec![TripUpdate::new("OTHER", TripRelationship::Canceled)]);

        let outcome = Monitor::new(&feed, &dedup, &channels)
            .run(&FixtureSchedule::new(), &query())
            .await
            .unwrap();

        assert_eq!(outcome, RunOutcome::NoUpdates);
        assert!(push.sent().is_empty());
    }

    #[tokio::test]
    async fn failed_delivery_is_not_recorded() {
        let broken = RecordingChannel::broken("push");
        let channels = channels(&[&broken]);
        let store = MemoryRecordStore::default();
        let dedup = dedup(&store);
        let feed = StaticFeed::with_updates(delayed(150));
        let monitor = Monitor::new(&feed, &dedup, &channels);

        let outcome = monitor.run(&FixtureSchedule::new(), &query()).await.unwrap();
        assert_eq!(
            outcome,
            RunOutcome::Completed(RunSummary {
                failed: 1,
                ..Default::default()
            })
        );
        assert!(store.saved().is_none());

        // Retried on the next run.
        monitor.run(&FixtureSchedule::new(), &query()).await.unwrap();
        assert_eq!(broken.sent().len(), 2);
    }

    #[tokio::test]
    async fn deliver_stops_at_first_success() {
        let disabled = RecordingChannel::disabled("off");
        let broken = RecordingChannel::broken("push");
        let sms = RecordingChannel::working("sms");
        let spare = RecordingChannel::working("spare");
        let channels = channels(&[&disabled, &broken, &sms, &spare]);

        let used = deliver(&channels, "Train on time", "on time").await.unwrap();

        assert_eq!(used, "sms");
        assert!(disabled.sent().is_empty());
        assert_eq!(broken.sent().len(), 1);
        assert_eq!(sms.sent().len(), 1);
        assert!(spare.sent().is_empty());
    }

    #[tokio::test]
    async fn deliver_reports_when_all_fail() {
        let channels = channels(&[
            &RecordingChannel::broken("push"),
            &RecordingChannel::broken("sms"),
        ]);

        let result = deliver(&channels, "Train on time", "on time").await;
        assert!(matches!(
            result,
            Err(DeliveryError::AllChannelsFailed { attempted: 2 })
        ));
    }

    #[tokio::test]
    async fn deliver_without_enabled_channels() {
        let channels = channels(&[&RecordingChannel::disabled("push")]);

        let result = deliver(&channels, "Train on time", "on time").await;
        assert!(matches!(result, Err(DeliveryError::NoChannelsEnabled)));
    }
}
