//! Drag-to-reschedule use case.
//!
//! The timeline widget reports a moved item as millisecond positions; this
//! writes them back to the event's `date_time` as text the date parser reads
//! back to the same instant.

use std::sync::Arc;

use storyteller_domain::{parse_date, Event, EventId, ParseOptions, TimePoint};

use super::TimelineError;
use crate::infrastructure::ports::{ClockPort, EventRepo};

pub struct RescheduleEvent {
    events: Arc<dyn EventRepo>,
    clock: Arc<dyn ClockPort>,
}

impl RescheduleEvent {
    pub fn new(events: Arc<dyn EventRepo>, clock: Arc<dyn ClockPort>) -> Self {
        Self { events, clock }
    }

    /// Moves an event to `start_millis`.
    ///
    /// `end_millis` is the new end of a range item. When it is `None` and the
    /// event currently holds a range, the range keeps its length.
    pub async fn execute(
        &self,
        event_id: EventId,
        start_millis: i64,
        end_millis: Option<i64>,
    ) -> Result<Event, TimelineError> {
        let mut event = self
            .events
            .get(event_id)
            .await?
            .ok_or(TimelineError::EventNotFound(event_id))?;

        let end_millis = end_millis.or_else(|| {
            let opts = ParseOptions::new(self.clock.now().naive_utc());
            let current = parse_date(event.date_time()?, &opts);
            let length = current.end_millis()? - current.start_millis()?;
            start_millis.checked_add(length)
        });

        let (start, end) = match end_millis {
            Some(end) if end < start_millis => (end, Some(start_millis)),
            Some(end) if end == start_millis => (start_millis, None),
            other => (start_millis, other),
        };

        let mut text = format_for_storage(start).ok_or(TimelineError::InvalidDate(start))?;
        if let Some(end) = end {
            let end_text = format_for_storage(end).ok_or(TimelineError::InvalidDate(end))?;
            if end_text != text {
                text = format!("{text} to {end_text}");
            }
        }

        tracing::info!(
            event = %event.name(),
            from = event.date_time().unwrap_or(""),
            to = %text,
            "Rescheduling event"
        );
        event.set_date_time(Some(text));
        self.events.save(&event).await?;
        Ok(event)
    }
}

/// `YYYY-MM-DD`, or `YYYY-MM-DDTHH:MM` when the time is not midnight. Years
/// before 1 CE are written with a `BCE` suffix. Seconds are dropped.
pub fn format_for_storage(millis: i64) -> Option<String> {
    TimePoint::from_millis(millis).map(|point| point.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::clock::FixedClock;
    use crate::infrastructure::ports::MockEventRepo;
    use storyteller_domain::to_millis;

    fn millis(text: &str) -> i64 {
        let opts = ParseOptions::new(FixedClock::at(2024, 6, 1).0.naive_utc());
        to_millis(&parse_date(text, &opts)).unwrap()
    }

    fn use_case(repo: MockEventRepo) -> RescheduleEvent {
        RescheduleEvent::new(Arc::new(repo), Arc::new(FixedClock::at(2024, 6, 1)))
    }

    fn repo_with(event: Event, expected: &'static str) -> MockEventRepo {
        let id = event.id();
        let mut repo = MockEventRepo::new();
        repo.expect_get()
            .withf(move |got| *got == id)
            .returning(move |_| Ok(Some(event.clone())));
        repo.expect_save()
            .withf(move |saved| saved.date_time() == Some(expected))
            .times(1)
            .returning(|_| Ok(()));
        repo
    }

    mod formatting {
        use super::*;

        #[test]
        fn midnight_is_a_plain_date() {
            assert_eq!(
                format_for_storage(millis("2024-03-15")).as_deref(),
                Some("2024-03-15")
            );
        }

        #[test]
        fn time_of_day_is_kept_to_the_minute() {
            assert_eq!(
                format_for_storage(millis("2024-03-15T14:30:45")).as_deref(),
                Some("2024-03-15T14:30")
            );
        }

        #[test]
        fn bce_years_round_trip_through_the_parser() {
            let original = millis("15 March 44 BCE");
            let text = format_for_storage(original).unwrap();
            assert_eq!(text, "0044-03-15 BCE");
            assert_eq!(millis(&text), original);
        }
    }

    #[tokio::test]
    async fn when_point_event_moves_then_new_date_is_saved() {
        let event = Event::new("Coronation").with_date_time("1200-03-15");
        let id = event.id();
        let use_case = use_case(repo_with(event, "1200-04-01"));

        let moved = use_case.execute(id, millis("1200-04-01"), None).await.unwrap();

        assert_eq!(moved.date_time(), Some("1200-04-01"));
    }

    #[tokio::test]
    async fn when_range_moves_without_end_then_length_is_kept() {
        let event = Event::new("Siege").with_date_time("1201-05-01 to 1201-05-10");
        let id = event.id();
        let use_case = use_case(repo_with(event, "1201-06-01 to 1201-06-10"));

        use_case
            .execute(id, millis("1201-06-01"), None)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn when_end_precedes_start_then_endpoints_are_swapped() {
        let event = Event::new("Voyage").with_date_time("1300");
        let id = event.id();
        let use_case = use_case(repo_with(event, "1300-01-01 to 1300-02-01"));

        use_case
            .execute(id, millis("1300-02-01"), Some(millis("1300-01-01")))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn when_event_is_missing_then_not_found() {
        let mut repo = MockEventRepo::new();
        repo.expect_get().returning(|_| Ok(None));
        repo.expect_save().never();

        let result = use_case(repo).execute(EventId::new(), 0, None).await;

        assert!(matches!(result, Err(TimelineError::EventNotFound(_))));
    }
}
