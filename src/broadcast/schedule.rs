use chrono::{DateTime, Days, Duration, FixedOffset, NaiveTime, TimeZone, Utc};

/// A set of wall-clock times that repeat every day in a fixed UTC offset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailySchedule {
    times: Vec<NaiveTime>,
    offset: FixedOffset,
}

impl DailySchedule {
    pub fn new(mut times: Vec<NaiveTime>, offset: FixedOffset) -> Self {
        times.sort();
        times.dedup();
        Self { times, offset }
    }

    pub fn times(&self) -> &[NaiveTime] {
        &self.times
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// First slot strictly after `after`, or `None` for an empty schedule.
    pub fn next_fire_after(&self, after: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let local_date = after.with_timezone(&self.offset).date_naive();

        // Today's remaining slots, then tomorrow's first one.
        [local_date, local_date.checked_add_days(Days::new(1))?]
            .into_iter()
            .flat_map(|date| self.times.iter().map(move |time| date.and_time(*time)))
            .filter_map(|local| self.offset.from_local_datetime(&local).single())
            .map(|fire| fire.with_timezone(&Utc))
            .find(|fire| *fire > after)
    }

    /// Next slot after `cursor` that is not more than `grace` behind `now`,
    /// with the number of stale slots passed over to reach it.
    pub fn next_due(&self, cursor: DateTime<Utc>, now: DateTime<Utc>, grace: Duration) -> Option<(DateTime<Utc>, usize)> {
        let mut next = self.next_fire_after(cursor)?;
        let mut skipped = 0;
        while next + grace < now {
            skipped += 1;
            next = self.next_fire_after(next)?;
        }
        Some((next, skipped))
    }
}
