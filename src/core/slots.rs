//! Time-slot loading for the selected date.
//!
//! Every request bumps a generation counter. A result is only applied when
//! it belongs to the newest request, so a slow response for a date the user
//! already moved away from can never overwrite the slots of the new date.

use crate::domain::model::TimeSlot;
use crate::utils::error::Result;
use chrono::NaiveDate;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotTicket {
    generation: u64,
    date: NaiveDate,
}

impl SlotTicket {
    pub fn date(&self) -> NaiveDate {
        self.date
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SlotsState {
    #[default]
    Idle,
    Loading {
        date: NaiveDate,
    },
    Loaded {
        date: NaiveDate,
        slots: Vec<TimeSlot>,
    },
    Failed {
        date: NaiveDate,
        message: String,
    },
}

#[derive(Debug, Clone, Default)]
pub struct SlotLoader {
    generation: u64,
    state: SlotsState,
}

impl SlotLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &SlotsState {
        &self.state
    }

    pub fn request(&mut self, date: NaiveDate) -> SlotTicket {
        self.generation += 1;
        self.state = SlotsState::Loading { date };
        SlotTicket {
            generation: self.generation,
            date,
        }
    }

    /// Returns `false` when the ticket is stale and the result was dropped.
    pub fn resolve(&mut self, ticket: SlotTicket, result: Result<Vec<TimeSlot>>) -> bool {
        match result {
            Ok(slots) => {
                if self.is_stale(ticket) {
                    return false;
                }
                tracing::debug!(date = %ticket.date, count = slots.len(), "time slots loaded");
                self.state = SlotsState::Loaded {
                    date: ticket.date,
                    slots,
                };
                true
            }
            Err(e) => self.fail(ticket, e.user_friendly_message()),
        }
    }

    pub fn fail(&mut self, ticket: SlotTicket, message: String) -> bool {
        if self.is_stale(ticket) {
            return false;
        }
        tracing::warn!(date = %ticket.date, %message, "failed to load time slots");
        self.state = SlotsState::Failed {
            date: ticket.date,
            message,
        };
        true
    }

    fn is_stale(&self, ticket: SlotTicket) -> bool {
        let stale = ticket.generation != self.generation;
        if stale {
            tracing::debug!(date = %ticket.date, "discarding stale time slots");
        }
        stale
    }

    /// Drops whatever is loaded or pending; late results become stale.
    pub fn clear(&mut self) {
        self.generation += 1;
        self.state = SlotsState::Idle;
    }

    pub fn slots(&self) -> &[TimeSlot] {
        match &self.state {
            SlotsState::Loaded { slots, .. } => slots,
            _ => &[],
        }
    }

    pub fn find(&self, time: &str) -> Option<&TimeSlot> {
        self.slots().iter().find(|s| s.time == time)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::BookingError;

    fn slot(time: &str, available: bool) -> TimeSlot {
        TimeSlot {
            time: time.to_string(),
            available,
        }
    }

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 11, day).unwrap()
    }

    #[test]
    fn test_newest_request_wins() {
        let mut loader = SlotLoader::new();
        let first = loader.request(date(2));
        let second = loader.request(date(3));

        assert!(loader.resolve(second, Ok(vec![slot("10:00", true)])));
        assert!(!loader.resolve(first, Ok(vec![slot("09:00", true)])));

        assert_eq!(
            loader.state(),
            &SlotsState::Loaded {
                date: date(3),
                slots: vec![slot("10:00", true)]
            }
        );
    }

    #[test]
    fn test_stale_result_cannot_clear_loading_state() {
        let mut loader = SlotLoader::new();
        let first = loader.request(date(2));
        let _second = loader.request(date(3));

        assert!(!loader.resolve(first, Ok(vec![slot("09:00", true)])));
        assert_eq!(loader.state(), &SlotsState::Loading { date: date(3) });
    }

    #[test]
    fn test_failure_is_retry_eligible() {
        let mut loader = SlotLoader::new();
        let ticket = loader.request(date(2));
        loader.resolve(
            ticket,
            Err(BookingError::ApiResponseError {
                status: 500,
                message: "Request failed".to_string(),
            }),
        );
        assert!(matches!(loader.state(), SlotsState::Failed { .. }));

        let retry = loader.request(date(2));
        loader.resolve(retry, Ok(vec![slot("11:30", false)]));
        assert_eq!(loader.find("11:30"), Some(&slot("11:30", false)));
    }

    #[test]
    fn test_clear_invalidates_pending_ticket() {
        let mut loader = SlotLoader::new();
        let ticket = loader.request(date(2));
        loader.clear();

        assert!(!loader.resolve(ticket, Ok(vec![slot("10:00", true)])));
        assert_eq!(loader.state(), &SlotsState::Idle);
        assert!(loader.slots().is_empty());
    }
}
