use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BookingStep {
    SelectingDate,
    SelectingTime,
    ReviewingNotes,
    Submitting,
    Confirmed,
}

impl BookingStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStep::SelectingDate => "selecting_date",
            BookingStep::SelectingTime => "selecting_time",
            BookingStep::ReviewingNotes => "reviewing_notes",
            BookingStep::Submitting => "submitting",
            BookingStep::Confirmed => "confirmed",
        }
    }

    /// Selection is frozen while a request is in flight and after success.
    pub fn accepts_input(&self) -> bool {
        !matches!(self, BookingStep::Submitting | BookingStep::Confirmed)
    }
}

/// What the user has picked so far in one booking attempt.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct BookingDraft {
    pub date: Option<String>,
    pub time: Option<String>,
    pub notes: String,
}

impl BookingDraft {
    pub fn is_complete(&self) -> bool {
        self.date.is_some() && self.time.is_some()
    }
}
