use std::sync::OnceLock;

pub const OPEN_HOUR: u32 = 9;
pub const CLOSE_HOUR: u32 = 20;
pub const STEP_MINUTES: u32 = 30;

/// The ordered set of bookable `HH:MM` labels for one service day.
///
/// Its length is the denominator of every "fully booked" decision, so the
/// customer and owner screens must both use [`TimeGrid::standard`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeGrid {
    slots: Vec<String>,
}

impl TimeGrid {
    /// Slots from `open_hour:00` up to (not including) `close_hour:00`.
    pub fn generate(open_hour: u32, close_hour: u32, step_minutes: u32) -> Self {
        if step_minutes == 0 || close_hour <= open_hour {
            return Self { slots: Vec::new() };
        }

        let slots = (open_hour * 60..close_hour * 60)
            .step_by(step_minutes as usize)
            .map(|minute| format!("{:02}:{:02}", minute / 60, minute % 60))
            .collect();

        Self { slots }
    }

    /// The process-wide 09:00–19:30 grid.
    pub fn standard() -> &'static TimeGrid {
        static GRID: OnceLock<TimeGrid> = OnceLock::new();
        GRID.get_or_init(|| TimeGrid::generate(OPEN_HOUR, CLOSE_HOUR, STEP_MINUTES))
    }

    pub fn slots(&self) -> &[String] {
        &self.slots
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn contains(&self, time: &str) -> bool {
        self.slots.iter().any(|slot| slot == time)
    }
}
