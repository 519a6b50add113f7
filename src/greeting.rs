use chrono::{Local, Timelike};

pub const MORNING: &str = "Good morning!";
pub const AFTERNOON: &str = "Good afternoon!";
pub const EVENING: &str = "Good evening!";

/// Greeting for a local wall-clock hour (0-23). Buckets split at 12 and 18.
pub fn greet(hour: u32) -> &'static str {
    if hour < 12 {
        MORNING
    } else if hour < 18 {
        AFTERNOON
    } else {
        EVENING
    }
}

pub fn current_hour() -> u32 {
    Local::now().hour()
}
