//! Timetable of the JXPU academic portal as an iCalendar feed.
//!
//! [`timetable::parse`] turns the portal's timetable page into course
//! occurrences and [`ics::serialize`] writes them as a calendar document.

pub mod config;
pub mod error;
pub mod ics;
pub mod timetable;
pub mod utils;

pub use config::Config;
pub use error::{Error, Result};
pub use timetable::models::CourseOccurrence;
