use chrono::NaiveDateTime;
use thiserror::Error;

/// The four attributes a portal cell gives for one course
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CourseInfo {
    /// Course's name, never empty
    pub name: String,

    /// Teacher's name, empty when the portal omits it
    pub teacher: String,

    /// Weeks and periods, i.e. `1-16(周)[01-02节]`
    pub descriptor: String,

    /// Room, empty when the portal omits it
    pub location: String,
}

/// One concrete meeting of a course
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CourseOccurrence {
    pub name: String,
    pub teacher: String,
    pub location: String,

    /// Semester week, starting at 1
    pub week: u32,

    /// Civil time the course starts, in the deployment's timezone
    pub start: NaiveDateTime,

    /// Civil time the course ends, always after `start`
    pub end: NaiveDateTime,
}

/// Why a course block didn't produce anything
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum Skip {
    #[error("empty course block")]
    EmptyBlock,

    #[error("fewer than 3 lines, not a course entry")]
    NotACourse,

    #[error("no week in `{0}`")]
    NoWeeks(String),

    #[error("lesson slot {0} is not in the slot table")]
    SlotOutOfRange(u32),

    #[error("weekday column {0} is past sunday")]
    ColumnOutOfRange(usize),

    #[error("date out of range for week {0}")]
    DateOverflow(u32),
}

/// Result of walking one course block of one cell
#[derive(Debug)]
pub enum CellOutcome {
    Ok(Vec<CourseOccurrence>),
    Skipped(Skip),
}
