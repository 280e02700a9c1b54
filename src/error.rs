use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// The page has no `table.Nsb_r_list.Nsb_table`, so it isn't a portal timetable
    #[error("no timetable structure found in the document")]
    NoTimetable,

    /// The portal answered but not with the timetable page
    #[error("session expired or unexpected page at {0}")]
    SessionExpired(String),

    #[error("invalid portal URL `{0}`")]
    InvalidUrl(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid date `{0}`, expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("invalid lesson slot `{0}`, expected HH:MM-HH:MM with end after start")]
    InvalidSlot(String),
}
