use std::sync::LazyLock;

use chrono::{FixedOffset, NaiveTime, TimeDelta};
use regex::Regex;

use crate::error::{Error, Result};

/// One daily time window, shared by every weekday
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Slot {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl Slot {
    /// Build a slot, refusing empty or reversed windows
    pub fn new(start: NaiveTime, end: NaiveTime) -> Option<Self> {
        (end > start).then_some(Self { start, end })
    }
}

/// Lesson slots of the day, indexed from 1
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SlotTable(Vec<Slot>);

impl SlotTable {
    /// Slot for a 1-based index
    pub fn get(&self, index: u32) -> Option<Slot> {
        let i = usize::try_from(index).ok()?.checked_sub(1)?;
        self.0.get(i).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Slot> {
        self.0.iter()
    }

    /// Parse a comma separated list like `08:20-10:00,10:20-12:00`
    pub fn parse(raw: &str) -> Result<Self> {
        // h1 => start hour | m1 => start minute
        // h2 => end hour   | m2 => end minute
        static RE: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new(
                r"^(?P<h1>\d{1,2})(h|:)(?P<m1>\d{1,2})?\s*-\s*(?P<h2>\d{1,2})(h|:)(?P<m2>\d{1,2})?$",
            )
            .unwrap()
        });

        let mut slots = Vec::new();
        for entry in raw.split(',').map(str::trim).filter(|e| !e.is_empty()) {
            let invalid = || Error::InvalidSlot(entry.to_owned());
            let captures = RE.captures(entry).ok_or_else(invalid)?;

            let number = |name: &str| -> Result<u32> {
                captures
                    .name(name)
                    .map_or(Ok(0), |m| m.as_str().parse().map_err(|_| invalid()))
            };

            let start = NaiveTime::from_hms_opt(number("h1")?, number("m1")?, 0).ok_or_else(invalid)?;
            let end = NaiveTime::from_hms_opt(number("h2")?, number("m2")?, 0).ok_or_else(invalid)?;
            slots.push(Slot::new(start, end).ok_or_else(invalid)?);
        }

        if slots.is_empty() {
            return Err(Error::InvalidSlot(raw.to_owned()));
        }

        Ok(Self(slots))
    }
}

impl Default for SlotTable {
    fn default() -> Self {
        Self::parse("08:20-10:00,10:20-12:00,14:00-15:40,16:00-17:35,17:40-19:20,19:30-21:10")
            .expect("built-in slot table is well formed")
    }
}

/// Feed-level settings of the generated calendar
#[derive(Clone, Debug)]
pub struct CalendarConfig {
    /// Shown by clients as the calendar's name
    pub name: String,
    pub prodid: String,
    /// IANA identifier of the single civil timezone
    pub timezone: String,
    pub utc_offset: FixedOffset,
    /// Emit a VTIMEZONE and TZID parameters, else floating times
    pub with_tz: bool,
    /// Right-hand side of every event UID
    pub domain: String,
    pub reminder: TimeDelta,
    pub refresh: TimeDelta,
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            name: "我的课程表".to_owned(),
            prodid: "-//课表订阅//江西职业技术大学//CN".to_owned(),
            timezone: "Asia/Shanghai".to_owned(),
            utc_offset: FixedOffset::east_opt(8 * 3600).expect("+08:00 is a valid offset"),
            with_tz: true,
            domain: "jxpu.edu.cn".to_owned(),
            reminder: TimeDelta::minutes(35),
            refresh: TimeDelta::hours(1),
        }
    }
}

/// Where and how the timetable page is fetched
#[derive(Clone, Debug)]
pub struct PortalConfig {
    pub cas_url: String,
    pub portal_url: String,
    /// Domain the SSO cookie is seeded for
    pub cookie_domain: String,
    pub user_agent: String,
    /// Accept invalid TLS certificates
    pub insecure: bool,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            cas_url: "https://sso.jxpu.edu.cn/cas".to_owned(),
            portal_url: "https://jiaowu.jxpu.edu.cn".to_owned(),
            cookie_domain: ".jxpu.edu.cn".to_owned(),
            user_agent: format!("kbcal/{}", env!("CARGO_PKG_VERSION")),
            insecure: false,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct Config {
    pub slots: SlotTable,
    pub calendar: CalendarConfig,
    pub portal: PortalConfig,
}
