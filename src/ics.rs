use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeDelta, Utc};
use ics::{
    components::{Parameter, Property},
    escape_text,
    parameters::TzIDParam,
    properties::{Description, DtEnd, DtStart, Location, Summary, Trigger},
    Alarm, Event, ICalendar, Standard, TimeZone,
};

use crate::{config::CalendarConfig, error::Result, timetable::models::CourseOccurrence};

/// Calendar document of the occurrences, as iCalendar bytes
pub fn serialize(courses: &[CourseOccurrence], config: &CalendarConfig) -> Result<Vec<u8>> {
    serialize_at(courses, config, Utc::now())
}

/// Same as [`serialize`] with a fixed `DTSTAMP`
pub fn serialize_at(
    courses: &[CourseOccurrence],
    config: &CalendarConfig,
    stamp: DateTime<Utc>,
) -> Result<Vec<u8>> {
    let mut calendar = ICalendar::new("2.0", config.prodid.as_str());

    // Feed metadata read by subscribing clients
    calendar.push(Property::new("X-WR-CALNAME", escape_text(config.name.as_str())));
    calendar.push(Property::new("X-WR-TIMEZONE", config.timezone.as_str()));
    calendar.push(Property::new("X-PUBLISHED-TTL", duration_ical(config.refresh)));
    let mut refresh = Property::new("REFRESH-INTERVAL", duration_ical(config.refresh));
    refresh.add(Parameter::new("VALUE", "DURATION"));
    calendar.push(refresh);

    if config.with_tz {
        let offset = offset_ical(config.utc_offset);
        calendar.add_timezone(TimeZone::standard(
            config.timezone.as_str(),
            Standard::new("19700101T000000", offset.clone(), offset),
        ));
    }

    let dtstamp = stamp.format("%Y%m%dT%H%M%SZ").to_string();
    for course in courses {
        let mut event = Event::new(uid(course, config), dtstamp.clone());

        event.push(Summary::new(escape_text(course.name.as_str())));
        event.push(Location::new(escape_text(course.location.as_str())));
        event.push(Description::new(escape_text(format!(
            "教师: {}\n第{}周",
            course.teacher, course.week
        ))));

        let mut dtstart = DtStart::new(dt_ical(course.start));
        let mut dtend = DtEnd::new(dt_ical(course.end));
        if config.with_tz {
            dtstart.add(TzIDParam::new(config.timezone.as_str()));
            dtend.add(TzIDParam::new(config.timezone.as_str()));
        }
        event.push(dtstart);
        event.push(dtend);

        event.add_alarm(Alarm::display(
            Trigger::new(duration_ical(-config.reminder)),
            Description::new(escape_text(format!("{} 即将开始", course.name))),
        ));

        calendar.add_event(event);
    }

    let mut document = Vec::new();
    calendar.write(&mut document)?;
    log::info!("Built a calendar of {} events", courses.len());

    Ok(document)
}

/// Write the calendar to `filename`, adding the `.ics` extension if needed
pub fn export(
    courses: &[CourseOccurrence],
    filename: &mut String,
    config: &CalendarConfig,
) -> Result<()> {
    if !filename.ends_with(".ics") {
        filename.push_str(".ics");
    }

    std::fs::write(&*filename, serialize(courses, config)?)?;

    Ok(())
}

/// Stable identifier of an occurrence: course hash, start instant and domain
///
/// Regenerating the feed gives the same UID to the same occurrence, which is
/// what lets subscribed clients update events instead of duplicating them.
pub fn uid(course: &CourseOccurrence, config: &CalendarConfig) -> String {
    let hash = format!("{:x}", md5::compute(course.name.as_bytes()));
    let epoch =
        course.start.and_utc().timestamp() - i64::from(config.utc_offset.local_minus_utc());

    format!("{}-{epoch}@{}", &hash[..8], config.domain)
}

fn dt_ical(dt: NaiveDateTime) -> String {
    dt.format("%Y%m%dT%H%M%S").to_string()
}

/// RFC 5545 duration, i.e. `-PT35M`
fn duration_ical(delta: TimeDelta) -> String {
    let sign = if delta < TimeDelta::zero() { "-" } else { "" };
    let secs = delta.num_seconds().abs();

    match secs {
        s if s % 3600 == 0 => format!("{sign}PT{}H", s / 3600),
        s if s % 60 == 0 => format!("{sign}PT{}M", s / 60),
        s => format!("{sign}PT{s}S"),
    }
}

/// UTC offset as written in a VTIMEZONE, i.e. `+0800`
fn offset_ical(offset: FixedOffset) -> String {
    let secs = offset.local_minus_utc();
    let sign = if secs < 0 { '-' } else { '+' };
    let minutes = secs.abs() / 60;

    format!("{sign}{:02}{:02}", minutes / 60, minutes % 60)
}
