use chrono::{Days, NaiveDate};

use crate::config::Slot;
use crate::timetable::models::{CourseInfo, CourseOccurrence, Skip};

/// One occurrence per week of a course held on `weekday` (1 = monday)
///
/// `semester_start` is the monday of week 1. Times stay civil, the timezone
/// only matters when the calendar is written.
pub fn expand(
    info: &CourseInfo,
    weeks: &[u32],
    slot: Slot,
    weekday: usize,
    semester_start: NaiveDate,
) -> Result<Vec<CourseOccurrence>, Skip> {
    let column =
        u64::try_from(weekday.saturating_sub(1)).map_err(|_| Skip::ColumnOutOfRange(weekday))?;

    weeks
        .iter()
        .map(|&week| {
            let offset = u64::from(week.saturating_sub(1)) * 7 + column;
            let date = semester_start
                .checked_add_days(Days::new(offset))
                .ok_or(Skip::DateOverflow(week))?;

            Ok(CourseOccurrence {
                name: info.name.clone(),
                teacher: info.teacher.clone(),
                location: info.location.clone(),
                week,
                start: date.and_time(slot.start),
                end: date.and_time(slot.end),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SlotTable;
    use chrono::{NaiveDateTime, NaiveTime};
    use pretty_assertions::assert_eq;

    fn info() -> CourseInfo {
        CourseInfo {
            name: "高等数学".to_owned(),
            teacher: "张三".to_owned(),
            descriptor: "1-16(周)[01-02节]".to_owned(),
            location: "A101".to_owned(),
        }
    }

    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 9, 8).unwrap()
    }

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_time(NaiveTime::from_hms_opt(h, min, 0).unwrap())
    }

    #[test]
    fn first_slot_of_first_monday() {
        let slot = SlotTable::default().get(1).unwrap();
        let got = expand(&info(), &[1], slot, 1, monday()).unwrap();

        assert_eq!(
            got,
            vec![CourseOccurrence {
                name: "高等数学".to_owned(),
                teacher: "张三".to_owned(),
                location: "A101".to_owned(),
                week: 1,
                start: at(2025, 9, 8, 8, 20),
                end: at(2025, 9, 8, 10, 0),
            }]
        );
    }

    #[test]
    fn weeks_and_weekday_shift_the_date() {
        let slot = SlotTable::default().get(2).unwrap();
        let got = expand(&info(), &[3, 1], slot, 5, monday()).unwrap();

        let starts: Vec<_> = got.iter().map(|o| o.start).collect();
        // Friday of week 3, then friday of week 1
        assert_eq!(starts, vec![at(2025, 9, 26, 10, 20), at(2025, 9, 12, 10, 20)]);
        assert!(got.iter().all(|o| o.end > o.start));
    }

    #[test]
    fn semester_crossing_a_month_and_year() {
        let slot = SlotTable::default().get(6).unwrap();
        let start = NaiveDate::from_ymd_opt(2025, 12, 22).unwrap();
        let got = expand(&info(), &[2], slot, 7, start).unwrap();

        assert_eq!(got[0].start, at(2026, 1, 4, 19, 30));
        assert_eq!(got[0].end, at(2026, 1, 4, 21, 10));
    }

    #[test]
    fn no_week_no_occurrence() {
        let slot = SlotTable::default().get(1).unwrap();
        assert!(expand(&info(), &[], slot, 1, monday()).unwrap().is_empty());
    }

    #[test]
    fn overflowing_date_is_skipped() {
        let slot = SlotTable::default().get(1).unwrap();
        let got = expand(&info(), &[2], slot, 1, NaiveDate::MAX);
        assert_eq!(got, Err(Skip::DateOverflow(2)));
    }
}
