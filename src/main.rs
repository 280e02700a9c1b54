use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{NaiveDate, TimeDelta};
use clap::{ArgGroup, Parser};
use dialoguer::Input;

use kbcal::{
    config::{CalendarConfig, Config, PortalConfig, SlotTable},
    ics, timetable, utils, Error,
};

#[derive(Parser)]
#[clap(version, about, long_about = None)]
#[clap(group(ArgGroup::new("source").required(true).args(["input", "tgc"])))]
struct Args {
    /// Timetable page already saved from the portal
    #[clap(short, long, value_name = "HTML FILE", env = "KBCAL_INPUT")]
    input: Option<PathBuf>,

    /// TGC cookie of a logged-in SSO session, to fetch the timetable page
    #[clap(short, long, value_name = "COOKIE", env = "KBCAL_TGC", hide_env_values = true)]
    tgc: Option<String>,

    /// Monday of the first week of the semester, i.e.: 2025-09-08
    #[clap(short, long, value_name = "YYYY-MM-DD", env = "KBCAL_FIRST_DAY")]
    first_day: Option<String>,

    /// Export to iCalendar format (.ics)
    #[clap(short, long, value_name = "FILE NAME", env = "KBCAL_EXPORT")]
    export: Option<String>,

    /// Replace the lesson slots, i.e.: 08:20-10:00,10:20-12:00
    #[clap(long, value_name = "SLOTS", env = "KBCAL_SLOTS")]
    slots: Option<String>,

    /// Name shown by calendar clients
    #[clap(long, value_name = "NAME", env = "KBCAL_CALENDAR_NAME")]
    calendar_name: Option<String>,

    /// Domain used in the events' identifiers
    #[clap(long, value_name = "DOMAIN", env = "KBCAL_DOMAIN")]
    domain: Option<String>,

    /// Minutes of warning before each course
    #[clap(long, value_name = "MINUTES", env = "KBCAL_REMINDER")]
    reminder: Option<i64>,

    /// If the exported ICS file should not use the timezone
    #[clap(short, long)]
    no_tz: bool,

    /// Accept invalid TLS certificates from the portal
    #[clap(long, env = "KBCAL_INSECURE")]
    insecure: bool,
}

impl Args {
    fn config(&self) -> Result<Config> {
        let slots = match &self.slots {
            Some(raw) => SlotTable::parse(raw)?,
            None => SlotTable::default(),
        };

        let mut calendar = CalendarConfig {
            with_tz: !self.no_tz,
            ..CalendarConfig::default()
        };
        if let Some(name) = &self.calendar_name {
            calendar.name.clone_from(name);
        }
        if let Some(domain) = &self.domain {
            calendar.domain.clone_from(domain);
        }
        if let Some(minutes) = self.reminder {
            calendar.reminder = TimeDelta::minutes(minutes);
        }

        let portal = PortalConfig {
            insecure: self.insecure,
            ..PortalConfig::default()
        };

        Ok(Config {
            slots,
            calendar,
            portal,
        })
    }
}

fn parse_date(raw: &str) -> Result<NaiveDate, Error> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| Error::InvalidDate(raw.to_owned()))
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    let args = Args::parse();
    let config = args.config()?;

    let html = match (&args.input, &args.tgc) {
        (Some(path), _) => std::fs::read_to_string(path)
            .with_context(|| format!("Can't read {}", path.display()))?,
        (None, Some(tgc)) => {
            println!("正在获取课表...");
            utils::get_timetable_page(tgc, &config.portal)
                .await
                .context("Can't reach the timetable, is the TGC cookie still valid?")?
        }
        (None, None) => unreachable!("clap requires a source"),
    };

    let date = match &args.first_day {
        None => Input::new()
            .with_prompt("学期开始日期 (第一周周一)")
            .default("2025-09-08".to_owned())
            .validate_with(|input: &String| parse_date(input).map(|_| ()))
            .interact_text()?,
        Some(day) => day.clone(),
    };
    let semester_start = parse_date(&date)?;

    let courses = match timetable::parse(&html, semester_start, &config) {
        Err(Error::NoTimetable) => {
            anyhow::bail!("No timetable structure in the page, is it the portal's timetable?")
        }
        result => result?,
    };

    if courses.is_empty() {
        println!("课表中没有找到课程");
        return Ok(());
    }

    if let Some(mut filename) = args.export {
        // Export the calendar
        ics::export(&courses, &mut filename, &config.calendar)
            .with_context(|| format!("Can't write {filename}"))?;

        println!("已生成 ICS 文件 => {filename}");
    } else {
        // Show the calendar
        println!("课表预览:");
        timetable::display(&courses, &config.slots);
    }

    Ok(())
}
