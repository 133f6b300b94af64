//! A month calendar. The full page shows the current month; the
//! `month` event returns any month as a JSON `table` payload.

use chrono::{Datelike, NaiveDate};
use serde_json::json;

use crate::acontext::PageContext;
use crate::controller::{MainState, Page};
use crate::error::PageError;
use crate::event::{EventScope, EventTable, ValidationErrors};
use crate::pages::PageId;
use crate::webutils::html_escape;

pub struct CalendarPage {
    events: EventTable,
}

impl CalendarPage {
    pub fn new() -> Self {
        CalendarPage { events: EventTable::new().on("month", month) }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Month {
    pub year: i32,
    /// 1..=12
    pub month: u32,
}

impl Month {
    pub fn of(date: NaiveDate) -> Self {
        Month { year: date.year(), month: date.month() }
    }

    /// `YYYY-MM`
    pub fn parse(s: &str) -> Option<Self> {
        let (y, m) = s.trim().split_once('-')?;
        let year: i32 = y.parse().ok()?;
        let month: u32 = m.parse().ok()?;
        NaiveDate::from_ymd_opt(year, month, 1)?;
        Some(Month { year, month })
    }

    pub fn first_day(self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
    }

    pub fn next(self) -> Self {
        if self.month == 12 {
            Month { year: self.year + 1, month: 1 }
        } else {
            Month { year: self.year, month: self.month + 1 }
        }
    }

    pub fn prev(self) -> Self {
        if self.month == 1 {
            Month { year: self.year - 1, month: 12 }
        } else {
            Month { year: self.year, month: self.month - 1 }
        }
    }

    pub fn days(self) -> u32 {
        match (self.first_day(), self.next().first_day()) {
            (Some(a), Some(b)) => (b - a).num_days() as u32,
            _ => 0,
        }
    }

    /// Weeks starting on Monday; `None` for days outside the month.
    pub fn weeks(self) -> Vec<[Option<u32>; 7]> {
        let Some(first) = self.first_day() else {
            return Vec::new()
        };
        let offset = first.weekday().num_days_from_monday() as usize;
        let mut weeks = Vec::new();
        let mut week = [None; 7];
        for day in 1..=self.days() {
            let i = (offset + day as usize - 1) % 7;
            week[i] = Some(day);
            if i == 6 {
                weeks.push(week);
                week = [None; 7];
            }
        }
        if week.iter().any(Option::is_some) {
            weeks.push(week);
        }
        weeks
    }

    pub fn key(self) -> String {
        format!("{:04}-{:02}", self.year, self.month)
    }
}

fn title(month: Month, context: &PageContext) -> String {
    format!("{} {}", context.text(&format!("month-{}", month.month)), month.year)
}

fn weekday_names(context: &PageContext) -> Vec<String> {
    (1..=7).map(|i| context.text(&format!("weekday-{i}"))).collect()
}

fn table_html(month: Month, context: &PageContext) -> String {
    let mut out = String::from("<table class=\"calendar\"><thead><tr>");
    for name in weekday_names(context) {
        out.push_str(&format!("<th>{}</th>", html_escape(&name)));
    }
    out.push_str("</tr></thead><tbody>");
    for week in month.weeks() {
        out.push_str("<tr>");
        for day in week {
            match day {
                Some(d) => out.push_str(&format!("<td>{d}</td>")),
                None => out.push_str("<td></td>"),
            }
        }
        out.push_str("</tr>");
    }
    out.push_str("</tbody></table>");
    out
}

impl Page for CalendarPage {
    fn id(&self) -> PageId { PageId::Calendar }
    fn template(&self) -> &str { "calendar.html" }
    fn events(&self) -> &EventTable { &self.events }

    fn prepare(&self, main: &mut MainState, context: &PageContext) -> Result<(), PageError> {
        let month = Month::of(context.today());
        main.data.insert("calendar-title", html_escape(&title(month, context)).into_owned());
        main.data.insert("calendar-month", month.key());
        main.data.insert("calendar-table", table_html(month, context));
        Ok(())
    }
}

fn month(scope: &mut EventScope<'_>) -> Result<(), PageError> {
    let month = match scope.request.get("month").filter(|s| !s.trim().is_empty()) {
        None => Month::of(scope.context.today()),
        Some(s) => match Month::parse(s) {
            Some(m) => m,
            None => {
                let mut errors = ValidationErrors::new();
                errors.add("month", "error-invalid-month");
                return Err(errors.into())
            }
        }
    };
    let context = &*scope.context;
    let rows: Vec<Vec<String>> = month.weeks().iter()
        .map(|week| week.iter()
             .map(|d| d.map(|d| d.to_string()).unwrap_or_default())
             .collect())
        .collect();
    let payload = json!({
        "title": title(month, context),
        "month": month.key(),
        "prev": month.prev().key(),
        "next": month.next().key(),
        "head": weekday_names(context),
        "rows": rows,
    });
    scope.main.response.set_json(payload).set_type_target("table");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::acontext::RequestInfo;
    use crate::config::Config;
    use crate::controller::MainController;
    use crate::http_request_method::HttpRequestMethod;
    use crate::session::SessionData;

    #[test]
    fn t_month() {
        assert_eq!(Month::parse("2024-02"), Some(Month { year: 2024, month: 2 }));
        assert_eq!(Month::parse("2024-13"), None);
        assert_eq!(Month::parse("2024"), None);
        assert_eq!(Month { year: 2024, month: 2 }.days(), 29);
        assert_eq!(Month { year: 2023, month: 2 }.days(), 28);
        assert_eq!(Month { year: 2024, month: 12 }.next().key(), "2025-01");
        assert_eq!(Month { year: 2024, month: 1 }.prev().key(), "2023-12");
    }

    #[test]
    fn t_weeks() {
        // 2024-02-01 is a Thursday
        let weeks = Month { year: 2024, month: 2 }.weeks();
        assert_eq!(weeks.len(), 5);
        assert_eq!(weeks[0], [None, None, None, Some(1), Some(2), Some(3), Some(4)]);
        assert_eq!(weeks[4], [Some(26), Some(27), Some(28), Some(29), None, None, None]);
        // 2021-02-01 is a Monday and the month has exactly four weeks
        assert_eq!(Month { year: 2021, month: 2 }.weeks().len(), 4);
    }

    fn run(params: &[(&str, &str)]) -> crate::response::Response {
        let mut req = RequestInfo::get(HttpRequestMethod::GET, "/calendar");
        req.params = params.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        let mut ctx = PageContext::new(req, Config::new(), SessionData::default(), "n".into(),
                                       NaiveDate::from_ymd_opt(2024, 2, 10).unwrap());
        let page = CalendarPage::new();
        let c = MainController::construct(&page, &mut ctx).unwrap();
        let store = crate::template_store::TemplateStore::new("/nonexistent");
        c.process(&ctx, &crate::render::RenderEngine::new(&store))
    }

    #[test]
    fn t_month_event() {
        let r = run(&[("event", "month"), ("month", "2024-03")]);
        assert!(r.is_complete_non_html());
        assert_eq!(r.type_target(), Some("table"));
        let w = r.to_wire();
        assert_eq!(w["content"]["month"], "2024-03");
        assert_eq!(w["content"]["prev"], "2024-02");
        assert_eq!(w["content"]["head"][0], "weekday-1");
        assert_eq!(w["content"]["rows"][0][4], "1");

        let w = run(&[("event", "month")]).to_wire();
        assert_eq!(w["content"]["month"], "2024-02");

        let r = run(&[("event", "month"), ("month", "x")]);
        assert!(r.is_error());
    }
}
