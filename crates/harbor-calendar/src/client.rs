//! Calendar v3 REST client and event aggregation.

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};

use crate::types::{CalendarEvent, CalendarRef};
use crate::CalendarError;

const CALENDAR_API: &str = "https://www.googleapis.com/calendar/v3";

/// Thin client over the provider's REST API.
pub struct CalendarClient {
    http: reqwest::Client,
    base_url: String,
}

impl CalendarClient {
    pub fn new() -> Self {
        Self {
            http: reqwest::Client::builder()
                .connect_timeout(std::time::Duration::from_secs(10))
                .timeout(std::time::Duration::from_secs(30))
                .build()
                .expect("failed to build HTTP client"),
            base_url: CALENDAR_API.to_string(),
        }
    }

    /// List the calendars on the account.
    pub async fn list_calendars(
        &self,
        access_token: &str,
    ) -> Result<Vec<CalendarRef>, CalendarError> {
        let url = format!("{}/users/me/calendarList", self.base_url);
        let json = self.get_json(&url, access_token, &[]).await?;
        Ok(parse_calendar_list(&json))
    }

    /// Fetch upcoming events for one calendar, expanded and start-ordered.
    pub async fn list_events(
        &self,
        access_token: &str,
        calendar_id: &str,
        time_min: DateTime<Utc>,
        time_max: DateTime<Utc>,
        max_events: u32,
    ) -> Result<Vec<CalendarEvent>, CalendarError> {
        let url = format!(
            "{}/calendars/{}/events",
            self.base_url,
            urlencoding::encode(calendar_id)
        );
        let json = self
            .get_json(
                &url,
                access_token,
                &[
                    ("timeMin", time_min.to_rfc3339()),
                    ("timeMax", time_max.to_rfc3339()),
                    ("singleEvents", "true".into()),
                    ("orderBy", "startTime".into()),
                    ("maxResults", max_events.to_string()),
                ],
            )
            .await?;
        Ok(parse_event_list(calendar_id, &json))
    }

    /// Aggregate upcoming events across calendars: one sequential fetch per
    /// calendar, then a merge sorted by start time.
    ///
    /// `calendars` empty means every calendar on the account.
    pub async fn upcoming_events(
        &self,
        access_token: &str,
        calendars: &[String],
        lookahead_days: u16,
        max_per_calendar: u32,
    ) -> Result<Vec<CalendarEvent>, CalendarError> {
        let ids: Vec<String> = if calendars.is_empty() {
            self.list_calendars(access_token)
                .await?
                .into_iter()
                .map(|c| c.id)
                .collect()
        } else {
            calendars.to_vec()
        };

        let now = Utc::now();
        let horizon = now + Duration::days(i64::from(lookahead_days));

        let mut events = Vec::new();
        for id in &ids {
            match self
                .list_events(access_token, id, now, horizon, max_per_calendar)
                .await
            {
                Ok(mut batch) => events.append(&mut batch),
                // One unreadable calendar should not empty the dashboard.
                Err(e) => tracing::warn!(calendar = %id, error = %e, "skipping calendar"),
            }
        }

        sort_by_start(&mut events);
        Ok(events)
    }

    async fn get_json(
        &self,
        url: &str,
        access_token: &str,
        query: &[(&str, String)],
    ) -> Result<serde_json::Value, CalendarError> {
        let response = self
            .http
            .get(url)
            .query(query)
            .bearer_auth(access_token)
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(CalendarError::NotAuthorized);
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(CalendarError::Provider {
                status: status.as_u16(),
                message,
            });
        }
        Ok(response.json().await?)
    }
}

impl Default for CalendarClient {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Response parsing
// ---------------------------------------------------------------------------

fn parse_calendar_list(json: &serde_json::Value) -> Vec<CalendarRef> {
    json["items"]
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|item| {
                    Some(CalendarRef {
                        id: item["id"].as_str()?.to_string(),
                        summary: item["summary"].as_str().unwrap_or("").to_string(),
                        primary: item["primary"].as_bool().unwrap_or(false),
                    })
                })
                .collect()
        })
        .unwrap_or_default()
}

fn parse_event_list(calendar_id: &str, json: &serde_json::Value) -> Vec<CalendarEvent> {
    json["items"]
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|item| parse_event(calendar_id, item))
                .collect()
        })
        .unwrap_or_default()
}

/// Normalize one provider event. Events missing a parseable start or end
/// (cancelled stubs, malformed payloads) are dropped.
fn parse_event(calendar_id: &str, item: &serde_json::Value) -> Option<CalendarEvent> {
    let (start, start_all_day) = parse_event_time(&item["start"])?;
    let (end, _) = parse_event_time(&item["end"])?;

    Some(CalendarEvent {
        id: item["id"].as_str()?.to_string(),
        calendar_id: calendar_id.to_string(),
        summary: item["summary"].as_str().unwrap_or("(no title)").to_string(),
        start,
        end,
        all_day: start_all_day,
        location: item["location"].as_str().map(String::from),
    })
}

/// Provider event times are either `{"dateTime": rfc3339}` or, for all-day
/// events, `{"date": "YYYY-MM-DD"}`. Returns the instant plus an all-day flag.
fn parse_event_time(value: &serde_json::Value) -> Option<(DateTime<Utc>, bool)> {
    if let Some(datetime) = value["dateTime"].as_str() {
        let parsed = DateTime::parse_from_rfc3339(datetime).ok()?;
        return Some((parsed.with_timezone(&Utc), false));
    }
    if let Some(date) = value["date"].as_str() {
        let parsed = NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()?;
        let midnight = parsed.and_hms_opt(0, 0, 0)?;
        return Some((Utc.from_utc_datetime(&midnight), true));
    }
    None
}

/// Sort events by start, breaking ties by summary so output is stable.
fn sort_by_start(events: &mut [CalendarEvent]) {
    events.sort_by(|a, b| a.start.cmp(&b.start).then_with(|| a.summary.cmp(&b.summary)));
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parse_calendar_list_extracts_entries() {
        let json = json!({
            "items": [
                { "id": "primary", "summary": "Personal", "primary": true },
                { "id": "work@group.calendar", "summary": "Work" },
                { "summary": "missing id, dropped" },
            ]
        });
        let calendars = parse_calendar_list(&json);
        assert_eq!(calendars.len(), 2);
        assert!(calendars[0].primary);
        assert!(!calendars[1].primary);
    }

    #[test]
    fn parse_event_with_datetime() {
        let item = json!({
            "id": "e1",
            "summary": "Design review",
            "location": "Room 4",
            "start": { "dateTime": "2026-08-07T14:00:00Z" },
            "end": { "dateTime": "2026-08-07T15:00:00+02:00" },
        });
        let event = parse_event("primary", &item).unwrap();
        assert_eq!(event.summary, "Design review");
        assert!(!event.all_day);
        assert_eq!(event.location.as_deref(), Some("Room 4"));
        assert_eq!(event.start.to_rfc3339(), "2026-08-07T14:00:00+00:00");
        // Offset times are normalized to UTC.
        assert_eq!(event.end.to_rfc3339(), "2026-08-07T13:00:00+00:00");
    }

    #[test]
    fn parse_event_all_day() {
        let item = json!({
            "id": "e2",
            "summary": "Offsite",
            "start": { "date": "2026-08-10" },
            "end": { "date": "2026-08-11" },
        });
        let event = parse_event("primary", &item).unwrap();
        assert!(event.all_day);
        assert_eq!(event.start.to_rfc3339(), "2026-08-10T00:00:00+00:00");
    }

    #[test]
    fn parse_event_untitled_gets_placeholder() {
        let item = json!({
            "id": "e3",
            "start": { "dateTime": "2026-08-07T09:00:00Z" },
            "end": { "dateTime": "2026-08-07T10:00:00Z" },
        });
        let event = parse_event("primary", &item).unwrap();
        assert_eq!(event.summary, "(no title)");
    }

    #[test]
    fn parse_event_without_times_is_dropped() {
        let item = json!({ "id": "e4", "summary": "broken", "start": {}, "end": {} });
        assert!(parse_event("primary", &item).is_none());
    }

    #[test]
    fn events_sort_by_start_then_summary() {
        let json = json!({
            "items": [
                {
                    "id": "b",
                    "summary": "later",
                    "start": { "dateTime": "2026-08-07T12:00:00Z" },
                    "end": { "dateTime": "2026-08-07T13:00:00Z" },
                },
                {
                    "id": "a",
                    "summary": "zz tie",
                    "start": { "dateTime": "2026-08-07T09:00:00Z" },
                    "end": { "dateTime": "2026-08-07T10:00:00Z" },
                },
                {
                    "id": "c",
                    "summary": "aa tie",
                    "start": { "dateTime": "2026-08-07T09:00:00Z" },
                    "end": { "dateTime": "2026-08-07T10:00:00Z" },
                },
            ]
        });
        let mut events = parse_event_list("primary", &json);
        sort_by_start(&mut events);
        let order: Vec<&str> = events.iter().map(|e| e.summary.as_str()).collect();
        assert_eq!(order, vec!["aa tie", "zz tie", "later"]);
    }
}
