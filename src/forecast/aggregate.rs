use super::types::*;
use chrono::{DateTime, NaiveDate};
use chrono_tz::Tz;

/// Calendar date of a unix timestamp in the reference zone.
pub fn calendar_date(timestamp: i64, tz: &Tz) -> NaiveDate {
    DateTime::from_timestamp(timestamp, 0)
        .unwrap_or_default()
        .with_timezone(tz)
        .date_naive()
}

/// Current conditions: instantaneous values from the first entry, min/max
/// pooled over every entry on `today`.
pub fn compute_current(
    forecast: &RawForecast,
    today: NaiveDate,
    tz: &Tz,
) -> Option<CurrentConditions> {
    let first = forecast.entries.first()?;

    let today_range = forecast
        .entries
        .iter()
        .filter(|entry| calendar_date(entry.timestamp, tz) == today)
        .map(entry_range)
        .reduce(|(lo, hi), (min, max)| (lo.min(min), hi.max(max)));

    let (temp_min, temp_max) = today_range.unwrap_or_else(|| entry_range(first));

    Some(CurrentConditions {
        temp: first.temp_current,
        temp_min,
        temp_max,
        description: first.description.clone(),
        condition: first.condition.clone(),
        icon_code: first.icon_code.clone(),
        timestamp: first.timestamp,
    })
}

/// Groups entries after `today` by calendar date, keeping at most `max_days`
/// dates in the order each date is first seen. Entries for admitted dates
/// keep folding into min/max after the cap is reached; description and icon
/// stay those of the first entry seen.
pub fn compute_next_days(
    forecast: &RawForecast,
    today: NaiveDate,
    tz: &Tz,
    max_days: usize,
) -> Vec<DayForecast> {
    // First-insertion order; never more than `max_days` groups.
    let mut grouped: Vec<DayForecast> = Vec::new();

    for entry in &forecast.entries {
        let date = calendar_date(entry.timestamp, tz);
        if date <= today {
            continue;
        }

        let (min, max) = entry_range(entry);
        if let Some(day) = grouped.iter_mut().find(|day| day.date == date) {
            day.temp_min = day.temp_min.min(min);
            day.temp_max = day.temp_max.max(max);
        } else if grouped.len() < max_days {
            grouped.push(DayForecast {
                date,
                timestamp: entry.timestamp,
                temp: entry.temp_current,
                temp_min: min,
                temp_max: max,
                description: entry.description.clone(),
                condition: entry.condition.clone(),
                icon_code: entry.icon_code.clone(),
            });
        }
    }

    grouped
}

// An entry's min and max pooled together, so a feed with min > max still
// yields an ordered pair.
fn entry_range(entry: &RawForecastEntry) -> (f64, f64) {
    (
        entry.temp_min.min(entry.temp_max),
        entry.temp_max.max(entry.temp_min),
    )
}
