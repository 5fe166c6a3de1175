use time::{
    format_description::well_known::Rfc3339, macros::format_description, OffsetDateTime,
    PrimitiveDateTime,
};

const MINUTES_IN_DAY: i64 = 1440;
const MINUTES_IN_MONTH: i64 = 43200;
const MINUTES_IN_TWO_MONTHS: i64 = 86400;

pub fn parse_timestamp(raw: &str) -> Option<OffsetDateTime> {
    let raw = raw.trim();
    if let Ok(at) = OffsetDateTime::parse(raw, &Rfc3339) {
        return Some(at);
    }

    let sqlite =
        format_description!("[year]-[month]-[day] [hour]:[minute]:[second][optional [.[subsecond]]]");
    PrimitiveDateTime::parse(raw, sqlite)
        .ok()
        .map(PrimitiveDateTime::assume_utc)
}

/// `created_at` as a distance to now, or verbatim if it can't be parsed.
pub fn relative_to_now(raw: &str) -> String {
    match parse_timestamp(raw) {
        Some(at) => format_distance(at, OffsetDateTime::now_utc()),
        None => raw.to_owned(),
    }
}

pub fn format_distance(at: OffsetDateTime, now: OffsetDateTime) -> String {
    let past = at <= now;
    let seconds = (now - at).whole_seconds().abs();
    let distance = distance_words(seconds);
    if past {
        format!("{distance} ago")
    } else {
        format!("in {distance}")
    }
}

fn plural(count: i64, unit: &str) -> String {
    if count == 1 {
        format!("1 {unit}")
    } else {
        format!("{count} {unit}s")
    }
}

fn distance_words(seconds: i64) -> String {
    let minutes = (seconds as f64 / 60.0).round() as i64;

    if minutes < 1 {
        return "less than a minute".to_owned();
    }
    if minutes < 45 {
        return plural(minutes, "minute");
    }
    if minutes < 90 {
        return "about 1 hour".to_owned();
    }
    if minutes < MINUTES_IN_DAY {
        let hours = (minutes as f64 / 60.0).round() as i64;
        return format!("about {}", plural(hours, "hour"));
    }
    if minutes < 2520 {
        return "1 day".to_owned();
    }
    if minutes < MINUTES_IN_MONTH {
        let days = (minutes as f64 / MINUTES_IN_DAY as f64).round() as i64;
        return plural(days, "day");
    }
    if minutes < MINUTES_IN_TWO_MONTHS {
        let months = (minutes as f64 / MINUTES_IN_MONTH as f64).round() as i64;
        return format!("about {}", plural(months, "month"));
    }

    let months = minutes / MINUTES_IN_MONTH;
    if months < 12 {
        return plural(months, "month");
    }

    let into_year = months % 12;
    let years = months / 12;
    if into_year < 3 {
        format!("about {}", plural(years, "year"))
    } else if into_year < 9 {
        format!("over {}", plural(years, "year"))
    } else {
        format!("almost {}", plural(years + 1, "year"))
    }
}
