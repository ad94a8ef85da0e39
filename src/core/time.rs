use time::{
    format_description::well_known::Rfc3339, macros::format_description, Date, OffsetDateTime,
    PrimitiveDateTime, Time, UtcOffset,
};

/// Which end of a calendar day a bare `YYYY-MM-DD` bound should snap to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DayEdge {
    Start,
    End,
}

pub(crate) fn primitive_now_utc() -> PrimitiveDateTime {
    let now = OffsetDateTime::now_utc();
    PrimitiveDateTime::new(now.date(), now.time())
}

pub(crate) fn format_primitive(value: PrimitiveDateTime) -> String {
    value.assume_utc().format(&Rfc3339).unwrap_or_else(|_| value.assume_utc().to_string())
}

/// Parses a timestamp filter given either as RFC 3339 or as a plain date.
/// RFC 3339 values are normalised to UTC.
pub(crate) fn parse_date_bound(raw: &str, edge: DayEdge) -> Option<PrimitiveDateTime> {
    let raw = raw.trim();
    if let Ok(value) = OffsetDateTime::parse(raw, &Rfc3339) {
        let utc = value.to_offset(UtcOffset::UTC);
        return Some(PrimitiveDateTime::new(utc.date(), utc.time()));
    }

    let naive = format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");
    if let Ok(value) = PrimitiveDateTime::parse(raw, naive) {
        return Some(value);
    }

    let date = Date::parse(raw, format_description!("[year]-[month]-[day]")).ok()?;
    let time = match edge {
        DayEdge::Start => Time::MIDNIGHT,
        DayEdge::End => Time::from_hms_nano(23, 59, 59, 999_999_999).ok()?,
    };
    Some(PrimitiveDateTime::new(date, time))
}
