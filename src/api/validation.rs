use validator::Validate;

use crate::api::errors::ApiError;
use crate::core::time::{parse_date_bound, DayEdge};

pub(crate) fn validate_payload(payload: &impl Validate) -> Result<(), ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))
}

fn non_empty(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|value| !value.is_empty())
}

pub(crate) fn parse_optional_id(field: &str, raw: Option<&str>) -> Result<Option<i64>, ApiError> {
    non_empty(raw)
        .map(|value| {
            value
                .parse::<i64>()
                .map_err(|_| ApiError::BadRequest(format!("{field} must be an integer")))
        })
        .transpose()
}

/// Comma-separated integer ids; blank entries are skipped.
pub(crate) fn parse_id_list(field: &str, raw: Option<&str>) -> Result<Option<Vec<i64>>, ApiError> {
    let Some(value) = non_empty(raw) else {
        return Ok(None);
    };

    let ids = value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(|item| {
            item.parse::<i64>().map_err(|_| {
                ApiError::BadRequest(format!("{field} must be a comma-separated list of integers"))
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    if ids.is_empty() {
        Ok(None)
    } else {
        Ok(Some(ids))
    }
}

pub(crate) fn parse_date_filter(
    field: &str,
    raw: Option<&str>,
    edge: DayEdge,
) -> Result<Option<time::PrimitiveDateTime>, ApiError> {
    non_empty(raw)
        .map(|value| {
            parse_date_bound(value, edge).ok_or_else(|| {
                ApiError::BadRequest(format!("{field} must be a date (YYYY-MM-DD) or RFC 3339"))
            })
        })
        .transpose()
}

/// `true` (any case) selects public categories; every other value, including
/// an empty one, selects private ones. Only an absent key disables the filter.
pub(crate) fn parse_public_access(raw: Option<&str>) -> Option<bool> {
    raw.map(|value| value.trim().eq_ignore_ascii_case("true"))
}

pub(crate) fn non_empty_string(raw: Option<&str>) -> Option<String> {
    non_empty(raw).map(str::to_string)
}
