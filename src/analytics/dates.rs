use chrono::{NaiveDate, NaiveDateTime};

/// Timestamp layouts accepted in record fields, tried in order
const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M:%SZ", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"];
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a record timestamp, returning `None` for empty or unrecognized input.
///
/// A bare date resolves to midnight.
pub fn parse_date(value: Option<&str>) -> Option<NaiveDateTime> {
    let value = value.filter(|v| !v.is_empty())?;

    DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(value, DATE_FORMAT)
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}

/// Whole days between two timestamps, floored like a signed day count
pub fn days_between(start: NaiveDateTime, end: NaiveDateTime) -> i64 {
    (end - start).num_seconds().div_euclid(86_400)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_all_supported_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 5)
            .unwrap()
            .and_hms_opt(14, 30, 0)
            .unwrap();

        assert_eq!(parse_date(Some("2024-03-05T14:30:00Z")), Some(expected));
        assert_eq!(parse_date(Some("2024-03-05T14:30:00")), Some(expected));
        assert_eq!(parse_date(Some("2024-03-05 14:30:00")), Some(expected));
        assert_eq!(
            parse_date(Some("2024-03-05")),
            NaiveDate::from_ymd_opt(2024, 3, 5).unwrap().and_hms_opt(0, 0, 0)
        );
    }

    #[test]
    fn test_parse_rejects_empty_and_unknown() {
        assert_eq!(parse_date(None), None);
        assert_eq!(parse_date(Some("")), None);
        assert_eq!(parse_date(Some("05/03/2024")), None);
        assert_eq!(parse_date(Some("2024-03-05T14:30:00+02:00")), None);
        assert_eq!(parse_date(Some("2024-02-30")), None);
    }

    #[test]
    fn test_days_between_floors() {
        let start = parse_date(Some("2024-01-01 12:00:00")).unwrap();
        let later = parse_date(Some("2024-01-03 11:59:59")).unwrap();
        let earlier = parse_date(Some("2024-01-01 11:00:00")).unwrap();

        assert_eq!(days_between(start, later), 1);
        assert_eq!(days_between(start, earlier), -1);
        assert_eq!(days_between(start, start), 0);
    }
}
