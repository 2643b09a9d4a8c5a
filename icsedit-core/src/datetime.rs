use std::sync::LazyLock;

use chrono::{NaiveDate, NaiveDateTime};
use regex::Regex;

static DATE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{8}$").unwrap());
static DATE_TIME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{8}T\d{6}Z?$").unwrap());

const DATE_FORMAT: &str = "%Y%m%d";
const DATE_TIME_FORMAT: &str = "%Y%m%dT%H%M%S";

/// 解码后的DTSTART/DTEND取值
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IcsDate {
    /// `YYYYMMDD`，全天
    Date(NaiveDate),
    /// `YYYYMMDDTHHMMSS[Z]`，一律视为本地时间，`Z` 不做换算
    DateTime(NaiveDateTime),
}

impl IcsDate {
    pub fn naive(&self) -> NaiveDateTime {
        match self {
            IcsDate::Date(date) => date.and_time(chrono::NaiveTime::MIN),
            IcsDate::DateTime(dt) => *dt,
        }
    }

    pub fn is_date(&self) -> bool {
        matches!(self, IcsDate::Date(_))
    }
}

/// 按ICS格式解码日期或日期时间，其他格式返回None
pub fn decode_date(value: &str) -> Option<IcsDate> {
    let value = value.trim();
    if DATE_RE.is_match(value) {
        return NaiveDate::parse_from_str(value, DATE_FORMAT)
            .ok()
            .map(IcsDate::Date);
    }
    if DATE_TIME_RE.is_match(value) {
        let value = value.trim_end_matches('Z');
        return NaiveDateTime::parse_from_str(value, DATE_TIME_FORMAT)
            .ok()
            .map(IcsDate::DateTime);
    }
    None
}

/// 导出时使用的日期时间格式
pub fn format_date_time(dt: &NaiveDateTime) -> String {
    dt.format(DATE_TIME_FORMAT).to_string()
}

/// 按位置截取，越界部分视为空
fn slice(value: &str, from: usize, to: usize) -> Option<&str> {
    let len = value.len();
    value.get(from.min(len)..to.min(len))
}

/// 备用解析器的按位置解码：
/// 0-3 年，4-5 月，6-7 日，9-10 时（缺省0），11-12 分（缺省0），秒被忽略
pub fn decode_positional(value: &str) -> Option<NaiveDateTime> {
    let number = |from, to| slice(value, from, to)?.parse::<u32>().ok();
    let number_or_zero = |from, to| match slice(value, from, to)? {
        "" => Some(0),
        part => part.parse::<u32>().ok(),
    };

    let year = slice(value, 0, 4)?.parse::<i32>().ok()?;
    let month = number(4, 6)?;
    let day = number(6, 8)?;
    let hour = number_or_zero(9, 11)?;
    let minute = number_or_zero(11, 13)?;

    NaiveDate::from_ymd_opt(year, month, day)?.and_hms_opt(hour, minute, 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, s)
            .unwrap()
    }

    #[test]
    fn decodes_date_and_date_time() {
        assert_eq!(
            decode_date("20240101"),
            Some(IcsDate::Date(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()))
        );
        assert_eq!(
            decode_date("20240101T090000"),
            Some(IcsDate::DateTime(at(2024, 1, 1, 9, 0, 0)))
        );
    }

    #[test]
    fn utc_suffix_is_not_converted() {
        assert_eq!(
            decode_date("20240101T090000Z").map(|d| d.naive()),
            Some(at(2024, 1, 1, 9, 0, 0))
        );
    }

    #[test]
    fn rejects_other_forms() {
        for bad in ["", "2024-01-01", "20240101T0900", "20241301", "20240101T250000", "x"] {
            assert!(decode_date(bad).is_none(), "{bad} should not decode");
        }
    }

    #[test]
    fn positional_decoding() {
        assert_eq!(
            decode_positional("20240615T143000"),
            Some(at(2024, 6, 15, 14, 30, 0))
        );
        assert_eq!(decode_positional("20240615"), Some(at(2024, 6, 15, 0, 0, 0)));
        assert_eq!(
            decode_positional("20240615T14"),
            Some(at(2024, 6, 15, 14, 0, 0))
        );
        assert_eq!(decode_positional("2024"), None);
        assert_eq!(decode_positional("garbage"), None);
        assert_eq!(decode_positional("20240615Tab"), None);
    }

    #[test]
    fn formats_without_separators() {
        assert_eq!(format_date_time(&at(2024, 6, 15, 14, 30, 5)), "20240615T143005");
    }
}
