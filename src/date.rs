//! HTTP-date (RFC 9110 Section 5.6.7)
//!
//! ## 概要
//!
//! `Date`、`Expires`、`Last-Modified` などで使う日時を扱います。
//!
//! - 受信時は IMF-fixdate、RFC 850、asctime の 3 形式を受け付ける
//! - 出力は常に IMF-fixdate
//! - 月の日数と曜日が日付と一致しない場合はエラー
//!
//! ## 使い方
//!
//! ```rust
//! use shiguredo_http_headers::date::{DateError, HttpDate};
//!
//! let date = HttpDate::parse("Sunday, 06-Nov-94 08:49:37 GMT").unwrap();
//! assert_eq!((date.year(), date.month(), date.day()), (1994, 11, 6));
//! assert_eq!(date.to_string(), "Sun, 06 Nov 1994 08:49:37 GMT");
//!
//! assert_eq!(
//!     HttpDate::parse("Mon, 06 Nov 1994 08:49:37 GMT"),
//!     Err(DateError::DayOfWeekMismatch)
//! );
//! ```

use core::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use thiserror::Error;

/// HTTP-date パースエラー
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DateError {
    #[error("empty date")]
    Empty,
    #[error("invalid date format")]
    InvalidFormat,
    #[error("invalid day name")]
    InvalidDayName,
    #[error("invalid day")]
    InvalidDay,
    #[error("invalid month")]
    InvalidMonth,
    #[error("invalid year")]
    InvalidYear,
    #[error("invalid hour")]
    InvalidHour,
    #[error("invalid minute")]
    InvalidMinute,
    #[error("invalid second")]
    InvalidSecond,
    #[error("timezone is not GMT")]
    NotGmt,
    #[error("day of week does not match the date")]
    DayOfWeekMismatch,
}

/// 曜日 (日曜始まり)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayOfWeek {
    Sunday,
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
}

const DAYS: [(DayOfWeek, &str, &str); 7] = [
    (DayOfWeek::Sunday, "Sun", "Sunday"),
    (DayOfWeek::Monday, "Mon", "Monday"),
    (DayOfWeek::Tuesday, "Tue", "Tuesday"),
    (DayOfWeek::Wednesday, "Wed", "Wednesday"),
    (DayOfWeek::Thursday, "Thu", "Thursday"),
    (DayOfWeek::Friday, "Fri", "Friday"),
    (DayOfWeek::Saturday, "Sat", "Saturday"),
];

const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

impl DayOfWeek {
    /// 3 文字の曜日名 (`Sun` など)
    pub fn short_name(&self) -> &'static str {
        DAYS[*self as usize].1
    }

    /// 曜日名 (`Sun` / `Sunday` など) から取得
    ///
    /// 大文字小文字は区別する。
    fn from_name(name: &str) -> Option<Self> {
        DAYS.iter()
            .find(|(_, short, long)| *short == name || *long == name)
            .map(|&(day, _, _)| day)
    }
}

/// HTTP-date
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpDate {
    day_of_week: DayOfWeek,
    year: u16,
    month: u8,
    day: u8,
    hour: u8,
    minute: u8,
    // 60 はうるう秒
    second: u8,
}

impl HttpDate {
    /// HTTP-date をパース
    ///
    /// ```text
    /// IMF-fixdate  = Sun, 06 Nov 1994 08:49:37 GMT
    /// rfc850-date  = Sunday, 06-Nov-94 08:49:37 GMT
    /// asctime-date = Sun Nov  6 08:49:37 1994
    /// ```
    ///
    /// 前後の空白は許可する。RFC 850 形式の 2 桁の年は、50 年以上先にならないように解釈する。
    pub fn parse(input: &str) -> Result<Self, DateError> {
        let input = input.trim_matches(|c| c == ' ' || c == '\t');
        if input.is_empty() {
            return Err(DateError::Empty);
        }

        let mut cursor = Cursor::new(input);
        let date = read_date(&mut cursor)?;
        if !cursor.is_end() {
            return Err(DateError::InvalidFormat);
        }
        Ok(date)
    }

    /// 日時を指定して作成 (曜日は日付から求める)
    pub fn new(
        year: u16,
        month: u8,
        day: u8,
        hour: u8,
        minute: u8,
        second: u8,
    ) -> Result<Self, DateError> {
        if year == 0 {
            return Err(DateError::InvalidYear);
        }
        if !(1..=12).contains(&month) {
            return Err(DateError::InvalidMonth);
        }
        if day == 0 || day > days_in_month(year, month) {
            return Err(DateError::InvalidDay);
        }
        if hour > 23 {
            return Err(DateError::InvalidHour);
        }
        if minute > 59 {
            return Err(DateError::InvalidMinute);
        }
        if second > 60 {
            return Err(DateError::InvalidSecond);
        }

        let days = days_since_epoch(year, month, day);
        // 1970-01-01 は木曜日
        let day_of_week = DAYS[(days + 4).rem_euclid(7) as usize].0;

        Ok(HttpDate {
            day_of_week,
            year,
            month,
            day,
            hour,
            minute,
            second,
        })
    }

    pub fn day_of_week(&self) -> DayOfWeek {
        self.day_of_week
    }

    /// 日 (1-31)
    pub fn day(&self) -> u8 {
        self.day
    }

    /// 月 (1-12)
    pub fn month(&self) -> u8 {
        self.month
    }

    pub fn year(&self) -> u16 {
        self.year
    }

    pub fn hour(&self) -> u8 {
        self.hour
    }

    pub fn minute(&self) -> u8 {
        self.minute
    }

    /// 秒 (0-60)
    pub fn second(&self) -> u8 {
        self.second
    }
}

impl fmt::Display for HttpDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}, {:02} {} {:04} {:02}:{:02}:{:02} GMT",
            self.day_of_week.short_name(),
            self.day,
            MONTHS[usize::from(self.month - 1)],
            self.year,
            self.hour,
            self.minute,
            self.second
        )
    }
}

/// 日付をスキャンし、(長さ, 日付) を返す
///
/// 日付の後ろに続く文字 (閉じ引用符など) は読まない。
pub fn scan_date(input: &str, start: usize) -> Option<(usize, HttpDate)> {
    let rest = input.get(start..)?;
    let mut cursor = Cursor::new(rest);
    let date = read_date(&mut cursor).ok()?;
    Some((cursor.position, date))
}

/// 日付を構成するフィールド
struct Fields {
    year: u16,
    month: u8,
    day: u8,
    time: (u8, u8, u8),
}

fn read_date(cursor: &mut Cursor<'_>) -> Result<HttpDate, DateError> {
    let day_of_week =
        DayOfWeek::from_name(cursor.letters()).ok_or(DateError::InvalidDayName)?;

    let fields = if cursor.eat(b',') {
        cursor.spaces()?;
        let day = cursor.digits(1, 2).ok_or(DateError::InvalidDay)?;
        if cursor.eat(b'-') {
            read_rfc850(cursor, day)?
        } else {
            read_imf_fixdate(cursor, day)?
        }
    } else {
        cursor.spaces()?;
        read_asctime(cursor)?
    };

    let (hour, minute, second) = fields.time;
    let date = HttpDate::new(
        fields.year,
        fields.month,
        fields.day,
        hour,
        minute,
        second,
    )?;
    if date.day_of_week != day_of_week {
        return Err(DateError::DayOfWeekMismatch);
    }
    Ok(date)
}

/// `06 Nov 1994 08:49:37 GMT` の日より後ろ
fn read_imf_fixdate(cursor: &mut Cursor<'_>, day: u16) -> Result<Fields, DateError> {
    cursor.spaces()?;
    let month = cursor.month()?;
    cursor.spaces()?;
    let year = cursor.digits(4, 4).ok_or(DateError::InvalidYear)?;
    cursor.spaces()?;
    let time = cursor.time()?;
    cursor.spaces()?;
    cursor.gmt()?;
    Ok(Fields {
        year,
        month,
        day: day as u8,
        time,
    })
}

/// `06-Nov-94 08:49:37 GMT` の日と `-` より後ろ
fn read_rfc850(cursor: &mut Cursor<'_>, day: u16) -> Result<Fields, DateError> {
    let month = cursor.month()?;
    if !cursor.eat(b'-') {
        return Err(DateError::InvalidFormat);
    }
    let year_start = cursor.position;
    let year = cursor.digits(2, 4).ok_or(DateError::InvalidYear)?;
    let year = if cursor.position - year_start == 2 {
        expand_two_digit_year(year, current_year())
    } else {
        year
    };
    cursor.spaces()?;
    let time = cursor.time()?;
    cursor.spaces()?;
    cursor.gmt()?;
    Ok(Fields {
        year,
        month,
        day: day as u8,
        time,
    })
}

/// `Nov  6 08:49:37 1994` (曜日より後ろ)
fn read_asctime(cursor: &mut Cursor<'_>) -> Result<Fields, DateError> {
    let month = cursor.month()?;
    cursor.spaces()?;
    let day = cursor.digits(1, 2).ok_or(DateError::InvalidDay)?;
    cursor.spaces()?;
    let time = cursor.time()?;
    cursor.spaces()?;
    let year = cursor.digits(4, 4).ok_or(DateError::InvalidYear)?;
    Ok(Fields {
        year,
        month,
        day: day as u8,
        time,
    })
}

/// 日付の読み取り位置
struct Cursor<'a> {
    bytes: &'a [u8],
    position: usize,
}

impl<'a> Cursor<'a> {
    fn new(input: &'a str) -> Self {
        Cursor {
            bytes: input.as_bytes(),
            position: 0,
        }
    }

    fn is_end(&self) -> bool {
        self.position >= self.bytes.len()
    }

    fn eat(&mut self, b: u8) -> bool {
        if self.bytes.get(self.position) == Some(&b) {
            self.position += 1;
            return true;
        }
        false
    }

    /// 1 つ以上の SP
    fn spaces(&mut self) -> Result<(), DateError> {
        let start = self.position;
        while self.eat(b' ') {}
        if self.position == start {
            return Err(DateError::InvalidFormat);
        }
        Ok(())
    }

    /// ASCII 英字の並び
    fn letters(&mut self) -> &'a str {
        let start = self.position;
        while self
            .bytes
            .get(self.position)
            .is_some_and(|b| b.is_ascii_alphabetic())
        {
            self.position += 1;
        }
        // ASCII 英字のみなので UTF-8 として有効
        core::str::from_utf8(&self.bytes[start..self.position]).unwrap_or_default()
    }

    /// `min` 桁以上 `max` 桁以下の数字
    fn digits(&mut self, min: usize, max: usize) -> Option<u16> {
        let start = self.position;
        let mut value: u16 = 0;
        while self.position - start < max {
            match self.bytes.get(self.position) {
                Some(b) if b.is_ascii_digit() => {
                    value = value * 10 + u16::from(b - b'0');
                    self.position += 1;
                }
                _ => break,
            }
        }
        let count = self.position - start;
        let followed_by_digit = self
            .bytes
            .get(self.position)
            .is_some_and(|b| b.is_ascii_digit());
        if count < min || followed_by_digit {
            return None;
        }
        Some(value)
    }

    fn month(&mut self) -> Result<u8, DateError> {
        let name = self.letters();
        MONTHS
            .iter()
            .position(|m| *m == name)
            .map(|i| i as u8 + 1)
            .ok_or(DateError::InvalidMonth)
    }

    /// `HH:MM:SS`
    fn time(&mut self) -> Result<(u8, u8, u8), DateError> {
        let hour = self.digits(2, 2).ok_or(DateError::InvalidHour)?;
        if !self.eat(b':') {
            return Err(DateError::InvalidFormat);
        }
        let minute = self.digits(2, 2).ok_or(DateError::InvalidMinute)?;
        if !self.eat(b':') {
            return Err(DateError::InvalidFormat);
        }
        let second = self.digits(2, 2).ok_or(DateError::InvalidSecond)?;
        Ok((hour as u8, minute as u8, second as u8))
    }

    fn gmt(&mut self) -> Result<(), DateError> {
        if self.letters() != "GMT" {
            return Err(DateError::NotGmt);
        }
        Ok(())
    }
}

fn is_leap_year(year: u16) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

fn days_in_month(year: u16, month: u8) -> u8 {
    match month {
        2 if is_leap_year(year) => 29,
        2 => 28,
        4 | 6 | 9 | 11 => 30,
        _ => 31,
    }
}

/// 1970-01-01 からの日数 (先発グレゴリオ暦)
fn days_since_epoch(year: u16, month: u8, day: u8) -> i64 {
    let (year, month, day) = (i64::from(year), i64::from(month), i64::from(day));
    let y = if month <= 2 { year - 1 } else { year };
    let era = y.div_euclid(400);
    let year_of_era = y - era * 400;
    let day_of_year = (153 * ((month + 9) % 12) + 2) / 5 + day - 1;
    let day_of_era = year_of_era * 365 + year_of_era / 4 - year_of_era / 100 + day_of_year;
    era * 146_097 + day_of_era - 719_468
}

/// 1970-01-01 からの日数に対応する年
fn year_from_days(days: i64) -> i64 {
    let z = days + 719_468;
    let era = z.div_euclid(146_097);
    let day_of_era = z - era * 146_097;
    let year_of_era =
        (day_of_era - day_of_era / 1460 + day_of_era / 36_524 - day_of_era / 146_096) / 365;
    let day_of_year = day_of_era - (365 * year_of_era + year_of_era / 4 - year_of_era / 100);
    let month_index = (5 * day_of_year + 2) / 153;
    let year = year_of_era + era * 400;
    // 3 月始まりで数えているため 1 月と 2 月は翌年
    if month_index >= 10 { year + 1 } else { year }
}

fn current_year() -> u16 {
    let seconds = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default();
    let year = year_from_days((seconds / 86_400) as i64);
    u16::try_from(year).unwrap_or(u16::MAX)
}

/// 2 桁の年を 4 桁にする (RFC 9110 Section 5.6.7)
///
/// 現在から 50 年より先になる場合は 100 年前とみなす。
fn expand_two_digit_year(two_digit: u16, current_year: u16) -> u16 {
    let candidate = current_year / 100 * 100 + two_digit;
    if candidate > current_year.saturating_add(50) {
        candidate.saturating_sub(100)
    } else {
        candidate
    }
}
