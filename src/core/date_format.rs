//! Date/time number formats: detection and rendering of serial day numbers
//!
//! Spreadsheets store dates as a count of days since an epoch, with the time
//! of day as the fractional part. Whether a number is a date is decided only
//! by the number format attached to the cell, so the same format code drives
//! both detection and rendering here.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, Timelike};

/// Last serial a worksheet can display as a date (9999-12-31)
const MAX_DATE_SERIAL: f64 = 2_958_465.0;

const MILLIS_PER_DAY: f64 = 86_400_000.0;

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

const DAY_NAMES: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

/// Pattern for a built-in number format id, if the id is a known built-in
pub fn builtin_format(id: u32) -> Option<&'static str> {
    let code = match id {
        0 => "General",
        1 => "0",
        2 => "0.00",
        3 => "#,##0",
        4 => "#,##0.00",
        5 => "\"$\"#,##0_);(\"$\"#,##0)",
        6 => "\"$\"#,##0_);[Red](\"$\"#,##0)",
        7 => "\"$\"#,##0.00_);(\"$\"#,##0.00)",
        8 => "\"$\"#,##0.00_);[Red](\"$\"#,##0.00)",
        9 => "0%",
        10 => "0.00%",
        11 => "0.00E+00",
        12 => "# ?/?",
        13 => "# ??/??",
        14 => "m/d/yy",
        15 => "d-mmm-yy",
        16 => "d-mmm",
        17 => "mmm-yy",
        18 => "h:mm AM/PM",
        19 => "h:mm:ss AM/PM",
        20 => "h:mm",
        21 => "h:mm:ss",
        22 => "m/d/yy h:mm",
        37 => "#,##0_);(#,##0)",
        38 => "#,##0_);[Red](#,##0)",
        39 => "#,##0.00_);(#,##0.00)",
        40 => "#,##0.00_);[Red](#,##0.00)",
        41 => "_(* #,##0_);_(* (#,##0);_(* \"-\"_);_(@_)",
        42 => "_(\"$\"* #,##0_);_(\"$\"* (#,##0);_(\"$\"* \"-\"_);_(@_)",
        43 => "_(* #,##0.00_);_(* (#,##0.00);_(* \"-\"??_);_(@_)",
        44 => "_(\"$\"* #,##0.00_);_(\"$\"* (#,##0.00);_(\"$\"* \"-\"??_);_(@_)",
        45 => "mm:ss",
        46 => "[h]:mm:ss",
        47 => "mm:ss.0",
        48 => "##0.0E+0",
        49 => "@",
        _ => return None,
    };
    Some(code)
}

/// Whether a number format code displays its value as a date and/or time
pub fn is_date_format(code: &str) -> bool {
    let section = first_section(code);
    let mut chars = section.chars().peekable();
    let mut has_date_part = false;
    let mut in_quotes = false;

    while let Some(ch) = chars.next() {
        if in_quotes {
            if ch == '"' {
                in_quotes = false;
            }
            continue;
        }

        match ch {
            '"' => in_quotes = true,
            '\\' | '_' | '*' => {
                chars.next();
            }
            '[' => {
                let mut content = String::new();
                for c in chars.by_ref() {
                    if c == ']' {
                        break;
                    }
                    content.push(c);
                }
                if parse_elapsed(&content.to_ascii_lowercase()).is_some() {
                    has_date_part = true;
                }
            }
            'y' | 'Y' | 'm' | 'M' | 'd' | 'D' | 'h' | 'H' | 's' | 'S' => has_date_part = true,
            'a' | 'A' => {
                let rest: String = chars.clone().take(4).collect();
                let lower = rest.to_ascii_lowercase();
                if lower.starts_with("m/pm") {
                    chars.nth(3);
                } else if lower.starts_with("/p") {
                    chars.nth(1);
                } else {
                    return false;
                }
            }
            '-' | '/' | ',' | '.' | ':' | ' ' | '0' => {}
            _ => return false,
        }
    }

    has_date_part
}

/// Convert a serial day number to a calendar date-time
///
/// The 1900 system counts from 1899-12-31 for serials below 61 and from
/// 1899-12-30 afterwards, which absorbs the fictitious 1900-02-29. The time
/// of day is rounded to the millisecond. Negative and out-of-range serials
/// are not dates.
pub fn serial_to_datetime(serial: f64, date1904: bool) -> Option<NaiveDateTime> {
    if !serial.is_finite() || serial < 0.0 || serial > MAX_DATE_SERIAL + 1.0 {
        return None;
    }

    let days = serial.floor();
    let millis = ((serial - days) * MILLIS_PER_DAY + 0.5) as i64;

    let epoch = if date1904 {
        NaiveDate::from_ymd_opt(1904, 1, 1)?
    } else if days < 61.0 {
        NaiveDate::from_ymd_opt(1899, 12, 31)?
    } else {
        NaiveDate::from_ymd_opt(1899, 12, 30)?
    };

    epoch
        .and_hms_opt(0, 0, 0)?
        .checked_add_signed(Duration::days(days as i64))?
        .checked_add_signed(Duration::milliseconds(millis))
}

/// Render a serial date with the given format code
///
/// Returns `None` when the serial is not a representable date.
pub fn format_serial(serial: f64, code: &str, date1904: bool) -> Option<String> {
    let datetime = serial_to_datetime(serial, date1904)?;
    let tokens = disambiguate_month_minute(tokenize(first_section(code)));
    let twelve_hour = tokens
        .iter()
        .any(|t| matches!(t, Token::AmPm { .. } | Token::AP { .. }));
    let total_millis = (serial * MILLIS_PER_DAY).round() as i64;

    let mut out = String::new();
    for token in &tokens {
        match token {
            Token::Literal(text) => out.push_str(text),
            Token::Year(count) => {
                if *count <= 2 {
                    out.push_str(&format!("{:02}", datetime.year().rem_euclid(100)));
                } else {
                    out.push_str(&format!("{:04}", datetime.year()));
                }
            }
            Token::Month(count) => {
                let month = datetime.month() as usize;
                let name = MONTH_NAMES[month - 1];
                match count {
                    1 => out.push_str(&month.to_string()),
                    2 => out.push_str(&format!("{:02}", month)),
                    3 => out.push_str(&name[..3]),
                    4 => out.push_str(name),
                    _ => out.push_str(&name[..1]),
                }
            }
            Token::Day(count) => {
                let weekday = DAY_NAMES[datetime.weekday().num_days_from_monday() as usize];
                match count {
                    1 => out.push_str(&datetime.day().to_string()),
                    2 => out.push_str(&format!("{:02}", datetime.day())),
                    3 => out.push_str(&weekday[..3]),
                    _ => out.push_str(weekday),
                }
            }
            Token::Hour(count) => {
                let hour = if twelve_hour {
                    match datetime.hour() % 12 {
                        0 => 12,
                        h => h,
                    }
                } else {
                    datetime.hour()
                };
                push_padded(&mut out, i64::from(hour), *count);
            }
            Token::Minute(count) => push_padded(&mut out, i64::from(datetime.minute()), *count),
            Token::Second(count) => push_padded(&mut out, i64::from(datetime.second()), *count),
            Token::FractionalSeconds(digits) => {
                let millis = datetime.nanosecond() / 1_000_000;
                let scaled = match digits {
                    1 => millis / 100,
                    2 => millis / 10,
                    _ => millis,
                };
                out.push('.');
                out.push_str(&format!("{:0width$}", scaled, width = (*digits).min(3)));
            }
            Token::ElapsedHours(count) => push_padded(&mut out, total_millis / 3_600_000, *count),
            Token::ElapsedMinutes(count) => push_padded(&mut out, total_millis / 60_000, *count),
            Token::ElapsedSeconds(count) => push_padded(&mut out, total_millis / 1_000, *count),
            Token::AmPm { lowercase } => {
                let marker = if datetime.hour() < 12 { "AM" } else { "PM" };
                if *lowercase {
                    out.push_str(&marker.to_ascii_lowercase());
                } else {
                    out.push_str(marker);
                }
            }
            Token::AP { lowercase } => {
                let marker = if datetime.hour() < 12 { 'A' } else { 'P' };
                out.push(if *lowercase {
                    marker.to_ascii_lowercase()
                } else {
                    marker
                });
            }
            Token::MonthOrMinute(_) => {}
        }
    }

    Some(out)
}

fn push_padded(out: &mut String, value: i64, count: usize) {
    if count >= 2 {
        out.push_str(&format!("{:02}", value));
    } else {
        out.push_str(&value.to_string());
    }
}

/// First `;`-separated section of a format code, ignoring quoted semicolons
fn first_section(code: &str) -> &str {
    let mut in_quotes = false;
    let mut escaped = false;
    for (idx, ch) in code.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match ch {
            '\\' if !in_quotes => escaped = true,
            '"' => in_quotes = !in_quotes,
            ';' if !in_quotes => return &code[..idx],
            _ => {}
        }
    }
    code
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Literal(String),
    Year(usize),
    Day(usize),
    MonthOrMinute(usize),
    Month(usize),
    Hour(usize),
    Minute(usize),
    Second(usize),
    FractionalSeconds(usize),
    ElapsedHours(usize),
    ElapsedMinutes(usize),
    ElapsedSeconds(usize),
    AmPm { lowercase: bool },
    AP { lowercase: bool },
}

fn tokenize(pattern: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut literal = String::new();
    let mut in_quotes = false;
    let mut chars = pattern.chars().peekable();

    while let Some(ch) = chars.next() {
        if in_quotes {
            if ch == '"' {
                in_quotes = false;
            } else {
                literal.push(ch);
            }
            continue;
        }

        match ch {
            '"' => in_quotes = true,
            '\\' => {
                if let Some(next) = chars.next() {
                    literal.push(next);
                }
            }
            '_' => {
                // `_x` reserves the width of `x`
                if chars.next().is_some() {
                    literal.push(' ');
                }
            }
            '*' => {
                chars.next();
            }
            '[' => {
                let mut content = String::new();
                for c in chars.by_ref() {
                    if c == ']' {
                        break;
                    }
                    content.push(c);
                }
                // Colours and locale tags do not render
                if let Some(token) = parse_elapsed(&content.to_ascii_lowercase()) {
                    flush_literal(&mut literal, &mut tokens);
                    tokens.push(token);
                }
            }
            'a' | 'A' => {
                let rest: String = chars.clone().take(4).collect();
                let lower = rest.to_ascii_lowercase();
                let lowercase = ch == 'a';
                if lower.starts_with("m/pm") {
                    chars.nth(3);
                    flush_literal(&mut literal, &mut tokens);
                    tokens.push(Token::AmPm { lowercase });
                } else if lower.starts_with("/p") {
                    chars.nth(1);
                    flush_literal(&mut literal, &mut tokens);
                    tokens.push(Token::AP { lowercase });
                } else {
                    literal.push(ch);
                }
            }
            'y' | 'Y' => {
                let count = consume_run(ch, &mut chars);
                flush_literal(&mut literal, &mut tokens);
                tokens.push(Token::Year(count));
            }
            'd' | 'D' => {
                let count = consume_run(ch, &mut chars);
                flush_literal(&mut literal, &mut tokens);
                tokens.push(Token::Day(count));
            }
            'h' | 'H' => {
                let count = consume_run(ch, &mut chars);
                flush_literal(&mut literal, &mut tokens);
                tokens.push(Token::Hour(count));
            }
            'm' | 'M' => {
                let count = consume_run(ch, &mut chars);
                flush_literal(&mut literal, &mut tokens);
                tokens.push(Token::MonthOrMinute(count));
            }
            's' | 'S' => {
                let count = consume_run(ch, &mut chars);
                flush_literal(&mut literal, &mut tokens);
                tokens.push(Token::Second(count));

                if chars.peek() == Some(&'.') {
                    let zeros = chars.clone().skip(1).take_while(|c| *c == '0').count();
                    if zeros > 0 {
                        chars.nth(zeros);
                        tokens.push(Token::FractionalSeconds(zeros));
                    }
                }
            }
            _ => literal.push(ch),
        }
    }

    flush_literal(&mut literal, &mut tokens);
    tokens
}

fn parse_elapsed(lower: &str) -> Option<Token> {
    let count = lower.chars().count();
    if count == 0 {
        return None;
    }
    if lower.chars().all(|c| c == 'h') {
        Some(Token::ElapsedHours(count))
    } else if lower.chars().all(|c| c == 'm') {
        Some(Token::ElapsedMinutes(count))
    } else if lower.chars().all(|c| c == 's') {
        Some(Token::ElapsedSeconds(count))
    } else {
        None
    }
}

fn consume_run(first: char, chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> usize {
    let mut count = 1;
    while let Some(next) = chars.peek() {
        if next.eq_ignore_ascii_case(&first) {
            chars.next();
            count += 1;
        } else {
            break;
        }
    }
    count
}

fn flush_literal(literal: &mut String, tokens: &mut Vec<Token>) {
    if !literal.is_empty() {
        tokens.push(Token::Literal(std::mem::take(literal)));
    }
}

/// `m`/`mm` is a minute right after an hour or right before a second, else a month
fn disambiguate_month_minute(mut tokens: Vec<Token>) -> Vec<Token> {
    for idx in 0..tokens.len() {
        let Token::MonthOrMinute(count) = tokens[idx] else {
            continue;
        };

        if count >= 3 {
            tokens[idx] = Token::Month(count);
            continue;
        }

        let after_hour = tokens[..idx]
            .iter()
            .rev()
            .find(|t| !matches!(t, Token::Literal(_)))
            .is_some_and(|t| matches!(t, Token::Hour(_) | Token::ElapsedHours(_)));
        let before_second = tokens[idx + 1..]
            .iter()
            .find(|t| !matches!(t, Token::Literal(_)))
            .is_some_and(|t| matches!(t, Token::Second(_) | Token::ElapsedSeconds(_)));

        tokens[idx] = if after_hour || before_second {
            Token::Minute(count)
        } else {
            Token::Month(count)
        };
    }
    tokens
}
