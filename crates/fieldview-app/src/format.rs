// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use regex::Regex;
use std::sync::LazyLock;

static TIMESTAMP_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([0-9]{4})-([0-9]{2})-([0-9]{2})T[0-9]{2}:[0-9]{2}:[0-9]{2}\.[0-9]Z$")
        .expect("timestamp pattern compiles")
});

pub fn format_heading(field: &str) -> String {
    let mut chars = field.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Rewrites `YYYY-MM-DDTHH:MM:SS.fZ` as `DD.MM.YYYY`. Anything else,
/// including timestamps with a different fraction width, passes through.
pub fn format_date(value: &str) -> String {
    match TIMESTAMP_PATTERN.captures(value) {
        Some(captures) => format!("{}.{}.{}", &captures[3], &captures[2], &captures[1]),
        None => value.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::{format_date, format_heading};

    #[test]
    fn heading_capitalizes_only_the_first_character() {
        assert_eq!(format_heading("name"), "Name");
        assert_eq!(format_heading("createdAt"), "CreatedAt");
        assert_eq!(format_heading("Title"), "Title");
        assert_eq!(format_heading(""), "");
        assert_eq!(format_heading("ßeta"), "SSeta");
    }

    #[test]
    fn date_with_single_fraction_digit_is_reformatted() {
        assert_eq!(format_date("2023-05-09T14:22:31.5Z"), "09.05.2023");
        assert_eq!(format_date("1999-12-31T23:59:59.0Z"), "31.12.1999");
    }

    #[test]
    fn non_conforming_values_pass_through() {
        assert_eq!(format_date("not-a-date"), "not-a-date");
        assert_eq!(format_date("2023-05-09T14:22:31Z"), "2023-05-09T14:22:31Z");
        assert_eq!(
            format_date("2023-05-09T14:22:31.500Z"),
            "2023-05-09T14:22:31.500Z"
        );
        assert_eq!(
            format_date(" 2023-05-09T14:22:31.5Z"),
            " 2023-05-09T14:22:31.5Z"
        );
        assert_eq!(format_date("2023-05-09"), "2023-05-09");
        assert_eq!(
            format_date("２０２３-05-09T14:22:31.5Z"),
            "２０２３-05-09T14:22:31.5Z"
        );
    }

    #[test]
    fn shape_is_checked_not_calendar_validity() {
        assert_eq!(format_date("2023-13-45T99:99:99.9Z"), "45.13.2023");
    }
}
