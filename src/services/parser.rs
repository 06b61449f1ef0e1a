use chrono::{Days, Local, NaiveDate};
use lazy_static::lazy_static;
use regex::Regex;

use crate::models::{Command, DialogueStep};

lazy_static! {
    static ref DIGITS_REGEX: Regex = Regex::new(r"\b([0-9]+)\b").unwrap();
    static ref ISO_DATE_REGEX: Regex =
        Regex::new(r"\b([0-9]{4})-([0-9]{2})-([0-9]{2})\b").unwrap();
    static ref DMY_DATE_REGEX: Regex =
        Regex::new(r"\b([0-9]{1,2})[/\-]([0-9]{1,2})[/\-]([0-9]{4})\b").unwrap();
    static ref CLOCK_REGEX: Regex =
        Regex::new(r"\b([0-9]{1,2})(?::([0-9]{2}))?\s*(am|pm)?\b").unwrap();
    static ref DOTTED_MERIDIEM_REGEX: Regex = Regex::new(r"\b([ap])\.m\.?").unwrap();
}

const CANCEL_WORDS: [&str; 4] = ["cancel", "stop", "never mind", "nevermind"];
const CONFIRM_WORDS: [&str; 4] = ["yes", "confirm", "book", "proceed"];

// Scanned in this order, not in transcript order: "two or one" yields 1.
const NUMBER_WORDS: [(&str, u32); 12] = [
    ("one", 1),
    ("two", 2),
    ("three", 3),
    ("four", 4),
    ("five", 5),
    ("six", 6),
    ("seven", 7),
    ("eight", 8),
    ("nine", 9),
    ("ten", 10),
    ("eleven", 11),
    ("twelve", 12),
];

/// Classify a final transcript using today's local date for relative dates.
pub fn parse(transcript: &str, step: &DialogueStep) -> Command {
    parse_on(transcript, step, Local::now().date_naive())
}

/// Classify a final transcript. Total and pure: the same inputs always give
/// the same command, and every input gives one.
pub fn parse_on(transcript: &str, step: &DialogueStep, today: NaiveDate) -> Command {
    let text = normalize(transcript);

    if CANCEL_WORDS.iter().any(|w| text.contains(w)) {
        return Command::Cancellation;
    }

    if CONFIRM_WORDS.iter().any(|w| text.contains(w)) {
        return Command::Confirmation;
    }

    // Digits inside a full date or a clock reading are not bare numbers.
    match step {
        DialogueStep::DateSelection => {
            if let Some(date) = explicit_date(&text) {
                return Command::Date(date);
            }
        }
        DialogueStep::TimeSelection => {
            if let Some(time) = clock_time(&text) {
                return Command::Time(time);
            }
        }
        _ => {}
    }

    if let Some(n) = number(&text) {
        return Command::Number(n);
    }

    if *step == DialogueStep::DateSelection {
        if text.contains("today") {
            return Command::Date(today);
        }
        if text.contains("tomorrow") {
            if let Some(date) = today.checked_add_days(Days::new(1)) {
                return Command::Date(date);
            }
        }
    }

    Command::Unknown
}

/// `YYYY-MM-DD`, the format the booking backend expects.
pub fn format_iso_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

fn normalize(transcript: &str) -> String {
    let text = transcript.trim().to_lowercase();
    DOTTED_MERIDIEM_REGEX.replace_all(&text, "${1}m").into_owned()
}

fn number(text: &str) -> Option<u32> {
    if let Some(caps) = DIGITS_REGEX.captures(text) {
        // Anything too large for u32 is out of range for every option list.
        return Some(caps[1].parse().unwrap_or(u32::MAX));
    }

    NUMBER_WORDS
        .iter()
        .find(|(word, _)| text.contains(word))
        .map(|(_, value)| *value)
}

fn explicit_date(text: &str) -> Option<NaiveDate> {
    let iso = ISO_DATE_REGEX.captures(text).and_then(|caps| {
        NaiveDate::from_ymd_opt(
            caps[1].parse().ok()?,
            caps[2].parse().ok()?,
            caps[3].parse().ok()?,
        )
    });
    if iso.is_some() {
        return iso;
    }

    // Day first: 10/03/2025 is the 10th of March.
    DMY_DATE_REGEX.captures(text).and_then(|caps| {
        NaiveDate::from_ymd_opt(
            caps[3].parse().ok()?,
            caps[2].parse().ok()?,
            caps[1].parse().ok()?,
        )
    })
}

/// First clock reading that carries minutes or a meridiem, as `HH:MM`.
/// Without a meridiem the hour is taken literally on a 24-hour clock.
fn clock_time(text: &str) -> Option<String> {
    CLOCK_REGEX.captures_iter(text).find_map(|caps| {
        let minute = caps.get(2);
        let meridiem = caps.get(3).map(|m| m.as_str());
        if minute.is_none() && meridiem.is_none() {
            return None;
        }

        let mut hour: u32 = caps[1].parse().ok()?;
        let minute: u32 = match minute {
            Some(m) => m.as_str().parse().ok()?,
            None => 0,
        };

        match meridiem {
            Some("pm") if hour < 12 => hour += 12,
            Some("am") if hour == 12 => hour = 0,
            _ => {}
        }

        if hour > 23 || minute > 59 {
            return None;
        }
        Some(format!("{hour:02}:{minute:02}"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 8).unwrap()
    }

    fn p(text: &str, step: DialogueStep) -> Command {
        parse_on(text, &step, today())
    }

    #[test]
    fn test_cancellation_wins_at_every_step() {
        let steps = [
            DialogueStep::HospitalSelection,
            DialogueStep::DoctorSelection,
            DialogueStep::DateSelection,
            DialogueStep::TimeSelection,
            DialogueStep::PatientDetails,
        ];
        for step in steps {
            for text in ["Cancel", "please STOP", "never mind 3", "Nevermind, yes"] {
                assert_eq!(p(text, step.clone()), Command::Cancellation, "{text}");
            }
        }
    }

    #[test]
    fn test_confirmation_words() {
        assert_eq!(p("Yes please", DialogueStep::PatientDetails), Command::Confirmation);
        assert_eq!(p("go ahead and book it", DialogueStep::PatientDetails), Command::Confirmation);
        assert_eq!(p("proceed with 2", DialogueStep::HospitalSelection), Command::Confirmation);
    }

    #[test]
    fn test_first_digit_run_is_the_number() {
        assert_eq!(p("number 2 or 3", DialogueStep::HospitalSelection), Command::Number(2));
        assert_eq!(p("  42  ", DialogueStep::PatientDetails), Command::Number(42));
        assert_eq!(p("option 7", DialogueStep::DateSelection), Command::Number(7));
        assert_eq!(p("slot 2", DialogueStep::TimeSelection), Command::Number(2));
    }

    #[test]
    fn test_number_words() {
        assert_eq!(p("three", DialogueStep::HospitalSelection), Command::Number(3));
        assert_eq!(p("three", DialogueStep::DateSelection), Command::Number(3));
        assert_eq!(p("Twelve", DialogueStep::DoctorSelection), Command::Number(12));
    }

    #[test]
    fn test_number_words_follow_vocabulary_order() {
        assert_eq!(p("two or one", DialogueStep::HospitalSelection), Command::Number(1));
        // "seventeen" contains "seven"
        assert_eq!(p("seventeen", DialogueStep::HospitalSelection), Command::Number(7));
    }

    #[test]
    fn test_digits_glued_to_letters_are_not_numbers() {
        assert_eq!(p("room4", DialogueStep::HospitalSelection), Command::Unknown);
    }

    #[test]
    fn test_huge_number_saturates() {
        assert_eq!(
            p("99999999999999", DialogueStep::HospitalSelection),
            Command::Number(u32::MAX)
        );
    }

    #[test]
    fn test_iso_date() {
        let expected = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
        assert_eq!(p("2025-03-10", DialogueStep::DateSelection), Command::Date(expected));
    }

    #[test]
    fn test_day_month_year_date() {
        let expected = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
        assert_eq!(p("10-03-2025", DialogueStep::DateSelection), Command::Date(expected));
        assert_eq!(p("on 10/3/2025", DialogueStep::DateSelection), Command::Date(expected));
    }

    #[test]
    fn test_invalid_calendar_date_falls_through() {
        assert_eq!(p("2025-02-30", DialogueStep::DateSelection), Command::Number(2025));
        assert_eq!(p("31/04/2025", DialogueStep::DateSelection), Command::Number(31));
    }

    #[test]
    fn test_dates_only_at_date_selection() {
        assert_eq!(p("2025-03-10", DialogueStep::HospitalSelection), Command::Number(2025));
        assert_eq!(p("tomorrow", DialogueStep::HospitalSelection), Command::Unknown);
    }

    #[test]
    fn test_relative_dates() {
        assert_eq!(p("today", DialogueStep::DateSelection), Command::Date(today()));
        assert_eq!(
            p("Tomorrow morning", DialogueStep::DateSelection),
            Command::Date(NaiveDate::from_ymd_opt(2025, 3, 9).unwrap())
        );
    }

    #[test]
    fn test_meridiem_conversion() {
        assert_eq!(p("2 pm", DialogueStep::TimeSelection), Command::Time("14:00".to_string()));
        assert_eq!(p("12 am", DialogueStep::TimeSelection), Command::Time("00:00".to_string()));
        assert_eq!(p("12 pm", DialogueStep::TimeSelection), Command::Time("12:00".to_string()));
        assert_eq!(p("2:30pm", DialogueStep::TimeSelection), Command::Time("14:30".to_string()));
        assert_eq!(p("2 p.m.", DialogueStep::TimeSelection), Command::Time("14:00".to_string()));
    }

    #[test]
    fn test_time_without_meridiem_is_literal() {
        assert_eq!(p("9:30", DialogueStep::TimeSelection), Command::Time("09:30".to_string()));
        assert_eq!(p("at 14:00", DialogueStep::TimeSelection), Command::Time("14:00".to_string()));
    }

    #[test]
    fn test_bare_hour_at_time_selection_is_a_number() {
        assert_eq!(p("9", DialogueStep::TimeSelection), Command::Number(9));
    }

    #[test]
    fn test_out_of_range_clock_is_not_a_time() {
        assert_eq!(p("25:00", DialogueStep::TimeSelection), Command::Number(25));
        assert_eq!(p("9:75", DialogueStep::TimeSelection), Command::Number(9));
    }

    #[test]
    fn test_times_only_at_time_selection() {
        assert_eq!(p("2 pm", DialogueStep::DateSelection), Command::Number(2));
    }

    #[test]
    fn test_unknown() {
        assert_eq!(p("what's up", DialogueStep::HospitalSelection), Command::Unknown);
        assert_eq!(p("", DialogueStep::TimeSelection), Command::Unknown);
    }

    #[test]
    fn test_non_ascii_digits_are_not_numbers() {
        assert_eq!(p("option ३", DialogueStep::HospitalSelection), Command::Unknown);
        assert_eq!(p("٢", DialogueStep::TimeSelection), Command::Unknown);
        assert_eq!(p("٢ pm", DialogueStep::TimeSelection), Command::Unknown);
        assert_eq!(p("२०२५-०३-१०", DialogueStep::DateSelection), Command::Unknown);
    }

    #[test]
    fn test_parse_is_deterministic() {
        for text in ["three", "2025-03-10", "2 pm", "what's up", "cancel"] {
            let first = p(text, DialogueStep::DateSelection);
            let second = p(text, DialogueStep::DateSelection);
            assert_eq!(first, second);
        }
    }

    #[test]
    fn test_format_iso_date() {
        let d = NaiveDate::from_ymd_opt(2025, 1, 5).unwrap();
        assert_eq!(format_iso_date(d), "2025-01-05");
    }
}
