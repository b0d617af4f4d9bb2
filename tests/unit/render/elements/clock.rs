use super::*;
use crate::scene::model::TimestampDef;
use chrono::TimeZone;

fn at(h: u32, m: u32, s: u32, ms: u32) -> DateTime<FixedOffset> {
    let utc = FixedOffset::east_opt(0).unwrap();
    utc.with_ymd_and_hms(2024, 3, 9, h, m, s).unwrap() + TimeDelta::milliseconds(i64::from(ms))
}

fn countdown(target_ms: i64) -> CountdownBody {
    CountdownBody {
        target_time: TimestampDef(Utc.timestamp_millis_opt(target_ms).unwrap()),
        completed_text: crate::scene::model::default_completed_text(),
        show_days: true,
        show_labels: false,
    }
}

#[test]
fn digital_formats() {
    let t = at(15, 4, 5, 0);
    assert_eq!(format_digital(t, HourFormat::H24, true), "15:04:05");
    assert_eq!(format_digital(t, HourFormat::H24, false), "15:04");
    assert_eq!(format_digital(t, HourFormat::H12, true), "03:04:05 PM");
    assert_eq!(format_digital(at(0, 30, 0, 0), HourFormat::H12, false), "12:30 AM");
}

#[test]
fn second_hand_includes_sub_second_fraction() {
    let (_, _, s0) = hand_angles(at(10, 0, 15, 0));
    let (_, _, s1) = hand_angles(at(10, 0, 15, 500));
    assert!((s0 - TAU / 4.0).abs() < 1e-9);
    assert!((s1 - s0 - TAU / 120.0).abs() < 1e-9);
}

#[test]
fn hour_hand_moves_with_minutes() {
    let (h, m, _) = hand_angles(at(3, 30, 0, 0));
    assert!((h - TAU * 3.5 / 12.0).abs() < 1e-9);
    assert!((m - PI).abs() < 1e-9);
}

#[test]
fn timer_formats_and_clamps() {
    assert_eq!(timer_text(TimeDelta::seconds(3_725), true), "01:02:05");
    assert_eq!(timer_text(TimeDelta::seconds(3_725), false), "62:05");
    assert_eq!(timer_text(TimeDelta::seconds(-5), true), "00:00:00");
}

#[test]
fn countdown_remaining_rounds_up_to_whole_seconds() {
    let now = Utc.timestamp_millis_opt(0).unwrap();
    let target = Utc.timestamp_millis_opt(90_061_500).unwrap();
    assert_eq!(
        countdown_remaining(now, target),
        Some(Remaining {
            days: 1,
            hours: 1,
            minutes: 1,
            seconds: 2
        })
    );
}

#[test]
fn countdown_at_or_past_target_shows_completion_text() {
    let body = countdown(10_000);
    for now_ms in [10_000, 10_001, 99_999_999] {
        let now = Utc.timestamp_millis_opt(now_ms).unwrap();
        assert_eq!(countdown_text(&body, now), "Time's up!");
    }
}

#[test]
fn countdown_text_variants() {
    let now = Utc.timestamp_millis_opt(0).unwrap();
    let mut body = countdown((2 * 86_400 + 3 * 3600 + 4 * 60 + 5) * 1000);
    assert_eq!(countdown_text(&body, now), "2d 03:04:05");
    body.show_labels = true;
    assert_eq!(countdown_text(&body, now), "2d 3h 4m 5s");
    body.show_labels = false;
    body.show_days = false;
    assert_eq!(countdown_text(&body, now), "51:04:05");
}
