use chrono::{TimeZone, Utc};

use market_watch::config::MarketConfig;
use market_watch::error::AppError;
use market_watch::market_session::{MarketHours, MarketStatus};

fn nse() -> MarketHours {
    MarketHours::from_config(&MarketConfig::default()).unwrap()
}

#[test]
fn weekday_inside_hours_is_open() {
    let hours = nse();
    // Wednesday 2024-06-12 06:00 UTC = 11:30 IST
    let midday = Utc.with_ymd_and_hms(2024, 6, 12, 6, 0, 0).unwrap();
    assert_eq!(hours.status_at(midday), MarketStatus::Open);
    // 10:00 UTC = 15:30 IST
    let closing = Utc.with_ymd_and_hms(2024, 6, 12, 10, 0, 0).unwrap();
    assert_eq!(hours.status_at(closing), MarketStatus::Open);
}

#[test]
fn weekend_is_closed() {
    let hours = nse();
    let saturday = Utc.with_ymd_and_hms(2024, 6, 15, 6, 0, 0).unwrap();
    let sunday = Utc.with_ymd_and_hms(2024, 6, 16, 6, 0, 0).unwrap();
    assert_eq!(hours.status_at(saturday), MarketStatus::Closed);
    assert_eq!(hours.status_at(sunday), MarketStatus::Closed);
}

#[test]
fn offset_moves_the_weekday() {
    let hours = nse();
    // Sunday 2024-06-16 22:00 UTC is Monday 03:30 IST, before the open.
    let late_sunday = Utc.with_ymd_and_hms(2024, 6, 16, 22, 0, 0).unwrap();
    assert_eq!(hours.status_at(late_sunday), MarketStatus::Closed);
    // Friday 2024-06-14 20:00 UTC is 16:00 EDT with a -240 offset.
    let nyse = MarketHours::new(-240, (9, 30), (16, 0)).unwrap();
    let friday_close = Utc.with_ymd_and_hms(2024, 6, 14, 20, 0, 0).unwrap();
    assert_eq!(nyse.status_at(friday_close), MarketStatus::Open);
}

#[test]
fn status_labels() {
    assert_eq!(MarketStatus::Open.label(), "MARKET OPEN");
    assert_eq!(MarketStatus::Closed.label(), "MARKET CLOSED");
}

#[test]
fn out_of_range_offset_is_rejected() {
    let err = MarketHours::new(i32::MAX, (9, 15), (15, 30)).unwrap_err();
    assert!(matches!(err.downcast_ref::<AppError>(), Some(AppError::Config(_))));
    assert!(MarketHours::new(i32::MIN, (9, 15), (15, 30)).is_err());
    assert!(MarketHours::new(24 * 60, (9, 15), (15, 30)).is_err());
    assert!(MarketHours::new(-300, (9, 30), (16, 0)).is_ok());
}
