//! # Hijri Calendar Conversion
//!
//! Tabular (arithmetic) Islamic calendar conversion through Julian day
//! numbers. The converted dates drive the calendar view; observational
//! adjustments announced by local authorities can differ by a day or two.

use chrono::{Datelike, NaiveDate, Weekday};

/// Hijri month names in calendar order.
pub const MONTH_NAMES: [&str; 12] = [
    "Muharram",
    "Safar",
    "Rabi al-Awwal",
    "Rabi al-Thani",
    "Jumada al-Awwal",
    "Jumada al-Thani",
    "Rajab",
    "Shaban",
    "Ramadan",
    "Shawwal",
    "Dhu al-Qadah",
    "Dhu al-Hijjah",
];

const HIJRI_EPOCH_JD: f64 = 1_948_439.5;

/// A date on the tabular Hijri calendar, paired with the Gregorian date it
/// was derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HijriDate {
    year: i32,
    month: u32,
    day: u32,
    gregorian: NaiveDate,
}

impl HijriDate {
    /// Convert a Gregorian date.
    pub fn from_gregorian(date: NaiveDate) -> Self {
        let jd = gregorian_to_jd(date.year(), date.month(), date.day());
        let (year, month, day) = jd_to_hijri(jd);
        Self {
            year,
            month,
            day,
            gregorian: date,
        }
    }

    /// Construct from Hijri components.
    ///
    /// Returns `None` for out-of-range components or when the resulting
    /// Gregorian date is unrepresentable.
    pub fn from_hijri(year: i32, month: u32, day: u32) -> Option<Self> {
        if !(1..=12).contains(&month) || !(1..=30).contains(&day) {
            return None;
        }
        let jd = hijri_to_jd(year, month, day);
        let gregorian = jd_to_gregorian(jd)?;
        Some(Self {
            year,
            month,
            day,
            gregorian,
        })
    }

    /// Hijri year.
    pub fn year(&self) -> i32 {
        self.year
    }

    /// Hijri month, 1-based (1 = Muharram).
    pub fn month(&self) -> u32 {
        self.month
    }

    /// Day of the Hijri month, 1-based.
    pub fn day(&self) -> u32 {
        self.day
    }

    /// English name of the Hijri month.
    pub fn month_name(&self) -> &'static str {
        MONTH_NAMES[(self.month - 1) as usize]
    }

    /// Days in the current month under the tabular scheme: odd months have
    /// 30 days, even months 29.
    pub fn days_in_month(&self) -> u32 {
        if self.month % 2 == 1 {
            30
        } else {
            29
        }
    }

    /// Weekday of the underlying Gregorian date.
    pub fn weekday(&self) -> Weekday {
        self.gregorian.weekday()
    }

    /// The Gregorian date this Hijri date corresponds to.
    pub fn gregorian(&self) -> NaiveDate {
        self.gregorian
    }

    /// The first day of this date's Hijri month, used to lay out the
    /// calendar grid.
    pub fn first_of_month(&self) -> Option<Self> {
        Self::from_hijri(self.year, self.month, 1)
    }
}

fn gregorian_to_jd(year: i32, month: u32, day: u32) -> f64 {
    let (mut y, mut m) = (year as f64, month as f64);
    if month < 3 {
        y -= 1.0;
        m += 12.0;
    }
    let a = (y / 100.0).floor();
    let b = 2.0 - a + (a / 4.0).floor();
    (365.25 * (y + 4716.0)).floor() + (30.6001 * (m + 1.0)).floor() + day as f64 + b - 1524.5
}

fn hijri_to_jd(year: i32, month: u32, day: u32) -> f64 {
    day as f64
        + (29.5 * (month as f64 - 1.0)).ceil()
        + (year as f64 - 1.0) * 354.0
        + ((3.0 + 11.0 * year as f64) / 30.0).floor()
        + HIJRI_EPOCH_JD
        - 1.0
}

fn jd_to_hijri(jd: f64) -> (i32, u32, u32) {
    let jd = jd.floor() + 0.5;
    let year = ((30.0 * (jd - HIJRI_EPOCH_JD) + 10_646.0) / 10_631.0).floor() as i32;
    let month_estimate = ((jd - (29.0 + hijri_to_jd(year, 1, 1))) / 29.5).ceil() + 1.0;
    let month = month_estimate.clamp(1.0, 12.0) as u32;
    let day = ((jd - hijri_to_jd(year, month, 1)).ceil() + 1.0) as u32;
    (year, month, day)
}

fn jd_to_gregorian(jd: f64) -> Option<NaiveDate> {
    let z = (jd + 0.5).floor();
    let a = ((z - 1_867_216.25) / 36_524.25).floor();
    let b = z + 1.0 + a - (a / 4.0).floor();
    let c = b + 1524.0;
    let d = ((c - 122.1) / 365.25).floor();
    let e = (365.25 * d).floor();
    let f = ((c - e) / 30.6001).floor();

    let day = (c - e - (30.6001 * f).floor()) as u32;
    let month = if f < 14.0 { f - 1.0 } else { f - 13.0 } as u32;
    let year = if month > 2 {
        (d - 4716.0) as i32
    } else {
        (d - 4715.0) as i32
    };

    NaiveDate::from_ymd_opt(year, month, day)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn greg(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn ramadan_1445_starts_march_2024() {
        let date = HijriDate::from_gregorian(greg(2024, 3, 11));
        assert_eq!(date.year(), 1445);
        assert_eq!(date.month(), 9);
        assert_eq!(date.day(), 1);
        assert_eq!(date.month_name(), "Ramadan");
        assert_eq!(date.weekday(), Weekday::Mon);
    }

    #[test]
    fn millennium_date() {
        let date = HijriDate::from_gregorian(greg(2000, 1, 1));
        assert_eq!(date.year(), 1420);
        assert_eq!(date.month(), 9);
        assert_eq!(date.day(), 24);
    }

    #[test]
    fn hijri_round_trip() {
        let date = HijriDate::from_hijri(1445, 9, 1).unwrap();
        assert_eq!(date.gregorian(), greg(2024, 3, 11));

        let back = HijriDate::from_gregorian(date.gregorian());
        assert_eq!((back.year(), back.month(), back.day()), (1445, 9, 1));
    }

    #[test]
    fn tabular_month_lengths() {
        let ramadan = HijriDate::from_hijri(1445, 9, 1).unwrap();
        assert_eq!(ramadan.days_in_month(), 30);

        let safar = HijriDate::from_hijri(1445, 2, 1).unwrap();
        assert_eq!(safar.days_in_month(), 29);
    }

    #[test]
    fn first_of_month_weekday_differs_from_naive_reuse() {
        let date = HijriDate::from_gregorian(greg(2024, 3, 20));
        assert_eq!(date.month(), 9);
        let first = date.first_of_month().unwrap();
        assert_eq!(first.day(), 1);
        assert_eq!(first.gregorian(), greg(2024, 3, 11));
        assert_eq!(first.weekday(), Weekday::Mon);
    }

    #[test]
    fn rejects_out_of_range_components() {
        assert!(HijriDate::from_hijri(1445, 0, 1).is_none());
        assert!(HijriDate::from_hijri(1445, 13, 1).is_none());
        assert!(HijriDate::from_hijri(1445, 9, 31).is_none());
    }

    #[test]
    fn consecutive_days_advance() {
        let a = HijriDate::from_gregorian(greg(2024, 3, 11));
        let b = HijriDate::from_gregorian(greg(2024, 3, 12));
        assert_eq!(a.day() + 1, b.day());
        assert_eq!(a.month(), b.month());
    }
}
