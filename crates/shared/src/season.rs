//! Season calculation.
//!
//! Seasons follow fixed quarter boundaries:
//!
//! | Months        | Season |
//! |---------------|--------|
//! | Dec, Jan, Feb | WINTER |
//! | Mar, Apr, May | SPRING |
//! | Jun, Jul, Aug | SUMMER |
//! | Sep, Oct, Nov | FALL   |
//!
//! The year attached to a season is the calendar year of the reference date,
//! so December belongs to WINTER of the same year.

use crate::models::{MediaSeason, SeasonYear};
use chrono::{Datelike, Month, NaiveDate};

/// Map a calendar month to its season
pub fn season_of(month: Month) -> MediaSeason {
    match month {
        Month::December | Month::January | Month::February => MediaSeason::Winter,
        Month::March | Month::April | Month::May => MediaSeason::Spring,
        Month::June | Month::July | Month::August => MediaSeason::Summer,
        Month::September | Month::October | Month::November => MediaSeason::Fall,
    }
}

/// Season following `season`, with the year rolled forward on FALL -> WINTER
pub fn next_season(season: MediaSeason, reference: NaiveDate) -> SeasonYear {
    let year = reference.year();
    match season {
        MediaSeason::Winter => SeasonYear::new(MediaSeason::Spring, year),
        MediaSeason::Spring => SeasonYear::new(MediaSeason::Summer, year),
        MediaSeason::Summer => SeasonYear::new(MediaSeason::Fall, year),
        MediaSeason::Fall => SeasonYear::new(MediaSeason::Winter, year + 1),
    }
}

fn month_of(date: NaiveDate) -> Month {
    // NaiveDate::month() is always 1..=12
    Month::try_from(date.month() as u8).unwrap_or(Month::January)
}

impl SeasonYear {
    /// Season containing `date`
    pub fn of_date(date: NaiveDate) -> Self {
        SeasonYear::new(season_of(month_of(date)), date.year())
    }

    /// Season after the one containing `date`
    pub fn following(date: NaiveDate) -> Self {
        next_season(season_of(month_of(date)), date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn test_season_of_every_month() {
        assert_eq!(season_of(Month::January), MediaSeason::Winter);
        assert_eq!(season_of(Month::February), MediaSeason::Winter);
        assert_eq!(season_of(Month::March), MediaSeason::Spring);
        assert_eq!(season_of(Month::April), MediaSeason::Spring);
        assert_eq!(season_of(Month::May), MediaSeason::Spring);
        assert_eq!(season_of(Month::June), MediaSeason::Summer);
        assert_eq!(season_of(Month::July), MediaSeason::Summer);
        assert_eq!(season_of(Month::August), MediaSeason::Summer);
        assert_eq!(season_of(Month::September), MediaSeason::Fall);
        assert_eq!(season_of(Month::October), MediaSeason::Fall);
        assert_eq!(season_of(Month::November), MediaSeason::Fall);
        assert_eq!(season_of(Month::December), MediaSeason::Winter);
    }

    #[test]
    fn test_next_season_transitions() {
        let reference = date(2026, 6, 15);
        assert_eq!(
            next_season(MediaSeason::Winter, reference),
            SeasonYear::new(MediaSeason::Spring, 2026)
        );
        assert_eq!(
            next_season(MediaSeason::Spring, reference),
            SeasonYear::new(MediaSeason::Summer, 2026)
        );
        assert_eq!(
            next_season(MediaSeason::Summer, reference),
            SeasonYear::new(MediaSeason::Fall, 2026)
        );
        assert_eq!(
            next_season(MediaSeason::Fall, reference),
            SeasonYear::new(MediaSeason::Winter, 2027)
        );
    }

    #[test]
    fn test_of_date_and_following() {
        let october = date(2026, 10, 19);
        assert_eq!(
            SeasonYear::of_date(october),
            SeasonYear::new(MediaSeason::Fall, 2026)
        );
        assert_eq!(
            SeasonYear::following(october),
            SeasonYear::new(MediaSeason::Winter, 2027)
        );

        // December is WINTER of the same calendar year, so no rollover
        let december = date(2026, 12, 31);
        assert_eq!(
            SeasonYear::of_date(december),
            SeasonYear::new(MediaSeason::Winter, 2026)
        );
        assert_eq!(
            SeasonYear::following(december),
            SeasonYear::new(MediaSeason::Spring, 2026)
        );
    }
}
