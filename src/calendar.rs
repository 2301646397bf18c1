use chrono::{Datelike, NaiveDate};


/// Synthetic month ticks are always placed in this year, matching the
/// report tool this replaces. Multi-year inputs therefore collapse onto
/// 2020-labelled ticks; do not generalize without a requirements change.
pub const REFERENCE_YEAR: i32 = 2020;

/// Day-of-month of the synthetic tick, valid in every month.
const TICK_DAY: u32 = 28;


/// The synthetic "end of month" tick date for a month number 1..=12.
pub fn month_end(month: u32) -> NaiveDate {
	NaiveDate::from_ymd_opt(REFERENCE_YEAR, month, TICK_DAY).expect("month out of range")
}

/// Axis label format shared by every chart: two-digit month, four-digit year.
pub fn month_label(date: NaiveDate) -> String {
	date.format("%m-%Y").to_string()
}

/// Maps the distinct calendar months present in the given dates to their
/// synthetic month-end tick dates and labels, in month order.
pub fn month_end_labels<I: IntoIterator<Item = NaiveDate>>(dates: I) -> Vec<(NaiveDate, String)> {
	let mut months: Vec<u32> = dates.into_iter().map(|d| d.month()).collect();
	months.sort_unstable();
	months.dedup();
	months.into_iter().map(|m| {
		let tick = month_end(m);
		let label = month_label(tick);
		(tick, label)
	}).collect()
}


#[cfg(test)]
mod tests {
	use super::*;

	fn date(y: i32, m: u32, d: u32) -> NaiveDate {
		NaiveDate::from_ymd_opt(y, m, d).unwrap()
	}

	#[test]
	fn ticks_cover_each_month_once() {
		let dates = (0..15).map(|i| date(2020, 1, 22) + chrono::Duration::days(i));
		let ticks = month_end_labels(dates);
		assert_eq!(ticks, vec![
			(date(2020, 1, 28), "01-2020".to_string()),
			(date(2020, 2, 28), "02-2020".to_string()),
		]);
	}

	#[test]
	fn tick_day_ignores_actual_month_length() {
		assert_eq!(month_end(2), date(2020, 2, 28));
		assert_eq!(month_end(12), date(2020, 12, 28));
	}

	#[test]
	fn labels_use_month_dash_year() {
		assert_eq!(month_label(date(2020, 3, 28)), "03-2020");
	}
}
