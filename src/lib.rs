use chrono::{NaiveDate, Utc};

mod calendar;
mod dataset;
mod error;
mod fetch;
mod geo;
mod ioutil;
mod jhu;
mod plot;
mod progress;
mod timeseries;

pub use calendar::*;
pub use dataset::*;
pub use error::*;
pub use fetch::*;
pub use geo::*;
pub use ioutil::*;
pub use jhu::*;
pub use plot::*;
pub use progress::*;
pub use timeseries::*;


pub fn naive_today() -> NaiveDate {
	Utc::now().date_naive()
}

/// First date column of the upstream tables since their initial publication.
pub fn global_start_date() -> NaiveDate {
	NaiveDate::from_ymd_opt(2020, 1, 22).expect("hardcoded date")
}
