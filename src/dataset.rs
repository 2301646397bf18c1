use std::ops::AddAssign;

use num_traits::Zero;

use log::info;

use crate::error::Error;
use crate::geo::{GeoSelector, GeographyKey};
use crate::jhu::{CaseCounters, CaseKind, DerivedCounters};
use crate::timeseries::{daily_delta, Series, TimeSeries, TimeSeriesKey};


/// The three fetched tables, loaded and schema-checked.
pub struct RawData {
	pub confirmed: CaseCounters,
	pub recovered: CaseCounters,
	pub deaths: CaseCounters,
}

impl RawData {
	pub fn table(&self, kind: CaseKind) -> &CaseCounters {
		match kind {
			CaseKind::Confirmed => &self.confirmed,
			CaseKind::Recovered => &self.recovered,
			CaseKind::Deaths => &self.deaths,
		}
	}
}


/// Tables computed from the raw ones.
pub struct DerivedData {
	pub active: DerivedCounters,
	pub daily_new: DerivedCounters,
}

impl DerivedData {
	pub fn compute(raw: &RawData) -> Result<Self, Error> {
		info!("computing active and daily new case tables");
		Ok(Self{
			active: active_table(&raw.confirmed, &raw.recovered, &raw.deaths)?,
			daily_new: daily_new_table(&raw.confirmed),
		})
	}
}


/// Sums all rows the selector covers into one series. A sub-region selector
/// must match exactly one row; matching several means the sub-region name is
/// not unique within its country and the caller has to disambiguate.
pub fn sum_by_geography<V: Copy + Zero + AddAssign>(
		table_name: &'static str,
		table: &TimeSeries<GeographyKey, V>,
		selector: &GeoSelector,
) -> Result<Series<V>, Error> {
	let mut accum: Vec<V> = Vec::new();
	accum.resize(table.axis().len(), V::zero());
	let mut matches = 0;
	for key in table.keys() {
		if !selector.matches(key) {
			continue
		}
		matches += 1;
		for (slot, v) in accum.iter_mut().zip(table.get(key).unwrap().iter()) {
			*slot += *v;
		}
	}
	match (selector, matches) {
		(_, 0) => Err(Error::NotFound{table: table_name, selector: selector.clone(), matches: 0}),
		(GeoSelector::SubRegion{..}, n) if n > 1 => {
			Err(Error::NotFound{table: table_name, selector: selector.clone(), matches: n})
		},
		_ => Ok(Series::new(table.axis().start(), accum)),
	}
}


fn check_aligned<K: TimeSeriesKey, V: Copy + Zero>(
		left_name: &'static str,
		left: &TimeSeries<K, V>,
		right_name: &'static str,
		right: &TimeSeries<K, V>,
) -> Result<(), Error> {
	if left.axis() != right.axis() {
		return Err(Error::Alignment{
			left: left_name,
			right: right_name,
			detail: format!(
				"axes differ: {} x {} days vs {} x {} days",
				left.axis().start(), left.axis().len(),
				right.axis().start(), right.axis().len(),
			),
		})
	}
	for key in left.keys() {
		if !right.contains_key(key) {
			return Err(Error::Alignment{
				left: left_name,
				right: right_name,
				detail: format!("row {:?} is missing from {}", key, right_name),
			})
		}
	}
	if left.num_rows() != right.num_rows() {
		return Err(Error::Alignment{
			left: left_name,
			right: right_name,
			detail: format!("{} rows vs {} rows", left.num_rows(), right.num_rows()),
		})
	}
	Ok(())
}


/// active = confirmed - recovered - deaths, rowwise. The three tables must
/// share the date axis and the geography key set exactly. Negative values can
/// come out of inconsistent upstream reporting and are kept.
pub fn active_table(
		confirmed: &CaseCounters,
		recovered: &CaseCounters,
		deaths: &CaseCounters,
) -> Result<DerivedCounters, Error> {
	check_aligned("confirmed", confirmed, "recovered", recovered)?;
	check_aligned("confirmed", confirmed, "death", deaths)?;
	let mut out = DerivedCounters::new(confirmed.axis());
	for key in confirmed.keys() {
		let c = confirmed.get(key).unwrap();
		let r = recovered.get(key).unwrap();
		let d = deaths.get(key).unwrap();
		let row = out.get_or_create(key.clone());
		for i in 0..row.len() {
			row[i] = c[i] as i64 - r[i] as i64 - d[i] as i64;
		}
	}
	Ok(out)
}


/// Day-over-day new confirmed cases per geography.
pub fn daily_new_table(confirmed: &CaseCounters) -> DerivedCounters {
	let mut out = DerivedCounters::new(confirmed.axis());
	for key in confirmed.keys() {
		let delta = daily_delta(&confirmed.series(key).unwrap());
		out.get_or_create(key.clone()).copy_from_slice(delta.values());
	}
	out
}
