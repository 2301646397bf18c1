use std::fmt;
use std::io;

use chrono::NaiveDate;

use csv::StringRecord;

use enum_map::Enum;

use log::warn;

use serde::Deserialize;

use smartstring::alias::{String as SmartString};

use crate::error::Error;
use crate::geo::{maybe_coordinate, maybe_name, Coordinate, GeographyKey};
use crate::progress::{CountMeter, ProgressSink};
use crate::timeseries::{DateAxis, TimeSeries};


/// Raw per-geography cumulative counts, straight from one upstream table.
pub type CaseCounters = TimeSeries<GeographyKey, u64>;
/// Computed tables (active, daily new); signed, because reporting noise is.
pub type DerivedCounters = TimeSeries<GeographyKey, i64>;


/// Upstream format of the date column headers.
const DATE_HEADER_FORMAT: &'static str = "%m/%d/%y";

/// Identifying columns, after lower-casing the header row. Lower-casing
/// covers both header spellings the upstream repository has published.
static IDENT_COLUMNS: [&'static str; 4] = ["province/state", "country/region", "lat", "long"];


/// The fetched case categories. Active and daily-new counts are derived
/// from these, never fetched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Enum)]
pub enum CaseKind {
	Confirmed,
	Recovered,
	Deaths,
}

impl CaseKind {
	pub const ALL: [CaseKind; 3] = [CaseKind::Confirmed, CaseKind::Recovered, CaseKind::Deaths];

	pub fn url(&self) -> &'static str {
		match self {
			Self::Confirmed => "https://raw.githubusercontent.com/CSSEGISandData/COVID-19/master/csse_covid_19_data/csse_covid_19_time_series/time_series_covid19_confirmed_global.csv",
			Self::Recovered => "https://raw.githubusercontent.com/CSSEGISandData/COVID-19/master/csse_covid_19_data/csse_covid_19_time_series/time_series_covid19_recovered_global.csv",
			Self::Deaths => "https://raw.githubusercontent.com/CSSEGISandData/COVID-19/master/csse_covid_19_data/csse_covid_19_time_series/time_series_covid19_deaths_global.csv",
		}
	}

	pub fn file_name(&self) -> &'static str {
		match self {
			Self::Confirmed => "confirmed.csv",
			Self::Recovered => "recovered.csv",
			Self::Deaths => "deaths.csv",
		}
	}

	pub fn table_name(&self) -> &'static str {
		match self {
			Self::Confirmed => "confirmed",
			Self::Recovered => "recovered",
			Self::Deaths => "death",
		}
	}

	/// Capitalized form for chart legends.
	pub fn label(&self) -> &'static str {
		match self {
			Self::Confirmed => "Confirmed",
			Self::Recovered => "Recovered",
			Self::Deaths => "Death",
		}
	}
}

impl fmt::Display for CaseKind {
	fn fmt<'f>(&self, f: &'f mut fmt::Formatter) -> fmt::Result {
		f.write_str(self.table_name())
	}
}


#[derive(Debug, Clone, Deserialize)]
struct GeoColumns {
	#[serde(rename = "province/state", deserialize_with = "maybe_name")]
	sub_region: Option<SmartString>,
	#[serde(rename = "country/region")]
	country: SmartString,
	#[serde(rename = "lat", deserialize_with = "maybe_coordinate")]
	lat: Option<Coordinate>,
	#[serde(rename = "long", deserialize_with = "maybe_coordinate")]
	long: Option<Coordinate>,
}

impl From<GeoColumns> for GeographyKey {
	fn from(other: GeoColumns) -> Self {
		Self{
			country: other.country,
			sub_region: other.sub_region,
			lat: other.lat,
			long: other.long,
		}
	}
}


/// Names which columns identify the geography and which ones form the date
/// axis, instead of assuming fixed positions.
#[derive(Debug)]
pub struct TableSchema {
	headers: StringRecord,
	date_cols: Vec<usize>,
	axis: DateAxis,
}

impl TableSchema {
	pub fn from_headers(table: &'static str, raw: &StringRecord) -> Result<Self, Error> {
		let headers: StringRecord = raw.iter().map(|h| h.trim().to_lowercase()).collect();
		for required in IDENT_COLUMNS.iter() {
			if !headers.iter().any(|h| h == *required) {
				return Err(Error::Schema{
					table,
					detail: format!("missing identifying column {:?}", required),
				})
			}
		}

		let mut date_cols = Vec::new();
		let mut dates: Vec<NaiveDate> = Vec::new();
		for (i, h) in headers.iter().enumerate() {
			if IDENT_COLUMNS.iter().any(|c| *c == h) {
				continue
			}
			let date = NaiveDate::parse_from_str(h, DATE_HEADER_FORMAT).map_err(|e| Error::Parse{
				table,
				column: h.into(),
				detail: format!("not a {} date header: {}", DATE_HEADER_FORMAT, e),
			})?;
			date_cols.push(i);
			dates.push(date);
		}
		if dates.is_empty() {
			return Err(Error::Schema{table, detail: "no date columns".into()})
		}
		for w in dates.windows(2) {
			if w[1] != w[0] + chrono::Duration::days(1) {
				return Err(Error::Schema{
					table,
					detail: format!("date axis not contiguous between {} and {}", w[0], w[1]),
				})
			}
		}

		Ok(Self{
			headers,
			date_cols,
			axis: DateAxis::new(dates[0], dates.len()),
		})
	}

	pub fn axis(&self) -> DateAxis {
		self.axis
	}

	pub fn headers(&self) -> &StringRecord {
		&self.headers
	}

	fn column_name(&self, i: usize) -> &str {
		self.headers.get(i).unwrap_or("?")
	}
}


fn parse_count(table: &'static str, column: &str, key: &GeographyKey, cell: &str) -> Result<u64, Error> {
	cell.trim().parse::<u64>().map_err(|e| Error::Parse{
		table,
		column: column.into(),
		detail: format!("bad count {:?} in row {}: {}", cell, key, e),
	})
}


/// Reads one upstream wide-format table into per-geography counters. The
/// header row defines the schema; every row after it must fill the whole
/// date axis with numeric cells.
pub fn load_global_table<R: io::Read, S: ProgressSink + ?Sized>(
		progress: &mut S,
		kind: CaseKind,
		r: R,
) -> Result<CaseCounters, Error> {
	let table = kind.table_name();
	let mut rdr = csv::Reader::from_reader(r);
	let schema = {
		let raw = rdr.headers().map_err(|e| Error::Csv{table, source: e})?;
		TableSchema::from_headers(table, raw)?
	};
	if schema.axis().start() != crate::global_start_date() {
		warn!(
			"{}: date axis starts at {} instead of the usual epoch {}",
			table, schema.axis().start(), crate::global_start_date(),
		);
	}

	let mut out = CaseCounters::new(schema.axis());
	let mut pm = CountMeter::new(progress, 64);
	let mut n = 0;
	let mut values = Vec::with_capacity(schema.axis().len());
	for (i, row) in rdr.records().enumerate() {
		let record = row.map_err(|e| Error::Csv{table, source: e})?;
		let geo: GeoColumns = record.deserialize(Some(schema.headers())).map_err(|e| Error::Parse{
			table,
			column: "identifying columns".into(),
			detail: e.to_string(),
		})?;
		let key: GeographyKey = geo.into();

		values.clear();
		for col in schema.date_cols.iter() {
			let cell = record.get(*col).unwrap_or("");
			values.push(parse_count(table, schema.column_name(*col), &key, cell)?);
		}
		if out.contains_key(&key) {
			// not seen upstream; last row wins
			warn!("{}: duplicate geography row {}", table, key);
		}
		out.get_or_create(key).copy_from_slice(&values[..]);
		pm.step(i + 1);
		n = i + 1;
	}
	pm.finish(n);
	Ok(out)
}


#[cfg(test)]
mod tests {
	use super::*;
	use crate::progress::NullSink;

	static SAMPLE: &'static str = "\
Province/State,Country/Region,Lat,Long,1/22/20,1/23/20,1/24/20
,Afghanistan,33.0,65.0,0,0,1
Hubei,China,30.9756,112.2707,444,444,549
Beijing,China,40.1824,116.4142,14,22,36
";

	fn date(y: i32, m: u32, d: u32) -> NaiveDate {
		NaiveDate::from_ymd_opt(y, m, d).unwrap()
	}

	fn headers(fields: &[&str]) -> StringRecord {
		fields.iter().collect()
	}

	fn key(country: &str, sub_region: Option<&str>, lat: f64, long: f64) -> GeographyKey {
		GeographyKey{
			country: country.into(),
			sub_region: sub_region.map(|s| s.into()),
			lat: Some(Coordinate::from_degrees(lat)),
			long: Some(Coordinate::from_degrees(long)),
		}
	}

	#[test]
	fn schema_parses_date_axis_from_headers() {
		let schema = TableSchema::from_headers(
			"confirmed",
			&headers(&["Province/State", "Country/Region", "Lat", "Long", "1/22/20", "1/23/20"]),
		).unwrap();
		assert_eq!(schema.axis(), DateAxis::new(date(2020, 1, 22), 2));
	}

	#[test]
	fn schema_rejects_missing_identifying_column() {
		let err = TableSchema::from_headers(
			"confirmed",
			&headers(&["Province/State", "Country/Region", "Lat", "1/22/20"]),
		).unwrap_err();
		match err {
			Error::Schema{table: "confirmed", ..} => (),
			other => panic!("expected schema error, got {:?}", other),
		}
	}

	#[test]
	fn schema_rejects_malformed_date_header() {
		let err = TableSchema::from_headers(
			"confirmed",
			&headers(&["Province/State", "Country/Region", "Lat", "Long", "января/22/20"]),
		).unwrap_err();
		match err {
			Error::Parse{table: "confirmed", column, ..} => assert_eq!(column, "января/22/20"),
			other => panic!("expected parse error, got {:?}", other),
		}
	}

	#[test]
	fn schema_rejects_date_axis_with_gaps() {
		let err = TableSchema::from_headers(
			"confirmed",
			&headers(&["Province/State", "Country/Region", "Lat", "Long", "1/22/20", "1/24/20"]),
		).unwrap_err();
		match err {
			Error::Schema{table: "confirmed", detail} => assert!(detail.contains("not contiguous")),
			other => panic!("expected schema error, got {:?}", other),
		}
	}

	#[test]
	fn loads_rows_keyed_by_geography() {
		let t = load_global_table(&mut NullSink, CaseKind::Confirmed, SAMPLE.as_bytes()).unwrap();
		assert_eq!(t.axis(), DateAxis::new(date(2020, 1, 22), 3));
		assert_eq!(t.num_rows(), 3);
		assert_eq!(
			t.get(&key("Afghanistan", None, 33.0, 65.0)),
			Some(&[0, 0, 1][..])
		);
		assert_eq!(
			t.get(&key("China", Some("Hubei"), 30.9756, 112.2707)),
			Some(&[444, 444, 549][..])
		);
	}

	#[test]
	fn header_matching_is_case_insensitive() {
		let lower = SAMPLE.to_lowercase();
		let t = load_global_table(&mut NullSink, CaseKind::Confirmed, lower.as_bytes()).unwrap();
		// country cells are lower-cased too by the blanket to_lowercase above
		assert_eq!(t.num_rows(), 3);
		assert!(t.contains_key(&key("china", Some("hubei"), 30.9756, 112.2707)));
	}

	#[test]
	fn non_numeric_count_cell_is_fatal() {
		let broken = "\
Province/State,Country/Region,Lat,Long,1/22/20
,Afghanistan,33.0,65.0,n/a
";
		let err = load_global_table(&mut NullSink, CaseKind::Confirmed, broken.as_bytes()).unwrap_err();
		match err {
			Error::Parse{table: "confirmed", column, detail} => {
				assert_eq!(column, "1/22/20");
				assert!(detail.contains("Afghanistan"));
			},
			other => panic!("expected parse error, got {:?}", other),
		}
	}

	#[test]
	fn blank_coordinates_become_none() {
		let sample = "\
Province/State,Country/Region,Lat,Long,1/22/20
,Somewhere,,,5
";
		let t = load_global_table(&mut NullSink, CaseKind::Confirmed, sample.as_bytes()).unwrap();
		let k = GeographyKey{
			country: "Somewhere".into(),
			sub_region: None,
			lat: None,
			long: None,
		};
		assert_eq!(t.get(&k), Some(&[5][..]));
	}
}
