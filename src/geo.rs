use std::fmt;
use std::num::ParseFloatError;
use std::str::FromStr;

use serde::{de, Deserialize, Deserializer};

use smartstring::alias::{String as SmartString};


/// Geographic degree value in fixed-point (1e-4 degree resolution), so that
/// geography keys stay hashable.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Coordinate(i32);

impl Coordinate {
	pub fn from_degrees(deg: f64) -> Self {
		Self((deg * 10_000.0).round() as i32)
	}

	pub fn degrees(&self) -> f64 {
		self.0 as f64 / 10_000.0
	}
}

impl FromStr for Coordinate {
	type Err = ParseFloatError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Ok(Self::from_degrees(s.parse::<f64>()?))
	}
}

impl fmt::Display for Coordinate {
	fn fmt<'f>(&self, f: &'f mut fmt::Formatter) -> fmt::Result {
		write!(f, "{}", self.degrees())
	}
}

/// Blank cells mean "no coordinate on this row" in the upstream data.
pub fn maybe_coordinate<'de, D>(deserializer: D) -> Result<Option<Coordinate>, D::Error>
	where D: Deserializer<'de>
{
	let s = String::deserialize(deserializer)?;
	let s = s.trim();
	if s.is_empty() {
		return Ok(None)
	}
	Ok(Some(FromStr::from_str(s).map_err(de::Error::custom)?))
}

/// Blank cells mean "row covers the whole country".
pub fn maybe_name<'de, D>(deserializer: D) -> Result<Option<SmartString>, D::Error>
	where D: Deserializer<'de>
{
	let s = String::deserialize(deserializer)?;
	let s = s.trim();
	if s.is_empty() {
		return Ok(None)
	}
	Ok(Some(s.into()))
}


/// Identifies one row of an upstream table. Rows without a sub-region
/// represent a whole-country aggregate.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GeographyKey {
	pub country: SmartString,
	pub sub_region: Option<SmartString>,
	pub lat: Option<Coordinate>,
	pub long: Option<Coordinate>,
}

impl fmt::Display for GeographyKey {
	fn fmt<'f>(&self, f: &'f mut fmt::Formatter) -> fmt::Result {
		match &self.sub_region {
			Some(sub) => write!(f, "{}/{}", self.country, sub),
			None => f.write_str(&self.country),
		}
	}
}


/// Which rows of a table an aggregation covers. Making the two paths an
/// explicit variant keeps the dispatch exhaustive instead of hanging it off
/// an optional parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeoSelector {
	WholeCountry(SmartString),
	SubRegion{country: SmartString, sub_region: SmartString},
}

impl GeoSelector {
	pub fn new(country: &str, sub_region: Option<&str>) -> Self {
		match sub_region {
			Some(sub) => Self::SubRegion{country: country.into(), sub_region: sub.into()},
			None => Self::WholeCountry(country.into()),
		}
	}

	pub fn country(&self) -> &str {
		match self {
			Self::WholeCountry(country) => country,
			Self::SubRegion{country, ..} => country,
		}
	}

	pub fn matches(&self, key: &GeographyKey) -> bool {
		match self {
			Self::WholeCountry(country) => key.country == *country,
			Self::SubRegion{country, sub_region} => {
				key.country == *country && key.sub_region.as_ref() == Some(sub_region)
			},
		}
	}
}

impl fmt::Display for GeoSelector {
	fn fmt<'f>(&self, f: &'f mut fmt::Formatter) -> fmt::Result {
		match self {
			Self::WholeCountry(country) => f.write_str(country),
			Self::SubRegion{country, sub_region} => write!(f, "{} ({})", sub_region, country),
		}
	}
}


#[cfg(test)]
mod tests {
	use super::*;

	fn key(country: &str, sub_region: Option<&str>) -> GeographyKey {
		GeographyKey{
			country: country.into(),
			sub_region: sub_region.map(|s| s.into()),
			lat: Some(Coordinate::from_degrees(1.5)),
			long: Some(Coordinate::from_degrees(-2.25)),
		}
	}

	#[test]
	fn coordinate_roundtrip() {
		let c: Coordinate = "30.9756".parse().unwrap();
		assert_eq!(c.degrees(), 30.9756);
		assert_eq!(c.to_string(), "30.9756");
	}

	#[test]
	fn coordinate_is_comparable_after_parsing() {
		let a: Coordinate = "65.0".parse().unwrap();
		let b: Coordinate = "65".parse().unwrap();
		assert_eq!(a, b);
	}

	#[test]
	fn whole_country_matches_all_rows_of_the_country() {
		let sel = GeoSelector::new("China", None);
		assert!(sel.matches(&key("China", Some("Hubei"))));
		assert!(sel.matches(&key("China", None)));
		assert!(!sel.matches(&key("US", None)));
	}

	#[test]
	fn sub_region_requires_exact_match() {
		let sel = GeoSelector::new("China", Some("Hubei"));
		assert!(sel.matches(&key("China", Some("Hubei"))));
		assert!(!sel.matches(&key("China", Some("Beijing"))));
		assert!(!sel.matches(&key("China", None)));
	}

	#[test]
	fn selector_display_matches_chart_titles() {
		assert_eq!(GeoSelector::new("US", None).to_string(), "US");
		assert_eq!(GeoSelector::new("China", Some("Hubei")).to_string(), "Hubei (China)");
	}
}
