use std::collections::HashMap;
use std::hash::Hash;

use num_traits::Zero;

use chrono::NaiveDate;


pub trait TimeSeriesKey: Hash + Eq + Clone + std::fmt::Debug {}
impl<T: Hash + Eq + Clone + std::fmt::Debug> TimeSeriesKey for T {}


/// Contiguous daily date axis shared by every row of a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateAxis {
	start: NaiveDate,
	len: usize,
}

impl DateAxis {
	pub fn new(start: NaiveDate, len: usize) -> Self {
		Self{start, len}
	}

	#[inline(always)]
	pub fn start(&self) -> NaiveDate {
		self.start
	}

	#[inline(always)]
	pub fn len(&self) -> usize {
		self.len
	}

	pub fn is_empty(&self) -> bool {
		self.len == 0
	}

	pub fn last(&self) -> Option<NaiveDate> {
		if self.len == 0 {
			return None
		}
		Some(self.start + chrono::Duration::days((self.len - 1) as i64))
	}

	#[inline(always)]
	pub fn date_index(&self, date: NaiveDate) -> Option<usize> {
		let days = (date - self.start).num_days();
		if days < 0 || days as usize >= self.len {
			return None
		}
		Some(days as usize)
	}

	#[inline(always)]
	pub fn index_date(&self, i: usize) -> Option<NaiveDate> {
		if i >= self.len {
			return None
		}
		Some(self.start + chrono::Duration::days(i as i64))
	}

	pub fn dates(&self) -> impl Iterator<Item = NaiveDate> {
		let start = self.start;
		(0..self.len).map(move |i| start + chrono::Duration::days(i as i64))
	}
}


/// A case-type's counts: one row of values per geography key, all rows
/// sharing one date axis. Rows are created zero-filled on first access and
/// the table never changes shape afterwards.
#[derive(Debug, Clone)]
pub struct TimeSeries<K: Hash + Eq, V: Copy> {
	axis: DateAxis,
	keys: HashMap<K, usize>,
	rows: Vec<Vec<V>>,
}

impl<K: TimeSeriesKey, V: Copy + Zero> TimeSeries<K, V> {
	pub fn new(axis: DateAxis) -> Self {
		Self{
			axis,
			keys: HashMap::new(),
			rows: Vec::new(),
		}
	}

	#[inline(always)]
	pub fn axis(&self) -> DateAxis {
		self.axis
	}

	pub fn num_rows(&self) -> usize {
		self.rows.len()
	}

	pub fn get_or_create(&mut self, k: K) -> &mut [V] {
		let index = match self.keys.get(&k) {
			Some(v) => *v,
			None => {
				let v = self.rows.len();
				let mut vec = Vec::with_capacity(self.axis.len());
				vec.resize(self.axis.len(), V::zero());
				self.rows.push(vec);
				self.keys.insert(k, v);
				v
			},
		};
		&mut self.rows[index][..]
	}

	pub fn get(&self, k: &K) -> Option<&[V]> {
		let index = *self.keys.get(k)?;
		Some(&self.rows[index][..])
	}

	pub fn contains_key(&self, k: &K) -> bool {
		self.keys.contains_key(k)
	}

	pub fn keys(&self) -> std::collections::hash_map::Keys<'_, K, usize> {
		self.keys.keys()
	}

	/// Copies one row out as a standalone series over the full axis.
	pub fn series(&self, k: &K) -> Option<Series<V>> {
		Some(Series::new(self.axis.start(), self.get(k)?.to_vec()))
	}
}


/// One geography's counts over the full parent date axis, gap-free.
#[derive(Debug, Clone, PartialEq)]
pub struct Series<V: Copy> {
	start: NaiveDate,
	values: Vec<V>,
}

impl<V: Copy> Series<V> {
	pub fn new(start: NaiveDate, values: Vec<V>) -> Self {
		Self{start, values}
	}

	#[inline(always)]
	pub fn start(&self) -> NaiveDate {
		self.start
	}

	pub fn len(&self) -> usize {
		self.values.len()
	}

	pub fn is_empty(&self) -> bool {
		self.values.is_empty()
	}

	pub fn values(&self) -> &[V] {
		&self.values[..]
	}

	pub fn last_value(&self) -> Option<V> {
		self.values.last().copied()
	}

	pub fn dates(&self) -> impl Iterator<Item = NaiveDate> {
		let start = self.start;
		(0..self.values.len()).map(move |i| start + chrono::Duration::days(i as i64))
	}

	pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, V)> + '_ {
		let start = self.start;
		self.values.iter().enumerate().map(move |(i, v)| {
			(start + chrono::Duration::days(i as i64), *v)
		})
	}
}


/// Day-over-day differences of a cumulative series. The first cumulative
/// value doubles as the first day's new count, and negative differences are
/// kept as-is: upstream corrections are data, not errors.
pub fn daily_delta(series: &Series<u64>) -> Series<i64> {
	let mut out = Vec::with_capacity(series.len());
	let mut prev: Option<u64> = None;
	for v in series.values() {
		out.push(match prev {
			Some(p) => *v as i64 - p as i64,
			None => *v as i64,
		});
		prev = Some(*v);
	}
	Series::new(series.start(), out)
}


/// A series re-indexed to "days since the count first reached a threshold":
/// day index 0 is the crossing date, counts are carried unmodified.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignedSeries<V: Copy> {
	crossed: NaiveDate,
	values: Vec<V>,
}

impl<V: Copy> AlignedSeries<V> {
	/// The calendar date behind day index 0.
	pub fn crossed(&self) -> NaiveDate {
		self.crossed
	}

	pub fn len(&self) -> usize {
		self.values.len()
	}

	pub fn is_empty(&self) -> bool {
		self.values.is_empty()
	}

	pub fn values(&self) -> &[V] {
		&self.values[..]
	}

	pub fn last_value(&self) -> Option<V> {
		self.values.last().copied()
	}

	pub fn iter(&self) -> impl Iterator<Item = (usize, V)> + '_ {
		self.values.iter().enumerate().map(|(i, v)| (i, *v))
	}
}

/// Finds the first index, scanning from the left, whose value is >= n, drops
/// everything before it and re-indexes the rest as day 0, 1, 2, ...
///
/// Returns None when the series never reaches the threshold; that is an
/// expected outcome for small countries, not an error.
pub fn align_from_threshold<V: Copy + PartialOrd>(series: &Series<V>, n: V) -> Option<AlignedSeries<V>> {
	let k = series.values().iter().position(|v| *v >= n)?;
	Some(AlignedSeries{
		crossed: series.start() + chrono::Duration::days(k as i64),
		values: series.values()[k..].to_vec(),
	})
}


#[cfg(test)]
mod tests {
	use super::*;

	fn date(y: i32, m: u32, d: u32) -> NaiveDate {
		NaiveDate::from_ymd_opt(y, m, d).unwrap()
	}

	fn series(values: &[u64]) -> Series<u64> {
		Series::new(date(2020, 1, 22), values.to_vec())
	}

	#[test]
	fn axis_maps_dates_to_indexes_and_back() {
		let axis = DateAxis::new(date(2020, 1, 22), 5);
		assert_eq!(axis.date_index(date(2020, 1, 22)), Some(0));
		assert_eq!(axis.date_index(date(2020, 1, 26)), Some(4));
		assert_eq!(axis.date_index(date(2020, 1, 27)), None);
		assert_eq!(axis.date_index(date(2020, 1, 21)), None);
		assert_eq!(axis.index_date(4), Some(date(2020, 1, 26)));
		assert_eq!(axis.index_date(5), None);
		assert_eq!(axis.last(), Some(date(2020, 1, 26)));
	}

	#[test]
	fn rows_are_created_zero_filled() {
		let mut t = TimeSeries::<&str, u64>::new(DateAxis::new(date(2020, 1, 22), 3));
		assert_eq!(t.get(&"x"), None);
		t.get_or_create("x")[1] = 7;
		assert_eq!(t.get(&"x"), Some(&[0, 7, 0][..]));
		assert_eq!(t.num_rows(), 1);
		assert_eq!(
			t.series(&"x"),
			Some(Series::new(date(2020, 1, 22), vec![0, 7, 0]))
		);
	}

	#[test]
	fn daily_delta_takes_first_value_as_first_days_count() {
		let d = daily_delta(&series(&[10, 20, 45]));
		assert_eq!(d.values(), &[10, 10, 25]);
		assert_eq!(d.start(), date(2020, 1, 22));
	}

	#[test]
	fn daily_delta_keeps_negative_corrections() {
		let d = daily_delta(&series(&[10, 8, 12]));
		assert_eq!(d.values(), &[10, -2, 4]);
	}

	#[test]
	fn daily_delta_inverts_cumulative_summation() {
		let new_counts: Vec<i64> = vec![3, 0, 5, 2, 0, 7];
		let mut accum = 0u64;
		let cumulative: Vec<u64> = new_counts.iter().map(|v| {
			accum += *v as u64;
			accum
		}).collect();
		let d = daily_delta(&Series::new(date(2020, 1, 22), cumulative));
		assert_eq!(d.values(), &new_counts[..]);
	}

	#[test]
	fn alignment_starts_at_first_crossing() {
		let a = align_from_threshold(&series(&[5, 40, 150, 300]), 100).unwrap();
		assert_eq!(a.crossed(), date(2020, 1, 24));
		assert_eq!(a.values(), &[150, 300]);
		let indexed: Vec<(usize, u64)> = a.iter().collect();
		assert_eq!(indexed, vec![(0, 150), (1, 300)]);
	}

	#[test]
	fn alignment_treats_exact_threshold_as_crossing() {
		let a = align_from_threshold(&series(&[99, 100, 101]), 100).unwrap();
		assert_eq!(a.values(), &[100, 101]);
	}

	#[test]
	fn alignment_is_none_below_threshold() {
		assert_eq!(align_from_threshold(&series(&[1, 2, 3]), 100), None);
	}

	#[test]
	fn alignment_scans_left_to_right_on_noisy_input() {
		// not the global maximum crossing: the first index from the left wins
		let a = align_from_threshold(&series(&[0, 120, 50, 200]), 100).unwrap();
		assert_eq!(a.crossed(), date(2020, 1, 23));
		assert_eq!(a.values(), &[120, 50, 200]);
	}
}
