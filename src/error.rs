use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use crate::geo::GeoSelector;


/// Everything that can go wrong between a snapshot URL and a rendered chart.
///
/// All variants abort the run, except that a `NotFound` raised while
/// preparing one chart only kills that chart. "Series never reached the
/// threshold" is not an error at all, see `align_from_threshold`.
#[derive(Debug)]
pub enum Error {
	Fetch{url: String, detail: String},
	Io(io::Error),
	Csv{table: &'static str, source: csv::Error},
	Parse{table: &'static str, column: String, detail: String},
	Schema{table: &'static str, detail: String},
	NotFound{table: &'static str, selector: GeoSelector, matches: usize},
	Alignment{left: &'static str, right: &'static str, detail: String},
	Render{path: PathBuf, detail: String},
}

impl Error {
	pub fn fetch<D: fmt::Display>(url: &str, detail: D) -> Self {
		Self::Fetch{url: url.into(), detail: detail.to_string()}
	}

	pub fn render<D: fmt::Display>(path: &Path, detail: D) -> Self {
		Self::Render{path: path.to_path_buf(), detail: detail.to_string()}
	}
}

impl fmt::Display for Error {
	fn fmt<'f>(&self, f: &'f mut fmt::Formatter) -> fmt::Result {
		match self {
			Self::Fetch{url, detail} => write!(f, "failed to fetch {}: {}", url, detail),
			Self::Io(e) => fmt::Display::fmt(e, f),
			Self::Csv{table, source} => write!(f, "{} table: {}", table, source),
			Self::Parse{table, column, detail} => write!(f, "{} table: cannot parse column {:?}: {}", table, column, detail),
			Self::Schema{table, detail} => write!(f, "{} table: invalid schema: {}", table, detail),
			Self::NotFound{table, selector, matches} => match matches {
				0 => write!(f, "no rows for {} in {} table", selector, table),
				n => write!(f, "ambiguous match ({} rows) for {} in {} table", n, selector, table),
			},
			Self::Alignment{left, right, detail} => write!(f, "{} and {} tables are not aligned: {}", left, right, detail),
			Self::Render{path, detail} => write!(f, "failed to render {}: {}", path.display(), detail),
		}
	}
}

impl From<io::Error> for Error {
	fn from(err: io::Error) -> Self {
		Self::Io(err)
	}
}

impl std::error::Error for Error {}
