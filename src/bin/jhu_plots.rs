use std::path::{Path, PathBuf};

use structopt::StructOpt;

use covid_trends::{
	align_from_threshold, default_output, load_global_table, magic_open, naive_today,
	render_active, render_compare, render_daily_new, render_first, render_overview,
	sum_by_geography, CaseCounters, CaseKind, DerivedData, Error, Fetcher, GeoSelector,
	RawData, Series,
};


static DEFAULT_COMPARE: [&'static str; 10] = [
	"US",
	"United Kingdom",
	"Singapore",
	"China",
	"Italy",
	"Korea, South",
	"Germany",
	"Iran",
	"Vietnam",
	"Slovakia",
];


#[derive(Debug, StructOpt)]
#[structopt(name = "jhu_plots", about = "Render COVID-19 trend charts from the JHU CSSE tables")]
struct Opt {
	/// Country to chart
	#[structopt(long, default_value = "US")]
	country: String,

	/// Province or state within the country; omit for the whole country
	#[structopt(long)]
	province: Option<String>,

	/// Confirmed count a series must reach to enter the aligned charts
	#[structopt(long, default_value = "100")]
	confirmed_threshold: u64,

	/// Death count a series must reach to enter the death comparison chart
	#[structopt(long, default_value = "25")]
	death_threshold: u64,

	/// Country for the comparison charts; repeat for several
	#[structopt(long = "compare")]
	compare: Vec<String>,

	/// Where to put the death comparison chart
	#[structopt(long, parse(from_os_str))]
	deaths_out: Option<PathBuf>,

	/// Directory with the downloaded table snapshots
	#[structopt(long, default_value = "data", parse(from_os_str))]
	data_dir: PathBuf,

	/// Directory for the rendered charts
	#[structopt(long, default_value = "plots", parse(from_os_str))]
	plots_dir: PathBuf,

	/// Use existing snapshots only, do not download
	#[structopt(long)]
	offline: bool,
}


fn load_table(kind: CaseKind, dir: &Path) -> Result<CaseCounters, Error> {
	let mut path = Fetcher::cached_path(dir, kind);
	if !path.is_file() {
		// offline runs may only have gzipped snapshots lying around
		let mut name = path.into_os_string();
		name.push(".gz");
		path = PathBuf::from(name);
	}
	println!("loading {} table from {} ...", kind, path.display());
	let r = magic_open(&path)?;
	let mut progress = default_output();
	load_global_table(&mut *progress, kind, r)
}

fn load_raw(dir: &Path) -> Result<RawData, Error> {
	Ok(RawData{
		confirmed: load_table(CaseKind::Confirmed, dir)?,
		recovered: load_table(CaseKind::Recovered, dir)?,
		deaths: load_table(CaseKind::Deaths, dir)?,
	})
}


fn chart_overview(path: &Path, title: &str, raw: &RawData, selector: &GeoSelector) -> Result<(), Error> {
	let mut series: Vec<(CaseKind, Series<u64>)> = Vec::new();
	for kind in CaseKind::ALL.iter() {
		series.push((
			*kind,
			sum_by_geography(kind.table_name(), raw.table(*kind), selector)?,
		));
	}
	render_overview(path, title, &series[..])
}

fn chart_active(path: &Path, title: &str, derived: &DerivedData, selector: &GeoSelector) -> Result<(), Error> {
	let series = sum_by_geography("active", &derived.active, selector)?;
	render_active(path, title, &series)
}

fn chart_daily_new(path: &Path, title: &str, derived: &DerivedData, selector: &GeoSelector) -> Result<(), Error> {
	let series = sum_by_geography("daily new", &derived.daily_new, selector)?;
	render_daily_new(path, title, &series)
}

fn chart_first(
		path: &Path,
		title: &str,
		x_desc: &str,
		raw: &RawData,
		selector: &GeoSelector,
		threshold: u64,
) -> Result<(), Error> {
	let series = sum_by_geography("confirmed", &raw.confirmed, selector)?;
	let aligned = align_from_threshold(&series, threshold);
	if aligned.is_none() {
		println!("{}: confirmed count never reached {}, chart stays empty", selector, threshold);
	}
	render_first(path, title, x_desc, aligned.as_ref())
}

fn chart_compare(
		path: &Path,
		title: &str,
		x_desc: &str,
		table_name: &'static str,
		table: &CaseCounters,
		countries: &[String],
		threshold: u64,
) -> Result<(), Error> {
	let mut entries = Vec::new();
	for country in countries {
		let selector = GeoSelector::new(country, None);
		let series = match sum_by_geography(table_name, table, &selector) {
			Ok(s) => s,
			Err(e @ Error::NotFound{..}) => {
				eprintln!("{}", e);
				continue
			},
			Err(e) => return Err(e),
		};
		match align_from_threshold(&series, threshold) {
			Some(a) => entries.push((country.clone(), a)),
			None => println!("{}: {} count never reached {}, leaving it off the chart", country, table_name, threshold),
		}
	}
	render_compare(path, title, x_desc, &entries[..])
}


/// A chart whose geography does not exist only loses that chart; everything
/// else aborts the run.
fn run_chart(path: &Path, result: Result<(), Error>) -> Result<(), Error> {
	match result {
		Ok(()) => {
			println!("wrote {}", path.display());
			Ok(())
		},
		Err(e @ Error::NotFound{..}) => {
			eprintln!("skipping {}: {}", path.display(), e);
			Ok(())
		},
		Err(e) => Err(e),
	}
}


fn main() -> Result<(), Box<dyn std::error::Error>> {
	let opt = Opt::from_args();
	std::fs::create_dir_all(&opt.data_dir)?;
	std::fs::create_dir_all(&opt.plots_dir)?;

	if !opt.offline {
		let fetcher = Fetcher::new();
		let mut progress = default_output();
		for kind in CaseKind::ALL.iter() {
			println!("fetching {} table ...", kind);
			fetcher.download(&mut *progress, *kind, &opt.data_dir)?;
		}
	}

	let raw = load_raw(&opt.data_dir)?;
	println!("computing derived tables ...");
	let derived = DerivedData::compute(&raw)?;

	let selector = GeoSelector::new(&opt.country, opt.province.as_deref());
	let as_of = match raw.confirmed.axis().last() {
		Some(d) => d.format("%Y-%m-%d").to_string(),
		None => "?".to_string(),
	};
	let compare: Vec<String> = if opt.compare.is_empty() {
		DEFAULT_COMPARE.iter().map(|s| s.to_string()).collect()
	} else {
		opt.compare.clone()
	};

	println!("rendering charts ...");
	{
		let path = opt.plots_dir.join("case_by_country.png");
		let title = format!("COVID-19 cases in {} (as of {})", selector, as_of);
		run_chart(&path, chart_overview(&path, &title, &raw, &selector))?;
	}
	{
		let path = opt.plots_dir.join("active_case_by_country.png");
		let title = format!("Active COVID-19 cases in {} (as of {})", selector, as_of);
		run_chart(&path, chart_active(&path, &title, &derived, &selector))?;
	}
	{
		let path = opt.plots_dir.join("daily_case_by_country.png");
		let title = format!("Daily new COVID-19 cases in {} (as of {})", selector, as_of);
		run_chart(&path, chart_daily_new(&path, &title, &derived, &selector))?;
	}
	{
		let path = opt.plots_dir.join("case_first_confirmed.png");
		let title = format!("COVID-19 cases in {} (as of {})", selector, as_of);
		let x_desc = format!("Days since {}th confirmed case", opt.confirmed_threshold);
		run_chart(&path, chart_first(&path, &title, &x_desc, &raw, &selector, opt.confirmed_threshold))?;
	}
	let today = naive_today().format("%Y-%m-%d").to_string();
	{
		let path = opt.plots_dir.join("compare_first_confirmed.png");
		let title = format!("As of {}", today);
		let x_desc = format!("Days since {}th confirmed case", opt.confirmed_threshold);
		run_chart(&path, chart_compare(
			&path, &title, &x_desc,
			"confirmed", &raw.confirmed,
			&compare[..], opt.confirmed_threshold,
		))?;
	}
	{
		let path = match &opt.deaths_out {
			Some(p) => p.clone(),
			None => opt.plots_dir.join("compare_first_death.png"),
		};
		let title = format!("As of {}", today);
		let x_desc = format!("Days since {}th death case", opt.death_threshold);
		run_chart(&path, chart_compare(
			&path, &title, &x_desc,
			"death", &raw.deaths,
			&compare[..], opt.death_threshold,
		))?;
	}

	Ok(())
}
