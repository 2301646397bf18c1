use std::path::PathBuf;

use structopt::StructOpt;

use covid_trends::{default_output, CaseKind, Fetcher};


#[derive(Debug, StructOpt)]
#[structopt(name = "jhu_fetch", about = "Download the JHU CSSE global time series tables")]
struct Opt {
	/// Directory for the downloaded table snapshots
	#[structopt(long, default_value = "data", parse(from_os_str))]
	data_dir: PathBuf,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
	let opt = Opt::from_args();
	std::fs::create_dir_all(&opt.data_dir)?;

	let fetcher = Fetcher::new();
	let mut progress = default_output();
	for kind in CaseKind::ALL.iter() {
		println!("fetching {} table ...", kind);
		let path = fetcher.download(&mut *progress, *kind, &opt.data_dir)?;
		println!("  -> {}", path.display());
	}
	Ok(())
}
