use std::io;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use log::info;

use crate::error::Error;
use crate::ioutil::replace_file;
use crate::jhu::CaseKind;
use crate::progress::{CountMeter, ProgressSink};


const CHUNK_SIZE: usize = 65536;
const METER_INTERVAL: usize = 1 << 20;


/// Downloads the upstream tables into a local snapshot directory. All reads
/// go through the snapshots, never straight off the network.
pub struct Fetcher {
	client: reqwest::blocking::Client,
}

impl Fetcher {
	pub fn new() -> Self {
		Self{
			client: reqwest::blocking::Client::new(),
		}
	}

	pub fn cached_path(dir: &Path, kind: CaseKind) -> PathBuf {
		dir.join(kind.file_name())
	}

	/// Fetches one table, writing through a temporary file so an interrupted
	/// transfer keeps the previous snapshot usable.
	pub fn download<S: ProgressSink + ?Sized>(
			&self,
			progress: &mut S,
			kind: CaseKind,
			dir: &Path,
	) -> Result<PathBuf, Error> {
		let url = kind.url();
		info!("downloading {} table from {}", kind, url);
		let mut resp = self.client.get(url).send().map_err(|e| Error::fetch(url, e))?;
		let status = resp.status();
		if !status.is_success() {
			return Err(Error::fetch(url, format!("unexpected status {}", status)))
		}

		let path = Self::cached_path(dir, kind);
		let mut pm = CountMeter::new(progress, METER_INTERVAL);
		let nbytes = replace_file(&path, |w| {
			let mut buf = [0u8; CHUNK_SIZE];
			let mut total = 0;
			loop {
				let n = resp.read(&mut buf).map_err(|e| {
					io::Error::new(io::ErrorKind::Other, e.to_string())
				})?;
				if n == 0 {
					break
				}
				w.write_all(&buf[..n])?;
				total += n;
				pm.step(total);
			}
			Ok(total)
		}).map_err(|e| Error::fetch(url, e))?;
		pm.finish(nbytes);
		info!("wrote {} bytes to {}", nbytes, path.display());
		Ok(path)
	}
}
