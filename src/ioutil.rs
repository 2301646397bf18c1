use std::ffi::OsString;
use std::fs;
use std::io;
use std::io::Read;
use std::path::Path;

use flate2;


/// Opens a local snapshot, decompressing transparently if the file name
/// says so. Lets cached downloads be gzipped without anyone caring.
pub fn magic_open<P: AsRef<Path>>(path: P) -> io::Result<Box<dyn Read>> {
	let path = path.as_ref();
	let f = fs::File::open(path)?;
	match path.extension() {
		Some(ext) if ext == "gz" => Ok(Box::new(flate2::read::GzDecoder::new(f))),
		_ => Ok(Box::new(f)),
	}
}


/// Writes through a temporary file and renames over the target, so a failed
/// download never clobbers the previous snapshot.
pub fn replace_file<P, T, F>(path: P, f: F) -> io::Result<T>
	where P: AsRef<Path>, F: FnOnce(&mut fs::File) -> io::Result<T>
{
	let path = path.as_ref();
	let mut tmp_name: OsString = match path.file_name() {
		Some(name) => name.to_os_string(),
		None => return Err(io::Error::new(io::ErrorKind::InvalidInput, "path has no file name")),
	};
	tmp_name.push(".tmp");
	let tmp = path.with_file_name(tmp_name);
	let mut w = fs::File::create(&tmp)?;
	let result = match f(&mut w) {
		Ok(v) => v,
		Err(e) => {
			drop(w);
			let _ = fs::remove_file(&tmp);
			return Err(e)
		},
	};
	w.sync_all()?;
	drop(w);
	fs::rename(&tmp, path)?;
	Ok(result)
}


#[cfg(test)]
mod tests {
	use super::*;
	use std::io::Write;

	#[test]
	fn replace_file_leaves_target_untouched_on_failure() {
		let dir = std::env::temp_dir().join("covid-trends-ioutil-test");
		fs::create_dir_all(&dir).unwrap();
		let target = dir.join("snapshot.csv");
		fs::write(&target, b"old").unwrap();

		let err = replace_file(&target, |w| -> io::Result<()> {
			w.write_all(b"partial")?;
			Err(io::Error::new(io::ErrorKind::Other, "connection lost"))
		});
		assert!(err.is_err());
		assert_eq!(fs::read(&target).unwrap(), b"old");

		replace_file(&target, |w| w.write_all(b"new")).unwrap();
		assert_eq!(fs::read(&target).unwrap(), b"new");
		fs::remove_dir_all(&dir).unwrap();
	}
}
