use std::io;
use std::io::Write;
use std::time;


/// Receives progress updates from long-running load/download loops.
pub trait ProgressSink {
	fn update(&mut self, inow: usize);
	fn finish(&mut self, inow: usize);
}


/// Carriage-return meter for interactive terminals.
pub struct TermMeter {
	t0: time::Instant,
	tprev: time::Instant,
	iprev: usize,
}

impl TermMeter {
	pub fn new() -> Self {
		let now = time::Instant::now();
		Self{
			t0: now,
			tprev: now,
			iprev: 0,
		}
	}
}

impl ProgressSink for TermMeter {
	fn update(&mut self, inow: usize) {
		let now = time::Instant::now();
		let dt = (now - self.tprev).as_secs_f64();
		if dt <= 0.0 {
			return
		}
		let rate = (inow - self.iprev) as f64 / dt;
		print!("{:12} [{:9.1}/s]\r", inow, rate);
		io::stdout().flush().ok();
		self.iprev = inow;
		self.tprev = now;
	}

	fn finish(&mut self, inow: usize) {
		let dt = (time::Instant::now() - self.t0).as_secs_f64();
		let rate = if dt > 0.0 {
			inow as f64 / dt
		} else {
			0.0
		};
		println!("{:12} [{:9.1}/s]", inow, rate);
	}
}


pub struct NullSink;

impl ProgressSink for NullSink {
	fn update(&mut self, _inow: usize) {}
	fn finish(&mut self, _inow: usize) {}
}


/// Throttles per-item updates so the sink only sees every `interval`-th one.
pub struct CountMeter<'x, S: ProgressSink + ?Sized> {
	sink: &'x mut S,
	interval: usize,
	last: usize,
}

impl<'x, S: ProgressSink + ?Sized> CountMeter<'x, S> {
	pub fn new(sink: &'x mut S, interval: usize) -> Self {
		assert!(interval > 0);
		Self{sink, interval, last: 0}
	}

	pub fn step(&mut self, inow: usize) {
		if inow / self.interval > self.last / self.interval {
			self.sink.update(inow);
			self.last = inow;
		}
	}

	pub fn finish(self, inow: usize) {
		self.sink.finish(inow);
	}
}


/// Meter for a terminal run, silence otherwise (logs, cron).
pub fn default_output() -> Box<dyn ProgressSink> {
	if isatty::stdout_isatty() {
		Box::new(TermMeter::new())
	} else {
		Box::new(NullSink)
	}
}


#[cfg(test)]
mod tests {
	use super::*;

	struct Recorder {
		updates: Vec<usize>,
		finished: Option<usize>,
	}

	impl ProgressSink for Recorder {
		fn update(&mut self, inow: usize) {
			self.updates.push(inow);
		}

		fn finish(&mut self, inow: usize) {
			self.finished = Some(inow);
		}
	}

	#[test]
	fn count_meter_throttles_updates() {
		let mut rec = Recorder{updates: Vec::new(), finished: None};
		{
			let mut pm = CountMeter::new(&mut rec, 10);
			for i in 1..=35 {
				pm.step(i);
			}
			pm.finish(35);
		}
		assert_eq!(rec.updates, vec![10, 20, 30]);
		assert_eq!(rec.finished, Some(35));
	}
}
