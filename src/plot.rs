use std::path::Path;

use chrono::{Datelike, NaiveDate};

use enum_map::{enum_map, EnumMap};

use plotters::prelude::*;

use crate::calendar;
use crate::error::Error;
use crate::jhu::CaseKind;
use crate::timeseries::{AlignedSeries, Series};


pub const CHART_SIZE: (u32, u32) = (1024, 768);
const CAPTION_FONT: (&'static str, u32) = ("sans-serif", 40);

/// Default matplotlib color cycle, kept so the charts come out looking like
/// the report this tool replaces.
pub static PALETTE10: [RGBColor; 10] = [
	RGBColor(31, 119, 180),
	RGBColor(255, 127, 14),
	RGBColor(44, 160, 44),
	RGBColor(214, 39, 40),
	RGBColor(148, 103, 189),
	RGBColor(140, 86, 75),
	RGBColor(227, 119, 194),
	RGBColor(127, 127, 127),
	RGBColor(188, 189, 34),
	RGBColor(23, 190, 207),
];

pub const ACTIVE_COLOR: RGBColor = RGBColor(188, 189, 34);
pub const DAILY_COLOR: RGBColor = RGBColor(44, 160, 44);

pub fn case_colors() -> EnumMap<CaseKind, RGBColor> {
	enum_map! {
		CaseKind::Confirmed => RGBColor(31, 119, 180),
		CaseKind::Recovered => RGBColor(23, 190, 207),
		CaseKind::Deaths => RGBColor(214, 39, 40),
	}
}


fn line_style(color: RGBColor) -> ShapeStyle {
	ShapeStyle{
		color: color.to_rgba(),
		filled: false,
		stroke_width: 2,
	}
}

fn month_tick_label(d: &NaiveDate) -> String {
	calendar::month_label(calendar::month_end(d.month()))
}


/// Confirmed/recovered/death cumulative counts on a log scale, one chart.
pub fn render_overview(path: &Path, title: &str, series: &[(CaseKind, Series<u64>)]) -> Result<(), Error> {
	let first = match series.iter().find(|(_, s)| !s.is_empty()) {
		Some((_, s)) => s,
		None => return Err(Error::render(path, "no data to draw")),
	};
	let x_min = first.start();
	let x_max = first.dates().last().unwrap_or(x_min);
	let max_y = series.iter()
		.filter_map(|(_, s)| s.values().iter().max())
		.max()
		.copied()
		.unwrap_or(1) as f64 * 1.1;
	let ticks = calendar::month_end_labels(first.dates());

	let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();
	root.fill(&WHITE).map_err(|e| Error::render(path, e))?;
	let mut chart = ChartBuilder::on(&root)
		.margin(10)
		.caption(title, CAPTION_FONT)
		.set_label_area_size(LabelAreaPosition::Left, 60)
		.set_label_area_size(LabelAreaPosition::Right, 60)
		.set_label_area_size(LabelAreaPosition::Bottom, 40)
		.build_cartesian_2d(x_min..x_max, (1f64..max_y.max(10.0)).log_scale())
		.map_err(|e| Error::render(path, e))?;
	chart.configure_mesh()
		.x_labels(ticks.len().max(1))
		.x_label_formatter(&month_tick_label)
		.x_desc("Date")
		.y_desc("Cases")
		.draw()
		.map_err(|e| Error::render(path, e))?;

	let colors = case_colors();
	for (kind, s) in series {
		let style = line_style(colors[*kind]);
		chart
			.draw_series(LineSeries::new(
				// log axis, so zero-count days are clamped to 1
				s.iter().map(|(d, v)| (d, (v as f64).max(1.0))),
				style.clone(),
			))
			.map_err(|e| Error::render(path, e))?
			.label(kind.label())
			.legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], style.clone()));
	}
	chart
		.configure_series_labels()
		.border_style(&BLACK)
		.position(SeriesLabelPosition::UpperLeft)
		.draw()
		.map_err(|e| Error::render(path, e))?;
	root.present().map_err(|e| Error::render(path, e))?;
	Ok(())
}


/// Active case estimate as a single line on a log scale. The estimate can
/// dip below zero on inconsistent upstream data; such points are clamped to
/// 1 for drawing, the underlying series keeps them.
pub fn render_active(path: &Path, title: &str, series: &Series<i64>) -> Result<(), Error> {
	if series.is_empty() {
		return Err(Error::render(path, "no data to draw"))
	}
	let x_min = series.start();
	let x_max = series.dates().last().unwrap_or(x_min);
	let max_y = series.values().iter().max().copied().unwrap_or(1).max(1) as f64 * 1.1;
	let ticks = calendar::month_end_labels(series.dates());

	let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();
	root.fill(&WHITE).map_err(|e| Error::render(path, e))?;
	let mut chart = ChartBuilder::on(&root)
		.margin(10)
		.caption(title, CAPTION_FONT)
		.set_label_area_size(LabelAreaPosition::Left, 60)
		.set_label_area_size(LabelAreaPosition::Right, 60)
		.set_label_area_size(LabelAreaPosition::Bottom, 40)
		.build_cartesian_2d(x_min..x_max, (1f64..max_y.max(10.0)).log_scale())
		.map_err(|e| Error::render(path, e))?;
	chart.configure_mesh()
		.x_labels(ticks.len().max(1))
		.x_label_formatter(&month_tick_label)
		.x_desc("Date")
		.y_desc("Active cases")
		.draw()
		.map_err(|e| Error::render(path, e))?;

	chart
		.draw_series(LineSeries::new(
			series.iter().map(|(d, v)| (d, (v as f64).max(1.0))),
			line_style(ACTIVE_COLOR),
		))
		.map_err(|e| Error::render(path, e))?;
	root.present().map_err(|e| Error::render(path, e))?;
	Ok(())
}


/// Daily new confirmed cases as one bar per day.
pub fn render_daily_new(path: &Path, title: &str, series: &Series<i64>) -> Result<(), Error> {
	if series.is_empty() {
		return Err(Error::render(path, "no data to draw"))
	}
	let x_min = series.start();
	let x_max = series.dates().last().unwrap_or(x_min) + chrono::Duration::days(1);
	let max_v = series.values().iter().max().copied().unwrap_or(0);
	let min_v = series.values().iter().min().copied().unwrap_or(0);
	let ticks = calendar::month_end_labels(series.dates());

	let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();
	root.fill(&WHITE).map_err(|e| Error::render(path, e))?;
	let mut chart = ChartBuilder::on(&root)
		.margin(10)
		.caption(title, CAPTION_FONT)
		.set_label_area_size(LabelAreaPosition::Left, 60)
		.set_label_area_size(LabelAreaPosition::Right, 60)
		.set_label_area_size(LabelAreaPosition::Bottom, 40)
		.build_cartesian_2d(x_min..x_max, min_v.min(0)..max_v.max(1))
		.map_err(|e| Error::render(path, e))?;
	chart.configure_mesh()
		.x_labels(ticks.len().max(1))
		.x_label_formatter(&month_tick_label)
		.x_desc("Date")
		.y_desc("New cases")
		.draw()
		.map_err(|e| Error::render(path, e))?;

	chart
		.draw_series(series.iter().map(|(d, v)| {
			Rectangle::new(
				[(d, 0), (d + chrono::Duration::days(1), v)],
				DAILY_COLOR.filled(),
			)
		}))
		.map_err(|e| Error::render(path, e))?;
	root.present().map_err(|e| Error::render(path, e))?;
	Ok(())
}


/// One threshold-aligned series on a log scale, x in days since crossing.
/// When the threshold was never reached, the chart still comes out, with
/// empty axes, so the report always has its full set of images.
pub fn render_first(
		path: &Path,
		title: &str,
		x_desc: &str,
		aligned: Option<&AlignedSeries<u64>>,
) -> Result<(), Error> {
	let (max_x, max_y) = match aligned {
		Some(a) if !a.is_empty() => (
			a.len() as i32,
			a.values().iter().max().copied().unwrap_or(1) as f64 * 1.1,
		),
		_ => (1, 10.0),
	};

	let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();
	root.fill(&WHITE).map_err(|e| Error::render(path, e))?;
	let mut chart = ChartBuilder::on(&root)
		.margin(10)
		.caption(title, CAPTION_FONT)
		.set_label_area_size(LabelAreaPosition::Left, 60)
		.set_label_area_size(LabelAreaPosition::Right, 60)
		.set_label_area_size(LabelAreaPosition::Bottom, 40)
		.build_cartesian_2d(0i32..max_x, (1f64..max_y.max(10.0)).log_scale())
		.map_err(|e| Error::render(path, e))?;
	chart.configure_mesh()
		.x_desc(x_desc)
		.y_desc("Cases")
		.draw()
		.map_err(|e| Error::render(path, e))?;

	if let Some(a) = aligned {
		chart
			.draw_series(LineSeries::new(
				a.iter().map(|(i, v)| (i as i32, (v as f64).max(1.0))),
				line_style(PALETTE10[0]),
			))
			.map_err(|e| Error::render(path, e))?;
	}
	root.present().map_err(|e| Error::render(path, e))?;
	Ok(())
}


/// Several countries' threshold-aligned series on one log-scale chart.
pub fn render_compare(
		path: &Path,
		title: &str,
		x_desc: &str,
		entries: &[(String, AlignedSeries<u64>)],
) -> Result<(), Error> {
	let max_x = entries.iter().map(|(_, a)| a.len()).max().unwrap_or(1).max(1) as i32;
	let max_y = entries.iter()
		.filter_map(|(_, a)| a.values().iter().max())
		.max()
		.copied()
		.unwrap_or(1) as f64 * 1.1;

	let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();
	root.fill(&WHITE).map_err(|e| Error::render(path, e))?;
	let mut chart = ChartBuilder::on(&root)
		.margin(10)
		.caption(title, CAPTION_FONT)
		.set_label_area_size(LabelAreaPosition::Left, 60)
		.set_label_area_size(LabelAreaPosition::Right, 60)
		.set_label_area_size(LabelAreaPosition::Bottom, 40)
		.build_cartesian_2d(0i32..max_x, (1f64..max_y.max(10.0)).log_scale())
		.map_err(|e| Error::render(path, e))?;
	chart.configure_mesh()
		.x_desc(x_desc)
		.y_desc("Cases")
		.draw()
		.map_err(|e| Error::render(path, e))?;

	for (i, (name, a)) in entries.iter().enumerate() {
		let style = line_style(PALETTE10[i % PALETTE10.len()]);
		chart
			.draw_series(LineSeries::new(
				a.iter().map(|(i, v)| (i as i32, (v as f64).max(1.0))),
				style.clone(),
			))
			.map_err(|e| Error::render(path, e))?
			.label(name.as_str())
			.legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], style.clone()));
	}
	chart
		.configure_series_labels()
		.border_style(&BLACK)
		.position(SeriesLabelPosition::UpperLeft)
		.draw()
		.map_err(|e| Error::render(path, e))?;
	root.present().map_err(|e| Error::render(path, e))?;
	Ok(())
}


#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn palette_entries_are_distinct() {
		for (i, a) in PALETTE10.iter().enumerate() {
			for b in PALETTE10[i + 1..].iter() {
				assert_ne!(a.rgb(), b.rgb());
			}
		}
	}

	#[test]
	fn case_colors_come_from_the_palette() {
		let colors = case_colors();
		for kind in CaseKind::ALL.iter() {
			assert!(PALETTE10.iter().any(|c| c.rgb() == colors[*kind].rgb()));
		}
	}
}
