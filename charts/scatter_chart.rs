use colored::{Color, Colorize};
use dewater_util::finite::finite_bounds;
use num_traits::ToPrimitive;

/// Options for a scatter chart drawn on a grid of characters. Each series draws its points with its own marker, and later series draw over earlier ones when they share a cell.
pub struct ScatterChartOptions {
	pub title: Option<String>,
	pub x_axis_title: Option<String>,
	pub y_axis_title: Option<String>,
	pub x_min: Option<f32>,
	pub x_max: Option<f32>,
	pub y_min: Option<f32>,
	pub y_max: Option<f32>,
	pub width: usize,
	pub height: usize,
	pub data: Vec<ScatterChartSeries>,
}

pub struct ScatterChartSeries {
	pub title: String,
	pub marker: char,
	pub color: Option<Color>,
	pub data: Vec<ScatterChartPoint>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScatterChartPoint {
	pub x: f32,
	pub y: f32,
}

/// Draw the chart. Colors are only emitted when `color` is true. Points outside the axis bounds or with non finite coordinates are not drawn.
pub fn draw_scatter_chart(options: &ScatterChartOptions, color: bool) -> String {
	let points = || options.data.iter().flat_map(|series| series.data.iter());
	let (x_min, x_max) = bounds(
		options.x_min,
		options.x_max,
		finite_bounds(points().map(|point| point.x)),
	);
	let (y_min, y_max) = bounds(
		options.y_min,
		options.y_max,
		finite_bounds(points().map(|point| point.y)),
	);

	// Each cell holds the index of the series that was drawn there last.
	let mut grid: Vec<Vec<Option<usize>>> = vec![vec![None; options.width]; options.height];
	for (series_index, series) in options.data.iter().enumerate() {
		for point in series.data.iter() {
			let column = scale(point.x, x_min, x_max, options.width);
			let row = scale(point.y, y_min, y_max, options.height);
			if let (Some(column), Some(row)) = (column, row) {
				// Rows are drawn from the top, so the largest y value is row 0.
				grid[options.height - 1 - row][column] = Some(series_index);
			}
		}
	}

	let y_max_label = format_tick(y_max);
	let y_min_label = format_tick(y_min);
	let label_width = usize::max(y_max_label.chars().count(), y_min_label.chars().count());
	let indent = " ".repeat(label_width + 2);
	let mut lines = Vec::new();
	if let Some(title) = &options.title {
		lines.push(title.clone());
	}
	if let Some(y_axis_title) = &options.y_axis_title {
		lines.push(y_axis_title.clone());
	}
	for (row_index, row) in grid.iter().enumerate() {
		let label = if row_index == 0 {
			y_max_label.as_str()
		} else if row_index + 1 == options.height {
			y_min_label.as_str()
		} else {
			""
		};
		let cells: String = row
			.iter()
			.map(|cell| match cell {
				Some(series_index) => marker(&options.data[*series_index], color),
				None => " ".to_owned(),
			})
			.collect();
		let line = format!(
			"{:>label_width$} |{}",
			label,
			cells,
			label_width = label_width
		);
		lines.push(line.trim_end().to_owned());
	}
	lines.push(format!(
		"{:>label_width$} +{}",
		"",
		"-".repeat(options.width),
		label_width = label_width
	));
	let x_min_label = format_tick(x_min);
	let x_max_label = format_tick(x_max);
	let gap = options
		.width
		.saturating_sub(x_min_label.chars().count() + x_max_label.chars().count());
	lines.push(format!(
		"{}{}{}{}",
		indent,
		x_min_label,
		" ".repeat(gap),
		x_max_label
	));
	if let Some(x_axis_title) = &options.x_axis_title {
		lines.push(format!("{}{}", indent, x_axis_title));
	}
	let legend: Vec<String> = options
		.data
		.iter()
		.map(|series| format!("{} {}", marker(series, color), series.title))
		.collect();
	if !legend.is_empty() {
		lines.push(format!("{}{}", indent, legend.join("  ")));
	}
	let mut output = lines.join("\n");
	output.push('\n');
	output
}

fn marker(series: &ScatterChartSeries, color: bool) -> String {
	let marker = series.marker.to_string();
	match (color, series.color) {
		(true, Some(series_color)) => marker.as_str().color(series_color).to_string(),
		_ => marker,
	}
}

/// Resolve the axis bounds, preferring the configured bounds and falling back to the data. An axis with no data spans 0 to 1.
fn bounds(min: Option<f32>, max: Option<f32>, data_bounds: Option<(f32, f32)>) -> (f32, f32) {
	let (data_min, data_max) = data_bounds.unwrap_or((0.0, 1.0));
	(min.unwrap_or(data_min), max.unwrap_or(data_max))
}

/// Map `value` in [min, max] to one of `n` cells.
fn scale(value: f32, min: f32, max: f32, n: usize) -> Option<usize> {
	if n == 0 || !value.is_finite() || value < min || value > max {
		return None;
	}
	if max <= min {
		return Some(0);
	}
	let last = (n - 1).to_f32()?;
	((value - min) / (max - min) * last).round().to_usize()
}

fn format_tick(value: f32) -> String {
	if value.fract() == 0.0 {
		format!("{:.0}", value)
	} else {
		format!("{:.1}", value)
	}
}

#[test]
fn test_scatter_chart() {
	let options = ScatterChartOptions {
		title: Some("Chart".to_owned()),
		x_axis_title: Some("x".to_owned()),
		y_axis_title: Some("y".to_owned()),
		x_min: Some(0.0),
		x_max: Some(4.0),
		y_min: None,
		y_max: None,
		width: 5,
		height: 3,
		data: vec![
			ScatterChartSeries {
				title: "A".to_owned(),
				marker: 'o',
				color: Some(Color::Green),
				data: vec![
					ScatterChartPoint { x: 0.0, y: 0.0 },
					ScatterChartPoint { x: 4.0, y: 2.0 },
				],
			},
			ScatterChartSeries {
				title: "B".to_owned(),
				marker: '.',
				color: Some(Color::Red),
				data: vec![
					ScatterChartPoint { x: 2.0, y: 1.0 },
					// Outside the x axis, so it is not drawn.
					ScatterChartPoint { x: 9.0, y: 1.0 },
				],
			},
		],
	};
	insta::assert_snapshot!(draw_scatter_chart(&options, false), @r###"
 Chart
 y
 2 |    o
   |  .
 0 |o
   +-----
    0   4
    x
    o A  . B
 "###);
}

#[test]
fn test_scale() {
	assert_eq!(scale(0.0, 0.0, 10.0, 11), Some(0));
	assert_eq!(scale(10.0, 0.0, 10.0, 11), Some(10));
	assert_eq!(scale(4.4, 0.0, 10.0, 11), Some(4));
	assert_eq!(scale(11.0, 0.0, 10.0, 11), None);
	assert_eq!(scale(std::f32::NAN, 0.0, 10.0, 11), None);
	assert_eq!(scale(3.0, 3.0, 3.0, 11), Some(0));
	assert_eq!(scale(3.0, 0.0, 10.0, 0), None);
}
