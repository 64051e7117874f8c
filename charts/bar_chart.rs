use colored::{Color, Colorize};
use dewater_util::finite::finite_bounds;
use num_traits::ToPrimitive;

/// Options for a horizontal bar chart. Each point is drawn as one row, with the bar length proportional to its value.
pub struct BarChartOptions {
	pub title: Option<String>,
	pub x_axis_title: Option<String>,
	pub data: Vec<BarChartPoint>,
	/// The number of characters the longest bar spans.
	pub width: usize,
	pub color: Option<Color>,
}

pub struct BarChartPoint {
	pub label: String,
	pub value: f32,
}

const BAR_CHARACTER: char = '█';

/// Draw the chart. Colors are only emitted when `color` is true. Bars for negative or non finite values are empty.
pub fn draw_bar_chart(options: &BarChartOptions, color: bool) -> String {
	let mut output = String::new();
	if let Some(title) = &options.title {
		output.push_str(title);
		output.push('\n');
	}
	let label_width = options
		.data
		.iter()
		.map(|point| point.label.chars().count())
		.max()
		.unwrap_or(0);
	let max_value = finite_bounds(options.data.iter().map(|point| point.value))
		.map(|(_, max)| max)
		.unwrap_or(0.0);
	for point in options.data.iter() {
		let length = bar_length(point.value, max_value, options.width);
		let bar: String = std::iter::repeat(BAR_CHARACTER).take(length).collect();
		let bar = match (color, options.color) {
			(true, Some(bar_color)) => bar.as_str().color(bar_color).to_string(),
			_ => bar,
		};
		output.push_str(&format!(
			"{:<label_width$} | {}{}{:.3}\n",
			point.label,
			bar,
			if length > 0 { " " } else { "" },
			point.value,
			label_width = label_width,
		));
	}
	if let Some(x_axis_title) = &options.x_axis_title {
		output.push_str(&" ".repeat(label_width + 3));
		output.push_str(x_axis_title);
		output.push('\n');
	}
	output
}

fn bar_length(value: f32, max_value: f32, width: usize) -> usize {
	if !value.is_finite() || value <= 0.0 || max_value <= 0.0 {
		return 0;
	}
	let width = width.to_f32().unwrap_or(0.0);
	(value / max_value * width).round().to_usize().unwrap_or(0)
}

#[test]
fn test_bar_chart() {
	let options = BarChartOptions {
		title: Some("Importance".to_owned()),
		x_axis_title: Some("weight".to_owned()),
		data: vec![
			BarChartPoint {
				label: "water".to_owned(),
				value: 0.5,
			},
			BarChartPoint {
				label: "rain".to_owned(),
				value: 0.25,
			},
			BarChartPoint {
				label: "time".to_owned(),
				value: 0.0,
			},
		],
		width: 8,
		color: Some(Color::Blue),
	};
	insta::assert_snapshot!(draw_bar_chart(&options, false), @r###"
 Importance
 water | ████████ 0.500
 rain  | ████ 0.250
 time  | 0.000
         weight
 "###);
}

#[test]
fn test_bar_length() {
	assert_eq!(bar_length(1.0, 1.0, 10), 10);
	assert_eq!(bar_length(0.33, 1.0, 10), 3);
	assert_eq!(bar_length(-1.0, 1.0, 10), 0);
	assert_eq!(bar_length(std::f32::NAN, 1.0, 10), 0);
	assert_eq!(bar_length(1.0, 0.0, 10), 0);
}
