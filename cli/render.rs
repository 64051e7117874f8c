use colored::{Color, Colorize};
use dewater_charts::{
	bar_chart::{draw_bar_chart, BarChartOptions, BarChartPoint},
	scatter_chart::{draw_scatter_chart, ScatterChartOptions, ScatterChartPoint, ScatterChartSeries},
};
use dewater_core::{
	predict::results_to_dataframe, FeatureRecord, ImportanceVector, PredictionResult, PumpStatus,
	SyntheticDataset,
};
use dewater_util::table::Table;

pub const TITLE: &str = "Solar-Powered Dewatering Pump";
pub const DESCRIPTION: &str =
	"Predict whether the pump should run from the water level, weather, time of day, and diesel cost.";

const BAR_CHART_WIDTH: usize = 40;
const SCATTER_CHART_WIDTH: usize = 60;
const SCATTER_CHART_HEIGHT: usize = 20;

pub fn header(color: bool) -> String {
	let title = if color {
		TITLE.bold().to_string()
	} else {
		TITLE.to_owned()
	};
	format!("{}\n{}\n", title, DESCRIPTION)
}

pub fn status(result: &PredictionResult, color: bool) -> String {
	let name = result.label.name();
	let name = match (color, result.label) {
		(false, _) => name.to_owned(),
		(true, PumpStatus::On) => name.green().bold().to_string(),
		(true, PumpStatus::Off) => name.red().bold().to_string(),
	};
	format!(
		"Pump Status: {} (probability of ON {:.3})\n",
		name, result.probability
	)
}

pub fn importances(importances: &ImportanceVector, color: bool) -> String {
	let options = BarChartOptions {
		title: Some("Random Forest Feature Importance".to_owned()),
		x_axis_title: Some("Importance".to_owned()),
		data: importances
			.iter()
			.map(|entry| BarChartPoint {
				label: entry.feature_name.clone(),
				value: entry.weight,
			})
			.collect(),
		width: BAR_CHART_WIDTH,
		color: Some(Color::Blue),
	};
	draw_bar_chart(&options, color)
}

/// The input and output table for the first `head` results, with the probability of ON as the last column.
pub fn results_table(results: &[PredictionResult], head: usize) -> Table {
	let results = &results[..usize::min(head, results.len())];
	let df = results_to_dataframe(results);
	let mut header: Vec<String> = df
		.column_names()
		.into_iter()
		.map(|name| name.to_owned())
		.collect();
	header.push("probability".to_owned());
	let rows = results
		.iter()
		.enumerate()
		.map(|(index, result)| {
			let mut row: Vec<String> = df
				.columns
				.iter()
				.map(|column| column.display_value(index))
				.collect();
			row.push(format!("{:.3}", result.probability));
			row
		})
		.collect();
	Table::new(header, rows)
}

pub fn scatter(dataset: &SyntheticDataset, color: bool) -> String {
	let series = |status: PumpStatus, marker: char, series_color: Color| ScatterChartSeries {
		title: status.name().to_owned(),
		marker,
		color: Some(series_color),
		data: dataset
			.rows
			.iter()
			.filter(|row| row.label == status)
			.map(|row| point(&row.record))
			.collect(),
	};
	let range = |index: usize| FeatureRecord::RANGES[index];
	let options = ScatterChartOptions {
		title: Some(format!(
			"Synthetic Dataset (seed {}, {} rows)",
			dataset.seed,
			dataset.len()
		)),
		x_axis_title: Some("water_level".to_owned()),
		y_axis_title: Some("solar_irradiance".to_owned()),
		x_min: Some(range(0).0),
		x_max: Some(range(0).1),
		y_min: Some(range(2).0),
		y_max: Some(range(2).1),
		width: SCATTER_CHART_WIDTH,
		height: SCATTER_CHART_HEIGHT,
		// ON is drawn last so it stays visible where the classes overlap.
		data: vec![
			series(PumpStatus::Off, '.', Color::Red),
			series(PumpStatus::On, 'o', Color::Green),
		],
	};
	draw_scatter_chart(&options, color)
}

fn point(record: &FeatureRecord) -> ScatterChartPoint {
	ScatterChartPoint {
		x: record.water_level,
		y: record.solar_irradiance,
	}
}

pub fn on_fraction(dataset: &SyntheticDataset) -> String {
	match dataset.on_fraction() {
		Some(fraction) => format!(
			"{} of {} rows predicted ON ({:.1}%)\n",
			dataset.on_count(),
			dataset.len(),
			fraction * 100.0
		),
		None => "The synthetic dataset is empty.\n".to_owned(),
	}
}

#[cfg(test)]
mod test {
	use super::*;
	use dewater_core::{build_feature_record, importances::FeatureImportance, TimeOfDay};

	fn result(label: PumpStatus, probability: f32) -> PredictionResult {
		PredictionResult {
			record: build_feature_record(5.0, 30.0, 400.0, TimeOfDay::Noon, 15.0),
			label,
			probability,
		}
	}

	#[test]
	fn test_status() {
		assert_eq!(
			status(&result(PumpStatus::On, 0.65), false),
			"Pump Status: ON (probability of ON 0.650)\n"
		);
		assert_eq!(
			status(&result(PumpStatus::Off, 0.5), false),
			"Pump Status: OFF (probability of ON 0.500)\n"
		);
	}

	#[test]
	fn test_results_table() {
		let results = vec![result(PumpStatus::On, 0.65), result(PumpStatus::Off, 0.25)];
		insta::assert_snapshot!(results_table(&results, 10).to_string(), @r###"
 | water_level | rain_forecast | solar_irradiance | time_of_day | diesel_cost | pump_prediction | probability |
 |-------------|---------------|------------------|-------------|-------------|-----------------|-------------|
 | 5           | 30            | 400              | Noon        | 15          | ON              | 0.650       |
 | 5           | 30            | 400              | Noon        | 15          | OFF             | 0.250       |
 "###);
		assert_eq!(results_table(&results, 1).n_rows(), 1);
		assert_eq!(results_table(&results, 0).n_rows(), 0);
	}

	#[test]
	fn test_importances() {
		let vector = ImportanceVector {
			entries: vec![
				FeatureImportance {
					feature_name: "water_level".to_owned(),
					weight: 0.75,
				},
				FeatureImportance {
					feature_name: "diesel_cost".to_owned(),
					weight: 0.25,
				},
			],
		};
		let chart = importances(&vector, false);
		let lines: Vec<&str> = chart.lines().collect();
		assert_eq!(lines[0], "Random Forest Feature Importance");
		assert!(lines[1].starts_with("water_level | "));
		assert!(lines[1].ends_with(" 0.750"));
		assert!(lines[2].starts_with("diesel_cost | "));
		assert_eq!(lines[3].trim(), "Importance");
	}

	#[test]
	fn test_on_fraction() {
		let dataset = SyntheticDataset {
			seed: 42,
			rows: vec![
				result(PumpStatus::On, 0.9),
				result(PumpStatus::Off, 0.1),
				result(PumpStatus::Off, 0.2),
				result(PumpStatus::On, 0.7),
			],
		};
		assert_eq!(on_fraction(&dataset), "2 of 4 rows predicted ON (50.0%)\n");
		let chart = scatter(&dataset, false);
		assert!(chart.starts_with("Synthetic Dataset (seed 42, 4 rows)\n"));
		assert!(chart.contains("o"));
		let empty = SyntheticDataset {
			seed: 42,
			rows: Vec::new(),
		};
		assert_eq!(on_fraction(&empty), "The synthetic dataset is empty.\n");
	}
}
