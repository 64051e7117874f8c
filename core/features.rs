/*!
This module defines the fixed feature schema the pump classifier was trained on. The order of [`FEATURE_NAMES`] is load bearing: the model looks features up by position, so every path that produces model input goes through [`FeatureRecord::to_values`] or [`records_to_dataframe`], which share that order.
*/

use crate::{Error, Result};
use dewater_dataframe::{
	Column, ColumnType, DataFrame, EnumColumn, FromCsvOptions, NumberColumn, Value,
};
use num_traits::ToPrimitive;
use std::{collections::BTreeMap, num::NonZeroUsize, path::Path, str::FromStr};

pub const N_FEATURES: usize = 5;

pub const FEATURE_NAMES: [&str; N_FEATURES] = [
	"water_level",
	"rain_forecast",
	"solar_irradiance",
	"time_of_day",
	"diesel_cost",
];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TimeOfDay {
	Night,
	Morning,
	Noon,
	Evening,
}

impl TimeOfDay {
	pub const ALL: [TimeOfDay; 4] = [
		TimeOfDay::Night,
		TimeOfDay::Morning,
		TimeOfDay::Noon,
		TimeOfDay::Evening,
	];

	pub fn code(self) -> u8 {
		match self {
			TimeOfDay::Night => 0,
			TimeOfDay::Morning => 1,
			TimeOfDay::Noon => 2,
			TimeOfDay::Evening => 3,
		}
	}

	pub fn from_code(code: u8) -> Option<TimeOfDay> {
		TimeOfDay::ALL.get(code as usize).copied()
	}

	pub fn name(self) -> &'static str {
		match self {
			TimeOfDay::Night => "Night",
			TimeOfDay::Morning => "Morning",
			TimeOfDay::Noon => "Noon",
			TimeOfDay::Evening => "Evening",
		}
	}

	/// The enum options in code order, for building enum columns.
	pub fn option_names() -> Vec<String> {
		TimeOfDay::ALL
			.iter()
			.map(|time_of_day| time_of_day.name().to_owned())
			.collect()
	}

	/// The 1-based enum column value for this time of day.
	fn enum_value(self) -> Option<NonZeroUsize> {
		NonZeroUsize::new(self.code() as usize + 1)
	}
}

impl std::fmt::Display for TimeOfDay {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.name())
	}
}

/// Parse either the numeric code or the case insensitive name.
impl FromStr for TimeOfDay {
	type Err = Error;
	fn from_str(s: &str) -> Result<Self> {
		let s = s.trim();
		if let Ok(code) = s.parse::<u8>() {
			return TimeOfDay::from_code(code)
				.ok_or_else(|| Error::Input(format!("time of day code {} is not in 0..=3", code)));
		}
		TimeOfDay::ALL
			.iter()
			.copied()
			.find(|time_of_day| time_of_day.name().eq_ignore_ascii_case(s))
			.ok_or_else(|| Error::Input(format!("unknown time of day \"{}\"", s)))
	}
}

/// The five inputs to the classifier, in the order the classifier expects them.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FeatureRecord {
	/// Water level in meters.
	pub water_level: f32,
	/// Rainfall forecast in millimeters.
	pub rain_forecast: f32,
	/// Solar irradiance in watts per square meter.
	pub solar_irradiance: f32,
	pub time_of_day: TimeOfDay,
	/// Diesel cost per kilowatt hour.
	pub diesel_cost: f32,
}

/// Assemble a feature record. Values are taken as given, including values outside the documented ranges.
pub fn build_feature_record(
	water_level: f32,
	rain_forecast: f32,
	solar_irradiance: f32,
	time_of_day: TimeOfDay,
	diesel_cost: f32,
) -> FeatureRecord {
	FeatureRecord {
		water_level,
		rain_forecast,
		solar_irradiance,
		time_of_day,
		diesel_cost,
	}
}

impl FeatureRecord {
	/// The documented domain of each feature, in schema order. The time of day range is over its codes.
	pub const RANGES: [(f32, f32); N_FEATURES] = [
		(0.0, 10.0),
		(0.0, 100.0),
		(0.0, 1000.0),
		(0.0, 3.0),
		(10.0, 20.0),
	];

	/// The record as model input, in schema order.
	pub fn to_values(&self) -> [Value; N_FEATURES] {
		[
			Value::Number(self.water_level),
			Value::Number(self.rain_forecast),
			Value::Number(self.solar_irradiance),
			Value::Enum(self.time_of_day.enum_value()),
			Value::Number(self.diesel_cost),
		]
	}

	/// The record as numbers in schema order, with the time of day as its code.
	pub fn to_numbers(&self) -> [f32; N_FEATURES] {
		[
			self.water_level,
			self.rain_forecast,
			self.solar_irradiance,
			f32::from(self.time_of_day.code()),
			self.diesel_cost,
		]
	}

	/// The names of the fields whose values fall outside their documented range. This is informational only.
	pub fn out_of_range_fields(&self) -> Vec<&'static str> {
		let numbers = self.to_numbers();
		FEATURE_NAMES
			.iter()
			.zip(numbers.iter().zip(FeatureRecord::RANGES.iter()))
			.filter(|(_, (value, (min, max)))| !(*min..=*max).contains(*value))
			.map(|(name, _)| *name)
			.collect()
	}
}

/// Build a dataframe with one column per feature, in schema order. The time of day is an enum column.
pub fn records_to_dataframe(records: &[FeatureRecord]) -> DataFrame {
	let number_column = |name: &str, value: fn(&FeatureRecord) -> f32| {
		Column::Number(NumberColumn {
			name: name.to_owned(),
			data: records.iter().map(value).collect(),
		})
	};
	DataFrame {
		columns: vec![
			number_column(FEATURE_NAMES[0], |record| record.water_level),
			number_column(FEATURE_NAMES[1], |record| record.rain_forecast),
			number_column(FEATURE_NAMES[2], |record| record.solar_irradiance),
			Column::Enum(EnumColumn {
				name: FEATURE_NAMES[3].to_owned(),
				options: TimeOfDay::option_names(),
				data: records
					.iter()
					.map(|record| record.time_of_day.enum_value())
					.collect(),
			}),
			number_column(FEATURE_NAMES[4], |record| record.diesel_cost),
		],
	}
}

/// Read feature records from a dataframe that has a number column for each feature. The time of day column holds codes. Columns may appear in any order.
pub fn records_from_dataframe(df: &DataFrame) -> Result<Vec<FeatureRecord>> {
	let column = |name: &str| -> Result<&[f32]> {
		df.column(name)
			.and_then(|column| column.as_number())
			.map(|column| column.data.as_slice())
			.ok_or_else(|| Error::Input(format!("missing number column {}", name)))
	};
	let water_level = column(FEATURE_NAMES[0])?;
	let rain_forecast = column(FEATURE_NAMES[1])?;
	let solar_irradiance = column(FEATURE_NAMES[2])?;
	let time_of_day = column(FEATURE_NAMES[3])?;
	let diesel_cost = column(FEATURE_NAMES[4])?;
	let numbers = [
		(FEATURE_NAMES[0], water_level),
		(FEATURE_NAMES[1], rain_forecast),
		(FEATURE_NAMES[2], solar_irradiance),
		(FEATURE_NAMES[4], diesel_cost),
	];
	let mut records = Vec::with_capacity(df.nrows());
	for row_index in 0..df.nrows() {
		// Cells that failed to parse are read as NaN.
		for (name, column) in numbers.iter() {
			let value = column[row_index];
			if !value.is_finite() {
				return Err(Error::Input(format!(
					"row {} has invalid {} {}",
					row_index + 1,
					name,
					value
				)));
			}
		}
		let code = time_of_day[row_index];
		let time_of_day = code
			.to_u8()
			.filter(|_| code.fract() == 0.0)
			.and_then(TimeOfDay::from_code)
			.ok_or_else(|| {
				Error::Input(format!(
					"row {} has invalid time of day code {}",
					row_index + 1,
					code
				))
			})?;
		records.push(build_feature_record(
			water_level[row_index],
			rain_forecast[row_index],
			solar_irradiance[row_index],
			time_of_day,
			diesel_cost[row_index],
		));
	}
	Ok(records)
}

/// Read feature records from a csv file with a header row naming the five features.
pub fn read_feature_records(path: &Path) -> Result<Vec<FeatureRecord>> {
	let column_types: BTreeMap<String, ColumnType> = FEATURE_NAMES
		.iter()
		.map(|name| (name.to_string(), ColumnType::Number))
		.collect();
	let df = DataFrame::from_path(path, FromCsvOptions::new(column_types))
		.map_err(|error| Error::Input(format!("{}: {:#}", path.display(), error)))?;
	let records = records_from_dataframe(&df)?;
	for (row_index, record) in records.iter().enumerate() {
		let fields = record.out_of_range_fields();
		if !fields.is_empty() {
			log::warn!(
				"row {} of {} has values outside the expected range for {}",
				row_index + 1,
				path.display(),
				fields.join(", ")
			);
		}
	}
	log::debug!("read {} records from {}", records.len(), path.display());
	Ok(records)
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn test_build_feature_record_preserves_order() {
		let record = build_feature_record(5.0, 30.0, 400.0, TimeOfDay::Noon, 15.0);
		assert_eq!(record.to_numbers(), [5.0, 30.0, 400.0, 2.0, 15.0]);
		assert_eq!(
			record.to_values(),
			[
				Value::Number(5.0),
				Value::Number(30.0),
				Value::Number(400.0),
				Value::Enum(NonZeroUsize::new(3)),
				Value::Number(15.0),
			]
		);
		assert!(record.out_of_range_fields().is_empty());
	}

	#[test]
	fn test_out_of_range_values_pass_through() {
		let record = build_feature_record(-1.0, 250.0, 400.0, TimeOfDay::Night, 9.5);
		assert_eq!(record.water_level, -1.0);
		assert_eq!(record.rain_forecast, 250.0);
		assert_eq!(record.diesel_cost, 9.5);
		assert_eq!(
			record.out_of_range_fields(),
			vec!["water_level", "rain_forecast", "diesel_cost"]
		);
	}

	#[test]
	fn test_parse_time_of_day() {
		assert_eq!("2".parse::<TimeOfDay>().unwrap(), TimeOfDay::Noon);
		assert_eq!("evening".parse::<TimeOfDay>().unwrap(), TimeOfDay::Evening);
		assert_eq!(" Night ".parse::<TimeOfDay>().unwrap(), TimeOfDay::Night);
		assert!("4".parse::<TimeOfDay>().is_err());
		assert!("dusk".parse::<TimeOfDay>().is_err());
		for time_of_day in TimeOfDay::ALL.iter() {
			assert_eq!(TimeOfDay::from_code(time_of_day.code()), Some(*time_of_day));
		}
	}

	#[test]
	fn test_dataframe_rows_match_values() {
		let records = vec![
			build_feature_record(5.0, 30.0, 400.0, TimeOfDay::Noon, 15.0),
			build_feature_record(9.5, 80.0, 10.0, TimeOfDay::Evening, 19.0),
		];
		let df = records_to_dataframe(&records);
		assert_eq!(df.column_names(), FEATURE_NAMES.to_vec());
		let rows = df.to_rows();
		for (row, record) in rows.genrows().into_iter().zip(records.iter()) {
			assert_eq!(row.to_vec(), record.to_values().to_vec());
		}
	}

	#[test]
	fn test_records_from_dataframe() {
		let mut df = DataFrame::new(
			FEATURE_NAMES.iter().rev().map(|name| name.to_string()).collect(),
			vec![ColumnType::Number; N_FEATURES],
		);
		// Columns are reversed, so the values are given in reverse schema order.
		df.push_row(&[
			Value::Number(15.0),
			Value::Number(1.0),
			Value::Number(400.0),
			Value::Number(30.0),
			Value::Number(5.0),
		])
		.unwrap();
		let records = records_from_dataframe(&df).unwrap();
		assert_eq!(
			records,
			vec![build_feature_record(
				5.0,
				30.0,
				400.0,
				TimeOfDay::Morning,
				15.0
			)]
		);
	}

	#[test]
	fn test_records_from_dataframe_rejects_bad_codes() {
		for code in [4.0, 1.5, -1.0, std::f32::NAN].iter() {
			let mut df = DataFrame::new(
				FEATURE_NAMES.iter().map(|name| name.to_string()).collect(),
				vec![ColumnType::Number; N_FEATURES],
			);
			df.push_row(&[
				Value::Number(5.0),
				Value::Number(30.0),
				Value::Number(400.0),
				Value::Number(*code),
				Value::Number(15.0),
			])
			.unwrap();
			assert!(records_from_dataframe(&df).is_err());
		}
	}

	#[test]
	fn test_records_from_dataframe_rejects_invalid_numbers() {
		for feature_index in [0, 1, 2, 4].iter() {
			let mut values = [
				Value::Number(5.0),
				Value::Number(30.0),
				Value::Number(400.0),
				Value::Number(2.0),
				Value::Number(15.0),
			];
			values[*feature_index] = Value::Number(std::f32::NAN);
			let mut df = DataFrame::new(
				FEATURE_NAMES.iter().map(|name| name.to_string()).collect(),
				vec![ColumnType::Number; N_FEATURES],
			);
			df.push_row(&values).unwrap();
			match records_from_dataframe(&df) {
				Err(Error::Input(message)) => assert_eq!(
					message,
					format!("row 1 has invalid {} NaN", FEATURE_NAMES[*feature_index])
				),
				result => panic!("{:?}", result),
			}
		}
	}
}
