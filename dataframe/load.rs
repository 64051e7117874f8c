use super::*;
use std::{collections::BTreeMap, path::Path};

#[derive(Clone)]
pub struct FromCsvOptions<'a> {
	/// The columns to load and their types. Columns in the csv that are not listed here are skipped. Every listed column must be present in the csv.
	pub column_types: BTreeMap<String, ColumnType>,
	pub invalid_values: &'a [&'a str],
}

impl<'a> FromCsvOptions<'a> {
	pub fn new(column_types: BTreeMap<String, ColumnType>) -> Self {
		Self {
			column_types,
			invalid_values: DEFAULT_INVALID_VALUES,
		}
	}
}

/// These values are the default values that are considered invalid.
const DEFAULT_INVALID_VALUES: &[&str] = &[
	"", "null", "NULL", "n/a", "N/A", "nan", "-nan", "NaN", "-NaN", "?",
];

impl DataFrame {
	pub fn from_path(path: &Path, options: FromCsvOptions) -> Result<Self> {
		Self::from_csv(&mut csv::Reader::from_path(path)?, options)
	}

	/// Load a dataframe from a csv with a header row. Invalid number values become NaN and unknown enum values become `None`.
	pub fn from_csv<R>(reader: &mut csv::Reader<R>, options: FromCsvOptions) -> Result<Self>
	where
		R: std::io::Read,
	{
		let header: Vec<String> = reader
			.headers()?
			.into_iter()
			.map(|column_name| column_name.trim().to_owned())
			.collect();
		// Pair each csv column index with the column it loads into, preserving the csv's column order.
		let mut column_names = Vec::new();
		let mut column_types = Vec::new();
		let mut csv_indexes = Vec::new();
		for (index, column_name) in header.iter().enumerate() {
			if let Some(column_type) = options.column_types.get(column_name) {
				column_names.push(column_name.clone());
				column_types.push(column_type.clone());
				csv_indexes.push(index);
			}
		}
		for column_name in options.column_types.keys() {
			if !header.contains(column_name) {
				return Err(format_err!("csv is missing column {}", column_name));
			}
		}
		let mut df = DataFrame::new(column_names, column_types);
		let mut record = csv::StringRecord::new();
		while reader.read_record(&mut record)? {
			for (column, csv_index) in izip!(df.columns.iter_mut(), csv_indexes.iter()) {
				let value = record.get(*csv_index).unwrap_or("").trim();
				let is_invalid = options.invalid_values.contains(&value);
				match column {
					Column::Number(column) => {
						let value = if is_invalid {
							std::f32::NAN
						} else {
							lexical::parse::<f32, _>(value).unwrap_or(std::f32::NAN)
						};
						column.data.push(value);
					}
					Column::Enum(column) => {
						let value = if is_invalid {
							None
						} else {
							column.value_for_option(value)
						};
						column.data.push(value);
					}
				}
			}
		}
		Ok(df)
	}
}

#[test]
fn test_from_csv() {
	let csv = r#"id,level,period
a,1,Day
b,2.5,Dusk
c,?,Night
"#;
	let mut column_types = BTreeMap::new();
	column_types.insert("level".to_owned(), ColumnType::Number);
	column_types.insert(
		"period".to_owned(),
		ColumnType::Enum {
			options: vec!["Night".to_owned(), "Day".to_owned()],
		},
	);
	let df = DataFrame::from_csv(
		&mut csv::Reader::from_reader(std::io::Cursor::new(csv)),
		FromCsvOptions::new(column_types),
	)
	.unwrap();
	insta::assert_debug_snapshot!(df, @r###"
 DataFrame {
     columns: [
         Number(
             NumberColumn {
                 name: "level",
                 data: [
                     1.0,
                     2.5,
                     NaN,
                 ],
             },
         ),
         Enum(
             EnumColumn {
                 name: "period",
                 options: [
                     "Night",
                     "Day",
                 ],
                 data: [
                     Some(
                         2,
                     ),
                     None,
                     Some(
                         1,
                     ),
                 ],
             },
         ),
     ],
 }
 "###);
}

#[test]
fn test_from_csv_missing_column() {
	let csv = "level\n1\n";
	let mut column_types = BTreeMap::new();
	column_types.insert("level".to_owned(), ColumnType::Number);
	column_types.insert("rain".to_owned(), ColumnType::Number);
	let result = DataFrame::from_csv(
		&mut csv::Reader::from_reader(std::io::Cursor::new(csv)),
		FromCsvOptions::new(column_types),
	);
	assert!(result.is_err());
}
