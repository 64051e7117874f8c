/*!
This crate provides a minimal columnar dataframe. Each column is either a number column or an enum column, and rows can be viewed as slices of [`Value`]s, which is the form the tree models consume.
*/

#![allow(clippy::tabs_in_doc_comments)]

use anyhow::{format_err, Result};
use itertools::izip;
use ndarray::prelude::*;
use std::num::NonZeroUsize;

mod load;

pub use self::load::*;

#[derive(Debug, Clone, PartialEq)]
pub struct DataFrame {
	pub columns: Vec<Column>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Column {
	Number(NumberColumn),
	Enum(EnumColumn),
}

#[derive(Debug, Clone, PartialEq)]
pub struct NumberColumn {
	pub name: String,
	pub data: Vec<f32>,
}

/// Enum values are stored 1-based so that `None` can represent a missing or invalid value. The value `Some(n)` refers to `options[n - 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumColumn {
	pub name: String,
	pub options: Vec<String>,
	pub data: Vec<Option<NonZeroUsize>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ColumnType {
	Number,
	Enum { options: Vec<String> },
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Value {
	Number(f32),
	Enum(Option<NonZeroUsize>),
}

impl Value {
	pub fn as_number(&self) -> Option<f32> {
		match self {
			Self::Number(value) => Some(*value),
			_ => None,
		}
	}

	pub fn as_enum(&self) -> Option<Option<NonZeroUsize>> {
		match self {
			Self::Enum(value) => Some(*value),
			_ => None,
		}
	}
}

impl DataFrame {
	pub fn new(column_names: Vec<String>, column_types: Vec<ColumnType>) -> Self {
		let columns = izip!(column_names, column_types)
			.map(|(column_name, column_type)| match column_type {
				ColumnType::Number => Column::Number(NumberColumn::new(column_name)),
				ColumnType::Enum { options } => Column::Enum(EnumColumn::new(column_name, options)),
			})
			.collect();
		Self { columns }
	}

	pub fn ncols(&self) -> usize {
		self.columns.len()
	}

	pub fn nrows(&self) -> usize {
		self.columns.first().map(|column| column.len()).unwrap_or(0)
	}

	pub fn column_names(&self) -> Vec<&str> {
		self.columns.iter().map(|column| column.name()).collect()
	}

	pub fn column(&self, name: &str) -> Option<&Column> {
		self.columns.iter().find(|column| column.name() == name)
	}

	/// Append a row. The values must line up with the columns, both in count and in type.
	pub fn push_row(&mut self, values: &[Value]) -> Result<()> {
		if values.len() != self.ncols() {
			return Err(format_err!(
				"expected {} values but got {}",
				self.ncols(),
				values.len()
			));
		}
		// Check every value before mutating so a bad row does not leave the columns with different lengths.
		for (column, value) in izip!(self.columns.iter(), values) {
			match (column, value) {
				(Column::Number(_), Value::Number(_)) | (Column::Enum(_), Value::Enum(_)) => {}
				_ => {
					return Err(format_err!(
						"value {:?} does not match the type of column {}",
						value,
						column.name()
					))
				}
			}
		}
		for (column, value) in izip!(self.columns.iter_mut(), values) {
			match (column, value) {
				(Column::Number(column), Value::Number(value)) => column.data.push(*value),
				(Column::Enum(column), Value::Enum(value)) => column.data.push(*value),
				_ => unreachable!(),
			}
		}
		Ok(())
	}

	/// Convert the columnar data into a row major matrix of values, with shape (n_rows, n_columns).
	pub fn to_rows(&self) -> Array2<Value> {
		let mut rows = Array2::from_elem((self.nrows(), self.ncols()), Value::Number(0.0));
		for (mut ndarray_column, dataframe_column) in
			izip!(rows.gencolumns_mut(), self.columns.iter())
		{
			match dataframe_column {
				Column::Number(column) => {
					for (a, b) in izip!(ndarray_column.iter_mut(), column.data.iter()) {
						*a = Value::Number(*b);
					}
				}
				Column::Enum(column) => {
					for (a, b) in izip!(ndarray_column.iter_mut(), column.data.iter()) {
						*a = Value::Enum(*b);
					}
				}
			}
		}
		rows
	}
}

impl Column {
	pub fn len(&self) -> usize {
		match self {
			Self::Number(s) => s.data.len(),
			Self::Enum(s) => s.data.len(),
		}
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	pub fn name(&self) -> &str {
		match self {
			Self::Number(s) => s.name.as_str(),
			Self::Enum(s) => s.name.as_str(),
		}
	}

	pub fn as_number(&self) -> Option<&NumberColumn> {
		match self {
			Self::Number(s) => Some(s),
			_ => None,
		}
	}

	pub fn as_enum(&self) -> Option<&EnumColumn> {
		match self {
			Self::Enum(s) => Some(s),
			_ => None,
		}
	}

	/// Format the value at `index` for display. Enum values are shown by their option name.
	pub fn display_value(&self, index: usize) -> String {
		match self {
			Self::Number(column) => match column.data.get(index) {
				Some(value) => value.to_string(),
				None => String::new(),
			},
			Self::Enum(column) => column
				.data
				.get(index)
				.and_then(|value| column.option_name(*value))
				.unwrap_or("")
				.to_owned(),
		}
	}
}

impl NumberColumn {
	pub fn new(name: String) -> Self {
		Self {
			name,
			data: Vec::new(),
		}
	}
}

impl EnumColumn {
	pub fn new(name: String, options: Vec<String>) -> Self {
		Self {
			name,
			options,
			data: Vec::new(),
		}
	}

	/// Look up the 1-based value for an option name.
	pub fn value_for_option(&self, option: &str) -> Option<NonZeroUsize> {
		self.options
			.iter()
			.position(|o| o == option)
			.and_then(|index| NonZeroUsize::new(index + 1))
	}

	pub fn option_name(&self, value: Option<NonZeroUsize>) -> Option<&str> {
		value
			.and_then(|value| self.options.get(value.get() - 1))
			.map(|option| option.as_str())
	}
}

#[cfg(test)]
fn test_dataframe() -> DataFrame {
	DataFrame::new(
		vec!["level".to_owned(), "period".to_owned()],
		vec![
			ColumnType::Number,
			ColumnType::Enum {
				options: vec!["Night".to_owned(), "Day".to_owned()],
			},
		],
	)
}

#[test]
fn test_push_row_and_to_rows() {
	let mut df = test_dataframe();
	df.push_row(&[Value::Number(1.5), Value::Enum(NonZeroUsize::new(2))])
		.unwrap();
	df.push_row(&[Value::Number(-3.0), Value::Enum(None)]).unwrap();
	assert_eq!(df.nrows(), 2);
	assert_eq!(df.ncols(), 2);
	let rows = df.to_rows();
	assert_eq!(rows.shape(), &[2, 2]);
	assert_eq!(rows[[0, 0]], Value::Number(1.5));
	assert_eq!(rows[[0, 1]], Value::Enum(NonZeroUsize::new(2)));
	assert_eq!(rows[[1, 0]], Value::Number(-3.0));
	assert_eq!(rows[[1, 1]], Value::Enum(None));
	assert_eq!(df.columns[1].display_value(0), "Day");
	assert_eq!(df.columns[1].display_value(1), "");
}

#[test]
fn test_push_row_rejects_mismatched_values() {
	let mut df = test_dataframe();
	assert!(df.push_row(&[Value::Number(1.0)]).is_err());
	assert!(df
		.push_row(&[Value::Enum(None), Value::Number(1.0)])
		.is_err());
	// A rejected row leaves every column untouched.
	assert_eq!(df.nrows(), 0);
	assert!(df.columns.iter().all(|column| column.is_empty()));
}

#[test]
fn test_enum_option_lookup() {
	let df = test_dataframe();
	let column = df.column("period").unwrap().as_enum().unwrap();
	assert_eq!(column.value_for_option("Day"), NonZeroUsize::new(2));
	assert_eq!(column.value_for_option("Dusk"), None);
	assert_eq!(column.option_name(NonZeroUsize::new(1)), Some("Night"));
	assert_eq!(column.option_name(NonZeroUsize::new(3)), None);
}
