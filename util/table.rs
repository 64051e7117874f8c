use itertools::izip;

/// A plain text table with a header row, rendered with `|` column separators.
pub struct Table {
	padding: usize,
	header: Vec<String>,
	rows: Vec<Vec<String>>,
}

impl Table {
	pub fn new(header: Vec<String>, rows: Vec<Vec<String>>) -> Self {
		Self {
			padding: 1,
			header,
			rows,
		}
	}

	pub fn padding(mut self, padding: usize) -> Self {
		self.padding = padding;
		self
	}

	pub fn n_rows(&self) -> usize {
		self.rows.len()
	}

	fn column_widths(&self) -> Vec<usize> {
		let mut column_widths: Vec<usize> = self.header.iter().map(|h| text_width(h)).collect();
		for row in self.rows.iter() {
			for (column_width, value) in column_widths.iter_mut().zip(row.iter()) {
				*column_width = usize::max(*column_width, text_width(value));
			}
		}
		column_widths
	}
}

impl std::fmt::Display for Table {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		let column_widths = self.column_widths();
		let line = Line {
			column_widths: &column_widths,
			padding: self.padding,
		};
		let header = Row {
			column_widths: &column_widths,
			padding: self.padding,
			values: &self.header,
		};
		writeln!(f, "{}", header)?;
		writeln!(f, "{}", line)?;
		for values in self.rows.iter() {
			let row = Row {
				column_widths: &column_widths,
				padding: self.padding,
				values,
			};
			writeln!(f, "{}", row)?;
		}
		Ok(())
	}
}

fn text_width(value: &str) -> usize {
	value.chars().count()
}

struct Line<'a> {
	column_widths: &'a [usize],
	padding: usize,
}

impl<'a> std::fmt::Display for Line<'a> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "|")?;
		for column_width in self.column_widths.iter() {
			for _ in 0..column_width + 2 * self.padding {
				write!(f, "-")?;
			}
			write!(f, "|")?;
		}
		Ok(())
	}
}

struct Row<'a> {
	column_widths: &'a [usize],
	padding: usize,
	values: &'a [String],
}

impl<'a> std::fmt::Display for Row<'a> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "|")?;
		for (column_width, value) in izip!(self.column_widths, self.values) {
			for _ in 0..self.padding {
				write!(f, " ")?;
			}
			write!(f, "{}", value)?;
			for _ in 0..column_width + self.padding - text_width(value) {
				write!(f, " ")?;
			}
			write!(f, "|")?;
		}
		// Rows shorter than the header are padded with empty cells.
		for column_width in self.column_widths.iter().skip(self.values.len()) {
			for _ in 0..column_width + 2 * self.padding {
				write!(f, " ")?;
			}
			write!(f, "|")?;
		}
		Ok(())
	}
}

#[cfg(test)]
fn strings(values: &[&str]) -> Vec<String> {
	values.iter().map(|value| value.to_string()).collect()
}

#[test]
fn test_table() {
	let table = Table::new(
		strings(&["a", "bb"]),
		vec![strings(&["1", "2"]), strings(&["333", "4"])],
	);
	insta::assert_snapshot!(table.to_string(), @r###"
 | a   | bb |
 |-----|----|
 | 1   | 2  |
 | 333 | 4  |
 "###);
}

#[test]
fn test_table_short_row() {
	let table = Table::new(strings(&["x", "y"]), vec![strings(&["10"])]).padding(0);
	assert_eq!(table.n_rows(), 1);
	assert_eq!(table.to_string(), "|x |y|\n|--|-|\n|10| |\n");
}
