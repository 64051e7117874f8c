use num_traits::Float;
use std::cmp::{Ord, Ordering};
use thiserror::Error;

/// A float that is known not to be NaN or infinite, which makes it totally ordered.
#[derive(Clone, Copy, Debug)]
pub struct Finite<T>(T)
where
	T: Float;

#[derive(Debug, Error)]
#[error("not finite")]
pub struct NotFiniteError;

impl<T> Finite<T>
where
	T: Float,
{
	pub fn new(value: T) -> Result<Self, NotFiniteError> {
		if value.is_finite() {
			Ok(Self(value))
		} else {
			Err(NotFiniteError)
		}
	}

	pub fn get(self) -> T {
		self.0
	}
}

impl<T> std::fmt::Display for Finite<T>
where
	T: Float + std::fmt::Display,
{
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.0)
	}
}

impl<T> PartialEq for Finite<T>
where
	T: Float,
{
	fn eq(&self, other: &Self) -> bool {
		self.0.eq(&other.0)
	}
}

impl<T> Eq for Finite<T> where T: Float {}

impl<T> PartialOrd for Finite<T>
where
	T: Float,
{
	fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
		Some(self.cmp(other))
	}
}

impl<T> Ord for Finite<T>
where
	T: Float,
{
	fn cmp(&self, other: &Self) -> Ordering {
		// Neither value can be NaN, so partial_cmp always succeeds.
		self.0.partial_cmp(&other.0).unwrap_or(Ordering::Equal)
	}
}

/// Return the minimum and maximum of the finite values produced by `values`, skipping NaN and infinities. Returns `None` if there are no finite values.
pub fn finite_bounds<T, I>(values: I) -> Option<(T, T)>
where
	T: Float,
	I: IntoIterator<Item = T>,
{
	let mut bounds: Option<(Finite<T>, Finite<T>)> = None;
	for value in values {
		let value = match Finite::new(value) {
			Ok(value) => value,
			Err(_) => continue,
		};
		bounds = Some(match bounds {
			None => (value, value),
			Some((min, max)) => (min.min(value), max.max(value)),
		});
	}
	bounds.map(|(min, max)| (min.get(), max.get()))
}

#[test]
fn test_finite_rejects_nan() {
	assert!(Finite::new(std::f32::NAN).is_err());
	assert!(Finite::new(std::f32::INFINITY).is_err());
	assert_eq!(Finite::new(1.5f32).unwrap().get(), 1.5);
}

#[test]
fn test_finite_bounds() {
	let values = vec![3.0f32, std::f32::NAN, -1.0, 7.5, std::f32::INFINITY];
	assert_eq!(finite_bounds(values), Some((-1.0, 7.5)));
	assert_eq!(finite_bounds(vec![std::f32::NAN]), None);
	assert_eq!(finite_bounds(Vec::<f64>::new()), None);
}
