//! Support for macro expansion in JSON data.

use serde::de::DeserializeOwned;

use crate::{MacroMap, Options};

/// Parse a struct from JSON data, after expanding macros in string values.
///
/// This function first parses the data into a [`serde_json::Value`],
/// then expands the macros in all string values using the default [`Options`],
/// and then parses it further into the desired type.
pub fn from_slice<T: DeserializeOwned, M>(data: &[u8], macros: &M) -> Result<T, Error>
where
	M: MacroMap + ?Sized,
{
	let mut value: serde_json::Value = serde_json::from_slice(data)?;
	expand_string_values(&mut value, &Options::default(), macros);
	Ok(T::deserialize(value)?)
}

/// Parse a struct from JSON data, after expanding macros in string values.
///
/// This function first parses the data into a [`serde_json::Value`],
/// then expands the macros in all string values using the default [`Options`],
/// and then parses it further into the desired type.
pub fn from_str<T: DeserializeOwned, M>(data: &str, macros: &M) -> Result<T, Error>
where
	M: MacroMap + ?Sized,
{
	let mut value: serde_json::Value = serde_json::from_str(data)?;
	expand_string_values(&mut value, &Options::default(), macros);
	Ok(T::deserialize(value)?)
}

/// Expand macros in all string values of a JSON value.
///
/// Object keys are not expanded.
pub fn expand_string_values<M>(value: &mut serde_json::Value, options: &Options, macros: &M)
where
	M: MacroMap + ?Sized,
{
	visit_string_values(value, |value| super::expand_in_place(value, options, macros))
}

/// Error for parsing JSON with macro expansion.
#[derive(Debug)]
pub enum Error {
	/// An error occurred while parsing JSON.
	Json(serde_json::Error),
}

impl From<serde_json::Error> for Error {
	#[inline]
	fn from(other: serde_json::Error) -> Self {
		Self::Json(other)
	}
}

impl std::error::Error for Error {}

impl std::fmt::Display for Error {
	#[inline]
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::Json(e) => std::fmt::Display::fmt(e, f),
		}
	}
}

/// Recursively apply a function to all string values in a JSON value.
fn visit_string_values<F>(value: &mut serde_json::Value, fun: F)
where
	F: Copy + Fn(&mut String),
{
	match value {
		serde_json::Value::Null => (),
		serde_json::Value::Bool(_) => (),
		serde_json::Value::Number(_) => (),
		serde_json::Value::String(val) => fun(val),
		serde_json::Value::Array(seq) => {
			for value in seq {
				visit_string_values(value, fun);
			}
		},
		serde_json::Value::Object(map) => {
			for value in map.values_mut() {
				visit_string_values(value, fun);
			}
		},
	}
}
