//! Support for macro expansion in TOML data.

use serde::de::DeserializeOwned;

use crate::{MacroMap, Options};

/// Parse a struct from TOML data, after expanding macros in string values.
///
/// This function first parses the data into a [`toml::Value`],
/// then expands the macros in all string values using the default [`Options`],
/// and then parses it further into the desired type.
pub fn from_slice<T: DeserializeOwned, M>(data: &[u8], macros: &M) -> Result<T, Error>
where
	M: MacroMap + ?Sized,
{
	from_str(std::str::from_utf8(data)?, macros)
}

/// Parse a struct from TOML data, after expanding macros in string values.
///
/// This function first parses the data into a [`toml::Value`],
/// then expands the macros in all string values using the default [`Options`],
/// and then parses it further into the desired type.
pub fn from_str<T: DeserializeOwned, M>(data: &str, macros: &M) -> Result<T, Error>
where
	M: MacroMap + ?Sized,
{
	let mut value: toml::Value = toml::from_str(data)?;
	expand_string_values(&mut value, &Options::default(), macros);
	Ok(T::deserialize(value)?)
}

/// Expand macros in all string values of a TOML value.
///
/// Table keys and datetime values are not expanded.
pub fn expand_string_values<M>(value: &mut toml::Value, options: &Options, macros: &M)
where
	M: MacroMap + ?Sized,
{
	visit_string_values(value, |value| super::expand_in_place(value, options, macros))
}

/// Error for parsing TOML with macro expansion.
#[derive(Debug)]
pub enum Error {
	/// The input contains invalid UTF-8.
	InvalidUtf8(std::str::Utf8Error),

	/// An error occurred while parsing TOML.
	Toml(toml::de::Error),
}

impl From<std::str::Utf8Error> for Error {
	#[inline]
	fn from(other: std::str::Utf8Error) -> Self {
		Self::InvalidUtf8(other)
	}
}

impl From<toml::de::Error> for Error {
	#[inline]
	fn from(other: toml::de::Error) -> Self {
		Self::Toml(other)
	}
}

impl std::error::Error for Error {}

impl std::fmt::Display for Error {
	#[inline]
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::InvalidUtf8(e) => std::fmt::Display::fmt(e, f),
			Self::Toml(e) => std::fmt::Display::fmt(e, f),
		}
	}
}

/// Recursively apply a function to all string values in a TOML value.
fn visit_string_values<F>(value: &mut toml::Value, fun: F)
where
	F: Copy + Fn(&mut String),
{
	match value {
		toml::Value::Boolean(_) => (),
		toml::Value::Integer(_) => (),
		toml::Value::Float(_) => (),
		toml::Value::Datetime(_) => (),
		toml::Value::String(val) => fun(val),
		toml::Value::Array(seq) => {
			for value in seq {
				visit_string_values(value, fun);
			}
		},
		toml::Value::Table(map) => {
			for (_key, value) in map.iter_mut() {
				visit_string_values(value, fun);
			}
		},
	}
}

#[cfg(test)]
#[rustfmt::skip]
mod test {
	use super::*;
	use crate::{NoMacros, Registry};
	use assert2::{assert, let_assert};

	#[derive(Debug, serde::Deserialize)]
	struct Struct {
		bar: String,
		baz: String,
	}

	fn registry() -> Registry {
		let mut builder = Registry::builder();
		let_assert!(Ok(_) = builder.add_macro("bar", "aap"));
		let_assert!(Ok(_) = builder.add_macro("baz", "noot"));
		let_assert!(Ok(registry) = builder.build());
		registry
	}

	#[test]
	fn test_from_str() {
		let_assert!(Ok(parsed) = from_str(
			concat!(
				"bar = \"$bar$\"\n",
				"baz = \"$baz$/with/stuff\"\n",
			),
			&registry(),
		));

		let parsed: Struct = parsed;
		assert!(parsed.bar == "aap");
		assert!(parsed.baz == "noot/with/stuff");
	}

	#[test]
	fn test_from_str_no_macros() {
		let_assert!(Ok(parsed) = from_str(
			concat!(
				"bar = \"aap\"\n",
				"baz = \"noot/with/$$stuff\"\n",
			),
			&NoMacros,
		));

		let parsed: Struct = parsed;
		assert!(parsed.bar == "aap");
		assert!(parsed.baz == "noot/with/$stuff");
	}

	#[test]
	fn test_toml_in_macro_is_not_parsed() {
		let mut builder = Registry::builder();
		let_assert!(Ok(_) = builder.add_macro("bar", "aap\nbaz = \"mies\""));
		let_assert!(Ok(registry) = builder.build());
		let_assert!(Ok(parsed) = from_str(
			concat!(
				"bar = \"$bar$\"\n",
				"baz = \"noot\"\n",
			),
			&registry,
		));

		let parsed: Struct = parsed;
		assert!(parsed.bar == "aap\nbaz = \"mies\"");
		assert!(parsed.baz == "noot");
	}

	#[test]
	fn test_nested_tables() {
		let_assert!(Ok(mut value) = toml::from_str::<toml::Value>(concat!(
			"list = [\"$bar$\", 3]\n",
			"[section]\n",
			"name = \"$baz$\"\n",
		)));
		expand_string_values(&mut value, &Options::default(), &registry());
		let_assert!(Some(section) = value.get("section"));
		assert!(section.get("name").and_then(|x| x.as_str()) == Some("noot"));
		let_assert!(Some(list) = value.get("list").and_then(|x| x.as_array()));
		assert!(list[0].as_str() == Some("aap"));
		assert!(list[1].as_integer() == Some(3));
	}

	#[test]
	fn test_invalid_utf8() {
		let_assert!(Err(Error::InvalidUtf8(_)) = from_slice::<Struct, _>(b"bar = \"\xff\"", &NoMacros));
	}
}
