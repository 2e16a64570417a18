//! Support for macro expansion in YAML data.

use serde::de::DeserializeOwned;

use crate::{MacroMap, Options};

/// Parse a struct from YAML data, after expanding macros in string values.
///
/// This function first parses the data into a [`serde_yaml::Value`],
/// then expands the macros in all string values using the default [`Options`],
/// and then parses it further into the desired type.
pub fn from_slice<T: DeserializeOwned, M>(data: &[u8], macros: &M) -> Result<T, Error>
where
	M: MacroMap + ?Sized,
{
	let mut value: serde_yaml::Value = serde_yaml::from_slice(data)?;
	expand_string_values(&mut value, &Options::default(), macros);
	Ok(serde_yaml::from_value(value)?)
}

/// Parse a struct from YAML data, after expanding macros in string values.
///
/// This function first parses the data into a [`serde_yaml::Value`],
/// then expands the macros in all string values using the default [`Options`],
/// and then parses it further into the desired type.
pub fn from_str<T: DeserializeOwned, M>(data: &str, macros: &M) -> Result<T, Error>
where
	M: MacroMap + ?Sized,
{
	let mut value: serde_yaml::Value = serde_yaml::from_str(data)?;
	expand_string_values(&mut value, &Options::default(), macros);
	Ok(serde_yaml::from_value(value)?)
}

/// Expand macros in all string values of a YAML value.
///
/// Mapping keys are not expanded, tagged values are.
pub fn expand_string_values<M>(value: &mut serde_yaml::Value, options: &Options, macros: &M)
where
	M: MacroMap + ?Sized,
{
	visit_string_values(value, |value| super::expand_in_place(value, options, macros))
}

/// Error for parsing YAML with macro expansion.
#[derive(Debug)]
pub enum Error {
	/// An error occurred while parsing YAML.
	Yaml(serde_yaml::Error),
}

impl From<serde_yaml::Error> for Error {
	#[inline]
	fn from(other: serde_yaml::Error) -> Self {
		Self::Yaml(other)
	}
}

impl std::error::Error for Error {}

impl std::fmt::Display for Error {
	#[inline]
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Error::Yaml(e) => std::fmt::Display::fmt(e, f),
		}
	}
}

/// Recursively apply a function to all string values in a YAML value.
fn visit_string_values<F>(value: &mut serde_yaml::Value, fun: F)
where
	F: Copy + Fn(&mut String),
{
	match value {
		serde_yaml::Value::Null => (),
		serde_yaml::Value::Bool(_) => (),
		serde_yaml::Value::Number(_) => (),
		serde_yaml::Value::String(val) => fun(val),
		serde_yaml::Value::Tagged(tagged) => visit_string_values(&mut tagged.value, fun),
		serde_yaml::Value::Sequence(seq) => {
			for value in seq {
				visit_string_values(value, fun);
			}
		},
		serde_yaml::Value::Mapping(map) => {
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
		let_assert!(Ok(_) = builder.add_macro_fn("baz", |argument| Ok(format!("noot{}", argument.unwrap_or_default()))));
		let_assert!(Ok(registry) = builder.build());
		registry
	}

	#[test]
	fn test_from_str() {
		let_assert!(Ok(parsed) = from_str("bar: $bar$\nbaz: $baz:/with/stuff$", &registry()));

		let parsed: Struct = parsed;
		assert!(parsed.bar == "aap");
		assert!(parsed.baz == "noot/with/stuff");
	}

	#[test]
	fn test_from_slice_no_macros() {
		let_assert!(Ok(parsed) = from_slice(b"bar: aap\nbaz: noot$$", &NoMacros));

		let parsed: Struct = parsed;
		assert!(parsed.bar == "aap");
		assert!(parsed.baz == "noot$");
	}

	#[test]
	fn test_yaml_in_macro_is_not_parsed() {
		let mut builder = Registry::builder();
		let_assert!(Ok(_) = builder.add_macro("bar", "aap\nbaz: mies"));
		let_assert!(Ok(registry) = builder.build());
		let_assert!(Ok(parsed) = from_str("bar: $bar$\nbaz: noot", &registry));

		let parsed: Struct = parsed;
		assert!(parsed.bar == "aap\nbaz: mies");
		assert!(parsed.baz == "noot");
	}

	#[test]
	fn test_sequences_and_tags() {
		let_assert!(Ok(mut value) = serde_yaml::from_str::<serde_yaml::Value>("list: [$bar$, 7]\ntagged: !Custom $baz$"));
		expand_string_values(&mut value, &Options::default(), &registry());
		assert!(value["list"][0].as_str() == Some("aap"));
		assert!(value["list"][1].as_u64() == Some(7));
		let_assert!(serde_yaml::Value::Tagged(tagged) = &value["tagged"]);
		assert!(tagged.value.as_str() == Some("noot"));
	}
}
