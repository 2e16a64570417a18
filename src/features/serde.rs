use std::marker::PhantomData;

use serde::{
	de::{Error, Visitor},
	Deserialize,
	Deserializer,
	Serialize,
	Serializer,
};

use crate::{Options, Template};

struct TemplateVisitor<'a> {
	_lifetime: PhantomData<&'a ()>,
}

impl<'a> TemplateVisitor<'a> {
	const fn new() -> Self {
		Self { _lifetime: PhantomData }
	}
}

impl<'de: 'a, 'a> Visitor<'de> for TemplateVisitor<'a> {
	type Value = Template<'a>;

	fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
		formatter.write_str("a non-empty string")
	}

	fn visit_borrowed_str<E>(self, v: &'de str) -> Result<Self::Value, E>
	where
		E: Error,
	{
		Template::from_str(v).map_err(E::custom)
	}

	fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
	where
		E: Error,
	{
		self.visit_string(v.to_owned())
	}

	fn visit_string<E>(self, v: String) -> Result<Self::Value, E>
	where
		E: Error,
	{
		Template::compile_string(v, &Options::default()).map_err(E::custom)
	}
}

/// Serializes the template in source form, with literal delimiters escaped again.
impl Serialize for Template<'_> {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		serializer.collect_str(self)
	}
}

/// Compiles the template with the default [`Options`].
///
/// The template borrows from the input if the deserializer allows it and the text contains no escaped delimiters.
impl<'de: 'a, 'a> Deserialize<'de> for Template<'a> {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: Deserializer<'de>,
	{
		deserializer.deserialize_str(TemplateVisitor::new())
	}
}
