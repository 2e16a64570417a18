use std::fmt::Write as _;

use super::{Segment, Template};
use crate::MacroMap;

impl Template<'_> {
	/// Expand the template into a new string.
	///
	/// Every macro is replaced by its value from the given macro map.
	/// Unknown macros expand to nothing,
	/// and escaped delimiters expand to a single delimiter.
	pub fn expand<M>(&self, macros: &M) -> String
	where
		M: MacroMap + ?Sized,
	{
		let mut output = String::with_capacity(self.text.len() + self.text.len() / 10);
		// Writing to a String can not fail.
		let _ = self.expand_to_fmt(macros, &mut output);
		output
	}

	/// Expand the template into a [`std::fmt::Write`] sink.
	///
	/// Constant text is written straight from the template without intermediate copies.
	/// The only errors come from the sink itself.
	pub fn expand_to_fmt<M, W>(&self, macros: &M, output: &mut W) -> std::fmt::Result
	where
		M: MacroMap + ?Sized,
		W: std::fmt::Write + ?Sized,
	{
		for segment in &self.segments {
			match segment {
				Segment::Constant(range) => output.write_str(&self.text[range.clone()])?,
				Segment::Delimiter => output.write_char(self.options.delimiter)?,
				Segment::Macro { name, argument } => {
					let name = &self.text[name.clone()];
					let argument = argument.clone().map(|range| &self.text[range]);
					match macros.get_macro_value(name, argument) {
						Some(value) => output.write_str(&value)?,
						None => tracing::trace!(name, "unknown macro expands to nothing"),
					}
				},
			}
		}
		Ok(())
	}

	/// Expand the template into a [`std::io::Write`] sink.
	///
	/// The output is identical to [`Self::expand()`].
	/// Every segment results in a separate write,
	/// so you may want to wrap unbuffered sinks in a [`std::io::BufWriter`].
	pub fn expand_to_io<M, W>(&self, macros: &M, output: &mut W) -> std::io::Result<()>
	where
		M: MacroMap + ?Sized,
		W: std::io::Write + ?Sized,
	{
		let mut adapter = IoAdapter { inner: output, error: None };
		match self.expand_to_fmt(macros, &mut adapter) {
			Ok(()) => Ok(()),
			Err(std::fmt::Error) => Err(adapter
				.error
				.unwrap_or_else(|| std::io::Error::new(std::io::ErrorKind::Other, "formatter error"))),
		}
	}
}

/// Forwards [`std::fmt::Write`] calls to a [`std::io::Write`] and keeps the first I/O error.
struct IoAdapter<'a, W: ?Sized> {
	inner: &'a mut W,
	error: Option<std::io::Error>,
}

impl<W: std::io::Write + ?Sized> std::fmt::Write for IoAdapter<'_, W> {
	fn write_str(&mut self, s: &str) -> std::fmt::Result {
		self.inner.write_all(s.as_bytes()).map_err(|e| {
			self.error = Some(e);
			std::fmt::Error
		})
	}
}
