use std::borrow::Cow;
use std::ops::Range;

use crate::error::CompileError;
use crate::Options;

mod compile;
mod expand;

/// A compiled macro template.
///
/// You can compile the template once and call [`Self::expand()`] multiple times.
/// This is generally more efficient than calling [`expand_macros()`][crate::expand_macros] multiple times on the same string.
///
/// Macros have the form `$name$` or `$name:argument$`.
/// Two consecutive delimiters (`$$`) expand to one literal delimiter.
/// A delimiter without a matching closing delimiter is kept as literal text.
///
/// The template borrows the source text if it contains no escaped delimiters.
/// Otherwise it owns a copy of the text in which every escaped delimiter is collapsed to a single delimiter.
/// Use [`Self::into_owned()`] to get a template that is independent of the source text.
#[derive(Clone, PartialEq, Eq)]
pub struct Template<'a> {
	/// The unescaped text that all segments point into.
	text: Cow<'a, str>,

	/// The segments that make up the template, in order.
	segments: Vec<Segment>,

	/// The options used to compile the template.
	options: Options,
}

/// One piece of a compiled template.
///
/// Ranges are byte ranges into [`Template::text()`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
	/// Literal text, copied verbatim at expansion time.
	Constant(Range<usize>),

	/// A macro to be looked up at expansion time.
	Macro {
		/// The range of the macro name.
		name: Range<usize>,

		/// The range of the argument.
		///
		/// This is `None` if the placeholder did not contain an argument separator.
		argument: Option<Range<usize>>,
	},

	/// A single literal delimiter, written as two delimiters in the source.
	Delimiter,
}

/// The kind of a [`Segment`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SegmentKind {
	/// Literal text.
	Constant,

	/// A macro placeholder.
	Macro,

	/// An escaped delimiter.
	Delimiter,
}

impl Segment {
	/// Get the kind of the segment.
	#[inline]
	pub fn kind(&self) -> SegmentKind {
		match self {
			Self::Constant(_) => SegmentKind::Constant,
			Self::Macro { .. } => SegmentKind::Macro,
			Self::Delimiter => SegmentKind::Delimiter,
		}
	}

	/// Get the text range of the segment: the literal text for constants and the name for macros.
	///
	/// Delimiter segments carry no text.
	#[inline]
	pub fn text_range(&self) -> Option<Range<usize>> {
		match self {
			Self::Constant(range) => Some(range.clone()),
			Self::Macro { name, .. } => Some(name.clone()),
			Self::Delimiter => None,
		}
	}

	/// Get the argument range of a macro segment.
	#[inline]
	pub fn argument_range(&self) -> Option<Range<usize>> {
		match self {
			Self::Macro { argument, .. } => argument.clone(),
			_ => None,
		}
	}
}

/// A segment resolved against the text of its template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Part<'a> {
	/// Literal text.
	Constant(&'a str),

	/// A macro placeholder.
	Macro {
		/// The macro name.
		name: &'a str,

		/// The macro argument, if the placeholder had one.
		argument: Option<&'a str>,
	},

	/// A literal delimiter character.
	Delimiter(char),
}

impl std::fmt::Debug for Template<'_> {
	#[inline]
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_tuple("Template").field(&self.text).finish()
	}
}

impl<'a> Template<'a> {
	/// Compile a template from a string slice with the default [`Options`].
	///
	/// Fails if the text is empty.
	#[inline]
	#[allow(clippy::should_implement_trait)]
	pub fn from_str(text: &'a str) -> Result<Self, CompileError> {
		Self::compile(text, &Options::default())
	}

	/// Get the unescaped text of the template.
	///
	/// Constant text appears as it will be expanded,
	/// macros appear in their original placeholder form.
	#[inline]
	pub fn text(&self) -> &str {
		&self.text
	}

	/// Get the options the template was compiled with.
	#[inline]
	pub fn options(&self) -> &Options {
		&self.options
	}

	/// Get the compiled segments.
	#[inline]
	pub fn segments(&self) -> &[Segment] {
		&self.segments
	}

	/// Iterate over the segments, resolved against the template text.
	pub fn parts(&self) -> impl ExactSizeIterator<Item = Part<'_>> + '_ {
		self.segments.iter().map(move |segment| self.resolve(segment))
	}

	/// Resolve a single segment against the template text.
	#[inline]
	fn resolve(&self, segment: &Segment) -> Part<'_> {
		match segment {
			Segment::Constant(range) => Part::Constant(&self.text[range.clone()]),
			Segment::Macro { name, argument } => Part::Macro {
				name: &self.text[name.clone()],
				argument: argument.clone().map(|range| &self.text[range]),
			},
			Segment::Delimiter => Part::Delimiter(self.options.delimiter),
		}
	}

	/// Detach the template from the source text.
	pub fn into_owned(self) -> Template<'static> {
		Template {
			text: Cow::Owned(self.text.into_owned()),
			segments: self.segments,
			options: self.options,
		}
	}
}

/// Write the template back in source form.
///
/// Literal delimiters are escaped again,
/// so compiling the output with the same options gives an equivalent template.
impl std::fmt::Display for Template<'_> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		use std::fmt::Write;

		let delimiter = self.options.delimiter;
		for part in self.parts() {
			match part {
				Part::Constant(text) => {
					for c in text.chars() {
						if c == delimiter {
							f.write_char(delimiter)?;
						}
						f.write_char(c)?;
					}
				},
				Part::Macro { name, argument } => {
					f.write_char(delimiter)?;
					f.write_str(name)?;
					if let Some(argument) = argument {
						f.write_char(self.options.argument_separator)?;
						f.write_str(argument)?;
					}
					f.write_char(delimiter)?;
				},
				Part::Delimiter(c) => {
					f.write_char(c)?;
					f.write_char(c)?;
				},
			}
		}
		Ok(())
	}
}
