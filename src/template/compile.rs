use std::borrow::Cow;
use std::ops::Range;

use super::{Segment, Template};
use crate::error::{self, CompileError};
use crate::Options;

impl<'a> Template<'a> {
	/// Compile a template from a string slice.
	///
	/// The text can contain macros of the form `$name$` or `$name:argument$`,
	/// which are looked up later when you call [`Self::expand()`].
	/// The delimiter and argument separator are taken from `options`.
	///
	/// Fails if the text is empty.
	#[inline]
	pub fn compile(text: &'a str, options: &Options) -> Result<Self, CompileError> {
		compile(Cow::Borrowed(text), options)
	}

	/// Compile a template from a string, taking ownership of it.
	///
	/// If the text contains no escaped delimiters, the string is used as-is without copying.
	///
	/// Fails if the text is empty.
	#[inline]
	pub fn compile_string(text: String, options: &Options) -> Result<Template<'static>, CompileError> {
		compile(Cow::Owned(text), options)
	}
}

fn compile<'a>(text: Cow<'a, str>, options: &Options) -> Result<Template<'a>, CompileError> {
	if text.is_empty() {
		return Err(error::EmptyTemplate.into());
	}

	let (segments, escapes) = scan(&text, options);
	let template = if escapes == 0 {
		Template {
			text,
			segments,
			options: *options,
		}
	} else {
		let (text, segments) = unescape(&text, &segments, escapes, options);
		Template {
			text: Cow::Owned(text),
			segments,
			options: *options,
		}
	};

	tracing::trace!(segments = template.segments.len(), escapes, "compiled template");
	Ok(template)
}

/// Split the source into segments with ranges into the source.
///
/// Escaped delimiters are emitted as [`Segment::Delimiter`] and counted.
/// Directly adjacent constants are already merged.
fn scan(source: &str, options: &Options) -> (Vec<Segment>, usize) {
	let source = source.as_bytes();
	let delimiter = CharFinder::new(options.delimiter);
	let separator = CharFinder::new(options.argument_separator);

	let mut segments = Vec::with_capacity(1);
	let mut escapes = 0;
	let mut finger = 0;
	while finger < source.len() {
		let open = match delimiter.find(&source[finger..]) {
			Some(x) => finger + x,
			None => {
				push_constant(&mut segments, finger..source.len());
				break;
			},
		};

		if open != finger {
			push_constant(&mut segments, finger..open);
		}

		// Without a closing delimiter, the rest of the text is literal, including the opening delimiter.
		let body_start = open + delimiter.len();
		let close = match delimiter.find(&source[body_start..]) {
			Some(x) => body_start + x,
			None => {
				push_constant(&mut segments, open..source.len());
				break;
			},
		};

		if close == body_start {
			segments.push(Segment::Delimiter);
			escapes += 1;
		} else {
			let (name, argument) = match separator.find(&source[body_start..close]) {
				Some(x) => {
					let name_end = body_start + x;
					(body_start..name_end, Some(name_end + separator.len()..close))
				},
				None => (body_start..close, None),
			};
			segments.push(Segment::Macro { name, argument });
		}
		finger = close + delimiter.len();
	}

	(segments, escapes)
}

/// Add a constant, extending the previous constant if it ends where this one starts.
fn push_constant(segments: &mut Vec<Segment>, range: Range<usize>) {
	if let Some(Segment::Constant(last)) = segments.last_mut() {
		if last.end == range.start {
			last.end = range.end;
			return;
		}
	}
	segments.push(Segment::Constant(range));
}

/// Rewrite the source with every escaped delimiter collapsed to one delimiter.
///
/// Every maximal run of constants and escaped delimiters becomes a single constant,
/// except a lone escaped delimiter between macros, which stays a [`Segment::Delimiter`].
///
/// Returns the new text and the segments pointing into it.
fn unescape(source: &str, scanned: &[Segment], escapes: usize, options: &Options) -> (String, Vec<Segment>) {
	let delimiter = options.delimiter;
	let delimiter_len = delimiter.len_utf8();
	let separator_len = options.argument_separator.len_utf8();

	let mut text = String::with_capacity(source.len() - escapes * delimiter_len);
	let mut segments = Vec::with_capacity(scanned.len());
	let mut index = 0;
	while index < scanned.len() {
		if let Segment::Macro { name, argument } = &scanned[index] {
			// Copy the whole placeholder and shift the ranges to the new text.
			let start = name.start - delimiter_len;
			let end = argument.as_ref().map_or(name.end, |x| x.end) + delimiter_len;
			let shift = start - text.len();
			text.push_str(&source[start..end]);
			segments.push(Segment::Macro {
				name: name.start - shift..name.end - shift,
				argument: argument.as_ref().map(|x| x.start - shift..x.end - shift),
			});
			debug_assert!(argument.as_ref().map_or(true, |x| x.start == name.end + separator_len));
			index += 1;
			continue;
		}

		let run_end = scanned[index..]
			.iter()
			.position(|segment| matches!(segment, Segment::Macro { .. }))
			.map_or(scanned.len(), |x| index + x);
		let run = &scanned[index..run_end];

		if run.len() == 1 && scanned.len() > 1 && run[0] == Segment::Delimiter {
			text.push(delimiter);
			segments.push(Segment::Delimiter);
		} else {
			let start = text.len();
			for segment in run {
				match segment {
					Segment::Constant(range) => text.push_str(&source[range.clone()]),
					Segment::Delimiter => text.push(delimiter),
					Segment::Macro { .. } => unreachable!("runs never contain macros"),
				}
			}
			segments.push(Segment::Constant(start..text.len()));
		}
		index = run_end;
	}

	(text, segments)
}

/// Finds a single character in UTF-8 encoded text.
struct CharFinder {
	encoded: [u8; 4],
	len: usize,
}

impl CharFinder {
	fn new(c: char) -> Self {
		let mut encoded = [0; 4];
		let len = c.encode_utf8(&mut encoded).len();
		Self { encoded, len }
	}

	/// The length of the encoded character in bytes.
	#[inline]
	fn len(&self) -> usize {
		self.len
	}

	/// Find the byte offset of the first occurrence of the character.
	#[inline]
	fn find(&self, haystack: &[u8]) -> Option<usize> {
		if self.len == 1 {
			memchr::memchr(self.encoded[0], haystack)
		} else {
			memchr::memmem::find(haystack, &self.encoded[..self.len])
		}
	}
}
