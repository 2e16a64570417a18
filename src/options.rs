/// Syntax options shared by the template compiler and the renderer.
///
/// A template remembers the options it was compiled with,
/// so an escaped delimiter always expands to the delimiter of its own template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Options {
	/// The character that opens and closes a macro placeholder.
	///
	/// Two consecutive delimiters expand to one literal delimiter.
	pub delimiter: char,

	/// The character that separates a macro name from its argument.
	pub argument_separator: char,
}

impl Options {
	/// The default delimiter: `$`.
	pub const DEFAULT_DELIMITER: char = '$';

	/// The default argument separator: `:`.
	pub const DEFAULT_ARGUMENT_SEPARATOR: char = ':';

	/// Create options with a custom delimiter and argument separator.
	pub const fn new(delimiter: char, argument_separator: char) -> Self {
		Self {
			delimiter,
			argument_separator,
		}
	}
}

impl Default for Options {
	#[inline]
	fn default() -> Self {
		Self::new(Self::DEFAULT_DELIMITER, Self::DEFAULT_ARGUMENT_SEPARATOR)
	}
}

#[cfg(test)]
mod test {
	use super::*;
	use assert2::assert;

	#[test]
	fn default_options() {
		let options = Options::default();
		assert!(options.delimiter == '$');
		assert!(options.argument_separator == ':');
	}
}
