//! Module containing error details.

/// An error that can occur while compiling a template.
#[derive(Debug, Clone)]
#[cfg_attr(test, derive(Eq, PartialEq))]
pub enum CompileError {
	/// The template text is empty.
	EmptyTemplate(EmptyTemplate),
}

impl From<EmptyTemplate> for CompileError {
	#[inline]
	fn from(other: EmptyTemplate) -> Self {
		Self::EmptyTemplate(other)
	}
}

impl std::error::Error for CompileError {}

impl std::fmt::Display for CompileError {
	#[inline]
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		match self {
			Self::EmptyTemplate(e) => e.fmt(f),
		}
	}
}

/// An error that can occur while registering macros.
#[derive(Debug, Clone)]
#[cfg_attr(test, derive(Eq, PartialEq))]
pub enum RegistryError {
	/// The macro name is empty.
	EmptyMacroName(EmptyMacroName),

	/// The macro name contains a character that is not allowed in macro names.
	InvalidMacroName(InvalidMacroName),

	/// The builder was already used to build a registry.
	BuilderConsumed(BuilderConsumed),
}

impl From<EmptyMacroName> for RegistryError {
	#[inline]
	fn from(other: EmptyMacroName) -> Self {
		Self::EmptyMacroName(other)
	}
}

impl From<InvalidMacroName> for RegistryError {
	#[inline]
	fn from(other: InvalidMacroName) -> Self {
		Self::InvalidMacroName(other)
	}
}

impl From<BuilderConsumed> for RegistryError {
	#[inline]
	fn from(other: BuilderConsumed) -> Self {
		Self::BuilderConsumed(other)
	}
}

impl std::error::Error for RegistryError {}

impl std::fmt::Display for RegistryError {
	#[inline]
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		match self {
			Self::EmptyMacroName(e) => e.fmt(f),
			Self::InvalidMacroName(e) => e.fmt(f),
			Self::BuilderConsumed(e) => e.fmt(f),
		}
	}
}

/// The template text is empty.
#[derive(Debug, Clone)]
#[cfg_attr(test, derive(Eq, PartialEq))]
pub struct EmptyTemplate;

impl std::error::Error for EmptyTemplate {}

impl std::fmt::Display for EmptyTemplate {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		write!(f, "Template text is empty")
	}
}

/// The macro name is empty.
#[derive(Debug, Clone)]
#[cfg_attr(test, derive(Eq, PartialEq))]
pub struct EmptyMacroName;

impl std::error::Error for EmptyMacroName {}

impl std::fmt::Display for EmptyMacroName {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		write!(f, "Macro name is empty")
	}
}

/// The macro name contains a character that is not allowed in macro names.
///
/// Macro names may only contain ASCII letters, digits, underscores and dashes.
#[derive(Debug, Clone)]
#[cfg_attr(test, derive(Eq, PartialEq))]
pub struct InvalidMacroName {
	/// The rejected name.
	pub name: String,

	/// The byte offset of the offending character within the name.
	pub position: usize,

	/// The offending character.
	pub character: char,
}

impl std::error::Error for InvalidMacroName {}

impl std::fmt::Display for InvalidMacroName {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		write!(
			f,
			"Invalid character in macro name {:?}: {:?}, macro names may only contain letters, digits, underscores and dashes",
			self.name, self.character,
		)
	}
}

impl InvalidMacroName {
	/// Get the range in the name that contains the offending character.
	pub fn source_range(&self) -> std::ops::Range<usize> {
		self.position..self.position + self.character.len_utf8()
	}

	/// Write source highlighting for the offending character.
	///
	/// The highlighting ends with a newline.
	///
	/// Note: this function doesn't print anything if the name exceeds 60 characters in width.
	pub fn write_source_highlighting(&self, f: &mut impl std::fmt::Write) -> std::fmt::Result {
		use unicode_width::UnicodeWidthStr;

		if self.name.width() > 60 {
			return Ok(());
		}
		write!(f, "  {}\n  ", self.name)?;
		write_underline(f, &self.name, self.source_range())?;
		writeln!(f)
	}

	/// Get source highlighting for the offending character as a string.
	///
	/// The highlighting ends with a newline.
	pub fn source_highlighting(&self) -> String {
		let mut output = String::new();
		// Writing to a String can not fail.
		let _ = self.write_source_highlighting(&mut output);
		output
	}
}

/// The builder was already used to build a registry.
#[derive(Debug, Clone)]
#[cfg_attr(test, derive(Eq, PartialEq))]
pub struct BuilderConsumed;

impl std::error::Error for BuilderConsumed {}

impl std::fmt::Display for BuilderConsumed {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		write!(f, "Registry builder was already used to build a registry")
	}
}

fn write_underline(f: &mut impl std::fmt::Write, line: &str, range: std::ops::Range<usize>) -> std::fmt::Result {
	use unicode_width::UnicodeWidthStr;
	let spaces = line[..range.start].width();
	// Zero-width characters still get a single caret.
	let carets = line[range].width().max(1);
	write!(f, "{}", " ".repeat(spaces))?;
	write!(f, "{}", "^".repeat(carets))?;
	Ok(())
}

#[cfg(test)]
#[rustfmt::skip]
mod test {
	use super::*;
	use assert2::assert;

	#[test]
	fn invalid_macro_name_highlighting() {
		let error = InvalidMacroName {
			name: "bad name!".into(),
			position: 3,
			character: ' ',
		};
		assert!(error.source_range() == (3..4));
		assert!(error.source_highlighting() == concat!(
			"  bad name!\n",
			"     ^\n",
		));
	}

	#[test]
	fn invalid_macro_name_highlighting_wide_characters() {
		let error = InvalidMacroName {
			name: "名前".into(),
			position: 0,
			character: '名',
		};
		assert!(error.source_range() == (0..3));
		assert!(error.source_highlighting() == concat!(
			"  名前\n",
			"  ^^\n",
		));
	}

	#[test]
	fn display_messages() {
		assert!(CompileError::from(EmptyTemplate).to_string() == "Template text is empty");
		assert!(RegistryError::from(EmptyMacroName).to_string() == "Macro name is empty");
		assert!(
			RegistryError::from(BuilderConsumed).to_string()
				== "Registry builder was already used to build a registry"
		);
		let error = RegistryError::from(InvalidMacroName {
			name: "a!".into(),
			position: 1,
			character: '!',
		});
		assert!(
			error.to_string()
				== "Invalid character in macro name \"a!\": '!', macro names may only contain letters, digits, underscores and dashes"
		);
	}
}
