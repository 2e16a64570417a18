use std::borrow::Cow;

use super::MacroMap;

/// [`MacroMap`] produced by [`from_fn()`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct FnMacros<F> {
	func: F,
}

impl<F> MacroMap for FnMacros<F>
where
	F: Fn(&str, Option<&str>) -> Option<String>,
{
	#[inline(always)]
	fn get_macro_value(&self, name: &str, argument: Option<&str>) -> Option<Cow<'_, str>> {
		(self.func)(name, argument).map(Cow::Owned)
	}
}

/// Creates a [`MacroMap`] that delegates to the given function.
///
/// The function receives the macro name exactly as written in the template,
/// so it is responsible for its own name comparison.
///
/// # Example
/// ```rust
/// # use expando::map::{from_fn, MacroMap};
/// let macros = from_fn(|name, argument| match name {
///     "upper" => argument.map(str::to_uppercase),
///     "len" => argument.map(|x| x.len().to_string()),
///     _ => None,
/// });
///
/// assert_eq!(macros.get_macro_value("upper", Some("shout")).as_deref(), Some("SHOUT"));
/// assert_eq!(macros.get_macro_value("len", Some("four")).as_deref(), Some("4"));
/// assert_eq!(macros.get_macro_value("upper", None), None);
/// ```
pub const fn from_fn<F>(func: F) -> FnMacros<F>
where
	F: Fn(&str, Option<&str>) -> Option<String>,
{
	FnMacros { func }
}
