use std::borrow::Cow;

use super::MacroMap;

/// [`MacroMap`] produced by [`fallback()`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct FallbackMacros<Base, Fallback> {
	base: Base,
	fallback: Fallback,
}

impl<Base, Fallback> MacroMap for FallbackMacros<Base, Fallback>
where
	Base: MacroMap,
	Fallback: MacroMap,
{
	fn get_macro_value(&self, name: &str, argument: Option<&str>) -> Option<Cow<'_, str>> {
		self.base
			.get_macro_value(name, argument)
			.or_else(|| self.fallback.get_macro_value(name, argument))
	}
}

/// Creates a [`MacroMap`] that will first try to resolve macros with `base`,
/// and then attempt to resolve them with `fallback`.
///
/// # Example
/// ```rust
/// # use expando::{fallback, MacroMap, Registry};
/// let mut builder = Registry::builder();
/// builder.add_macro("greeting", "hello")?;
/// let base = builder.build()?;
///
/// let mut builder = Registry::builder();
/// builder.add_macro("greeting", "hi")?.add_macro("subject", "world")?;
/// let defaults = builder.build()?;
///
/// let layered = fallback(&base, &defaults);
/// assert_eq!(layered.get_macro_value("greeting", None).as_deref(), Some("hello"));
/// assert_eq!(layered.get_macro_value("subject", None).as_deref(), Some("world"));
/// assert_eq!(layered.get_macro_value("missing", None), None);
/// # Ok::<(), expando::error::RegistryError>(())
/// ```
pub const fn fallback<Base, Fallback>(base: Base, fallback: Fallback) -> FallbackMacros<Base, Fallback> {
	FallbackMacros { base, fallback }
}
