//! Macro maps and related utilities for macro expansion.

use std::borrow::Cow;

mod fallback;
pub use fallback::*;

mod fn_map;
pub use fn_map::*;

/// Trait for types that can resolve macros during expansion.
///
/// Implementations decide how names are compared.
/// The [`Registry`][crate::Registry] compares names case-insensitively.
pub trait MacroMap {
	/// Get the value of a macro.
	///
	/// `argument` is the text after the argument separator,
	/// or `None` if the placeholder did not contain a separator.
	///
	/// Returns `None` if the macro is unknown.
	fn get_macro_value(&self, name: &str, argument: Option<&str>) -> Option<Cow<'_, str>>;
}

impl<T> MacroMap for &'_ T
where
	T: ?Sized + MacroMap,
{
	#[inline(always)]
	fn get_macro_value(&self, name: &str, argument: Option<&str>) -> Option<Cow<'_, str>> {
		T::get_macro_value(self, name, argument)
	}
}

impl<T> MacroMap for &'_ mut T
where
	T: ?Sized + MacroMap,
{
	#[inline(always)]
	fn get_macro_value(&self, name: &str, argument: Option<&str>) -> Option<Cow<'_, str>> {
		T::get_macro_value(self, name, argument)
	}
}

impl<T> MacroMap for std::boxed::Box<T>
where
	T: ?Sized + MacroMap,
{
	#[inline(always)]
	fn get_macro_value(&self, name: &str, argument: Option<&str>) -> Option<Cow<'_, str>> {
		T::get_macro_value(self, name, argument)
	}
}

impl<T> MacroMap for std::rc::Rc<T>
where
	T: ?Sized + MacroMap,
{
	#[inline(always)]
	fn get_macro_value(&self, name: &str, argument: Option<&str>) -> Option<Cow<'_, str>> {
		T::get_macro_value(self, name, argument)
	}
}

impl<T> MacroMap for std::sync::Arc<T>
where
	T: ?Sized + MacroMap,
{
	#[inline(always)]
	fn get_macro_value(&self, name: &str, argument: Option<&str>) -> Option<Cow<'_, str>> {
		T::get_macro_value(self, name, argument)
	}
}

/// A "map" that doesn't know any macros.
///
/// Expanding a template with this map removes all macros and resolves escaped delimiters.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoMacros;

impl MacroMap for NoMacros {
	#[inline]
	fn get_macro_value(&self, _name: &str, _argument: Option<&str>) -> Option<Cow<'_, str>> {
		None
	}
}
