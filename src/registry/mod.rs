use std::borrow::Cow;
use std::cmp::Ordering;
use std::ops::Range;
use std::sync::Arc;

use crate::error::{self, RegistryError};
use crate::pool::{self, Pool, PooledString};
use crate::MacroMap;

#[cfg(feature = "standard-macros")]
mod standard;

/// The error type that dynamic macro generators can return.
///
/// The message of the error is expanded in place of the macro.
pub type GeneratorError = Box<dyn std::error::Error + Send + Sync>;

type Generator = Arc<dyn Fn(Option<&str>) -> Result<String, GeneratorError> + Send + Sync>;

/// A frozen collection of macros.
///
/// Macro names are compared case-insensitively.
/// The registry is immutable once built, so it can be shared freely between threads.
///
/// Use a [`RegistryBuilder`] to create a registry.
///
/// # Example
/// ```
/// # use expando::{Registry, Template};
/// let mut builder = Registry::builder();
/// builder
///     .add_macro("name", "world")?
///     .add_macro_fn("upper", |argument| Ok(argument.unwrap_or_default().to_uppercase()))?;
/// let registry = builder.build()?;
///
/// let template = Template::from_str("Hello $NAME$, $upper:hello$!")?;
/// assert_eq!(template.expand(&registry), "Hello world, HELLO!");
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Clone)]
pub struct Registry {
	/// All macro names and static values.
	text: Box<str>,

	/// Entries sorted by case-folded name, without duplicates.
	entries: Box<[Entry]>,
}

#[derive(Clone)]
struct Entry {
	/// The range of the name in the text buffer.
	name: Range<usize>,
	value: MacroValue,
}

#[derive(Clone)]
enum MacroValue {
	/// A fixed value, stored in the text buffer.
	Static(Range<usize>),

	/// A value computed on every expansion.
	Dynamic(Generator),
}

impl std::fmt::Debug for Registry {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_tuple("Registry").field(&DebugNames(self)).finish()
	}
}

struct DebugNames<'a>(&'a Registry);

impl std::fmt::Debug for DebugNames<'_> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_list().entries(self.0.names()).finish()
	}
}

impl Registry {
	/// Create a new, empty builder.
	#[inline]
	pub fn builder() -> RegistryBuilder {
		RegistryBuilder::new()
	}

	/// Get the value of a macro.
	///
	/// The name is compared case-insensitively.
	/// Static values are borrowed from the registry.
	/// Dynamic values are generated for the given argument.
	///
	/// If the generator of a dynamic macro fails,
	/// the error message is returned as the value.
	///
	/// Returns `None` if the registry has no macro with the given name.
	pub fn get_macro_value(&self, name: &str, argument: Option<&str>) -> Option<Cow<'_, str>> {
		let entry = self.find(name)?;
		match &entry.value {
			MacroValue::Static(range) => Some(Cow::Borrowed(&self.text[range.clone()])),
			MacroValue::Dynamic(generator) => match generator(argument) {
				Ok(value) => Some(Cow::Owned(value)),
				Err(e) => {
					tracing::debug!(name, error = %e, "macro generator failed");
					Some(Cow::Owned(e.to_string()))
				},
			},
		}
	}

	/// Check if the registry has a macro with the given name.
	///
	/// The name is compared case-insensitively.
	#[inline]
	pub fn contains(&self, name: &str) -> bool {
		self.find(name).is_some()
	}

	/// Get the number of macros in the registry.
	#[inline]
	pub fn len(&self) -> usize {
		self.entries.len()
	}

	/// Check if the registry is empty.
	#[inline]
	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	/// Iterate over the macro names with their registered casing, in case-insensitive sorted order.
	pub fn names(&self) -> impl ExactSizeIterator<Item = &str> + '_ {
		self.entries.iter().map(|entry| &self.text[entry.name.clone()])
	}

	fn find(&self, name: &str) -> Option<&Entry> {
		let index = self
			.entries
			.binary_search_by(|entry| cmp_ignore_ascii_case(&self.text[entry.name.clone()], name))
			.ok()?;
		Some(&self.entries[index])
	}
}

impl MacroMap for Registry {
	#[inline]
	fn get_macro_value(&self, name: &str, argument: Option<&str>) -> Option<Cow<'_, str>> {
		Registry::get_macro_value(self, name, argument)
	}
}

/// Builder for a [`Registry`].
///
/// Add macros with [`Self::add_macro()`] and [`Self::add_macro_fn()`],
/// and freeze them into a registry with [`Self::build()`].
///
/// Macro names may only contain ASCII letters, digits, underscores and dashes.
/// Non-ASCII letters are rejected, so that case-insensitive comparison stays a simple ASCII fold.
/// Registering a name that is already present (ignoring case) replaces the earlier macro.
///
/// A builder can only build one registry.
/// After [`Self::build()`], all methods fail with [`RegistryError::BuilderConsumed`].
pub struct RegistryBuilder {
	state: Option<BuilderState>,
}

struct BuilderState {
	/// Names and static values of all added macros.
	text: PooledString<'static>,
	entries: Vec<Entry>,
}

impl std::fmt::Debug for RegistryBuilder {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("RegistryBuilder")
			.field("macros", &self.state.as_ref().map(|state| state.entries.len()))
			.finish()
	}
}

impl Default for RegistryBuilder {
	#[inline]
	fn default() -> Self {
		Self::new()
	}
}

impl RegistryBuilder {
	/// Create a new, empty builder.
	pub fn new() -> Self {
		Self::with_pool(&pool::STRINGS)
	}

	/// Create a new, empty builder that borrows its text buffer from `pool`.
	///
	/// The buffer goes back to the pool when the registry is built or the builder is dropped.
	pub(crate) fn with_pool(pool: &'static Pool) -> Self {
		Self {
			state: Some(BuilderState {
				text: pool.take(),
				entries: Vec::new(),
			}),
		}
	}

	/// Add a macro with a static value.
	pub fn add_macro(&mut self, name: &str, value: &str) -> Result<&mut Self, RegistryError> {
		let state = self.state_mut()?;
		check_name(name)?;
		let name = state.push_text(name);
		let value = state.push_text(value);
		state.entries.push(Entry {
			name,
			value: MacroValue::Static(value),
		});
		Ok(self)
	}

	/// Add a macro with a dynamic value.
	///
	/// The generator is called every time the macro is expanded,
	/// with the macro argument or `None` if the placeholder has no argument separator.
	///
	/// If the generator returns an error, the error message is expanded in place of the macro.
	/// Ambient state such as clocks should be captured by the generator itself.
	pub fn add_macro_fn<F>(&mut self, name: &str, generator: F) -> Result<&mut Self, RegistryError>
	where
		F: Fn(Option<&str>) -> Result<String, GeneratorError> + Send + Sync + 'static,
	{
		let state = self.state_mut()?;
		check_name(name)?;
		let name = state.push_text(name);
		state.entries.push(Entry {
			name,
			value: MacroValue::Dynamic(Arc::new(generator)),
		});
		Ok(self)
	}

	/// Freeze the added macros into a registry.
	///
	/// This can only be done once.
	pub fn build(&mut self) -> Result<Registry, RegistryError> {
		let BuilderState { text, mut entries } = self.state.take().ok_or(error::BuilderConsumed)?;

		// The sort is stable, so the last registration of a name comes last in its group.
		entries.sort_by(|a, b| cmp_ignore_ascii_case(&text[a.name.clone()], &text[b.name.clone()]));
		let mut unique: Vec<Entry> = Vec::with_capacity(entries.len());
		for entry in entries {
			if let Some(last) = unique.last_mut() {
				if text[last.name.clone()].eq_ignore_ascii_case(&text[entry.name.clone()]) {
					*last = entry;
					continue;
				}
			}
			unique.push(entry);
		}

		// Only the text of the surviving macros is copied into the registry.
		let frozen_len = unique.iter().map(Entry::text_len).sum();
		let mut frozen = String::with_capacity(frozen_len);
		for entry in &mut unique {
			entry.name = copy_range(&mut frozen, &text, entry.name.clone());
			if let MacroValue::Static(value) = &mut entry.value {
				*value = copy_range(&mut frozen, &text, value.clone());
			}
		}

		let registry = Registry {
			text: frozen.into_boxed_str(),
			entries: unique.into_boxed_slice(),
		};
		tracing::debug!(macros = registry.len(), "built macro registry");
		Ok(registry)
	}

	fn state_mut(&mut self) -> Result<&mut BuilderState, RegistryError> {
		Ok(self.state.as_mut().ok_or(error::BuilderConsumed)?)
	}
}

impl BuilderState {
	/// Append text to the buffer and return its range.
	fn push_text(&mut self, text: &str) -> Range<usize> {
		let start = self.text.len();
		self.text.push_str(text);
		start..self.text.len()
	}
}

impl Entry {
	/// The length of the name and static value in the text buffer.
	fn text_len(&self) -> usize {
		match &self.value {
			MacroValue::Static(value) => self.name.len() + value.len(),
			MacroValue::Dynamic(_) => self.name.len(),
		}
	}
}

/// Append `from[range]` to `to` and return its range in `to`.
fn copy_range(to: &mut String, from: &str, range: Range<usize>) -> Range<usize> {
	let start = to.len();
	to.push_str(&from[range]);
	start..to.len()
}

/// Check that a name is non-empty and consists only of ASCII letters, digits, underscores and dashes.
fn check_name(name: &str) -> Result<(), RegistryError> {
	if name.is_empty() {
		return Err(error::EmptyMacroName.into());
	}
	if let Some((position, character)) = name.char_indices().find(|&(_, c)| !is_valid_name(c)) {
		return Err(error::InvalidMacroName {
			name: name.to_owned(),
			position,
			character,
		}
		.into());
	}
	Ok(())
}

fn is_valid_name(c: char) -> bool {
	c.is_ascii_alphanumeric() || c == '_' || c == '-'
}

fn cmp_ignore_ascii_case(a: &str, b: &str) -> Ordering {
	let a = a.bytes().map(|c| c.to_ascii_lowercase());
	let b = b.bytes().map(|c| c.to_ascii_lowercase());
	a.cmp(b)
}

#[cfg(test)]
#[rustfmt::skip]
mod test {
	use super::*;
	use crate::Template;
	use assert2::{assert, check, let_assert};

	fn registry(macros: &[(&str, &str)]) -> Registry {
		let mut builder = Registry::builder();
		for (name, value) in macros {
			let_assert!(Ok(_) = builder.add_macro(name, value));
		}
		let_assert!(Ok(registry) = builder.build());
		registry
	}

	#[test]
	fn lookup_ignores_case() {
		let registry = registry(&[("macro", "value")]);
		check!(registry.get_macro_value("MaCrO", None).as_deref() == Some("value"));
		check!(registry.get_macro_value("macro", Some("ignored")).as_deref() == Some("value"));
		check!(registry.get_macro_value("other", None) == None);
		check!(registry.contains("MACRO"));
	}

	#[test]
	fn static_values_are_borrowed() {
		let registry = registry(&[("a", "1")]);
		let_assert!(Some(Cow::Borrowed("1")) = registry.get_macro_value("A", None));
	}

	#[test]
	fn dynamic_values_receive_the_argument() {
		let mut builder = Registry::builder();
		let_assert!(Ok(_) = builder.add_macro_fn("echo", |argument| Ok(format!("{argument:?}"))));
		let_assert!(Ok(registry) = builder.build());
		check!(registry.get_macro_value("echo", Some("x")).as_deref() == Some("Some(\"x\")"));
		check!(registry.get_macro_value("echo", Some("")).as_deref() == Some("Some(\"\")"));
		check!(registry.get_macro_value("echo", None).as_deref() == Some("None"));
	}

	#[test]
	fn generator_errors_become_values() {
		let mut builder = Registry::builder();
		let_assert!(Ok(_) = builder.add_macro_fn("broken", |_| Err("the generator is broken".into())));
		let_assert!(Ok(registry) = builder.build());
		check!(registry.get_macro_value("broken", None).as_deref() == Some("the generator is broken"));
	}

	#[test]
	fn many_macros_are_sorted_for_lookup() {
		let names: Vec<String> = (0..100).rev().map(|i| format!("Macro-{i}")).collect();
		let mut builder = Registry::builder();
		for (i, name) in names.iter().enumerate() {
			let_assert!(Ok(_) = builder.add_macro(name, &i.to_string()));
		}
		let_assert!(Ok(registry) = builder.build());
		assert!(registry.len() == 100);
		check!(registry.get_macro_value("macro-0", None).as_deref() == Some("99"));
		check!(registry.get_macro_value("MACRO-99", None).as_deref() == Some("0"));
		check!(registry.get_macro_value("macro-100", None) == None);
	}

	#[test]
	fn last_registration_wins() {
		let registry = registry(&[("name", "first"), ("other", "x"), ("NAME", "second")]);
		assert!(registry.len() == 2);
		check!(registry.get_macro_value("name", None).as_deref() == Some("second"));
		assert!(registry.names().collect::<Vec<_>>() == ["NAME", "other"]);
	}

	#[test]
	fn dynamic_can_replace_static() {
		let mut builder = Registry::builder();
		let_assert!(Ok(_) = builder.add_macro("value", "static"));
		let_assert!(Ok(_) = builder.add_macro_fn("VALUE", |_| Ok("dynamic".into())));
		let_assert!(Ok(registry) = builder.build());
		check!(registry.get_macro_value("value", None).as_deref() == Some("dynamic"));
	}

	#[test]
	fn invalid_names_are_rejected() {
		let mut builder = Registry::builder();

		let_assert!(Err(RegistryError::EmptyMacroName(_)) = builder.add_macro("", "v"));

		let_assert!(Err(RegistryError::InvalidMacroName(e)) = builder.add_macro("bad name!", "v"));
		assert!(e.position == 3);
		assert!(e.character == ' ');
		assert!(e.source_highlighting() == concat!(
			"  bad name!\n",
			"     ^\n",
		));

		let_assert!(Err(RegistryError::InvalidMacroName(e)) = builder.add_macro_fn("naïve", |_| Ok(String::new())));
		assert!(e.position == 2);
		assert!(e.character == 'ï');

		// The builder remains usable after a failed registration.
		let_assert!(Ok(_) = builder.add_macro("good_name-2", "v"));
		let_assert!(Ok(registry) = builder.build());
		assert!(registry.len() == 1);
	}

	#[test]
	fn builder_is_single_use() {
		let mut builder = Registry::builder();
		let_assert!(Ok(_) = builder.add_macro("a", "b"));
		let_assert!(Ok(_) = builder.build());

		let_assert!(Err(RegistryError::BuilderConsumed(_)) = builder.add_macro("c", "d"));
		let_assert!(Err(RegistryError::BuilderConsumed(_)) = builder.add_macro_fn("c", |_| Ok(String::new())));
		let_assert!(Err(RegistryError::BuilderConsumed(_)) = builder.build());
	}

	#[test]
	fn replaced_macros_leave_no_text_behind() {
		let mut builder = Registry::builder();
		for i in 0..1000 {
			let_assert!(Ok(_) = builder.add_macro("x", &format!("v{i}")));
		}
		let_assert!(Ok(_) = builder.add_macro_fn("gen", |_| Ok(String::new())));
		let_assert!(Ok(registry) = builder.build());
		assert!(&*registry.text == "genxv999");
		check!(registry.get_macro_value("X", None).as_deref() == Some("v999"));
		assert!(registry.names().collect::<Vec<_>>() == ["gen", "x"]);
	}

	#[test]
	fn build_gives_buffer_back_once() {
		static POOL: Pool = Pool::new(4, 1024);
		let mut builder = RegistryBuilder::with_pool(&POOL);
		let_assert!(Ok(_) = builder.add_macro("a", "1"));
		assert!(POOL.len() == 0);

		let_assert!(Ok(_) = builder.build());
		assert!(POOL.len() == 1);

		let_assert!(Err(RegistryError::BuilderConsumed(_)) = builder.build());
		drop(builder);
		assert!(POOL.len() == 1);
	}

	#[test]
	fn dropped_builder_gives_buffer_back() {
		static POOL: Pool = Pool::new(4, 1024);
		let mut builder = RegistryBuilder::with_pool(&POOL);
		let_assert!(Ok(_) = builder.add_macro_fn("a", |_| Ok(String::new())));
		drop(builder);
		assert!(POOL.len() == 1);

		// The next builder reuses the buffer.
		let builder = RegistryBuilder::with_pool(&POOL);
		assert!(POOL.len() == 0);
		drop(builder);
	}

	#[test]
	fn failed_registration_keeps_buffer() {
		static POOL: Pool = Pool::new(4, 1024);
		let mut builder = RegistryBuilder::with_pool(&POOL);
		let_assert!(Ok(_) = builder.add_macro("a", "1"));
		let_assert!(Err(RegistryError::InvalidMacroName(_)) = builder.add_macro("b c", "2"));
		let_assert!(Err(RegistryError::EmptyMacroName(_)) = builder.add_macro("", "2"));
		assert!(POOL.len() == 0);

		let_assert!(Ok(registry) = builder.build());
		assert!(registry.len() == 1);
		assert!(POOL.len() == 1);
	}

	#[test]
	fn consumed_builder_checks_state_before_name() {
		let mut builder = Registry::builder();
		let_assert!(Ok(_) = builder.build());
		let_assert!(Err(RegistryError::BuilderConsumed(_)) = builder.add_macro("", "v"));
	}

	#[test]
	fn empty_registry() {
		let registry = registry(&[]);
		assert!(registry.is_empty());
		check!(registry.get_macro_value("anything", None) == None);
	}

	#[test]
	fn registry_expands_templates() {
		let registry = registry(&[("who", "world")]);
		let_assert!(Ok(template) = Template::from_str("Hello, $WHO$!"));
		assert!(template.expand(&registry) == "Hello, world!");
	}

	#[test]
	fn registry_is_send_and_sync() {
		fn assert_send_sync<T: Send + Sync>() {}
		assert_send_sync::<Registry>();
	}

	#[test]
	fn debug_lists_names() {
		let registry = registry(&[("b", "2"), ("a", "1")]);
		assert!(format!("{registry:?}") == r#"Registry(["a", "b"])"#);
	}
}
