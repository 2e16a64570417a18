//! Compiled macro templates with a case-insensitive macro registry.
//!
//! # Features
//!
//! * Compile a template once, expand it many times.
//! * Macros: `"Hello $user_name$!"`
//! * Macros with an argument: `"Built at $utc_now:%Y-%m-%d$"`
//! * Escaped delimiters: `"Costs $$5"` expands to `"Costs $5"`.
//! * Configurable delimiter and argument separator.
//! * Macro names are matched case-insensitively.
//! * Static macro values and generator functions that run on every expansion.
//! * A standard macro set with time, GUID, host and environment lookups (requires the `standard-macros` feature, enabled by default).
//! * Expand macros in all string values of JSON, TOML or YAML data (optional, requires the `json`, `toml` or `yaml` feature).
//!
//! Unknown macros expand to nothing.
//! A generator that fails expands to its error message, without affecting the rest of the template.
//!
//! # Examples
//!
//! Macros are registered with a [`RegistryBuilder`], which produces an immutable [`Registry`].
//!
//! ```
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use expando::{Registry, Template};
//!
//! let mut builder = Registry::builder();
//! builder
//! 	.add_macro("project", "expando")?
//! 	.add_macro_fn("upper", |argument| Ok(argument.unwrap_or_default().to_uppercase()))?;
//! let registry = builder.build()?;
//!
//! let template = Template::from_str("$PROJECT$ says $upper:hello$, $unknown$for $$5")?;
//! assert_eq!(template.expand(&registry), "expando says HELLO, for $5");
//! # Ok(())
//! # }
//! ```
//!
//! For a string that is expanded only once, you can use [`expand_macros()`].
//!
//! ```
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let registry = expando::Registry::builder().add_macro("name", "world")?.build()?;
//! assert_eq!(expando::expand_macros("Hello $name$!", &registry)?, "Hello world!");
//! # Ok(())
//! # }
//! ```
//!
//! A different delimiter can be configured with [`Options`].
//!
//! ```
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use expando::{Options, Template};
//!
//! let macros = expando::from_fn(|name, _argument| (name == "name").then(|| String::from("world")));
//! let template = Template::compile("Hello %name%, this is 100%% $name$.", &Options::new('%', ':'))?;
//! assert_eq!(template.expand(&macros), "Hello world, this is 100% $name$.");
//! # Ok(())
//! # }
//! ```
#![warn(missing_docs, missing_debug_implementations)]
#![cfg_attr(feature = "doc-cfg", feature(doc_cfg))]

pub mod error;
pub use error::{CompileError, RegistryError};

pub mod map;
pub use map::*;

mod options;
pub use options::Options;

mod pool;

mod registry;
pub use registry::{GeneratorError, Registry, RegistryBuilder};

mod template;
pub use template::{Part, Segment, SegmentKind, Template};

mod features;

#[cfg(feature = "json")]
pub use features::json;

#[cfg(feature = "toml")]
pub use features::toml;

#[cfg(feature = "yaml")]
pub use features::yaml;

/// Expand macros in a string using the default [`Options`].
///
/// Macros have the form `$name$` or `$name:argument$`.
/// Two consecutive delimiters expand to one literal delimiter.
///
/// If you need to expand the same string multiple times,
/// compile it once into a [`Template`] instead.
///
/// Fails only if the source is empty.
pub fn expand_macros<M>(source: &str, macros: &M) -> Result<String, CompileError>
where
	M: MacroMap + ?Sized,
{
	expand_macros_with(source, &Options::default(), macros)
}

/// Expand macros in a string using custom [`Options`].
///
/// Fails only if the source is empty.
pub fn expand_macros_with<M>(source: &str, options: &Options, macros: &M) -> Result<String, CompileError>
where
	M: MacroMap + ?Sized,
{
	Ok(Template::compile(source, options)?.expand(macros))
}
