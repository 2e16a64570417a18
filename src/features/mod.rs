#[cfg(feature = "serde")]
mod serde;

#[cfg(feature = "json")]
#[cfg_attr(feature = "doc-cfg", doc(cfg(feature = "json")))]
pub mod json;

#[cfg(feature = "yaml")]
#[cfg_attr(feature = "doc-cfg", doc(cfg(feature = "yaml")))]
pub mod yaml;

#[cfg(feature = "toml")]
#[cfg_attr(feature = "doc-cfg", doc(cfg(feature = "toml")))]
pub mod toml;

/// Expand the macros in a string value of a document.
///
/// Strings without a delimiter are left untouched, and so are empty strings.
#[cfg(any(feature = "json", feature = "toml", feature = "yaml"))]
fn expand_in_place<M>(value: &mut String, options: &crate::Options, macros: &M)
where
	M: crate::MacroMap + ?Sized,
{
	if !value.contains(options.delimiter) {
		return;
	}
	let expanded = match crate::Template::compile(value, options) {
		Ok(template) => template.expand(macros),
		Err(_) => return,
	};
	*value = expanded;
}
