//! The standard macro set.
//!
//! | Name              | Argument                          | Value                                  |
//! |-------------------|-----------------------------------|----------------------------------------|
//! | `now`             | optional `strftime` format        | current local time, RFC 3339 by default |
//! | `utc_now`         | optional `strftime` format        | current UTC time, RFC 3339 by default   |
//! | `new_guid`        | optional `N`, `D`, `B` or `P`     | a random version 4 UUID                 |
//! | `machine_name`    |                                   | the host name                           |
//! | `os_version`      |                                   | operating system and architecture       |
//! | `user_name`       |                                   | the name of the current user            |
//! | `runtime_version` |                                   | name and version of this library        |
//! | `env`             | variable name                     | an environment variable, empty if unset |

use std::fmt::Write;
use std::sync::Arc;

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Local, TimeZone, Utc};
use uuid::Uuid;

use super::{GeneratorError, RegistryBuilder};
use crate::error::RegistryError;

const RUNTIME_VERSION: &str = concat!(env!("CARGO_PKG_NAME"), " ", env!("CARGO_PKG_VERSION"));

impl RegistryBuilder {
	/// Add the standard macros, using the system clock.
	///
	/// See [`Self::add_standard_macros_with_clock()`] for the list of macros.
	#[cfg_attr(feature = "doc-cfg", doc(cfg(feature = "standard-macros")))]
	pub fn add_standard_macros(&mut self) -> Result<&mut Self, RegistryError> {
		self.add_standard_macros_with_clock(Utc::now)
	}

	/// Add the standard macros, reading the current time from `clock`.
	///
	/// * `now[:format]`: the current local time.
	/// * `utc_now[:format]`: the current UTC time.
	/// * `new_guid[:N|D|B|P]`: a new random UUID, hyphenated (`D`) by default.
	/// * `machine_name`: the host name.
	/// * `os_version`: the operating system and CPU architecture.
	/// * `user_name`: the name of the current user.
	/// * `runtime_version`: the name and version of this library.
	/// * `env:NAME`: the value of the environment variable `NAME`, or nothing if it is not set.
	///
	/// Time formats use the `strftime` syntax of [`chrono::format::strftime`].
	/// Without a format, times are formatted as RFC 3339.
	///
	/// Macros that can not produce a value expand to an error message.
	///
	/// # Example
	/// ```
	/// # use chrono::{TimeZone, Utc};
	/// # use expando::{Registry, Template};
	/// let mut builder = Registry::builder();
	/// builder.add_standard_macros_with_clock(|| Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 0).unwrap())?;
	/// let registry = builder.build()?;
	///
	/// let template = Template::from_str("Timestamp: $utc_now:%Y%m%d$")?;
	/// assert_eq!(template.expand(&registry), "Timestamp: 20240309");
	/// # Ok::<(), Box<dyn std::error::Error>>(())
	/// ```
	#[cfg_attr(feature = "doc-cfg", doc(cfg(feature = "standard-macros")))]
	pub fn add_standard_macros_with_clock<C>(&mut self, clock: C) -> Result<&mut Self, RegistryError>
	where
		C: Fn() -> DateTime<Utc> + Send + Sync + 'static,
	{
		let utc_clock = Arc::new(clock);
		let local_clock = Arc::clone(&utc_clock);
		let os_version = format!("{} {}", std::env::consts::OS, std::env::consts::ARCH);

		self.add_macro_fn("now", move |format| format_time(&(*local_clock)().with_timezone(&Local), format))?
			.add_macro_fn("utc_now", move |format| format_time(&(*utc_clock)(), format))?
			.add_macro_fn("new_guid", |format| format_guid(Uuid::new_v4(), format))?
			.add_macro_fn("machine_name", |_| machine_name())?
			.add_macro("os_version", &os_version)?
			.add_macro_fn("user_name", |_| user_name())?
			.add_macro("runtime_version", RUNTIME_VERSION)?
			.add_macro_fn("env", environment_variable)
	}
}

fn format_time<Tz>(time: &DateTime<Tz>, format: Option<&str>) -> Result<String, GeneratorError>
where
	Tz: TimeZone,
	Tz::Offset: std::fmt::Display,
{
	let format = match format {
		None | Some("") => return Ok(time.to_rfc3339()),
		Some(format) => format,
	};

	let items: Vec<Item> = StrftimeItems::new(format).collect();
	if items.contains(&Item::Error) {
		return Err(format!("Invalid time format: {format}").into());
	}

	let mut output = String::with_capacity(format.len() * 2);
	write!(output, "{}", time.format_with_items(items.iter()))
		.map_err(|_| format!("Invalid time format: {format}"))?;
	Ok(output)
}

fn format_guid(guid: Uuid, format: Option<&str>) -> Result<String, GeneratorError> {
	match format.unwrap_or_default() {
		"" | "D" | "d" => Ok(guid.hyphenated().to_string()),
		"N" | "n" => Ok(guid.simple().to_string()),
		"B" | "b" => Ok(guid.braced().to_string()),
		"P" | "p" => Ok(format!("({})", guid.hyphenated())),
		other => Err(format!("Unsupported GUID format: {other:?}, expected N, D, B or P").into()),
	}
}

/// Ask the operating system for the host name, falling back to the environment.
fn machine_name() -> Result<String, GeneratorError> {
	non_empty(whoami::fallible::hostname())
		.or_else(|| first_env_var(&["HOSTNAME", "COMPUTERNAME"]))
		.ok_or_else(|| "Machine name is not available".into())
}

/// Ask the operating system for the user name, falling back to the environment.
fn user_name() -> Result<String, GeneratorError> {
	non_empty(whoami::fallible::username())
		.or_else(|| first_env_var(&["USER", "USERNAME", "LOGNAME"]))
		.ok_or_else(|| "User name is not available".into())
}

fn non_empty(value: std::io::Result<String>) -> Option<String> {
	match value {
		Ok(value) if !value.is_empty() => Some(value),
		Ok(_) => None,
		Err(e) => {
			tracing::debug!(error = %e, "operating system lookup failed");
			None
		},
	}
}

fn environment_variable(name: Option<&str>) -> Result<String, GeneratorError> {
	let name = match name {
		None | Some("") => return Err("Missing environment variable name".into()),
		Some(name) => name,
	};
	match std::env::var(name) {
		Ok(value) => Ok(value),
		Err(std::env::VarError::NotPresent) => Ok(String::new()),
		Err(e) => Err(e.into()),
	}
}

fn first_env_var(keys: &[&str]) -> Option<String> {
	keys.iter()
		.filter_map(|key| std::env::var(key).ok())
		.find(|value| !value.is_empty())
}

#[cfg(test)]
#[rustfmt::skip]
mod test {
	use super::*;
	use crate::{Registry, Template};
	use assert2::{assert, check, let_assert};

	fn fixed_clock() -> DateTime<Utc> {
		Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 0).unwrap()
	}

	fn standard_registry() -> Registry {
		let mut builder = Registry::builder();
		let_assert!(Ok(_) = builder.add_standard_macros_with_clock(fixed_clock));
		let_assert!(Ok(registry) = builder.build());
		registry
	}

	#[test]
	fn utc_now_with_format() {
		let registry = standard_registry();
		check!(registry.get_macro_value("utc_now", Some("%Y%m%d")).as_deref() == Some("20240309"));
		check!(registry.get_macro_value("UTC_NOW", Some("%H:%M:%S")).as_deref() == Some("14:05:00"));
		check!(registry.get_macro_value("utc_now", None).as_deref() == Some("2024-03-09T14:05:00+00:00"));
		check!(registry.get_macro_value("utc_now", Some("")).as_deref() == Some("2024-03-09T14:05:00+00:00"));
	}

	#[test]
	fn argument_passes_through_template() {
		let registry = standard_registry();
		let_assert!(Ok(template) = Template::from_str("Timestamp: $utc_now:%Y%m%d$"));
		assert!(template.expand(&registry) == "Timestamp: 20240309");

		let_assert!(Ok(template) = Template::from_str("[$utc_now:%H:%M$]"));
		assert!(template.expand(&registry) == "[14:05]");
	}

	#[test]
	fn now_uses_local_time_of_clock() {
		let registry = standard_registry();
		let expected = fixed_clock().with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string();
		check!(registry.get_macro_value("now", Some("%Y-%m-%d %H:%M")).as_deref() == Some(expected.as_str()));
	}

	#[test]
	fn invalid_time_format_expands_to_error() {
		let registry = standard_registry();
		let_assert!(Ok(template) = Template::from_str("before $utc_now:%$ after"));
		assert!(template.expand(&registry) == "before Invalid time format: % after");
	}

	#[test]
	fn new_guid_formats() {
		let registry = standard_registry();

		let_assert!(Some(guid) = registry.get_macro_value("new_guid", None));
		assert!(guid.len() == 36);
		assert!(guid.matches('-').count() == 4);

		let_assert!(Some(guid) = registry.get_macro_value("new_guid", Some("N")));
		assert!(guid.len() == 32);
		assert!(guid.chars().all(|c| c.is_ascii_hexdigit()));

		let_assert!(Some(guid) = registry.get_macro_value("new_guid", Some("B")));
		assert!(guid.starts_with('{') && guid.ends_with('}') && guid.len() == 38);

		let_assert!(Some(guid) = registry.get_macro_value("new_guid", Some("p")));
		assert!(guid.starts_with('(') && guid.ends_with(')') && guid.len() == 38);

		check!(
			registry.get_macro_value("new_guid", Some("X")).as_deref()
				== Some("Unsupported GUID format: \"X\", expected N, D, B or P")
		);
	}

	#[test]
	fn new_guid_is_new_every_time() {
		let registry = standard_registry();
		let first = registry.get_macro_value("new_guid", None);
		let second = registry.get_macro_value("new_guid", None);
		assert!(first != second);
	}

	#[test]
	fn environment_lookup() {
		std::env::set_var("EXPANDO_STANDARD_MACRO_TEST", "from the environment");
		let registry = standard_registry();
		check!(
			registry.get_macro_value("env", Some("EXPANDO_STANDARD_MACRO_TEST")).as_deref()
				== Some("from the environment")
		);
		check!(registry.get_macro_value("env", Some("EXPANDO_STANDARD_MACRO_UNSET")).as_deref() == Some(""));
		check!(registry.get_macro_value("env", None).as_deref() == Some("Missing environment variable name"));
	}

	#[test]
	fn static_host_information() {
		let registry = standard_registry();
		let_assert!(Some(os_version) = registry.get_macro_value("os_version", None));
		assert!(os_version.starts_with(std::env::consts::OS));
		check!(registry.get_macro_value("runtime_version", None).as_deref() == Some(RUNTIME_VERSION));
	}

	#[test]
	fn host_and_user_come_from_the_operating_system() {
		let registry = standard_registry();

		let_assert!(Some(machine_name) = registry.get_macro_value("machine_name", None));
		assert!(machine_name != "Machine name is not available");
		assert!(!machine_name.is_empty());

		let_assert!(Some(user_name) = registry.get_macro_value("user_name", None));
		assert!(user_name != "User name is not available");
		let_assert!(Ok(os_user_name) = whoami::fallible::username());
		assert!(user_name == os_user_name);
	}

	#[test]
	fn standard_macros_can_be_overridden() {
		let mut builder = Registry::builder();
		let_assert!(Ok(_) = builder.add_standard_macros());
		let_assert!(Ok(_) = builder.add_macro("Machine_Name", "build-host"));
		let_assert!(Ok(registry) = builder.build());
		check!(registry.get_macro_value("machine_name", None).as_deref() == Some("build-host"));
		assert!(registry.len() == 8);
	}
}
