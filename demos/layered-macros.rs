//! Layer application specific macros on top of the standard macro set.
//!
//! Macros registered by the application take precedence,
//! everything else is resolved by the standard registry.
use std::sync::LazyLock;

use expando::{fallback, Registry, Template};

static TEMPLATE: LazyLock<Template> = LazyLock::new(|| {
	Template::from_str(
		r#"
Hello $user_name$!

Here is some information about the current environment:

$$machine_name$$:    $machine_name$
$$os_version$$:      $os_version$
$$runtime_version$$: $runtime_version$
$$app$$:             $app$
$$build$$:           $build:release$
$$utc_now$$:         $utc_now:%Y-%m-%d %H:%M:%S$
$$new_guid$$:        $new_guid:B$
$$env:PATH$$:        $env:PATH$
$$unknown$$:         $unknown$
"#,
	)
	.unwrap()
});

pub fn main() {
	let mut builder = Registry::builder();
	builder.add_standard_macros().unwrap();
	let standard = builder.build().unwrap();

	let mut builder = Registry::builder();
	builder
		.add_macro("app", env!("CARGO_PKG_NAME"))
		.unwrap()
		.add_macro_fn("build", |profile| match profile {
			Some("debug") | Some("release") => Ok(format!("{} ({})", env!("CARGO_PKG_VERSION"), profile.unwrap_or_default())),
			Some(other) => Err(format!("Unknown build profile: {other}").into()),
			None => Ok(env!("CARGO_PKG_VERSION").to_owned()),
		})
		.unwrap();
	let application = builder.build().unwrap();

	println!("Expansion using the standard macros only:");
	println!("{}", TEMPLATE.expand(&standard));

	println!("Expansion using the application macros on top of the standard macros:");
	println!("{}", TEMPLATE.expand(&fallback(&application, &standard)));
}
