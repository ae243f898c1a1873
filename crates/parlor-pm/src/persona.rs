//! Persona rendering in the WPP, SBF and Boostyle encodings.

use crate::schema::{Attributes, Persona};

/// Render `persona` for the character called `name`.
///
/// The encoding follows the persona's variant. Attribute order and value
/// order are taken from the attribute map as-is.
///
/// # Examples
///
/// ```
/// use parlor_pm::{Attributes, Persona, format_character};
///
/// let attrs = Attributes::from([
///     ("a".to_owned(), vec!["x".to_owned(), "y".to_owned()]),
///     ("b".to_owned(), vec!["z".to_owned()]),
/// ]);
///
/// assert_eq!(
///     format_character("Rex", &Persona::Wpp(attrs.clone())),
///     "[character(\"Rex\") {\na(\"x\" + \"y\")\nb(\"z\")\n}]",
/// );
/// assert_eq!(format_character("Rex", &Persona::Boostyle(attrs)), "Rex + x + y + z");
/// ```
pub fn format_character(name: &str, persona: &Persona) -> String {
    match persona {
        Persona::Wpp(attrs) => format_wpp(name, attrs),
        Persona::Sbf(attrs) => format_sbf(name, attrs),
        Persona::Boostyle(attrs) => format_boostyle(name, attrs),
    }
}

fn format_wpp(name: &str, attrs: &Attributes) -> String {
    let body = attrs
        .iter()
        .map(|(key, values)| format!("{key}({})", quoted(values, " + ")))
        .collect::<Vec<_>>()
        .join("\n");

    [format!("[character(\"{name}\") {{"), body, "}]".to_owned()].join("\n")
}

fn format_sbf(name: &str, attrs: &Attributes) -> String {
    let entries = attrs
        .iter()
        .map(|(key, values)| format!("{key}: {}", quoted(values, ", ")))
        .collect::<Vec<_>>()
        .join("; ");

    format!("[ character: \"{name}\"; {entries} ]")
}

fn format_boostyle(name: &str, attrs: &Attributes) -> String {
    std::iter::once(name)
        .chain(attrs.values().flatten().map(String::as_str))
        .collect::<Vec<_>>()
        .join(" + ")
}

/// Wrap each value in double quotes and join with `sep`.
fn quoted(values: &[String], sep: &str) -> String {
    values
        .iter()
        .map(|value| format!("\"{value}\""))
        .collect::<Vec<_>>()
        .join(sep)
}
