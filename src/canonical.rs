// Helpers shared by the normalizer for turning loose values into canonical ones

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// A scalar that upstream services send either as a JSON number or as text.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Number(f64),
    Text(String),
}

impl Scalar {
    /// Numeric value, or 0 when the text carries no leading number.
    pub fn as_number(&self) -> f64 {
        match self {
            Scalar::Number(n) if n.is_finite() => *n,
            Scalar::Number(_) => 0.0,
            Scalar::Text(s) => parse_leading_number(s).unwrap_or(0.0),
        }
    }

    /// Text form for identifiers. Empty text counts as absent.
    pub fn as_id(&self) -> Option<String> {
        match self {
            Scalar::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => Some(format!("{}", *n as i64)),
            Scalar::Number(n) => Some(n.to_string()),
            Scalar::Text(s) => non_empty(Some(s)).map(str::to_string),
        }
    }
}

/// Accepts a number or a string; any other JSON type reads as absent.
pub fn lenient_scalar<'de, D>(deserializer: D) -> Result<Option<Scalar>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_f64().map(Scalar::Number),
        Value::String(s) => Some(Scalar::Text(s)),
        _ => None,
    })
}

/// Accepts a string, or a number in its decimal form; any other JSON type reads as absent.
pub fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

/**
 * parse_leading_number
 * Reads the longest decimal prefix after leading whitespace ("49.99", "12abc", " -3e2 USD").
 * Returns None when nothing numeric is found or the value is not finite.
 */
pub fn parse_leading_number(raw: &str) -> Option<f64> {
    let s = raw.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }
    let int_start = end;
    while bytes.get(end).is_some_and(u8::is_ascii_digit) {
        end += 1;
    }
    let mut digits = end - int_start;
    if bytes.get(end) == Some(&b'.') {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while bytes.get(frac_end).is_some_and(u8::is_ascii_digit) {
            frac_end += 1;
        }
        if digits > 0 || frac_end > frac_start {
            digits += frac_end - frac_start;
            end = frac_end;
        }
    }
    if digits == 0 {
        return None;
    }
    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+' | b'-')) {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while bytes.get(exp_end).is_some_and(u8::is_ascii_digit) {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    s[..end].parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Treats empty and whitespace-only strings as absent.
pub fn non_empty(value: Option<&String>) -> Option<&str> {
    value.map(String::as_str).filter(|s| !s.trim().is_empty())
}

/// First candidate that is present and non-empty.
pub fn first_present<'a>(candidates: &[Option<&'a String>]) -> Option<&'a str> {
    candidates.iter().find_map(|c| non_empty(*c))
}

/**
 * currency_symbol
 * Default currency symbol for a stored user location; unknown or missing locations use "$".
 */
pub fn currency_symbol(location: Option<&str>) -> &'static str {
    match location.map(str::trim) {
        Some("United Kingdom") => "£",
        Some("Canada") | Some("Nicaragua") => "C$",
        Some(
            "Germany" | "France" | "Italy" | "Spain" | "Netherlands" | "Finland" | "Austria"
            | "Belgium" | "Portugal" | "Ireland",
        ) => "€",
        Some("Japan" | "China") => "¥",
        Some("Australia") => "A$",
        Some("Brazil") => "R$",
        Some("India") => "₹",
        Some("Sweden" | "Norway" | "Denmark") => "kr",
        Some("Switzerland") => "CHF",
        Some("New Zealand") => "NZ$",
        Some("South Korea") => "₩",
        Some("Singapore") => "S$",
        Some("Thailand") => "฿",
        Some("Malaysia") => "RM",
        Some("Philippines") => "₱",
        Some("Indonesia") => "Rp",
        Some("Vietnam") => "₫",
        Some("South Africa") => "R",
        Some("Egypt") => "E£",
        Some("Nigeria") => "₦",
        Some("Kenya") => "KSh",
        Some("Morocco") => "MAD",
        Some("Peru") => "S/",
        Some("Venezuela" | "Bolivia") => "Bs",
        Some("Paraguay") => "₲",
        Some("Costa Rica") => "₡",
        Some("Guatemala") => "Q",
        Some("Honduras") => "L",
        _ => "$",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_leading_number() {
        assert_eq!(parse_leading_number("49.99"), Some(49.99));
        assert_eq!(parse_leading_number("  12abc"), Some(12.0));
        assert_eq!(parse_leading_number(".5"), Some(0.5));
        assert_eq!(parse_leading_number("-3e2 USD"), Some(-300.0));
        assert_eq!(parse_leading_number("7e"), Some(7.0));
        assert_eq!(parse_leading_number("$10"), None);
        assert_eq!(parse_leading_number("."), None);
        assert_eq!(parse_leading_number(""), None);
    }

    #[test]
    fn test_scalar_coercion() {
        assert_eq!(Scalar::Number(4.5).as_number(), 4.5);
        assert_eq!(Scalar::Text("4.5".into()).as_number(), 4.5);
        assert_eq!(Scalar::Text("n/a".into()).as_number(), 0.0);
        assert_eq!(Scalar::Number(7.0).as_id().as_deref(), Some("7"));
        assert_eq!(Scalar::Text(" ".into()).as_id(), None);
    }

    #[derive(Deserialize)]
    struct Loose {
        #[serde(default, deserialize_with = "lenient_scalar")]
        price: Option<Scalar>,
        #[serde(default, deserialize_with = "lenient_string")]
        name: Option<String>,
    }

    #[test]
    fn test_lenient_fields_ignore_unusable_types() {
        let parse = |v: Value| serde_json::from_value::<Loose>(v).unwrap();

        let loose = parse(serde_json::json!({"price": true, "name": ["x"]}));
        assert_eq!(loose.price, None);
        assert_eq!(loose.name, None);

        let loose = parse(serde_json::json!({"price": {"amount": 80}, "name": 42}));
        assert_eq!(loose.price, None);
        assert_eq!(loose.name.as_deref(), Some("42"));

        let loose = parse(serde_json::json!({"price": "9.5"}));
        assert_eq!(loose.price, Some(Scalar::Text("9.5".into())));
        assert_eq!(loose.name, None);
    }

    #[test]
    fn test_first_present_skips_empty() {
        let empty = String::new();
        let title = "Shoe".to_string();
        assert_eq!(first_present(&[Some(&empty), None, Some(&title)]), Some("Shoe"));
        assert_eq!(first_present(&[None, Some(&empty)]), None);
    }

    #[test]
    fn test_currency_symbol() {
        assert_eq!(currency_symbol(Some("United Kingdom")), "£");
        assert_eq!(currency_symbol(Some("Japan")), "¥");
        assert_eq!(currency_symbol(Some("Germany")), "€");
        assert_eq!(currency_symbol(Some("Atlantis")), "$");
        assert_eq!(currency_symbol(None), "$");
    }
}
