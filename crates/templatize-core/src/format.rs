//! Value formatting
//!
//! Stateless helpers turning a resolved value into output text: named
//! formats (case transforms, escape toggles), numeric specifiers through an
//! injected [`NumberFormatter`], HTML escaping and natural-language lists.

use crate::value::{format_number, Value};
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;
use tracing::error;

/// Largest precision a specifier may ask for
const MAX_PRECISION: usize = 20;

/// Largest padded width a specifier may ask for
const MAX_WIDTH: usize = 1024;

/// Word starts that `capitalize` upper-cases
static WORD_START: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:^|[^A-Za-z0-9_])[a-z]").expect("word start pattern is valid")
});

/// Numeric format failure
#[derive(Debug, Error, Clone, PartialEq)]
pub enum FormatError {
    #[error("unsupported format specifier '{0}'")]
    Unsupported(String),
}

/// Formats a number according to a specifier string such as `,.2f`
pub trait NumberFormatter: Send + Sync {
    fn format(&self, spec: &str, value: f64) -> Result<String, FormatError>;
}

/// Format a value for output.
///
/// Null, `false`, the empty string and NaN render as nothing; zero renders
/// as `0`.
pub fn format_value(
    value: &Value,
    format: Option<&str>,
    escape: bool,
    numbers: &dyn NumberFormatter,
) -> String {
    if value.is_blank() {
        return String::new();
    }
    let mut text = value.to_plain_string();
    let mut escape = escape;
    match format {
        None => {}
        Some("raw" | "html") => escape = false,
        Some("encode") => escape = true,
        Some("upper" | "caps" | "allcaps") => text = text.to_uppercase(),
        Some("lower") => text = text.to_lowercase(),
        Some("capitalize") => text = capitalize(&text),
        Some(spec) => match text.trim().parse::<f64>() {
            Ok(number) => match numbers.format(spec, number) {
                Ok(formatted) => text = formatted,
                Err(err) => error!(format = spec, error = %err, "Bad format value"),
            },
            Err(_) => error!(format = spec, value = %text, "Format applied to non-numeric value"),
        },
    }
    if escape {
        text = escape_html(&text);
    }
    text
}

/// Upper-case the first lowercase letter of each word, leaving `'s` alone
pub fn capitalize(text: &str) -> String {
    WORD_START
        .replace_all(text, |caps: &regex::Captures<'_>| {
            let matched = &caps[0];
            if matched == "'s" {
                matched.to_string()
            } else {
                matched.to_uppercase()
            }
        })
        .into_owned()
}

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            c => out.push(c),
        }
    }
    out
}

/// Join items as `A`, `A and B`, or `A, B, and C`
pub fn join_list(mut items: Vec<String>) -> String {
    match items.len() {
        0 => String::new(),
        1 => items.remove(0),
        2 => format!("{} and {}", items[0], items[1]),
        _ => {
            let last = items.pop().unwrap_or_default();
            format!("{}, and {last}", items.join(", "))
        }
    }
}

/// Default number formatter.
///
/// Understands `[sign][$][0][width][,][.precision][type]` where sign is one
/// of `+ - space` and type one of `d f e %`. Without a type, a precision
/// gives fixed notation and no precision gives the shortest form. Precision
/// is clamped to 20 digits and width to 1024 characters.
#[derive(Debug, Clone, Copy, Default)]
pub struct SpecFormatter;

#[derive(Debug, Default)]
struct Spec {
    sign: Option<char>,
    currency: bool,
    zero: bool,
    width: usize,
    grouping: bool,
    precision: Option<usize>,
    kind: Option<char>,
}

impl Spec {
    fn parse(spec: &str) -> Result<Self, FormatError> {
        let unsupported = || FormatError::Unsupported(spec.to_string());
        let mut parsed = Spec::default();
        let mut chars = spec.chars().peekable();

        if let Some(c @ ('+' | '-' | ' ')) = chars.peek().copied() {
            parsed.sign = Some(c);
            chars.next();
        }
        if chars.next_if_eq(&'$').is_some() {
            parsed.currency = true;
        }
        if chars.next_if_eq(&'0').is_some() {
            parsed.zero = true;
        }
        let mut width = String::new();
        while let Some(d) = chars.next_if(char::is_ascii_digit) {
            width.push(d);
        }
        if !width.is_empty() {
            let width: usize = width.parse().map_err(|_| unsupported())?;
            parsed.width = width.min(MAX_WIDTH);
        }
        if chars.next_if_eq(&',').is_some() {
            parsed.grouping = true;
        }
        if chars.next_if_eq(&'.').is_some() {
            let mut precision = String::new();
            while let Some(d) = chars.next_if(char::is_ascii_digit) {
                precision.push(d);
            }
            let precision: usize = precision.parse().map_err(|_| unsupported())?;
            parsed.precision = Some(precision.min(MAX_PRECISION));
        }
        if let Some(c @ ('d' | 'f' | 'e' | '%')) = chars.peek().copied() {
            parsed.kind = Some(c);
            chars.next();
        }
        if chars.next().is_some() {
            return Err(unsupported());
        }
        Ok(parsed)
    }
}

impl NumberFormatter for SpecFormatter {
    fn format(&self, spec: &str, value: f64) -> Result<String, FormatError> {
        let spec = Spec::parse(spec)?;
        if value.is_nan() {
            return Ok("NaN".to_string());
        }
        let magnitude = value.abs();
        let mut body = match (spec.kind, spec.precision) {
            (Some('d'), _) => format!("{:.0}", magnitude.round()),
            (Some('f'), p) => format!("{:.*}", p.unwrap_or(6), magnitude),
            (Some('e'), p) => exponent(magnitude, p.unwrap_or(6)),
            (Some('%'), p) => format!("{:.*}%", p.unwrap_or(6), magnitude * 100.0),
            (_, Some(p)) => format!("{:.*}", p, magnitude),
            _ => format_number(magnitude),
        };
        if spec.grouping && spec.kind != Some('e') {
            body = group_thousands(&body);
        }

        let negative = value < 0.0 && body.chars().any(|c| matches!(c, '1'..='9'));
        let sign = match (negative, spec.sign) {
            (true, _) => "-",
            (false, Some('+')) => "+",
            (false, Some(' ')) => " ",
            _ => "",
        };
        let currency = if spec.currency { "$" } else { "" };

        let len = sign.len() + currency.len() + body.chars().count();
        let pad = spec.width.saturating_sub(len);
        Ok(if spec.zero {
            format!("{sign}{currency}{}{body}", "0".repeat(pad))
        } else {
            format!("{}{sign}{currency}{body}", " ".repeat(pad))
        })
    }
}

/// `1.5e3` style with an explicitly signed exponent
fn exponent(value: f64, precision: usize) -> String {
    let formatted = format!("{:.*e}", precision, value);
    match formatted.split_once('e') {
        Some((mantissa, exp)) if exp.starts_with('-') => format!("{mantissa}e{exp}"),
        Some((mantissa, exp)) => format!("{mantissa}e+{exp}"),
        None => formatted,
    }
}

fn group_thousands(body: &str) -> String {
    let split = body
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(body.len());
    let (digits, rest) = body.split_at(split);
    let mut grouped = String::with_capacity(body.len() + digits.len() / 3);
    for (i, d) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(d);
    }
    grouped.push_str(rest);
    grouped
}
