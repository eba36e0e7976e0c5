use std::str::FromStr;

use crate::shared::error::ConfigError;

/// A filename pattern with exactly one printf-style integer conversion,
/// e.g. `image_%04d.png` or `frame_%02ld.jpg`. `%%` is a literal percent.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LocationPattern {
    prefix: String,
    suffix: String,
    spec: IntegerSpec,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
struct IntegerSpec {
    left_align: bool,
    zero_pad: bool,
    plus_sign: bool,
    space_sign: bool,
    signed: bool,
    width: usize,
    precision: Option<usize>,
}

impl LocationPattern {
    /// Substitutes `index` into the pattern.
    pub fn format(&self, index: u64) -> String {
        format!("{}{}{}", self.prefix, self.spec.render(index), self.suffix)
    }
}

impl IntegerSpec {
    fn render(&self, value: u64) -> String {
        let mut digits = value.to_string();
        if let Some(precision) = self.precision {
            if digits.len() < precision {
                digits = format!("{}{digits}", "0".repeat(precision - digits.len()));
            }
        }
        let sign = match (self.signed, self.plus_sign, self.space_sign) {
            (true, true, _) => "+",
            (true, false, true) => " ",
            _ => "",
        };

        let len = sign.len() + digits.len();
        if len >= self.width {
            return format!("{sign}{digits}");
        }
        let pad = self.width - len;
        if self.left_align {
            format!("{sign}{digits}{}", " ".repeat(pad))
        } else if self.zero_pad && self.precision.is_none() {
            format!("{sign}{}{digits}", "0".repeat(pad))
        } else {
            format!("{}{sign}{digits}", " ".repeat(pad))
        }
    }
}

impl FromStr for LocationPattern {
    type Err = ConfigError;

    fn from_str(pattern: &str) -> Result<Self, Self::Err> {
        let malformed = |reason: &str| ConfigError::MalformedPattern {
            pattern: pattern.to_string(),
            reason: reason.to_string(),
        };

        let mut prefix = String::new();
        let mut suffix = String::new();
        let mut spec = None;
        let mut chars = pattern.chars().peekable();

        while let Some(c) = chars.next() {
            let out = if spec.is_some() { &mut suffix } else { &mut prefix };
            if c != '%' {
                out.push(c);
                continue;
            }
            if chars.peek() == Some(&'%') {
                chars.next();
                out.push('%');
                continue;
            }
            if spec.is_some() {
                return Err(malformed("more than one conversion specifier"));
            }

            let mut parsed = IntegerSpec::default();
            while let Some(&flag) = chars.peek() {
                match flag {
                    '-' => parsed.left_align = true,
                    '0' => parsed.zero_pad = true,
                    '+' => parsed.plus_sign = true,
                    ' ' => parsed.space_sign = true,
                    '#' | '\'' => {}
                    _ => break,
                }
                chars.next();
            }
            parsed.width = take_number(&mut chars).unwrap_or(0);
            if chars.peek() == Some(&'.') {
                chars.next();
                parsed.precision = Some(take_number(&mut chars).unwrap_or(0));
            }
            while let Some(&modifier) = chars.peek() {
                if !matches!(modifier, 'h' | 'l' | 'q' | 'j' | 'z' | 't') {
                    break;
                }
                chars.next();
            }
            match chars.next() {
                Some('d' | 'i') => parsed.signed = true,
                Some('u') => parsed.signed = false,
                Some(other) => {
                    return Err(malformed(&format!(
                        "conversion '%{other}' is not an integer conversion"
                    )))
                }
                None => return Err(malformed("pattern ends inside a conversion specifier")),
            }
            spec = Some(parsed);
        }

        let spec = spec.ok_or_else(|| malformed("no integer conversion specifier such as %04d"))?;
        Ok(Self {
            prefix,
            suffix,
            spec,
        })
    }
}

fn take_number(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> Option<usize> {
    let mut digits = String::new();
    while let Some(&c) = chars.peek() {
        if !c.is_ascii_digit() {
            break;
        }
        digits.push(c);
        chars.next();
    }
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::zero_padded("img_%04d.png", 7, "img_0007.png")]
    #[case::long_modifier("image_%02ld.png", 3, "image_03.png")]
    #[case::plain("%d", 12, "12")]
    #[case::unsigned("f%u.gif", 5, "f5.gif")]
    #[case::space_padded("%5d", 12, "   12")]
    #[case::left_aligned("%-5d|", 12, "12   |")]
    #[case::literal_percent("100%%_%d", 3, "100%_3")]
    #[case::percent_after("%d%%", 3, "3%")]
    #[case::plus_sign("%+d", 3, "+3")]
    #[case::precision("%.3d", 3, "003")]
    #[case::wider_than_width("%02d", 123, "123")]
    #[case::directory_prefix("/data/set/%03i/frame.png", 42, "/data/set/042/frame.png")]
    fn test_format(#[case] pattern: &str, #[case] index: u64, #[case] expected: &str) {
        let parsed: LocationPattern = pattern.parse().unwrap();
        assert_eq!(parsed.format(index), expected);
    }

    #[rstest]
    #[case::no_conversion("plain.png")]
    #[case::only_literal_percent("100%%.png")]
    #[case::two_conversions("%d_%d.png")]
    #[case::string_conversion("%s.png")]
    #[case::float_conversion("%04f.png")]
    #[case::dangling_percent("frame%")]
    #[case::dangling_width("frame%04")]
    fn test_rejects(#[case] pattern: &str) {
        assert!(matches!(
            pattern.parse::<LocationPattern>(),
            Err(ConfigError::MalformedPattern { .. })
        ));
    }
}
