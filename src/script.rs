//! Unicode subscripts and superscripts, e.g. for axis labels such as
//! "10⁻³" or "x₁₂" that do not need mathtext.

use std::fmt::Display;
use crate::Error;

fn subscript(c: char) -> Option<char> {
    match c {
        '0' ..= '9' => char::from_u32(0x2080 + (c as u32 - '0' as u32)),
        '-' => Some('\u{208B}'),
        '(' => Some('\u{208D}'),
        ')' => Some('\u{208E}'),
        _ => None,
    }
}

fn superscript(c: char) -> Option<char> {
    match c {
        '1' => Some('\u{B9}'),
        '2' => Some('\u{B2}'),
        '3' => Some('\u{B3}'),
        '0' | '4' ..= '9' =>
            char::from_u32(0x2070 + (c as u32 - '0' as u32)),
        '-' => Some('\u{207B}'),
        '(' => Some('\u{207D}'),
        ')' => Some('\u{207E}'),
        _ => None,
    }
}

fn convert(x: impl Display, f: fn(char) -> Option<char>)
           -> Result<String, Error> {
    x.to_string().chars()
        .map(|c| f(c).ok_or(Error::UnsupportedChar(c)))
        .collect()
}

/// Write `x` with unicode subscript characters.  Only digits, `-`,
/// `(` and `)` have a subscript form.
///
/// # Example
///
/// ```
/// assert_eq!(mplwp::unicode_sub(-12)?, "₋₁₂");
/// # Ok::<(), mplwp::Error>(())
/// ```
pub fn unicode_sub(x: impl Display) -> Result<String, Error> {
    convert(x, subscript)
}

/// Write `x` with unicode superscript characters.  Only digits, `-`,
/// `(` and `)` have a superscript form.
///
/// # Example
///
/// ```
/// assert_eq!(format!("10{}", mplwp::unicode_super(-3)?), "10⁻³");
/// # Ok::<(), mplwp::Error>(())
/// ```
pub fn unicode_super(x: impl Display) -> Result<String, Error> {
    convert(x, superscript)
}
