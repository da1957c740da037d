//! Helpers to produce [Matplotlib][] plots for [Wikimedia Commons][].
//!
//! Usage
//! -----
//!
//! - [`uniform_sample`] picks evenly spaced elements of an array
//!   (useful to preview an animation on a few frames).
//! - [`bump`] and [`one_d_window`] build smooth cut-off functions,
//!   equal to 1 on a region and 0 outside a larger one.
//! - [`postprocess`] repairs, in place, an SVG file saved by
//!   Matplotlib: sizes in pixels, definitions first, a title and a
//!   description pointing to the Commons file page, and path data
//!   without superfluous zeros.
//! - [`unicode_sub`] and [`unicode_super`] write numbers as unicode
//!   sub- and superscripts, handy in axis labels.
//!
//! [Matplotlib]: https://matplotlib.org/
//! [Wikimedia Commons]: https://commons.wikimedia.org/

use std::fmt::{Display, Formatter};

pub mod bump;
pub mod sample;
pub mod script;
pub mod svg;

pub use bump::{bump, one_d_window, Bump, Window};
pub use sample::{uniform_indices, uniform_sample, uniform_sample_slice};
pub use script::{unicode_sub, unicode_super};
pub use svg::{postprocess, Postprocess, Report};

/// Base URL of the file pages on Wikimedia Commons.
pub const COMMONS_WEBSITE: &str = "https://commons.wikimedia.org/wiki/File:";

/// Second line of the description added to postprocessed SVG files.
pub const CREDIT: &str =
    "Plot created with mplwp, the Matplotlib extension for Wikipedia plots.";

/// Colour cycle used for the lines of Commons plots.
pub const COLOR_CYCLE: [&str; 11] = [
    "#0000cc", "#dd00aa", "#999900", "#00bb00", "#00bbcc", "#af77dd",
    "#f46644", "#ebca10", "#d0f011", "#66f800", "#99eeff"];

/// Possible errors of mplwp functions.
#[derive(Debug)]
pub enum Error {
    /// The number of requested samples is 0 or exceeds the length of
    /// the array.
    SampleCount { requested: usize, len: usize },
    /// The rounding length of a window is negative, not finite, or
    /// larger than the half width of the window.
    Rounding { rounding: f64, half_width: f64 },
    /// The file could not be read or written.
    Io(std::io::Error),
    /// The file is not well-formed XML.
    Xml(roxmltree::Error),
    /// The root element of the SVG file declares no default namespace.
    MissingNamespace,
    /// The root element of the SVG file lacks the given attribute.
    MissingAttribute(&'static str),
    /// The character has no unicode sub- or superscript counterpart.
    UnsupportedChar(char),
    /// The character cannot stand for the newlines of the path data:
    /// it is whitespace, `&`, `<`, `"`, or occurs in a `d` attribute.
    Placeholder(char),
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), std::fmt::Error> {
        match self {
            Error::SampleCount { requested, len } =>
                write!(f, "cannot take {} samples from an array of \
                           length {}", requested, len),
            Error::Rounding { rounding, half_width } =>
                write!(f, "rounding length {} must lie in [0, {}]",
                       rounding, half_width),
            Error::Io(e) => write!(f, "I/O error: {}", e),
            Error::Xml(e) => write!(f, "XML error: {}", e),
            Error::MissingNamespace =>
                write!(f, "the root element has no default namespace"),
            Error::MissingAttribute(a) =>
                write!(f, "the root element has no \"{}\" attribute", a),
            Error::UnsupportedChar(c) =>
                write!(f, "no unicode sub/superscript for {:?}", c),
            Error::Placeholder(c) =>
                write!(f, "{:?} cannot stand for the newlines of the \
                           path data", c),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            Error::Xml(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self { Error::Io(e) }
}

impl From<roxmltree::Error> for Error {
    fn from(e: roxmltree::Error) -> Self { Error::Xml(e) }
}

#[cfg(doctest)]
doc_comment::doctest!("../README.md");
