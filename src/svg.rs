//! Postprocessing of the SVG files written by Matplotlib.
//!
//! [`postprocess`] rewrites a file in place:
//!
//! 1. the `width` and `height` of the picture are expressed in `px`
//!    instead of `pt`;
//! 2. the `<defs>` elements are moved in front of all other elements;
//! 3. a `<title>` and a `<desc>` element, holding the file name and the
//!    address of its page on Wikimedia Commons, are inserted first;
//! 4. the path data of the `<path>` elements (directly under the root,
//!    a `<g>` or a `<defs>`) lose their superfluous zeros and get a
//!    space after each command letter.
//!
//! Path data written by Matplotlib contain newlines which an XML parser
//! would normalize to spaces.  They are hidden behind a placeholder
//! character during the processing and restored in the written file.

use std::{
    borrow::Cow,
    fmt::{Display, Formatter},
    fs,
    path::Path,
};
use lazy_static::lazy_static;
use regex::{Captures, Regex};
use roxmltree::{Document, ParsingOptions};
use tracing::debug;
use crate::{Error, COMMONS_WEBSITE, CREDIT};

/// Character standing for the newlines of path data during processing.
pub const PLACEHOLDER: char = '#';

const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";

/// SVG path commands.
const COMMANDS: &str = "MmLlHhVvCcSsQqTtAaZz";

lazy_static! {
    // `d` attributes (and not e.g. `id`).
    static ref PATH_DATA: Regex = Regex::new(r#"\bd="[^"]*""#).unwrap();
}

/// Replace the newlines of the `d` attributes of `text` by `placeholder`.
/// `\r\n` and lone `\r` count as one newline each.
pub fn hide_newlines(text: &str, placeholder: char) -> Cow<'_, str> {
    let to = placeholder.to_string();
    PATH_DATA.replace_all(text, |c: &Captures| {
        c[0].replace("\r\n", &to).replace(['\r', '\n'], &to)
    })
}

/// Inverse of [`hide_newlines`], writing `\n` for every newline.
pub fn restore_newlines(text: &str, placeholder: char) -> Cow<'_, str> {
    PATH_DATA.replace_all(text, |c: &Captures| c[0].replace(placeholder, "\n"))
}

/// Check that `placeholder` can stand for newlines in `text`: it must
/// survive XML parsing and must not already occur in a `d` attribute.
fn check_placeholder(text: &str, placeholder: char) -> Result<(), Error> {
    if placeholder.is_whitespace()
        || matches!(placeholder, '&' | '<' | '"')
        || PATH_DATA.find_iter(text).any(|m| m.as_str().contains(placeholder)) {
        return Err(Error::Placeholder(placeholder))
    }
    Ok(())
}

/// Length of the number `digits ['.' digits]` at the start of `s`.
fn number_len(s: &str) -> usize {
    let b = s.as_bytes();
    let mut i = 0;
    while i < b.len() && b[i].is_ascii_digit() { i += 1 }
    if i < b.len() && b[i] == b'.' {
        i += 1;
        while i < b.len() && b[i].is_ascii_digit() { i += 1 }
    }
    i
}

/// Remove the trailing zeros of the fractional part of `n`, and the
/// decimal point itself when the fraction vanishes.
fn canonical_number(n: &str) -> Cow<'_, str> {
    match n.split_once('.') {
        Some((int, frac)) if !frac.is_empty() => {
            let frac = frac.trim_end_matches('0');
            if !frac.is_empty() {
                Cow::Owned(format!("{}.{}", int, frac))
            } else if int.is_empty() {
                Cow::Borrowed("0")
            } else {
                Cow::Borrowed(int)
            }
        }
        _ => Cow::Borrowed(n),
    }
}

/// Remove superfluous zeros from the numbers of the path data `d`:
/// `12.000` → `12`, `.000` → `0`, `12.20300` → `12.203`.
///
/// # Example
///
/// ```
/// use mplwp::svg::trim_zeros;
/// assert_eq!(trim_zeros("M12.000 30.500"), "M12 30.5");
/// assert_eq!(trim_zeros(".000"), "0");
/// ```
pub fn trim_zeros(d: &str) -> Cow<'_, str> {
    let mut out = String::with_capacity(d.len());
    let mut changed = false;
    let mut rest = d;
    while let Some(c) = rest.chars().next() {
        if c.is_ascii_digit() || c == '.' {
            let len = number_len(rest);
            let n = canonical_number(&rest[.. len]);
            changed |= n.len() != len;
            out.push_str(&n);
            rest = &rest[len ..];
        } else {
            out.push(c);
            rest = &rest[c.len_utf8() ..];
        }
    }
    if changed { Cow::Owned(out) } else { Cow::Borrowed(d) }
}

/// Insert a space between each path command letter and the
/// non-whitespace character that immediately follows it.
///
/// # Example
///
/// ```
/// assert_eq!(mplwp::svg::space_commands("L5A3"), "L 5A 3");
/// ```
pub fn space_commands(d: &str) -> Cow<'_, str> {
    let mut out = String::new();
    let mut chars = d.char_indices().peekable();
    let mut copied = 0;
    while let Some((_, c)) = chars.next() {
        if !COMMANDS.contains(c) { continue }
        if let Some(&(j, next)) = chars.peek() {
            if !next.is_whitespace() {
                out.push_str(&d[copied .. j]);
                out.push(' ');
                copied = j;
            }
        }
    }
    // Spaces are inserted after the first char, so 0 means unchanged.
    if copied == 0 {
        Cow::Borrowed(d)
    } else {
        out.push_str(&d[copied ..]);
        Cow::Owned(out)
    }
}

/// [`trim_zeros`] followed by [`space_commands`].
pub fn trim_path_data(d: &str) -> Cow<'_, str> {
    match trim_zeros(d) {
        Cow::Borrowed(d) => space_commands(d),
        Cow::Owned(t) => Cow::Owned(space_commands(&t).into_owned()),
    }
}

/// Escape the XML special characters of `s`.  In attribute values,
/// quotes and whitespace other than spaces are escaped too so that
/// they survive attribute-value normalization.
fn xml_escape(s: &str, attribute: bool) -> Cow<'_, str> {
    let special = |c: char| matches!(c, '&' | '<' | '>')
        || (attribute && matches!(c, '"' | '\n' | '\r' | '\t'));
    if !s.contains(special) {
        return Cow::Borrowed(s)
    }
    let mut out = String::with_capacity(s.len() + 8);
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if attribute => out.push_str("&quot;"),
            '\n' if attribute => out.push_str("&#10;"),
            '\r' if attribute => out.push_str("&#13;"),
            '\t' if attribute => out.push_str("&#9;"),
            c => out.push(c),
        }
    }
    Cow::Owned(out)
}

#[derive(Debug, Clone)]
enum Node {
    Element(Element),
    Text(String),
    Comment(String),
}

impl Node {
    fn is(&self, ns: &str, name: &str) -> bool {
        matches!(self, Node::Element(e) if e.is(ns, name))
    }
}

/// Owned, mutable XML element.
#[derive(Debug, Clone)]
struct Element {
    ns: Option<String>,
    name: String,
    // Name as written, possibly with a prefix.
    qname: String,
    // Namespace declarations (prefix, URI) made on this element.
    xmlns: Namespaces,
    attributes: Vec<(String, String)>,
    children: Vec<Node>,
}

type Namespaces = Vec<(Option<String>, String)>;

fn in_scope(node: roxmltree::Node<'_, '_>) -> Namespaces {
    node.namespaces()
        .filter(|ns| ns.name() != Some("xml"))
        .map(|ns| (ns.name().map(str::to_owned), ns.uri().to_owned()))
        .collect()
}

fn qualify(prefix: Option<&str>, name: &str) -> String {
    match prefix {
        Some(p) => format!("{}:{}", p, name),
        None => name.to_owned(),
    }
}

impl Element {
    fn new(ns: &str, name: &str, text: String) -> Self {
        Element { ns: Some(ns.to_owned()),
                  name: name.to_owned(),
                  qname: name.to_owned(),
                  xmlns: vec![],
                  attributes: vec![],
                  children: vec![Node::Text(text)] }
    }

    /// Copy `node` and its descendants, dropping whitespace-only text.
    fn from_xml(node: roxmltree::Node<'_, '_>) -> Self {
        let scope = in_scope(node);
        let inherited = node.parent_element().map(in_scope)
            .unwrap_or_default();
        let xmlns = scope.iter()
            .filter(|d| !inherited.contains(d))
            .cloned().collect();
        let prefix_of = |uri: &str| -> Option<String> {
            if uri == XML_NAMESPACE { return Some("xml".to_owned()) }
            scope.iter().find(|(p, u)| p.is_some() && u == uri)
                .and_then(|(p, _)| p.clone())
        };
        let tag = node.tag_name();
        let prefix = match tag.namespace() {
            Some(uri) if !scope.iter().any(|(p, u)| p.is_none() && u == uri)
                => prefix_of(uri),
            _ => None,
        };
        let attributes = node.attributes().map(|a| {
            let p = a.namespace().and_then(&prefix_of);
            (qualify(p.as_deref(), a.name()), a.value().to_owned())
        }).collect();
        let mut children = vec![];
        for c in node.children() {
            if c.is_element() {
                children.push(Node::Element(Element::from_xml(c)));
            } else if c.is_text() {
                let t = c.text().unwrap_or("");
                if !t.trim().is_empty() {
                    children.push(Node::Text(t.to_owned()));
                }
            } else if c.is_comment() {
                children.push(Node::Comment(c.text().unwrap_or("").to_owned()));
            }
        }
        Element { ns: tag.namespace().map(str::to_owned),
                  name: tag.name().to_owned(),
                  qname: qualify(prefix.as_deref(), tag.name()),
                  xmlns, attributes, children }
    }

    fn is(&self, ns: &str, name: &str) -> bool {
        self.ns.as_deref() == Some(ns) && self.name == name
    }

    fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.iter().find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    fn set_attr(&mut self, name: &str, value: String) {
        match self.attributes.iter_mut().find(|(n, _)| n == name) {
            Some((_, v)) => *v = value,
            None => self.attributes.push((name.to_owned(), value)),
        }
    }

    fn elements_mut(&mut self) -> impl Iterator<Item = &mut Element> {
        self.children.iter_mut().filter_map(|c| match c {
            Node::Element(e) => Some(e),
            _ => None })
    }

    /// Serialize with two spaces of indentation per level.  Elements
    /// containing text are written on a single line.
    fn write(&self, out: &mut String, depth: usize) {
        out.push('<');
        out.push_str(&self.qname);
        for (prefix, uri) in &self.xmlns {
            out.push_str(" xmlns");
            if let Some(p) = prefix {
                out.push(':');
                out.push_str(p);
            }
            out.push_str("=\"");
            out.push_str(&xml_escape(uri, true));
            out.push('"');
        }
        for (name, value) in &self.attributes {
            out.push(' ');
            out.push_str(name);
            out.push_str("=\"");
            out.push_str(&xml_escape(value, true));
            out.push('"');
        }
        if self.children.is_empty() {
            out.push_str("/>");
            return
        }
        out.push('>');
        let indent = !self.children.iter().any(|c| matches!(c, Node::Text(_)));
        for c in &self.children {
            if indent {
                out.push('\n');
                out.push_str(&"  ".repeat(depth + 1));
            }
            match c {
                Node::Element(e) => e.write(out, depth + 1),
                Node::Text(t) => out.push_str(&xml_escape(t, false)),
                Node::Comment(t) => {
                    out.push_str("<!--");
                    out.push_str(t);
                    out.push_str("-->");
                }
            }
        }
        if indent {
            out.push('\n');
            out.push_str(&"  ".repeat(depth));
        }
        out.push_str("</");
        out.push_str(&self.qname);
        out.push('>');
    }
}

/// Outcome of the postprocessing of a file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Report {
    /// Number of paths whose data was shortened.
    pub rewritten: usize,
    /// Number of paths whose data was already minimal.
    pub unchanged: usize,
    /// Number of paths left untouched because they have no data.
    pub skipped: usize,
    /// Whether a title and a description were added.
    pub metadata: bool,
}

impl Display for Report {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), std::fmt::Error> {
        write!(f, "{} paths trimmed, {} unchanged, {} skipped",
               self.rewritten, self.unchanged, self.skipped)?;
        if !self.metadata {
            write!(f, ", metadata kept")?;
        }
        Ok(())
    }
}

/// Trim the data of the paths of `group` and, recursively, of its
/// `<g>` and `<defs>` sub-elements.
fn trim_group(group: &mut Element, ns: &str, report: &mut Report) {
    for el in group.elements_mut() {
        if el.is(ns, "path") {
            let d = match el.attr("d") {
                Some(d) => trim_path_data(d).into_owned(),
                None => {
                    debug!(id = el.attr("id").unwrap_or(""),
                           "path without data left untouched");
                    report.skipped += 1;
                    continue
                }
            };
            if el.attr("d") == Some(d.as_str()) {
                report.unchanged += 1;
            } else {
                el.set_attr("d", d);
                report.rewritten += 1;
            }
        } else if el.is(ns, "g") || el.is(ns, "defs") {
            trim_group(el, ns, report);
        }
    }
}

/// Whether `svg` starts with a title and a description.
fn has_metadata(svg: &Element, ns: &str) -> bool {
    matches!(svg.children.as_slice(),
             [t, d, ..] if t.is(ns, "title") && d.is(ns, "desc"))
}

/// Options of the postprocessing of an SVG file.
///
/// # Example
///
/// ```no_run
/// use mplwp::Postprocess;
/// let report = Postprocess::new()
///     .name("Bump function.svg")
///     .skip_existing_metadata(true)
///     .to_file("target/bump.svg")?;
/// println!("{}", report);
/// # Ok::<(), mplwp::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct Postprocess {
    website: String,
    name: Option<String>,
    placeholder: char,
    skip_existing_metadata: bool,
}

impl Default for Postprocess {
    fn default() -> Self { Self::new() }
}

impl Postprocess {
    pub fn new() -> Self {
        Postprocess { website: COMMONS_WEBSITE.to_owned(),
                      name: None,
                      placeholder: PLACEHOLDER,
                      skip_existing_metadata: false }
    }

    /// Base URL prepended to the file name in the description.
    /// Default: [`COMMONS_WEBSITE`].
    pub fn website(&mut self, url: &str) -> &mut Self {
        self.website = url.to_owned();
        self
    }

    /// Name of the file on the website, used for the title and the
    /// description.  Default: the path given to [`Postprocess::to_file`].
    pub fn name(&mut self, name: &str) -> &mut Self {
        self.name = Some(name.to_owned());
        self
    }

    /// Character standing for the newlines of the path data during the
    /// processing.  Processing fails with [`Error::Placeholder`] if it
    /// is whitespace, `&`, `<`, `"` or occurs in a `d` attribute of the
    /// file.  Default: [`PLACEHOLDER`].
    pub fn placeholder(&mut self, c: char) -> &mut Self {
        self.placeholder = c;
        self
    }

    /// Do not add a title and a description if the first two elements
    /// already are a `<title>` and a `<desc>`, so that processing a file
    /// twice does not duplicate them.  Default: `false`.
    pub fn skip_existing_metadata(&mut self, b: bool) -> &mut Self {
        self.skip_existing_metadata = b;
        self
    }

    /// Postprocess the SVG document `text` whose file is called `name`
    /// and return the new document.
    pub fn process_str(
        &self, text: &str, name: &str
    ) -> Result<(String, Report), Error> {
        let name = self.name.as_deref().unwrap_or(name);
        check_placeholder(text, self.placeholder)?;
        let hidden = hide_newlines(text, self.placeholder);
        let opt = ParsingOptions { allow_dtd: true,
                                   ..ParsingOptions::default() };
        let doc = Document::parse_with_options(&hidden, opt)?;
        let root = doc.root_element();
        let ns = root.lookup_namespace_uri(None)
            .ok_or(Error::MissingNamespace)?;
        let mut svg = Element::from_xml(root);
        let mut report = Report::default();

        for a in ["width", "height"] {
            let v = svg.attr(a).ok_or(Error::MissingAttribute(a))?
                .replace("pt", "px");
            svg.set_attr(a, v);
        }
        debug!(width = svg.attr("width"), height = svg.attr("height"),
               "size set in pixels");

        let metadata: Vec<Node> = if self.skip_existing_metadata
            && has_metadata(&svg, ns) {
            debug!("title and description already present");
            svg.children.drain(.. 2).collect()
        } else {
            let title = Element::new(ns, "title", name.to_owned());
            let desc = Element::new(
                ns, "desc", format!("{}{}\n{}", self.website, name, CREDIT));
            report.metadata = true;
            debug!(name, "title and description added");
            vec![Node::Element(title), Node::Element(desc)]
        };

        // Stable: the other elements keep their order.
        svg.children.sort_by_key(|c| !c.is(ns, "defs"));
        let others = std::mem::replace(&mut svg.children, metadata);
        svg.children.extend(others);

        trim_group(&mut svg, ns, &mut report);
        debug!(%report, "path data trimmed");

        let mut out = String::with_capacity(text.len());
        svg.write(&mut out, 0);
        out.push('\n');
        let out = restore_newlines(&out, self.placeholder).into_owned();
        Ok((out, report))
    }

    /// Postprocess the SVG file at `path` in place.  The file is only
    /// replaced once the new content is complete.
    pub fn to_file(&self, path: impl AsRef<Path>) -> Result<Report, Error> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        let name = path.to_string_lossy();
        let (out, report) = self.process_str(&text, &name)?;
        let mut tmp = path.as_os_str().to_owned();
        tmp.push(".mplwp~");
        if let Err(e) = fs::write(&tmp, out)
            .and_then(|()| fs::rename(&tmp, path)) {
            let _ = fs::remove_file(&tmp);
            return Err(e.into())
        }
        debug!(path = %path.display(), "postprocessed");
        Ok(report)
    }
}

/// Postprocess, in place, the SVG file at `path` generated by
/// Matplotlib, with the default options (see [`Postprocess`]).
pub fn postprocess(path: impl AsRef<Path>) -> Result<Report, Error> {
    Postprocess::new().to_file(path)
}
