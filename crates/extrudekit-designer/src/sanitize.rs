//! Markup clean-up before and after the structural parser.

use regex::Regex;
use std::borrow::Cow;
use std::sync::LazyLock;

use crate::error::{ConvertError, ConvertResult};

static XML_DECLARATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<\?xml[^>]*\?>").expect("invalid declaration regex"));

static DOCTYPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<!DOCTYPE(?:[^\[>]*\[.*?\])?[^>]*>").expect("invalid doctype regex")
});

static TEXT_ELEMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<text\b[^>]*>.*?</text\s*>").expect("invalid text regex")
});

static TYPOGRAPHIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[™®©]|&trade;|&reg;|&copy;").expect("invalid symbol regex"));

static XMLNS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^<svg\b[^>]*\sxmlns\s*="#).expect("invalid xmlns regex"));

const SVG_NAMESPACE: &str = "http://www.w3.org/2000/svg";

/// Strip decorations that break the structural parser.
///
/// Removes XML declarations, DOCTYPE blocks, `<text>` elements whose
/// content carries a trademark, registered, or copyright sign (in raw or
/// entity form), and finally every remaining such sign.
pub fn sanitize_markup(markup: &str) -> String {
    let without_decl = XML_DECLARATION.replace_all(markup, "");
    let without_doctype = DOCTYPE.replace_all(&without_decl, "");
    let without_labels = TEXT_ELEMENT.replace_all(&without_doctype, |caps: &regex::Captures| {
        let element = &caps[0];
        if TYPOGRAPHIC.is_match(element) {
            tracing::debug!("Dropping text element with typographic symbols");
            String::new()
        } else {
            element.to_string()
        }
    });
    TYPOGRAPHIC.replace_all(&without_labels, "").into_owned()
}

/// Check markup against the host's import rules and normalize it.
///
/// Declarations are stripped, the result must start with `<svg` and contain
/// `</svg>`, and the SVG namespace is added when missing.
pub fn prepare_for_host(markup: &str) -> ConvertResult<String> {
    let cleaned = XML_DECLARATION.replace_all(markup, "");
    let cleaned = DOCTYPE.replace_all(&cleaned, "");
    let cleaned = cleaned.trim();

    if !cleaned.starts_with("<svg") {
        return Err(ConvertError::MissingRoot);
    }
    if !cleaned.contains("</svg>") {
        return Err(ConvertError::Malformed("missing closing </svg> tag".into()));
    }

    let out: Cow<'_, str> = if XMLNS.is_match(cleaned) {
        Cow::Borrowed(cleaned)
    } else {
        Cow::Owned(cleaned.replacen("<svg", &format!("<svg xmlns=\"{}\"", SVG_NAMESPACE), 1))
    };
    Ok(out.into_owned())
}
