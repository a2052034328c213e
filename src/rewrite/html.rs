//! HTML document rewriting.
//!
//! Rewrites are spliced into the original text: only the bytes of a changed
//! attribute value or JSON-LD body are replaced, everything else (whitespace,
//! quoting, attribute order, comments) is kept as written.
//!
//! | Element | Attribute | Rule |
//! |---------|-----------|------|
//! | `link[rel~=manifest]` | `href` | redirect to the hashed `manifest-*.json` |
//! | any | `src`, `href`, `content` | resolve through the mapping |
//! | `a` | `href` | only `.html`/`.css`/`.js`/`.json` targets |
//! | any | `srcset` | each URL resolved, descriptors kept |
//! | `script[type=application/ld+json]` | body | JSON-LD rules |

use crate::utils::html::{Edit, StartTag, apply_edits, escape_attr, tokenize};
use crate::utils::path::{extension_of, split_suffix};

use super::UrlResolver;
use super::jsonld::rewrite_jsonld;

/// Attributes whose whole value is a single URL.
const URL_ATTRS: &[&str] = &["src", "href", "content"];

/// Extensions an anchor must point at to be rewritten.
const ANCHOR_EXTENSIONS: &[&str] = &["html", "css", "js", "json"];

/// A rewritten HTML document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HtmlEdit {
    pub text: String,
    /// Number of attribute values and script bodies replaced.
    pub replacements: usize,
}

/// Rewrite asset references in `html`, or `None` when nothing changed.
///
/// `manifest_href` is the output-relative path of the hashed web manifest,
/// if the build produced one.
pub fn rewrite_html(html: &str, resolver: &UrlResolver<'_>, manifest_href: Option<&str>) -> Option<HtmlEdit> {
    let mut edits = Vec::new();

    for tag in tokenize(html) {
        let manifest_link = tag.name == "link" && is_manifest_link(&tag);

        for attr in &tag.attrs {
            let Some(span) = attr.value_span.clone() else {
                continue;
            };
            let value = attr.value();

            let updated = match attr.name.as_str() {
                "href" if manifest_link => match manifest_href {
                    Some(target) => redirect(&value, target, resolver),
                    None => resolver.update_url(&value),
                },
                "href" if tag.name == "a" && !is_rewritable_anchor(&value) => None,
                "srcset" => rewrite_srcset(&value, resolver),
                name if URL_ATTRS.contains(&name) => resolver.update_url(&value),
                _ => None,
            };

            if let Some(text) = updated {
                edits.push(Edit {
                    span,
                    text: escape_attr(&text).into_owned(),
                });
            }
        }

        if let Some(body) = tag.body.clone().filter(|_| is_ld_json(&tag))
            && let Some(text) = rewrite_jsonld(&html[body.clone()], resolver)
        {
            edits.push(Edit { span: body, text });
        }
    }

    if edits.is_empty() {
        return None;
    }
    let replacements = edits.len();
    Some(HtmlEdit {
        text: apply_edits(html, edits),
        replacements,
    })
}

fn is_manifest_link(tag: &StartTag<'_>) -> bool {
    tag.attr_value("rel")
        .is_some_and(|rel| rel.split_ascii_whitespace().any(|r| r.eq_ignore_ascii_case("manifest")))
}

fn is_ld_json(tag: &StartTag<'_>) -> bool {
    tag.name == "script"
        && tag
            .attr_value("type")
            .is_some_and(|t| t.trim().eq_ignore_ascii_case("application/ld+json"))
}

/// Anchors are page links; only rewrite ones that point at a built document.
fn is_rewritable_anchor(href: &str) -> bool {
    let (path, _) = split_suffix(href.trim());
    extension_of(path).is_some_and(|ext| ANCHOR_EXTENSIONS.contains(&ext.as_str()))
}

/// Point a manifest link at `target`, keeping the link's absolute/relative form.
fn redirect(href: &str, target: &str, resolver: &UrlResolver<'_>) -> Option<String> {
    let (_, suffix) = split_suffix(href.trim());
    let rebuilt = resolver.format(target, resolver.is_absolute(href), suffix);
    (rebuilt != href).then_some(rebuilt)
}

/// Rewrite every URL of a `srcset` list, keeping descriptors verbatim.
///
/// `/a.png 1x, /b.png 2x` → `/assets/a-1234abcd.png 1x, /assets/b-5678ef90.png 2x`.
pub fn rewrite_srcset(srcset: &str, resolver: &UrlResolver<'_>) -> Option<String> {
    let mut changed = false;
    let candidates: Vec<String> = srcset
        .split(',')
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(|candidate| {
            let (url, descriptor) = match candidate.split_once(char::is_whitespace) {
                Some((url, rest)) => (url, Some(rest.trim())),
                None => (candidate, None),
            };
            let url = match resolver.update_url(url) {
                Some(updated) => {
                    changed = true;
                    updated
                }
                None => url.to_string(),
            };
            match descriptor {
                Some(d) if !d.is_empty() => format!("{url} {d}"),
                _ => url,
            }
        })
        .collect();

    changed.then(|| candidates.join(", "))
}
