//! Allow-list HTML filter for upstream responses rendered unescaped.
//!
//! Rewrites the document with lol_html: allow-listed elements are kept with
//! their scripting attributes removed, `<script>` elements are dropped
//! together with their content, and every other tag is stripped while its
//! content is preserved.

use lol_html::errors::RewritingError;
use lol_html::{element, rewrite_str, RewriteStrSettings};

/// Tags that survive the filter
const ALLOWED_TAGS: [&str; 19] = [
    "html", "head", "body", "title", "meta", "style", "h1", "h2", "h3", "div", "p", "span",
    "strong", "em", "ul", "ol", "li", "br", "pre",
];

/// Reduce `html` to the allow-listed subset
pub fn apply(html: &str) -> Result<String, RewritingError> {
    rewrite_str(
        html,
        RewriteStrSettings {
            element_content_handlers: vec![
                // Script bodies must not survive, not even as text
                element!("script", |el| {
                    el.remove();
                    Ok(())
                }),
                element!("*", |el| {
                    if el.removed() {
                        return Ok(());
                    }

                    let tag = el.tag_name();
                    if !ALLOWED_TAGS.contains(&tag.as_str()) {
                        el.remove_and_keep_content();
                        return Ok(());
                    }

                    // Strip event handlers from kept elements
                    let handlers: Vec<String> = el
                        .attributes()
                        .iter()
                        .map(|attr| attr.name())
                        .filter(|name| name.starts_with("on"))
                        .collect();
                    for name in handlers {
                        el.remove_attribute(&name);
                    }

                    // Strip javascript: URLs
                    for attr in ["href", "src"] {
                        if let Some(value) = el.get_attribute(attr) {
                            if value.trim().to_lowercase().starts_with("javascript:") {
                                el.remove_attribute(attr);
                            }
                        }
                    }

                    Ok(())
                }),
            ],
            ..RewriteStrSettings::default()
        },
    )
}
