use dom_query::{Document, Selection};
use itertools::Itertools;
use url::Url;

/// Attributes that say nothing about gallery membership.
const NON_DISCRIMINATING: [&str; 3] = ["class", "alt", "id"];

/// Expand one representative image into every `img` that shares one of its
/// remaining attributes (e.g. a common `data-group` or `width`).
///
/// The representative is matched on its literal `src`, or on `src` resolved
/// against `base` when the extractor reported an absolute URL. Returns an
/// empty list when the element cannot be found.
pub fn aggregate(doc: &Document, representative: &str, base: Option<&Url>) -> Vec<String> {
    let images: Vec<Selection> = doc
        .select("img")
        .nodes()
        .iter()
        .map(|node| Selection::from(*node))
        .collect();

    let matches_src = |img: &Selection, resolve: bool| {
        img.attr("src").is_some_and(|src| {
            let src = src.trim();
            src == representative
                || (resolve
                    && base
                        .and_then(|b| b.join(src).ok())
                        .is_some_and(|abs| abs.as_str() == representative))
        })
    };
    let Some(hero) = images
        .iter()
        .find(|img| matches_src(*img, false))
        .or_else(|| images.iter().find(|img| matches_src(*img, true)))
    else {
        return Vec::new();
    };

    let Some(node) = hero.nodes().first() else {
        return Vec::new();
    };
    let attrs: Vec<(String, String)> = node
        .attrs()
        .iter()
        .map(|attr| (attr.name.local.to_string(), attr.value.to_string()))
        .filter(|(key, _)| !NON_DISCRIMINATING.contains(&key.as_str()))
        .collect();

    let images = &images;
    attrs
        .iter()
        .flat_map(move |(key, value)| {
            images
                .iter()
                .filter(move |img| img.attr(key).is_some_and(|v| &*v == value.as_str()))
        })
        .filter_map(|img| img.attr("src").map(|src| src.to_string()))
        .unique()
        .collect()
}
