//! Finding the embedded player on a page.

use dom::{Document, NodeKey, SelectorList};
use log::{debug, info, warn};

/// A container holding a playable embedded frame, and that frame's source.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScanResult {
    pub container: NodeKey,
    pub source: String,
}

#[derive(Debug)]
pub struct Scanner {
    selectors: Vec<(String, SelectorList)>,
}

impl Scanner {
    /// Compile the container selectors. Ones that do not parse are skipped.
    pub fn new<I>(selectors: I) -> Self
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let selectors = selectors
            .into_iter()
            .filter_map(|text| {
                let text = text.as_ref();
                match text.parse::<SelectorList>() {
                    Ok(list) => Some((text.to_owned(), list)),
                    Err(err) => {
                        warn!("[scanner] ignoring selector {text:?}: {err}");
                        None
                    }
                }
            })
            .collect();
        Self { selectors }
    }

    pub fn selector_count(&self) -> usize {
        self.selectors.len()
    }

    /// The first container, by selector order, whose frame has a source.
    pub fn scan(&self, doc: &Document) -> Option<ScanResult> {
        let mut found_container = false;
        for (text, list) in &self.selectors {
            let Some(container) = doc
                .descendants(doc.root())
                .into_iter()
                .find(|node| list.matches(doc, *node))
            else {
                continue;
            };
            found_container = true;
            debug!("[scanner] container matched {text}");

            let Some(frame) = doc.first_descendant_by_tag(container, "iframe") else {
                if doc.first_descendant_by_tag(container, "video").is_some() {
                    info!("[scanner] {text} holds a native <video>; not supported");
                } else {
                    debug!("[scanner] no iframe inside {text}");
                }
                continue;
            };
            let Some(src) = doc
                .attribute(frame, "src")
                .map(|src| src.trim().to_owned())
                .filter(|src| !src.is_empty())
            else {
                debug!("[scanner] iframe inside {text} has no src");
                continue;
            };
            let source = resolve(doc, &src);
            info!("[scanner] found player {source}");
            return Some(ScanResult { container, source });
        }
        if !found_container {
            debug!("[scanner] no container matched any of {} selectors", self.selectors.len());
        }
        None
    }
}

/// Resolve `src` the way `HTMLIFrameElement.src` reports it.
fn resolve(doc: &Document, src: &str) -> String {
    doc.base_url()
        .and_then(|base| base.join(src).ok())
        .map_or_else(|| src.to_owned(), |url| url.to_string())
}
