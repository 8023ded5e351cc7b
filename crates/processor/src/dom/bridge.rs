// ABOUTME: String-to-tree bridge: insert markup into a container and read it back.
// ABOUTME: The html5ever default repairs structure the way assigning innerHTML would.

use scraper::Html;

/// A host surface that normalizes markup by loading it into a container
/// element and serializing the container's content back.
pub trait MarkupBridge {
    fn insert_and_read_back(&self, tag: &str, markup: &str) -> String;
}

/// Bridge backed by html5ever fragment parsing and serialization.
///
/// The fragment is always parsed in body context, whatever `tag` is.
#[derive(Debug, Clone, Copy, Default)]
pub struct Html5Bridge;

impl MarkupBridge for Html5Bridge {
    fn insert_and_read_back(&self, _tag: &str, markup: &str) -> String {
        Html::parse_fragment(markup).root_element().inner_html()
    }
}
