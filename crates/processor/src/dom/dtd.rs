// ABOUTME: Element classification tables (block, block limit, text block, void, raw text).
// ABOUTME: Drives block-boundary detection, filler placement, auto-wrapping and serialization.

/// Canonical order of table children.
pub const TABLE_ORDER: &[&str] = &["caption", "colgroup", "col", "thead", "tfoot", "tbody"];

/// Block-level elements that start a new layout block.
pub fn is_block(name: &str) -> bool {
    matches!(
        name,
        "address"
            | "article"
            | "aside"
            | "blockquote"
            | "details"
            | "div"
            | "dl"
            | "fieldset"
            | "figure"
            | "footer"
            | "form"
            | "h1"
            | "h2"
            | "h3"
            | "h4"
            | "h5"
            | "h6"
            | "header"
            | "hgroup"
            | "hr"
            | "menu"
            | "nav"
            | "ol"
            | "p"
            | "pre"
            | "section"
            | "table"
            | "ul"
    )
}

/// Elements that limit a block (containers of blocks).
pub fn is_block_limit(name: &str) -> bool {
    matches!(
        name,
        "article"
            | "aside"
            | "audio"
            | "body"
            | "caption"
            | "details"
            | "dir"
            | "div"
            | "dl"
            | "fieldset"
            | "figcaption"
            | "figure"
            | "footer"
            | "form"
            | "header"
            | "hgroup"
            | "menu"
            | "nav"
            | "ol"
            | "section"
            | "table"
            | "td"
            | "th"
            | "tr"
            | "ul"
            | "video"
    )
}

pub fn is_list_item(name: &str) -> bool {
    matches!(name, "li" | "dd" | "dt")
}

/// Children of a table row.
pub fn is_table_cell(name: &str) -> bool {
    matches!(name, "td" | "th")
}

/// Block boundary for filler purposes: blocks, block limits, list items.
pub fn is_block_like(name: &str) -> bool {
    is_block(name) || is_block_limit(name) || is_list_item(name)
}

/// Block-like elements that may directly contain text.
pub fn is_text_block(name: &str) -> bool {
    matches!(
        name,
        "address"
            | "article"
            | "aside"
            | "blockquote"
            | "body"
            | "caption"
            | "dd"
            | "details"
            | "div"
            | "dt"
            | "fieldset"
            | "figcaption"
            | "figure"
            | "footer"
            | "form"
            | "h1"
            | "h2"
            | "h3"
            | "h4"
            | "h5"
            | "h6"
            | "header"
            | "li"
            | "nav"
            | "p"
            | "pre"
            | "section"
            | "td"
            | "th"
    )
}

/// Every text block tag, for building per-tag rules.
pub const TEXT_BLOCKS: &[&str] = &[
    "address",
    "article",
    "aside",
    "blockquote",
    "body",
    "caption",
    "dd",
    "details",
    "div",
    "dt",
    "fieldset",
    "figcaption",
    "figure",
    "footer",
    "form",
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    "header",
    "li",
    "nav",
    "p",
    "pre",
    "section",
    "td",
    "th",
];

/// Containers whose bare inline children get wrapped into a paragraph.
pub fn accepts_blocks(name: &str) -> bool {
    matches!(
        name,
        "body"
            | "div"
            | "blockquote"
            | "td"
            | "th"
            | "li"
            | "dd"
            | "form"
            | "fieldset"
            | "section"
            | "article"
            | "aside"
            | "header"
            | "footer"
            | "nav"
            | "figure"
            | "details"
    )
}

/// Elements that never have children.
pub fn is_void(name: &str) -> bool {
    matches!(
        name,
        "area"
            | "base"
            | "br"
            | "col"
            | "embed"
            | "hr"
            | "img"
            | "input"
            | "link"
            | "meta"
            | "param"
            | "source"
            | "track"
            | "wbr"
    )
}

/// Elements whose text content is written without escaping.
pub fn is_raw_text(name: &str) -> bool {
    matches!(
        name,
        "script" | "style" | "xmp" | "iframe" | "noembed" | "noframes" | "noscript"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_blocks_are_block_like() {
        for tag in TEXT_BLOCKS {
            assert!(is_block_like(tag), "{tag} should be block-like");
            assert!(is_text_block(tag), "{tag} should be a text block");
        }
    }

    #[test]
    fn test_containers_that_reject_text() {
        for tag in ["ul", "ol", "dl", "table", "tr", "hr"] {
            assert!(is_block_like(tag));
            assert!(!is_text_block(tag));
        }
    }

    #[test]
    fn test_inline_elements_are_not_blocks() {
        for tag in ["span", "a", "b", "br", "img", "cke:encoded"] {
            assert!(!is_block_like(tag));
        }
    }
}
