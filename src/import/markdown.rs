//! Legacy wiki markup to site markdown.

use regex_lite::{Captures, Regex};
use std::sync::LazyLock;

/// `~~~ [php] ... ~~~`, case-insensitive, spanning lines.
static PHP_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)~~~\s*\[php\]\s*(.+?)\n~~~").expect("static regex is valid")
});

/// Rewrite legacy `~~~[php]` code blocks to fenced ```` ```php ```` blocks,
/// keeping the code itself verbatim. Text without such blocks is returned
/// unchanged.
///
/// Blocks nested in a blockquote (`> ~~~[php]`) are not handled: the
/// quote markers end up inside the fence.
pub fn convert_markdown(markdown: &str) -> String {
    PHP_BLOCK
        .replace_all(markdown, |caps: &Captures<'_>| {
            format!("\n```php\n{}\n```", &caps[1])
        })
        .into_owned()
}
