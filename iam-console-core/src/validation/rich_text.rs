//! Rich-text (HTML) helpers for editor content

use std::sync::LazyLock;

use regex::Regex;

#[allow(clippy::expect_used)]
static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").expect("valid tag pattern"));

#[allow(clippy::expect_used)]
static IMAGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<img\b[^>]*>").expect("valid image pattern"));

#[allow(clippy::expect_used)]
static NBSP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)&nbsp;|&#160;|&#xa0;").expect("valid entity pattern"));

/// Whether editor content carries nothing a reader would see.
///
/// An empty paragraph such as `<p><br></p>` is blank; an image alone is not.
pub fn is_blank(html: &str) -> bool {
    if IMAGE.is_match(html) {
        return false;
    }
    let text = TAG.replace_all(html, "");
    NBSP.replace_all(&text, " ").trim().is_empty()
}

/// Plain-text rendering for list cells: tags stripped, images shown as `[image]`.
pub fn preview(html: &str) -> String {
    let with_images = IMAGE.replace_all(html, "[image]");
    let text = TAG.replace_all(&with_images, "");
    NBSP.replace_all(&text, " ").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_editor_markup_is_blank() {
        assert!(is_blank(""));
        assert!(is_blank("<p><br></p>"));
        assert!(is_blank("<p>&nbsp; </p>\n<p></p>"));
    }

    #[test]
    fn text_or_images_are_content() {
        assert!(!is_blank("<p>Maintenance tonight</p>"));
        assert!(!is_blank(r#"<p><img src="data:image/png;base64,AAAA"></p>"#));
        assert!(!is_blank("<IMG SRC=x.png>"));
    }

    #[test]
    fn preview_strips_markup() {
        assert_eq!(
            preview(r#"<p>Hello <b>world</b></p><p><img src="a.png"/></p>"#),
            "Hello world[image]"
        );
        assert_eq!(preview("<p>&nbsp;</p>"), "");
    }
}
