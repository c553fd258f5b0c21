use crate::model::InlineImage;

/// Maximum caption characters rendered into the placeholder.
pub const CAPTION_LIMIT: usize = 90;
pub const MOCK_MODEL: &str = "mock";

/// First [`CAPTION_LIMIT`] characters of `prompt`, escaped for SVG text.
pub fn placeholder_caption(prompt: &str) -> String {
    let truncated: String = prompt.chars().take(CAPTION_LIMIT).collect();
    escape_markup(&truncated)
}

fn escape_markup(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            other => escaped.push(other),
        }
    }
    escaped
}

/// Locally synthesised stand-in for a generated image.
pub fn placeholder_svg(prompt: &str) -> String {
    let caption = placeholder_caption(prompt);
    format!(
        r##"<svg xmlns="http://www.w3.org/2000/svg" width="1024" height="768" viewBox="0 0 1024 768">
<defs><linearGradient id="sky" x1="0" y1="0" x2="0" y2="1"><stop offset="0" stop-color="#8ec5ff"/><stop offset="1" stop-color="#e8f1fb"/></linearGradient></defs>
<rect width="1024" height="768" fill="url(#sky)"/>
<rect y="520" width="1024" height="248" fill="#7a8f6a"/>
<text x="512" y="330" font-family="sans-serif" font-size="44" text-anchor="middle" fill="#1d2b3a">Mock render</text>
<text x="512" y="390" font-family="sans-serif" font-size="22" text-anchor="middle" fill="#1d2b3a">{caption}</text>
</svg>"##
    )
}

pub fn placeholder_image(prompt: &str) -> InlineImage {
    InlineImage::from_bytes("image/svg+xml", placeholder_svg(prompt).as_bytes())
}
