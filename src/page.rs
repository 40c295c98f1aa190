//! HTML rendering for the image-of-the-day page.
//!
//! A single page: heading, tagline, and the current asset. Uses
//! [maud](https://maud.lambda.xyz/) so the asset filename is escaped on
//! interpolation.

use maud::{DOCTYPE, Markup, PreEscaped, html};

const CSS: &str = include_str!("../static/style.css");

/// URL prefix the asset directory is served under.
pub const ASSET_ROUTE: &str = "/assets";

/// Public URL for a published asset filename.
pub fn asset_url(filename: &str) -> String {
    format!("{ASSET_ROUTE}/{filename}")
}

/// Renders the base HTML document structure
fn base_document(title: &str, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) }
                link rel="icon" href="/favicon.ico";
                style { (PreEscaped(CSS)) }
            }
            body {
                (content)
            }
        }
    }
}

/// Render the page for the currently published asset.
///
/// `None` means nothing has been published yet (empty or unreadable image
/// directory at startup); a placeholder is shown instead of a broken image.
pub fn render_page(current: Option<&str>) -> Markup {
    let content = html! {
        h1 { "Image of the Day" }
        p { "Enjoy a new image every day!" }
        @if let Some(filename) = current {
            img src=(asset_url(filename)) alt="Image of the Day";
        } @else {
            p.placeholder { "No image available yet." }
        }
    };

    base_document("Image of the Day", content)
}
