//! Published asset filename convention.
//!
//! Every published asset is named `today_YYYY-MM-DD.jpg`, with the date the
//! image was selected for. A new day means a new URL, so browser and proxy
//! caches never serve yesterday's image under today's name.
//!
//! The extension is always `.jpg`, even when the source was a `.jpeg` file.
//!
//! - `2024-01-01` → `today_2024-01-01.jpg`
//! - `today_2024-01-01.jpg` → `Some(2024-01-01)`
//! - `today_latest.jpg` → `None`

use chrono::NaiveDate;

const PREFIX: &str = "today_";
const SUFFIX: &str = ".jpg";
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Asset filename for `date`.
pub fn asset_filename(date: NaiveDate) -> String {
    format!("{PREFIX}{}{SUFFIX}", date.format(DATE_FORMAT))
}

/// Parse a filename produced by [`asset_filename`] back into its date.
///
/// Returns `None` for anything that does not follow the convention exactly.
pub fn parse_asset_filename(name: &str) -> Option<NaiveDate> {
    let date = name.strip_prefix(PREFIX)?.strip_suffix(SUFFIX)?;
    // %Y accepts more than four digits; the convention does not
    if date.len() != 10 {
        return None;
    }
    NaiveDate::parse_from_str(date, DATE_FORMAT).ok()
}

/// Name of the scratch file an asset is written to before being renamed
/// into place. Starts with a dot so it never parses as an asset.
pub fn staging_filename(asset: &str) -> String {
    format!(".{asset}.partial")
}
