//! Deterministic date → image selection.
//!
//! Every image in the pool gets a score for the date; the highest score
//! wins. Scores come from SHA-256, so the choice looks random day to day
//! but is fully reproducible: the same pool and date always give the same
//! image, on any machine.
//!
//! ## Scoring
//!
//! ```text
//! date_digest = SHA-256("2024-01-01")
//! score(img)  = first 8 bytes of SHA-256(date_digest || img), big-endian u64
//! ```
//!
//! Images are scanned in the pool's sorted order and replaced only on a
//! strictly greater score, so on a tie the lexicographically first image
//! wins.
//!
//! Adding or removing an image can change the pick for any date. There is no
//! stability guarantee across pool edits.

use crate::scan::ImagePool;
use chrono::NaiveDate;
use sha2::{Digest, Sha256};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SelectError {
    #[error("Image pool is empty")]
    EmptyPool,
    #[error("Date {date} is in the future (today is {today})")]
    FutureDate { date: NaiveDate, today: NaiveDate },
    #[error("Date {0} is before the supported range (2000-01-01)")]
    DateTooEarly(NaiveDate),
}

/// Earliest date the mapper accepts.
pub const EPOCH: NaiveDate = match NaiveDate::from_ymd_opt(2000, 1, 1) {
    Some(d) => d,
    None => panic!("invalid epoch"),
};

/// SHA-256 of the ISO `YYYY-MM-DD` rendering of `date`.
fn date_digest(date: NaiveDate) -> [u8; 32] {
    let iso = date.format("%Y-%m-%d").to_string();
    let mut digest = [0u8; 32];
    digest.copy_from_slice(&Sha256::digest(iso.as_bytes()));
    digest
}

fn score_with_digest(digest: &[u8; 32], image: &str) -> u64 {
    let mut hasher = Sha256::new();
    hasher.update(digest);
    hasher.update(image.as_bytes());
    let hash = hasher.finalize();
    let mut head = [0u8; 8];
    head.copy_from_slice(&hash[..8]);
    u64::from_be_bytes(head)
}

/// Score of a single image for `date`.
pub fn image_score(date: NaiveDate, image: &str) -> u64 {
    score_with_digest(&date_digest(date), image)
}

/// Every image in the pool paired with its score, in pool order.
pub fn rank_images(pool: &ImagePool, date: NaiveDate) -> Vec<(&str, u64)> {
    let digest = date_digest(date);
    pool.iter()
        .map(|img| (img, score_with_digest(&digest, img)))
        .collect()
}

/// Select the image for `date`.
///
/// `today` is the current date in the configured timezone; dates after it
/// are rejected, as are dates before [`EPOCH`]. Nothing is clamped.
pub fn select_image(
    pool: &ImagePool,
    date: NaiveDate,
    today: NaiveDate,
) -> Result<&str, SelectError> {
    if pool.is_empty() {
        return Err(SelectError::EmptyPool);
    }
    if date > today {
        return Err(SelectError::FutureDate { date, today });
    }
    if date < EPOCH {
        return Err(SelectError::DateTooEarly(date));
    }

    let mut best: Option<(&str, u64)> = None;
    for (img, score) in rank_images(pool, date) {
        match best {
            Some((_, max)) if score <= max => {}
            _ => best = Some((img, score)),
        }
    }

    best.map(|(img, _)| img).ok_or(SelectError::EmptyPool)
}
