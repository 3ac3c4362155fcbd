//! Rendition selection by quality label

use crate::extractor::models::Rendition;
use crate::utils::error::VodError;
use tracing::debug;

/// Preferred labels, best first
pub const QUALITY_ORDER: [&str; 5] = ["source", "720p", "480p", "360p", "240p"];

/// Position of a label in [`QUALITY_ORDER`]; unknown labels rank last
pub fn quality_rank(label: &str) -> usize {
    QUALITY_ORDER
        .iter()
        .position(|q| q.eq_ignore_ascii_case(label))
        .unwrap_or(QUALITY_ORDER.len())
}

/// Pick the rendition to download
///
/// A requested label must match exactly (ignoring case). Without a request the
/// best ranked label wins; if the API only offers unranked labels, its first one is used.
/// `QualityNotFound` lists the available labels best first.
pub fn select_rendition<'a>(
    renditions: &'a [Rendition],
    requested: Option<&str>,
) -> Result<&'a Rendition, VodError> {
    if renditions.is_empty() {
        return Err(VodError::NoRenditionsAvailable);
    }

    if let Some(requested) = requested {
        return renditions
            .iter()
            .find(|r| r.quality.eq_ignore_ascii_case(requested))
            .ok_or_else(|| {
                let mut available: Vec<String> =
                    renditions.iter().map(|r| r.quality.clone()).collect();
                available.sort_by_key(|q| quality_rank(q));
                VodError::QualityNotFound {
                    requested: requested.to_string(),
                    available,
                }
            });
    }

    // min_by_key keeps the first of equal ranks, so unranked labels fall back to API order
    let best = renditions
        .iter()
        .min_by_key(|r| quality_rank(&r.quality))
        .ok_or(VodError::NoRenditionsAvailable)?;
    debug!("No quality requested, selected {}", best.quality);
    Ok(best)
}
