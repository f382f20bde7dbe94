//! Table-of-contents page detection.

use crate::error::Result;
use crate::inference::{PromptBuilder, VisionLanguageModel};

use super::assembler::{render_page, ZOOM};
use super::backend::Rasterizer;
use super::scratch::ScratchDir;

/// Whether a model reply means "yes".
pub fn is_affirmative(reply: &str) -> bool {
    let reply = reply.trim_start();
    reply.starts_with('是')
        || reply
            .get(..3)
            .is_some_and(|head| head.eq_ignore_ascii_case("yes"))
}

/// The longest run of consecutive integers in `indices`, as `(first, last)`.
///
/// Input order and duplicates do not matter. Ties go to the lowest run.
pub fn longest_consecutive_run(indices: &[usize]) -> Option<(usize, usize)> {
    let mut sorted = indices.to_vec();
    sorted.sort_unstable();
    sorted.dedup();

    let (&first, rest) = sorted.split_first()?;
    let mut best = (first, first);
    let mut current = (first, first);

    for &index in rest {
        if index == current.1 + 1 {
            current.1 = index;
        } else {
            current = (index, index);
        }
        if current.1 - current.0 > best.1 - best.0 {
            best = current;
        }
    }

    Some(best)
}

/// Number of leading pages sampled for `page_count` pages at `rate`.
pub fn sample_size(page_count: usize, rate: f32) -> usize {
    ((page_count as f64) * f64::from(rate)).floor() as usize
}

/// Ask the vision model about each sampled page and return the catalogue run.
pub fn locate_catalogue(
    rasterizer: &dyn Rasterizer,
    vlm: &dyn VisionLanguageModel,
    prompts: &dyn PromptBuilder,
    scratch: &ScratchDir,
    page_count: usize,
    rate: f32,
) -> Result<Option<(usize, usize)>> {
    let sampled = sample_size(page_count, rate);
    let mut hits = Vec::new();

    for index in 0..sampled {
        let raster = render_page(rasterizer, index, ZOOM)?;
        let path = scratch.save_png(&raster.image)?;
        let reply = vlm.chat(&prompts.catalogue_prompt(&path))?;
        if is_affirmative(&reply) {
            hits.push(index);
        }
    }

    let run = longest_consecutive_run(&hits);
    log::info!(
        "catalogue search over {} pages: {} hits, run {:?}",
        sampled,
        hits.len(),
        run
    );
    Ok(run)
}
