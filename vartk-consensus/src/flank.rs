use anyhow::Result;

use vartk_core::models::{MergedVariantSite, VariantClass};
use vartk_refseq::ReferenceSet;

/// Two-tier gating: the full primary window when the neighbor distance
/// allows it, the fallback window otherwise, and no flank at all when the
/// neighbor is too close for either. The gate is strict, so a distance
/// equal to a threshold draws nothing.
fn flank_window(distance: i64, min_flank1: u64, min_flank2: u64) -> Option<u64> {
    if distance > min_flank1 as i64 {
        Some(min_flank1)
    } else if distance > min_flank2 as i64 {
        Some(min_flank2)
    } else {
        None
    }
}

/// The last reference base before the right flank starts, by class:
/// multi-base events end at position + length - 1, insertions sit before
/// their own position, and an SNV occupies exactly its position.
fn right_anchor(site: &MergedVariantSite) -> u64 {
    match site.class {
        VariantClass::Mnp | VariantClass::Deletion => site.position + site.length - 1,
        VariantClass::Insertion => site.position - 1,
        VariantClass::Snv => site.position,
    }
}

/// Extracts the flanking reference context of every site on a contig,
/// gated by the neighbor distances. Expects distances to be assigned.
pub fn assign_flanks(
    sites: &mut [MergedVariantSite],
    reference: &ReferenceSet,
    contig: &str,
    min_flank1: u64,
    min_flank2: u64,
) -> Result<()> {
    for site in sites.iter_mut() {
        site.left_flank = match flank_window(site.dist_left, min_flank1, min_flank2) {
            Some(window) => {
                let sequence =
                    reference.subsequence(contig, site.position - window, site.position - 1)?;
                Some(sequence.to_string())
            }
            None => None,
        };

        site.right_flank = match flank_window(site.dist_right, min_flank1, min_flank2) {
            Some(window) => {
                let anchor = right_anchor(site);
                let sequence = reference.subsequence(contig, anchor + 1, anchor + window)?;
                Some(sequence.to_string())
            }
            None => None,
        };
    }

    Ok(())
}
