use vartk_core::models::MergedVariantSite;

/// Orders the merged sites of a contig by position. The sort is stable, so
/// co-located sites keep their first-observation order and re-sorting an
/// already sorted list is a no-op.
pub fn sort_sites(sites: &mut [MergedVariantSite]) {
    sites.sort_by_key(|site| site.position);
}

/// Annotates every site with the distance to its neighbors. Expects the
/// sites to be position-sorted.
///
/// Co-located sites must not be measured against each other, so a neighbor
/// sharing the current position is skipped; when the two predecessors
/// share a position, the longer-length one bounds the usable flank and
/// wins. Distances are signed: adjacent overlapping events can push them
/// to zero or below.
pub fn assign_neighbor_distances(sites: &mut [MergedVariantSite], contig_length: u64) {
    let nof_sites = sites.len();

    for i in 0..nof_sites {
        let position = sites[i].position as i64;
        let effective_length = sites[i].effective_length() as i64;

        let dist_left = if i == 0 {
            // distance to the contig start
            position
        } else {
            let mut pred = i - 1;
            if sites[i - 1].position == sites[i].position && i > 1 {
                pred = i - 2;
            }
            if i > 1 && sites[i - 1].position == sites[i - 2].position {
                pred = if sites[i - 1].length > sites[i - 2].length {
                    i - 1
                } else {
                    i - 2
                };
            }
            position - sites[pred].position as i64 - sites[pred].effective_length() as i64 + 1
        };

        let dist_right = if i + 1 >= nof_sites {
            // distance to the contig end
            contig_length as i64 - position - effective_length + 1
        } else {
            let mut succ_position = sites[i + 1].position;
            if succ_position == sites[i].position {
                succ_position = if i + 2 < nof_sites {
                    sites[i + 2].position
                } else {
                    contig_length
                };
            }
            succ_position as i64 - position - effective_length + 1
        };

        sites[i].dist_left = dist_left;
        sites[i].dist_right = dist_right;
    }
}
