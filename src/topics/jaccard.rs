// Jaccard distance between topic sets.
//
//   1 - |A ∩ B| / |A ∪ B|
//
// 0.0 for identical sets (two empty sets included), 1.0 for disjoint ones.

use std::collections::BTreeSet;

use super::profile::AuthorTopicProfile;

pub fn jaccard_distance(a: &BTreeSet<String>, b: &BTreeSet<String>) -> f64 {
    let union = a.union(b).count();
    if union == 0 {
        return 0.0;
    }
    let intersection = a.intersection(b).count();
    1.0 - intersection as f64 / union as f64
}

/// Symmetric pairwise distance matrix over profiles, zero diagonal.
pub fn distance_matrix(profiles: &[AuthorTopicProfile]) -> Vec<Vec<f64>> {
    let n = profiles.len();
    let mut d = vec![vec![0.0; n]; n];
    for i in 0..n {
        for j in (i + 1)..n {
            let dist = jaccard_distance(&profiles[i].topics, &profiles[j].topics);
            d[i][j] = dist;
            d[j][i] = dist;
        }
    }
    d
}
