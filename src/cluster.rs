use rayon::prelude::*;
use tracing::{debug, info};

use crate::models::TrendRecord;
use crate::similarity::are_similar_topics;

/// Partition a working set of recent records into story clusters.
///
/// Greedy single pass in input order: each unprocessed record seeds a new
/// cluster, then claims every later unprocessed record whose title is
/// similar to the SEED (not to other members). A record can only join the
/// first cluster whose seed it matches; that first-seed-wins behavior is
/// load-bearing for reproducible aggregation and is kept intact. The
/// similarity scan per seed is parallelized; membership is unaffected
/// because each candidate is compared against the seed alone.
///
/// O(n²) comparisons overall, acceptable while the recent window stays in
/// the hundreds of records.
pub fn cluster_records(records: &[TrendRecord]) -> Vec<Vec<usize>> {
    debug!("Clustering started - records={}", records.len());

    let mut assigned = vec![false; records.len()];
    let mut clusters: Vec<Vec<usize>> = Vec::new();
    let total = records.len();

    for i in 0..records.len() {
        if i % 50 == 0 && i > 0 {
            let pct = (i as f32 / total as f32 * 100.0) as u32;
            info!(
                "Clustering progress - processed={}/{} ({}%), clusters={}",
                i, total, pct, clusters.len()
            );
        }
        if assigned[i] {
            continue;
        }

        let mut members = vec![i];
        assigned[i] = true;

        let unassigned: Vec<usize> = ((i + 1)..records.len())
            .filter(|&j| !assigned[j])
            .collect();

        let seed = &records[i];
        let similar: Vec<usize> = unassigned
            .par_iter()
            .filter(|&&j| are_similar_topics(&records[j].title, &seed.title))
            .copied()
            .collect();

        for j in similar {
            assigned[j] = true;
            members.push(j);
        }

        clusters.push(members);
    }

    let sizes: Vec<usize> = clusters.iter().map(Vec::len).collect();
    if !sizes.is_empty() {
        let max_size = sizes.iter().max().unwrap();
        let multi = sizes.iter().filter(|&&s| s > 1).count();
        debug!(
            "Cluster size distribution - clusters={}, max={}, multi_member={}",
            clusters.len(),
            max_size,
            multi
        );
    }

    clusters
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CanonicalMetrics, TrendRecord};
    use chrono::Utc;

    fn record(title: &str, platform: &str) -> TrendRecord {
        let now = Utc::now();
        TrendRecord {
            title: title.to_string(),
            platform: platform.to_string(),
            category: "general".to_string(),
            country: "global".to_string(),
            content: String::new(),
            url: None,
            author: None,
            image_url: None,
            metrics: CanonicalMetrics {
                views: 0,
                likes: 0,
                comments: 0,
                shares: 0,
                published_at: now,
                platform: platform.to_string(),
            },
            published_at: now,
            engagement_score: 0.0,
            velocity_score: 0.0,
            recency_score: 0.0,
            virality_score: 0.0,
            composite_score: 0.0,
            trending_score: 0.0,
            created_at: now,
            updated_at: now,
        }
    }

    fn assert_exact_partition(n: usize, clusters: &[Vec<usize>]) {
        let mut seen = vec![false; n];
        for cluster in clusters {
            assert!(!cluster.is_empty(), "empty cluster emitted");
            for &idx in cluster {
                assert!(!seen[idx], "index {idx} appears in two clusters");
                seen[idx] = true;
            }
        }
        assert!(seen.iter().all(|&s| s), "some record lost from the partition");
    }

    #[test]
    fn empty_input_yields_empty_partition() {
        assert!(cluster_records(&[]).is_empty());
    }

    #[test]
    fn single_record_yields_singleton_cluster() {
        let records = vec![record("NASA launches new Mars rover mission", "twitter")];
        let clusters = cluster_records(&records);
        assert_eq!(clusters, vec![vec![0]]);
    }

    #[test]
    fn same_story_on_three_platforms_clusters_together() {
        let records = vec![
            record("NASA launches new Mars rover mission", "twitter"),
            record("Local bakery wins award", "news"),
            record("Mars rover mission begins NASA launch", "reddit"),
            record("NASA Mars rover mission launch coverage", "youtube"),
        ];
        let clusters = cluster_records(&records);
        assert_exact_partition(records.len(), &clusters);
        assert_eq!(clusters.len(), 2);
        assert_eq!(clusters[0], vec![0, 2, 3]);
        assert_eq!(clusters[1], vec![1]);
    }

    #[test]
    fn membership_is_seed_relative_first_seed_wins() {
        // b matches seed a; c matches b but not a, so c seeds its own
        // cluster even though it is closer to b.
        let records = vec![
            record("alpha bravo charlie delta", "twitter"),
            record("alpha bravo charlie echoes", "reddit"),
            record("alpha bravo echoes foxtrot", "news"),
        ];
        assert!(are_similar_topics(&records[0].title, &records[1].title));
        assert!(are_similar_topics(&records[1].title, &records[2].title));
        assert!(!are_similar_topics(&records[0].title, &records[2].title));

        let clusters = cluster_records(&records);
        assert_exact_partition(records.len(), &clusters);
        assert_eq!(clusters, vec![vec![0, 1], vec![2]]);
    }

    #[test]
    fn all_distinct_titles_stay_singletons() {
        let records = vec![
            record("Global markets rally after rate decision", "news"),
            record("Championship final ends in penalty shootout", "twitter"),
            record("New battery chemistry doubles electric range", "reddit"),
        ];
        let clusters = cluster_records(&records);
        assert_exact_partition(records.len(), &clusters);
        assert_eq!(clusters.len(), 3);
    }
}
