//! K-means, k-medoids and DBSCAN on a simple 2D dataset, scored by silhouette.
//!
//! Run with `RUST_LOG=clustra=debug` to see per-iteration logs.

use clustra::{
    DbscanExt, Dbscan, DistanceMetric, KDistanceGraph, Kmeans, Kmedoids, MaskedDataset,
    Silhouette, NOISE,
};
use tracing_subscriber::EnvFilter;

fn main() -> clustra::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Three well-separated clusters in 2D, plus one masked-out reading.
    #[rustfmt::skip]
    let values: Vec<f32> = vec![
        // Cluster A (near origin)
        0.0, 0.0,   0.1, 0.2,   0.2, 0.1,   -0.1, 0.1,
        // Cluster B (near (5, 5))
        5.0, 5.0,   5.1, 4.9,   4.9, 5.1,   5.2, 5.2,
        // Cluster C (near (10, 0))
        10.0, 0.0,  10.1, 0.1,  9.9, -0.1,  10.2, 0.2,
        // Sensor glitch
        1e6, -1e6,
    ];
    let mut mask = vec![true; 13];
    mask[12] = false;
    let data = MaskedDataset::new(&values, 2)?.with_mask(&mask)?;
    let point = |i: usize| (data.tuple(i)[0], data.tuple(i)[1]);

    // --- K-means (k=3) ---
    let kmeans = Kmeans::new(3).with_seed(42).fit(&data)?;
    println!("=== K-means (k=3, {} iterations) ===", kmeans.iterations);
    for (i, label) in kmeans.labels.iter().enumerate() {
        let (x, y) = point(i);
        println!("  point {:2} ({:9.1}, {:9.1}) => cluster {}", i, x, y, label);
    }
    let scores = Silhouette::new(3).evaluate(&data, &kmeans.labels)?;
    println!("  mean silhouette: {:.3}", scores.mean);

    // --- K-medoids (k=3, Manhattan) ---
    let kmedoids = Kmedoids::new(3)
        .with_metric(DistanceMetric::Manhattan)
        .with_seed(42)
        .fit(&data)?;
    println!("\n=== K-medoids (k=3, Manhattan) ===");
    for (slot, idx) in kmedoids.medoid_indices.iter().enumerate() {
        println!("  cluster {} medoid: point {} (cost {:.2})", slot + 1, idx, kmedoids.costs[slot]);
    }

    // --- DBSCAN: pick eps from the k-distance curve ---
    let min_pts = 3;
    let curve = KDistanceGraph::new(min_pts - 1).compute(&data)?.knee_curve();
    println!("\n=== k-distance curve (k={}) ===\n  {:?}", min_pts - 1, curve);

    let dbscan = Dbscan::new(1.0, min_pts);
    let fit = dbscan.fit(&data)?;
    println!("\n=== DBSCAN (eps=1.0, min_pts={}) ===", min_pts);
    for (i, label) in fit.labels.iter().enumerate() {
        let tag = if *label == NOISE {
            "NOISE".to_string()
        } else {
            format!("cluster {}", label)
        };
        let (x, y) = point(i);
        println!("  point {:2} ({:9.1}, {:9.1}) => {}", i, x, y, tag);
    }

    let zero_based = dbscan.fit_predict_with_noise(&data)?;
    println!("  zero-based: {:?}", zero_based);
    Ok(())
}
