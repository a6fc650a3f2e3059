//! Basic example demonstrating colorkmeans-rs usage
//!
//! Run with: cargo run --example basic --release

use colorkmeans_rs::report::ClusterReport;
use colorkmeans_rs::{ColorKMeans, ColorVector, Item, KMeansConfig};
use ndarray_rand::rand_distr::{Distribution, Uniform};

fn main() {
    println!("=== colorkmeans-rs example ===\n");

    // Items scattered around four base colors
    let bases = [
        ("Red", [0.8f32, 0.1, 0.1]),
        ("Blue", [0.1, 0.2, 0.7]),
        ("White", [0.9, 0.9, 0.9]),
        ("Gold", [0.8, 0.7, 0.2]),
    ];
    let noise = Uniform::new(-0.08f32, 0.08);
    let mut rng = rand::thread_rng();

    let mut items = Vec::new();
    for (name, base) in bases.iter() {
        for i in 0..5 {
            let [r, g, b] = base.map(|c| (c + noise.sample(&mut rng)).clamp(0.0, 1.0));
            let label = format!("{} {}", name, i + 1);
            let thumbnail = format!("thumbs/{}_{}.png", name, i + 1);
            items.push(Item::new(label, ColorVector::new(r, g, b), thumbnail));
        }
    }

    println!("Generated {} items around {} base colors\n", items.len(), bases.len());

    let config = KMeansConfig::new(4).with_seed(42);
    let mut kmeans = ColorKMeans::with_config(config);
    let result = kmeans.cluster_items(&mut items).expect("Clustering failed");

    println!(
        "Kept restart {} of {} (inertia {:.5})\n",
        result.best_run + 1,
        result.run_inertias.len(),
        result.inertia
    );

    let report = ClusterReport::new(&items, result).expect("Report failed");
    print!("{}", report);

    println!("\n=== Done! ===");
}
