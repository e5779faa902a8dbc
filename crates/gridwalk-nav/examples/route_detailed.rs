#[cfg(feature = "serde")]
use gridwalk_nav::PathResult;
use gridwalk_nav::{Coordinate, Grid, ViabilityMap};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // RUST_LOG=gridwalk_nav=debug shows every shortcut spliced into the route
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("Route search with detailed results");
    println!("==================================");

    // A seeded random map so every run shows the same scenario
    let mut rng = StdRng::seed_from_u64(2024);
    let map = Arc::new(ViabilityMap::new_rand(16, 10, 0.72, &mut rng)?);
    let mut grid = Grid::with_map(Arc::clone(&map));

    println!("\nMap layout (O = walkable, X = blocked):");
    print!("{}", grid.render(&[]));

    let start = first_viable(&map, 0).unwrap_or(Coordinate::new(0.0, 0.0));
    let goal = first_viable(&map, map.width() - 1).unwrap_or(Coordinate::new(15.0, 9.0));
    println!("\nStart: {}", start);
    println!("Goal: {}", goal);

    let result = grid.find_path_detailed(start, goal)?;
    println!("\nSearch result:");
    println!("{}", result);

    match &result.path {
        Some(waypoints) => {
            println!("\nWaypoints:");
            for (i, point) in waypoints.iter().enumerate() {
                println!("  {}: {}", i, point);
            }

            if let Some(cells) = grid.expand_waypoints(waypoints)? {
                println!("\nRoute visualization (# = route):");
                print!("{}", grid.render(&cells));
            }

            #[cfg(feature = "serde")]
            {
                println!("\nSerialization example:");
                let json = serde_json::to_string_pretty(&result)?;
                println!("PathResult as JSON:");
                println!("{}", json);

                let deserialized: PathResult = serde_json::from_str(&json)?;
                println!("\nDeserialized result: {}", deserialized);
            }

            #[cfg(not(feature = "serde"))]
            {
                println!("\nNote: Enable 'serde' feature to see serialization example");
                println!("Run with: cargo run --example route_detailed --features serde");
            }
        }
        None => println!("\nNo route found!"),
    }

    // A wall across the whole map leaves nothing to find
    println!("\n{}", "=".repeat(50));
    println!("Testing blocked scenario...");

    let mut rows = vec!["........"; 5];
    rows[2] = "########";
    let mut blocked = Grid::with_map(Arc::new(ViabilityMap::from_rows(&rows)?));
    let blocked_result =
        blocked.find_path_detailed(Coordinate::new(0.0, 0.0), Coordinate::new(7.0, 4.0))?;
    println!("Blocked scenario result: {}", blocked_result);

    Ok(())
}

/// Topmost walkable cell in column `x`.
fn first_viable(map: &ViabilityMap, x: usize) -> Option<Coordinate> {
    (0..map.height())
        .map(|y| gridwalk_nav::GridPoint::new(x, y))
        .find(|&p| map.is_viable(p))
        .map(Coordinate::from)
}
