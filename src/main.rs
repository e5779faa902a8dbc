mod dump;     // brings `dump.rs` in as `crate::dump`
mod settings; // brings `settings.rs` in as `crate::settings`

use std::sync::Arc;
use std::thread;

use anyhow::{Context, anyhow};
use gridwalk_nav::{Coordinate, Grid, PathResult, ViabilityMap};
use tracing::{error, info, warn};
use tracing_subscriber::{self, EnvFilter};

use dump::Dumper;
use settings::{DEFAULT_CONFIG_PATH, Query, Settings};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    let path = std::env::args().nth(1).unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let settings = settings::load_settings(&path)
        .with_context(|| format!("loading scenario from {path}"))?;

    run(settings)
}

fn run(settings: Settings) -> anyhow::Result<()> {
    let map = ViabilityMap::from_rows(&settings.grid.rows).context("building grid from rows")?;
    info!(
        width = map.width(),
        height = map.height(),
        viable = map.viable_count(),
        "Grid loaded"
    );
    let map = Arc::new(map);

    let dumper = if settings.dump.enabled {
        let dumper = Dumper::new(&settings.dump.dir)?;
        info!(dir = %dumper.dir().display(), "Writing grid dumps");
        Some(dumper)
    } else {
        None
    };

    info!("Spawning {} query threads...", settings.queries.len());
    let mut handles = Vec::with_capacity(settings.queries.len());
    for (i, query) in settings.queries.iter().copied().enumerate() {
        let handle = thread::Builder::new()
            .name(format!("query-{i}"))
            .spawn({
                let map = Arc::clone(&map);
                let dumper = dumper.clone();
                move || run_query(map, query, dumper.as_ref())
            })
            .with_context(|| format!("spawning thread for query {i}"))?;
        handles.push((i, handle));
    }

    let mut failed = 0;
    for (i, handle) in handles {
        let outcome = handle
            .join()
            .map_err(|_| anyhow!("query {i} thread panicked"))?;
        if let Err(e) = outcome {
            error!("Query {} failed: {:?}", i, e);
            failed += 1;
        }
    }

    match failed {
        0 => {
            info!("All queries finished.");
            Ok(())
        }
        n => Err(anyhow!("{n} of {} queries failed", settings.queries.len())),
    }
}

fn run_query(map: Arc<ViabilityMap>, query: Query, dumper: Option<&Dumper>) -> anyhow::Result<PathResult> {
    let start = Coordinate::new(query.start[0], query.start[1]);
    let end = Coordinate::new(query.end[0], query.end[1]);
    let mut grid = Grid::with_map(map);

    if let Some(dumper) = dumper {
        let path = dumper.write(&grid.render(&[]))?;
        info!(dump = %path.display(), "Dumped grid before search");
    }

    let result = grid
        .find_path_detailed(start, end)
        .with_context(|| format!("finding route {start} -> {end}"))?;

    match &result.path {
        Some(waypoints) => {
            info!(%start, %end, "{}", result);
            if let Some(dumper) = dumper {
                let cells = grid.expand_waypoints(waypoints)?.unwrap_or_default();
                let path = dumper.write(&grid.render(&cells))?;
                info!(dump = %path.display(), "Dumped grid with route");
            }
        }
        None => warn!(%start, %end, cells_visited = result.cells_visited, "No route found"),
    }

    Ok(result)
}
