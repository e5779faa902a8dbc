use std::collections::VecDeque;
use std::sync::Arc;
use std::thread;

use gridwalk_nav::route::{straight_line, straighten};
use gridwalk_nav::search::find_route;
use gridwalk_nav::{Coordinate, Grid, GridPoint, PathError, ViabilityMap};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn grid_from_rows(rows: &[&str]) -> Grid {
    Grid::with_map(Arc::new(ViabilityMap::from_rows(rows).unwrap()))
}

fn c(x: usize, y: usize) -> Coordinate {
    Coordinate::from((x, y))
}

fn random_map(rng: &mut StdRng, width: usize, height: usize, open: f64) -> ViabilityMap {
    ViabilityMap::new_rand(width, height, open, rng).unwrap()
}

/// Plain 8-connected flood fill, used as the reachability oracle.
fn reachable(map: &ViabilityMap, start: GridPoint, end: GridPoint) -> bool {
    if !map.is_viable(start) || !map.is_viable(end) {
        return false;
    }
    let mut seen = vec![false; map.width() * map.height()];
    let mut queue = VecDeque::from([start]);
    seen[start.y * map.width() + start.x] = true;
    while let Some(p) = queue.pop_front() {
        if p == end {
            return true;
        }
        for n in map.neighbors_of(p) {
            let index = n.y * map.width() + n.x;
            if map.is_viable(n) && !seen[index] {
                seen[index] = true;
                queue.push_back(n);
            }
        }
    }
    false
}

#[test]
fn test_open_grid_diagonal_collapses_to_endpoints() {
    let mut grid = Grid::new(&vec![vec![true; 5]; 5]).unwrap();
    let path = grid.find_path(c(0, 0), c(4, 4)).unwrap();
    assert_eq!(path, Some(vec![c(0, 0), c(4, 4)]));
}

#[test]
fn test_blocked_single_row_not_found() {
    let mut columns = vec![vec![true]; 5];
    columns[2][0] = false;
    let mut grid = Grid::new(&columns).unwrap();
    assert_eq!(grid.find_path(c(0, 0), c(4, 0)).unwrap(), None);
}

#[test]
fn test_l_corridor_keeps_one_waypoint_per_arm() {
    let mut grid = grid_from_rows(&[
        "#####.",
        "#####.",
        "#####.",
        "......",
    ]);
    let result = grid.find_path_detailed(c(0, 3), c(5, 0)).unwrap();
    // The raw route runs the full corridor, cutting the corner diagonally.
    assert_eq!(result.raw_length, Some(8));
    assert_eq!(result.path, Some(vec![c(0, 3), c(4, 3), c(5, 0)]));
}

#[test]
fn test_start_equals_end() {
    let mut grid = grid_from_rows(&["...", ".#."]);
    assert_eq!(grid.find_path(c(2, 1), c(2, 1)).unwrap(), Some(vec![c(2, 1)]));
    // A blocked cell is no route even to itself.
    assert_eq!(grid.find_path(c(1, 1), c(1, 1)).unwrap(), None);
}

#[test]
fn test_distinct_endpoints_in_one_cell() {
    let mut grid = grid_from_rows(&["...", "..."]);
    let start = Coordinate::new(1.2, 0.0);
    let end = Coordinate::new(1.7, 0.5);
    let path = grid.find_path(start, end).unwrap().unwrap();
    assert_eq!(path.first(), Some(&start));
    assert_eq!(path.last(), Some(&end));
    assert_eq!(path.len(), 2);
}

#[test]
fn test_non_viable_endpoints_not_found() {
    let mut grid = grid_from_rows(&["....", ".#..", "...."]);
    assert_eq!(grid.find_path(c(0, 0), c(1, 1)).unwrap(), None);
    assert_eq!(grid.find_path(c(1, 1), c(3, 2)).unwrap(), None);
    assert!(grid.find_path(c(0, 0), c(3, 2)).unwrap().is_some());
}

#[test]
fn test_no_viable_cells_not_found() {
    let mut grid = Grid::new(&vec![vec![false; 3]; 3]).unwrap();
    for (start, end) in [((0, 0), (2, 2)), ((1, 1), (1, 1)), ((0, 2), (2, 0))] {
        assert_eq!(grid.find_path(c(start.0, start.1), c(end.0, end.1)).unwrap(), None);
    }
}

#[test]
fn test_disconnected_region_not_found() {
    let mut grid = grid_from_rows(&[
        "..#..",
        "..#..",
        "###..",
    ]);
    assert_eq!(grid.find_path(c(0, 0), c(4, 0)).unwrap(), None);
    assert!(grid.find_path(c(3, 2), c(4, 0)).unwrap().is_some());
}

#[test]
fn test_out_of_bounds_is_an_error() {
    let mut grid = Grid::new(&vec![vec![true; 3]; 3]).unwrap();
    assert!(matches!(
        grid.find_path(c(0, 0), c(0, 3)),
        Err(PathError::OutOfBounds(_))
    ));
    assert!(matches!(
        grid.find_path(c(3, 0), c(0, 0)),
        Err(PathError::OutOfBounds(_))
    ));
}

#[test]
fn test_from_valid_cells_builds_walkable_strip() {
    let cells: Vec<Coordinate> = (0..6).map(|x| c(x, 2)).collect();
    let mut grid = Grid::from_valid_cells(&cells).unwrap();
    assert_eq!(grid.map().width(), 6);
    assert_eq!(grid.map().height(), 3);
    assert_eq!(grid.find_path(c(0, 2), c(5, 2)).unwrap(), Some(vec![c(0, 2), c(5, 2)]));
    assert_eq!(grid.find_path(c(0, 0), c(5, 2)).unwrap(), None);
}

#[test]
fn test_grid_reuse_does_not_leak_state() {
    let mut grid = grid_from_rows(&[
        "......",
        ".####.",
        "......",
    ]);
    let first = grid.find_path(c(0, 2), c(5, 0)).unwrap();
    let _ = grid.find_path(c(5, 2), c(0, 0)).unwrap();
    let again = grid.find_path(c(0, 2), c(5, 0)).unwrap();
    assert!(first.is_some());
    assert_eq!(first, again);
}

#[test]
fn test_sessions_share_one_map_across_threads() {
    let map = Arc::new(ViabilityMap::from_rows(&[
        "........",
        ".######.",
        ".#....#.",
        ".#.##.#.",
        "...#....",
    ]).unwrap());

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let map = Arc::clone(&map);
            thread::spawn(move || {
                let mut grid = Grid::with_map(map);
                grid.find_path(c(2, 3), c(7, 0)).unwrap()
            })
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert!(results[0].is_some());
    assert!(results.iter().all(|r| *r == results[0]));
}

#[test]
fn test_random_grids_route_invariants() {
    let mut rng = StdRng::seed_from_u64(0x6772_6964);
    for _ in 0..60 {
        let width = rng.random_range(1..14);
        let height = rng.random_range(1..14);
        let map = Arc::new(random_map(&mut rng, width, height, 0.7));
        let mut grid = Grid::with_map(Arc::clone(&map));

        let start = GridPoint::new(rng.random_range(0..width), rng.random_range(0..height));
        let end = GridPoint::new(rng.random_range(0..width), rng.random_range(0..height));
        let path = grid.find_path(start.into(), end.into()).unwrap();

        // The search only gives up when the goal is truly cut off.
        assert_eq!(path.is_some(), reachable(&map, start, end), "{map}");

        if let Some(path) = &path {
            assert_eq!(path.first(), Some(&Coordinate::from(start)));
            assert_eq!(path.last(), Some(&Coordinate::from(end)));
            for pair in path.windows(2) {
                let from = pair[0].to_grid_point().unwrap();
                let to = pair[1].to_grid_point().unwrap();
                assert!(
                    straight_line(&map, from, to).is_some(),
                    "no clear line {from} -> {to}\n{map}"
                );
            }
        }

        // Same map, same query, fresh session: same answer.
        let mut other = Grid::with_map(Arc::clone(&map));
        assert_eq!(other.find_path(start.into(), end.into()).unwrap(), path);
    }
}

#[test]
fn test_random_grids_straighten_invariants() {
    let mut rng = StdRng::seed_from_u64(42);
    let mut checked = 0;
    while checked < 40 {
        let map = Arc::new(random_map(&mut rng, 16, 16, 0.75));
        let mut grid = Grid::with_map(Arc::clone(&map));
        let start = GridPoint::new(0, rng.random_range(0..16));
        let end = GridPoint::new(15, rng.random_range(0..16));
        if !map.is_viable(start) || !map.is_viable(end) {
            continue;
        }

        grid.rebuild(end);
        let Some(raw) = find_route(&mut grid, start, end).chain else {
            continue;
        };
        checked += 1;

        let once = straighten(&map, &raw);
        assert!(once.len() <= raw.len());
        assert_eq!(once.first(), Some(&start));
        assert_eq!(once.last(), Some(&end));
        for pair in once.windows(2) {
            assert!(map.neighbors_of(pair[0]).contains(&pair[1]));
            assert!(map.is_viable(pair[1]));
        }
        assert_eq!(straighten(&map, &once), once);
    }
}

#[test]
fn test_waypoints_expand_back_to_route() {
    let mut grid = grid_from_rows(&[
        "..........",
        "..######..",
        "..#....#..",
        "..#.##.#..",
        "....#.....",
    ]);
    let waypoints = grid.find_path(c(3, 2), c(9, 4)).unwrap().unwrap();
    let cells = grid.expand_waypoints(&waypoints).unwrap().unwrap();
    assert_eq!(cells.first(), waypoints.first());
    assert_eq!(cells.last(), waypoints.last());
    assert_eq!(grid.to_waypoints(&cells).unwrap(), waypoints);
}

#[test]
fn test_long_serpentine_corridor_end_to_end() {
    // Open rows joined by single gaps at alternating ends.
    let (width, height) = (31, 31);
    let rows: Vec<String> = (0..height)
        .map(|y| match y % 4 {
            1 => format!("{}.", "#".repeat(width - 1)),
            3 => format!(".{}", "#".repeat(width - 1)),
            _ => ".".repeat(width),
        })
        .collect();
    let map = Arc::new(ViabilityMap::from_rows(&rows).unwrap());
    let mut grid = Grid::with_map(Arc::clone(&map));

    let start = c(0, 0);
    let end = c(0, height - 1);
    let result = grid.find_path_detailed(start, end).unwrap();
    let waypoints = result.path.clone().unwrap();
    assert_eq!(waypoints.first(), Some(&start));
    assert_eq!(waypoints.last(), Some(&end));
    // Every open row has to be crossed nearly end to end.
    assert!(result.raw_length.unwrap() > 10 * height);

    let cells = grid.expand_waypoints(&waypoints).unwrap().unwrap();
    for pair in cells.windows(2) {
        let from = pair[0].to_grid_point().unwrap();
        let to = pair[1].to_grid_point().unwrap();
        assert!(map.neighbors_of(from).contains(&to));
        assert!(map.is_viable(to));
    }
}
