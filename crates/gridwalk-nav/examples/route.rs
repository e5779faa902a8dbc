use gridwalk_nav::{Coordinate, Grid};

fn main() {
    // Each string is one row (y), each char one column (x)
    // . = walkable
    // # = blocked
    let rows = [
        "..........",
        ".##....##.",
        "....#.....",
        "..####.#..",
        ".....#.#..",
        ".###.#.##.",
        "...#......",
        ".#.#.###..",
        ".#......#.",
        "...###....",
    ];
    let columns: Vec<Vec<bool>> = (0..rows[0].len())
        .map(|x| rows.iter().map(|row| row.as_bytes()[x] == b'.').collect())
        .collect();

    let mut grid = Grid::new(&columns).unwrap();
    let start = Coordinate::new(0.0, 0.0);
    let goal = Coordinate::new(9.0, 9.0);

    println!("Grid:");
    print!("{}", grid.render(&[]));
    println!("\nStart: {}, Goal: {}", start, goal);

    let result = grid.find_path_detailed(start, goal).unwrap();
    println!("\n{}", result);

    match result.path {
        Some(waypoints) => {
            println!("\nWaypoints:");
            for w in &waypoints {
                println!("  {}", w);
            }

            let cells = grid.expand_waypoints(&waypoints).unwrap().unwrap_or_default();
            println!("\nGrid with route:");
            print!("{}", grid.render(&cells));
        }
        None => println!("\nNo path found."),
    }
}
