//! Movement planning shared by every state handler that needs to close
//! distance on a target cell: a greedy step for short hops and a
//! node-capped A* for longer pursuits.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

use tickforge_types::Position;
use tickforge_world::Grid;

/// Distance at or below which [`step_towards`] uses the cheap greedy
/// step instead of A*.
const GREEDY_DISTANCE_THRESHOLD: u32 = 2;

/// Upper bound on nodes expanded by [`astar_step`] before giving up.
const ASTAR_NODE_CAP: usize = 512;

/// Picks the next cell to move into on the way from `from` to `to`,
/// using a greedy step for short distances and a bounded A* search
/// otherwise. Returns `None` if `from == to` or no walkable step exists.
#[must_use]
pub fn step_towards(grid: &Grid, from: Position, to: Position) -> Option<Position> {
    if from == to {
        return None;
    }
    if from.manhattan_distance(to) <= GREEDY_DISTANCE_THRESHOLD {
        greedy_step(grid, from, to)
    } else {
        astar_step(grid, from, to).or_else(|| greedy_step(grid, from, to))
    }
}

const NEIGHBOR_OFFSETS: [(i32, i32); 8] = [
    (1, 0),
    (-1, 0),
    (0, 1),
    (0, -1),
    (1, 1),
    (1, -1),
    (-1, 1),
    (-1, -1),
];

fn neighbors(pos: Position) -> impl Iterator<Item = Position> {
    NEIGHBOR_OFFSETS
        .into_iter()
        .map(move |(dx, dy)| Position::new(pos.x.saturating_add(dx), pos.y.saturating_add(dy)))
}

/// Walkable neighbor cells of `pos`, for callers that want to rank
/// candidate moves themselves (flee distance-maximizing, kiting).
#[must_use]
pub fn walkable_neighbors(grid: &Grid, pos: Position) -> Vec<Position> {
    neighbors(pos).filter(|p| grid.is_walkable(*p)).collect()
}

/// Moves toward `to` by picking the walkable neighbor that most reduces
/// Manhattan distance; if the straight-line neighbor is blocked, falls
/// back to a neighbor perpendicular to it rather than giving up.
fn greedy_step(grid: &Grid, from: Position, to: Position) -> Option<Position> {
    let mut best: Option<(u32, Position)> = None;
    for candidate in neighbors(from) {
        if !grid.is_walkable(candidate) {
            continue;
        }
        let dist = candidate.manhattan_distance(to);
        match best {
            Some((best_dist, best_pos)) if dist > best_dist || (dist == best_dist && candidate > best_pos) => {}
            _ => best = Some((dist, candidate)),
        }
    }
    best.map(|(_, pos)| pos)
}

#[derive(PartialEq)]
struct Frontier {
    f_score: f64,
    pos: Position,
}

impl Eq for Frontier {}

impl Ord for Frontier {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .f_score
            .partial_cmp(&self.f_score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| self.pos.cmp(&other.pos))
    }
}

impl PartialOrd for Frontier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[allow(clippy::cast_precision_loss)]
fn heuristic(from: Position, to: Position) -> f64 {
    f64::from(from.manhattan_distance(to))
}

/// Weighted A* bounded by [`ASTAR_NODE_CAP`] node expansions, terrain
/// cost from [`tickforge_types::Tile::move_cost_weight`]. Returns the
/// first step of the cheapest path found, or `None` if the cap is hit
/// before reaching `to`.
fn astar_step(grid: &Grid, from: Position, to: Position) -> Option<Position> {
    let mut open = BinaryHeap::new();
    let mut came_from: HashMap<Position, Position> = HashMap::new();
    let mut g_score: HashMap<Position, f64> = HashMap::new();
    g_score.insert(from, 0.0);
    open.push(Frontier {
        f_score: heuristic(from, to),
        pos: from,
    });

    let mut expanded = 0usize;
    while let Some(Frontier { pos: current, .. }) = open.pop() {
        if current == to {
            return first_step(&came_from, from, to);
        }
        expanded += 1;
        if expanded > ASTAR_NODE_CAP {
            return None;
        }
        let current_g = *g_score.get(&current).unwrap_or(&f64::INFINITY);
        for next in neighbors(current) {
            if !grid.is_walkable(next) {
                continue;
            }
            let step_cost = grid.get(next).map_or(1.0, |t| t.move_cost_weight());
            let tentative_g = current_g + step_cost;
            if tentative_g < *g_score.get(&next).unwrap_or(&f64::INFINITY) {
                came_from.insert(next, current);
                g_score.insert(next, tentative_g);
                open.push(Frontier {
                    f_score: tentative_g + heuristic(next, to),
                    pos: next,
                });
            }
        }
    }
    None
}

fn first_step(came_from: &HashMap<Position, Position>, from: Position, to: Position) -> Option<Position> {
    let mut path = vec![to];
    let mut current = to;
    while let Some(&prev) = came_from.get(&current) {
        if prev == from {
            return Some(current);
        }
        path.push(prev);
        current = prev;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::step_towards;
    use tickforge_types::{Position, Tile};
    use tickforge_world::Grid;

    #[test]
    fn greedy_step_moves_closer_on_short_hops() {
        let grid = Grid::filled(10, 10, Tile::Floor);
        let step = step_towards(&grid, Position::new(0, 0), Position::new(1, 1)).expect("a step");
        assert!(step.manhattan_distance(Position::new(1, 1)) < Position::new(0, 0).manhattan_distance(Position::new(1, 1)));
    }

    #[test]
    fn astar_routes_around_a_wall() {
        let mut tiles = vec![Tile::Floor; 10 * 10];
        for y in 0..8 {
            let idx = usize::try_from(y * 10 + 5).expect("index fits");
            tiles[idx] = Tile::Wall;
        }
        let grid = Grid::from_tiles(10, 10, tiles);
        let step = step_towards(&grid, Position::new(0, 0), Position::new(9, 0)).expect("a step");
        assert!(grid.is_walkable(step));
    }

    #[test]
    fn same_position_has_no_step() {
        let grid = Grid::filled(4, 4, Tile::Floor);
        assert_eq!(step_towards(&grid, Position::new(1, 1), Position::new(1, 1)), None);
    }
}
