//! Built-in waypoint maps and the path geometry derived from them.

use path_defence_core::{GridCoord, WorldPoint};

/// Number of cell columns in every built-in map.
pub(crate) const GRID_COLUMNS: u32 = 20;
/// Number of cell rows in every built-in map.
pub(crate) const GRID_ROWS: u32 = 15;

/// Waypoints of the built-in maps expressed in cell coordinates.
///
/// Consecutive waypoints are axis aligned, so the cells a segment crosses
/// can be enumerated exactly.
const MAPS: [&[(u32, u32)]; 2] = [
    &[
        (0, 7),
        (4, 7),
        (4, 3),
        (9, 3),
        (9, 11),
        (14, 11),
        (14, 5),
        (19, 5),
    ],
    &[(0, 2), (16, 2), (16, 7), (3, 7), (3, 12), (19, 12)],
];

/// Immutable path geometry for one active map.
#[derive(Clone, Debug)]
pub(crate) struct PathMap {
    waypoints: Vec<WorldPoint>,
    segment_lengths: Vec<f32>,
    cells: Vec<GridCoord>,
}

impl PathMap {
    /// Number of built-in maps available for selection.
    pub(crate) fn builtin_count() -> u32 {
        MAPS.len() as u32
    }

    /// Builds the path geometry of the built-in map with the given index.
    pub(crate) fn builtin(map_index: u32) -> Option<Self> {
        let cells_raw = MAPS.get(map_index as usize)?;
        let waypoints: Vec<WorldPoint> = cells_raw
            .iter()
            .map(|&(column, row)| GridCoord::new(column, row).centre())
            .collect();
        let segment_lengths = waypoints
            .windows(2)
            .map(|pair| pair[0].distance_to(pair[1]))
            .collect();
        let cells = covered_cells(cells_raw);
        Some(Self {
            waypoints,
            segment_lengths,
            cells,
        })
    }

    /// Waypoints of the path in world coordinates.
    pub(crate) fn waypoints(&self) -> &[WorldPoint] {
        &self.waypoints
    }

    /// Number of straight segments composing the path.
    pub(crate) fn segment_count(&self) -> u32 {
        self.segment_lengths.len() as u32
    }

    /// Length of the segment with the given index in world units.
    pub(crate) fn segment_length(&self, path_index: u32) -> f32 {
        self.segment_lengths
            .get(path_index as usize)
            .copied()
            .unwrap_or(0.0)
    }

    /// Interpolated world position at the given segment and progress.
    pub(crate) fn position_at(&self, path_index: u32, progress: f32) -> WorldPoint {
        let index = (path_index as usize).min(self.segment_lengths.len().saturating_sub(1));
        let from = self.waypoints[index];
        let to = self.waypoints[index + 1];
        let length = self.segment_lengths[index].max(f32::EPSILON);
        let t = (progress / length).clamp(0.0, 1.0);
        WorldPoint::new(
            from.x() + (to.x() - from.x()) * t,
            from.y() + (to.y() - from.y()) * t,
        )
    }

    /// Reports whether the path crosses the given cell.
    pub(crate) fn contains_cell(&self, cell: GridCoord) -> bool {
        self.cells.contains(&cell)
    }

    /// Reports whether the cell lies inside the map's grid bounds.
    pub(crate) fn in_bounds(&self, cell: GridCoord) -> bool {
        cell.column() < GRID_COLUMNS && cell.row() < GRID_ROWS
    }
}

fn covered_cells(waypoints: &[(u32, u32)]) -> Vec<GridCoord> {
    let mut cells = Vec::new();
    for pair in waypoints.windows(2) {
        let (c0, r0) = pair[0];
        let (c1, r1) = pair[1];
        if r0 == r1 {
            let (lo, hi) = (c0.min(c1), c0.max(c1));
            for column in lo..=hi {
                push_unique(&mut cells, GridCoord::new(column, r0));
            }
        } else {
            let (lo, hi) = (r0.min(r1), r0.max(r1));
            for row in lo..=hi {
                push_unique(&mut cells, GridCoord::new(c0, row));
            }
        }
    }
    cells
}

fn push_unique(cells: &mut Vec<GridCoord>, cell: GridCoord) {
    if !cells.contains(&cell) {
        cells.push(cell);
    }
}
