//! Square grid geometry and cell ownership

use serde::{Deserialize, Serialize};

use crate::error::Rejection;

/// Orthogonal neighbor offsets (dx, dy)
/// Index: 0=W, 1=E, 2=N, 3=S
pub const DIRECTIONS: [(i32, i32); 4] = [
    (-1, 0), // W
    (1, 0),  // E
    (0, -1), // N
    (0, 1),  // S
];

/// Grid coordinates, `x` is the column and `y` the row
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cell {
    pub x: usize,
    pub y: usize,
}

impl Cell {
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }
}

/// One of the two competing sides
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Player,
    Ai,
}

impl Side {
    pub fn opponent(self) -> Self {
        match self {
            Side::Player => Side::Ai,
            Side::Ai => Side::Player,
        }
    }

    /// Cell state owned by this side
    pub fn cell_state(self) -> CellState {
        match self {
            Side::Player => CellState::Player,
            Side::Ai => CellState::Ai,
        }
    }
}

/// Ownership of a single cell
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellState {
    #[default]
    Neutral,
    Player,
    Ai,
}

impl CellState {
    /// Owning side, `None` for neutral cells
    pub fn owner(self) -> Option<Side> {
        match self {
            CellState::Neutral => None,
            CellState::Player => Some(Side::Player),
            CellState::Ai => Some(Side::Ai),
        }
    }
}

/// Supported board sides
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "usize", into = "usize")]
pub enum GridSize {
    Small,
    #[default]
    Medium,
    Large,
}

impl GridSize {
    pub const ALL: [GridSize; 3] = [GridSize::Small, GridSize::Medium, GridSize::Large];

    /// Number of cells along one edge
    pub fn side(self) -> usize {
        match self {
            GridSize::Small => 7,
            GridSize::Medium => 10,
            GridSize::Large => 12,
        }
    }

    pub fn total_cells(self) -> usize {
        self.side() * self.side()
    }
}

impl From<GridSize> for usize {
    fn from(size: GridSize) -> usize {
        size.side()
    }
}

impl TryFrom<usize> for GridSize {
    type Error = Rejection;

    fn try_from(side: usize) -> Result<Self, Self::Error> {
        match side {
            7 => Ok(GridSize::Small),
            10 => Ok(GridSize::Medium),
            12 => Ok(GridSize::Large),
            other => Err(Rejection::UnsupportedGridSize(other)),
        }
    }
}

/// Fixed-size square board, stored row-major
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    size: GridSize,
    cells: Vec<CellState>,
}

impl Grid {
    /// All-neutral grid of the given size
    pub fn new(size: GridSize) -> Self {
        Self {
            size,
            cells: vec![CellState::Neutral; size.total_cells()],
        }
    }

    /// Starting layout: player in the top-left corner, AI in the bottom-right
    pub fn starting(size: GridSize) -> Self {
        let mut grid = Self::new(size);
        let last = size.side() - 1;
        grid.set(Cell::new(0, 0), CellState::Player);
        grid.set(Cell::new(last, last), CellState::Ai);
        grid
    }

    pub fn size(&self) -> GridSize {
        self.size
    }

    pub fn side(&self) -> usize {
        self.size.side()
    }

    /// Check if a coordinate pair is on the board
    pub fn contains(&self, x: i64, y: i64) -> bool {
        let side = self.side() as i64;
        (0..side).contains(&x) && (0..side).contains(&y)
    }

    /// Convert raw driver coordinates into a bounds-checked cell
    pub fn cell_at(&self, x: i64, y: i64) -> Result<Cell, Rejection> {
        if self.contains(x, y) {
            Ok(Cell::new(x as usize, y as usize))
        } else {
            Err(Rejection::OutOfBounds { x, y })
        }
    }

    fn index(&self, cell: Cell) -> Option<usize> {
        let side = self.side();
        (cell.x < side && cell.y < side).then(|| cell.y * side + cell.x)
    }

    /// Cell state, `None` if the cell lies off the board
    pub fn get(&self, cell: Cell) -> Option<CellState> {
        self.index(cell).map(|i| self.cells[i])
    }

    pub(crate) fn set(&mut self, cell: Cell, state: CellState) {
        if let Some(i) = self.index(cell) {
            self.cells[i] = state;
        }
    }

    /// Orthogonal neighbors, clipped to the board
    pub fn neighbors(&self, cell: Cell) -> impl Iterator<Item = Cell> + '_ {
        DIRECTIONS.iter().filter_map(move |&(dx, dy)| {
            let nx = cell.x as i64 + dx as i64;
            let ny = cell.y as i64 + dy as i64;
            self.contains(nx, ny)
                .then(|| Cell::new(nx as usize, ny as usize))
        })
    }

    /// True if any neighbor of `cell` belongs to `side`
    pub fn borders(&self, cell: Cell, side: Side) -> bool {
        let owned = side.cell_state();
        self.neighbors(cell).any(|n| self.get(n) == Some(owned))
    }

    /// Iterate every cell with its state, row by row
    pub fn iter(&self) -> impl Iterator<Item = (Cell, CellState)> + '_ {
        let side = self.side();
        self.cells
            .iter()
            .enumerate()
            .map(move |(i, &state)| (Cell::new(i % side, i / side), state))
    }

    pub fn count(&self, state: CellState) -> usize {
        self.cells.iter().filter(|&&c| c == state).count()
    }

    /// Rows of cell states, top to bottom
    pub fn rows(&self) -> impl Iterator<Item = &[CellState]> {
        self.cells.chunks(self.side())
    }
}
