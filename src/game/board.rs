//! # Board Module
//!
//! The fog-of-war grid. Cells hold an optional occupying entity plus a
//! `revealed` flag; all accessors are bounds-tolerant and return neutral
//! values (no entity, not revealed) rather than erroring.

use crate::game::entities::Entity;
use crate::game::Position;

/// One grid cell: an optional occupant plus the fog-of-war flag.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cell {
    entity: Option<Entity>,
    revealed: bool,
}

/// A `rows x cols` grid with a fixed start at `(0, 0)` and goal at
/// `(rows-1, cols-1)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Board {
    rows: usize,
    cols: usize,
    grid: Vec<Vec<Cell>>,
    start: Position,
    goal: Position,
}

impl Board {
    /// Creates a fully hidden, empty board.
    ///
    /// # Examples
    ///
    /// ```
    /// use gridfall::{Board, Position};
    ///
    /// let board = Board::new(4, 6);
    /// assert_eq!(board.goal(), Position::new(3, 5));
    /// assert!(!board.is_revealed(Position::origin()));
    /// ```
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            grid: vec![vec![Cell::default(); cols]; rows],
            start: Position::origin(),
            goal: Position::new(rows as i32 - 1, cols as i32 - 1),
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// The fixed starting cell, `(0, 0)`.
    pub fn start(&self) -> Position {
        self.start
    }

    /// The fixed goal cell, `(rows-1, cols-1)`. Reaching it always ends the
    /// level regardless of the cell's contents.
    pub fn goal(&self) -> Position {
        self.goal
    }

    /// Whether a position lies on the board.
    pub fn in_bounds(&self, pos: Position) -> bool {
        pos.row >= 0 && (pos.row as usize) < self.rows && pos.col >= 0 && (pos.col as usize) < self.cols
    }

    fn cell(&self, pos: Position) -> Option<&Cell> {
        if self.in_bounds(pos) {
            Some(&self.grid[pos.row as usize][pos.col as usize])
        } else {
            None
        }
    }

    fn cell_mut(&mut self, pos: Position) -> Option<&mut Cell> {
        if self.in_bounds(pos) {
            Some(&mut self.grid[pos.row as usize][pos.col as usize])
        } else {
            None
        }
    }

    /// Places an entity, marking the cell revealed. A silent no-op when the
    /// position is out of bounds.
    pub fn place(&mut self, entity: Entity, pos: Position) {
        if let Some(cell) = self.cell_mut(pos) {
            cell.entity = Some(entity);
            cell.revealed = true;
        }
    }

    /// The occupant at `pos`, or `None` when empty or out of bounds.
    pub fn entity_at(&self, pos: Position) -> Option<&Entity> {
        self.cell(pos).and_then(|cell| cell.entity.as_ref())
    }

    /// Removes and returns the occupant at `pos`. The cell stays revealed.
    pub fn take_entity(&mut self, pos: Position) -> Option<Entity> {
        self.cell_mut(pos).and_then(|cell| cell.entity.take())
    }

    /// Whether the cell at `pos` is visible. Out of bounds reads as hidden.
    pub fn is_revealed(&self, pos: Position) -> bool {
        self.cell(pos).is_some_and(|cell| cell.revealed)
    }

    /// Marks a single cell visible without touching its occupant.
    /// Idempotent; a no-op out of bounds.
    pub fn reveal(&mut self, pos: Position) {
        if let Some(cell) = self.cell_mut(pos) {
            cell.revealed = true;
        }
    }

    pub(crate) fn cell_state(&self, pos: Position) -> (Option<&Entity>, bool) {
        match self.cell(pos) {
            Some(cell) => (cell.entity.as_ref(), cell.revealed),
            None => (None, false),
        }
    }

    /// Renders the grid as one string per row.
    ///
    /// Hidden cells render as `X`, the player's cell as `P`, occupied cells
    /// as the occupant's symbol and empty revealed cells as a space, with
    /// `|` separators.
    pub fn render_lines(&self, player_pos: Position) -> Vec<String> {
        (0..self.rows as i32)
            .map(|row| {
                let mut line = String::from("|");
                for col in 0..self.cols as i32 {
                    let pos = Position::new(row, col);
                    let (entity, revealed) = self.cell_state(pos);
                    let marker = if !revealed {
                        'X'
                    } else if pos == player_pos {
                        'P'
                    } else {
                        entity.map_or(' ', Entity::symbol)
                    };
                    line.push(marker);
                    line.push('|');
                }
                line
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::enemies::Enemy;
    use crate::game::entities::Tower;
    use crate::game::weapons::Weapon;

    #[test]
    fn test_new_board_is_hidden_and_empty() {
        let board = Board::new(3, 4);
        assert_eq!(board.start(), Position::origin());
        assert_eq!(board.goal(), Position::new(2, 3));
        for row in 0..3 {
            for col in 0..4 {
                let pos = Position::new(row, col);
                assert!(board.entity_at(pos).is_none());
                assert!(!board.is_revealed(pos));
            }
        }
    }

    #[test]
    fn test_place_reveals_cell() {
        let mut board = Board::new(3, 3);
        let pos = Position::new(1, 1);
        board.place(Entity::Tower(Tower::new(pos)), pos);
        assert!(board.is_revealed(pos));
        assert_eq!(board.entity_at(pos).unwrap().symbol(), 'T');
    }

    #[test]
    fn test_place_out_of_bounds_is_a_noop() {
        let mut board = Board::new(2, 2);
        let before = board.clone();
        board.place(Entity::Weapon(Weapon::fist(Position::new(5, 5))), Position::new(5, 5));
        board.place(Entity::Weapon(Weapon::fist(Position::new(-1, 0))), Position::new(-1, 0));
        assert_eq!(board, before);
    }

    #[test]
    fn test_out_of_bounds_reads_are_neutral() {
        let board = Board::new(2, 2);
        assert!(board.entity_at(Position::new(-1, 0)).is_none());
        assert!(board.entity_at(Position::new(0, 9)).is_none());
        assert!(!board.is_revealed(Position::new(9, 9)));
    }

    #[test]
    fn test_reveal_is_idempotent_and_preserves_entity() {
        let mut board = Board::new(3, 3);
        let pos = Position::new(0, 2);
        board.place(Entity::Enemy(Enemy::rat(1, pos)), pos);
        board.reveal(pos);
        board.reveal(pos);
        assert!(board.is_revealed(pos));
        assert!(board.entity_at(pos).is_some());
        board.reveal(Position::new(-3, 0)); // no-op
    }

    #[test]
    fn test_take_entity_clears_but_keeps_revealed() {
        let mut board = Board::new(3, 3);
        let pos = Position::new(2, 0);
        board.place(Entity::Weapon(Weapon::fist(pos)), pos);
        assert!(board.take_entity(pos).is_some());
        assert!(board.take_entity(pos).is_none());
        assert!(board.is_revealed(pos));
    }

    #[test]
    fn test_render_contract() {
        let mut board = Board::new(2, 3);
        let enemy_pos = Position::new(0, 2);
        board.place(Entity::Enemy(Enemy::rat(1, enemy_pos)), enemy_pos);
        board.reveal(Position::new(0, 1));
        board.reveal(Position::new(1, 0));

        let player_pos = Position::new(1, 0);
        let lines = board.render_lines(player_pos);
        assert_eq!(lines, vec!["|X| |E|".to_string(), "|P|X|X|".to_string()]);
    }
}
