//! Snake
//!
//! The board logic is independent of drawing and timing; the app advances it
//! on a fixed step interval that shortens as the score grows.

use alloc::collections::VecDeque;
use alloc::format;

use picoware_core::config::Theme;
use picoware_core::hal::{Button, Color, DisplayError, DrawSurface, System, Vector};
use picoware_core::{App, AppError, Context};

/// Cell edge in pixels
const CELL: i32 = 10;
/// Height of the score bar
const HEADER: i32 = 20;
const START_LENGTH: usize = 3;
const STEP_MS: u64 = 150;
const MIN_STEP_MS: u64 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Heading {
    Up,
    Down,
    Left,
    Right,
}

impl Heading {
    fn delta(self) -> Vector {
        match self {
            Heading::Up => Vector::new(0, -1),
            Heading::Down => Vector::new(0, 1),
            Heading::Left => Vector::new(-1, 0),
            Heading::Right => Vector::new(1, 0),
        }
    }

    fn opposite(self) -> Heading {
        match self {
            Heading::Up => Heading::Down,
            Heading::Down => Heading::Up,
            Heading::Left => Heading::Right,
            Heading::Right => Heading::Left,
        }
    }

    fn from_button(button: Button) -> Option<Heading> {
        match button {
            Button::Up => Some(Heading::Up),
            Button::Down => Some(Heading::Down),
            Button::Left => Some(Heading::Left),
            Button::Right => Some(Heading::Right),
            _ => None,
        }
    }
}

/// Result of one board step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Moved,
    Ate,
    /// Hit a wall or itself
    Died,
    /// Filled the board
    Won,
}

/// Snake board state
#[derive(Debug, Clone)]
pub struct Board {
    size: Vector,
    /// Head first
    body: VecDeque<Vector>,
    heading: Heading,
    /// Heading applied on the next step
    queued: Heading,
    food: Option<Vector>,
    score: u32,
    alive: bool,
}

impl Board {
    /// A snake in the middle of the board heading right; no food yet
    pub fn new(size: Vector) -> Self {
        let head = Vector::new(size.x / 2, size.y / 2);
        let body = (0..START_LENGTH as i32)
            .map(|i| Vector::new(head.x - i, head.y))
            .collect();
        Self {
            size,
            body,
            heading: Heading::Right,
            queued: Heading::Right,
            food: None,
            score: 0,
            alive: true,
        }
    }

    pub fn body(&self) -> impl Iterator<Item = Vector> + '_ {
        self.body.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn food(&self) -> Option<Vector> {
        self.food
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    /// Queue a turn; reversing onto the neck is ignored
    pub fn turn(&mut self, heading: Heading) {
        if heading != self.heading.opposite() {
            self.queued = heading;
        }
    }

    /// Put food on a random free cell
    ///
    /// Returns `false` when no cell is free.
    pub fn place_food(&mut self, rng: &mut dyn System) -> bool {
        let cells = self.size.area();
        let free = cells.saturating_sub(self.body.len() as u32);
        if free == 0 {
            self.food = None;
            return false;
        }

        let mut nth = rng.random_below(free);
        for y in 0..self.size.y {
            for x in 0..self.size.x {
                let cell = Vector::new(x, y);
                if self.body.contains(&cell) {
                    continue;
                }
                if nth == 0 {
                    self.food = Some(cell);
                    return true;
                }
                nth -= 1;
            }
        }
        false
    }

    /// Advance the snake one cell
    pub fn step(&mut self, rng: &mut dyn System) -> Step {
        if !self.alive {
            return Step::Died;
        }

        self.heading = self.queued;
        let Some(head) = self.body.front().copied() else {
            self.alive = false;
            return Step::Died;
        };
        let next = head + self.heading.delta();
        let eating = self.food == Some(next);

        if !eating {
            self.body.pop_back();
        }
        if !self.size.contains(next) || self.body.contains(&next) {
            self.alive = false;
            return Step::Died;
        }
        self.body.push_front(next);

        if eating {
            self.score += 1;
            if !self.place_food(rng) {
                self.alive = false;
                return Step::Won;
            }
            return Step::Ate;
        }
        Step::Moved
    }
}

/// The game app
#[derive(Default)]
pub struct Snake {
    board: Option<Board>,
    last_step: u64,
    high_score: u32,
}

fn step_interval(score: u32) -> u64 {
    STEP_MS.saturating_sub(score as u64 * 5).max(MIN_STEP_MS)
}

fn cell_rect(cell: Vector) -> (Vector, Vector) {
    (
        Vector::new(cell.x * CELL + 1, HEADER + cell.y * CELL + 1),
        Vector::new(CELL - 2, CELL - 2),
    )
}

fn draw_board(display: &mut dyn DrawSurface, board: &Board, high_score: u32, theme: &Theme) -> Result<(), DisplayError> {
    display.fill_screen(theme.background)?;
    let size = display.size();
    display.fill_rect(Vector::new(0, HEADER - 2), Vector::new(size.x, 1), theme.accent)?;
    let score = format!("Score: {}  Best: {}", board.score(), high_score);
    display.text(Vector::new(4, 4), &score, theme.foreground)?;

    if let Some(food) = board.food() {
        let (at, size) = cell_rect(food);
        display.fill_rect(at, size, Color::RED)?;
    }
    for (i, cell) in board.body().enumerate() {
        let (at, size) = cell_rect(cell);
        let color = if i == 0 { theme.accent } else { Color::GREEN };
        display.fill_rect(at, size, color)?;
    }

    if !board.is_alive() {
        let y = size.y / 2 - 10;
        display.text(Vector::new(size.x / 2 - 27, y), "GAME OVER", theme.foreground)?;
        display.text(Vector::new(size.x / 2 - 66, y + 14), "ENTER restart  ESC quit", theme.accent)?;
    }
    display.swap()
}

impl Snake {
    fn new_game(&mut self, ctx: &mut Context) {
        let size = ctx.display().size();
        let grid = Vector::new((size.x / CELL).max(1), ((size.y - HEADER) / CELL).max(1));
        let mut board = Board::new(grid);
        board.place_food(ctx.system());
        self.board = Some(board);
        self.last_step = ctx.millis();
        ctx.mark_dirty();
    }
}

impl App for Snake {
    fn start(&mut self, ctx: &mut Context) -> Result<bool, AppError> {
        self.new_game(ctx);
        Ok(true)
    }

    fn run(&mut self, ctx: &mut Context) -> Result<(), AppError> {
        let Some(board) = self.board.as_mut() else {
            return Err(AppError::Invalid("Snake board missing"));
        };

        if let Some(button) = ctx.take_button() {
            if let Some(heading) = Heading::from_button(button) {
                board.turn(heading);
            } else if button == Button::Back {
                ctx.back();
                return Ok(());
            } else if button == Button::Center && !board.is_alive() {
                self.new_game(ctx);
                return Ok(());
            }
        }

        let now = ctx.millis();
        if board.is_alive() && now.saturating_sub(self.last_step) >= step_interval(board.score()) {
            self.last_step = now;
            match board.step(ctx.system()) {
                Step::Died | Step::Won => {
                    info!("Snake over, score {}", board.score());
                    self.high_score = self.high_score.max(board.score());
                }
                Step::Ate | Step::Moved => {}
            }
            ctx.mark_dirty();
        }

        if ctx.take_dirty() {
            let theme = ctx.theme();
            draw_board(ctx.display(), board, self.high_score, &theme)?;
        }
        Ok(())
    }

    fn stop(&mut self, ctx: &mut Context) -> Result<(), AppError> {
        self.board = None;
        ctx.system().reclaim();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use picoware_core::config::Settings;
    use picoware_core::testing::{MockSystem, TestPlatform};
    use picoware_core::{View, ViewManager};
    use proptest::prelude::*;

    fn board() -> Board {
        Board::new(Vector::new(10, 10))
    }

    #[test]
    fn test_moves_forward() {
        let mut rng = MockSystem::new();
        let mut b = board();
        let head = b.body().next().unwrap();
        assert_eq!(b.step(&mut rng), Step::Moved);
        assert_eq!(b.body().next(), Some(head + Vector::new(1, 0)));
        assert_eq!(b.len(), START_LENGTH);
    }

    #[test]
    fn test_reverse_is_ignored() {
        let mut rng = MockSystem::new();
        let mut b = board();
        b.turn(Heading::Left);
        assert_eq!(b.step(&mut rng), Step::Moved);
        assert!(b.is_alive());
    }

    #[test]
    fn test_eating_grows_and_scores() {
        let mut rng = MockSystem::new();
        let mut b = board();
        let head = b.body().next().unwrap();
        b.food = Some(head + Vector::new(1, 0));

        assert_eq!(b.step(&mut rng), Step::Ate);
        assert_eq!(b.len(), START_LENGTH + 1);
        assert_eq!(b.score(), 1);
        let food = b.food().unwrap();
        assert!(!b.body().any(|c| c == food));
    }

    #[test]
    fn test_wall_kills() {
        let mut rng = MockSystem::new();
        let mut b = board();
        for _ in 0..4 {
            assert_eq!(b.step(&mut rng), Step::Moved);
        }
        assert_eq!(b.step(&mut rng), Step::Died);
        assert!(!b.is_alive());
    }

    #[test]
    fn test_self_collision_kills() {
        let mut rng = MockSystem::new();
        let mut b = Board::new(Vector::new(10, 10));
        // Grow to five so a tight loop bites the body
        for _ in 0..2 {
            let head = b.body().next().unwrap();
            b.food = Some(head + Vector::new(1, 0));
            b.step(&mut rng);
        }
        b.food = None;
        b.turn(Heading::Down);
        b.step(&mut rng);
        b.turn(Heading::Left);
        b.step(&mut rng);
        b.turn(Heading::Up);
        assert_eq!(b.step(&mut rng), Step::Died);
    }

    #[test]
    fn test_tail_cell_is_free_to_enter() {
        let mut rng = MockSystem::new();
        let mut b = Board::new(Vector::new(10, 10));
        let head = b.body().next().unwrap();
        b.food = Some(head + Vector::new(1, 0));
        b.step(&mut rng);
        b.food = None;
        // Length four: a square loop ends on the old tail cell
        b.turn(Heading::Down);
        b.step(&mut rng);
        b.turn(Heading::Left);
        b.step(&mut rng);
        b.turn(Heading::Up);
        assert_eq!(b.step(&mut rng), Step::Moved);
    }

    #[test]
    fn test_full_board_wins() {
        let mut rng = MockSystem::new();
        let mut b = Board::new(Vector::new(4, 1));
        // Body covers x = 0..=2, one free cell left
        assert!(b.place_food(&mut rng));
        assert_eq!(b.food(), Some(Vector::new(3, 0)));
        assert_eq!(b.step(&mut rng), Step::Won);
    }

    #[test]
    fn test_step_interval_speeds_up() {
        assert_eq!(step_interval(0), STEP_MS);
        assert!(step_interval(5) < STEP_MS);
        assert_eq!(step_interval(1000), MIN_STEP_MS);
    }

    #[test]
    fn test_app_steps_on_timer_and_restarts() {
        let platform = TestPlatform::new();
        let mut vm = ViewManager::with_settings(platform.platform(), Settings::default());
        vm.add(View::new("snake", Snake::default())).unwrap();
        vm.switch_to("snake").unwrap();
        vm.tick();
        assert!(platform.display.contains_text("Score: 0"));

        // Run into the right wall
        for _ in 0..40 {
            platform.system.advance(STEP_MS);
            vm.tick();
        }
        assert!(platform.display.contains_text("GAME OVER"));

        platform.display.clear_log();
        platform.input.press(Button::Center);
        vm.tick();
        vm.tick();
        assert!(platform.display.contains_text("Score: 0"));
        assert!(!platform.display.contains_text("GAME OVER"));
    }

    proptest! {
        #[test]
        fn board_invariants_hold(turns in proptest::collection::vec(0u8..4, 1..200)) {
            let mut rng = MockSystem::new();
            let mut b = Board::new(Vector::new(8, 6));
            b.place_food(&mut rng);

            for t in turns {
                let heading = [Heading::Up, Heading::Down, Heading::Left, Heading::Right][t as usize];
                b.turn(heading);
                if b.step(&mut rng) != Step::Moved && !b.is_alive() {
                    break;
                }
                prop_assert_eq!(b.len(), START_LENGTH + b.score() as usize);
                if let Some(food) = b.food() {
                    prop_assert!(!b.body().any(|c| c == food));
                }
                let cells: alloc::vec::Vec<Vector> = b.body().collect();
                for (i, c) in cells.iter().enumerate() {
                    prop_assert!(!cells[i + 1..].contains(c));
                    prop_assert!(c.x >= 0 && c.y >= 0 && c.x < 8 && c.y < 6);
                }
            }
        }
    }
}
