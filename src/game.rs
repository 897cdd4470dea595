use std::time::{Duration, Instant};

use anyhow::Result;
use log::{debug, info};
use rand::Rng;

use crate::config::Settings;
use crate::food::Food;
use crate::frontend::{Frontend, Scene};
use crate::grid::Grid;
use crate::input::Command;
use crate::snake::Snake;
use crate::storage::HighScoreStore;

const POINTS_PER_FOOD: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Running,
    Paused,
}

/// What a single `tick()` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// No game in progress.
    Idle,
    /// Paused; nothing moved.
    Skipped,
    Moved,
    Ate,
    Crashed,
    /// The snake filled the board, leaving no cell for food.
    Cleared,
}

/// Fixed-period tick driver. Fires at most once per `fire`, so a stalled
/// loop never replays missed ticks.
struct Ticker {
    period: Duration,
    next: Instant,
}

impl Ticker {
    fn start(period: Duration, now: Instant) -> Self {
        Ticker { period, next: now + period }
    }

    fn fire(&mut self, now: Instant) {
        self.next += self.period;
        if self.next <= now {
            self.next = now + self.period;
        }
    }
}

pub struct GameSession<F, R> {
    grid: Grid,
    tick_period: Duration,
    snake: Snake,
    food: Food,
    score: u32,
    high_score: u32,
    phase: Phase,
    ticker: Option<Ticker>,
    frontend: F,
    store: Box<dyn HighScoreStore>,
    rng: R,
}

impl<F: Frontend, R: Rng> GameSession<F, R> {
    pub fn new(settings: &Settings, frontend: F, mut store: Box<dyn HighScoreStore>, rng: R) -> Self {
        let grid = settings.grid;
        let high_score = store.load();
        info!("Loaded high score {}", high_score);

        GameSession {
            grid,
            tick_period: settings.tick,
            snake: Snake::new(grid.spawn_point()),
            food: Food::new(grid),
            score: 0,
            high_score,
            phase: Phase::Idle,
            ticker: None,
            frontend,
            store,
            rng,
        }
    }

    /// First screen: high score, the idle board and the start prompt.
    pub fn show_title(&mut self) -> Result<()> {
        self.frontend.set_score(self.score)?;
        self.frontend.set_high_score(self.high_score)?;
        self.render()?;
        self.frontend
            .show_overlay("SNAKE", "Arrows or 2/4/6/8 to steer, Space to pause", "START")
    }

    pub fn start(&mut self) -> Result<()> {
        if self.is_playing() {
            return Ok(());
        }

        self.ticker = None;
        self.phase = Phase::Running;
        self.score = 0;
        self.frontend.set_score(0)?;
        self.frontend.hide_overlay()?;

        self.snake.reset();
        let placed = self.food.respawn(&self.snake, self.grid, &mut self.rng);
        self.render()?;
        if !placed {
            // board too small to hold both the snake and a food cell
            return self.game_over("YOU WIN");
        }

        self.ticker = Some(Ticker::start(self.tick_period, Instant::now()));
        info!("Game started on a {}x{} board", self.grid.width, self.grid.height);
        Ok(())
    }

    pub fn tick(&mut self) -> Result<TickOutcome> {
        match self.phase {
            Phase::Idle => return Ok(TickOutcome::Idle),
            Phase::Paused => return Ok(TickOutcome::Skipped),
            Phase::Running => {}
        }

        self.snake.update();

        if self.snake.check_collision(self.grid) {
            self.game_over("GAME OVER")?;
            return Ok(TickOutcome::Crashed);
        }

        let mut outcome = TickOutcome::Moved;
        if self.snake.head() == self.food.position() {
            self.snake.grow();
            self.score += POINTS_PER_FOOD;
            self.frontend.set_score(self.score)?;
            debug!("Food eaten at {:?}, score {}", self.food.position(), self.score);

            if self.score > self.high_score {
                self.high_score = self.score;
                self.frontend.set_high_score(self.high_score)?;
                self.store.save(self.high_score);
            }

            if !self.food.respawn(&self.snake, self.grid, &mut self.rng) {
                self.render()?;
                self.game_over("YOU WIN")?;
                return Ok(TickOutcome::Cleared);
            }
            outcome = TickOutcome::Ate;
        }

        self.render()?;
        Ok(outcome)
    }

    pub fn toggle_pause(&mut self) -> Result<()> {
        match self.phase {
            Phase::Idle => Ok(()),
            Phase::Running => {
                self.phase = Phase::Paused;
                info!("Paused");
                self.frontend.show_overlay("PAUSED", "Press Space to Resume", "RESUME")
            }
            Phase::Paused => {
                self.phase = Phase::Running;
                info!("Resumed");
                self.frontend.hide_overlay()
            }
        }
    }

    pub fn handle_command(&mut self, command: Command) -> Result<()> {
        match command {
            Command::Start => self.start(),
            Command::Menu if self.is_playing() => self.toggle_pause(),
            Command::Menu => self.start(),
            Command::Pause => self.toggle_pause(),
            Command::Steer(direction) => {
                if self.phase == Phase::Running {
                    self.snake.change_direction(direction);
                }
                Ok(())
            }
        }
    }

    /// Routes a logical input symbol; unknown symbols are ignored.
    pub fn handle_input(&mut self, symbol: &str) -> Result<()> {
        match Command::from_symbol(symbol) {
            Some(command) => self.handle_command(command),
            None => Ok(()),
        }
    }

    /// Time left before the next tick is due, or `None` when no tick
    /// driver is running.
    pub fn time_until_tick(&self, now: Instant) -> Option<Duration> {
        self.ticker
            .as_ref()
            .map(|ticker| ticker.next.saturating_duration_since(now))
    }

    /// Fires the tick driver if its deadline has passed.
    pub fn poll_tick(&mut self, now: Instant) -> Result<Option<TickOutcome>> {
        match self.ticker.as_mut() {
            Some(ticker) if ticker.next <= now => ticker.fire(now),
            _ => return Ok(None),
        }
        self.tick().map(Some)
    }

    pub fn is_ticking(&self) -> bool {
        self.ticker.is_some()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_playing(&self) -> bool {
        self.phase != Phase::Idle
    }

    pub fn is_paused(&self) -> bool {
        self.phase == Phase::Paused
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn high_score(&self) -> u32 {
        self.high_score
    }

    pub fn snake(&self) -> &Snake {
        &self.snake
    }

    pub fn food(&self) -> &Food {
        &self.food
    }

    pub fn frontend_mut(&mut self) -> &mut F {
        &mut self.frontend
    }

    ///////////////////////////////////////////////////////////////////////////

    fn game_over(&mut self, title: &str) -> Result<()> {
        self.ticker = None;
        self.phase = Phase::Idle;
        info!("{}: score {}, high score {}", title, self.score, self.high_score);
        self.frontend
            .show_overlay(title, &format!("Score: {}", self.score), "TRY AGAIN")
    }

    fn render(&mut self) -> Result<()> {
        let scene = Scene { grid: self.grid, food: &self.food, snake: &self.snake };
        self.frontend.render(&scene)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Vector2;
    use crate::storage::MemoryStore;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Render { head: Vector2, food: Vector2, len: usize },
        Score(u32),
        HighScore(u32),
        Overlay(String),
        HideOverlay,
    }

    #[derive(Default)]
    struct Recorder {
        calls: Vec<Call>,
    }

    impl Recorder {
        fn overlays(&self) -> Vec<&str> {
            self.calls
                .iter()
                .filter_map(|c| match c {
                    Call::Overlay(title) => Some(title.as_str()),
                    _ => None,
                })
                .collect()
        }
    }

    impl Frontend for Recorder {
        fn render(&mut self, scene: &Scene) -> Result<()> {
            self.calls.push(Call::Render {
                head: scene.snake.head(),
                food: scene.food.position(),
                len: scene.snake.len(),
            });
            Ok(())
        }

        fn set_score(&mut self, score: u32) -> Result<()> {
            self.calls.push(Call::Score(score));
            Ok(())
        }

        fn set_high_score(&mut self, high_score: u32) -> Result<()> {
            self.calls.push(Call::HighScore(high_score));
            Ok(())
        }

        fn show_overlay(&mut self, title: &str, _message: &str, _action: &str) -> Result<()> {
            self.calls.push(Call::Overlay(title.to_string()));
            Ok(())
        }

        fn hide_overlay(&mut self) -> Result<()> {
            self.calls.push(Call::HideOverlay);
            Ok(())
        }
    }

    /// Store whose saves stay visible to the test after the session owns it.
    #[derive(Clone, Default)]
    struct SharedStore(Rc<RefCell<MemoryStore>>);

    impl HighScoreStore for SharedStore {
        fn load(&mut self) -> u32 {
            self.0.borrow_mut().load()
        }

        fn save(&mut self, high_score: u32) {
            self.0.borrow_mut().save(high_score)
        }
    }

    fn session_with_store(store: SharedStore) -> GameSession<Recorder, StdRng> {
        GameSession::new(
            &Settings::default(),
            Recorder::default(),
            Box::new(store),
            StdRng::seed_from_u64(3),
        )
    }

    fn session() -> GameSession<Recorder, StdRng> {
        session_with_store(SharedStore::default())
    }

    fn running_session() -> GameSession<Recorder, StdRng> {
        let mut s = session();
        s.start().unwrap();
        // keep food out of the snake's way unless a test places it
        s.food.place(Vector2::new(0, 0));
        s
    }

    fn body(s: &GameSession<Recorder, StdRng>) -> Vec<Vector2> {
        s.snake().body().iter().copied().collect()
    }

    #[test]
    fn new_session_is_idle() {
        let s = session();
        assert_eq!(s.phase(), Phase::Idle);
        assert!(!s.is_playing());
        assert!(!s.is_paused());
        assert!(!s.is_ticking());
        assert_eq!(s.score(), 0);
    }

    #[test]
    fn high_score_is_loaded_at_construction() {
        let store = SharedStore::default();
        store.0.borrow_mut().save(70);
        let mut s = session_with_store(store);
        assert_eq!(s.high_score(), 70);

        s.show_title().unwrap();
        assert!(s.frontend_mut().calls.contains(&Call::HighScore(70)));
        assert_eq!(s.frontend_mut().overlays(), vec!["SNAKE"]);
    }

    #[test]
    fn start_resets_and_renders() {
        let mut s = session();
        s.start().unwrap();

        assert_eq!(s.phase(), Phase::Running);
        assert!(s.is_ticking());
        assert_eq!(body(&s), vec![Vector2::new(10, 10), Vector2::new(9, 10), Vector2::new(8, 10)]);
        assert!(!s.snake().occupies(s.food().position()));

        let calls = &s.frontend_mut().calls;
        assert!(calls.contains(&Call::Score(0)));
        assert!(calls.contains(&Call::HideOverlay));
        assert!(matches!(calls.last(), Some(Call::Render { len: 3, .. })));
    }

    #[test]
    fn start_while_playing_is_noop() {
        let mut s = running_session();
        s.tick().unwrap();
        let head = s.snake().head();
        let calls = s.frontend_mut().calls.len();

        s.start().unwrap();
        assert_eq!(s.snake().head(), head);
        assert_eq!(s.frontend_mut().calls.len(), calls);

        s.toggle_pause().unwrap();
        s.start().unwrap();
        assert!(s.is_paused());
    }

    #[test]
    fn tick_moves_and_renders() {
        let mut s = running_session();
        assert_eq!(s.tick().unwrap(), TickOutcome::Moved);
        assert_eq!(s.snake().head(), Vector2::new(11, 10));
        assert_eq!(s.snake().len(), 3);
        assert!(matches!(
            s.frontend_mut().calls.last(),
            Some(Call::Render { head, .. }) if *head == Vector2::new(11, 10)
        ));
    }

    #[test]
    fn turn_scenario_from_fresh_session() {
        let mut s = running_session();
        s.handle_command(Command::Steer(Vector2::LEFT)).unwrap();
        assert_eq!(s.snake().next_velocity(), Vector2::RIGHT);

        s.handle_command(Command::Steer(Vector2::UP)).unwrap();
        assert_eq!(s.snake().next_velocity(), Vector2::UP);

        s.tick().unwrap();
        assert_eq!(body(&s), vec![Vector2::new(10, 9), Vector2::new(10, 10), Vector2::new(9, 10)]);
    }

    #[test]
    fn eating_scores_grows_and_respawns() {
        let mut s = running_session();
        s.food.place(Vector2::new(15, 10));

        for _ in 0..4 {
            assert_eq!(s.tick().unwrap(), TickOutcome::Moved);
        }
        assert_eq!(s.snake().head(), Vector2::new(14, 10));

        assert_eq!(s.tick().unwrap(), TickOutcome::Ate);
        assert_eq!(s.snake().head(), Vector2::new(15, 10));
        assert_eq!(s.score(), 10);
        assert_eq!(s.snake().grow_pending(), 1);
        assert_eq!(s.snake().len(), 3);
        assert!(!s.snake().occupies(s.food().position()));

        s.food.place(Vector2::new(0, 0));
        s.tick().unwrap();
        assert_eq!(s.snake().len(), 4);
    }

    #[test]
    fn high_score_follows_score_and_persists() {
        let store = SharedStore::default();
        store.0.borrow_mut().save(10);
        let mut s = session_with_store(store.clone());
        s.start().unwrap();

        s.food.place(Vector2::new(11, 10));
        s.tick().unwrap();
        assert_eq!(s.score(), 10);
        assert_eq!(s.high_score(), 10, "equal score is not a new high score");
        assert!(!s.frontend_mut().calls.contains(&Call::HighScore(10)));

        s.food.place(Vector2::new(12, 10));
        s.tick().unwrap();
        assert_eq!(s.score(), 20);
        assert_eq!(s.high_score(), 20);
        assert!(s.frontend_mut().calls.contains(&Call::HighScore(20)));
        assert_eq!(store.0.borrow_mut().load(), 20);
    }

    #[test]
    fn high_score_never_decreases() {
        let mut s = running_session();
        s.food.place(Vector2::new(11, 10));
        s.tick().unwrap();
        s.food.place(Vector2::new(12, 10));
        s.tick().unwrap();
        assert_eq!(s.high_score(), 20);

        // crash into the right wall
        while s.tick().unwrap() != TickOutcome::Crashed {}
        s.start().unwrap();
        assert_eq!(s.score(), 0);
        assert_eq!(s.high_score(), 20);
    }

    #[test]
    fn wall_collision_ends_game() {
        let mut s = running_session();
        let mut outcome = TickOutcome::Moved;
        for _ in 0..10 {
            outcome = s.tick().unwrap();
        }
        assert_eq!(s.snake().head().x, 20);
        assert_eq!(outcome, TickOutcome::Crashed);
        assert!(!s.is_playing());
        assert!(!s.is_ticking());
        assert_eq!(s.frontend_mut().overlays(), vec!["GAME OVER"]);

        assert_eq!(s.tick().unwrap(), TickOutcome::Idle);
    }

    #[test]
    fn left_wall_collision() {
        let mut s = running_session();
        s.handle_input("ArrowUp").unwrap();
        s.tick().unwrap();
        s.handle_input("4").unwrap();
        let mut outcome = TickOutcome::Moved;
        while outcome == TickOutcome::Moved {
            outcome = s.tick().unwrap();
        }
        assert_eq!(outcome, TickOutcome::Crashed);
        assert_eq!(s.snake().head(), Vector2::new(-1, 9));
    }

    #[test]
    fn paused_ticks_change_nothing() {
        let mut s = running_session();
        s.food.place(Vector2::new(12, 10));
        s.toggle_pause().unwrap();
        assert!(s.is_paused());
        assert!(s.is_ticking());
        assert_eq!(s.frontend_mut().overlays(), vec!["PAUSED"]);

        let before = body(&s);
        for _ in 0..5 {
            assert_eq!(s.tick().unwrap(), TickOutcome::Skipped);
        }
        assert_eq!(body(&s), before);
        assert_eq!(s.food().position(), Vector2::new(12, 10));

        s.toggle_pause().unwrap();
        assert!(!s.is_paused());
        assert_eq!(s.frontend_mut().calls.last(), Some(&Call::HideOverlay));
        s.tick().unwrap();
        assert_eq!(s.snake().head(), Vector2::new(11, 10));
    }

    #[test]
    fn steering_is_ignored_while_paused_or_idle() {
        let mut s = session();
        s.handle_command(Command::Steer(Vector2::UP)).unwrap();
        assert_eq!(s.snake().next_velocity(), Vector2::RIGHT);

        s.start().unwrap();
        s.toggle_pause().unwrap();
        s.handle_input("ArrowDown").unwrap();
        assert_eq!(s.snake().next_velocity(), Vector2::RIGHT);
    }

    #[test]
    fn pause_while_idle_is_noop() {
        let mut s = session();
        s.toggle_pause().unwrap();
        s.handle_input("#").unwrap();
        assert_eq!(s.phase(), Phase::Idle);
        assert!(s.frontend_mut().calls.is_empty());
    }

    #[test]
    fn input_symbols_route_to_commands() {
        let mut s = session();
        s.handle_input("x").unwrap();
        s.handle_input("Space").unwrap();
        assert!(!s.is_playing());

        s.handle_input("Enter").unwrap();
        assert!(s.is_playing());

        s.handle_input(" ").unwrap();
        assert!(s.is_paused());
        s.handle_input("Space").unwrap();
        assert!(!s.is_paused());

        s.handle_input("Enter").unwrap();
        assert_eq!(s.phase(), Phase::Running);
    }

    #[test]
    fn menu_starts_when_idle() {
        let mut s = session();
        s.handle_input(" ").unwrap();
        assert_eq!(s.phase(), Phase::Running);
    }

    #[test]
    fn restart_after_game_over() {
        let mut s = running_session();
        while s.tick().unwrap() != TickOutcome::Crashed {}

        s.handle_input("Enter").unwrap();
        assert!(s.is_playing());
        assert!(s.is_ticking());
        assert_eq!(s.snake().head(), Vector2::new(10, 10));
        assert_eq!(s.score(), 0);
    }

    #[test]
    fn clearing_the_board_is_a_win() {
        // 4x2 board, snake starts on the bottom row at (2,1),(1,1),(0,1)
        let settings = Settings { grid: Grid::new(4, 2), ..Settings::default() };
        let mut s = GameSession::new(
            &settings,
            Recorder::default(),
            Box::new(MemoryStore::default()),
            StdRng::seed_from_u64(5),
        );
        s.start().unwrap();

        let path = [
            (None, Vector2::new(3, 1)),
            (Some("ArrowUp"), Vector2::new(3, 0)),
            (Some("ArrowLeft"), Vector2::new(2, 0)),
            (None, Vector2::new(1, 0)),
            (None, Vector2::new(0, 0)),
        ];
        for (turn, cell) in path.iter() {
            if let Some(symbol) = turn {
                s.handle_input(symbol).unwrap();
            }
            s.food.place(*cell);
            assert_eq!(s.tick().unwrap(), TickOutcome::Ate);
        }

        // one free cell left, so respawn had no choice
        assert_eq!(s.food().position(), Vector2::new(0, 1));

        s.handle_input("ArrowDown").unwrap();
        assert_eq!(s.tick().unwrap(), TickOutcome::Cleared);
        assert_eq!(s.snake().len(), 8);
        let calls = &s.frontend_mut().calls;
        assert!(matches!(
            &calls[calls.len() - 2],
            Call::Render { head, len: 8, .. } if *head == Vector2::new(0, 1)
        ));
        assert_eq!(calls.last(), Some(&Call::Overlay("YOU WIN".to_string())));
        assert!(!s.is_playing());
        assert!(!s.is_ticking());
        assert_eq!(s.score(), 60);
        assert_eq!(s.frontend_mut().overlays(), vec!["YOU WIN"]);
    }

    #[test]
    fn start_on_board_without_room_for_food() {
        // 2x1 board: the fresh snake covers both cells, its tail hangs off the edge
        let settings = Settings { grid: Grid::new(2, 1), ..Settings::default() };
        let mut s = GameSession::new(
            &settings,
            Recorder::default(),
            Box::new(MemoryStore::default()),
            StdRng::seed_from_u64(9),
        );
        s.start().unwrap();

        assert!(!s.is_playing());
        assert!(!s.is_ticking());
        assert_eq!(s.frontend_mut().overlays(), vec!["YOU WIN"]);
        assert_eq!(s.tick().unwrap(), TickOutcome::Idle);
    }

    #[test]
    fn tick_driver_fires_on_schedule() {
        let mut s = running_session();
        let now = Instant::now();
        let wait = s.time_until_tick(now).unwrap();
        assert!(wait <= Duration::from_millis(100));

        assert_eq!(s.poll_tick(now + wait + Duration::from_millis(1)).unwrap(), Some(TickOutcome::Moved));
        assert_eq!(s.poll_tick(now + wait + Duration::from_millis(2)).unwrap(), None);
        assert_eq!(s.snake().head(), Vector2::new(11, 10));
    }

    #[test]
    fn stalled_driver_does_not_replay_ticks() {
        let mut s = running_session();
        let late = Instant::now() + Duration::from_millis(1000);

        assert!(s.poll_tick(late).unwrap().is_some());
        assert!(s.poll_tick(late).unwrap().is_none());
        assert_eq!(s.snake().head(), Vector2::new(11, 10));
    }

    #[test]
    fn no_driver_when_idle() {
        let mut s = session();
        assert_eq!(s.time_until_tick(Instant::now()), None);
        assert_eq!(s.poll_tick(Instant::now()).unwrap(), None);
    }
}
