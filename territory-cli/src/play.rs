//! Play command - interactive terminal game against the AI
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: player_turn(), ai_turn(), game_over()
//! - Level 3: parse_command(), apply_intent()
//! - Level 4: board rendering and event text

use std::fmt::Write as _;
use std::io::{self, BufRead, Write};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::Result;
use clap::Args;

use territory_core::{
    Cell, CellState, EngineConfig, Game, GameEvent, GameResult, ImpulseKind, ImpulseMode, Phase,
    RandomSource, Rejection, SeededRandom, Side, Snapshot,
};

/// Frame length used while waiting for the AI
const FRAME: Duration = Duration::from_millis(16);

const BOXED_IN: &str = "  ! you are boxed in: no legal capture and no usable impulse (q to quit)";

const HELP: &str = "\
commands:
  X Y      capture cell (column X, row Y), or pick an impulse target
  a        attack impulse: take 2 bordering enemy cells
  s        speed impulse: claim 3 bordering neutral cells
  c        cancel the impulse selection
  show     print the board again
  json     print the current frame as JSON
  q        quit";

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

#[derive(Args)]
pub struct PlayArgs {
    /// Grid side: 7, 10 or 12 (defaults to the configured grid)
    #[arg(long)]
    pub grid: Option<usize>,

    /// Resolve AI turns immediately instead of waiting out the delay
    #[arg(long)]
    pub instant: bool,
}

/// One line of player input
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Command {
    Intent(Intent),
    Show,
    Json,
    Help,
    Quit,
}

/// Input forwarded to the engine
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Intent {
    Click(i64, i64),
    Impulse(ImpulseKind),
    Cancel,
}

/// What to do after the game-over screen
enum Replay {
    Again,
    Quit,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run play command
///
/// 1. Start a session on the requested grid
/// 2. Alternate player input and AI frames until the game ends
/// 3. Offer a rematch from the game-over screen
pub fn run(args: PlayArgs, config: EngineConfig, seed: Option<u64>) -> Result<()> {
    let mut game = Game::new(config, SeededRandom::new(seed))?;
    start_game(&mut game, args.grid)?;

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    println!("{HELP}");

    loop {
        match game.phase() {
            Phase::Menu => start_game(&mut game, args.grid)?,
            Phase::Playing => {
                let player_to_move = game.session().is_some_and(|s| s.is_player_turn());
                if player_to_move {
                    if !player_turn(&mut game, &mut lines)? {
                        break;
                    }
                } else {
                    ai_turn(&mut game, args.instant);
                }
                print_events(&mut game);
            }
            Phase::GameOver => match game_over(&mut game, &mut lines)? {
                Replay::Again => {
                    game.return_to_menu()?;
                    start_game(&mut game, args.grid)?;
                }
                Replay::Quit => break,
            },
        }
    }

    Ok(())
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

/// Read and apply one player command. Returns false when the player quits.
fn player_turn(
    game: &mut Game,
    lines: &mut impl Iterator<Item = io::Result<String>>,
) -> Result<bool> {
    if let Some(snapshot) = game.snapshot() {
        print!("{}", render_board(&snapshot));
    }
    if let Some(notice) = game.snapshot().as_ref().and_then(boxed_in_notice) {
        println!("{notice}");
    }
    print!("> ");
    io::stdout().flush()?;

    let Some(line) = lines.next().transpose()? else {
        return Ok(false);
    };

    match parse_command(&line) {
        Ok(Command::Quit) => return Ok(false),
        Ok(Command::Help) => println!("{HELP}"),
        Ok(Command::Show) => {}
        Ok(Command::Json) => {
            if let Some(snapshot) = game.snapshot() {
                println!("{}", serde_json::to_string_pretty(&snapshot)?);
            }
        }
        Ok(Command::Intent(intent)) => {
            if let Err(rejection) = apply_intent(game, intent) {
                println!("  ! {rejection}");
            }
        }
        Err(message) => println!("  ? {message}"),
    }
    Ok(true)
}

/// Feed frames until the AI has moved
fn ai_turn(game: &mut Game, instant: bool) {
    println!("AI is thinking...");
    let mut last = Instant::now();

    while game.phase() == Phase::Playing && game.session().is_some_and(|s| !s.is_player_turn()) {
        if instant {
            game.tick(game.config().ai_delay_secs);
            continue;
        }
        thread::sleep(FRAME);
        let now = Instant::now();
        game.tick((now - last).as_secs_f32());
        last = now;
    }
}

/// Show the result and ask for a rematch
fn game_over(
    game: &mut Game,
    lines: &mut impl Iterator<Item = io::Result<String>>,
) -> Result<Replay> {
    if let Some(snapshot) = game.snapshot() {
        print!("{}", render_board(&snapshot));
        println!(
            "Final score: Player {} - AI {}",
            snapshot.player.cells, snapshot.ai.cells
        );
    }
    println!("{}", result_banner(game.result()));
    print!("r to play again, anything else to quit > ");
    io::stdout().flush()?;

    let line = lines.next().transpose()?.unwrap_or_default();
    Ok(if line.trim().eq_ignore_ascii_case("r") {
        Replay::Again
    } else {
        Replay::Quit
    })
}

// ============================================================================
// LEVEL 3 - STEPS
// ============================================================================

/// Start on the requested grid, or the configured default
pub(crate) fn start_game<R: RandomSource>(
    game: &mut Game<R>,
    grid: Option<usize>,
) -> Result<(), Rejection> {
    match grid {
        Some(side) => game.start_session(side),
        None => game.start_default_session(),
    }
}

/// Warning shown while the player has nothing left to play
fn boxed_in_notice(snapshot: &Snapshot) -> Option<&'static str> {
    let waiting_on_player =
        snapshot.turn == Side::Player && snapshot.result == GameResult::Ongoing;
    (waiting_on_player && !snapshot.player_has_move).then_some(BOXED_IN)
}

fn parse_command(line: &str) -> Result<Command, String> {
    let words: Vec<&str> = line.split_whitespace().collect();
    match words.as_slice() {
        ["a" | "attack"] => Ok(Command::Intent(Intent::Impulse(ImpulseKind::Attack))),
        ["s" | "speed"] => Ok(Command::Intent(Intent::Impulse(ImpulseKind::Speed))),
        ["c" | "cancel"] => Ok(Command::Intent(Intent::Cancel)),
        ["show"] | [] => Ok(Command::Show),
        ["json"] => Ok(Command::Json),
        ["h" | "help" | "?"] => Ok(Command::Help),
        ["q" | "quit"] => Ok(Command::Quit),
        [x, y] => match (x.parse::<i64>(), y.parse::<i64>()) {
            (Ok(x), Ok(y)) => Ok(Command::Intent(Intent::Click(x, y))),
            _ => Err(format!("not a cell: {line}")),
        },
        _ => Err(format!("unknown command: {} (h for help)", line.trim())),
    }
}

/// A click captures normally, or picks a target while an impulse is active
fn apply_intent<R: RandomSource>(
    game: &mut Game<R>,
    intent: Intent,
) -> Result<GameEvent, Rejection> {
    match intent {
        Intent::Click(x, y) => {
            let selecting = game
                .session()
                .is_some_and(|s| s.impulse_mode() != ImpulseMode::None);
            if selecting {
                game.select_impulse_target(x, y)
            } else {
                game.attempt_player_capture(x, y)
            }
        }
        Intent::Impulse(kind) => game.enter_impulse_mode(kind),
        Intent::Cancel => game.cancel_impulse(),
    }
}

fn print_events(game: &mut Game) {
    for event in game.drain_events() {
        println!("  {}", describe_event(&event));
    }
}

// ============================================================================
// LEVEL 4 - UTILITIES
// ============================================================================

fn render_board(snapshot: &Snapshot) -> String {
    let mut out = String::new();
    let side = snapshot.grid_size;

    out.push_str("\n   ");
    for x in 0..side {
        let _ = write!(out, "{x:>3}");
    }
    out.push('\n');

    for (y, row) in snapshot.rows.iter().enumerate() {
        let _ = write!(out, "{y:>3}");
        for (x, &state) in row.iter().enumerate() {
            let cell = Cell::new(x, y);
            let _ = write!(out, "{:>3}", cell_glyph(snapshot, cell, state));
        }
        out.push('\n');
    }

    let _ = writeln!(
        out,
        "Player {}/{} (charges {})  |  AI {}/{} (charges {})  |  {}",
        snapshot.player.cells,
        snapshot.target_cells,
        snapshot.player.charges,
        snapshot.ai.cells,
        snapshot.target_cells,
        snapshot.ai.charges,
        match snapshot.turn {
            Side::Player => "YOUR TURN",
            Side::Ai => "AI TURN",
        }
    );
    match snapshot.impulse_mode {
        ImpulseMode::None if snapshot.impulse_ready => {
            let _ = writeln!(out, "Impulse ready: a = attack, s = speed");
        }
        ImpulseMode::None => {}
        ImpulseMode::Attack => {
            let _ = writeln!(
                out,
                "ATTACK MODE: select 2 enemy cells ({}/2), c to cancel",
                snapshot.selection.len()
            );
        }
        ImpulseMode::Speed => {
            let _ = writeln!(
                out,
                "SPEED MODE: select 3 neutral cells ({}/3), c to cancel",
                snapshot.selection.len()
            );
        }
    }
    out
}

fn cell_glyph(snapshot: &Snapshot, cell: Cell, state: CellState) -> char {
    if snapshot.selection.contains(&cell) {
        return '@';
    }
    match state {
        CellState::Player => 'P',
        CellState::Ai => 'A',
        CellState::Neutral if snapshot.legal_captures.contains(&cell) => '*',
        CellState::Neutral => '.',
    }
}

fn describe_event(event: &GameEvent) -> String {
    match event {
        GameEvent::Captured { side, cell } => {
            format!("{} captured ({}, {})", side_name(*side), cell.x, cell.y)
        }
        GameEvent::ImpulseStarted(kind) => format!("{kind:?} impulse armed"),
        GameEvent::TargetSelected {
            cell,
            selected,
            needed,
        } => format!("target ({}, {}) selected [{selected}/{needed}]", cell.x, cell.y),
        GameEvent::ImpulseResolved { side, kind, cells } => {
            let list: Vec<String> = cells.iter().map(|c| format!("({}, {})", c.x, c.y)).collect();
            format!("{} {kind:?} impulse took {}", side_name(*side), list.join(" "))
        }
        GameEvent::ImpulseCancelled(kind) => format!("{kind:?} impulse cancelled"),
        GameEvent::AiPassed => "AI has no move and passes".to_string(),
        GameEvent::GameEnded(result) => result_banner(*result).to_string(),
    }
}

fn side_name(side: Side) -> &'static str {
    match side {
        Side::Player => "Player",
        Side::Ai => "AI",
    }
}

fn result_banner(result: GameResult) -> &'static str {
    match result {
        GameResult::PlayerWins => "VICTORY!",
        GameResult::AiWins => "DEFEAT!",
        GameResult::Draw => "DRAW!",
        GameResult::Ongoing => "GAME OVER",
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use territory_core::{GridSize, ScriptedRandom, Session};

    #[test]
    fn test_parse_command() {
        assert_eq!(parse_command("1 0"), Ok(Command::Intent(Intent::Click(1, 0))));
        assert_eq!(parse_command("  -1   4 "), Ok(Command::Intent(Intent::Click(-1, 4))));
        assert_eq!(
            parse_command("a"),
            Ok(Command::Intent(Intent::Impulse(ImpulseKind::Attack)))
        );
        assert_eq!(
            parse_command("speed"),
            Ok(Command::Intent(Intent::Impulse(ImpulseKind::Speed)))
        );
        assert_eq!(parse_command("c"), Ok(Command::Intent(Intent::Cancel)));
        assert_eq!(parse_command(""), Ok(Command::Show));
        assert_eq!(parse_command("q"), Ok(Command::Quit));
        assert!(parse_command("x y").is_err());
        assert!(parse_command("fly away now").is_err());
    }

    #[test]
    fn test_start_game_falls_back_to_configured_grid() {
        let config = EngineConfig {
            default_grid: GridSize::Small,
            ..EngineConfig::default()
        };
        let mut game = Game::new(config, ScriptedRandom::new()).unwrap();
        start_game(&mut game, None).unwrap();
        assert_eq!(game.snapshot().unwrap().grid_size, 7);

        let mut game = Game::new(EngineConfig::default(), ScriptedRandom::new()).unwrap();
        start_game(&mut game, Some(12)).unwrap();
        assert_eq!(game.snapshot().unwrap().grid_size, 12);

        let mut game = Game::new(EngineConfig::default(), ScriptedRandom::new()).unwrap();
        assert_eq!(start_game(&mut game, Some(8)), Err(Rejection::UnsupportedGridSize(8)));
    }

    #[test]
    fn test_boxed_in_notice() {
        let session = Session::new(GridSize::Small, EngineConfig::default()).unwrap();
        let mut snapshot = Snapshot::capture(&session, Phase::Playing);
        assert_eq!(boxed_in_notice(&snapshot), None);

        snapshot.player_has_move = false;
        assert_eq!(boxed_in_notice(&snapshot), Some(BOXED_IN));

        // nothing to say while the AI is moving
        snapshot.turn = Side::Ai;
        assert_eq!(boxed_in_notice(&snapshot), None);
    }

    #[test]
    fn test_click_routes_to_capture() {
        let mut game = Game::new(EngineConfig::default(), SeededRandom::from_seed(1)).unwrap();
        game.start_session(7).unwrap();
        let event = apply_intent(&mut game, Intent::Click(1, 0)).unwrap();
        assert!(matches!(event, GameEvent::Captured { side: Side::Player, .. }));
    }

    #[test]
    fn test_render_fresh_board() {
        let session = Session::new(GridSize::Small, EngineConfig::default()).unwrap();
        let board = render_board(&Snapshot::capture(&session, Phase::Playing));
        let lines: Vec<&str> = board.lines().collect();
        // blank line, header, 7 rows, status
        assert_eq!(lines.len(), 10);
        assert_eq!(lines[2], "  0  P  *  .  .  .  .  .");
        assert_eq!(lines[3], "  1  *  .  .  .  .  .  .");
        assert_eq!(lines[8], "  6  .  .  .  .  .  .  A");
        assert!(lines[9].starts_with("Player 1/23 (charges 0)"));
        assert!(lines[9].ends_with("YOUR TURN"));
    }

    #[test]
    fn test_describe_events() {
        let event = GameEvent::Captured {
            side: Side::Ai,
            cell: Cell::new(5, 6),
        };
        assert_eq!(describe_event(&event), "AI captured (5, 6)");
        assert_eq!(
            describe_event(&GameEvent::GameEnded(GameResult::Draw)),
            "DRAW!"
        );
    }

    #[test]
    fn test_click_routes_to_impulse_selection() {
        let mut game = Game::new(EngineConfig::default(), ScriptedRandom::new()).unwrap();
        game.start_session(7).unwrap();
        assert!(game.enter_impulse_mode(ImpulseKind::Speed).is_err());

        for x in 1..=3 {
            apply_intent(&mut game, Intent::Click(x, 0)).unwrap();
            game.tick(1.0);
        }
        assert_eq!(game.session().unwrap().charges(Side::Player), 3);

        apply_intent(&mut game, Intent::Impulse(ImpulseKind::Speed)).unwrap();
        let event = apply_intent(&mut game, Intent::Click(0, 1)).unwrap();
        assert!(matches!(event, GameEvent::TargetSelected { selected: 1, needed: 3, .. }));
        assert_eq!(
            apply_intent(&mut game, Intent::Cancel),
            Ok(GameEvent::ImpulseCancelled(ImpulseKind::Speed))
        );
    }
}
