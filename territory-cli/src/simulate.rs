//! Simulate command - headless games between a scripted player and the AI
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: play_games(), report_results()
//! - Level 3: play_single_game(), StandInPlayer, compute_statistics()
//! - Level 4: formatting utilities

use anyhow::Result;
use clap::Args;
use rayon::prelude::*;

use territory_core::{
    EngineConfig, Game, GameResult, ImpulseKind, Phase, RandomSource, Rejection, SeededRandom,
    Side,
};

use crate::play::start_game;

/// Mixed into the game seed for the stand-in player's own RNG
const PLAYER_SEED_SALT: u64 = 0x9E37_79B9_7F4A_7C15;

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

#[derive(Args)]
pub struct SimulateArgs {
    /// Number of games to play
    #[arg(long, default_value = "100")]
    pub games: usize,

    /// Grid side: 7, 10 or 12 (defaults to the configured grid)
    #[arg(long)]
    pub grid: Option<usize>,

    /// Give up on a game after this many resolved turns
    #[arg(long, default_value = "1000")]
    pub max_turns: u32,

    /// Never use impulses for the stand-in player
    #[arg(long)]
    pub no_impulses: bool,

    /// Run games in parallel
    #[arg(long)]
    pub parallel: bool,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

/// Result of a single game
#[derive(Clone, Debug)]
struct GameRecord {
    game_number: usize,
    seed: u64,
    /// `Ongoing` when the game was abandoned
    result: GameResult,
    turns: u32,
    player_cells: usize,
    ai_cells: usize,
    player_impulses: u32,
}

/// Aggregated results
#[derive(Clone, Debug)]
struct SimulationResults {
    games: Vec<GameRecord>,
    player_wins: usize,
    ai_wins: usize,
    draws: usize,
    unfinished: usize,
    avg_turns: f32,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run simulate command
///
/// 1. Validate config and seeds
/// 2. Play every game (optionally in parallel)
/// 3. Report results
pub fn run(args: SimulateArgs, config: EngineConfig, seed: Option<u64>) -> Result<()> {
    config.validate()?;
    let base_seed = seed.unwrap_or(42);

    tracing::info!(
        "Simulating {} games (grid={:?}, seed={}, parallel={})",
        args.games,
        args.grid,
        base_seed,
        args.parallel
    );

    let records = play_games(&args, &config, base_seed)?;
    let results = compute_statistics(records);

    report_results(&results, &args);
    Ok(())
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

/// Play all games, each from its own seed
fn play_games(
    args: &SimulateArgs,
    config: &EngineConfig,
    base_seed: u64,
) -> Result<Vec<GameRecord>> {
    let play = |game_index: usize| {
        let seed = base_seed.wrapping_add(game_index as u64);
        play_single_game(config, args.grid, game_index + 1, seed, args.max_turns, !args.no_impulses)
    };

    let records: Result<Vec<GameRecord>> = if args.parallel {
        (0..args.games).into_par_iter().map(play).collect()
    } else {
        (0..args.games).map(play).collect()
    };

    let records = records?;
    for record in &records {
        tracing::debug!(
            "Game {}: {:?} after {} turns ({} - {})",
            record.game_number,
            record.result,
            record.turns,
            record.player_cells,
            record.ai_cells
        );
    }
    Ok(records)
}

/// Report results
fn report_results(results: &SimulationResults, args: &SimulateArgs) {
    if args.json {
        print_json_results(results);
    } else {
        print_text_results(results);
    }
}

// ============================================================================
// LEVEL 3 - STEPS
// ============================================================================

/// Play one game to completion or until the turn limit
fn play_single_game(
    config: &EngineConfig,
    grid: Option<usize>,
    game_number: usize,
    seed: u64,
    max_turns: u32,
    use_impulses: bool,
) -> Result<GameRecord> {
    let mut game = Game::new(config.clone(), SeededRandom::from_seed(seed))?;
    let mut player = StandInPlayer::new(seed ^ PLAYER_SEED_SALT, use_impulses);
    start_game(&mut game, grid)?;

    let ai_frame = config.ai_delay_secs;
    while game.phase() == Phase::Playing {
        let Some(session) = game.session() else {
            break;
        };
        if session.turns() >= max_turns {
            break;
        }
        if session.is_player_turn() && !player.act(&mut game)? {
            // boxed in with nothing to spend: the player can never move again
            break;
        }
        game.tick(ai_frame);
    }

    let (turns, player_cells, ai_cells) = game
        .session()
        .map(|s| (s.turns(), s.cells(Side::Player), s.cells(Side::Ai)))
        .unwrap_or_default();

    Ok(GameRecord {
        game_number,
        seed,
        result: game.result(),
        turns,
        player_cells,
        ai_cells,
        player_impulses: player.impulses,
    })
}

/// Scripted stand-in for the human: spends charges on the impulse that
/// has enough targets, otherwise captures a random legal cell.
struct StandInPlayer {
    rng: SeededRandom,
    use_impulses: bool,
    impulses: u32,
}

impl StandInPlayer {
    fn new(seed: u64, use_impulses: bool) -> Self {
        Self {
            rng: SeededRandom::from_seed(seed),
            use_impulses,
            impulses: 0,
        }
    }

    /// Make one move. Returns false if no move exists.
    fn act<R: RandomSource>(&mut self, game: &mut Game<R>) -> Result<bool, Rejection> {
        let Some(session) = game.session() else {
            return Ok(false);
        };
        if !session.player_has_move() {
            return Ok(false);
        }

        if self.use_impulses && session.can_afford_impulse(Side::Player) {
            for kind in [ImpulseKind::Attack, ImpulseKind::Speed] {
                let mut targets = kind.valid_targets(session.grid(), Side::Player);
                if targets.len() < kind.target_count() {
                    continue;
                }
                self.rng.shuffle(&mut targets);
                game.enter_impulse_mode(kind)?;
                for cell in targets.into_iter().take(kind.target_count()) {
                    game.select_impulse_target(cell.x as i64, cell.y as i64)?;
                }
                self.impulses += 1;
                return Ok(true);
            }
        }

        let moves = session.legal_captures(Side::Player);
        if moves.is_empty() {
            return Ok(false);
        }
        let cell = moves[self.rng.next_index(moves.len())];
        game.attempt_player_capture(cell.x as i64, cell.y as i64)?;
        Ok(true)
    }
}

/// Compute aggregate statistics from game records
fn compute_statistics(games: Vec<GameRecord>) -> SimulationResults {
    let count = |result: GameResult| games.iter().filter(|g| g.result == result).count();
    let player_wins = count(GameResult::PlayerWins);
    let ai_wins = count(GameResult::AiWins);
    let draws = count(GameResult::Draw);
    let unfinished = count(GameResult::Ongoing);

    let total_turns: u32 = games.iter().map(|g| g.turns).sum();
    let avg_turns = if games.is_empty() {
        0.0
    } else {
        total_turns as f32 / games.len() as f32
    };

    SimulationResults {
        games,
        player_wins,
        ai_wins,
        draws,
        unfinished,
        avg_turns,
    }
}

// ============================================================================
// LEVEL 4 - UTILITIES
// ============================================================================

fn rate(n: usize, total: usize) -> f32 {
    if total > 0 {
        n as f32 / total as f32
    } else {
        0.0
    }
}

/// Print results as JSON
fn print_json_results(results: &SimulationResults) {
    #[derive(serde::Serialize)]
    struct JsonGame {
        game_number: usize,
        seed: u64,
        result: GameResult,
        turns: u32,
        player_cells: usize,
        ai_cells: usize,
        player_impulses: u32,
    }

    #[derive(serde::Serialize)]
    struct JsonOutput {
        total_games: usize,
        player_wins: usize,
        ai_wins: usize,
        draws: usize,
        unfinished: usize,
        avg_turns: f32,
        player_win_rate: f32,
        games: Vec<JsonGame>,
    }

    let total = results.games.len();
    let output = JsonOutput {
        total_games: total,
        player_wins: results.player_wins,
        ai_wins: results.ai_wins,
        draws: results.draws,
        unfinished: results.unfinished,
        avg_turns: results.avg_turns,
        player_win_rate: rate(results.player_wins, total),
        games: results
            .games
            .iter()
            .map(|g| JsonGame {
                game_number: g.game_number,
                seed: g.seed,
                result: g.result,
                turns: g.turns,
                player_cells: g.player_cells,
                ai_cells: g.ai_cells,
                player_impulses: g.player_impulses,
            })
            .collect(),
    };

    match serde_json::to_string_pretty(&output) {
        Ok(json) => println!("{}", json),
        Err(err) => tracing::error!("Failed to serialize results: {}", err),
    }
}

/// Print results as text
fn print_text_results(results: &SimulationResults) {
    let total = results.games.len();

    println!("\n=== Simulation Results ===");
    println!("Total games: {}", total);
    println!(
        "Player wins: {} ({:.1}%)",
        results.player_wins,
        rate(results.player_wins, total) * 100.0
    );
    println!(
        "AI wins:     {} ({:.1}%)",
        results.ai_wins,
        rate(results.ai_wins, total) * 100.0
    );
    println!(
        "Draws:       {} ({:.1}%)",
        results.draws,
        rate(results.draws, total) * 100.0
    );
    println!("Unfinished:  {}", results.unfinished);
    println!("Avg turns:   {:.1}", results.avg_turns);
}

// ============================================================================
// TESTS
// ============================================================================
