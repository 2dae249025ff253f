use clap::Parser;
use minesweeper_ai::*;
use rand::{RngCore, SeedableRng};
use rand::rngs::StdRng;
use std::thread;
use std::time::Duration;
use tracing::Level;

#[derive(Debug, Parser)]
#[command(
    name = "minesweeper-bot",
    about = "Plays Minesweeper by logical inference, guessing only when nothing is provably safe"
)]
struct Args {
    #[arg(long, default_value_t = 8)]
    height: usize,

    #[arg(long, default_value_t = 8)]
    width: usize,

    #[arg(long, default_value_t = 8)]
    mines: usize,

    /// Seed for the mine layout and the bot's guesses
    #[arg(long)]
    seed: Option<u64>,

    /// Pause between moves, in milliseconds
    #[arg(long, default_value_t = 500)]
    delay_ms: u64,

    /// Log every observation and derived sentence
    #[arg(short, long)]
    verbose: bool,
}

enum Outcome {
    Won,
    Lost(Cell),
    Stuck,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_max_level(if args.verbose {
            Level::DEBUG
        } else {
            Level::INFO
        })
        .init();

    // --- 1. Initialization ---
    let mut rng = bot_rng(args.seed);
    let mut game = Minesweeper::new(args.height, args.width, args.mines, &mut rng)?;
    let mut agent = KnowledgeBase::new(args.height, args.width);

    println!("--- Autonomous Minesweeper Bot ---");
    println!("Strategy: Play provably safe cells, guess randomly otherwise.");
    print_board(&game, &agent);

    // --- 2. Game Loop ---
    let mut move_count = 0;
    let outcome = loop {
        if game.won() || game.cleared(agent.moves_made()) {
            break Outcome::Won;
        }
        move_count += 1;
        println!("\n--- Move #{} ---", move_count);

        // --- 3. Bot's Decision Logic ---
        let cell = if let Some(cell) = agent.safe_move() {
            println!("Logic found a guaranteed safe cell.");
            cell
        } else if let Some(cell) = agent.random_move(&mut rng) {
            println!("No logically safe move found. Making a random guess...");
            cell
        } else {
            break Outcome::Stuck;
        };

        // --- 4. Execute the Chosen Move ---
        println!("Bot reveals {}...", cell);
        if game.is_mine(cell) {
            break Outcome::Lost(cell);
        }
        agent.observe(cell, game.nearby_mines(cell))?;
        for &mine in agent.known_mines() {
            game.flag(mine);
        }
        print_board(&game, &agent);

        thread::sleep(Duration::from_millis(args.delay_ms));
    };

    // --- 5. Final Result ---
    println!("\n--- Game Over ---");
    match outcome {
        Outcome::Won => println!("Result: The bot won in {} moves!", move_count),
        Outcome::Lost(cell) => println!("Result: The bot hit a mine at {} and lost.", cell),
        Outcome::Stuck => println!("Result: No moves left for the bot to make."),
    }
    Ok(())
}

/// A reproducible generator when seeded, the thread-local one otherwise.
fn bot_rng(seed: Option<u64>) -> Box<dyn RngCore> {
    match seed {
        Some(seed) => Box::new(StdRng::seed_from_u64(seed)),
        None => Box::new(rand::rng()),
    }
}

/// Prints the board as the agent sees it: counts for probed cells, flags for
/// proven mines, dots for proven-safe cells not yet probed.
fn print_board(game: &Minesweeper, agent: &KnowledgeBase) {
    let bounds = game.bounds();

    print!("   ");
    for col in 0..bounds.width {
        print!("{:^3}", col);
    }
    println!("\n  +{}", "---".repeat(bounds.width));

    for row in 0..bounds.height {
        print!("{:^2}|", row);
        for col in 0..bounds.width {
            let cell = Cell::new(row, col);
            let display = match agent.observation(cell) {
                Some(count) => format!(" {} ", count),
                None if agent.known_mines().contains(&cell) => " F ".to_string(),
                None if agent.known_safes().contains(&cell) => " . ".to_string(),
                None => " ■ ".to_string(),
            };
            print!("{}", display);
        }
        println!();
    }
    println!();
}
