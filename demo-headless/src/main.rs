use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use firefighter_core::agent::{HeuristicPolicy, RandomPolicy};
use firefighter_core::simulation::{mean_reward, EpisodeSummary, GameState, MatchSettings, Winner};
use firefighter_core::{
    standard_arena, AgentConfig, FireMatch, PolicyProvider, Scene, SceneNode, SimulationConfig,
    TrainingPool,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Headless firefighter arena demo
#[derive(Parser, Debug)]
#[command(name = "demo-headless")]
#[command(about = "Two-agent firefighting arena, without a renderer", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Arena layout as a YAML scene tree (default: the standard arena)
    #[arg(short, long, global = true)]
    layout: Option<PathBuf>,

    /// Seed for spawn placement and random policies
    #[arg(short, long, global = true, default_value_t = 0)]
    seed: u64,

    /// Raise the log level (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Play one timed match: a heuristic player against an opponent
    Play {
        /// Match length in seconds
        #[arg(short, long, default_value_t = 70.0)]
        timer: f32,

        /// Policy driving the opponent
        #[arg(short, long, value_enum, default_value_t = PolicyKind::Random)]
        opponent: PolicyKind,

        /// Status report interval in seconds
        #[arg(short, long, default_value_t = 10.0)]
        report_interval: f32,
    },
    /// Step parallel training arenas
    Train {
        /// Number of arenas
        #[arg(short, long, default_value_t = 4)]
        arenas: usize,

        /// Steps to run in every arena
        #[arg(long, default_value_t = 20_000)]
        steps: u32,

        /// Steps per episode (0 = unlimited)
        #[arg(short, long, default_value_t = 5000)]
        max_steps: u32,

        /// Policy driving every trainee
        #[arg(short, long, value_enum, default_value_t = PolicyKind::Heuristic)]
        policy: PolicyKind,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum PolicyKind {
    Heuristic,
    Random,
}

impl PolicyKind {
    fn build(self, seed: u64) -> Box<dyn PolicyProvider> {
        match self {
            PolicyKind::Heuristic => Box::new(HeuristicPolicy::new()),
            PolicyKind::Random => Box::new(RandomPolicy::seeded(seed)),
        }
    }
}

/// Layout loading failures
#[derive(Debug)]
enum LayoutError {
    Io(PathBuf, std::io::Error),
    Parse(PathBuf, serde_yaml::Error),
}

impl std::fmt::Display for LayoutError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LayoutError::Io(path, err) => write!(f, "cannot read layout {}: {}", path.display(), err),
            LayoutError::Parse(path, err) => {
                write!(f, "cannot parse layout {}: {}", path.display(), err)
            }
        }
    }
}

impl std::error::Error for LayoutError {}

fn load_scene(path: Option<&Path>) -> Result<Scene, LayoutError> {
    let Some(path) = path else {
        return Ok(standard_arena());
    };
    let contents = fs::read_to_string(path).map_err(|e| LayoutError::Io(path.to_path_buf(), e))?;
    let root: SceneNode =
        serde_yaml::from_str(&contents).map_err(|e| LayoutError::Parse(path.to_path_buf(), e))?;
    info!(layout = %path.display(), "Loaded layout");
    Ok(Scene::new(root))
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let scene = load_scene(args.layout.as_deref())?;
    let config = SimulationConfig::default().with_seed(args.seed);

    match args.command {
        Command::Play {
            timer,
            opponent,
            report_interval,
        } => play(&scene, config, timer, opponent, report_interval),
        Command::Train {
            arenas,
            steps,
            max_steps,
            policy,
        } => train(
            &scene,
            SimulationConfig { max_steps, ..config },
            arenas,
            steps,
            policy,
        ),
    }
    Ok(())
}

fn play(scene: &Scene, config: SimulationConfig, timer: f32, opponent: PolicyKind, report_interval: f32) {
    println!("=== Firefighter Match ===\n");

    let settings = MatchSettings {
        game_timer: timer,
        ..MatchSettings::default()
    };
    let mut game = FireMatch::new(
        scene,
        config,
        settings,
        AgentConfig::default(),
        Box::new(HeuristicPolicy::new()),
        opponent.build(config.seed),
    );
    println!(
        "{} fires, {:.0}s timer, first to {:.1} wins early",
        game.arena().field().len(),
        settings.game_timer,
        settings.winning_fires
    );
    println!("Opponent: {:?}\n", opponent);

    game.button_clicked();
    let report_every = ((report_interval / config.fixed_dt).round() as u64).max(1);
    let mut ticks: u64 = 0;
    while game.state() != GameState::GameOver {
        let step = game.tick();
        ticks += 1;
        if game.state() == GameState::Playing && ticks % report_every == 0 {
            let (player, opponent) = game.scores();
            println!(
                "[{:5.1}s left] player {:.2}  opponent {:.2}  burning {}",
                game.time_remaining(),
                player,
                opponent,
                step.burning
            );
        }
    }

    let (player, opponent) = game.scores();
    println!("\n=== Game Over ===");
    println!("Player extinguished:   {:.2}", player);
    println!("Opponent extinguished: {:.2}", opponent);
    match game.winner() {
        Some(Winner::Player) => println!("You win!"),
        Some(Winner::Opponent) => println!("Agent wins!"),
        None => {}
    }
}

fn train(scene: &Scene, config: SimulationConfig, arenas: usize, steps: u32, policy: PolicyKind) {
    println!("=== Firefighter Training ===\n");
    println!(
        "{} arenas x {} steps, episodes of {} steps, {:?} policy\n",
        arenas, steps, config.max_steps, policy
    );

    let mut pool = TrainingPool::from_scene(scene, config, AgentConfig::training(), arenas, |i| {
        policy.build(config.seed.wrapping_add(i as u64))
    });
    let finished = pool.run(steps);

    println!("{:>5} {:>9} {:>11} {:>14} {:>12}", "arena", "episodes", "mean reward", "mean put out", "current");
    for (index, (arena, episodes)) in pool.arenas().iter().zip(&finished).enumerate() {
        let current = arena.current();
        println!(
            "{:>5} {:>9} {:>11} {:>14} {:>12.3}",
            index,
            episodes.len(),
            format_mean(episodes, |s| s.reward),
            format_mean(episodes, |s| s.fires_extinguished),
            current.reward
        );
    }

    match mean_reward(&finished) {
        Some(mean) => println!("\nMean episode reward: {:.3}", mean),
        None => println!("\nNo episode finished; raise --steps or lower --max-steps"),
    }
}

fn format_mean(episodes: &[EpisodeSummary], value: impl Fn(&EpisodeSummary) -> f32) -> String {
    if episodes.is_empty() {
        return "-".to_string();
    }
    let total: f32 = episodes.iter().map(value).sum();
    format!("{:.3}", total / episodes.len() as f32)
}
