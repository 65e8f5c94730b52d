use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "grindstone", version, about = "Terminal LeetCode practice tracker")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize config, problems directory, and database
    Init(commands::init::InitArgs),
    /// Judge cookie authentication
    Auth {
        #[command(subcommand)]
        action: commands::auth::AuthAction,
    },
    /// Fetch problems and prepare local workspaces
    Solve(commands::solve::SolveArgs),
    /// List cached problems
    List(commands::list::ListArgs),
    /// Open a solution in $EDITOR
    Open(commands::open::OpenArgs),
    /// Run the solution against example and custom cases
    Test(commands::test::TestArgs),
    /// Submit the solution to the judge
    Submit(commands::submit::SubmitArgs),
    /// Save a note on a problem
    Note(commands::note::NoteArgs),
    /// Solve timer control
    Timer {
        #[command(subcommand)]
        action: commands::timer::TimerAction,
    },
    /// Custom test case management
    Case {
        #[command(subcommand)]
        action: commands::case::CaseAction,
    },
    /// Progress statistics
    Stats(commands::stats::StatsArgs),
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Init(args) => commands::init::run(args),
        Commands::Auth { action } => commands::auth::run(action),
        Commands::Solve(args) => commands::solve::run(args),
        Commands::List(args) => commands::list::run(args),
        Commands::Open(args) => commands::open::run(args),
        Commands::Test(args) => commands::test::run(args),
        Commands::Submit(args) => commands::submit::run(args),
        Commands::Note(args) => commands::note::run(args),
        Commands::Timer { action } => commands::timer::run(action),
        Commands::Case { action } => commands::case::run(action),
        Commands::Stats(args) => commands::stats::run(args),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
