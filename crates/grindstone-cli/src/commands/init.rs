use clap::Args;
use grindstone_core::{Config, Store};

#[derive(Args)]
pub struct InitArgs {
    /// Write .grindstone/config.toml in the current directory instead
    /// of the user config
    #[arg(long)]
    pub project: bool,
}

pub fn run(args: InitArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::default();
    let path = config.save(args.project)?;
    std::fs::create_dir_all(config.problems_dir())?;

    // Opening the store runs the schema migration.
    let _store = Store::open(&config.db_path())?;

    println!("Initialized grindstone workspace");
    println!("Config: {}", path.display());
    println!("DB: {}", config.db_path().display());
    println!("Problems dir: {}", config.problems_dir().display());
    if !std::path::Path::new(".git").exists() {
        println!("Hint: run `git init` to keep your solutions under version control");
    }
    Ok(())
}
