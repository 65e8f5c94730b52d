use clap::Subcommand;
use grindstone_core::{Client, Config};

#[derive(Subcommand)]
pub enum AuthAction {
    /// Validate judge cookies and save them to the config
    Login {
        /// LEETCODE_SESSION cookie value
        #[arg(long)]
        session: Option<String>,
        /// csrftoken cookie value
        #[arg(long)]
        csrf: Option<String>,
        /// Full Cookie header copied from the browser; session and
        /// csrf are extracted from it
        #[arg(long)]
        cookie: Option<String>,
        /// Save to the project config instead of the user config
        #[arg(long)]
        project: bool,
    },
    /// Check whether the configured cookies still work
    Status,
    /// Print instructions for grabbing judge cookies
    Guide,
}

pub fn run(action: AuthAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        AuthAction::Login {
            session,
            csrf,
            cookie,
            project,
        } => login(session, csrf, cookie, project),
        AuthAction::Status => status(),
        AuthAction::Guide => {
            print_guide();
            Ok(())
        }
    }
}

fn login(
    session: Option<String>,
    csrf: Option<String>,
    cookie: Option<String>,
    project: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = Config::load()?;
    if let Some(header) = cookie.as_deref() {
        let (session, csrf) = extract_cookie_header(header);
        if let Some(s) = session {
            config.auth.session = s;
        }
        if let Some(c) = csrf {
            config.auth.csrf = c;
        }
    }
    if let Some(s) = trimmed(session) {
        config.auth.session = s;
    }
    if let Some(c) = trimmed(csrf) {
        config.auth.csrf = c;
    }
    if !config.has_auth() {
        return Err("missing credentials: use --cookie '<browser cookie header>' \
             or --session/--csrf (or env LEETCODE_SESSION/CSRFTOKEN)"
            .into());
    }

    let client = Client::new(&config)?;
    let rt = tokio::runtime::Runtime::new()?;
    let username = rt.block_on(client.validate_auth())?;

    let path = config.save(project)?;
    println!("Authenticated as {username}");
    println!("Saved auth config to {}", path.display());
    Ok(())
}

fn status() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    if !config.has_auth() {
        println!("No credentials configured");
        return Ok(());
    }
    let client = Client::new(&config)?;
    let rt = tokio::runtime::Runtime::new()?;
    let username = rt.block_on(client.validate_auth())?;
    println!("Authenticated as {username}");
    Ok(())
}

fn trimmed(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Pull LEETCODE_SESSION and csrftoken out of a raw Cookie header.
/// Key match is case-insensitive; unknown cookies are skipped.
fn extract_cookie_header(raw: &str) -> (Option<String>, Option<String>) {
    let mut session = None;
    let mut csrf = None;
    for part in raw.split(';') {
        let Some((key, value)) = part.split_once('=') else {
            continue;
        };
        match key.trim().to_ascii_lowercase().as_str() {
            "leetcode_session" => session = Some(value.trim().to_string()),
            "csrftoken" => csrf = Some(value.trim().to_string()),
            _ => {}
        }
    }
    (session, csrf)
}

fn print_guide() {
    println!("1) Log in to the judge in your browser.");
    println!("2) Open DevTools -> Network and reload the page.");
    println!("3) Pick any request to the judge and copy the full 'cookie' request header.");
    println!("4) Run: grindstone auth login --cookie '<pasted header>'");
    println!("   Add --project to keep the cookies in this repo's .grindstone/ instead.");
}
