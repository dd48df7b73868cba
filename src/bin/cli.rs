//! PyExec CLI
//!
//! Command-line interface: run snippets through the sandbox, static-check
//! them, keep a REPL with a persistent namespace, and manage saved scripts.

use std::io::Read;
use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use console::style;
use dialoguer::{theme::ColorfulTheme, Input};
use pyexec::storage::ScriptStore;
use pyexec::{Config, Error, Result, Sandbox, VERSION};

#[derive(Parser)]
#[command(
    name = "pyexec",
    author = "PyExec Contributors",
    version = VERSION,
    about = "PyExec - Python snippet execution sandbox",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute a snippet and print the transcript
    Run {
        /// Script file to execute (reads stdin when no file and no -c)
        file: Option<PathBuf>,
        /// Inline code to execute
        #[arg(short = 'c', long)]
        code: Option<String>,
        /// Override the evaluation deadline in seconds
        #[arg(long)]
        timeout_secs: Option<u64>,
    },

    /// Static-check a snippet without executing it
    Check {
        /// Script file to check (reads stdin when no file and no -c)
        file: Option<PathBuf>,
        /// Inline code to check
        #[arg(short = 'c', long)]
        code: Option<String>,
    },

    /// Interactive session with a persistent namespace
    Repl,

    /// Save a script file into the store
    Save {
        /// File whose contents to save
        file: PathBuf,
        /// Name to store it under (timestamped when omitted)
        #[arg(short, long)]
        name: Option<String>,
    },

    /// List saved scripts
    List,

    /// Print a saved script (most recent when no name given)
    Load {
        /// Script name
        name: Option<String>,
    },

    /// Delete a saved script
    Delete {
        /// Script name
        name: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("pyexec=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Run {
            file,
            code,
            timeout_secs,
        }) => run(file, code, timeout_secs).await,
        Some(Commands::Check { file, code }) => check(file, code),
        Some(Commands::Repl) | None => repl().await,
        Some(Commands::Save { file, name }) => save(&file, name.as_deref()),
        Some(Commands::List) => list(),
        Some(Commands::Load { name }) => load(name.as_deref()),
        Some(Commands::Delete { name }) => delete(&name),
    }
}

/// Resolve the snippet source from a file, inline code, or stdin
fn read_source(file: Option<PathBuf>, code: Option<String>) -> Result<String> {
    if let Some(code) = code {
        return Ok(code);
    }
    if let Some(path) = file {
        return Ok(std::fs::read_to_string(&path)
            .map_err(|e| Error::InvalidInput(format!("Cannot read {}: {}", path.display(), e)))?);
    }
    let mut source = String::new();
    std::io::stdin()
        .read_to_string(&mut source)
        .map_err(|e| Error::InvalidInput(format!("Cannot read stdin: {}", e)))?;
    Ok(source)
}

async fn run(file: Option<PathBuf>, code: Option<String>, timeout_secs: Option<u64>) -> Result<()> {
    let source = read_source(file, code)?;
    let config = Config::from_env()?;
    config.validate()?;

    let mut sandbox = Sandbox::new(&config);
    if let Some(secs) = timeout_secs {
        sandbox = sandbox.with_deadline(Duration::from_secs(secs));
    }

    println!("{}", sandbox.execute(&source).await);
    Ok(())
}

fn check(file: Option<PathBuf>, code: Option<String>) -> Result<()> {
    let source = read_source(file, code)?;
    let sandbox = Sandbox::new(&Config::minimal());

    let violations = sandbox.check(&source);
    if violations.is_empty() {
        println!("{} No blocked constructs found", style("✓").green());
        return Ok(());
    }

    println!(
        "{} {} blocked construct(s):",
        style("✗").red(),
        violations.len()
    );
    for violation in &violations {
        println!("   • {}: {}", style(&violation.name).bold(), violation.reason);
    }
    Err(Error::InvalidInput("Snippet would be blocked".to_string()))
}

async fn repl() -> Result<()> {
    let config = Config::from_env()?;
    config.validate()?;
    let mut sandbox = Sandbox::new(&config);

    println!(
        "{}",
        style(format!("PyExec {} interactive session", VERSION)).cyan()
    );
    println!(
        "{}",
        style("Namespace persists between snippets. :reset clears it, :quit exits.").dim()
    );

    loop {
        let line: String = Input::with_theme(&ColorfulTheme::default())
            .with_prompt(">>>")
            .allow_empty(true)
            .interact_text()
            .map_err(|e| Error::Internal(format!("Input error: {}", e)))?;

        match line.trim() {
            "" => continue,
            ":quit" | ":exit" => break,
            ":reset" => {
                sandbox.reset().await;
                println!("{}", style("Namespace cleared").dim());
            }
            _ => println!("{}", sandbox.execute(&line).await),
        }
    }

    Ok(())
}

fn save(file: &PathBuf, name: Option<&str>) -> Result<()> {
    let code = std::fs::read_to_string(file)
        .map_err(|e| Error::InvalidInput(format!("Cannot read {}: {}", file.display(), e)))?;

    let store = ScriptStore::new(&Config::from_env()?.storage)?;
    let saved = store.save(&code, name)?;
    println!(
        "{} Saved as {} in {}",
        style("✓").green(),
        style(&saved).bold(),
        store.base_dir().display()
    );
    Ok(())
}

fn list() -> Result<()> {
    let store = ScriptStore::new(&Config::from_env()?.storage)?;
    let scripts = store.list()?;

    if scripts.is_empty() {
        println!("No saved scripts in {}", store.base_dir().display());
        return Ok(());
    }

    for info in scripts {
        println!(
            "{}  {:>8} bytes  {}",
            info.modified.format("%Y-%m-%d %H:%M:%S"),
            info.size,
            style(&info.name).bold()
        );
    }
    Ok(())
}

fn load(name: Option<&str>) -> Result<()> {
    let store = ScriptStore::new(&Config::from_env()?.storage)?;
    match store.load(name)? {
        Some(code) => {
            print!("{}", code);
            Ok(())
        }
        None => Err(Error::NotFound("No saved scripts".to_string())),
    }
}

fn delete(name: &str) -> Result<()> {
    let store = ScriptStore::new(&Config::from_env()?.storage)?;
    if store.delete(name)? {
        println!("{} Deleted {}", style("✓").green(), name);
        Ok(())
    } else {
        Err(Error::NotFound(format!("No saved script named {}", name)))
    }
}
