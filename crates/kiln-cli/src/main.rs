//! Kiln CLI.
//!
//! Generate, check and hot-reload CRUD APIs from a data-model schema.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use clap::{Args, Parser, Subcommand};
use notify_debouncer_mini::{new_debouncer, notify::RecursiveMode, DebounceEventResult};
use tokio::process::{Child, Command};

use kiln_compiler::ir::{OperationKind, Rule};
use kiln_compiler::{Compiler, GeneratorConfig};

mod ui;

#[derive(Parser)]
#[command(name = "kiln")]
#[command(about = "Kiln - compiles a data-model schema into a CRUD API")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Options shared by every command that runs the generator.
#[derive(Args, Clone)]
struct GenerateOpts {
    /// Schema documents directory
    #[arg(short, long, default_value = "schema")]
    schema: PathBuf,

    /// Output directory for the generated project
    #[arg(short, long, default_value = ".kiln")]
    output: PathBuf,

    /// Schema document format
    #[arg(short, long, default_value = "json")]
    format: String,

    /// Operation allow-list (comma-separated, e.g. "create,find-many,group-by").
    /// Essential operations are always included.
    #[arg(long, value_delimiter = ',')]
    operations: Option<Vec<String>>,

    /// Emit bare operation names instead of entity-prefixed ones
    #[arg(long)]
    no_prefix: bool,

    /// Disable marker-driven soft delete
    #[arg(long)]
    no_soft_delete: bool,

    /// Default rule for read procedures (allow | deny | authenticated)
    #[arg(long, default_value = "authenticated")]
    read_rule: String,

    /// Default rule for write procedures (allow | deny | authenticated)
    #[arg(long, default_value = "authenticated")]
    write_rule: String,

    /// Custom policy module exporting a named 'permissions' object;
    /// bypasses rule-table synthesis
    #[arg(long)]
    policy: Option<PathBuf>,

    /// Wrap successful responses in the uniform envelope
    #[arg(long)]
    envelope: bool,

    /// Project name (defaults to the current directory name)
    #[arg(long)]
    name: Option<String>,

    /// Port for the generated server
    #[arg(short, long, default_value_t = 3000)]
    port: u16,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a new kiln project with a sample schema
    Init {
        /// Project directory (created if it doesn't exist)
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Schema directory (relative to project)
        #[arg(short, long, default_value = "schema")]
        schema: PathBuf,
    },

    /// Generate the API project from the schema
    Generate {
        #[command(flatten)]
        opts: GenerateOpts,
    },

    /// Validate schema and synthesis without writing output
    Check {
        #[command(flatten)]
        opts: GenerateOpts,
    },

    /// Watch for schema changes and regenerate (without running)
    Watch {
        #[command(flatten)]
        opts: GenerateOpts,
    },

    /// Generate, run the server under bun, and regenerate on change
    Dev {
        #[command(flatten)]
        opts: GenerateOpts,
    },
}

#[tokio::main]
async fn main() -> miette::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Init { path, schema } => init_project(&path, &schema)?,
        Commands::Generate { opts } => generate_project(&opts).await?,
        Commands::Check { opts } => check_schema(&opts).await?,
        Commands::Watch { opts } => run_watch_mode(&opts).await?,
        Commands::Dev { opts } => run_dev_mode(&opts).await?,
    }

    Ok(())
}

/// Coerce a configured rule string into a typed rule. Unrecognized values
/// fall back to deny - loudly, but they never widen access.
fn parse_rule(label: &str, value: &str) -> Rule {
    let recognized = matches!(
        value.to_lowercase().as_str(),
        "allow" | "deny" | "authenticated"
    );
    if !recognized {
        ui::error(&format!(
            "Unrecognized {label} rule '{value}' - falling back to deny"
        ));
    }
    Rule::parse(value)
}

/// Build the typed generator configuration from CLI options. This is the
/// configuration-loading boundary: the compiler core only sees typed values.
fn build_config(opts: &GenerateOpts) -> miette::Result<GeneratorConfig> {
    let operations = match &opts.operations {
        None => None,
        Some(names) => {
            let mut kinds = Vec::with_capacity(names.len());
            for name in names {
                let kind = OperationKind::from_str(name).ok_or_else(|| {
                    miette::miette!(
                        "Unknown operation kind '{name}'. Known kinds: {}",
                        OperationKind::ALL
                            .map(|k| k.route_segment())
                            .join(", ")
                    )
                })?;
                if !kinds.contains(&kind) {
                    kinds.push(kind);
                }
            }
            Some(kinds)
        }
    };

    Ok(GeneratorConfig {
        schema_dir: opts.schema.clone(),
        out_dir: opts.output.clone(),
        format: opts.format.clone(),
        operations,
        prefix_entity_names: !opts.no_prefix,
        soft_delete: !opts.no_soft_delete,
        read_rule: parse_rule("read", &opts.read_rule),
        write_rule: parse_rule("write", &opts.write_rule),
        custom_policy: opts.policy.clone(),
        envelope: opts.envelope,
    })
}

fn project_name(opts: &GenerateOpts) -> String {
    opts.name.clone().unwrap_or_else(|| {
        std::env::current_dir()
            .ok()
            .and_then(|dir| dir.file_name().map(|n| n.to_string_lossy().to_string()))
            .unwrap_or_else(|| "kiln-app".to_string())
    })
}

/// Initialize a new project with a sample schema document.
fn init_project(path: &Path, schema: &Path) -> miette::Result<()> {
    let spinner = ui::spinner("Scaffolding project...");

    let schema_dir = path.join(schema);
    std::fs::create_dir_all(&schema_dir)
        .map_err(|e| miette::miette!("Failed to create {}: {}", schema_dir.display(), e))?;

    let sample = r#"{
  "models": [
    {
      "name": "User",
      "fields": [
        { "name": "id", "kind": "scalar", "type": "String", "isId": true },
        { "name": "email", "kind": "scalar", "type": "String", "isUnique": true },
        { "name": "name", "kind": "scalar", "type": "String", "isRequired": false }
      ]
    },
    {
      "name": "Post",
      "fields": [
        { "name": "id", "kind": "scalar", "type": "String", "isId": true },
        { "name": "title", "kind": "scalar", "type": "String" },
        { "name": "views", "kind": "scalar", "type": "Int" },
        { "name": "authorId", "kind": "scalar", "type": "String" },
        { "name": "author", "kind": "object", "type": "User",
          "relationName": "PostAuthor",
          "relationFromFields": ["authorId"], "relationToFields": ["id"] },
        { "name": "deletedAt", "kind": "scalar", "type": "DateTime", "isRequired": false }
      ]
    }
  ]
}
"#;

    let sample_path = schema_dir.join("schema.json");
    std::fs::write(&sample_path, sample)
        .map_err(|e| miette::miette!("Failed to write {}: {}", sample_path.display(), e))?;

    spinner.finish_and_clear();

    ui::success("Done. Here's what you got:");
    println!();
    println!(
        "    {}",
        console::style(format!("{}/", schema_dir.display())).cyan().bold()
    );
    println!("      schema.json    Your data model (User + soft-deletable Post)");
    println!();
    ui::divider();
    println!("  Now do this:");
    println!();
    if path != Path::new(".") {
        println!("    cd {}", path.display());
    }
    println!("    kiln dev");
    println!();

    Ok(())
}

/// Generate the full project once.
async fn generate_project(opts: &GenerateOpts) -> miette::Result<()> {
    let start = Instant::now();
    let spinner = ui::spinner("Generating API project...");

    let config = build_config(opts)?;
    let compiler = Compiler::new(config);
    let result = compiler.generate_project(&project_name(opts), opts.port).await?;

    spinner.finish_and_clear();

    ui::success("Generated:");
    ui::summary(result.entities, result.procedures, result.rules);
    println!();
    ui::timing("Done", start.elapsed().as_millis());
    println!();
    ui::info(&format!("cd {} && bun run dev", opts.output.display()));
    println!();

    Ok(())
}

/// Validate without writing.
async fn check_schema(opts: &GenerateOpts) -> miette::Result<()> {
    let spinner = ui::spinner("Checking schema...");

    let config = build_config(opts)?;
    let compiler = Compiler::new(config);

    match compiler.check().await {
        Ok(result) => {
            spinner.finish_and_clear();
            ui::success("All consistent.");
            ui::summary(result.entities, result.procedures, result.rules);
            Ok(())
        }
        Err(e) => {
            spinner.finish_and_clear();
            Err(e.into())
        }
    }
}

/// Spawn the debounced schema watcher on its own thread, forwarding change
/// signals into the tokio channel.
fn spawn_watcher(schema_dir: PathBuf, tx: tokio::sync::mpsc::Sender<()>) {
    std::thread::spawn(move || {
        let (notify_tx, notify_rx) = std::sync::mpsc::channel();

        let mut debouncer = new_debouncer(
            Duration::from_millis(500),
            move |result: DebounceEventResult| {
                if let Ok(events) = result {
                    if !events.is_empty() {
                        let _ = notify_tx.send(());
                    }
                }
            },
        )
        .expect("Failed to create file watcher");

        debouncer
            .watcher()
            .watch(&schema_dir, RecursiveMode::Recursive)
            .expect("Failed to watch schema directory");

        while notify_rx.recv().is_ok() {
            let _ = tx.try_send(());
        }
    });
}

/// Watch mode: regenerate modules on every schema change.
async fn run_watch_mode(opts: &GenerateOpts) -> miette::Result<()> {
    ui::info(&format!("Watching for changes in {}", opts.schema.display()));
    println!();

    let (tx, mut rx) = tokio::sync::mpsc::channel::<()>(1);
    spawn_watcher(opts.schema.clone(), tx);

    ui::info("Ready! Waiting for changes...");

    loop {
        tokio::select! {
            _ = rx.recv() => {
                println!();
                let spinner = ui::spinner("Change detected, regenerating...");
                let start = Instant::now();

                let config = build_config(opts)?;
                let compiler = Compiler::new(config);
                match compiler.generate().await {
                    Ok(result) => {
                        spinner.finish_and_clear();
                        ui::success(&format!(
                            "Generated {} procedure(s) in {}ms",
                            result.procedures,
                            start.elapsed().as_millis()
                        ));
                    }
                    Err(e) => {
                        spinner.finish_and_clear();
                        ui::error(&format!("{e}"));
                    }
                }
                println!();
                ui::info("Ready! Waiting for changes...");
            }
            _ = tokio::signal::ctrl_c() => {
                println!();
                ui::dim("Stopping watch mode.");
                break;
            }
        }
    }

    Ok(())
}

/// Dev mode: generate, run under bun, regenerate and restart on change.
async fn run_dev_mode(opts: &GenerateOpts) -> miette::Result<()> {
    println!();
    ui::info("Kiln dev server");
    println!();

    let spinner = ui::spinner("Initial generation...");
    let config = build_config(opts)?;
    let compiler = Compiler::new(config);
    compiler.generate_project(&project_name(opts), opts.port).await?;
    spinner.finish_and_clear();

    let (tx, mut rx) = tokio::sync::mpsc::channel::<()>(1);
    spawn_watcher(opts.schema.clone(), tx);

    ui::info(&format!("Server starting on http://localhost:{}", opts.port));
    let mut server = start_bun_dev(&opts.output).await.ok();

    println!();
    ui::info("Ready! Waiting for changes...");

    loop {
        tokio::select! {
            _ = rx.recv() => {
                println!();
                let spinner = ui::spinner("Change detected, regenerating...");
                let start = Instant::now();

                let config = build_config(opts)?;
                let compiler = Compiler::new(config);
                match compiler.generate().await {
                    Ok(result) => {
                        spinner.finish_and_clear();
                        ui::timing(
                            &format!("Regenerated {} procedure(s)", result.procedures),
                            start.elapsed().as_millis(),
                        );
                        // bun --hot reloads the regenerated modules; only
                        // restart if the process died.
                        let alive = server
                            .as_mut()
                            .is_some_and(|proc| matches!(proc.try_wait(), Ok(None)));
                        if !alive {
                            server = start_bun_dev(&opts.output).await.ok();
                        }
                    }
                    Err(e) => {
                        spinner.finish_and_clear();
                        ui::error(&format!("{e}"));
                    }
                }
                println!();
                ui::info("Ready! Waiting for changes...");
            }
            _ = tokio::signal::ctrl_c() => {
                println!();
                ui::dim("Shutting down...");
                if let Some(mut proc) = server.take() {
                    let _ = proc.kill().await;
                }
                break;
            }
        }
    }

    Ok(())
}

/// Start the generated project under bun as a background process.
async fn start_bun_dev(project_dir: &Path) -> miette::Result<Child> {
    let install_status = Command::new("bun")
        .args(["install"])
        .current_dir(project_dir)
        .status()
        .await
        .map_err(|e| miette::miette!("Failed to run bun install: {e}"))?;

    if !install_status.success() {
        return Err(miette::miette!("bun install failed"));
    }

    Command::new("bun")
        .args(["run", "--hot", "src/index.ts"])
        .current_dir(project_dir)
        .spawn()
        .map_err(|e| miette::miette!("Failed to start bun: {e}"))
}
