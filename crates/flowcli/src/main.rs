// crates/flowcli/src/main.rs

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use flowcore::{ActorSlot, GraphDefinition, GraphError, NodeRecord, NodeType, ObjectiveAction, RunEvent, World};
use flowruntime::{validate, FlowRuntime, RuntimeConfig};
use flowworld::{ScriptedWorld, WorldCall, WorldScript};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::broadcast::{self, error::TryRecvError};
use tokio::time::{Duration, MissedTickBehavior};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "flow")]
#[command(about = "Flow Graph CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a flow graph file against a scripted world
    Run {
        /// Path to graph JSON file
        #[arg(short, long)]
        file: PathBuf,

        /// Path to world script JSON file
        #[arg(short, long)]
        world: Option<PathBuf>,

        /// Seconds advanced per tick
        #[arg(long, default_value_t = 0.1)]
        dt: f32,

        /// Stop the run after this many ticks
        #[arg(long, default_value_t = 10_000)]
        max_ticks: u64,

        /// Pace ticks in wall-clock time instead of running flat out
        #[arg(long)]
        realtime: bool,

        /// Show verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Validate a graph file
    Validate {
        /// Path to graph JSON file
        file: PathBuf,

        /// Print the lint report as JSON
        #[arg(long)]
        json: bool,
    },

    /// List available node types
    Nodes,

    /// Create a new example graph
    Init {
        /// Output file path
        #[arg(short, long, default_value = "flow.json")]
        output: PathBuf,
    },
}

struct RunOptions {
    file: PathBuf,
    world: Option<PathBuf>,
    dt: f32,
    max_ticks: u64,
    realtime: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run { file, world, dt, max_ticks, realtime, verbose } => {
            // Initialize logging; RUST_LOG overrides the flag
            let level = if verbose { "debug" } else { "info" };
            tracing_subscriber::fmt()
                .with_env_filter(
                    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)),
                )
                .init();

            run_flow(RunOptions { file, world, dt, max_ticks, realtime }).await?;
        }

        Commands::Validate { file, json } => {
            validate_graph(file, json)?;
        }

        Commands::Nodes => {
            list_nodes();
        }

        Commands::Init { output } => {
            create_example_graph(output)?;
        }
    }

    Ok(())
}

fn load_graph(file: &PathBuf) -> Result<GraphDefinition> {
    if !file.exists() {
        return Err(GraphError::NotFound(file.display().to_string()).into());
    }

    let json = std::fs::read_to_string(file)
        .with_context(|| format!("reading {}", file.display()))?;
    let graph = GraphDefinition::from_json_str(&json)
        .with_context(|| format!("parsing {}", file.display()))?;
    Ok(graph)
}

async fn run_flow(options: RunOptions) -> Result<()> {
    if !options.dt.is_finite() || options.dt <= 0.0 {
        anyhow::bail!("--dt must be positive, got {}", options.dt);
    }

    println!("🚀 Loading graph from: {}", options.file.display());
    let graph = load_graph(&options.file)?;

    println!("📋 Graph: {}", graph.id);
    println!("   Nodes: {}", graph.nodes.len());
    println!("   Actor slots: {}", graph.actor_slots.len());
    for slot in graph.auto_spawn_slots() {
        println!("   🧍 spawn '{}' ({})", slot.id, slot.prefab.as_deref().unwrap_or("no prefab"));
    }
    println!();

    let script = match &options.world {
        Some(path) => WorldScript::load(path)
            .with_context(|| format!("loading world script {}", path.display()))?,
        None => WorldScript::default(),
    };

    let world = Arc::new(ScriptedWorld::new(script.clone()));
    let shared: Arc<dyn World> = world.clone();
    let mut runtime = FlowRuntime::with_config(Some(shared), RuntimeConfig::default());
    let mut events = runtime.subscribe_events();

    runtime.start(graph);
    print_events(&mut events);

    let mut interval = tokio::time::interval(Duration::from_secs_f32(options.dt));
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut tick = 0;
    while runtime.is_running() && tick < options.max_ticks {
        if options.realtime {
            interval.tick().await;
        }

        tick += 1;
        world.advance(options.dt);
        runtime.tick(options.dt);

        print_world_calls(&world);
        print_events(&mut events);

        for trigger_id in script.triggers_at(tick) {
            let woken = runtime.signal_trigger(trigger_id);
            println!("  🔔 Trigger '{}' after tick {} woke {} node(s)", trigger_id, tick, woken);
        }
        print_events(&mut events);
    }

    let finished = !runtime.is_running();
    if !finished {
        tracing::warn!("Tick limit of {} reached, stopping run", options.max_ticks);
        println!("⏹️  Tick limit reached, stopping run");
        for status in runtime.node_statuses().iter().filter(|s| s.active) {
            println!("   Stuck at: {}", status.status);
        }
        runtime.stop();
        print_events(&mut events);
    }

    println!();
    println!("📊 Run Summary:");
    println!("   Ticks: {}", tick);
    println!("   Simulated time: {:.2}s", tick as f32 * options.dt);
    println!("   Finished: {}", finished);

    Ok(())
}

fn print_world_calls(world: &ScriptedWorld) {
    for call in world.take_journal() {
        match call {
            WorldCall::PlayDialogue { sequence } => {
                println!("     💬 play dialogue '{}'", sequence);
            }
            WorldCall::ActivateObjective { objective_id } => {
                println!("     🎯 objective '{}' activated", objective_id);
            }
            WorldCall::CompleteObjective { objective_id } => {
                println!("     🏁 objective '{}' completed", objective_id);
            }
        }
    }
}

fn print_events(events: &mut broadcast::Receiver<RunEvent>) {
    loop {
        let event = match events.try_recv() {
            Ok(event) => event,
            Err(TryRecvError::Lagged(skipped)) => {
                println!("  (skipped {} events)", skipped);
                continue;
            }
            Err(_) => break,
        };

        let indent = "  ".repeat(event.depth() as usize + 1);
        match event {
            RunEvent::RunStarted { graph_id, .. } => {
                println!("{}▶️  Graph '{}' started", indent, graph_id);
            }
            RunEvent::NodeEntered { node_id, node_type, tick, .. } => {
                println!("{}⚡ [{}] {} '{}'", indent, tick, node_type, node_id);
            }
            RunEvent::NodeExited { .. } => {}
            RunEvent::TriggerSignalled { .. } => {}
            RunEvent::RunFinished { graph_id, ticks, .. } => {
                println!("{}✨ Graph '{}' finished after {} ticks", indent, graph_id, ticks);
            }
            RunEvent::RunStopped { graph_id, .. } => {
                println!("{}💥 Graph '{}' stopped", indent, graph_id);
            }
        }
    }
}

fn validate_graph(file: PathBuf, json: bool) -> Result<()> {
    let graph = load_graph(&file)?;
    let report = validate(&graph);

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        report.ensure_valid()?;
        return Ok(());
    }

    println!("🔍 Validating graph: {}", file.display());

    println!("   Name: {}", graph.id);
    println!("   Nodes: {}", graph.nodes.len());

    if report.is_clean() {
        println!("✅ Graph is valid");
        return Ok(());
    }

    for issue in report.issues() {
        println!("   {}", issue);
    }

    report.ensure_valid()?;
    println!("✅ Graph is valid ({} warnings)", report.warnings().count());

    Ok(())
}

fn list_nodes() {
    println!("📦 Available Node Types:");
    println!();

    for node_type in NodeType::ALL {
        println!("  • {}", node_type);
        println!("    {}", node_type.description());
    }
}

fn create_example_graph(output: PathBuf) -> Result<()> {
    let graph = GraphDefinition::new("gate_scene")
        .with_node(NodeRecord::start("Start").with_next("activate"))
        .with_node(
            NodeRecord::objective("activate", "reach_gate", ObjectiveAction::Activate)
                .with_next("intro"),
        )
        .with_node(NodeRecord::dialogue("intro", "intro_talk", true).with_next("has_key"))
        .with_node(
            NodeRecord::branch("has_key", [("player_has_key", "open_gate")])
                .with_next("wait_lever"),
        )
        .with_node(NodeRecord::wait_for_trigger("wait_lever", "gate_lever").with_next("open_gate"))
        .with_node(NodeRecord::sequence("open_gate", ["pause", "patrol", "finish"]))
        .with_node(NodeRecord::delay("pause", 1.0))
        .with_node(NodeRecord::looped("patrol", "patrol_leg", 2))
        .with_node(NodeRecord::delay("patrol_leg", 0.5).with_next("patrol"))
        .with_node(NodeRecord::objective("finish", "reach_gate", ObjectiveAction::Complete))
        .with_actor_slot(
            ActorSlot::new("Gate_A")
                .with_prefab("Props/Gate")
                .with_position(4.0, 0.0, 12.0),
        );

    std::fs::write(&output, graph.to_json_pretty()?)?;

    println!("✨ Created example graph: {}", output.display());
    println!();
    println!("Run it with:");
    println!("  flow run --file {} --dt 0.5", output.display());

    Ok(())
}
