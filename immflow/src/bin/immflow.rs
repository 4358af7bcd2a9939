use async_trait::async_trait;
use clap::{
    Parser,
    Subcommand,
};
use immcore::{
    ac::{
        actor::Actor,
        role::Role,
    },
    dispatch::{
        ActionContext,
        ActionRef,
        ActionResult,
        traits::ActionDispatcher,
    },
    error::BackendError,
    flow::{
        InstanceFilter,
        WorkflowKind,
    },
    platform::{
        ConnectorOption,
        PlatformConnector,
    },
};
use immdb_sqlite::SqliteBackend;
use immflow::{
    guard::Facts,
    platform::{
        Builder as PlatformBuilder,
        OnDuplicate,
        Platform,
    },
};

#[derive(Debug, Parser)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    #[clap(long, value_name = "IMMFLOW_DB_URL", env = "IMMFLOW_DB_URL")]
    immflow_db_url: String,
    /// Act as this user id
    #[clap(long, default_value_t = 1)]
    actor: i64,
    /// Act under this organization
    #[clap(long, default_value_t = 1)]
    org: i64,
    /// Roles held by the acting user; repeat for more than one
    #[clap(long = "role", value_enum)]
    roles: Vec<Role>,
    #[clap(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List the workflow definitions this build carries
    Definitions,
    #[command(arg_required_else_help = true)]
    /// Start a workflow instance for a subject
    Start {
        #[arg(value_enum)]
        kind: WorkflowKind,
        subject: String,
        #[clap(long)]
        project_id: Option<i64>,
        #[clap(long, default_value = "{}")]
        metadata: String,
        /// Return the live instance for the subject instead of
        /// refusing when one already exists
        #[clap(long)]
        reuse: bool,
    },
    #[command(arg_required_else_help = true)]
    /// Show one instance
    Show {
        id: i64,
    },
    /// List instances within the acting organization
    List {
        #[clap(long, value_enum)]
        kind: Option<WorkflowKind>,
        #[clap(long)]
        state: Option<String>,
        #[clap(long)]
        subject: Option<String>,
        #[clap(long)]
        project_id: Option<i64>,
    },
    #[command(arg_required_else_help = true)]
    /// Apply a named transition to an instance
    Transition {
        id: i64,
        name: String,
        /// The instance version this request is based on
        #[clap(long)]
        version: i64,
        /// Assert that the relevant due date has passed
        #[clap(long)]
        past_due: bool,
        #[clap(long)]
        note: Option<String>,
    },
    #[command(arg_required_else_help = true)]
    /// Show the transition history of an instance
    History {
        id: i64,
    },
    #[command(arg_required_else_help = true)]
    /// Re-run the retryable actions of the latest failed attempt
    Retry {
        id: i64,
    },
    #[command(arg_required_else_help = true)]
    /// Evaluate the readiness checklist for a subject
    Readiness {
        subject: String,
    },
}

/// Stand-in dispatcher for driving workflows from the shell; effects
/// are logged rather than delivered anywhere.
struct LoggingDispatcher;

#[async_trait]
impl ActionDispatcher for LoggingDispatcher {
    async fn execute(
        &self,
        action: &ActionRef,
        ctx: &ActionContext,
    ) -> Result<ActionResult, BackendError> {
        log::info!(
            "dispatching {} ({}) for {} [{}]",
            action.name,
            action.kind,
            ctx.subject,
            ctx.dedup_token,
        );
        Ok(ActionResult::ok(action.name))
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let args = Cli::parse();
    stderrlog::new()
        .module(module_path!())
        .module("immflow")
        .module("immdb_sqlite")
        .verbosity((args.verbose as usize) + 1)
        .timestamp(stderrlog::Timestamp::Second)
        .init()
        .unwrap();

    let platform = PlatformBuilder::new()
        .flow_platform(
            SqliteBackend::flow(
                ConnectorOption::from(args.immflow_db_url)
                    .auto_create_db(true)
            )
                .await
                .map_err(anyhow::Error::from_boxed)?
        )
        .dispatcher(LoggingDispatcher)
        .build();

    let actor = Actor {
        id: args.actor,
        org_id: args.org,
        roles: args.roles.into_iter().collect(),
    };

    parse_command(&platform, &actor, args.command).await?;

    Ok(())
}

async fn parse_command<'p>(
    platform: &'p Platform,
    actor: &Actor,
    arg: Commands,
) -> anyhow::Result<()> {
    match arg {
        Commands::Definitions => {
            let mut definitions = platform.definitions()
                .collect::<Vec<_>>();
            definitions.sort_by_key(|definition| <&'static str>::from(
                definition.kind
            ));
            for definition in definitions.into_iter() {
                println!(
                    "{} (initial: {}, terminal: [{}])",
                    definition.kind,
                    definition.initial,
                    definition.terminal.join(", "),
                );
                for transition in definition.transitions.iter() {
                    println!(
                        "    {}: {} -> {}",
                        transition.name,
                        transition.from,
                        transition.target,
                    );
                }
            }
        }
        Commands::Start { kind, subject, project_id, metadata, reuse } => {
            let on_duplicate = if reuse {
                OnDuplicate::ReuseExisting
            } else {
                OnDuplicate::Reject
            };
            let instance = platform.start_instance(
                actor,
                kind,
                &subject,
                project_id,
                serde_json::from_str(&metadata)?,
                on_duplicate,
            ).await?;
            println!(
                "instance {} for {subject:?} at state {} (version {})",
                instance.id,
                instance.state,
                instance.version,
            );
        }
        Commands::Show { id } => {
            let instance = platform.instance(actor, id).await?;
            println!("id: {}", instance.id);
            println!("kind: {}", instance.kind);
            println!("org_id: {}", instance.org_id);
            match instance.project_id {
                Some(project_id) => println!("project_id: {project_id}"),
                None => println!("project_id:"),
            }
            println!("subject: {}", instance.subject);
            println!("state: {}", instance.state);
            println!("version: {}", instance.version);
            println!("metadata: {}", serde_json::to_string_pretty(
                &instance.metadata)?);
            println!("created_ts: {}", instance.created_ts);
            println!("updated_ts: {}", instance.updated_ts);
        }
        Commands::List { kind, state, subject, project_id } => {
            let mut filter = InstanceFilter::new();
            if let Some(kind) = kind {
                filter = filter.kind(kind);
            }
            if let Some(state) = state {
                filter = filter.state(state);
            }
            if let Some(subject) = subject {
                filter = filter.subject(subject);
            }
            if let Some(project_id) = project_id {
                filter = filter.project_id(project_id);
            }
            for instance in platform.instances(actor, filter).await?.iter() {
                println!(
                    "{}\t{}\t{}\t{}\tv{}",
                    instance.id,
                    instance.kind,
                    instance.subject,
                    instance.state,
                    instance.version,
                );
            }
        }
        Commands::Transition { id, name, version, past_due, note } => {
            let instance = platform.instance(actor, id).await?;
            let facts = Facts::new()
                .readiness(platform.readiness(actor, &instance.subject).await?)
                .past_due(past_due);
            let (instance, record) = platform.transition(
                actor,
                id,
                &name,
                version,
                &facts,
                note,
            ).await?;
            println!(
                "applied {}: {} -> {} (version {})",
                record.transition,
                record.from_state,
                record.to_state,
                instance.version,
            );
        }
        Commands::History { id } => {
            for record in platform.history(actor, id).await?.iter() {
                println!(
                    "{}\t{}\t{}\t{} -> {}\t{:?}\tactor {}{}",
                    record.id,
                    record.created_ts,
                    record.transition,
                    record.from_state,
                    record.to_state,
                    record.outcome,
                    record.actor_id,
                    record.note
                        .as_ref()
                        .map(|note| format!("\t{note}"))
                        .unwrap_or_default(),
                );
            }
        }
        Commands::Retry { id } => {
            let (instance, record) = platform.execute_pending_actions(
                actor,
                id,
            ).await?;
            println!(
                "applied {}: {} -> {} (version {})",
                record.transition,
                record.from_state,
                record.to_state,
                instance.version,
            );
        }
        Commands::Readiness { subject } => {
            let result = platform.readiness(actor, &subject).await?;
            for item in result.items.iter() {
                println!(
                    "[{}] {}: {}{}",
                    item.status,
                    item.key,
                    item.label,
                    item.detail
                        .as_ref()
                        .map(|detail| format!(" ({detail})"))
                        .unwrap_or_default(),
                );
            }
            println!(
                "{subject:?} is {}",
                if result.ready { "ready" } else { "not ready" },
            );
        }
    }
    Ok(())
}
