use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use flight_plans_rust::config::AppConfig;
use flight_plans_rust::navigation::NavigationStack;
use flight_plans_rust::plan::{PlanId, WaypointId};
use flight_plans_rust::screens::{EditorError, PlanEditorForm, PlanListScreen, WaypointDraft};
use flight_plans_rust::store::JsonFilePlanStore;
use flight_plans_rust::utils::waypoint_spec::{parse_waypoint, parse_waypoint_edit};

#[derive(Parser)]
#[command(name = "flight-plans")]
#[command(about = "Create, list and edit flight plans", long_about = None)]
struct Cli {
    /// JSON config file
    #[arg(short, long)]
    config: Option<String>,

    /// Override the store file from the config
    #[arg(short, long)]
    store: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show every saved flight plan
    List,

    /// Show one flight plan with its waypoints
    Show {
        id: String,
    },

    /// Create a new flight plan
    Create {
        #[arg(short, long)]
        name: String,

        /// e.g. 2024-05-01T10:00
        #[arg(short, long)]
        date: Option<String>,

        #[arg(long, default_value = "")]
        description: String,

        /// IDENT[/NAME]@ALTITUDE, repeatable
        #[arg(short, long = "waypoint", value_parser = parse_waypoint)]
        waypoints: Vec<WaypointDraft>,
    },

    /// Edit an existing flight plan
    Edit {
        id: String,

        #[arg(short, long)]
        name: Option<String>,

        #[arg(short, long)]
        date: Option<String>,

        #[arg(long)]
        description: Option<String>,

        /// IDENT[/NAME]@ALTITUDE, repeatable
        #[arg(long = "add-waypoint", value_parser = parse_waypoint)]
        add: Vec<WaypointDraft>,

        /// ID=IDENT[/NAME]@ALTITUDE, repeatable
        #[arg(long = "set-waypoint", value_parser = parse_waypoint_edit)]
        set: Vec<(WaypointId, WaypointDraft)>,

        /// Waypoint id, repeatable
        #[arg(long = "remove-waypoint")]
        remove: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load_or_default(cli.config.as_deref())?;
    if let Some(store) = &cli.store {
        config.store_path = store.into();
    }

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .context("Invalid log level")?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let store = JsonFilePlanStore::open(&config.store_path)
        .await
        .with_context(|| format!("Failed to open store: {}", config.store_path.display()))?;

    let mut nav = NavigationStack::new();
    let mut list = PlanListScreen::new();
    list.mount(&store).await;

    match cli.command {
        Commands::List => {
            print!("{}", list.render());
        }

        Commands::Show { id } => {
            let id = PlanId::from(id);
            list.select(&id, &mut nav);
            let editor = PlanEditorForm::open(&store, Some(&id)).await?;
            print!("{}", editor.render());
        }

        Commands::Create {
            name,
            date,
            description,
            waypoints,
        } => {
            info!("Creating flight plan {}", name);
            list.create(&mut nav);

            let mut editor = PlanEditorForm::new(None);
            editor.set_name(name)?;
            editor.set_description(description)?;
            if let Some(date) = date {
                editor.set_date_text(&date)?;
            }
            for draft in waypoints {
                apply_draft(&mut editor, None, draft)?;
            }

            submit(&mut editor, &store, &mut nav).await?;
            list.on_focus(&store).await;
            print!("{}", list.render());
        }

        Commands::Edit {
            id,
            name,
            date,
            description,
            add,
            set,
            remove,
        } => {
            let id = PlanId::from(id);
            list.select(&id, &mut nav);

            let mut editor = PlanEditorForm::open(&store, Some(&id)).await?;
            if let Some(name) = name {
                editor.set_name(name)?;
            }
            if let Some(description) = description {
                editor.set_description(description)?;
            }
            if let Some(date) = date {
                editor.set_date_text(&date)?;
            }
            for waypoint_id in remove {
                editor.delete_waypoint(&WaypointId::from(waypoint_id))?;
            }
            for (waypoint_id, draft) in set {
                apply_draft(&mut editor, Some(&waypoint_id), draft)?;
            }
            for draft in add {
                apply_draft(&mut editor, None, draft)?;
            }

            submit(&mut editor, &store, &mut nav).await?;
            list.on_focus(&store).await;
            print!("{}", list.render());
        }
    }

    Ok(())
}

/// Run one waypoint sub-form round trip on the editor
fn apply_draft(
    editor: &mut PlanEditorForm,
    id: Option<&WaypointId>,
    draft: WaypointDraft,
) -> Result<()> {
    editor.open_waypoint(id)?;
    if let Some(session) = editor.waypoint_session_mut() {
        session.draft = draft;
    }
    editor.confirm_waypoint()?;
    Ok(())
}

async fn submit(
    editor: &mut PlanEditorForm,
    store: &JsonFilePlanStore,
    nav: &mut NavigationStack,
) -> Result<()> {
    match editor.submit(store, nav).await {
        Ok(plan) => {
            info!("Saved {} with {} waypoints", plan.id, plan.nodes.len());
            Ok(())
        }
        Err(EditorError::Validation(errors)) => {
            for (field, message) in errors.iter() {
                eprintln!("{}: {}", field, message);
            }
            bail!("Flight plan is invalid");
        }
        Err(e) => Err(e.into()),
    }
}
