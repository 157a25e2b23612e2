use clap::{Parser, Subcommand};
use review_console_lib::commands::review::{self, DecisionInput};
use review_console_lib::commands::settings::{self, default_data_dir, SettingsUpdate, SETTINGS_FILE};
use review_console_lib::error::AppError;
use review_console_lib::models::NewReviewerRequest;
use review_console_lib::services::console_session::LoadScope;
use review_console_lib::services::navigation::{HomePage, Navigator, NavigationTarget};
use review_console_lib::services::review_console::TransitionPolicy;
use review_console_lib::services::text_view;
use review_console_lib::services::RequestStore;
use review_console_lib::App;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "review-console", version, about = "Approve or deny student reviewer requests")]
struct Cli {
    /// Settings file (defaults to settings.json in the data directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// SQLite database path (overrides the settings file)
    #[arg(long, global = true)]
    database: Option<PathBuf>,

    /// Refuse to change a request that has already been decided
    #[arg(long, global = true)]
    final_decisions: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Serve the console as a web page
    Serve {
        /// Port to listen on
        #[arg(long)]
        port: Option<u16>,
        /// Address to bind
        #[arg(long)]
        bind: Option<String>,
    },
    /// Show pending requests with their actions
    List {
        /// Include decided requests
        #[arg(long)]
        all: bool,
    },
    /// Approve a request
    Approve(DecisionArgs),
    /// Deny a request
    Deny(DecisionArgs),
    /// Submit a new reviewer request
    Submit {
        /// Student display name
        student_name: String,
        #[arg(long)]
        student_id: Option<String>,
        #[arg(long)]
        qualifications: Option<String>,
        /// Explicit request ID (generated when omitted)
        #[arg(long)]
        id: Option<String>,
    },
    /// Insert the demo requests (S101, S102, S103)
    Seed,
    /// Show settings, or change and save them
    ///
    /// Global --database and --final-decisions are saved as well.
    Config {
        /// Transition policy: last_write_wins or final_decision
        #[arg(long)]
        policy: Option<String>,
        /// Default port for `serve`
        #[arg(long)]
        port: Option<u16>,
        /// Default bind address for `serve`
        #[arg(long)]
        bind: Option<String>,
        /// Instructor username
        #[arg(long)]
        username: Option<String>,
        /// Instructor display name
        #[arg(long)]
        display_name: Option<String>,
    },
    /// Show the instructor home page, optionally following a menu entry
    Home {
        /// Navigation target, e.g. qa-page or logout
        target: Option<String>,
    },
}

#[derive(clap::Args, Debug)]
struct DecisionArgs {
    /// Request ID
    id: String,
    /// Instructor note
    #[arg(long, default_value = "")]
    note: String,
    /// Only apply if the request currently has this status
    #[arg(long)]
    expect: Option<String>,
}

impl DecisionArgs {
    fn into_input(self) -> DecisionInput {
        DecisionInput {
            request_id: self.id,
            note: Some(self.note),
            expected_status: self.expect,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), AppError> {
    let data_dir = default_data_dir();
    let config_path = cli.config.unwrap_or_else(|| data_dir.join(SETTINGS_FILE));

    if let Commands::Config {
        policy,
        port,
        bind,
        username,
        display_name,
    } = cli.command
    {
        let mut transition_policy: Option<TransitionPolicy> =
            policy.as_deref().map(str::parse).transpose()?;
        if cli.final_decisions {
            transition_policy = Some(TransitionPolicy::FinalDecision);
        }

        let update = SettingsUpdate {
            database_path: cli.database,
            bind_address: bind,
            port,
            transition_policy,
            username,
            display_name,
        };
        let saved = settings::update_settings(&config_path, update).await?;
        println!("{}", serde_json::to_string_pretty(&saved)?);
        return Ok(());
    }

    let mut settings = settings::load_settings(&config_path).await?;
    if let Some(database) = cli.database {
        settings.database_path = Some(database);
    }
    if cli.final_decisions {
        settings.review.transition_policy = TransitionPolicy::FinalDecision;
    }

    if let Commands::Serve { port, bind } = &cli.command {
        if let Some(port) = port {
            settings.server.port = *port;
        }
        if let Some(bind) = bind {
            settings.server.bind_address = bind.clone();
        }
    }

    let app = App::initialize(settings, &data_dir).await?;

    match cli.command {
        Commands::Serve { .. } => app.serve().await?,
        Commands::List { all: true } => {
            let requests = app.store.load_all_requests().await?;
            print!("{}", text_view::render_requests(&requests));
        }
        Commands::List { all: false } => {
            let session = app.open_session(LoadScope::Pending).await.into_shared();
            let view = review::get_reviewer_requests(&session).await;
            print!("{}", text_view::render_console(&view));
        }
        Commands::Approve(args) => {
            let session = app.open_session(LoadScope::All).await.into_shared();
            let updated = review::approve_request(&session, args.into_input()).await?;
            println!("{}", updated);
        }
        Commands::Deny(args) => {
            let session = app.open_session(LoadScope::All).await.into_shared();
            let updated = review::deny_request(&session, args.into_input()).await?;
            println!("{}", updated);
        }
        Commands::Submit {
            student_name,
            student_id,
            qualifications,
            id,
        } => {
            let request = review::submit_request(
                app.store.as_ref(),
                NewReviewerRequest {
                    id,
                    student_name,
                    student_id,
                    qualifications,
                    date_submitted: None,
                },
            )
            .await?;
            println!("Submitted {} [{}]", request, request.id());
        }
        Commands::Seed => {
            let inserted = review::seed_demo_requests(app.store.as_ref()).await?;
            println!("Inserted {} demo request(s)", inserted.len());
        }
        // Handled before the database is opened.
        Commands::Config { .. } => {}
        Commands::Home { target } => {
            let instructor = app.settings.instructor.clone();
            print!("{}", text_view::render_home(&HomePage::new(instructor.clone())));
            if let Some(target) = target {
                let target: NavigationTarget = target.parse()?;
                let event = Navigator::new().navigate(&instructor, target);
                println!("-> {}", event.target.caption());
            }
        }
    }

    Ok(())
}
