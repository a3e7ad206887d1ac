use std::{path::PathBuf, sync::Arc, time::Duration};

use clap::{Args as ClapArgs, Parser, Subcommand, arg};
use log::{error, info, warn};

use lapdash::{
    DashboardController, LapDashError, SelectionState, SessionProvider,
    provider::{CachedProvider, JsonlSessionProvider, OpenF1Provider},
    session::{SessionKey, SessionType},
    ui::{
        DashboardApp, chart_panel::LapChartPanel, config::AppConfig, style::Stylesheet,
        table_panel::LapTablePanel,
    },
    writer,
};

const WINDOW_TITLE: &str = "F1 Lap Time Dashboard";

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Args {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Session selection flags, anything omitted comes from the saved config
#[derive(ClapArgs, Debug, Default, Clone)]
struct SessionArgs {
    #[arg(short, long)]
    year: Option<i32>,

    #[arg(short, long)]
    race: Option<String>,

    /// FP1, FP2, FP3, Q or R
    #[arg(short, long)]
    session: Option<SessionType>,
}

impl SessionArgs {
    fn resolve(&self, saved: &SessionKey) -> SessionKey {
        SessionKey::new(
            self.year.unwrap_or(saved.year),
            self.race.as_deref().unwrap_or(&saved.race),
            self.session.unwrap_or(saved.session_type),
        )
    }
}

#[derive(ClapArgs, Debug, Default, Clone)]
struct DashboardArgs {
    #[command(flatten)]
    session: SessionArgs,

    /// Stylesheet to load instead of the configured one
    #[arg(long)]
    style: Option<PathBuf>,

    /// Read sessions from an exported file instead of the timing API
    #[arg(long)]
    offline: Option<PathBuf>,

    #[arg(long, default_value_t = false)]
    no_cache: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    Dashboard(DashboardArgs),
    Export {
        #[command(flatten)]
        session: SessionArgs,

        #[arg(short, long)]
        output: PathBuf,

        /// Replace the output file instead of appending to it
        #[arg(long, default_value_t = false)]
        overwrite: bool,
    },
}

fn load_config() -> AppConfig {
    match AppConfig::from_local_file() {
        Ok(Some(config)) => config,
        Ok(None) => AppConfig::default(),
        Err(e) => {
            warn!("Could not read config file, using defaults: {}", e);
            AppConfig::default()
        }
    }
}

fn online_provider(
    app_config: &AppConfig,
    no_cache: bool,
) -> Result<Arc<dyn SessionProvider>, LapDashError> {
    let api = OpenF1Provider::new(
        &app_config.api_base_url,
        Duration::from_secs(app_config.request_timeout_s),
    )?;
    if app_config.use_cache && !no_cache {
        Ok(Arc::new(CachedProvider::new_default(api)?))
    } else {
        Ok(Arc::new(api))
    }
}

fn build_provider(
    app_config: &AppConfig,
    args: &DashboardArgs,
) -> Result<Arc<dyn SessionProvider>, LapDashError> {
    match &args.offline {
        Some(input) => Ok(Arc::new(JsonlSessionProvider::from_file(input)?)),
        None => online_provider(app_config, args.no_cache),
    }
}

fn dashboard(args: DashboardArgs) -> Result<(), LapDashError> {
    let mut app_config = load_config();
    let key = args.session.resolve(&app_config.last_session);
    app_config.last_session = key.clone();

    let stylesheet_path = args
        .style
        .clone()
        .unwrap_or_else(|| app_config.stylesheet_path.clone());
    let stylesheet = Stylesheet::load(&stylesheet_path)?;

    let provider = build_provider(&app_config, &args)?;
    info!("Starting dashboard for {} using {}", key, provider.name());

    let mut controller = DashboardController::new(
        provider,
        LapTablePanel::new(stylesheet.table_row_height),
        LapChartPanel::new(&stylesheet),
        SelectionState { key, driver: None },
    );
    controller.set_chart_options(app_config.chart_options);
    controller.initialize()?;

    let mut native_options = eframe::NativeOptions::default();
    native_options.viewport = native_options
        .viewport
        .with_title(WINDOW_TITLE)
        .with_inner_size(app_config.window_size.clone());

    eframe::run_native(
        WINDOW_TITLE,
        native_options,
        Box::new(|cc| Ok(Box::new(DashboardApp::new(controller, app_config, stylesheet, cc)))),
    )
    .map_err(|e| LapDashError::UiError {
        reason: e.to_string(),
    })
}

fn export(session: &SessionArgs, output: &PathBuf, overwrite: bool) -> Result<(), LapDashError> {
    let app_config = load_config();
    let key = session.resolve(&app_config.last_session);
    let provider = online_provider(&app_config, false)?;

    let session = provider.load_session(&key)?;
    writer::write_sessions(output, &[session], !overwrite)?;
    info!("Exported {} to {:?}", key, output);
    Ok(())
}

fn main() {
    #[cfg(debug_assertions)]
    colog::init();

    let cli = Args::parse();
    if let Err(e) = ctrlc::set_handler(move || {
        println!("Exiting...");
        std::process::exit(0);
    }) {
        warn!("Could not set Ctrl-C handler: {}", e);
    }

    let result = match cli.command {
        Some(Commands::Export {
            session,
            output,
            overwrite,
        }) => export(&session, &output, overwrite),
        Some(Commands::Dashboard(args)) => dashboard(args),
        None => dashboard(DashboardArgs::default()),
    };

    if let Err(e) = result {
        error!("{}", e);
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
