use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use civicflow_core::Report;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::{
    app::CivicApp,
    config::ClientConfig,
    dispatch::DispatchLinks,
    gamification::{Level, POINTS_PER_REPORT},
    geocode::{LocateStatus, ReverseGeocoder},
    history::clean_text,
    language::Language,
    relay::RelayClient,
    session::User,
    store::StateStore,
    strategy::{ReportStrategy, DEFAULT_MANUAL_CATEGORY},
};

#[derive(Parser, Debug)]
#[command(name = "civicflow")]
#[command(about = "Report civic issues in Udaipur and draft formal complaint letters")]
pub struct Args {
    #[command(subcommand)]
    pub cmd: Command,

    /// Relay base URL (overrides CIVICFLOW_RELAY_URL).
    #[arg(long, global = true)]
    pub relay_url: Option<String>,

    /// State file (overrides CIVICFLOW_STATE_PATH).
    #[arg(long, global = true)]
    pub state: Option<PathBuf>,

    /// English or Hindi (overrides CIVICFLOW_LANGUAGE).
    #[arg(long, global = true)]
    pub language: Option<Language>,

    /// Override log level (trace/debug/info/warn/error).
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Print the report as JSON instead of the formatted view.
    #[arg(long, global = true)]
    pub json: bool,
}

/// Where the incident is: a typed address, or coordinates to reverse geocode.
#[derive(clap::Args, Debug)]
pub struct LocationArgs {
    #[arg(long, conflicts_with_all = ["lat", "lon"])]
    pub address: Option<String>,
    #[arg(long, requires = "lon", allow_negative_numbers = true)]
    pub lat: Option<f64>,
    #[arg(long, requires = "lat", allow_negative_numbers = true)]
    pub lon: Option<f64>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Sign in as a guest, or record a federated identity when --email is given.
    Login {
        name: String,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        photo_url: Option<String>,
    },
    Logout {},
    /// Analyze a photo of the issue.
    Photo {
        image: PathBuf,
        #[command(flatten)]
        location: LocationArgs,
    },
    /// Turn a written description into a formal letter.
    Manual {
        #[arg(long, default_value = DEFAULT_MANUAL_CATEGORY)]
        category: String,
        #[arg(long)]
        description: String,
        #[command(flatten)]
        location: LocationArgs,
    },
    /// Report that the garbage collection vehicle did not come.
    Vehicle {
        #[command(flatten)]
        location: LocationArgs,
    },
    History {},
    Status {},
    /// Reverse geocode coordinates to an address.
    Locate {
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,
        #[arg(long, allow_negative_numbers = true)]
        lon: f64,
    },
}

pub async fn dispatch(args: Args) -> Result<()> {
    let cfg = resolve_config(&args)?;

    match &args.cmd {
        Command::Login {
            name,
            email,
            photo_url,
        } => {
            let mut app = open_app(&cfg).await?;
            let user = match email {
                Some(email) => {
                    app.sign_in(User::federated(name, email, photo_url.as_deref()))
                        .await?
                }
                None => app.login_guest(name).await?,
            };
            println!("Signed in as {} <{}>", user.display_name, user.email);
            Ok(())
        }
        Command::Logout {} => {
            open_app(&cfg).await?.logout().await?;
            println!("Signed out");
            Ok(())
        }
        Command::Photo { image, location } => {
            let strategy = ReportStrategy::Photo {
                image: image.clone(),
            };
            report(&args, &cfg, strategy, location).await
        }
        Command::Manual {
            category,
            description,
            location,
        } => {
            let strategy = ReportStrategy::Manual {
                category: category.clone(),
                description: description.clone(),
            };
            report(&args, &cfg, strategy, location).await
        }
        Command::Vehicle { location } => {
            report(&args, &cfg, ReportStrategy::VehicleAbsence, location).await
        }
        Command::History {} => history(&cfg).await,
        Command::Status {} => status(&cfg).await,
        Command::Locate { lat, lon } => {
            let geocoder = ReverseGeocoder::new(&cfg.nominatim_url)?;
            let located = geocoder.locate(*lat, *lon).await;
            match located.status {
                LocateStatus::Resolved => println!("{}", located.address),
                LocateStatus::CoordinatesOnly => println!("{} (GPS only)", located.address),
            }
            Ok(())
        }
    }
}

pub fn init_logging(level: Option<&str>) -> Result<()> {
    let level = level.unwrap_or("warn");
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("civicflow_client={level}")));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true),
        )
        .try_init()
        .map_err(|e| anyhow!("failed to init logging: {e}"))
}

fn resolve_config(args: &Args) -> Result<ClientConfig> {
    let mut cfg = ClientConfig::from_env()?;
    if let Some(url) = &args.relay_url {
        cfg.relay_url = url.clone();
    }
    if let Some(path) = &args.state {
        cfg.state_path = path.clone();
    }
    if let Some(language) = args.language {
        cfg.language = language;
    }
    Ok(cfg)
}

async fn open_app(cfg: &ClientConfig) -> Result<CivicApp> {
    let relay = RelayClient::new(&cfg.relay_url).context("build relay client")?;
    let app = CivicApp::open(
        StateStore::new(&cfg.state_path),
        Arc::new(relay),
        cfg.language,
    )
    .await
    .with_context(|| format!("load state: {}", cfg.state_path.display()))?;
    Ok(app.with_template_delay(cfg.template_delay))
}

async fn resolve_address(cfg: &ClientConfig, location: &LocationArgs) -> Result<String> {
    if let Some(address) = &location.address {
        return Ok(address.trim().to_string());
    }
    match (location.lat, location.lon) {
        (Some(lat), Some(lon)) => {
            let geocoder = ReverseGeocoder::new(&cfg.nominatim_url)?;
            let located = geocoder.locate(lat, lon).await;
            if located.status == LocateStatus::CoordinatesOnly {
                eprintln!("⚠️ GPS Only");
            }
            Ok(located.address)
        }
        _ => Ok(String::new()),
    }
}

async fn report(
    args: &Args,
    cfg: &ClientConfig,
    strategy: ReportStrategy,
    location: &LocationArgs,
) -> Result<()> {
    let mut app = open_app(cfg).await?;
    if app.user().is_none() {
        bail!("Not signed in. Run `civicflow login <name>` first.");
    }

    let address = resolve_address(cfg, location).await?;
    let model_backed = strategy.is_model_backed();
    app.begin(strategy)?;
    app.set_address(address.clone());

    if model_backed {
        eprintln!("{}", cfg.language.pick("☁️ Analyzing...", "☁️ जांच कर रहा है..."));
    }
    let report = app.submit().await?.clone();
    info!("Report ready: {}", report.category);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report, &address, cfg.language);
        println!(
            "\n+{POINTS_PER_REPORT} points! {} pts, {}",
            app.points(),
            app.level()
        );
    }

    app.reset();
    Ok(())
}

fn print_report(report: &Report, address: &str, language: Language) {
    println!("Priority: {}", report.priority);
    println!("{}", clean_text(&report.category));
    println!("{}", clean_text(&report.description));
    if !report.eco_tip.is_empty() {
        println!("🌱 Tip: {}", clean_text(&report.eco_tip));
    }
    if !report.image_url.is_empty() {
        println!("Image: {}", report.image_url);
    }

    println!("\n{}", language.pick("📩 Drafted Complaint", "📩 शिकायत पत्र"));
    println!("To: {} <{}>", report.recipient_name, report.recipient_email);
    println!("Subject: {}", clean_text(&report.email_draft.subject));
    println!("---");
    println!("{}", clean_text(&report.email_draft.body));

    let links = DispatchLinks::for_report(report, address);
    println!("\n{}: {}", links.call.label, links.call.href);
    println!(
        "{}: {}",
        language.pick("💬 Share on WhatsApp", "💬 व्हाट्सएप पर भेजें"),
        links.whatsapp
    );
    println!("Email: {}", links.mailto);
    println!("Gmail: {}", links.gmail);
    println!("Outlook: {}", links.outlook);
}

async fn history(cfg: &ClientConfig) -> Result<()> {
    let state = StateStore::new(&cfg.state_path).load().await?;
    if state.history.is_empty() {
        println!("No reports yet.");
        return Ok(());
    }
    for entry in &state.history {
        println!(
            "{}  {:<28} {:<24} {}",
            entry.date,
            entry.category,
            entry.location,
            entry.status.label()
        );
    }
    Ok(())
}

async fn status(cfg: &ClientConfig) -> Result<()> {
    let state = StateStore::new(&cfg.state_path).load().await?;
    match &state.user {
        Some(user) => println!("Signed in as {} <{}>", user.display_name, user.email),
        None => println!("Not signed in"),
    }

    let level = Level::for_points(state.points);
    println!("Points: {} ({})", state.points, level);
    if let Some(missing) = Level::points_to_next(state.points) {
        println!("{missing} points to the next level");
    }
    println!("Reports: {}", state.history.len());
    Ok(())
}
