use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use pharmacare::analytics;
use pharmacare::chat::ChatService;
use pharmacare::config::AppConfig;
use pharmacare::import::Importer;
use pharmacare::logging::{init_logging, OperationTimer};
use pharmacare::metrics::MetricsCollector;
use pharmacare::models::{NewPharmacy, NewWellnessProgram};
use pharmacare::render;
use pharmacare::repository::{
    PharmacyRepo, PrescriptionRepo, ProfileRepo, UploadLog, WellnessDiary, WellnessRepo,
};
use pharmacare::store::Store;
use pharmacare::Period;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Directory holding the persistent store (overrides configuration)
    #[arg(long, global = true)]
    data_dir: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Register a new pharmacy
    AddPharmacy {
        /// Display name
        #[arg(long)]
        name: String,

        /// Street address
        #[arg(long)]
        address: String,

        /// Contact phone number
        #[arg(long)]
        phone: String,

        /// Contact email address
        #[arg(long)]
        email: String,

        /// License number
        #[arg(long)]
        license: String,
    },
    /// List registered pharmacies
    Pharmacies,
    /// Delete a pharmacy by id
    DeletePharmacy {
        /// Pharmacy id
        id: String,
    },
    /// Add a wellness program
    AddProgram {
        /// Program name
        #[arg(long)]
        name: String,

        /// Free-form description
        #[arg(long, default_value = "")]
        description: String,

        /// First day of the program (YYYY-MM-DD)
        #[arg(long)]
        start_date: String,

        /// Last day of the program (YYYY-MM-DD)
        #[arg(long)]
        end_date: String,

        /// Price in dollars
        #[arg(long)]
        price: f64,
    },
    /// List wellness programs
    Programs,
    /// Delete a wellness program by id
    DeleteProgram {
        /// Program id
        id: String,
    },
    /// Import a CSV or JSON file into a collection
    Import {
        /// File to import
        file: PathBuf,

        /// Target collection (pharmacies or wellness)
        #[arg(short = 't', long = "type")]
        upload_type: String,
    },
    /// Show the import audit log
    History,
    /// Show analytics for a time period
    Analytics {
        /// Time period (today, week, month, year, all)
        #[arg(short, long, default_value = "all")]
        period: String,
    },
    /// Show the dashboard summary
    Dashboard,
    /// List tracked prescriptions
    Prescriptions,
    /// Track a new prescription
    AddPrescription {
        /// Medication name
        #[arg(long)]
        name: String,

        /// Dosage, e.g. "20 mg"
        #[arg(long)]
        dosage: String,

        /// Next refill date (YYYY-MM-DD)
        #[arg(long)]
        refill_date: String,

        /// Name of an attached scan
        #[arg(long)]
        file_name: Option<String>,
    },
    /// Request a refill (next date moves 30 days out)
    Refill {
        /// Prescription id
        id: String,
    },
    /// Snooze a refill by one day
    Snooze {
        /// Prescription id
        id: String,
    },
    /// Chat with the simulated support agent
    Chat {
        #[command(subcommand)]
        action: ChatAction,
    },
    /// Show or update the user profile
    Profile {
        #[command(subcommand)]
        action: ProfileAction,
    },
    /// Wellness diary for today
    Wellness {
        #[command(subcommand)]
        action: WellnessAction,
    },
    /// Render every view to HTML fragment files
    Render {
        /// Output directory
        #[arg(short, long)]
        output_dir: Option<String>,
    },
    /// Export every stored collection as one JSON document
    Export {
        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum ChatAction {
    /// List conversations, most recently active first
    List,
    /// Send a message and wait for the simulated reply
    Send {
        /// Message text
        text: String,

        /// Conversation name (created when missing)
        #[arg(short, long)]
        conversation: Option<String>,

        /// Cancel the simulated reply instead of waiting for it
        #[arg(long)]
        no_reply: bool,
    },
}

#[derive(Subcommand)]
enum ProfileAction {
    /// Show the profile and activity stats (stamps last login)
    Show,
    /// Update the profile
    Set {
        /// Full display name
        #[arg(long)]
        name: String,

        /// Email address
        #[arg(long)]
        email: String,

        /// Phone number
        #[arg(long)]
        phone: String,

        /// Postal address or preferred city
        #[arg(long, default_value = "")]
        address: String,
    },
}

#[derive(Subcommand)]
enum WellnessAction {
    /// Show today's record
    Show,
    /// Record today's mood
    Mood {
        /// Mood label
        mood: String,
    },
    /// Add or remove glasses of water
    Water {
        /// Change, e.g. 1 or -1
        delta: i32,
    },
    /// Log a food item
    Food {
        /// What was eaten
        text: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::load()?;
    let _log_guard = init_logging(&config.logging)?;

    if let Err(err) = MetricsCollector::init() {
        warn!(%err, "metrics recorder already installed");
    }

    info!("Starting pharmacare");

    let cli = Cli::parse();
    let data_dir = cli
        .data_dir
        .clone()
        .unwrap_or_else(|| config.storage.data_dir.clone());
    let store = Store::open(Path::new(&data_dir))?;

    match cli.command {
        Commands::AddPharmacy {
            name,
            address,
            phone,
            email,
            license,
        } => {
            let pharmacy = PharmacyRepo::new(store).create(NewPharmacy {
                name,
                address,
                phone,
                email,
                license,
            })?;
            info!(id = %pharmacy.id, "Pharmacy added successfully");
            println!("{}", pharmacy.id);
        }
        Commands::Pharmacies => {
            let pharmacies = PharmacyRepo::new(store).list();
            info!("Found {} pharmacies", pharmacies.len());
            println!("{}", render::pharmacy_table(&pharmacies));
        }
        Commands::DeletePharmacy { id } => {
            let removed = PharmacyRepo::new(store).delete(&id)?;
            if removed {
                info!(id = %id, "Pharmacy deleted");
            } else {
                warn!(id = %id, "No pharmacy with that id; nothing deleted");
            }
        }
        Commands::AddProgram {
            name,
            description,
            start_date,
            end_date,
            price,
        } => {
            let program = WellnessRepo::new(store).create(NewWellnessProgram {
                name,
                description,
                start_date: parse_date(&start_date)?,
                end_date: parse_date(&end_date)?,
                price,
            })?;
            info!(id = %program.id, "Wellness program added successfully");
            println!("{}", program.id);
        }
        Commands::Programs => {
            let programs = WellnessRepo::new(store).list();
            info!("Found {} wellness programs", programs.len());
            println!("{}", render::wellness_cards(&programs));
        }
        Commands::DeleteProgram { id } => {
            let removed = WellnessRepo::new(store).delete(&id)?;
            if removed {
                info!(id = %id, "Wellness program deleted");
            } else {
                warn!(id = %id, "No wellness program with that id; nothing deleted");
            }
        }
        Commands::Import { file, upload_type } => {
            import_file(&config, &store, &file, &upload_type)?;
        }
        Commands::History => {
            let history = UploadLog::new(store).history();
            info!("Found {} upload records", history.len());
            println!("{}", render::upload_history_table(&history));
        }
        Commands::Analytics { period } => {
            show_analytics(&store, &period);
        }
        Commands::Dashboard => {
            show_dashboard(&store);
        }
        Commands::Prescriptions => {
            let now = Local::now();
            let prescriptions = PrescriptionRepo::open(store, now)?.list();
            println!("{}", render::prescription_cards(&prescriptions, &now));
        }
        Commands::AddPrescription {
            name,
            dosage,
            refill_date,
            file_name,
        } => {
            let now = Local::now();
            let refill = parse_date(&refill_date)?
                .and_hms_opt(0, 0, 0)
                .and_then(|naive| naive.and_local_timezone(Local).earliest())
                .context("Invalid refill date")?;
            let prescription =
                PrescriptionRepo::open(store, now)?.add(&name, &dosage, refill, file_name)?;
            info!(id = %prescription.id, "Prescription added");
            println!("{}", prescription.id);
        }
        Commands::Refill { id } => {
            let now = Local::now();
            match PrescriptionRepo::open(store, now)?.request_refill(&id, now)? {
                Some(prescription) => info!(
                    id = %id,
                    next_refill = %prescription.refill_date,
                    "Refill requested"
                ),
                None => warn!(id = %id, "No prescription with that id"),
            }
        }
        Commands::Snooze { id } => {
            let now = Local::now();
            match PrescriptionRepo::open(store, now)?.snooze(&id)? {
                Some(prescription) => info!(
                    id = %id,
                    next_refill = %prescription.refill_date,
                    "Refill snoozed one day"
                ),
                None => warn!(id = %id, "No prescription with that id"),
            }
        }
        Commands::Chat { action } => {
            run_chat(&config, store, action).await?;
        }
        Commands::Profile { action } => {
            run_profile(&store, action)?;
        }
        Commands::Wellness { action } => {
            run_wellness(&store, action)?;
        }
        Commands::Render { output_dir } => {
            let directory = output_dir.unwrap_or_else(|| config.render.output_dir.clone());
            render_all(&config, &store, Path::new(&directory))?;
        }
        Commands::Export { output } => {
            let dump: serde_json::Map<String, serde_json::Value> =
                store.dump().into_iter().collect();
            let body = serde_json::to_string_pretty(&dump)?;
            match output {
                Some(path) => {
                    std::fs::write(&path, body)?;
                    info!(path = %path.display(), "Store exported");
                }
                None => println!("{body}"),
            }
        }
    }

    Ok(())
}

/// Import a file into the declared collection, enforcing the configured
/// size limit before parsing.
fn import_file(config: &AppConfig, store: &Store, file: &Path, upload_type: &str) -> Result<()> {
    let size_mb = std::fs::metadata(file).map(|meta| meta.len() / (1024 * 1024))?;
    if size_mb > config.import.max_file_size_mb {
        anyhow::bail!(
            "File too large ({size_mb} MB, limit {} MB)",
            config.import.max_file_size_mb
        );
    }

    let timer = OperationTimer::new("import");
    let report = Importer::new(store.clone()).import(file, upload_type)?;
    timer.finish();

    info!(
        file = %report.file_name,
        applied = report.records_applied,
        "Successfully uploaded {} {} records",
        report.records_applied,
        report.target.as_str(),
    );
    Ok(())
}

fn show_analytics(store: &Store, period: &str) {
    let period: Period = period.parse().unwrap_or_default();
    let now = Local::now();
    let pharmacies = PharmacyRepo::new(store.clone()).list();
    let programs = WellnessRepo::new(store.clone()).list();
    let uploads = UploadLog::new(store.clone()).list();
    let report = analytics::report(&pharmacies, &programs, &uploads, period, &now);
    println!("{}", render::analytics_report(&report));
}

fn show_dashboard(store: &Store) {
    let now = Local::now();
    let pharmacies = PharmacyRepo::new(store.clone()).list();
    let wellness = WellnessRepo::new(store.clone());
    let programs = wellness.list();
    let upload_log = UploadLog::new(store.clone());

    let stats = render::dashboard_stats(
        pharmacies.len(),
        wellness.active(&now).len(),
        upload_log.list().len(),
        programs.len(),
    );
    let recent = render::recent_activity_table(&upload_log.recent(5));
    let mut ending_soon = wellness.expiring_within(30, &now);
    ending_soon.truncate(5);
    let ending = render::ending_soon_table(&ending_soon, &now);

    println!("{stats}\n{recent}\n{ending}");
}

async fn run_chat(config: &AppConfig, store: Store, action: ChatAction) -> Result<()> {
    let service = ChatService::new(store, config.chat.clone());
    match action {
        ChatAction::List => {
            let now = Local::now();
            let conversations = service.conversations();
            println!("{}", render::conversation_list(&conversations, None, &now));
        }
        ChatAction::Send {
            text,
            conversation,
            no_reply,
        } => {
            let name = conversation.unwrap_or_else(|| config.chat.default_conversation.clone());
            let target = service
                .conversations()
                .into_iter()
                .find(|c| c.name == name);
            let target = match target {
                Some(existing) => existing,
                None => service.create_conversation(&name)?,
            };

            if service.send(&target.id, &text)?.is_none() {
                warn!("Nothing to send");
                return Ok(());
            }

            let reply = service.schedule_reply(&target.id, &text);
            if no_reply {
                reply.cancel();
                info!("Simulated reply cancelled");
            } else {
                reply.wait().await;
            }

            let selected = service.select(&target.id)?;
            if let Some(conversation) = selected {
                let now = Local::now();
                println!("{}", render::message_log(&conversation.messages, &now));
            }
        }
    }
    Ok(())
}

fn run_profile(store: &Store, action: ProfileAction) -> Result<()> {
    let repo = ProfileRepo::new(store.clone());
    match action {
        ProfileAction::Show => {
            // Loading the profile page stamps the last-login time.
            let profile = repo.touch_last_login(Local::now())?;
            let pharmacies = PharmacyRepo::new(store.clone()).list().len();
            let programs = WellnessRepo::new(store.clone()).list().len();
            println!("{}", render::profile_summary(&profile, pharmacies, programs));
        }
        ProfileAction::Set {
            name,
            email,
            phone,
            address,
        } => {
            let mut profile = repo.load();
            profile.full_name = name;
            profile.email = email;
            profile.phone = phone;
            profile.address = address;
            repo.save(profile)?;
            info!("Profile updated successfully");
        }
    }
    Ok(())
}

fn run_wellness(store: &Store, action: WellnessAction) -> Result<()> {
    let diary = WellnessDiary::new(store.clone());
    let now = Local::now();
    let record = match action {
        WellnessAction::Show => diary.today(&now)?,
        WellnessAction::Mood { mood } => diary.set_mood(&now, &mood)?,
        WellnessAction::Water { delta } => diary.adjust_water(&now, delta)?,
        WellnessAction::Food { text } => diary.add_food(&now, &text)?,
    };
    println!("{}", render::wellness_diary(&record));
    Ok(())
}

/// Write every rendered view into the output directory.
fn render_all(config: &AppConfig, store: &Store, output_dir: &Path) -> Result<()> {
    std::fs::create_dir_all(output_dir)?;
    let now = Local::now();
    let metrics = MetricsCollector::default();

    let pharmacies = PharmacyRepo::new(store.clone()).list();
    let wellness = WellnessRepo::new(store.clone());
    let programs = wellness.list();
    let upload_log = UploadLog::new(store.clone());
    let prescriptions = PrescriptionRepo::open(store.clone(), now)?.list();
    let profile = ProfileRepo::new(store.clone()).load();
    let diary = WellnessDiary::new(store.clone()).today(&now)?;
    let conversations = ChatService::new(store.clone(), config.chat.clone()).conversations();

    let dashboard = {
        let stats = render::dashboard_stats(
            pharmacies.len(),
            wellness.active(&now).len(),
            upload_log.list().len(),
            programs.len(),
        );
        let recent = render::recent_activity_table(&upload_log.recent(5));
        let mut ending_soon = wellness.expiring_within(30, &now);
        ending_soon.truncate(5);
        let ending = render::ending_soon_table(&ending_soon, &now);
        format!("{stats}\n{recent}\n{ending}")
    };
    let analytics_view = render::analytics_report(&analytics::report(
        &pharmacies,
        &programs,
        &upload_log.list(),
        Period::All,
        &now,
    ));

    let views: Vec<(&'static str, String)> = vec![
        ("pharmacies", render::pharmacy_table(&pharmacies)),
        ("wellness", render::wellness_cards(&programs)),
        (
            "uploads",
            render::upload_history_table(&upload_log.history()),
        ),
        (
            "prescriptions",
            render::prescription_cards(&prescriptions, &now),
        ),
        (
            "profile",
            render::profile_summary(&profile, pharmacies.len(), programs.len()),
        ),
        ("wellness-diary", render::wellness_diary(&diary)),
        (
            "conversations",
            render::conversation_list(&conversations, None, &now),
        ),
        ("dashboard", dashboard),
        ("analytics", analytics_view),
    ];

    for (view, fragment) in views {
        let path = output_dir.join(format!("{view}.html"));
        std::fs::write(&path, fragment)?;
        metrics.record_render(view);
        info!(view, path = %path.display(), "View rendered");
    }

    Ok(())
}

/// Parse a YYYY-MM-DD date argument
fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").context("Invalid date format, use YYYY-MM-DD")
}
