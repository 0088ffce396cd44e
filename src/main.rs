#[macro_use]
extern crate lazy_static;

mod api;
mod chapter;
mod config;
mod manga;
mod requester;
mod session;
mod types;
mod upload;
mod utils;

use api::{ API, APIError, MangaForm };
use chapter::{ Chapter, PublishOption };
use config::{ ClientConfig, ConfigError };
use manga::Manga;
use session::{ SessionError, SessionStore };
use types::{ ChapterFileData, ChapterPayload, ExchangeRateData, RequestData, SuggestionData };
use upload::{ batch_page_count, upload_batch, LocalFile, MediaHost, UploadError };

use std::cell::RefCell;
use std::path::PathBuf;
use std::time::Duration;

use chrono::Utc;
use clap::{ Parser, Subcommand };
use log::{ error, info };
use pbr::ProgressBar;
use simplelog::{ self, TermLogger, LevelFilter, TerminalMode, ColorChoice };
use thiserror::Error;

const RATES_REFRESH_INTERVAL:Duration = Duration::from_secs(30);

#[derive(Debug, Parser)]
#[clap(author, version, about)]
pub struct Arguments {
    #[clap(short, long)]
    quiet: bool,
    #[clap(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    Login {
        #[clap(short, long)]
        username: String,
        #[clap(short, long)]
        password: String,
    },
    Logout,
    #[clap(subcommand)]
    Manga(MangaCommand),
    #[clap(subcommand)]
    Chapter(ChapterCommand),
    #[clap(subcommand)]
    Suggestions(InteractionCommand),
    #[clap(subcommand)]
    Requests(InteractionCommand),
    #[clap(subcommand)]
    Rates(RatesCommand),
    #[clap(subcommand)]
    Settings(SettingsCommand),
}

#[derive(Debug, Subcommand)]
enum MangaCommand {
    List {
        #[clap(short, long)]
        genre: Option<String>,
    },
    Genres,
    Show {
        id: String,
    },
    Create {
        #[clap(short, long)]
        title: String,
        #[clap(short, long, default_value = "")]
        description: String,
        #[clap(short, long)]
        genres: Option<String>,
        #[clap(short, long)]
        cover: Option<PathBuf>,
    },
    Edit {
        id: String,
        #[clap(short, long)]
        title: String,
        #[clap(short, long, default_value = "")]
        description: String,
        #[clap(short, long)]
        genres: Option<String>,
        #[clap(short, long)]
        cover: Option<PathBuf>,
    },
    Delete {
        id: String,
        #[clap(long)]
        yes: bool,
    },
}

#[derive(Debug, Subcommand)]
enum ChapterCommand {
    Add {
        manga_id: String,
        #[clap(short, long)]
        title: String,
        #[clap(short, long)]
        number: Option<f64>,
        #[clap(short, long)]
        file: Vec<PathBuf>,
        #[clap(short, long, default_value = "draft")]
        publish: String,
    },
    Edit {
        chapter_id: String,
        #[clap(short, long)]
        title: String,
        #[clap(short, long)]
        number: Option<f64>,
        #[clap(short, long)]
        file: Vec<PathBuf>,
        #[clap(short, long)]
        publish: String,
    },
    Delete {
        chapter_id: String,
        #[clap(long)]
        yes: bool,
    },
}

#[derive(Debug, Subcommand)]
enum InteractionCommand {
    List,
    Delete {
        id: String,
        #[clap(long)]
        yes: bool,
    },
}

#[derive(Debug, Subcommand)]
enum RatesCommand {
    List {
        #[clap(long)]
        watch: bool,
    },
    Refresh,
}

#[derive(Debug, Subcommand)]
enum SettingsCommand {
    Show,
    Set {
        #[clap(long)]
        manga_app_version: Option<String>,
        #[clap(long)]
        exchange_rates_app_version: Option<String>,
        #[clap(long)]
        letscode_cpp_version: Option<String>,
        #[clap(long)]
        letscode_python_basics_version: Option<String>,
        #[clap(long)]
        letscode_python_basics_2_version: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    let args = Arguments::parse();

    let log_level = match args.quiet {
        true => LevelFilter::Warn,
        false => LevelFilter::Info,
    };

    TermLogger::init(log_level, simplelog::Config::default(), TerminalMode::Mixed, ColorChoice::Auto).unwrap();

    if let Err(e) = run(args).await {
        error!("{}", e);
        std::process::exit(1);
    }
}

#[derive(Debug, Error)]
enum ProgramError {
    #[error("{0}")]
    API(#[from] APIError),
    #[error("{0}")]
    Config(#[from] ConfigError),
    #[error("{0}")]
    Session(#[from] SessionError),
    #[error("{0}")]
    Upload(#[from] UploadError),
    #[error("no active session; run `manga-admin login` first")]
    AuthRequired,
    #[error("unknown publish option: {0} (expected now, schedule or draft)")]
    InvalidPublishOption(String),
}

fn authed_api(config:&ClientConfig, store:&SessionStore) -> Result<API, ProgramError> {
    let session = store.load()?.ok_or(ProgramError::AuthRequired)?;
    Ok(API::new(&config.api_base_url, Some(&session))?)
}

async fn run(args:Arguments) -> Result<(), ProgramError> {
    let config = ClientConfig::load()?;
    let store = SessionStore::new(&config.session_file);
    let quiet = args.quiet;

    match args.command {
        Command::Login { username, password } => {
            let api = API::new(&config.api_base_url, None)?;
            let session = api.login(&username, &password).await?;
            store.save(&session)?;
            info!("Logged in as {}", session.username);
        },
        Command::Logout => {
            store.clear()?;
            info!("Session cleared");
        },
        Command::Manga(command) => run_manga(&authed_api(&config, &store)?, command).await?,
        Command::Chapter(command) => run_chapter(&authed_api(&config, &store)?, command, quiet).await?,
        Command::Suggestions(command) => run_suggestions(&authed_api(&config, &store)?, command).await?,
        Command::Requests(command) => run_requests(&authed_api(&config, &store)?, command).await?,
        Command::Rates(command) => run_rates(&authed_api(&config, &store)?, command).await?,
        Command::Settings(command) => run_settings(&authed_api(&config, &store)?, command).await?,
    }

    Ok(())
}

fn parse_genres(genres:Option<String>) -> Vec<String> {
    genres.map(|g| g.split(',')
            .map(|part| part.trim().to_string())
            .filter(|part| !part.is_empty())
            .collect::<Vec<String>>())
        .unwrap_or_default()
}

fn manga_form(title:String, description:String, genres:Option<String>, cover:Option<PathBuf>) -> Result<MangaForm, UploadError> {
    let cover = cover.map(|path| LocalFile::new(&path)).transpose()?;

    Ok(MangaForm {
        title,
        description,
        genres: parse_genres(genres),
        cover,
    })
}

async fn run_manga(api:&API, command:MangaCommand) -> Result<(), ProgramError> {
    match command {
        MangaCommand::List { genre } => {
            let mangas = Manga::from_response(api.get_mangas(genre.as_deref()).await?);
            Manga::print_list(&mangas);
        },
        MangaCommand::Genres => {
            for genre in api.get_genres().await? {
                println!("{}", genre);
            }
        },
        MangaCommand::Show { id } => {
            let (raw_manga, raw_chapters) = tokio::try_join!(api.get_manga(&id), api.get_chapters(&id))?;
            Manga::from_data(raw_manga).print();
            println!("");
            Chapter::print_list(&Chapter::from_response(raw_chapters), Utc::now());
        },
        MangaCommand::Create { title, description, genres, cover } => {
            api.create_manga(manga_form(title, description, genres, cover)?).await?;
            info!("Manga created");
            Manga::print_list(&Manga::from_response(api.get_mangas(None).await?));
        },
        MangaCommand::Edit { id, title, description, genres, cover } => {
            api.update_manga(&id, manga_form(title, description, genres, cover)?).await?;
            info!("Manga updated");
        },
        MangaCommand::Delete { id, yes } => {
            if !yes && !utils::confirm("Are you sure? This will delete all chapters and files!") {
                info!("Aborted");
                return Ok(());
            }

            api.delete_manga(&id).await?;
            info!("Manga deleted");
            Manga::print_list(&Manga::from_response(api.get_mangas(None).await?));
        },
    }

    Ok(())
}

// Uploads go straight to the media host with a one-time signed credential;
// only the resulting descriptors are submitted to the backend. An empty
// batch (chapter edit without new files) leaves existing content untouched.
async fn upload_files(api:&API, paths:&[PathBuf], quiet:bool) -> Result<(Option<Vec<ChapterFileData>>, u32), ProgramError> {
    if paths.is_empty() {
        return Ok((None, 0));
    }

    let files = paths.iter()
        .map(|path| LocalFile::new(path))
        .collect::<Result<Vec<LocalFile>, UploadError>>()?;

    info!("Requesting upload signature...");
    let signature = api.get_upload_signature().await?;

    info!("Uploading {} file(s)...", files.len());
    let transport = MediaHost::new();
    let pb = RefCell::new(match quiet {
        false => Some(ProgressBar::new(100)),
        true => None,
    });
    let progress = |percent:u8| {
        if let Some(pb) = pb.borrow_mut().as_mut() {
            pb.set(percent as u64);
        }
    };

    let descriptors = upload_batch(&transport, &signature, &files, &progress).await?;
    if let Some(pb) = pb.borrow_mut().as_mut() {
        pb.finish_print("Upload complete.");
        println!("");
    }

    let pages = batch_page_count(&descriptors);
    Ok((Some(descriptors), pages))
}

fn chapter_payload(title:String, number:Option<f64>, publish:&str, files:Option<Vec<ChapterFileData>>, page_count:u32) -> Result<ChapterPayload, ProgramError> {
    let option = PublishOption::from_str(publish)
        .ok_or(ProgramError::InvalidPublishOption(publish.to_string()))?;
    let (is_published, schedule_for_later) = option.flags();

    Ok(ChapterPayload {
        title,
        chapter_number: number,
        page_count,
        files,
        is_published: is_published.to_string(),
        schedule_for_later: schedule_for_later.to_string(),
    })
}

async fn run_chapter(api:&API, command:ChapterCommand, quiet:bool) -> Result<(), ProgramError> {
    match command {
        ChapterCommand::Add { manga_id, title, number, file, publish } => {
            let (files, page_count) = upload_files(api, &file, quiet).await?;
            let payload = chapter_payload(title, number, &publish, files, page_count)?;

            api.create_chapter(&manga_id, &payload).await?;
            info!("Chapter created");
            Chapter::print_list(&Chapter::from_response(api.get_chapters(&manga_id).await?), Utc::now());
        },
        ChapterCommand::Edit { chapter_id, title, number, file, publish } => {
            let (files, page_count) = upload_files(api, &file, quiet).await?;
            let payload = chapter_payload(title, number, &publish, files, page_count)?;

            api.update_chapter(&chapter_id, &payload).await?;
            info!("Chapter updated");
        },
        ChapterCommand::Delete { chapter_id, yes } => {
            if !yes && !utils::confirm("Delete this chapter?") {
                info!("Aborted");
                return Ok(());
            }

            api.delete_chapter(&chapter_id).await?;
            info!("Chapter deleted");
        },
    }

    Ok(())
}

fn print_suggestions(suggestions:&[SuggestionData]) {
    for suggestion in suggestions {
        println!("{} ({})", suggestion.title, suggestion.id);
        if let Some(genre) = &suggestion.genre {
            println!("  Genre: {}", genre);
        }
        if let Some(email) = &suggestion.email {
            println!("  Email: {}", email);
        }
        if let Some(description) = &suggestion.description {
            println!("  {}", description);
        }
        if let Some(images) = &suggestion.images {
            for image in images {
                println!("  Image: {}", image.path);
            }
        }
    }

    if suggestions.is_empty() {
        println!("No suggestions found");
    }
}

async fn run_suggestions(api:&API, command:InteractionCommand) -> Result<(), ProgramError> {
    match command {
        InteractionCommand::List => print_suggestions(&api.get_suggestions().await?),
        InteractionCommand::Delete { id, yes } => {
            if !yes && !utils::confirm("Delete this suggestion?") {
                info!("Aborted");
                return Ok(());
            }

            api.delete_suggestion(&id).await?;
            info!("Deleted");
            print_suggestions(&api.get_suggestions().await?);
        },
    }

    Ok(())
}

fn print_requests(requests:&[RequestData]) {
    println!("{:<26} {:<30} {:<12} {}", "ID", "Title", "Status", "Description");
    for request in requests {
        println!("{:<26} {:<30} {:<12} {}",
            request.id,
            request.title,
            request.status.as_deref().unwrap_or("-"),
            request.description.as_deref().unwrap_or(""));
    }

    if requests.is_empty() {
        println!("No requests found");
    }
}

async fn run_requests(api:&API, command:InteractionCommand) -> Result<(), ProgramError> {
    match command {
        InteractionCommand::List => print_requests(&api.get_requests().await?),
        InteractionCommand::Delete { id, yes } => {
            if !yes && !utils::confirm("Delete this request?") {
                info!("Aborted");
                return Ok(());
            }

            api.delete_request(&id).await?;
            info!("Deleted");
            print_requests(&api.get_requests().await?);
        },
    }

    Ok(())
}

fn print_rates(rates:&[ExchangeRateData]) {
    println!("{:<10} {:<14} {}", "Currency", "Rate (to USD)", "Last Updated");
    for rate in rates {
        let updated = rate.last_updated
            .map(|t| utils::format_timestamp(&t))
            .unwrap_or("N/A".to_string());
        println!("{:<10} {:<14} {}", rate.currency, rate.rate, updated);
    }

    if rates.is_empty() {
        println!("No exchange rates found");
    }
}

async fn run_rates(api:&API, command:RatesCommand) -> Result<(), ProgramError> {
    match command {
        RatesCommand::List { watch } => {
            print_rates(&api.get_exchange_rates().await?);

            // Fixed-interval refetch; there are no push updates. A failed
            // poll is reported and the next interval retries from scratch.
            if watch {
                loop {
                    tokio::time::sleep(RATES_REFRESH_INTERVAL).await;
                    match api.get_exchange_rates().await {
                        Ok(rates) => print_rates(&rates),
                        Err(e) => error!("{}", e),
                    }
                }
            }
        },
        RatesCommand::Refresh => {
            api.refresh_exchange_rates().await?;
            info!("Exchange rates updated");
            print_rates(&api.get_exchange_rates().await?);
        },
    }

    Ok(())
}

async fn run_settings(api:&API, command:SettingsCommand) -> Result<(), ProgramError> {
    match command {
        SettingsCommand::Show => {
            let config = api.get_app_config().await?;
            println!("Manga App Version: {}", config.manga_app_version);
            println!("Exchange Rates App Version: {}", config.exchange_rates_app_version);
            println!("Letscode C++ Version: {}", config.letscode_cpp_version);
            println!("Letscode Python Basics Version: {}", config.letscode_python_basics_version);
            println!("Letscode Python Basics 2 Version: {}", config.letscode_python_basics_2_version);
        },
        SettingsCommand::Set {
            manga_app_version,
            exchange_rates_app_version,
            letscode_cpp_version,
            letscode_python_basics_version,
            letscode_python_basics_2_version,
        } => {
            // Fetch-then-put the whole record, overlaying only what was given.
            let mut config = api.get_app_config().await?;
            if let Some(v) = manga_app_version {
                config.manga_app_version = v;
            }
            if let Some(v) = exchange_rates_app_version {
                config.exchange_rates_app_version = v;
            }
            if let Some(v) = letscode_cpp_version {
                config.letscode_cpp_version = v;
            }
            if let Some(v) = letscode_python_basics_version {
                config.letscode_python_basics_version = v;
            }
            if let Some(v) = letscode_python_basics_2_version {
                config.letscode_python_basics_2_version = v;
            }

            api.update_app_config(&config).await?;
            info!("Settings updated");
        },
    }

    Ok(())
}
