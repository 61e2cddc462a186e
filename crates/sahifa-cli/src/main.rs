//! Sahifa CLI
//!
//! Command-line reader for the bilingual book, plus the admin tools for
//! managing chapters and moderating testimonials.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use sahifa_core::{Config, ContentStore, Hydration, Language, TestimonialPatch};

mod commands;
mod editor;
mod images;
mod logging;
mod output;

use commands::admin::ChapterFields;
use commands::testimonial::Filter;
use output::{Output, OutputFormat};

#[derive(Parser)]
#[command(name = "sahifa")]
#[command(about = "Sahifa - read the book in English or Urdu")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Quiet mode - minimal output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Log debug output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Use this config file instead of the default
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show what there is to read and featured testimonials
    Home,
    /// Read a chapter
    Read {
        /// english or urdu
        language: Language,
        /// Chapter ID (full or prefix); defaults to the first chapter
        chapter: Option<String>,
        #[command(flatten)]
        display: DisplayArgs,
    },
    /// Browse chapters
    Chapter {
        #[command(subcommand)]
        command: ChapterCommands,
    },
    /// Manage bookmarks
    Bookmark {
        #[command(subcommand)]
        command: BookmarkCommands,
    },
    /// Manage notes
    Note {
        #[command(subcommand)]
        command: NoteCommands,
    },
    /// Read or submit testimonials
    Testimonial {
        #[command(subcommand)]
        command: TestimonialCommands,
    },
    /// Manage content and moderate testimonials
    Admin {
        #[command(subcommand)]
        command: AdminCommands,
    },
    /// Show reader settings
    Settings {
        #[command(flatten)]
        display: DisplayArgs,
    },
    /// Show status (backend, cache, counts)
    Status {
        /// Delete the local cache instead
        #[arg(long)]
        clear_cache: bool,
    },
    /// Show or set configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(clap::Args, Clone)]
struct DisplayArgs {
    /// Font size in px (12-24)
    #[arg(long)]
    font_size: Option<u8>,
    /// Brightness in percent (20-100)
    #[arg(long)]
    brightness: Option<u8>,
    /// Dark mode
    #[arg(long)]
    dark: bool,
}

#[derive(Subcommand)]
enum ChapterCommands {
    /// List chapters
    #[command(alias = "ls")]
    List {
        /// Only chapters in this language
        #[arg(short, long)]
        language: Option<Language>,
    },
    /// Show a chapter
    Show {
        /// Chapter ID (full or prefix)
        id: String,
    },
    /// Search chapter titles and text
    Search {
        /// Search query
        query: String,
    },
}

#[derive(Subcommand)]
enum BookmarkCommands {
    /// List bookmarks
    #[command(alias = "ls")]
    List,
    /// Bookmark a chapter, or remove its bookmark
    Toggle {
        /// Chapter ID (full or prefix)
        chapter: String,
    },
    /// Set a bookmark's note (omit text to clear it)
    Note {
        /// Bookmark ID (full or prefix)
        id: String,
        text: Option<String>,
    },
    /// Delete a bookmark
    #[command(alias = "rm")]
    Delete {
        /// Bookmark ID (full or prefix)
        id: String,
    },
}

#[derive(Subcommand)]
enum NoteCommands {
    /// List notes
    #[command(alias = "ls")]
    List {
        /// Only notes on this chapter
        #[arg(short, long)]
        chapter: Option<String>,
    },
    /// Add a note to a chapter
    #[command(alias = "create")]
    Add {
        /// Chapter ID (full or prefix)
        chapter: String,
        /// Note text (opens editor if not provided)
        #[arg(short, long)]
        text: Option<String>,
    },
    /// Edit a note
    Edit {
        /// Note ID (full or prefix)
        id: String,
        /// New text (opens editor if not provided)
        #[arg(short, long)]
        text: Option<String>,
    },
    /// Delete a note
    #[command(alias = "rm")]
    Delete {
        /// Note ID (full or prefix)
        id: String,
    },
}

#[derive(Subcommand)]
enum TestimonialCommands {
    /// List approved testimonials
    #[command(alias = "ls")]
    List {
        /// Only testimonials awaiting approval
        #[arg(long, conflicts_with = "all")]
        pending: bool,
        /// Approved and pending
        #[arg(long)]
        all: bool,
    },
    /// Submit a testimonial
    Submit {
        /// Your name
        #[arg(short, long)]
        name: String,
        /// Rating from 1 to 5
        #[arg(short, long)]
        rating: u8,
        /// Testimonial text (opens editor if not provided)
        #[arg(short, long)]
        text: Option<String>,
    },
}

#[derive(Subcommand)]
enum AdminCommands {
    /// Show content and moderation counts
    Dashboard,
    /// Manage chapters
    Chapter {
        #[command(subcommand)]
        command: AdminChapterCommands,
    },
    /// Moderate testimonials
    Testimonial {
        #[command(subcommand)]
        command: AdminTestimonialCommands,
    },
}

#[derive(clap::Args)]
struct ChapterArgs {
    #[arg(short = 'T', long)]
    title: Option<String>,
    #[arg(short, long)]
    language: Option<Language>,
    /// Position within the language
    #[arg(short, long)]
    order: Option<i32>,
    /// Chapter text
    #[arg(short, long, conflicts_with = "content_file")]
    content: Option<String>,
    /// Read chapter text from a file
    #[arg(long, value_name = "PATH")]
    content_file: Option<PathBuf>,
    /// Scanned page image URL (repeatable)
    #[arg(short, long = "image")]
    images: Vec<String>,
    /// Scanned page image file, embedded in the chapter (repeatable)
    #[arg(long = "image-file", value_name = "PATH")]
    image_files: Vec<PathBuf>,
    /// Remove an existing image by page number (repeatable)
    #[arg(long = "remove-image", value_name = "N")]
    remove_images: Vec<usize>,
    /// Remove existing images before adding new ones
    #[arg(long, conflicts_with = "remove_images")]
    clear_images: bool,
}

impl From<ChapterArgs> for ChapterFields {
    fn from(args: ChapterArgs) -> Self {
        Self {
            title: args.title,
            language: args.language,
            order: args.order,
            content: args.content,
            content_file: args.content_file,
            images: args.images,
            image_files: args.image_files,
            remove_images: args.remove_images,
            clear_images: args.clear_images,
        }
    }
}

#[derive(Subcommand)]
enum AdminChapterCommands {
    /// Add a chapter
    #[command(alias = "create")]
    Add {
        #[command(flatten)]
        args: ChapterArgs,
    },
    /// Edit a chapter (prompts when no fields are given)
    Edit {
        /// Chapter ID (full or prefix)
        id: String,
        #[command(flatten)]
        args: ChapterArgs,
    },
    /// Delete a chapter
    #[command(alias = "rm")]
    Delete {
        /// Chapter ID (full or prefix)
        id: String,
    },
}

#[derive(Subcommand)]
enum AdminTestimonialCommands {
    /// Approve a pending testimonial
    Approve {
        /// Testimonial ID (full or prefix)
        id: String,
    },
    /// Edit a testimonial
    Edit {
        /// Testimonial ID (full or prefix)
        id: String,
        #[arg(short, long)]
        name: Option<String>,
        #[arg(short, long)]
        text: Option<String>,
        #[arg(short, long)]
        rating: Option<u8>,
    },
    /// Delete a testimonial
    #[command(alias = "rm")]
    Delete {
        /// Testimonial ID (full or prefix)
        id: String,
    },
}

#[derive(Subcommand, Clone)]
enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Set a configuration value
    Set {
        /// Configuration key (data_dir, remote_url, api_key, cache_enabled,
        /// request_timeout_secs, log_file)
        key: String,
        /// Configuration value ("none" clears optional keys)
        value: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let output = Output::new(OutputFormat::from_flags(cli.json, cli.quiet));
    let config_path = cli.config.as_deref();

    // Commands that don't need the store
    match &cli.command {
        Commands::Config { command } => {
            return match command.clone() {
                Some(ConfigCommands::Show) | None => commands::config::show(config_path, &output),
                Some(ConfigCommands::Set { key, value }) => {
                    commands::config::set(&key, &value, config_path, &output)
                }
            };
        }
        Commands::Settings { display } => {
            let settings = commands::settings::from_flags(
                display.font_size,
                display.brightness,
                display.dark,
            );
            return commands::settings::show(&settings, &output);
        }
        _ => {}
    }

    let config =
        Config::load_with_cli_override(config_path).context("Failed to load configuration")?;
    logging::init_logging(&config, cli.verbose);

    let mut store = ContentStore::open(&config)?;
    let hydration = match store.refresh().await {
        Ok(hydration) => Some(hydration),
        // Status still reports on an unreachable store
        Err(e) if matches!(cli.command, Commands::Status { .. }) => {
            output.warn(&format!("Could not load content: {}", e));
            None
        }
        Err(e) => return Err(e).context("Failed to load content"),
    };
    if hydration == Some(Hydration::Cache) {
        output.warn("Data store unreachable; showing cached content.");
    }

    match cli.command {
        Commands::Config { .. } | Commands::Settings { .. } => unreachable!(), // Handled above
        Commands::Read {
            language,
            chapter,
            display,
        } => {
            let settings = commands::settings::from_flags(
                display.font_size,
                display.brightness,
                display.dark,
            );
            commands::read::read(&mut store, language, chapter, &settings, &output)
        }
        Commands::Home => commands::home::show(&store, &output),
        Commands::Chapter { command } => handle_chapter_command(command, &store, &output),
        Commands::Bookmark { command } => {
            handle_bookmark_command(command, &mut store, &output).await
        }
        Commands::Note { command } => handle_note_command(command, &mut store, &output).await,
        Commands::Testimonial { command } => {
            handle_testimonial_command(command, &mut store, &output).await
        }
        Commands::Admin { command } => handle_admin_command(command, &mut store, &output).await,
        Commands::Status { clear_cache: true } => {
            commands::status::clear_cache(&store, &config, &output)
        }
        Commands::Status { clear_cache: false } => {
            commands::status::show(&store, &config, hydration, &output)
        }
    }
}

fn handle_chapter_command(
    command: ChapterCommands,
    store: &ContentStore,
    output: &Output,
) -> Result<()> {
    match command {
        ChapterCommands::List { language } => commands::chapter::list(store, language, output),
        ChapterCommands::Show { id } => commands::chapter::show(store, &id, output),
        ChapterCommands::Search { query } => commands::chapter::search(store, &query, output),
    }
}

async fn handle_bookmark_command(
    command: BookmarkCommands,
    store: &mut ContentStore,
    output: &Output,
) -> Result<()> {
    match command {
        BookmarkCommands::List => commands::bookmark::list(store, output),
        BookmarkCommands::Toggle { chapter } => {
            commands::bookmark::toggle(store, &chapter, output).await
        }
        BookmarkCommands::Note { id, text } => {
            commands::bookmark::annotate(store, &id, text, output).await
        }
        BookmarkCommands::Delete { id } => commands::bookmark::delete(store, &id, output).await,
    }
}

async fn handle_note_command(
    command: NoteCommands,
    store: &mut ContentStore,
    output: &Output,
) -> Result<()> {
    match command {
        NoteCommands::List { chapter } => commands::note::list(store, chapter.as_deref(), output),
        NoteCommands::Add { chapter, text } => {
            commands::note::create(store, &chapter, text, output).await
        }
        NoteCommands::Edit { id, text } => commands::note::edit(store, &id, text, output).await,
        NoteCommands::Delete { id } => commands::note::delete(store, &id, output).await,
    }
}

async fn handle_testimonial_command(
    command: TestimonialCommands,
    store: &mut ContentStore,
    output: &Output,
) -> Result<()> {
    match command {
        TestimonialCommands::List { pending, all } => {
            commands::testimonial::list(store, Filter::from_flags(pending, all), output)
        }
        TestimonialCommands::Submit { name, rating, text } => {
            commands::testimonial::submit(store, name, rating, text, output).await
        }
    }
}

async fn handle_admin_command(
    command: AdminCommands,
    store: &mut ContentStore,
    output: &Output,
) -> Result<()> {
    match command {
        AdminCommands::Dashboard => commands::admin::dashboard(store, output),
        AdminCommands::Chapter { command } => match command {
            AdminChapterCommands::Add { args } => {
                commands::admin::add_chapter(store, args.into(), output).await
            }
            AdminChapterCommands::Edit { id, args } => {
                commands::admin::edit_chapter(store, &id, args.into(), output).await
            }
            AdminChapterCommands::Delete { id } => {
                commands::admin::delete_chapter(store, &id, output).await
            }
        },
        AdminCommands::Testimonial { command } => match command {
            AdminTestimonialCommands::Approve { id } => {
                commands::admin::approve_testimonial(store, &id, output).await
            }
            AdminTestimonialCommands::Edit {
                id,
                name,
                text,
                rating,
            } => {
                let patch = TestimonialPatch {
                    name,
                    text,
                    rating,
                    approved: None,
                };
                commands::admin::edit_testimonial(store, &id, patch, output).await
            }
            AdminTestimonialCommands::Delete { id } => {
                commands::admin::delete_testimonial(store, &id, output).await
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_read_with_settings() {
        let cli = Cli::try_parse_from([
            "sahifa",
            "read",
            "urdu",
            "4",
            "--font-size",
            "20",
            "--dark",
        ])
        .unwrap();

        match cli.command {
            Commands::Read {
                language,
                chapter,
                display,
            } => {
                assert_eq!(language, Language::Urdu);
                assert_eq!(chapter.as_deref(), Some("4"));
                assert_eq!(display.font_size, Some(20));
                assert!(display.dark);
            }
            _ => panic!("expected read command"),
        }
    }

    #[test]
    fn test_parse_rejects_unknown_language() {
        assert!(Cli::try_parse_from(["sahifa", "read", "arabic"]).is_err());
    }

    #[test]
    fn test_pending_and_all_conflict() {
        assert!(Cli::try_parse_from(["sahifa", "testimonial", "list", "--pending", "--all"]).is_err());
    }
}
