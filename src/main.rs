//! logo-colorist - color the logo from the command line

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use logo_colorist::{
    ActiveColor, AppConfig, Color, ConfiguredGallery, CopyOutcome, CoverLayout, DirectoryDownloads,
    DownloadOutcome, ExportReport, ExportSink, GalleryStore, KeepAlive, LogoSize, RasterExporter, Region,
    RegionColorMap, Session, SessionStore, Studio, SystemClipboard, compose_preview, render_cover,
};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Config file to use instead of the default location
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the colorable regions and their default colors
    Regions,

    /// Print the logo as SVG, or the color map as JSON
    Paint {
        #[command(flatten)]
        colors: ColorArgs,

        /// Nominal width of the SVG
        #[arg(long, default_value_t = 738.0)]
        width: f32,

        /// Brighten one region, as on hover
        #[arg(long)]
        hover: Option<Region>,

        /// Print the color map instead of the SVG
        #[arg(long)]
        json: bool,

        /// Write to a file instead of stdout
        #[arg(short, long, value_name = "FILE")]
        out: Option<PathBuf>,
    },

    /// Render the logo and put it on the clipboard
    Copy {
        #[command(flatten)]
        colors: ColorArgs,
    },

    /// Render the logo and save it to the download directory
    Download {
        #[command(flatten)]
        colors: ColorArgs,

        /// Directory to save into
        #[arg(long, value_name = "DIR")]
        dir: Option<PathBuf>,
    },

    /// Open (or print) a pre-filled post about your logo
    Share {
        /// Print the link instead of opening a browser
        #[arg(long)]
        print: bool,
    },

    /// Remember your handle so exports are saved to the gallery
    Login {
        /// Your username, with or without the leading @
        handle: String,
    },

    /// Forget the stored handle
    Logout,

    /// Browse the community gallery
    Gallery {
        #[command(subcommand)]
        command: GalleryCommand,
    },

    /// Ping the gallery on a schedule until interrupted
    KeepAlive,
}

#[derive(Subcommand, Debug)]
enum GalleryCommand {
    /// Show the most recent logos
    List {
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Render recent logos as one image
    Cover {
        #[arg(short, long, value_name = "FILE")]
        out: PathBuf,

        #[arg(long)]
        limit: Option<usize>,
    },
}

/// Colors to apply before acting.
#[derive(Args, Debug)]
struct ColorArgs {
    /// Start from a color map JSON file
    #[arg(long, value_name = "FILE")]
    from: Option<PathBuf>,

    /// Set a region, e.g. `--set letterI=#FF0000`
    #[arg(long = "set", value_name = "REGION=COLOR", value_parser = parse_assignment)]
    assignments: Vec<Assignment>,

    /// Paint these regions with the active color
    #[arg(long, value_name = "REGION")]
    paint: Vec<Region>,

    /// Active color for `--paint`
    #[arg(long, default_value = ActiveColor::DEFAULT)]
    color: String,
}

#[derive(Debug, Clone)]
struct Assignment {
    region: Region,
    color: Color,
}

fn parse_assignment(s: &str) -> Result<Assignment, String> {
    let (region, color) = s
        .split_once('=')
        .ok_or_else(|| format!("expected REGION=COLOR, got {s:?}"))?;
    let region = region.trim().parse::<Region>().map_err(|e| e.to_string())?;
    Ok(Assignment {
        region,
        color: Color::new(color.trim()),
    })
}

impl ColorArgs {
    /// Applies the arguments to `studio` in order: file, assignments, paints.
    fn apply<S: GalleryStore + 'static>(&self, studio: &mut Studio<S>) -> Result<()> {
        if let Some(path) = &self.from {
            let json = fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            let colors = RegionColorMap::from_json(&json)
                .with_context(|| format!("{} is not a color map", path.display()))?;
            studio.load_colors(colors);
        }
        for assignment in &self.assignments {
            studio.active_color_mut().set(assignment.color.clone());
            studio.paint(assignment.region);
        }
        studio.active_color_mut().set(self.color.as_str());
        for region in &self.paint {
            studio.paint(*region);
        }
        Ok(())
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

fn load_config(path: Option<&Path>) -> Result<AppConfig> {
    let mut config = match path {
        Some(path) => AppConfig::load_from(path)?,
        None => return AppConfig::load().context("failed to load configuration"),
    };
    config.apply_env_overrides(|key| std::env::var(key).ok());
    Ok(config)
}

fn session_store() -> Result<SessionStore> {
    SessionStore::user_default().context("no configuration directory on this platform")
}

fn build_studio(config: &AppConfig, download_dir: Option<PathBuf>) -> Result<Studio<ConfiguredGallery>> {
    let gallery = ConfiguredGallery::from_credentials(config.gallery.credentials())?;
    let session = match SessionStore::user_default() {
        Some(store) => Session::load(store)?,
        None => Session::anonymous(),
    };
    let downloads = match download_dir {
        Some(dir) => DirectoryDownloads::new(dir),
        None => config.downloads.sink(),
    };

    Ok(Studio::new(
        RasterExporter::new(config.export.clone()),
        ExportSink::new(SystemClipboard::until_replaced(), downloads),
    )
    .with_session(session)
    .with_gallery(Arc::new(gallery))
    .with_share(config.share.clone()))
}

/// Waits for the gallery save an export started, if any.
async fn finish_save<O>(report: ExportReport<O>) {
    if let Some(save) = report.save {
        match save.await {
            Ok(Ok(_)) => println!("Saved to the gallery."),
            Ok(Err(_)) => eprintln!("Could not save to the gallery (see log)."),
            Err(err) => eprintln!("Gallery save did not finish: {err}"),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Command::Regions => {
            for region in Region::ALL {
                println!("{:<12} {}", region, region.default_color());
            }
        }

        Command::Paint {
            colors,
            width,
            hover,
            json,
            out,
        } => {
            let mut studio = build_studio(&config, None)?;
            colors.apply(&mut studio)?;
            let text = if json {
                serde_json::to_string_pretty(studio.colors())?
            } else {
                compose_preview(studio.colors(), LogoSize::from_width(width), hover).into_markup()
            };
            match out {
                Some(path) => fs::write(&path, text)
                    .with_context(|| format!("failed to write {}", path.display()))?,
                None => println!("{text}"),
            }
        }

        Command::Copy { colors } => {
            let mut studio = build_studio(&config, None)?;
            colors.apply(&mut studio)?;
            if cfg!(all(
                unix,
                not(any(target_os = "macos", target_os = "android", target_os = "emscripten"))
            )) {
                eprintln!("Holding the clipboard until something else is copied...");
            }
            let report = studio.copy_to_clipboard().await;
            match &report.outcome {
                CopyOutcome::Copied => println!("Copied!"),
                CopyOutcome::Downloaded(path) => {
                    println!("Clipboard unavailable, saved {}", path.display())
                }
                CopyOutcome::Failed => eprintln!("Export failed."),
            }
            let failed = report.outcome == CopyOutcome::Failed;
            finish_save(report).await;
            if failed {
                bail!("could not copy the logo");
            }
        }

        Command::Download { colors, dir } => {
            let mut studio = build_studio(&config, dir)?;
            colors.apply(&mut studio)?;
            let report = studio.download().await;
            let failed = match &report.outcome {
                DownloadOutcome::Downloaded(path) => {
                    println!("Saved {}", path.display());
                    false
                }
                DownloadOutcome::Failed => true,
            };
            finish_save(report).await;
            if failed {
                bail!("could not download the logo");
            }
        }

        Command::Share { print } => {
            if print {
                println!("{}", config.share.intent_url());
            } else {
                let url = config.share.open().context("failed to open a browser")?;
                println!("Opened {url}");
            }
        }

        Command::Login { handle } => {
            let mut session = Session::load(session_store()?)?;
            let handle = session.login(&handle)?;
            println!("Logged in as @{handle}");
        }

        Command::Logout => {
            let mut session = Session::load(session_store()?)?;
            session.logout()?;
            println!("Logged out.");
        }

        Command::Gallery { command } => {
            let gallery = ConfiguredGallery::from_credentials(config.gallery.credentials())?;
            if !gallery.is_remote() {
                eprintln!("No gallery configured; showing an empty local gallery.");
            }
            match command {
                GalleryCommand::List { limit } => {
                    let limit = limit.unwrap_or(config.gallery.recent_limit);
                    for entry in gallery.list_recent_logos(limit).await? {
                        println!(
                            "{}  @{:<20} {}",
                            entry.created_at.format("%Y-%m-%d %H:%M"),
                            entry.display_handle(),
                            entry.colors.to_json()?
                        );
                    }
                }
                GalleryCommand::Cover { out, limit } => {
                    let limit = limit.unwrap_or(config.gallery.cover_limit);
                    let entries = gallery.list_recent_logos(limit).await?;
                    let export = config.export.clone();
                    let artifact = tokio::task::spawn_blocking(move || {
                        render_cover(&entries, &CoverLayout::default(), &export)
                    })
                    .await??;
                    fs::write(&out, &artifact.bytes)
                        .with_context(|| format!("failed to write {}", out.display()))?;
                    println!(
                        "Wrote {} ({}x{})",
                        out.display(),
                        artifact.width,
                        artifact.height
                    );
                }
            }
        }

        Command::KeepAlive => {
            let gallery = ConfiguredGallery::from_credentials(config.gallery.credentials())?;
            if !gallery.is_remote() {
                bail!("keep-alive needs gallery credentials");
            }
            let mut keep_alive = KeepAlive::new(Arc::new(gallery), config.gallery.keep_alive());
            keep_alive.start();
            println!("Keeping the gallery awake; press Ctrl-C to stop.");
            tokio::signal::ctrl_c().await?;
            keep_alive.stop();
        }
    }

    Ok(())
}
