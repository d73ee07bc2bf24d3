use caption_tree::render::RenderOptions;
use caption_tree::source::HttpSource;
use caption_tree::types::GalleryItem;
use caption_tree::{collect, config, output, render};
use clap::{Parser, Subcommand};
use std::fs::File;
use std::io::{self, BufReader, BufWriter};
use std::path::{Path, PathBuf};

/// Flags for commands that render.
#[derive(clap::Args, Clone, Copy)]
struct RenderArgs {
    /// Don't generate per-item pages (much faster)
    #[arg(short = 'I', long)]
    no_images: bool,

    /// Don't generate the gallery listing page
    #[arg(short = 'G', long)]
    no_gallery: bool,
}

impl RenderArgs {
    fn options(self) -> RenderOptions {
        RenderOptions {
            item_pages: !self.no_images,
            listing: !self.no_gallery,
        }
    }
}

#[derive(Parser)]
#[command(name = "caption-tree")]
#[command(about = "Rank gallery comments and render them as nested HTML threads")]
#[command(long_about = "\
Rank gallery comments and render them as nested HTML threads

Two stages, connected by a JSON data file:

  collect   fetch the newest items and their comments, rank each comment by
            the lower bound of its Wilson score interval, rebuild the reply
            trees, and write everything as JSON
  render    turn that JSON into static pages:

  out/
  ├── index.html             # About page (from the site's _index.html)
  ├── style.css, script.js   # Written if missing
  └── gallery/
      ├── index.html         # Thumbnail listing
      └── <hash>.html        # Image + comment tree, best comments first

Site directory (--site):
  config.toml                # Optional, see 'caption-tree gen-config'
  _index.html                # About page body (.md also accepted)
  _page_suffix.html          # Optional, appended to every page

Run 'caption-tree gen-config' to generate a documented config.toml.")]
#[command(version)]
struct Cli {
    /// Site directory holding config.toml and page fragments
    #[arg(long, default_value = ".", global = true)]
    site: PathBuf,

    /// Output directory for rendered pages
    #[arg(long, default_value = ".", global = true)]
    output: PathBuf,

    /// Directory for the intermediate data file used by `build`
    #[arg(long, default_value = ".caption-tree", global = true)]
    work_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Download the newest items and their ranked comment trees as JSON
    Collect {
        /// Number of items to download
        #[arg(default_value_t = 100)]
        count: usize,

        /// File to write to (default: stdout)
        #[arg(short = 'o', long = "out")]
        out: Option<PathBuf>,
    },
    /// Render a collected JSON file into HTML pages
    Render {
        /// Data file to read (default: stdin)
        input: Option<PathBuf>,

        #[command(flatten)]
        render: RenderArgs,
    },
    /// Collect into the work directory, then render
    Build {
        /// Number of items to download
        #[arg(default_value_t = 100)]
        count: usize,

        #[command(flatten)]
        render: RenderArgs,
    },
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Command::Collect { count, out } => {
            let site_config = config::load_config(&cli.site)?;
            let items = run_collect(&site_config, count)?;
            match out {
                Some(path) => collect::write_items(&items, BufWriter::new(File::create(path)?))?,
                None => collect::write_items(&items, io::stdout().lock())?,
            }
        }
        Command::Render { input, render: render_args } => {
            let site_config = config::load_config(&cli.site)?;
            let options = render_args.options();
            let items = if options.needs_items() {
                match input {
                    Some(path) => render::read_items(BufReader::new(File::open(path)?))?,
                    None => render::read_items(io::stdin().lock())?,
                }
            } else {
                Vec::new()
            };
            run_render(&items, &site_config, &cli.site, &cli.output, options)?;
        }
        Command::Build { count, render: render_args } => {
            let site_config = config::load_config(&cli.site)?;
            std::fs::create_dir_all(&cli.work_dir)?;
            let data_path = cli.work_dir.join("items.json");

            eprintln!("==> Stage 1: Collecting {} items", count);
            let items = run_collect(&site_config, count)?;
            collect::write_items(&items, BufWriter::new(File::create(&data_path)?))?;

            println!("==> Stage 2: Rendering → {}", cli.output.display());
            let items = render::read_items(BufReader::new(File::open(&data_path)?))?;
            run_render(&items, &site_config, &cli.site, &cli.output, render_args.options())?;

            println!("==> Build complete: {}", cli.output.display());
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Collect over HTTP, reporting progress on stderr.
fn run_collect(
    site_config: &config::SiteConfig,
    count: usize,
) -> Result<Vec<GalleryItem>, Box<dyn std::error::Error>> {
    let source = HttpSource::new(&site_config.source)?;
    let items = collect::collect(&source, count, |event| output::print_collect_event(&event))?;
    output::print_collect_summary(&items);
    Ok(items)
}

fn run_render(
    items: &[GalleryItem],
    site_config: &config::SiteConfig,
    site: &Path,
    output_dir: &Path,
    options: RenderOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let summary = render::render(items, site_config, site, output_dir, options)?;
    output::print_render_output(&summary);
    Ok(())
}
