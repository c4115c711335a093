//! Narrative Layout CLI
//!
//! Usage:
//!   narrative-layout [OPTIONS] [FILE]
//!
//! Options:
//!   --size <W> <H>               Chart size
//!   -o, --orientation <DIR>      horizontal or vertical
//!   --paths                      Include SVG path strings for every link
//!   -d, --debug                  Print the computed layout tree to stderr
//!   -e, --example                Print an example narrative
//!   -h, --help                   Print help

use std::io::{self, IsTerminal, Read};
use std::path::PathBuf;

use clap::Parser;
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

use narrative_layout::{format_tree, LabelPosition, LayoutResult, LinkPath, Narrative, Orientation};

#[derive(Parser)]
#[command(name = "narrative-layout")]
#[command(about = "Compute narrative chart layouts from characters and scenes")]
struct Cli {
    /// Narrative file in TOML format (reads from stdin if not provided)
    input: Option<PathBuf>,

    /// Chart size, overriding the document's [layout] table
    #[arg(long, num_args = 2, value_names = ["WIDTH", "HEIGHT"])]
    size: Option<Vec<f64>>,

    /// Direction of the time axis
    #[arg(short, long)]
    orientation: Option<Orientation>,

    /// Space allotted to each character lane
    #[arg(long)]
    path_space: Option<f64>,

    /// Gap between groups of lanes
    #[arg(long)]
    group_margin: Option<f64>,

    /// Default introduction label position (left, right, above, below)
    #[arg(long)]
    label_position: Option<LabelPosition>,

    /// Include an SVG path string for every link
    #[arg(long)]
    paths: bool,

    /// Link curvature between 0 and 1
    #[arg(short, long, default_value_t = 0.5)]
    curvature: f64,

    /// Print the computed layout tree to stderr
    #[arg(short, long)]
    debug: bool,

    /// More logging on stderr (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Print an example narrative
    #[arg(short, long)]
    example: bool,

    /// Single-line JSON output
    #[arg(long)]
    compact: bool,
}

#[derive(Serialize)]
struct Output<'a> {
    extent: (f64, f64),
    #[serde(flatten)]
    layout: &'a LayoutResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    paths: Option<Vec<String>>,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if cli.example {
        println!("{}", EXAMPLE);
        return;
    }

    // If no input file and stdin is a terminal (interactive), show intro help
    if cli.input.is_none() && io::stdin().is_terminal() {
        print_intro();
        return;
    }

    let source = match &cli.input {
        Some(path) => match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                eprintln!("Error reading file '{}': {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => {
            let mut buffer = String::new();
            match io::stdin().read_to_string(&mut buffer) {
                Ok(_) => buffer,
                Err(e) => {
                    eprintln!("Error reading from stdin: {}", e);
                    std::process::exit(1);
                }
            }
        }
    };

    let mut narrative = match Narrative::from_str(&source) {
        Ok(narrative) => narrative,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };
    apply_overrides(&cli, &mut narrative);
    info!(
        characters = narrative.characters.len(),
        scenes = narrative.scenes.len(),
        "loaded narrative"
    );

    let result = match narrative.compute() {
        Ok(result) => result,
        Err(e) => {
            eprintln!("Error: {}", e);
            if let Some(suggestions) = e.suggestions().filter(|s| !s.is_empty()) {
                eprintln!("  did you mean: {}?", suggestions.join(", "));
            }
            std::process::exit(1);
        }
    };

    if cli.debug {
        eprintln!("=== Layout Debug ===");
        eprint!("{}", format_tree(&result));
        eprintln!("====================");
    }

    let paths = cli.paths.then(|| {
        let generator = LinkPath::new(result.orientation).with_curvature(cli.curvature);
        result
            .links
            .iter()
            .map(|link| generator.link(&result, link))
            .collect()
    });
    let output = Output {
        extent: result.extent(),
        layout: &result,
        paths,
    };
    let json = if cli.compact {
        serde_json::to_string(&output)
    } else {
        serde_json::to_string_pretty(&output)
    };
    match json {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .compact()
        .init();
}

fn apply_overrides(cli: &Cli, narrative: &mut Narrative) {
    let config = &mut narrative.layout;
    if let Some([width, height]) = cli.size.as_deref().and_then(|s| <[f64; 2]>::try_from(s).ok()) {
        config.size = (width, height);
    }
    if let Some(orientation) = cli.orientation {
        config.orientation = orientation;
    }
    if let Some(space) = cli.path_space {
        config.path_space = space;
    }
    if let Some(margin) = cli.group_margin {
        config.group_margin = margin;
    }
    if let Some(position) = cli.label_position {
        config.label_position = position;
    }
}

fn print_intro() {
    println!(
        r#"Narrative Layout - narrative chart layouts from characters and scenes

USAGE:
    narrative-layout [OPTIONS] [FILE]
    cat story.toml | narrative-layout

OPTIONS:
    --size <W> <H>          Chart size
    -o, --orientation       horizontal or vertical
    --path-space <N>        Lane spacing
    --group-margin <N>      Gap between groups
    --label-position <P>    left, right, above or below
    --paths                 Include SVG path strings for links
    -c, --curvature <N>     Link curvature (0 to 1)
    -d, --debug             Print the layout tree to stderr
    -v, --verbose           More logging (repeat for more)
    -e, --example           Print an example narrative
    -h, --help              Print help

QUICK START:
    narrative-layout --example > story.toml
    narrative-layout --paths story.toml > layout.json"#
    );
}

const EXAMPLE: &str = r#"# A narrative is a list of characters and the scenes they share.
# Scenes refer to characters by name or by position in the list.

[layout]
size = [960, 400]
path_space = 12
group_margin = 20
scene_padding = [4, 4, 4, 4]

[[characters]]
name = "Luke"

[[characters]]
name = "Leia"
label_position = "left"

[[characters]]
name = "Han"

[[characters]]
name = "Chewbacca"

[[characters]]
name = "Vader"

[[characters]]
name = "Tarkin"

[[scenes]]
name = "Tantive IV"
characters = ["Leia", "Vader"]

[[scenes]]
name = "Death Star briefing"
characters = ["Vader", "Tarkin"]

[[scenes]]
name = "Cantina"
characters = ["Luke", "Han", "Chewbacca"]

[[scenes]]
name = "Detention block"
characters = ["Luke", "Leia", "Han", "Chewbacca"]

[[scenes]]
name = "Trench run"
characters = ["Luke", "Han", "Vader"]
duration = 2

[[scenes]]
name = "Throne room"
characters = [0, 1, 2, 3]
"#;
