use std::path::PathBuf;

use anyhow::bail;
use clap::{Parser, ValueEnum};

use raysweeper::{debug_svg::SvgRecorder, generators, input::Scene, SweepOptions};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Example {
    Room,
    Pillars,
    SlantedPillars,
    Blinds,
    Fan,
}

#[derive(Parser)]
struct Cli {
    /// Where to write the SVG.
    #[arg(long)]
    output: PathBuf,

    /// A scene file: the origin, then one segment per line.
    #[arg(long)]
    input: Option<PathBuf>,

    /// Sweep a generated scene instead of reading one.
    #[arg(long, value_enum)]
    example: Option<Example>,

    /// How big to make the generated scene.
    #[arg(long, default_value_t = 5)]
    size: usize,

    /// Validate the status tree after every change.
    #[arg(long)]
    check: bool,
}

pub fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    let args = Cli::parse();

    let scene = match (&args.input, args.example) {
        (Some(path), None) => Scene::read(path)?,
        (None, Some(example)) => match example {
            Example::Room => generators::room(args.size as f64),
            Example::Pillars => generators::pillars(args.size),
            Example::SlantedPillars => generators::slanted_pillars(args.size),
            Example::Blinds => generators::blinds(args.size),
            Example::Fan => generators::fan(args.size),
        },
        _ => bail!("need exactly one of --input and --example"),
    };

    let options = SweepOptions {
        check_invariants: args.check,
        ..Default::default()
    };
    let mut recorder = SvgRecorder::new(scene.origin, &scene.segments);
    let visible = scene.visible_with(&options, &mut recorder)?;

    println!(
        "{} of {} segments are visible: {visible:?}",
        visible.len(),
        scene.segments.len()
    );
    recorder.save(&args.output)?;

    Ok(())
}
