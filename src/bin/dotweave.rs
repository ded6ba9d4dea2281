use std::cell::Cell;
use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};
use dotweave::scene::fx;
use dotweave::{
    Dot, Ease, FilledShape, FixedStepClock, Gradient, Grid, LineStyle, Motion, ObjectCore, Point,
    Rgba8, Runtime, RuntimeOpts, SceneObject, Shape,
};

#[derive(Parser, Debug)]
#[command(name = "dotweave", version)]
struct Cli {
    /// Log engine activity to stderr.
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a demo scene for a number of frames and write the last one as a PNG.
    Frame(FrameArgs),
    /// Print the default runtime options as JSON.
    Config,
}

#[derive(Parser, Debug)]
struct FrameArgs {
    /// Demo scene.
    #[arg(long, value_enum, default_value_t = Demo::Constellation)]
    demo: Demo,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Surface width.
    #[arg(long, default_value_t = 640)]
    width: u32,

    /// Surface height.
    #[arg(long, default_value_t = 360)]
    height: u32,

    /// Frames to draw before exporting.
    #[arg(long, default_value_t = 30)]
    frames: u64,

    /// Pointer position as `x,y` (defaults to the surface center).
    #[arg(long, value_parser = parse_point)]
    pointer: Option<Point>,

    /// Runtime options JSON.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Text for the `text` demo.
    #[arg(long, default_value = "DOTWEAVE")]
    text: String,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Demo {
    Constellation,
    Text,
    Filled,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    match cli.cmd {
        Command::Frame(args) => cmd_frame(args),
        Command::Config => {
            let json = serde_json::to_string_pretty(&RuntimeOpts::default())
                .context("serialize default options")?;
            println!("{json}");
            Ok(())
        }
    }
}

fn parse_point(s: &str) -> Result<Point, String> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| format!("expected x,y, got '{s}'"))?;
    let x: f64 = x.trim().parse().map_err(|e| format!("bad x: {e}"))?;
    let y: f64 = y.trim().parse().map_err(|e| format!("bad y: {e}"))?;
    Ok(Point::new(x, y))
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let mut opts = match &args.config {
        Some(path) => RuntimeOpts::from_json_file(path)
            .with_context(|| format!("load options '{}'", path.display()))?,
        None => RuntimeOpts::default(),
    }
    .with_env_overrides();
    if opts.clear_color.is_none() {
        opts.clear_color = Some(Rgba8::rgb(12, 14, 22));
    }

    let mut rt = Runtime::cpu(args.width, args.height, opts).context("create cpu surface")?;
    let center = Point::new(f64::from(args.width) / 2.0, f64::from(args.height) / 2.0);
    match args.demo {
        Demo::Constellation => add_constellation(&mut rt, center, args.width, args.height),
        Demo::Text => add_text(&mut rt, center, &args.text),
        Demo::Filled => add_filled(&mut rt, center),
    }
    rt.pointer_move(args.pointer.unwrap_or(center));

    // One extra callback: the first only records the time baseline.
    let mut clock = FixedStepClock::new(1000.0 / 60.0);
    let drawn = rt.run_frames(&mut clock, args.frames + 1)?;

    let frame = rt
        .read_frame()
        .context("surface did not keep a frame")?;
    if let Some(parent) = args.out.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    frame
        .write_png(&args.out)
        .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {} ({drawn} frames)", args.out.display());
    Ok(())
}

fn add_constellation(rt: &mut Runtime, center: Point, width: u32, height: u32) {
    let (w, h) = (f64::from(width), f64::from(height));
    let seed = Cell::new(0x2545_f491_u32);
    let shape = Shape::generated(center, move |_, _| {
        (0..90)
            .map(|_| {
                let x = (next_unit(&seed) - 0.5) * w;
                let y = (next_unit(&seed) - 0.5) * h;
                Dot::with_core(
                    ObjectCore::new((x, y)).with_paint(Rgba8::rgb(170, 200, 255)),
                    2.0,
                )
            })
            .collect()
    })
    .with_limit(160.0)
    .on_dot(|ctx, dot, sample| {
        dot.set_radius(fx::ratio_radius(sample.ratio, 4.0, 1.5));
        fx::connect_within(
            ctx,
            dot,
            sample,
            70.0,
            Rgba8::rgb(120, 160, 255),
            &LineStyle::width(1.0),
        );
    });
    rt.add(shape);
}

fn add_text(rt: &mut Runtime, center: Point, text: &str) {
    let chars = text.chars().filter(|c| *c != '\n').count().max(1) as f64;
    let gap = 8.0;
    let width = chars * 6.0 * gap;
    let origin = Point::new(center.x - width / 2.0, center.y - 2.5 * gap);
    let core = ObjectCore::new(origin).with_paint(Rgba8::rgb(255, 210, 120));
    let grid = Grid::from_shape(
        Shape::with_core(core, Vec::<Dot>::new())
            .with_limit(120.0)
            .on_dot(|ctx, dot, sample| {
                dot.set_opacity(fx::ratio_opacity(sample.ratio, 1.0, 0.35));
                fx::draw_connections(
                    ctx,
                    dot,
                    sample,
                    Rgba8::rgb(255, 170, 90),
                    &LineStyle::width(1.5),
                );
            }),
        text,
    )
    .with_gap((gap, gap))
    .with_dot_radius(2.5);
    rt.add(grid);
}

fn add_filled(rt: &mut Runtime, center: Point) {
    let dots: Vec<Dot> = (0..6)
        .map(|i| {
            let a = f64::from(i) * std::f64::consts::TAU / 6.0;
            Dot::with_core(
                ObjectCore::new((a.cos() * 110.0, a.sin() * 110.0)).with_paint(Rgba8::WHITE),
                3.0,
            )
        })
        .collect();
    let fill = Gradient::linear((0.0, 0.0), (1.0, 1.0))
        .stop(0.0, Rgba8::rgb(80, 40, 200))
        .stop(1.0, Rgba8::rgb(20, 180, 220))
        .anchored_to_owner();
    let mut filled = FilledShape::new(Shape::new(center, dots), fill);
    filled.rotate_to(60.0, 2000.0, Ease::InOutSine, true);
    rt.add(filled);
}

fn next_unit(seed: &Cell<u32>) -> f64 {
    let mut x = seed.get();
    x ^= x << 13;
    x ^= x >> 17;
    x ^= x << 5;
    seed.set(x);
    f64::from(x) / f64::from(u32::MAX)
}
