use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};
use scenescript::{
    Camera, Canvas3D, Color, Frame3D, LoopSubdivisionStencil, Mat4, Scene, Vec3, ViewerRuntime,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "scenescript", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build an animated, subdivided demo scene, quantize it and write it out.
    Demo(DemoArgs),
    /// Print the serialized size of each command type in a script.
    Stats(StatsArgs),
}

#[derive(Parser, Debug)]
struct DemoArgs {
    /// Output directory.
    #[arg(long)]
    out: PathBuf,

    /// Delivery mode.
    #[arg(long, value_enum, default_value_t = Mode::Html)]
    mode: Mode,

    /// Number of animation frames.
    #[arg(long, default_value_t = 60)]
    frames: u32,

    /// Loop subdivision steps applied to the base octahedron.
    #[arg(long, default_value_t = 3)]
    steps: u32,

    /// Absolute quantization error budget.
    #[arg(long, default_value_t = 1e-4)]
    threshold: f32,

    /// Viewer runtime to inline; without it the page references `--viewer-url`.
    #[arg(long)]
    viewer: Option<PathBuf>,

    /// URL of a hosted viewer runtime.
    #[arg(long, default_value = "scenescript.js")]
    viewer_url: String,
}

#[derive(Parser, Debug)]
struct StatsArgs {
    /// Input script JSON (a command array).
    #[arg(long = "in")]
    in_path: PathBuf,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Mode {
    Html,
    Script,
    Json,
    Debug,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Demo(args) => cmd_demo(args),
        Command::Stats(args) => cmd_stats(args),
    }
}

const OCTAHEDRON: [[u32; 3]; 8] = [
    [0, 2, 4],
    [2, 1, 4],
    [1, 3, 4],
    [3, 0, 4],
    [2, 0, 5],
    [1, 2, 5],
    [3, 1, 5],
    [0, 3, 5],
];

fn octahedron(t: f32) -> Vec<Vec3> {
    let pulse = 1.0 + 0.25 * t.sin();
    let twist = 0.3 * (0.5 * t).sin();
    vec![
        Vec3::new(twist.cos(), 0.0, twist.sin()),
        Vec3::new(-twist.cos(), 0.0, -twist.sin()),
        Vec3::new(-twist.sin(), 0.0, twist.cos()),
        Vec3::new(twist.sin(), 0.0, -twist.cos()),
        Vec3::new(0.0, pulse, 0.0),
        Vec3::new(0.0, -pulse, 0.0),
    ]
}

fn build_demo(frames: u32, steps: u32) -> anyhow::Result<Scene> {
    let stencil = LoopSubdivisionStencil::build(&OCTAHEDRON, steps, true)?;
    tracing::info!(
        vertices = stencil.vertex_count(),
        triangles = stencil.triangle_count(),
        "built subdivision stencil"
    );

    let mut scene = Scene::new("demo");
    let (positions, triangles) = stencil.apply(&octahedron(0.0))?;
    let mut blob = scene
        .create_mesh("blob")
        .with_shared_color(Color::from_hex("#4a90d9")?)?;
    blob.add_mesh_without_normals(&positions, triangles, None, None, Mat4::IDENTITY)?;
    let blob_id = scene.define_mesh(blob)?;

    let canvas = scene.create_canvas_3d(
        Canvas3D::new(640, 480).camera(Camera::looking_at(Vec3::new(0.0, 1.0, 4.0), Vec3::ZERO)),
    )?;

    for frame in 0..frames {
        let t = frame as f32 / 10.0;
        let (positions, _) = stencil.apply(&octahedron(t))?;
        let update_id = scene.update_mesh_positions(&blob_id, &positions, None)?;
        scene.add_frame_3d(&canvas, Frame3D::new().add_mesh(update_id))?;
    }
    Ok(scene)
}

fn viewer_runtime(args: &DemoArgs) -> anyhow::Result<ViewerRuntime> {
    match &args.viewer {
        Some(path) => {
            let source = std::fs::read_to_string(path)
                .with_context(|| format!("read viewer runtime '{}'", path.display()))?;
            Ok(ViewerRuntime::Inline(source))
        }
        None => Ok(ViewerRuntime::Url(args.viewer_url.clone())),
    }
}

fn cmd_demo(args: DemoArgs) -> anyhow::Result<()> {
    let mut scene = build_demo(args.frames, args.steps)?;
    let report = scene.quantize_updates(args.threshold)?;
    for (mesh_id, info) in &report {
        tracing::info!(%mesh_id, %info, "quantized mesh updates");
    }

    std::fs::create_dir_all(&args.out)
        .with_context(|| format!("create output dir '{}'", args.out.display()))?;
    let written = match args.mode {
        Mode::Html => {
            let path = args.out.join("demo.html");
            scene.save_as_html(&path, &Default::default(), &viewer_runtime(&args)?)?;
            path
        }
        Mode::Script => {
            let path = args.out.join("demo.js");
            let runtime = match viewer_runtime(&args)? {
                ViewerRuntime::Inline(source) => Some(source),
                ViewerRuntime::Url(_) => None,
            };
            scene.save_as_script(&path, runtime.as_deref())?;
            path
        }
        Mode::Json => {
            let path = args.out.join("demo.json");
            scene.save_as_json(&path)?;
            path
        }
        Mode::Debug => {
            scene.save_as_debug(&args.out, &viewer_runtime(&args)?)?;
            args.out.join("index.html")
        }
    };

    eprintln!("wrote {}", written.display());
    Ok(())
}

fn read_script_json(path: &Path) -> anyhow::Result<Vec<scenescript::Command>> {
    let f = File::open(path).with_context(|| format!("open script '{}'", path.display()))?;
    let r = BufReader::new(f);
    let commands: Vec<scenescript::Command> =
        serde_json::from_reader(r).with_context(|| "parse script JSON")?;
    Ok(commands)
}

fn cmd_stats(args: StatsArgs) -> anyhow::Result<()> {
    let commands = read_script_json(&args.in_path)?;
    let sizes = scenescript::measure_command_sizes(&commands)?;
    let total: usize = sizes.values().sum();
    for (command_type, bytes) in &sizes {
        println!("{command_type:<24} {bytes:>10}");
    }
    println!("{:<24} {total:>10}", "total");
    Ok(())
}
