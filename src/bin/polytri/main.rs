//! polytri CLI - polygon mesh triangulation tool.
//!
//! Usage: polytri <COMMAND> [OPTIONS] <INPUT> [OUTPUT]
//!
//! Run `polytri --help` for available commands. Set `RUST_LOG=debug` to see
//! per-face diagnostics.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

use clap::{Parser, Subcommand};
use nalgebra::Point3;

use polytri::algo::triangulate::{self, FailurePolicy, TriangulateOptions};
use polytri::algo::Progress;
use polytri::io;
use polytri::kernel::NewellKernel;
use polytri::mesh::HalfEdgeMesh;

#[derive(Parser)]
#[command(name = "polytri")]
#[command(author, version, about = "Polygon mesh triangulation CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Display mesh information
    Info {
        /// Input mesh file
        input: PathBuf,
    },

    /// Triangulate every face with more than three sides
    Triangulate {
        /// Input mesh file
        input: PathBuf,

        /// Output mesh file
        output: PathBuf,

        /// Leave degenerate and self-intersecting faces untouched instead of failing
        #[arg(long)]
        skip_degenerate: bool,

        /// Use single-threaded execution (for benchmarking)
        #[arg(long)]
        sequential: bool,

        /// Smallest normal length accepted for a face
        #[arg(short, long)]
        tolerance: Option<f64>,
    },
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Info { input } => {
            cmd_info(&input)?;
        }

        Commands::Triangulate {
            input,
            output,
            skip_degenerate,
            sequential,
            tolerance,
        } => {
            cmd_triangulate(&input, &output, skip_degenerate, sequential, tolerance)?;
        }
    }

    Ok(())
}

/// Create a progress reporter that displays a progress bar on the terminal.
fn create_progress() -> Progress {
    let max_percent = Arc::new(AtomicUsize::new(0));

    Progress::new(move |current, total, message| {
        if total == 0 {
            return;
        }

        let raw_percent = if current >= total {
            100
        } else {
            ((current * 100) + (total / 2)) / total
        };

        // Only ever move forward
        let previous = max_percent.fetch_max(raw_percent, Ordering::Relaxed);
        if raw_percent <= previous && raw_percent != 100 {
            return;
        }

        let bar_width = 30;
        let filled = (raw_percent * bar_width) / 100;
        let bar = "=".repeat(filled);
        let space = " ".repeat(bar_width - filled);

        eprint!("\r[{}{}] {:3}% {}", bar, space, raw_percent, message);
        let _ = std::io::stderr().flush();

        if current >= total {
            eprintln!();
        }
    })
}

fn print_face_sizes(mesh: &HalfEdgeMesh) {
    let mut histogram: BTreeMap<usize, usize> = BTreeMap::new();
    for f in mesh.face_ids() {
        *histogram.entry(mesh.face_degree(f)).or_default() += 1;
    }
    let sizes: Vec<String> = histogram
        .iter()
        .map(|(degree, count)| format!("{}-gon: {}", degree, count))
        .collect();
    println!("Face sizes: {}", sizes.join(", "));
}

fn cmd_info(input: &PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let mesh: HalfEdgeMesh = io::load(input)?;

    println!("File: {}", input.display());
    println!("Vertices: {}", mesh.num_vertices());
    println!("Edges: {}", mesh.num_edges());
    println!("Faces: {}", mesh.num_faces());
    println!("Half-edges: {}", mesh.num_halfedges());
    print_face_sizes(&mesh);

    println!("Surface area: {:.6}", mesh.surface_area());

    if let Some((min, max)) = mesh.bounding_box() {
        println!(
            "Bounding box: ({:.3}, {:.3}, {:.3}) to ({:.3}, {:.3}, {:.3})",
            min.x, min.y, min.z, max.x, max.y, max.z
        );
    }

    if mesh.is_triangle_mesh() {
        println!("Mesh type: Triangle mesh");
    } else {
        println!("Mesh type: Polygon mesh");
    }

    let boundary_edges = mesh
        .edge_ids()
        .filter(|&e| mesh.is_boundary_edge(e.halfedge(0)))
        .count();
    let boundary_verts = mesh
        .vertex_ids()
        .filter(|&v| mesh.is_boundary_vertex(v))
        .count();
    if boundary_verts == 0 {
        println!("Topology: Closed (no boundary)");
    } else {
        println!(
            "Topology: Open ({} boundary vertices, {} boundary edges)",
            boundary_verts, boundary_edges
        );
    }

    Ok(())
}

fn cmd_triangulate(
    input: &PathBuf,
    output: &PathBuf,
    skip_degenerate: bool,
    sequential: bool,
    tolerance: Option<f64>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut mesh: HalfEdgeMesh = io::load(input)?;

    println!("Loaded: {} vertices, {} faces", mesh.num_vertices(), mesh.num_faces());
    print_face_sizes(&mesh);

    let kernel = match tolerance {
        Some(t) => NewellKernel::with_tolerance(t)?,
        None => NewellKernel::default(),
    };
    let policy = if skip_degenerate {
        FailurePolicy::Skip
    } else {
        FailurePolicy::Abort
    };
    let options = TriangulateOptions::default()
        .with_policy(policy)
        .with_parallel(!sequential);

    let mode = if sequential { "sequential" } else { "parallel" };
    println!("Triangulating faces ({})...", mode);

    let points: Vec<Point3<f64>> = mesh.vertices().map(|(_, v)| v.position).collect();
    let progress = create_progress();

    let start = Instant::now();
    let report = triangulate::triangulate_faces_with_progress(
        &mut mesh, &points, &kernel, &options, &progress,
    )?;
    let elapsed = start.elapsed();

    println!(
        "Triangulated {} faces: {} triangles, {} new edges",
        report.faces_triangulated, report.triangles_created, report.diagonals_created
    );
    for (face, error) in &report.skipped {
        println!("Skipped face {}: {}", face.index(), error);
    }

    println!("Result: {} vertices, {} faces", mesh.num_vertices(), mesh.num_faces());
    io::save(&mesh, output)?;
    println!("Saved: {} ({:.2?})", output.display(), elapsed);

    Ok(())
}
