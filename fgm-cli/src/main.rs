use env_logger::Env;
use eyre::WrapErr;
use fgm_core::{run, Mesh, Params, Point2, Solution, SolverKind, StressComponent};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, ValueEnum};

#[derive(Parser)]
#[command(about = "Flat-indenter contact on a functionally graded coating")]
struct Cli {
    /// JSON problem parameters; missing fields take the reference values.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// JSON mesh `{ "nodes": [[x, y], ...], "elements": [[a, b, c], ...] }`.
    /// A layered grid is generated when absent.
    #[arg(short, long)]
    mesh: Option<PathBuf>,

    #[arg(short, long, default_value = "output/solution.json")]
    output: PathBuf,

    #[arg(short, long, value_enum)]
    solver: Option<SolverArg>,

    /// Override the number of grid cells along the width.
    #[arg(long)]
    nx: Option<usize>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum SolverArg {
    Cholesky,
    DenseLu,
    Auto,
}

impl From<SolverArg> for SolverKind {
    fn from(arg: SolverArg) -> Self {
        match arg {
            SolverArg::Cholesky => SolverKind::Cholesky,
            SolverArg::DenseLu => SolverKind::DenseLu,
            SolverArg::Auto => SolverKind::Auto,
        }
    }
}

/// Mesh hand-off format.
#[derive(Debug, Serialize, Deserialize)]
struct MeshFile {
    nodes: Vec<[f64; 2]>,
    elements: Vec<[usize; 3]>,
}

impl MeshFile {
    fn from_mesh(mesh: &Mesh) -> Self {
        Self {
            nodes: mesh.nodes().iter().map(|p| [p[0], p[1]]).collect(),
            elements: mesh.elements().to_vec(),
        }
    }

    fn into_mesh(self) -> fgm_core::Result<Mesh> {
        let nodes = self.nodes.iter().map(|&[x, y]| Point2::new(x, y)).collect();
        Mesh::from_arrays(nodes, self.elements)
    }
}

#[derive(Serialize)]
struct Summary {
    max_displacement: f64,
    max_von_mises: f64,
    min_sigma_yy: Option<f64>,
    applied_force_sum: f64,
}

#[derive(Serialize)]
struct Report<'a> {
    params: &'a Params,
    mesh: MeshFile,
    summary: Summary,
    nodal_sigma_yy: Vec<f64>,
    solution: &'a Solution,
}

fn load_params(cli: &Cli) -> eyre::Result<Params> {
    let mut params = match &cli.config {
        Some(path) => {
            let text = fs::read_to_string(path)
                .wrap_err_with(|| format!("reading config {}", path.display()))?;
            serde_json::from_str(&text)
                .wrap_err_with(|| format!("parsing config {}", path.display()))?
        }
        None => Params::default(),
    };
    if let Some(nx) = cli.nx {
        params.mesh.num_elements_x = nx;
    }
    if let Some(solver) = cli.solver {
        params.solver.solver = solver.into();
    }
    Ok(params)
}

fn load_mesh(path: Option<&Path>, params: &Params) -> eyre::Result<Mesh> {
    match path {
        Some(path) => {
            let text = fs::read_to_string(path)
                .wrap_err_with(|| format!("reading mesh {}", path.display()))?;
            let file: MeshFile = serde_json::from_str(&text)
                .wrap_err_with(|| format!("parsing mesh {}", path.display()))?;
            Ok(file.into_mesh()?)
        }
        None => Ok(Mesh::layered_grid(&params.geometry, &params.mesh)),
    }
}

fn main() -> eyre::Result<()> {
    env_logger::init_from_env(Env::default().default_filter_or("info"));
    let cli = Cli::parse();

    let params = load_params(&cli)?;
    let mesh = load_mesh(cli.mesh.as_deref(), &params)?;
    let solution = run(&mesh, &params)?;

    for warning in &solution.warnings {
        warn!("{}", warning);
    }
    if !solution.degenerate_elements.is_empty() {
        warn!(
            "degenerate elements skipped: {:?}",
            solution.degenerate_elements
        );
    }

    let summary = Summary {
        max_displacement: solution.max_displacement(),
        max_von_mises: solution.stresses.max_von_mises(),
        min_sigma_yy: solution
            .stresses
            .min_component(StressComponent::SigmaYy)
            .map(|(_, value)| value),
        applied_force_sum: solution.applied_force_sum(),
    };
    info!(
        "contact nodes: {}, applied force: {:.4e} N, min sigma_yy: {:?}",
        solution.contact_nodes.len(),
        summary.applied_force_sum,
        summary.min_sigma_yy
    );

    let report = Report {
        params: &params,
        mesh: MeshFile::from_mesh(&mesh),
        summary,
        nodal_sigma_yy: solution
            .stresses
            .nodal_average(&mesh, StressComponent::SigmaYy),
        solution: &solution,
    };

    if let Some(parent) = cli.output.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&cli.output, serde_json::to_string_pretty(&report)?)
        .wrap_err_with(|| format!("writing {}", cli.output.display()))?;
    info!("results written to {}", cli.output.display());

    Ok(())
}
