use std::time::Duration;

use clap::Parser;

use mmp_rs::config::Config;
use mmp_rs::constraint::{Constraint, Relation};
use mmp_rs::error::Error;
use mmp_rs::problem::Problem;
use mmp_rs::reference::Ref;
use mmp_rs::session::Session;

/// Proportionally fair slotted ALOHA with minimum rate constraints.
#[derive(Debug, Parser)]
#[command(author, version)]
struct Cli {
    /// Convergence tolerance.
    #[arg(long, value_name = "FLOAT", default_value = "0.01")]
    precision: f64,

    /// Interpret the tolerance relative to the incumbent.
    #[arg(long)]
    relative: bool,

    /// Enable box reduction.
    #[arg(long)]
    reduce: bool,

    /// Iterations between progress reports.
    #[arg(long, value_name = "INT", default_value = "100000")]
    report: usize,

    /// Time limit (in seconds).
    #[arg(long, value_name = "FLOAT")]
    time_limit: Option<f64>,

    /// Write the objective DAG in DOT format to this file.
    #[arg(long, value_name = "FILE")]
    dot: Option<std::path::PathBuf>,
}

const CK: [f64; 3] = [1.46459273, 3.56878364, 3.5327645];
const RMIN: [f64; 3] = [0.2065572, 0.39122164, 0.33131569];

/// Objective `sum_k ln(r_k)` and the constraint `r >= rmin`, where
/// `r_k = c_k x_k prod_{j != k} (1 - x_j)`.
fn encode(s: &Session, ck: &[f64], rmin: &[f64]) -> Result<(Ref, Ref, Constraint), Error> {
    let dim = ck.len();
    let x = s.mk_var(dim, &[0.0], &[1.0])?;
    let one = s.scalar(1.0)?;
    let idle = s.build(one - x)?;

    let mut others = Vec::with_capacity(dim);
    for k in 0..dim {
        let mut p = one;
        for j in (0..dim).filter(|&j| j != k) {
            p = s.apply_mult(p, s.apply_index(idle, j)?)?;
        }
        others.push(p);
    }

    let cx = s.apply_mult(s.constant(ck)?, x)?;
    let rates = s.apply_mult(cx, s.apply_stack(&others)?)?;
    let objective = s.apply_sum(s.apply_ln(rates)?)?;
    let constraint = s.constraint(Relation::Ge, rates, s.constant(rmin)?)?;
    Ok((objective, x, constraint))
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    simplelog::TermLogger::init(
        simplelog::LevelFilter::Info,
        simplelog::Config::default(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )?;

    let time_total = std::time::Instant::now();

    let args = Cli::parse();
    println!("args = {:?}", args);

    let s = Session::new();
    let (objective, x, constraint) = encode(&s, &CK, &RMIN)?;
    println!("session = {:?}", s);
    println!("objective = {}", s.to_expr_string(objective));
    println!("constraint = {}", constraint);

    if let Some(path) = &args.dot {
        std::fs::write(path, s.to_dot(&[objective])?)?;
        println!("Wrote DOT to {}", path.display());
    }

    let config = Config {
        precision: args.precision,
        relative_tolerance: args.relative,
        disable_reduction: !args.reduce,
        report_interval: args.report,
        console_output: true,
        time_limit: args.time_limit.map(Duration::from_secs_f64),
        ..Config::default()
    };
    let problem = Problem::new(&s, objective, x, &[constraint], config)?;
    let solution = problem.optimize();

    println!("status = {:?}", solution.status);
    println!("value = {}", solution.value);
    println!("bound = {}", solution.bound);
    if let Some(point) = &solution.point {
        println!("point = {:?}", point);
        println!("rates = {:?}", s.evaluate(constraint.left(), point, point)?);
    }
    println!(
        "iterations = {} (last update at {})",
        solution.iterations, solution.last_update
    );

    let time_total = time_total.elapsed();
    println!("Done in {:.3} s", time_total.as_secs_f64());

    Ok(())
}
