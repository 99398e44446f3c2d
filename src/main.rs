use anyhow::{Context, Result, bail};
use clap::Parser;
use log::info;

use larkspur::contraction::Ordering;
use larkspur::graph::Graph;
use larkspur::ids::NodeId;
use larkspur::io::config::Configs;
use larkspur::io::demands::Demands;
use larkspur::io::graph_reader::GraphReader;
use larkspur::io::specif::Specif;
use larkspur::query::SchQuery;
use larkspur::spotar::Spotar;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(clap::Subcommand, Debug)]
enum Command {
    /// Build the node hierarchy and contract the graph
    Contract {
        /// Instance specification file
        #[arg(long)]
        specif: String,
        /// Instance edge file
        #[arg(long)]
        edges: String,
        /// Contraction cost coefficients file
        #[arg(long)]
        config: String,
        /// Output node ordering file
        #[arg(long)]
        hierarchy: String,
        /// Output contracted edge file
        #[arg(long)]
        shortcuts: String,
        /// Worker threads for the simulation rounds, 0 keeps the default
        #[arg(long, default_value_t = 0)]
        threads: usize,
    },
    /// Answer point-to-point queries on a contracted graph
    Query {
        #[arg(long)]
        specif: String,
        /// Contracted edge file produced by `contract`
        #[arg(long)]
        shortcuts: String,
        /// Node ordering file produced by `contract`
        #[arg(long)]
        hierarchy: String,
        /// Origin/destination demand file
        #[arg(long)]
        demands: String,
        /// Directory receiving one policy and one path file per query
        #[arg(long)]
        output: String,
    },
    /// Compute one-to-all Pareto frontiers on the original graph
    Spotar {
        #[arg(long)]
        specif: String,
        #[arg(long)]
        edges: String,
        /// Destination node of the backward search
        #[arg(long)]
        destination: u32,
    },
    /// Draw a random set of origin/destination demands
    GenDemands {
        #[arg(long)]
        specif: String,
        #[arg(long)]
        nb_queries: i64,
        /// Largest admissible time budget
        #[arg(long)]
        tmax: u32,
        #[arg(long)]
        output: String,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    match args.cmd {
        Command::Contract { specif, edges, config, hierarchy, shortcuts, threads } => {
            let specif = Specif::read(&specif)?;
            let configs = Configs::read(&config)?;
            let instance_edges = GraphReader::read(&edges, &specif, false)?;
            if instance_edges.is_empty() {
                bail!("empty graph in {}", edges);
            }
            let mut graph = Graph::new(instance_edges, specif);
            let mut ordering = Ordering::new(&mut graph);
            ordering.set_config(configs.first());
            ordering.run(threads)?;
            ordering.write_ordering(&hierarchy, &shortcuts)?;
        }
        Command::Query { specif, shortcuts, hierarchy, demands, output } => {
            let specif = Specif::read(&specif)?;
            let demands = Demands::read(&demands, specif.nb_nodes())?;
            let contracted = GraphReader::read(&shortcuts, &specif, true)?;
            let mut graph = Graph::new(contracted, specif);
            graph.set_hierarchy(&hierarchy)?;
            std::fs::create_dir_all(&output)
                .with_context(|| format!("creating output directory {}", output))?;
            let mut query = SchQuery::new(&graph);
            let mut nb_paths = Vec::with_capacity(demands.demands().len());
            for (index, demand) in demands.demands().iter().enumerate() {
                let (source, destination) = demand.od();
                let policy = query.one_to_one(source, destination);
                nb_paths.push(policy.nb_paths());
                policy.serialize(
                    &format!("{}/policy_{}.txt", output, index),
                    &format!("{}/paths_{}.txt", output, index),
                )?;
            }
            let max = nb_paths.iter().max().copied().unwrap_or(0);
            let mean = nb_paths.iter().sum::<usize>() as f64 / nb_paths.len().max(1) as f64;
            info!(
                "{} queries answered, {:.2} local-reliable paths on average (max {})",
                nb_paths.len(),
                mean,
                max
            );
        }
        Command::Spotar { specif, edges, destination } => {
            let specif = Specif::read(&specif)?;
            let instance_edges = GraphReader::read(&edges, &specif, false)?;
            let graph = Graph::new(instance_edges, specif);
            let mut spotar = Spotar::new(&graph, NodeId(destination));
            let policies = spotar.run();
            let lr_total: usize = policies.values().map(|p| p.nb_lr_paths()).sum();
            info!(
                "{} nodes reach node {}, {} local-reliable paths in total",
                policies.len(),
                destination,
                lr_total
            );
        }
        Command::GenDemands { specif, nb_queries, tmax, output } => {
            let specif = Specif::read(&specif)?;
            let demands = Demands::generate(nb_queries, specif.nb_nodes(), tmax);
            demands.serialize(&output)?;
        }
    }
    Ok(())
}
