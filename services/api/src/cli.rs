use crate::commands::{run_catalog, run_recommend, RecommendArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use packaging_advisor::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Packaging Advisor",
    about = "Recommend the lowest-carbon packaging material for a location and product type",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Resolve a single recommendation against the configured artifacts
    Recommend(RecommendArgs),
    /// List the locations and product types the catalog covers
    Catalog,
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Recommend(args) => run_recommend(args),
        Command::Catalog => run_catalog(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_serve_without_subcommand() {
        let cli = Cli::try_parse_from(["packaging-advisor"]).expect("parses");
        assert!(cli.command.is_none());
    }

    #[test]
    fn parses_recommend_arguments() {
        let cli = Cli::try_parse_from([
            "packaging-advisor",
            "recommend",
            "--location",
            "Gurgaon",
            "--product-type",
            "Electronics",
            "--json",
        ])
        .expect("parses");

        match cli.command {
            Some(Command::Recommend(args)) => {
                assert_eq!(args.location, "Gurgaon");
                assert_eq!(args.product_type, "Electronics");
                assert!(args.json);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn recommend_requires_product_type() {
        let err = Cli::try_parse_from(["packaging-advisor", "recommend", "--location", "Delhi"])
            .expect_err("missing flag rejected");
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }
}
