use std::path::PathBuf;

use clap::Parser;
use gmaze::algorithms::Algorithm;

#[derive(Parser, Debug, Default)]
#[clap(version, about, name = "gmaze")]
pub struct Args {
    #[clap(short, long, help = "Number of rows")]
    pub rows: Option<i32>,
    #[clap(short, long, help = "Number of columns")]
    pub columns: Option<i32>,
    #[clap(long, help = "Cell size passed to the renderer")]
    pub cell_size: Option<i32>,
    #[clap(short, long, help = "Delay between steps in milliseconds, 0 turns animation off")]
    pub delay: Option<u64>,
    #[clap(short, long, help = "Generation algorithm, random by weights when omitted")]
    pub algorithm: Option<Algorithm>,
    #[clap(short, long, help = "Seed to replay a maze")]
    pub seed: Option<u64>,
    #[clap(long, action, help = "Only generate, don't solve")]
    pub no_solve: bool,
    #[clap(long, help = "Config file in RON format")]
    pub config: Option<PathBuf>,
    #[clap(short, long, action, help = "Show debug logs")]
    pub verbose: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_flags() {
        let args = Args::parse_from([
            "gmaze",
            "-r",
            "12",
            "--columns",
            "30",
            "-a",
            "hunt_and_kill",
            "--seed",
            "5",
            "--no-solve",
        ]);

        assert_eq!(args.rows, Some(12));
        assert_eq!(args.columns, Some(30));
        assert_eq!(args.algorithm, Some(Algorithm::HuntAndKill));
        assert_eq!(args.seed, Some(5));
        assert!(args.no_solve);
        assert!(!args.verbose);
    }

    #[test]
    fn rejects_unknown_algorithm() {
        assert!(Args::try_parse_from(["gmaze", "--algorithm", "kruskal"]).is_err());
    }
}
