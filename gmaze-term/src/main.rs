use clap::Parser;
use gmaze_term::{
    app::{self, AppError},
    args::Args,
};

fn main() -> Result<(), AppError> {
    let args = Args::parse();

    better_panic::install();

    app::run(args)
}
