// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// Entry point for all user interaction, parsed with clap.
// All business logic is delegated to Layer 2 (application).
//
// Two commands are supported:
//   1. `train`   — trains the classifier on MNIST IDX files
//   2. `predict` — loads an artifact and classifies one image
//
// Reference: Rust Book §7 (Modules), §12 (CLI programs)

pub mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, PredictArgs, TrainArgs};

#[derive(Parser, Debug)]
#[command(
    name = "digit-recognizer",
    version,
    about = "Train a convolutional handwritten-digit classifier, then classify images with it."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Train(args)   => run_train(args),
            Commands::Predict(args) => run_predict(args),
        }
    }
}

fn run_train(args: TrainArgs) -> Result<()> {
    use crate::application::train_use_case::TrainUseCase;

    tracing::info!("Starting training on MNIST files in: {}", args.data_dir);

    let use_case = TrainUseCase::new(args.into());
    let report   = use_case.execute()?;

    if report.diverged {
        println!("Training finished, but the loss diverged. Artifact saved anyway.");
    } else {
        println!("Training complete. Artifact saved to {}", use_case.config().artifact);
    }
    Ok(())
}

fn run_predict(args: PredictArgs) -> Result<()> {
    use crate::application::predict_use_case::PredictUseCase;

    let use_case   = PredictUseCase::new(&args.artifact, args.invert)?;
    let prediction = use_case.predict_file(&args.image)?;
    println!("{prediction}");
    Ok(())
}
