// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// Entry point for all user interaction. Parses arguments with
// clap and routes each subcommand to its use case in Layer 2.
// Printing results happens here and nowhere else.
//
// Reference: Rust Book §7 (Modules), §12 (CLI programs)

pub mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, EvaluateArgs, InitArgs, InterpolateArgs, SequenceArgs};

#[derive(Parser, Debug)]
#[command(
    name = "ifnet-interp",
    version,
    about = "Video frame interpolation with IFNet on the Burn framework."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Init(args)        => run_init(args),
            Commands::Interpolate(args) => run_interpolate(args),
            Commands::Sequence(args)    => run_sequence(args),
            Commands::Evaluate(args)    => run_evaluate(args),
        }
    }
}

fn run_init(args: InitArgs) -> Result<()> {
    use crate::application::init_use_case::InitUseCase;

    let dir    = args.checkpoint_dir.clone();
    let params = InitUseCase::new(args.into()).execute()?;
    println!("Checkpoint written to '{}' ({} parameters).", dir, params);
    Ok(())
}

fn run_interpolate(args: InterpolateArgs) -> Result<()> {
    use crate::application::interpolate_use_case::InterpolateUseCase;

    tracing::info!(
        "Interpolating between '{}' and '{}'",
        args.frame0.display(),
        args.frame1.display()
    );
    let use_case = InterpolateUseCase::new(args.model.to_config()?);
    use_case.run_pair(args.frame0, args.frame1, args.output.clone())?;

    println!("Middle frame written to '{}'.", args.output.display());
    Ok(())
}

fn run_sequence(args: SequenceArgs) -> Result<()> {
    use crate::application::interpolate_use_case::InterpolateUseCase;

    let use_case = InterpolateUseCase::new(args.model.to_config()?);
    let report   = use_case.run_sequence(args.input_dir, args.output_dir.clone(), args.multiplier)?;

    println!(
        "{} input frames → {} output frames in '{}'.",
        report.input_frames,
        report.output_frames,
        args.output_dir.display()
    );
    Ok(())
}

fn run_evaluate(args: EvaluateArgs) -> Result<()> {
    use crate::application::evaluate_use_case::EvaluateUseCase;

    let summary = EvaluateUseCase::new(args.to_config()?).execute()?;
    println!(
        "Triplets: {} | PSNR: {:.3} dB | MAE: {:.5} | {:.1} ms/frame",
        summary.samples,
        summary.mean_psnr,
        summary.mean_mae,
        summary.mean_elapsed_ms,
    );
    Ok(())
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::device::ComputeBackend;

    #[test]
    fn test_parse_interpolate_flags() {
        let cli = Cli::try_parse_from([
            "ifnet-interp", "interpolate",
            "--frame0", "a.png", "--frame1", "b.png",
            "--scale", "0.5", "--no-ensemble", "--backend", "cpu",
        ])
        .unwrap();

        let Commands::Interpolate(args) = cli.command else {
            panic!("expected interpolate");
        };
        let cfg = args.model.to_config().unwrap();
        assert_eq!(cfg.backend, ComputeBackend::Cpu);
        assert_eq!(cfg.settings.scale, 0.5);
        assert!(!cfg.settings.ensemble);
        assert!(!cfg.settings.auto_scale);
    }

    #[test]
    fn test_bad_scale_is_rejected_at_config_time() {
        let cli = Cli::try_parse_from([
            "ifnet-interp", "evaluate", "--scale", "0.3",
        ])
        .unwrap();
        let Commands::Evaluate(args) = cli.command else {
            panic!("expected evaluate");
        };
        assert!(args.to_config().is_err());
    }

    #[test]
    fn test_init_defaults() {
        let cli = Cli::try_parse_from(["ifnet-interp", "init"]).unwrap();
        let Commands::Init(args) = cli.command else {
            panic!("expected init");
        };
        assert_eq!(args.channels, 90);
        assert!(!args.force);
    }
}
