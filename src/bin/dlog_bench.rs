use std::process::ExitCode;
use std::time::Instant;

use clap::{Args, Parser, Subcommand};
use dlog_zkpok::channel::{
    prove_dlog_equality, prove_schnorr, verify_dlog_equality, verify_dlog_equality_blinded,
    verify_schnorr,
};
use dlog_zkpok::{
    generate_parameters, random_generator, BlindedVerdict, BlindedVerifier, EqualityProver,
    EqualityStatement, EqualityVerifier, GroupParameters, InProcessChannel, ProtocolVariant,
    SchnorrProver, SchnorrVerifier, SecureRng, Witness,
};
use tracing::{error, info};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Secret every benchmark proves knowledge of, reduced modulo `q`.
const SECRET: u32 = 200;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Parser)]
#[command(name = "dlog-bench")]
#[command(about = "Times discrete-log proofs and prints one CSV line", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Clone, Copy)]
struct Sizes {
    /// Bit length of the subgroup order q (multiple of 8)
    #[arg(short = 'N', long = "subgroup-bits", default_value_t = 8)]
    subgroup_bits: usize,

    /// Bit length of the modulus p (multiple of 8, greater than N)
    #[arg(short = 'L', long = "modulus-bits", default_value_t = 16)]
    modulus_bits: usize,
}

#[derive(Subcommand)]
enum Commands {
    /// Schnorr identification; prints `Protocol, N, L, TimeNs, Q, P, G`
    Schnorr {
        /// Sigma, ZKP or ZKPOK
        #[arg(long = "prot", default_value = "ZKPOK")]
        variant: ProtocolVariant,

        #[command(flatten)]
        sizes: Sizes,
    },

    /// Plain equality proof; prints `N, L, TimeNs, Q, P, G`
    Equality {
        #[command(flatten)]
        sizes: Sizes,
    },

    /// Blinded equality proof; prints `N, L, ProofTimeNs, VerifyTimeNs, Q, P, G`
    Blinded {
        #[command(flatten)]
        sizes: Sizes,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let result = match cli.command {
        Commands::Schnorr { variant, sizes } => run_schnorr(variant, sizes).await,
        Commands::Equality { sizes } => run_equality(sizes).await,
        Commands::Blinded { sizes } => run_blinded(sizes).await,
    };

    match result {
        Ok(line) => {
            println!("{line}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("benchmark failed: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run_schnorr(variant: ProtocolVariant, sizes: Sizes) -> Result<String, BoxError> {
    let params = generate_parameters(sizes.subgroup_bits, sizes.modulus_bits)?;
    let witness = Witness::from_integer(&params, &SECRET.into());
    let prover = SchnorrProver::new(params.clone(), variant, witness);
    let verifier = SchnorrVerifier::new(params.clone(), variant);
    let (mut prover_end, mut verifier_end) = InProcessChannel::pair();

    let start = Instant::now();
    let verifier_task = tokio::task::spawn_blocking(move || {
        verify_schnorr(&mut verifier_end, verifier, &mut SecureRng::new())
    });
    let prover_task = tokio::task::spawn_blocking(move || {
        prove_schnorr(&mut prover_end, prover, &mut SecureRng::new())
    });
    let (verified, proved) = tokio::try_join!(verifier_task, prover_task)?;
    let elapsed = start.elapsed().as_nanos();

    verified?.into_result()?;
    proved?.into_result()?;
    info!(%variant, elapsed_ns = elapsed, "schnorr proof accepted");

    Ok(format!(
        "{variant}, {}, {}, {elapsed}, {}",
        sizes.subgroup_bits,
        sizes.modulus_bits,
        group_columns(&params)
    ))
}

async fn run_equality(sizes: Sizes) -> Result<String, BoxError> {
    let (params, statement, witness) = equality_setup(sizes)?;
    let prover = EqualityProver::new(params.clone(), statement.clone(), witness)?;
    let verifier = EqualityVerifier::new(params.clone(), statement)?;
    let (mut prover_end, mut verifier_end) = InProcessChannel::pair();

    let start = Instant::now();
    let verifier_task = tokio::task::spawn_blocking(move || {
        verify_dlog_equality(&mut verifier_end, verifier, &mut SecureRng::new())
    });
    let prover_task = tokio::task::spawn_blocking(move || {
        prove_dlog_equality(&mut prover_end, prover, &mut SecureRng::new())
    });
    let (verified, proved) = tokio::try_join!(verifier_task, prover_task)?;
    let elapsed = start.elapsed().as_nanos();

    verified?.into_result()?;
    proved?.into_result()?;
    info!(elapsed_ns = elapsed, "dlog equality proof accepted");

    Ok(format!(
        "{}, {}, {elapsed}, {}",
        sizes.subgroup_bits,
        sizes.modulus_bits,
        group_columns(&params)
    ))
}

async fn run_blinded(sizes: Sizes) -> Result<String, BoxError> {
    let (params, statement, witness) = equality_setup(sizes)?;
    let prover = EqualityProver::new(params.clone(), statement.clone(), witness)?;
    let verifier = BlindedVerifier::new(params.clone(), statement)?;
    let (mut prover_end, mut verifier_end) = InProcessChannel::pair();

    let start = Instant::now();
    let verifier_task = tokio::task::spawn_blocking(move || {
        verify_dlog_equality_blinded(&mut verifier_end, verifier, &mut SecureRng::new())
    });
    let prover_task = tokio::task::spawn_blocking(move || {
        prove_dlog_equality(&mut prover_end, prover, &mut SecureRng::new())
    });
    let (verified, proved) = tokio::try_join!(verifier_task, prover_task)?;
    let proof_elapsed = start.elapsed().as_nanos();

    proved?.into_result()?;
    let transcript = match verified? {
        BlindedVerdict::Accepted(transcript) => transcript,
        BlindedVerdict::Rejected => return Err("blinded equality proof rejected".into()),
    };

    let start = Instant::now();
    let reverified = transcript.verify(&params)?;
    let verify_elapsed = start.elapsed().as_nanos();
    reverified.into_result()?;
    info!(
        proof_ns = proof_elapsed,
        verify_ns = verify_elapsed,
        "blinded transcript published and re-verified"
    );

    Ok(format!(
        "{}, {}, {proof_elapsed}, {verify_elapsed}, {}",
        sizes.subgroup_bits,
        sizes.modulus_bits,
        group_columns(&params)
    ))
}

/// Generates a group with two distinct generators and the statement for
/// [`SECRET`].
fn equality_setup(
    sizes: Sizes,
) -> Result<(GroupParameters, EqualityStatement, Witness), BoxError> {
    let mut rng = SecureRng::new();
    let params = generate_parameters(sizes.subgroup_bits, sizes.modulus_bits)?;
    let g1 = random_generator(&params, &mut rng)?;
    let g2 = loop {
        let candidate = random_generator(&params, &mut rng)?;
        if candidate != g1 {
            break candidate;
        }
    };

    let witness = Witness::from_integer(&params, &SECRET.into());
    let statement = EqualityStatement::from_witness(&params, &witness, g1, g2)?;
    Ok((params, statement, witness))
}

fn group_columns(params: &GroupParameters) -> String {
    format!("{}, {}, {}", params.q(), params.p(), params.g())
}
