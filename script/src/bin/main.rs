//! Runs a supply auction end to end against an in-memory ledger and prints every event it
//! emits as one JSON object per line.
//!
//! You can run this script using the following command:
//! ```shell
//! RUST_LOG=info cargo run --release -- --scenario demos/scenario.json --path claims
//! ```
//! or, with a randomly generated scenario:
//! ```shell
//! RUST_LOG=debug cargo run --release -- --path direct --n 50
//! ```

use alloy_primitives::Address;
use anyhow::{ensure, Context};
use clap::{Parser, ValueEnum};
use claim_tree::ClaimTree;
use std::path::PathBuf;
use supply_auction_lib::{
    hashing::keccak256, pricing::bid_cost, Auction, CallContext, ClaimRequest, InMemoryLedger,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[path = "../lib/input.rs"]
mod input;

use input::Scenario;

/// How the auction is closed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum SettlementMode {
    /// Settle the book on-engine in one call
    Direct,
    /// Commit a result root and let every bidder claim against it
    Claims,
}

/// The arguments for the command.
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// JSON scenario to run; a random one is generated when missing
    #[clap(long, env = "SUPPLY_AUCTION_SCENARIO")]
    scenario: Option<PathBuf>,

    #[clap(long, value_enum, default_value = "direct")]
    path: SettlementMode,

    /// Number of bids in a generated scenario
    #[clap(long, default_value = "20")]
    n: u32,
}

fn main() -> anyhow::Result<()> {
    // Setup the logger.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    // Parse the command line arguments.
    let args = Args::parse();

    let scenario: Scenario = match args.scenario.as_deref() {
        Some(path) => input::load_scenario(path)?,
        None => input::random_scenario(args.n),
    };
    let mut auction = scenario.fund()?;

    auction
        .start(
            &CallContext::new(scenario.auctioneer, scenario.start_time),
            scenario.asset,
            scenario.supply,
            scenario.duration,
        )
        .context("starting the auction")?;

    let mut bids = scenario.bids.clone();
    bids.sort_by_key(|bid| bid.offset);
    for bid in bids.iter() {
        let payment = bid_cost(bid.quantity, bid.price_per_token)?;
        auction
            .place_bid(
                &CallContext::new(bid.bidder, scenario.time_after(bid.offset)?),
                bid.quantity,
                bid.price_per_token,
                payment,
            )
            .with_context(|| format!("placing the bid of {}", bid.bidder))?;
    }
    info!(bids = auction.state().book.len(), "bidding closed");

    match args.path {
        SettlementMode::Direct => auction
            .finalize(&CallContext::new(scenario.auctioneer, scenario.end_time()?))
            .context("settling the auction")?,
        SettlementMode::Claims => run_claims(&mut auction, &scenario)?,
    }

    for event in auction.events() {
        println!("{}", serde_json::to_string(event)?);
    }

    let ledger = auction.ledger();
    info!(
        proceeds = %ledger.balance_of(&scenario.parameters.payment_asset, &scenario.auctioneer),
        unsold = %ledger.balance_of(&scenario.asset, &scenario.auctioneer),
        escrowed_payment = %ledger.escrowed(&scenario.parameters.payment_asset),
        escrowed_asset = %ledger.escrowed(&scenario.asset),
        "auction complete"
    );
    Ok(())
}

/// Closes the auction through a committed result: builds the claim tree off-engine, commits
/// its root, waits out the verification window and claims every entry in serial order.
fn run_claims(auction: &mut Auction<InMemoryLedger>, scenario: &Scenario) -> anyhow::Result<()> {
    let result = auction.result_set();
    let tree = ClaimTree::new(&result.leaf_hashes(&keccak256));
    let pointer = result
        .content_pointer(&keccak256)
        .context("serializing the result set")?;
    info!(
        root = %tree.root(),
        pointer = %hex::encode(pointer.to_multihash_bytes()),
        leaves = tree.size(),
        "result tree built"
    );

    let end_time = scenario.end_time()?;
    auction
        .submit_result(
            &CallContext::new(scenario.auctioneer, end_time),
            tree.root(),
            pointer,
            result.total_allocated(),
        )
        .context("submitting the result")?;

    let deadline = auction
        .state()
        .verification_deadline
        .context("no verification deadline after submission")?;
    let claims_open = deadline
        .checked_add(1)
        .context("verification deadline overflows a timestamp")?;
    auction
        .finalize(&CallContext::new(scenario.auctioneer, claims_open))
        .context("ending the auction")?;

    for allocation in result.allocations.iter() {
        let proof = tree.generate_proof(allocation.serial as usize)?;
        ensure!(
            ClaimTree::verify_proof(&proof),
            "proof for serial {} does not match the tree",
            allocation.serial
        );
        auction
            .claim(
                &CallContext::new(Address::ZERO, claims_open),
                ClaimRequest {
                    claimant: allocation.bidder,
                    quantity: allocation.quantity,
                    serial: allocation.serial,
                    proof: proof.siblings,
                },
            )
            .with_context(|| format!("claiming serial {}", allocation.serial))?;
    }
    Ok(())
}
