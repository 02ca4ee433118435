use alloy_primitives::{Address, U256};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;
use supply_auction_lib::{
    constants::PRICE_SCALE, pricing::bid_cost, Auction, AuctionParameters, InMemoryLedger,
};

/// One bid of a scenario.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ScenarioBid {
    pub bidder: Address,
    pub quantity: U256,
    pub price_per_token: U256,
    /// Seconds after the start of the auction the bid is placed at
    pub offset: u64,
}

/// A complete auction run: who sells what, for how long, and who bids.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub parameters: AuctionParameters,
    pub auctioneer: Address,
    pub asset: Address,
    pub supply: U256,
    pub start_time: u64,
    pub duration: u64,
    pub bids: Vec<ScenarioBid>,
}

impl Scenario {
    pub fn end_time(&self) -> anyhow::Result<u64> {
        self.time_after(self.duration)
    }

    /// Timestamp `offset` seconds after the start of the auction.
    pub fn time_after(&self, offset: u64) -> anyhow::Result<u64> {
        self.start_time
            .checked_add(offset)
            .with_context(|| format!("{} + {} overflows a timestamp", self.start_time, offset))
    }

    /// Creates the auction and a ledger in which every participant holds exactly what the
    /// scenario needs.
    pub fn fund(&self) -> anyhow::Result<Auction<InMemoryLedger>> {
        let mut ledger = InMemoryLedger::new();
        ledger.mint(
            &self.parameters.payment_asset,
            &self.auctioneer,
            self.parameters.collateral_amount,
        );
        ledger.mint(&self.asset, &self.auctioneer, self.supply);
        for bid in self.bids.iter() {
            let cost = bid_cost(bid.quantity, bid.price_per_token)
                .with_context(|| format!("pricing the bid of {}", bid.bidder))?;
            ledger.mint(&self.parameters.payment_asset, &bid.bidder, cost);
        }
        Ok(Auction::new(self.auctioneer, self.parameters.clone(), ledger))
    }
}

/// Reads a scenario from a JSON file.
pub fn load_scenario(path: &Path) -> anyhow::Result<Scenario> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("reading scenario {}", path.display()))?;
    serde_json::from_str(&contents).with_context(|| format!("parsing scenario {}", path.display()))
}

/// Generates a scenario with `num_bids` random bids competing for a random supply.
pub fn random_scenario(num_bids: u32) -> Scenario {
    let duration: u64 = 3_600;
    let bids: Vec<ScenarioBid> = (0..num_bids)
        .map(|_| ScenarioBid {
            bidder: Address::random(),
            quantity: U256::from(rand::random::<u16>() as u64 + 1),
            price_per_token: U256::from(rand::random::<u8>() as u128 % 10 + 1)
                * U256::from(PRICE_SCALE),
            offset: rand::random::<u64>() % duration,
        })
        .collect();

    Scenario {
        parameters: AuctionParameters {
            payment_asset: Address::random(),
            watchdog: Address::random(),
            ..AuctionParameters::default()
        },
        auctioneer: Address::random(),
        asset: Address::random(),
        supply: U256::from(rand::random::<u16>() as u64 * num_bids as u64 / 2 + 1),
        start_time: 1_700_000_000,
        duration,
        bids,
    }
}
