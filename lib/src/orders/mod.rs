pub mod bids;
pub mod book;

pub use bids::{Bid, PriorityKey};
pub use book::{BidBook, BookIter};
