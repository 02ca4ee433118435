pub mod multihash;
