pub mod transfer_reader;
pub mod wallet_reader;
pub mod wallet_writer;
