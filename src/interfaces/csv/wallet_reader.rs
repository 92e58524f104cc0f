use crate::domain::wallet::{Wallet, WalletRecord};
use crate::error::{Result, WalletError};
use std::io::Read;

/// Reads wallet seed rows (`id,owner_id,balance`) from CSV.
///
/// Every row is checked through [`Wallet`] before it is handed out, so a
/// negative balance or non-positive id never reaches the store from here.
pub struct WalletReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> WalletReader<R> {
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(source);
        Self { reader }
    }

    pub fn wallets(self) -> impl Iterator<Item = Result<Wallet>> {
        self.reader.into_deserialize().map(|result| {
            let record: WalletRecord = result.map_err(WalletError::from)?;
            Wallet::try_from(record)
        })
    }
}
