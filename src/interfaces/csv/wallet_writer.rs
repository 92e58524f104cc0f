use crate::domain::wallet::WalletRecord;
use crate::error::Result;
use std::io::Write;

/// Writes wallet rows as CSV with an `id,owner_id,balance` header.
pub struct WalletWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> WalletWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    pub fn write_wallets<I>(&mut self, wallets: I) -> Result<()>
    where
        I: IntoIterator<Item = WalletRecord>,
    {
        let mut wrote_any = false;
        for wallet in wallets {
            self.writer.serialize(wallet)?;
            wrote_any = true;
        }
        if !wrote_any {
            self.writer.write_record(["id", "owner_id", "balance"])?;
        }
        self.writer.flush()?;
        Ok(())
    }
}
