use crate::error::{Result, WalletError};
use crate::interfaces::request::TransferRequest;
use std::io::Read;

/// Reads transfer requests from a CSV source with a `sender,recipient,amount` header.
///
/// This reader wraps `csv::Reader` and provides an iterator over `Result<TransferRequest>`.
/// It handles whitespace trimming and flexible record lengths automatically.
pub struct TransferReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> TransferReader<R> {
    /// Creates a new `TransferReader` from any `Read` source (e.g., File, Stdin).
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Returns an iterator that lazily reads and deserializes requests.
    pub fn requests(self) -> impl Iterator<Item = Result<TransferRequest>> {
        self.reader
            .into_deserialize()
            .map(|result| result.map_err(WalletError::from))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reader_valid_stream() {
        let data = "sender, recipient, amount\n1, 2, 3000\n2, 3, 1";
        let reader = TransferReader::new(data.as_bytes());
        let results: Vec<Result<TransferRequest>> = reader.requests().collect();

        assert_eq!(results.len(), 2);
        let first = results[0].as_ref().unwrap();
        assert_eq!(
            *first,
            TransferRequest {
                sender: 1,
                recipient: 2,
                amount: 3000
            }
        );
    }

    #[test]
    fn test_reader_keeps_negative_amounts_for_validation() {
        let data = "sender, recipient, amount\n1, 2, -5";
        let reader = TransferReader::new(data.as_bytes());
        let request = reader.requests().next().unwrap().unwrap();
        assert_eq!(request.amount, -5);
    }

    #[test]
    fn test_reader_malformed_line() {
        let data = "sender, recipient, amount\n1, abc, 10\n1, 2, 12.5";
        let reader = TransferReader::new(data.as_bytes());
        let results: Vec<Result<TransferRequest>> = reader.requests().collect();

        assert!(results[0].is_err());
        assert!(results[1].is_err());
    }
}
