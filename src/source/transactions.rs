use std::future::Future;

use crate::{
    error::{source::SourceError, Error},
    model::transaction::Transaction,
    source::{sheets::FETCH_TIMEOUT, TransactionSource},
};

/// Client for the league transactions feed.
///
/// `GET {base}/leagues/{league_id}/transactions` returns the league's whole transaction
/// history as a JSON array. Failures are not retried here; the next poll tries again.
pub struct HttpTransactionSource {
    http: reqwest::Client,
    base_url: String,
    league_id: String,
}

impl HttpTransactionSource {
    pub fn new(base_url: &str, league_id: &str) -> Result<Self, Error> {
        let http = reqwest::Client::builder()
            .timeout(FETCH_TIMEOUT)
            .build()
            .map_err(SourceError::from)?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            league_id: league_id.to_string(),
        })
    }

    pub fn transactions_url(&self) -> String {
        format!("{}/leagues/{}/transactions", self.base_url, self.league_id)
    }

    async fn fetch(&self) -> Result<Vec<Transaction>, Error> {
        let url = self.transactions_url();
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(SourceError::from)?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status {
                url,
                status: status.as_u16(),
            }
            .into());
        }

        let transactions: Vec<Transaction> =
            response.json().await.map_err(SourceError::from)?;

        tracing::debug!("Fetched {} transaction(s) from {}", transactions.len(), url);

        Ok(transactions)
    }
}

impl TransactionSource for HttpTransactionSource {
    fn fetch_transactions(&self) -> impl Future<Output = Result<Vec<Transaction>, Error>> + Send {
        self.fetch()
    }
}
