//! reqwest-backed [`DataService`] talking to the records REST API.

use std::time::Duration;

use reqwest::{Client, Method};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use url::Url;

use super::error::ApiError;
use super::{CollectionKind, CollectionPage, CollectionRequest, DataService, Pagination, RequestPaging};
use crate::config::Config;
use crate::error::{LedgerError, Result};
use crate::types::{
    Consent, ConsentPatch, MedicalRecord, NewConsent, Patient, PlatformStats, Transaction,
};

const CONNECT_TIMEOUT_SECS: u64 = 10;

#[derive(Deserialize)]
struct PatientsBody {
    #[serde(default)]
    patients: Vec<Patient>,
    pagination: Option<Pagination>,
}

#[derive(Deserialize)]
struct ConsentsBody {
    #[serde(default)]
    consents: Vec<Consent>,
}

#[derive(Deserialize)]
struct TransactionsBody {
    #[serde(default)]
    transactions: Vec<Transaction>,
}

#[derive(Deserialize)]
struct RecordsBody {
    #[serde(default)]
    records: Vec<MedicalRecord>,
}

/// Records API client
pub struct HttpDataService {
    client: Client,
    base: Url,
    token: Option<SecretString>,
}

impl HttpDataService {
    /// Create a client from configuration
    ///
    /// Uses the configured request timeout and a 10s connect timeout.
    pub fn from_config(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.api.timeout))
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            base: config.api_base_url()?,
            token: config.api_token(),
        })
    }

    /// Create a client for the given base URL with default timeouts
    pub fn new(base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            base: normalize_base(Url::parse(base_url)?),
            token: None,
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| LedgerError::Config(format!("API URL '{}' cannot be a base", self.base)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn execute<B, T>(
        &self,
        method: Method,
        url: Url,
        body: Option<&B>,
        target: Option<(CollectionKind, &str)>,
    ) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        tracing::debug!(%method, %url, "records API request");

        let mut request = self.client.request(method, url);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token.expose_secret());
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ApiError::from(e).into_ledger_error(target))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(ApiError::from_body(status, &text).into_ledger_error(target));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| LedgerError::Transport(format!("malformed response: {e}")))
    }

    async fn get<T: DeserializeOwned>(
        &self,
        url: Url,
        target: Option<(CollectionKind, &str)>,
    ) -> Result<T> {
        self.execute::<(), T>(Method::GET, url, None, target).await
    }

    fn collection_url(&self, request: &CollectionRequest) -> Result<Url> {
        let mut url = self.endpoint(&[request.kind.path()])?;
        {
            let mut query = url.query_pairs_mut();
            match request.paging {
                RequestPaging::Page { page, page_size } => {
                    query.append_pair("page", &page.to_string());
                    query.append_pair("limit", &page_size.to_string());
                }
                RequestPaging::Listing { limit: Some(limit) } => {
                    query.append_pair("limit", &limit.to_string());
                }
                RequestPaging::Listing { limit: None } => {}
            }
            if let Some(search) = &request.search {
                query.append_pair("search", search);
            }
            for (dimension, value) in &request.filters {
                query.append_pair(query_param(request.kind, dimension), value);
            }
        }
        if url.query() == Some("") {
            url.set_query(None);
        }
        Ok(url)
    }
}

/// Query parameter the backend expects for a filter dimension
fn query_param(kind: CollectionKind, dimension: &str) -> &str {
    match (kind, dimension) {
        (CollectionKind::Transactions, "wallet") => "walletAddress",
        _ => dimension,
    }
}

/// Make sure relative joins append to the base path instead of replacing
/// its last segment.
pub(crate) fn normalize_base(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

#[async_trait::async_trait]
impl DataService for HttpDataService {
    async fn list_patients(&self, request: &CollectionRequest) -> Result<CollectionPage<Patient>> {
        let body: PatientsBody = self.get(self.collection_url(request)?, None).await?;
        Ok(CollectionPage {
            items: body.patients,
            pagination: body.pagination,
        })
    }

    async fn list_consents(&self, request: &CollectionRequest) -> Result<CollectionPage<Consent>> {
        let body: ConsentsBody = self.get(self.collection_url(request)?, None).await?;
        Ok(CollectionPage::listing(body.consents))
    }

    async fn list_transactions(
        &self,
        request: &CollectionRequest,
    ) -> Result<CollectionPage<Transaction>> {
        let body: TransactionsBody = self.get(self.collection_url(request)?, None).await?;
        Ok(CollectionPage::listing(body.transactions))
    }

    async fn patient(&self, id: &str) -> Result<Patient> {
        let url = self.endpoint(&["patients", id])?;
        self.get(url, Some((CollectionKind::Patients, id))).await
    }

    async fn patient_records(&self, patient_id: &str) -> Result<Vec<MedicalRecord>> {
        let url = self.endpoint(&["patients", patient_id, "records"])?;
        let body: RecordsBody = self
            .get(url, Some((CollectionKind::Patients, patient_id)))
            .await?;
        Ok(body.records)
    }

    async fn consent(&self, id: &str) -> Result<Consent> {
        let url = self.endpoint(&["consents", id])?;
        self.get(url, Some((CollectionKind::Consents, id))).await
    }

    async fn create_consent(&self, payload: &NewConsent) -> Result<Consent> {
        let url = self.endpoint(&["consents"])?;
        self.execute(Method::POST, url, Some(payload), None).await
    }

    async fn update_consent(&self, id: &str, patch: &ConsentPatch) -> Result<Consent> {
        let url = self.endpoint(&["consents", id])?;
        self.execute(Method::PATCH, url, Some(patch), Some((CollectionKind::Consents, id)))
            .await
    }

    async fn stats(&self) -> Result<PlatformStats> {
        let url = self.endpoint(&["stats"])?;
        self.get(url, None).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> HttpDataService {
        HttpDataService::new("http://localhost:3001/api").unwrap()
    }

    #[test]
    fn test_endpoint_keeps_base_path() {
        let url = service().endpoint(&["patients", "p-1", "records"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:3001/api/patients/p-1/records");
    }

    #[test]
    fn test_endpoint_escapes_ids() {
        let url = service().endpoint(&["consents", "a/b c"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:3001/api/consents/a%2Fb%20c");
    }

    #[test]
    fn test_patient_page_query() {
        let request = CollectionRequest::new(
            CollectionKind::Patients,
            RequestPaging::Page {
                page: 2,
                page_size: 20,
            },
        )
        .with_search("john doe");
        let url = service().collection_url(&request).unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:3001/api/patients?page=2&limit=20&search=john+doe"
        );
    }

    #[test]
    fn test_transaction_listing_query_maps_wallet() {
        let request = CollectionRequest::new(
            CollectionKind::Transactions,
            RequestPaging::Listing { limit: Some(20) },
        )
        .with_filter("wallet", "0xabc");
        let url = service().collection_url(&request).unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:3001/api/transactions?limit=20&walletAddress=0xabc"
        );
    }

    #[test]
    fn test_unfiltered_listing_has_no_query() {
        let request = CollectionRequest::new(
            CollectionKind::Consents,
            RequestPaging::Listing { limit: None },
        );
        let url = service().collection_url(&request).unwrap();
        assert_eq!(url.as_str(), "http://localhost:3001/api/consents");
    }
}
