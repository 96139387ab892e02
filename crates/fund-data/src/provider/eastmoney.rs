//! Eastmoney fund data provider.
//!
//! Fetches NAV history from the Eastmoney open endpoints:
//! - NAV history via `FundNetValue/GetFundNetValueList` (paged JSON)
//! - Fund profile via the `fundgz` JSONP quote endpoint
//!
//! Eastmoney rejects requests without a fund referer header, so the client is
//! built with the headers the site itself sends.

use async_trait::async_trait;
use chrono::NaiveDate;
use log::{debug, warn};
use reqwest::header::{HeaderMap, HeaderValue, REFERER, USER_AGENT};
use reqwest::{Client, StatusCode};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::str::FromStr;
use std::time::Duration;

use crate::errors::FundDataError;
use crate::models::{FundProfile, NavQuote};
use crate::provider::FundDataProvider;

const NAV_HISTORY_URL: &str =
    "https://fundsuggest.eastmoney.com/LCAPI/FundNetValue/GetFundNetValueList";
const PROFILE_URL_PREFIX: &str = "https://fundgz.1234567.com.cn/js/";
const REFERER_URL: &str = "https://fund.eastmoney.com/";
const PROVIDER_ID: &str = "EASTMONEY";

/// NAV rows per page. The endpoint caps pages at 50 rows.
const PAGE_SIZE: usize = 50;

/// Eastmoney fund data provider.
pub struct EastmoneyProvider {
    client: Client,
}

// ============================================================================
// Response structures
// ============================================================================

#[derive(Debug, Deserialize)]
struct NavHistoryResponse {
    #[serde(rename = "Data")]
    data: Option<NavHistoryData>,
    #[serde(rename = "TotalCount")]
    total_count: Option<usize>,
    #[serde(rename = "ErrCode")]
    err_code: Option<i64>,
    #[serde(rename = "ErrMsg")]
    err_msg: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NavHistoryData {
    #[serde(rename = "LSJZList", default)]
    rows: Vec<NavRow>,
}

/// A single row of the LSJZ (historical NAV) table.
#[derive(Debug, Deserialize)]
struct NavRow {
    /// Publication date, "YYYY-MM-DD".
    #[serde(rename = "FSRQ")]
    date: String,
    /// Unit NAV.
    #[serde(rename = "DWJZ")]
    nav: String,
    /// Accumulated NAV.
    #[serde(rename = "LJJZ", default)]
    accumulated_nav: Option<String>,
    /// Daily growth rate in percent.
    #[serde(rename = "JZZZL", default)]
    daily_return_pct: Option<String>,
}

/// Body of the fundgz JSONP payload.
#[derive(Debug, Deserialize)]
struct ProfilePayload {
    #[serde(rename = "fundcode")]
    fund_code: String,
    name: String,
}

impl EastmoneyProvider {
    pub fn new() -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(REFERER, HeaderValue::from_static(REFERER_URL));
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static("Mozilla/5.0 (Windows NT 10.0; Win64; x64)"),
        );

        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_default();

        Self { client }
    }

    fn map_request_error(&self, err: reqwest::Error) -> FundDataError {
        if err.is_timeout() {
            FundDataError::Timeout {
                provider: PROVIDER_ID.to_string(),
            }
        } else if err.status() == Some(StatusCode::TOO_MANY_REQUESTS) {
            FundDataError::RateLimited {
                provider: PROVIDER_ID.to_string(),
            }
        } else {
            FundDataError::Network(err)
        }
    }

    /// Fetches one page of NAV history. Returns the parsed rows plus the total
    /// row count the endpoint reports for the range.
    async fn fetch_page(
        &self,
        fund_id: &str,
        start: NaiveDate,
        end: NaiveDate,
        page_index: usize,
    ) -> Result<(Vec<NavQuote>, usize), FundDataError> {
        let response = self
            .client
            .get(NAV_HISTORY_URL)
            .query(&[
                ("fundCode", fund_id),
                ("pageIndex", &page_index.to_string()),
                ("pageSize", &PAGE_SIZE.to_string()),
                ("startDate", &start.format("%Y-%m-%d").to_string()),
                ("endDate", &end.format("%Y-%m-%d").to_string()),
            ])
            .send()
            .await
            .map_err(|e| self.map_request_error(e))?;

        if response.status() == StatusCode::TOO_MANY_REQUESTS {
            return Err(FundDataError::RateLimited {
                provider: PROVIDER_ID.to_string(),
            });
        }

        let body: NavHistoryResponse = response
            .json()
            .await
            .map_err(|e| FundDataError::InvalidResponse(e.to_string()))?;

        if let Some(code) = body.err_code {
            if code != 0 {
                let message = body.err_msg.unwrap_or_else(|| format!("ErrCode {}", code));
                return Err(FundDataError::Provider {
                    provider: PROVIDER_ID.to_string(),
                    message,
                });
            }
        }

        let data = body
            .data
            .ok_or_else(|| FundDataError::FundNotFound(fund_id.to_string()))?;

        let mut quotes = Vec::with_capacity(data.rows.len());
        for row in data.rows {
            match parse_nav_row(fund_id, &row) {
                Ok(quote) => quotes.push(quote),
                Err(e) => {
                    // A single unparseable row (suspended fund, placeholder "--")
                    // is dropped rather than failing the whole page.
                    warn!("Skipping NAV row {} for fund {}: {}", row.date, fund_id, e);
                }
            }
        }

        Ok((quotes, body.total_count.unwrap_or(0)))
    }
}

impl Default for EastmoneyProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FundDataProvider for EastmoneyProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    async fn fund_profile(&self, fund_id: &str) -> Result<FundProfile, FundDataError> {
        let url = format!("{}{}.js", PROFILE_URL_PREFIX, fund_id);
        let text = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| self.map_request_error(e))?
            .text()
            .await
            .map_err(|e| self.map_request_error(e))?;

        // Unknown fund codes come back as an empty JSONP call.
        let json = parse_jsonp(&text).ok_or_else(|| FundDataError::FundNotFound(fund_id.to_string()))?;
        let payload: ProfilePayload = serde_json::from_str(json)
            .map_err(|e| FundDataError::InvalidResponse(e.to_string()))?;

        Ok(FundProfile {
            fund_id: payload.fund_code,
            name: payload.name,
            // The quote endpoint does not carry inception data; callers fall
            // back to a bounded backfill window when this is absent.
            inception_date: None,
            fund_type: None,
            company: None,
        })
    }

    async fn nav_history(
        &self,
        fund_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<NavQuote>, FundDataError> {
        let mut quotes: Vec<NavQuote> = Vec::new();
        let mut page_index = 1;

        loop {
            let (page, total) = self.fetch_page(fund_id, start, end, page_index).await?;
            let page_len = page.len();
            quotes.extend(page);

            debug!(
                "Eastmoney NAV page {} for {}: {} rows ({} / {})",
                page_index,
                fund_id,
                page_len,
                quotes.len(),
                total
            );

            if page_len < PAGE_SIZE || quotes.len() >= total {
                break;
            }
            page_index += 1;
        }

        if quotes.is_empty() {
            return Err(FundDataError::NoData);
        }

        // The endpoint returns newest first; callers expect ascending dates.
        quotes.sort_by_key(|q| q.date);
        Ok(quotes)
    }
}

fn parse_nav_row(fund_id: &str, row: &NavRow) -> Result<NavQuote, String> {
    let date = NaiveDate::parse_from_str(&row.date, "%Y-%m-%d")
        .map_err(|e| format!("bad date '{}': {}", row.date, e))?;
    let nav = Decimal::from_str(&row.nav).map_err(|e| format!("bad NAV '{}': {}", row.nav, e))?;
    if nav.is_sign_negative() {
        return Err(format!("negative NAV '{}'", row.nav));
    }

    let accumulated_nav = row
        .accumulated_nav
        .as_deref()
        .and_then(|s| Decimal::from_str(s).ok());
    let daily_return = row
        .daily_return_pct
        .as_deref()
        .and_then(|s| Decimal::from_str(s).ok())
        .map(|pct| pct / Decimal::ONE_HUNDRED);

    Ok(NavQuote {
        fund_id: fund_id.to_string(),
        date,
        nav,
        accumulated_nav,
        daily_return,
    })
}

/// Extracts the JSON body out of a `jsonpgz({...});` style payload.
/// Returns None when the call carries no argument.
fn parse_jsonp(text: &str) -> Option<&str> {
    let start = text.find('(')? + 1;
    let end = text.rfind(')')?;
    let body = text[start..end].trim();
    if body.is_empty() {
        None
    } else {
        Some(body)
    }
}
