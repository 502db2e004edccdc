use crate::scrapers::PriceQuote;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Response body for a price lookup, amounts in won
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RtechPriceDto {
    pub address: String,
    pub sale_lower_avg: Option<u64>,
    pub sale_upper_avg: Option<u64>,
    pub rent_lower_avg: Option<u64>,
    pub rent_upper_avg: Option<u64>,
    pub source_url: Option<String>,
    pub error: Option<String>,
    pub scraped_at: DateTime<Utc>,
}

impl RtechPriceDto {
    pub fn from_quote(address: &str, quote: PriceQuote) -> Self {
        Self {
            address: address.to_string(),
            sale_lower_avg: quote.prices.sale_lower_avg,
            sale_upper_avg: quote.prices.sale_upper_avg,
            rent_lower_avg: quote.prices.rent_lower_avg,
            rent_upper_avg: quote.prices.rent_upper_avg,
            source_url: quote.source_url,
            error: None,
            scraped_at: Utc::now(),
        }
    }

    pub fn failed(address: &str, error: &anyhow::Error) -> Self {
        Self {
            address: address.to_string(),
            sale_lower_avg: None,
            sale_upper_avg: None,
            rent_lower_avg: None,
            rent_upper_avg: None,
            source_url: None,
            error: Some(format!("크롤링 오류 발생: {:#}", error)),
            scraped_at: Utc::now(),
        }
    }
}
