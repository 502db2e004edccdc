/// Average prices for one area row of the price popup, in won
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AreaPrices {
    /// 매매 하한 평균가
    pub sale_lower_avg: Option<u64>,
    /// 매매 상한 평균가
    pub sale_upper_avg: Option<u64>,
    /// 전세 하한 평균가
    pub rent_lower_avg: Option<u64>,
    /// 전세 상한 평균가
    pub rent_upper_avg: Option<u64>,
}

impl AreaPrices {
    pub fn is_empty(&self) -> bool {
        self.sale_lower_avg.is_none()
            && self.sale_upper_avg.is_none()
            && self.rent_lower_avg.is_none()
            && self.rent_upper_avg.is_none()
    }
}

/// Result of a single price lookup
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PriceQuote {
    pub prices: AreaPrices,
    /// URL of the page the prices were read from
    pub source_url: Option<String>,
}
