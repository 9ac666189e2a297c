//! GeckoTerminal Types

use serde::Deserialize;

use crate::domain::market::Candle;

/// `/networks/{network}/pools/{pool}/ohlcv/{timeframe}` response
#[derive(Debug, Clone, Deserialize)]
pub struct OhlcvResponse {
    pub data: OhlcvData,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OhlcvData {
    pub attributes: OhlcvAttributes,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OhlcvAttributes {
    /// `[timestamp, open, high, low, close, volume]`, newest first
    #[serde(default)]
    pub ohlcv_list: Vec<Candle>,
}

impl OhlcvResponse {
    pub fn into_candles(self) -> Vec<Candle> {
        self.data.attributes.ohlcv_list
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_ohlcv_list() {
        let body = json!({
            "data": {
                "id": "abc",
                "type": "ohlcv_request_response",
                "attributes": {
                    "ohlcv_list": [
                        [1_700_007_200, 0.2, 0.3, 0.1, 0.25, 1200.0],
                        [1_700_003_600, 0.1, 0.2, 0.05, 0.2, 800.5]
                    ]
                }
            },
            "meta": {"base": {"symbol": "X"}}
        });
        let candles = serde_json::from_value::<OhlcvResponse>(body).unwrap().into_candles();
        assert_eq!(candles.len(), 2);
        assert_eq!(candles[0].timestamp, 1_700_007_200);
        assert_eq!(candles[1].volume, 800.5);
    }
}
