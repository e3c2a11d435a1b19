// Source: https://developers.binance.com/docs/binance-spot-api-docs/web-socket-streams
// (Individual Symbol Book Ticker)
// {"u":400900217,"s":"BNBUSDT","b":"25.35190000","B":"31.21000000",
//  "a":"25.36520000","A":"40.66000000"}
//
// Fields are optional here so that a missing one is reported as a malformed
// quote instead of a generic JSON error.
#[derive(Debug, Default, serde::Deserialize)]
pub struct WsBookTicker {
    #[serde(rename = "u", default)]
    pub update_id: Option<u64>,
    #[serde(rename = "s", default)]
    pub symbol: Option<String>,
    #[serde(rename = "b", default)]
    pub bid_price: Option<String>,
    #[serde(rename = "B", default)]
    pub bid_qty: Option<String>,
    #[serde(rename = "a", default)]
    pub ask_price: Option<String>,
    #[serde(rename = "A", default)]
    pub ask_qty: Option<String>,
}

// Combined-stream wrapper: {"stream":"btcusdt@bookTicker","data":{...}}
#[derive(Debug, serde::Deserialize)]
pub struct WsCombined {
    pub stream: String,
    pub data: WsBookTicker,
}
