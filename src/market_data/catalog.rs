// Fixed set of selectable trading pairs, grouped by quote asset.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Instrument {
    pub symbol: &'static str,
    pub name: &'static str,
    pub group: &'static str,
}

const fn pair(symbol: &'static str, name: &'static str, group: &'static str) -> Instrument {
    Instrument { symbol, name, group }
}

pub const DEFAULT_SYMBOL: &str = "BTCUSDT";

pub const CATALOG: &[Instrument] = &[
    pair("BTCUSDT", "Bitcoin (BTC/USDT)", "USDT"),
    pair("ETHUSDT", "Ethereum (ETH/USDT)", "USDT"),
    pair("BNBUSDT", "Binance Coin (BNB/USDT)", "USDT"),
    pair("SOLUSDT", "Solana (SOL/USDT)", "USDT"),
    pair("XRPUSDT", "Ripple (XRP/USDT)", "USDT"),
    pair("ADAUSDT", "Cardano (ADA/USDT)", "USDT"),
    pair("DOGEUSDT", "Dogecoin (DOGE/USDT)", "USDT"),
    pair("MATICUSDT", "Polygon (MATIC/USDT)", "USDT"),
    pair("DOTUSDT", "Polkadot (DOT/USDT)", "USDT"),
    pair("AVAXUSDT", "Avalanche (AVAX/USDT)", "USDT"),
    pair("LINKUSDT", "Chainlink (LINK/USDT)", "USDT"),
    pair("ATOMUSDT", "Cosmos (ATOM/USDT)", "USDT"),
    pair("UNIUSDT", "Uniswap (UNI/USDT)", "USDT"),
    pair("SHIBUSDT", "Shiba Inu (SHIB/USDT)", "USDT"),
    pair("LTCUSDT", "Litecoin (LTC/USDT)", "USDT"),
    pair("NEARUSDT", "NEAR Protocol (NEAR/USDT)", "USDT"),
    pair("AAVEUSDT", "Aave (AAVE/USDT)", "USDT"),
    pair("ALGOUSDT", "Algorand (ALGO/USDT)", "USDT"),
    pair("APTUSDT", "Aptos (APT/USDT)", "USDT"),
    pair("FILUSDT", "Filecoin (FIL/USDT)", "USDT"),
    pair("ETHBTC", "Ethereum (ETH/BTC)", "BTC"),
    pair("BNBBTC", "Binance Coin (BNB/BTC)", "BTC"),
    pair("SOLBTC", "Solana (SOL/BTC)", "BTC"),
    pair("XRPBTC", "Ripple (XRP/BTC)", "BTC"),
    pair("ADABTC", "Cardano (ADA/BTC)", "BTC"),
    pair("DOGEBTC", "Dogecoin (DOGE/BTC)", "BTC"),
    pair("DOTBTC", "Polkadot (DOT/BTC)", "BTC"),
    pair("LINKBTC", "Chainlink (LINK/BTC)", "BTC"),
    pair("BNBETH", "Binance Coin (BNB/ETH)", "ETH"),
    pair("SOLETH", "Solana (SOL/ETH)", "ETH"),
    pair("LINKETH", "Chainlink (LINK/ETH)", "ETH"),
    pair("MATICETH", "Polygon (MATIC/ETH)", "ETH"),
    pair("ATOMETH", "Cosmos (ATOM/ETH)", "ETH"),
    pair("AVAXETH", "Avalanche (AVAX/ETH)", "ETH"),
    pair("AAVEETH", "Aave (AAVE/ETH)", "ETH"),
    pair("SOLBNB", "Solana (SOL/BNB)", "BNB"),
    pair("ADABNB", "Cardano (ADA/BNB)", "BNB"),
    pair("DOTBNB", "Polkadot (DOT/BNB)", "BNB"),
    pair("MATICBNB", "Polygon (MATIC/BNB)", "BNB"),
    pair("ATOMBNB", "Cosmos (ATOM/BNB)", "BNB"),
    pair("BTCBUSD", "Bitcoin (BTC/BUSD)", "BUSD"),
    pair("ETHBUSD", "Ethereum (ETH/BUSD)", "BUSD"),
    pair("BNBBUSD", "Binance Coin (BNB/BUSD)", "BUSD"),
    pair("SOLBUSD", "Solana (SOL/BUSD)", "BUSD"),
    pair("ADABUSD", "Cardano (ADA/BUSD)", "BUSD"),
];

/// Case-insensitive lookup.
pub fn lookup(symbol: &str) -> Option<&'static Instrument> {
    CATALOG
        .iter()
        .find(|i| i.symbol.eq_ignore_ascii_case(symbol))
}

fn position(symbol: &str) -> usize {
    CATALOG
        .iter()
        .position(|i| i.symbol.eq_ignore_ascii_case(symbol))
        .unwrap_or(0)
}

/// Next instrument in catalog order, wrapping around.
pub fn next(symbol: &str) -> &'static Instrument {
    &CATALOG[(position(symbol) + 1) % CATALOG.len()]
}

pub fn previous(symbol: &str) -> &'static Instrument {
    &CATALOG[(position(symbol) + CATALOG.len() - 1) % CATALOG.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_contents() {
        assert_eq!(CATALOG.len(), 45);
        assert_eq!(lookup("ethbtc").map(|i| i.group), Some("BTC"));
        assert!(lookup("FOOBAR").is_none());
        assert!(lookup(DEFAULT_SYMBOL).is_some());
    }

    #[test]
    fn test_navigation_wraps() {
        assert_eq!(next("BTCUSDT").symbol, "ETHUSDT");
        assert_eq!(previous("BTCUSDT").symbol, "ADABUSD");
        assert_eq!(next("ADABUSD").symbol, "BTCUSDT");
    }
}
