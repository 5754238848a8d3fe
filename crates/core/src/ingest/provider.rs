use crate::ingest::types::Bar;
use crate::time::lookback::LookbackWindow;
use anyhow::Result;

#[async_trait::async_trait]
pub trait MarketDataProvider: Send + Sync {
    fn provider_name(&self) -> &'static str;

    /// Daily adjusted bars for `symbol` over `window`, oldest first.
    /// An unknown, delisted or unsupported symbol yields `Ok(vec![])`.
    async fn fetch_daily_history(&self, symbol: &str, window: LookbackWindow) -> Result<Vec<Bar>>;

    /// Descriptive name (short name preferred), if the provider knows one.
    async fn lookup_name(&self, symbol: &str) -> Result<Option<String>>;
}

/// Best-effort display name: the provider's name for `symbol`, or `symbol` itself.
pub async fn display_name(provider: &dyn MarketDataProvider, symbol: &str) -> String {
    match provider.lookup_name(symbol).await {
        Ok(Some(name)) if !name.trim().is_empty() => name.trim().to_string(),
        Ok(_) => symbol.to_string(),
        Err(err) => {
            tracing::debug!(
                provider = provider.provider_name(),
                %symbol,
                error = %err,
                "name lookup failed; using symbol"
            );
            symbol.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NameOnly(Result<Option<String>, &'static str>);

    #[async_trait::async_trait]
    impl MarketDataProvider for NameOnly {
        fn provider_name(&self) -> &'static str {
            "name_only"
        }

        async fn fetch_daily_history(&self, _: &str, _: LookbackWindow) -> Result<Vec<Bar>> {
            Ok(Vec::new())
        }

        async fn lookup_name(&self, _: &str) -> Result<Option<String>> {
            self.0.clone().map_err(anyhow::Error::msg)
        }
    }

    #[tokio::test]
    async fn uses_provider_name_when_present() {
        let p = NameOnly(Ok(Some(" TSMC ".to_string())));
        assert_eq!(display_name(&p, "2330.TW").await, "TSMC");
    }

    #[tokio::test]
    async fn falls_back_to_symbol_when_missing_or_blank() {
        let p = NameOnly(Ok(None));
        assert_eq!(display_name(&p, "2330.TW").await, "2330.TW");

        let p = NameOnly(Ok(Some("   ".to_string())));
        assert_eq!(display_name(&p, "2330.TW").await, "2330.TW");
    }

    #[tokio::test]
    async fn falls_back_to_symbol_on_lookup_error() {
        let p = NameOnly(Err("HTTP 503"));
        assert_eq!(display_name(&p, "5314.TWO").await, "5314.TWO");
    }
}
