pub mod diagnosis;
pub mod domain;
pub mod ingest;
pub mod time;

pub mod config {
    use anyhow::Context;

    const DEFAULT_TIMEOUT_SECS: u64 = 30;
    const DEFAULT_ATTEMPTS: u32 = 1;
    const DEFAULT_PAGE_TITLE: &str = "📈 Stock Diagnosis";
    const DEFAULT_CODE: &str = "2330";
    const DEFAULT_DISCLAIMER: &str =
        "Data source: Yahoo Finance. For reference only; not investment advice.";

    #[derive(Debug, Clone)]
    pub struct Settings {
        pub sentry_dsn: Option<String>,
        pub yahoo_base_url: Option<String>,
        pub data_provider_timeout_secs: u64,
        /// Total attempts per provider HTTP call, never below 1.
        pub data_provider_attempts: u32,
        pub trend_verdict: bool,
        pub page_title: Option<String>,
        pub page_layout: Option<String>,
        pub sidebar_state: Option<String>,
    }

    impl Settings {
        pub fn from_env() -> anyhow::Result<Self> {
            let trend_verdict = match std::env::var("DIAGNOSIS_TREND_VERDICT").ok() {
                Some(v) => parse_bool(&v).context("DIAGNOSIS_TREND_VERDICT must be true or false")?,
                None => true,
            };

            let data_provider_timeout_secs = parse_number(
                "DATA_PROVIDER_TIMEOUT_SECS",
                std::env::var("DATA_PROVIDER_TIMEOUT_SECS").ok(),
                DEFAULT_TIMEOUT_SECS,
            )?;
            let data_provider_attempts = parse_number(
                "DATA_PROVIDER_RETRIES",
                std::env::var("DATA_PROVIDER_RETRIES").ok(),
                DEFAULT_ATTEMPTS,
            )?
            .max(1);

            Ok(Self {
                sentry_dsn: std::env::var("SENTRY_DSN").ok(),
                yahoo_base_url: std::env::var("YAHOO_BASE_URL").ok(),
                data_provider_timeout_secs,
                data_provider_attempts,
                trend_verdict,
                page_title: std::env::var("PAGE_TITLE").ok(),
                page_layout: std::env::var("PAGE_LAYOUT").ok(),
                sidebar_state: std::env::var("SIDEBAR_STATE").ok(),
            })
        }

        pub fn rules(&self) -> crate::domain::recommendation::RuleSet {
            crate::domain::recommendation::RuleSet {
                trend_verdict: self.trend_verdict,
            }
        }

        pub fn display_config(&self) -> anyhow::Result<DisplayConfig> {
            let mut out = DisplayConfig::default();

            if let Some(title) = self.page_title.as_deref().map(str::trim) {
                if !title.is_empty() {
                    out.page_title = title.to_string();
                }
            }

            if let Some(v) = self.page_layout.as_deref() {
                out.layout = match v.trim().to_ascii_lowercase().as_str() {
                    "centered" => Layout::Centered,
                    "wide" => Layout::Wide,
                    other => anyhow::bail!("PAGE_LAYOUT must be centered or wide (got {other:?})"),
                };
            }

            if let Some(v) = self.sidebar_state.as_deref() {
                out.sidebar_collapsed = match v.trim().to_ascii_lowercase().as_str() {
                    "collapsed" => true,
                    "expanded" => false,
                    other => anyhow::bail!(
                        "SIDEBAR_STATE must be collapsed or expanded (got {other:?})"
                    ),
                };
            }

            Ok(out)
        }
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum Layout {
        Centered,
        Wide,
    }

    /// Cosmetic page options. Built once at startup and handed to the renderer.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct DisplayConfig {
        pub page_title: String,
        pub layout: Layout,
        pub sidebar_collapsed: bool,
        pub default_code: String,
        pub disclaimer: String,
    }

    impl Default for DisplayConfig {
        fn default() -> Self {
            Self {
                page_title: DEFAULT_PAGE_TITLE.to_string(),
                layout: Layout::Centered,
                sidebar_collapsed: true,
                default_code: DEFAULT_CODE.to_string(),
                disclaimer: DEFAULT_DISCLAIMER.to_string(),
            }
        }
    }

    fn parse_bool(v: &str) -> anyhow::Result<bool> {
        match v.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            other => anyhow::bail!("not a boolean: {other:?}"),
        }
    }

    fn parse_number<T>(name: &str, raw: Option<String>, default: T) -> anyhow::Result<T>
    where
        T: std::str::FromStr,
        T::Err: std::error::Error + Send + Sync + 'static,
    {
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(default),
            Some(v) => v
                .parse()
                .with_context(|| format!("{name} must be a non-negative integer (got {v:?})")),
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        fn empty_settings() -> Settings {
            Settings {
                sentry_dsn: None,
                yahoo_base_url: None,
                data_provider_timeout_secs: DEFAULT_TIMEOUT_SECS,
                data_provider_attempts: DEFAULT_ATTEMPTS,
                trend_verdict: true,
                page_title: None,
                page_layout: None,
                sidebar_state: None,
            }
        }

        #[test]
        fn display_defaults_are_centered_with_collapsed_sidebar() {
            let cfg = empty_settings().display_config().unwrap();
            assert_eq!(cfg, DisplayConfig::default());
            assert_eq!(cfg.layout, Layout::Centered);
            assert!(cfg.sidebar_collapsed);
            assert_eq!(cfg.default_code, "2330");
        }

        #[test]
        fn display_overrides_are_applied() {
            let settings = Settings {
                page_title: Some("  My Page ".to_string()),
                page_layout: Some("WIDE".to_string()),
                sidebar_state: Some("expanded".to_string()),
                ..empty_settings()
            };
            let cfg = settings.display_config().unwrap();
            assert_eq!(cfg.page_title, "My Page");
            assert_eq!(cfg.layout, Layout::Wide);
            assert!(!cfg.sidebar_collapsed);
        }

        #[test]
        fn rejects_unknown_layout() {
            let settings = Settings {
                page_layout: Some("sideways".to_string()),
                ..empty_settings()
            };
            assert!(settings.display_config().is_err());
        }

        #[test]
        fn numeric_settings_default_when_unset_or_blank() {
            assert_eq!(parse_number("DATA_PROVIDER_TIMEOUT_SECS", None, 30u64).unwrap(), 30);
            assert_eq!(
                parse_number("DATA_PROVIDER_RETRIES", Some("  ".to_string()), 1u32).unwrap(),
                1
            );
            assert_eq!(
                parse_number("DATA_PROVIDER_RETRIES", Some(" 3 ".to_string()), 1u32).unwrap(),
                3
            );
        }

        #[test]
        fn malformed_numeric_setting_names_the_variable() {
            let err = parse_number("DATA_PROVIDER_RETRIES", Some("lots".to_string()), 1u32)
                .unwrap_err();
            assert!(err.to_string().contains("DATA_PROVIDER_RETRIES"));
            assert!(parse_number("DATA_PROVIDER_TIMEOUT_SECS", Some("-5".to_string()), 30u64).is_err());
        }

        #[test]
        fn parses_bool_variants() {
            assert!(parse_bool("TRUE").unwrap());
            assert!(!parse_bool(" off ").unwrap());
            assert!(parse_bool("maybe").is_err());
        }
    }
}
