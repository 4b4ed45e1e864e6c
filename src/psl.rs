//! Public Suffix List lookups.
//!
//! Parses the `public_suffix_list.dat` format and answers the two questions
//! the checker needs: which suffix a host falls under (and whether that suffix
//! is ICANN-managed), and what its registrable domain is.

use std::{collections::HashMap, path::Path};

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::CheckConfig;

pub const PSL_URL: &str = "https://publicsuffix.org/list/public_suffix_list.dat";

const EMBEDDED_LIST: &str = include_str!("../assets/public_suffix_list.dat");
const PRIVATE_MARKER: &str = "===BEGIN PRIVATE DOMAINS===";

#[derive(Error, Debug)]
pub enum PslError {
    #[error("Failed to read PSL file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to download PSL: {0}")]
    Fetch(#[from] reqwest::Error),

    #[error("PSL contains no rules")]
    Empty,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublicSuffix {
    pub suffix: String,
    /// False for private-section rules and the implicit `*` rule
    pub icann: bool,
}

/// Rules keyed by their domain part; the value records the ICANN section.
#[derive(Debug, Clone, Default)]
pub struct PublicSuffixList {
    rules: HashMap<String, bool>,
    wildcards: HashMap<String, bool>,
    exceptions: HashMap<String, bool>,
}

impl PublicSuffixList {
    pub fn parse(content: &str) -> Result<Self, PslError> {
        let mut psl = PublicSuffixList::default();
        let mut icann = true;

        for line in content.lines() {
            if line.contains(PRIVATE_MARKER) {
                icann = false;
                continue;
            }
            // Rules end at the first whitespace
            let Some(rule) = line.split_whitespace().next() else {
                continue;
            };
            if rule.starts_with("//") {
                continue;
            }

            if let Some(domain) = rule.strip_prefix('!') {
                psl.exceptions.insert(ascii_rule(domain), icann);
            } else if let Some(parent) = rule.strip_prefix("*.") {
                psl.wildcards.insert(ascii_rule(parent), icann);
            } else {
                psl.rules.insert(ascii_rule(rule), icann);
            }
        }

        if psl.rule_count() == 0 {
            return Err(PslError::Empty);
        }
        debug!("Parsed PSL with {} rules", psl.rule_count());
        Ok(psl)
    }

    /// The list compiled into the binary.
    pub fn embedded() -> Result<Self, PslError> {
        Self::parse(EMBEDDED_LIST)
    }

    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, PslError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let psl = Self::parse(&content)?;
        info!("Loaded PSL from {} ({} rules)", path.as_ref().display(), psl.rule_count());
        Ok(psl)
    }

    pub async fn load_from_url(url: &str) -> Result<Self, PslError> {
        debug!("Downloading PSL from {}", url);
        let content = reqwest::get(url).await?.error_for_status()?.text().await?;
        let psl = Self::parse(&content)?;
        info!("Loaded PSL from {} ({} rules)", url, psl.rule_count());
        Ok(psl)
    }

    /// Picks the list source from the config: a download when enabled (the
    /// embedded copy if it fails), else the configured file, else the
    /// embedded copy.
    pub async fn load(config: &CheckConfig) -> Result<Self, PslError> {
        if config.psl_fetch {
            match Self::load_from_url(PSL_URL).await {
                Ok(psl) => return Ok(psl),
                Err(e) => warn!("PSL download failed, using embedded list: {}", e),
            }
        } else if let Some(path) = &config.psl_path {
            return Self::load_from_file(path);
        }
        Self::embedded()
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len() + self.wildcards.len() + self.exceptions.len()
    }

    /// Finds the public suffix of `host`.
    ///
    /// Exception rules win, then the matching rule with the most labels, then
    /// the implicit `*` rule. Returns `None` for empty names or names with
    /// empty labels.
    pub fn public_suffix(&self, host: &str) -> Option<PublicSuffix> {
        let host = host.trim_end_matches('.').to_ascii_lowercase();
        let labels: Vec<&str> = host.split('.').collect();
        if labels.iter().any(|label| label.is_empty()) {
            return None;
        }

        let suffix_from = |start: usize| labels[start..].join(".");

        for start in 0..labels.len() {
            if let Some(&icann) = self.exceptions.get(&suffix_from(start)) {
                // An exception's suffix is the rule minus its leftmost label
                return Some(PublicSuffix {
                    suffix: suffix_from(start + 1),
                    icann,
                })
                .filter(|ps| !ps.suffix.is_empty());
            }
        }

        for start in 0..labels.len() {
            let candidate = suffix_from(start);
            if let Some(&icann) = self.rules.get(&candidate) {
                return Some(PublicSuffix {
                    suffix: candidate,
                    icann,
                });
            }
            if start + 1 < labels.len() {
                if let Some(&icann) = self.wildcards.get(&suffix_from(start + 1)) {
                    return Some(PublicSuffix {
                        suffix: candidate,
                        icann,
                    });
                }
            }
        }

        Some(PublicSuffix {
            suffix: labels[labels.len() - 1].to_string(),
            icann: false,
        })
    }

    /// The public suffix plus one label, or `None` when `host` is itself a
    /// public suffix.
    pub fn registrable_domain(&self, host: &str) -> Option<String> {
        let suffix = self.public_suffix(host)?;
        let host = host.trim_end_matches('.').to_ascii_lowercase();
        let labels: Vec<&str> = host.split('.').collect();
        let suffix_labels = suffix.suffix.split('.').count();

        if labels.len() <= suffix_labels {
            return None;
        }
        Some(labels[labels.len() - suffix_labels - 1..].join("."))
    }
}

/// Hosts reach the list in A-label form, so IDN rules are stored that way too.
fn ascii_rule(rule: &str) -> String {
    if rule.is_ascii() {
        return rule.to_ascii_lowercase();
    }
    idna::domain_to_ascii(rule).unwrap_or_else(|_| rule.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_LIST: &str = r#"
// Comment
com
uk
co.uk
*.ck
!www.ck
jp
kawasaki.jp
*.kawasaki.jp
!city.kawasaki.jp

// ===BEGIN PRIVATE DOMAINS===
github.io
*.compute.example
"#;

    fn psl() -> PublicSuffixList {
        PublicSuffixList::parse(TEST_LIST).unwrap()
    }

    #[test]
    fn test_psl_parsing() {
        let psl = psl();
        assert_eq!(psl.rule_count(), 11);

        assert_eq!(psl.registrable_domain("example.com"), Some("example.com".to_string()));
        assert_eq!(psl.registrable_domain("www.example.com"), Some("example.com".to_string()));
        assert_eq!(psl.registrable_domain("www.example.co.uk"), Some("example.co.uk".to_string()));

        // Test that com itself returns None (it's a TLD)
        assert_eq!(psl.registrable_domain("com"), None);
        assert_eq!(psl.registrable_domain("co.uk"), None);
    }

    #[test]
    fn test_wildcard_and_exception_rules() {
        let psl = psl();

        assert_eq!(psl.public_suffix("shop.example.ck").unwrap().suffix, "example.ck");
        assert_eq!(psl.registrable_domain("example.ck"), None);
        assert_eq!(psl.registrable_domain("www.ck"), Some("www.ck".to_string()));
        assert_eq!(psl.public_suffix("www.ck").unwrap().suffix, "ck");

        assert_eq!(
            psl.registrable_domain("a.b.foo.kawasaki.jp"),
            Some("b.foo.kawasaki.jp".to_string())
        );
        assert_eq!(
            psl.registrable_domain("www.city.kawasaki.jp"),
            Some("city.kawasaki.jp".to_string())
        );
    }

    #[test]
    fn test_private_section_is_not_icann() {
        let psl = psl();

        let suffix = psl.public_suffix("project.github.io").unwrap();
        assert_eq!(suffix.suffix, "github.io");
        assert!(!suffix.icann);

        let wildcard = psl.public_suffix("host.region.compute.example").unwrap();
        assert_eq!(wildcard.suffix, "region.compute.example");
        assert!(!wildcard.icann);

        assert!(psl.public_suffix("example.co.uk").unwrap().icann);
    }

    #[test]
    fn test_unlisted_tld_falls_back_to_implicit_rule() {
        let suffix = psl().public_suffix("example.unlisted").unwrap();
        assert_eq!(suffix.suffix, "unlisted");
        assert!(!suffix.icann);
    }

    #[test]
    fn test_malformed_hosts() {
        let psl = psl();
        assert_eq!(psl.public_suffix(""), None);
        assert_eq!(psl.public_suffix("foo..com"), None);
        assert_eq!(psl.registrable_domain("Example.COM."), Some("example.com".to_string()));
    }

    #[test]
    fn test_empty_list_is_rejected() {
        assert!(matches!(PublicSuffixList::parse("// nothing\n"), Err(PslError::Empty)));
    }

    #[test]
    fn test_embedded_list_covers_common_suffixes() {
        let psl = PublicSuffixList::embedded().unwrap();
        assert_eq!(psl.registrable_domain("www.bbc.co.uk"), Some("bbc.co.uk".to_string()));
        assert!(psl.public_suffix("example.com").unwrap().icann);
        assert!(!psl.public_suffix("me.github.io").unwrap().icann);
    }

    #[test]
    fn test_embedded_list_is_complete() {
        let psl = PublicSuffixList::embedded().unwrap();

        let amsterdam = psl.public_suffix("example.amsterdam").unwrap();
        assert_eq!(amsterdam.suffix, "amsterdam");
        assert!(amsterdam.icann);

        assert_eq!(psl.public_suffix("city.kyoto.jp").unwrap().suffix, "kyoto.jp");
        assert_eq!(
            psl.registrable_domain("www.city.kyoto.jp"),
            Some("city.kyoto.jp".to_string())
        );
        assert_eq!(psl.registrable_domain("kyoto.jp"), None);
    }

    #[test]
    fn test_idn_rules_match_a_labels() {
        let psl = PublicSuffixList::parse("中国\n公司.cn\ncn\n").unwrap();

        let suffix = psl.public_suffix("example.xn--fiqs8s").unwrap();
        assert_eq!(suffix.suffix, "xn--fiqs8s");
        assert!(suffix.icann);
        assert_eq!(
            psl.registrable_domain("www.example.xn--55qx5d.cn"),
            Some("example.xn--55qx5d.cn".to_string())
        );
    }

    #[tokio::test]
    async fn test_load_prefers_configured_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        std::io::Write::write_all(&mut file, b"com\nexample\n").unwrap();

        let config = CheckConfig {
            psl_path: Some(file.path().to_path_buf()),
            ..CheckConfig::default()
        };
        let psl = PublicSuffixList::load(&config).await.unwrap();
        assert_eq!(psl.rule_count(), 2);

        let missing = CheckConfig {
            psl_path: Some(file.path().with_extension("missing")),
            ..CheckConfig::default()
        };
        assert!(matches!(PublicSuffixList::load(&missing).await, Err(PslError::Io(_))));
    }
}
