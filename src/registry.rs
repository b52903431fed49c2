use url::Url;

use crate::config::Config;
use crate::datpiff::DatPiff;
use crate::provider::CoverArtProvider;
use crate::qobuz::Qobuz;

/// All shipped providers, in declaration order. Lookup takes the
/// first match, so no two providers may claim the same domain +
/// pattern combination.
pub fn allProviders(config: &Config) -> Vec<Box<dyn CoverArtProvider>>
{
    vec![
        Box::new(Qobuz::new(config.qobuz_app_id.as_deref())),
        Box::new(DatPiff),
    ]
}

fn domainMatches(host: &str, domain: &str) -> bool
{
    host == domain || host.ends_with(&format!(".{}", domain))
}

/// Find the provider for a URL, if any. A provider is selected only
/// if one of its domains suffix-matches the hostname and its pattern
/// matches the path.
pub fn getProvider(url: &Url, config: &Config) ->
    Option<Box<dyn CoverArtProvider>>
{
    let host = url.host_str()?;
    allProviders(config).into_iter().find(
        |p| p.supportedDomains().iter().any(|d| domainMatches(host, d)) &&
            p.supportsUrl(url))
}

pub fn hasProvider(url: &Url, config: &Config) -> bool
{
    getProvider(url, config).is_some()
}
