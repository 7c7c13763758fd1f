//! Absolute links on the public site.

use url::{ParseError, Url};

/// Resolve a site path beneath `base`, keeping any path prefix it carries.
///
/// `https://x.example/app` and `https://x.example/app/` both yield
/// `https://x.example/app/atendimento/sp` for `/atendimento/sp`.
///
/// # Errors
/// Returns [`ParseError`] when `base` cannot carry a path.
pub fn site_url(base: &Url, path: &str) -> Result<Url, ParseError> {
    let mut root = base.clone();
    if !root.path().ends_with('/') {
        let with_slash = format!("{}/", root.path());
        root.set_path(&with_slash);
    }
    root.join(path.trim_start_matches('/'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("https://www.telesaude.example", "https://www.telesaude.example/atendimento/sp/campinas")]
    #[case("https://www.telesaude.example/", "https://www.telesaude.example/atendimento/sp/campinas")]
    #[case("https://x.example/app", "https://x.example/app/atendimento/sp/campinas")]
    #[case("https://x.example/app/", "https://x.example/app/atendimento/sp/campinas")]
    fn keeps_base_path_prefix(#[case] base: &str, #[case] expected: &str) {
        let base = Url::parse(base).expect("base url");
        let url = site_url(&base, "/atendimento/sp/campinas").expect("joined url");
        assert_eq!(url.as_str(), expected);
    }

    #[test]
    fn rejects_bases_without_a_path() {
        let base = Url::parse("mailto:contato@telesaude.example").expect("base url");
        assert!(site_url(&base, "/carreiras").is_err());
    }
}
