//! Share links: `<base>?id=<id>#<base64-key>`.
//!
//! The fragment never leaves the recipient's machine.  Browsers do not
//! send it, and the client only ever requests `/secrets/<id>` from the
//! relay, so the key stays out of every request line and server log.

use std::fmt;

use url::Url;

use crate::crypto::{export_key, import_key, ShareKey};
use crate::errors::{BurnLinkError, Result};

/// Query parameter that carries the secret id.
const ID_PARAM: &str = "id";

/// A parsed share link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareLink {
    base: Url,
    id: String,
    key: ShareKey,
}

impl ShareLink {
    /// Build a link for `id` under `base`.
    ///
    /// Any query or fragment already on `base` is dropped.
    pub fn new(base: &str, id: &str, key: ShareKey) -> Result<Self> {
        if id.is_empty() {
            return Err(BurnLinkError::InvalidLink("secret id is empty".into()));
        }
        let mut base = parse_url(base)?;
        base.set_query(None);
        base.set_fragment(None);
        Ok(Self {
            base,
            id: id.to_owned(),
            key,
        })
    }

    /// Parse a link pasted by a recipient.
    pub fn parse(text: &str) -> Result<Self> {
        let url = parse_url(text.trim())?;

        let id = url
            .query_pairs()
            .find(|(name, _)| name == ID_PARAM)
            .map(|(_, value)| value.into_owned())
            .filter(|id| !id.is_empty())
            .ok_or_else(|| BurnLinkError::InvalidLink("link has no `id` parameter".into()))?;

        let fragment = url
            .fragment()
            .filter(|f| !f.is_empty())
            .ok_or_else(|| BurnLinkError::InvalidLink("link has no key fragment".into()))?;
        let key = import_key(fragment)?;

        let mut base = url.clone();
        base.set_query(None);
        base.set_fragment(None);

        Ok(Self { base, id, key })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn key(&self) -> &ShareKey {
        &self.key
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    /// The part of the link a browser sends when it is opened: no fragment.
    pub fn relay_visible_url(&self) -> Url {
        let mut url = self.base.clone();
        url.query_pairs_mut().append_pair(ID_PARAM, &self.id);
        url
    }
}

impl fmt::Display for ShareLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut url = self.relay_visible_url();
        url.set_fragment(Some(&export_key(&self.key)));
        f.write_str(url.as_str())
    }
}

/// Errors never echo `text`: a pasted link carries its key.
fn parse_url(text: &str) -> Result<Url> {
    let url = Url::parse(text).map_err(|e| BurnLinkError::InvalidLink(format!("not a URL ({e})")))?;
    if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
        return Err(BurnLinkError::InvalidLink("expected an http(s) URL".into()));
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::generate_key;

    #[test]
    fn display_then_parse_preserves_id_and_key() {
        let key = generate_key();
        let link = ShareLink::new("https://share.example.com/view", "abc_DEF-123", key.clone())
            .unwrap();
        let text = link.to_string();
        assert!(text.starts_with("https://share.example.com/view?id=abc_DEF-123#"));

        let parsed = ShareLink::parse(&text).unwrap();
        assert_eq!(parsed.id(), "abc_DEF-123");
        assert_eq!(parsed.key(), &key);
        assert_eq!(parsed, link);
    }

    #[test]
    fn relay_visible_url_has_no_key() {
        let key = generate_key();
        let exported = export_key(&key);
        let link = ShareLink::new("http://localhost:3001", "xyz", key).unwrap();

        let visible = link.relay_visible_url();
        assert_eq!(visible.fragment(), None);
        assert!(!visible.as_str().contains(&exported));
    }

    #[test]
    fn base_query_and_fragment_are_replaced() {
        let link = ShareLink::new("https://h/p?id=old&x=1#stale", "new", generate_key()).unwrap();
        let parsed = ShareLink::parse(&link.to_string()).unwrap();
        assert_eq!(parsed.id(), "new");
        assert_eq!(parsed.base().query(), None);
    }

    #[test]
    fn parse_rejects_missing_parts() {
        let key = export_key(&generate_key());
        assert!(matches!(
            ShareLink::parse(&format!("https://h/p#{key}")),
            Err(BurnLinkError::InvalidLink(_))
        ));
        assert!(matches!(
            ShareLink::parse("https://h/p?id=abc"),
            Err(BurnLinkError::InvalidLink(_))
        ));
        assert!(matches!(
            ShareLink::parse("https://h/p?id=abc#"),
            Err(BurnLinkError::InvalidLink(_))
        ));
        assert!(matches!(
            ShareLink::parse("not a link"),
            Err(BurnLinkError::InvalidLink(_))
        ));
    }

    #[test]
    fn parse_rejects_bad_key_fragment() {
        assert!(matches!(
            ShareLink::parse("https://h/p?id=abc#c2hvcnQ="),
            Err(BurnLinkError::InvalidKey(_))
        ));
    }

    #[test]
    fn parse_errors_do_not_leak_the_key() {
        let key = export_key(&generate_key());
        for text in [
            format!("share.example.com/view?id=abc#{key}"),
            format!("ftp://share.example.com/view?id=abc#{key}"),
            format!("mailto:someone?id=abc#{key}"),
        ] {
            let err = ShareLink::parse(&text).unwrap_err();
            assert!(matches!(err, BurnLinkError::InvalidLink(_)), "{text}");
            assert!(!err.to_string().contains(&key), "{err}");
        }
    }

    #[test]
    fn parse_accepts_surrounding_whitespace() {
        let link = ShareLink::new("https://h/", "abc", generate_key()).unwrap();
        let parsed = ShareLink::parse(&format!("  {link}\n")).unwrap();
        assert_eq!(parsed.id(), "abc");
    }
}
