//! Inbound URL → raw route spec, for every grammar.
//!
//! # Responsibilities
//! - Strip the link base (absolute or path-only) and any fragment
//! - Strip the index prefix the grammar and `rewrite` setting call for
//! - Strip `ext`, split off the query string (type 2)
//! - Split controller, action and parameter segments on `dot`
//! - Decrypt the parameter token when the request is flagged as encrypted
//!
//! # Design Decisions
//! - Output is a loose `RouteSpec::Parts`; naming, binding and resolution
//!   belong to the decoder
//! - An alias in the first segment is replaced by its target here, since
//!   an aliased target may already carry the action
//! - A URL naming no controller maps to the configured default route

use crate::codec::segment::unescape;
use crate::codec::{split_unescaped, Cipher, ParamMap, Params, Scalar};
use crate::config::{UrlConfig, UrlType};
use crate::error::{CodecError, RouteResult};
use crate::routing::alias::AliasTable;
use crate::routing::descriptor::{split_target, RouteSpec};

/// Parser for one app's URL grammar.
pub struct UrlParser<'a> {
    url: &'a UrlConfig,
    aliases: &'a AliasTable,
    cipher: &'a Cipher,
}

impl<'a> UrlParser<'a> {
    pub fn new(url: &'a UrlConfig, aliases: &'a AliasTable, cipher: &'a Cipher) -> Self {
        Self {
            url,
            aliases,
            cipher,
        }
    }

    /// Parse `input`; `encrypted` marks the parameter segment as a cipher token.
    pub fn parse(&self, input: &str, encrypted: bool) -> RouteResult<RouteSpec> {
        let input = input.split('#').next().unwrap_or_default();
        let rest = self.strip_index(self.strip_base(input))?;

        let (path, query) = match rest.split_once('?') {
            Some((path, query)) => (path, Some(query)),
            None => (rest, None),
        };
        let query = query.filter(|_| self.url.kind == UrlType::QueryString);
        let path = match self.url.ext.as_str() {
            "" => path,
            ext => path.strip_suffix(ext).unwrap_or(path),
        };

        let mut segments = if path.is_empty() {
            Vec::new()
        } else {
            path.split(self.url.dot.as_str()).collect::<Vec<_>>()
        };

        let (controller, action) = match segments.first() {
            Some(first) => {
                let first = unescape(first)?;
                match self.aliases.canonical(&first) {
                    Some(target) => {
                        let (controller, action) = split_target(target);
                        (controller.to_string(), action.map(str::to_string))
                    }
                    None => (first, None),
                }
            }
            None => {
                let (controller, action) = split_target(&self.url.default_route);
                (controller.to_string(), action.map(str::to_string))
            }
        };

        let skip = match (&action, segments.is_empty()) {
            (_, true) => 0,
            (Some(_), false) => 1,
            (None, false) => 2,
        };
        let action = match action {
            Some(action) => Some(action),
            None => segments.get(1).map(|a| unescape(a)).transpose()?,
        };
        let params = segments.split_off(skip.min(segments.len()));

        let params = match query {
            Some(query) => self.query_params(query, encrypted)?,
            None => self.path_params(&params, encrypted)?,
        };

        tracing::debug!(url = input, controller = %controller, action = ?action, "Url parsed");
        Ok(RouteSpec::Parts {
            controller,
            action: action.filter(|a| !a.is_empty()),
            params,
        })
    }

    fn strip_base<'u>(&self, input: &'u str) -> &'u str {
        let base = self.url.link_base();
        if let Some(rest) = input.strip_prefix(base.as_str()) {
            return rest;
        }

        let path = match input.find("://") {
            Some(scheme_end) => {
                let authority = &input[scheme_end + 3..];
                authority.find('/').map_or("", |slash| &authority[slash..])
            }
            None => input,
        };

        let base_path = url::Url::parse(&base)
            .map(|parsed| parsed.path().to_string())
            .unwrap_or(base);
        path.strip_prefix(base_path.as_str())
            .unwrap_or_else(|| path.trim_start_matches('/'))
    }

    fn strip_index<'u>(&self, rest: &'u str) -> RouteResult<&'u str> {
        if self.url.rewrite || rest.is_empty() {
            return Ok(rest);
        }

        let index = self.url.index.as_str();
        let stripped = if self.url.kind.is_query_routed() {
            if self.url.has_default_index() {
                let rest = strip_prefix_ignore_case(rest, index).unwrap_or(rest);
                rest.strip_prefix('?').map(|r| r.strip_prefix('/').unwrap_or(r))
            } else {
                rest.strip_prefix(index).and_then(|r| r.strip_prefix('?'))
            }
        } else {
            match rest.strip_prefix(index) {
                Some("") => Some(""),
                Some(r) => r.strip_prefix('/').or_else(|| r.starts_with('?').then_some(r)),
                None => None,
            }
        };

        stripped.ok_or_else(|| {
            CodecError::Malformed(format!("`{rest}` does not start with the `{index}` entry point"))
                .into()
        })
    }

    fn path_params(&self, segments: &[&str], encrypted: bool) -> RouteResult<Params> {
        let values = if encrypted && !segments.is_empty() {
            let token = segments.join(&self.url.dot);
            let plaintext = self.cipher.decrypt(&token)?;
            split_unescaped(&plaintext, &self.url.dot)?
        } else {
            segments
                .iter()
                .map(|s| unescape(s))
                .collect::<Result<Vec<_>, _>>()?
        };

        if values.is_empty() {
            return Ok(Params::Empty);
        }
        Ok(Params::List(values.into_iter().map(Scalar::from).collect()))
    }

    fn query_params(&self, query: &str, encrypted: bool) -> RouteResult<Params> {
        let plaintext;
        let query = if encrypted && !query.is_empty() {
            plaintext = self.cipher.decrypt(query)?;
            plaintext.as_str()
        } else {
            query
        };

        let map: ParamMap = url::form_urlencoded::parse(query.as_bytes())
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();

        if map.is_empty() {
            return Ok(Params::Empty);
        }
        Ok(match map.as_sequence() {
            Some(values) => Params::List(values),
            None => Params::Map(map),
        })
    }
}

fn strip_prefix_ignore_case<'u>(s: &'u str, prefix: &str) -> Option<&'u str> {
    let head = s.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix).then(|| &s[prefix.len()..])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;

    fn parse(url: &UrlConfig, input: &str) -> RouteSpec {
        let aliases = AliasTable::default();
        let cipher = Cipher::new("k");
        UrlParser::new(url, &aliases, &cipher).parse(input, false).unwrap()
    }

    fn parts(controller: &str, action: Option<&str>, params: Params) -> RouteSpec {
        RouteSpec::Parts {
            controller: controller.to_string(),
            action: action.map(str::to_string),
            params,
        }
    }

    fn url(kind: UrlType) -> UrlConfig {
        UrlConfig {
            kind,
            ..UrlConfig::default()
        }
    }

    #[test]
    fn test_every_grammar() {
        let three = Params::list(["1", "2", "3"]);
        assert_eq!(
            parse(&url(UrlType::QueryPositional), "/?/Main/show/1/2/3"),
            parts("Main", Some("show"), three.clone())
        );
        assert_eq!(
            parse(&url(UrlType::QueryString), "/index.php/Main/show?p1=1&p2=2"),
            parts("Main", Some("show"), Params::map([("p1", "1"), ("p2", "2")]))
        );
        assert_eq!(
            parse(&url(UrlType::QueryKeyed), "/index.php?/Main/show/a/1"),
            parts("Main", Some("show"), Params::list(["a", "1"]))
        );
        assert_eq!(
            parse(&url(UrlType::PathKeyed), "/index.php/Main/show/a/1"),
            parts("Main", Some("show"), Params::list(["a", "1"]))
        );
        assert_eq!(
            parse(&url(UrlType::PathPositional), "/index.php/Main/show/1/2/3"),
            parts("Main", Some("show"), three)
        );
    }

    #[test]
    fn test_absolute_base_and_ext() {
        let mut config = url(UrlType::PathPositional);
        config.full_request = "https://example.com/app".into();
        config.ext = ".html".into();
        assert_eq!(
            parse(&config, "https://example.com/app/index.php/Main/show/a%2Fb.html#top"),
            parts("Main", Some("show"), Params::list(["a/b"]))
        );
        assert_eq!(
            parse(&config, "/app/index.php/Main/show/1.html"),
            parts("Main", Some("show"), Params::list(["1"]))
        );
    }

    #[test]
    fn test_empty_path_uses_default_route() {
        let config = url(UrlType::QueryPositional);
        assert_eq!(parse(&config, "/"), parts("Main", Some("index"), Params::Empty));
    }

    #[test]
    fn test_sequential_query_keys_become_list() {
        let config = url(UrlType::QueryString);
        assert_eq!(
            parse(&config, "/index.php/Main/show?0=a&1=b"),
            parts("Main", Some("show"), Params::list(["a", "b"]))
        );
    }

    #[test]
    fn test_alias_in_first_segment() {
        let mut config = AppConfig::default();
        config.router.insert("home".into(), "Main:show".into());
        let aliases = AliasTable::build(&config.router);
        let cipher = Cipher::new("k");
        let spec = UrlParser::new(&config.url, &aliases, &cipher)
            .parse("/?/home/7", false)
            .unwrap();
        assert_eq!(spec, parts("Main", Some("show"), Params::list(["7"])));
    }

    #[test]
    fn test_encrypted_params() {
        let config = url(UrlType::QueryPositional);
        let aliases = AliasTable::default();
        let cipher = Cipher::new("k");
        let token = cipher.encrypt("1/2");
        let parser = UrlParser::new(&config, &aliases, &cipher);

        let spec = parser.parse(&format!("/?/Main/show/{token}"), true).unwrap();
        assert_eq!(spec, parts("Main", Some("show"), Params::list(["1", "2"])));

        let err = parser.parse("/?/Main/show/00ff00ff00ff00ff00", true).unwrap_err();
        assert!(err.is_tampering());
    }

    #[test]
    fn test_wrong_entry_point() {
        let config = url(UrlType::PathPositional);
        let aliases = AliasTable::default();
        let cipher = Cipher::new("k");
        let err = UrlParser::new(&config, &aliases, &cipher)
            .parse("/other.php/Main", false)
            .unwrap_err();
        assert!(matches!(err, crate::error::RouteError::Codec(CodecError::Malformed(_))));
    }
}
