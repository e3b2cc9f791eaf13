use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::Error;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SortDir {
    #[default]
    #[serde(rename = "asc", alias = "ASC")]
    Asc,
    #[serde(rename = "desc", alias = "DESC")]
    Desc,
}

impl SortDir {
    pub fn reverse(self) -> Self {
        match self {
            SortDir::Asc => SortDir::Desc,
            SortDir::Desc => SortDir::Asc,
        }
    }
}

impl FromStr for SortDir {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("asc") {
            Ok(SortDir::Asc)
        } else if s.eq_ignore_ascii_case("desc") {
            Ok(SortDir::Desc)
        } else {
            Err(Error::InvalidSortToken(s.to_string()))
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortKey {
    pub field: String,
    #[serde(default)]
    pub dir: SortDir,
}

impl SortKey {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            dir: SortDir::Asc,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            dir: SortDir::Desc,
        }
    }

    /// Parses one key: `name`, `+name`, `-name`, or the pair form `name,desc`.
    pub fn parse(token: &str) -> Result<Self, Error> {
        let token = token.trim();
        if let Some((field, dir)) = token.split_once(',') {
            let field = field.trim();
            if field.is_empty() {
                return Err(Error::InvalidSortToken(token.to_string()));
            }
            return Ok(Self {
                field: field.to_string(),
                dir: dir.trim().parse()?,
            });
        }
        let (dir, field) = match token.as_bytes().first() {
            Some(b'-') => (SortDir::Desc, &token[1..]),
            Some(b'+') => (SortDir::Asc, &token[1..]),
            _ => (SortDir::Asc, token),
        };
        if field.is_empty() || field.starts_with(['+', '-']) {
            return Err(Error::InvalidSortToken(token.to_string()));
        }
        Ok(Self {
            field: field.to_string(),
            dir,
        })
    }
}

/// Ordered sort keys; earlier keys take precedence.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SortSpec(pub Vec<SortKey>);

impl SortSpec {
    pub fn empty() -> Self {
        Self(Vec::new())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn keys(&self) -> &[SortKey] {
        &self.0
    }

    pub fn then(mut self, key: SortKey) -> Self {
        self.0.push(key);
        self
    }

    /// Appends `field` unless the sort already uses it. Used to make paging stable.
    pub fn ensure_tiebreaker(mut self, field: &str, dir: SortDir) -> Self {
        if !self.0.iter().any(|k| k.field.eq_ignore_ascii_case(field)) {
            self.0.push(SortKey {
                field: field.to_string(),
                dir,
            });
        }
        self
    }

    /// `"-created_at,+id"` style rendering.
    pub fn to_signed_tokens(&self) -> String {
        self.0
            .iter()
            .map(|k| match k.dir {
                SortDir::Asc => format!("+{}", k.field),
                SortDir::Desc => format!("-{}", k.field),
            })
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Parses comma separated signed tokens. A blank string yields an empty spec.
    pub fn from_signed_tokens(s: &str) -> Result<Self, Error> {
        if s.trim().is_empty() {
            return Ok(Self::empty());
        }
        s.split(',').map(SortKey::parse).collect::<Result<_, _>>().map(Self)
    }

    /// Builds a spec from repeated `field[,dir]` parameters.
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = &'a str>) -> Result<Self, Error> {
        pairs
            .into_iter()
            .map(SortKey::parse)
            .collect::<Result<_, _>>()
            .map(Self)
    }
}

impl FromStr for SortSpec {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_signed_tokens(s)
    }
}

impl fmt::Display for SortSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_signed_tokens())
    }
}

impl From<Vec<SortKey>> for SortSpec {
    fn from(keys: Vec<SortKey>) -> Self {
        Self(keys)
    }
}
