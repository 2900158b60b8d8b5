//! Optional server features, advertised to clients during connect.
//!
//! Wire form is one string token: `;name1;name2;...;nameN;`, or absent
//! when nothing is active. Every name is wrapped in separators, so a
//! membership test is a substring search for `;name;`.
//!
//! Servers older than `VERSION_FOR_SERVER_FEATURES` send no list;
//! peers assume `FEAT_CHANNELS` and `FEAT_USERS` are active for them.
//!
//! Not thread-safe: one instance per connection, built before it is sent.

use crate::{
    error::{PersistError, PersistResult},
    types::ClientVersion,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// First client/server version that sends and recognizes feature lists.
pub const VERSION_FOR_SERVER_FEATURES: ClientVersion = 1119;

/// Users are defined in a persistent database; nicknames and passwords
/// are authenticated.
pub const FEAT_USERS: &str = "users";

/// Users may create chat channels.
pub const FEAT_CHANNELS: &str = "ch";

/// Separator between names. Never legal inside a name.
pub const SEP_CHAR: char = ';';

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Option<String>", into = "Option<String>")]
pub struct ServerFeatures {
    /// Active names in the order added. Duplicates are kept.
    names: Vec<String>,
}

impl ServerFeatures {
    /// Nothing active, or the defaults assumed for servers that predate
    /// feature lists (`FEAT_CHANNELS`, `FEAT_USERS`).
    pub fn new(with_old_defaults: bool) -> Self {
        let names = if with_old_defaults {
            vec![FEAT_CHANNELS.to_string(), FEAT_USERS.to_string()]
        } else {
            Vec::new()
        };
        Self { names }
    }

    /// Parse a list produced by `encode`. `None` or `""` means none active.
    pub fn decode(encoded: Option<&str>) -> PersistResult<Self> {
        let Some(encoded) = encoded.filter(|e| !e.is_empty()) else {
            return Ok(Self::new(false));
        };
        if !encoded.starts_with(SEP_CHAR) || !encoded.ends_with(SEP_CHAR) {
            return Err(PersistError::MalformedEncoding(encoded.to_string()));
        }
        let names = encoded
            .split(SEP_CHAR)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .collect();
        Ok(Self { names })
    }

    /// Features a peer at `version` has active.
    ///
    /// Peers older than `VERSION_FOR_SERVER_FEATURES` never send a list,
    /// so they get the old defaults regardless of `encoded`.
    pub fn for_peer_version(version: ClientVersion, encoded: Option<&str>) -> PersistResult<Self> {
        if version < VERSION_FOR_SERVER_FEATURES {
            Ok(Self::new(true))
        } else {
            Self::decode(encoded)
        }
    }

    /// Is this feature active?
    ///
    /// Same answer as searching `encode()` for `;name;`. The encoded form
    /// is only built when the queried or a stored name holds the separator.
    pub fn is_active(&self, name: &str) -> PersistResult<bool> {
        check_name(name)?;
        if !name.contains(SEP_CHAR) && !self.names.iter().any(|n| n.contains(SEP_CHAR)) {
            return Ok(self.names.iter().any(|n| n == name));
        }
        let wrapped = format!("{SEP_CHAR}{name}{SEP_CHAR}");
        Ok(self.encode().is_some_and(|list| list.contains(&wrapped)))
    }

    /// Mark a feature active. Adding a name twice keeps both copies.
    pub fn add(&mut self, name: &str) -> PersistResult<()> {
        check_name(name)?;
        if !Self::is_valid_name(name) {
            log::warn!("feature name {name:?} is outside [a-z0-9_-]");
        }
        self.names.push(name.to_string());
        Ok(())
    }

    /// The wire token, or `None` if nothing is active.
    pub fn encode(&self) -> Option<String> {
        if self.names.is_empty() {
            return None;
        }
        let mut list = String::from(SEP_CHAR);
        for name in &self.names {
            list.push_str(name);
            list.push(SEP_CHAR);
        }
        Some(list)
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Active names in the order added.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Lowercase ASCII alphanumerics, underscore, dash; non-empty.
    pub fn is_valid_name(name: &str) -> bool {
        !name.is_empty()
            && name
                .bytes()
                .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'_' || b == b'-')
    }
}

fn check_name(name: &str) -> PersistResult<()> {
    if name.is_empty() {
        return Err(PersistError::InvalidArgument("featureName: empty".to_string()));
    }
    Ok(())
}

impl fmt::Display for ServerFeatures {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.encode() {
            Some(list) => write!(f, "ServerFeatures{{{list}}}"),
            None       => write!(f, "ServerFeatures{{(empty)}}"),
        }
    }
}

impl TryFrom<Option<String>> for ServerFeatures {
    type Error = PersistError;

    fn try_from(encoded: Option<String>) -> Result<Self, Self::Error> {
        Self::decode(encoded.as_deref())
    }
}

impl From<ServerFeatures> for Option<String> {
    fn from(features: ServerFeatures) -> Option<String> {
        features.encode()
    }
}
