//! Scheme metadata: scheme managers, issuers, credential types and their
//! attributes, plus the issuer public keys the protocol handlers verify
//! against.
//!
//! This is static, externally supplied descriptive data.  The session layer
//! only reads it: identifiers for keying partial proofs and public keys for
//! the crypto library.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Identifiers
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

macro_rules! identifier {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_owned())
            }
        }
    };
}

identifier!(
    /// `<scheme>`
    SchemeManagerIdentifier
);
identifier!(
    /// `<scheme>.<issuer>`
    IssuerIdentifier
);
identifier!(
    /// `<scheme>.<issuer>.<credential>`
    CredentialTypeIdentifier
);

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Translated strings
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// A string translated to multiple languages, keyed by language tag
/// (`"en"`, `"nl"`, …).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TranslatedString(BTreeMap<String, String>);

impl TranslatedString {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, lang: impl Into<String>, text: impl Into<String>) -> Self {
        self.0.insert(lang.into(), text.into());
        self
    }

    /// The translation for `lang`, or `""` when there is none.
    pub fn translation(&self, lang: &str) -> &str {
        self.0.get(lang).map(String::as_str).unwrap_or("")
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Descriptors
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// A scheme manager: the root of a tree of issuers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemeManager {
    pub id: String,
    #[serde(default)]
    pub name: TranslatedString,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub description: TranslatedString,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keyshare_server: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keyshare_website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keyshare_attribute: Option<String>,
    #[serde(default)]
    pub version: u32,
}

impl SchemeManager {
    pub fn identifier(&self) -> SchemeManagerIdentifier {
        SchemeManagerIdentifier::new(self.id.clone())
    }
}

/// An issuer within a scheme manager.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issuer {
    pub id: String,
    #[serde(default)]
    pub name: TranslatedString,
    #[serde(default)]
    pub short_name: TranslatedString,
    pub scheme_manager_id: String,
    #[serde(default)]
    pub contact_address: String,
    #[serde(default)]
    pub contact_email: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub version: u32,
}

impl Issuer {
    pub fn identifier(&self) -> IssuerIdentifier {
        IssuerIdentifier::new(format!("{}.{}", self.scheme_manager_id, self.id))
    }

    pub fn scheme_manager_identifier(&self) -> SchemeManagerIdentifier {
        SchemeManagerIdentifier::new(self.scheme_manager_id.clone())
    }
}

/// A credential type: what an issuer issues and which attributes it holds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CredentialType {
    pub id: String,
    #[serde(default)]
    pub name: TranslatedString,
    #[serde(default)]
    pub short_name: TranslatedString,
    pub issuer_id: String,
    pub scheme_manager_id: String,
    #[serde(default)]
    pub is_singleton: bool,
    #[serde(default)]
    pub description: TranslatedString,
    #[serde(default)]
    pub attributes: Vec<AttributeDescription>,
    #[serde(default)]
    pub version: u32,
}

impl CredentialType {
    pub fn identifier(&self) -> CredentialTypeIdentifier {
        CredentialTypeIdentifier::new(format!(
            "{}.{}.{}",
            self.scheme_manager_id, self.issuer_id, self.id
        ))
    }

    pub fn issuer_identifier(&self) -> IssuerIdentifier {
        IssuerIdentifier::new(format!("{}.{}", self.scheme_manager_id, self.issuer_id))
    }

    pub fn attribute(&self, id: &str) -> Option<&AttributeDescription> {
        self.attributes.iter().find(|a| a.id == id)
    }
}

/// One attribute of a credential type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeDescription {
    pub id: String,
    #[serde(default)]
    pub name: TranslatedString,
    #[serde(default)]
    pub description: TranslatedString,
}

/// An issuer public key as handed to the crypto library.  The key material
/// stays opaque (decimal-encoded big integers).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicKey {
    pub issuer: IssuerIdentifier,
    pub counter: u32,
    #[serde(default)]
    pub expiry_date: i64,
    pub n: String,
    pub z: String,
    pub s: String,
    #[serde(default)]
    pub r: Vec<String>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Metadata store
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// In-memory index over parsed scheme metadata.
#[derive(Debug, Clone, Default)]
pub struct MetaStore {
    scheme_managers: HashMap<SchemeManagerIdentifier, SchemeManager>,
    issuers: HashMap<IssuerIdentifier, Issuer>,
    credential_types: HashMap<CredentialTypeIdentifier, CredentialType>,
    /// Keys per issuer, ordered by counter (oldest first).
    public_keys: HashMap<IssuerIdentifier, Vec<PublicKey>>,
}

impl MetaStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_scheme_manager(&mut self, manager: SchemeManager) {
        self.scheme_managers.insert(manager.identifier(), manager);
    }

    pub fn add_issuer(&mut self, issuer: Issuer) {
        self.issuers.insert(issuer.identifier(), issuer);
    }

    pub fn add_credential_type(&mut self, credential: CredentialType) {
        self.credential_types.insert(credential.identifier(), credential);
    }

    /// Register a public key.  Keys stay sorted by counter so the last one
    /// is the current key.
    pub fn add_public_key(&mut self, key: PublicKey) {
        let keys = self.public_keys.entry(key.issuer.clone()).or_default();
        match keys.binary_search_by_key(&key.counter, |k| k.counter) {
            Ok(i) => keys[i] = key,
            Err(i) => keys.insert(i, key),
        }
    }

    pub fn scheme_manager(&self, id: &SchemeManagerIdentifier) -> Option<&SchemeManager> {
        self.scheme_managers.get(id)
    }

    pub fn issuer(&self, id: &IssuerIdentifier) -> Option<&Issuer> {
        self.issuers.get(id)
    }

    pub fn credential_type(&self, id: &CredentialTypeIdentifier) -> Option<&CredentialType> {
        self.credential_types.get(id)
    }

    /// The most recent public key of `issuer`, if any is registered.
    pub fn current_public_key(&self, issuer: &IssuerIdentifier) -> Option<&PublicKey> {
        self.public_keys.get(issuer).and_then(|keys| keys.last())
    }

    /// The public key at position `index` for `issuer`, or `None` when out
    /// of range.
    pub fn public_key(&self, issuer: &IssuerIdentifier, index: usize) -> Option<&PublicKey> {
        self.public_keys.get(issuer).and_then(|keys| keys.get(index))
    }

    /// Resolve a key by optional index: `None` selects the current key.
    pub fn lookup_public_key(
        &self,
        issuer: &IssuerIdentifier,
        index: Option<usize>,
    ) -> Option<&PublicKey> {
        match index {
            Some(i) => self.public_key(issuer, i),
            None => self.current_public_key(issuer),
        }
    }
}
