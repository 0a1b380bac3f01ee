//! Sign corpus record types
//!
//! The upstream corpus ships one large JSON document per sign. Only the
//! identifier and the English gloss terms matter for lookup, so the raw shape
//! is read leniently and reduced to [`SignRecord`].

use serde::{Deserialize, Serialize};

/// Numeric key of a sign in the NZSL corpus
pub type NzslId = u64;

/// Raw per-sign document as published upstream
///
/// Every field is optional; unknown fields are ignored. The normalized
/// [`SignRecord`] shape is a subset of this one, so both parse here.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawSignRecord {
    #[serde(default)]
    pub nzsl_id: Option<NzslId>,
    #[serde(default)]
    pub gloss: Option<RawGloss>,
}

/// Gloss block of a raw record
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawGloss {
    #[serde(default)]
    pub english: Option<Vec<String>>,
    #[serde(default)]
    pub english_secondary: Option<Vec<String>>,
}

/// Normalized sign record written by the corpus reducer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignRecord {
    pub nzsl_id: NzslId,
    pub gloss: Gloss,
}

/// Primary and secondary English gloss terms
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Gloss {
    /// Main English keywords
    pub english: Vec<String>,
    /// Secondary English keywords
    #[serde(default)]
    pub english_secondary: Vec<String>,
}

/// Why a raw record cannot be normalized
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// No `gloss.english`, or it is empty
    MissingPrimaryGloss,
    /// No `nzsl_id`
    MissingId,
}

impl RawSignRecord {
    /// Parse a raw record from JSON text
    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }

    /// All gloss terms, primary first, in document order
    pub fn terms(&self) -> impl Iterator<Item = &str> {
        let gloss = self.gloss.as_ref();
        let primary = gloss.and_then(|g| g.english.as_deref()).unwrap_or_default();
        let secondary = gloss
            .and_then(|g| g.english_secondary.as_deref())
            .unwrap_or_default();
        primary.iter().chain(secondary.iter()).map(String::as_str)
    }

    /// Reduce to the normalized record
    ///
    /// A record without primary gloss terms is invalid regardless of its id.
    pub fn normalize(&self) -> Result<SignRecord, Rejection> {
        let gloss = self.gloss.as_ref().ok_or(Rejection::MissingPrimaryGloss)?;
        let english = match gloss.english.as_ref() {
            Some(terms) if !terms.is_empty() => terms.clone(),
            _ => return Err(Rejection::MissingPrimaryGloss),
        };
        let nzsl_id = self.nzsl_id.ok_or(Rejection::MissingId)?;

        Ok(SignRecord {
            nzsl_id,
            gloss: Gloss {
                english,
                english_secondary: gloss.english_secondary.clone().unwrap_or_default(),
            },
        })
    }
}
