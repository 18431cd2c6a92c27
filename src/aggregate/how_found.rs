//! How-found-us record
//!
//! The acquisition source and its conditional detail. Referral details and
//! social platform live in separate enum variants, so at most one of them can
//! ever be present.

use serde::{Deserialize, Serialize};

/// Source tag offered as a single choice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FoundUsSource {
    Referral,
    Social,
    Google,
    Site,
    PassingBy,
    KnowOwner,
}

impl FoundUsSource {
    pub const ALL: [FoundUsSource; 6] = [
        Self::Referral,
        Self::Social,
        Self::Google,
        Self::Site,
        Self::PassingBy,
        Self::KnowOwner,
    ];

    /// Wire tag
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Referral => "referral",
            Self::Social => "social",
            Self::Google => "google",
            Self::Site => "site",
            Self::PassingBy => "passing_by",
            Self::KnowOwner => "know_owner",
        }
    }

    /// Human label
    pub fn label(&self) -> &'static str {
        match self {
            Self::Referral => "Referral",
            Self::Social => "Social media",
            Self::Google => "Google",
            Self::Site => "Website",
            Self::PassingBy => "Passing by",
            Self::KnowOwner => "I know the owner",
        }
    }
}

/// Social platform choice for the `social` source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SocialPlatform {
    Instagram,
    TikTok,
    Facebook,
}

impl SocialPlatform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Instagram => "instagram",
            Self::TikTok => "tiktok",
            Self::Facebook => "facebook",
        }
    }
}

/// Referral identifier as confirmed by the referral lookup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferralDetails {
    /// Identifier the applicant typed (phone or name)
    pub code_or_name: String,

    /// Whether the lookup confirmed the identifier
    pub validated: bool,

    /// Existing member who referred the applicant
    #[serde(skip_serializing_if = "Option::is_none")]
    pub referrer_id: Option<i64>,
}

/// How the applicant found the business
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum HowFoundUs {
    Referral(ReferralDetails),
    Social { platform: SocialPlatform },
    Google,
    Site,
    PassingBy,
    KnowOwner,
}

impl HowFoundUs {
    /// Record for a source without conditional detail; `None` for
    /// `Referral` and `Social`, which need their detail.
    pub fn plain(source: FoundUsSource) -> Option<Self> {
        match source {
            FoundUsSource::Referral | FoundUsSource::Social => None,
            FoundUsSource::Google => Some(Self::Google),
            FoundUsSource::Site => Some(Self::Site),
            FoundUsSource::PassingBy => Some(Self::PassingBy),
            FoundUsSource::KnowOwner => Some(Self::KnowOwner),
        }
    }

    pub fn source(&self) -> FoundUsSource {
        match self {
            Self::Referral(_) => FoundUsSource::Referral,
            Self::Social { .. } => FoundUsSource::Social,
            Self::Google => FoundUsSource::Google,
            Self::Site => FoundUsSource::Site,
            Self::PassingBy => FoundUsSource::PassingBy,
            Self::KnowOwner => FoundUsSource::KnowOwner,
        }
    }

    pub fn referral(&self) -> Option<&ReferralDetails> {
        match self {
            Self::Referral(details) => Some(details),
            _ => None,
        }
    }

    pub fn social_platform(&self) -> Option<SocialPlatform> {
        match self {
            Self::Social { platform } => Some(*platform),
            _ => None,
        }
    }
}
