//! Transient operator notifications returned alongside view data.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum NoticeVariant {
    Default,
    Destructive,
}

/// A dismissible toast: title, description and visual variant.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Notice {
    pub title: String,
    pub description: String,
    pub variant: NoticeVariant,
}

impl Notice {
    pub fn success(description: impl Into<String>) -> Self {
        Self {
            title: "Success".to_string(),
            description: description.into(),
            variant: NoticeVariant::Default,
        }
    }

    pub fn error(description: impl Into<String>) -> Self {
        Self {
            title: "Error".to_string(),
            description: description.into(),
            variant: NoticeVariant::Destructive,
        }
    }

    pub fn is_error(&self) -> bool {
        self.variant == NoticeVariant::Destructive
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_notice_is_destructive() {
        let notice = Notice::error("Failed to sign out");
        assert_eq!(notice.title, "Error");
        assert!(notice.is_error());
        let json = serde_json::to_value(&notice).unwrap();
        assert_eq!(json["variant"], "destructive");
    }

    #[test]
    fn success_notice_uses_default_variant() {
        let notice = Notice::success("Vendor status revoked");
        assert_eq!(notice.title, "Success");
        assert!(!notice.is_error());
    }
}
