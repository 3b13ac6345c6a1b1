use crate::error::{ModelError, Result};
use crate::ids::ProfileId;

const MAX_PROFILE_NAME_CHARS: usize = 32;

/// A viewer profile under the signed-in account.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Profile {
    pub id: ProfileId,
    pub name: String,
    pub avatar: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub is_kids: bool,
}

/// Editable profile fields, validated before they reach a store.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProfileDraft {
    pub name: String,
    pub avatar: String,
    pub is_kids: bool,
}

impl ProfileDraft {
    pub fn validate(&self) -> Result<()> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(ModelError::InvalidProfile(
                "name must not be empty".to_string(),
            ));
        }
        if name.chars().count() > MAX_PROFILE_NAME_CHARS {
            return Err(ModelError::InvalidProfile(format!(
                "name exceeds {MAX_PROFILE_NAME_CHARS} characters"
            )));
        }
        Ok(())
    }

    pub fn into_profile(self, id: ProfileId) -> Result<Profile> {
        self.validate()?;
        Ok(Profile {
            id,
            name: self.name.trim().to_string(),
            avatar: self.avatar,
            is_kids: self.is_kids,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draft_trims_name() {
        let draft = ProfileDraft {
            name: "  Kids room ".into(),
            avatar: "owl".into(),
            is_kids: true,
        };
        let profile = draft
            .into_profile(ProfileId::new("p1").unwrap())
            .expect("valid draft");
        assert_eq!(profile.name, "Kids room");
        assert!(profile.is_kids);
    }

    #[test]
    fn draft_rejects_blank_and_long_names() {
        let blank = ProfileDraft::default();
        assert!(blank.validate().is_err());

        let long = ProfileDraft {
            name: "x".repeat(MAX_PROFILE_NAME_CHARS + 1),
            ..Default::default()
        };
        assert!(long.validate().is_err());
    }
}
