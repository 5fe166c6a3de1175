use std::fmt;

use serde::Deserialize;

use crate::api::CreateRoomParameters;

pub const ROOM_NAME_MAX: usize = 80;
pub const ROOM_DESCRIPTION_MAX: usize = 120;
pub const CONFESSION_MAX: usize = 500;

fn char_len(value: &str) -> usize {
    value.chars().count()
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewRoomForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewRoomErrors {
    pub name: Option<&'static str>,
    pub description: Option<&'static str>,
}

impl NewRoomErrors {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none()
    }
}

impl NewRoomForm {
    pub fn validate(&self) -> Result<CreateRoomParameters, NewRoomErrors> {
        let name_len = char_len(&self.name);
        let errors = NewRoomErrors {
            name: if name_len < 1 {
                Some("Name is required")
            } else if name_len > ROOM_NAME_MAX {
                Some("Name is too long")
            } else {
                None
            },
            description: (char_len(&self.description) > ROOM_DESCRIPTION_MAX)
                .then_some("Description is too long"),
        };

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(CreateRoomParameters {
            name: self.name.clone(),
            description: self.description.clone(),
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfessionForm {
    #[serde(default)]
    pub content: String,
}

impl ConfessionForm {
    pub fn counter(&self) -> CharCounter {
        CharCounter::new(char_len(&self.content), CONFESSION_MAX)
    }

    /// Whether the submit button is enabled for this draft.
    pub fn can_submit(&self) -> bool {
        !self.content.is_empty() && !self.counter().is_over_limit()
    }

    pub fn validate(&self) -> Result<&str, String> {
        if self.content.is_empty() {
            return Err("Write something first".to_owned());
        }
        let counter = self.counter();
        if counter.is_over_limit() {
            return Err(format!("Confession is too long: {counter}"));
        }
        Ok(&self.content)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RevokeForm {
    #[serde(default)]
    pub token: String,
}

impl RevokeForm {
    pub fn validate(&self) -> Result<&str, &'static str> {
        if self.token.trim().is_empty() {
            return Err("Enter the revocation token you were given");
        }
        Ok(&self.token)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CharCounter {
    pub len: usize,
    pub max: usize,
}

impl CharCounter {
    pub fn new(len: usize, max: usize) -> Self {
        Self { len, max }
    }

    pub fn is_over_limit(&self) -> bool {
        self.len > self.max
    }
}

impl fmt::Display for CharCounter {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}/{}", self.len, self.max)?;
        if self.is_over_limit() {
            write!(f, " (limit exceeded)")?;
        }
        Ok(())
    }
}
