use serde::{Deserialize, Serialize};

/// A job seeker as handed to us by the profile service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeekerRef {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

impl SeekerRef {
    pub fn new<I: Into<String>, N: Into<String>>(id: I, name: N) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            avatar_url: None,
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoachIdentity {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
}

impl CoachIdentity {
    pub fn new<N: Into<String>, E: Into<String>>(name: N, email: E) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
        }
    }

    /// Value recorded in `created_by`: the email when known, otherwise the name.
    pub fn handle(&self) -> Option<&str> {
        let email = self.email.trim();
        if !email.is_empty() {
            return Some(email);
        }
        let name = self.name.trim();
        if name.is_empty() { None } else { Some(name) }
    }
}
