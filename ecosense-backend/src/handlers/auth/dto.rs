use serde::{Deserialize, Serialize};

/// Body of `POST /auth/login`. Absent fields read as empty.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Login {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Body of `POST /auth/register`.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Register {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub surname: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}
