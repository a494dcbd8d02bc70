use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct RootDto {
    pub version: String,
    pub name: String,
    #[serde(rename = "_links")]
    pub _links: RootLinks,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RootLinks {
    pub convert: String,
    pub health: String,
}
