//! Document model of the Plebiscite collection, as scraped from Erowid.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErowidMeta {
    pub erowid_id: Option<String>,
    pub gender: Option<String>,
    pub published: Option<String>,
    pub year: Option<i32>,
    pub age: Option<i32>,
    pub views: Option<i32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ErowidSubstanceInfo {
    pub amount: Option<String>,
    pub method: Option<String>,
    pub substance: Option<String>,
    pub form: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErowidExperience {
    pub title: Option<String>,
    pub author: Option<String>,
    pub substance: Option<String>,
    pub meta: Option<ErowidMeta>,
    pub substance_info: Option<Vec<ErowidSubstanceInfo>>,
    pub erowid_notes: Option<Vec<String>>,
    pub pull_quotes: Option<Vec<String>>,
    pub body: Option<String>,
}
