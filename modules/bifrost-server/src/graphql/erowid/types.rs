use async_graphql::*;

use plebiscite_client::types;

/// An Erowid experience report from the Plebiscite collection.
#[derive(SimpleObject, Clone)]
pub struct Erowid {
    pub title: Option<String>,
    pub author: Option<String>,
    pub substance: Option<String>,
    pub meta: Option<ErowidMeta>,
    pub substance_info: Option<Vec<ErowidSubstanceInfo>>,
    pub erowid_notes: Option<Vec<String>>,
    pub pull_quotes: Option<Vec<String>>,
    pub body: Option<String>,
}

impl From<types::ErowidExperience> for Erowid {
    fn from(doc: types::ErowidExperience) -> Self {
        Self {
            title: doc.title,
            author: doc.author,
            substance: doc.substance,
            meta: doc.meta.map(ErowidMeta::from),
            substance_info: doc
                .substance_info
                .map(|info| info.into_iter().map(ErowidSubstanceInfo::from).collect()),
            erowid_notes: doc.erowid_notes,
            pull_quotes: doc.pull_quotes,
            body: doc.body,
        }
    }
}

#[derive(SimpleObject, Clone)]
pub struct ErowidMeta {
    pub erowid_id: Option<String>,
    pub gender: Option<String>,
    pub published: Option<String>,
    pub year: Option<i32>,
    pub age: Option<i32>,
    pub views: Option<i32>,
}

impl From<types::ErowidMeta> for ErowidMeta {
    fn from(meta: types::ErowidMeta) -> Self {
        Self {
            erowid_id: meta.erowid_id,
            gender: meta.gender,
            published: meta.published,
            year: meta.year,
            age: meta.age,
            views: meta.views,
        }
    }
}

#[derive(SimpleObject, Clone)]
pub struct ErowidSubstanceInfo {
    pub amount: Option<String>,
    pub method: Option<String>,
    pub substance: Option<String>,
    pub form: Option<String>,
}

impl From<types::ErowidSubstanceInfo> for ErowidSubstanceInfo {
    fn from(info: types::ErowidSubstanceInfo) -> Self {
        Self {
            amount: info.amount,
            method: info.method,
            substance: info.substance,
            form: info.form,
        }
    }
}
