//! SMW ask-query composition and result projection.

use serde::{Deserialize, Serialize};
use serde_json::Value;

const SUBSTANCE_CATEGORY: &str = "[[Category:Psychoactive substance]]";
const EFFECT_CATEGORY: &str = "[[Category:Effect]]";

/// A `{name, url}` projection of one ask result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AskPage {
    #[serde(rename = "fulltext")]
    pub name: String,
    #[serde(rename = "fullurl")]
    pub url: String,
}

/// Substance search selector. The four filters are mutually exclusive;
/// enforcing that is the resolver's job.
#[derive(Debug, Clone)]
pub enum SubstanceSelector {
    /// Page-title lookup, with common/systematic-name fallbacks when the
    /// title query comes back empty.
    Query(String),
    Effect(String),
    ChemicalClass(String),
    PsychoactiveClass(String),
    /// Whole-category listing.
    Default,
}

pub fn substance_query(selector: &SubstanceSelector) -> String {
    match selector {
        SubstanceSelector::Query(query) if query.is_empty() => SUBSTANCE_CATEGORY.to_string(),
        SubstanceSelector::Query(query) => format!("[[:{query}]]"),
        SubstanceSelector::Effect(effect) => format!("[[Effect::{effect}]]|{SUBSTANCE_CATEGORY}"),
        SubstanceSelector::ChemicalClass(class) => {
            format!("[[Chemical class::{class}]]|{SUBSTANCE_CATEGORY}")
        }
        SubstanceSelector::PsychoactiveClass(class) => {
            format!("[[Psychoactive class::{class}]]|{SUBSTANCE_CATEGORY}")
        }
        SubstanceSelector::Default => SUBSTANCE_CATEGORY.to_string(),
    }
}

/// Alternate lookups tried in order when the title query finds nothing.
pub fn query_fallbacks(query: &str) -> [String; 2] {
    [
        format!("[[common_name::{query}]]|[[Category:psychoactive_substance]]"),
        format!("[[systematic_name::{query}]]|[[Category:psychoactive_substance]]"),
    ]
}

/// OR-style effect match: every effect as its own conjunct, then the
/// category.
pub fn effects_conjunction(effects: &[String]) -> String {
    let mut query = String::new();
    for effect in effects {
        query.push_str(&format!("[[Effect::{effect}]]|"));
    }
    query.push_str(SUBSTANCE_CATEGORY);
    query
}

/// Effects attached to a single substance page, via printouts.
pub fn substance_effects(substance: &str) -> String {
    format!("[[:{substance}]]|?Effect")
}

pub fn effect_query(effect: Option<&str>) -> String {
    match effect {
        Some(effect) if !effect.is_empty() => format!("[[Effect::{effect}]]"),
        _ => EFFECT_CATEGORY.to_string(),
    }
}

/// Appends `|limit=N` / `|offset=M` only for non-zero values.
pub fn paginate(query: &str, limit: i64, offset: i64) -> String {
    let mut out = query.to_string();
    if limit > 0 {
        out.push_str(&format!("|limit={limit}"));
    }
    if offset > 0 {
        out.push_str(&format!("|offset={offset}"));
    }
    out
}

/// Projects `query.results` into pages. The upstream returns an object
/// keyed by title for non-empty result sets and an empty array otherwise.
pub fn project_results(payload: &Value) -> Vec<AskPage> {
    match payload.pointer("/query/results") {
        Some(Value::Object(map)) => map.values().filter_map(page_from_value).collect(),
        Some(Value::Array(items)) => items.iter().filter_map(page_from_value).collect(),
        _ => Vec::new(),
    }
}

/// Projects the `|?Effect` printouts of a single-subject ask result.
pub fn project_printouts(payload: &Value, subject: &str) -> Vec<AskPage> {
    payload
        .get("query")
        .and_then(|query| query.get("results"))
        .and_then(|results| results.get(subject))
        .and_then(|page| page.get("printouts"))
        .and_then(|printouts| printouts.get("Effect"))
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(page_from_value).collect())
        .unwrap_or_default()
}

fn page_from_value(value: &Value) -> Option<AskPage> {
    serde_json::from_value(value.clone()).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn selector_query_forms() {
        assert_eq!(
            substance_query(&SubstanceSelector::Query("LSD".into())),
            "[[:LSD]]"
        );
        assert_eq!(
            substance_query(&SubstanceSelector::Query(String::new())),
            "[[Category:Psychoactive substance]]"
        );
        assert_eq!(
            substance_query(&SubstanceSelector::Default),
            "[[Category:Psychoactive substance]]"
        );
        assert_eq!(
            substance_query(&SubstanceSelector::ChemicalClass("Phenethylamines".into())),
            "[[Chemical class::Phenethylamines]]|[[Category:Psychoactive substance]]"
        );
        assert_eq!(
            substance_query(&SubstanceSelector::PsychoactiveClass("Stimulants".into())),
            "[[Psychoactive class::Stimulants]]|[[Category:Psychoactive substance]]"
        );
        assert_eq!(
            substance_query(&SubstanceSelector::Effect("Euphoria".into())),
            "[[Effect::Euphoria]]|[[Category:Psychoactive substance]]"
        );
    }

    #[test]
    fn fallbacks_cover_common_then_systematic_names() {
        let [common, systematic] = query_fallbacks("Speed");
        assert_eq!(
            common,
            "[[common_name::Speed]]|[[Category:psychoactive_substance]]"
        );
        assert_eq!(
            systematic,
            "[[systematic_name::Speed]]|[[Category:psychoactive_substance]]"
        );
    }

    #[test]
    fn multiple_effects_become_conjuncts() {
        assert_eq!(
            effects_conjunction(&["Euphoria".into(), "Sedation".into()]),
            "[[Effect::Euphoria]]|[[Effect::Sedation]]|[[Category:Psychoactive substance]]"
        );
    }

    #[test]
    fn effect_queries() {
        assert_eq!(effect_query(Some("Euphoria")), "[[Effect::Euphoria]]");
        assert_eq!(effect_query(None), "[[Category:Effect]]");
        assert_eq!(effect_query(Some("")), "[[Category:Effect]]");
        assert_eq!(substance_effects("LSD"), "[[:LSD]]|?Effect");
    }

    #[test]
    fn pagination_is_appended_only_when_truthy() {
        assert_eq!(paginate("[[:X]]", 0, 0), "[[:X]]");
        assert_eq!(paginate("[[:X]]", 10, 0), "[[:X]]|limit=10");
        assert_eq!(paginate("[[:X]]", 0, 5), "[[:X]]|offset=5");
        assert_eq!(paginate("[[:X]]", 10, 5), "[[:X]]|limit=10|offset=5");
    }

    #[test]
    fn projects_object_results_in_order() {
        let payload = json!({
            "query": {
                "results": {
                    "LSD": {"fulltext": "LSD", "fullurl": "https://example.org/wiki/LSD"},
                    "DMT": {"fulltext": "DMT", "fullurl": "https://example.org/wiki/DMT"},
                }
            }
        });

        let pages = project_results(&payload);
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].name, "LSD");
        assert_eq!(pages[1].name, "DMT");
        assert_eq!(pages[0].url, "https://example.org/wiki/LSD");
    }

    #[test]
    fn empty_results_come_back_as_an_array() {
        let payload = json!({"query": {"results": []}});
        assert!(project_results(&payload).is_empty());
        assert!(project_results(&json!({})).is_empty());
    }

    #[test]
    fn printouts_are_read_from_the_subject_entry() {
        let payload = json!({
            "query": {
                "results": {
                    "LSD": {
                        "printouts": {
                            "Effect": [
                                {"fulltext": "Euphoria", "fullurl": "https://example.org/wiki/Euphoria"},
                            ]
                        }
                    }
                }
            }
        });

        let effects = project_printouts(&payload, "LSD");
        assert_eq!(effects.len(), 1);
        assert_eq!(effects[0].name, "Euphoria");

        assert!(project_printouts(&payload, "DMT").is_empty());
    }
}
