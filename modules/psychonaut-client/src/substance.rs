//! Typed substance record and the property dispatch that fills it.
//!
//! Property names coming off the transformer are matched against a small
//! regex table (routes, doses, durations, bioavailability, tolerance) and a
//! set of flat meta-properties. Names the schema cannot express are dropped
//! rather than guessed at.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::semantic::{SemanticProperty, SmwValue};
use crate::wikitext;

/// The closed set of routes of administration; anything else is dropped.
pub const ROUTE_NAMES: [&str; 10] = [
    "oral",
    "sublingual",
    "buccal",
    "insufflated",
    "rectal",
    "transdermal",
    "subcutaneous",
    "intramuscular",
    "intravenous",
    "smoked",
];

static ROUTE_TIME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(.+?)_(.+?)_(.+?)_time$").unwrap());
static ROUTE_DOSE_RANGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(.+?)_(.+?)_(.+?)_dose$").unwrap());
static ROUTE_DOSE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(.+?)_(.+?)_dose$").unwrap());
static ROUTE_BIO: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(.+?)_(.+?)_bioavailability$").unwrap());
static DOSE_UNITS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(.+?)_dose_units$").unwrap());
static TIME_UNITS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(.+?)_(.+?)_time_units$").unwrap());
static TOLERANCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^time_to_(.+?)_tolerance$").unwrap());

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ValueRange {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DurationRange {
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub units: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RouteDose {
    pub units: Option<String>,
    pub threshold: Option<f64>,
    pub heavy: Option<f64>,
    pub light: Option<ValueRange>,
    pub common: Option<ValueRange>,
    pub strong: Option<ValueRange>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RouteDuration {
    pub onset: Option<DurationRange>,
    pub comeup: Option<DurationRange>,
    pub peak: Option<DurationRange>,
    pub offset: Option<DurationRange>,
    pub afterglow: Option<DurationRange>,
    pub total: Option<DurationRange>,
    pub duration: Option<DurationRange>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Route {
    pub name: String,
    pub dose: Option<RouteDose>,
    pub duration: Option<RouteDuration>,
    pub bioavailability: Option<ValueRange>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClassMembership {
    pub chemical: Option<Vec<String>>,
    pub psychoactive: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToleranceProfile {
    pub full: Option<String>,
    pub half: Option<String>,
    pub zero: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubstanceRecord {
    pub featured: Option<bool>,
    pub class: Option<ClassMembership>,
    pub tolerance: Option<ToleranceProfile>,
    /// Routes in upstream property order; backs both the keyed `roa`
    /// projection and the `roas` list.
    pub routes: Vec<Route>,
    pub addiction_potential: Option<String>,
    pub toxicity: Option<Vec<String>>,
    pub cross_tolerances: Option<Vec<String>>,
    pub common_names: Option<Vec<String>>,
    pub systematic_name: Option<String>,
    pub uncertain_interactions: Option<Vec<String>>,
    pub unsafe_interactions: Option<Vec<String>>,
    pub dangerous_interactions: Option<Vec<String>>,
    pub effects: Option<Vec<String>>,
}

impl SubstanceRecord {
    pub fn route(&self, name: &str) -> Option<&Route> {
        self.routes.iter().find(|route| route.name == name)
    }
}

/// Assembles a record from decoded semantic properties. Pure; the same
/// input always yields a structurally equal record.
pub fn parse_record(properties: &[SemanticProperty]) -> SubstanceRecord {
    let mut record = SubstanceRecord::default();
    for property in properties {
        if matches!(property.value, SmwValue::Null) {
            continue;
        }
        // A name matches at most one route pattern, but may additionally
        // be a meta-property; both writes go through.
        dispatch_route(&mut record, &property.name, &property.value);
        dispatch_meta(&mut record, &property.name, &property.value);
    }
    record
}

fn dispatch_route(record: &mut SubstanceRecord, name: &str, value: &SmwValue) {
    if let Some(caps) = ROUTE_TIME.captures(name) {
        if let (Some(number), Some(route)) = (value.number(), route_entry(record, &caps[1])) {
            let duration = route.duration.get_or_insert_with(Default::default);
            if let Some(range) = stage_slot(duration, &caps[2]) {
                set_duration_bound(range, &caps[3], number);
            }
        }
        return;
    }

    if let Some(caps) = ROUTE_DOSE_RANGE.captures(name) {
        if let (Some(number), Some(route)) = (value.number(), route_entry(record, &caps[1])) {
            let dose = route.dose.get_or_insert_with(Default::default);
            if let Some(range) = intensity_range(dose, &caps[2]) {
                set_range_bound(range, &caps[3], number);
            }
        }
        return;
    }

    if let Some(caps) = ROUTE_DOSE.captures(name) {
        if let (Some(number), Some(route)) = (value.number(), route_entry(record, &caps[1])) {
            let dose = route.dose.get_or_insert_with(Default::default);
            match caps[2].to_lowercase().as_str() {
                "threshold" => dose.threshold = Some(number),
                "heavy" => dose.heavy = Some(number),
                _ => {}
            }
        }
        return;
    }

    if let Some(caps) = ROUTE_BIO.captures(name) {
        if let (Some(number), Some(route)) = (value.number(), route_entry(record, &caps[1])) {
            let range = route.bioavailability.get_or_insert_with(Default::default);
            set_range_bound(range, &caps[2], number);
        }
        return;
    }

    if let Some(caps) = DOSE_UNITS.captures(name) {
        if let (Some(units), Some(route)) = (value.text(), route_entry(record, &caps[1])) {
            route.dose.get_or_insert_with(Default::default).units = Some(units);
        }
        return;
    }

    if let Some(caps) = TIME_UNITS.captures(name) {
        if let (Some(units), Some(route)) = (value.text(), route_entry(record, &caps[1])) {
            let duration = route.duration.get_or_insert_with(Default::default);
            if let Some(range) = stage_slot(duration, &caps[2]) {
                range.units = Some(units);
            }
        }
        return;
    }

    if let Some(caps) = TOLERANCE.captures(name) {
        if let Some(text) = value.text() {
            let tolerance = record.tolerance.get_or_insert_with(Default::default);
            match caps[1].to_lowercase().as_str() {
                "full" => tolerance.full = Some(text),
                "half" => tolerance.half = Some(text),
                "zero" => tolerance.zero = Some(text),
                _ => {}
            }
        }
    }
}

fn dispatch_meta(record: &mut SubstanceRecord, name: &str, value: &SmwValue) {
    match name.to_lowercase().as_str() {
        "addiction_potential" => {
            record.addiction_potential = value.text().map(|text| wikitext::strip_markup(&text));
        }
        "systematic_name" => {
            record.systematic_name = value.text().map(|text| wikitext::strip_markup(&text));
        }
        "uncertaininteraction" => record.uncertain_interactions = Some(string_list(value)),
        "unsafeinteraction" => record.unsafe_interactions = Some(string_list(value)),
        "dangerousinteraction" => record.dangerous_interactions = Some(string_list(value)),
        "effect" => record.effects = Some(string_list(value)),
        "common_name" => record.common_names = Some(class_list(value)),
        "cross-tolerance" => record.cross_tolerances = Some(cross_tolerances(value)),
        "featured" => record.featured = Some(value.text().as_deref() == Some("t")),
        "toxicity" => record.toxicity = Some(string_list(value)),
        "psychoactive_class" => {
            record
                .class
                .get_or_insert_with(Default::default)
                .psychoactive = Some(class_list(value));
        }
        "chemical_class" => {
            record.class.get_or_insert_with(Default::default).chemical = Some(class_list(value));
        }
        _ => {}
    }
}

fn route_entry<'a>(record: &'a mut SubstanceRecord, name: &str) -> Option<&'a mut Route> {
    let name = name.to_lowercase();
    if !ROUTE_NAMES.contains(&name.as_str()) {
        return None;
    }
    if let Some(index) = record.routes.iter().position(|route| route.name == name) {
        return record.routes.get_mut(index);
    }
    record.routes.push(Route {
        name,
        ..Default::default()
    });
    record.routes.last_mut()
}

fn stage_slot<'a>(duration: &'a mut RouteDuration, stage: &str) -> Option<&'a mut DurationRange> {
    let slot = match stage.to_lowercase().as_str() {
        "onset" => &mut duration.onset,
        "comeup" => &mut duration.comeup,
        "peak" => &mut duration.peak,
        "offset" => &mut duration.offset,
        "afterglow" => &mut duration.afterglow,
        "total" => &mut duration.total,
        "duration" => &mut duration.duration,
        _ => return None,
    };
    Some(slot.get_or_insert_with(Default::default))
}

fn intensity_range<'a>(dose: &'a mut RouteDose, intensity: &str) -> Option<&'a mut ValueRange> {
    let slot = match intensity.to_lowercase().as_str() {
        "light" => &mut dose.light,
        "common" => &mut dose.common,
        "strong" => &mut dose.strong,
        _ => return None,
    };
    Some(slot.get_or_insert_with(Default::default))
}

fn set_range_bound(range: &mut ValueRange, bound: &str, value: f64) {
    match bound.to_lowercase().as_str() {
        "min" => range.min = Some(value),
        "max" => range.max = Some(value),
        _ => {}
    }
}

fn set_duration_bound(range: &mut DurationRange, bound: &str, value: f64) {
    match bound.to_lowercase().as_str() {
        "min" => range.min = Some(value),
        "max" => range.max = Some(value),
        _ => {}
    }
}

/// Force-array with per-item wikitext sanitizing.
fn string_list(value: &SmwValue) -> Vec<String> {
    value
        .items()
        .iter()
        .map(|item| wikitext::strip_markup(&item.to_text()))
        .collect()
}

/// Class-name cleanup: drop the trailing `#`, underscores become spaces.
fn class_list(value: &SmwValue) -> Vec<String> {
    value
        .items()
        .iter()
        .map(|item| {
            let text = item.to_text();
            text.trim_end_matches('#').replace('_', " ").trim().to_string()
        })
        .collect()
}

fn cross_tolerances(value: &SmwValue) -> Vec<String> {
    value
        .items()
        .iter()
        .flat_map(|item| wikitext::link_targets(&item.to_text()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::semantic::{SmwItem, SmwValue};

    fn prop(name: &str, value: SmwValue) -> SemanticProperty {
        SemanticProperty {
            name: name.to_string(),
            value,
        }
    }

    fn number(value: f64) -> SmwValue {
        SmwValue::One(SmwItem::Number(value))
    }

    fn text(value: &str) -> SmwValue {
        SmwValue::One(SmwItem::Text(value.to_string()))
    }

    fn fixture() -> Vec<SemanticProperty> {
        vec![
            prop("oral_common_min_dose", number(10.0)),
            prop("oral_common_max_dose", number(20.0)),
            prop("oral_dose_units", text("mg")),
            prop("time_to_half_tolerance", text("3 days")),
            prop("psychoactive_class", text("stimulant_")),
            prop(
                "dangerousinteraction",
                SmwValue::Many(vec![
                    SmwItem::Text("Alcohol".into()),
                    SmwItem::Text("Cocaine".into()),
                ]),
            ),
        ]
    }

    #[test]
    fn dose_tolerance_class_and_interactions_land_in_place() {
        let record = parse_record(&fixture());

        let oral = record.route("oral").expect("oral route");
        let dose = oral.dose.as_ref().expect("oral dose");
        assert_eq!(
            dose.common,
            Some(ValueRange {
                min: Some(10.0),
                max: Some(20.0),
            })
        );
        assert_eq!(dose.units.as_deref(), Some("mg"));

        assert_eq!(
            record.tolerance.as_ref().and_then(|t| t.half.as_deref()),
            Some("3 days")
        );
        assert_eq!(
            record.class.as_ref().and_then(|c| c.psychoactive.clone()),
            Some(vec!["stimulant".to_string()])
        );
        assert_eq!(
            record.dangerous_interactions,
            Some(vec!["Alcohol".to_string(), "Cocaine".to_string()])
        );
        assert_eq!(record.routes.len(), 1);
        assert_eq!(record.routes[0].name, "oral");
    }

    #[test]
    fn parsing_is_idempotent() {
        let properties = fixture();
        assert_eq!(parse_record(&properties), parse_record(&properties));
    }

    #[test]
    fn unknown_route_names_are_dropped() {
        let record = parse_record(&[prop("osmotic_common_min_dose", number(5.0))]);
        assert!(record.routes.is_empty());
    }

    #[test]
    fn duration_stages_carry_independent_units() {
        let record = parse_record(&[
            prop("oral_onset_min_time", number(15.0)),
            prop("oral_onset_max_time", number(30.0)),
            prop("oral_onset_time_units", text("minutes")),
            prop("oral_total_time_units", text("hours")),
            prop("oral_total_min_time", number(4.0)),
        ]);

        let oral = record.route("oral").unwrap();
        let duration = oral.duration.as_ref().unwrap();
        assert_eq!(
            duration.onset,
            Some(DurationRange {
                min: Some(15.0),
                max: Some(30.0),
                units: Some("minutes".into()),
            })
        );
        assert_eq!(
            duration.total,
            Some(DurationRange {
                min: Some(4.0),
                max: None,
                units: Some("hours".into()),
            })
        );
    }

    #[test]
    fn scalar_doses_and_bioavailability() {
        let record = parse_record(&[
            prop("insufflated_threshold_dose", number(5.0)),
            prop("insufflated_heavy_dose", number(120.0)),
            prop("insufflated_min_bioavailability", number(50.0)),
            prop("insufflated_max_bioavailability", number(70.0)),
        ]);

        let route = record.route("insufflated").unwrap();
        let dose = route.dose.as_ref().unwrap();
        assert_eq!(dose.threshold, Some(5.0));
        assert_eq!(dose.heavy, Some(120.0));
        assert_eq!(
            route.bioavailability,
            Some(ValueRange {
                min: Some(50.0),
                max: Some(70.0),
            })
        );
    }

    #[test]
    fn cross_tolerance_links_are_extracted_every_time() {
        let value = text("[[Amphetamine]] and [[Methylphenidate]]");
        let first = parse_record(&[prop("cross-tolerance", value.clone())]);
        let second = parse_record(&[prop("cross-tolerance", value)]);

        let expected = Some(vec![
            "Amphetamine".to_string(),
            "Methylphenidate".to_string(),
        ]);
        assert_eq!(first.cross_tolerances, expected);
        assert_eq!(second.cross_tolerances, expected);
    }

    #[test]
    fn cross_tolerance_without_links_is_empty() {
        let record = parse_record(&[prop("cross-tolerance", text("stimulants"))]);
        assert_eq!(record.cross_tolerances, Some(Vec::new()));
    }

    #[test]
    fn featured_flag_only_accepts_t() {
        assert_eq!(
            parse_record(&[prop("featured", text("t"))]).featured,
            Some(true)
        );
        assert_eq!(
            parse_record(&[prop("featured", text("f"))]).featured,
            Some(false)
        );
    }

    #[test]
    fn scalar_list_fields_are_forced_to_arrays() {
        let record = parse_record(&[
            prop("toxicity", text("Low")),
            prop("uncertaininteraction", text("[[Caffeine]]")),
            prop("effect", text("Stimulation")),
        ]);
        assert_eq!(record.toxicity, Some(vec!["Low".to_string()]));
        assert_eq!(
            record.uncertain_interactions,
            Some(vec!["Caffeine".to_string()])
        );
        assert_eq!(record.effects, Some(vec!["Stimulation".to_string()]));
    }

    #[test]
    fn sanitized_meta_fields() {
        let record = parse_record(&[
            prop("addiction_potential", text("moderate with [[Tolerance|tolerance]]")),
            prop("systematic_name", text("N,N-diethyl<sub>lysergamide</sub>")),
        ]);
        assert_eq!(
            record.addiction_potential.as_deref(),
            Some("moderate with tolerance")
        );
        assert_eq!(
            record.systematic_name.as_deref(),
            Some("N,N-diethyllysergamide")
        );
    }
}
