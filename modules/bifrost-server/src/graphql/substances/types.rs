use async_graphql::*;

use psychonaut_client::ask::AskPage;
use psychonaut_client::page::PageImage;
use psychonaut_client::substance::{
    ClassMembership, DurationRange, Route, RouteDose, RouteDuration, SubstanceRecord,
    ToleranceProfile, ValueRange,
};

/// A psychoactive substance page. Listing queries fill `name`/`url` only;
/// the semantic fields come from enrichment, and the remaining fields
/// resolve lazily per request.
#[derive(SimpleObject, Clone, Default)]
#[graphql(complex)]
pub struct Substance {
    pub name: Option<String>,
    pub url: Option<String>,
    pub featured: Option<bool>,
    pub class: Option<SubstanceClass>,
    pub tolerance: Option<SubstanceTolerance>,
    pub roa: Option<SubstanceRoaTypes>,
    pub roas: Option<Vec<SubstanceRoa>>,
    pub addiction_potential: Option<String>,
    pub toxicity: Option<Vec<String>>,
    pub cross_tolerances: Option<Vec<String>>,
    pub common_names: Option<Vec<String>>,
    pub systematic_name: Option<String>,

    #[graphql(skip)]
    pub uncertain_interactions_raw: Option<Vec<String>>,
    #[graphql(skip)]
    pub unsafe_interactions_raw: Option<Vec<String>>,
    #[graphql(skip)]
    pub dangerous_interactions_raw: Option<Vec<String>>,
}

impl Substance {
    pub fn from_page(page: AskPage) -> Self {
        Self {
            name: Some(page.name),
            url: Some(page.url),
            ..Default::default()
        }
    }

    /// Name-only placeholder for interaction names that did not resolve to
    /// exactly one page.
    pub fn stub(name: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            ..Default::default()
        }
    }

    pub fn enriched(page: AskPage, record: SubstanceRecord) -> Self {
        Self {
            name: Some(page.name),
            url: Some(page.url),
            featured: record.featured,
            class: record.class.map(SubstanceClass::from),
            tolerance: record.tolerance.map(SubstanceTolerance::from),
            roa: roa_types(&record.routes),
            roas: Some(
                record
                    .routes
                    .iter()
                    .cloned()
                    .map(SubstanceRoa::from)
                    .collect(),
            ),
            addiction_potential: record.addiction_potential,
            toxicity: record.toxicity,
            cross_tolerances: record.cross_tolerances,
            common_names: record.common_names,
            systematic_name: record.systematic_name,
            uncertain_interactions_raw: record.uncertain_interactions,
            unsafe_interactions_raw: record.unsafe_interactions,
            dangerous_interactions_raw: record.dangerous_interactions,
        }
    }
}

#[derive(SimpleObject, Clone, Default)]
pub struct SubstanceClass {
    pub chemical: Option<Vec<String>>,
    pub psychoactive: Option<Vec<String>>,
}

impl From<ClassMembership> for SubstanceClass {
    fn from(class: ClassMembership) -> Self {
        Self {
            chemical: class.chemical,
            psychoactive: class.psychoactive,
        }
    }
}

#[derive(SimpleObject, Clone, Default)]
pub struct SubstanceTolerance {
    pub full: Option<String>,
    pub half: Option<String>,
    pub zero: Option<String>,
}

impl From<ToleranceProfile> for SubstanceTolerance {
    fn from(tolerance: ToleranceProfile) -> Self {
        Self {
            full: tolerance.full,
            half: tolerance.half,
            zero: tolerance.zero,
        }
    }
}

#[derive(SimpleObject, Clone, Default)]
pub struct SubstanceRoaRange {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl From<ValueRange> for SubstanceRoaRange {
    fn from(range: ValueRange) -> Self {
        Self {
            min: range.min,
            max: range.max,
        }
    }
}

#[derive(SimpleObject, Clone, Default)]
pub struct SubstanceRoaDurationRange {
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub units: Option<String>,
}

impl From<DurationRange> for SubstanceRoaDurationRange {
    fn from(range: DurationRange) -> Self {
        Self {
            min: range.min,
            max: range.max,
            units: range.units,
        }
    }
}

#[derive(SimpleObject, Clone, Default)]
pub struct SubstanceRoaDose {
    pub units: Option<String>,
    pub threshold: Option<f64>,
    pub heavy: Option<f64>,
    pub light: Option<SubstanceRoaRange>,
    pub common: Option<SubstanceRoaRange>,
    pub strong: Option<SubstanceRoaRange>,
}

impl From<RouteDose> for SubstanceRoaDose {
    fn from(dose: RouteDose) -> Self {
        Self {
            units: dose.units,
            threshold: dose.threshold,
            heavy: dose.heavy,
            light: dose.light.map(SubstanceRoaRange::from),
            common: dose.common.map(SubstanceRoaRange::from),
            strong: dose.strong.map(SubstanceRoaRange::from),
        }
    }
}

#[derive(SimpleObject, Clone, Default)]
pub struct SubstanceRoaDuration {
    pub onset: Option<SubstanceRoaDurationRange>,
    pub comeup: Option<SubstanceRoaDurationRange>,
    pub peak: Option<SubstanceRoaDurationRange>,
    pub offset: Option<SubstanceRoaDurationRange>,
    pub afterglow: Option<SubstanceRoaDurationRange>,
    pub total: Option<SubstanceRoaDurationRange>,
    pub duration: Option<SubstanceRoaDurationRange>,
}

impl From<RouteDuration> for SubstanceRoaDuration {
    fn from(duration: RouteDuration) -> Self {
        Self {
            onset: duration.onset.map(SubstanceRoaDurationRange::from),
            comeup: duration.comeup.map(SubstanceRoaDurationRange::from),
            peak: duration.peak.map(SubstanceRoaDurationRange::from),
            offset: duration.offset.map(SubstanceRoaDurationRange::from),
            afterglow: duration.afterglow.map(SubstanceRoaDurationRange::from),
            total: duration.total.map(SubstanceRoaDurationRange::from),
            duration: duration.duration.map(SubstanceRoaDurationRange::from),
        }
    }
}

#[derive(SimpleObject, Clone, Default)]
pub struct SubstanceRoa {
    pub name: Option<String>,
    pub dose: Option<SubstanceRoaDose>,
    pub duration: Option<SubstanceRoaDuration>,
    pub bioavailability: Option<SubstanceRoaRange>,
}

impl From<Route> for SubstanceRoa {
    fn from(route: Route) -> Self {
        Self {
            name: Some(route.name),
            dose: route.dose.map(SubstanceRoaDose::from),
            duration: route.duration.map(SubstanceRoaDuration::from),
            bioavailability: route.bioavailability.map(SubstanceRoaRange::from),
        }
    }
}

/// The same routes as `roas`, keyed by name.
#[derive(SimpleObject, Clone, Default)]
pub struct SubstanceRoaTypes {
    pub oral: Option<SubstanceRoa>,
    pub sublingual: Option<SubstanceRoa>,
    pub buccal: Option<SubstanceRoa>,
    pub insufflated: Option<SubstanceRoa>,
    pub rectal: Option<SubstanceRoa>,
    pub transdermal: Option<SubstanceRoa>,
    pub subcutaneous: Option<SubstanceRoa>,
    pub intramuscular: Option<SubstanceRoa>,
    pub intravenous: Option<SubstanceRoa>,
    pub smoked: Option<SubstanceRoa>,
}

fn roa_types(routes: &[Route]) -> Option<SubstanceRoaTypes> {
    if routes.is_empty() {
        return None;
    }
    let mut keyed = SubstanceRoaTypes::default();
    for route in routes {
        let roa = SubstanceRoa::from(route.clone());
        match route.name.as_str() {
            "oral" => keyed.oral = Some(roa),
            "sublingual" => keyed.sublingual = Some(roa),
            "buccal" => keyed.buccal = Some(roa),
            "insufflated" => keyed.insufflated = Some(roa),
            "rectal" => keyed.rectal = Some(roa),
            "transdermal" => keyed.transdermal = Some(roa),
            "subcutaneous" => keyed.subcutaneous = Some(roa),
            "intramuscular" => keyed.intramuscular = Some(roa),
            "intravenous" => keyed.intravenous = Some(roa),
            "smoked" => keyed.smoked = Some(roa),
            _ => {}
        }
    }
    Some(keyed)
}

#[derive(SimpleObject, Clone)]
pub struct SubstanceImage {
    pub thumb: Option<String>,
    pub image: Option<String>,
}

impl From<PageImage> for SubstanceImage {
    fn from(image: PageImage) -> Self {
        Self {
            thumb: Some(image.thumb),
            image: Some(image.image),
        }
    }
}
