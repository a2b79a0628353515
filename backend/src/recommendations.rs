use lazy_static::lazy_static;
use shared::{Diagnosis, Recommendation, Severity};
use std::collections::BTreeMap;

fn entry(
    severity: Severity,
    symptoms: &str,
    organic_fertilizer: &str,
    form: &str,
    dosage_per_plant: &str,
    sunlight_requirement: &str,
    humidity_requirement: &str,
    color: &str,
) -> Recommendation {
    Recommendation {
        severity,
        symptoms: symptoms.to_string(),
        organic_fertilizer: organic_fertilizer.to_string(),
        form: form.to_string(),
        dosage_per_plant: dosage_per_plant.to_string(),
        sunlight_requirement: sunlight_requirement.to_string(),
        humidity_requirement: humidity_requirement.to_string(),
        color: Some(color.to_string()),
    }
}

lazy_static! {
    static ref CATALOG: BTreeMap<Diagnosis, Recommendation> = BTreeMap::from([
        (
            Diagnosis::Nitrogen,
            entry(
                Severity::Moderate,
                "Pale-yellow leaves",
                "Banana peel, tea compost",
                "Liquid/Powder",
                "50-100 ml / 1-2 tbsp",
                "6-8 hours direct sunlight",
                "50-70%",
                "yellow",
            ),
        ),
        (
            Diagnosis::Phosphorus,
            entry(
                Severity::Moderate,
                "Dark green/ purple leaves",
                "Bone meal, Banana peel powder",
                "Powder",
                "1 tbsp",
                "6-8 hours",
                "45-60%",
                "purple",
            ),
        ),
        (
            Diagnosis::Potassium,
            entry(
                Severity::Moderate,
                "Brown leaf edges, curling",
                "Banana peel tea, wood ash",
                "Liquid/Powder",
                "70-100 ml / 1 tsp ash",
                "6-8 hours",
                "50-70%",
                "orange",
            ),
        ),
        (
            Diagnosis::Calcium,
            entry(
                Severity::High,
                "Blossom-end rot",
                "Eggshell",
                "Liquid/Powder",
                "1 tsp / 50 ml",
                "5-7 hours sunlight",
                "50-60%",
                "red",
            ),
        ),
        (
            Diagnosis::Magnesium,
            entry(
                Severity::Moderate,
                "Yellow leaf veins",
                "Green leaf compost",
                "Powder/ soil mix",
                "1/2 - 1 cup per plant mixed into soil, every 2 weeks",
                "6-8 hours",
                "40-60%",
                "yellow",
            ),
        ),
        (
            Diagnosis::Iron,
            entry(
                Severity::Moderate,
                "Yellow young leaves",
                "Compost tea",
                "Liquid",
                "40-60 ml",
                "5-7 hours",
                "50-70%",
                "yellow",
            ),
        ),
        (
            Diagnosis::Healthy,
            entry(
                Severity::None,
                "No deficiency detected",
                "Continue regular fertilization schedule",
                "As per routine",
                "Maintain current dosage",
                "6-8 hours",
                "50-70%",
                "green",
            ),
        ),
    ]);
}

pub fn catalog() -> &'static BTreeMap<Diagnosis, Recommendation> {
    &CATALOG
}

/// Treatment advice for a diagnosis, falling back to the healthy routine.
pub fn recommendation_for(diagnosis: Diagnosis) -> Option<&'static Recommendation> {
    CATALOG
        .get(&diagnosis)
        .or_else(|| CATALOG.get(&Diagnosis::Healthy))
}
