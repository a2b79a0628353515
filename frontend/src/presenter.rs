use shared::{Diagnosis, PredictionResult, Recommendation, Severity};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusTone {
    Healthy,
    Attention,
}

impl StatusTone {
    pub fn of(prediction: Diagnosis) -> Self {
        if prediction.is_healthy() {
            StatusTone::Healthy
        } else {
            StatusTone::Attention
        }
    }

    pub fn css_class(self) -> &'static str {
        match self {
            StatusTone::Healthy => "status-healthy",
            StatusTone::Attention => "status-attention",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            StatusTone::Healthy => "fa-solid fa-circle-check",
            StatusTone::Attention => "fa-solid fa-circle-exclamation",
        }
    }
}

/// Badge emphasis for a severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeverityEmphasis {
    Calm,
    Elevated,
    Critical,
    Unclassified,
}

impl From<Severity> for SeverityEmphasis {
    fn from(severity: Severity) -> Self {
        match severity {
            Severity::None => SeverityEmphasis::Calm,
            Severity::Moderate => SeverityEmphasis::Elevated,
            Severity::High => SeverityEmphasis::Critical,
            Severity::Unclassified => SeverityEmphasis::Unclassified,
        }
    }
}

impl SeverityEmphasis {
    pub fn css_class(self) -> &'static str {
        match self {
            SeverityEmphasis::Calm => "severity-none",
            SeverityEmphasis::Elevated => "severity-moderate",
            SeverityEmphasis::Critical => "severity-high",
            SeverityEmphasis::Unclassified => "severity-unclassified",
        }
    }
}

pub fn confidence_percent(confidence: f64) -> u32 {
    (confidence * 100.0).round() as u32
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassShare<'a> {
    pub label: &'a str,
    pub percent: f64,
}

/// Everything the result screen shows, derived from one prediction.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultView<'a> {
    pub headline: String,
    pub tone: StatusTone,
    pub emphasis: SeverityEmphasis,
    pub confidence_percent: u32,
    /// `None` for healthy plants: the symptoms panel is not rendered.
    pub symptoms: Option<&'a str>,
    pub recommendations_heading: &'static str,
    pub recommendation: &'a Recommendation,
    pub breakdown: Vec<ClassShare<'a>>,
}

impl<'a> ResultView<'a> {
    pub fn derive(result: &'a PredictionResult) -> Self {
        let healthy = result.prediction.is_healthy();
        let headline = if healthy {
            "Plant is Healthy!".to_string()
        } else {
            format!("{} Deficiency Detected", result.prediction)
        };

        let mut breakdown: Vec<ClassShare<'a>> = result
            .class_probabilities
            .iter()
            .map(|(label, probability)| ClassShare {
                label: label.as_str(),
                percent: probability * 100.0,
            })
            .collect();
        breakdown.sort_by(|a, b| b.percent.total_cmp(&a.percent));

        Self {
            headline,
            tone: StatusTone::of(result.prediction),
            emphasis: result.recommendation.severity.into(),
            confidence_percent: confidence_percent(result.confidence),
            symptoms: (!healthy).then_some(result.recommendation.symptoms.as_str()),
            recommendations_heading: if healthy {
                "Maintenance Tips"
            } else {
                "Treatment Recommendations"
            },
            recommendation: &result.recommendation,
            breakdown,
        }
    }

    pub fn confidence_label(&self) -> String {
        format!("{}% Confidence", self.confidence_percent)
    }

    pub fn details(&self) -> [(&'static str, &'a str); 5] {
        let r = self.recommendation;
        [
            ("Organic Fertilizer", r.organic_fertilizer.as_str()),
            ("Form", r.form.as_str()),
            ("Dosage per Plant", r.dosage_per_plant.as_str()),
            ("Sunlight", r.sunlight_requirement.as_str()),
            ("Humidity", r.humidity_requirement.as_str()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn result(prediction: Diagnosis, severity: Severity, confidence: f64) -> PredictionResult {
        PredictionResult {
            prediction,
            confidence,
            class_probabilities: BTreeMap::new(),
            recommendation: Recommendation {
                severity,
                symptoms: "Blossom-end rot".into(),
                organic_fertilizer: "Eggshell".into(),
                form: "Liquid/Powder".into(),
                dosage_per_plant: "1 tsp / 50 ml".into(),
                sunlight_requirement: "5-7 hours sunlight".into(),
                humidity_requirement: "50-60%".into(),
                color: Some("red".into()),
            },
        }
    }

    #[test]
    fn confidence_rounds_to_whole_percent() {
        assert_eq!(confidence_percent(0.873), 87);
        assert_eq!(confidence_percent(0.875), 88);
        assert_eq!(confidence_percent(0.0), 0);
        assert_eq!(confidence_percent(1.0), 100);
    }

    #[test]
    fn healthy_hides_symptoms_whatever_the_other_fields_say() {
        let healthy = result(Diagnosis::Healthy, Severity::None, 0.99);
        let view = ResultView::derive(&healthy);
        assert_eq!(view.symptoms, None);
        assert_eq!(view.tone, StatusTone::Healthy);
        assert_eq!(view.headline, "Plant is Healthy!");
        assert_eq!(view.recommendations_heading, "Maintenance Tips");
        assert_eq!(view.emphasis, SeverityEmphasis::Calm);
    }

    #[test]
    fn high_severity_nitrogen_shows_critical_panel() {
        let nitrogen = result(Diagnosis::Nitrogen, Severity::High, 0.6);
        let view = ResultView::derive(&nitrogen);
        assert_eq!(view.symptoms, Some("Blossom-end rot"));
        assert_eq!(view.emphasis, SeverityEmphasis::Critical);
        assert_eq!(view.emphasis.css_class(), "severity-high");
        assert_eq!(view.tone, StatusTone::Attention);
        assert_eq!(view.headline, "Nitrogen Deficiency Detected");
        assert_eq!(view.recommendations_heading, "Treatment Recommendations");
    }

    #[test]
    fn unknown_severity_gets_neutral_treatment() {
        let odd = result(Diagnosis::Calcium, Severity::Unclassified, 0.5);
        assert_eq!(
            ResultView::derive(&odd).emphasis.css_class(),
            "severity-unclassified"
        );
    }

    #[test]
    fn breakdown_is_sorted_by_probability() {
        let mut calcium = result(Diagnosis::Calcium, Severity::High, 0.7);
        calcium.class_probabilities = BTreeMap::from([
            ("Calcium".to_string(), 0.7),
            ("healthy".to_string(), 0.05),
            ("Nitrogen".to_string(), 0.25),
        ]);

        let view = ResultView::derive(&calcium);
        let labels: Vec<&str> = view.breakdown.iter().map(|share| share.label).collect();
        assert_eq!(labels, ["Calcium", "Nitrogen", "healthy"]);
        assert!((view.breakdown[0].percent - 70.0).abs() < 1e-9);
    }
}
