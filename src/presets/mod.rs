//! Built-in measurement configurations for common services.
//!
//! A preset is data only: a name, a one-line description and the embedded
//! document it loads. `None` carries no document and selects the ad-hoc mode
//! where every listed series is measured with the requested statistics.

use crate::error::CheckError;
use crate::measurement::MeasurementConfiguration;

/// Name of the preset without a document.
pub const AD_HOC_PRESET: &str = "None";

#[derive(Debug, Clone, Copy)]
pub struct Preset {
    pub name: &'static str,
    pub description: &'static str,
    document: Option<&'static str>,
}

pub static PRESETS: [Preset; 5] = [
    Preset {
        name: AD_HOC_PRESET,
        description: "No Service Presets Active, use cmdline --namespace --metric --dimension-filters to tailer cloudwatch results",
        document: None,
    },
    Preset {
        name: "CLB",
        description: "Preset Metrics for AWS Classic Load Balancer",
        document: Some(include_str!("clb.json")),
    },
    Preset {
        name: "ALB",
        description: "Preset Metrics for AWS Application Load Balancer",
        document: Some(include_str!("alb.json")),
    },
    Preset {
        name: "EC2",
        description: "Preset Metrics for AWS EC2",
        document: Some(include_str!("ec2.json")),
    },
    Preset {
        name: "CloudFront",
        description: "Preset Metrics for AWS CloudFront. Note: requires --region us-east-1",
        document: Some(include_str!("cloudfront.json")),
    },
];

impl Preset {
    pub fn is_ad_hoc(&self) -> bool {
        self.document.is_none()
    }

    /// Fresh copy of the preset configuration; the embedded text is never mutated.
    pub fn configuration(&self) -> Result<MeasurementConfiguration, CheckError> {
        match self.document {
            Some(text) => MeasurementConfiguration::from_text(text),
            None => Ok(MeasurementConfiguration::default()),
        }
    }
}

/// Every preset, one per line, with its description.
pub fn catalog() -> String {
    PRESETS
        .iter()
        .map(|preset| format!(" {} : {}", preset.name, preset.description))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Look a preset up by name, ignoring ASCII case.
pub fn find_preset(name: &str) -> Result<&'static Preset, CheckError> {
    let name = name.trim();
    PRESETS
        .iter()
        .find(|preset| preset.name.eq_ignore_ascii_case(name))
        .ok_or_else(|| CheckError::UnknownPreset {
            name: name.to_string(),
            catalog: catalog(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_preset_loads() {
        for preset in PRESETS.iter() {
            let configuration = preset.configuration().unwrap();
            if preset.is_ad_hoc() {
                assert!(configuration.measurements.is_empty());
            } else {
                assert!(configuration.namespace.starts_with("AWS/"), "{}", preset.name);
                assert!(!configuration.measurements.is_empty(), "{}", preset.name);
                for (metric, stats) in &configuration.measurements {
                    assert!(!stats.is_empty(), "{} {}", preset.name, metric);
                }
            }
        }
    }

    #[test]
    fn test_preset_contents() {
        let clb = find_preset("CLB").unwrap().configuration().unwrap();
        assert_eq!(clb.namespace, "AWS/ELB");
        assert_eq!(clb.dimension_filters.len(), 2);
        assert_eq!(clb.measurements.len(), 14);

        let alb = find_preset("ALB").unwrap().configuration().unwrap();
        assert_eq!(alb.namespace, "AWS/ApplicationELB");
        assert_eq!(alb.measurements.len(), 44);

        let ec2 = find_preset("ec2").unwrap().configuration().unwrap();
        assert_eq!(ec2.namespace, "AWS/EC2");
        assert_eq!(ec2.stats_for("CPUSurplusCreditsCharged").len(), 2);

        let cloudfront = find_preset("CloudFront").unwrap().configuration().unwrap();
        assert_eq!(cloudfront.namespace, "AWS/CloudFront");
    }

    #[test]
    fn test_lookup_ignores_surrounding_whitespace() {
        assert_eq!(find_preset("EC2 ").unwrap().name, "EC2");
        assert_eq!(find_preset(" alb").unwrap().name, "ALB");
    }

    #[test]
    fn test_copies_are_independent() {
        let preset = find_preset("EC2").unwrap();
        let mut first = preset.configuration().unwrap();
        first.measurements.clear();
        let second = preset.configuration().unwrap();
        assert!(!second.measurements.is_empty());
    }

    #[test]
    fn test_unknown_preset_lists_catalog() {
        let error = find_preset("RDS").unwrap_err();
        let message = error.to_string();
        assert!(message.starts_with("Preset RDS not defined\nChoose from:\n"));
        for preset in PRESETS.iter() {
            assert!(message.contains(preset.name));
            assert!(message.contains(preset.description));
        }
    }
}
