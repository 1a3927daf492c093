use serde::{Deserialize, Serialize};

/// The specification for the `Resolution` enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionSpec {
    Overwrite,
    Ignore,
    #[default]
    Die,
}

/// The specification for the `ConflictResolver` struct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ResolverSpec {
    pub resolution: ResolutionSpec,
    #[serde(default)]
    pub verbose: bool,
}

/// The specification for the `LearningScenario` trait.
///
/// Settings left out fall back to the defaults of each scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioSpec {
    Fixed {
        #[serde(default)]
        apply_to: Option<Vec<String>>,
        #[serde(default)]
        inheritable: Option<bool>,
        #[serde(default)]
        conflict: Option<ResolverSpec>,
    },
    GradientDescent {
        learning_rate: f32,
        #[serde(default)]
        momentum: f32,
        #[serde(default)]
        reverse: bool,
        #[serde(default)]
        apply_to: Option<Vec<String>>,
        #[serde(default)]
        inheritable: Option<bool>,
        #[serde(default)]
        conflict: Option<ResolverSpec>,
    },
}

/// The specification for the `ScenarioChain` struct, scenarios are applied in order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ChainSpec {
    pub scenarios: Vec<ScenarioSpec>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gradient_descent_defaults_are_filled_in() {
        let json = r#"{ "gradient_descent": { "learning_rate": 0.1 } }"#;
        let spec: ScenarioSpec = serde_json::from_str(json).unwrap();

        assert_eq!(
            spec,
            ScenarioSpec::GradientDescent {
                learning_rate: 0.1,
                momentum: 0.0,
                reverse: false,
                apply_to: None,
                inheritable: None,
                conflict: None,
            }
        );
    }

    #[test]
    fn chain_with_resolvers() {
        let json = r#"{
            "scenarios": [
                { "gradient_descent": { "learning_rate": 0.5, "momentum": 0.9 } },
                {
                    "fixed": {
                        "apply_to": ["bias"],
                        "conflict": { "resolution": "overwrite", "verbose": true }
                    }
                }
            ]
        }"#;

        let spec: ChainSpec = serde_json::from_str(json).unwrap();
        assert_eq!(spec.scenarios.len(), 2);

        let ScenarioSpec::Fixed {
            apply_to, conflict, ..
        } = &spec.scenarios[1]
        else {
            panic!("expected a fixed scenario, got {:?}", spec.scenarios[1]);
        };

        assert_eq!(apply_to.as_deref(), Some(&["bias".to_string()][..]));
        assert_eq!(
            *conflict,
            Some(ResolverSpec {
                resolution: ResolutionSpec::Overwrite,
                verbose: true,
            })
        );
    }

    #[test]
    fn resolver_verbosity_defaults_to_false() {
        let spec: ResolverSpec = serde_json::from_str(r#"{ "resolution": "ignore" }"#).unwrap();
        assert_eq!(spec.resolution, ResolutionSpec::Ignore);
        assert!(!spec.verbose);
    }
}
