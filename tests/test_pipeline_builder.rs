//! Integration test: pipeline assembly from user choices

use loanfit::error::LoanfitError;
use loanfit::pipeline::{
    build_pipeline, FeatureCreation, FeatureSelection, ModelChoice, PipelineConfig, SelectorModel, CREATION_MENU,
    SELECTION_MENU,
};
use loanfit::scoring::ProfitScorer;
use loanfit::training::ClassWeight;

fn config(model: ModelChoice) -> PipelineConfig {
    PipelineConfig::new(model).with_features(
        vec!["annual_inc".into(), "dti".into(), "int_rate".into()],
        vec!["grade".into()],
    )
}

#[test]
fn test_passthrough_pipeline_has_only_preprocessing() {
    let pipe = build_pipeline(
        &config(ModelChoice::LogisticRegression { c_range: None }),
        &ProfitScorer::default(),
    )
    .unwrap();

    assert_eq!(pipe.active_stages(), vec!["columntransformer"]);
    let steps = pipe.steps();
    let slots: Vec<&str> = steps.iter().map(|s| s.step).collect();
    assert_eq!(slots, vec!["columntransformer", "feature_create", "feature_select", "clf"]);
    assert_eq!(steps[1].estimator, "passthrough");
    assert_eq!(steps[2].estimator, "passthrough");
    assert_eq!(steps[3].estimator, "LogisticRegression");
}

#[test]
fn test_steps_are_deterministic() {
    let cfg = config(ModelChoice::LinearSvc { c_range: Some((0.01, 10.0)) })
        .with_selection(FeatureSelection::parse_menu("SelectKBest(f_classif)").unwrap())
        .with_creation(FeatureCreation::Polynomial {
            degree: 2,
            interaction_only: false,
        });
    let scorer = ProfitScorer::default();

    let a = build_pipeline(&cfg, &scorer).unwrap().steps();
    let b = build_pipeline(&cfg, &scorer).unwrap().steps();
    assert_eq!(a, b);
    assert_eq!(a[1].estimator, "PolynomialFeatures");
    assert_eq!(a[2].estimator, "SelectKBest");
    assert_eq!(a[3].estimator, "LinearSVC");
}

#[test]
fn test_every_menu_combination_builds() {
    let scorer = ProfitScorer::default();
    for select in SELECTION_MENU {
        for create in CREATION_MENU {
            let cfg = config(ModelChoice::Ridge { alpha_range: None })
                .with_selection(FeatureSelection::parse_menu(select).unwrap())
                .with_creation(FeatureCreation::parse_menu(create).unwrap());
            let built = build_pipeline(&cfg, &scorer);
            assert!(built.is_ok(), "{} / {}: {:?}", select, create, built.err());
        }
    }
}

#[test]
fn test_selector_menu_defaults() {
    assert_eq!(
        FeatureSelection::parse_menu(SELECTION_MENU[6]).unwrap(),
        FeatureSelection::SelectFromModel {
            estimator: SelectorModel::LinearSvcL1 {
                class_weight: ClassWeight::Balanced
            },
            threshold: 0.5,
        }
    );
    assert_eq!(
        FeatureSelection::parse_menu("PCA(10)").unwrap(),
        FeatureSelection::Pca { n_components: 10 }
    );
}

#[test]
fn test_invalid_choices() {
    assert!(matches!(
        "Random Forest".parse::<ModelChoice>(),
        Err(LoanfitError::InvalidModel(_))
    ));
    assert!(matches!(
        FeatureSelection::parse_menu("VarianceThreshold()"),
        Err(LoanfitError::InvalidFeatureSelection(_))
    ));
    assert!(matches!(
        FeatureSelection::parse_menu("SelectFromModel(RandomForest())"),
        Err(LoanfitError::InvalidFeatureSelection(_))
    ));
    assert!(matches!(
        FeatureCreation::parse_menu("SplineTransformer"),
        Err(LoanfitError::InvalidFeatureCreation(_))
    ));

    let bad_degree = config(ModelChoice::Lasso { alpha_range: None }).with_creation(FeatureCreation::Polynomial {
        degree: 9,
        interaction_only: false,
    });
    assert!(build_pipeline(&bad_degree, &ProfitScorer::default()).is_err());

    let no_features = PipelineConfig::new(ModelChoice::Lasso { alpha_range: None });
    assert!(build_pipeline(&no_features, &ProfitScorer::default()).is_err());
}
