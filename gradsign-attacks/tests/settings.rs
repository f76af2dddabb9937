use gradsign_attacks::{
    bim, fgsm, illcm, load_settings, onestep,
    settings::canonical_json,
    AttackMethod, AttackSettings,
};
use gradsign_oracle::{nn::MLP, CrossEntropyLoss};
use ndarray::arr2;
use serde_json::{json, Map, Value};
use std::str::FromStr;

fn object(value: Value) -> Option<Map<String, Value>> {
    value.as_object().cloned()
}

#[test]
fn test_default_hyperparameters() {
    let fgsm_hp = fgsm::Hyperparameters::from_map(&None).unwrap();
    assert_eq!(fgsm_hp.epsilon, 0.25);
    assert_eq!((fgsm_hp.valid_min, fgsm_hp.valid_max), (0.0, 1.0));

    let onestep_hp = onestep::Hyperparameters::from_map(&None).unwrap();
    assert_eq!(onestep_hp.target, None);
    assert_eq!(onestep_hp.epsilon, 0.25);

    let bim_hp = bim::Hyperparameters::from_map(&None).unwrap();
    assert_eq!(bim_hp, bim::Hyperparameters::default());
    assert_eq!(
        (bim_hp.epsilon, bim_hp.nb_iter, bim_hp.alpha),
        (0.25, 10, 0.1)
    );

    let illcm_hp = illcm::Hyperparameters::from_map(&None).unwrap();
    assert_eq!(illcm_hp.target, None);
    assert!(!illcm_hp.fix_target);
    assert_eq!(
        (illcm_hp.epsilon, illcm_hp.nb_iter, illcm_hp.alpha),
        (0.25, 10, 0.1)
    );
}

#[test]
fn test_partial_hyperparameters_keep_defaults() {
    let hp = illcm::Hyperparameters::from_map(&object(json!({
        "target": [2, 0],
        "nb_iter": 3
    })))
    .unwrap();
    assert_eq!(hp.target, Some(vec![2, 0]));
    assert_eq!(hp.nb_iter, 3);
    assert_eq!(hp.alpha, 0.1);
    assert_eq!(hp.epsilon, 0.25);
}

#[test]
fn test_misconfiguration_is_rejected() {
    let err = fgsm::Hyperparameters::from_map(&object(json!({ "epsilon": -0.1 }))).unwrap_err();
    assert!(err.to_string().contains("epsilon"));

    let err = bim::Hyperparameters::from_map(&object(json!({ "alpha": -1.0 }))).unwrap_err();
    assert!(err.to_string().contains("alpha"));

    let err = onestep::Hyperparameters::from_map(&object(json!({
        "valid_min": 1.0,
        "valid_max": 0.0
    })))
    .unwrap_err();
    assert!(err.to_string().contains("valid_min"));

    let err = bim::Hyperparameters::from_map(&object(json!({ "nb_iter": -3 }))).unwrap_err();
    assert!(err.to_string().starts_with("Failed to parse hyperparameters"));

    // attacks validate hyperparameters built in code too
    let mut model = MLP::new(&[2, 2]).unwrap();
    model.init_weights([1u8; 32]);
    let data = arr2(&[[0.5f32, 0.5]]).into_dyn();
    let hp = fgsm::Hyperparameters {
        epsilon: f32::NAN,
        ..Default::default()
    };
    assert!(fgsm::attack(&model, &data, &[0], &CrossEntropyLoss, &hp).is_err());
}

#[test]
fn test_unknown_hyperparameters_are_rejected() {
    let err = fgsm::Hyperparameters::from_map(&object(json!({ "eps": 0.1 }))).unwrap_err();
    assert!(err.to_string().contains("unknown field `eps`"));

    // a target only means something to the targeted attacks
    let err = bim::Hyperparameters::from_map(&object(json!({ "target": [1] }))).unwrap_err();
    assert!(err.to_string().contains("unknown field `target`"));
    assert!(onestep::Hyperparameters::from_map(&object(json!({ "target": [1] }))).is_ok());

    let err = illcm::Hyperparameters::from_map(&object(json!({ "fixed_target": true }))).unwrap_err();
    assert!(err.to_string().starts_with("Failed to parse hyperparameters"));

    let settings = load_settings(r#"{"method": "noop", "hyperparameters": {"epsilon": 0.1}}"#).unwrap();
    let data = arr2(&[[0.5f32, 0.5]]).into_dyn();
    let model = MLP::new(&[2, 2]).unwrap();
    assert!(settings.run(&model, &data, &[0], &CrossEntropyLoss).is_err());
}

#[test]
fn test_method_names() {
    for method in AttackMethod::ALL {
        assert_eq!(AttackMethod::from_str(method.name()).unwrap(), method);
        assert_eq!(method.to_string(), method.name());
    }
    assert!(AttackMethod::from_str("cw").is_err());
    assert!(AttackMethod::Illcm.is_targeted() && AttackMethod::Illcm.is_iterative());
    assert!(!AttackMethod::Fgsm.is_targeted() && !AttackMethod::Fgsm.is_iterative());
}

#[test]
fn test_settings_from_json() {
    let settings = load_settings(r#"{"method": "bim", "hyperparameters": {"nb_iter": 2}}"#).unwrap();
    assert_eq!(settings.method, AttackMethod::Bim);
    assert_eq!(settings.hyperparameters, object(json!({ "nb_iter": 2 })));

    let settings: AttackSettings = serde_json::from_str(r#"{"method": "noop"}"#).unwrap();
    assert_eq!(settings, AttackSettings::new(AttackMethod::Noop));

    assert!(load_settings(r#"{"method": "deepfool"}"#).is_err());
}

#[test]
fn test_settings_from_file() {
    let path = std::env::temp_dir().join(format!("gradsign-settings-{}.json", std::process::id()));
    std::fs::write(&path, r#"{"method": "illcm", "hyperparameters": {"fix_target": true}}"#)
        .unwrap();
    let settings = load_settings(path.to_str().unwrap()).unwrap();
    std::fs::remove_file(&path).unwrap();
    assert_eq!(settings.method, AttackMethod::Illcm);

    let err = load_settings("/nonexistent/gradsign.json").unwrap_err();
    assert!(err.to_string().starts_with("Failed to read settings file"));
}

#[test]
fn test_canonical_json_sorts_keys() {
    let settings = AttackSettings {
        method: AttackMethod::Onestep,
        hyperparameters: object(json!({ "valid_max": 0.9, "epsilon": 0.5 })),
    };
    assert_eq!(
        canonical_json(&settings).unwrap(),
        r#"{"hyperparameters":{"epsilon":0.5,"valid_max":0.9},"method":"onestep"}"#
    );
    assert_eq!(settings.to_string(), canonical_json(&settings).unwrap());
}

#[test]
fn test_settings_run_dispatches() {
    let mut model = MLP::new(&[2, 4, 2]).unwrap();
    model.init_weights([2u8; 32]);
    let data = arr2(&[[0.2f32, 0.7], [0.9, 0.1]]).into_dyn();
    let labels = [0, 1];

    let noop = AttackSettings::new(AttackMethod::Noop);
    assert_eq!(
        noop.run(&model, &data, &labels, &CrossEntropyLoss).unwrap(),
        data
    );

    let settings = AttackSettings {
        method: AttackMethod::Fgsm,
        hyperparameters: object(json!({ "epsilon": 0.05 })),
    };
    let expected = fgsm::attack(
        &model,
        &data,
        &labels,
        &CrossEntropyLoss,
        &fgsm::Hyperparameters {
            epsilon: 0.05,
            ..Default::default()
        },
    )
    .unwrap();
    assert_eq!(
        settings.run(&model, &data, &labels, &CrossEntropyLoss).unwrap(),
        expected
    );
}
