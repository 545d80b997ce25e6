use anyhow::Result;
use qnet::{QNetError, QNetwork, QNetworkConfig, Tensor};
use std::path::PathBuf;

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("qnet-{}-{name}.json", std::process::id()))
}

#[test]
fn save_and_load_preserve_outputs() -> Result<()> {
    let mut net = QNetwork::new(4, 2, 3)?;
    net.params_mut()[0].data_mut()[0] = 0.75;
    let state = Tensor::vector(vec![0.1, 0.2, 0.3, 0.4]);

    let path = temp_path("roundtrip");
    net.save(&path)?;
    let loaded = QNetwork::load(&path)?;
    std::fs::remove_file(&path)?;

    assert_eq!(loaded.config(), net.config());
    assert_eq!(loaded.forward(&state)?, net.forward(&state)?);
    Ok(())
}

#[test]
fn snapshot_lists_both_stages() {
    let net = QNetwork::new(4, 2, 0).unwrap();
    let snapshot = net.snapshot();
    assert_eq!(snapshot.layers.len(), 2);
    assert_eq!(snapshot.layers[0].weight.len(), 32 * 4);
    assert_eq!(snapshot.layers[0].bias.len(), 32);
    assert_eq!(snapshot.layers[1].weight.len(), 2 * 32);
    assert_eq!(snapshot.layers[1].bias.len(), 2);
}

#[test]
fn load_params_copies_between_networks() {
    let source = QNetwork::new(4, 2, 1).unwrap();
    let mut target = QNetwork::new(4, 2, 2).unwrap();
    target.load_params(&source.snapshot()).unwrap();
    let state = Tensor::vector(vec![0.5, -0.5, 1.0, 0.0]);
    assert_eq!(target.forward(&state).unwrap(), source.forward(&state).unwrap());
    assert_eq!(target.seed(), 2);
}

#[test]
fn mismatched_architecture_is_rejected() {
    let source = QNetwork::new(4, 3, 0).unwrap();
    let mut target = QNetwork::new(4, 2, 0).unwrap();
    assert!(matches!(
        target.load_params(&source.snapshot()),
        Err(QNetError::InvalidConfig(_))
    ));
}

#[test]
fn truncated_snapshot_is_rejected() {
    let net = QNetwork::with_config(&QNetworkConfig::new(4, 2, 0)).unwrap();
    let mut snapshot = net.snapshot();
    snapshot.layers[1].bias.pop();
    assert!(matches!(QNetwork::from_snapshot(&snapshot), Err(QNetError::InvalidShape(_))));

    snapshot.layers.pop();
    assert!(matches!(QNetwork::from_snapshot(&snapshot), Err(QNetError::InvalidShape(_))));
}

#[test]
fn loaded_params_are_saved_with_the_target_seed() -> Result<()> {
    let source = QNetwork::new(4, 2, 1)?;
    let mut target = QNetwork::new(4, 2, 2)?;
    target.load_params(&source.snapshot())?;

    let snapshot = target.snapshot();
    assert_eq!(snapshot.config.seed, 2);
    assert_eq!(snapshot.layers, source.snapshot().layers);
    Ok(())
}
