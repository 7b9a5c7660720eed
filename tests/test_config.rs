//! Tests for configuration parsing
//!
//! This file tests the config module including:
//! - Loading the bundled JSON config files
//! - Defaults for missing fields
//! - Rejecting invalid values, invalid JSON and missing files

use std::io::Write;

use rust_convnet::config::{load_config, ConvNetConfig, Precision};
use rust_convnet::convnet::{build_model, AnyConvNet};
use rust_convnet::error::ConvNetError;
use rust_convnet::utils::SimpleRng;
use tempfile::NamedTempFile;

fn write_temp_config(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("failed to create temp file");
    file.write_all(contents.as_bytes())
        .expect("failed to write temp config");
    file
}

// ============================================================================
// Bundled Config Tests
// ============================================================================

mod bundled_config_tests {
    use super::*;

    #[test]
    fn test_load_default_config_matches_default() {
        let config = load_config("config/convnet_default.json").expect("default config");
        assert_eq!(config, ConvNetConfig::default());
    }

    #[test]
    fn test_load_small_config() {
        let config = load_config("config/convnet_small.json").expect("small config");
        assert_eq!(config.input_dim, [3, 16, 16]);
        assert_eq!(config.filter_size, 3);
        assert_eq!(config.num_classes, 5);
        assert_eq!(config.precision, Precision::F32);
    }

    #[test]
    fn test_load_gradcheck_config_builds_f64_model() {
        let config = load_config("config/convnet_gradcheck.json").expect("gradcheck config");
        assert_eq!(config.precision, Precision::F64);
        assert!(config.reg > 0.0);

        let mut rng = SimpleRng::new(1);
        let model = build_model(&config, &mut rng).unwrap();
        match model {
            AnyConvNet::F64(net) => assert_eq!(net.input_dim(), config.input_dim),
            AnyConvNet::F32(_) => panic!("expected an f64 network"),
        }
    }
}

// ============================================================================
// Temporary Config Tests
// ============================================================================

mod temp_config_tests {
    use super::*;

    #[test]
    fn test_missing_fields_use_defaults() {
        let file = write_temp_config(r#"{ "hidden_dim": 64, "reg": 0.01 }"#);
        let config = load_config(file.path()).unwrap();

        assert_eq!(config.hidden_dim, 64);
        assert!((config.reg - 0.01).abs() < 1e-12);
        assert_eq!(config.num_filters, 32);
        assert_eq!(config.filter_size, 7);
        assert_eq!(config.input_dim, [3, 32, 32]);
    }

    #[test]
    fn test_even_filter_size_rejected() {
        let file = write_temp_config(r#"{ "filter_size": 6 }"#);
        let err = load_config(file.path()).unwrap_err();
        assert!(matches!(err, ConvNetError::InvalidConfig(_)));
    }

    #[test]
    fn test_odd_input_height_rejected() {
        let file = write_temp_config(r#"{ "input_dim": [3, 31, 32] }"#);
        assert!(matches!(
            load_config(file.path()),
            Err(ConvNetError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_zero_classes_rejected() {
        let file = write_temp_config(r#"{ "num_classes": 0 }"#);
        assert!(load_config(file.path()).is_err());
    }

    #[test]
    fn test_negative_weight_scale_rejected() {
        let file = write_temp_config(r#"{ "weight_scale": -1.0 }"#);
        assert!(load_config(file.path()).is_err());
    }

    #[test]
    fn test_unknown_precision_rejected() {
        let file = write_temp_config(r#"{ "precision": "f16" }"#);
        assert!(matches!(
            load_config(file.path()),
            Err(ConvNetError::Json(_))
        ));
    }

    #[test]
    fn test_invalid_json() {
        let file = write_temp_config("{ not json");
        assert!(matches!(
            load_config(file.path()),
            Err(ConvNetError::Json(_))
        ));
    }
}

#[test]
fn test_missing_file() {
    let result = load_config("config/does_not_exist.json");
    assert!(matches!(result, Err(ConvNetError::Io(_))));
}
