#[cfg(test)]
mod tests {
    use std::io::Write;
    use tempfile::NamedTempFile;
    use rin_tuning::{
        config::{load_user_specifications, parse_user_specifications, PassiveDefaults, TuningTarget},
        error::ConfigurationError,
    };

    fn write_specification(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();

        file
    }

    #[test]
    pub fn test_full_specification() -> Result<(), ConfigurationError> {
        let file = write_specification(r#"{"e_pas": -70.0, "cm": 1.5, "ra": 120, "R-in": 150.0}"#);

        let target = load_user_specifications(file.path())?;

        assert_eq!(
            target,
            TuningTarget {
                input_resistance: Some(150.),
                passive_defaults: PassiveDefaults {
                    e_pas: Some(-70.),
                    cm: Some(1.5),
                    ra: Some(120.),
                },
            },
        );

        Ok(())
    }

    #[test]
    pub fn test_partial_specification() -> Result<(), ConfigurationError> {
        let target = parse_user_specifications(r#"{"r_in": 90}"#)?;
        assert_eq!(target.input_resistance, Some(90.));
        assert_eq!(target.passive_defaults, PassiveDefaults::default());

        let target = parse_user_specifications("{}")?;
        assert_eq!(target, TuningTarget::default());

        let target = parse_user_specifications(r#"{"e_pas": -80, "celsius": 34}"#)?;
        assert_eq!(target.passive_defaults.e_pas, Some(-80.));
        assert_eq!(target.input_resistance, None);

        Ok(())
    }

    #[test]
    pub fn test_rejects_non_mapping() {
        assert!(matches!(
            parse_user_specifications("[1, 2, 3]"),
            Err(ConfigurationError::NotAMapping),
        ));
        assert!(matches!(
            parse_user_specifications("150.0"),
            Err(ConfigurationError::NotAMapping),
        ));
    }

    #[test]
    pub fn test_rejects_nested_values() {
        assert!(matches!(
            parse_user_specifications(r#"{"R-in": {"value": 150.0}}"#),
            Err(ConfigurationError::NotFlatMapping(key)) if key == "R-in",
        ));
        assert!(matches!(
            parse_user_specifications(r#"{"e_pas": "-70"}"#),
            Err(ConfigurationError::NotFlatMapping(_)),
        ));
        assert!(matches!(
            parse_user_specifications(r#"{"cm": [1.0]}"#),
            Err(ConfigurationError::NotFlatMapping(_)),
        ));
    }

    #[test]
    pub fn test_unreadable_and_malformed_files() {
        let file = write_specification(r#"{"R-in": 150.0"#);

        assert!(matches!(
            load_user_specifications(file.path()),
            Err(ConfigurationError::MalformedJson(_)),
        ));

        let dir = tempfile::tempdir().unwrap();

        assert!(matches!(
            load_user_specifications(dir.path().join("missing.json")),
            Err(ConfigurationError::UnreadableFile(_)),
        ));
    }
}
