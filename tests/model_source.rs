#[cfg(test)]
mod tests {
    use std::{fs, path::Path};
    use rin_tuning::{
        compartment::SectionGeometry,
        config::PassiveDefaults,
        error::{ModelIdentifierError, ModelSourceError},
        model::{
            soma_geometry_from_swc, Capacitance, DirectoryModelSource, ModelDescription,
            ModelIdentifier, ModelSource,
        },
    };

    const FIT_PARAMETERS: &str = r#"{
        "passive": [
            {
                "ra": "138.28",
                "e_pas": "-92.5",
                "cm": [
                    {"section": "soma", "cm": "1.0"},
                    {"section": "dend", "cm": "2.12"}
                ]
            }
        ],
        "genome": [
            {"section": "soma", "name": "gbar_NaV", "value": "0.0734", "mechanism": "NaV"},
            {"section": "soma", "name": "g_pas", "value": "0.000447", "mechanism": ""},
            {"section": "dend", "name": "g_pas", "value": 9.5e-06}
        ],
        "conditions": [{"celsius": 34.0, "v_init": -92.5}]
    }"#;

    const MANIFEST: &str = r#"{
        "biophys": [
            {
                "model_file": ["manifest.json", "fit_parameters.json"],
                "model_type": "Biophysical - all active"
            }
        ],
        "manifest": [
            {"key": "BASEDIR", "type": "dir", "spec": "."},
            {"key": "MORPHOLOGY", "type": "file", "spec": "reconstruction.swc"}
        ]
    }"#;

    const RECONSTRUCTION: &str = "\
# id type x y z radius parent
1 1 0.0 0.0 0.0 5.0 -1
2 1 0.0 10.0 0.0 7.0 1
3 1 0.0 20.0 0.0 6.0 2
4 3 0.0 30.0 0.0 1.0 3
";

    fn write_bundle(root: &Path, id: u64) {
        let bundle = root.join(id.to_string());
        fs::create_dir_all(&bundle).unwrap();

        fs::write(bundle.join("manifest.json"), MANIFEST).unwrap();
        fs::write(bundle.join("fit_parameters.json"), FIT_PARAMETERS).unwrap();
        fs::write(bundle.join("reconstruction.swc"), RECONSTRUCTION).unwrap();
    }

    #[test]
    pub fn test_model_identifier() -> Result<(), ModelIdentifierError> {
        assert_eq!(ModelIdentifier::parse("488683425")?, ModelIdentifier(488683425));
        assert_eq!(
            ModelIdentifier::parse("http://celltypes.brain-map.org/experiment/electrophysiology/488683425")?,
            ModelIdentifier(488683425),
        );
        assert_eq!(ModelIdentifier::parse("cell 12 of 40")?, ModelIdentifier(12));
        assert_eq!(ModelIdentifier(488683425).to_string(), "488683425");

        assert_eq!(ModelIdentifier::from_argument(Some("488683425"))?, ModelIdentifier(488683425));
        assert!(matches!(
            ModelIdentifier::from_argument(None),
            Err(ModelIdentifierError::MissingArgument),
        ));
        assert!(matches!(
            ModelIdentifier::from_argument(Some("none")),
            Err(ModelIdentifierError::NoDigits(_)),
        ));

        assert!(matches!(ModelIdentifier::parse("soma"), Err(ModelIdentifierError::NoDigits(_))));
        assert!(matches!(ModelIdentifier::parse(""), Err(ModelIdentifierError::NoDigits(_))));
        assert!(matches!(
            ModelIdentifier::parse("99999999999999999999999"),
            Err(ModelIdentifierError::InvalidDigits(_)),
        ));

        Ok(())
    }

    #[test]
    pub fn test_description_from_strings() -> Result<(), ModelSourceError> {
        let description = ModelDescription::from_json_str(FIT_PARAMETERS)?;

        let passive = description.passive().unwrap();
        assert_eq!(passive.e_pas, Some(-92.5));
        assert_eq!(passive.ra, Some(138.28));
        match &passive.cm {
            Some(Capacitance::PerSection(entries)) => {
                assert_eq!(entries.len(), 2);
                assert_eq!(entries[1].section, "dend");
                assert_eq!(entries[1].cm, 2.12);
            },
            other => panic!("unexpected capacitance {:?}", other),
        }

        assert_eq!(description.genome.len(), 3);
        assert_eq!(description.genome[0].mechanism, "NaV");
        assert_eq!(description.genome[2].mechanism, "");
        assert_eq!(description.parameter_values("soma", "g_pas"), vec![0.000447]);
        assert_eq!(description.parameter_values("dend", "g_pas"), vec![9.5e-6]);
        assert!(description.parameter_values("axon", "g_pas").is_empty());
        assert!(description.conditions.is_some());

        assert!(matches!(
            ModelDescription::from_json_str(r#"{"genome": [{"section": "soma", "name": "g_pas", "value": "leak"}]}"#),
            Err(ModelSourceError::MalformedAsset(_)),
        ));

        Ok(())
    }

    #[test]
    pub fn test_fill_missing_passive() -> Result<(), ModelSourceError> {
        let defaults = PassiveDefaults { e_pas: Some(-70.), cm: Some(1.), ra: Some(100.) };

        let mut description = ModelDescription::from_json_str(FIT_PARAMETERS)?;
        assert!(description.fill_missing_passive(&defaults).is_empty());
        assert_eq!(description.passive().unwrap().e_pas, Some(-92.5));

        let mut description = ModelDescription::from_json_str(r#"{"passive": [{"ra": 150}], "genome": []}"#)?;
        assert_eq!(description.fill_missing_passive(&defaults), vec!["e_pas", "cm"]);

        let passive = description.passive().unwrap();
        assert_eq!(passive.e_pas, Some(-70.));
        assert_eq!(passive.cm, Some(Capacitance::Uniform(1.)));
        assert_eq!(passive.ra, Some(150.));

        let mut description = ModelDescription::default();
        assert_eq!(description.fill_missing_passive(&PassiveDefaults::default()), Vec::<&str>::new());
        assert_eq!(description.passive.len(), 1);

        Ok(())
    }

    #[test]
    pub fn test_soma_geometry() -> Result<(), ModelSourceError> {
        let geometry = soma_geometry_from_swc("1 1 0 0 0 10 -1\n2 3 0 15 0 1 1\n")?;
        assert_eq!(geometry, SectionGeometry { diameter: 20., length: 20. });

        let geometry = soma_geometry_from_swc(RECONSTRUCTION)?;
        assert!((geometry.length - 20.).abs() < 1e-9);
        assert!((geometry.diameter - 12.).abs() < 1e-9);

        assert!(matches!(
            soma_geometry_from_swc("1 3 0 0 0 1 -1\n"),
            Err(ModelSourceError::MalformedAsset(_)),
        ));
        assert!(matches!(
            soma_geometry_from_swc("1 1 0 zero 0 1 -1\n"),
            Err(ModelSourceError::MalformedAsset(_)),
        ));

        Ok(())
    }

    #[test]
    pub fn test_directory_source() -> Result<(), ModelSourceError> {
        let models = tempfile::tempdir().unwrap();
        let work = tempfile::tempdir().unwrap();
        write_bundle(models.path(), 488683425);

        let source = DirectoryModelSource::new(models.path());

        assert!(matches!(
            source.query(ModelIdentifier(1)),
            Err(ModelSourceError::ModelNotFound(1)),
        ));

        let descriptor = source.query(ModelIdentifier(488683425))?;
        assert_eq!(descriptor.manifest.fit_parameters_file()?, "fit_parameters.json");
        assert_eq!(
            descriptor.manifest.files()?,
            vec!["manifest.json", "fit_parameters.json", "reconstruction.swc"],
        );

        let destination = work.path().join("488683425");
        let assets = source.materialize(&descriptor, &destination)?;

        assert!(destination.join("manifest.json").is_file());
        assert!(destination.join("fit_parameters.json").is_file());
        assert!(destination.join("reconstruction.swc").is_file());
        assert_eq!(assets.directory, destination);
        assert_eq!(assets.description, ModelDescription::from_json_str(FIT_PARAMETERS)?);
        assert!((assets.soma.diameter - 12.).abs() < 1e-9);

        Ok(())
    }

    #[test]
    pub fn test_materialize_onto_itself() -> Result<(), ModelSourceError> {
        let models = tempfile::tempdir().unwrap();
        write_bundle(models.path(), 7);

        let source = DirectoryModelSource::new(models.path());
        let descriptor = source.query(ModelIdentifier(7))?;

        // same directory reached through a different spelling
        let destination = models.path().join("7").join("..").join("7");
        let assets = source.materialize(&descriptor, &destination)?;

        let bundle = models.path().join("7");
        assert_eq!(fs::read_to_string(bundle.join("manifest.json")).unwrap(), MANIFEST);
        assert_eq!(fs::read_to_string(bundle.join("fit_parameters.json")).unwrap(), FIT_PARAMETERS);
        assert_eq!(fs::read_to_string(bundle.join("reconstruction.swc")).unwrap(), RECONSTRUCTION);
        assert_eq!(assets.description, ModelDescription::from_json_str(FIT_PARAMETERS)?);

        Ok(())
    }

    #[test]
    pub fn test_bundle_without_morphology() -> Result<(), ModelSourceError> {
        let models = tempfile::tempdir().unwrap();
        let bundle = models.path().join("7");
        fs::create_dir_all(&bundle).unwrap();
        fs::write(
            bundle.join("manifest.json"),
            r#"{"biophys": [{"model_file": ["manifest.json", "fit.json"]}], "manifest": []}"#,
        ).unwrap();
        fs::write(bundle.join("fit.json"), FIT_PARAMETERS).unwrap();

        let source = DirectoryModelSource::new(models.path());
        let descriptor = source.query(ModelIdentifier(7))?;

        assert!(matches!(
            source.materialize(&descriptor, &models.path().join("work")),
            Err(ModelSourceError::MissingManifestEntry(_)),
        ));

        Ok(())
    }
}
