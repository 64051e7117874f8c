use dewater_core::{
	build_feature_record, feature_importance, features::read_feature_records,
	generate_synthetic_dataset, predict, predict_batch, Error, Model, PumpStatus, TimeOfDay,
};
use std::path::PathBuf;

fn fixture_path() -> PathBuf {
	PathBuf::from(env!("CARGO_MANIFEST_DIR"))
		.join("fixtures")
		.join("pump_rf_model.json")
}

fn load_fixture() -> Model {
	Model::from_path(&fixture_path()).unwrap()
}

#[test]
fn test_default_inputs() {
	let model = load_fixture();
	let record = build_feature_record(5.0, 30.0, 400.0, TimeOfDay::Noon, 15.0);
	assert_eq!(record.to_numbers(), [5.0, 30.0, 400.0, 2.0, 15.0]);
	let result = predict(&model, &record).unwrap();
	assert!((result.probability - 0.65).abs() < 1e-6);
	assert_eq!(result.label, PumpStatus::On);
	assert_eq!(result.label.label(), 1);
	assert_eq!(model.class_name(result.label.label() as usize), Some("ON"));
}

#[test]
fn test_low_water_is_off() {
	let model = load_fixture();
	let record = build_feature_record(2.0, 10.0, 100.0, TimeOfDay::Night, 18.0);
	let result = predict(&model, &record).unwrap();
	assert!((result.probability - 0.05).abs() < 1e-6);
	assert_eq!(result.label, PumpStatus::Off);
}

#[test]
fn test_time_of_day_reaches_the_model() {
	let model = load_fixture();
	let night = build_feature_record(7.0, 20.0, 100.0, TimeOfDay::Night, 18.0);
	let noon = build_feature_record(7.0, 20.0, 100.0, TimeOfDay::Noon, 18.0);
	let night = predict(&model, &night).unwrap();
	let noon = predict(&model, &noon).unwrap();
	assert!((night.probability - 0.55 / 3.0).abs() < 1e-6);
	assert!((noon.probability - 1.05 / 3.0).abs() < 1e-6);
}

#[test]
fn test_fixture_importances() {
	let model = load_fixture();
	let importances = feature_importance(&model).unwrap();
	assert_eq!(importances.len(), 5);
	assert!(importances.iter().all(|entry| entry.weight >= 0.0));
	assert!((importances.sum() - 1.0).abs() < 1e-4);
	assert_eq!(importances.sorted()[0].feature_name, "water_level");
}

#[test]
fn test_synthetic_dataset_is_reproducible() {
	let model = load_fixture();
	let first = generate_synthetic_dataset(&model, 1000, 42).unwrap();
	let second = generate_synthetic_dataset(&model, 1000, 42).unwrap();
	assert_eq!(first.len(), 1000);
	assert_eq!(
		first.rows[0].record.water_level.to_bits(),
		second.rows[0].record.water_level.to_bits()
	);
	assert_eq!(first, second);
	let records: Vec<_> = first.records().copied().collect();
	assert_eq!(predict_batch(&model, &records).unwrap(), first.rows);
	let on_count = first.on_count();
	assert!(on_count > 0 && on_count < 1000);
}

#[test]
fn test_binary_artifact_matches_json_fixture() {
	let model = load_fixture();
	let path = std::env::temp_dir().join(format!("dewater_fixture_{}.pump", std::process::id()));
	model.to_file(&path).unwrap();
	let loaded = Model::from_path(&path);
	std::fs::remove_file(&path).unwrap();
	assert_eq!(loaded.unwrap(), model);
}

#[test]
fn test_corrupt_artifact() {
	let path = std::env::temp_dir().join(format!("dewater_corrupt_{}.pump", std::process::id()));
	std::fs::write(&path, [0u8, 0xc1, 0xc1, 0xc1]).unwrap();
	let result = Model::from_path(&path);
	std::fs::remove_file(&path).unwrap();
	assert!(matches!(result, Err(Error::Load { .. })));
}

#[test]
fn test_read_csv_inputs() {
	let model = load_fixture();
	let path = std::env::temp_dir().join(format!("dewater_inputs_{}.csv", std::process::id()));
	// Columns are shuffled and the site column is not a feature. The last row has a water level above the documented range.
	let csv = "diesel_cost,site,time_of_day,water_level,solar_irradiance,rain_forecast
15,north,2,5,400,30
18,south,0,2,100,10
15,east,2,12,400,30
";
	std::fs::write(&path, csv).unwrap();
	let records = read_feature_records(&path);
	std::fs::remove_file(&path).unwrap();
	let records = records.unwrap();
	assert_eq!(
		records,
		vec![
			build_feature_record(5.0, 30.0, 400.0, TimeOfDay::Noon, 15.0),
			build_feature_record(2.0, 10.0, 100.0, TimeOfDay::Night, 18.0),
			build_feature_record(12.0, 30.0, 400.0, TimeOfDay::Noon, 15.0),
		]
	);
	let results = predict_batch(&model, &records).unwrap();
	let labels: Vec<PumpStatus> = results.iter().map(|result| result.label).collect();
	assert_eq!(labels, vec![PumpStatus::On, PumpStatus::Off, PumpStatus::On]);
	assert!((results[0].probability - 0.65).abs() < 1e-6);
	assert!((results[1].probability - 0.05).abs() < 1e-6);
	assert!((results[2].probability - 0.9).abs() < 1e-6);
}

#[test]
fn test_read_csv_inputs_with_invalid_number() {
	let path = std::env::temp_dir().join(format!("dewater_invalid_{}.csv", std::process::id()));
	let csv = "water_level,rain_forecast,solar_irradiance,time_of_day,diesel_cost
5,30,400,2,15
abc,30,400,2,15
";
	std::fs::write(&path, csv).unwrap();
	let result = read_feature_records(&path);
	std::fs::remove_file(&path).unwrap();
	match result {
		Err(Error::Input(message)) => assert_eq!(message, "row 2 has invalid water_level NaN"),
		result => panic!("{:?}", result),
	}
}
