use std::path::Path;

const BLOOD_TYPES: [&str; 8] = ["A+", "A-", "B+", "B-", "AB+", "AB-", "O+", "O-"];
const URGENCY_LEVELS: [&str; 3] = ["High", "Medium", "Low"];

fn main() {
    let seed_path = Path::new("directory/seed.json");
    validate_seed_file(seed_path);
    set_build_dependencies();
}

fn validate_seed_file(seed_path: &Path) {
    // Ensure the seed directory exists at build time
    assert!(
        seed_path.exists(),
        "\n\nDIRECTORY BUILD ERROR: File not found\n\
         Path: {}\n\
         Please create the seed directory file before building.\n",
        seed_path.display()
    );

    let contents = std::fs::read_to_string(seed_path).unwrap_or_else(|e| {
        panic!(
            "\n\nDIRECTORY BUILD ERROR: Failed to read file\n\
             Path: {}\n\
             Error: {e}\n",
            seed_path.display()
        );
    });

    let seed: serde_json::Value = serde_json::from_str(&contents).unwrap_or_else(|e| {
        panic!(
            "\n\nDIRECTORY BUILD ERROR: Invalid JSON\n\
             Path: {}\n\
             Error: {e}\n\
             Hint: Check for missing commas, brackets, or invalid syntax.\n",
            seed_path.display()
        );
    });

    validate_seed_structure(&seed);
}

fn validate_seed_structure(seed: &serde_json::Value) {
    assert!(
        seed.is_object(),
        "\n\nDIRECTORY BUILD ERROR: Root must be a JSON object\n\
         Got: {seed}\n"
    );

    let donors = require_array(seed, "donors");
    let requests = require_array(seed, "requests");
    let hospitals = require_array(seed, "hospitals");

    for (i, donor) in donors.iter().enumerate() {
        validate_record(donor, "donor", i, &["id", "name", "location", "contact"]);
    }

    for (i, request) in requests.iter().enumerate() {
        validate_record(
            request,
            "request",
            i,
            &["id", "patient_name", "location", "contact", "posted_at"],
        );
        let urgency = request
            .get("urgency")
            .and_then(serde_json::Value::as_str)
            .unwrap_or("<missing>");
        assert!(
            URGENCY_LEVELS.contains(&urgency),
            "\n\nDIRECTORY BUILD ERROR: request {i} has invalid urgency '{urgency}'\n\
             Expected one of: {}\n",
            URGENCY_LEVELS.join(", ")
        );
    }

    for (i, hospital) in hospitals.iter().enumerate() {
        require_strings(hospital, "hospital", i, &["id", "name", "location"]);
        if let Some(services) = hospital.get("services") {
            assert!(
                services
                    .as_array()
                    .is_some_and(|s| s.iter().all(serde_json::Value::is_string)),
                "\n\nDIRECTORY BUILD ERROR: hospital at index {i} 'services' must be an array of strings\n\
                 Got: {services}\n"
            );
        }
    }

    println!(
        "cargo:warning=Validated seed directory: {} donors, {} requests, {} hospitals",
        donors.len(),
        requests.len(),
        hospitals.len()
    );
}

fn require_array<'a>(seed: &'a serde_json::Value, field: &str) -> &'a Vec<serde_json::Value> {
    let value = seed.get(field).unwrap_or_else(|| {
        panic!(
            "\n\nDIRECTORY BUILD ERROR: Missing '{field}' field\n\
             The seed directory must have a top-level '{field}' array.\n"
        );
    });

    value.as_array().unwrap_or_else(|| {
        panic!(
            "\n\nDIRECTORY BUILD ERROR: '{field}' must be an array\n\
             Got: {value}\n"
        );
    })
}

fn require_strings(record: &serde_json::Value, kind: &str, index: usize, fields: &[&str]) {
    for field in fields {
        assert!(
            record.get(*field).and_then(serde_json::Value::as_str).is_some(),
            "\n\nDIRECTORY BUILD ERROR: {kind} at index {index} missing '{field}' field\n"
        );
    }
}

fn validate_record(record: &serde_json::Value, kind: &str, index: usize, fields: &[&str]) {
    require_strings(record, kind, index, fields);

    let blood_type = record
        .get("blood_type")
        .and_then(serde_json::Value::as_str)
        .unwrap_or("<missing>");
    assert!(
        BLOOD_TYPES.contains(&blood_type),
        "\n\nDIRECTORY BUILD ERROR: {kind} at index {index} has invalid blood type '{blood_type}'\n\
         Expected one of: {}\n",
        BLOOD_TYPES.join(", ")
    );
}

fn set_build_dependencies() {
    // Tell cargo to rerun if the seed directory changes
    println!("cargo:rerun-if-changed=directory/seed.json");

    // Tell cargo to rerun if build.rs changes
    println!("cargo:rerun-if-changed=build.rs");
}
