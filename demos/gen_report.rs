//! Generate dashboard output for a sample store snapshot

fn main() {
    let json = r#"{
        "screenTime": [
            { "minutes": 95, "device": "computer", "timestamp": 1705309200000000000 },
            { "minutes": 40, "device": "phone", "timestamp": 1705321800000000000 },
            { "minutes": 55, "device": "phone", "timestamp": 1705361400000000000 },
            { "minutes": 30, "device": "tablet", "timestamp": 1705395600000000000 },
            { "minutes": -5, "device": "phone", "timestamp": 1705399200000000000 }
        ],
        "healthMetrics": {
            "bmi": 24.1,
            "sleepHoursPerNight": 5.5,
            "eyeStrainSymptoms": true,
            "exerciseHoursPerWeek": 1.5
        },
        "riskScore": 68,
        "profile": { "name": "Ada Lovelace", "age": 36 }
    }"#;

    match screen_health::dashboard_to_json(json, "2vxsx-fae-rdmqg-oaaaa") {
        Ok(dashboard) => print!("{dashboard}"),
        Err(e) => eprintln!("Error: {e:?}"),
    }
}
